// Dweve ESQ - Elasticsearch Query Tooling
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Complete command - completion candidates at an offset

use super::{check_offset, open_specs, print_json, read_file};
use crate::error::CliError;
use colored::Colorize;
use esq_intellisense::{complete_document, CompletionItem};

/// Print the completion candidates at `offset` in `file`.
///
/// `specs` is a specification root laid out as
/// `<specs>/<version>/rest-api-spec/*.json` and
/// `<specs>/<version>/endpoints/*.json`.
///
/// # Examples
///
/// ```no_run
/// use esq_cli::commands::complete;
///
/// # fn main() -> Result<(), esq_cli::error::CliError> {
/// complete("queries.esq", 42, "resources/specs", Some("7.10.2"), false)?;
/// # Ok(())
/// # }
/// ```
pub fn complete(
    file: &str,
    offset: usize,
    specs: &str,
    version: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let text = read_file(file)?;
    check_offset(&text, offset)?;
    let manager = open_specs(specs, version)?;

    let items = complete_document(&manager, &text, offset);

    if json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("{}", "no completions".dimmed());
    }
    for item in &items {
        println!("{}", describe(item));
    }
    Ok(())
}

fn describe(item: &CompletionItem) -> String {
    let kind = serde_json::to_value(item.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let mut line = format!("{}  {}", item.label.green(), kind.cyan());
    if let Some(detail) = &item.detail {
        line.push_str(&format!("  {}", detail));
    }
    if let Some(insert) = &item.insert_text {
        line.push_str(&format!("  {} {:?}", "insert".dimmed(), insert));
    }
    line
}
