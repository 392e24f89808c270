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

//! Tokens command - token stream of a document

use super::{check_offset, print_json, read_file};
use crate::error::CliError;
use colored::Colorize;
use esq_core::lex::{EntityScanner, QueryScanner};
use esq_core::TextToken;

/// Print the tokens of `file`.
///
/// With `offset`, the scanner calibrates at that offset and only the tokens
/// from there on are printed. `entity` selects the entity grammar used by
/// environment and template documents.
///
/// # Examples
///
/// ```no_run
/// use esq_cli::commands::tokens;
///
/// # fn main() -> Result<(), esq_cli::error::CliError> {
/// tokens("queries.esq", None, false, false)?;
/// tokens("environments.json", Some(120), true, true)?;
/// # Ok(())
/// # }
/// ```
pub fn tokens(file: &str, offset: Option<usize>, entity: bool, json: bool) -> Result<(), CliError> {
    let text = read_file(file)?;
    if let Some(offset) = offset {
        check_offset(&text, offset)?;
    }

    let tokens = scan(&text, offset, entity);

    if json {
        return print_json(&tokens);
    }

    for token in &tokens {
        println!("{}", describe(token));
    }
    Ok(())
}

fn scan(text: &str, offset: Option<usize>, entity: bool) -> Vec<TextToken> {
    match (entity, offset) {
        (true, Some(offset)) => EntityScanner::at(text, offset).collect(),
        (true, None) => EntityScanner::new(text).collect(),
        (false, Some(offset)) => QueryScanner::at(text, offset).collect(),
        (false, None) => QueryScanner::new(text).collect(),
    }
}

/// One line per token: span, kind, text, path and value.
fn describe(token: &TextToken) -> String {
    let mut line = format!(
        "{:>6}..{:<6} {}",
        token.offset,
        token.offset_end(),
        format!("{:<14}", token.kind.to_string()).cyan()
    );

    if token.has_text() {
        line.push_str(&format!(" {:?}", token.text()));
    }
    if let Some(path) = token.path.as_deref().filter(|p| !p.is_empty()) {
        line.push_str(&format!(" @{}", path.yellow()));
    }
    if let Some(value) = token.value.as_deref() {
        line.push_str(&format!(" = {}", value.kind.to_string().green()));
        if value.has_text() {
            line.push_str(&format!(" {:?}", value.text()));
        }
    }
    if !token.is_valid {
        line.push_str(&format!(" {}", "(invalid)".red()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use esq_core::TokenKind;

    // ===== Scan tests =====

    #[test]
    fn test_scan_query_grammar() {
        let kinds: Vec<TokenKind> = scan("GET /_search\n{}", None, false).iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Method, TokenKind::Command, TokenKind::Body]);
    }

    #[test]
    fn test_scan_entity_grammar() {
        let tokens = scan(r#"{ "name": "local" }"#, None, true);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Property && t.text() == "name"));
    }

    #[test]
    fn test_describe_mentions_value() {
        colored::control::set_override(false);
        let tokens = scan(r#"{ "name": "local" }"#, None, true);
        let name = tokens.iter().find(|t| t.text() == "name").unwrap();
        let line = describe(name);
        assert!(line.contains("\"name\""));
        assert!(line.contains("@name"));
        assert!(line.contains("\"local\""));
    }
}
