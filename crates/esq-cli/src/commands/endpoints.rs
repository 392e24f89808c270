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

//! Endpoints command - endpoint listing and resolution

use super::open_specs;
use crate::error::CliError;
use colored::Colorize;

/// List the endpoints of a specification, or resolve one command.
///
/// With `command`, prints the endpoint id serving `method` (default `GET`)
/// and `command`, failing when none does. Otherwise lists every endpoint,
/// restricted to `method` when given.
///
/// # Examples
///
/// ```no_run
/// use esq_cli::commands::endpoints;
///
/// # fn main() -> Result<(), esq_cli::error::CliError> {
/// endpoints("resources/specs", None, Some("PUT"), None)?;
/// endpoints("resources/specs", Some("7.10"), Some("GET"), Some("/logs/_search"))?;
/// # Ok(())
/// # }
/// ```
pub fn endpoints(
    specs: &str,
    version: Option<&str>,
    method: Option<&str>,
    command: Option<&str>,
) -> Result<(), CliError> {
    let manager = open_specs(specs, version)?;
    let method = method.map(str::to_ascii_uppercase);

    if let Some(command) = command {
        let method = method.as_deref().unwrap_or("GET");
        let command = if command.starts_with('/') {
            command.to_string()
        } else {
            format!("/{}", command)
        };

        return match manager.endpoint_id_for(method, &command) {
            Some(id) => {
                println!("{}", id);
                Ok(())
            }
            None => Err(CliError::invalid_argument(format!(
                "no endpoint serves {} {}",
                method, command
            ))),
        };
    }

    for endpoint in manager.endpoints() {
        let methods = endpoint.all_methods();
        if let Some(method) = method.as_deref() {
            if !methods.iter().any(|m| m == method) {
                continue;
            }
        }

        println!("{}  {}", endpoint.name().green(), methods.join(",").cyan());
        for (path, _) in endpoint.routes() {
            println!("    {}", path);
        }
    }
    Ok(())
}
