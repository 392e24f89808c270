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

//! Parse command - entities of a document

use super::{print_json, read_file};
use crate::error::CliError;
use clap::ValueEnum;
use colored::Colorize;
use esq_core::{EnvironmentDocument, IndexTemplateDocument, ParseOptions, Query, QueryDocument};

/// Grammar of the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentKind {
    /// Query statements with bodies
    Query,
    /// Target cluster definitions
    Environment,
    /// Index template bodies
    Template,
}

/// Print the entities parsed from `file`.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or exceeds the parse limits.
///
/// # Examples
///
/// ```no_run
/// use esq_cli::commands::{parse, DocumentKind};
///
/// # fn main() -> Result<(), esq_cli::error::CliError> {
/// parse("queries.esq", DocumentKind::Query, false)?;
/// parse("environments.json", DocumentKind::Environment, true)?;
/// # Ok(())
/// # }
/// ```
pub fn parse(file: &str, kind: DocumentKind, json: bool) -> Result<(), CliError> {
    let text = read_file(file)?;
    let options = ParseOptions::default();

    match kind {
        DocumentKind::Query => {
            let document = QueryDocument::try_parse(&text, &options)?;
            if json {
                return print_json(&document);
            }
            print_queries(&document);
        }
        DocumentKind::Environment => {
            let document = EnvironmentDocument::try_parse(&text, &options)?;
            if json {
                return print_json(&document);
            }
            println!("{}", format!("{} environment(s)", document.environments.len()).bold());
            for environment in &document.environments {
                print!("  {}", environment.to_string().green());
                if let Some(version) = environment.version {
                    print!("  {} {}", "version".cyan(), version);
                }
                println!();
            }
        }
        DocumentKind::Template => {
            let document = IndexTemplateDocument::try_parse(&text, &options)?;
            if json {
                let bodies: Vec<_> = document.index_templates.iter().map(|t| t.to_json()).collect();
                return print_json(&bodies);
            }
            println!("{}", format!("{} index template(s)", document.index_templates.len()).bold());
            for template in &document.index_templates {
                println!(
                    "  {}  {} [{}]",
                    template.name.as_deref().unwrap_or("<unnamed>").green(),
                    "patterns".cyan(),
                    template.index_patterns().join(", ")
                );
                if let Some(order) = template.order() {
                    println!("    {} {}", "order".cyan(), order);
                }
            }
        }
    }

    Ok(())
}

fn print_queries(document: &QueryDocument) {
    println!("{}", format!("{} query(ies)", document.queries.len()).bold());
    if !document.configurations.is_empty() {
        println!("  {} {}", "configurations:".cyan(), document.configurations.len());
    }

    for query in &document.queries {
        println!("  {}", summary(query));
        for (name, value) in query.arguments() {
            println!("    {} {} = {}", "argument".cyan(), name, value);
        }
        if query.is_bulk() {
            println!("    {} {} lines", "bulk".cyan(), query.bulk().len());
        } else if let Some(body) = query.body() {
            let state = if query.has_valid_body() { "body" } else { "body (unterminated)" };
            println!("    {} {} bytes", state.cyan(), body.len());
        }
    }
}

/// `METHOD url  (name)`
fn summary(query: &Query) -> String {
    let mut line = format!(
        "{} {}",
        query.method().unwrap_or("?").bold(),
        query.url().unwrap_or_default()
    );
    if let Some(name) = query.name() {
        line.push_str(&format!("  ({})", name.yellow()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Summary tests =====

    #[test]
    fn test_summary_with_name() {
        colored::control::set_override(false);
        let query = Query::parse("GET /_search?pretty(name=\"all docs\")").unwrap();
        assert_eq!(summary(&query), "GET /_search?pretty  (all docs)");
    }

    #[test]
    fn test_summary_without_name() {
        colored::control::set_override(false);
        let query = Query::parse("GET /_cat/indices").unwrap();
        assert_eq!(summary(&query), "GET /_cat/indices");
    }
}
