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

//! Query document builder.

use super::{check_size, TokenBudget};
use crate::entity::{Configuration, Entity, Query};
use crate::error::EsqResult;
use crate::lex::{QueryScanner, TextToken, TokenKind};
use crate::options::ParseOptions;
use serde::Serialize;
use tracing::{debug, warn};

/// Configurations, queries and comments of a query document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryDocument {
    pub configurations: Vec<Configuration>,
    pub queries: Vec<Query>,
    #[serde(skip)]
    pub comments: Vec<TextToken>,
}

impl QueryDocument {
    /// Parse with default options; never fails.
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, &ParseOptions::default())
    }

    /// Parse with `options`; never fails.
    pub fn parse_with(text: &str, options: &ParseOptions) -> Self {
        Self::try_parse(text, options).unwrap_or_else(|err| {
            warn!(error = %err, "query document parse failed");
            Self::default()
        })
    }

    /// Parse, reporting why a document could not be built.
    pub fn try_parse(text: &str, options: &ParseOptions) -> EsqResult<Self> {
        check_size(text, &options.limits)?;

        let mut document = Self::default();
        let mut budget = TokenBudget::new(&options.limits);
        let scanner = QueryScanner::new(text).with_max_depth(options.limits.max_nesting_depth);

        for token in scanner {
            if !budget.spend(&token) {
                break;
            }
            document.route(token, options);
        }

        debug!(
            queries = document.queries.len(),
            configurations = document.configurations.len(),
            "parsed query document"
        );
        Ok(document)
    }

    fn route(&mut self, token: TextToken, options: &ParseOptions) {
        match token.kind {
            TokenKind::Comment => self.comments.push(token),
            TokenKind::OpenEntity => {
                let mut configuration = Configuration::new();
                configuration.add_token(token);
                self.configurations.push(configuration);
            }
            TokenKind::Property | TokenKind::CloseEntity => {
                if let Some(configuration) = self.configurations.last_mut() {
                    configuration.add_token(token);
                }
            }
            TokenKind::Method => {
                let mut query = Query::new();
                query.add_token(token);
                self.queries.push(query);
            }
            TokenKind::Body => {
                let body = match self.configurations.last() {
                    Some(configuration) if options.substitute_parameters => {
                        configuration.substitute(token.text())
                    }
                    _ => token.text().to_string(),
                };
                if let Some(query) = self.queries.last_mut() {
                    query.add_body_token(token, &body);
                }
            }
            _ => match self.queries.last_mut() {
                Some(query) => query.add_token(token),
                None => warn!(offset = token.offset, kind = %token.kind, "token outside any query"),
            },
        }
    }

    pub fn has_queries(&self) -> bool {
        !self.queries.is_empty()
    }

    /// Query whose span contains `offset`.
    pub fn query_at(&self, offset: usize) -> Option<&Query> {
        self.queries.iter().find(|q| q.contains(offset))
    }

    pub fn query_at_mut(&mut self, offset: usize) -> Option<&mut Query> {
        self.queries.iter_mut().find(|q| q.contains(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    // ===== Statement tests =====

    #[test]
    fn test_two_queries() {
        let document = QueryDocument::parse("GET /lorem/command\r\nGET /ipsum/donec");
        assert_eq!(document.queries.len(), 2);
    }

    #[test]
    fn test_two_queries_one_with_empty_input() {
        let document = QueryDocument::parse("GET /lorem/command()\r\nGET /ipsum/donec");
        assert_eq!(document.queries.len(), 2);
    }

    #[test]
    fn test_two_queries_one_with_input() {
        let document = QueryDocument::parse("GET /lorem/command(lorem=5)\r\nGET /ipsum/donec");
        assert_eq!(document.queries.len(), 2);
        assert_eq!(document.queries[0].arguments().get("lorem").map(String::as_str), Some("5"));
    }

    // ===== Configuration tests =====

    #[test]
    fn test_configuration() {
        let document = QueryDocument::parse(r#"{ "params": { "query": "hello world" }}"#);
        assert_eq!(document.configurations.len(), 1);
        assert_eq!(
            document.configurations[0].param("query").and_then(Value::as_str),
            Some("hello world")
        );
    }

    #[test]
    fn test_configuration_not_on_first_char() {
        let document = QueryDocument::parse(r#" { "params": { "query": "hello world" }}"#);
        assert_eq!(document.configurations.len(), 1);
        assert_eq!(
            document.configurations[0].param("query").and_then(Value::as_str),
            Some("hello world")
        );
    }

    #[test]
    fn test_configuration_bracketed_keys() {
        let text = "{ \"params\": { \"a[18446744073709551615]\": 1, \"b[100000000000]\": 2, \"c[0]\": 3 } }\nGET /_search\n";
        let document = QueryDocument::parse(text);
        assert_eq!(document.configurations.len(), 1);
        assert_eq!(document.queries.len(), 1);
        assert_eq!(
            document.configurations[0].values().get_path("params.c[0]").and_then(Value::as_i64),
            Some(3)
        );
    }

    #[test]
    fn test_configuration_and_query() {
        let document = QueryDocument::parse(
            "{ \"params\": { \"query\": \"hello world\" }}\r\nGET /lorem/command(lorem=5)",
        );
        assert_eq!(document.configurations.len(), 1);
        assert_eq!(document.queries.len(), 1);
    }

    #[test]
    fn test_parameters_substituted_into_bodies() {
        let text = "{ \"params\": { \"term\": \"error\" } }\nGET /_search\n{\"match\": {\"msg\": \"{{term}}\"}}";
        let document = QueryDocument::parse(text);
        assert_eq!(document.queries[0].body(), Some("{\"match\": {\"msg\": \"error\"}}"));

        let options = ParseOptions::builder().substitute_parameters(false).build();
        let raw = QueryDocument::parse_with(text, &options);
        assert_eq!(raw.queries[0].body(), Some("{\"match\": {\"msg\": \"{{term}}\"}}"));
    }

    // ===== Body tests =====

    #[test]
    fn test_bulk_query() {
        let mut text = String::from("GET /lorem/command()");
        for index in 0..5 {
            text.push_str(&format!("\r\n{{ \"params\": {{ \"query\": \"hello {}\" }}}}", index));
        }
        let document = QueryDocument::parse(&text);
        assert_eq!(document.queries.len(), 1);
        assert!(document.queries[0].is_bulk());
        assert_eq!(document.queries[0].bulk().len(), 5);
    }

    #[test]
    fn test_comment_between_bodies_ends_bulk() {
        // a block after a comment is read as a configuration, not a bulk entry
        let text = "POST /_bulk\n{ \"index\": {} }\n/* document */\n{ \"a\": 1 }";
        let document = QueryDocument::parse(text);
        assert_eq!(document.queries.len(), 1);
        assert!(!document.queries[0].is_bulk());
        assert_eq!(document.queries[0].bulk().len(), 1);
        assert_eq!(document.comments.len(), 1);
        assert_eq!(document.configurations.len(), 1);
        assert_eq!(document.configurations[0].values().get("a").and_then(Value::as_i64), Some(1));
    }

    // ===== Lookup tests =====

    #[test]
    fn test_query_at() {
        let text = "GET /a\n{}\n\nPOST /b\n{\"x\": 1}";
        let document = QueryDocument::parse(text);
        assert_eq!(document.query_at(2).and_then(Query::method), Some("GET"));
        assert_eq!(document.query_at(text.len() - 2).and_then(Query::method), Some("POST"));
        assert!(document.query_at(10).is_none());
    }

    #[test]
    fn test_comments_collected() {
        let document = QueryDocument::parse("/* a */\nGET /x\n/* b */");
        assert_eq!(document.comments.len(), 2);
        assert_eq!(document.queries.len(), 1);
    }

    #[test]
    fn test_size_limit_yields_empty_document() {
        let options = ParseOptions::builder().max_document_size(3).build();
        assert!(QueryDocument::try_parse("GET /x", &options).is_err());
        assert_eq!(QueryDocument::parse_with("GET /x", &options), QueryDocument::default());
    }
}
