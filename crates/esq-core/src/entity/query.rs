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

//! A single query statement.

use super::Entity;
use crate::lex::{Pattern, TextCursor, TextToken, TokenKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// `METHOD /command?options(arguments)` followed by zero or more bodies.
///
/// # Examples
///
/// ```
/// use esq_core::Query;
///
/// let query = Query::parse("get _search?size=10&pretty").unwrap();
/// assert_eq!(query.method(), Some("GET"));
/// assert_eq!(query.command(), Some("/_search"));
/// assert_eq!(query.url().as_deref(), Some("/_search?pretty&size=\"10\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    #[serde(skip)]
    tokens: Vec<TextToken>,
    method: Option<String>,
    command: Option<String>,
    endpoint_id: Option<String>,
    options: BTreeMap<String, Option<String>>,
    arguments: BTreeMap<String, String>,
    has_input: bool,
    body: Option<String>,
    bulk: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// First query of `text`.
    pub fn parse(text: &str) -> Option<Query> {
        crate::parse_query_document(text).queries.into_iter().next()
    }

    /// Upper-cased method.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn set_method(&mut self, method: &str) {
        self.method = Some(method.to_ascii_uppercase());
    }

    /// Command path, always starting with `/`.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn set_command(&mut self, command: &str) {
        let command = command.trim();
        self.command = Some(if command.starts_with('/') {
            command.to_string()
        } else {
            format!("/{}", command)
        });
    }

    pub fn has_command(&self) -> bool {
        self.command.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Path segments of the command after the leading `/`.
    pub fn steps(&self) -> Vec<&str> {
        match self.command.as_deref() {
            Some(command) if !command.is_empty() => {
                command.strip_prefix('/').unwrap_or(command).split('/').collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn endpoint_id(&self) -> Option<&str> {
        self.endpoint_id.as_deref()
    }

    pub fn set_endpoint_id(&mut self, endpoint_id: Option<String>) {
        self.endpoint_id = endpoint_id;
    }

    /// Query-string options; flags map to `None`.
    pub fn options(&self) -> &BTreeMap<String, Option<String>> {
        &self.options
    }

    /// Named arguments from the `( … )` list.
    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// The `name` argument, if given.
    pub fn name(&self) -> Option<&str> {
        self.arguments.get("name").map(String::as_str)
    }

    pub fn has_input(&self) -> bool {
        self.has_input
    }

    /// First body.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.is_empty())
    }

    /// False when any body was left unterminated.
    pub fn has_valid_body(&self) -> bool {
        !self
            .tokens
            .iter()
            .any(|t| t.kind == TokenKind::Body && !t.is_valid)
    }

    /// Every body in order.
    pub fn bulk(&self) -> &[String] {
        &self.bulk
    }

    pub fn is_bulk(&self) -> bool {
        self.bulk.len() > 1
    }

    /// Command followed by the options as a query string.
    pub fn url(&self) -> Option<String> {
        let mut url = self.command.clone()?;

        for (index, (key, value)) in self.options.iter().enumerate() {
            url.push(if index == 0 { '?' } else { '&' });
            match value.as_deref() {
                Some(value) if !value.is_empty() => {
                    url.push_str(&format!("{}=\"{}\"", key, value));
                }
                _ => url.push_str(key),
            }
        }

        Some(url)
    }

    /// Kind of the token at `offset`; arguments report [`TokenKind::Input`].
    pub fn token_kind_at(&self, offset: usize) -> TokenKind {
        match self.token_at(offset).map(|t| t.kind) {
            Some(TokenKind::Argument | TokenKind::ArgumentValue) => TokenKind::Input,
            Some(kind) => kind,
            None => TokenKind::Empty,
        }
    }

    /// Record a body token with its (possibly substituted) text.
    pub fn add_body_token(&mut self, token: TextToken, body: &str) {
        let body = stringify_template_source(body);
        if !self.has_body() {
            self.body = Some(body.clone());
        }
        self.bulk.push(body);
        self.tokens.push(token);
    }
}

impl Entity for Query {
    fn tokens(&self) -> &[TextToken] {
        &self.tokens
    }

    fn add_token(&mut self, token: TextToken) {
        match token.kind {
            TokenKind::Method => self.set_method(token.text()),
            TokenKind::Command => self.set_command(token.text()),
            TokenKind::QueryString if token.has_text() => {
                let value = token.value_text().map(str::to_string);
                self.options.insert(token.text().to_string(), value);
            }
            TokenKind::Argument => {
                self.has_input = true;
                if let (true, Some(value)) = (token.has_text(), token.value_text()) {
                    self.arguments
                        .insert(token.text().to_string(), value.to_string());
                }
            }
            TokenKind::Body => {
                let body = token.text().to_string();
                self.add_body_token(token, &body);
                return;
            }
            _ => {}
        }
        self.tokens.push(token);
    }
}

/// Turn `"source": { … }` in a search-template body into a JSON string.
fn stringify_template_source(body: &str) -> String {
    let mut cursor = TextCursor::new(body);

    while let Some(found) = cursor.advance_until(Pattern::Literal("\"source\"")) {
        cursor.set_position(found.end);
        if cursor.skip_whitespace() != Some(b':') {
            continue;
        }
        if cursor.advance_until_non_whitespace(1) != Some(b'{') {
            continue;
        }

        let start = cursor.position();
        if !cursor.advance_to_json_object_end() {
            break;
        }
        let end = cursor.position() + 1;
        let source = serde_json::Value::String(cursor.slice(start, end).to_string());
        return format!(
            "{}{}{}",
            cursor.slice(0, start),
            source,
            cursor.slice(end, body.len())
        );
    }

    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::QueryScanner;

    fn query(text: &str) -> Query {
        let mut query = Query::new();
        for token in QueryScanner::new(text) {
            query.add_token(token);
        }
        query
    }

    // ===== Field tests =====

    #[test]
    fn test_method_and_command() {
        let parsed = query("get _cat/indices");
        assert_eq!(parsed.method(), Some("GET"));
        assert_eq!(parsed.command(), Some("/_cat/indices"));
        assert_eq!(parsed.steps(), vec!["_cat", "indices"]);
        assert!(!parsed.has_body());
        assert!(parsed.has_valid_body());
    }

    #[test]
    fn test_options_and_url() {
        let parsed = query("GET /_search?size=10&pretty");
        assert_eq!(parsed.options().get("size"), Some(&Some("10".to_string())));
        assert_eq!(parsed.options().get("pretty"), Some(&None));
        assert_eq!(parsed.url().as_deref(), Some("/_search?pretty&size=\"10\""));
    }

    #[test]
    fn test_arguments_and_name() {
        let parsed = query("GET /_search(name=\"daily\", timeout:5)");
        assert!(parsed.has_input());
        assert_eq!(parsed.name(), Some("daily"));
        assert_eq!(parsed.arguments().get("timeout").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_empty_input_is_not_input() {
        assert!(!query("GET /a()").has_input());
    }

    // ===== Body tests =====

    #[test]
    fn test_bulk_bodies() {
        let parsed = query("POST /_bulk\n{\"index\":{}}\n{\"a\":1}\n");
        assert!(parsed.is_bulk());
        assert_eq!(parsed.bulk().len(), 2);
        assert_eq!(parsed.body(), Some("{\"index\":{}}"));
    }

    #[test]
    fn test_invalid_body() {
        let parsed = query("GET /_search\n{\"query\": {");
        assert!(parsed.has_body());
        assert!(!parsed.has_valid_body());
    }

    #[test]
    fn test_search_template_source_is_stringified() {
        let body = r#"{"source": {"query": {"match": {"a": "{{v}}"}}}, "params": {"v": 1}}"#;
        let out = stringify_template_source(body);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            json["source"].as_str(),
            Some(r#"{"query": {"match": {"a": "{{v}}"}}}"#)
        );
        assert_eq!(json["params"]["v"], 1);
    }

    #[test]
    fn test_string_source_untouched() {
        let body = r#"{"source": "ctx._source.n += 1"}"#;
        assert_eq!(stringify_template_source(body), body);
    }

    // ===== Offset tests =====

    #[test]
    fn test_token_kind_at() {
        let text = "GET /_search?size=10(timeout:5)";
        let parsed = query(text);
        assert_eq!(parsed.token_kind_at(1), TokenKind::Method);
        assert_eq!(parsed.token_kind_at(6), TokenKind::Command);
        assert_eq!(parsed.token_kind_at(14), TokenKind::QueryString);
        assert_eq!(parsed.token_kind_at(23), TokenKind::Input);
        assert_eq!(parsed.token_kind_at(200), TokenKind::Empty);
    }
}
