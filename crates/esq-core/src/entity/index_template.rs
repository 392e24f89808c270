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

//! Index template entity.

use super::Entity;
use crate::lex::TextToken;
use crate::value::Value;
use serde::Serialize;
use tracing::warn;

/// Keys emitted by [`IndexTemplate::to_json`], in output order.
const TEMPLATE_KEYS: &[&str] = &["order", "template", "version", "settings", "mappings", "aliases"];

/// An index template rebuilt from its property paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexTemplate {
    #[serde(skip)]
    tokens: Vec<TextToken>,
    pub name: Option<String>,
    values: Value,
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexTemplate {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            name: None,
            values: Value::map(),
        }
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Legacy single-pattern field.
    pub fn template(&self) -> Option<&str> {
        self.values.get("template")?.as_str()
    }

    /// Index patterns; the legacy `index_pattern` key is used when
    /// `index_patterns` is absent. A single string counts as one pattern.
    pub fn index_patterns(&self) -> Vec<&str> {
        let patterns = self
            .values
            .get("index_patterns")
            .or_else(|| self.values.get("index_pattern"));

        match patterns {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn version(&self) -> Option<i64> {
        self.values.get("version")?.as_i64()
    }

    pub fn order(&self) -> Option<i64> {
        self.values.get("order")?.as_i64()
    }

    pub fn settings(&self) -> Option<&Value> {
        self.values.get("settings")
    }

    pub fn mappings(&self) -> Option<&Value> {
        self.values.get("mappings")
    }

    pub fn aliases(&self) -> Option<&Value> {
        self.values.get("aliases")
    }

    /// Request body for creating the template.
    ///
    /// Absent keys and an empty pattern list are omitted.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();

        for key in TEMPLATE_KEYS {
            if let Some(value) = self.values.get(key) {
                body.insert((*key).to_string(), value.to_json());
            }
        }

        let patterns = self.index_patterns();
        if !patterns.is_empty() {
            body.insert("index_patterns".to_string(), serde_json::json!(patterns));
        }

        serde_json::Value::Object(body)
    }
}

impl Entity for IndexTemplate {
    fn tokens(&self) -> &[TextToken] {
        &self.tokens
    }

    fn add_token(&mut self, token: TextToken) {
        if let Err(err) = self.values.apply_token(&token) {
            warn!(offset = token.offset, error = %err, "ignored index template property");
        }
        self.tokens.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::EntityScanner;

    fn template(text: &str) -> IndexTemplate {
        let mut template = IndexTemplate::new();
        for token in EntityScanner::new(text) {
            template.add_token(token);
        }
        template
    }

    // ===== Accessor tests =====

    #[test]
    fn test_patterns_and_settings() {
        let parsed = template(
            r#"{ "index_patterns": ["a*"], "version": 2, "settings": { "number_of_shards": 3 } }"#,
        );
        assert_eq!(parsed.index_patterns(), vec!["a*"]);
        assert_eq!(parsed.version(), Some(2));
        assert_eq!(
            parsed.settings().and_then(|s| s.get("number_of_shards")).and_then(Value::as_i64),
            Some(3)
        );
    }

    #[test]
    fn test_legacy_index_pattern_key() {
        let parsed = template(
            r#"{ "index_pattern": ["bestBet*", "lorem", "ipsum*"], "settings": { "number_of_shards": 5 }}"#,
        );
        assert_eq!(parsed.index_patterns().len(), 3);
    }

    #[test]
    fn test_dynamic_templates_array() {
        let parsed = template(
            r#"{ "mappings": { "dynamic_templates": [ { "strings": { "match_mapping_type": "string" } } ] } }"#,
        );
        assert_eq!(
            parsed
                .values()
                .get_path("mappings.dynamic_templates[0].strings.match_mapping_type")
                .and_then(Value::as_str),
            Some("string")
        );
    }

    // ===== to_json tests =====

    #[test]
    fn test_to_json_omits_absent_keys() {
        let parsed = template(r#"{ "order": 1, "index_patterns": [], "aliases": {} }"#);
        let json = parsed.to_json();
        assert_eq!(json, serde_json::json!({"order": 1, "aliases": {}}));
    }

    #[test]
    fn test_to_json_uses_legacy_patterns() {
        let parsed = template(r#"{ "index_pattern": "logs-*" }"#);
        assert_eq!(parsed.to_json(), serde_json::json!({"index_patterns": ["logs-*"]}));
    }
}
