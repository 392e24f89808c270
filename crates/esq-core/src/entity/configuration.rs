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

//! Leading configuration block of a query document.

use super::Entity;
use crate::lex::TextToken;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// `{ "params": {...}, "source": "...", "output": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    #[serde(skip)]
    tokens: Vec<TextToken>,
    values: Value,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            values: Value::map(),
        }
    }

    /// The whole block as a value tree.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Template parameters.
    pub fn params(&self) -> Option<&BTreeMap<String, Value>> {
        self.values.get("params")?.as_map()
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params()?.get(name)
    }

    /// Input file hint.
    pub fn source(&self) -> Option<&str> {
        self.values.get("source")?.as_str()
    }

    /// Output file hint.
    pub fn output(&self) -> Option<&str> {
        self.values.get("output")?.as_str()
    }

    /// Replace `{{name}}` placeholders with parameter values.
    ///
    /// Only the first two occurrences of each placeholder are replaced.
    /// String parameters are inserted raw, others as compact JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use esq_core::parse_query_document;
    ///
    /// let document = parse_query_document("{ \"params\": { \"term\": \"error\" } }");
    /// let configuration = &document.configurations[0];
    /// assert_eq!(
    ///     configuration.substitute(r#"{"match": {"message": "{{term}}"}}"#),
    ///     r#"{"match": {"message": "error"}}"#
    /// );
    /// ```
    pub fn substitute(&self, text: &str) -> String {
        let Some(params) = self.params() else {
            return text.to_string();
        };

        params.iter().fold(text.to_string(), |acc, (name, value)| {
            let placeholder = format!("{{{{{}}}}}", name);
            acc.replacen(&placeholder, &value.to_string(), 2)
        })
    }
}

impl Entity for Configuration {
    fn tokens(&self) -> &[TextToken] {
        &self.tokens
    }

    fn add_token(&mut self, token: TextToken) {
        if let Err(err) = self.values.apply_token(&token) {
            warn!(offset = token.offset, error = %err, "ignored configuration property");
        }
        self.tokens.push(token);
    }
}
