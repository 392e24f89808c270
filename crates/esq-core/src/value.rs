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

//! Tagged value tree reconstructed from property paths.

use crate::error::{EsqError, EsqResult};
use crate::lex::{TextToken, TokenKind};
use crate::path::{self, PathSegment};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A JSON-shaped value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Interpret scanned value text.
    ///
    /// Quoted text is always a string; bare text becomes a boolean, null or
    /// number when it reads as one, and a string otherwise.
    pub fn from_text(text: &str, quoted: bool) -> Self {
        if quoted {
            return Value::String(text.to_string());
        }
        match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => text
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(text.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Member of a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Value at a dotted/bracketed path; `/` is accepted for `.`.
    ///
    /// # Examples
    ///
    /// ```
    /// use esq_core::Value;
    ///
    /// let mut root = Value::map();
    /// root.assign("settings.number_of_shards", Value::from_text("3", false)).unwrap();
    /// assert_eq!(root.get_path("settings/number_of_shards").and_then(Value::as_i64), Some(3));
    /// ```
    pub fn get_path(&self, target: &str) -> Option<&Value> {
        let target = path::normalize(target);
        let mut current = self;
        for segment in path::segments(&target) {
            current = match segment {
                PathSegment::Key(key) => current.get(key)?,
                PathSegment::Index(index) => current.as_array()?.get(index)?,
            };
        }
        Some(current)
    }

    /// Assign `value` at `target`, creating intermediate maps and arrays.
    ///
    /// Containers (an empty map or array) are only installed when the slot
    /// is empty, so re-opening an existing object keeps its members. A
    /// scalar assigned onto an array is appended to it.
    pub fn assign(&mut self, target: &str, value: Value) -> EsqResult<()> {
        let segments = path::segments(target);
        let Some((last, parents)) = segments.split_last() else {
            return Err(EsqError::path(format!("empty path for value {}", value)));
        };

        let mut current = self;
        for segment in parents {
            current = current.slot(*segment, target)?;
        }

        match current.slot(*last, target)? {
            Value::Map(_) | Value::Array(_) if value.is_empty_container() => {}
            Value::Array(items) if !value.is_container() => items.push(value),
            slot => *slot = value,
        }

        Ok(())
    }

    /// Apply a property token whose path is relative to this value.
    ///
    /// Scalar values are assigned; nested openings install an empty
    /// container when absent. Other tokens are ignored.
    pub fn apply_token(&mut self, token: &TextToken) -> EsqResult<()> {
        let (Some(target), Some(value)) = (token.path.as_deref(), token.value.as_deref()) else {
            return Ok(());
        };

        let value = match value.kind {
            TokenKind::PropertyValue => Value::from_text(value.text(), value.quoted),
            TokenKind::OpenEntity => Value::map(),
            TokenKind::OpenArray => Value::array(),
            _ => return Ok(()),
        };

        self.assign(target, value)
    }

    fn is_container(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Array(_))
    }

    fn is_empty_container(&self) -> bool {
        match self {
            Value::Map(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Child slot for `segment`. An index one past the end appends a null;
    /// indices further out are rejected. A null value becomes the container
    /// the segment addresses.
    fn slot(&mut self, segment: PathSegment<'_>, target: &str) -> EsqResult<&mut Value> {
        if self.is_null() {
            *self = match segment {
                PathSegment::Key(_) => Value::map(),
                PathSegment::Index(_) => Value::array(),
            };
        }

        match (self, segment) {
            (Value::Map(map), PathSegment::Key(key)) => Ok(map.entry(key.to_string()).or_default()),
            (Value::Array(items), PathSegment::Index(index)) => {
                if index > items.len() {
                    return Err(EsqError::path(format!(
                        "index {} is past the end of an array of {} at '{}'",
                        index,
                        items.len(),
                        target
                    )));
                }
                if index == items.len() {
                    items.push(Value::Null);
                }
                Ok(&mut items[index])
            }
            (current, segment) => Err(EsqError::path(format!(
                "cannot address '{}' in {} at '{}'",
                segment.to_path_string(),
                current.type_name(),
                target
            ))),
        }
    }

    /// Short type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
        }
    }

    /// Convert into a `serde_json` value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Strings print raw; everything else prints as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> Value {
        Value::from_text(text, false)
    }

    // ==================== from_text tests ====================

    #[test]
    fn test_from_text_scalars() {
        assert_eq!(Value::from_text("true", false), Value::Bool(true));
        assert_eq!(Value::from_text("null", false), Value::Null);
        assert_eq!(number("3").as_i64(), Some(3));
        assert_eq!(number("2.5").as_f64(), Some(2.5));
        assert_eq!(Value::from_text("1s", false), Value::from("1s"));
    }

    #[test]
    fn test_from_text_quoted_is_string() {
        assert_eq!(Value::from_text("true", true), Value::from("true"));
        assert_eq!(Value::from_text("3", true).as_str(), Some("3"));
    }

    // ==================== assign tests ====================

    #[test]
    fn test_assign_creates_intermediate_maps() {
        let mut root = Value::map();
        root.assign("settings.index.number_of_shards", number("3")).unwrap();
        assert_eq!(
            root.get_path("settings.index.number_of_shards").and_then(Value::as_i64),
            Some(3)
        );
    }

    #[test]
    fn test_assign_grows_arrays() {
        let mut root = Value::map();
        root.assign("patterns[0]", Value::from("a*")).unwrap();
        root.assign("patterns[1]", Value::from("b*")).unwrap();
        let items = root.get("patterns").and_then(Value::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), Some("a*"));
        assert_eq!(items[1].as_str(), Some("b*"));
    }

    #[test]
    fn test_assign_index_past_end_fails() {
        let mut root = Value::map();
        let err = root.assign("patterns[1]", Value::from("b*")).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Path);
        assert!(root.get("patterns").and_then(Value::as_array).unwrap().is_empty());
    }

    #[test]
    fn test_assign_huge_index_fails() {
        let mut root = Value::map();
        assert!(root.assign("a[18446744073709551615]", number("1")).is_err());
        assert!(root.assign("b[100000000000]", number("1")).is_err());
    }

    #[test]
    fn test_assign_array_of_objects() {
        let mut root = Value::map();
        root.assign("mappings.dynamic_templates", Value::array()).unwrap();
        root.assign("mappings.dynamic_templates[0]", Value::map()).unwrap();
        root.assign("mappings.dynamic_templates[0].strings", Value::map()).unwrap();
        root.assign("mappings.dynamic_templates[0].strings.match", Value::from("*"))
            .unwrap();
        assert_eq!(
            root.get_path("mappings.dynamic_templates[0].strings.match")
                .and_then(Value::as_str),
            Some("*")
        );
    }

    #[test]
    fn test_container_does_not_replace_existing() {
        let mut root = Value::map();
        root.assign("a.b", number("1")).unwrap();
        root.assign("a", Value::map()).unwrap();
        assert_eq!(root.get_path("a.b").and_then(Value::as_i64), Some(1));
    }

    #[test]
    fn test_scalar_onto_array_appends() {
        let mut root = Value::map();
        root.assign("tags", Value::array()).unwrap();
        root.assign("tags", Value::from("x")).unwrap();
        root.assign("tags", Value::from("y")).unwrap();
        assert_eq!(root.get("tags").and_then(Value::as_array).map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_scalar_overwrites_scalar() {
        let mut root = Value::map();
        root.assign("n", number("1")).unwrap();
        root.assign("n", number("2")).unwrap();
        assert_eq!(root.get("n").and_then(Value::as_i64), Some(2));
    }

    #[test]
    fn test_assign_through_scalar_fails() {
        let mut root = Value::map();
        root.assign("a", number("1")).unwrap();
        let err = root.assign("a.b", number("2")).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Path);
        assert!(err.message.contains("number"));
    }

    #[test]
    fn test_assign_empty_path_fails() {
        let mut root = Value::map();
        assert!(root.assign("", number("1")).is_err());
    }

    // ==================== apply_token tests ====================

    #[test]
    fn test_apply_property_tokens() {
        let mut root = Value::map();
        let open = TextToken::new(TokenKind::Property, "params", 2)
            .with_path("params")
            .with_value(TextToken::structural(TokenKind::OpenEntity, 12));
        let leaf = TextToken::new(TokenKind::Property, "index", 15)
            .with_path("params.index")
            .with_value(TextToken::new(TokenKind::PropertyValue, "logs", 24).quoted());
        root.apply_token(&open).unwrap();
        root.apply_token(&leaf).unwrap();
        assert_eq!(root.get_path("params.index").and_then(Value::as_str), Some("logs"));
    }

    #[test]
    fn test_apply_close_token_is_ignored() {
        let mut root = Value::map();
        let close = TextToken::new(TokenKind::Property, "params", 2)
            .with_path("params")
            .with_value(TextToken::structural(TokenKind::CloseEntity, 30));
        root.apply_token(&close).unwrap();
        assert_eq!(root, Value::map());
    }

    // ==================== conversion tests ====================

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let json = serde_json::json!({"a": [1, "two", {"b": null}], "c": true});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), json);
        assert_eq!(serde_json::to_value(&value).unwrap(), json);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(serde_json::json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }
}
