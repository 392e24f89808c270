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

//! Scanner for the JSON-like entity grammar.
//!
//! Configuration blocks, environment documents, index templates and query
//! bodies all use this grammar. The scanner flattens nested objects and
//! arrays into a stream of [`TokenKind::Property`] tokens, each carrying a
//! dotted/bracketed path and a value token:
//!
//! ```text
//! {"lorem": [{"donec": 16}]}
//!
//! OpenEntity
//! Property lorem          value=OpenArray    path=lorem
//! Property [0]            value=OpenEntity   path=lorem[0]
//! Property donec          value=16           path=lorem[0].donec
//! Property [0]            value=CloseEntity  path=lorem[0]
//! Property lorem          value=CloseArray   path=lorem
//! CloseEntity
//! ```
//!
//! Closing characters "bubble up" as a Property token per level, carrying
//! the name, offset and path of the slot they close, so open and close
//! tokens pair up by path.
//!
//! # Resuming mid-document
//!
//! A scanner created with [`EntityScanner::at`] calibrates on its first
//! scan: it retreats to the nearest unmatched `{` and resumes from there,
//! with paths relative to that object.

use super::cursor::{Pattern, TextCursor};
use super::token::{TextToken, TokenKind};
use crate::path;

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Position not yet reconciled with the grammar; see [`EntityScanner::calibrate`].
    Unknown,
    /// Between entities.
    WithinContent,
    /// On the `{` that opens an entity.
    AfterOpenEntity,
    /// Inside an entity.
    WithinEntity,
}

/// Bytes that end a bare (unquoted) value.
const BARE_VALUE_END: &[u8] = b" \t\r\n,}])";

/// An open object or array slot.
#[derive(Debug, Clone)]
struct OpenSlot {
    /// The Property token that opened the slot, without its value.
    opening: TextToken,
    path: String,
    is_array: bool,
    next_index: usize,
}

/// Tokenizer for the entity grammar.
#[derive(Debug, Clone)]
pub struct EntityScanner<'a> {
    cursor: TextCursor<'a>,
    state: EntityState,
    stack: Vec<OpenSlot>,
    max_depth: usize,
    record: bool,
    scanned: Vec<TextToken>,
}

impl<'a> EntityScanner<'a> {
    /// Scanner positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            cursor: TextCursor::new(text),
            state: EntityState::WithinContent,
            stack: Vec::new(),
            max_depth: usize::MAX,
            record: false,
            scanned: Vec::new(),
        }
    }

    /// Scanner positioned at `offset`; calibrates on the first scan.
    pub fn at(text: &'a str, offset: usize) -> Self {
        let mut scanner = Self::new(text);
        scanner.cursor.set_position(offset);
        if offset > 0 {
            scanner.state = EntityState::Unknown;
        }
        scanner
    }

    /// Limit object/array nesting. Deeper values are skipped whole and
    /// reported as an invalid PropertyValue.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Keep every produced token, available through [`EntityScanner::scanned`].
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }

    /// Tokens produced so far (only when recording).
    pub fn scanned(&self) -> &[TextToken] {
        &self.scanned
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<TextToken> {
        if self.state == EntityState::Unknown {
            self.calibrate();
        }

        let token = match self.state {
            EntityState::WithinContent => self.scan_content(),
            EntityState::AfterOpenEntity | EntityState::WithinEntity => self.scan_entity(),
            EntityState::Unknown => None,
        }?;

        if self.record {
            self.scanned.push(token.clone());
        }
        Some(token)
    }

    /// Scan until the scanner enters `state`; returns the token produced by
    /// that transition.
    pub fn scan_until(&mut self, state: EntityState) -> Option<TextToken> {
        loop {
            let token = self.next_token();
            if self.state == state {
                return token;
            }
            token.as_ref()?;
        }
    }

    /// Scan until a token reaches `position`.
    ///
    /// Returns the first token whose span ends at or after `position`, or
    /// the last token produced when input ends first.
    pub fn scan_until_position(&mut self, position: usize) -> Option<TextToken> {
        let mut last = None;
        while let Some(token) = self.next_token() {
            let reached = token.span_end() >= position;
            last = Some(token);
            if reached {
                break;
            }
        }
        last
    }

    /// Scan until a token with the given path; `/` is accepted for `.`.
    pub fn scan_until_path(&mut self, target: &str) -> Option<TextToken> {
        let target = path::normalize(target);
        while let Some(token) = self.next_token() {
            if token.path.as_deref() == Some(target.as_str()) {
                return Some(token);
            }
        }
        None
    }

    /// Reconcile the state with the current position.
    ///
    /// On a `{` the scanner simply starts there. Otherwise it retreats to the
    /// nearest unmatched `{` and resumes inside that object; with none, it
    /// stays put and looks for the next entity.
    pub fn calibrate(&mut self) {
        self.stack.clear();

        if self.cursor.current() == Some(b'{') {
            self.state = EntityState::WithinContent;
            return;
        }

        let origin = self.cursor.position();
        let mut depth = 0usize;

        while let Some(found) = self.cursor.retreat_until(Pattern::AnyOf(b"{}")) {
            if found.text == "}" {
                depth += 1;
            } else if depth == 0 {
                self.state = EntityState::AfterOpenEntity;
                return;
            } else {
                depth -= 1;
            }
        }

        self.cursor.set_position(origin);
        self.state = EntityState::WithinContent;
    }

    // ==================== Content ====================

    fn scan_content(&mut self) -> Option<TextToken> {
        let found = self
            .cursor
            .advance_to_closest(&[Pattern::Byte(b'{'), Pattern::Literal("/*")]);

        let Some(found) = found else {
            self.cursor.advance_to_end();
            return None;
        };

        if found.index == 1 {
            return Some(self.scan_comment());
        }

        self.stack.clear();
        self.state = EntityState::AfterOpenEntity;
        Some(TextToken::structural(TokenKind::OpenEntity, found.start))
    }

    fn scan_comment(&mut self) -> TextToken {
        let start = self.cursor.position();
        self.cursor.advance(2);

        match self.cursor.advance_until(Pattern::Literal("*/")) {
            Some(end) => {
                self.cursor.set_position(end.end);
                TextToken::new(TokenKind::Comment, self.cursor.slice(start, end.end), start)
            }
            None => TextToken::new(TokenKind::Comment, self.cursor.slice(start, self.cursor.len()), start)
                .with_validity(false),
        }
    }

    // ==================== Entity ====================

    fn scan_entity(&mut self) -> Option<TextToken> {
        if self.state == EntityState::AfterOpenEntity {
            self.cursor.advance(1);
            self.state = EntityState::WithinEntity;
        }

        if self.stack.last().map_or(false, |slot| slot.is_array) {
            return self.scan_array_element();
        }

        let found = self
            .cursor
            .advance_to_closest(&[Pattern::Byte(b'}'), Pattern::Byte(b'"')]);

        let Some(found) = found else {
            self.cursor.advance_to_end();
            return None;
        };

        if found.index == 1 {
            return Some(self.scan_property());
        }

        if self.stack.is_empty() {
            self.cursor.advance(1);
            self.state = EntityState::WithinContent;
            return Some(TextToken::structural(TokenKind::CloseEntity, found.start));
        }

        self.close_slot(TokenKind::CloseEntity)
    }

    fn scan_property(&mut self) -> TextToken {
        let name = self.cursor.take_quoted();
        let path = path::join(self.current_path(), name.text);
        let token = TextToken::new(TokenKind::Property, name.text, name.start)
            .with_path(path)
            .with_validity(name.terminated);

        if !name.terminated {
            return token;
        }

        match self.cursor.skip_whitespace() {
            Some(b':' | b'=') => {
                self.cursor.advance_until_non_whitespace(1);
            }
            _ => return token,
        }

        self.attach_value(token)
    }

    fn scan_array_element(&mut self) -> Option<TextToken> {
        match self.cursor.skip_whitespace()? {
            b']' => return self.close_slot(TokenKind::CloseArray),
            b'}' => return self.close_slot(TokenKind::CloseEntity),
            _ => {}
        }

        let start = self.cursor.position();
        let slot = self.stack.last_mut()?;
        let name = format!("[{}]", slot.next_index);
        slot.next_index += 1;
        let path = path::join(Some(&slot.path), &name);

        let token = TextToken::synthetic(TokenKind::Property, name, start).with_path(path);
        Some(self.attach_value(token))
    }

    /// Read the value under the cursor into `token`, opening a slot when the
    /// value starts an object or array.
    fn attach_value(&mut self, token: TextToken) -> TextToken {
        let Some(value) = self.scan_value() else {
            return token;
        };

        if value.kind.is_open() {
            self.stack.push(OpenSlot {
                path: token.path.clone().unwrap_or_default(),
                opening: token.clone(),
                is_array: value.kind == TokenKind::OpenArray,
                next_index: 0,
            });
        }

        token.with_value(value)
    }

    fn scan_value(&mut self) -> Option<TextToken> {
        let start = self.cursor.position();

        match self.cursor.current()? {
            b'"' => {
                let text = self.cursor.take_quoted();
                self.skip_separator();
                Some(
                    TextToken::new(TokenKind::PropertyValue, text.text, text.start)
                        .quoted()
                        .with_validity(text.terminated),
                )
            }
            open @ (b'{' | b'[') => {
                if self.stack.len() >= self.max_depth {
                    return Some(self.skip_nested(start, open));
                }
                self.cursor.advance(1);
                let kind = if open == b'{' {
                    TokenKind::OpenEntity
                } else {
                    TokenKind::OpenArray
                };
                Some(TextToken::structural(kind, start))
            }
            b'}' | b']' => None,
            _ => {
                let text = self.cursor.take_until(Pattern::AnyOf(BARE_VALUE_END));
                if text.text.is_empty() {
                    // stray delimiter, step over it
                    self.cursor.advance(1);
                    self.skip_separator();
                    return None;
                }
                self.skip_separator();
                Some(TextToken::new(TokenKind::PropertyValue, text.text, text.start))
            }
        }
    }

    /// Skip a whole object or array that would exceed the depth limit.
    fn skip_nested(&mut self, start: usize, open: u8) -> TextToken {
        let close = if open == b'{' { b'}' } else { b']' };
        let mut depth = 0usize;
        let mut end = None;

        while let Some(found) = self.cursor.advance_until(Pattern::AnyOf(&[open, close, b'"'])) {
            match found.text.as_bytes()[0] {
                b'"' => {
                    self.cursor.take_quoted();
                    continue;
                }
                b if b == open => depth += 1,
                _ => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        end = Some(found.end);
                        break;
                    }
                }
            }
            self.cursor.advance(1);
        }

        let end = end.unwrap_or(self.cursor.len());
        self.cursor.set_position(end);
        self.skip_separator();
        TextToken::new(TokenKind::PropertyValue, self.cursor.slice(start, end), start)
            .with_validity(false)
    }

    fn close_slot(&mut self, kind: TokenKind) -> Option<TextToken> {
        let start = self.cursor.position();
        let slot = self.stack.pop()?;
        self.cursor.advance(1);
        self.skip_separator();

        Some(
            slot.opening
                .with_path(slot.path)
                .with_value(TextToken::structural(kind, start)),
        )
    }

    /// Skip whitespace and at most one `,` after a value.
    fn skip_separator(&mut self) {
        if self.cursor.skip_whitespace() == Some(b',') {
            self.cursor.advance_until_non_whitespace(1);
        }
    }

    fn current_path(&self) -> Option<&str> {
        self.stack.last().map(|slot| slot.path.as_str())
    }
}

impl Iterator for EntityScanner<'_> {
    type Item = TextToken;

    fn next(&mut self) -> Option<TextToken> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<TextToken> {
        EntityScanner::new(text).collect()
    }

    // ===== Basic entity tests =====

    #[test]
    fn test_empty_entity() {
        let tokens = tokens("{}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::OpenEntity);
        assert_eq!(tokens[1].kind, TokenKind::CloseEntity);
        assert_eq!(tokens[1].offset, 1);
    }

    #[test]
    fn test_string_property() {
        let tokens = tokens(r#"{ "host": "http://localhost:9200" }"#);
        let property = &tokens[1];
        assert_eq!(property.kind, TokenKind::Property);
        assert_eq!(property.text(), "host");
        assert_eq!(property.offset, 3);
        assert_eq!(property.path.as_deref(), Some("host"));
        assert_eq!(property.value_text(), Some("http://localhost:9200"));
        assert!(property.value.as_ref().unwrap().quoted);
    }

    #[test]
    fn test_equals_separator() {
        let tokens = tokens(r#"{ "host"= "x" }"#);
        assert_eq!(tokens[1].value_text(), Some("x"));
    }

    #[test]
    fn test_bare_values() {
        let tokens = tokens(r#"{"a": 56, "b": true, "c": null}"#);
        let values: Vec<_> = tokens.iter().filter_map(|t| t.value_text()).collect();
        assert_eq!(values, vec!["56", "true", "null"]);
        assert!(!tokens[1].value.as_ref().unwrap().quoted);
    }

    #[test]
    fn test_multiple_entities_with_comment() {
        let tokens = tokens("{\"a\": 1}\n/* second */\n{\"b\": 2}");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpenEntity,
                TokenKind::Property,
                TokenKind::CloseEntity,
                TokenKind::Comment,
                TokenKind::OpenEntity,
                TokenKind::Property,
                TokenKind::CloseEntity,
            ]
        );
        assert_eq!(tokens[3].text(), "/* second */");
    }

    // ===== Nesting tests =====

    #[test]
    fn test_nested_object_paths() {
        let tokens = tokens(r#"{"lorem":{"ipsum":56}}"#);
        assert_eq!(tokens[1].path.as_deref(), Some("lorem"));
        assert_eq!(tokens[1].value_kind(), Some(TokenKind::OpenEntity));
        assert_eq!(tokens[2].path.as_deref(), Some("lorem.ipsum"));
        assert_eq!(tokens[3].path.as_deref(), Some("lorem"));
        assert_eq!(tokens[3].value_kind(), Some(TokenKind::CloseEntity));
        assert_eq!(tokens[3].offset, tokens[1].offset);
        assert_eq!(tokens[4].kind, TokenKind::CloseEntity);
    }

    #[test]
    fn test_array_elements_are_indexed() {
        let tokens = tokens(r#"{"lorem":[1,2,3]}"#);
        let paths: Vec<_> = tokens.iter().filter_map(|t| t.path.as_deref()).collect();
        assert_eq!(
            paths,
            vec!["lorem", "lorem[0]", "lorem[1]", "lorem[2]", "lorem"]
        );
        assert_eq!(tokens[3].value_text(), Some("2"));
        assert_eq!(tokens[5].value_kind(), Some(TokenKind::CloseArray));
    }

    #[test]
    fn test_array_of_objects() {
        let tokens = tokens(r#"{"lorem":[{"donec":16},{"donec":34}]}"#);
        let donec: Vec<_> = tokens
            .iter()
            .filter(|t| t.text() == "donec")
            .map(|t| (t.path.clone().unwrap(), t.value_text().unwrap().to_string()))
            .collect();
        assert_eq!(
            donec,
            vec![
                ("lorem[0].donec".to_string(), "16".to_string()),
                ("lorem[1].donec".to_string(), "34".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_array() {
        let tokens = tokens(r#"{"tags": [], "n": 1}"#);
        assert_eq!(tokens[1].value_kind(), Some(TokenKind::OpenArray));
        assert_eq!(tokens[2].value_kind(), Some(TokenKind::CloseArray));
        assert_eq!(tokens[3].path.as_deref(), Some("n"));
    }

    #[test]
    fn test_nested_arrays() {
        let tokens = tokens(r#"{"m": [[1], [2, 3]]}"#);
        let paths: Vec<_> = tokens
            .iter()
            .filter(|t| t.value_kind() == Some(TokenKind::PropertyValue))
            .map(|t| t.path.clone().unwrap())
            .collect();
        assert_eq!(paths, vec!["m[0][0]", "m[1][0]", "m[1][1]"]);
    }

    #[test]
    fn test_array_of_strings_with_spaces() {
        let tokens = tokens(r#"{"p": [ "a*" , "b*" ]}"#);
        let values: Vec<_> = tokens
            .iter()
            .filter(|t| t.value_kind() == Some(TokenKind::PropertyValue))
            .map(|t| t.value_text().unwrap())
            .collect();
        assert_eq!(values, vec!["a*", "b*"]);
    }

    // ===== Scan until tests =====

    #[test]
    fn test_scan_until_path_object() {
        let mut scanner = EntityScanner::new(r#"{"lorem":{"ipsum":56}}"#);
        let token = scanner.scan_until_path("lorem/ipsum").unwrap();
        assert_eq!(token.value_kind(), Some(TokenKind::PropertyValue));
        assert_eq!(token.value_text(), Some("56"));
    }

    #[test]
    fn test_scan_until_path_array() {
        let mut scanner = EntityScanner::new(r#"{"lorem":[1,2,3]}"#);
        let token = scanner.scan_until_path("lorem[1]").unwrap();
        assert_eq!(token.value_text(), Some("2"));
    }

    #[test]
    fn test_scan_until_path_array_of_objects() {
        let mut scanner = EntityScanner::new(r#"{"lorem":[{"donec":16},{"donec":34}]}"#);
        let token = scanner.scan_until_path("lorem[1]/donec").unwrap();
        assert_eq!(token.value_text(), Some("34"));
    }

    #[test]
    fn test_scan_until_path_missing() {
        let mut scanner = EntityScanner::new(r#"{"lorem": 1}"#);
        assert!(scanner.scan_until_path("ipsum").is_none());
    }

    #[test]
    fn test_scan_until_state() {
        let mut scanner = EntityScanner::new(r#"{ "host"= "http://localhost:9200" }"#);
        let token = scanner.scan_until(EntityState::WithinEntity).unwrap();
        assert_eq!(token.text(), "host");
    }

    #[test]
    fn test_scan_until_position_returns_last_on_truncation() {
        let text = r#"{"query": {  "#;
        let mut scanner = EntityScanner::new(text);
        let token = scanner.scan_until_position(text.len()).unwrap();
        assert_eq!(token.text(), "query");
        assert_eq!(token.value_kind(), Some(TokenKind::OpenEntity));
    }

    // ===== Calibration tests =====

    #[test]
    fn test_calibrate_inside_entity() {
        let mut scanner = EntityScanner::at(r#"{ "host"= "http://localhost:9200" }"#, 2);
        let token = scanner.scan_until(EntityState::WithinContent).unwrap();
        assert_eq!(token.kind, TokenKind::CloseEntity);
    }

    #[test]
    fn test_calibrate_skips_closed_siblings() {
        let text = r#"{"a": {"b": 1}, "c": 2}"#;
        let offset = text.find("\"c\"").unwrap();
        let mut scanner = EntityScanner::at(text, offset);
        scanner.calibrate();
        assert_eq!(scanner.state(), EntityState::AfterOpenEntity);
        assert_eq!(scanner.offset(), 0);
    }

    #[test]
    fn test_calibrate_on_open_brace() {
        let text = r#"{"a": 1} {"b": 2}"#;
        let mut scanner = EntityScanner::at(text, 9);
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::OpenEntity);
        assert_eq!(scanner.next_token().unwrap().text(), "b");
    }

    #[test]
    fn test_calibrate_outside_entities() {
        let text = r#"{"a": 1} x"#;
        let mut scanner = EntityScanner::at(text, 9);
        scanner.calibrate();
        assert_eq!(scanner.state(), EntityState::WithinContent);
        assert!(scanner.next_token().is_none());
    }

    // ===== Recovery tests =====

    #[test]
    fn test_unterminated_string_value() {
        let tokens = tokens(r#"{"a": "open"#);
        let value = tokens[1].value.as_ref().unwrap();
        assert_eq!(value.text(), "open");
        assert!(!value.is_valid);
    }

    #[test]
    fn test_property_without_value() {
        let tokens = tokens(r#"{"qu" }"#);
        assert_eq!(tokens[1].text(), "qu");
        assert!(tokens[1].value.is_none());
        assert_eq!(tokens[2].kind, TokenKind::CloseEntity);
    }

    #[test]
    fn test_stray_comma_makes_progress() {
        let tokens = tokens(r#"{"a": , "b": 1}"#);
        assert!(tokens.iter().any(|t| t.text() == "b"));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::CloseEntity);
    }

    #[test]
    fn test_depth_limit_skips_nested_value() {
        let text = r#"{"a": {"b": {"c": 1}}, "d": 2}"#;
        let tokens: Vec<_> = EntityScanner::new(text).with_max_depth(1).collect();
        let b = tokens.iter().find(|t| t.text() == "b").unwrap();
        let value = b.value.as_ref().unwrap();
        assert_eq!(value.kind, TokenKind::PropertyValue);
        assert_eq!(value.text(), r#"{"c": 1}"#);
        assert!(!value.is_valid);
        assert!(tokens.iter().any(|t| t.path.as_deref() == Some("d")));
    }

    #[test]
    fn test_recording_keeps_tokens() {
        let mut scanner = EntityScanner::new(r#"{"a": 1}"#).recording();
        while scanner.next_token().is_some() {}
        assert_eq!(scanner.scanned().len(), 3);
    }
}
