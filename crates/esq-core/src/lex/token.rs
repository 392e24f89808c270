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

//! Token model shared by both scanners.

use crate::path;
use serde::Serialize;
use std::fmt;

/// Kind tag of a [`TextToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Query statement tokens
    Comment,
    Method,
    Command,
    QueryString,
    Argument,
    ArgumentValue,
    Body,
    /// Returned by lookups when no token covers an offset.
    Empty,
    /// Umbrella kind for `Argument` and `ArgumentValue` in offset lookups.
    Input,

    // Entity tokens
    OpenEntity,
    CloseEntity,
    OpenArray,
    CloseArray,
    Property,
    PropertyValue,
}

impl TokenKind {
    /// True for tokens that open a nested object or array.
    pub fn is_open(self) -> bool {
        matches!(self, TokenKind::OpenEntity | TokenKind::OpenArray)
    }

    /// True for tokens that close a nested object or array.
    pub fn is_close(self) -> bool {
        matches!(self, TokenKind::CloseEntity | TokenKind::CloseArray)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One lexical unit with its byte range in the source.
///
/// Named slots (`"name": value`, `?name=value`, `(name=value)`) carry their
/// value as a nested token in [`TextToken::value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextToken {
    pub kind: TokenKind,
    /// Raw source slice; absent for purely structural tokens.
    pub text: Option<String>,
    pub offset: usize,
    offset_end: usize,
    /// Address of the token inside its enclosing structure.
    pub path: Option<String>,
    /// False when the token's closing counterpart was never found.
    pub is_valid: bool,
    /// True when the text was read from a quoted string.
    pub quoted: bool,
    /// Value of a named slot.
    pub value: Option<Box<TextToken>>,
}

impl TextToken {
    /// Token covering `text` starting at `offset`.
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        Self {
            kind,
            offset_end: offset + text.len(),
            text: Some(text),
            offset,
            path: None,
            is_valid: true,
            quoted: false,
            value: None,
        }
    }

    /// Structural token without text (`{`, `}`, `[`, `]`).
    pub fn structural(kind: TokenKind, offset: usize) -> Self {
        Self {
            kind,
            text: None,
            offset,
            offset_end: offset,
            path: None,
            is_valid: true,
            quoted: false,
            value: None,
        }
    }

    /// Token whose text is synthesized rather than read from the source,
    /// such as the `[2]` name of an array element. It occupies no bytes.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            offset_end: offset,
            ..Self::new(kind, text, offset)
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_value(mut self, value: TextToken) -> Self {
        self.value = Some(Box::new(value));
        self
    }

    pub fn with_validity(mut self, is_valid: bool) -> Self {
        self.is_valid = is_valid;
        self
    }

    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }

    /// End of the token's own text.
    #[inline]
    pub fn offset_end(&self) -> usize {
        self.offset_end
    }

    /// End of the token including its value.
    pub fn span_end(&self) -> usize {
        match &self.value {
            Some(value) => self.offset_end.max(value.span_end()),
            None => self.offset_end,
        }
    }

    /// True when `offset` falls within `[offset, span_end]`.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.offset && offset <= self.span_end()
    }

    /// Token text, or `""` for structural tokens.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn has_text(&self) -> bool {
        !self.text().is_empty()
    }

    /// Kind of the value token, if any.
    pub fn value_kind(&self) -> Option<TokenKind> {
        self.value.as_ref().map(|v| v.kind)
    }

    /// Text of the value token, if any.
    pub fn value_text(&self) -> Option<&str> {
        self.value.as_ref().map(|v| v.text())
    }

    /// Number of path segments; zero at top level.
    pub fn depth(&self) -> usize {
        self.path.as_deref().map_or(0, path::depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Construction tests ====================

    #[test]
    fn test_offset_end_from_text() {
        let token = TextToken::new(TokenKind::Command, "/_search", 4);
        assert_eq!(token.offset_end(), 12);
        assert!(token.has_text());
    }

    #[test]
    fn test_structural_has_empty_range() {
        let token = TextToken::structural(TokenKind::OpenEntity, 7);
        assert_eq!(token.offset_end(), 7);
        assert_eq!(token.text(), "");
        assert!(!token.has_text());
    }

    #[test]
    fn test_synthetic_has_empty_range() {
        let token = TextToken::synthetic(TokenKind::Property, "[3]", 10);
        assert_eq!(token.text(), "[3]");
        assert_eq!(token.offset_end(), 10);
    }

    // ==================== Range tests ====================

    #[test]
    fn test_span_includes_value() {
        let value = TextToken::new(TokenKind::ArgumentValue, "5", 12);
        let token = TextToken::new(TokenKind::Argument, "size", 7).with_value(value);
        assert_eq!(token.offset_end(), 11);
        assert_eq!(token.span_end(), 13);
        assert!(token.contains(13));
        assert!(!token.contains(14));
        assert!(!token.contains(6));
    }

    #[test]
    fn test_depth_from_path() {
        let token = TextToken::new(TokenKind::Property, "donec", 0).with_path("lorem[1].donec");
        assert_eq!(token.depth(), 3);
        assert_eq!(TextToken::new(TokenKind::Method, "GET", 0).depth(), 0);
    }

    #[test]
    fn test_kind_helpers() {
        assert!(TokenKind::OpenArray.is_open());
        assert!(TokenKind::CloseEntity.is_close());
        assert!(!TokenKind::PropertyValue.is_open());
        assert_eq!(TokenKind::Body.to_string(), "Body");
    }
}
