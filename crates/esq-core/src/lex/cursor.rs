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

//! Bidirectional cursor over an immutable source string.
//!
//! Every scanner is built on [`TextCursor`]. The cursor never copies or
//! reverses its input: each [`Pattern`] knows how to search forward from a
//! position and backward from a position, so backward searches cost the same
//! as forward ones.
//!
//! Positions are byte offsets. Patterns only ever match ASCII, so every match
//! boundary is also a `char` boundary and slicing the source is safe; the
//! slicing helpers still go through `str::get` and fall back to `""`.
//!
//! # Examples
//!
//! ```
//! use esq_core::lex::{Pattern, TextCursor};
//!
//! let mut cursor = TextCursor::new("GET /_search { }");
//! let found = cursor.advance_until(Pattern::Byte(b'{')).unwrap();
//! assert_eq!(found.start, 14);
//! assert_eq!(cursor.position(), 14);
//!
//! let back = cursor.retreat_until(Pattern::Byte(b'/')).unwrap();
//! assert_eq!(back.start, 4);
//! ```

use memchr::{memchr, memchr2, memchr3, memmem, memrchr, memrchr2, memrchr3};

/// HTTP methods recognised at the start of a query statement.
pub const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "HEAD"];

/// A search pattern understood by [`TextCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<'p> {
    /// A single byte.
    Byte(u8),
    /// Any byte of the set.
    AnyOf(&'p [u8]),
    /// An exact literal.
    Literal(&'p str),
    /// Any of the words, case-insensitive, not preceded by an alphanumeric
    /// byte and followed by whitespace or end of input.
    Keyword(&'p [&'p str]),
    /// Like [`Pattern::Keyword`], but the word must also open a statement:
    /// only spaces or tabs may separate it from the start of its line, the
    /// start of input, a preceding `}` or `)`, or the end of a comment.
    LeadingKeyword(&'p [&'p str]),
    /// Any non-whitespace byte.
    NonWhitespace,
}

/// A successful pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
    /// The matched text.
    pub text: &'a str,
    /// Index of the pattern that matched (for the `*_to_closest` searches).
    pub index: usize,
}

/// Text consumed by [`TextCursor::take_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taken<'a> {
    /// The consumed text.
    pub text: &'a str,
    /// Offset where the consumed text starts.
    pub start: usize,
    /// Whether the terminating pattern was found before end of input.
    pub terminated: bool,
}

/// Returns true for the ASCII whitespace bytes the grammar skips.
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

impl<'p> Pattern<'p> {
    /// First match starting at or after `from`.
    pub fn find(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let bytes = text.as_bytes();
        if from > bytes.len() {
            return None;
        }
        let hay = &bytes[from..];

        match *self {
            Pattern::Byte(b) => memchr(b, hay).map(|i| (from + i, from + i + 1)),
            Pattern::AnyOf(set) => {
                let found = match set {
                    [a] => memchr(*a, hay),
                    [a, b] => memchr2(*a, *b, hay),
                    [a, b, c] => memchr3(*a, *b, *c, hay),
                    _ => hay.iter().position(|b| set.contains(b)),
                };
                found.map(|i| (from + i, from + i + 1))
            }
            Pattern::Literal(lit) if lit.is_empty() => None,
            Pattern::Literal(lit) => {
                memmem::find(hay, lit.as_bytes()).map(|i| (from + i, from + i + lit.len()))
            }
            Pattern::NonWhitespace => hay
                .iter()
                .position(|b| !is_whitespace(*b))
                .map(|i| (from + i, from + i + 1)),
            Pattern::Keyword(words) => (from..bytes.len())
                .find_map(|i| keyword_at(bytes, i, words, false).map(|len| (i, i + len))),
            Pattern::LeadingKeyword(words) => (from..bytes.len())
                .find_map(|i| keyword_at(bytes, i, words, true).map(|len| (i, i + len))),
        }
    }

    /// Last match lying entirely before `before`.
    pub fn rfind(&self, text: &str, before: usize) -> Option<(usize, usize)> {
        let bytes = text.as_bytes();
        let before = before.min(bytes.len());
        let hay = &bytes[..before];

        match *self {
            Pattern::Byte(b) => memrchr(b, hay).map(|i| (i, i + 1)),
            Pattern::AnyOf(set) => {
                let found = match set {
                    [a] => memrchr(*a, hay),
                    [a, b] => memrchr2(*a, *b, hay),
                    [a, b, c] => memrchr3(*a, *b, *c, hay),
                    _ => hay.iter().rposition(|b| set.contains(b)),
                };
                found.map(|i| (i, i + 1))
            }
            Pattern::Literal(lit) if lit.is_empty() => None,
            Pattern::Literal(lit) => {
                memmem::rfind(hay, lit.as_bytes()).map(|i| (i, i + lit.len()))
            }
            Pattern::NonWhitespace => hay
                .iter()
                .rposition(|b| !is_whitespace(*b))
                .map(|i| (i, i + 1)),
            Pattern::Keyword(words) => (0..before).rev().find_map(|i| {
                keyword_at(bytes, i, words, false)
                    .filter(|len| i + len <= before)
                    .map(|len| (i, i + len))
            }),
            Pattern::LeadingKeyword(words) => (0..before).rev().find_map(|i| {
                keyword_at(bytes, i, words, true)
                    .filter(|len| i + len <= before)
                    .map(|len| (i, i + len))
            }),
        }
    }
}

/// Length of the keyword starting at `at`, if one does.
fn keyword_at(bytes: &[u8], at: usize, words: &[&str], leading: bool) -> Option<usize> {
    if at > 0 && bytes[at - 1].is_ascii_alphanumeric() {
        return None;
    }

    let len = words.iter().find_map(|word| {
        let end = at + word.len();
        let candidate = bytes.get(at..end)?;
        let followed = bytes.get(end).map_or(true, |b| is_whitespace(*b));
        (followed && candidate.eq_ignore_ascii_case(word.as_bytes())).then_some(word.len())
    })?;

    if leading && !opens_statement(bytes, at) {
        return None;
    }

    Some(len)
}

fn opens_statement(bytes: &[u8], at: usize) -> bool {
    let mut i = at;
    while i > 0 {
        match bytes[i - 1] {
            b' ' | b'\t' => i -= 1,
            b'\n' | b'\r' | b'}' | b')' => return true,
            // end of a block comment
            b'/' => return i >= 2 && bytes[i - 2] == b'*',
            _ => return false,
        }
    }
    true
}

fn char_floor(text: &str, position: usize) -> usize {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }
    position
}

/// A position-addressable view over an immutable string.
#[derive(Debug, Clone)]
pub struct TextCursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> TextCursor<'a> {
    /// Create a cursor at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    /// Create a cursor at `position`, clamped to the input length and moved
    /// back onto a character boundary.
    pub fn at(text: &'a str, position: usize) -> Self {
        Self {
            text,
            position: char_floor(text, position),
        }
    }

    #[inline]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to `position`, clamped to the input length and moved back onto a
    /// character boundary.
    pub fn set_position(&mut self, position: usize) {
        self.position = char_floor(self.text, position);
    }

    /// True once the cursor has reached the end of input.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.position >= self.text.len()
    }

    /// Byte under the cursor.
    #[inline]
    pub fn current(&self) -> Option<u8> {
        self.byte_at(self.position)
    }

    /// Byte at an arbitrary position.
    #[inline]
    pub fn byte_at(&self, position: usize) -> Option<u8> {
        self.text.as_bytes().get(position).copied()
    }

    /// Byte following the cursor.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.byte_at(self.position + 1)
    }

    /// Move forward `n` bytes, stopping at end of input.
    pub fn advance(&mut self, n: usize) {
        self.position = self.position.saturating_add(n).min(self.text.len());
    }

    /// Move backward `n` bytes, stopping at zero.
    pub fn retreat(&mut self, n: usize) {
        self.position = self.position.saturating_sub(n);
    }

    /// Move to the end of input.
    pub fn advance_to_end(&mut self) {
        self.position = self.text.len();
    }

    /// Source text between two offsets; empty when out of range.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        if start >= end {
            return "";
        }
        self.text.get(start..end.min(self.text.len())).unwrap_or("")
    }

    /// Remaining text from the cursor.
    pub fn rest(&self) -> &'a str {
        self.slice(self.position, self.text.len())
    }

    /// Advance to the first match of `pattern`.
    ///
    /// Leaves the cursor at the start of the match. Without a match the
    /// cursor moves to end of input and `None` is returned; callers treat
    /// that as "the rest of the document".
    pub fn advance_until(&mut self, pattern: Pattern<'_>) -> Option<Match<'a>> {
        match pattern.find(self.text, self.position) {
            Some((start, end)) => {
                self.position = start;
                Some(self.matched(start, end, 0))
            }
            None => {
                self.advance_to_end();
                None
            }
        }
    }

    /// Consume text up to (not including) the first match of `pattern`.
    ///
    /// The cursor ends on the terminator, or at end of input when there is
    /// none, in which case `terminated` is false.
    pub fn take_until(&mut self, pattern: Pattern<'_>) -> Taken<'a> {
        let start = self.position;
        let terminated = self.advance_until(pattern).is_some();
        Taken {
            text: self.slice(start, self.position),
            start,
            terminated,
        }
    }

    /// Retreat to the last match of `pattern` lying before the cursor.
    ///
    /// The cursor does not move when nothing matches.
    pub fn retreat_until(&mut self, pattern: Pattern<'_>) -> Option<Match<'a>> {
        let (start, end) = pattern.rfind(self.text, self.position)?;
        self.position = start;
        Some(self.matched(start, end, 0))
    }

    /// Advance to the nearest match among `patterns`.
    ///
    /// Ties go to the pattern listed first. The cursor does not move when
    /// nothing matches.
    pub fn advance_to_closest(&mut self, patterns: &[Pattern<'_>]) -> Option<Match<'a>> {
        let (index, (start, end)) = patterns
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.find(self.text, self.position).map(|m| (i, m)))
            .min_by_key(|(i, (start, _))| (*start, *i))?;
        self.position = start;
        Some(self.matched(start, end, index))
    }

    /// Retreat to the nearest match among `patterns` lying before the cursor.
    ///
    /// Ties go to the pattern listed first. The cursor does not move when
    /// nothing matches.
    pub fn retreat_to_closest(&mut self, patterns: &[Pattern<'_>]) -> Option<Match<'a>> {
        let (index, (start, end)) = patterns
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.rfind(self.text, self.position).map(|m| (i, m)))
            .max_by_key(|(i, (start, _))| (*start, std::cmp::Reverse(*i)))?;
        self.position = start;
        Some(self.matched(start, end, index))
    }

    /// Skip whitespace; returns the byte the cursor lands on.
    pub fn skip_whitespace(&mut self) -> Option<u8> {
        if self.advance_until(Pattern::NonWhitespace).is_none() {
            return None;
        }
        self.current()
    }

    /// Advance `offset` bytes, then to the next non-whitespace byte.
    pub fn advance_until_non_whitespace(&mut self, offset: usize) -> Option<u8> {
        self.advance(offset);
        self.skip_whitespace()
    }

    /// Skip spaces and tabs only, leaving line breaks in place.
    pub fn skip_inline_whitespace(&mut self) -> Option<u8> {
        while let Some(b' ' | b'\t') = self.current() {
            self.position += 1;
        }
        self.current()
    }

    /// Next non-whitespace byte and its offset, without moving.
    pub fn peek_non_whitespace(&self) -> Option<(usize, u8)> {
        Pattern::NonWhitespace
            .find(self.text, self.position)
            .map(|(start, _)| (start, self.text.as_bytes()[start]))
    }

    /// Move from a `{` to its matching `}`.
    ///
    /// String literals (with backslash escapes) are skipped so braces inside
    /// them do not count. Returns false and leaves the cursor at end of input
    /// when the object is never closed.
    pub fn advance_to_json_object_end(&mut self) -> bool {
        let bytes = self.text.as_bytes();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut i = self.position;

        while i < bytes.len() {
            let b = bytes[i];
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
            } else {
                match b {
                    b'"' => in_string = true,
                    b'{' => depth += 1,
                    b'}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            self.position = i;
                            return true;
                        }
                    }
                    _ => {}
                }
            }
            i += 1;
        }

        self.advance_to_end();
        false
    }

    /// Consume a quoted string starting at the opening `"`.
    ///
    /// Returns the content between the quotes and leaves the cursor after
    /// the closing quote. An unterminated string yields the rest of input
    /// with `terminated == false`.
    pub fn take_quoted(&mut self) -> Taken<'a> {
        let bytes = self.text.as_bytes();
        let start = (self.position + 1).min(bytes.len());
        let mut i = start;
        let mut escaped = false;

        while i < bytes.len() {
            let b = bytes[i];
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                self.position = i + 1;
                return Taken {
                    text: self.slice(start, i),
                    start,
                    terminated: true,
                };
            }
            i += 1;
        }

        self.advance_to_end();
        Taken {
            text: self.slice(start, bytes.len()),
            start,
            terminated: false,
        }
    }

    fn matched(&self, start: usize, end: usize, index: usize) -> Match<'a> {
        Match {
            start,
            end,
            text: self.slice(start, end),
            index,
        }
    }
}
