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

//! Scanner for query documents.
//!
//! A query document is an optional configuration block followed by
//! statements:
//!
//! ```text
//! { "params": { "index": "logs" } }
//!
//! /* count documents */
//! GET /logs/_search?size=10&pretty(timeout:5, name="daily")
//! { "query": { "match_all": {} } }
//! ```
//!
//! The scanner is a state machine over the statement grammar. Bodies are
//! emitted as a single [`TokenKind::Body`] token; their contents are the
//! entity grammar and are tokenized separately by
//! [`EntityScanner`](super::EntityScanner) when needed. The configuration
//! block is delegated to an embedded `EntityScanner` as it is scanned.
//!
//! # Calibration
//!
//! A scanner created with [`QueryScanner::at`] calibrates on its first
//! scan. It looks backward for the nearest statement boundary (`}`, `)`, a
//! method keyword or ` /`), finds the start of the statement around it, and
//! replays that statement up to the offset. The scanner then resumes at the
//! statement start, or right after the statement if it was already complete
//! before the offset. The token stream from a calibrated scanner is a suffix
//! of the stream a scanner starting at zero produces.

use super::cursor::{Pattern, TextCursor, METHODS};
use super::entity_scanner::EntityScanner;
use super::token::{TextToken, TokenKind};
use tracing::debug;

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Position not yet reconciled with the grammar; see [`QueryScanner::calibrate`].
    Unknown,
    /// Between statements.
    WithinContent,
    /// Inside the leading configuration block.
    WithinConfiguration,
    /// After a method keyword.
    AfterMethod,
    /// After a command path.
    AfterCommand,
    /// On a `?` or `&` that starts a query-string parameter.
    WithinQueryString,
    /// After the query string, with an argument list or body following.
    AfterQueryString,
    /// On a `(` or `,` that starts an argument.
    WithinInput,
    /// After an argument list, with a body following.
    AfterInput,
    /// After a complete body.
    AfterBody,
}

/// Bytes that end a command path.
const COMMAND_END: &[u8] = b"?({ \t\r\n";
/// Bytes that end a query-string name.
const QUERY_STRING_NAME_END: &[u8] = b"=&({ \t\r\n";
/// Bytes that end a bare query-string value.
const QUERY_STRING_VALUE_END: &[u8] = b"&({)\r\n";
/// Bytes that end an argument name.
const ARGUMENT_NAME_END: &[u8] = b":=,) \t\r\n";
/// Bytes that end a bare argument value.
const ARGUMENT_VALUE_END: &[u8] = b",) \t\r\n";

/// Tokenizer for query documents.
#[derive(Debug, Clone)]
pub struct QueryScanner<'a> {
    cursor: TextCursor<'a>,
    state: QueryState,
    configuration: Option<EntityScanner<'a>>,
    max_depth: usize,
}

impl<'a> QueryScanner<'a> {
    /// Scanner positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            cursor: TextCursor::new(text),
            state: QueryState::WithinContent,
            configuration: None,
            max_depth: usize::MAX,
        }
    }

    /// Scanner positioned at `offset`; calibrates on the first scan.
    pub fn at(text: &'a str, offset: usize) -> Self {
        let mut scanner = Self::new(text);
        scanner.cursor.set_position(offset);
        if offset > 0 {
            scanner.state = QueryState::Unknown;
        }
        scanner
    }

    /// Limit nesting inside the configuration block.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<TextToken> {
        if self.state == QueryState::Unknown {
            self.calibrate();
        }

        loop {
            let before = (self.cursor.position(), self.state);

            let token = match self.state {
                QueryState::WithinContent => self.scan_content(),
                QueryState::WithinConfiguration => self.scan_configuration(),
                QueryState::AfterMethod => self.scan_command(),
                QueryState::WithinQueryString => self.scan_query_string(),
                QueryState::WithinInput => self.scan_argument(),
                QueryState::AfterCommand
                | QueryState::AfterQueryString
                | QueryState::AfterInput
                | QueryState::AfterBody => self.scan_continuation(),
                QueryState::Unknown => None,
            };

            if token.is_some() {
                return token;
            }
            if (self.cursor.position(), self.state) == before {
                return None;
            }
        }
    }

    /// Scan until the scanner enters `state`; returns the token produced by
    /// that transition.
    pub fn scan_until(&mut self, state: QueryState) -> Option<TextToken> {
        loop {
            let token = self.next_token();
            if self.state == state {
                return token;
            }
            token.as_ref()?;
        }
    }

    /// Reconcile the state with the current position.
    pub fn calibrate(&mut self) {
        let offset = self.cursor.position();
        self.configuration = None;

        let boundary = self.cursor.retreat_to_closest(&[
            Pattern::Byte(b'}'),
            Pattern::Byte(b')'),
            Pattern::LeadingKeyword(METHODS),
            Pattern::Literal(" /"),
        ]);

        let statement = match boundary {
            None => None,
            Some(found) if found.index == 2 => Some(found.start),
            Some(_) => self
                .cursor
                .retreat_until(Pattern::LeadingKeyword(METHODS))
                .map(|found| found.start),
        };

        let resume = self.replay(statement.unwrap_or(0), offset);
        debug!(offset, resume, "calibrated query scanner");

        self.cursor.set_position(resume);
        self.state = QueryState::WithinContent;
    }

    /// Scan from a statement start up to `offset` and return the last point
    /// at or before `offset` where a scan can restart between statements.
    ///
    /// A statement only counts as finished before `offset` when the scanner
    /// left it strictly before `offset`, or when it ended with a closed body.
    /// After a body the statement is finished only if no further body
    /// follows.
    fn replay(&self, start: usize, offset: usize) -> usize {
        let mut replayed = QueryScanner {
            cursor: TextCursor::at(self.cursor.text(), start),
            state: QueryState::WithinContent,
            configuration: None,
            max_depth: self.max_depth,
        };
        let mut resume = replayed.offset();
        let mut closed_body = false;

        loop {
            let token = replayed.next_token();
            if let Some(token) = &token {
                closed_body = token.kind == TokenKind::Body && token.is_valid;
            }

            let position = replayed.offset();
            let between = match replayed.state {
                QueryState::WithinContent => true,
                QueryState::AfterBody => !matches!(replayed.cursor.peek_non_whitespace(), Some((_, b'{'))),
                _ => false,
            };
            if between
                && position <= offset
                && (position < offset || closed_body)
            {
                resume = position;
            }

            if token.is_none() || position > offset {
                return resume;
            }
        }
    }

    // ==================== Content ====================

    fn scan_content(&mut self) -> Option<TextToken> {
        let first = self.cursor.skip_whitespace()?;

        if first == b'{' {
            let position = self.cursor.position();
            self.configuration =
                Some(EntityScanner::at(self.cursor.text(), position).with_max_depth(self.max_depth));
            self.state = QueryState::WithinConfiguration;
            return None;
        }

        let start = self.cursor.position();
        let found = self
            .cursor
            .advance_to_closest(&[Pattern::Keyword(METHODS), Pattern::Literal("/*")]);

        let Some(found) = found else {
            debug!(start, "no statement in remaining text");
            self.cursor.advance_to_end();
            return None;
        };

        if found.start > start {
            debug!(start, skipped = found.start - start, "skipped stray text");
        }

        if found.index == 1 {
            return Some(self.scan_comment());
        }

        self.cursor.set_position(found.end);
        self.cursor.skip_whitespace();
        self.state = QueryState::AfterMethod;
        Some(TextToken::new(TokenKind::Method, found.text, found.start))
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

    fn scan_configuration(&mut self) -> Option<TextToken> {
        let Some(scanner) = self.configuration.as_mut() else {
            self.state = QueryState::WithinContent;
            return None;
        };

        match scanner.next_token() {
            Some(token) => {
                if token.kind == TokenKind::CloseEntity {
                    let position = scanner.offset();
                    self.cursor.set_position(position);
                    self.configuration = None;
                    self.state = QueryState::WithinContent;
                }
                Some(token)
            }
            None => {
                self.cursor.advance_to_end();
                self.configuration = None;
                self.state = QueryState::WithinContent;
                None
            }
        }
    }

    // ==================== Statement ====================

    fn scan_command(&mut self) -> Option<TextToken> {
        let taken = self.cursor.take_until(Pattern::AnyOf(COMMAND_END));

        if taken.text.is_empty() {
            self.state = QueryState::AfterCommand;
            return None;
        }

        let end = self.cursor.position();
        self.state = match self.cursor.skip_whitespace() {
            Some(b'?' | b'(' | b'{') | None => QueryState::AfterCommand,
            Some(_) if self.cursor.position() > end => QueryState::WithinContent,
            Some(_) => QueryState::AfterCommand,
        };

        Some(TextToken::new(TokenKind::Command, taken.text, taken.start))
    }

    /// Decide what follows a command, query string, argument list or body.
    fn scan_continuation(&mut self) -> Option<TextToken> {
        let next = self.cursor.skip_whitespace();

        self.state = match (self.state, next) {
            (QueryState::AfterCommand, Some(b'?')) => QueryState::WithinQueryString,
            (QueryState::AfterCommand | QueryState::AfterQueryString, Some(b'(')) => {
                QueryState::WithinInput
            }
            (_, Some(b'{')) => return Some(self.scan_body()),
            _ => QueryState::WithinContent,
        };

        None
    }

    fn scan_body(&mut self) -> TextToken {
        let start = self.cursor.position();

        if self.cursor.advance_to_json_object_end() {
            let end = self.cursor.position() + 1;
            self.cursor.set_position(end);
            self.state = QueryState::AfterBody;
            TextToken::new(TokenKind::Body, self.cursor.slice(start, end), start)
        } else {
            self.state = QueryState::WithinContent;
            TextToken::new(TokenKind::Body, self.cursor.slice(start, self.cursor.len()), start)
                .with_validity(false)
        }
    }

    fn scan_query_string(&mut self) -> Option<TextToken> {
        match self.cursor.current() {
            Some(b'?' | b'&') => self.cursor.advance(1),
            _ => {
                self.state = QueryState::WithinContent;
                return None;
            }
        }

        let name = self.cursor.take_until(Pattern::AnyOf(QUERY_STRING_NAME_END));
        let mut token = TextToken::new(TokenKind::QueryString, name.text, name.start);

        if self.cursor.current() == Some(b'=') {
            self.cursor.advance(1);
            if let Some(value) = self.scan_delimited_value(QUERY_STRING_VALUE_END) {
                token = token.with_value(value);
            }
        }

        self.state = match self.cursor.skip_whitespace() {
            Some(b'&') => QueryState::WithinQueryString,
            Some(b'(' | b'{') => QueryState::AfterQueryString,
            _ => QueryState::WithinContent,
        };

        Some(token)
    }

    fn scan_argument(&mut self) -> Option<TextToken> {
        match self.cursor.current() {
            Some(b'(' | b',') => self.cursor.advance(1),
            _ => {
                self.state = QueryState::WithinContent;
                return None;
            }
        }

        match self.cursor.skip_whitespace() {
            None => {
                self.state = QueryState::WithinContent;
                return None;
            }
            Some(b')') => {
                self.cursor.advance(1);
                self.state = self.after_input();
                return None;
            }
            Some(_) => {}
        }

        let name = self.cursor.take_until(Pattern::AnyOf(ARGUMENT_NAME_END));
        let mut token = TextToken::new(TokenKind::Argument, name.text, name.start);

        if let Some(b':' | b'=') = self.cursor.skip_whitespace() {
            self.cursor.advance_until_non_whitespace(1);
            if let Some(value) = self.scan_delimited_value(ARGUMENT_VALUE_END) {
                token = token.with_value(value);
            }
        }

        self.state = match self.cursor.skip_whitespace() {
            Some(b',') => QueryState::WithinInput,
            Some(b')') => {
                self.cursor.advance(1);
                self.after_input()
            }
            _ => QueryState::WithinContent,
        };

        Some(token)
    }

    fn after_input(&mut self) -> QueryState {
        match self.cursor.skip_whitespace() {
            Some(b'{') => QueryState::AfterInput,
            _ => QueryState::WithinContent,
        }
    }

    /// Read a quoted value up to its unescaped closing `"`, or a bare value
    /// up to one of `delimiters`.
    ///
    /// Query-string and argument values share this routine; they differ only
    /// in their delimiter sets.
    fn scan_delimited_value(&mut self, delimiters: &[u8]) -> Option<TextToken> {
        match self.cursor.current()? {
            b'"' => {
                let text = self.cursor.take_quoted();
                Some(
                    TextToken::new(TokenKind::ArgumentValue, text.text, text.start)
                        .quoted()
                        .with_validity(text.terminated),
                )
            }
            _ => {
                let text = self.cursor.take_until(Pattern::AnyOf(delimiters));
                Some(TextToken::new(
                    TokenKind::ArgumentValue,
                    text.text.trim_end(),
                    text.start,
                ))
            }
        }
    }
}

impl Iterator for QueryScanner<'_> {
    type Item = TextToken;

    fn next(&mut self) -> Option<TextToken> {
        self.next_token()
    }
}
