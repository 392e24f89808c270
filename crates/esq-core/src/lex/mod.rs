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

//! Lexical analysis for query and entity documents.
//!
//! # Module Structure
//!
//! - [`cursor`] - Bidirectional cursor over the source text with pattern search
//! - [`token`] - Token kinds and the [`TextToken`] model
//! - [`entity_scanner`] - Tokenizer for the JSON-like entity grammar
//! - [`query_scanner`] - Tokenizer for query statements
//!
//! # Examples
//!
//! ## Query statements
//!
//! ```
//! use esq_core::lex::{QueryScanner, TokenKind};
//!
//! let kinds: Vec<TokenKind> = QueryScanner::new("GET /logs/_search?size=5\n{}")
//!     .map(|token| token.kind)
//!     .collect();
//!
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::Method, TokenKind::Command, TokenKind::QueryString, TokenKind::Body]
//! );
//! ```
//!
//! ## Entity paths
//!
//! ```
//! use esq_core::lex::EntityScanner;
//!
//! let mut scanner = EntityScanner::new(r#"{"lorem":[{"donec":16},{"donec":34}]}"#);
//! let token = scanner.scan_until_path("lorem[1]/donec").unwrap();
//! assert_eq!(token.value_text(), Some("34"));
//! ```
//!
//! ## Resuming mid-document
//!
//! ```
//! use esq_core::lex::{QueryScanner, QueryState};
//!
//! let text = "GET /a\n{}\nPOST /b/_doc";
//! let mut scanner = QueryScanner::at(text, text.len());
//! let command = scanner.scan_until(QueryState::AfterCommand).unwrap();
//! assert_eq!(command.text(), "/b/_doc");
//! ```

pub mod cursor;
pub mod entity_scanner;
pub mod query_scanner;
pub mod token;

pub use cursor::{is_whitespace, Match, Pattern, Taken, TextCursor, METHODS};
pub use entity_scanner::{EntityScanner, EntityState};
pub use query_scanner::{QueryScanner, QueryState};
pub use token::{TextToken, TokenKind};
