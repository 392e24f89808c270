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

//! Scanners, token model and document builders for Elasticsearch query
//! documents.
//!
//! Three document formats share one lexical layer:
//!
//! - **Query documents**: an optional configuration block followed by
//!   `METHOD /command?options(arguments)` statements with JSON bodies.
//! - **Environment documents**: one `{ … }` entity per target cluster.
//! - **Index template documents**: one `{ … }` entity per template.
//!
//! # Lexical Analysis
//!
//! The [`lex`] module provides both scanners. They can start at any offset
//! and calibrate backward to a consistent state, so editors can tokenize
//! just the neighbourhood of the cursor.
//!
//! # Examples
//!
//! ```
//! use esq_core::{parse_query_document, Entity};
//!
//! let document = parse_query_document("GET /_cat/indices");
//! let query = &document.queries[0];
//! assert_eq!(query.method(), Some("GET"));
//! assert_eq!(query.command(), Some("/_cat/indices"));
//! assert!(!query.has_body());
//! assert_eq!(query.tokens().len(), 2);
//! ```

pub mod document;
pub mod entity;
mod error;
pub mod lex;
mod options;
pub mod path;
mod value;
mod version;

pub use document::{EnvironmentDocument, IndexTemplateDocument, QueryDocument};
pub use entity::{Configuration, Entity, Environment, IndexTemplate, Query};
pub use error::{ErrorKind, EsqError, EsqResult};
pub use lex::{TextToken, TokenKind};
pub use options::{Limits, ParseOptions, ParseOptionsBuilder};
pub use value::Value;
pub use version::Version;

/// Parse a query document with default options.
pub fn parse_query_document(text: &str) -> QueryDocument {
    QueryDocument::parse(text)
}

/// Parse an environment document with default options.
pub fn parse_environment_document(text: &str) -> EnvironmentDocument {
    EnvironmentDocument::parse(text)
}

/// Parse an index template document with default options.
pub fn parse_index_template_document(text: &str) -> IndexTemplateDocument {
    IndexTemplateDocument::parse(text)
}
