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

//! Entities materialized from token streams.
//!
//! Every entity owns the tokens it was built from, in source order. Its
//! span is derived from those tokens, which is what editors use to decide
//! whether a cursor is inside it.

mod configuration;
mod environment;
mod index_template;
mod query;

pub use configuration::Configuration;
pub use environment::Environment;
pub use index_template::IndexTemplate;
pub use query::Query;

use crate::lex::TextToken;

/// Common behaviour of parsed entities.
pub trait Entity {
    /// Tokens in the order they were added.
    fn tokens(&self) -> &[TextToken];

    /// Record a token and apply it to the entity's fields.
    fn add_token(&mut self, token: TextToken);

    /// Start of the entity: the smallest token offset.
    fn offset(&self) -> Option<usize> {
        self.tokens().iter().map(|t| t.offset).min()
    }

    /// End of the entity: the largest token end, values included.
    fn offset_end(&self) -> Option<usize> {
        self.tokens().iter().map(TextToken::span_end).max()
    }

    /// True when `offset` lies within `[offset, offset_end]`.
    fn contains(&self, offset: usize) -> bool {
        match (self.offset(), self.offset_end()) {
            (Some(start), Some(end)) => offset >= start && offset <= end,
            _ => false,
        }
    }

    /// Last token whose span contains `offset`.
    fn token_at(&self, offset: usize) -> Option<&TextToken> {
        self.tokens().iter().rev().find(|t| t.contains(offset))
    }
}

/// Top-level property name of an entity token, if it has a scalar value.
pub(crate) fn top_level_scalar(token: &TextToken) -> Option<(&str, &TextToken)> {
    let value = token.value.as_deref()?;
    if token.depth() != 1 || value.kind != crate::lex::TokenKind::PropertyValue {
        return None;
    }
    Some((token.text(), value))
}
