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

//! Document builders.
//!
//! A builder drives one scanner to exhaustion and routes each token to the
//! entity it belongs to. The `parse` entry points never fail: when
//! `try_parse` reports an error it is logged and an empty document is
//! returned instead.

mod environment;
mod index_template;
mod query;

pub use environment::EnvironmentDocument;
pub use index_template::IndexTemplateDocument;
pub use query::QueryDocument;

use crate::entity::Entity;
use crate::error::{EsqError, EsqResult};
use crate::lex::{EntityScanner, TextToken, TokenKind};
use crate::options::{Limits, ParseOptions};
use tracing::warn;

/// Reject documents above the size limit.
pub(crate) fn check_size(text: &str, limits: &Limits) -> EsqResult<()> {
    if text.len() > limits.max_document_size {
        return Err(EsqError::limit(format!(
            "document of {} bytes exceeds the limit of {} bytes",
            text.len(),
            limits.max_document_size
        )));
    }
    Ok(())
}

/// Counts tokens against `Limits::max_tokens`.
pub(crate) struct TokenBudget {
    remaining: usize,
}

impl TokenBudget {
    pub(crate) fn new(limits: &Limits) -> Self {
        Self {
            remaining: limits.max_tokens,
        }
    }

    /// Spend one token; false once the budget is exhausted.
    pub(crate) fn spend(&mut self, token: &TextToken) -> bool {
        if self.remaining == 0 {
            warn!(offset = token.offset, "token limit reached, document truncated");
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Entities and comments scanned from an entity document.
pub(crate) struct Scanned<E> {
    pub(crate) entities: Vec<E>,
    pub(crate) comments: Vec<TextToken>,
}

/// Build one entity per top-level `{ … }`.
///
/// `open` creates the entity for an opening token; it also sees the source
/// text so it can pick up context preceding the entity.
pub(crate) fn scan_entities<E, F>(text: &str, options: &ParseOptions, mut open: F) -> EsqResult<Scanned<E>>
where
    E: Entity,
    F: FnMut(&str, &TextToken, Option<&E>) -> E,
{
    check_size(text, &options.limits)?;

    let mut budget = TokenBudget::new(&options.limits);
    let mut scanned = Scanned {
        entities: Vec::new(),
        comments: Vec::new(),
    };

    let scanner = EntityScanner::new(text).with_max_depth(options.limits.max_nesting_depth);
    for token in scanner {
        if !budget.spend(&token) {
            break;
        }

        match token.kind {
            TokenKind::Comment => scanned.comments.push(token),
            TokenKind::OpenEntity => {
                let mut entity = open(text, &token, scanned.entities.last());
                entity.add_token(token);
                scanned.entities.push(entity);
            }
            _ => match scanned.entities.last_mut() {
                Some(entity) => entity.add_token(token),
                None => warn!(offset = token.offset, kind = %token.kind, "token outside any entity"),
            },
        }
    }

    Ok(scanned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Environment;

    // ===== Limit tests =====

    #[test]
    fn test_check_size() {
        let limits = Limits {
            max_document_size: 4,
            ..Limits::default()
        };
        assert!(check_size("1234", &limits).is_ok());
        let err = check_size("12345", &limits).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Limit);
    }

    #[test]
    fn test_token_budget_truncates() {
        let options = ParseOptions::builder().max_tokens(2).build();
        let scanned = scan_entities(r#"{"a": 1, "b": 2}"#, &options, |_, _, _| Environment::new()).unwrap();
        assert_eq!(scanned.entities.len(), 1);
        assert_eq!(scanned.entities[0].tokens().len(), 2);
    }

    #[test]
    fn test_comments_collected() {
        let scanned = scan_entities(
            "/* one */ {\"a\": 1} /* two */",
            &ParseOptions::default(),
            |_, _, _| Environment::new(),
        )
        .unwrap();
        assert_eq!(scanned.comments.len(), 2);
        assert_eq!(scanned.entities.len(), 1);
    }
}
