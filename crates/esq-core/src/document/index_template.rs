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

//! Index template document builder.

use super::scan_entities;
use crate::entity::{Entity, IndexTemplate};
use crate::error::EsqResult;
use crate::lex::{Pattern, TextCursor, TextToken};
use crate::options::ParseOptions;
use serde::Serialize;
use tracing::warn;

const TEMPLATE_PREFIX: &str = "_template/";

/// Index templates and comments of a template document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexTemplateDocument {
    pub index_templates: Vec<IndexTemplate>,
    #[serde(skip)]
    pub comments: Vec<TextToken>,
}

impl IndexTemplateDocument {
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, &ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: &ParseOptions) -> Self {
        Self::try_parse(text, options).unwrap_or_else(|err| {
            warn!(error = %err, "index template document parse failed");
            Self::default()
        })
    }

    pub fn try_parse(text: &str, options: &ParseOptions) -> EsqResult<Self> {
        let scanned = scan_entities(text, options, |text, open, previous| {
            let floor = previous.and_then(Entity::offset_end).unwrap_or(0);
            let mut template = IndexTemplate::new();
            template.name = template_name(text, floor, open.offset);
            template
        })?;

        Ok(Self {
            index_templates: scanned.entities,
            comments: scanned.comments,
        })
    }
}

/// Name from a `…/_template/<name>` reference between `floor` and `offset`.
fn template_name(text: &str, floor: usize, offset: usize) -> Option<String> {
    let mut cursor = TextCursor::at(text, offset);
    let found = cursor.retreat_until(Pattern::Literal(TEMPLATE_PREFIX))?;
    if found.start < floor {
        return None;
    }

    cursor.set_position(found.end);
    let name = cursor.take_until(Pattern::AnyOf(b" \t\r\n?{(/"));
    (!name.text.is_empty()).then(|| name.text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    // ===== Parse tests =====

    #[test]
    fn test_one_template() {
        let document = IndexTemplateDocument::parse(
            r#"{ "index_pattern": ["bestBet*", "lorem", "ipsum*"], "settings": { "number_of_shards": 5 }}"#,
        );
        assert_eq!(document.index_templates.len(), 1);
        let template = &document.index_templates[0];
        assert_eq!(template.index_patterns().len(), 3);
        assert_eq!(
            template.values().get_path("settings.number_of_shards").and_then(Value::as_i64),
            Some(5)
        );
        assert!(template.name.is_none());
    }

    #[test]
    fn test_names_from_preceding_requests() {
        let text = "PUT /_template/logs\n{ \"index_patterns\": [\"logs-*\"] }\n\n{ \"order\": 1 }\nPUT _template/metrics?pretty\n{ \"order\": 2 }";
        let document = IndexTemplateDocument::parse(text);
        let names: Vec<_> = document
            .index_templates
            .iter()
            .map(|t| t.name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("logs"), None, Some("metrics")]);
    }
}
