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

//! Environment document builder.

use super::scan_entities;
use crate::entity::Environment;
use crate::error::EsqResult;
use crate::lex::TextToken;
use crate::options::ParseOptions;
use serde::Serialize;
use tracing::warn;

/// Environments and comments of an environment document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentDocument {
    pub environments: Vec<Environment>,
    #[serde(skip)]
    pub comments: Vec<TextToken>,
}

impl EnvironmentDocument {
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, &ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: &ParseOptions) -> Self {
        Self::try_parse(text, options).unwrap_or_else(|err| {
            warn!(error = %err, "environment document parse failed");
            Self::default()
        })
    }

    pub fn try_parse(text: &str, options: &ParseOptions) -> EsqResult<Self> {
        let scanned = scan_entities(text, options, |_, _, _| Environment::new())?;
        Ok(Self {
            environments: scanned.entities,
            comments: scanned.comments,
        })
    }

    /// Environment with the given name.
    pub fn find(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.id() == Some(name))
    }
}
