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

//! A target cluster definition.

use super::{top_level_scalar, Entity};
use crate::lex::TextToken;
use crate::version::Version;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// `{ "name": "...", "host": "...", "userAgent": "...", "version": "..." }`
///
/// Property names are matched case-insensitively; unknown properties are
/// kept as tokens only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Environment {
    #[serde(skip)]
    tokens: Vec<TextToken>,
    pub name: Option<String>,
    pub host: Option<String>,
    pub user_agent: Option<String>,
    pub version: Option<Version>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environments are identified by name.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_host(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// First environment of an environment document.
    pub fn parse(text: &str) -> Option<Environment> {
        crate::parse_environment_document(text)
            .environments
            .into_iter()
            .next()
    }
}

impl Entity for Environment {
    fn tokens(&self) -> &[TextToken] {
        &self.tokens
    }

    fn add_token(&mut self, token: TextToken) {
        if let Some((name, value)) = top_level_scalar(&token) {
            let text = value.text().to_string();
            match name.to_ascii_lowercase().as_str() {
                "host" => self.host = Some(text),
                "name" => self.name = Some(text),
                "useragent" | "user_agent" => self.user_agent = Some(text),
                "version" => match Version::parse(&text) {
                    Ok(version) => self.version = Some(version),
                    Err(err) => warn!(offset = value.offset, error = %err, "ignored environment version"),
                },
                _ => {}
            }
        }
        self.tokens.push(token);
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.host.as_deref().unwrap_or(""),
            self.name.as_deref().unwrap_or("")
        )
    }
}
