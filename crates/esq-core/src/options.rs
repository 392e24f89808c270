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

//! Limits and options for scanning and document building.

/// Configurable resource limits.
///
/// Documents are rescanned on every keystroke by interactive callers, so
/// these bound the work a single pathological document can cause.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum document size in bytes (default: 64MB).
    pub max_document_size: usize,
    /// Maximum object/array nesting inside an entity body (default: 128).
    pub max_nesting_depth: usize,
    /// Maximum number of tokens produced for one document (default: 1M).
    pub max_tokens: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_size: 64 * 1024 * 1024, // 64MB
            max_nesting_depth: 128,
            max_tokens: 1_000_000,
        }
    }
}

impl Limits {
    /// Create limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_document_size: usize::MAX,
            max_nesting_depth: usize::MAX,
            max_tokens: usize::MAX,
        }
    }
}

/// Options controlling how documents are parsed.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Resource limits.
    pub limits: Limits,
    /// Replace `{{name}}` placeholders in bodies with configuration parameters.
    pub substitute_parameters: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            substitute_parameters: true,
        }
    }
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    ///
    /// # Examples
    ///
    /// ```
    /// use esq_core::ParseOptions;
    ///
    /// let opts = ParseOptions::builder()
    ///     .max_tokens(10_000)
    ///     .substitute_parameters(false)
    ///     .build();
    /// assert_eq!(opts.limits.max_tokens, 10_000);
    /// ```
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for ergonomic construction of ParseOptions.
#[derive(Debug, Clone)]
pub struct ParseOptionsBuilder {
    limits: Limits,
    substitute_parameters: bool,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            substitute_parameters: true,
        }
    }

    /// Replace all limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the maximum document size in bytes.
    pub fn max_document_size(mut self, size: usize) -> Self {
        self.limits.max_document_size = size;
        self
    }

    /// Set the maximum nesting depth of entity bodies.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.limits.max_nesting_depth = depth;
        self
    }

    /// Set the maximum number of tokens per document.
    pub fn max_tokens(mut self, tokens: usize) -> Self {
        self.limits.max_tokens = tokens;
        self
    }

    /// Enable or disable `{{name}}` placeholder substitution in bodies.
    pub fn substitute_parameters(mut self, enabled: bool) -> Self {
        self.substitute_parameters = enabled;
        self
    }

    /// Build the ParseOptions.
    pub fn build(self) -> ParseOptions {
        ParseOptions {
            limits: self.limits,
            substitute_parameters: self.substitute_parameters,
        }
    }
}

impl Default for ParseOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
