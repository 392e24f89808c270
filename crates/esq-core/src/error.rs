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

//! Error types for scanning and document building.
//!
//! The public `parse` entry points never surface these: they log and fall
//! back to a partial document. The `try_*` variants return them so callers
//! that care (the CLI, tests) can see why a document came back empty.

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural violation the scanner could not recover from.
    Syntax,
    /// A configured limit was exceeded.
    Limit,
    /// A property path could not be applied to a value tree.
    Path,
    /// A version string could not be parsed.
    Version,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "SyntaxError"),
            Self::Limit => write!(f, "LimitError"),
            Self::Path => write!(f, "PathError"),
            Self::Version => write!(f, "VersionError"),
        }
    }
}

/// An error raised while scanning or building a document.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct EsqError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Byte offset in the source, when known.
    pub offset: Option<usize>,
    /// Additional context (e.g. the path being assigned).
    pub context: Option<String>,
}

impl EsqError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: None,
            context: None,
        }
    }

    /// Add offset information.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Add context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Convenience constructors for each error kind
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Limit, message)
    }

    pub fn path(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Path, message)
    }

    pub fn version(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Version, message)
    }
}

/// Result type for ESQ operations.
pub type EsqResult<T> = Result<T, EsqError>;
