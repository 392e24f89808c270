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

//! Error types for specification loading.
//!
//! Completion never surfaces these. Sources return them, the graph manager
//! logs them and builds whatever graphs the remaining sources allow.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An error raised while loading specification resources.
#[derive(Error, Debug)]
pub enum SpecError {
    /// Reading a specification file or directory failed.
    #[error("I/O error for '{path}': {source}")]
    Io {
        /// The path that could not be read
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// A specification file is not valid JSON or has the wrong shape.
    #[error("malformed specification '{name}': {source}")]
    Json {
        /// File or resource name
        name: String,
        /// The underlying error
        #[source]
        source: serde_json::Error,
    },

    /// No resource directory matches the requested version.
    #[error("no specification available for version {0}")]
    UnknownVersion(String),

    /// The pipeline has no source able to answer.
    #[error("no specification source configured")]
    NoSource,
}

impl SpecError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            name: name.into(),
            source,
        }
    }
}

/// Result type for specification loading.
pub type SpecResult<T> = Result<T, SpecError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Display tests =====

    #[test]
    fn test_io_error_names_path() {
        let err = SpecError::io("/specs/7.10/rest-api-spec", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("I/O error for '/specs/7.10/rest-api-spec'"));
    }

    #[test]
    fn test_json_error_names_resource() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SpecError::json("search.json", source);
        assert!(err.to_string().starts_with("malformed specification 'search.json'"));
    }

    #[test]
    fn test_unknown_version() {
        assert_eq!(
            SpecError::UnknownVersion("9.0".to_string()).to_string(),
            "no specification available for version 9.0"
        );
    }
}
