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

//! Structured error types for the ESQ CLI.
//!
//! Every command returns `Result<(), CliError>`; `main` prints the error and
//! exits with a failure code.

use esq_core::EsqError;
use esq_intellisense::SpecError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running a CLI command.
///
/// # Examples
///
/// ```rust,no_run
/// use esq_cli::error::CliError;
///
/// fn read(path: &str) -> Result<String, CliError> {
///     std::fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// The input exceeds `ESQ_MAX_FILE_SIZE`.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        path: PathBuf,
        actual: u64,
        max: u64,
        max_mb: u64,
    },

    /// The document could not be parsed within the configured limits.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The specification source could not answer.
    #[error("Specification error: {0}")]
    Spec(String),

    /// An argument is out of range or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON output could not be produced.
    #[error("JSON format error: {message}")]
    JsonFormat {
        /// The error message
        message: String,
    },
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a file-too-large error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use esq_cli::error::CliError;
    ///
    /// let err = CliError::file_too_large("huge.esq", 3 * 1024 * 1024, 2 * 1024 * 1024);
    /// assert!(err.to_string().contains("2 MB"));
    /// ```
    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonFormat {
            message: source.to_string(),
        }
    }
}

impl From<EsqError> for CliError {
    fn from(source: EsqError) -> Self {
        Self::Parse(source.to_string())
    }
}

impl From<SpecError> for CliError {
    fn from(source: SpecError) -> Self {
        Self::Spec(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Display tests =====

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "queries.esq",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("queries.esq"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = CliError::file_too_large("big.esq", 200_000_000, 100 * 1024 * 1024);
        let msg = err.to_string();
        assert!(msg.contains("big.esq"));
        assert!(msg.contains("200000000 bytes"));
        assert!(msg.contains("100 MB"));
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = CliError::invalid_argument("offset 90 is past the end of the file");
        assert_eq!(err.to_string(), "Invalid argument: offset 90 is past the end of the file");
    }

    // ===== Conversion tests =====

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let cli_err: CliError = json_err.into();
        assert!(matches!(cli_err, CliError::JsonFormat { .. }));
    }

    #[test]
    fn test_spec_error_conversion() {
        let cli_err: CliError = SpecError::NoSource.into();
        assert!(matches!(cli_err, CliError::Spec(_)));
    }
}
