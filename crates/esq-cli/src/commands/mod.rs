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

//! CLI command implementations

mod complete;
mod endpoints;
mod parse;
mod tokens;

pub use complete::complete;
pub use endpoints::endpoints;
pub use parse::{parse, DocumentKind};
pub use tokens::tokens;

use crate::error::CliError;
use esq_core::Version;
use esq_intellisense::{DirectorySource, GraphManager};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default maximum file size (1 GB).
///
/// Can be overridden via the `ESQ_MAX_FILE_SIZE` environment variable.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

fn get_max_file_size() -> u64 {
    std::env::var("ESQ_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a document from disk, rejecting files above the size limit.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read, is not UTF-8, or is larger than
/// `ESQ_MAX_FILE_SIZE` bytes.
///
/// # Examples
///
/// ```no_run
/// use esq_cli::commands::read_file;
///
/// # fn main() -> Result<(), esq_cli::error::CliError> {
/// let text = read_file("queries.esq")?;
/// assert!(!text.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn read_file(path: &str) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max_file_size = get_max_file_size();
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }

    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Check that `offset` lies within `text`.
fn check_offset(text: &str, offset: usize) -> Result<(), CliError> {
    if offset > text.len() {
        return Err(CliError::invalid_argument(format!(
            "offset {} is past the end of the file ({} bytes)",
            offset,
            text.len()
        )));
    }
    Ok(())
}

/// Graph manager over the specification tree at `specs`.
///
/// An explicit `version` becomes the manager's target version.
fn open_specs(specs: &str, version: Option<&str>) -> Result<GraphManager, CliError> {
    if !Path::new(specs).is_dir() {
        return Err(CliError::invalid_argument(format!(
            "specification directory '{}' does not exist",
            specs
        )));
    }

    let manager = GraphManager::new(Box::new(DirectorySource::new(specs)));
    if let Some(version) = version {
        let version = Version::parse(version)
            .map_err(|e| CliError::invalid_argument(format!("version '{}': {}", version, e)))?;
        manager.set_target_version(Some(version));
    }

    let resolved = manager.version()?;
    debug!(specs, version = %resolved, "using specification");
    Ok(manager)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // ===== read_file tests =====

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "GET /_search").unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(read_file(path).unwrap(), "GET /_search");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file("/definitely/not/here.esq").unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    // ===== Argument tests =====

    #[test]
    fn test_check_offset() {
        assert!(check_offset("GET", 3).is_ok());
        assert!(matches!(check_offset("GET", 4), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_open_missing_specs() {
        let err = open_specs("/definitely/not/here", None).err().unwrap();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_open_specs_bad_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("7.10")).unwrap();
        let specs = dir.path().to_str().unwrap();
        assert!(matches!(open_specs(specs, Some("seven")), Err(CliError::InvalidArgument(_))));
        assert_eq!(open_specs(specs, Some("7.10.2")).unwrap().version().unwrap(), "7.10");
    }
}
