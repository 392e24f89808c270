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

//! Where specifications come from.
//!
//! A [`SpecSource`] answers four questions per version: which versions it
//! has, the endpoint descriptions, the shared query parameters and the body
//! schema of one endpoint. [`DirectorySource`] reads a resource tree,
//! [`MemorySource`] holds everything in memory and [`SourcePipeline`] asks a
//! list of sources in order.
//!
//! The directory layout is:
//!
//! ```text
//! <root>/<version>/rest-api-spec/<endpoint>.json
//! <root>/<version>/rest-api-spec/_common.json
//! <root>/<version>/endpoints/<endpoint>.json
//! ```

use crate::endpoint::{parse_common_params, parse_endpoints, Endpoint, Param};
use crate::error::{SpecError, SpecResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const REST_API_SPEC_DIR: &str = "rest-api-spec";
const ENDPOINTS_DIR: &str = "endpoints";
const COMMON_FILE: &str = "_common.json";
const JSON_EXTENSION: &str = "json";

/// A provider of specification data.
pub trait SpecSource: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Version names this source can serve.
    fn versions(&self) -> SpecResult<Vec<String>>;

    /// Endpoint descriptions of `version`.
    fn endpoints(&self, version: &str) -> SpecResult<Vec<Endpoint>>;

    /// Query parameters shared by every endpoint of `version`.
    fn common_params(&self, version: &str) -> SpecResult<BTreeMap<String, Param>>;

    /// Body schema of `endpoint` (no `endpoint_` prefix), if there is one.
    fn body_schema(&self, version: &str, endpoint: &str) -> SpecResult<Option<Value>>;
}

// ============================================================================
// In-memory source
// ============================================================================

#[derive(Debug, Clone, Default)]
struct VersionData {
    endpoints: Vec<Endpoint>,
    common: BTreeMap<String, Param>,
    bodies: HashMap<String, Value>,
}

/// Specification data held in memory.
///
/// ```
/// use esq_intellisense::{MemorySource, SpecSource};
/// use serde_json::json;
///
/// let source = MemorySource::new()
///     .with_endpoints_json("7.10", r#"{"ping":{"methods":["HEAD"],"url":{"paths":["/"]}}}"#)
///     .unwrap()
///     .with_body_schema("7.10", "search", json!({ "size": 10 }));
///
/// assert_eq!(source.versions().unwrap(), vec!["7.10".to_string()]);
/// assert_eq!(source.endpoints("7.10").unwrap()[0].id, "endpoint_ping");
/// assert!(source.body_schema("7.10", "search").unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    versions: BTreeMap<String, VersionData>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    fn version_mut(&mut self, version: &str) -> &mut VersionData {
        self.versions.entry(version.to_string()).or_default()
    }

    fn version(&self, version: &str) -> SpecResult<&VersionData> {
        self.versions
            .get(version)
            .ok_or_else(|| SpecError::UnknownVersion(version.to_string()))
    }

    pub fn with_endpoint(mut self, version: &str, endpoint: Endpoint) -> Self {
        self.version_mut(version).endpoints.push(endpoint);
        self
    }

    /// Add the endpoints of a specification file.
    pub fn with_endpoints_json(mut self, version: &str, text: &str) -> SpecResult<Self> {
        let endpoints = parse_endpoints(version, text)?;
        self.version_mut(version).endpoints.extend(endpoints);
        Ok(self)
    }

    pub fn with_common_param(mut self, version: &str, name: &str, param: Param) -> Self {
        self.version_mut(version).common.insert(name.to_string(), param);
        self
    }

    pub fn with_body_schema(mut self, version: &str, endpoint: &str, schema: Value) -> Self {
        self.version_mut(version).bodies.insert(endpoint.to_string(), schema);
        self
    }
}

impl SpecSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn versions(&self) -> SpecResult<Vec<String>> {
        Ok(self.versions.keys().cloned().collect())
    }

    fn endpoints(&self, version: &str) -> SpecResult<Vec<Endpoint>> {
        Ok(self.version(version)?.endpoints.clone())
    }

    fn common_params(&self, version: &str) -> SpecResult<BTreeMap<String, Param>> {
        Ok(self.version(version)?.common.clone())
    }

    fn body_schema(&self, version: &str, endpoint: &str) -> SpecResult<Option<Value>> {
        Ok(self.version(version)?.bodies.get(endpoint).cloned())
    }
}

// ============================================================================
// Directory source
// ============================================================================

/// Specification files under a resource root.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    name: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }
}

fn read_file(path: &Path) -> SpecResult<String> {
    fs::read_to_string(path).map_err(|e| SpecError::io(path, e))
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(JSON_EXTENSION)
}

impl SpecSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn versions(&self) -> SpecResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| SpecError::io(&self.root, e))?;
        let mut versions = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SpecError::io(&self.root, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    versions.push(name.to_string());
                }
            }
        }

        versions.sort();
        Ok(versions)
    }

    fn endpoints(&self, version: &str) -> SpecResult<Vec<Endpoint>> {
        let dir = self.version_dir(version).join(REST_API_SPEC_DIR);
        let entries = fs::read_dir(&dir).map_err(|e| SpecError::io(&dir, e))?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SpecError::io(&dir, e))?.path();
            let is_common = path.file_name().and_then(|n| n.to_str()) == Some(COMMON_FILE);
            if is_json(&path) && !is_common {
                files.push(path);
            }
        }
        files.sort();

        let mut endpoints = Vec::new();
        for file in &files {
            let name = file.display().to_string();
            match read_file(file).and_then(|text| parse_endpoints(&name, &text)) {
                Ok(parsed) => endpoints.extend(parsed),
                Err(err) => warn!(error = %err, "skipping endpoint specification"),
            }
        }

        debug!(
            "found {} files for rest-api-spec version {}",
            files.len(),
            version
        );
        Ok(endpoints)
    }

    fn common_params(&self, version: &str) -> SpecResult<BTreeMap<String, Param>> {
        let path = self.version_dir(version).join(REST_API_SPEC_DIR).join(COMMON_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => parse_common_params(&path.display().to_string(), &text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(SpecError::io(&path, err)),
        }
    }

    fn body_schema(&self, version: &str, endpoint: &str) -> SpecResult<Option<Value>> {
        let path = self
            .version_dir(version)
            .join(ENDPOINTS_DIR)
            .join(format!("{}.{}", endpoint, JSON_EXTENSION));

        match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| SpecError::json(path.display().to_string(), e)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SpecError::io(&path, err)),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Sources asked in order; the first useful answer wins.
///
/// A failing source is logged and skipped.
#[derive(Default)]
pub struct SourcePipeline {
    sources: Vec<Box<dyn SpecSource>>,
}

impl SourcePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: Vec<Box<dyn SpecSource>>) -> Self {
        Self { sources }
    }

    pub fn add_source(&mut self, source: Box<dyn SpecSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// First answer accepted by `useful`; otherwise the last successful
    /// answer, the last error, or [`SpecError::NoSource`].
    fn first<T, F, U>(&self, what: &str, ask: F, useful: U) -> SpecResult<T>
    where
        F: Fn(&dyn SpecSource) -> SpecResult<T>,
        U: Fn(&T) -> bool,
    {
        let mut fallback: Option<SpecResult<T>> = None;

        for source in &self.sources {
            match ask(source.as_ref()) {
                Ok(answer) if useful(&answer) => return Ok(answer),
                Ok(answer) => fallback = Some(Ok(answer)),
                Err(err) => {
                    warn!(source = source.name(), error = %err, "failed loading {}", what);
                    if !matches!(fallback, Some(Ok(_))) {
                        fallback = Some(Err(err));
                    }
                }
            }
        }

        fallback.unwrap_or(Err(SpecError::NoSource))
    }
}

impl SpecSource for SourcePipeline {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn versions(&self) -> SpecResult<Vec<String>> {
        if self.sources.is_empty() {
            return Err(SpecError::NoSource);
        }

        let mut versions: Vec<String> = Vec::new();
        for source in &self.sources {
            match source.versions() {
                Ok(found) => versions.extend(found),
                Err(err) => warn!(source = source.name(), error = %err, "failed listing versions"),
            }
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn endpoints(&self, version: &str) -> SpecResult<Vec<Endpoint>> {
        self.first("endpoints", |s| s.endpoints(version), |e| !e.is_empty())
    }

    fn common_params(&self, version: &str) -> SpecResult<BTreeMap<String, Param>> {
        self.first("common parameters", |s| s.common_params(version), |p| !p.is_empty())
    }

    fn body_schema(&self, version: &str, endpoint: &str) -> SpecResult<Option<Value>> {
        self.first("body schema", |s| s.body_schema(version, endpoint), Option::is_some)
    }
}
