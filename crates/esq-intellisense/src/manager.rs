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

//! Lazily built graph cache.
//!
//! # Responsibilities
//!
//! - Choosing the specification version for the target environment
//! - Building method graphs and the endpoint table on first use
//! - Building body graphs per endpoint on first use
//! - Dropping everything when the target environment changes
//!
//! # Thread Safety
//!
//! The cache sits behind a `parking_lot::RwLock`. Readers take the read
//! lock; a miss upgrades to the write lock, re-checks and populates. Only
//! [`GraphManager::invalidate`] clears it.

use crate::body_graph::{build_body_graph, BodyGraph};
use crate::constants::DEFAULT_VERSION;
use crate::endpoint::Endpoint;
use crate::error::{SpecError, SpecResult};
use crate::method_graph::{self, build_method_graphs, method_graph_key, MethodGraph};
use crate::source::SpecSource;
use esq_core::{QueryDocument, Version};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to build a graph.
    pub misses: u64,
    /// Number of times the cache was cleared.
    pub invalidations: u64,
}

#[derive(Default)]
struct GraphCache {
    /// Resolved specification version.
    version: Option<String>,
    endpoints: HashMap<String, Arc<Endpoint>>,
    methods: HashMap<String, Arc<MethodGraph>>,
    /// Set after the first load attempt, whether or not it succeeded.
    methods_loaded: bool,
    bodies: HashMap<String, Option<Arc<BodyGraph>>>,
}

/// Builds and caches the graphs of one specification source.
pub struct GraphManager {
    source: Box<dyn SpecSource>,
    default_version: Version,
    target_version: RwLock<Option<Version>>,
    cache: RwLock<GraphCache>,
    stats: RwLock<CacheStatistics>,
}

impl GraphManager {
    pub fn new(source: Box<dyn SpecSource>) -> Self {
        let default_version = Version::parse(DEFAULT_VERSION).unwrap_or_else(|_| Version::new(6, 2, 3));
        Self::with_default_version(source, default_version)
    }

    /// Manager falling back to `default_version` when no target is set.
    pub fn with_default_version(source: Box<dyn SpecSource>, default_version: Version) -> Self {
        Self {
            source,
            default_version,
            target_version: RwLock::new(None),
            cache: RwLock::new(GraphCache::default()),
            stats: RwLock::new(CacheStatistics::default()),
        }
    }

    pub fn source(&self) -> &dyn SpecSource {
        self.source.as_ref()
    }

    pub fn default_version(&self) -> Version {
        self.default_version
    }

    pub fn target_version(&self) -> Option<Version> {
        *self.target_version.read()
    }

    /// Change the target version; a different version clears the cache.
    pub fn set_target_version(&self, version: Option<Version>) {
        let changed = {
            let mut target = self.target_version.write();
            let changed = *target != version;
            *target = version;
            changed
        };

        if changed {
            self.invalidate();
        }
    }

    /// Drop every cached graph and endpoint.
    pub fn invalidate(&self) {
        *self.cache.write() = GraphCache::default();
        self.stats.write().invalidations += 1;
        info!("cleared intellisense graphs and endpoints");
    }

    pub fn statistics(&self) -> CacheStatistics {
        *self.stats.read()
    }

    fn record(&self, hit: bool) {
        let mut stats = self.stats.write();
        if hit {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
    }

    // ==================== Versions ====================

    /// Source version closest to `version`.
    fn closest_available(&self, version: &Version) -> SpecResult<String> {
        let candidates = self.source.versions()?;
        Version::closest(version, candidates.as_slice())
            .and_then(|closest| {
                candidates
                    .iter()
                    .find(|c| Version::parse(c).ok() == Some(closest))
                    .cloned()
            })
            .ok_or_else(|| SpecError::UnknownVersion(version.to_string()))
    }

    /// Specification version serving the target (or default) version.
    pub fn version(&self) -> SpecResult<String> {
        if let Some(version) = self.cache.read().version.clone() {
            return Ok(version);
        }

        let target = match self.target_version() {
            Some(version) => version,
            None => {
                debug!(version = %self.default_version, "no target version, using default");
                self.default_version
            }
        };

        let resolved = self.closest_available(&target)?;
        self.cache.write().version = Some(resolved.clone());
        Ok(resolved)
    }

    // ==================== Method graphs ====================

    fn ensure_methods(&self) {
        if self.cache.read().methods_loaded {
            self.record(true);
            return;
        }

        let mut cache = self.cache.write();
        if cache.methods_loaded {
            return;
        }
        self.record(false);

        let version = match cache.version.clone() {
            Some(version) => version,
            None => {
                drop(cache);
                let version = match self.version() {
                    Ok(version) => version,
                    Err(err) => {
                        warn!(error = %err, "failed getting specification version");
                        self.cache.write().methods_loaded = true;
                        return;
                    }
                };
                cache = self.cache.write();
                if cache.methods_loaded {
                    return;
                }
                version
            }
        };

        let endpoints = match self.source.endpoints(&version) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                warn!(version = %version, error = %err, "failed loading endpoints");
                cache.methods_loaded = true;
                return;
            }
        };
        let common = self.source.common_params(&version).unwrap_or_else(|err| {
            warn!(version = %version, error = %err, "failed loading common parameters");
            Default::default()
        });

        cache.methods = build_method_graphs(&endpoints, &common)
            .into_iter()
            .map(|(key, graph)| (key, Arc::new(graph)))
            .collect();
        cache.endpoints = endpoints
            .into_iter()
            .map(|endpoint| (endpoint.id.clone(), Arc::new(endpoint)))
            .collect();
        cache.methods_loaded = true;
    }

    /// Graph of the endpoints accepting `method`.
    pub fn method_graph(&self, method: &str) -> Option<Arc<MethodGraph>> {
        self.ensure_methods();
        self.cache.read().methods.get(&method_graph_key(method)).cloned()
    }

    pub fn endpoint(&self, endpoint_id: &str) -> Option<Arc<Endpoint>> {
        self.ensure_methods();
        self.cache.read().endpoints.get(endpoint_id).cloned()
    }

    /// Every endpoint, ordered by id.
    pub fn endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.ensure_methods();
        let mut endpoints: Vec<_> = self.cache.read().endpoints.values().cloned().collect();
        endpoints.sort_by(|a, b| a.id.cmp(&b.id));
        endpoints
    }

    /// Endpoint id reached by `method` and `command`.
    pub fn endpoint_id_for(&self, method: &str, command: &str) -> Option<String> {
        let graph = self.method_graph(method)?;
        method_graph::endpoint_id_for(&graph, command)
    }

    /// Assign endpoint ids to every query of `document`.
    pub fn resolve_endpoints(&self, document: &mut QueryDocument) {
        for query in &mut document.queries {
            let endpoint_id = match (query.method(), query.command()) {
                (Some(method), Some(command)) => self.endpoint_id_for(method, command),
                _ => None,
            };
            query.set_endpoint_id(endpoint_id);
        }
    }

    // ==================== Body graphs ====================

    /// Body graph of `endpoint_id`.
    ///
    /// The schema is looked up in the resolved version, then in the version
    /// closest to the default.
    pub fn body_graph(&self, endpoint_id: &str) -> Option<Arc<BodyGraph>> {
        if let Some(graph) = self.cache.read().bodies.get(endpoint_id) {
            self.record(true);
            return graph.clone();
        }
        self.record(false);

        let mut versions: Vec<String> = Vec::new();
        match self.version() {
            Ok(version) => versions.push(version),
            Err(err) => warn!(error = %err, "failed getting specification version"),
        }
        if let Ok(default) = self.closest_available(&self.default_version) {
            if !versions.contains(&default) {
                versions.push(default);
            }
        }

        let graph = build_body_graph(endpoint_id, |name| {
            versions.iter().find_map(|version| match self.source.body_schema(version, name) {
                Ok(schema) => schema,
                Err(err) => {
                    warn!(version = %version, endpoint = name, error = %err, "failed loading body schema");
                    None
                }
            })
        })
        .map(Arc::new);

        self.cache
            .write()
            .bodies
            .entry(endpoint_id.to_string())
            .or_insert(graph)
            .clone()
    }
}
