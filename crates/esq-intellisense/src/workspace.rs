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

//! Active environment and the graphs that follow it.

use crate::completion::{complete_document, CompletionItem};
use crate::manager::GraphManager;
use esq_core::{Environment, QueryDocument};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Editing session state shared by every open document.
///
/// # Responsibilities
///
/// - Track the environment queries are written against
/// - Retarget the graph manager when that environment changes version
/// - Answer completion requests for any document text
///
/// # Thread Safety
///
/// The environment sits behind a `parking_lot::RwLock`; the manager is
/// shared through an `Arc` and synchronizes its own cache.
pub struct Workspace {
    manager: Arc<GraphManager>,
    environment: RwLock<Option<Environment>>,
}

impl Workspace {
    pub fn new(manager: Arc<GraphManager>) -> Self {
        Self {
            manager,
            environment: RwLock::new(None),
        }
    }

    pub fn manager(&self) -> &Arc<GraphManager> {
        &self.manager
    }

    pub fn environment(&self) -> Option<Environment> {
        self.environment.read().clone()
    }

    /// Switch the active environment.
    ///
    /// Setting the environment that is already active does nothing; any
    /// other change retargets the manager to the environment's version.
    pub fn set_environment(&self, environment: Option<Environment>) {
        let mut current = self.environment.write();
        if *current == environment {
            return;
        }

        info!(
            environment = environment.as_ref().and_then(Environment::id).unwrap_or("none"),
            "active environment changed"
        );
        self.manager
            .set_target_version(environment.as_ref().and_then(|e| e.version));
        *current = environment;
    }

    /// Parse `text` and assign endpoint ids to its queries.
    pub fn parse(&self, text: &str) -> QueryDocument {
        let mut document = QueryDocument::parse(text);
        self.manager.resolve_endpoints(&mut document);
        document
    }

    /// Completion candidates at `offset` in `text`.
    pub fn complete(&self, text: &str, offset: usize) -> Vec<CompletionItem> {
        complete_document(&self.manager, text, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use esq_core::Version;

    const ENDPOINTS_6: &str = r#"{
      "search": { "methods": ["GET"], "url": { "paths": ["/_search"] } }
    }"#;

    const ENDPOINTS_7: &str = r#"{
      "search": { "methods": ["GET"], "url": { "paths": ["/_search"] } },
      "cat.nodes": { "methods": ["GET"], "url": { "paths": ["/_cat/nodes"] } }
    }"#;

    fn workspace() -> Workspace {
        let source = MemorySource::new()
            .with_endpoints_json("6.2", ENDPOINTS_6)
            .unwrap()
            .with_endpoints_json("7.10", ENDPOINTS_7)
            .unwrap();
        Workspace::new(Arc::new(GraphManager::new(Box::new(source))))
    }

    fn environment(name: &str, version: &str) -> Environment {
        let text = format!(r#"{{ "name": "{}", "host": "http://localhost:9200", "version": "{}" }}"#, name, version);
        Environment::parse(&text).unwrap()
    }

    // ===== Environment tests =====

    #[test]
    fn test_environment_retargets_manager() {
        let workspace = workspace();
        assert!(workspace.parse("GET /_cat/nodes").queries[0].endpoint_id().is_none());

        workspace.set_environment(Some(environment("prod", "7.10.2")));
        assert_eq!(workspace.manager().target_version(), Some(Version::new(7, 10, 2)));
        assert_eq!(workspace.manager().version().unwrap(), "7.10");
        assert_eq!(
            workspace.parse("GET /_cat/nodes").queries[0].endpoint_id(),
            Some("endpoint_cat.nodes")
        );
    }

    #[test]
    fn test_same_environment_keeps_cache() {
        let workspace = workspace();
        workspace.set_environment(Some(environment("prod", "7.10.2")));
        workspace.parse("GET /_search");
        let before = workspace.manager().statistics();

        workspace.set_environment(Some(environment("prod", "7.10.2")));
        assert_eq!(workspace.manager().statistics().invalidations, before.invalidations);

        workspace.set_environment(None);
        assert_eq!(workspace.environment(), None);
        assert!(workspace.manager().statistics().invalidations > before.invalidations);
    }

    // ===== Completion tests =====

    #[test]
    fn test_complete_follows_environment() {
        let workspace = workspace();
        assert!(workspace.complete("GET /_cat/", 10).is_empty());

        workspace.set_environment(Some(environment("prod", "7.10.0")));
        let items = workspace.complete("GET /_cat/", 10);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "nodes");
    }
}
