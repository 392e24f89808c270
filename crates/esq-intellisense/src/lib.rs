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

//! Elasticsearch REST specification graphs and completion for query
//! documents.
//!
//! # Features
//!
//! - **Specification sources**: endpoint descriptions and body schemas from
//!   memory or from a `<root>/<version>/…` directory tree, composed into an
//!   ordered pipeline
//! - **Method graphs**: one graph per HTTP method linking URL steps to
//!   endpoints and their query-string parameters
//! - **Body graphs**: one graph per endpoint describing the JSON body DSL
//! - **Completion**: commands, query-string parameters and body fields at a
//!   cursor offset
//!
//! # Caching
//!
//! [`GraphManager`] builds graphs lazily for the specification version
//! closest to the active environment and keeps them until the version
//! changes or [`GraphManager::invalidate`] is called.
//!
//! # Examples
//!
//! ```
//! use esq_intellisense::{complete_document, GraphManager, MemorySource};
//!
//! let source = MemorySource::new()
//!     .with_endpoints_json(
//!         "7.10",
//!         r#"{ "cat.indices": { "methods": ["GET"], "url": { "paths": ["/_cat/indices"] } } }"#,
//!     )
//!     .unwrap();
//! let manager = GraphManager::new(Box::new(source));
//!
//! let items = complete_document(&manager, "GET /_cat/", 10);
//! assert_eq!(items[0].label, "indices");
//! ```

pub mod body_graph;
pub mod completion;
pub mod constants;
pub mod endpoint;
mod error;
pub mod graph;
pub mod manager;
pub mod method_graph;
pub mod source;
mod workspace;

pub use body_graph::{build_body_graph, BodyGraph, BodyNode};
pub use completion::{
    complete_document, completions, create_text_snippet, determine_context, CompletionContext,
    CompletionItem, CompletionKind,
};
pub use endpoint::{Endpoint, EndpointBody, EndpointPath, EndpointUrl, Param};
pub use error::{SpecError, SpecResult};
pub use graph::{Edge, Graph, Node};
pub use manager::{CacheStatistics, GraphManager};
pub use method_graph::{build_method_graphs, MethodGraph, MethodNode, MethodNodeKind};
pub use source::{DirectorySource, MemorySource, SourcePipeline, SpecSource};
pub use workspace::Workspace;
