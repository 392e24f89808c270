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

//! Graph keys, node kinds and body schema directives.
//!
//! The body schema files and the graph builders share these names, so they
//! live in one place.

// ============================================================================
// Graph keys
// ============================================================================

/// Prefix of the cache key of a method graph (`method_get`).
pub const METHOD_GRAPH_PREFIX: &str = "method_";

/// Prefix of endpoint node ids (`endpoint_search`).
pub const ENDPOINT_PREFIX: &str = "endpoint_";

/// Id of the synthetic node linking to every top-level body field.
pub const ROOT_NODE: &str = "root";

/// Step id used for the bare `/` path.
pub const ROOT_STEP: &str = "/";

// ============================================================================
// Body schema directives
// ============================================================================

/// Overrides the inferred JSON type of a schema entry.
pub const AS_TYPE: &str = "__as_type";

/// Inherits the children of other nodes.
pub const CHILDREN_OF: &str = "__children_of";

/// Lists further endpoint files to load into the same graph.
pub const IMPORT_FILE: &str = "__import_file";

/// Top-level section ignored by the loader.
pub const INACTIVE: &str = "__inactive";

/// Variant of a field when it holds an array.
pub const VARIANT_ARRAY: &str = "__array";

/// Variant of a field when it holds an object.
pub const VARIANT_OBJECT: &str = "__object";

/// Variant of a field when it holds a string.
pub const VARIANT_STRING: &str = "__string";

/// Prefix shared by every directive.
pub const DIRECTIVE_PREFIX: &str = "__";

/// Depth given to detached sub-schemas so they never count as top-level.
pub const DETACHED_DEPTH: i32 = 100;

// ============================================================================
// Edge kinds
// ============================================================================

pub const KIND_OBJECT: &str = "object";
pub const KIND_ARRAY: &str = "array";
pub const KIND_STRING: &str = "string";
pub const KIND_NUMBER: &str = "number";
pub const KIND_BOOLEAN: &str = "boolean";

/// Edge kind produced by `__children_of`.
pub const KIND_CHILDREN_OF: &str = "children_of";

// ============================================================================
// Versions
// ============================================================================

/// Specification version used when no environment reports one.
pub const DEFAULT_VERSION: &str = "6.2.3";
