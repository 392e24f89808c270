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

//! Body graphs: the request body schema of one endpoint.
//!
//! The schema is a JSON sketch of a valid body. Keys become nodes, nesting
//! becomes typed edges, and a handful of `__` directives shape the result:
//!
//! | Directive | Effect |
//! |-----------|--------|
//! | `__import_file` | load further schema files into the same graph |
//! | `__as_type` | override the inferred type(s) of an object entry |
//! | `__array`, `__object`, `__string` | one node per variant a field accepts |
//! | `__children_of` | inherit the children of other nodes |
//! | `__inactive` | top-level section that is never loaded |
//!
//! Any other top-level `__` section is loaded detached, deep enough that it
//! never counts as a top-level field, so `__children_of` can reference it.
//! A synthetic `root` node links to every top-level field.

use crate::constants::{
    AS_TYPE, CHILDREN_OF, DETACHED_DEPTH, DIRECTIVE_PREFIX, ENDPOINT_PREFIX, IMPORT_FILE, INACTIVE,
    KIND_ARRAY, KIND_CHILDREN_OF, KIND_OBJECT, KIND_STRING, ROOT_NODE, VARIANT_ARRAY,
    VARIANT_OBJECT, VARIANT_STRING,
};
use crate::graph::Graph;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Data of a body graph node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyNode {
    /// Schema key the node was created from (`[i]` for array entries).
    pub key: String,
    /// JSON types the field accepts.
    pub types: Vec<String>,
    /// Nesting depth; 0 for top-level fields.
    pub depth: i32,
    /// Example value of scalar fields.
    pub default_value: Option<String>,
    /// Labels ending in `}` match any key.
    pub is_dynamic: bool,
}

pub type BodyGraph = Graph<BodyNode>;

/// Build the body graph of `endpoint_id`.
///
/// `load` returns the schema of an endpoint by name (no `endpoint_` prefix).
/// Returns `None` when the endpoint has no schema.
pub fn build_body_graph<F>(endpoint_id: &str, mut load: F) -> Option<BodyGraph>
where
    F: FnMut(&str) -> Option<Value>,
{
    let name = endpoint_id.strip_prefix(ENDPOINT_PREFIX).unwrap_or(endpoint_id);
    let first = load(name)?;

    let mut graph = BodyGraph::new();
    let mut imported: HashSet<String> = HashSet::new();
    imported.insert(name.to_string());
    let mut files: Vec<Value> = vec![first];

    while let Some(source) = files.pop() {
        let Some(map) = source.as_object() else {
            debug!(endpoint = endpoint_id, "body schema is not an object");
            continue;
        };

        for (key, value) in map {
            if key == IMPORT_FILE {
                for import in value.as_array().into_iter().flatten().filter_map(Value::as_str) {
                    let import = import.strip_prefix(ENDPOINT_PREFIX).unwrap_or(import);
                    if imported.insert(import.to_string()) {
                        if let Some(schema) = load(import) {
                            files.push(schema);
                        }
                    }
                }
            } else if key.starts_with(DIRECTIVE_PREFIX) && key != INACTIVE {
                load_schema(&mut graph, value, DETACHED_DEPTH);
            }
        }

        load_schema(&mut graph, &source, 0);
    }

    add_root(&mut graph);
    expand_children_of(&mut graph);

    debug!(
        "loaded graph {} with {} nodes and {} edges",
        endpoint_id,
        graph.nodes().len(),
        graph.edges().len()
    );
    Some(graph)
}

struct Frame<'v> {
    source: &'v Value,
    path: Option<String>,
    depth: i32,
}

fn load_schema(graph: &mut BodyGraph, source: &Value, depth: i32) {
    let mut stack = vec![Frame {
        source,
        path: None,
        depth,
    }];

    while let Some(frame) = stack.pop() {
        match frame.source {
            Value::Array(entries) => {
                if let Some(path) = frame.path.as_deref() {
                    add_array_entries(graph, entries, path, frame.depth, &mut stack);
                }
            }
            Value::Object(map) => {
                for (key, current) in map {
                    if key == CHILDREN_OF {
                        if let Some(path) = frame.path.as_deref() {
                            for target in string_list(current) {
                                graph.add_edge(path, target, Some(KIND_CHILDREN_OF));
                            }
                        }
                    } else if !key.starts_with(DIRECTIVE_PREFIX) {
                        add_entry(graph, key, current, &frame, &mut stack);
                    }
                }
            }
            _ => debug!(path = ?frame.path, "schema entry is not an object"),
        }
    }
}

fn add_entry<'v>(
    graph: &mut BodyGraph,
    key: &str,
    current: &'v Value,
    frame: &Frame<'_>,
    stack: &mut Vec<Frame<'v>>,
) {
    let parent = frame.path.as_deref();
    let id = match parent {
        Some(path) => format!("{}/{}", path, key),
        None => key.to_string(),
    };

    match current {
        Value::Array(entries) => {
            if entries.is_empty() {
                return;
            }
            graph.add_node(id.as_str(), key, body_node(key, vec![KIND_ARRAY.to_string()], frame.depth));
            add_typed_edge(graph, parent, &id, KIND_ARRAY);
            add_array_entries(graph, entries, &id, frame.depth, stack);
        }
        Value::Object(map) => {
            let variants = [
                (VARIANT_ARRAY, KIND_ARRAY),
                (VARIANT_OBJECT, KIND_OBJECT),
                (VARIANT_STRING, KIND_STRING),
            ];
            let present: Vec<_> = variants
                .iter()
                .filter_map(|(directive, kind)| {
                    map.get(*directive).filter(|v| is_truthy(v)).map(|v| (v, *kind))
                })
                .collect();

            if present.is_empty() {
                let types = declared_types(current).unwrap_or_else(|| vec![KIND_OBJECT.to_string()]);
                stack.push(Frame {
                    source: current,
                    path: Some(id.clone()),
                    depth: frame.depth + 1,
                });
                graph.add_node(id.as_str(), key, body_node(key, types.clone(), frame.depth));
                for kind in &types {
                    add_typed_edge(graph, parent, &id, kind);
                }
                return;
            }

            for (variant, kind) in present {
                let variant_id = format!("{}-{}", id, kind);
                graph.add_node(variant_id.as_str(), key, body_node(key, vec![kind.to_string()], frame.depth));
                add_typed_edge(graph, parent, &variant_id, kind);
                stack.push(Frame {
                    source: variant,
                    path: Some(variant_id),
                    depth: frame.depth + 1,
                });
            }
        }
        scalar => {
            let kind = scalar_type(scalar);
            let mut node = body_node(key, vec![kind.to_string()], frame.depth);
            node.default_value = scalar_text(scalar);
            graph.add_node(id.as_str(), key, node);
            add_typed_edge(graph, parent, &id, kind);
        }
    }
}

/// Entries of an array become `[i]` nodes below `parent`.
fn add_array_entries<'v>(
    graph: &mut BodyGraph,
    entries: &'v [Value],
    parent: &str,
    depth: i32,
    stack: &mut Vec<Frame<'v>>,
) {
    let depth = depth + 1;

    for (index, entry) in entries.iter().enumerate() {
        let key = format!("[{}]", index);
        let id = format!("{}/{}", parent, key);

        match entry {
            Value::Object(_) => {
                let types = declared_types(entry).unwrap_or_else(|| vec![KIND_OBJECT.to_string()]);
                graph.add_node(id.as_str(), "[0]", body_node(&key, types.clone(), depth));
                for kind in &types {
                    graph.add_edge(parent, &id, Some(kind.as_str()));
                }
                stack.push(Frame {
                    source: entry,
                    path: Some(id),
                    depth,
                });
            }
            scalar => {
                let kind = scalar_type(scalar);
                let mut node = body_node(&key, vec![kind.to_string()], depth);
                node.default_value = scalar_text(scalar);
                graph.add_node(id.as_str(), key.as_str(), node);
                graph.add_edge(parent, &id, Some(kind));
            }
        }
    }
}

fn body_node(key: &str, types: Vec<String>, depth: i32) -> BodyNode {
    BodyNode {
        key: key.to_string(),
        types,
        depth,
        default_value: None,
        is_dynamic: key.ends_with('}'),
    }
}

fn add_typed_edge(graph: &mut BodyGraph, parent: Option<&str>, target: &str, kind: &str) {
    if let Some(parent) = parent {
        graph.add_edge(parent, target, Some(kind));
    }
}

/// Types named by `__as_type`, if present.
fn declared_types(value: &Value) -> Option<Vec<String>> {
    let declared = value.get(AS_TYPE)?;
    let types: Vec<String> = string_list(declared).map(str::to_string).collect();
    (!types.is_empty()).then_some(types)
}

/// A string or an array of strings.
fn string_list(value: &Value) -> impl Iterator<Item = &str> {
    let (single, many) = match value {
        Value::String(s) => (Some(s.as_str()), None),
        Value::Array(items) => (None, Some(items.iter().filter_map(Value::as_str))),
        _ => (None, None),
    };
    single.into_iter().chain(many.into_iter().flatten())
}

fn scalar_type(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => KIND_OBJECT,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Link `root` to every top-level field, once per type.
fn add_root(graph: &mut BodyGraph) {
    let top: Vec<(String, Vec<String>)> = graph
        .nodes()
        .iter()
        .filter(|n| n.data.depth == 0)
        .map(|n| (n.id.clone(), n.data.types.clone()))
        .collect();

    graph.add_node(
        ROOT_NODE,
        ROOT_NODE,
        BodyNode {
            key: ROOT_NODE.to_string(),
            types: vec![KIND_OBJECT.to_string()],
            depth: -1,
            default_value: None,
            is_dynamic: false,
        },
    );

    for (id, types) in top {
        for kind in &types {
            graph.add_edge(ROOT_NODE, &id, Some(kind.as_str()));
        }
    }
}

/// Copy inherited children onto nodes that use `__children_of`.
///
/// Only nodes reachable through a regular edge inherit; the chain of
/// `children_of` edges is followed transitively.
fn expand_children_of(graph: &mut BodyGraph) {
    let mut sources: Vec<String> = Vec::new();
    for edge in graph.find_edges(|e| e.is_kind(KIND_CHILDREN_OF)) {
        if !sources.contains(&edge.source) {
            sources.push(edge.source.clone());
        }
    }

    for source in sources {
        let referenced = graph
            .edges_with_target(&source)
            .any(|e| !e.is_kind(KIND_CHILDREN_OF));
        if !referenced {
            continue;
        }

        let mut pending: VecDeque<(String, bool)> = graph
            .edges_with_source(&source)
            .filter(|e| e.is_kind(KIND_CHILDREN_OF))
            .map(|e| (e.target.clone(), true))
            .collect();
        let mut visited: HashSet<String> = HashSet::new();
        let mut children: Vec<String> = Vec::new();

        while let Some((target, inherited)) = pending.pop_front() {
            if !visited.insert(target.clone()) {
                continue;
            }
            if inherited {
                pending.extend(
                    graph
                        .edges_with_source(&target)
                        .map(|e| (e.target.clone(), e.is_kind(KIND_CHILDREN_OF))),
                );
            } else {
                children.push(target);
            }
        }

        for child in children {
            let types = graph.node(&child).map(|n| n.data.types.clone()).unwrap_or_default();
            for kind in &types {
                graph.add_edge(&source, &child, Some(kind.as_str()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn build(files: HashMap<&str, Value>, endpoint: &str) -> Option<BodyGraph> {
        build_body_graph(endpoint, |name| files.get(name).cloned())
    }

    fn targets(graph: &BodyGraph, id: &str) -> Vec<String> {
        let mut targets: Vec<String> = graph.edges_with_source(id).map(|e| e.target.clone()).collect();
        targets.sort();
        targets
    }

    // ===== Shape tests =====

    #[test]
    fn test_nested_objects_and_scalars() {
        let schema = json!({
            "size": 10,
            "explain": false,
            "query": { "match_all": { "boost": 1.0 } },
            "sort": ["_score", "_doc"]
        });
        let graph = build(HashMap::from([("search", schema)]), "endpoint_search").unwrap();

        let size = graph.node("size").unwrap();
        assert_eq!(size.data.types, vec!["number"]);
        assert_eq!(size.data.default_value.as_deref(), Some("10"));
        assert_eq!(size.data.depth, 0);

        let boost = graph.node("query/match_all/boost").unwrap();
        assert_eq!(boost.data.depth, 2);
        assert!(graph.edge("query_query/match_all_object").is_some());

        let sort_entry = graph.node("sort/[1]").unwrap();
        assert_eq!(sort_entry.label, "[1]");
        assert_eq!(sort_entry.data.default_value.as_deref(), Some("_doc"));
        assert!(graph.edge("sort_sort/[1]_string").is_some());
    }

    #[test]
    fn test_root_links_top_level_fields() {
        let schema = json!({ "size": 10, "query": {}, "aggs": { "__as_type": ["object", "array"] } });
        let graph = build(HashMap::from([("search", schema)]), "search").unwrap();
        assert_eq!(graph.node(ROOT_NODE).map(|n| n.data.depth), Some(-1));
        assert_eq!(targets(&graph, ROOT_NODE), vec!["aggs", "aggs", "query", "size"]);
        assert!(graph.edge("root_aggs_array").is_some());
        assert!(graph.edge("root_aggs_object").is_some());
    }

    #[test]
    fn test_object_array_entries() {
        let schema = json!({ "must": [ { "match": {} }, { "term": {} } ] });
        let graph = build(HashMap::from([("search", schema)]), "search").unwrap();
        let first = graph.node("must/[0]").unwrap();
        let second = graph.node("must/[1]").unwrap();
        assert_eq!(first.label, "[0]");
        assert_eq!(second.label, "[0]");
        assert_eq!(second.data.key, "[1]");
        assert!(graph.node("must/[1]/term").is_some());
        assert!(graph.edge("must_must/[0]_object").is_some());
    }

    #[test]
    fn test_empty_array_has_no_node() {
        let graph = build(HashMap::from([("search", json!({ "stored_fields": [] }))]), "search").unwrap();
        assert!(graph.node("stored_fields").is_none());
    }

    #[test]
    fn test_variants() {
        let schema = json!({
            "_source": {
                "__string": { "__as_type": "string" },
                "__array": ["field"],
                "__object": { "includes": [], "excludes": ["x"] }
            }
        });
        let graph = build(HashMap::from([("search", schema)]), "search").unwrap();
        assert!(graph.node("_source").is_none());
        for kind in ["array", "object", "string"] {
            let node = graph.node(&format!("_source-{}", kind)).unwrap();
            assert_eq!(node.label, "_source");
            assert_eq!(node.data.types, vec![kind]);
            assert!(graph.edge(&format!("root__source-{}_{}", kind, kind)).is_some());
        }
        assert_eq!(
            graph.node("_source-array/[0]").and_then(|n| n.data.default_value.clone()).as_deref(),
            Some("field")
        );
        assert!(graph.node("_source-object/excludes").is_some());
    }

    #[test]
    fn test_dynamic_nodes() {
        let schema = json!({ "aggs": { "{name}": { "terms": { "field": "" } } } });
        let graph = build(HashMap::from([("search", schema)]), "search").unwrap();
        assert!(graph.node("aggs/{name}").unwrap().data.is_dynamic);
        assert!(!graph.node("aggs").unwrap().data.is_dynamic);
    }

    // ===== Directive tests =====

    #[test]
    fn test_import_and_detached_sections() {
        let search = json!({
            "__import_file": ["endpoint_query_dsl"],
            "query": { "__children_of": "query_types" }
        });
        let dsl = json!({
            "__query": { "query_types": { "match_all": {}, "term": { "{field}": "" } } },
            "__inactive": { "ignored": {} }
        });
        let graph = build(HashMap::from([("search", search), ("query_dsl", dsl)]), "search").unwrap();

        assert_eq!(graph.node("query_types").map(|n| n.data.depth), Some(DETACHED_DEPTH));
        assert!(graph.node("ignored").is_none());
        assert_eq!(targets(&graph, ROOT_NODE), vec!["query"]);
        assert!(graph.edge("query_query_types/match_all_object").is_some());
        assert!(graph.edge("query_query_types/term_object").is_some());
    }

    #[test]
    fn test_children_of_chain() {
        let schema = json!({
            "__defs": {
                "base": { "boost": 1.0 },
                "extended": { "__children_of": "base", "name": "" }
            },
            "field": { "__children_of": ["extended"] }
        });
        let graph = build(HashMap::from([("search", schema)]), "search").unwrap();
        assert!(graph.edge("field_extended/name_string").is_some());
        assert!(graph.edge("field_base/boost_number").is_some());
        // `extended` is only referenced through children_of, so it inherits nothing.
        assert!(graph.edge("extended_base/boost_number").is_none());
    }

    #[test]
    fn test_import_cycle_loads_once() {
        let a = json!({ "__import_file": ["b"], "a": 1 });
        let b = json!({ "__import_file": ["search"], "b": 2 });
        let graph = build(HashMap::from([("search", a), ("b", b)]), "search").unwrap();
        assert!(graph.has_node("a"));
        assert!(graph.has_node("b"));
    }

    #[test]
    fn test_missing_schema() {
        assert!(build(HashMap::new(), "endpoint_search").is_none());
    }
}
