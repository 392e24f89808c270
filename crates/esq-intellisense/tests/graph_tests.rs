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

//! Graph construction in arbitrary order and graphs built from specifications.

use esq_intellisense::method_graph::{children_at, endpoint_id_for, split_steps};
use esq_intellisense::endpoint::parse_endpoints;
use esq_intellisense::{build_body_graph, build_method_graphs, Graph};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;

// =============================================================================
// Deferred edges
// =============================================================================

#[test]
fn test_edges_before_any_node() {
    let mut graph: Graph<()> = Graph::new();
    graph.add_edge("a", "b", None);
    graph.add_edge("b", "c", Some("object"));
    assert!(graph.edges().is_empty());
    assert_eq!(graph.pending_edges().len(), 2);

    graph.add_node("c", "c", ());
    graph.add_node("b", "b", ());
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.edges()[0].id, "b_c_object");

    graph.add_node("a", "a", ());
    assert!(graph.pending_edges().is_empty());
    assert_eq!(graph.node("b").unwrap().incoming(), 1);
    assert_eq!(graph.node("c").unwrap().incoming(), 1);
    assert_eq!(graph.root_nodes().map(|n| n.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
}

#[test]
fn test_edge_to_missing_node_stays_pending() {
    let mut graph: Graph<()> = Graph::new();
    graph.add_node("a", "a", ());
    graph.add_edge("a", "ghost", None);
    assert!(graph.edges().is_empty());
    assert_eq!(graph.outgoing_nodes("a").count(), 0);
    assert_eq!(graph.root_nodes().count(), 1);
}

#[test]
fn test_same_pair_with_different_kinds() {
    let mut graph: Graph<()> = Graph::new();
    graph.add_node("a", "a", ());
    graph.add_node("b", "b", ());
    assert!(graph.add_edge("a", "b", Some("object")));
    assert!(graph.add_edge("a", "b", Some("array")));
    assert!(!graph.add_edge("a", "b", Some("array")));
    assert_eq!(graph.edges().len(), 2);
    assert_eq!(graph.node("b").unwrap().incoming(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: once every node exists, no edge is left pending and each
    /// edge counts once towards its target's incoming degree.
    #[test]
    fn prop_insertion_order_does_not_matter(
        pairs in prop::collection::vec((0usize..6, 0usize..6), 0..20),
        nodes_first in any::<bool>(),
    ) {
        let mut graph: Graph<()> = Graph::new();
        let add_nodes = |graph: &mut Graph<()>| {
            for i in 0..6 {
                graph.add_node(format!("n{}", i), format!("n{}", i), ());
            }
        };

        if nodes_first {
            add_nodes(&mut graph);
        }
        for (source, target) in &pairs {
            graph.add_edge(&format!("n{}", source), &format!("n{}", target), None);
        }
        if !nodes_first {
            add_nodes(&mut graph);
        }

        prop_assert!(graph.pending_edges().is_empty());
        let incoming: usize = graph.nodes().iter().map(|n| n.incoming()).sum();
        prop_assert_eq!(incoming, graph.edges().len());

        let mut unique = pairs.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(graph.edges().len(), unique.len());
    }
}

// =============================================================================
// Method graphs
// =============================================================================

const ENDPOINTS: &str = r#"{
  "index": {
    "methods": ["POST", "PUT"],
    "url": { "paths": ["/{index}/_doc/{id}", "/{index}/_doc"] }
  },
  "indices.get_mapping": {
    "methods": ["GET"],
    "url": { "paths": ["/_mapping", "/{index}/_mapping"] }
  },
  "indices.get": {
    "methods": ["GET"],
    "url": { "paths": ["/{index}"] }
  },
  "info": {
    "methods": ["GET"],
    "url": { "path": "/", "paths": ["/"] }
  }
}"#;

#[test]
fn test_method_graph_resolution() {
    let endpoints = parse_endpoints("fixture", ENDPOINTS).unwrap();
    let graphs = build_method_graphs(&endpoints, &BTreeMap::new());
    let get = &graphs["method_get"];
    let put = &graphs["method_put"];

    assert_eq!(endpoint_id_for(get, "/_mapping").as_deref(), Some("endpoint_indices.get_mapping"));
    assert_eq!(endpoint_id_for(get, "/logs/_mapping").as_deref(), Some("endpoint_indices.get_mapping"));
    assert_eq!(endpoint_id_for(get, "/logs").as_deref(), Some("endpoint_indices.get"));
    assert_eq!(endpoint_id_for(get, "/").as_deref(), Some("endpoint_info"));
    assert_eq!(endpoint_id_for(put, "/logs/_doc/1").as_deref(), Some("endpoint_index"));
    assert_eq!(endpoint_id_for(put, "/LOGS/_DOC").as_deref(), Some("endpoint_index"));
    assert!(endpoint_id_for(put, "/logs/_search").is_none());
}

#[test]
fn test_method_graph_backtracks_over_dynamic_steps() {
    let endpoints = parse_endpoints("fixture", ENDPOINTS).unwrap();
    let graphs = build_method_graphs(&endpoints, &BTreeMap::new());
    let get = &graphs["method_get"];

    let steps = split_steps("logs/_mapping");
    let children = children_at(get, &steps);
    assert!(children.iter().any(|n| n.id == "endpoint_indices.get_mapping"));
}

// =============================================================================
// Body graphs
// =============================================================================

#[test]
fn test_body_graph_from_imports() {
    let files = BTreeMap::from([
        (
            "search",
            json!({
                "__import_file": ["query_dsl"],
                "query": { "__children_of": "queries" },
                "from": 0
            }),
        ),
        (
            "query_dsl",
            json!({ "__queries": { "queries": { "bool": { "must": [{ "__children_of": "queries" }] } } } }),
        ),
    ]);

    let graph = build_body_graph("endpoint_search", |name| files.get(name).cloned()).unwrap();
    let root_children: Vec<&str> = graph.outgoing_nodes("root").map(|n| n.label.as_str()).collect();
    assert_eq!(root_children, vec!["from", "query"]);

    let query_children: Vec<&str> = graph
        .edges_with_source("query")
        .filter(|e| !e.is_kind("children_of"))
        .filter_map(|e| graph.node(&e.target))
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(query_children, vec!["bool"]);
    assert!(graph.edge("query_queries_children_of").is_some());
    assert_eq!(graph.node("from").unwrap().data.default_value.as_deref(), Some("0"));
}
