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

//! Directed graph with deferred edges.
//!
//! Specification files are walked in arbitrary order and reference nodes
//! that may not exist yet. An edge whose endpoints are not both present is
//! parked in a pending list and promoted as soon as the missing node is
//! added, so loaders never need a second pass.
//!
//! # Examples
//!
//! ```
//! use esq_intellisense::Graph;
//!
//! let mut graph: Graph<()> = Graph::new();
//! graph.add_edge("a", "b", None);
//! assert_eq!(graph.pending_edges().len(), 1);
//!
//! graph.add_node("b", "b", ());
//! graph.add_node("a", "a", ());
//! assert!(graph.pending_edges().is_empty());
//! assert_eq!(graph.edges().len(), 1);
//! assert_eq!(graph.node("b").map(|n| n.incoming()), Some(1));
//!
//! let roots: Vec<_> = graph.root_nodes().map(|n| n.id.as_str()).collect();
//! assert_eq!(roots, vec!["a"]);
//! ```

use std::collections::{HashMap, HashSet};

/// A graph node carrying caller data.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<D> {
    pub id: String,
    pub label: String,
    pub data: D,
    incoming: usize,
}

impl<D> Node<D> {
    /// Number of live edges pointing at this node.
    pub fn incoming(&self) -> usize {
        self.incoming
    }
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: Option<String>,
    /// Optional ranking weight; the builders leave it unset.
    pub weight: Option<f64>,
}

impl Edge {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}

/// Edge id derived from its endpoints and kind.
pub fn edge_id(source: &str, target: &str, kind: Option<&str>) -> String {
    match kind {
        Some(kind) => format!("{}_{}_{}", source, target, kind),
        None => format!("{}_{}", source, target),
    }
}

/// Nodes in insertion order plus live and pending edges.
#[derive(Debug, Clone)]
pub struct Graph<D> {
    nodes: Vec<Node<D>>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    pending: Vec<Edge>,
    edge_ids: HashSet<String>,
}

impl<D> Default for Graph<D> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            pending: Vec::new(),
            edge_ids: HashSet::new(),
        }
    }
}

impl<D> Graph<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every node and edge, pending ones included.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.pending.clear();
        self.edge_ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ==================== Mutation ====================

    /// Add a node; a node with the same id is kept as is.
    ///
    /// Returns false when the id already existed. Pending edges that now
    /// have both endpoints are promoted.
    pub fn add_node(&mut self, id: impl Into<String>, label: impl Into<String>, data: D) -> bool {
        let id = id.into();
        if self.index.contains_key(&id) {
            return false;
        }

        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node {
            id: id.clone(),
            label: label.into(),
            data,
            incoming: 0,
        });

        if !self.pending.is_empty() {
            self.promote(&id);
        }
        true
    }

    /// Add an edge with an id derived from `source`, `target` and `kind`.
    pub fn add_edge(&mut self, source: &str, target: &str, kind: Option<&str>) -> bool {
        let id = edge_id(source, target, kind);
        self.add_edge_with_id(id, source, target, kind)
    }

    /// Add an edge under an explicit id.
    ///
    /// Edges with an empty endpoint are ignored, as are ids already used by a
    /// live or pending edge. Returns true when the edge was recorded.
    pub fn add_edge_with_id(
        &mut self,
        id: impl Into<String>,
        source: &str,
        target: &str,
        kind: Option<&str>,
    ) -> bool {
        if source.is_empty() || target.is_empty() {
            return false;
        }

        let id = id.into();
        if !self.edge_ids.insert(id.clone()) {
            return false;
        }

        let edge = Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            kind: kind.map(str::to_string),
            weight: None,
        };

        if self.index.contains_key(source) {
            if let Some(&target) = self.index.get(target) {
                self.nodes[target].incoming += 1;
                self.edges.push(edge);
                return true;
            }
        }

        self.pending.push(edge);
        true
    }

    /// Move pending edges touching `id` whose endpoints both exist.
    fn promote(&mut self, id: &str) {
        let index = &self.index;
        let (ready, waiting): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.pending).into_iter().partition(|edge| {
                (edge.source == id || edge.target == id)
                    && index.contains_key(&edge.source)
                    && index.contains_key(&edge.target)
            });
        self.pending = waiting;

        for edge in ready {
            if let Some(&target) = self.index.get(&edge.target) {
                self.nodes[target].incoming += 1;
            }
            self.edges.push(edge);
        }
    }

    // ==================== Lookup ====================

    pub fn nodes(&self) -> &[Node<D>] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node<D>> {
        self.nodes.iter_mut()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges still waiting for an endpoint.
    pub fn pending_edges(&self) -> &[Edge] {
        &self.pending
    }

    pub fn node(&self, id: &str) -> Option<&Node<D>> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node<D>> {
        self.index.get(id).map(|&i| &mut self.nodes[i])
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Live edge with the given id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Set the weight of a live or pending edge. Returns false for an
    /// unknown id.
    pub fn set_edge_weight(&mut self, id: &str, weight: Option<f64>) -> bool {
        match self.edges.iter_mut().chain(self.pending.iter_mut()).find(|e| e.id == id) {
            Some(edge) => {
                edge.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Nodes without incoming edges, in insertion order.
    pub fn root_nodes(&self) -> impl Iterator<Item = &Node<D>> {
        self.nodes.iter().filter(|n| n.incoming == 0)
    }

    /// Targets of the edges leaving `id`, in edge order.
    pub fn outgoing_nodes<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g Node<D>> + 'g {
        self.edges_with_source(id).filter_map(|e| self.node(&e.target))
    }

    pub fn edges_with_source<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g Edge> + 'g {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn edges_with_target<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g Edge> + 'g {
        self.edges.iter().filter(move |e| e.target == id)
    }

    pub fn find_node<P>(&self, predicate: P) -> Option<&Node<D>>
    where
        P: Fn(&Node<D>) -> bool,
    {
        self.nodes.iter().find(|n| predicate(n))
    }

    pub fn find_nodes<P>(&self, predicate: P) -> Vec<&Node<D>>
    where
        P: Fn(&Node<D>) -> bool,
    {
        self.nodes.iter().filter(|n| predicate(n)).collect()
    }

    pub fn find_edges<P>(&self, predicate: P) -> Vec<&Edge>
    where
        P: Fn(&Edge) -> bool,
    {
        self.edges.iter().filter(|e| predicate(e)).collect()
    }
}
