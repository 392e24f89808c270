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

//! Method graphs: URL steps leading to endpoints.
//!
//! One graph per HTTP method. Every URL template is split into steps that
//! chain from a root step to the endpoint node:
//!
//! ```text
//! {index} ──► {index}/_search ──► endpoint_search ──► endpoint_search/size
//! _search ─────────────────────────┘
//! ```
//!
//! Step ids are the template prefix up to and including the step, so two
//! templates sharing a prefix share nodes. Parameter nodes hang off their
//! endpoint and carry the parameter description.

use crate::constants::{KIND_CHILDREN_OF, METHOD_GRAPH_PREFIX, ROOT_STEP};
use crate::endpoint::{Endpoint, Param};
use crate::graph::{Graph, Node};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// What a method graph node stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodNodeKind {
    /// One segment of a URL template.
    Step,
    /// A REST endpoint.
    Endpoint,
    /// A query-string parameter of the parent endpoint.
    Parameter(Param),
}

/// Data of a method graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode {
    pub kind: MethodNodeKind,
    /// Template variables such as `{index}` match any concrete step.
    pub is_dynamic: bool,
}

impl MethodNode {
    fn new(kind: MethodNodeKind, label: &str) -> Self {
        Self {
            kind,
            is_dynamic: label.ends_with('}'),
        }
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self.kind, MethodNodeKind::Endpoint)
    }

    pub fn is_step(&self) -> bool {
        matches!(self.kind, MethodNodeKind::Step)
    }

    pub fn parameter(&self) -> Option<&Param> {
        match &self.kind {
            MethodNodeKind::Parameter(param) => Some(param),
            _ => None,
        }
    }
}

pub type MethodGraph = Graph<MethodNode>;

/// Cache key of the graph for `method` (`method_get`).
pub fn method_graph_key(method: &str) -> String {
    format!("{}{}", METHOD_GRAPH_PREFIX, method.to_ascii_lowercase())
}

/// Steps of a URL template or command.
///
/// The bare `/` becomes the single step `/`.
pub fn split_steps(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return vec![ROOT_STEP];
    }
    trimmed.split('/').collect()
}

/// Build one graph per method from `endpoints`, merging `common` parameters
/// into every endpoint node.
pub fn build_method_graphs(
    endpoints: &[Endpoint],
    common: &BTreeMap<String, Param>,
) -> HashMap<String, MethodGraph> {
    let mut graphs: HashMap<String, MethodGraph> = HashMap::new();

    for endpoint in endpoints {
        for (path, methods) in endpoint.routes() {
            for method in methods {
                let graph = graphs.entry(method_graph_key(method)).or_default();
                add_endpoint(graph, endpoint);
                add_route(graph, &endpoint.id, path);
            }
        }
    }

    for (key, graph) in graphs.iter_mut() {
        let endpoint_ids: Vec<String> = graph
            .find_nodes(|n| n.data.is_endpoint())
            .into_iter()
            .map(|n| n.id.clone())
            .collect();
        for id in &endpoint_ids {
            add_parameters(graph, id, common);
        }

        debug!(
            "loaded graph {} with {} nodes and {} edges",
            key,
            graph.nodes().len(),
            graph.edges().len()
        );
    }

    graphs
}

fn add_endpoint(graph: &mut MethodGraph, endpoint: &Endpoint) {
    let data = MethodNode::new(MethodNodeKind::Endpoint, &endpoint.id);
    if graph.add_node(endpoint.id.as_str(), endpoint.id.as_str(), data) {
        add_parameters(graph, &endpoint.id, &endpoint.url.params);
    }
}

fn add_parameters(graph: &mut MethodGraph, endpoint_id: &str, params: &BTreeMap<String, Param>) {
    for (name, param) in params {
        let id = format!("{}/{}", endpoint_id, name);
        let data = MethodNode::new(MethodNodeKind::Parameter(param.clone()), name);
        graph.add_node(id.as_str(), name.as_str(), data);
        graph.add_edge(endpoint_id, &id, None);
    }
}

fn add_route(graph: &mut MethodGraph, endpoint_id: &str, path: &str) {
    let steps = split_steps(path);
    let mut previous: Option<String> = None;

    for (index, step) in steps.iter().enumerate() {
        let id = match &previous {
            Some(previous) => format!("{}/{}", previous, step),
            None => (*step).to_string(),
        };

        graph.add_node(id.as_str(), *step, MethodNode::new(MethodNodeKind::Step, step));
        if let Some(previous) = &previous {
            graph.add_edge(previous, &id, None);
        }
        if index == steps.len() - 1 {
            graph.add_edge(&id, endpoint_id, None);
        }
        previous = Some(id);
    }
}

/// Children of `id`, following `children_of` edges to the inherited nodes.
pub fn children_of<'g, D>(graph: &'g Graph<D>, id: &str) -> Vec<&'g Node<D>> {
    let mut children = Vec::new();
    let mut stack: Vec<&str> = vec![id];
    let mut seen: Vec<&str> = Vec::new();

    while let Some(current) = stack.pop() {
        if seen.contains(&current) {
            continue;
        }
        seen.push(current);

        for edge in graph.edges_with_source(current) {
            if edge.is_kind(KIND_CHILDREN_OF) {
                stack.push(&edge.target);
            } else if let Some(child) = graph.node(&edge.target) {
                children.push(child);
            }
        }
    }
    children
}

/// Children of the node reached by walking `steps` from a root.
///
/// A step matches a node with the same label, otherwise any dynamic node.
/// Dynamic alternatives are tried in insertion order until the whole walk
/// succeeds. Returns an empty list when the first step is empty or the walk
/// fails.
pub fn children_at<'g>(graph: &'g MethodGraph, steps: &[&str]) -> Vec<&'g Node<MethodNode>> {
    let Some((first, rest)) = steps.split_first() else {
        return Vec::new();
    };
    if first.is_empty() {
        return Vec::new();
    }

    let roots: Vec<&Node<MethodNode>> = graph.root_nodes().collect();
    candidates(&roots, first)
        .into_iter()
        .find_map(|root| walk(graph, root, rest))
        .unwrap_or_default()
}

fn walk<'g>(
    graph: &'g MethodGraph,
    node: &'g Node<MethodNode>,
    steps: &[&str],
) -> Option<Vec<&'g Node<MethodNode>>> {
    let children = children_of(graph, &node.id);
    let Some((next, rest)) = steps.split_first() else {
        return Some(children);
    };

    candidates(&children, next)
        .into_iter()
        .find_map(|child| walk(graph, child, rest))
}

/// Exact label matches first, then dynamic nodes for a non-empty step.
fn candidates<'g>(nodes: &[&'g Node<MethodNode>], step: &str) -> Vec<&'g Node<MethodNode>> {
    let mut found: Vec<&Node<MethodNode>> = nodes.iter().copied().filter(|n| n.label == step).collect();
    if !step.is_empty() {
        found.extend(nodes.iter().copied().filter(|n| n.data.is_dynamic && n.label != step));
    }
    found
}

/// Endpoint id reached by `command`, compared case-insensitively.
pub fn endpoint_id_for(graph: &MethodGraph, command: &str) -> Option<String> {
    let command = command.to_ascii_lowercase();
    let steps = split_steps(&command);
    children_at(graph, &steps)
        .into_iter()
        .find(|n| n.data.is_endpoint())
        .map(|n| n.id.clone())
}
