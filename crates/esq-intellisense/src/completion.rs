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

//! Completion candidates for query documents.
//!
//! The token under the cursor decides what is suggested:
//!
//! - **Command**: URL steps and endpoints from the method graph
//! - **Query string**: parameter names, or the values of one parameter
//! - **Body**: fields and values from the endpoint's body graph
//!
//! # Examples
//!
//! ```text
//! GET /_cat/|                 → indices, nodes, …
//! GET /_search?|              → size, search_type, pretty, …
//! GET /_search?search_type=|  → query_then_fetch, dfs_query_then_fetch
//! POST /_search { "query": {| → match, match_all, term, …
//! ```
//!
//! Insert texts are snippets: `{placeholder}` segments become
//! `${n:placeholder}` tab stops.

use crate::body_graph::{BodyGraph, BodyNode};
use crate::constants::{
    KIND_ARRAY, KIND_BOOLEAN, KIND_CHILDREN_OF, KIND_NUMBER, KIND_OBJECT, KIND_STRING, ROOT_NODE,
};
use crate::graph::{Edge, Node};
use crate::manager::GraphManager;
use crate::method_graph::{children_at, split_steps, MethodGraph, MethodNode};
use esq_core::lex::EntityScanner;
use esq_core::path::{self, PathSegment};
use esq_core::{Entity, Query, QueryDocument, TextToken, TokenKind};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Kind of a completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    /// A command resolving to an endpoint.
    Method,
    /// An intermediate command step.
    Folder,
    /// A query-string parameter.
    Field,
    /// A query-string parameter value.
    Value,
    /// A body field holding an object.
    Module,
    /// A body field holding an array.
    Enum,
    /// A value of an enumerated body field.
    EnumMember,
    /// Any other body field.
    Property,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Snippet inserted when the candidate is accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            filter_text: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn with_insert_text(mut self, insert_text: Option<String>) -> Self {
        self.insert_text = insert_text;
        self
    }

    /// Filter text: the label without its first `{` and `}`.
    fn filtered(mut self) -> Self {
        self.filter_text = Some(self.label.replacen('{', "", 1).replacen('}', "", 1));
        self
    }
}

/// Where the cursor sits inside a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionContext {
    Command,
    QueryString,
    Body,
    /// Method, arguments or nothing at all.
    Unknown,
}

/// Completion context at `offset`.
pub fn determine_context(query: &Query, offset: usize) -> CompletionContext {
    match query.token_at(offset).map(|t| t.kind) {
        Some(TokenKind::Command) => CompletionContext::Command,
        Some(TokenKind::QueryString) => CompletionContext::QueryString,
        Some(TokenKind::Body) => CompletionContext::Body,
        _ => CompletionContext::Unknown,
    }
}

/// Completions for the query under `offset` in `text`.
pub fn complete_document(manager: &GraphManager, text: &str, offset: usize) -> Vec<CompletionItem> {
    let mut document = QueryDocument::parse(text);

    let Some(query) = document.query_at_mut(offset) else {
        debug!(offset, "no query at offset");
        return Vec::new();
    };
    if query.endpoint_id().is_none() {
        query.set_endpoint_id(endpoint_id(manager, query));
    }

    completions(manager, query, offset)
}

/// Completions for `query` at the document offset `offset`.
pub fn completions(manager: &GraphManager, query: &Query, offset: usize) -> Vec<CompletionItem> {
    let Some(token) = query.token_at(offset) else {
        warn!(offset, "could not find any token at offset");
        return Vec::new();
    };

    match determine_context(query, offset) {
        CompletionContext::Command => command_completions(manager, query),
        CompletionContext::QueryString => query_string_completions(manager, query, token, offset),
        CompletionContext::Body => body_completions(manager, query, token, offset),
        CompletionContext::Unknown => Vec::new(),
    }
}

fn endpoint_id(manager: &GraphManager, query: &Query) -> Option<String> {
    if let Some(id) = query.endpoint_id() {
        return Some(id.to_string());
    }
    manager.endpoint_id_for(query.method()?, query.command()?)
}

// ============================================================================
// Command
// ============================================================================

struct StepWalk<'g> {
    node: &'g Node<MethodNode>,
    path: String,
    depth: usize,
}

/// Commands continuing the steps typed so far; the last step is the one
/// being typed and is ignored.
fn command_completions(manager: &GraphManager, query: &Query) -> Vec<CompletionItem> {
    let (Some(method), Some(command)) = (query.method(), query.command()) else {
        return Vec::new();
    };
    if !query.has_command() {
        return Vec::new();
    }
    let Some(graph) = manager.method_graph(method) else {
        return Vec::new();
    };

    let command = command.to_ascii_lowercase();
    let mut steps = split_steps(&command);
    steps.pop();

    let roots: Vec<&Node<MethodNode>> = if steps.is_empty() {
        graph.root_nodes().collect()
    } else {
        children_at(&graph, &steps)
    };

    walk_commands(&graph, roots)
}

fn walk_commands(graph: &MethodGraph, roots: Vec<&Node<MethodNode>>) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<StepWalk<'_>> = roots
        .into_iter()
        .map(|node| StepWalk {
            node,
            path: node.label.clone(),
            depth: 0,
        })
        .collect();

    while let Some(walk) = stack.pop() {
        if !visited.insert(walk.node.id.as_str()) {
            continue;
        }

        for target in graph.outgoing_nodes(&walk.node.id) {
            let label = walk.path.as_str();

            if target.data.is_endpoint() {
                items.retain(|item| item.label != label);
                items.push(command_item(label, CompletionKind::Method));
            } else if target.data.is_step() {
                if walk.depth == 0 {
                    let exists = items.iter().any(|item| item.label == label);
                    if !exists && graph.edges_with_source(&target.id).count() > 1 {
                        items.push(command_item(label, CompletionKind::Folder));
                    }
                }

                stack.push(StepWalk {
                    node: target,
                    path: format!("{}/{}", walk.path, target.label),
                    depth: walk.depth + 1,
                });
            }
        }
    }

    items
}

fn command_item(label: &str, kind: CompletionKind) -> CompletionItem {
    CompletionItem::new(label, kind)
        .with_insert_text(Some(create_text_snippet(label)))
        .filtered()
}

// ============================================================================
// Query string
// ============================================================================

fn query_string_completions(
    manager: &GraphManager,
    query: &Query,
    token: &TextToken,
    offset: usize,
) -> Vec<CompletionItem> {
    let (Some(method), Some(endpoint_id)) = (query.method(), endpoint_id(manager, query)) else {
        return Vec::new();
    };
    let Some(graph) = manager.method_graph(method) else {
        return Vec::new();
    };

    let in_value = token.has_text() && token.value.as_ref().is_some_and(|v| v.contains(offset));

    if in_value {
        let id = format!("{}/{}", endpoint_id, token.text());
        let Some(param) = graph.node(&id).and_then(|n| n.data.parameter()) else {
            return Vec::new();
        };

        if !param.options.is_empty() {
            return param
                .options
                .iter()
                .map(|option| CompletionItem::new(option.as_str(), CompletionKind::Value))
                .collect();
        }
        if param.is_boolean() {
            return ["true", "false"]
                .into_iter()
                .map(|value| CompletionItem::new(value, CompletionKind::Value))
                .collect();
        }
        return Vec::new();
    }

    let items = graph
        .outgoing_nodes(&endpoint_id)
        .filter_map(|node| {
            let param = node.data.parameter()?;
            Some(
                CompletionItem::new(node.label.as_str(), CompletionKind::Field)
                    .with_detail(param.detail())
                    .with_documentation(param.description.clone())
                    .filtered(),
            )
        })
        .collect();
    items
}

// ============================================================================
// Body
// ============================================================================

fn body_completions(
    manager: &GraphManager,
    query: &Query,
    body: &TextToken,
    offset: usize,
) -> Vec<CompletionItem> {
    let Some(endpoint_id) = endpoint_id(manager, query) else {
        return Vec::new();
    };
    let Some(graph) = manager.body_graph(&endpoint_id) else {
        return Vec::new();
    };

    let offset_in_body = offset.saturating_sub(body.offset);
    let prefix = safe_prefix(body.text(), offset_in_body + 1);
    let mut scanner = EntityScanner::new(prefix).recording();
    let Some(token) = scanner.scan_until_position(offset_in_body) else {
        return Vec::new();
    };

    let context = BodyContext::new(&graph, scanner.scanned(), &token);
    match context.resolve() {
        Some((node, edge)) => context.candidates(node, edge),
        None => {
            debug!(path = ?context.path, "body path does not resolve");
            Vec::new()
        }
    }
}

/// Longest prefix of `text` no longer than `end` bytes.
fn safe_prefix(text: &str, end: usize) -> &str {
    let mut end = end.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Cursor token and the tokens scanned before it.
struct BodyContext<'a> {
    graph: &'a BodyGraph,
    tokens: &'a [TextToken],
    token: &'a TextToken,
    /// Path of the structure whose children are suggested.
    path: Option<String>,
    /// Key being typed, when the cursor is on a property name.
    typed_key: Option<&'a str>,
}

impl<'a> BodyContext<'a> {
    fn new(graph: &'a BodyGraph, tokens: &'a [TextToken], token: &'a TextToken) -> Self {
        let is_key = token.kind == TokenKind::Property && token.value.is_none();
        let path = if is_key {
            token.path.as_deref().and_then(path::parent).map(str::to_string)
        } else {
            token.path.clone()
        };

        Self {
            graph,
            tokens,
            token,
            path,
            typed_key: is_key.then(|| token.text()),
        }
    }

    fn token_with_path(&self, path: &str) -> Option<&'a TextToken> {
        self.tokens.iter().find(|t| t.path.as_deref() == Some(path))
    }

    /// Walk from `root` along the path, one segment per depth.
    ///
    /// Returns the node reached and the edge used for the last step.
    fn resolve(&self) -> Option<(&'a Node<BodyNode>, Option<&'a Edge>)> {
        let mut node = self.graph.node(ROOT_NODE)?;
        let mut last_edge = None;
        let mut walked: Option<String> = None;

        let segments = self.path.as_deref().map(path::segments).unwrap_or_default();
        for segment in segments {
            let name = segment.to_path_string();
            let step = match segment {
                PathSegment::Index(_) => "[0]",
                PathSegment::Key(key) => key,
            };
            let current_path = path::join(walked.as_deref(), &name);
            let current = self.token_with_path(&current_path)?;
            let edges = self.edges_for(node, current.value_kind().unwrap_or(current.kind));

            let (next, edge) = self
                .by_label(&edges, step)
                .or_else(|| self.by_context(&edges, step, current))
                .or_else(|| self.by_dynamic(&edges))?;

            node = next;
            last_edge = Some(edge);
            walked = Some(current_path);
        }

        Some((node, last_edge))
    }

    /// Edges leaving `node` that fit a token of kind `kind`.
    fn edges_for(&self, node: &'a Node<BodyNode>, kind: TokenKind) -> Vec<&'a Edge> {
        self.graph
            .edges_with_source(&node.id)
            .filter(|edge| match kind {
                TokenKind::PropertyValue => {
                    !matches!(edge.kind(), Some(KIND_ARRAY | KIND_OBJECT | KIND_CHILDREN_OF))
                }
                TokenKind::OpenEntity => edge.is_kind(KIND_OBJECT),
                TokenKind::OpenArray => edge.is_kind(KIND_ARRAY),
                _ => false,
            })
            .collect()
    }

    fn target(&self, edge: &Edge) -> Option<&'a Node<BodyNode>> {
        self.graph.node(&edge.target)
    }

    fn by_label(&self, edges: &[&'a Edge], step: &str) -> Option<(&'a Node<BodyNode>, &'a Edge)> {
        edges.iter().find_map(|edge| {
            let node = self.target(edge).filter(|n| n.label == step)?;
            Some((node, *edge))
        })
    }

    /// A sibling key whose value selects the structure, such as
    /// `"type": "edge_ngram"` choosing the settings of that tokenizer.
    fn by_context(
        &self,
        edges: &[&'a Edge],
        step: &str,
        current: &TextToken,
    ) -> Option<(&'a Node<BodyNode>, &'a Edge)> {
        for edge in edges {
            let Some(selector_node) = self.target(edge) else {
                continue;
            };
            let selector = self
                .tokens
                .iter()
                .find(|t| t.depth() == current.depth() && t.text() == selector_node.label);
            let Some(selected) = selector.and_then(TextToken::value_text) else {
                continue;
            };

            for group in self.graph.outgoing_nodes(&selector_node.id) {
                for choice in self.graph.outgoing_nodes(&group.id) {
                    if choice.label != selected {
                        continue;
                    }
                    for choice_edge in self.graph.edges_with_source(&choice.id) {
                        if let Some(node) = self.target(choice_edge).filter(|n| n.label == step) {
                            return Some((node, choice_edge));
                        }
                    }
                }
            }
        }
        None
    }

    fn by_dynamic(&self, edges: &[&'a Edge]) -> Option<(&'a Node<BodyNode>, &'a Edge)> {
        edges.iter().find_map(|edge| {
            let node = self.target(edge).filter(|n| n.data.is_dynamic)?;
            Some((node, *edge))
        })
    }

    /// Children of `node` not yet present in the body, in edge order.
    /// A label found twice keeps its latest item.
    fn candidates(&self, node: &'a Node<BodyNode>, context: Option<&'a Edge>) -> Vec<CompletionItem> {
        let mut queue: VecDeque<&Edge> = self
            .graph
            .edges_with_source(&node.id)
            .filter(|e| !e.is_kind(KIND_CHILDREN_OF))
            .collect();
        let mut items = Vec::new();

        while let Some(edge) = queue.pop_front() {
            let Some(target) = self.target(edge) else {
                continue;
            };

            let property_path = path::join(self.path.as_deref(), &target.label);
            if let Some(existing) = self.token_with_path(&property_path) {
                // a typed string value can unlock the children of that value
                if edge.is_kind(KIND_STRING) {
                    if let Some(selected) = existing.value_text() {
                        if let Some(choice) = self.graph.outgoing_nodes(&target.id).find(|n| n.label == selected) {
                            queue.extend(
                                self.graph
                                    .edges_with_source(&choice.id)
                                    .filter(|e| !e.is_kind(KIND_CHILDREN_OF)),
                            );
                        }
                    }
                }
                continue;
            }

            if let Some(item) = self.item(edge, target, context) {
                let key = self.dedup_key(&item);
                items.retain(|existing| self.dedup_key(existing) != key);
                items.push(item);
            }
        }

        items
    }

    /// Items sharing a key collapse to the last one found. Array entries
    /// share the label `<kind> value`, so their inserted text is the key.
    fn dedup_key<'i>(&self, item: &'i CompletionItem) -> &'i str {
        match self.token.value_kind() {
            Some(TokenKind::OpenArray) => item.insert_text.as_deref().unwrap_or(&item.label),
            _ => &item.label,
        }
    }

    fn item(&self, edge: &Edge, target: &Node<BodyNode>, context: Option<&Edge>) -> Option<CompletionItem> {
        let value = self.token.value.as_deref();
        let mut label = target.label.clone();
        let mut kind = edge.kind.clone();
        let mut has_label = true;
        let mut pattern = String::from("\"{label}\": {value}");

        match value.map(|v| v.kind) {
            None if self.typed_key.is_some_and(|key| !key.is_empty()) => {
                let typed = self.typed_key.unwrap_or_default();
                if !target.label.starts_with(typed) {
                    return None;
                }
                pattern = pattern.replacen("{label}", &label, 1);
            }
            Some(TokenKind::PropertyValue) => {
                pattern = String::from("{value}");
                has_label = false;
                kind = context.and_then(|c| c.kind.clone());
            }
            Some(TokenKind::OpenArray) => {
                pattern = String::from("{value}");
                has_label = false;
                label = format!("{} value", edge.kind().unwrap_or_default());
            }
            _ => pattern = pattern.replacen("{label}", &label, 1),
        }

        let default = target.data.default_value.as_deref();
        let quoted_default = || match default {
            Some(default) => format!("\"{{{}}}\"$0", default),
            None => String::from("\"$2\"$0"),
        };

        let (completion_kind, pattern) = match kind.as_deref() {
            Some(KIND_OBJECT) => (CompletionKind::Module, Some(pattern.replacen("{value}", "{$0}", 1))),
            Some(KIND_ARRAY) => (CompletionKind::Enum, Some(pattern.replacen("{value}", "[$0]", 1))),
            Some(KIND_NUMBER | KIND_BOOLEAN) => {
                let value = default.map_or_else(|| String::from("$0"), |d| format!("{{{}}}$0", d));
                (CompletionKind::Property, Some(pattern.replacen("{value}", &value, 1)))
            }
            _ => match value {
                Some(value) if !has_label => {
                    let pattern = if value.kind == TokenKind::OpenArray {
                        Some(pattern.replacen("{value}", &quoted_default(), 1))
                    } else if !value.is_valid {
                        Some(pattern.replacen("{value}", &format!("{}\"$0", target.label), 1))
                    } else if !target.data.is_dynamic {
                        None
                    } else {
                        Some(pattern)
                    };
                    (CompletionKind::EnumMember, pattern)
                }
                _ => (CompletionKind::Property, Some(pattern.replacen("{value}", &quoted_default(), 1))),
            },
        };

        let mut item = CompletionItem::new(label, completion_kind)
            .with_insert_text(pattern.map(|p| create_text_snippet(&p)))
            .filtered();
        item.detail = kind;
        Some(item)
    }
}

// ============================================================================
// Snippets
// ============================================================================

/// Turn `{placeholder}` segments into numbered tab stops.
///
/// The first `{{` and `}}` are unescaped first. Placeholders consist of word
/// characters, `|` and spaces.
///
/// # Examples
///
/// ```
/// use esq_intellisense::create_text_snippet;
///
/// assert_eq!(create_text_snippet("{index}/_doc/{id}"), "${1:index}/_doc/${2:id}");
/// assert_eq!(create_text_snippet("\"query\": {$0}"), "\"query\": {$0}");
/// ```
pub fn create_text_snippet(text: &str) -> String {
    let text = text.replacen("{{", "{", 1).replacen("}}", "}", 1);
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text.as_str();
    let mut index = 1;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find(|c: char| !is_placeholder_char(c)) {
            Some(close) if close > 0 && after[close..].starts_with('}') => {
                out.push_str(&format!("${{{}:{}}}", index, &after[..close]));
                index += 1;
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '|' || c == ' '
}
