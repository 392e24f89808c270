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

//! REST endpoint descriptions.
//!
//! Each specification file holds one object keyed by the endpoint name:
//!
//! ```json
//! {
//!   "search": {
//!     "documentation": "https://www.elastic.co/guide/…/search-search.html",
//!     "methods": ["GET", "POST"],
//!     "url": {
//!       "paths": ["/_search", "/{index}/_search"],
//!       "params": { "size": { "type": "number", "description": "…" } }
//!     },
//!     "body": { "description": "The search definition" }
//!   }
//! }
//! ```
//!
//! Newer specifications list methods per path
//! (`"paths": [{ "path": "/_search", "methods": ["GET"] }]`); both shapes
//! are accepted.

use crate::constants::ENDPOINT_PREFIX;
use crate::error::{SpecError, SpecResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One REST endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Node id of the endpoint (`endpoint_<name>`).
    #[serde(skip)]
    pub id: String,
    /// A URL, or an object with a `url` field.
    #[serde(default)]
    pub documentation: Option<Value>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub url: EndpointUrl,
    #[serde(default)]
    pub body: Option<EndpointBody>,
}

impl Endpoint {
    /// Endpoint name without the id prefix.
    pub fn name(&self) -> &str {
        self.id.strip_prefix(ENDPOINT_PREFIX).unwrap_or(&self.id)
    }

    /// Documentation URL, whichever shape the file used.
    pub fn documentation_url(&self) -> Option<&str> {
        match self.documentation.as_ref()? {
            Value::String(url) => Some(url),
            Value::Object(map) => map.get("url").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Every path with the methods it accepts.
    ///
    /// Paths without their own method list inherit the endpoint's methods.
    pub fn routes(&self) -> Vec<(&str, &[String])> {
        let mut routes: Vec<(&str, &[String])> = self
            .url
            .paths
            .iter()
            .map(|path| match path {
                EndpointPath::Plain(path) => (path.as_str(), self.methods.as_slice()),
                EndpointPath::Detailed { path, methods } if methods.is_empty() => {
                    (path.as_str(), self.methods.as_slice())
                }
                EndpointPath::Detailed { path, methods } => (path.as_str(), methods.as_slice()),
            })
            .collect();

        if routes.is_empty() {
            if let Some(path) = self.url.path.as_deref() {
                routes.push((path, self.methods.as_slice()));
            }
        }
        routes
    }

    /// Union of the methods of every route, upper-cased, in first-seen order.
    pub fn all_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = Vec::new();
        for (_, route_methods) in self.routes() {
            for method in route_methods.iter().chain(self.methods.iter()) {
                let method = method.to_ascii_uppercase();
                if !methods.contains(&method) {
                    methods.push(method);
                }
            }
        }
        methods
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// URL templates and query-string parameters of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointUrl {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub paths: Vec<EndpointPath>,
    #[serde(default)]
    pub parts: BTreeMap<String, Value>,
    #[serde(default)]
    pub params: BTreeMap<String, Param>,
}

/// A URL template, optionally with its own methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointPath {
    Plain(String),
    Detailed {
        path: String,
        #[serde(default)]
        methods: Vec<String>,
    },
}

impl EndpointPath {
    pub fn path(&self) -> &str {
        match self {
            EndpointPath::Plain(path) => path,
            EndpointPath::Detailed { path, .. } => path,
        }
    }
}

/// A query-string parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default: Option<Value>,
}

impl Param {
    pub fn is_boolean(&self) -> bool {
        self.kind.as_deref() == Some("boolean")
    }

    /// `type:<t>` followed by ` options:[a,b]` when options exist.
    pub fn detail(&self) -> String {
        let mut detail = format!("type:{}", self.kind.as_deref().unwrap_or("undefined"));
        if !self.options.is_empty() {
            detail.push_str(&format!(" options:[{}]", self.options.join(",")));
        }
        detail
    }
}

/// Request body description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Default, Deserialize)]
struct CommonFile {
    #[serde(default)]
    params: BTreeMap<String, Param>,
}

/// Parse an endpoint file; `name` is used in error messages.
pub fn parse_endpoints(name: &str, text: &str) -> SpecResult<Vec<Endpoint>> {
    let entries: BTreeMap<String, Endpoint> =
        serde_json::from_str(text).map_err(|e| SpecError::json(name, e))?;

    Ok(entries
        .into_iter()
        .map(|(key, mut endpoint)| {
            endpoint.id = format!("{}{}", ENDPOINT_PREFIX, key);
            endpoint
        })
        .collect())
}

/// Parse the shared parameter file.
pub fn parse_common_params(name: &str, text: &str) -> SpecResult<BTreeMap<String, Param>> {
    let common: CommonFile = serde_json::from_str(text).map_err(|e| SpecError::json(name, e))?;
    Ok(common.params)
}
