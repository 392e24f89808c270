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

//! Document building from the three document formats.

use esq_core::{
    parse_environment_document, parse_index_template_document, parse_query_document, Entity,
    ErrorKind, ParseOptions, QueryDocument, TokenKind, Value,
};

// =============================================================================
// Query documents
// =============================================================================

#[test]
fn test_single_statement_without_body() {
    let document = parse_query_document("GET /_cat/indices");
    assert_eq!(document.queries.len(), 1);
    assert!(document.configurations.is_empty());

    let query = &document.queries[0];
    assert_eq!(query.method(), Some("GET"));
    assert_eq!(query.command(), Some("/_cat/indices"));
    assert_eq!(query.steps(), vec!["_cat", "indices"]);
    assert!(!query.has_body());
    assert!(!query.has_input());
}

#[test]
fn test_statement_with_options_arguments_and_body() {
    let text = "post logs/_search?size=5&explain(name=\"top five\")\n{ \"query\": { \"match_all\": {} } }";
    let document = parse_query_document(text);
    let query = &document.queries[0];

    assert_eq!(query.method(), Some("POST"));
    assert_eq!(query.command(), Some("/logs/_search"));
    assert_eq!(query.options().get("size"), Some(&Some("5".to_string())));
    assert_eq!(query.options().get("explain"), Some(&None));
    assert_eq!(query.name(), Some("top five"));
    assert_eq!(query.body(), Some("{ \"query\": { \"match_all\": {} } }"));
    assert!(query.has_valid_body());
    assert!(!query.is_bulk());
}

#[test]
fn test_bulk_bodies_counted() {
    let mut text = String::from("POST /_bulk");
    for index in 0..4 {
        text.push_str(&format!("\n{{ \"index\": {{ \"_id\": \"{}\" }} }}", index));
    }
    let document = parse_query_document(&text);
    let query = &document.queries[0];
    assert!(query.is_bulk());
    assert_eq!(query.bulk().len(), 4);
    assert_eq!(query.body(), Some(query.bulk()[0].as_str()));
}

#[test]
fn test_unterminated_body_is_invalid() {
    let document = parse_query_document("GET /_search\n{ \"query\": {");
    let query = &document.queries[0];
    assert!(query.has_body());
    assert!(!query.has_valid_body());
}

#[test]
fn test_search_template_source_is_stringified() {
    let text = "GET /_search/template\n{ \"source\": { \"query\": { \"match\": { \"msg\": \"{{term}}\" } } }, \"params\": { \"term\": \"x\" } }";
    let options = ParseOptions::builder().substitute_parameters(false).build();
    let document = QueryDocument::parse_with(text, &options);
    let body = document.queries[0].body().unwrap();

    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert!(json["source"].is_string());
    assert_eq!(json["params"]["term"], "x");
}

#[test]
fn test_token_kind_at_offsets() {
    let text = "GET /logs/_search?size=1(name=a)";
    let document = parse_query_document(text);
    let query = &document.queries[0];

    assert_eq!(query.token_kind_at(1), TokenKind::Method);
    assert_eq!(query.token_kind_at(text.find("logs").unwrap()), TokenKind::Command);
    assert_eq!(query.token_kind_at(text.find("size").unwrap()), TokenKind::QueryString);
    assert_eq!(query.token_kind_at(text.find("name").unwrap()), TokenKind::Input);
}

#[test]
fn test_parse_is_deterministic() {
    let text = "{ \"params\": { \"index\": \"logs\" } }\n/* c */\nGET /logs/_search\n{ \"size\": 1 }\nPOST /_bulk\n{}\n{}";
    assert_eq!(parse_query_document(text), parse_query_document(text));
}

#[test]
fn test_configuration_values() {
    let text = "{ \"params\": { \"index\": \"logs\", \"size\": 10 }, \"source\": \"local\", \"output\": \"out.json\" }\nGET /x";
    let document = parse_query_document(text);
    let configuration = &document.configurations[0];

    assert_eq!(configuration.param("size").and_then(Value::as_i64), Some(10));
    assert_eq!(configuration.source(), Some("local"));
    assert_eq!(configuration.output(), Some("out.json"));
    assert_eq!(configuration.substitute("/{{index}}/_count"), "/logs/_count");
}

#[test]
fn test_size_limit_reported_by_try_parse() {
    let options = ParseOptions::builder().max_document_size(8).build();
    let err = QueryDocument::try_parse("GET /_cat/indices", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Limit);
}

// =============================================================================
// Environment documents
// =============================================================================

#[test]
fn test_environment_host_and_name() {
    let document = parse_environment_document(r#"{ "host": "http://localhost:9200", "name": "local" }"#);
    assert_eq!(document.environments.len(), 1);

    let environment = &document.environments[0];
    assert_eq!(environment.host.as_deref(), Some("http://localhost:9200"));
    assert_eq!(environment.name.as_deref(), Some("local"));
    assert!(environment.version.is_none());
}

#[test]
fn test_environment_lookup_by_name() {
    let text = "{ \"name\": \"a\", \"host\": \"http://a:9200\" }\n{ \"name\": \"b\", \"host\": \"http://b:9200\", \"version\": \"7.17\" }";
    let document = parse_environment_document(text);
    let b = document.find("b").unwrap();
    assert_eq!(b.host.as_deref(), Some("http://b:9200"));
    assert_eq!(b.version.map(|v| v.to_string()), Some("7.17".to_string()));
}

// =============================================================================
// Index template documents
// =============================================================================

#[test]
fn test_index_template_from_request() {
    let text = "PUT /_template/my_template\n{\n  \"index_patterns\": [\"a*\"],\n  \"settings\": { \"number_of_shards\": 3 }\n}";
    let document = parse_index_template_document(text);
    assert_eq!(document.index_templates.len(), 1);

    let template = &document.index_templates[0];
    assert_eq!(template.name.as_deref(), Some("my_template"));
    assert_eq!(template.index_patterns(), vec!["a*"]);
    assert_eq!(
        template
            .settings()
            .and_then(|s| s.get("number_of_shards"))
            .and_then(Value::as_i64),
        Some(3)
    );
    assert!(template.offset_end().is_some());
}

#[test]
fn test_index_template_body_json() {
    let text = r#"{ "order": 2, "index_patterns": "metrics-*", "mappings": { "properties": { "ts": { "type": "date" } } } }"#;
    let document = parse_index_template_document(text);
    let json = document.index_templates[0].to_json();

    assert_eq!(json["order"], 2);
    assert_eq!(json["index_patterns"], serde_json::json!(["metrics-*"]));
    assert_eq!(json["mappings"]["properties"]["ts"]["type"], "date");
    assert!(json.get("aliases").is_none());
}
