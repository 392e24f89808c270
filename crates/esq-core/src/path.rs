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

//! Dotted/bracketed property paths.
//!
//! A path such as `mappings.dynamic_templates[0].strings` addresses a token
//! inside nested objects and arrays. Keys are joined with `.`; array indices
//! are appended directly as `[n]`.

/// Separator between object keys.
pub const SEPARATOR: char = '.';

/// One step of a property path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// An object key.
    Key(&'a str),
    /// An array index.
    Index(usize),
}

impl PathSegment<'_> {
    /// Render the segment the way it appears in a path.
    pub fn to_path_string(&self) -> String {
        match self {
            PathSegment::Key(key) => (*key).to_string(),
            PathSegment::Index(index) => format!("[{}]", index),
        }
    }
}

/// Append `name` to `parent`.
///
/// Bracketed names (`[2]`) are appended without a separator.
///
/// # Examples
///
/// ```
/// use esq_core::path::join;
///
/// assert_eq!(join(None, "lorem"), "lorem");
/// assert_eq!(join(Some("lorem"), "[1]"), "lorem[1]");
/// assert_eq!(join(Some("lorem[1]"), "donec"), "lorem[1].donec");
/// ```
pub fn join(parent: Option<&str>, name: &str) -> String {
    match parent {
        None | Some("") => name.to_string(),
        Some(parent) if name.starts_with('[') => format!("{}{}", parent, name),
        Some(parent) => format!("{}{}{}", parent, SEPARATOR, name),
    }
}

/// Accept `/` as an alias of `.` (`lorem[1]/donec` → `lorem[1].donec`).
pub fn normalize(path: &str) -> String {
    path.replace("/[", "[").replace('/', ".")
}

/// Split a path into its segments.
///
/// Bracket content that is not a number is kept as a key.
pub fn segments(path: &str) -> Vec<PathSegment<'_>> {
    let mut out = Vec::new();

    for part in path.split(SEPARATOR).filter(|p| !p.is_empty()) {
        let mut rest = part;

        if let Some(open) = rest.find('[') {
            if open > 0 {
                out.push(PathSegment::Key(&rest[..open]));
            }
            rest = &rest[open..];

            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(close) = stripped.find(']') else {
                    out.push(PathSegment::Key(rest));
                    rest = "";
                    break;
                };
                let inner = &stripped[..close];
                match inner.parse::<usize>() {
                    Ok(index) => out.push(PathSegment::Index(index)),
                    Err(_) => out.push(PathSegment::Key(&rest[..close + 2])),
                }
                rest = &stripped[close + 1..];
            }

            if !rest.is_empty() {
                out.push(PathSegment::Key(rest));
            }
        } else {
            out.push(PathSegment::Key(rest));
        }
    }

    out
}

/// Number of segments in a path.
pub fn depth(path: &str) -> usize {
    segments(path).len()
}

/// Path of the enclosing container, if any.
///
/// # Examples
///
/// ```
/// use esq_core::path::parent;
///
/// assert_eq!(parent("query.bool.must[0]"), Some("query.bool.must"));
/// assert_eq!(parent("query.bool"), Some("query"));
/// assert_eq!(parent("query"), None);
/// ```
pub fn parent(path: &str) -> Option<&str> {
    let cut = path.rfind(|c| c == SEPARATOR || c == '[')?;
    (cut > 0).then(|| &path[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== join tests ====================

    #[test]
    fn test_join_root() {
        assert_eq!(join(None, "query"), "query");
        assert_eq!(join(Some(""), "query"), "query");
    }

    #[test]
    fn test_join_nested() {
        assert_eq!(join(Some("query"), "bool"), "query.bool");
        assert_eq!(join(Some("query.bool.must"), "[0]"), "query.bool.must[0]");
    }

    // ==================== segments tests ====================

    #[test]
    fn test_segments_keys_and_indices() {
        assert_eq!(
            segments("mappings.dynamic_templates[0].strings"),
            vec![
                PathSegment::Key("mappings"),
                PathSegment::Key("dynamic_templates"),
                PathSegment::Index(0),
                PathSegment::Key("strings"),
            ]
        );
    }

    #[test]
    fn test_segments_nested_indices() {
        assert_eq!(
            segments("matrix[1][2]"),
            vec![
                PathSegment::Key("matrix"),
                PathSegment::Index(1),
                PathSegment::Index(2),
            ]
        );
    }

    #[test]
    fn test_segments_non_numeric_bracket_is_key() {
        assert_eq!(
            segments("a[x]"),
            vec![PathSegment::Key("a"), PathSegment::Key("[x]")]
        );
    }

    #[test]
    fn test_segments_unclosed_bracket() {
        assert_eq!(
            segments("a[1"),
            vec![PathSegment::Key("a"), PathSegment::Key("[1")]
        );
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth(""), 0);
        assert_eq!(depth("lorem"), 1);
        assert_eq!(depth("lorem[1].donec"), 3);
    }

    // ==================== normalize / parent tests ====================

    #[test]
    fn test_normalize_slashes() {
        assert_eq!(normalize("lorem/ipsum"), "lorem.ipsum");
        assert_eq!(normalize("lorem[1]/donec"), "lorem[1].donec");
        assert_eq!(normalize("lorem/[1]"), "lorem[1]");
    }

    #[test]
    fn test_parent_of_index() {
        assert_eq!(parent("lorem[1]"), Some("lorem"));
        assert_eq!(parent("[1]"), None);
    }
}
