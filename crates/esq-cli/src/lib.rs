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

//! ESQ CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! ## Documents
//!
//! - **tokens**: token stream of a query or entity document, optionally
//!   calibrated at an offset
//! - **parse**: queries, environments or index templates of a document
//!
//! ## Specification
//!
//! - **complete**: completion candidates at an offset
//! - **endpoints**: endpoint listing and command resolution
//!
//! # Examples
//!
//! ```no_run
//! use esq_cli::commands::{parse, DocumentKind};
//!
//! # fn main() -> Result<(), esq_cli::error::CliError> {
//! parse("queries.esq", DocumentKind::Query, true)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! Input files larger than `ESQ_MAX_FILE_SIZE` bytes (default 1 GB) are
//! rejected before they are read.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. `RUST_LOG` selects what is
//! shown; the default is `warn`, or `debug` with `--verbose`.

pub mod cli;
pub mod commands;
pub mod error;
