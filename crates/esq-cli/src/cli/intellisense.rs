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

//! Commands backed by a REST specification tree.

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;

/// Commands that load the Elasticsearch REST specification.
///
/// Both take `--specs <DIR>`, a directory holding one sub-directory per
/// specification version, and an optional `--version` to pick the closest of
/// those versions.
#[derive(Subcommand)]
pub enum IntellisenseCommands {
    /// Print completion candidates at an offset
    Complete {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Byte offset of the cursor
        #[arg(short, long)]
        offset: usize,

        /// Specification root directory
        #[arg(short, long, value_name = "DIR")]
        specs: String,

        /// Elasticsearch version to complete for
        #[arg(short, long)]
        version: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List endpoints, or resolve a command to its endpoint
    Endpoints {
        /// Specification root directory
        #[arg(short, long, value_name = "DIR")]
        specs: String,

        /// Elasticsearch version
        #[arg(short, long)]
        version: Option<String>,

        /// HTTP method to filter or resolve with
        #[arg(short, long)]
        method: Option<String>,

        /// Command path to resolve, e.g. /logs/_search
        #[arg(short, long, value_name = "PATH")]
        command: Option<String>,
    },
}

impl IntellisenseCommands {
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            IntellisenseCommands::Complete {
                file,
                offset,
                specs,
                version,
                json,
            } => commands::complete(&file, offset, &specs, version.as_deref(), json),
            IntellisenseCommands::Endpoints {
                specs,
                version,
                method,
                command,
            } => commands::endpoints(&specs, version.as_deref(), method.as_deref(), command.as_deref()),
        }
    }
}
