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

//! Document commands: token streams and parsed entities.

use crate::commands::{self, DocumentKind};
use crate::error::CliError;
use clap::Subcommand;

/// Commands that only need the document itself.
#[derive(Subcommand)]
pub enum CoreCommands {
    /// Print the token stream of a document
    ///
    /// Uses the query grammar unless --entity is given. With --offset, the
    /// scanner calibrates at that byte offset and scans from there.
    Tokens {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Byte offset to start scanning from
        #[arg(short, long)]
        offset: Option<usize>,

        /// Use the entity grammar (environment and template documents)
        #[arg(short, long)]
        entity: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the entities parsed from a document
    Parse {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Document grammar
        #[arg(short, long, value_enum, default_value = "query")]
        kind: DocumentKind,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl CoreCommands {
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            CoreCommands::Tokens {
                file,
                offset,
                entity,
                json,
            } => commands::tokens(&file, offset, entity, json),
            CoreCommands::Parse { file, kind, json } => commands::parse(&file, kind, json),
        }
    }
}
