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

//! CLI command definitions and argument parsing.
//!
//! - [`core`]: document commands (tokens, parse)
//! - [`intellisense`]: specification commands (complete, endpoints)

mod core;
mod intellisense;

use crate::error::CliError;
use clap::Subcommand;

pub use self::core::CoreCommands;
pub use self::intellisense::IntellisenseCommands;

/// Top-level CLI commands.
///
/// ```text
/// Commands
/// ├── Core (tokens, parse)
/// └── Intellisense (complete, endpoints)
/// ```
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Intellisense(IntellisenseCommands),
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` when reading the input, parsing it or loading the
    /// specification fails, or when an argument is out of range.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Core(cmd) => cmd.execute(),
            Commands::Intellisense(cmd) => cmd.execute(),
        }
    }
}
