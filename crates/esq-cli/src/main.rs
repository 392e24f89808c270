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

//! ESQ Command Line Interface

use clap::Parser;
use esq_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// ESQ - Elasticsearch query document toolkit
///
/// # Examples
///
/// ```bash
/// # Token stream of a query document
/// esq tokens queries.esq
///
/// # Parsed environments as JSON
/// esq parse environments.json --kind environment --json
///
/// # Completion candidates at byte 120
/// esq complete queries.esq --offset 120 --specs resources/specs --version 7.10.2
/// ```
#[derive(Parser)]
#[command(name = "esq")]
#[command(author, version, about = "ESQ - Elasticsearch query document toolkit", long_about = None)]
struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
