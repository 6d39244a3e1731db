// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::commands::inspect::InspectArgs;
use cmd::commands::{describe, inspect, ls, resolve, tables};
use cmd::common::{InspectContext, ViewChoice};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "tablescope")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Configuration file (defaults to $TABLESCOPE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List external tables
    Tables {
        /// Only tables of this database
        #[arg(long)]
        database: Option<String>,
    },
    /// Show the storage location of a table
    Resolve {
        table: String,
    },
    /// List a table's data files
    Ls {
        table: String,
    },
    /// Download one of a table's files and show its contents
    Inspect {
        table: String,
        /// Exact object name or listed label
        #[arg(long, conflicts_with = "search")]
        file: Option<String>,
        /// Case-insensitive name fragment
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = ViewChoice::Metadata)]
        view: ViewChoice,
        /// Ask the configured text service for a summary
        #[arg(long)]
        summarize: bool,
    },
    /// Describe a local data file
    Describe {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = ViewChoice::Metadata)]
        view: ViewChoice,
    },
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    println!("{output}");
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let context = InspectContext::new(cli.config.clone());
    let json = cli.json;

    match cli.command {
        Commands::Tables { database } => {
            tables::tables_command(&context, database.as_deref(), json, print_output).await
        }
        Commands::Resolve { table } => {
            resolve::resolve_command(&context, &table, json, print_output).await
        }
        Commands::Ls { table } => ls::ls_command(&context, &table, json, print_output).await,
        Commands::Inspect {
            table,
            file,
            search,
            view,
            summarize,
        } => {
            let args = InspectArgs {
                table,
                file,
                search,
                view,
                summarize,
                json,
            };
            inspect::inspect_command(&context, &args, print_output).await
        }
        Commands::Describe { path, view } => {
            describe::describe_command(&context, &path, view, json, print_output).await
        }
    }
}
