// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! ReedCore CLI Tool
//!
//! Command-line interface for layout synthesis and join-order planning.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{layout, plan};

#[derive(Parser)]
#[command(name = "reedcore")]
#[command(author = "Vivian Voss <ask@vvoss.dev>")]
#[command(version = "0.1.0")]
#[command(about = "ReedCore CLI - storage layouts and join-order planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the physical layout of a table definition
    Layout {
        /// Path to the table definition (TOML)
        schema: PathBuf,

        /// Layout factory: row_naive|row_optimized|pax4k
        #[arg(short, long, default_value = "row_naive")]
        layout: String,

        /// Output format: table|json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Find the cheapest join order for a query spec
    Plan {
        /// Path to the query spec (TOML)
        query: PathBuf,

        /// Path to the injected cardinalities (JSON)
        cardinalities: PathBuf,

        /// Output format: table|json
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            schema,
            layout: layout_name,
            format,
        } => layout::run(&schema, &layout_name, &format),
        Commands::Plan {
            query,
            cardinalities,
            format,
        } => plan::run(&query, &cardinalities, &format),
    }
}
