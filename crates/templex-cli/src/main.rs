// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use templex_cli::commands;
use templex_cli::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "templex")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Render text reports from templates and JSON/TOML data", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Configuration file (defaults to templex.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template file or named template
    Render {
        /// Template file path, or a name inside the templates directory
        template: String,
        /// Data file (.json or .toml), or "-" for JSON on stdin
        #[arg(short, long)]
        data: Option<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check templates for unbalanced loop blocks
    Check {
        /// Template files to check
        #[arg(required = true)]
        templates: Vec<String>,
    },
    /// Print the token stream of a template
    Tokens {
        /// Template file path
        template: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            template,
            data,
            output,
        } => commands::render::run(&config, &template, data.as_deref(), output.as_deref()),
        Commands::Check { templates } => commands::check::run(&templates),
        Commands::Tokens { template } => commands::tokens::run(&template),
    }
}
