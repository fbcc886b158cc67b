use std::path::PathBuf;

use acton_paginate::config::Config;
use acton_paginate::observability::init_tracing;
use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::plan::PlanArgs;
use commands::query::QueryArgs;

/// acton-paginate - inspect skip/limit windows and pagination metadata
#[derive(Parser)]
#[command(name = "acton-paginate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file to load instead of the default search path
    #[arg(long, global = true, value_name = "PATH", env = "ACTON_PAGINATE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs to stderr at this level (e.g. debug)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive skip/limit and pagination metadata from a count
    Plan(PlanArgs),
    /// Paginate a JSON array of documents
    Query(QueryArgs),
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    if let Some(level) = &cli.log_level {
        config.service.log_level = level.clone();
        init_tracing(&config)?;
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let output = match cli.command {
        Commands::Plan(args) => commands::plan::execute(&args, &config.pagination)?,
        Commands::Query(args) => commands::query::execute(&args, &config.pagination).await?,
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            if let Some(source) = e.chain().nth(1) {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(1);
        }
    }
}
