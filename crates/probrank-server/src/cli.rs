//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "probrank-server")]
#[command(version, about = "Ranked class-probability prediction service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROBRANK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Model artifact path (JSON or YAML)
    #[arg(short, long, env = "PROBRANK_MODEL")]
    pub model: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
