use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use statfacet::config::{Config, FacetMode, ObservabilityConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "statfacet")]
#[command(about = "statfacet - access-control-aware facet counts over a JSON corpus")]
#[command(version)]
struct Cli {
    /// Path to statfacet.toml
    #[arg(short, long, global = true, default_value = "statfacet.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// JSON array of documents (id, fields, readers)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Query: `*` or space separated field:value terms
    #[arg(short, long, default_value = "*")]
    pub query: String,

    /// Facet field to count (repeatable)
    #[arg(short, long = "facet", required = true)]
    pub facets: Vec<String>,

    /// Principal of the requesting user (repeatable)
    #[arg(short, long = "principal")]
    pub principals: Vec<String>,

    /// Labels to return per facet
    #[arg(short, long, default_value = "10")]
    pub num_facets: usize,

    /// Override facets.sample_size
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Override facets.random_seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override facets.batch_size
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count facets with the configured (or given) mode
    Facets {
        #[command(flatten)]
        args: QueryArgs,

        /// secure, statistical or insecure
        #[arg(short, long)]
        mode: Option<FacetMode>,
    },

    /// Count facets with every mode and print them side by side
    Compare {
        #[command(flatten)]
        args: QueryArgs,
    },
}

fn init_logging(observability: &ObservabilityConfig) {
    let log_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| observability.log_format.clone());

    // Logs go to stderr so stdout stays machine readable
    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env_overrides()?;
    init_logging(&config.observability);
    tracing::debug!("Loaded config from {:?}", cli.config);

    match cli.command {
        Commands::Facets { args, mode } => commands::run_facets(config, &args, mode)?,
        Commands::Compare { args } => commands::run_compare(config, &args)?,
    }

    Ok(())
}
