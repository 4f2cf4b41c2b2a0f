//! dealscope CLI binary.
//!
//! Ranks acquisition candidates and values targets from a local JSON dataset.

mod cmd;
mod data;

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context as _, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use cmd::{Context, OutputFormat, RateArgs};
use data::Dataset;
use dealscope::EngineConfig;

#[derive(Parser)]
#[command(name = "dealscope")]
#[command(about = "Deal sourcing and valuation engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Dataset JSON file (falls back to DEALSCOPE_DATA)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Engine config JSON file (falls back to DEALSCOPE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank acquisition candidates for an acquirer
    Rank {
        /// Acquirer id or ticker
        acquirer: String,

        /// Candidate ids or tickers (defaults to every other company)
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,

        /// Number of candidates to show (defaults to the config's top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Value a company with a discounted cash flow model
    Dcf {
        /// Company id or ticker
        company: String,

        #[command(flatten)]
        rates: RateArgs,
    },

    /// Value a company from comparable peer multiples
    Comps {
        /// Company id or ticker
        company: String,

        /// Peer ids or tickers (defaults to every other company)
        #[arg(long, value_delimiter = ',')]
        peers: Vec<String>,

        /// Use market data on or before this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Full analysis of an acquirer/target pair
    Analyze {
        /// Acquirer id or ticker
        acquirer: String,

        /// Target id or ticker
        target: String,

        /// Peer ids or tickers for comps (defaults to every other company)
        #[arg(long, value_delimiter = ',')]
        peers: Vec<String>,

        /// Use market data on or before this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Enterprise value implied by precedent transactions
        #[arg(long)]
        precedent_ev: Option<f64>,

        /// Confidence in the precedent estimate
        #[arg(long, default_value = "0.5")]
        precedent_confidence: f64,
    },

    /// List the valuation methods the engine knows
    Methods {
        /// Show method descriptions
        #[arg(short, long)]
        verbose: bool,
    },

    /// Value a company with a method chosen by name
    Value {
        /// Method name (see `dealscope methods`)
        method: String,

        /// Company id or ticker
        company: String,

        /// Peer ids or tickers for comps (defaults to every other company)
        #[arg(long, value_delimiter = ',')]
        peers: Vec<String>,

        /// Use market data on or before this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        #[command(flatten)]
        rates: RateArgs,
    },

    /// Enterprise value sensitivity to growth and discount rate
    Sensitivity {
        /// Company id or ticker
        company: String,

        #[command(flatten)]
        rates: RateArgs,

        /// Growth rate step between rows
        #[arg(long)]
        growth_delta: Option<f64>,

        /// Discount rate step between columns
        #[arg(long)]
        wacc_delta: Option<f64>,
    },
}

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        let _ = registry.with(layer).try_init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        let _ = registry.with(layer).try_init();
    }
}

fn path_or_env(path: Option<&Path>, var: &str) -> Option<PathBuf> {
    path.map(Path::to_path_buf)
        .or_else(|| env::var_os(var).map(PathBuf::from))
}

fn load_context(data: Option<&Path>, config: Option<&Path>, format: OutputFormat) -> Result<Context> {
    let data_path = path_or_env(data, "DEALSCOPE_DATA")
        .ok_or_else(|| anyhow!("No dataset given; pass --data or set DEALSCOPE_DATA"))?;
    let dataset = Dataset::load(&data_path)?;

    let config = match path_or_env(config, "DEALSCOPE_CONFIG") {
        Some(path) => EngineConfig::from_path(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    tracing::debug!(
        dataset = %data_path.display(),
        companies = dataset.companies.len(),
        statements = dataset.statements.len(),
        snapshots = dataset.market.len(),
        "dataset loaded"
    );

    Ok(Context {
        dataset,
        config,
        format,
    })
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        data,
        config,
        format,
        command,
        ..
    } = cli;
    let load = || load_context(data.as_deref(), config.as_deref(), format);

    match command {
        Commands::Methods { verbose } => cmd::methods::list(format, verbose),
        Commands::Rank {
            acquirer,
            candidates,
            top_k,
        } => cmd::rank::run(&load()?, &acquirer, &candidates, top_k),
        Commands::Dcf { company, rates } => cmd::dcf::run(&load()?, &company, &rates),
        Commands::Comps {
            company,
            peers,
            as_of,
        } => cmd::comps::run(&load()?, &company, &peers, as_of.as_deref()),
        Commands::Value {
            method,
            company,
            peers,
            as_of,
            rates,
        } => cmd::methods::value(
            &load()?,
            &cmd::methods::ValueArgs {
                method: &method,
                company: &company,
                peers: &peers,
                as_of: as_of.as_deref(),
                rates: &rates,
            },
        ),
        Commands::Analyze {
            acquirer,
            target,
            peers,
            as_of,
            precedent_ev,
            precedent_confidence,
        } => cmd::analyze::run(
            &load()?,
            &cmd::analyze::AnalyzeArgs {
                acquirer: &acquirer,
                target: &target,
                peers: &peers,
                as_of: as_of.as_deref(),
                precedent_ev,
                precedent_confidence,
            },
        ),
        Commands::Sensitivity {
            company,
            rates,
            growth_delta,
            wacc_delta,
        } => cmd::sensitivity::run(&load()?, &company, &rates, growth_delta, wacc_delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dcf_rates() {
        let cli = Cli::try_parse_from([
            "dealscope", "--data", "deals.json", "dcf", "ACME", "-g", "0.04", "-w", "0.09",
        ])
        .unwrap();
        match cli.command {
            Commands::Dcf { company, rates } => {
                assert_eq!(company, "ACME");
                assert_eq!(rates.growth, Some(0.04));
                assert_eq!(rates.wacc, Some(0.09));
                assert_eq!(rates.terminal_growth, None);
            }
            _ => panic!("expected dcf"),
        }
    }

    #[test]
    fn test_parse_rank_candidates() {
        let cli = Cli::try_parse_from([
            "dealscope", "rank", "ACQ", "--candidates", "A,B,C", "-k", "2", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Rank {
                acquirer,
                candidates,
                top_k,
            } => {
                assert_eq!(acquirer, "ACQ");
                assert_eq!(candidates, vec!["A", "B", "C"]);
                assert_eq!(top_k, Some(2));
            }
            _ => panic!("expected rank"),
        }
    }

    #[test]
    fn test_parse_value_dispatch() {
        let cli = Cli::try_parse_from([
            "dealscope", "value", "comps", "TGT", "--peers", "A,B", "--as-of", "2024-06-30",
        ])
        .unwrap();
        match cli.command {
            Commands::Value {
                method,
                company,
                peers,
                as_of,
                rates,
            } => {
                assert_eq!(method, "comps");
                assert_eq!(company, "TGT");
                assert_eq!(peers, vec!["A", "B"]);
                assert_eq!(as_of.as_deref(), Some("2024-06-30"));
                assert_eq!(rates.wacc, None);
            }
            _ => panic!("expected value"),
        }
    }

    #[test]
    fn test_methods_needs_no_dataset() {
        let cli = Cli::try_parse_from(["dealscope", "methods", "--verbose"]).unwrap();
        assert!(cli.data.is_none());
        assert!(matches!(cli.command, Commands::Methods { verbose: true }));
    }
}
