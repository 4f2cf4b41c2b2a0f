//! CLI subcommand modules.
//!
//! This module contains the implementations for all dealscope CLI subcommands
//! and the helpers they share.

pub(crate) mod analyze;
pub(crate) mod comps;
pub(crate) mod dcf;
pub(crate) mod methods;
pub(crate) mod rank;
pub(crate) mod sensitivity;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::data::Dataset;
use dealscope::{EngineConfig, MarketDataSource};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Everything a command needs.
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) dataset: Dataset,
    pub(crate) config: EngineConfig,
    pub(crate) format: OutputFormat,
}

/// Rate overrides shared by the DCF commands.
#[derive(Debug, Clone, Args)]
pub(crate) struct RateArgs {
    /// Nominal growth rate (defaults to the config's growth_rate)
    #[arg(short, long)]
    pub(crate) growth: Option<f64>,

    /// Discount rate (defaults to the config's discount rate or a WACC from
    /// the company's beta)
    #[arg(short, long)]
    pub(crate) wacc: Option<f64>,

    /// Terminal growth rate (defaults to the config's terminal policy)
    #[arg(short, long)]
    pub(crate) terminal_growth: Option<f64>,
}

impl RateArgs {
    /// Growth, discount rate and terminal growth override to run with.
    pub(crate) fn resolve(
        &self,
        config: &EngineConfig,
        ticker: &str,
        market: &dyn MarketDataSource,
    ) -> (f64, f64, Option<f64>) {
        (
            self.growth.unwrap_or(config.growth_rate),
            self.wacc
                .unwrap_or_else(|| config.discount_rate_for(ticker, market)),
            self.terminal_growth.or(config.terminal_growth),
        )
    }
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a boxed section title.
pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{title:^62}║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Print a heavy rule with a heading.
pub(crate) fn section(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Compact currency amount, e.g. `12.35B`.
pub(crate) fn money(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("{scaled:.2}{suffix}")
}

/// Rate as a percentage, e.g. `8.35%`.
pub(crate) fn pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}
