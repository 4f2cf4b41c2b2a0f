//! Rank command implementation.

use anyhow::Result;

use dealscope::pairing::scorer::{GROWTH_SYNERGY, MARKET_POSITION, SECTOR, SIZE};
use dealscope::pairing::{HistoryCache, WeightedPairScorer, rank_with};

use super::{Context, OutputFormat, banner, money, print_json, section};

/// Rank candidates for an acquirer and print the best.
pub(crate) fn run(
    ctx: &Context,
    acquirer: &str,
    candidates: &[String],
    top_k: Option<usize>,
) -> Result<()> {
    let acquirer = ctx.dataset.company(acquirer)?;
    let candidates = ctx.dataset.companies_or_all(candidates, &acquirer.id)?;
    let top_k = top_k.unwrap_or(ctx.config.top_k);

    let cache = HistoryCache::new(&ctx.dataset.statements);
    let scorer = WeightedPairScorer::new(ctx.config.compatibility);
    let ranked = rank_with(&scorer, acquirer, &candidates, &cache, top_k);

    tracing::info!(
        acquirer = %acquirer.ticker,
        candidates = candidates.len(),
        returned = ranked.len(),
        "ranking complete"
    );

    if ctx.format == OutputFormat::Json {
        return print_json(&ranked);
    }

    banner("Acquisition Candidates");
    println!("Acquirer:   {} ({})", acquirer.name, acquirer.ticker);
    println!(
        "Market cap: {}",
        acquirer.market_cap.map_or_else(|| "n/a".to_string(), money)
    );
    println!("Universe:   {} candidate(s)\n", candidates.len());

    section(&format!("TOP {} BY COMPATIBILITY", ranked.len()));

    println!(
        "{:<5} {:<8} {:<24} {:>7} {:>6} {:>7} {:>7} {:>9}",
        "Rank", "Ticker", "Name", "Score", "Size", "Sector", "Growth", "Position"
    );
    println!("{}", "─".repeat(80));

    for (i, entry) in ranked.iter().enumerate() {
        let sub = |key: &str| entry.compatibility.subscore(key).unwrap_or(0.0);
        println!(
            "{:<5} {:<8} {:<24} {:>7.1} {:>6.2} {:>7.2} {:>7.2} {:>9.2}",
            i + 1,
            entry.candidate.ticker,
            truncate(&entry.candidate.name, 24),
            entry.score(),
            sub(SIZE),
            sub(SECTOR),
            sub(GROWTH_SYNERGY),
            sub(MARKET_POSITION),
        );
    }

    let expected = candidates
        .iter()
        .filter(|c| c.id != acquirer.id)
        .count()
        .min(top_k);
    if ranked.len() < expected {
        println!(
            "\n{} candidate(s) could not be scored; see the log for details.",
            expected - ranked.len()
        );
    }
    println!();
    Ok(())
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('…');
        short
    }
}
