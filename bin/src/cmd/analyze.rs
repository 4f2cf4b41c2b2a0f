//! Analyze command implementation.

use anyhow::Result;

use dealscope::valuation::{MethodEstimate, ValuationMethod};
use dealscope::{DealAnalysis, DealAnalyzer};

use super::comps::print_comps;
use super::dcf::print_dcf;
use super::{Context, OutputFormat, banner, money, print_json, section};
use crate::data::parse_date;

/// Arguments of the analyze command.
#[derive(Debug)]
pub(crate) struct AnalyzeArgs<'a> {
    pub(crate) acquirer: &'a str,
    pub(crate) target: &'a str,
    pub(crate) peers: &'a [String],
    pub(crate) as_of: Option<&'a str>,
    pub(crate) precedent_ev: Option<f64>,
    pub(crate) precedent_confidence: f64,
}

/// Run the full deal analysis for one pair.
pub(crate) fn run(ctx: &Context, args: &AnalyzeArgs<'_>) -> Result<()> {
    let acquirer = ctx.dataset.company(args.acquirer)?;
    let target = ctx.dataset.company(args.target)?;
    let mut peers = ctx.dataset.companies_or_all(args.peers, &target.id)?;
    peers.retain(|p| p.id != acquirer.id);

    let as_of = args.as_of.map(parse_date).transpose()?;
    let market = ctx.dataset.market_data(as_of)?;
    let precedent = args.precedent_ev.map(|ev| {
        MethodEstimate::new(
            ValuationMethod::Precedent,
            ev,
            args.precedent_confidence.clamp(0.0, 1.0),
        )
    });

    let analysis = DealAnalyzer::new(ctx.config.clone()).analyze_with_precedent(
        acquirer,
        target,
        &peers,
        &ctx.dataset.statements,
        &market,
        precedent,
    )?;

    tracing::info!(
        acquirer = %acquirer.ticker,
        target = %target.ticker,
        compatibility = analysis.compatibility.score,
        enterprise_value = analysis.enterprise_value(),
        "analysis complete"
    );

    if ctx.format == OutputFormat::Json {
        return print_json(&analysis);
    }

    banner("Deal Analysis");
    println!("Acquirer: {} ({})", acquirer.name, acquirer.ticker);
    println!("Target:   {} ({})\n", target.name, target.ticker);
    print_analysis(&analysis);
    Ok(())
}

fn print_analysis(analysis: &DealAnalysis) {
    section(&format!(
        "COMPATIBILITY {:.1} / 100",
        analysis.compatibility.score
    ));
    for (name, value) in &analysis.compatibility.subscores {
        println!("  {name:<22} {value:>8.3}");
    }
    println!();

    section("DCF ASSUMPTIONS");
    print_dcf(&analysis.dcf);

    match (&analysis.comps, &analysis.comps_unavailable) {
        (Some(comps), _) => print_comps(comps),
        (None, Some(reason)) => {
            section("COMPS");
            println!("Unavailable: {reason}\n");
        }
        (None, None) => {}
    }

    section("ENSEMBLE");
    println!("{:<12} {:>14} {:>8} {:>11}", "Method", "EV", "Weight", "Confidence");
    println!("{}", "─".repeat(48));
    for component in &analysis.ensemble.components {
        println!(
            "{:<12} {:>14} {:>8.2} {:>11.2}",
            component.estimate.method.as_str(),
            money(component.estimate.enterprise_value),
            component.weight,
            component.estimate.confidence
        );
    }
    println!();
    println!("Enterprise value:    {}", money(analysis.ensemble.enterprise_value));
    println!("Confidence:          {:.2}\n", analysis.ensemble.confidence);
}
