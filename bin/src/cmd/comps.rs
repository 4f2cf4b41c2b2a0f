//! Comps command implementation.

use anyhow::Result;

use dealscope::CompsResult;
use dealscope::valuation::CompsValuator;

use super::{Context, OutputFormat, banner, money, print_json, section};
use crate::data::parse_date;

/// Value a company from peer multiples.
pub(crate) fn run(ctx: &Context, company: &str, peers: &[String], as_of: Option<&str>) -> Result<()> {
    let target = ctx.dataset.company(company)?;
    let peers = ctx.dataset.companies_or_all(peers, &target.id)?;
    let as_of = as_of.map(parse_date).transpose()?;
    let market = ctx.dataset.market_data(as_of)?;

    let result =
        CompsValuator::new(ctx.config.comps).value(target, &peers, &ctx.dataset.statements, &market)?;

    tracing::info!(
        company = %target.ticker,
        peers = result.peer_count,
        enterprise_value = result.enterprise_value,
        "comps complete"
    );

    if ctx.format == OutputFormat::Json {
        return print_json(&result);
    }

    banner("Comparable Multiples");
    println!("Company: {} ({})", target.name, target.ticker);
    if let Some(date) = as_of {
        println!("As of:   {date}");
    }
    println!();
    print_comps(&result);
    Ok(())
}

/// Text report of a comps result, shared with the analyze command.
pub(crate) fn print_comps(result: &CompsResult) {
    section(&format!("PEERS ({})", result.peer_count));
    println!(
        "{:<8} {:>12} {:>12} {:>12} {:>8} {:>9}",
        "Ticker", "EV", "Revenue", "EBITDA", "EV/Rev", "EV/EBITDA"
    );
    println!("{}", "─".repeat(66));
    for peer in &result.multiples_used {
        println!(
            "{:<8} {:>12} {:>12} {:>12} {:>8.2} {:>9.2}",
            peer.ticker,
            money(peer.enterprise_value),
            money(peer.revenue),
            money(peer.ebitda),
            peer.ev_revenue,
            peer.ev_ebitda
        );
    }
    println!();

    println!("Median EV/Revenue:   {:.2}", result.median_ev_revenue);
    println!("Median EV/EBITDA:    {:.2}", result.median_ev_ebitda);
    println!("Implied (revenue):   {}", money(result.implied_ev_revenue));
    println!(
        "Implied (EBITDA):    {}",
        result
            .implied_ev_ebitda
            .map_or_else(|| "n/a (no positive EBITDA)".to_string(), money)
    );
    println!("Enterprise value:    {}", money(result.enterprise_value));
    println!("Confidence:          {:.2}\n", result.confidence);
}
