//! DCF command implementation.

use anyhow::Result;

use dealscope::{DcfModel, DcfResult, FinancialHistory};

use super::{Context, OutputFormat, RateArgs, banner, money, pct, print_json, section};

/// Value a company with the configured DCF model.
pub(crate) fn run(ctx: &Context, company: &str, rates: &RateArgs) -> Result<()> {
    let company = ctx.dataset.company(company)?;
    let market = ctx.dataset.market_data(None)?;
    let (growth, wacc, terminal_growth) = rates.resolve(&ctx.config, &company.ticker, &market);

    let statements = ctx.dataset.statements.statements(&company.id)?;
    let result = DcfModel::new(ctx.config.dcf).run(&statements, growth, wacc, terminal_growth)?;

    tracing::info!(
        company = %company.ticker,
        enterprise_value = result.enterprise_value,
        confidence = result.confidence,
        "dcf complete"
    );

    if ctx.format == OutputFormat::Json {
        return print_json(&result);
    }

    banner("Discounted Cash Flow");
    println!("Company:          {} ({})", company.name, company.ticker);
    print_dcf(&result);
    Ok(())
}

/// Text report of a DCF result, shared with the analyze command.
pub(crate) fn print_dcf(result: &DcfResult) {
    let assumptions = &result.assumptions;
    println!("Discount rate:    {}", pct(assumptions.wacc));
    println!("Terminal growth:  {}", pct(assumptions.terminal_growth));
    println!(
        "Effective growth: {} (nominal {})",
        pct(assumptions.growth.initial_growth),
        pct(assumptions.growth.nominal_growth)
    );
    println!(
        "Statement years:  {}\n",
        if result.provenance.statement_years.is_empty() {
            "none".to_string()
        } else {
            result
                .provenance
                .statement_years
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    section("PROJECTED FREE CASH FLOW");
    println!("{:<6} {:>14} {:>10} {:>14}", "Year", "FCF", "Discount", "Present value");
    println!("{}", "─".repeat(47));
    for (i, (fcf, factor)) in result
        .projected_fcfs
        .iter()
        .zip(&result.discount_factors)
        .enumerate()
    {
        println!(
            "{:<6} {:>14} {:>10.4} {:>14}",
            i + 1,
            money(*fcf),
            factor,
            money(fcf * factor)
        );
    }
    println!();

    section("VALUATION");
    println!("Terminal value:      {}", money(result.terminal_value));
    println!("PV of terminal:      {}", money(result.pv_terminal_value));
    println!("Terminal share:      {}", pct(result.terminal_share()));
    println!("Enterprise value:    {}", money(result.enterprise_value));
    println!("Confidence:          {:.2}", result.confidence);

    if let Some(breakdown) = &result.confidence_breakdown {
        println!("  Data quality:      {:.2}", breakdown.data_quality);
        println!("  Stability:         {:.2}", breakdown.stability);
        println!("  Growth credibility:{:>5.2}", breakdown.growth_credibility);
        println!("  Risk assessment:   {:.2}", breakdown.risk_assessment);
        if !breakdown.missing_fields.is_empty() {
            let missing: Vec<&str> = breakdown
                .missing_fields
                .iter()
                .map(|m| m.label())
                .collect();
            println!("  Missing fields:    {}", missing.join(", "));
        }
        if breakdown.skipped_fields > 0 {
            println!("  Skipped values:    {}", breakdown.skipped_fields);
        }
    }
    println!();
}
