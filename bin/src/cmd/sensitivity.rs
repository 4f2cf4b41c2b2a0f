//! Sensitivity command implementation.

use anyhow::{Result, anyhow};

use dealscope::valuation::DcfConfig;
use dealscope::{DcfModel, FinancialHistory, SensitivityGrid};

use super::{Context, OutputFormat, RateArgs, banner, money, pct, print_json, section};

/// Print the enterprise value grid around a company's base case.
pub(crate) fn run(
    ctx: &Context,
    company: &str,
    rates: &RateArgs,
    growth_delta: Option<f64>,
    wacc_delta: Option<f64>,
) -> Result<()> {
    let company = ctx.dataset.company(company)?;
    let market = ctx.dataset.market_data(None)?;
    let (growth, wacc, terminal_growth) = rates.resolve(&ctx.config, &company.ticker, &market);

    let mut config: DcfConfig = ctx.config.dcf;
    config.include_sensitivity = true;
    if let Some(delta) = growth_delta {
        config.sensitivity.growth_delta = delta;
    }
    if let Some(delta) = wacc_delta {
        config.sensitivity.wacc_delta = delta;
    }

    let statements = ctx.dataset.statements.statements(&company.id)?;
    let result = DcfModel::new(config).run(&statements, growth, wacc, terminal_growth)?;
    let grid = result
        .sensitivity_grid
        .as_ref()
        .ok_or_else(|| anyhow!("sensitivity grid was not computed"))?;

    if ctx.format == OutputFormat::Json {
        return print_json(grid);
    }

    banner("Valuation Sensitivity");
    println!("Company:          {} ({})", company.name, company.ticker);
    println!("Base case EV:     {}", money(result.enterprise_value));
    println!("Terminal growth:  {}\n", pct(result.assumptions.terminal_growth));

    section("ENTERPRISE VALUE (rows: growth, columns: discount rate)");
    print_grid(grid);
    Ok(())
}

fn print_grid(grid: &SensitivityGrid) {
    print!("{:>9}", "g \\ wacc");
    for w in &grid.wacc_rates {
        print!(" {:>11}", pct(*w));
    }
    println!();
    println!("{}", "─".repeat(9 + 12 * grid.wacc_rates.len()));

    for (g, row) in grid.growth_rates.iter().zip(grid.to_rows()) {
        print!("{:>9}", pct(*g));
        for value in row {
            print!(" {:>11}", money(value));
        }
        println!();
    }
    println!();
}
