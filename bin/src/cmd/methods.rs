//! Valuation method listing and dispatch.

use anyhow::{Result, anyhow, bail};

use dealscope::valuation::registry::{MethodInfo, available_methods, find_method};
use dealscope::valuation::ValuationMethod;

use super::{Context, OutputFormat, RateArgs, banner, print_json};

/// List the valuation methods the engine knows.
pub(crate) fn list(format: OutputFormat, verbose: bool) -> Result<()> {
    let methods = available_methods();
    if format == OutputFormat::Json {
        return print_json(&methods);
    }

    banner("Valuation Methods");
    println!("{:<12} {:<10} {:<8} {:<10}", "Method", "Computed", "Market", "Statements");
    println!("{}", "-".repeat(60));
    for info in &methods {
        println!(
            "{:<12} {:<10} {:<8} {:<10}",
            info.method.as_str(),
            yes_no(info.computed_by_engine),
            yes_no(info.requires_market_data),
            yes_no(info.requires_statements)
        );
        if verbose {
            println!("  {}", info.description);
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose for method descriptions.\n");
    }
    Ok(())
}

/// Arguments of the value command.
#[derive(Debug)]
pub(crate) struct ValueArgs<'a> {
    pub(crate) method: &'a str,
    pub(crate) company: &'a str,
    pub(crate) peers: &'a [String],
    pub(crate) as_of: Option<&'a str>,
    pub(crate) rates: &'a RateArgs,
}

/// Value a company with a method looked up by name.
pub(crate) fn value(ctx: &Context, args: &ValueArgs<'_>) -> Result<()> {
    match engine_method(args.method)?.method {
        ValuationMethod::Dcf => super::dcf::run(ctx, args.company, args.rates),
        ValuationMethod::Comps => super::comps::run(ctx, args.company, args.peers, args.as_of),
        ValuationMethod::Precedent => caller_supplied(ValuationMethod::Precedent),
    }
}

/// Look up a method the engine can compute on its own.
fn engine_method(name: &str) -> Result<MethodInfo> {
    let info = find_method(name).ok_or_else(|| {
        anyhow!("Unknown valuation method: '{name}'. Use 'dealscope methods' to list them.")
    })?;
    if !info.computed_by_engine {
        return caller_supplied(info.method);
    }
    Ok(info)
}

fn caller_supplied<T>(method: ValuationMethod) -> Result<T> {
    bail!("'{method}' estimates are supplied by the caller; pass --precedent-ev to analyze")
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_method_lookup() {
        assert_eq!(engine_method("DCF").unwrap().method, ValuationMethod::Dcf);
        assert_eq!(engine_method("comps").unwrap().method, ValuationMethod::Comps);
    }

    #[test]
    fn test_engine_method_rejects_unknown_and_external() {
        let unknown = engine_method("lbo").unwrap_err().to_string();
        assert!(unknown.contains("Unknown valuation method"));

        let external = engine_method("precedent").unwrap_err().to_string();
        assert!(external.contains("--precedent-ev"));
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}
