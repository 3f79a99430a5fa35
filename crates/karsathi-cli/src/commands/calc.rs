//! One-shot tax calculation command

use anyhow::{Context, Result};
use karsathi_core::{compute_tax, parse_amount, Regime, TaxQuery};

/// Calculate and print the tax breakdown for the given inputs.
pub fn cmd_calc(income: &str, regime: &str, deductions: &str) -> Result<()> {
    let regime: Regime = regime.parse().context("invalid --regime")?;
    let annual_income = parse_amount(income).context("invalid --income")?;
    let deductions = parse_amount(deductions).context("invalid --deductions")?;

    let query = TaxQuery {
        annual_income,
        regime,
        deductions,
    };
    let result = compute_tax(&query);
    println!("{}", result.summary(&query));
    Ok(())
}
