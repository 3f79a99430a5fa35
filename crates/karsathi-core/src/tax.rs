//! Progressive income-tax engine for Indian tax slabs
//!
//! Implements the FY 2023-24 new and old regime schedules with standard
//! cumulative marginal taxation: each bracket taxes only the income falling
//! inside its range, and a flat 4% Health & Education Cess is added on top
//! of the computed base tax.
//!
//! `compute_tax` is a total function: it produces a result for any input and
//! performs no validation. Callers parse and validate user input first (see
//! [`parse_amount`]); the engine assumes a finite income.

use crate::error::{Error, Result};

/// Selectable tax-bracket schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// New regime (2023-24): higher exemption limit, no deductions
    New,
    /// Old regime: lower exemption limit, deductions allowed
    Old,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Old => "old",
        }
    }

    /// The bracket schedule for this regime, ascending by upper bound.
    pub fn brackets(&self) -> &'static [TaxBracket] {
        match self {
            Self::New => NEW_REGIME,
            Self::Old => OLD_REGIME,
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Regime {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "old" => Ok(Self::Old),
            other => Err(Error::InvalidInput(format!(
                "unknown regime '{}', expected 'new' or 'old'",
                other
            ))),
        }
    }
}

/// A single marginal tax bracket
#[derive(Debug, Clone, Copy)]
pub struct TaxBracket {
    /// Inclusive upper bound in rupees; None means unbounded (top bracket)
    pub upper: Option<f64>,
    /// Marginal rate applied to income inside this bracket
    pub rate: f64,
    /// Human-readable slab label for the result breakdown
    pub label: &'static str,
}

/// New regime slabs (2023-24). Brackets partition [0, ∞) with no gaps.
const NEW_REGIME: &[TaxBracket] = &[
    TaxBracket {
        upper: Some(300_000.0),
        rate: 0.0,
        label: "0% (Up to ₹3,00,000)",
    },
    TaxBracket {
        upper: Some(600_000.0),
        rate: 0.05,
        label: "5% (₹3,00,001 - ₹6,00,000)",
    },
    TaxBracket {
        upper: Some(900_000.0),
        rate: 0.10,
        label: "10% (₹6,00,001 - ₹9,00,000)",
    },
    TaxBracket {
        upper: Some(1_200_000.0),
        rate: 0.15,
        label: "15% (₹9,00,001 - ₹12,00,000)",
    },
    TaxBracket {
        upper: Some(1_500_000.0),
        rate: 0.20,
        label: "20% (₹12,00,001 - ₹15,00,000)",
    },
    TaxBracket {
        upper: None,
        rate: 0.30,
        label: "30% (Above ₹15,00,000)",
    },
];

/// Old regime slabs. Brackets partition [0, ∞) with no gaps.
const OLD_REGIME: &[TaxBracket] = &[
    TaxBracket {
        upper: Some(250_000.0),
        rate: 0.0,
        label: "0% (Up to ₹2,50,000)",
    },
    TaxBracket {
        upper: Some(500_000.0),
        rate: 0.05,
        label: "5% (₹2,50,001 - ₹5,00,000)",
    },
    TaxBracket {
        upper: Some(1_000_000.0),
        rate: 0.20,
        label: "20% (₹5,00,001 - ₹10,00,000)",
    },
    TaxBracket {
        upper: None,
        rate: 0.30,
        label: "30% (Above ₹10,00,000)",
    },
];

/// Cess rate applied on top of the computed base tax
const CESS_RATE: f64 = 0.04;

/// Inputs for one tax calculation
#[derive(Debug, Clone, Copy)]
pub struct TaxQuery {
    /// Gross annual income in rupees
    pub annual_income: f64,
    pub regime: Regime,
    /// Total deductions in rupees; ignored unless regime is Old
    pub deductions: f64,
}

/// Computed tax breakdown
#[derive(Debug, Clone)]
pub struct TaxResult {
    /// Income after deductions; not clamped at zero, so it can go negative
    /// when deductions exceed income (tax is still zero in that case)
    pub taxable_income: f64,
    /// Label of the slab containing the taxable income
    pub bracket_label: &'static str,
    /// Tax before cess
    pub base_tax: f64,
    /// 4% Health & Education Cess on the base tax
    pub cess: f64,
    pub total_tax: f64,
    /// Deductions actually subtracted (zero under the new regime)
    pub deductions_applied: f64,
}

/// Compute the tax breakdown for a query. Total function, no failure modes.
pub fn compute_tax(query: &TaxQuery) -> TaxResult {
    let deductions_applied = match query.regime {
        Regime::Old => query.deductions,
        Regime::New => 0.0,
    };
    let taxable_income = query.annual_income - deductions_applied;

    let brackets = query.regime.brackets();
    let mut base_tax = 0.0;
    let mut bracket_label = brackets[0].label;
    let mut lower = 0.0;

    for bracket in brackets {
        let upper = bracket.upper.unwrap_or(f64::INFINITY);
        if taxable_income > lower {
            base_tax += (taxable_income.min(upper) - lower) * bracket.rate;
        }
        if taxable_income <= upper {
            bracket_label = bracket.label;
            break;
        }
        lower = upper;
    }

    let cess = base_tax * CESS_RATE;

    TaxResult {
        taxable_income,
        bracket_label,
        base_tax,
        cess,
        total_tax: base_tax + cess,
        deductions_applied,
    }
}

impl TaxResult {
    /// Render the chat-ready breakdown for this result.
    pub fn summary(&self, query: &TaxQuery) -> String {
        let mut text = format!(
            "Based on your income of ₹{} under the {} tax regime:\n\n\
             💰 Taxable Income: ₹{}\n\
             📊 Tax Slab: {}\n\
             💸 Income Tax: ₹{}\n\
             🏥 Health & Education Cess (4%): ₹{}\n\
             💯 Total Tax Liability: ₹{}",
            format_inr(query.annual_income),
            query.regime,
            format_inr(self.taxable_income),
            self.bracket_label,
            format_inr(self.base_tax),
            format_inr(self.cess),
            format_inr(self.total_tax),
        );

        if query.regime == Regime::Old && self.deductions_applied > 0.0 {
            text.push_str(&format!(
                "\n\n💳 Deductions Applied: ₹{}",
                format_inr(self.deductions_applied)
            ));
        }

        text.push_str(
            "\n\nWould you like me to explain any deductions you can claim \
             or compare with the other tax regime?",
        );
        text
    }
}

/// Parse a rupee amount from user input.
///
/// The engine itself performs no validation; callers go through here before
/// building a `TaxQuery`. Accepts grouped input like "8,00,000".
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let cleaned = trimmed.replace(',', "");
    let value: f64 = cleaned
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a valid amount", trimmed)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "amount must be a non-negative number, got '{}'",
            trimmed
        )));
    }
    Ok(value)
}

/// Format a rupee amount with en-IN digit grouping (e.g. 12,34,567.50).
///
/// Rounds to two decimals; whole-rupee amounts are shown without paise.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let paise = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    // Indian grouping: last three digits, then groups of two.
    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let head_bytes = head.as_bytes();
        let mut parts = Vec::new();
        let mut end = head_bytes.len();
        while end > 2 {
            parts.push(&head[end - 2..end]);
            end -= 2;
        }
        parts.push(&head[..end]);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if paise > 0 {
        out.push_str(&format!(".{:02}", paise));
    }
    out
}
