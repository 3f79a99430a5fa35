//! Canned response library
//!
//! Curated answers for recognized tax topics, returned without any provider
//! call. Response texts live in `responses/*.md` at the workspace root and
//! are embedded at compile time.
//!
//! The table is an explicitly ordered slice, not a map: matching walks it
//! top to bottom and the first hit wins, so entry order is a load-bearing
//! compatibility contract. The matching rule is deliberately loose (three
//! symmetric substring checks) to maximize recall at the cost of occasional
//! false positives; both the rule and the ordering are preserved as observed
//! behavior.

/// Embedded response texts (compiled into binary)
mod texts {
    pub const CALCULATE_MY_TAX: &str = include_str!("../../../responses/calculate_my_tax.md");
    pub const TAX_SLABS: &str = include_str!("../../../responses/tax_slabs.md");
    pub const DEDUCTIONS: &str = include_str!("../../../responses/deductions.md");
    pub const ITR_FILING: &str = include_str!("../../../responses/itr_filing.md");
    pub const TDS: &str = include_str!("../../../responses/tds.md");
    pub const PAN_CARD: &str = include_str!("../../../responses/pan_card.md");
    pub const FORM_16: &str = include_str!("../../../responses/form_16.md");
    pub const SECTION_80C: &str = include_str!("../../../responses/section_80c.md");
    pub const SECTION_80D: &str = include_str!("../../../responses/section_80d.md");
    pub const REGIME_COMPARISON: &str = include_str!("../../../responses/regime_comparison.md");
    pub const FALLBACK: &str = include_str!("../../../responses/fallback.md");
}

/// One canned topic entry. Keys are stored lowercase.
#[derive(Debug, Clone, Copy)]
pub struct CannedResponse {
    pub key: &'static str,
    pub text: &'static str,
}

/// Ordered topic table; first match wins.
pub const CANNED_RESPONSES: &[CannedResponse] = &[
    CannedResponse {
        key: "calculate my tax",
        text: texts::CALCULATE_MY_TAX,
    },
    CannedResponse {
        key: "explain tax slabs",
        text: texts::TAX_SLABS,
    },
    CannedResponse {
        key: "what deductions can i claim",
        text: texts::DEDUCTIONS,
    },
    CannedResponse {
        key: "how to file itr",
        text: texts::ITR_FILING,
    },
    CannedResponse {
        key: "tds",
        text: texts::TDS,
    },
    CannedResponse {
        key: "pan card",
        text: texts::PAN_CARD,
    },
    CannedResponse {
        key: "form 16",
        text: texts::FORM_16,
    },
];

/// Dedicated keyword-rule texts, checked by the resolver after the table.
pub const SECTION_80C: &str = texts::SECTION_80C;
pub const SECTION_80D: &str = texts::SECTION_80D;
pub const REGIME_COMPARISON: &str = texts::REGIME_COMPARISON;

/// Generic fallback topic list shown when nothing else matched.
pub const FALLBACK: &str = texts::FALLBACK;

/// Find the first canned entry matching a message.
///
/// An entry matches when the lowercased message contains the key, the key
/// contains the message, or the message contains the key's first word.
pub fn match_canned(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    for entry in CANNED_RESPONSES {
        let first_word = entry.key.split(' ').next().unwrap_or(entry.key);
        if lower.contains(entry.key) || entry.key.contains(&lower) || lower.contains(first_word) {
            return Some(entry.text);
        }
    }
    None
}
