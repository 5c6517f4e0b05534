use lineaudit_core::config::AuditConfig;
use lineaudit_core::line::{DraftLine, LineType};
use lineaudit_core::money::{round2, Money};

const CONTRACT_MARKER: &str = "CONTRACT";

/// At-cost wins over contract; anything else is unknown.
pub fn classify_line_type(draft: &DraftLine) -> LineType {
    if draft.at_cost > 0.0 {
        LineType::AtCost
    } else if draft.rate_source.to_uppercase().contains(CONTRACT_MARKER) {
        LineType::Contract
    } else {
        LineType::Unknown
    }
}

fn is_reference_currency(currency: &str, config: &AuditConfig) -> bool {
    currency.trim().eq_ignore_ascii_case(&config.reference_currency)
}

/// Stated total expressed in the settlement currency, in cents.
///
/// Only at-cost lines billed in the reference currency are converted; every
/// other line is assumed to be stated in settlement currency already.
pub fn amount_usd(draft: &DraftLine, line_type: LineType, config: &AuditConfig) -> Money {
    match line_type {
        LineType::AtCost if is_reference_currency(&draft.currency, config) => {
            Money::from_f64(draft.total_stated * config.reference_to_settlement())
        }
        _ => Money::from_f64(draft.total_stated),
    }
}

/// Documentary at-cost amount in settlement currency, rounded to cents.
pub fn document_amount_usd(draft: &DraftLine, config: &AuditConfig) -> f64 {
    round2(draft.at_cost * config.reference_to_settlement())
}
