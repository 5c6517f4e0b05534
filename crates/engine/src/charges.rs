use lineaudit_core::config::AuditConfig;
use lineaudit_core::line::{ChargeGroup, DraftLine, LineType};
use lineaudit_core::money::round2;

/// Upper-case fragments of a rate source or description that mark a portal charge.
pub const PORTAL_FEE_MARKERS: &[&str] = &[
    "APPOINTMENT",
    "DPC",
    "MANIFEST",
    "DOCUMENT PROCESSING",
    "DOC PROCESSING",
];

pub fn is_portal_fee(rate_source: &str, description: &str) -> bool {
    let text = format!("{} {}", rate_source, description).to_uppercase();
    PORTAL_FEE_MARKERS.iter().any(|m| text.contains(m))
}

/// Portal charges form their own group regardless of line type.
pub fn charge_group(draft: &DraftLine, line_type: LineType) -> ChargeGroup {
    if is_portal_fee(&draft.rate_source, &draft.description) {
        return ChargeGroup::PortalFee;
    }
    match line_type {
        LineType::AtCost => ChargeGroup::AtCost,
        LineType::Contract => ChargeGroup::Contract,
        LineType::Unknown => ChargeGroup::Other,
    }
}

/// Fixed portal charge for a description, in the reference currency.
/// The longest matching fragment wins.
pub fn portal_fee_amount(description: &str, config: &AuditConfig) -> Option<f64> {
    let description = description.to_uppercase();
    config
        .portal_fees
        .iter()
        .filter(|(fragment, _)| description.contains(fragment.as_str()))
        .max_by_key(|(fragment, _)| fragment.len())
        .map(|(_, amount)| *amount)
}

/// Fixed portal charge converted to the settlement currency and rounded to cents.
pub fn portal_fee_rate(description: &str, config: &AuditConfig) -> Option<f64> {
    portal_fee_amount(description, config).map(|aed| round2(aed * config.reference_to_settlement()))
}
