use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Roll-up of a set of audited lines. Always derived from the lines, never stored on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_items: usize,
    pub pass_items: usize,
    pub warning_items: usize,
    pub fail_items: usize,
    pub total_amount_usd: Money,
    pub average_delta_percent: f64,
    pub at_cost_items: usize,
    pub contract_items: usize,
    pub evidence_items: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub sheet: String,
    #[serde(flatten)]
    pub summary: Summary,
}
