use serde::{Deserialize, Serialize};
use std::fmt;

/// Terms that mark a header row. Matched case-insensitively as substrings of
/// the whole row text, so overlapping terms (`Rate`, `Rate Source`) each count.
pub const HEADER_KEYWORDS: &[&str] = &[
    "S/No", "SNo", "S.No", "No", "Item",
    "Rate Source", "RateSource", "Source",
    "Description", "Desc", "Item Description",
    "Rate", "Unit Rate", "Price", "Rate_USD",
    "Formula", "Calc", "Calculation", "Formula_Text",
    "Qty", "Quantity", "Qty.",
    "Total", "Total (USD)", "Amount", "Total_USD",
    "Currency", "Curr", "CCY",
    "At Cost", "At-Cost", "Cost",
];

pub const CURRENCY_TOKENS: &[&str] = &["USD", "AED"];

/// Canonical invoice-line fields, declared in header-matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    SerialNo,
    RateSource,
    Description,
    Rate,
    Quantity,
    Total,
    Currency,
    AtCost,
    Formula,
    CargoType,
    Destination,
    Unit,
    Port,
}

impl FieldKind {
    pub const PRIORITY: [FieldKind; 13] = [
        FieldKind::SerialNo,
        FieldKind::RateSource,
        FieldKind::Description,
        FieldKind::Rate,
        FieldKind::Quantity,
        FieldKind::Total,
        FieldKind::Currency,
        FieldKind::AtCost,
        FieldKind::Formula,
        FieldKind::CargoType,
        FieldKind::Destination,
        FieldKind::Unit,
        FieldKind::Port,
    ];

    /// Upper-case header fragments that identify this field.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            FieldKind::SerialNo => &["S/NO", "SNO", "S.NO", "NO"],
            FieldKind::RateSource => &["RATE SOURCE", "RATESOURCE", "SOURCE"],
            FieldKind::Description => &["DESCRIPTION", "DESC"],
            FieldKind::Rate => &["RATE", "PRICE", "UNIT RATE", "RATE_USD"],
            FieldKind::Quantity => &["QTY", "QUANTITY"],
            FieldKind::Total => &["TOTAL", "AMOUNT", "TOTAL_USD"],
            FieldKind::Currency => &["CURRENCY", "CURR", "CCY"],
            FieldKind::AtCost => &["AT COST", "AT-COST", "COST"],
            FieldKind::Formula => &["FORMULA", "CALC", "FORMULA_TEXT"],
            FieldKind::CargoType => &["CARGO"],
            FieldKind::Destination => &["DESTINATION", "DEST"],
            FieldKind::Unit => &["UNIT", "UOM"],
            FieldKind::Port => &["PORT", "POL"],
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldKind::Rate | FieldKind::Quantity | FieldKind::Total | FieldKind::AtCost
        )
    }

    /// First field, in priority order, whose synonyms occur in `header`.
    pub fn classify(header: &str) -> Option<FieldKind> {
        let header = header.trim().to_uppercase();
        if header.is_empty() {
            return None;
        }
        Self::PRIORITY
            .into_iter()
            .find(|kind| kind.synonyms().iter().any(|s| header.contains(s)))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::SerialNo => "s_no",
            FieldKind::RateSource => "rate_source",
            FieldKind::Description => "description",
            FieldKind::Rate => "rate",
            FieldKind::Quantity => "quantity",
            FieldKind::Total => "total",
            FieldKind::Currency => "currency",
            FieldKind::AtCost => "at_cost",
            FieldKind::Formula => "formula",
            FieldKind::CargoType => "cargo_type",
            FieldKind::Destination => "destination",
            FieldKind::Unit => "unit",
            FieldKind::Port => "port",
        };
        f.write_str(name)
    }
}

/// Number of header keywords occurring in `text`, case-insensitively.
pub fn keyword_hits(text: &str) -> usize {
    let text = text.to_lowercase();
    HEADER_KEYWORDS
        .iter()
        .filter(|kw| text.contains(&kw.to_lowercase()))
        .count()
}

pub fn contains_currency_token(text: &str) -> bool {
    let text = text.to_uppercase();
    CURRENCY_TOKENS.iter().any(|t| text.contains(t))
}
