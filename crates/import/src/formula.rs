use std::sync::OnceLock;

use regex::Regex;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// `=27/3.6725`, `= 35.5 / 3.6725 * 2`, `=(100)/3.6725`
re!(re_amount_over_rate,
    r"^\s*=\s*\(?\s*(\d+(?:\.\d+)?)\s*\)?\s*/\s*(\d+(?:\.\d+)?)");

/// A spreadsheet formula that divides a documentary amount by an exchange rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaAmount {
    pub amount: f64,
    pub divisor: f64,
}

/// Leading `=<amount>/<rate>` of a formula; anything after the divisor is ignored.
pub fn parse_formula_amount(formula: &str) -> Option<FormulaAmount> {
    let caps = re_amount_over_rate().captures(formula)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let divisor: f64 = caps.get(2)?.as_str().parse().ok()?;
    (amount > 0.0 && divisor > 0.0).then_some(FormulaAmount { amount, divisor })
}

/// The reference-currency amount a formula such as `=27/3.6725` converts.
pub fn parse_aed_from_formula(formula: &str) -> Option<f64> {
    parse_formula_amount(formula).map(|f| f.amount)
}
