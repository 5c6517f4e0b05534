use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

use crate::line::{BandTier, ChargeGroup, CostGuardBand};

pub const DEFAULT_USD_AED: f64 = 3.6725;
pub const DEFAULT_CONTRACT_TOLERANCE_PCT: f64 = 3.0;
pub const DEFAULT_PORTAL_FEE_TOLERANCE_PCT: f64 = 0.5;
pub const DEFAULT_AUTOFAIL_THRESHOLD_PCT: f64 = 15.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid FX pair '{0}': expected FROM_TO")]
    MalformedPair(String),
    #[error("FX rate for {pair} must be positive and finite, got {rate}")]
    NonPositiveRate { pair: String, rate: f64 },
    #[error("No FX rate from {from} to {to}")]
    MissingRate { from: String, to: String },
    #[error("Band breakpoints must be non-negative and strictly ascending: {0:?}")]
    BandsNotAscending([f64; 4]),
    #[error("Band label for tier {0:?} is empty")]
    EmptyBandLabel(BandTier),
    #[error("{name} must be a non-negative finite percentage, got {value}")]
    InvalidPercentage { name: &'static str, value: f64 },
    #[error("{0} must not be empty")]
    EmptyCurrency(&'static str),
    #[error("Unknown charge group '{0}'")]
    UnknownChargeGroup(String),
    #[error("Portal fee '{name}' must be a positive finite amount, got {amount}")]
    InvalidPortalFee { name: String, amount: f64 },
}

// ── FX table ──────────────────────────────────────────────────────────────────

/// Fixed exchange rates keyed `FROM_TO`: one unit of FROM buys `rate` units of TO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FxTable {
    rates: BTreeMap<String, f64>,
}

impl Default for FxTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert("USD_AED".to_string(), DEFAULT_USD_AED);
        Self { rates }
    }
}

impl FxTable {
    /// Returns a new table with the pair added or replaced.
    pub fn with_rate(&self, from: &str, to: &str, rate: f64) -> Result<Self, ConfigError> {
        let key = format!("{}_{}", from.trim().to_uppercase(), to.trim().to_uppercase());
        validate_pair(&key, rate)?;
        let mut next = self.clone();
        next.rates.insert(key, rate);
        Ok(next)
    }

    /// Direct rate, reciprocal of the reverse pair, or 1.0 for the same currency.
    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        if from == to {
            return Some(1.0);
        }
        if let Some(rate) = self.rates.get(&format!("{from}_{to}")) {
            return Some(*rate);
        }
        self.rates
            .get(&format!("{to}_{from}"))
            .filter(|r| **r > 0.0)
            .map(|r| 1.0 / r)
    }

    /// Every currency that appears on either side of a pair.
    pub fn currencies(&self) -> BTreeSet<String> {
        self.rates
            .keys()
            .filter_map(|k| split_pair(k))
            .flat_map(|(a, b)| [a.to_string(), b.to_string()])
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, rate) in &self.rates {
            validate_pair(key, *rate)?;
        }
        Ok(())
    }

    fn merge(&mut self, other: BTreeMap<String, f64>) {
        for (key, rate) in other {
            self.rates.insert(key.trim().to_uppercase(), rate);
        }
    }
}

fn split_pair(key: &str) -> Option<(&str, &str)> {
    let (from, to) = key.split_once('_')?;
    let valid = |c: &str| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_alphabetic());
    (valid(from) && valid(to)).then_some((from, to))
}

fn validate_pair(key: &str, rate: f64) -> Result<(), ConfigError> {
    if split_pair(key).is_none() {
        return Err(ConfigError::MalformedPair(key.to_string()));
    }
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConfigError::NonPositiveRate {
            pair: key.to_string(),
            rate,
        });
    }
    Ok(())
}

// ── Cost-guard bands ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPreset {
    /// 2 / 5 / 10 / 15 %: PASS, WARN, HIGH, CRITICAL, AUTOFAIL.
    #[default]
    CostGuard,
    /// 3 / 7 / 12 / 15 %: GREEN, YELLOW, ORANGE, RED, CRITICAL.
    Normalized,
}

/// Four ascending breakpoints (inclusive upper edges, in percent) and five labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub breakpoints: [f64; 4],
    pub labels: [String; 5],
}

impl Default for BandTable {
    fn default() -> Self {
        Self::preset(BandPreset::CostGuard)
    }
}

impl From<BandPreset> for BandTable {
    fn from(preset: BandPreset) -> Self {
        Self::preset(preset)
    }
}

impl BandTable {
    pub fn preset(preset: BandPreset) -> Self {
        let (breakpoints, labels) = match preset {
            BandPreset::CostGuard => (
                [2.0, 5.0, 10.0, 15.0],
                ["PASS", "WARN", "HIGH", "CRITICAL", "AUTOFAIL"],
            ),
            BandPreset::Normalized => (
                [3.0, 7.0, 12.0, 15.0],
                ["GREEN", "YELLOW", "ORANGE", "RED", "CRITICAL"],
            ),
        };
        Self {
            breakpoints,
            labels: labels.map(String::from),
        }
    }

    pub fn tier_for(&self, delta_percent: f64) -> BandTier {
        let magnitude = delta_percent.abs();
        if magnitude.is_nan() {
            return BandTier::AutoFail;
        }
        self.breakpoints
            .iter()
            .position(|bp| magnitude <= *bp)
            .map_or(BandTier::AutoFail, |i| BandTier::ALL[i])
    }

    pub fn label(&self, tier: BandTier) -> &str {
        &self.labels[tier.index()]
    }

    pub fn classify(&self, delta_percent: f64) -> CostGuardBand {
        let tier = self.tier_for(delta_percent);
        CostGuardBand {
            tier,
            label: self.label(tier).to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bp = self.breakpoints;
        let ascending = bp.windows(2).all(|w| w[0] < w[1]);
        if !ascending || bp.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(ConfigError::BandsNotAscending(bp));
        }
        if let Some(tier) = BandTier::ALL
            .iter()
            .find(|t| self.label(**t).trim().is_empty())
        {
            return Err(ConfigError::EmptyBandLabel(*tier));
        }
        Ok(())
    }
}

// ── Evidence and shipment naming ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidencePolicy {
    /// When off, lines are never linked and never flagged for missing evidence.
    pub enabled: bool,
    /// Attach the shipment's first document when no rule matched.
    pub first_document_fallback: bool,
}

impl Default for EvidencePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            first_document_fallback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentNaming {
    pub prefix: String,
    /// Sheet-name starts that denote a shipment missing its prefix.
    pub short_codes: Vec<String>,
}

impl Default for ShipmentNaming {
    fn default() -> Self {
        Self {
            prefix: "HVDC-ADOPT-".to_string(),
            short_codes: vec!["SCT".into(), "SIM".into(), "HE".into()],
        }
    }
}

pub const DEFAULT_DOC_TYPE_LABELS: &[(&str, &str)] = &[
    ("BOE", "Customs"),
    ("DO", "Delivery Order"),
    ("DN", "Delivery Note"),
    ("CarrierInvoice", "Carrier/Airline Invoice"),
    ("PortCNTAdminInsp", "Terminal Admin/Inspection"),
    ("PortCNTWashing", "Terminal Washing"),
    ("AirportFees", "Airport Fees"),
    ("Appointment", "Appointment"),
    ("StorageFee", "Storage Fee"),
    ("CourierFee", "Courier Fee"),
    ("RepairChargesApproval", "Repair Charges Approval"),
];

fn default_labels() -> BTreeMap<String, String> {
    DEFAULT_DOC_TYPE_LABELS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Charge groups ─────────────────────────────────────────────────────────────

/// Fixed portal charges in the reference currency, keyed by an upper-case
/// description fragment.
pub const DEFAULT_PORTAL_FEES: &[(&str, f64)] = &[("APPOINTMENT", 27.0), ("DPC", 35.0)];

fn default_portal_fees() -> BTreeMap<String, f64> {
    DEFAULT_PORTAL_FEES
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn default_tolerances() -> BTreeMap<ChargeGroup, f64> {
    BTreeMap::from([(ChargeGroup::PortalFee, DEFAULT_PORTAL_FEE_TOLERANCE_PCT)])
}

// ── Audit configuration ───────────────────────────────────────────────────────

/// Everything the engine needs besides the data. Treat as an immutable value:
/// the `with_*` methods return a new, re-validated configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditConfig {
    pub fx: FxTable,
    /// Currency every `amount_usd` is expressed in.
    pub settlement_currency: String,
    /// Currency of the documentary at-cost amounts.
    pub reference_currency: String,
    pub bands: BandTable,
    /// Tolerance for every charge group without its own entry in `tolerances`.
    pub contract_tolerance_pct: f64,
    pub tolerances: BTreeMap<ChargeGroup, f64>,
    pub autofail_threshold_pct: f64,
    pub portal_fees: BTreeMap<String, f64>,
    pub evidence: EvidencePolicy,
    pub shipments: ShipmentNaming,
    pub doc_type_labels: BTreeMap<String, String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            fx: FxTable::default(),
            settlement_currency: "USD".to_string(),
            reference_currency: "AED".to_string(),
            bands: BandTable::default(),
            contract_tolerance_pct: DEFAULT_CONTRACT_TOLERANCE_PCT,
            tolerances: default_tolerances(),
            autofail_threshold_pct: DEFAULT_AUTOFAIL_THRESHOLD_PCT,
            portal_fees: default_portal_fees(),
            evidence: EvidencePolicy::default(),
            shipments: ShipmentNaming::default(),
            doc_type_labels: default_labels(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawBands {
    preset: Option<BandPreset>,
    breakpoints: Option<[f64; 4]>,
    labels: Option<[String; 5]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    settlement_currency: Option<String>,
    reference_currency: Option<String>,
    contract_tolerance_pct: Option<f64>,
    autofail_threshold_pct: Option<f64>,
    fx: BTreeMap<String, f64>,
    tolerances: BTreeMap<String, f64>,
    portal_fees: BTreeMap<String, f64>,
    bands: RawBands,
    evidence: Option<EvidencePolicy>,
    shipments: Option<ShipmentNaming>,
    doc_type_labels: BTreeMap<String, String>,
}

impl AuditConfig {
    /// Parse a TOML document. Missing keys fall back to the defaults;
    /// `fx`, `tolerances`, `portal_fees` and `doc_type_labels` entries are
    /// merged over the default tables.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(toml_content)?;
        let defaults = AuditConfig::default();

        let mut fx = defaults.fx;
        fx.merge(raw.fx);

        let mut bands = raw
            .bands
            .preset
            .map(BandTable::preset)
            .unwrap_or(defaults.bands);
        if let Some(bp) = raw.bands.breakpoints {
            bands.breakpoints = bp;
        }
        if let Some(labels) = raw.bands.labels {
            bands.labels = labels;
        }

        let mut tolerances = defaults.tolerances;
        for (name, pct) in raw.tolerances {
            let group = name
                .parse::<ChargeGroup>()
                .map_err(ConfigError::UnknownChargeGroup)?;
            tolerances.insert(group, pct);
        }

        let mut portal_fees = defaults.portal_fees;
        for (name, amount) in raw.portal_fees {
            portal_fees.insert(name.trim().to_uppercase(), amount);
        }

        let mut doc_type_labels = defaults.doc_type_labels;
        doc_type_labels.extend(raw.doc_type_labels);

        let config = AuditConfig {
            fx,
            settlement_currency: raw
                .settlement_currency
                .map(|c| c.trim().to_uppercase())
                .unwrap_or(defaults.settlement_currency),
            reference_currency: raw
                .reference_currency
                .map(|c| c.trim().to_uppercase())
                .unwrap_or(defaults.reference_currency),
            bands,
            contract_tolerance_pct: raw
                .contract_tolerance_pct
                .unwrap_or(defaults.contract_tolerance_pct),
            tolerances,
            autofail_threshold_pct: raw
                .autofail_threshold_pct
                .unwrap_or(defaults.autofail_threshold_pct),
            portal_fees,
            evidence: raw.evidence.unwrap_or(defaults.evidence),
            shipments: raw.shipments.unwrap_or(defaults.shipments),
            doc_type_labels,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settlement_currency.trim().is_empty() {
            return Err(ConfigError::EmptyCurrency("settlement_currency"));
        }
        if self.reference_currency.trim().is_empty() {
            return Err(ConfigError::EmptyCurrency("reference_currency"));
        }
        self.fx.validate()?;
        if self
            .fx
            .rate(&self.reference_currency, &self.settlement_currency)
            .is_none()
        {
            return Err(ConfigError::MissingRate {
                from: self.reference_currency.clone(),
                to: self.settlement_currency.clone(),
            });
        }
        self.bands.validate()?;
        check_percentage("contract_tolerance_pct", self.contract_tolerance_pct)?;
        check_percentage("autofail_threshold_pct", self.autofail_threshold_pct)?;
        for pct in self.tolerances.values() {
            check_percentage("tolerances", *pct)?;
        }
        for (name, amount) in &self.portal_fees {
            if name.trim().is_empty() || !amount.is_finite() || *amount <= 0.0 {
                return Err(ConfigError::InvalidPortalFee {
                    name: name.clone(),
                    amount: *amount,
                });
            }
        }
        Ok(())
    }

    /// Tolerance, in percent, a line of this charge group may deviate before
    /// it is remarked as exceeding tolerance.
    pub fn tolerance_for(&self, group: ChargeGroup) -> f64 {
        self.tolerances
            .get(&group)
            .copied()
            .unwrap_or(self.contract_tolerance_pct)
    }

    /// Rate converting one unit of the reference currency into the settlement currency.
    pub fn reference_to_settlement(&self) -> f64 {
        self.fx
            .rate(&self.reference_currency, &self.settlement_currency)
            .unwrap_or(1.0)
    }

    /// Currencies a stated line currency may legitimately carry.
    pub fn known_currencies(&self) -> BTreeSet<String> {
        let mut known = self.fx.currencies();
        known.insert(self.settlement_currency.to_uppercase());
        known.insert(self.reference_currency.to_uppercase());
        known
    }

    pub fn doc_type_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.doc_type_labels
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    pub fn with_fx_rate(&self, from: &str, to: &str, rate: f64) -> Result<Self, ConfigError> {
        let next = Self {
            fx: self.fx.with_rate(from, to, rate)?,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn with_bands(&self, bands: BandTable) -> Result<Self, ConfigError> {
        let next = Self {
            bands,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn with_contract_tolerance(&self, pct: f64) -> Result<Self, ConfigError> {
        let next = Self {
            contract_tolerance_pct: pct,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn with_tolerance(&self, group: ChargeGroup, pct: f64) -> Result<Self, ConfigError> {
        let mut next = self.clone();
        next.tolerances.insert(group, pct);
        next.validate()?;
        Ok(next)
    }

    pub fn with_autofail_threshold(&self, pct: f64) -> Result<Self, ConfigError> {
        let next = Self {
            autofail_threshold_pct: pct,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn with_evidence_policy(&self, evidence: EvidencePolicy) -> Self {
        Self {
            evidence,
            ..self.clone()
        }
    }
}

fn check_percentage(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidPercentage { name, value });
    }
    Ok(())
}
