use lineaudit_core::lane::LaneKey;
use lineaudit_core::line::DraftLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse reference JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse reference TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Reference rate for '{description}' must be non-negative and finite, got {rate}")]
    InvalidRate { description: String, rate: f64 },
    #[error("Reference rate {rate} for '{description}' is outside its allowed range")]
    OutOfRange { description: String, rate: f64 },
    #[error("Lane '{0}' needs a supported cargo type and port, a destination and a unit")]
    InvalidLane(LaneKey),
    #[error("Reference rate {0} has neither a description nor a lane")]
    Unkeyed(f64),
}

/// Source of contracted unit rates, in settlement currency.
pub trait ReferenceRates: Send + Sync {
    /// Contracted rate for the line, if one is known.
    fn reference_rate(&self, draft: &DraftLine) -> Option<f64>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRate {
    #[serde(default)]
    pub description: String,
    pub rate_usd: f64,
    /// Restricts the entry to lines whose rate source contains this text.
    #[serde(default)]
    pub rate_source: Option<String>,
    /// Lane rate; canonicalized on load.
    #[serde(default)]
    pub lane: Option<LaneKey>,
    #[serde(default)]
    pub min_rate_usd: Option<f64>,
    #[serde(default)]
    pub max_rate_usd: Option<f64>,
}

impl ReferenceRate {
    pub fn new(description: &str, rate_usd: f64) -> Self {
        Self {
            description: description.to_string(),
            rate_usd,
            ..Default::default()
        }
    }
}

/// Inclusive bounds check; an absent bound does not constrain.
pub fn validate_rate_range(rate: f64, min_rate: Option<f64>, max_rate: Option<f64>) -> bool {
    min_rate.map_or(true, |min| rate >= min) && max_rate.map_or(true, |max| rate <= max)
}

#[derive(Debug, Default, Deserialize)]
struct RawTable {
    #[serde(default)]
    rates: Vec<ReferenceRate>,
}

/// In-memory reference rates keyed on normalized description, and on
/// canonical lane for entries that carry one.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRateTable {
    entries: BTreeMap<String, Vec<ReferenceRate>>,
    lanes: BTreeMap<LaneKey, ReferenceRate>,
    count: usize,
}

impl ReferenceRateTable {
    /// The first entry for a lane wins; later duplicates are ignored.
    pub fn new(rates: Vec<ReferenceRate>) -> Result<Self, ReferenceError> {
        let mut table = Self::default();
        for mut rate in rates {
            if !rate.rate_usd.is_finite() || rate.rate_usd < 0.0 {
                return Err(ReferenceError::InvalidRate {
                    description: rate.description,
                    rate: rate.rate_usd,
                });
            }
            if !validate_rate_range(rate.rate_usd, rate.min_rate_usd, rate.max_rate_usd) {
                return Err(ReferenceError::OutOfRange {
                    description: rate.description,
                    rate: rate.rate_usd,
                });
            }
            let has_description = !rate.description.trim().is_empty();
            match rate.lane.take() {
                Some(lane) => {
                    let lane = lane.canonical();
                    if !lane.is_valid() {
                        return Err(ReferenceError::InvalidLane(lane));
                    }
                    rate.lane = Some(lane.clone());
                    if has_description {
                        table.insert_description(rate.clone());
                    }
                    table.lanes.entry(lane).or_insert(rate);
                }
                None if has_description => table.insert_description(rate),
                None => return Err(ReferenceError::Unkeyed(rate.rate_usd)),
            }
            table.count += 1;
        }
        Ok(table)
    }

    fn insert_description(&mut self, rate: ReferenceRate) {
        self.entries
            .entry(normalize_description(&rate.description))
            .or_default()
            .push(rate);
    }

    /// A JSON array of `{description, rate_usd, rate_source?}` objects.
    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let rates: Vec<ReferenceRate> = serde_json::from_str(json)?;
        Self::new(rates)
    }

    /// A TOML document with one `[[rates]]` table per entry.
    pub fn from_toml(toml_content: &str) -> Result<Self, ReferenceError> {
        let raw: RawTable = toml::from_str(toml_content)?;
        Self::new(raw.rates)
    }

    /// Load a `.toml` file as TOML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Rate for a lane as stated on an invoice; the key is canonicalized
    /// first and must be complete to join.
    pub fn lookup_lane(&self, lane: &LaneKey) -> Option<&ReferenceRate> {
        if lane.is_empty() {
            return None;
        }
        let lane = lane.canonical();
        if !lane.is_valid() {
            return None;
        }
        self.lanes.get(&lane)
    }

    /// Source-specific entries take precedence over generic ones.
    pub fn lookup(&self, description: &str, rate_source: &str) -> Option<&ReferenceRate> {
        let candidates = self.entries.get(&normalize_description(description))?;
        let source = rate_source.to_uppercase();
        candidates
            .iter()
            .find(|r| {
                r.rate_source
                    .as_deref()
                    .is_some_and(|s| !s.trim().is_empty() && source.contains(&s.trim().to_uppercase()))
            })
            .or_else(|| candidates.iter().find(|r| r.rate_source.is_none()))
    }
}

/// Lane first, then description.
impl ReferenceRates for ReferenceRateTable {
    fn reference_rate(&self, draft: &DraftLine) -> Option<f64> {
        self.lookup_lane(&draft.lane)
            .or_else(|| self.lookup(&draft.description, &draft.rate_source))
            .map(|r| r.rate_usd)
    }
}

/// Upper-case with runs of whitespace collapsed to one space.
pub fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
