use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::lane::LaneKey;
use crate::money::Money;

/// A row as it came off the sheet, before any audit logic ran.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftLine {
    pub sheet: String,
    /// 1-based row number within the sheet.
    pub row_number: usize,
    pub s_no: String,
    pub rate_source: String,
    pub description: String,
    pub rate: f64,
    pub quantity: f64,
    pub total_stated: f64,
    pub currency: String,
    /// Documentary reference amount; 0.0 when the sheet carries none.
    pub at_cost: f64,
    pub formula: String,
    /// Lane columns as stated on the sheet, before canonicalization.
    #[serde(default)]
    pub lane: LaneKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineType {
    #[serde(rename = "At-Cost")]
    AtCost,
    Contract,
    Unknown,
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineType::AtCost => write!(f, "At-Cost"),
            LineType::Contract => write!(f, "Contract"),
            LineType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Which tolerance a line is held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeGroup {
    /// Fixed government/port portal charges (appointment, DPC, manifest, document processing).
    PortalFee,
    Contract,
    AtCost,
    Other,
}

impl ChargeGroup {
    pub const ALL: [ChargeGroup; 4] = [
        ChargeGroup::PortalFee,
        ChargeGroup::Contract,
        ChargeGroup::AtCost,
        ChargeGroup::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChargeGroup::PortalFee => "portal_fee",
            ChargeGroup::Contract => "contract",
            ChargeGroup::AtCost => "at_cost",
            ChargeGroup::Other => "other",
        }
    }
}

impl fmt::Display for ChargeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(&['-', ' '][..], "_");
        ChargeGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// Severity ladder shared by every band preset, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandTier {
    Pass,
    Warn,
    High,
    Critical,
    AutoFail,
}

impl BandTier {
    pub const ALL: [BandTier; 5] = [
        BandTier::Pass,
        BandTier::Warn,
        BandTier::High,
        BandTier::Critical,
        BandTier::AutoFail,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A classified variance: the severity tier plus the label of the preset in use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostGuardBand {
    pub tier: BandTier,
    pub label: String,
}

impl fmt::Display for CostGuardBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    Warning,
    CostGuardFail,
    ReferenceMissing,
    NoData,
    NoEvidence,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warning => "WARNING",
            Status::CostGuardFail => "COST_GUARD_FAIL",
            Status::ReferenceMissing => "REFERENCE_MISSING",
            Status::NoData => "NO_DATA",
            Status::NoEvidence => "NO_EVIDENCE",
        }
    }

    /// Statuses counted in the fail bucket of a summary.
    pub fn is_fail(self) -> bool {
        matches!(
            self,
            Status::CostGuardFail | Status::ReferenceMissing | Status::NoData | Status::NoEvidence
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationFlag {
    #[serde(rename = "AUTOFAIL")]
    AutoFail,
    #[serde(rename = "ZERO_AMOUNT")]
    ZeroAmount,
    #[serde(rename = "UNKNOWN_CURRENCY")]
    UnknownCurrency,
    #[serde(rename = "NO_RATE_SOURCE")]
    NoRateSource,
    #[serde(rename = "UNKNOWN_LINE_TYPE")]
    UnknownLineType,
    #[serde(rename = "NO_SUPPORTING_DOCS")]
    NoSupportingDocs,
}

impl ValidationFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationFlag::AutoFail => "AUTOFAIL",
            ValidationFlag::ZeroAmount => "ZERO_AMOUNT",
            ValidationFlag::UnknownCurrency => "UNKNOWN_CURRENCY",
            ValidationFlag::NoRateSource => "NO_RATE_SOURCE",
            ValidationFlag::UnknownLineType => "UNKNOWN_LINE_TYPE",
            ValidationFlag::NoSupportingDocs => "NO_SUPPORTING_DOCS",
        }
    }
}

impl fmt::Display for ValidationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supporting document attached to a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub file_name: String,
    pub doc_type: String,
    pub doc_type_label: String,
    pub size_bytes: u64,
    pub display: String,
}

impl EvidenceRef {
    pub fn new(file_name: &str, doc_type: &str, doc_type_label: &str, size_bytes: u64) -> Self {
        let kind = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "FILE".to_string());
        let display = format!("{kind}: {file_name} | {doc_type_label} | {size_bytes} bytes");
        Self {
            file_name: file_name.to_string(),
            doc_type: doc_type.to_string(),
            doc_type_label: doc_type_label.to_string(),
            size_bytes,
            display,
        }
    }
}

/// A fully audited invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(flatten)]
    pub draft: DraftLine,
    /// Position of the line's sheet within its workbook.
    #[serde(default)]
    pub sheet_index: usize,
    pub line_type: LineType,
    pub charge_group: ChargeGroup,
    pub amount_usd: Money,
    pub delta_percent: f64,
    pub cost_guard_band: CostGuardBand,
    pub status: Status,
    pub risk_tier: CostGuardBand,
    pub validation_flags: Vec<ValidationFlag>,
    pub remarks: String,
    pub evidence: Vec<EvidenceRef>,
}

impl InvoiceLine {
    pub fn has_evidence(&self) -> bool {
        !self.evidence.is_empty()
    }

    pub fn has_flag(&self, flag: ValidationFlag) -> bool {
        self.validation_flags.contains(&flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_type_display_and_serde() {
        assert_eq!(LineType::AtCost.to_string(), "At-Cost");
        assert_eq!(
            serde_json::to_string(&LineType::AtCost).unwrap(),
            "\"At-Cost\""
        );
    }

    #[test]
    fn charge_group_names_round_trip() {
        for group in ChargeGroup::ALL {
            assert_eq!(group.as_str().parse::<ChargeGroup>(), Ok(group));
            let json = serde_json::to_string(&group).unwrap();
            assert_eq!(json, format!("\"{group}\""));
        }
        assert_eq!("Portal Fee".parse::<ChargeGroup>(), Ok(ChargeGroup::PortalFee));
        assert_eq!("at-cost".parse::<ChargeGroup>(), Ok(ChargeGroup::AtCost));
        assert!("freight".parse::<ChargeGroup>().is_err());
    }

    #[test]
    fn band_tiers_are_ordered() {
        assert!(BandTier::Pass < BandTier::Warn);
        assert!(BandTier::Critical < BandTier::AutoFail);
        assert_eq!(BandTier::AutoFail.index(), 4);
    }

    #[test]
    fn status_fail_bucket() {
        assert!(Status::CostGuardFail.is_fail());
        assert!(Status::NoEvidence.is_fail());
        assert!(!Status::Warning.is_fail());
        assert!(!Status::Pass.is_fail());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Status::CostGuardFail).unwrap(),
            "\"COST_GUARD_FAIL\""
        );
        assert_eq!(Status::ReferenceMissing.to_string(), "REFERENCE_MISSING");
    }

    #[test]
    fn flag_names_match_serde() {
        for flag in [
            ValidationFlag::AutoFail,
            ValidationFlag::ZeroAmount,
            ValidationFlag::UnknownCurrency,
            ValidationFlag::NoRateSource,
            ValidationFlag::UnknownLineType,
            ValidationFlag::NoSupportingDocs,
        ] {
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.as_str()));
        }
    }

    #[test]
    fn evidence_display_uses_extension() {
        let r = EvidenceRef::new("HVDC-ADOPT-SCT-0107_BOE.pdf", "BOE", "Customs", 2048);
        assert_eq!(r.display, "PDF: HVDC-ADOPT-SCT-0107_BOE.pdf | Customs | 2048 bytes");

        let bare = EvidenceRef::new("scan", "DO", "Delivery Order", 1);
        assert!(bare.display.starts_with("FILE: scan"));
    }
}
