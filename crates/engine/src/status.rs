use lineaudit_core::config::AuditConfig;
use lineaudit_core::line::{
    BandTier, ChargeGroup, CostGuardBand, DraftLine, EvidenceRef, LineType, Status, ValidationFlag,
};
use lineaudit_core::money::Money;
use serde::Serialize;

const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub status: Status,
    pub risk_tier: CostGuardBand,
    pub validation_flags: Vec<ValidationFlag>,
    pub remarks: String,
}

/// Everything the resolver looks at for one line.
#[derive(Debug, Clone, Copy)]
pub struct LineFacts<'a> {
    pub draft: &'a DraftLine,
    pub line_type: LineType,
    pub group: ChargeGroup,
    pub amount_usd: Money,
    pub delta_percent: f64,
    pub band: &'a CostGuardBand,
    /// `None` when evidence linking is switched off.
    pub evidence: Option<&'a [EvidenceRef]>,
}

impl LineFacts<'_> {
    fn missing_evidence(&self) -> bool {
        self.evidence.is_some_and(|docs| docs.is_empty())
    }

    fn missing_rate_source(&self) -> bool {
        let source = self.draft.rate_source.trim();
        source.is_empty() || source.eq_ignore_ascii_case(UNKNOWN_SOURCE)
    }
}

pub struct StatusResolver<'a> {
    config: &'a AuditConfig,
}

impl<'a> StatusResolver<'a> {
    pub fn new(config: &'a AuditConfig) -> Self {
        Self { config }
    }

    /// First matching rule wins.
    pub fn status(&self, facts: &LineFacts<'_>) -> Status {
        if facts.band.tier == BandTier::AutoFail {
            Status::CostGuardFail
        } else if facts.missing_rate_source() {
            Status::ReferenceMissing
        } else if facts.line_type == LineType::Unknown {
            Status::NoData
        } else if facts.missing_evidence() {
            Status::NoEvidence
        } else if matches!(facts.band.tier, BandTier::High | BandTier::Critical) {
            Status::Warning
        } else {
            Status::Pass
        }
    }

    pub fn flags(&self, facts: &LineFacts<'_>) -> Vec<ValidationFlag> {
        let mut flags = Vec::new();
        if facts.delta_percent > self.config.autofail_threshold_pct {
            flags.push(ValidationFlag::AutoFail);
        }
        if !facts.amount_usd.is_positive() {
            flags.push(ValidationFlag::ZeroAmount);
        }
        let currency = facts.draft.currency.trim().to_uppercase();
        if !self.config.known_currencies().contains(&currency) {
            flags.push(ValidationFlag::UnknownCurrency);
        }
        if facts.draft.rate_source.trim().is_empty() {
            flags.push(ValidationFlag::NoRateSource);
        }
        if facts.line_type == LineType::Unknown {
            flags.push(ValidationFlag::UnknownLineType);
        }
        if facts.missing_evidence() {
            flags.push(ValidationFlag::NoSupportingDocs);
        }
        flags
    }

    pub fn remarks(&self, status: Status, facts: &LineFacts<'_>) -> String {
        let mut remarks = Vec::new();
        if status == Status::ReferenceMissing {
            remarks.push("REFERENCE_MISSING");
        }
        if status == Status::NoEvidence {
            remarks.push("NO_EVIDENCE");
        }
        if facts.line_type == LineType::Unknown {
            remarks.push("LINE_TYPE_UNKNOWN");
        }
        if facts.delta_percent > self.config.tolerance_for(facts.group) {
            remarks.push("TOLERANCE_EXCEEDED");
        }
        remarks.join("; ")
    }

    pub fn assess(&self, facts: &LineFacts<'_>) -> Assessment {
        let status = self.status(facts);
        Assessment {
            status,
            risk_tier: facts.band.clone(),
            validation_flags: self.flags(facts),
            remarks: self.remarks(status, facts),
        }
    }
}
