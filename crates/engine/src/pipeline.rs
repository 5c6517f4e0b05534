use lineaudit_core::config::{AuditConfig, ConfigError};
use lineaudit_core::document::{DocumentIndex, EvidenceDocument};
use lineaudit_core::line::{DraftLine, InvoiceLine};
use lineaudit_core::sheet::Sheet;
use lineaudit_core::summary::{SheetSummary, Summary};
use lineaudit_import::{extract_sheet, LocateError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{summarize, summarize_by_sheet};
use crate::charges::charge_group;
use crate::documents::shipment_id_for_sheet;
use crate::evidence::EvidenceLinker;
use crate::order::sort_by_serial;
use crate::rates::{amount_usd, classify_line_type};
use crate::reference::ReferenceRates;
use crate::status::{LineFacts, StatusResolver};
use crate::variance::VarianceEngine;

// ── Diagnostics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    HeaderNotFound,
    DataRangeNotFound,
}

/// A sheet that produced no lines, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub sheet: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl From<&LocateError> for Diagnostic {
    fn from(err: &LocateError) -> Self {
        let (sheet, kind) = match err {
            LocateError::HeaderNotFound { sheet, .. } => (sheet, DiagnosticKind::HeaderNotFound),
            LocateError::DataRangeNotFound { sheet, .. } => (sheet, DiagnosticKind::DataRangeNotFound),
        };
        Self {
            sheet: sheet.clone(),
            kind,
            message: err.to_string(),
        }
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SheetAudit {
    /// Position within the workbook.
    pub index: usize,
    pub sheet: String,
    pub shipment_id: String,
    pub lines: Vec<InvoiceLine>,
    pub diagnostic: Option<Diagnostic>,
}

/// Lines of a whole workbook, sorted by serial number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub lines: Vec<InvoiceLine>,
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Snapshot handed to reporters.
#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub summary: Summary,
    pub sheets: Vec<SheetSummary>,
    pub diagnostics: &'a [Diagnostic],
    pub lines: &'a [InvoiceLine],
}

impl AuditReport {
    pub fn summary(&self) -> Summary {
        summarize(&self.lines)
    }

    pub fn sheet_summaries(&self) -> Vec<SheetSummary> {
        summarize_by_sheet(&self.sheets, &self.lines)
    }

    pub fn view(&self) -> ReportView<'_> {
        ReportView {
            summary: self.summary(),
            sheets: self.sheet_summaries(),
            diagnostics: &self.diagnostics,
            lines: &self.lines,
        }
    }
}

// ── Auditor ───────────────────────────────────────────────────────────────────

pub struct Auditor {
    config: AuditConfig,
    reference: Option<Box<dyn ReferenceRates>>,
}

impl Auditor {
    /// Fails if the configuration is invalid; nothing is audited with a bad config.
    pub fn new(config: AuditConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            reference: None,
        })
    }

    /// Use contracted rates for contract-line variance.
    pub fn with_reference_rates(mut self, reference: impl ReferenceRates + 'static) -> Self {
        self.reference = Some(Box::new(reference));
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn audit_draft(&self, draft: DraftLine, documents: &[EvidenceDocument]) -> InvoiceLine {
        let line_type = classify_line_type(&draft);
        let group = charge_group(&draft, line_type);
        let amount = amount_usd(&draft, line_type, &self.config);
        let variance = VarianceEngine::new(&self.config, self.reference.as_deref())
            .evaluate(&draft, line_type, group);
        let evidence = self
            .config
            .evidence
            .enabled
            .then(|| EvidenceLinker::new(&self.config).link(&draft, documents));

        let assessment = StatusResolver::new(&self.config).assess(&LineFacts {
            draft: &draft,
            line_type,
            group,
            amount_usd: amount,
            delta_percent: variance.delta_percent,
            band: &variance.band,
            evidence: evidence.as_deref(),
        });

        debug!(
            sheet = %draft.sheet,
            row = draft.row_number,
            s_no = %draft.s_no,
            line_type = %line_type,
            group = %group,
            delta = variance.delta_percent,
            status = %assessment.status,
            "Line audited"
        );

        InvoiceLine {
            draft,
            sheet_index: 0,
            line_type,
            charge_group: group,
            amount_usd: amount,
            delta_percent: variance.delta_percent,
            cost_guard_band: variance.band,
            status: assessment.status,
            risk_tier: assessment.risk_tier,
            validation_flags: assessment.validation_flags,
            remarks: assessment.remarks,
            evidence: evidence.unwrap_or_default(),
        }
    }

    pub fn audit_sheet(&self, sheet: &Sheet, index: &DocumentIndex) -> SheetAudit {
        self.audit_sheet_at(0, sheet, index)
    }

    fn audit_sheet_at(&self, position: usize, sheet: &Sheet, index: &DocumentIndex) -> SheetAudit {
        let extraction = extract_sheet(sheet);
        let shipment_id = shipment_id_for_sheet(&sheet.name, &self.config.shipments);
        let documents = index.documents_for(&shipment_id);

        let lines: Vec<InvoiceLine> = extraction
            .drafts
            .into_iter()
            .map(|draft| InvoiceLine {
                sheet_index: position,
                ..self.audit_draft(draft, documents)
            })
            .collect();

        info!(
            sheet = %sheet.name,
            shipment = %shipment_id,
            lines = lines.len(),
            documents = documents.len(),
            "Sheet audited"
        );

        SheetAudit {
            index: position,
            sheet: sheet.name.clone(),
            shipment_id,
            lines,
            diagnostic: extraction.diagnostic.as_ref().map(Diagnostic::from),
        }
    }

    /// Audit every sheet in parallel, then merge in workbook order and sort by serial.
    pub fn audit_workbook(&self, sheets: &[Sheet], index: &DocumentIndex) -> AuditReport {
        info!(
            sheets = sheets.len(),
            shipments = index.shipment_count(),
            "Auditing workbook"
        );
        debug!(types = ?index.type_counts(), "Document types on file");

        let audits: Vec<SheetAudit> = sheets
            .par_iter()
            .enumerate()
            .map(|(position, sheet)| self.audit_sheet_at(position, sheet, index))
            .collect();

        let mut report = AuditReport {
            lines: Vec::new(),
            sheets: Vec::with_capacity(audits.len()),
            diagnostics: Vec::new(),
        };
        for audit in audits {
            report.sheets.push(audit.sheet);
            report.lines.extend(audit.lines);
            report.diagnostics.extend(audit.diagnostic);
        }
        sort_by_serial(&mut report.lines);

        info!(
            lines = report.lines.len(),
            diagnostics = report.diagnostics.len(),
            "Workbook audited"
        );
        report
    }
}
