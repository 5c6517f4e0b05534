pub mod aggregate;
pub mod charges;
pub mod documents;
pub mod evidence;
pub mod order;
pub mod pipeline;
pub mod rates;
pub mod reference;
pub mod status;
pub mod variance;

pub use aggregate::{summarize, summarize_by_sheet};
pub use charges::{charge_group, is_portal_fee, portal_fee_amount, portal_fee_rate};
pub use documents::{index_from_listings, normalize_document_type, parse_document_name, shipment_id_for_sheet, FileListing};
pub use evidence::EvidenceLinker;
pub use order::sort_by_serial;
pub use pipeline::{AuditReport, Auditor, Diagnostic, DiagnosticKind, ReportView, SheetAudit};
pub use rates::{amount_usd, classify_line_type};
pub use reference::{validate_rate_range, ReferenceError, ReferenceRate, ReferenceRateTable, ReferenceRates};
pub use status::{Assessment, LineFacts, StatusResolver};
pub use variance::{billed_unit_rate, Variance, VarianceEngine};
