use chrono::NaiveDateTime;
use lineaudit_core::config::ShipmentNaming;
use lineaudit_core::document::{DocumentIndex, EvidenceDocument};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const PDF_EXTENSION: &str = ".pdf";

/// A file reported by whatever scanned the document folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListing {
    pub path: String,
    pub size_bytes: u64,
    pub modified: Option<NaiveDateTime>,
}

impl FileListing {
    pub fn new(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            modified: None,
        }
    }

    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}

/// Map a raw file-name segment onto a document type code.
pub fn normalize_document_type(segment: &str) -> String {
    let upper = segment.to_uppercase();
    let has = |needle: &str| upper.contains(needle);

    let code = if has("BOE") {
        "BOE"
    } else if has("DO") {
        "DO"
    } else if has("DN") {
        "DN"
    } else if has("CARRIER") || has("INVOICE") {
        "CarrierInvoice"
    } else if has("PORT") && has("ADMIN") {
        "PortCNTAdminInsp"
    } else if has("PORT") && has("WASH") {
        "PortCNTWashing"
    } else if has("AIRPORT") || has("FEES") {
        "AirportFees"
    } else if has("APPOINTMENT") {
        "Appointment"
    } else if has("STORAGE") {
        "StorageFee"
    } else if has("COURIER") {
        "CourierFee"
    } else if has("REPAIR") {
        "RepairChargesApproval"
    } else {
        return upper;
    };
    code.to_string()
}

fn strip_pdf_extension(segment: &str) -> &str {
    let cut = segment.len().saturating_sub(PDF_EXTENSION.len());
    match segment.get(cut..) {
        Some(tail) if tail.eq_ignore_ascii_case(PDF_EXTENSION) => &segment[..cut],
        _ => segment,
    }
}

/// `(shipment_id, type_code)` for a name like `HVDC-ADOPT-SCT-0107_BOE.pdf`.
pub fn parse_document_name(file_name: &str, naming: &ShipmentNaming) -> Option<(String, String)> {
    let is_pdf = strip_pdf_extension(file_name).len() < file_name.len();
    if !is_pdf || !file_name.contains(&naming.prefix) {
        return None;
    }
    let mut parts = file_name.split('_');
    let shipment_id = parts.next()?;
    let type_segment = strip_pdf_extension(parts.next()?);
    Some((shipment_id.to_string(), normalize_document_type(type_segment)))
}

/// Shipment id a sheet's lines belong to.
pub fn shipment_id_for_sheet(sheet_name: &str, naming: &ShipmentNaming) -> String {
    let name = sheet_name.trim();
    if name.starts_with(&naming.prefix) {
        return name.to_string();
    }
    if naming
        .short_codes
        .iter()
        .any(|code| !code.is_empty() && name.starts_with(code.as_str()))
    {
        return format!("{}{}", naming.prefix, name);
    }
    name.to_string()
}

pub fn document_from_listing(listing: &FileListing, naming: &ShipmentNaming) -> Option<EvidenceDocument> {
    let file_name = listing.file_name();
    let (shipment_id, doc_type) = parse_document_name(file_name, naming)?;
    Some(EvidenceDocument {
        shipment_id,
        doc_type,
        file_name: file_name.to_string(),
        path: listing.path.clone(),
        size_bytes: listing.size_bytes,
        modified: listing.modified,
    })
}

/// Build an index from file listings, skipping names that do not parse.
pub fn index_from_listings(listings: &[FileListing], naming: &ShipmentNaming) -> DocumentIndex {
    let mut index = DocumentIndex::new();
    for listing in listings {
        match document_from_listing(listing, naming) {
            Some(doc) => index.insert(doc),
            None => debug!(path = %listing.path, "Skipping unrecognised document"),
        }
    }
    index
}
