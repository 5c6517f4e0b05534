use lineaudit_core::lane::LaneKey;
use lineaudit_core::line::DraftLine;
use lineaudit_core::sheet::{non_blank_count, Cell, Sheet};
use serde::Serialize;
use tracing::{debug, warn};

use crate::columns::ColumnMapping;
use crate::formula::parse_aed_from_formula;
use crate::header::{locate_region, DataRegion, LocateError};
use crate::lexicon::FieldKind;

const MIN_FILLED_CELLS: usize = 3;

/// Outcome of extracting one sheet. A sheet that could not be located still
/// produces an extraction, with no drafts and a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct SheetExtraction {
    pub sheet: String,
    pub region: Option<DataRegion>,
    pub mapping: ColumnMapping,
    pub drafts: Vec<DraftLine>,
    #[serde(skip)]
    pub diagnostic: Option<LocateError>,
}

/// A row worth extracting: at least three filled cells, one of them numeric.
pub fn is_candidate_row(row: &[Cell]) -> bool {
    non_blank_count(row) >= MIN_FILLED_CELLS && row.iter().any(|c| c.as_f64().is_some())
}

/// Without an At-Cost column the documentary amount is recovered from a
/// `=<amount>/<rate>` formula, when the row has one.
pub fn extract_row(sheet: &str, row_index: usize, row: &[Cell], mapping: &ColumnMapping) -> DraftLine {
    let formula = mapping.text(row, FieldKind::Formula);
    let at_cost = match mapping.at_cost_column {
        Some(_) => mapping.number(row, FieldKind::AtCost),
        None => parse_aed_from_formula(&formula).unwrap_or(0.0),
    };
    DraftLine {
        sheet: sheet.to_string(),
        row_number: row_index + 1,
        s_no: mapping.text(row, FieldKind::SerialNo),
        rate_source: mapping.text(row, FieldKind::RateSource),
        description: mapping.text(row, FieldKind::Description),
        rate: mapping.number(row, FieldKind::Rate),
        quantity: mapping.number(row, FieldKind::Quantity),
        total_stated: mapping.number(row, FieldKind::Total),
        currency: mapping.text(row, FieldKind::Currency),
        at_cost,
        formula,
        lane: LaneKey::new(
            &mapping.text(row, FieldKind::CargoType),
            &mapping.text(row, FieldKind::Port),
            &mapping.text(row, FieldKind::Destination),
            &mapping.text(row, FieldKind::Unit),
        ),
    }
}

pub fn extract_sheet(sheet: &Sheet) -> SheetExtraction {
    let region = match locate_region(sheet) {
        Ok(region) => region,
        Err(err) => {
            warn!(sheet = %sheet.name, error = %err, "Skipping sheet");
            return SheetExtraction {
                sheet: sheet.name.clone(),
                region: None,
                mapping: ColumnMapping::default(),
                drafts: Vec::new(),
                diagnostic: Some(err),
            };
        }
    };

    let header = sheet.row(region.header_row).unwrap_or_default();
    let mapping = ColumnMapping::from_header(header);
    debug!(
        sheet = %sheet.name,
        header_row = region.header_row,
        score = region.header_score,
        fields = ?mapping.mapped_fields(),
        "Header located"
    );

    let drafts: Vec<DraftLine> = region
        .data_rows()
        .filter_map(|idx| sheet.row(idx).map(|row| (idx, row)))
        .filter(|(_, row)| is_candidate_row(row))
        .map(|(idx, row)| extract_row(&sheet.name, idx, row, &mapping))
        .collect();

    debug!(sheet = %sheet.name, lines = drafts.len(), "Rows extracted");

    SheetExtraction {
        sheet: sheet.name.clone(),
        region: Some(region),
        mapping,
        drafts,
        diagnostic: None,
    }
}
