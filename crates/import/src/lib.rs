pub mod columns;
pub mod extract;
pub mod formula;
pub mod header;
pub mod lexicon;

pub use columns::ColumnMapping;
pub use extract::{extract_row, extract_sheet, is_candidate_row, SheetExtraction};
pub use formula::{parse_aed_from_formula, parse_formula_amount, FormulaAmount};
pub use header::{locate_region, score_row, DataRegion, LocateError};
pub use lexicon::FieldKind;
