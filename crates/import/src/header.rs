use lineaudit_core::sheet::{is_blank_row, Cell, Sheet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lexicon::{contains_currency_token, keyword_hits};

/// Minimum score a row needs before it is accepted as the header.
pub const MIN_HEADER_SCORE: usize = 2;
/// A run of this many blank rows ends the data block.
pub const MAX_CONSECUTIVE_BLANK_ROWS: usize = 3;

const CURRENCY_BONUS: usize = 2;
const DIGIT_BONUS: usize = 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("Sheet '{sheet}': no header row found (best score {best_score})")]
    HeaderNotFound { sheet: String, best_score: usize },
    #[error("Sheet '{sheet}': no data rows after header row {header_row}")]
    DataRangeNotFound { sheet: String, header_row: usize },
}

/// Where the line items live inside a sheet. Indices are 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRegion {
    pub header_row: usize,
    pub header_score: usize,
    pub first_data_row: usize,
    pub last_data_row: usize,
}

impl DataRegion {
    pub fn data_rows(&self) -> std::ops::RangeInclusive<usize> {
        self.first_data_row..=self.last_data_row
    }
}

/// Heuristic header score: keyword hits, +2 for a currency token, +1 for a digit-only cell.
pub fn score_row(row: &[Cell]) -> usize {
    let texts: Vec<String> = row
        .iter()
        .filter(|c| !matches!(c, Cell::Empty))
        .filter_map(Cell::display_text)
        .collect();
    let joined = texts.join(" ");

    let mut score = keyword_hits(&joined);
    if texts.iter().any(|t| contains_currency_token(t)) {
        score += CURRENCY_BONUS;
    }
    if row.iter().any(Cell::is_digit_string) {
        score += DIGIT_BONUS;
    }
    score
}

/// Index and score of the best-scoring row; the first row wins ties.
pub fn best_header_candidate(rows: &[Vec<Cell>]) -> Option<(usize, usize)> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| (idx, score_row(row)))
        .fold(None, |best, (idx, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((idx, score)),
        })
}

/// Last data row for a block starting at `start`, or `None` when the block is empty.
pub fn find_data_end(rows: &[Vec<Cell>], start: usize) -> Option<usize> {
    let mut consecutive_blank = 0;
    for (idx, row) in rows.iter().enumerate().skip(start) {
        if is_blank_row(row) {
            consecutive_blank += 1;
            if consecutive_blank >= MAX_CONSECUTIVE_BLANK_ROWS {
                return (idx + 1)
                    .checked_sub(consecutive_blank + 1)
                    .filter(|end| *end >= start);
            }
        } else {
            consecutive_blank = 0;
        }
    }
    rows.len().checked_sub(1).filter(|end| *end >= start)
}

pub fn locate_region(sheet: &Sheet) -> Result<DataRegion, LocateError> {
    let (header_row, header_score) = match best_header_candidate(&sheet.rows) {
        Some((idx, score)) if score >= MIN_HEADER_SCORE => (idx, score),
        other => {
            return Err(LocateError::HeaderNotFound {
                sheet: sheet.name.clone(),
                best_score: other.map_or(0, |(_, s)| s),
            })
        }
    };

    let first_data_row = header_row + 1;
    let last_data_row =
        find_data_end(&sheet.rows, first_data_row).ok_or_else(|| LocateError::DataRangeNotFound {
            sheet: sheet.name.clone(),
            header_row,
        })?;

    Ok(DataRegion {
        header_row,
        header_score,
        first_data_row,
        last_data_row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|s| if s.is_empty() { Cell::Empty } else { Cell::text(*s) })
            .collect()
    }

    fn blank() -> Vec<Cell> {
        vec![Cell::Empty, Cell::Empty]
    }

    #[test]
    fn score_combines_keywords_currency_and_digits() {
        let header = row(&["Description", "Qty", "Total (USD)"]);
        // description, desc, qty, total, total (usd) + currency bonus
        assert_eq!(score_row(&header), 7);

        let mut with_digit = header.clone();
        with_digit.push(Cell::Number(1.0));
        assert_eq!(score_row(&with_digit), 8);
    }

    #[test]
    fn rich_header_beats_single_keyword_row() {
        let rows = vec![
            row(&["Invoice Item"]),
            row(&["Description", "Quantity", "Amount", "AED"]),
        ];
        let (idx, score) = best_header_candidate(&rows).unwrap();
        assert_eq!(idx, 1);
        assert!(score >= 5);
        assert!(score_row(&rows[0]) < score);
    }

    #[test]
    fn ties_keep_first_row() {
        let rows = vec![row(&["Qty", "Total"]), row(&["Qty", "Total"])];
        assert_eq!(best_header_candidate(&rows), Some((0, 2)));
    }

    #[test]
    fn header_below_threshold_is_not_found() {
        let sheet = Sheet::new("Notes", vec![row(&["hello"]), row(&["Total"])]);
        let err = locate_region(&sheet).unwrap_err();
        assert_eq!(
            err,
            LocateError::HeaderNotFound {
                sheet: "Notes".into(),
                best_score: 1
            }
        );
    }

    #[test]
    fn empty_sheet_has_no_header() {
        let sheet = Sheet::new("Empty", vec![]);
        assert!(matches!(
            locate_region(&sheet),
            Err(LocateError::HeaderNotFound { best_score: 0, .. })
        ));
    }

    #[test]
    fn data_end_stops_at_three_blank_rows() {
        let rows = vec![
            row(&["Qty", "Total", "USD"]),
            row(&["1", "a", "b"]),
            blank(),
            row(&["2", "c", "d"]),
            blank(),
            blank(),
            blank(),
            row(&["footer", "1", "2"]),
        ];
        assert_eq!(find_data_end(&rows, 1), Some(3));
    }

    #[test]
    fn data_end_defaults_to_last_row() {
        let rows = vec![row(&["Qty"]), row(&["1"]), blank(), blank()];
        assert_eq!(find_data_end(&rows, 1), Some(3));
    }

    #[test]
    fn data_range_missing_when_header_is_last_row() {
        let sheet = Sheet::new("S", vec![row(&["Description", "Qty", "USD"])]);
        assert!(matches!(
            locate_region(&sheet),
            Err(LocateError::DataRangeNotFound { header_row: 0, .. })
        ));
    }

    #[test]
    fn data_range_missing_when_blank_run_follows_header() {
        let rows = vec![
            row(&["Description", "Qty", "USD"]),
            blank(),
            blank(),
            blank(),
            row(&["x", "1", "2"]),
        ];
        assert_eq!(find_data_end(&rows, 1), None);
    }

    #[test]
    fn locate_region_spans_block() {
        let sheet = Sheet::new(
            "SCT-0107",
            vec![
                row(&["DSV Invoice"]),
                row(&["S/No", "Description", "Rate", "Qty", "Total (USD)"]),
                row(&["1", "Handling", "10", "2", "20"]),
                row(&["2", "Storage", "5", "1", "5"]),
            ],
        );
        let region = locate_region(&sheet).unwrap();
        assert_eq!(region.header_row, 1);
        assert_eq!(region.first_data_row, 2);
        assert_eq!(region.last_data_row, 3);
        assert_eq!(region.data_rows().count(), 2);
    }
}
