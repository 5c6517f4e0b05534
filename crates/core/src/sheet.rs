use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet value as handed over by the workbook reader.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Empty cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// The cell rendered as text, or `None` for an empty cell.
    ///
    /// Whole numbers render without a fractional part so that serial numbers
    /// stored as floats (`3.0`) keep their textual form (`"3"`).
    pub fn display_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
        }
    }

    /// Best-effort numeric value. Never fails; non-finite results are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Empty => return None,
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_digit_string(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Text(s) => {
                let s = s.trim();
                !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
            }
            Cell::Number(n) => n.is_finite() && *n >= 0.0 && n.fract() == 0.0,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Empty, Into::into)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One worksheet: a name and its rows. Rows may be ragged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A row with no cells, or only blank cells.
pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

pub fn non_blank_count(row: &[Cell]) -> usize {
    row.iter().filter(|c| !c.is_blank()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::text("   ").is_blank());
        assert!(!Cell::text("x").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(3.0).display_text().as_deref(), Some("3"));
        assert_eq!(Cell::Number(7.35).display_text().as_deref(), Some("7.35"));
        assert_eq!(Cell::Empty.display_text(), None);
    }

    #[test]
    fn as_f64_is_total() {
        assert_eq!(Cell::text(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Cell::text("1,234").as_f64(), None);
        assert_eq!(Cell::text("NaN").as_f64(), None);
        assert_eq!(Cell::Number(f64::INFINITY).as_f64(), None);
        assert_eq!(Cell::Empty.as_f64(), None);
    }

    #[test]
    fn digit_strings() {
        assert!(Cell::text("42").is_digit_string());
        assert!(Cell::Number(42.0).is_digit_string());
        assert!(!Cell::Number(4.2).is_digit_string());
        assert!(!Cell::Number(-1.0).is_digit_string());
        assert!(!Cell::text("4a").is_digit_string());
        assert!(!Cell::text("").is_digit_string());
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Cell::from(None::<&str>), Cell::Empty);
        assert_eq!(Cell::from(Some(2.5)), Cell::Number(2.5));
    }

    #[test]
    fn row_helpers() {
        let row = vec![Cell::Empty, Cell::text(" "), Cell::Number(1.0)];
        assert!(!is_blank_row(&row));
        assert_eq!(non_blank_count(&row), 1);
        assert!(is_blank_row(&[]));
    }
}
