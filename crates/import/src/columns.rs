use lineaudit_core::sheet::Cell;
use serde::{Deserialize, Serialize};

use crate::lexicon::FieldKind;

/// Column index per canonical field, as discovered from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub s_no_column: Option<usize>,
    pub rate_source_column: Option<usize>,
    pub description_column: Option<usize>,
    pub rate_column: Option<usize>,
    pub quantity_column: Option<usize>,
    pub total_column: Option<usize>,
    pub currency_column: Option<usize>,
    pub at_cost_column: Option<usize>,
    pub formula_column: Option<usize>,
    pub cargo_type_column: Option<usize>,
    pub destination_column: Option<usize>,
    pub unit_column: Option<usize>,
    pub port_column: Option<usize>,
}

impl ColumnMapping {
    /// Build a mapping from a header row. When two cells claim the same
    /// field the right-most one is kept.
    pub fn from_header(header: &[Cell]) -> Self {
        let mut mapping = Self::default();
        for (idx, cell) in header.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let Some(text) = cell.display_text() else {
                continue;
            };
            if let Some(kind) = FieldKind::classify(&text) {
                *mapping.slot_mut(kind) = Some(idx);
            }
        }
        mapping
    }

    pub fn get(&self, kind: FieldKind) -> Option<usize> {
        match kind {
            FieldKind::SerialNo => self.s_no_column,
            FieldKind::RateSource => self.rate_source_column,
            FieldKind::Description => self.description_column,
            FieldKind::Rate => self.rate_column,
            FieldKind::Quantity => self.quantity_column,
            FieldKind::Total => self.total_column,
            FieldKind::Currency => self.currency_column,
            FieldKind::AtCost => self.at_cost_column,
            FieldKind::Formula => self.formula_column,
            FieldKind::CargoType => self.cargo_type_column,
            FieldKind::Destination => self.destination_column,
            FieldKind::Unit => self.unit_column,
            FieldKind::Port => self.port_column,
        }
    }

    fn slot_mut(&mut self, kind: FieldKind) -> &mut Option<usize> {
        match kind {
            FieldKind::SerialNo => &mut self.s_no_column,
            FieldKind::RateSource => &mut self.rate_source_column,
            FieldKind::Description => &mut self.description_column,
            FieldKind::Rate => &mut self.rate_column,
            FieldKind::Quantity => &mut self.quantity_column,
            FieldKind::Total => &mut self.total_column,
            FieldKind::Currency => &mut self.currency_column,
            FieldKind::AtCost => &mut self.at_cost_column,
            FieldKind::Formula => &mut self.formula_column,
            FieldKind::CargoType => &mut self.cargo_type_column,
            FieldKind::Destination => &mut self.destination_column,
            FieldKind::Unit => &mut self.unit_column,
            FieldKind::Port => &mut self.port_column,
        }
    }

    pub fn mapped_fields(&self) -> Vec<FieldKind> {
        FieldKind::PRIORITY
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped_fields().is_empty()
    }

    /// Trimmed display text of the mapped cell, or `""`.
    pub fn text(&self, row: &[Cell], kind: FieldKind) -> String {
        self.cell(row, kind)
            .and_then(Cell::display_text)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Numeric value of the mapped cell, or `0.0`.
    pub fn number(&self, row: &[Cell], kind: FieldKind) -> f64 {
        self.cell(row, kind).and_then(Cell::as_f64).unwrap_or(0.0)
    }

    fn cell<'a>(&self, row: &'a [Cell], kind: FieldKind) -> Option<&'a Cell> {
        self.get(kind).and_then(|idx| row.get(idx))
    }
}
