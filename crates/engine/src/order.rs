use lineaudit_core::line::InvoiceLine;

/// Numeric serials first, ascending; everything else after, in input order.
fn serial_key(s_no: &str) -> (bool, u128) {
    let s = s_no.trim();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        // Digit strings too long for u128 still sort after shorter ones.
        (false, s.parse().unwrap_or(u128::MAX))
    } else {
        (true, 0)
    }
}

/// Stable sort by serial number.
pub fn sort_by_serial(lines: &mut [InvoiceLine]) {
    lines.sort_by_key(|line| serial_key(&line.draft.s_no));
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineaudit_core::line::{BandTier, ChargeGroup, CostGuardBand, DraftLine, LineType, Status};
    use lineaudit_core::money::Money;

    fn line(s_no: &str, row: usize) -> InvoiceLine {
        let band = CostGuardBand {
            tier: BandTier::Pass,
            label: "PASS".into(),
        };
        InvoiceLine {
            draft: DraftLine {
                s_no: s_no.into(),
                row_number: row,
                ..Default::default()
            },
            sheet_index: 0,
            line_type: LineType::Contract,
            charge_group: ChargeGroup::Contract,
            amount_usd: Money::zero(),
            delta_percent: 0.0,
            cost_guard_band: band.clone(),
            status: Status::Pass,
            risk_tier: band,
            validation_flags: Vec::new(),
            remarks: String::new(),
            evidence: Vec::new(),
        }
    }

    fn rows(lines: &[InvoiceLine]) -> Vec<usize> {
        lines.iter().map(|l| l.draft.row_number).collect()
    }

    #[test]
    fn numeric_serials_sort_as_integers() {
        let mut lines = vec![line("10", 1), line("2", 2), line(" 1 ", 3)];
        sort_by_serial(&mut lines);
        assert_eq!(rows(&lines), vec![3, 2, 1]);
    }

    #[test]
    fn non_numeric_serials_go_last_in_input_order() {
        let mut lines = vec![line("B", 1), line("3", 2), line("", 3), line("A", 4), line("1", 5)];
        sort_by_serial(&mut lines);
        assert_eq!(rows(&lines), vec![5, 2, 1, 3, 4]);
    }

    #[test]
    fn equal_serials_keep_input_order() {
        let mut lines = vec![line("1", 7), line("1", 3), line("1.5", 9), line("1", 5)];
        sort_by_serial(&mut lines);
        assert_eq!(rows(&lines), vec![7, 3, 5, 9]);
    }
}
