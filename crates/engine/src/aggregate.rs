use lineaudit_core::line::{InvoiceLine, LineType, Status};
use lineaudit_core::money::Money;
use lineaudit_core::summary::{SheetSummary, Summary};

pub fn summarize<'a, I>(lines: I) -> Summary
where
    I: IntoIterator<Item = &'a InvoiceLine>,
{
    let mut summary = Summary::default();
    let mut total = Money::zero();
    let mut delta_sum = 0.0;

    for line in lines {
        summary.total_items += 1;
        match line.status {
            Status::Pass => summary.pass_items += 1,
            Status::Warning => summary.warning_items += 1,
            s if s.is_fail() => summary.fail_items += 1,
            _ => {}
        }
        match line.line_type {
            LineType::AtCost => summary.at_cost_items += 1,
            LineType::Contract => summary.contract_items += 1,
            LineType::Unknown => {}
        }
        if line.has_evidence() {
            summary.evidence_items += 1;
        }
        total = total + line.amount_usd;
        delta_sum += line.delta_percent;
    }

    if summary.total_items > 0 {
        let count = summary.total_items as f64;
        summary.total_amount_usd = total;
        summary.average_delta_percent = delta_sum / count;
        summary.pass_rate = summary.pass_items as f64 / count * 100.0;
    }
    summary
}

/// One summary per sheet, in workbook order, including sheets with no lines.
/// Lines are matched to sheets by position, so repeated sheet names stay apart.
pub fn summarize_by_sheet(sheets: &[String], lines: &[InvoiceLine]) -> Vec<SheetSummary> {
    let mut by_sheet: Vec<Vec<&InvoiceLine>> = vec![Vec::new(); sheets.len()];
    for line in lines {
        if let Some(bucket) = by_sheet.get_mut(line.sheet_index) {
            bucket.push(line);
        }
    }
    sheets
        .iter()
        .zip(by_sheet)
        .map(|(sheet, lines)| SheetSummary {
            sheet: sheet.clone(),
            summary: summarize(lines),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineaudit_core::line::{BandTier, ChargeGroup, CostGuardBand, DraftLine, EvidenceRef};

    fn line(sheet: usize, status: Status, line_type: LineType, amount: f64, delta: f64) -> InvoiceLine {
        let band = CostGuardBand {
            tier: BandTier::Pass,
            label: "PASS".into(),
        };
        InvoiceLine {
            draft: DraftLine::default(),
            sheet_index: sheet,
            line_type,
            charge_group: ChargeGroup::Other,
            amount_usd: Money::from_f64(amount),
            delta_percent: delta,
            cost_guard_band: band.clone(),
            status,
            risk_tier: band,
            validation_flags: Vec::new(),
            remarks: String::new(),
            evidence: Vec::new(),
        }
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = summarize(Vec::<&InvoiceLine>::new());
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn buckets_and_totals() {
        let mut with_doc = line(0, Status::Pass, LineType::AtCost, 0.1, 2.0);
        with_doc.evidence.push(EvidenceRef::new("x.pdf", "BOE", "Customs", 1));
        let lines = vec![
            with_doc,
            line(0, Status::Warning, LineType::Contract, 0.2, 8.0),
            line(1, Status::NoEvidence, LineType::Contract, 0.3, 0.0),
            line(1, Status::ReferenceMissing, LineType::Unknown, 0.0, -2.0),
        ];
        let summary = summarize(&lines);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.pass_items, 1);
        assert_eq!(summary.warning_items, 1);
        assert_eq!(summary.fail_items, 2);
        assert_eq!(summary.total_amount_usd, Money::from_cents(60));
        assert_eq!(summary.average_delta_percent, 2.0);
        assert_eq!(summary.at_cost_items, 1);
        assert_eq!(summary.contract_items, 2);
        assert_eq!(summary.evidence_items, 1);
        assert_eq!(summary.pass_rate, 25.0);
    }

    #[test]
    fn per_sheet_keeps_workbook_order_and_empty_sheets() {
        let lines = vec![
            line(2, Status::Pass, LineType::Contract, 5.0, 0.0),
            line(0, Status::Pass, LineType::Contract, 10.0, 0.0),
        ];
        let sheets = vec!["B".to_string(), "Empty".to_string(), "A".to_string()];
        let per_sheet = summarize_by_sheet(&sheets, &lines);
        let names: Vec<&str> = per_sheet.iter().map(|s| s.sheet.as_str()).collect();
        assert_eq!(names, vec!["B", "Empty", "A"]);
        assert_eq!(per_sheet[0].summary.total_amount_usd, Money::from_cents(1_000));
        assert_eq!(per_sheet[1].summary.total_items, 0);
        assert_eq!(per_sheet[2].summary.total_amount_usd, Money::from_cents(500));
    }

    #[test]
    fn repeated_sheet_names_do_not_share_lines() {
        let lines = vec![
            line(0, Status::Pass, LineType::Contract, 1.0, 0.0),
            line(0, Status::Pass, LineType::Contract, 1.0, 0.0),
            line(1, Status::Pass, LineType::Contract, 1.0, 0.0),
        ];
        let sheets = vec!["SCT-0107".to_string(), "SCT-0107".to_string()];
        let counts: Vec<usize> = summarize_by_sheet(&sheets, &lines)
            .iter()
            .map(|s| s.summary.total_items)
            .collect();
        assert_eq!(counts, vec![2, 1]);
    }
}
