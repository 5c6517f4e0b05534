use lineaudit_core::config::AuditConfig;
use lineaudit_core::line::{ChargeGroup, CostGuardBand, DraftLine, LineType};
use lineaudit_core::money::round2;

use crate::charges::portal_fee_rate;
use crate::rates::document_amount_usd;
use crate::reference::ReferenceRates;

#[derive(Debug, Clone, PartialEq)]
pub struct Variance {
    pub delta_percent: f64,
    pub band: CostGuardBand,
}

/// Computes the percentage delta of a line against its reference and bands it.
pub struct VarianceEngine<'a> {
    config: &'a AuditConfig,
    reference: Option<&'a dyn ReferenceRates>,
}

impl<'a> VarianceEngine<'a> {
    pub fn new(config: &'a AuditConfig, reference: Option<&'a dyn ReferenceRates>) -> Self {
        Self { config, reference }
    }

    pub fn delta_percent(&self, draft: &DraftLine, line_type: LineType, group: ChargeGroup) -> f64 {
        match line_type {
            LineType::AtCost if draft.at_cost > 0.0 => {
                let doc_usd = document_amount_usd(draft, self.config);
                percent_change(draft.total_stated, doc_usd)
            }
            LineType::Contract => match (self.reference_rate(draft, group), billed_unit_rate(draft)) {
                (Some(reference), Some(billed)) => percent_change(billed, reference),
                _ => 0.0,
            },
            _ => 0.0,
        }
    }

    /// Contracted rate from the lookup; portal charges fall back to their fixed fee.
    fn reference_rate(&self, draft: &DraftLine, group: ChargeGroup) -> Option<f64> {
        self.reference
            .and_then(|r| r.reference_rate(draft))
            .or_else(|| match group {
                ChargeGroup::PortalFee => {
                    let text = format!("{} {}", draft.rate_source, draft.description);
                    portal_fee_rate(&text, self.config)
                }
                _ => None,
            })
    }

    pub fn evaluate(&self, draft: &DraftLine, line_type: LineType, group: ChargeGroup) -> Variance {
        let delta_percent = self.delta_percent(draft, line_type, group);
        Variance {
            delta_percent,
            band: self.config.bands.classify(delta_percent),
        }
    }
}

/// The rate cell, else stated total over quantity. `None` when neither is usable.
pub fn billed_unit_rate(draft: &DraftLine) -> Option<f64> {
    if draft.rate > 0.0 {
        Some(draft.rate)
    } else if draft.quantity > 0.0 && draft.total_stated > 0.0 {
        Some(draft.total_stated / draft.quantity)
    } else {
        None
    }
}

/// `(actual - reference) / reference` in percent, 0 when the reference is not positive.
fn percent_change(actual: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        round2((actual - reference) / reference * 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineaudit_core::config::{BandPreset, BandTable};
    use lineaudit_core::line::BandTier;

    struct Flat(f64);

    impl ReferenceRates for Flat {
        fn reference_rate(&self, _draft: &DraftLine) -> Option<f64> {
            Some(self.0)
        }
    }

    fn at_cost(at_cost: f64, total: f64) -> DraftLine {
        DraftLine {
            rate_source: "AT COST".into(),
            at_cost,
            total_stated: total,
            currency: "USD".into(),
            ..Default::default()
        }
    }

    #[test]
    fn at_cost_delta_against_document_amount() {
        let config = AuditConfig::default();
        let engine = VarianceEngine::new(&config, None);
        let v = engine.evaluate(&at_cost(27.0, 8.0), LineType::AtCost, ChargeGroup::AtCost);
        assert_eq!(v.delta_percent, 8.84);
        assert_eq!(v.band.tier, BandTier::High);
        assert_eq!(v.band.label, "HIGH");
    }

    #[test]
    fn tiny_document_amount_gives_zero_delta() {
        let config = AuditConfig::default();
        let engine = VarianceEngine::new(&config, None);
        // 0.01 AED rounds to 0.00 USD
        assert_eq!(engine.delta_percent(&at_cost(0.01, 5.0), LineType::AtCost, ChargeGroup::AtCost), 0.0);
    }

    #[test]
    fn contract_without_reference_is_zero() {
        let config = AuditConfig::default();
        let engine = VarianceEngine::new(&config, None);
        let draft = DraftLine {
            rate_source: "CONTRACT ABC".into(),
            rate: 120.0,
            total_stated: 100.0,
            ..Default::default()
        };
        let v = engine.evaluate(&draft, LineType::Contract, ChargeGroup::Contract);
        assert_eq!(v.delta_percent, 0.0);
        assert_eq!(v.band.tier, BandTier::Pass);
    }

    #[test]
    fn contract_with_reference_compares_unit_rate() {
        let config = AuditConfig::default();
        let reference = Flat(100.0);
        let engine = VarianceEngine::new(&config, Some(&reference as &dyn ReferenceRates));
        let draft = DraftLine {
            rate_source: "CONTRACT".into(),
            rate: 104.0,
            ..Default::default()
        };
        assert_eq!(engine.delta_percent(&draft, LineType::Contract, ChargeGroup::Contract), 4.0);

        let zero = Flat(0.0);
        let engine = VarianceEngine::new(&config, Some(&zero as &dyn ReferenceRates));
        assert_eq!(engine.delta_percent(&draft, LineType::Contract, ChargeGroup::Contract), 0.0);
    }

    #[test]
    fn unknown_lines_have_no_variance() {
        let config = AuditConfig::default();
        let flat = Flat(1.0);
        let engine = VarianceEngine::new(&config, Some(&flat as &dyn ReferenceRates));
        assert_eq!(engine.delta_percent(&at_cost(0.0, 9.0), LineType::Unknown, ChargeGroup::Other), 0.0);
    }

    #[test]
    fn preset_changes_labels_not_deltas() {
        let config = AuditConfig::default()
            .with_bands(BandTable::preset(BandPreset::Normalized))
            .unwrap();
        let engine = VarianceEngine::new(&config, None);
        let v = engine.evaluate(&at_cost(27.0, 8.0), LineType::AtCost, ChargeGroup::AtCost);
        assert_eq!(v.delta_percent, 8.84);
        assert_eq!(v.band.label, "ORANGE");
    }

    #[test]
    fn missing_rate_cell_falls_back_to_total_over_quantity() {
        let config = AuditConfig::default();
        let reference = Flat(100.0);
        let engine = VarianceEngine::new(&config, Some(&reference as &dyn ReferenceRates));
        let mut draft = DraftLine {
            rate_source: "CONTRACT".into(),
            description: "Terminal handling".into(),
            rate: 0.0,
            quantity: 2.0,
            total_stated: 220.0,
            ..Default::default()
        };
        assert_eq!(engine.delta_percent(&draft, LineType::Contract, ChargeGroup::Contract), 10.0);

        // nothing billed to compare: no variance rather than -100%
        draft.quantity = 0.0;
        let v = engine.evaluate(&draft, LineType::Contract, ChargeGroup::Contract);
        assert_eq!(v.delta_percent, 0.0);
        assert_eq!(v.band.tier, BandTier::Pass);
    }

    #[test]
    fn portal_fee_compares_against_fixed_fee() {
        let config = AuditConfig::default();
        let engine = VarianceEngine::new(&config, None);
        let mut draft = DraftLine {
            rate_source: "CONTRACT".into(),
            description: "APPOINTMENT FEE".into(),
            rate: 7.35,
            quantity: 1.0,
            ..Default::default()
        };
        let delta = |d: &DraftLine| engine.delta_percent(d, LineType::Contract, ChargeGroup::PortalFee);
        assert_eq!(delta(&draft), 0.0);
        draft.rate = 7.40;
        assert_eq!(delta(&draft), 0.68);
        draft.rate = 10.0;
        assert_eq!(delta(&draft), 36.05);
        assert_eq!(engine.evaluate(&draft, LineType::Contract, ChargeGroup::PortalFee).band.tier, BandTier::AutoFail);

        // the same description outside the portal group has no reference
        assert_eq!(engine.delta_percent(&draft, LineType::Contract, ChargeGroup::Contract), 0.0);
    }

    #[test]
    fn lookup_rate_beats_fixed_portal_fee() {
        let config = AuditConfig::default();
        let reference = Flat(8.0);
        let engine = VarianceEngine::new(&config, Some(&reference as &dyn ReferenceRates));
        let draft = DraftLine {
            rate_source: "CONTRACT".into(),
            description: "DPC FEE".into(),
            rate: 8.0,
            ..Default::default()
        };
        assert_eq!(engine.delta_percent(&draft, LineType::Contract, ChargeGroup::PortalFee), 0.0);
    }
}
