pub mod config;
pub mod document;
pub mod lane;
pub mod line;
pub mod money;
pub mod sheet;
pub mod summary;

pub use config::{AuditConfig, BandPreset, BandTable, ConfigError, EvidencePolicy, FxTable, ShipmentNaming};
pub use document::{DocumentIndex, EvidenceDocument};
pub use lane::{canon_dest, port_hint, unit_key, LaneKey};
pub use line::{
    BandTier, ChargeGroup, CostGuardBand, DraftLine, EvidenceRef, InvoiceLine, LineType, Status,
    ValidationFlag,
};
pub use money::{round2, Money};
pub use sheet::{Cell, Sheet};
pub use summary::{SheetSummary, Summary};
