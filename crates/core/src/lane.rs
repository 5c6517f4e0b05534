use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUPPORTED_CARGO_TYPES: &[&str] = &["Air", "Bulk", "Container", "LCL", "FCL"];

pub const SUPPORTED_PORTS: &[&str] = &[
    "Dubai Airport",
    "Abu Dhabi Airport",
    "Jebel Ali Port",
    "Mina Zayed Port",
    "Musaffah Port",
    "Khalifa Port",
];

/// Destination spellings seen on invoices and the name they stand for.
/// Matched exactly after whitespace is collapsed.
pub const CANONICAL_DESTINATIONS: &[(&str, &str)] = &[
    ("MIRFA SITE", "MIRFA SITE"),
    ("MIRFA", "MIRFA SITE"),
    ("MIRFA SITE, UAE", "MIRFA SITE"),
    ("MIRFA SITE, UAE.", "MIRFA SITE"),
    ("SHUWEIHAT Site", "SHUWEIHAT Site"),
    ("SHUWEIHAT", "SHUWEIHAT Site"),
    ("SHUWEIHAT SITE", "SHUWEIHAT Site"),
    ("SHUWEIHAT Site, UAE", "SHUWEIHAT Site"),
    ("Storage Yard", "Storage Yard"),
    ("STORAGE YARD", "Storage Yard"),
    ("Storage", "Storage Yard"),
    ("Hamariya free zone, Sharjah", "Hamariya free zone, Sharjah"),
    ("Hamariya free zone", "Hamariya free zone, Sharjah"),
    ("Hamariya", "Hamariya free zone, Sharjah"),
    ("Sharjah", "Hamariya free zone, Sharjah"),
    ("Dubai", "Dubai"),
    ("Abu Dhabi", "Abu Dhabi"),
    ("UAE", "UAE"),
];

/// Lower-cased unit spellings and their canonical form.
pub const CANONICAL_UNITS: &[(&str, &str)] = &[
    ("per rt", "per RT"),
    ("per truck", "per truck"),
    ("per kg", "per KG"),
    ("per b/l", "per B/L"),
    ("per container", "per container"),
    ("per hour", "per hour"),
    ("per axle", "per axle"),
];

/// Port a shipment to a canonical destination enters through when the line names none.
pub const DESTINATION_PORTS: &[(&str, &str)] = &[
    ("MIRFA SITE", "Dubai Airport"),
    ("SHUWEIHAT Site", "Jebel Ali Port"),
    ("Storage Yard", "Jebel Ali Port"),
    ("Hamariya free zone, Sharjah", "Jebel Ali Port"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Collapse whitespace, then map known spellings to their canonical name.
/// Unknown destinations come back collapsed but otherwise unchanged.
pub fn canon_dest(destination: &str) -> String {
    let collapsed = destination.split_whitespace().collect::<Vec<_>>().join(" ");
    lookup(CANONICAL_DESTINATIONS, &collapsed)
        .map(str::to_string)
        .unwrap_or(collapsed)
}

/// Trim and lower-case, then map known units to their canonical spelling.
pub fn unit_key(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    lookup(CANONICAL_UNITS, &lowered)
        .map(str::to_string)
        .unwrap_or(lowered)
}

/// The stated port when there is one, else the port implied by a canonical destination.
pub fn port_hint(port: &str, destination: &str) -> Option<String> {
    let port = port.trim();
    if !port.is_empty() {
        return Some(port.to_string());
    }
    lookup(DESTINATION_PORTS, destination).map(str::to_string)
}

/// Key joining an invoice line to a lane rate: what moved, where from, where to, and per what.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneKey {
    pub cargo_type: String,
    pub port: String,
    pub destination: String,
    pub unit: String,
}

impl LaneKey {
    pub fn new(cargo_type: &str, port: &str, destination: &str, unit: &str) -> Self {
        Self {
            cargo_type: cargo_type.into(),
            port: port.into(),
            destination: destination.into(),
            unit: unit.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.cargo_type, &self.port, &self.destination, &self.unit]
            .iter()
            .all(|s| s.trim().is_empty())
    }

    /// Canonical destination and unit, with a missing port filled in from the destination.
    pub fn canonical(&self) -> Self {
        let destination = canon_dest(&self.destination);
        let port = port_hint(&self.port, &destination).unwrap_or_default();
        Self {
            cargo_type: self.cargo_type.trim().to_string(),
            port,
            destination,
            unit: unit_key(&self.unit),
        }
    }

    /// A supported cargo type and port, and a non-empty destination and unit.
    pub fn is_valid(&self) -> bool {
        SUPPORTED_CARGO_TYPES.contains(&self.cargo_type.trim())
            && SUPPORTED_PORTS.contains(&self.port.trim())
            && !self.destination.is_empty()
            && !self.unit.is_empty()
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.cargo_type, self.port, self.destination, self.unit
        )
    }
}
