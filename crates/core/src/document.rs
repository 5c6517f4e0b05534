use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A proof-of-charge document supplied by the document-index collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceDocument {
    pub shipment_id: String,
    /// Normalized type code, e.g. `BOE` or `CarrierInvoice`.
    pub doc_type: String,
    pub file_name: String,
    pub path: String,
    pub size_bytes: u64,
    pub modified: Option<NaiveDateTime>,
}

/// Documents grouped per shipment. Each list is kept stably sorted by type code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndex {
    shipments: BTreeMap<String, Vec<EvidenceDocument>>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents<I>(docs: I) -> Self
    where
        I: IntoIterator<Item = EvidenceDocument>,
    {
        let mut index = Self::new();
        for doc in docs {
            index.insert(doc);
        }
        index
    }

    pub fn insert(&mut self, doc: EvidenceDocument) {
        let list = self.shipments.entry(doc.shipment_id.clone()).or_default();
        // Insert after any existing entries of the same type so the order stays stable.
        let at = list.partition_point(|d| d.doc_type <= doc.doc_type);
        list.insert(at, doc);
    }

    /// Documents for one shipment, or an empty slice when none are known.
    pub fn documents_for(&self, shipment_id: &str) -> &[EvidenceDocument] {
        self.shipments
            .get(shipment_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn shipment_count(&self) -> usize {
        self.shipments.len()
    }

    pub fn document_count(&self) -> usize {
        self.shipments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }

    /// Document counts per type code across all shipments.
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for doc in self.shipments.values().flatten() {
            *counts.entry(doc.doc_type.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(shipment: &str, doc_type: &str, file: &str) -> EvidenceDocument {
        EvidenceDocument {
            shipment_id: shipment.into(),
            doc_type: doc_type.into(),
            file_name: file.into(),
            path: format!("/docs/{file}"),
            size_bytes: 100,
            modified: None,
        }
    }

    #[test]
    fn lists_are_sorted_by_type() {
        let index = DocumentIndex::from_documents(vec![
            doc("S1", "DO", "s1_do.pdf"),
            doc("S1", "BOE", "s1_boe.pdf"),
            doc("S1", "CarrierInvoice", "s1_inv.pdf"),
        ]);
        let types: Vec<_> = index
            .documents_for("S1")
            .iter()
            .map(|d| d.doc_type.as_str())
            .collect();
        assert_eq!(types, vec!["BOE", "CarrierInvoice", "DO"]);
    }

    #[test]
    fn same_type_keeps_insertion_order() {
        let index = DocumentIndex::from_documents(vec![
            doc("S1", "BOE", "first.pdf"),
            doc("S1", "BOE", "second.pdf"),
        ]);
        let names: Vec<_> = index
            .documents_for("S1")
            .iter()
            .map(|d| d.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["first.pdf", "second.pdf"]);
    }

    #[test]
    fn unknown_shipment_is_empty() {
        let index = DocumentIndex::new();
        assert!(index.documents_for("nope").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn counts() {
        let index = DocumentIndex::from_documents(vec![
            doc("S1", "BOE", "a.pdf"),
            doc("S2", "BOE", "b.pdf"),
            doc("S2", "DO", "c.pdf"),
        ]);
        assert_eq!(index.shipment_count(), 2);
        assert_eq!(index.document_count(), 3);
        assert_eq!(index.type_counts().get("BOE"), Some(&2));
    }
}
