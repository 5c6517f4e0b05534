use lineaudit_core::config::AuditConfig;
use lineaudit_core::document::EvidenceDocument;
use lineaudit_core::line::{DraftLine, EvidenceRef};

/// Description words that point at a document by file name.
pub const DESCRIPTION_KEYWORDS: &[&str] = &[
    "BOE",
    "DO",
    "DN",
    "Carrier",
    "Port",
    "Airport",
    "Storage",
    "Appointment",
];

pub struct EvidenceLinker<'a> {
    config: &'a AuditConfig,
}

impl<'a> EvidenceLinker<'a> {
    pub fn new(config: &'a AuditConfig) -> Self {
        Self { config }
    }

    /// Indices into `documents` of the documents supporting `draft`, in
    /// selection order. `documents` must be the shipment's type-sorted list.
    pub fn select(&self, draft: &DraftLine, documents: &[EvidenceDocument]) -> Vec<usize> {
        let source = draft.rate_source.to_uppercase();
        let mut selected: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| {
                let code = doc.doc_type.trim();
                !code.is_empty() && source.contains(&code.to_uppercase())
            })
            .map(|(idx, _)| idx)
            .collect();

        let keywords = description_keywords(&draft.description);
        if !keywords.is_empty() {
            for (idx, doc) in documents.iter().enumerate() {
                if selected.contains(&idx) {
                    continue;
                }
                let name = doc.file_name.to_uppercase();
                if keywords.iter().any(|kw| name.contains(kw.as_str())) {
                    selected.push(idx);
                }
            }
        }

        if selected.is_empty() && self.config.evidence.first_document_fallback && !documents.is_empty() {
            selected.push(0);
        }
        selected
    }

    pub fn link(&self, draft: &DraftLine, documents: &[EvidenceDocument]) -> Vec<EvidenceRef> {
        self.select(draft, documents)
            .into_iter()
            .map(|idx| self.evidence_ref(&documents[idx]))
            .collect()
    }

    pub fn evidence_ref(&self, doc: &EvidenceDocument) -> EvidenceRef {
        EvidenceRef::new(
            &doc.file_name,
            &doc.doc_type,
            self.config.doc_type_label(&doc.doc_type),
            doc.size_bytes,
        )
    }
}

/// Upper-cased keywords whose upper-case form occurs in the description.
pub fn description_keywords(description: &str) -> Vec<String> {
    let description = description.to_uppercase();
    DESCRIPTION_KEYWORDS
        .iter()
        .map(|kw| kw.to_uppercase())
        .filter(|kw| description.contains(kw.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineaudit_core::config::EvidencePolicy;
    use lineaudit_core::document::DocumentIndex;

    fn doc(doc_type: &str, file_name: &str) -> EvidenceDocument {
        EvidenceDocument {
            shipment_id: "HVDC-ADOPT-SCT-0107".into(),
            doc_type: doc_type.into(),
            file_name: file_name.into(),
            path: format!("/docs/{file_name}"),
            size_bytes: 1024,
            modified: None,
        }
    }

    fn index() -> DocumentIndex {
        DocumentIndex::from_documents(vec![
            doc("DO", "HVDC-ADOPT-SCT-0107_DO.pdf"),
            doc("BOE", "HVDC-ADOPT-SCT-0107_BOE.pdf"),
            doc("StorageFee", "HVDC-ADOPT-SCT-0107_Storage.pdf"),
        ])
    }

    fn draft(rate_source: &str, description: &str) -> DraftLine {
        DraftLine {
            rate_source: rate_source.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn rate_source_code_matches_first() {
        let config = AuditConfig::default();
        let linker = EvidenceLinker::new(&config);
        let index = index();
        let docs = index.documents_for("HVDC-ADOPT-SCT-0107");
        let refs = linker.link(&draft("At cost per BOE", "Customs duty"), docs);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].doc_type, "BOE");
        assert_eq!(refs[0].doc_type_label, "Customs");
    }

    #[test]
    fn description_keywords_add_more_documents() {
        let config = AuditConfig::default();
        let linker = EvidenceLinker::new(&config);
        let index = index();
        let docs = index.documents_for("HVDC-ADOPT-SCT-0107");
        let refs = linker.link(&draft("BOE", "Storage charges"), docs);
        let types: Vec<&str> = refs.iter().map(|r| r.doc_type.as_str()).collect();
        assert_eq!(types, vec!["BOE", "StorageFee"]);
    }

    #[test]
    fn fallback_attaches_first_document() {
        let config = AuditConfig::default();
        let linker = EvidenceLinker::new(&config);
        let index = index();
        let docs = index.documents_for("HVDC-ADOPT-SCT-0107");
        let refs = linker.link(&draft("CONTRACT", "Handling"), docs);
        assert_eq!(refs.len(), 1);
        // lists are type-sorted, so BOE comes first
        assert_eq!(refs[0].doc_type, "BOE");
    }

    #[test]
    fn fallback_can_be_switched_off() {
        let config = AuditConfig::default().with_evidence_policy(EvidencePolicy {
            enabled: true,
            first_document_fallback: false,
        });
        let linker = EvidenceLinker::new(&config);
        let index = index();
        let docs = index.documents_for("HVDC-ADOPT-SCT-0107");
        assert!(linker.link(&draft("CONTRACT", "Handling"), docs).is_empty());
    }

    #[test]
    fn no_documents_no_evidence() {
        let config = AuditConfig::default();
        let linker = EvidenceLinker::new(&config);
        assert!(linker.link(&draft("BOE", "DO fee"), &[]).is_empty());
    }

    #[test]
    fn keyword_derivation_is_case_insensitive() {
        assert_eq!(description_keywords("airport port fees"), vec!["PORT", "AIRPORT"]);
        assert!(description_keywords("Handling").is_empty());
    }
}
