pub mod fields;
pub mod layout;

use scraper::Html;

use crate::record::JobRecord;
use layout::CompiledLayout;

/// Parse one detail page and pull out its job record.
pub fn parse_job_page(html: &str, layout: &CompiledLayout) -> JobRecord {
    let doc = Html::parse_document(html);
    fields::extract(&doc, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::layout::ExtractionLayout;
    use crate::testing::fixture;

    fn parse(name: &str) -> JobRecord {
        let layout = ExtractionLayout::default().compile().unwrap();
        parse_job_page(&fixture(name), &layout)
    }

    #[test]
    fn full_detail_page() {
        let record = parse("jobad_045.html");
        assert_eq!(
            record.title.as_deref(),
            Some("Softwareentwickler Fahrzeugdiagnose (m/w/d)")
        );
        assert_eq!(record.code.as_deref(), Some("Job Nr. 045"));
        assert_eq!(record.entry_type.as_deref(), Some("Berufserfahrene"));
        assert_eq!(record.location.as_deref(), Some("Weissach"));
        assert_eq!(record.company.as_deref(), Some("Example Engineering GmbH"));
        assert_eq!(record.derived_code().unwrap(), "45");
    }

    #[test]
    fn list_order_follows_the_page() {
        let record = parse("jobad_045.html");
        assert_eq!(
            record.tasks,
            vec![
                "Entwicklung von Diagnosefunktionen",
                "Abstimmung mit Steuergeräte-Lieferanten",
                "Absicherung im Fahrzeug",
            ]
        );
        assert_eq!(
            record.requirements,
            vec!["Studium der Informatik", "Erfahrung mit CAN und UDS"]
        );
    }

    #[test]
    fn lists_outside_anchor_regions_are_ignored() {
        let record = parse("jobad_045.html");
        assert!(!record.tasks.iter().any(|t| t.contains("Benefit")));
        assert!(!record.requirements.iter().any(|t| t.contains("Benefit")));
    }

    #[test]
    fn sparse_page_yields_absent_fields() {
        let record = parse("jobad_sparse.html");
        assert_eq!(record.title.as_deref(), Some("Initiativbewerbung"));
        assert_eq!(record.code.as_deref(), Some("ohne Kennziffer"));
        assert_eq!(record.location, None);
        assert!(record.tasks.is_empty());
        assert!(record.requirements.is_empty());
        assert!(record.derived_code().is_err());
    }
}
