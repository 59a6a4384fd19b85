use vitalgen_core::{CatalogDocument, Domain, FieldCatalog, catalog_document_schema};

const CATALOG_JSON: &str = r#"{
  "fields": [
    { "name": "patient-name", "domain": { "type": "choice", "values": ["Ada Byron", "Alan Turing"] } },
    { "name": "DoB", "domain": { "type": "date_range", "min": "01-01-1900", "max": "31-12-2010" } },
    { "name": "height", "domain": { "type": "float_range", "min": 1.5, "max": 2.5, "scale": 2 } },
    { "name": "heart-rate", "domain": { "type": "int_range", "min": 50, "max": 180 } }
  ]
}"#;

#[test]
fn json_document_builds_catalog() {
    let document: CatalogDocument = serde_json::from_str(CATALOG_JSON).expect("parse catalog");
    let catalog = FieldCatalog::from_document(document.clone()).expect("valid catalog");

    assert_eq!(catalog.len(), 4);
    assert!(matches!(
        catalog.domain_of("heart-rate"),
        Ok(Domain::IntRange { min: 50, max: 180 })
    ));
    assert_eq!(catalog.to_document(), document);
}

#[test]
fn json_schema_describes_domain_variants() {
    let schema = serde_json::to_value(catalog_document_schema()).expect("serialize schema");
    let rendered = schema.to_string();

    assert_eq!(
        schema.get("title").and_then(|value| value.as_str()),
        Some("CatalogDocument")
    );
    for variant in ["choice", "int_range", "float_range", "date_range"] {
        assert!(rendered.contains(variant), "schema misses {variant}");
    }
}
