//! Common test utilities for building knowledge catalogs.
use flowmatch::prelude::*;
use std::collections::BTreeMap;

#[allow(dead_code)]
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A small ERP catalog with four flows.
///
/// - `export_po_flow`: export + purchase_order, keywords erp/acumatica
/// - `export_vendor_flow`: export + vendor, keyword acumatica
/// - `import_invoice_flow`: import + invoice
/// - `void_invoice_flow`: void + invoice
#[allow(dead_code)]
pub fn create_erp_catalog() -> KnowledgeCatalog {
    KnowledgeCatalog {
        action_words: strings(&["export", "import", "void", "create", "update"]),
        entity_words: strings(&[
            "vendor",
            "purchase_order",
            "invoice",
            "customer",
            "sales_order",
        ]),
        aliases: BTreeMap::from([
            ("po".to_string(), "purchase_order".to_string()),
            ("supplier".to_string(), "vendor".to_string()),
            ("bill".to_string(), "invoice".to_string()),
        ]),
        synonyms: vec![strings(&["export", "send", "push"])],
        stop_words: strings(&[
            "the", "a", "an", "to", "of", "for", "into", "from", "and", "in",
        ]),
        flows: vec![
            FlowDefinition {
                name: Some("Export purchase orders".to_string()),
                expected_actions: Some(strings(&["export"])),
                expected_entities: Some(strings(&["purchase_order"])),
                keywords: Some(strings(&["erp", "acumatica"])),
                used_by_operations: strings(&["exportPurchaseOrder", "getPurchaseOrder"]),
                validation_rules: strings(&["OrderNbr: required; max 15", "Description: optional; max 60"]),
                ..FlowDefinition::new("export_po_flow")
            },
            FlowDefinition {
                name: Some("Export vendors".to_string()),
                expected_actions: Some(strings(&["export"])),
                expected_entities: Some(strings(&["vendor"])),
                keywords: Some(strings(&["acumatica"])),
                used_by_operations: strings(&["exportVendor"]),
                validation_rules: strings(&[
                    "VendorID: required; max 30",
                    "VendorName: optional; max 60",
                    "CreditLimit: optional; number",
                ]),
                ..FlowDefinition::new("export_vendor_flow")
            },
            FlowDefinition {
                expected_actions: Some(strings(&["import"])),
                expected_entities: Some(strings(&["invoice"])),
                keywords: Some(Vec::new()),
                used_by_operations: strings(&["importInvoice"]),
                validation_rules: strings(&["InvoiceNbr: required", "Amount: required; number"]),
                ..FlowDefinition::new("import_invoice_flow")
            },
            FlowDefinition {
                expected_actions: Some(strings(&["void"])),
                expected_entities: Some(strings(&["invoice"])),
                keywords: Some(Vec::new()),
                used_by_operations: strings(&["voidInvoice"]),
                ..FlowDefinition::new("void_invoice_flow")
            },
        ],
        ..KnowledgeCatalog::default()
    }
}

/// A lexicon over the vocabulary of [`create_erp_catalog`].
#[allow(dead_code)]
pub fn create_erp_lexicon() -> Lexicon {
    Lexicon::from_catalog(&create_erp_catalog())
}

#[allow(dead_code)]
pub fn create_erp_engine() -> Engine {
    Engine::new(create_erp_catalog())
}

#[allow(dead_code)]
pub fn payload(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The same catalog shape in its JSON form, with catalog-level thresholds.
#[allow(dead_code)]
pub const ERP_CATALOG_JSON: &str = r#"
{
  "actionWords": ["export", "import"],
  "entityWords": ["vendor", "invoice"],
  "aliases": { "supplier": "vendor" },
  "stopWords": ["the", "a", "to"],
  "thresholds": { "flowMatch": 0.9, "typo-tolerance": 0.75 },
  "flows": [
    {
      "id": "export_vendor_flow",
      "name": "Export vendors",
      "usedByOperations": ["exportVendor"],
      "validationRules": ["VendorID: required; max 30"],
      "expectedActions": ["export"],
      "expectedEntities": ["vendor"],
      "keywords": ["acumatica"]
    },
    {
      "id": "import_invoice_flow",
      "usedByOperations": ["importInvoice"],
      "expectedActions": ["import"],
      "expectedEntities": ["invoice"]
    }
  ]
}
"#;
