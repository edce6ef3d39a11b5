//! # flowmatch - Flow Recommendation and Request Validation Engine
//!
//! **flowmatch** picks, for a free-text description of an integration task, the
//! best-matching flow out of a knowledge catalog, and validates request payloads
//! against that flow's field rules. Everything is deterministic per catalog
//! snapshot: the same text against the same catalog always yields the same
//! recommendation, down to the serialized bytes.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Catalog**: Parse your catalog format into your own structs and
//!     implement `IntoCatalog` to produce a `KnowledgeCatalog`, or deserialize a
//!     `KnowledgeCatalog` directly with serde.
//! 2.  **Build an Engine**: `Engine::builder(catalog)` validates the configuration
//!     and prepares the lexicon. The flow index is built lazily on first use.
//! 3.  **Recommend**: `recommend_flow` extracts action, entity and keyword signals
//!     from the text, scores every flow, and returns the winner with ranked
//!     alternatives. A result below the flow-match threshold is flagged
//!     `low_confidence` instead of being presented as certain.
//! 4.  **Validate**: `validate_request` checks a payload against the flow's field
//!     rules and, on request, proposes a payload with placeholders for the
//!     missing required fields.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowmatch::prelude::*;
//! use std::collections::BTreeMap;
//!
//! fn main() -> Result<()> {
//!     let catalog = KnowledgeCatalog {
//!         action_words: vec!["export".to_string(), "import".to_string()],
//!         entity_words: vec!["vendor".to_string(), "purchase_order".to_string()],
//!         aliases: BTreeMap::from([("po".to_string(), "purchase_order".to_string())]),
//!         flows: vec![
//!             FlowDefinition {
//!                 expected_actions: Some(vec!["export".to_string()]),
//!                 expected_entities: Some(vec!["purchase_order".to_string()]),
//!                 used_by_operations: vec!["exportPurchaseOrder".to_string()],
//!                 validation_rules: vec!["OrderNbr: required; max 15".to_string()],
//!                 ..FlowDefinition::new("export_po_flow")
//!             },
//!             FlowDefinition {
//!                 expected_actions: Some(vec!["import".to_string()]),
//!                 expected_entities: Some(vec!["vendor".to_string()]),
//!                 ..FlowDefinition::new("import_vendor_flow")
//!             },
//!         ],
//!         ..KnowledgeCatalog::default()
//!     };
//!
//!     let engine = Engine::builder(catalog).with_max_alternatives(2).build()?;
//!
//!     let recommendation = engine.recommend_flow("export the PO to the ERP")?;
//!     println!("-> Flow: {} ({:.2})", recommendation.flow_id, recommendation.confidence);
//!     println!("-> Reason: {}", recommendation.reasoning);
//!
//!     let payload = BTreeMap::new();
//!     let result = engine.validate_request(&recommendation.flow_id, &payload, true)?;
//!     assert!(!result.is_valid);
//!     println!("-> Suggested: {}", result.suggested_payload.unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod lexicon;
pub mod matcher;
pub mod prelude;
pub mod recommender;
pub mod signals;
pub mod validator;
