use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete, canonical knowledge catalog the engine is built from.
/// This is the target structure for any custom catalog format conversion.
///
/// The catalog is read-only for the engine. Reloading means building a new
/// catalog and handing it to `Engine::reload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeCatalog {
    pub flows: Vec<FlowDefinition>,
    /// Canonical action tokens, e.g. `export`, `import`, `void`.
    pub action_words: Vec<String>,
    /// Canonical entity tokens, e.g. `vendor`, `purchase_order`.
    pub entity_words: Vec<String>,
    /// Flat surface-form to canonical-token table, e.g. `"po" -> "purchase_order"`.
    pub aliases: BTreeMap<String, String>,
    /// Synonym groups. The first entry of each group is its canonical token.
    pub synonyms: Vec<Vec<String>>,
    pub stop_words: Vec<String>,
    /// Per-matcher similarity thresholds keyed by kind name (`"typo-tolerance"`, `"flowMatch"`, ...).
    pub thresholds: BTreeMap<String, f64>,
}

/// Defines a single flow: one integration use-case with its operations and field rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowDefinition {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub used_by_operations: Vec<String>,
    /// Textual field rules in the form `"{field}: {required|optional}; max {N}"`.
    pub validation_rules: Vec<String>,
    pub keywords: Option<Vec<String>>,
    pub expected_actions: Option<Vec<String>>,
    pub expected_entities: Option<Vec<String>>,
    pub constants: BTreeMap<String, serde_json::Value>,
}

impl FlowDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// The text a signature is derived from when the flow declares no override lists.
    pub(crate) fn descriptive_text(&self) -> String {
        [Some(self.id.as_str()), self.name.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
