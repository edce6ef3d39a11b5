use crate::error::CatalogIntegrityError;
use crate::matcher::CandidateSet;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeSet;

mod builder;
pub mod rules;

pub use builder::IndexBuilder;
pub use rules::{FieldRule, FieldType};

/// The signals a flow expects to see in a use-case description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSignature {
    pub flow_id: String,
    pub expected_actions: BTreeSet<String>,
    pub expected_entities: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
}

/// Everything the index knows about one accepted flow.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFlow {
    pub signature: FlowSignature,
    /// Member operations in catalog order.
    pub operations: Vec<String>,
    pub rules: Vec<FieldRule>,
    /// Catalog display name, carried onto recommendations.
    pub name: Option<String>,
}

impl IndexedFlow {
    pub fn id(&self) -> &str {
        &self.signature.flow_id
    }
}

/// An operation declared by more than one flow. The first flow keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConflict {
    pub operation: String,
    pub kept_flow: String,
    pub rejected_flow: String,
}

/// What happened while the index was built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Flows left out of the index, in catalog order, with the reason.
    pub excluded: Vec<(String, CatalogIntegrityError)>,
    pub conflicts: Vec<OperationConflict>,
    /// Lexicon problems carried over from the snapshot's lexicon.
    pub lexicon_issues: Vec<CatalogIntegrityError>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.excluded.is_empty() && self.conflicts.is_empty() && self.lexicon_issues.is_empty()
    }
}

/// Read-only lookup structure over the accepted flows of one catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct FlowIndex {
    /// Sorted by flow id.
    flows: Vec<IndexedFlow>,
    positions: AHashMap<String, usize>,
    operation_to_flow: AHashMap<String, String>,
    /// Operation names in registration order, for fuzzy lookup.
    operations: CandidateSet,
    report: BuildReport,
}

impl FlowIndex {
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Accepted flows, ordered by flow id.
    pub fn flows(&self) -> impl Iterator<Item = &IndexedFlow> {
        self.flows.iter()
    }

    pub fn flow(&self, flow_id: &str) -> Option<&IndexedFlow> {
        self.positions.get(flow_id).map(|&i| &self.flows[i])
    }

    pub fn contains(&self, flow_id: &str) -> bool {
        self.positions.contains_key(flow_id)
    }

    pub fn signature(&self, flow_id: &str) -> Option<&FlowSignature> {
        self.flow(flow_id).map(|f| &f.signature)
    }

    pub fn operations(&self, flow_id: &str) -> Option<&[String]> {
        self.flow(flow_id).map(|f| f.operations.as_slice())
    }

    pub fn rules(&self, flow_id: &str) -> Option<&[FieldRule]> {
        self.flow(flow_id).map(|f| f.rules.as_slice())
    }

    /// The flow that owns `operation`, by exact name.
    pub fn flow_for_operation(&self, operation: &str) -> Option<&str> {
        self.operation_to_flow.get(operation).map(String::as_str)
    }

    /// Exact operation lookup, falling back to the closest operation name that
    /// clears `threshold`. Returns `(operation, flow_id, score)`.
    pub fn resolve_operation(&self, query: &str, threshold: f64) -> Option<(&str, &str, f64)> {
        if let Some(flow) = self.flow_for_operation(query) {
            let operation = self.operations.iter().find(|op| *op == query)?;
            return Some((operation, flow, 1.0));
        }
        let found = self.operations.best_match(query, threshold).ok()??;
        let flow = self.flow_for_operation(found.candidate)?;
        Some((found.candidate, flow, found.score))
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}
