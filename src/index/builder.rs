use super::{BuildReport, FieldRule, FlowIndex, FlowSignature, IndexedFlow, OperationConflict};
use crate::catalog::{FlowDefinition, KnowledgeCatalog};
use crate::error::CatalogIntegrityError;
use crate::lexicon::Lexicon;
use crate::matcher::CandidateSet;
use crate::signals::{MatchKind, SignalExtractor, SignalSet, TokenSet, keyword_tokens};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

/// Builds a `FlowIndex` from a catalog and the lexicon of the same snapshot.
///
/// A flow that fails integrity checks is excluded and recorded in the build
/// report; it never stops the other flows from being indexed.
pub struct IndexBuilder<'a> {
    catalog: &'a KnowledgeCatalog,
    lexicon: &'a Lexicon,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(catalog: &'a KnowledgeCatalog, lexicon: &'a Lexicon) -> Self {
        Self { catalog, lexicon }
    }

    pub fn build(self) -> FlowIndex {
        let mut report = BuildReport {
            lexicon_issues: self.lexicon.issues().to_vec(),
            ..BuildReport::default()
        };
        let mut seen_ids: AHashSet<&str> = AHashSet::new();
        let mut flows = Vec::new();
        let mut operation_to_flow: AHashMap<String, String> = AHashMap::new();
        let mut operation_names = Vec::new();

        for definition in &self.catalog.flows {
            let flow_id = definition.id.trim();
            let indexed = if flow_id.is_empty() {
                Err(CatalogIntegrityError::EmptyFlowId)
            } else if !seen_ids.insert(flow_id) {
                Err(CatalogIntegrityError::DuplicateFlow(flow_id.to_string()))
            } else {
                self.index_flow(flow_id, definition)
            };

            let flow = match indexed {
                Ok(flow) => flow,
                Err(error) => {
                    tracing::warn!(flow = %flow_id, error = %error, "excluding flow from index");
                    report.excluded.push((flow_id.to_string(), error));
                    continue;
                }
            };

            for operation in &flow.operations {
                match operation_to_flow.get(operation) {
                    Some(owner) if owner != flow.id() => {
                        tracing::warn!(
                            operation = %operation,
                            kept = %owner,
                            rejected = %flow.id(),
                            "operation declared by more than one flow"
                        );
                        report.conflicts.push(OperationConflict {
                            operation: operation.clone(),
                            kept_flow: owner.clone(),
                            rejected_flow: flow.id().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        operation_to_flow.insert(operation.clone(), flow.id().to_string());
                        operation_names.push(operation.clone());
                    }
                }
            }
            flows.push(flow);
        }

        flows.sort_by(|a, b| a.id().cmp(b.id()));
        let positions = flows
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id().to_string(), i))
            .collect();

        tracing::debug!(
            flows = flows.len(),
            excluded = report.excluded.len(),
            conflicts = report.conflicts.len(),
            operations = operation_names.len(),
            "flow index built"
        );

        FlowIndex {
            flows,
            positions,
            operation_to_flow,
            operations: CandidateSet::new(operation_names),
            report,
        }
    }

    fn index_flow(
        &self,
        flow_id: &str,
        definition: &FlowDefinition,
    ) -> Result<IndexedFlow, CatalogIntegrityError> {
        let rules = definition
            .validation_rules
            .iter()
            .map(|text| FieldRule::parse(text))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CatalogIntegrityError::InvalidRule {
                flow_id: flow_id.to_string(),
                source,
            })?;

        let signature = self.build_signature(flow_id, definition)?;

        let mut operations: Vec<String> = Vec::new();
        for operation in &definition.used_by_operations {
            let operation = operation.trim();
            if !operation.is_empty() && !operations.iter().any(|o| o == operation) {
                operations.push(operation.to_string());
            }
        }

        Ok(IndexedFlow {
            signature,
            operations,
            rules,
            name: definition.name.clone(),
        })
    }

    fn build_signature(
        &self,
        flow_id: &str,
        definition: &FlowDefinition,
    ) -> Result<FlowSignature, CatalogIntegrityError> {
        // Only derived when at least one list is not overridden.
        let needs_derivation = definition.keywords.is_none()
            || definition.expected_actions.is_none()
            || definition.expected_entities.is_none();
        let derived: Option<SignalSet> = needs_derivation.then(|| {
            SignalExtractor::new(self.lexicon)
                .without_fuzzy()
                .extract(&definition.descriptive_text())
        });

        let expected_actions = match &definition.expected_actions {
            Some(tokens) => self.canonicalize(flow_id, "action", tokens)?,
            None => derived_keys(derived.as_ref().map(|s| &s.actions), false),
        };
        let expected_entities = match &definition.expected_entities {
            Some(tokens) => self.canonicalize(flow_id, "entity", tokens)?,
            None => derived_keys(derived.as_ref().map(|s| &s.entities), false),
        };
        let keywords = match &definition.keywords {
            Some(phrases) => phrases
                .iter()
                .flat_map(|p| keyword_tokens(p, self.lexicon))
                .collect(),
            None => derived_keys(derived.as_ref().map(|s| &s.keywords), true),
        };

        Ok(FlowSignature {
            flow_id: flow_id.to_string(),
            expected_actions,
            expected_entities,
            keywords,
        })
    }

    /// Maps declared signature tokens onto lexicon words; an unknown token excludes the flow.
    fn canonicalize(
        &self,
        flow_id: &str,
        kind: &'static str,
        tokens: &[String],
    ) -> Result<BTreeSet<String>, CatalogIntegrityError> {
        tokens
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|token| {
                self.lexicon
                    .canonical(token)
                    .map(str::to_string)
                    .ok_or_else(|| CatalogIntegrityError::UnknownToken {
                        flow_id: flow_id.to_string(),
                        kind,
                        token: token.clone(),
                    })
            })
            .collect()
    }
}

fn derived_keys(set: Option<&TokenSet>, raw_only: bool) -> BTreeSet<String> {
    set.into_iter()
        .flatten()
        .filter(|(_, kind)| !raw_only || **kind == MatchKind::Raw)
        .map(|(token, _)| token.clone())
        .collect()
}
