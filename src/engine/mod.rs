//! The engine facade: one catalog snapshot at a time, swapped wholesale on reload.
//!
//! A [`Snapshot`] bundles a catalog with its lexicon and builds its flow index
//! lazily, exactly once, on first use. Concurrent first callers wait on the same
//! build; later callers read the finished index without synchronization.
//! [`Engine::reload`] builds a fresh snapshot and swaps the shared pointer, so
//! callers still holding the previous snapshot keep a consistent view.

use crate::catalog::KnowledgeCatalog;
use crate::config::{EngineConfig, RecommenderConfig};
use crate::error::{EngineError, InvalidInput};
use crate::index::{FlowIndex, IndexBuilder};
use crate::lexicon::{Lexicon, ThresholdKind};
use crate::recommender::{Recommendation, Recommender};
use crate::signals::{SignalExtractor, SignalSet};
use crate::validator::{RequestValidator, ValidationResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

mod builder;

pub use builder::EngineBuilder;

/// One immutable catalog load.
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    catalog: KnowledgeCatalog,
    lexicon: Lexicon,
    index: OnceLock<Arc<FlowIndex>>,
}

impl Snapshot {
    pub fn new(catalog: KnowledgeCatalog) -> Self {
        Self::load(catalog, 0, false)
    }

    pub(crate) fn load(catalog: KnowledgeCatalog, generation: u64, eager_index: bool) -> Self {
        let lexicon = Lexicon::from_catalog(&catalog);
        let snapshot = Self {
            generation,
            catalog,
            lexicon,
            index: OnceLock::new(),
        };
        if eager_index {
            snapshot.index();
        }
        snapshot
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn catalog(&self) -> &KnowledgeCatalog {
        &self.catalog
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// The flow index, built on first access.
    pub fn index(&self) -> &Arc<FlowIndex> {
        self.index.get_or_init(|| {
            tracing::debug!(generation = self.generation, "building flow index");
            Arc::new(IndexBuilder::new(&self.catalog, &self.lexicon).build())
        })
    }

    pub fn is_index_built(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn extract(&self, text: &str) -> SignalSet {
        SignalExtractor::new(&self.lexicon).extract(text)
    }

    pub fn recommend(
        &self,
        use_case: &str,
        config: &RecommenderConfig,
    ) -> Result<Recommendation, EngineError> {
        if use_case.trim().is_empty() {
            return Err(InvalidInput::EmptyQuery.into());
        }
        let signals = self.extract(use_case);
        Recommender::with_thresholds(self.index(), *config, self.lexicon.thresholds())
            .recommend(&signals)
    }

    pub fn validate(
        &self,
        flow_id: &str,
        payload: &BTreeMap<String, String>,
        auto_fix: bool,
    ) -> Result<ValidationResult, EngineError> {
        RequestValidator::with_thresholds(self.index(), self.lexicon.thresholds())
            .validate(flow_id, payload, auto_fix)
    }
}

/// Thread-safe entry point. Share it behind an `Arc`.
///
/// ```rust
/// use flowmatch::prelude::*;
///
/// let catalog = KnowledgeCatalog {
///     action_words: vec!["export".into()],
///     entity_words: vec!["vendor".into()],
///     flows: vec![FlowDefinition {
///         expected_actions: Some(vec!["export".into()]),
///         expected_entities: Some(vec!["vendor".into()]),
///         validation_rules: vec!["VendorID: required; max 30".into()],
///         ..FlowDefinition::new("export_vendor_flow")
///     }],
///     ..KnowledgeCatalog::default()
/// };
///
/// let engine = Engine::new(catalog);
/// let recommendation = engine.recommend_flow("export a vendor").unwrap();
/// assert_eq!(recommendation.flow_id, "export_vendor_flow");
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    current: RwLock<Arc<Snapshot>>,
    next_generation: AtomicU64,
}

impl Engine {
    /// An engine with the default configuration.
    pub fn new(catalog: KnowledgeCatalog) -> Self {
        let config = EngineConfig::default();
        Self::from_parts(config, Snapshot::load(catalog, 0, config.eager_index))
    }

    pub fn builder(catalog: KnowledgeCatalog) -> EngineBuilder {
        EngineBuilder::new(catalog)
    }

    pub(crate) fn from_parts(config: EngineConfig, snapshot: Snapshot) -> Self {
        Self {
            config,
            next_generation: AtomicU64::new(snapshot.generation() + 1),
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current snapshot. The lock is held only to clone the pointer.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the catalog. The new snapshot is built before the swap; callers
    /// holding the old snapshot keep using it. Returns the new generation.
    pub fn reload(&self, catalog: KnowledgeCatalog) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let snapshot = Arc::new(Snapshot::load(catalog, generation, self.config.eager_index));

        let mut current = self.current.write();
        // A slower concurrent reload must not overwrite a newer catalog.
        if current.generation() < generation {
            *current = snapshot;
            tracing::debug!(generation, "catalog snapshot swapped");
        } else {
            tracing::debug!(generation, current = current.generation(), "discarding stale reload");
        }
        generation
    }

    pub fn recommend_flow(&self, use_case: &str) -> Result<Recommendation, EngineError> {
        let recommendation = self
            .snapshot()
            .recommend(use_case, &self.config.recommender)?;
        tracing::debug!(
            flow = %recommendation.flow_id,
            confidence = recommendation.confidence,
            low_confidence = recommendation.low_confidence,
            "recommended flow"
        );
        Ok(recommendation)
    }

    pub fn validate_request(
        &self,
        flow_id: &str,
        payload: &BTreeMap<String, String>,
        auto_fix: bool,
    ) -> Result<ValidationResult, EngineError> {
        let result = self.snapshot().validate(flow_id, payload, auto_fix)?;
        tracing::debug!(
            flow = %flow_id,
            valid = result.is_valid,
            errors = result.errors.len(),
            "validated request"
        );
        Ok(result)
    }

    pub fn extract_signals(&self, text: &str) -> SignalSet {
        self.snapshot().extract(text)
    }

    /// Finds the flow owning an operation, tolerating typos in the operation name.
    /// Returns `(operation, flow_id, score)`.
    pub fn resolve_operation(&self, operation: &str) -> Option<(String, String, f64)> {
        let snapshot = self.snapshot();
        let threshold = snapshot.lexicon().threshold(ThresholdKind::OperationMatch);
        snapshot
            .index()
            .resolve_operation(operation, threshold)
            .map(|(op, flow, score)| (op.to_string(), flow.to_string(), score))
    }
}
