use super::{Engine, Snapshot};
use crate::catalog::KnowledgeCatalog;
use crate::config::{EngineConfig, SignalWeights};
use crate::error::ConfigError;

pub struct EngineBuilder {
    catalog: KnowledgeCatalog,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(catalog: KnowledgeCatalog) -> Self {
        Self {
            catalog,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_weights(mut self, weights: SignalWeights) -> Self {
        self.config.recommender.weights = weights;
        self
    }

    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.config.recommender.max_alternatives = max_alternatives;
        self
    }

    pub fn with_fuzzy_hit_weight(mut self, weight: f64) -> Self {
        self.config.recommender.fuzzy_hit_weight = weight;
        self
    }

    pub fn with_eager_index(mut self, eager: bool) -> Self {
        self.config.eager_index = eager;
        self
    }

    pub fn build(self) -> Result<Engine, ConfigError> {
        self.config.validate()?;
        let snapshot = Snapshot::load(self.catalog, 0, self.config.eager_index);
        Ok(Engine::from_parts(self.config, snapshot))
    }
}
