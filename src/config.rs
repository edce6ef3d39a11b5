use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Weights used to merge the three sub-scores into one confidence value.
///
/// The defaults (entity 0.45, action 0.35, keyword 0.20) put the most weight on
/// entities, since an entity mismatch almost always means the wrong flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignalWeights {
    pub entity: f64,
    pub action: f64,
    pub keyword: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            entity: 0.45,
            action: 0.35,
            keyword: 0.20,
        }
    }
}

impl SignalWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("entity", self.entity),
            ("action", self.action),
            ("keyword", self.keyword),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        if self.entity + self.action + self.keyword <= 0.0 {
            return Err(ConfigError::ZeroWeights);
        }
        Ok(())
    }

    /// Weighted sum clamped to `[0, 1]`. Monotonic in each argument.
    pub fn combine(&self, entity: f64, action: f64, keyword: f64) -> f64 {
        (self.entity * entity + self.action * action + self.keyword * keyword).clamp(0.0, 1.0)
    }
}

/// Recommender tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommenderConfig {
    pub weights: SignalWeights,
    /// How many ranked alternatives follow the top recommendation.
    pub max_alternatives: usize,
    /// How much a fuzzy (typo-tolerant) hit counts compared with an exact hit.
    pub fuzzy_hit_weight: f64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            weights: SignalWeights::default(),
            max_alternatives: 3,
            fuzzy_hit_weight: 0.9,
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.fuzzy_hit_weight) {
            return Err(ConfigError::InvalidFuzzyWeight(self.fuzzy_hit_weight));
        }
        Ok(())
    }
}

/// Top-level engine configuration. Similarity thresholds are not part of it;
/// they travel with the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub recommender: RecommenderConfig,
    /// Build the flow index on load instead of on first use.
    pub eager_index: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recommender.validate()
    }
}
