//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowmatch crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowmatch::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let catalog_json = std::fs::read_to_string("path/to/catalog.json")?;
//! let catalog: KnowledgeCatalog = serde_json::from_str(&catalog_json)?;
//!
//! let engine = Engine::new(catalog);
//! let recommendation = engine.recommend_flow("export vendor to acumatica")?;
//! println!("Recommendation: {:?}", recommendation);
//! # Ok(())
//! # }
//! ```

// Engine facade and configuration
pub use crate::config::{EngineConfig, RecommenderConfig, SignalWeights};
pub use crate::engine::{Engine, EngineBuilder, Snapshot};

// Catalog model
pub use crate::catalog::{FlowDefinition, IntoCatalog, KnowledgeCatalog};

// Core components
pub use crate::index::{FieldRule, FieldType, FlowIndex, FlowSignature, IndexBuilder};
pub use crate::lexicon::{Lexicon, ThresholdKind, Thresholds};
pub use crate::matcher::{CandidateSet, FuzzyMatch};
pub use crate::recommender::{Alternative, Recommendation, Recommender, ScoreBreakdown};
pub use crate::signals::{MatchKind, SignalExtractor, SignalSet};
pub use crate::validator::{FieldError, RequestValidator, ValidationResult};

// Error types
pub use crate::error::{CatalogIntegrityError, ConfigError, EngineError, InvalidInput};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
