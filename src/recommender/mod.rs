use crate::config::RecommenderConfig;
use crate::error::EngineError;
use crate::index::FlowIndex;
use crate::lexicon::{ThresholdKind, Thresholds};
use crate::signals::SignalSet;
use serde::{Deserialize, Serialize};

mod reasoning;
mod scoring;

pub use reasoning::ReasonFormatter;
pub use scoring::{FlowScore, SubScore};

use scoring::Scorer;

/// Per-signal scores for one flow, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub overall: f64,
    pub action: f64,
    pub entity: f64,
    pub keywords: f64,
}

/// A ranked runner-up to the recommended flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub flow_id: String,
    pub confidence: f64,
    pub reason: String,
    pub scores: ScoreBreakdown,
}

/// The outcome of a recommendation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub flow_id: String,
    /// Display name of the recommended flow, when the catalog gives one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_name: Option<String>,
    pub confidence: f64,
    /// Set when `confidence` is below the flow-match threshold. The flow is still
    /// the best effort; the caller should ask for a narrower description.
    pub low_confidence: bool,
    pub reasoning: String,
    pub alternatives: Vec<Alternative>,
    pub scores: ScoreBreakdown,
    /// Member operations of the recommended flow, in catalog order.
    pub operations: Vec<String>,
}

/// Scores every flow in an index against a signal set and picks the best one.
///
/// Recommending is a pure function of `(signals, index, config)`: no state is kept
/// between calls, so a caller can re-run it with a refined query after a
/// low-confidence result.
pub struct Recommender<'a> {
    index: &'a FlowIndex,
    config: RecommenderConfig,
    flow_match_threshold: f64,
    keyword_match_threshold: f64,
}

impl<'a> Recommender<'a> {
    pub fn new(index: &'a FlowIndex, config: RecommenderConfig) -> Self {
        Self::with_thresholds(index, config, &Thresholds::default())
    }

    pub fn with_thresholds(
        index: &'a FlowIndex,
        config: RecommenderConfig,
        thresholds: &Thresholds,
    ) -> Self {
        Self {
            index,
            config,
            flow_match_threshold: thresholds.get(ThresholdKind::FlowMatch),
            keyword_match_threshold: thresholds.get(ThresholdKind::KeywordMatch),
        }
    }

    /// All flows ranked best first.
    ///
    /// Order: higher `overall`, then higher raw entity score, then the
    /// lexicographically smaller flow id.
    pub fn rank(&self, signals: &SignalSet) -> Vec<FlowScore<'a>> {
        let scorer = Scorer::new(signals, &self.config, self.keyword_match_threshold);
        let mut ranked: Vec<FlowScore<'a>> =
            self.index.flows().map(|flow| scorer.score(flow)).collect();
        ranked.sort_by(|a, b| {
            b.breakdown
                .overall
                .total_cmp(&a.breakdown.overall)
                .then_with(|| b.breakdown.entity.total_cmp(&a.breakdown.entity))
                .then_with(|| a.flow_id().cmp(b.flow_id()))
        });
        ranked
    }

    pub fn recommend(&self, signals: &SignalSet) -> Result<Recommendation, EngineError> {
        let ranked = self.rank(signals);
        let (top, rest) = ranked.split_first().ok_or(EngineError::EmptyIndex)?;

        let confidence = top.breakdown.overall;
        let low_confidence = confidence < self.flow_match_threshold;
        let mut reasoning = ReasonFormatter::format(top);
        if low_confidence {
            reasoning.push_str(&format!(
                "; low confidence: {:.2} is below the flow-match threshold {:.2}",
                confidence, self.flow_match_threshold
            ));
        }

        let alternatives = rest
            .iter()
            .take(self.config.max_alternatives)
            .map(|s| Alternative {
                flow_id: s.flow_id().to_string(),
                confidence: s.breakdown.overall,
                reason: ReasonFormatter::format(s),
                scores: s.breakdown,
            })
            .collect();

        tracing::trace!(
            flow = %top.flow_id(),
            confidence,
            low_confidence,
            candidates = ranked.len(),
            "flow ranked first"
        );

        Ok(Recommendation {
            flow_id: top.flow_id().to_string(),
            flow_name: top.flow.name.clone(),
            confidence,
            low_confidence,
            reasoning,
            alternatives,
            scores: top.breakdown,
            operations: top.flow.operations.clone(),
        })
    }
}
