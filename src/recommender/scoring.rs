use super::ScoreBreakdown;
use crate::config::RecommenderConfig;
use crate::index::IndexedFlow;
use crate::matcher::CandidateSet;
use crate::signals::{MatchKind, SignalSet, TokenSet};
use std::collections::BTreeSet;

/// Per-signal overlap between the query and one flow signature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubScore {
    pub score: f64,
    /// Expected tokens that were found, with how they were found.
    pub matched: Vec<(String, MatchKind)>,
    pub expected: usize,
}

/// A flow together with its scores for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowScore<'a> {
    pub flow: &'a IndexedFlow,
    pub breakdown: ScoreBreakdown,
    pub actions: SubScore,
    pub entities: SubScore,
    pub keywords: SubScore,
}

impl FlowScore<'_> {
    pub fn flow_id(&self) -> &str {
        self.flow.id()
    }
}

/// Scores flows against one signal set.
pub(crate) struct Scorer<'s> {
    signals: &'s SignalSet,
    config: &'s RecommenderConfig,
    /// Unresolved query tokens, prepared once for fuzzy keyword lookups.
    raw_keywords: CandidateSet,
    keyword_threshold: f64,
}

impl<'s> Scorer<'s> {
    pub(crate) fn new(
        signals: &'s SignalSet,
        config: &'s RecommenderConfig,
        keyword_threshold: f64,
    ) -> Self {
        Self {
            signals,
            config,
            raw_keywords: CandidateSet::new(signals.raw_keywords()),
            keyword_threshold,
        }
    }

    pub(crate) fn score<'f>(&self, flow: &'f IndexedFlow) -> FlowScore<'f> {
        let signature = &flow.signature;
        let actions = self.overlap(&self.signals.actions, &signature.expected_actions);
        let entities = self.overlap(&self.signals.entities, &signature.expected_entities);
        let keywords = self.keyword_overlap(&signature.keywords);

        let overall = self
            .config
            .weights
            .combine(entities.score, actions.score, keywords.score);

        FlowScore {
            flow,
            breakdown: ScoreBreakdown {
                overall,
                action: actions.score,
                entity: entities.score,
                keywords: keywords.score,
            },
            actions,
            entities,
            keywords,
        }
    }

    fn hit_weight(&self, kind: MatchKind) -> f64 {
        match kind {
            MatchKind::Fuzzy => self.config.fuzzy_hit_weight,
            MatchKind::Exact | MatchKind::Raw => 1.0,
        }
    }

    /// Weighted `|found ∩ expected| / max(1, |expected|)`.
    fn overlap(&self, found: &TokenSet, expected: &BTreeSet<String>) -> SubScore {
        let mut weight = 0.0;
        let mut matched = Vec::new();
        for token in expected {
            if let Some(&kind) = found.get(token) {
                weight += self.hit_weight(kind);
                matched.push((token.clone(), kind));
            }
        }
        SubScore {
            score: ratio(weight, expected.len()),
            matched,
            expected: expected.len(),
        }
    }

    /// Like `overlap`, but a flow keyword with no exact hit may still be matched
    /// fuzzily by an unresolved query token; that counts as a fuzzy hit.
    ///
    /// Each raw query token backs at most one flow keyword. Exact hits claim
    /// their token first, then the remaining keywords take the closest unclaimed
    /// token in keyword order.
    fn keyword_overlap(&self, expected: &BTreeSet<String>) -> SubScore {
        let mut hits: Vec<Option<MatchKind>> = Vec::with_capacity(expected.len());
        let mut claimed = BTreeSet::new();
        for keyword in expected {
            let kind = self.signals.keywords.get(keyword).copied();
            if kind.is_some() {
                claimed.extend(self.raw_keywords.position(keyword));
            }
            hits.push(kind);
        }

        for (keyword, hit) in expected.iter().zip(hits.iter_mut()) {
            if hit.is_some() {
                continue;
            }
            let fuzzy = self
                .raw_keywords
                .best_match_where(keyword, self.keyword_threshold, |i| !claimed.contains(&i))
                .ok()
                .flatten();
            if let Some(found) = fuzzy {
                claimed.insert(found.index);
                *hit = Some(MatchKind::Fuzzy);
            }
        }

        let mut weight = 0.0;
        let mut matched = Vec::new();
        for (keyword, hit) in expected.iter().zip(hits) {
            if let Some(kind) = hit {
                weight += self.hit_weight(kind);
                matched.push((keyword.clone(), kind));
            }
        }
        SubScore {
            score: ratio(weight, expected.len()),
            matched,
            expected: expected.len(),
        }
    }
}

fn ratio(weight: f64, expected: usize) -> f64 {
    (weight / expected.max(1) as f64).clamp(0.0, 1.0)
}
