//! Approximate string matching.
//!
//! The dominant call pattern is one query against many stored candidates, so
//! candidates are prepared once into a [`CandidateSet`]: each candidate's
//! characters are decoded up front and the candidates are bucketed by length.
//! A query only visits the buckets whose length could still reach the
//! threshold, and the distance computation itself stops early once the
//! threshold is out of reach. Neither shortcut changes the result compared
//! with scoring every candidate.
//!
//! Matching is case-sensitive. Callers normalize both sides.

use crate::error::InvalidInput;
use std::collections::BTreeMap;

pub mod distance;

pub use distance::{bounded_levenshtein, levenshtein, similarity_from_distance};

/// Slack applied to float bounds so pruning only ever widens the search.
const BOUND_EPSILON: f64 = 1e-9;

/// The best candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub candidate: &'a str,
    /// Position of the candidate in the original input order.
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone)]
struct Candidate {
    text: String,
    chars: Vec<char>,
}

/// Candidates prepared for repeated `best_match` queries.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: Vec<Candidate>,
    /// Character length -> entry indices, ascending.
    buckets: BTreeMap<usize, Vec<usize>>,
}

impl CandidateSet {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut buckets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (index, candidate) in candidates.into_iter().enumerate() {
            let text = candidate.into();
            let chars: Vec<char> = text.chars().collect();
            buckets.entry(chars.len()).or_default().push(index);
            entries.push(Candidate { text, chars });
        }
        Self { entries, buckets }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|c| c.text.as_str())
    }

    /// Input position of the first candidate equal to `text`.
    pub fn position(&self, text: &str) -> Option<usize> {
        self.entries.iter().position(|c| c.text == text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.text.as_str())
    }

    /// Finds the highest-scoring candidate whose similarity to `query` is at least `threshold`.
    ///
    /// Ties on score go to the candidate that came first in input order. An empty
    /// candidate set yields `Ok(None)`; an empty query is a contract violation.
    pub fn best_match(
        &self,
        query: &str,
        threshold: f64,
    ) -> Result<Option<FuzzyMatch<'_>>, InvalidInput> {
        self.best_match_where(query, threshold, |_| true)
    }

    /// `best_match` restricted to the candidates whose index passes `accept`.
    pub fn best_match_where<F>(
        &self,
        query: &str,
        threshold: f64,
        accept: F,
    ) -> Result<Option<FuzzyMatch<'_>>, InvalidInput>
    where
        F: Fn(usize) -> bool,
    {
        if query.is_empty() {
            return Err(InvalidInput::EmptyMatchQuery);
        }
        if self.entries.is_empty() {
            return Ok(None);
        }

        let threshold = clamp_threshold(threshold);
        let query_chars: Vec<char> = query.chars().collect();
        let (min_len, max_len) = length_window(query_chars.len(), threshold);

        let mut best: Option<(f64, usize)> = None;
        for indices in self.buckets.range(min_len..=max_len).map(|(_, v)| v) {
            for &index in indices.iter().filter(|&&i| accept(i)) {
                let candidate = &self.entries[index];
                let Some(score) = score_within(&query_chars, &candidate.chars, threshold) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((best_score, best_index)) => {
                        score > best_score || (score == best_score && index < best_index)
                    }
                };
                if better {
                    best = Some((score, index));
                }
            }
        }

        Ok(best.map(|(score, index)| FuzzyMatch {
            candidate: self.entries[index].text.as_str(),
            index,
            score,
        }))
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// One-shot `best_match` over a plain candidate slice.
///
/// Prefer building a [`CandidateSet`] once when the same candidates are queried repeatedly.
pub fn best_match<'a, S: AsRef<str>>(
    query: &str,
    candidates: &'a [S],
    threshold: f64,
) -> Result<Option<FuzzyMatch<'a>>, InvalidInput> {
    let set = CandidateSet::new(candidates.iter().map(|c| c.as_ref()));
    let found = set.best_match(query, threshold)?;
    Ok(found.map(|m| FuzzyMatch {
        candidate: candidates[m.index].as_ref(),
        index: m.index,
        score: m.score,
    }))
}

/// Normalized edit-distance similarity between two strings, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    similarity_from_distance(levenshtein(&a, &b), a.len(), b.len())
}

fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        1.0
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

/// Candidate lengths that can still reach `threshold` against a query of `query_len` characters.
///
/// A candidate of length `n` needs `|m - n| <= (1 - t) * max(m, n)`, which gives
/// `t * m <= n <= m / t`.
fn length_window(query_len: usize, threshold: f64) -> (usize, usize) {
    let m = query_len as f64;
    let min_len = (threshold * m - BOUND_EPSILON).floor().max(0.0) as usize;
    let max_len = if threshold <= 0.0 {
        usize::MAX
    } else {
        // Float-to-int casts saturate, so a tiny threshold cannot overflow here.
        (m / threshold + BOUND_EPSILON).ceil() as usize
    };
    (min_len, max_len)
}

fn score_within(query: &[char], candidate: &[char], threshold: f64) -> Option<f64> {
    if query == candidate {
        return Some(1.0);
    }
    let max_len = query.len().max(candidate.len());
    let bound = ((1.0 - threshold) * max_len as f64 + BOUND_EPSILON).floor() as usize;
    let distance = bounded_levenshtein(query, candidate, bound)?;
    let score = similarity_from_distance(distance, query.len(), candidate.len());
    (score >= threshold).then_some(score)
}
