//! Domain vocabulary: canonical action and entity tokens, the alias table that maps
//! surface forms onto them, stop words, and the per-matcher thresholds.
//!
//! A `Lexicon` is built once per catalog load and never mutated afterwards.

use crate::catalog::KnowledgeCatalog;
use crate::error::CatalogIntegrityError;
use crate::matcher::CandidateSet;
use crate::signals::tokenizer::normalize;
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};

mod threshold;

pub use threshold::{ThresholdKind, Thresholds};

/// Longest alias chain followed before the alias is treated as a cycle.
const MAX_ALIAS_DEPTH: usize = 8;

/// A canonical token found by exact or fuzzy lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconHit<'a> {
    pub canonical: &'a str,
    /// 1.0 for exact hits.
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    action_words: BTreeSet<String>,
    entity_words: BTreeSet<String>,
    /// Normalized alias surface form -> resolved canonical token.
    aliases: BTreeMap<String, String>,
    /// Normalized vocabulary word -> canonical token.
    vocabulary: AHashMap<String, String>,
    /// Every exact lookup key: vocabulary words and resolved aliases.
    lookup: AHashMap<String, String>,
    stop_words: AHashSet<String>,
    thresholds: Thresholds,
    fuzzy_candidates: CandidateSet,
    /// Canonical token for each entry of `fuzzy_candidates`, same order.
    fuzzy_targets: Vec<String>,
    max_phrase_words: usize,
    issues: Vec<CatalogIntegrityError>,
}

impl Lexicon {
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::default()
    }

    pub fn from_catalog(catalog: &KnowledgeCatalog) -> Self {
        Self::builder()
            .action_words(catalog.action_words.iter().cloned())
            .entity_words(catalog.entity_words.iter().cloned())
            .aliases(catalog.aliases.iter().map(|(k, v)| (k.clone(), v.clone())))
            .synonym_groups(catalog.synonyms.iter().cloned())
            .stop_words(catalog.stop_words.iter().cloned())
            .thresholds(Thresholds::from_table(&catalog.thresholds))
            .build()
    }

    pub fn action_words(&self) -> &BTreeSet<String> {
        &self.action_words
    }

    pub fn entity_words(&self) -> &BTreeSet<String> {
        &self.entity_words
    }

    /// Resolved alias table: normalized surface form -> canonical token.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn is_action(&self, canonical: &str) -> bool {
        self.action_words.contains(canonical)
    }

    pub fn is_entity(&self, canonical: &str) -> bool {
        self.entity_words.contains(canonical)
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Maps a surface form onto a vocabulary word, without consulting aliases.
    pub fn canonical(&self, surface: &str) -> Option<&str> {
        self.vocabulary.get(&normalize(surface)).map(String::as_str)
    }

    /// Exact lookup of an already-normalized surface form against words and aliases.
    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        self.lookup.get(normalized).map(String::as_str)
    }

    /// Typo-tolerant lookup of a single normalized token.
    pub fn fuzzy_resolve(&self, token: &str) -> Option<LexiconHit<'_>> {
        let threshold = self.threshold(ThresholdKind::TypoTolerance);
        // Tokens are never empty here; an empty query simply finds nothing.
        let found = self.fuzzy_candidates.best_match(token, threshold).ok()??;
        Some(LexiconHit {
            canonical: self.fuzzy_targets[found.index].as_str(),
            score: found.score,
        })
    }

    pub fn threshold(&self, kind: ThresholdKind) -> f64 {
        self.thresholds.get(kind)
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Number of words in the longest multi-word lookup key.
    pub fn max_phrase_words(&self) -> usize {
        self.max_phrase_words
    }

    /// Integrity problems found while building, e.g. aliases that never resolve.
    pub fn issues(&self) -> &[CatalogIntegrityError] {
        &self.issues
    }
}

/// Collects vocabulary for a [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct LexiconBuilder {
    action_words: Vec<String>,
    entity_words: Vec<String>,
    aliases: Vec<(String, String)>,
    synonym_groups: Vec<Vec<String>>,
    stop_words: Vec<String>,
    thresholds: Thresholds,
}

impl LexiconBuilder {
    pub fn action_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn entity_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn alias(mut self, surface: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.push((surface.into(), canonical.into()));
        self
    }

    pub fn aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn synonym_groups<I, G, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonym_groups.extend(
            groups
                .into_iter()
                .map(|g| g.into_iter().map(Into::into).collect::<Vec<_>>()),
        );
        self
    }

    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn build(self) -> Lexicon {
        let mut vocabulary: AHashMap<String, String> = AHashMap::new();
        let mut action_words = BTreeSet::new();
        let mut entity_words = BTreeSet::new();
        for word in &self.action_words {
            if let Some(canonical) = register_word(&mut vocabulary, word) {
                action_words.insert(canonical);
            }
        }
        for word in &self.entity_words {
            if let Some(canonical) = register_word(&mut vocabulary, word) {
                entity_words.insert(canonical);
            }
        }

        // Explicit aliases win over synonym groups.
        let mut raw_aliases: BTreeMap<String, (String, String)> = BTreeMap::new();
        for (surface, target) in &self.aliases {
            let key = normalize(surface);
            if key.is_empty() {
                continue;
            }
            raw_aliases
                .entry(key)
                .or_insert_with(|| (normalize(target), target.clone()));
        }
        for group in &self.synonym_groups {
            let Some((head, rest)) = group.split_first() else {
                continue;
            };
            for surface in rest {
                let key = normalize(surface);
                if key.is_empty() {
                    continue;
                }
                raw_aliases
                    .entry(key)
                    .or_insert_with(|| (normalize(head), head.clone()));
            }
        }

        let mut issues = Vec::new();
        let mut aliases = BTreeMap::new();
        for key in raw_aliases.keys() {
            if vocabulary.contains_key(key) {
                tracing::debug!(alias = %key, "alias shadowed by a vocabulary word");
                continue;
            }
            match resolve_alias(key, &raw_aliases, &vocabulary) {
                Ok(canonical) => {
                    aliases.insert(key.clone(), canonical);
                }
                Err(issue) => {
                    tracing::warn!(alias = %key, error = %issue, "dropping alias");
                    issues.push(issue);
                }
            }
        }

        let mut lookup = vocabulary.clone();
        lookup.extend(aliases.iter().map(|(k, v)| (k.clone(), v.clone())));

        let max_phrase_words = lookup
            .keys()
            .map(|k| k.split(' ').count())
            .max()
            .unwrap_or(1);

        // Sorted so the fuzzy tie-break (earliest candidate) is stable across builds.
        // Phrase keys also enter with their spaces removed ("purchaseorder"),
        // unless a real single-word key already has that spelling.
        let mut single_words: BTreeMap<String, &str> = lookup
            .iter()
            .filter(|(k, _)| !k.contains(' '))
            .map(|(k, v)| (k.clone(), v.as_str()))
            .collect();
        for (key, target) in lookup.iter().filter(|(k, _)| k.contains(' ')) {
            single_words
                .entry(key.replace(' ', ""))
                .or_insert(target.as_str());
        }
        let fuzzy_candidates = CandidateSet::new(single_words.keys().cloned());
        let fuzzy_targets = single_words.values().map(|v| v.to_string()).collect();

        let stop_words = self
            .stop_words
            .iter()
            .map(|w| normalize(w))
            .filter(|w| !w.is_empty())
            .collect();

        tracing::debug!(
            actions = action_words.len(),
            entities = entity_words.len(),
            aliases = aliases.len(),
            issues = issues.len(),
            "lexicon built"
        );

        Lexicon {
            action_words,
            entity_words,
            aliases,
            vocabulary,
            lookup,
            stop_words,
            thresholds: self.thresholds,
            fuzzy_candidates,
            fuzzy_targets,
            max_phrase_words,
            issues,
        }
    }
}

/// Adds a vocabulary word and returns its canonical form. When two spellings
/// normalize to the same key, the first one registered is canonical.
fn register_word(vocabulary: &mut AHashMap<String, String>, word: &str) -> Option<String> {
    let canonical = word.trim().to_lowercase();
    let key = normalize(&canonical);
    if key.is_empty() {
        return None;
    }
    Some(vocabulary.entry(key).or_insert(canonical).clone())
}

fn resolve_alias(
    key: &str,
    raw_aliases: &BTreeMap<String, (String, String)>,
    vocabulary: &AHashMap<String, String>,
) -> Result<String, CatalogIntegrityError> {
    let (first, original_target) = &raw_aliases[key];
    let mut current = first.clone();
    let mut visited = vec![key.to_string()];

    for _ in 0..MAX_ALIAS_DEPTH {
        if let Some(canonical) = vocabulary.get(&current) {
            return Ok(canonical.clone());
        }
        if visited.contains(&current) {
            break;
        }
        match raw_aliases.get(&current) {
            Some((next, _)) => {
                visited.push(current);
                current = next.clone();
            }
            None => {
                return Err(CatalogIntegrityError::UnresolvedAlias {
                    alias: key.to_string(),
                    target: original_target.clone(),
                });
            }
        }
    }

    Err(CatalogIntegrityError::AliasCycle {
        alias: key.to_string(),
    })
}
