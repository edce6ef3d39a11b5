use crate::lexicon::Lexicon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod tokenizer;

use tokenizer::{is_numeric, normalize, tokenize};

/// Tokens shorter than this never take the fuzzy path; short words are too ambiguous.
const MIN_FUZZY_TOKEN_LEN: usize = 3;

/// How a token entered a signal set. Ordered by strength: `Exact < Fuzzy < Raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    /// Direct word or alias hit.
    Exact,
    /// Typo-tolerant hit through the approximate matcher.
    Fuzzy,
    /// Not resolved at all; kept verbatim for the keyword signal only.
    Raw,
}

/// Canonical token -> how it was matched. Ordered so serialization is stable.
pub type TokenSet = BTreeMap<String, MatchKind>;

/// The evidence extracted from one piece of free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSet {
    pub actions: TokenSet,
    pub entities: TokenSet,
    pub keywords: TokenSet,
}

impl SignalSet {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.entities.is_empty() && self.keywords.is_empty()
    }

    pub fn insert_action(&mut self, token: impl Into<String>, kind: MatchKind) {
        record(&mut self.actions, token.into(), kind);
    }

    pub fn insert_entity(&mut self, token: impl Into<String>, kind: MatchKind) {
        record(&mut self.entities, token.into(), kind);
    }

    pub fn insert_keyword(&mut self, token: impl Into<String>, kind: MatchKind) {
        record(&mut self.keywords, token.into(), kind);
    }

    /// Keywords that were never resolved against the lexicon.
    pub fn raw_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter(|(_, kind)| **kind == MatchKind::Raw)
            .map(|(token, _)| token.as_str())
    }
}

/// When a token is seen more than once, the strongest match kind is kept.
fn record(set: &mut TokenSet, token: String, kind: MatchKind) {
    set.entry(token)
        .and_modify(|existing| *existing = (*existing).min(kind))
        .or_insert(kind);
}

/// Pulls action, entity and keyword signals out of free text.
pub struct SignalExtractor<'a> {
    lexicon: &'a Lexicon,
    fuzzy: bool,
}

impl<'a> SignalExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            fuzzy: true,
        }
    }

    /// Disables the typo-tolerant fallback; unresolved tokens become raw keywords directly.
    pub fn without_fuzzy(mut self) -> Self {
        self.fuzzy = false;
        self
    }

    pub fn extract(&self, text: &str) -> SignalSet {
        let tokens = tokenize(text);
        let mut signals = SignalSet::default();
        let max_window = self.lexicon.max_phrase_words().max(1);

        let mut i = 0;
        while i < tokens.len() {
            // Longer phrases take precedence over their individual words.
            if let Some((canonical, width)) = self.match_phrase(&tokens[i..], max_window) {
                self.record_hit(&mut signals, &canonical, MatchKind::Exact);
                i += width;
                continue;
            }

            let token = &tokens[i];
            i += 1;
            if self.lexicon.is_stop_word(token) || is_numeric(token) {
                continue;
            }
            if let Some(canonical) = self.lexicon.resolve(token) {
                self.record_hit(&mut signals, canonical, MatchKind::Exact);
                continue;
            }
            if self.fuzzy && token.chars().count() >= MIN_FUZZY_TOKEN_LEN {
                if let Some(hit) = self.lexicon.fuzzy_resolve(token) {
                    tracing::trace!(token = %token, canonical = %hit.canonical, score = hit.score, "fuzzy token hit");
                    self.record_hit(&mut signals, hit.canonical, MatchKind::Fuzzy);
                    continue;
                }
            }
            signals.insert_keyword(token.clone(), MatchKind::Raw);
        }

        signals
    }

    /// Tries the widest window first, down to two tokens.
    fn match_phrase(&self, tokens: &[String], max_window: usize) -> Option<(String, usize)> {
        let widest = max_window.min(tokens.len());
        (2..=widest).rev().find_map(|width| {
            let phrase = tokens[..width].join(" ");
            self.lexicon
                .resolve(&phrase)
                .map(|canonical| (canonical.to_string(), width))
        })
    }

    fn record_hit(&self, signals: &mut SignalSet, canonical: &str, kind: MatchKind) {
        if self.lexicon.is_action(canonical) {
            signals.insert_action(canonical, kind);
        }
        if self.lexicon.is_entity(canonical) {
            signals.insert_entity(canonical, kind);
        }
        signals.insert_keyword(canonical, kind);
    }
}

/// Extracts signals from `text` with typo tolerance enabled.
pub fn extract(text: &str, lexicon: &Lexicon) -> SignalSet {
    SignalExtractor::new(lexicon).extract(text)
}

/// Normalizes a catalog keyword phrase into keyword tokens, resolving words the lexicon knows.
pub(crate) fn keyword_tokens(phrase: &str, lexicon: &Lexicon) -> Vec<String> {
    let normalized = normalize(phrase);
    if let Some(canonical) = lexicon.resolve(&normalized) {
        return vec![canonical.to_string()];
    }
    SignalExtractor::new(lexicon)
        .without_fuzzy()
        .extract(&normalized)
        .keywords
        .into_keys()
        .collect()
}
