use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The matcher use-cases that carry their own similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdKind {
    General,
    TypoTolerance,
    OperationMatch,
    ErrorMatch,
    FlowMatch,
    KeywordMatch,
}

impl ThresholdKind {
    pub const ALL: [ThresholdKind; 6] = [
        ThresholdKind::General,
        ThresholdKind::TypoTolerance,
        ThresholdKind::OperationMatch,
        ThresholdKind::ErrorMatch,
        ThresholdKind::FlowMatch,
        ThresholdKind::KeywordMatch,
    ];

    /// Parses a catalog key. Case, `-`, `_` and spaces are ignored, so
    /// `"typo-tolerance"`, `"typoTolerance"` and `"TYPO_TOLERANCE"` are the same kind.
    pub fn from_key(key: &str) -> Option<Self> {
        let folded: String = key
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "general" => Some(Self::General),
            "typotolerance" | "typo" => Some(Self::TypoTolerance),
            "operationmatch" | "operation" => Some(Self::OperationMatch),
            "errormatch" | "error" => Some(Self::ErrorMatch),
            "flowmatch" | "flow" => Some(Self::FlowMatch),
            "keywordmatch" | "keyword" => Some(Self::KeywordMatch),
            _ => None,
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            Self::General => 0.70,
            Self::TypoTolerance => 0.70,
            Self::OperationMatch => 0.70,
            Self::ErrorMatch => 0.60,
            Self::FlowMatch => 0.60,
            Self::KeywordMatch => 0.80,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::General => "general",
            Self::TypoTolerance => "typo-tolerance",
            Self::OperationMatch => "operation-match",
            Self::ErrorMatch => "error-match",
            Self::FlowMatch => "flow-match",
            Self::KeywordMatch => "keyword-match",
        };
        f.write_str(name)
    }
}

/// Similarity thresholds per matcher kind, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    values: [f64; 6],
}

impl Default for Thresholds {
    fn default() -> Self {
        let mut values = [0.0; 6];
        for kind in ThresholdKind::ALL {
            values[kind.slot()] = kind.default_value();
        }
        Self { values }
    }
}

impl Thresholds {
    /// Builds thresholds from a catalog table, falling back to defaults for missing kinds.
    /// Unknown keys and non-finite values are skipped; out-of-range values are clamped.
    pub fn from_table(table: &BTreeMap<String, f64>) -> Self {
        let mut thresholds = Self::default();
        for (key, &value) in table {
            let Some(kind) = ThresholdKind::from_key(key) else {
                tracing::warn!(key = %key, "ignoring unknown threshold kind");
                continue;
            };
            if !value.is_finite() {
                tracing::warn!(kind = %kind, value, "ignoring non-finite threshold");
                continue;
            }
            thresholds.set(kind, value);
        }
        thresholds
    }

    pub fn get(&self, kind: ThresholdKind) -> f64 {
        self.values[kind.slot()]
    }

    pub fn set(&mut self, kind: ThresholdKind, value: f64) {
        if value.is_nan() {
            tracing::warn!(kind = %kind, "ignoring NaN threshold");
            return;
        }
        let clamped = value.clamp(0.0, 1.0);
        if clamped != value {
            tracing::warn!(kind = %kind, value, clamped, "threshold clamped into [0, 1]");
        }
        self.values[kind.slot()] = clamped;
    }

    pub fn with(mut self, kind: ThresholdKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThresholdKind, f64)> + '_ {
        ThresholdKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}
