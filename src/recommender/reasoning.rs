use super::scoring::{FlowScore, SubScore};
use crate::signals::MatchKind;
use itertools::Itertools;

/// Formats flow scores into compact, machine-built reasoning strings.
pub struct ReasonFormatter;

impl ReasonFormatter {
    /// e.g. `entities: purchase_order (1/1); actions: export (1/1); keywords: none (0/2)`.
    ///
    /// Fuzzy hits carry a `~` suffix.
    pub fn format(score: &FlowScore<'_>) -> String {
        if score.entities.matched.is_empty()
            && score.actions.matched.is_empty()
            && score.keywords.matched.is_empty()
        {
            return format!("no signals matched flow '{}'", score.flow_id());
        }
        [
            Self::format_signal("entities", &score.entities),
            Self::format_signal("actions", &score.actions),
            Self::format_signal("keywords", &score.keywords),
        ]
        .join("; ")
    }

    fn format_signal(label: &str, sub: &SubScore) -> String {
        let tokens = if sub.matched.is_empty() {
            "none".to_string()
        } else {
            sub.matched
                .iter()
                .map(|(token, kind)| match kind {
                    MatchKind::Fuzzy => format!("{}~", token),
                    MatchKind::Exact | MatchKind::Raw => token.clone(),
                })
                .join(", ")
        };
        format!("{}: {} ({}/{})", label, tokens, sub.matched.len(), sub.expected)
    }
}
