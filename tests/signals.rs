//! Tests for tokenization, the lexicon, and signal extraction.
mod common;
use common::*;
use flowmatch::error::CatalogIntegrityError;
use flowmatch::prelude::*;
use flowmatch::signals::{self, tokenizer};
use proptest::prelude::*;

#[test]
fn test_tokenize_splits_and_lowercases() {
    assert_eq!(
        tokenizer::tokenize("Export the Purchase-Order, NOW!"),
        strings(&["export", "the", "purchase", "order", "now"])
    );
    assert_eq!(tokenizer::normalize("purchase_order"), "purchase order");
    assert!(tokenizer::tokenize("  ,;!  ").is_empty());
}

#[test]
fn test_scenario_signals() {
    let lexicon = create_erp_lexicon();
    let signals = signals::extract("export the PO to acumatica", &lexicon);

    assert_eq!(signals.actions.get("export"), Some(&MatchKind::Exact));
    assert_eq!(signals.entities.get("purchase_order"), Some(&MatchKind::Exact));
    assert_eq!(signals.keywords.get("acumatica"), Some(&MatchKind::Raw));
    // Stop words never become keywords.
    assert!(!signals.keywords.contains_key("the"));
    assert!(!signals.keywords.contains_key("to"));
}

#[test]
fn test_extraction_is_idempotent() {
    let lexicon = create_erp_lexicon();
    let text = "Send the supplier bills into the ERP";
    let first = signals::extract(text, &lexicon);
    let second = signals::extract(text, &lexicon);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_punctuation_and_case_do_not_matter() {
    let lexicon = create_erp_lexicon();
    let plain = signals::extract("export the po", &lexicon);
    let noisy = signals::extract("EXPORT, the P.O!!!", &lexicon);
    assert_eq!(plain.actions, noisy.actions);
    assert_eq!(plain.entities.get("purchase_order"), Some(&MatchKind::Exact));

    // "P.O" splits into "p" and "o", which are not the alias.
    assert!(!noisy.entities.contains_key("purchase_order"));
}

#[test]
fn test_multi_word_entity_matches_as_phrase() {
    let lexicon = create_erp_lexicon();
    for text in ["export a purchase order", "export a Purchase-Order", "export purchase_order"] {
        let signals = signals::extract(text, &lexicon);
        assert_eq!(
            signals.entities.get("purchase_order"),
            Some(&MatchKind::Exact),
            "text: {}",
            text
        );
        assert!(!signals.keywords.contains_key("purchase"), "text: {}", text);
        assert!(!signals.keywords.contains_key("order"), "text: {}", text);
    }
}

#[test]
fn test_typos_resolve_fuzzily() {
    let lexicon = create_erp_lexicon();
    let signals = signals::extract("exprt vendr", &lexicon);
    assert_eq!(signals.actions.get("export"), Some(&MatchKind::Fuzzy));
    assert_eq!(signals.entities.get("vendor"), Some(&MatchKind::Fuzzy));
}

#[test]
fn test_run_together_phrase_resolves_fuzzily() {
    let lexicon = create_erp_lexicon();
    for text in ["export the purchaseorder", "export the purchaseordr"] {
        let signals = signals::extract(text, &lexicon);
        assert_eq!(signals.entities.get("purchase_order"), Some(&MatchKind::Fuzzy), "{text}");
        assert_eq!(signals.raw_keywords().count(), 0, "{text}");
    }

    let signals = SignalExtractor::new(&lexicon)
        .without_fuzzy()
        .extract("export the purchaseorder");
    assert_eq!(signals.keywords.get("purchaseorder"), Some(&MatchKind::Raw));
}

#[test]
fn test_fuzzy_can_be_disabled() {
    let lexicon = create_erp_lexicon();
    let signals = SignalExtractor::new(&lexicon).without_fuzzy().extract("exprt vendr");
    assert!(signals.actions.is_empty());
    assert!(signals.entities.is_empty());
    assert_eq!(signals.keywords.get("exprt"), Some(&MatchKind::Raw));
}

#[test]
fn test_short_tokens_are_not_corrected() {
    let lexicon = create_erp_lexicon();
    // "pq" is one edit from the alias "po" but too short for the fuzzy path.
    let signals = signals::extract("pq", &lexicon);
    assert!(signals.entities.is_empty());
    assert_eq!(signals.keywords.get("pq"), Some(&MatchKind::Raw));
}

#[test]
fn test_exact_hit_wins_over_fuzzy_repeat() {
    let lexicon = create_erp_lexicon();
    let signals = signals::extract("vendr vendor", &lexicon);
    assert_eq!(signals.entities.get("vendor"), Some(&MatchKind::Exact));
}

#[test]
fn test_numbers_and_stop_words_only_give_empty_signals() {
    let lexicon = create_erp_lexicon();
    assert!(signals::extract("the 42 of 2024", &lexicon).is_empty());
    assert!(signals::extract("", &lexicon).is_empty());
}

#[test]
fn test_aliases_and_synonyms_resolve() {
    let lexicon = create_erp_lexicon();
    let signals = signals::extract("push supplier bill", &lexicon);
    assert_eq!(signals.actions.get("export"), Some(&MatchKind::Exact));
    assert_eq!(signals.entities.get("vendor"), Some(&MatchKind::Exact));
    assert_eq!(signals.entities.get("invoice"), Some(&MatchKind::Exact));
}

#[test]
fn test_vocabulary_word_shadows_alias() {
    let lexicon = Lexicon::builder()
        .entity_words(["vendor", "invoice"])
        .alias("vendor", "invoice")
        .build();
    assert_eq!(lexicon.resolve("vendor"), Some("vendor"));
    assert!(lexicon.aliases().is_empty());
}

#[test]
fn test_explicit_alias_wins_over_synonym_group() {
    let lexicon = Lexicon::builder()
        .action_words(["export", "import"])
        .alias("send", "import")
        .synonym_groups([vec!["export", "send"]])
        .build();
    assert_eq!(lexicon.resolve("send"), Some("import"));
}

#[test]
fn test_alias_chains_resolve_to_canonical_word() {
    let lexicon = Lexicon::builder()
        .entity_words(["vendor"])
        .alias("supplier", "vendor")
        .alias("provider", "supplier")
        .build();
    assert_eq!(lexicon.resolve("provider"), Some("vendor"));
    assert!(lexicon.issues().is_empty());
}

#[test]
fn test_broken_aliases_are_reported() {
    let lexicon = Lexicon::builder()
        .entity_words(["vendor"])
        .alias("ghost", "nothing")
        .alias("ping", "pong")
        .alias("pong", "ping")
        .build();

    assert_eq!(lexicon.resolve("ghost"), None);
    assert_eq!(lexicon.resolve("ping"), None);
    assert!(lexicon.issues().contains(&CatalogIntegrityError::UnresolvedAlias {
        alias: "ghost".to_string(),
        target: "nothing".to_string(),
    }));
    assert!(lexicon.issues().contains(&CatalogIntegrityError::AliasCycle {
        alias: "ping".to_string(),
    }));
    assert!(lexicon.issues().contains(&CatalogIntegrityError::AliasCycle {
        alias: "pong".to_string(),
    }));
}

#[test]
fn test_canonical_ignores_aliases() {
    let lexicon = create_erp_lexicon();
    assert_eq!(lexicon.canonical("Purchase Order"), Some("purchase_order"));
    assert_eq!(lexicon.canonical("po"), None);
    assert_eq!(lexicon.max_phrase_words(), 2);
}

const SINGLE_WORD_TOKENS: [&str; 6] = ["export", "vendor", "bill", "exprt", "acumatica", "the"];

proptest! {
    #[test]
    fn token_order_does_not_change_signals(
        tokens in proptest::sample::subsequence(SINGLE_WORD_TOKENS.to_vec(), 1..=SINGLE_WORD_TOKENS.len())
            .prop_shuffle()
    ) {
        let lexicon = create_erp_lexicon();
        let mut sorted = tokens.clone();
        sorted.sort_unstable();
        prop_assert_eq!(
            signals::extract(&tokens.join(" "), &lexicon),
            signals::extract(&sorted.join(" "), &lexicon)
        );
    }
}
