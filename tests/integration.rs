//! Integration tests for flowmatch
//!
//! End-to-end tests over the engine facade: snapshots, reloads, index build
//! reports and operation lookup.
//!
mod common;
use common::*;
use flowmatch::error::{CatalogIntegrityError, RuleParseError};
use flowmatch::prelude::*;
use std::sync::Arc;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_index_is_built_once_under_concurrent_first_access() {
        let engine = create_erp_engine();
        let snapshot = engine.snapshot();
        assert!(!snapshot.is_index_built());

        let indexes: Vec<Arc<FlowIndex>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| Arc::clone(snapshot.index())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(snapshot.is_index_built());
        for index in &indexes {
            assert!(Arc::ptr_eq(index, &indexes[0]));
        }
        assert_eq!(indexes[0].len(), 4);
    }

    #[test]
    fn test_eager_index_is_built_on_load() {
        let engine = Engine::builder(create_erp_catalog())
            .with_eager_index(true)
            .build()
            .unwrap();
        assert!(engine.snapshot().is_index_built());
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let engine = Arc::new(create_erp_engine());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.recommend_flow("export the PO").unwrap())
            })
            .collect();
        let results: Vec<Recommendation> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for result in &results {
            assert_eq!(result, &results[0]);
        }
    }

    #[test]
    fn test_reload_swaps_catalog_and_keeps_old_snapshot_usable() {
        let engine = create_erp_engine();
        let old = engine.snapshot();
        assert_eq!(old.generation(), 0);

        let replacement = KnowledgeCatalog {
            action_words: strings(&["export"]),
            entity_words: strings(&["customer"]),
            flows: vec![FlowDefinition {
                expected_actions: Some(strings(&["export"])),
                expected_entities: Some(strings(&["customer"])),
                ..FlowDefinition::new("export_customer_flow")
            }],
            ..KnowledgeCatalog::default()
        };
        let generation = engine.reload(replacement);
        assert_eq!(generation, 1);
        assert_eq!(engine.snapshot().generation(), 1);

        let fresh = engine.recommend_flow("export customer").unwrap();
        assert_eq!(fresh.flow_id, "export_customer_flow");

        // The caller holding the previous snapshot still sees the previous catalog.
        let stale = old
            .recommend("export the PO", &RecommenderConfig::default())
            .unwrap();
        assert_eq!(stale.flow_id, "export_po_flow");
        assert!(old.index().contains("export_vendor_flow"));
        assert!(!engine.snapshot().index().contains("export_vendor_flow"));
    }

    #[test]
    fn test_generations_increase_across_reloads() {
        let engine = create_erp_engine();
        let first = engine.reload(create_erp_catalog());
        let second = engine.reload(create_erp_catalog());
        assert!(second > first);
        assert_eq!(engine.snapshot().generation(), second);
    }

    #[test]
    fn test_flows_with_unknown_tokens_are_excluded() {
        let mut catalog = create_erp_catalog();
        catalog.flows.push(FlowDefinition {
            expected_actions: Some(strings(&["export"])),
            expected_entities: Some(strings(&["spaceship"])),
            ..FlowDefinition::new("export_spaceship_flow")
        });
        let engine = Engine::new(catalog);
        let snapshot = engine.snapshot();
        let index = snapshot.index();

        assert_eq!(index.len(), 4);
        assert!(!index.contains("export_spaceship_flow"));
        assert_eq!(
            index.report().excluded,
            vec![(
                "export_spaceship_flow".to_string(),
                CatalogIntegrityError::UnknownToken {
                    flow_id: "export_spaceship_flow".to_string(),
                    kind: "entity",
                    token: "spaceship".to_string(),
                }
            )]
        );

        let recommendation = engine.recommend_flow("export a spaceship").unwrap();
        assert_ne!(recommendation.flow_id, "export_spaceship_flow");
    }

    #[test]
    fn test_invalid_rules_and_duplicates_are_excluded() {
        let mut catalog = create_erp_catalog();
        catalog.flows.push(FlowDefinition {
            validation_rules: strings(&["VendorID required"]),
            ..FlowDefinition::new("broken_rules_flow")
        });
        catalog.flows.push(FlowDefinition::new("export_vendor_flow"));
        catalog.flows.push(FlowDefinition::new("  "));

        let snapshot = Engine::new(catalog).snapshot();
        let report = snapshot.index().report();

        assert_eq!(report.excluded.len(), 3);
        assert_eq!(
            report.excluded[0].1,
            CatalogIntegrityError::InvalidRule {
                flow_id: "broken_rules_flow".to_string(),
                source: RuleParseError::MissingSeparator {
                    rule: "VendorID required".to_string(),
                },
            }
        );
        assert_eq!(
            report.excluded[1].1,
            CatalogIntegrityError::DuplicateFlow("export_vendor_flow".to_string())
        );
        assert_eq!(report.excluded[2].1, CatalogIntegrityError::EmptyFlowId);

        // The first declaration survives intact.
        let rules = snapshot.index().rules("export_vendor_flow").unwrap();
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_operation_conflicts_keep_first_owner() {
        let mut catalog = create_erp_catalog();
        catalog.flows.push(FlowDefinition {
            expected_actions: Some(strings(&["update"])),
            expected_entities: Some(strings(&["vendor"])),
            used_by_operations: strings(&["exportVendor", "updateVendor"]),
            ..FlowDefinition::new("update_vendor_flow")
        });
        let snapshot = Engine::new(catalog).snapshot();
        let index = snapshot.index();

        assert_eq!(index.flow_for_operation("exportVendor"), Some("export_vendor_flow"));
        assert_eq!(index.flow_for_operation("updateVendor"), Some("update_vendor_flow"));
        let conflicts = &index.report().conflicts;
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].operation, "exportVendor");
        assert_eq!(conflicts[0].kept_flow, "export_vendor_flow");
        assert_eq!(conflicts[0].rejected_flow, "update_vendor_flow");
        // The flow itself still lists the operation it declared.
        assert!(index.operations("update_vendor_flow").unwrap().contains(&"exportVendor".to_string()));
    }

    #[test]
    fn test_resolve_operation_tolerates_typos() {
        let engine = create_erp_engine();

        let (operation, flow, score) = engine.resolve_operation("exportVendor").unwrap();
        assert_eq!((operation.as_str(), flow.as_str(), score), ("exportVendor", "export_vendor_flow", 1.0));

        let (operation, flow, score) = engine.resolve_operation("exportVendr").unwrap();
        assert_eq!(operation, "exportVendor");
        assert_eq!(flow, "export_vendor_flow");
        assert!(score < 1.0 && score >= 0.7);

        assert_eq!(engine.resolve_operation("deleteEverything"), None);
    }

    #[test]
    fn test_lexicon_issues_reach_the_build_report() {
        let mut catalog = create_erp_catalog();
        catalog
            .aliases
            .insert("ghost".to_string(), "phantom".to_string());
        let snapshot = Engine::new(catalog).snapshot();
        let report = snapshot.index().report();

        assert!(!report.is_clean());
        assert_eq!(
            report.lexicon_issues,
            vec![CatalogIntegrityError::UnresolvedAlias {
                alias: "ghost".to_string(),
                target: "phantom".to_string(),
            }]
        );
    }

    #[test]
    fn test_clean_catalog_has_clean_report() {
        let snapshot = create_erp_engine().snapshot();
        assert!(snapshot.index().report().is_clean());
    }

    #[test]
    fn test_derived_signature_without_overrides() {
        let catalog = KnowledgeCatalog {
            action_words: strings(&["export"]),
            entity_words: strings(&["vendor"]),
            stop_words: strings(&["to", "the"]),
            flows: vec![FlowDefinition {
                name: Some("Vendor export".to_string()),
                description: Some("Export the vendor record to Acumatica".to_string()),
                ..FlowDefinition::new("vendor_sync")
            }],
            ..KnowledgeCatalog::default()
        };
        let snapshot = Engine::new(catalog).snapshot();
        let signature = snapshot.index().signature("vendor_sync").unwrap();

        assert!(signature.expected_actions.contains("export"));
        assert!(signature.expected_entities.contains("vendor"));
        assert!(signature.keywords.contains("acumatica"));
        assert!(signature.keywords.contains("sync"));
        assert!(!signature.keywords.contains("vendor"));
    }

    #[test]
    fn test_config_is_validated_on_build() {
        let negative = Engine::builder(create_erp_catalog())
            .with_weights(SignalWeights {
                entity: -0.1,
                action: 0.5,
                keyword: 0.5,
            })
            .build();
        assert!(matches!(
            negative,
            Err(ConfigError::InvalidWeight { name: "entity", .. })
        ));

        let zero = Engine::builder(create_erp_catalog())
            .with_weights(SignalWeights {
                entity: 0.0,
                action: 0.0,
                keyword: 0.0,
            })
            .build();
        assert!(matches!(zero, Err(ConfigError::ZeroWeights)));

        let fuzzy = Engine::builder(create_erp_catalog())
            .with_fuzzy_hit_weight(1.5)
            .build();
        assert!(matches!(fuzzy, Err(ConfigError::InvalidFuzzyWeight(_))));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "recommender": { "maxAlternatives": 5 } }"#).unwrap();
        assert_eq!(config.recommender.max_alternatives, 5);
        assert_eq!(config.recommender.weights, SignalWeights::default());
        assert_eq!(config.recommender.fuzzy_hit_weight, 0.9);
        assert!(!config.eager_index);
    }

    #[test]
    fn test_recommend_then_validate_round() {
        let catalog: KnowledgeCatalog = serde_json::from_str(ERP_CATALOG_JSON).unwrap();
        let engine = Engine::new(catalog);

        let recommendation = engine.recommend_flow("export supplier to acumatica").unwrap();
        assert_eq!(recommendation.operations, strings(&["exportVendor"]));

        let result = engine
            .validate_request(&recommendation.flow_id, &payload(&[("VendorID", "V-9")]), true)
            .unwrap();
        assert!(result.is_valid);
    }
}
