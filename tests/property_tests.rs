//! Property checks for schema translation and conversation persistence.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Value, json};
use tether::{AgentConfig, AgentLoop, ConversationStore, PrimitiveKind, translate};
use tether_testing::{MockCapability, ScriptedModel, StaticRegistry};

fn declared_kind() -> impl Strategy<Value = (&'static str, PrimitiveKind)> {
    prop_oneof![
        Just(("string", PrimitiveKind::String)),
        Just(("number", PrimitiveKind::Number)),
        Just(("boolean", PrimitiveKind::Boolean)),
        Just(("array", PrimitiveKind::Array)),
        Just(("integer", PrimitiveKind::Unknown)),
        Just(("object", PrimitiveKind::Unknown)),
    ]
}

fn sample_for(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::String => json!("text"),
        PrimitiveKind::Number => json!(1.5),
        PrimitiveKind::Boolean => json!(true),
        PrimitiveKind::Array => json!([1, "two"]),
        PrimitiveKind::Unknown => json!({ "nested": null }),
    }
}

proptest! {
    #[test]
    fn translated_fields_match_declaration(
        fields in prop::collection::btree_map("[a-z]{1,8}", (declared_kind(), any::<bool>()), 0..6)
    ) {
        let properties: serde_json::Map<String, Value> = fields
            .iter()
            .map(|(name, ((declared, _), _))| (name.clone(), json!({ "type": declared })))
            .collect();
        let required: Vec<&String> = fields
            .iter()
            .filter(|(_, (_, required))| *required)
            .map(|(name, _)| name)
            .collect();
        let spec = translate(&json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }));

        prop_assert_eq!(spec.fields().len(), fields.len());
        for (name, ((_, kind), required)) in &fields {
            let field = spec.field(name).unwrap();
            prop_assert_eq!(field.kind, *kind);
            prop_assert_eq!(field.required, *required);
        }

        let complete: serde_json::Map<String, Value> = fields
            .iter()
            .map(|(name, ((_, kind), _))| (name.clone(), sample_for(*kind)))
            .collect();
        let accepted = spec.validate(&Value::Object(complete.clone())).unwrap();
        prop_assert_eq!(accepted, complete);
    }

    #[test]
    fn missing_required_fields_are_rejected(name in "[a-z]{1,8}", (declared, _) in declared_kind()) {
        let spec = translate(&json!({
            "type": "object",
            "properties": { name.clone(): { "type": declared } },
            "required": [name.clone()],
        }));

        let err = spec.validate(&json!({})).unwrap_err();
        prop_assert!(err.mentions(&name));
    }

    #[test]
    fn undeclared_arguments_are_dropped(extra in "[A-Z]{1,8}") {
        let spec = translate(&json!({
            "type": "object",
            "properties": { "category": { "type": "string" } },
        }));

        let accepted = spec
            .validate(&json!({ "category": "food", extra.clone(): 1 }))
            .unwrap();
        prop_assert!(accepted.get(&extra).is_none());
        prop_assert_eq!(accepted.len(), 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn each_turn_appends_two_messages(inputs in prop::collection::vec("[a-z ]{1,20}", 1..5)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let turns = inputs.len();

        let persisted = tokio_test::block_on(async {
            let model = ScriptedModel::always(tether::ModelResponse::text("ok"));
            let registry = StaticRegistry::new([MockCapability::new("list_expenses", "List all expenses")]);
            let mut agent = AgentLoop::new(
                Arc::new(model),
                Box::new(registry),
                ConversationStore::new(&path),
                AgentConfig::default(),
            );
            agent.initialize().await.unwrap();
            for input in &inputs {
                agent.chat(input).await.unwrap();
            }
            agent.shutdown().await;

            let mut store = ConversationStore::new(&path);
            store.load().await.messages.len()
        });

        prop_assert_eq!(persisted, 2 * turns);
    }
}
