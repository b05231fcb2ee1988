use crate::store::SchemaStore;

/// Handle `schemas/list`: every registered document name, sorted.
pub fn handle(store: &SchemaStore) -> serde_json::Value {
    serde_json::json!({ "schemas": store.names() })
}
