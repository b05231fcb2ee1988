pub mod list_schemas;
pub mod match_schema;

use serde::de::DeserializeOwned;

use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::store::SchemaStore;

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub fn dispatch(req: &JsonRpcRequest, store: &SchemaStore) -> Option<JsonRpcResponse> {
    req.id.as_ref()?;

    let response = match req.method.as_str() {
        "ping" => JsonRpcResponse::success(req.id.clone(), serde_json::json!({})),

        "schemas/list" => JsonRpcResponse::success(req.id.clone(), list_schemas::handle(store)),

        "schemas/match" => match parse_params(req).and_then(|p| match_schema::handle(p, store)) {
            Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
            Err(err) => JsonRpcResponse::error(req.id.clone(), err),
        },

        _ => JsonRpcResponse::error(req.id.clone(), JsonRpcError::method_not_found(&req.method)),
    };

    Some(response)
}

fn parse_params<T: DeserializeOwned>(req: &JsonRpcRequest) -> Result<T, JsonRpcError> {
    match &req.params {
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            JsonRpcError::invalid_params(format!("Invalid {} params: {e}", req.method))
        }),
        None => Err(JsonRpcError::invalid_params(format!(
            "Missing params for {}",
            req.method
        ))),
    }
}
