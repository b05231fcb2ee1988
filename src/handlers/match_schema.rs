use serde_json::Value;

use crate::protocol::{JsonRpcError, MatchSchemaParams, MatchSchemaResult, ViolationEntry};
use crate::store::SchemaStore;

/// Handle `schemas/match`.
///
/// Content mismatches are a successful response with `passed: false` and the
/// diagnostic in `message`. Unknown schemas, malformed bodies and broken
/// references are JSON-RPC errors.
pub fn handle(params: MatchSchemaParams, store: &SchemaStore) -> Result<Value, JsonRpcError> {
    let matcher = store.matcher(&params.schema).map_err(|e| JsonRpcError::from(&e))?;

    let evaluated = match (&params.body, &params.body_text) {
        (Some(body), None) => matcher.evaluate_value(body),
        (None, Some(text)) => matcher.evaluate(text.as_str()),
        _ => {
            return Err(JsonRpcError::invalid_params(
                "Exactly one of 'body' or 'body_text' is required",
            ));
        }
    };

    let result = evaluated.map_err(|e| {
        tracing::warn!(schema = %params.schema, error = %e, "schemas/match failed");
        JsonRpcError::from(&e)
    })?;

    let passed = result.matches() != params.negate;
    let message = match (passed, params.negate) {
        (true, _) => None,
        (false, false) => Some(result.failure_message()),
        (false, true) => Some(result.negated_failure_message()),
    };

    let payload = MatchSchemaResult {
        schema: result.schema_name().to_string(),
        matches: result.matches(),
        passed,
        violations: result.violations().iter().map(ViolationEntry::from).collect(),
        message,
    };

    Ok(serde_json::to_value(&payload).expect("MatchSchemaResult must serialize to JSON Value"))
}
