use serde::{Deserialize, Serialize};

use super::request::RpcId;
use crate::error::MatcherError;
use crate::validator::Violation;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 response layer
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn parse_error() -> Self {
        Self { code: -32700, message: "Parse error".into(), data: None }
    }

    pub fn invalid_request() -> Self {
        Self { code: -32600, message: "Invalid Request".into(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self { code: -32602, message: detail.into(), data: None }
    }
}

// ---------------------------------------------------------------------------
// Matcher error mapping
// ---------------------------------------------------------------------------

/// Stable machine-readable error code carried in `error.data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    SchemaNotFound,
    MalformedJson,
    InvalidSchema,
    UnresolvedReference,
    CyclicReference,
    IoError,
}

impl ErrorCode {
    /// Map to the corresponding JSON-RPC 2.0 error code.
    ///
    /// Caller mistakes  → -32602 (Invalid params)
    /// Broken schemas   → -32001 (server-defined)
    /// Server failures  → -32603 (Internal error)
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            Self::SchemaNotFound | Self::MalformedJson => -32602,
            Self::InvalidSchema | Self::UnresolvedReference | Self::CyclicReference => -32001,
            Self::IoError => -32603,
        }
    }
}

impl From<&MatcherError> for ErrorCode {
    fn from(err: &MatcherError) -> Self {
        match err {
            MatcherError::SchemaNotFound { .. } => Self::SchemaNotFound,
            MatcherError::MalformedJson(_) => Self::MalformedJson,
            MatcherError::InvalidSchema { .. } => Self::InvalidSchema,
            MatcherError::UnresolvedReference { .. } => Self::UnresolvedReference,
            MatcherError::CyclicReference { .. } => Self::CyclicReference,
            MatcherError::Io(_) => Self::IoError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// Structured error carried in JSON-RPC `error.data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

impl From<&MatcherError> for ErrorResponse {
    fn from(err: &MatcherError) -> Self {
        Self {
            error: ErrorDetail {
                code: ErrorCode::from(err),
                message: err.to_string(),
            },
        }
    }
}

/// The JSON-RPC `code` is derived from the error code, the `message` is the
/// human-readable error, and the structured form goes in `data`.
impl From<ErrorResponse> for JsonRpcError {
    fn from(resp: ErrorResponse) -> Self {
        Self {
            code: resp.error.code.json_rpc_code(),
            message: resp.error.message.clone(),
            data: Some(
                serde_json::to_value(&resp).expect("ErrorResponse must serialize to JSON Value"),
            ),
        }
    }
}

impl From<&MatcherError> for JsonRpcError {
    fn from(err: &MatcherError) -> Self {
        ErrorResponse::from(err).into()
    }
}

// ---------------------------------------------------------------------------
// schemas/match result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchSchemaResult {
    pub schema: String,
    pub matches: bool,
    /// `matches` for a plain match, `!matches` when negated.
    pub passed: bool,
    pub violations: Vec<ViolationEntry>,
    /// Failure diagnostic, present only when `passed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolationEntry {
    pub path: String,
    pub kind: String,
    pub expected: String,
    pub actual: String,
    pub message: String,
}

impl From<&Violation> for ViolationEntry {
    fn from(v: &Violation) -> Self {
        Self {
            path: v.path.to_pointer(),
            kind: v.kind.as_str().to_string(),
            expected: v.expected.clone(),
            actual: v.actual.clone(),
            message: v.description(),
        }
    }
}
