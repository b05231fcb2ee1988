pub mod request;
pub mod response;

pub use request::{JsonRpcRequest, MatchSchemaParams, RpcId};
pub use response::{
    ErrorCode, ErrorDetail, ErrorResponse, JsonRpcError, JsonRpcResponse, MatchSchemaResult,
    ViolationEntry,
};
