//! Assert that JSON payloads match JSON Schema documents.
//!
//! A body (JSON text, a parsed [`serde_json::Value`], or any `Serialize`
//! type) is normalized to JSON, validated against a [`SchemaDocument`], and
//! turned into a [`MatchResult`]. When the body does not match, the failure
//! message lists each violation and includes the pretty-printed body and
//! schema, so a test runner's output shows everything needed to debug it.
//!
//! Supported keywords: `type`, `enum`, `properties`, `required`, `items`
//! and `$ref` (same-document JSON Pointers, plus other documents in a
//! [`SchemaStore`]).
//!
//! ```ignore
//! use json_matchers::{assert_matches_json_schema, SchemaStore};
//!
//! let store = SchemaStore::open("tests/schemas")?;
//! assert_matches_json_schema!(r#"{"id": 1, "title": "Hello"}"#, store.matcher("post")?);
//! ```
//!
//! The `json-matchers` binary serves the same checks over newline-delimited
//! JSON-RPC 2.0 on stdio.

pub mod assertions;
pub mod body;
pub mod config;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod reporter;
pub mod resolver;
pub mod server;
pub mod store;
pub mod validator;

pub use assertions::{assert_matches_schema, refute_matches_schema, AssertionError};
pub use body::{Serialized, ToJsonValue};
pub use error::MatcherError;
pub use reporter::{MatchResult, Matcher};
pub use store::{SchemaDocument, SchemaStore};
pub use validator::{PathSegment, Validator, Violation, ViolationKind, ViolationPath};
