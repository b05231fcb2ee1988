//! The accepted body forms, normalized into a single `serde_json::Value`
//! before validation starts.
//!
//! Text (`str`, `String`, raw bytes) is parsed as JSON. Structured values
//! (`Value`, maps, sequences) are taken as they are, and any `Serialize` type
//! can be wrapped in [`Serialized`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MatcherError;

pub trait ToJsonValue {
    /// # Errors
    ///
    /// Returns `MatcherError::MalformedJson` when text does not parse or a
    /// structured value cannot be represented as JSON.
    fn to_json_value(&self) -> Result<Value, MatcherError>;
}

impl ToJsonValue for str {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        serde_json::from_str(self).map_err(MatcherError::MalformedJson)
    }
}

impl ToJsonValue for String {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        self.as_str().to_json_value()
    }
}

impl ToJsonValue for [u8] {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        serde_json::from_slice(self).map_err(MatcherError::MalformedJson)
    }
}

impl ToJsonValue for Value {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        Ok(self.clone())
    }
}

impl ToJsonValue for Map<String, Value> {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        Ok(Value::Object(self.clone()))
    }
}

impl ToJsonValue for [Value] {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        Ok(Value::Array(self.to_vec()))
    }
}

impl ToJsonValue for Vec<Value> {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        self.as_slice().to_json_value()
    }
}

impl<T: ToJsonValue + ?Sized> ToJsonValue for &T {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        (**self).to_json_value()
    }
}

/// Wraps any `Serialize` value (a response struct, a typed payload) so it can
/// be matched like a parsed body.
#[derive(Debug, Clone, Copy)]
pub struct Serialized<T>(pub T);

impl<T: Serialize> ToJsonValue for Serialized<T> {
    fn to_json_value(&self) -> Result<Value, MatcherError> {
        serde_json::to_value(&self.0).map_err(MatcherError::MalformedJson)
    }
}
