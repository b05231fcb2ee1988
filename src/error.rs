use thiserror::Error;

/// Hard failures raised while loading schemas or evaluating a body.
///
/// None of these mean "the body did not match". A mismatch is ordinary data
/// (a non-empty violation list) and never surfaces through this type.
#[derive(Debug, Error)]
pub enum MatcherError {
    /// The schema source is not valid JSON, its root is not an object, or a
    /// recognized keyword has the wrong shape.
    #[error("invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// The body was given as text that does not parse as JSON, or a
    /// structured body could not be converted to JSON.
    #[error("malformed JSON body: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// A `$ref` points at a document or location that does not exist.
    #[error("unresolved reference '{reference}' in schema '{schema}': {reason}")]
    UnresolvedReference {
        schema: String,
        reference: String,
        reason: String,
    },

    /// A chain of `$ref`s loops back on itself without consuming any of the
    /// value being validated.
    #[error("cyclic reference '{reference}' in schema '{schema}' (chain: {})", .chain.join(" -> "))]
    CyclicReference {
        schema: String,
        reference: String,
        chain: Vec<String>,
    },

    /// No document with this name is registered in the store.
    #[error("schema '{name}' not found in {root}")]
    SchemaNotFound { name: String, root: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatcherError {
    pub(crate) fn invalid_schema(schema: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(schema: &str, reference: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            schema: schema.to_string(),
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors that mean the schema itself is broken rather than the
    /// caller's input.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSchema { .. }
                | Self::UnresolvedReference { .. }
                | Self::CyclicReference { .. }
        )
    }
}
