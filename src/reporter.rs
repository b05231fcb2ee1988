//! Drives one validation call and shapes the outcome for assertions.
//!
//! The failure messages built here are a stable interface: callers match on
//! them by substring, so both the body and the schema always appear as
//! pretty-printed JSON text, never escaped.

use std::fmt::Write as _;

use serde_json::Value;

use crate::body::ToJsonValue;
use crate::error::MatcherError;
use crate::store::{SchemaDocument, SchemaStore};
use crate::validator::{Validator, Violation};

/// Pairs a schema document with the store used for cross-document refs.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    document: &'a SchemaDocument,
    store: Option<&'a SchemaStore>,
}

impl<'a> Matcher<'a> {
    /// A matcher that can only follow same-document references.
    pub fn new(document: &'a SchemaDocument) -> Self {
        Self {
            document,
            store: None,
        }
    }

    pub fn with_store(mut self, store: &'a SchemaStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn document(&self) -> &'a SchemaDocument {
        self.document
    }

    /// Normalize `body` to JSON and validate it.
    ///
    /// # Errors
    ///
    /// `MatcherError::MalformedJson` for unparsable text bodies, and the
    /// reference errors from validation. A mismatch is not an error.
    pub fn evaluate<B: ToJsonValue + ?Sized>(&self, body: &B) -> Result<MatchResult, MatcherError> {
        let value = body.to_json_value()?;
        self.evaluate_value(&value)
    }

    pub fn evaluate_value(&self, value: &Value) -> Result<MatchResult, MatcherError> {
        let violations = Validator::new(self.store).validate(value, self.document)?;
        tracing::debug!(
            schema = %self.document.id(),
            violations = violations.len(),
            "evaluated body"
        );

        Ok(MatchResult {
            matches: violations.is_empty(),
            violations,
            schema_name: self.document.id().to_string(),
            schema_description: self.document.to_pretty_string(),
            body_description: render_pretty(value),
        })
    }
}

/// Outcome of matching one body against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    matches: bool,
    violations: Vec<Violation>,
    schema_name: String,
    schema_description: String,
    body_description: String,
}

impl MatchResult {
    pub fn matches(&self) -> bool {
        self.matches
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Pretty-printed schema document.
    pub fn schema_description(&self) -> &str {
        &self.schema_description
    }

    /// Pretty-printed body.
    pub fn body_description(&self) -> &str {
        &self.body_description
    }

    /// Message for a failed positive assertion: summary line, one line per
    /// violation, then the body and the schema.
    pub fn failure_message(&self) -> String {
        let count = self.violations.len();
        let noun = if count == 1 { "violation" } else { "violations" };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "expected JSON to match schema \"{}\", but found {count} {noun}:",
            self.schema_name
        );
        out.push('\n');
        for violation in &self.violations {
            let _ = writeln!(out, "  {violation}");
        }
        self.push_documents(&mut out);
        out
    }

    /// Message for a failed negated assertion (the body matched).
    pub fn negated_failure_message(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "expected JSON not to match schema \"{}\", but it did.",
            self.schema_name
        );
        self.push_documents(&mut out);
        out
    }

    fn push_documents(&self, out: &mut String) {
        let _ = write!(
            out,
            "\n---\n\nJSON:\n\n{}\n\n---\n\nSchema:\n\n{}\n",
            self.body_description, self.schema_description
        );
    }
}

/// Two-space indented JSON, keys in insertion order.
pub fn render_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).expect("JSON Value must serialize to a string")
}
