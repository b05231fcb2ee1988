//! Assertion entry points for test code.
//!
//! The functions return `Result` so callers can tell a failed assertion
//! (`AssertionError::Failed`) from a broken schema or body
//! (`AssertionError::Matcher`). The macros panic with the same text, for
//! use directly inside `#[test]` functions.

use thiserror::Error;

use crate::body::ToJsonValue;
use crate::error::MatcherError;
use crate::reporter::Matcher;

#[derive(Debug, Error)]
pub enum AssertionError {
    /// The assertion did not hold; the message is the full diagnostic.
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

impl AssertionError {
    /// The diagnostic text of a failed assertion.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Matcher(_) => None,
        }
    }
}

/// Succeeds when `body` matches the matcher's schema.
pub fn assert_matches_schema<B: ToJsonValue + ?Sized>(
    body: &B,
    matcher: &Matcher<'_>,
) -> Result<(), AssertionError> {
    let result = matcher.evaluate(body)?;
    if result.matches() {
        Ok(())
    } else {
        Err(AssertionError::Failed(result.failure_message()))
    }
}

/// Succeeds when `body` does not match the matcher's schema.
pub fn refute_matches_schema<B: ToJsonValue + ?Sized>(
    body: &B,
    matcher: &Matcher<'_>,
) -> Result<(), AssertionError> {
    let result = matcher.evaluate(body)?;
    if result.matches() {
        Err(AssertionError::Failed(result.negated_failure_message()))
    } else {
        Ok(())
    }
}

/// Panics unless `$body` matches the schema of `$matcher`.
///
/// ```ignore
/// let store = SchemaStore::open("tests/schemas")?;
/// assert_matches_json_schema!(r#"{"id": 1}"#, store.matcher("post")?);
/// ```
#[macro_export]
macro_rules! assert_matches_json_schema {
    ($body:expr, $matcher:expr $(,)?) => {
        if let Err(err) = $crate::assertions::assert_matches_schema(&$body, &$matcher) {
            panic!("{}", err);
        }
    };
}

/// Panics if `$body` matches the schema of `$matcher`.
#[macro_export]
macro_rules! refute_matches_json_schema {
    ($body:expr, $matcher:expr $(,)?) => {
        if let Err(err) = $crate::assertions::refute_matches_schema(&$body, &$matcher) {
            panic!("{}", err);
        }
    };
}
