use std::path::PathBuf;

/// Default directory searched for schema documents.
const DEFAULT_SCHEMA_ROOT: &str = "schemas";

/// Default maximum bytes per JSON-RPC request line (1 MiB).
const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Matcher configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    pub schema_root: PathBuf,
    pub max_message_bytes: usize,
}

impl MatcherConfig {
    pub fn new(schema_root: impl Into<PathBuf>) -> Self {
        Self {
            schema_root: schema_root.into(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Load configuration from environment.
    ///
    /// - `JSON_MATCHERS_SCHEMA_ROOT` (optional, default `schemas`): directory of `*.json` schemas
    /// - `JSON_MATCHERS_MAX_MESSAGE_BYTES` (optional, default 1 MiB): max bytes per request line
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let schema_root = match lookup("JSON_MATCHERS_SCHEMA_ROOT") {
            Some(val) if val.trim().is_empty() => {
                return Err("JSON_MATCHERS_SCHEMA_ROOT must not be empty".to_string());
            }
            Some(val) => PathBuf::from(val),
            None => PathBuf::from(DEFAULT_SCHEMA_ROOT),
        };

        let max_message_bytes = match lookup("JSON_MATCHERS_MAX_MESSAGE_BYTES") {
            Some(val) => match val.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(
                        "JSON_MATCHERS_MAX_MESSAGE_BYTES must be a positive integer".to_string()
                    );
                }
            },
            None => DEFAULT_MAX_MESSAGE_BYTES,
        };

        Ok(Self {
            schema_root,
            max_message_bytes,
        })
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_ROOT)
    }
}
