//! `$ref` resolution.
//!
//! References are resolved lazily by string lookup every time a `$ref` node
//! is reached; nothing cyclic is ever built in memory. A [`Resolver`] lives
//! for exactly one validation call and keeps two pieces of per-call state:
//!
//! - a memo of already-resolved references, and
//! - the resolution stack: the references followed since the validator last
//!   descended into a child value. Seeing the same target twice on that stack
//!   means the schema loops without consuming any input, which is reported as
//!   `CyclicReference`. Recursive schemas that descend into properties or
//!   items on every step are fine.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::MatcherError;
use crate::store::{SchemaDocument, SchemaStore};
use crate::validator::type_name;

/// A `$ref` target: the node and the document it lives in.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub document: &'a SchemaDocument,
    pub node: &'a Value,
    /// Canonical `document#/pointer` form.
    pub key: String,
}

#[derive(Debug)]
pub struct Resolver<'a> {
    store: Option<&'a SchemaStore>,
    memo: HashMap<(String, String), Resolved<'a>>,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// `store` is consulted for references that name another document.
    pub fn new(store: Option<&'a SchemaStore>) -> Self {
        Self {
            store,
            memo: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Resolve `reference` as written inside `document`.
    ///
    /// # Errors
    ///
    /// Returns `MatcherError::UnresolvedReference` when the target document,
    /// any pointer segment, or the target node itself is missing or unusable.
    pub fn resolve(
        &mut self,
        document: &'a SchemaDocument,
        reference: &str,
    ) -> Result<Resolved<'a>, MatcherError> {
        let memo_key = (document.id().to_string(), reference.to_string());
        if let Some(hit) = self.memo.get(&memo_key) {
            return Ok(hit.clone());
        }

        let (target, fragment) = split_reference(reference);
        let target_doc = if target.is_empty() {
            document
        } else {
            let store = self.store.ok_or_else(|| {
                MatcherError::unresolved(
                    document.id(),
                    reference,
                    "cross-document reference needs a schema store",
                )
            })?;
            store.lookup_ref(document.id(), target).ok_or_else(|| {
                MatcherError::unresolved(
                    document.id(),
                    reference,
                    format!("no schema named '{target}'"),
                )
            })?
        };

        let node = walk_pointer(target_doc.root(), fragment)
            .map_err(|reason| MatcherError::unresolved(document.id(), reference, reason))?;
        if !node.is_object() && !node.is_boolean() {
            return Err(MatcherError::unresolved(
                document.id(),
                reference,
                format!("target is a {}, not a schema", type_name(node)),
            ));
        }

        let resolved = Resolved {
            document: target_doc,
            node,
            key: format!("{}#{}", target_doc.id(), fragment),
        };
        tracing::debug!(
            schema = %document.id(),
            reference,
            target = %resolved.key,
            "resolved $ref"
        );

        self.memo.insert(memo_key, resolved.clone());
        Ok(resolved)
    }

    /// Resolve `reference` and push it onto the resolution stack.
    ///
    /// Every successful `enter` must be paired with an [`exit`](Self::exit).
    ///
    /// # Errors
    ///
    /// As [`resolve`](Self::resolve), plus `MatcherError::CyclicReference`
    /// when the target is already on the stack.
    pub fn enter(
        &mut self,
        document: &'a SchemaDocument,
        reference: &str,
    ) -> Result<Resolved<'a>, MatcherError> {
        let resolved = self.resolve(document, reference)?;
        if self.stack.contains(&resolved.key) {
            let mut chain = self.stack.clone();
            chain.push(resolved.key.clone());
            return Err(MatcherError::CyclicReference {
                schema: document.id().to_string(),
                reference: reference.to_string(),
                chain,
            });
        }
        self.stack.push(resolved.key.clone());
        Ok(resolved)
    }

    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Clear the stack before validating a child value. Hand the returned
    /// stack back to [`restore`](Self::restore) afterwards.
    pub fn descend(&mut self) -> Vec<String> {
        std::mem::take(&mut self.stack)
    }

    pub fn restore(&mut self, saved: Vec<String>) {
        self.stack = saved;
    }

    /// Number of distinct references resolved so far in this call.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }
}

/// Split `other.json#/a/b` into `("other.json", "/a/b")`.
///
/// Same-document references have an empty document part.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((document, fragment)) => (document, fragment),
        None => (reference, ""),
    }
}

/// Follow a JSON Pointer fragment (without the leading `#`) from `root`.
///
/// An empty fragment designates `root`. Segments are URI-decoded, then
/// `~1` and `~0` are unescaped. Array segments must be plain decimal indices.
pub fn walk_pointer<'v>(root: &'v Value, fragment: &str) -> Result<&'v Value, String> {
    if fragment.is_empty() {
        return Ok(root);
    }

    let decoded = percent_decode(fragment)?;
    let Some(rest) = decoded.strip_prefix('/') else {
        return Err(format!("fragment '{fragment}' is not a JSON Pointer"));
    };

    let mut node = root;
    for raw in rest.split('/') {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        node = match node {
            Value::Object(map) => map
                .get(&segment)
                .ok_or_else(|| format!("no key '{segment}'"))?,
            Value::Array(items) => {
                let index = parse_index(&segment)
                    .ok_or_else(|| format!("'{segment}' is not an array index"))?;
                items.get(index).ok_or_else(|| {
                    format!("index {index} is out of bounds (length {})", items.len())
                })?
            }
            other => {
                return Err(format!(
                    "cannot descend into {} at '{segment}'",
                    type_name(other)
                ));
            }
        };
    }
    Ok(node)
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}

fn percent_decode(input: &str) -> Result<String, String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| format!("bad percent-escape in '{input}'"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| format!("'{input}' does not decode to UTF-8"))
}
