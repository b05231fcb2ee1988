//! Schema documents and the store that owns them.
//!
//! A [`SchemaStore`] is filled once (from a directory or by hand) and is
//! read-only afterwards, so one store can back any number of concurrent
//! validations without coordination.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::MatcherError;
use crate::reporter::{render_pretty, Matcher};
use crate::validator::type_name;

/// A parsed schema plus the name it was registered under.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    id: String,
    root: Value,
}

impl SchemaDocument {
    /// Parse schema text.
    ///
    /// # Errors
    ///
    /// Returns `MatcherError::InvalidSchema` if `source` is not JSON, its
    /// root is not an object, or it fails its draft's meta-schema.
    pub fn parse(id: impl Into<String>, source: &str) -> Result<Self, MatcherError> {
        let id = id.into();
        let root: Value = serde_json::from_str(source)
            .map_err(|e| MatcherError::invalid_schema(&id, format!("invalid JSON: {e}")))?;
        Self::from_value(id, root)
    }

    /// Wrap an already-parsed schema, applying the same checks as [`parse`](Self::parse).
    pub fn from_value(id: impl Into<String>, root: Value) -> Result<Self, MatcherError> {
        let id = id.into();
        if !root.is_object() {
            return Err(MatcherError::invalid_schema(
                &id,
                format!("root must be a JSON object, found {}", type_name(&root)),
            ));
        }
        MetaDraft::detect(&root)
            .and_then(|draft| draft.check(&root))
            .map_err(|reason| MatcherError::invalid_schema(&id, reason))?;

        tracing::debug!(schema = %id, "loaded schema document");
        Ok(Self { id, root })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Two-space indented rendering, keys in document order.
    pub fn to_pretty_string(&self) -> String {
        render_pretty(&self.root)
    }
}

/// Meta-schema draft a document is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaDraft {
    Draft4,
    Draft6,
    Draft7,
    Draft201909,
    Draft202012,
}

impl MetaDraft {
    /// Draft named by `$schema`. Documents without one are read as draft-07,
    /// whose `definitions` and positional `items` the validator follows.
    fn detect(root: &Value) -> Result<Self, String> {
        let Some(uri) = root.get("$schema") else {
            return Ok(Self::Draft7);
        };
        let Some(uri) = uri.as_str() else {
            return Err("$schema must be a string".to_string());
        };
        let bare = uri
            .trim_end_matches('#')
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        match bare {
            "json-schema.org/draft-04/schema" => Ok(Self::Draft4),
            "json-schema.org/draft-06/schema" => Ok(Self::Draft6),
            "json-schema.org/draft-07/schema" => Ok(Self::Draft7),
            "json-schema.org/draft/2019-09/schema" => Ok(Self::Draft201909),
            "json-schema.org/draft/2020-12/schema" => Ok(Self::Draft202012),
            _ => Err(format!("unsupported $schema '{uri}'")),
        }
    }

    fn check(self, root: &Value) -> Result<(), String> {
        let checked = match self {
            Self::Draft4 => jsonschema::draft4::meta::validate(root),
            Self::Draft6 => jsonschema::draft6::meta::validate(root),
            Self::Draft7 => jsonschema::draft7::meta::validate(root),
            Self::Draft201909 => jsonschema::draft201909::meta::validate(root),
            Self::Draft202012 => jsonschema::draft202012::meta::validate(root),
        };
        checked.map_err(|e| format!("does not conform to its meta-schema: {e}"))
    }
}

/// Registry of schema documents, keyed by root-relative name.
#[derive(Debug, Default)]
pub struct SchemaStore {
    root: Option<PathBuf>,
    documents: BTreeMap<String, SchemaDocument>,
    /// `$id` URI -> document name.
    ids: HashMap<String, String>,
}

impl SchemaStore {
    /// An empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file below `root`.
    ///
    /// Each document is named by its path relative to `root` without the
    /// `.json` extension, using `/` separators (`posts/index`). Symlinks are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `MatcherError::Io` if the directory cannot be read and
    /// `MatcherError::InvalidSchema` naming the first broken file.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, MatcherError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(MatcherError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("schema root {} is not a directory", root.display()),
            )));
        }

        let mut files = Vec::new();
        collect_schema_files(&root, &mut files)?;
        files.sort();

        let mut store = Self {
            root: Some(root.clone()),
            ..Self::default()
        };

        for path in files {
            let Some(name) = path.strip_prefix(&root).ok().and_then(document_name) else {
                tracing::warn!(path = %path.display(), "skipping schema file with non-UTF-8 name");
                continue;
            };
            let source = std::fs::read_to_string(&path)?;
            store.insert(SchemaDocument::parse(name, &source)?);
        }

        tracing::debug!(root = %root.display(), count = store.len(), "opened schema store");
        Ok(store)
    }

    /// Register a document, replacing any document with the same name.
    pub fn insert(&mut self, document: SchemaDocument) {
        let name = normalize_name(&document.id).unwrap_or_else(|| document.id.clone());
        if let Some(uri) = self.documents.get(&name).and_then(declared_id) {
            if self.ids.get(uri) == Some(&name) {
                self.ids.remove(uri);
            }
        }
        if let Some(uri) = declared_id(&document) {
            self.ids.insert(uri.to_string(), name.clone());
        }
        self.documents.insert(name, document);
    }

    /// Look up a document by name (`user` or `user.json`) or by `$id`.
    pub fn get(&self, name: &str) -> Option<&SchemaDocument> {
        if let Some(doc) = normalize_name(name).and_then(|n| self.documents.get(&n)) {
            return Some(doc);
        }
        self.ids
            .get(name.trim_end_matches('#'))
            .and_then(|n| self.documents.get(n))
    }

    /// Like [`get`](Self::get), failing with `SchemaNotFound`.
    pub fn load(&self, name: &str) -> Result<&SchemaDocument, MatcherError> {
        self.get(name).ok_or_else(|| MatcherError::SchemaNotFound {
            name: name.to_string(),
            root: self.root_display(),
        })
    }

    /// A matcher for the named document that can follow cross-document refs.
    pub fn matcher(&self, name: &str) -> Result<Matcher<'_>, MatcherError> {
        Ok(Matcher::new(self.load(name)?).with_store(self))
    }

    /// Registered document names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Find the document a cross-document `$ref` names, relative to `base`.
    pub(crate) fn lookup_ref(&self, base: &str, target: &str) -> Option<&SchemaDocument> {
        if let Some(doc) = self.ids.get(target).and_then(|n| self.documents.get(n)) {
            return Some(doc);
        }
        if target.contains("://") {
            return None;
        }

        let relative = match base.rsplit_once('/') {
            Some((dir, _)) if !target.starts_with('/') => format!("{dir}/{target}"),
            _ => target.to_string(),
        };
        join_segments(&relative)
            .and_then(|n| self.documents.get(&n))
            .or_else(|| normalize_name(target).and_then(|n| self.documents.get(&n)))
    }

    fn root_display(&self) -> String {
        match &self.root {
            Some(root) => root.display().to_string(),
            None => "in-memory store".to_string(),
        }
    }
}

impl FromIterator<SchemaDocument> for SchemaStore {
    fn from_iter<I: IntoIterator<Item = SchemaDocument>>(iter: I) -> Self {
        let mut store = Self::new();
        for document in iter {
            store.insert(document);
        }
        store
    }
}

/// The document's `$id` without an empty trailing fragment.
fn declared_id(document: &SchemaDocument) -> Option<&str> {
    let uri = document.root.get("$id").and_then(Value::as_str)?;
    Some(uri.trim_end_matches('#'))
}

/// Canonical document name: forward slashes, no `./`, no `.json` suffix.
/// Rejects absolute paths and `..` segments.
fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim().replace('\\', "/");
    if name.is_empty() || name.starts_with('/') {
        return None;
    }
    if name.split('/').any(|segment| segment == "..") {
        return None;
    }
    join_segments(&name)
}

/// Collapse `.` and `..` segments and strip the `.json` suffix. `None` when
/// `..` would climb above the store root.
fn join_segments(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return None;
    }
    let joined = segments.join("/");
    Some(joined.strip_suffix(".json").unwrap_or(&joined).to_string())
}

fn document_name(relative: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    join_segments(&parts?.join("/"))
}

fn collect_schema_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), MatcherError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_symlink() {
            tracing::warn!(path = %path.display(), "skipping symlink in schema root");
            continue;
        }

        if file_type.is_dir() {
            collect_schema_files(&path, files)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}
