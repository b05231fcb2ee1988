//! Recursive evaluation of a JSON value against a schema node.
//!
//! Keywords on one node are checked in a fixed order and every applicable
//! keyword runs, so a single value can collect several violations:
//!
//! 1. `$ref` makes the node a pure indirection; its other keywords are ignored.
//! 2. `type`
//! 3. `enum`
//! 4. `required` and `properties`, for objects
//! 5. `items`, for arrays
//!
//! When a node uses object or array keywords without declaring `type` and the
//! value has the wrong shape, a single type violation is reported instead of
//! attempting the structural checks.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::error::MatcherError;
use crate::resolver::Resolver;
use crate::store::{SchemaDocument, SchemaStore};

/// One step into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a violation inside the validated value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViolationPath {
    segments: Vec<PathSegment>,
}

impl ViolationPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// JSON Pointer form: `""` for the root, `/items/0/name` otherwise.
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                PathSegment::Key(key) => out.push_str(&key.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}

impl fmt::Display for ViolationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.to_pointer())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// `type`, or the implied type of `properties`/`required`/`items`.
    Type,
    Enum,
    Required,
    /// The `false` schema.
    Rejected,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Required => "required",
            Self::Rejected => "rejected",
        }
    }
}

/// A single located mismatch between a value and a schema constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: ViolationPath,
    pub kind: ViolationKind,
    pub expected: String,
    pub actual: String,
}

impl Violation {
    fn new(
        path: &ViolationPath,
        kind: ViolationKind,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            path: path.clone(),
            kind,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Human-readable description without the path.
    pub fn description(&self) -> String {
        match self.kind {
            ViolationKind::Required => "missing required property".to_string(),
            _ => format!("expected {}, found {}", self.expected, self.actual),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.description())
    }
}

/// Walks values against schemas for one validation call.
///
/// Holds the per-call [`Resolver`]; create a fresh validator for every call
/// so memoized references and the resolution stack are never shared.
#[derive(Debug)]
pub struct Validator<'a> {
    resolver: Resolver<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(store: Option<&'a SchemaStore>) -> Self {
        Self {
            resolver: Resolver::new(store),
        }
    }

    /// Validate a whole body against `document`.
    ///
    /// A root-level array body is checked element by element against the
    /// document root, unless the root itself describes an array (declares
    /// `items` or an `array` type), in which case it is validated as-is.
    ///
    /// # Errors
    ///
    /// Only reference failures abort validation:
    /// `MatcherError::UnresolvedReference` and `MatcherError::CyclicReference`.
    pub fn validate(
        &mut self,
        value: &Value,
        document: &'a SchemaDocument,
    ) -> Result<Vec<Violation>, MatcherError> {
        let mut violations = Vec::new();
        let root = ViolationPath::root();

        let per_element = value.is_array() && !self.describes_array(document.root(), document)?;

        match value {
            Value::Array(items) if per_element => {
                for (i, item) in items.iter().enumerate() {
                    self.descend(item, document.root(), document, &root.index(i), &mut violations)?;
                }
            }
            _ => self.validate_node(value, document.root(), document, &root, &mut violations)?,
        }

        Ok(violations)
    }

    /// Check `value` against one schema node, appending to `out`.
    pub fn validate_node(
        &mut self,
        value: &Value,
        schema: &'a Value,
        document: &'a SchemaDocument,
        path: &ViolationPath,
        out: &mut Vec<Violation>,
    ) -> Result<(), MatcherError> {
        let map = match schema {
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => {
                out.push(Violation::new(
                    path,
                    ViolationKind::Rejected,
                    "no value",
                    type_name(value),
                ));
                return Ok(());
            }
            Value::Object(map) => map,
            _ => return Ok(()),
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            let resolved = self.resolver.enter(document, reference)?;
            let result = self.validate_node(value, resolved.node, resolved.document, path, out);
            self.resolver.exit();
            return result;
        }

        let declared_type = map.get("type");
        if let Some(ty) = declared_type {
            let names = type_names(ty);
            if !names.is_empty() && !names.iter().any(|name| matches_type(value, name)) {
                out.push(Violation::new(
                    path,
                    ViolationKind::Type,
                    names.join(" or "),
                    type_name(value),
                ));
            }
        }

        if let Some(Value::Array(allowed)) = map.get("enum") {
            if !allowed.iter().any(|candidate| json_eq(candidate, value)) {
                let options: Vec<String> = allowed.iter().map(Value::to_string).collect();
                out.push(Violation::new(
                    path,
                    ViolationKind::Enum,
                    format!("one of [{}]", options.join(", ")),
                    value.to_string(),
                ));
            }
        }

        let object_keywords = map.contains_key("properties") || map.contains_key("required");
        let array_keywords = map.contains_key("items");

        match value {
            Value::Object(object) if object_keywords => {
                self.validate_object(object, map, document, path, out)?;
            }
            Value::Array(items) if array_keywords => {
                if let Some(items_schema) = map.get("items") {
                    self.validate_items(items, items_schema, document, path, out)?;
                }
            }
            _ if declared_type.is_none() && (object_keywords || array_keywords) => {
                let mut expected = Vec::new();
                if object_keywords {
                    expected.push("object");
                }
                if array_keywords {
                    expected.push("array");
                }
                out.push(Violation::new(
                    path,
                    ViolationKind::Type,
                    expected.join(" or "),
                    type_name(value),
                ));
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_object(
        &mut self,
        object: &Map<String, Value>,
        schema: &'a Map<String, Value>,
        document: &'a SchemaDocument,
        path: &ViolationPath,
        out: &mut Vec<Violation>,
    ) -> Result<(), MatcherError> {
        if let Some(Value::Array(required)) = schema.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    out.push(Violation::new(
                        &path.key(name),
                        ViolationKind::Required,
                        format!("property \"{name}\""),
                        "nothing",
                    ));
                }
            }
        }

        // Keys without a schema entry are allowed.
        if let Some(Value::Object(properties)) = schema.get("properties") {
            for (key, child) in object {
                if let Some(child_schema) = properties.get(key) {
                    self.descend(child, child_schema, document, &path.key(key), out)?;
                }
            }
        }

        Ok(())
    }

    fn validate_items(
        &mut self,
        items: &[Value],
        schema: &'a Value,
        document: &'a SchemaDocument,
        path: &ViolationPath,
        out: &mut Vec<Violation>,
    ) -> Result<(), MatcherError> {
        match schema {
            Value::Array(positional) => {
                for (i, (item, item_schema)) in items.iter().zip(positional).enumerate() {
                    self.descend(item, item_schema, document, &path.index(i), out)?;
                }
            }
            item_schema => {
                for (i, item) in items.iter().enumerate() {
                    self.descend(item, item_schema, document, &path.index(i), out)?;
                }
            }
        }
        Ok(())
    }

    /// Validate a child value with a fresh resolution stack.
    fn descend(
        &mut self,
        value: &Value,
        schema: &'a Value,
        document: &'a SchemaDocument,
        path: &ViolationPath,
        out: &mut Vec<Violation>,
    ) -> Result<(), MatcherError> {
        let saved = self.resolver.descend();
        let result = self.validate_node(value, schema, document, path, out);
        self.resolver.restore(saved);
        result
    }

    /// Whether `schema`, after following any `$ref` chain, describes an array.
    fn describes_array(
        &mut self,
        schema: &'a Value,
        document: &'a SchemaDocument,
    ) -> Result<bool, MatcherError> {
        let mut node = schema;
        let mut doc = document;
        let mut entered = 0;

        let result = loop {
            match node.get("$ref").and_then(Value::as_str) {
                Some(reference) => match self.resolver.enter(doc, reference) {
                    Ok(resolved) => {
                        entered += 1;
                        node = resolved.node;
                        doc = resolved.document;
                    }
                    Err(e) => break Err(e),
                },
                None => break Ok(declares_array(node)),
            }
        };

        for _ in 0..entered {
            self.resolver.exit();
        }
        result
    }
}

fn declares_array(node: &Value) -> bool {
    let Value::Object(map) = node else {
        return true;
    };
    map.contains_key("items")
        || map
            .get("type")
            .is_some_and(|ty| type_names(ty).contains(&"array"))
}

fn type_names(ty: &Value) -> Vec<&str> {
    match ty {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches_type(value: &Value, name: &str) -> bool {
    match (name, value) {
        ("null", Value::Null) => true,
        ("boolean", Value::Bool(_)) => true,
        ("number", Value::Number(_)) => true,
        ("integer", Value::Number(n)) => is_integral(n),
        ("string", Value::String(_)) => true,
        ("array", Value::Array(_)) => true,
        ("object", Value::Object(_)) => true,
        _ => false,
    }
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Runtime category of a value, as used in diagnostics. Integral numbers
/// report `integer`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if is_integral(n) => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Structural JSON equality: object key order is ignored, array order is
/// not, and numbers compare by value (`1 == 1.0`).
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, a)| y.get(key).is_some_and(|b| json_eq(a, b)))
        }
        _ => a == b,
    }
}
