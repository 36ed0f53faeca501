//! Top-level structure of a parsed JSON document.

use serde_json::Value;
use std::fmt;

/// Wrapper key checked by default, as in `{"results": [...]}` API responses.
pub const DEFAULT_WRAPPER: &str = "results";

/// JSON type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Array,
    Object,
    String,
    Number,
    Bool,
    Null,
}

impl RootKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => RootKind::Array,
            Value::Object(_) => RootKind::Object,
            Value::String(_) => RootKind::String,
            Value::Number(_) => RootKind::Number,
            Value::Bool(_) => RootKind::Bool,
            Value::Null => RootKind::Null,
        }
    }

    /// Returns true for arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self, RootKind::Array | RootKind::Object)
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RootKind::Array => "list",
            RootKind::Object => "dict",
            RootKind::String => "string",
            RootKind::Number => "number",
            RootKind::Bool => "bool",
            RootKind::Null => "null",
        };
        f.write_str(s)
    }
}

/// Summary of a document's top level plus one representative item.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Type of the root value.
    pub root: RootKind,
    /// Array length or object key count; `None` for scalars.
    pub len: Option<usize>,
    /// Root object keys in document order. Empty unless the root is an object.
    pub keys: Vec<String>,
    /// Wrapper key whose array holds the items, if one was found.
    pub wrapper: Option<String>,
    /// The item collection: the root array or the wrapper array.
    pub items: Vec<Value>,
    /// The sample item.
    pub sample: Option<Value>,
}

impl Shape {
    /// Compute the shape of `value`, looking for the given wrapper keys when the
    /// root is an object.
    pub fn of<S: AsRef<str>>(value: &Value, wrappers: &[S]) -> Self {
        let root = RootKind::of(value);

        match value {
            Value::Array(items) => Shape {
                root,
                len: Some(items.len()),
                keys: Vec::new(),
                wrapper: None,
                items: items.clone(),
                sample: items.first().cloned(),
            },
            Value::Object(map) => {
                let keys: Vec<String> = map.keys().cloned().collect();
                let wrapped = wrappers.iter().find_map(|key| {
                    let key = key.as_ref();
                    match map.get(key) {
                        Some(Value::Array(items)) => Some((key.to_string(), items)),
                        _ => None,
                    }
                });

                match wrapped {
                    Some((wrapper, items)) => Shape {
                        root,
                        len: Some(map.len()),
                        keys,
                        wrapper: Some(wrapper),
                        items: items.clone(),
                        sample: items.first().cloned(),
                    },
                    None => Shape {
                        root,
                        len: Some(map.len()),
                        keys,
                        wrapper: None,
                        items: vec![value.clone()],
                        sample: Some(value.clone()),
                    },
                }
            }
            _ => Shape {
                root,
                len: None,
                keys: Vec::new(),
                wrapper: None,
                items: Vec::new(),
                sample: None,
            },
        }
    }

    /// Keys of the sample item, when it is an object.
    pub fn sample_keys(&self) -> Option<Vec<&str>> {
        match &self.sample {
            Some(Value::Object(map)) => Some(map.keys().map(String::as_str).collect()),
            _ => None,
        }
    }
}
