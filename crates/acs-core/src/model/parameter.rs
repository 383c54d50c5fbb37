// ── Parameter tree ──
//
// A device's TR-069 data model as a typed tree. Interior nodes are
// objects; leaves carry a value. Metadata keys (leading `_`) never
// become children.

use std::collections::BTreeMap;

use acs_api::XsdType;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Ordered mapping of requested path to its value.
///
/// Every requested path is present; `None` marks a path that does not
/// resolve to a leaf with a value.
pub type ParameterValues = IndexMap<String, Option<Value>>;

/// A leaf parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: Value,
    /// XSD type name as reported by the device (`xsd:string`, ...).
    pub value_type: Option<String>,
    pub writable: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Parameter {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            value_type: None,
            writable: None,
            timestamp: None,
        }
    }

    /// The value, or `None` when the device reported `null`.
    pub fn value(&self) -> Option<&Value> {
        (!self.value.is_null()).then_some(&self.value)
    }

    pub fn xsd_type(&self) -> Option<XsdType> {
        self.value_type.as_deref()?.parse().ok()
    }
}

/// An interior node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterObject {
    pub children: BTreeMap<String, ParameterNode>,
    pub writable: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ParameterObject {
    pub fn child(&self, name: &str) -> Option<&ParameterNode> {
        self.children.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterNode {
    Leaf(Parameter),
    Object(ParameterObject),
}

impl ParameterNode {
    pub fn as_leaf(&self) -> Option<&Parameter> {
        match self {
            Self::Leaf(p) => Some(p),
            Self::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ParameterObject> {
        match self {
            Self::Object(o) => Some(o),
            Self::Leaf(_) => None,
        }
    }

    fn from_json(mut map: Map<String, Value>) -> Self {
        let writable = map.get("_writable").and_then(Value::as_bool);
        let timestamp = map.get("_timestamp").and_then(parse_timestamp);
        match map.remove("_value") {
            Some(value) => Self::Leaf(Parameter {
                value,
                value_type: map
                    .get("_type")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                writable,
                timestamp,
            }),
            None => Self::Object(ParameterObject {
                children: children_from_json(map),
                writable,
                timestamp,
            }),
        }
    }
}

/// Typed view of a device's parameter data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTree {
    root: ParameterObject,
}

impl ParameterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from the raw document returned by the NBI.
    ///
    /// Keys starting with `_` are record metadata and are skipped, as are
    /// non-object values at the top level.
    pub fn from_json(map: Map<String, Value>) -> Self {
        Self {
            root: ParameterObject {
                children: children_from_json(map),
                ..ParameterObject::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Top-level nodes (`Device`, `InternetGatewayDevice`, `VirtualParameters`, ...).
    pub fn roots(&self) -> impl Iterator<Item = (&str, &ParameterNode)> {
        self.root.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Walk a dot-separated path.
    pub fn lookup(&self, path: &str) -> Option<&ParameterNode> {
        let mut segments = path.split('.');
        let mut node = self.root.child(segments.next()?)?;
        for segment in segments {
            node = node.as_object()?.child(segment)?;
        }
        Some(node)
    }

    /// The value at `path`.
    ///
    /// `None` when a segment is missing, when the path ends at an object,
    /// or when the leaf holds `null`.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.lookup(path)?.as_leaf()?.value()
    }

    /// Resolve every requested path. Absence is never an error.
    pub fn extract<I, S>(&self, paths: I) -> ParameterValues
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                (path.to_owned(), self.value(path).cloned())
            })
            .collect()
    }

    /// Set a leaf, creating intermediate objects as needed.
    ///
    /// A leaf sitting where an object is needed is replaced.
    pub fn insert(&mut self, path: &str, value: impl Into<Value>) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };
        let mut object = &mut self.root;
        for segment in segments {
            let node = object
                .children
                .entry(segment.to_owned())
                .or_insert_with(|| ParameterNode::Object(ParameterObject::default()));
            if node.as_object().is_none() {
                *node = ParameterNode::Object(ParameterObject::default());
            }
            let ParameterNode::Object(next) = node else {
                return;
            };
            object = next;
        }
        object
            .children
            .insert(last.to_owned(), ParameterNode::Leaf(Parameter::new(value)));
    }

    /// Every leaf path in the tree, depth first.
    pub fn leaf_paths(&self) -> Vec<String> {
        fn walk(prefix: &str, object: &ParameterObject, out: &mut Vec<String>) {
            for (name, node) in &object.children {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                match node {
                    ParameterNode::Leaf(_) => out.push(path),
                    ParameterNode::Object(child) => walk(&path, child, out),
                }
            }
        }
        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out
    }
}

impl<S, V> FromIterator<(S, V)> for ParameterTree
where
    S: AsRef<str>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (S, V)>>(iter: T) -> Self {
        let mut tree = Self::new();
        for (path, value) in iter {
            tree.insert(path.as_ref(), value);
        }
        tree
    }
}

fn children_from_json(map: Map<String, Value>) -> BTreeMap<String, ParameterNode> {
    map.into_iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .filter_map(|(key, value)| match value {
            Value::Object(inner) => Some((key, ParameterNode::from_json(inner))),
            _ => None,
        })
        .collect()
}

// Timestamps arrive as RFC 3339 strings, or epoch millis from older backends.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        _ => None,
    }
}
