// Search filter builder
//
// The NBI search endpoints take a MongoDB-style JSON document in the
// `query` parameter: `{"_id": "abc"}` for literal matches, `{"_lastInform":
// {"$lt": "..."}}` for comparisons. Field paths are passed through as-is;
// a path the backend does not know simply matches nothing.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use strum::IntoStaticStr;

/// Comparison and existence operators understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum Operator {
    #[strum(serialize = "$ne")]
    Ne,
    #[strum(serialize = "$lt")]
    Lt,
    #[strum(serialize = "$lte")]
    Lte,
    #[strum(serialize = "$gt")]
    Gt,
    #[strum(serialize = "$gte")]
    Gte,
    #[strum(serialize = "$exists")]
    Exists,
    #[strum(serialize = "$in")]
    In,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One constraint on a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(Value),
    Compare(Operator, Value),
}

/// A search filter. The empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<(String, Condition)>,
}

#[derive(Default)]
struct FieldExpr {
    equals: Option<Value>,
    operators: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches every record; serializes to `{}`.
    pub fn all() -> Self {
        Self::default()
    }

    /// Exact match on the record identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("_id", id.into())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.push((field.into(), condition));
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Condition::Equals(value.into()))
    }

    pub fn ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Operator::Ne, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Operator::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Operator::Lte, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Operator::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Operator::Gte, value)
    }

    pub fn exists(self, field: impl Into<String>, present: bool) -> Self {
        self.compare(field, Operator::Exists, present)
    }

    pub fn one_of<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.compare(field, Operator::In, values)
    }

    /// Timestamp strictly earlier than `at` (e.g. `_lastInform`).
    pub fn before(self, field: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.lt(field, timestamp(at))
    }

    /// Timestamp strictly later than `at`.
    pub fn after(self, field: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.gt(field, timestamp(at))
    }

    fn compare(self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.condition(field, Condition::Compare(op, value.into()))
    }

    /// Render the filter document.
    ///
    /// Several operators on one field merge into a single object; a literal
    /// match next to operators becomes `$eq`. A repeated condition keeps
    /// the last value.
    pub fn to_value(&self) -> Value {
        let mut fields: BTreeMap<&str, FieldExpr> = BTreeMap::new();
        for (field, condition) in &self.conditions {
            let expr = fields.entry(field.as_str()).or_default();
            match condition {
                Condition::Equals(v) => expr.equals = Some(v.clone()),
                Condition::Compare(op, v) => {
                    expr.operators.insert(op.as_str().to_owned(), v.clone());
                }
            }
        }

        let doc: Map<String, Value> = fields
            .into_iter()
            .filter_map(|(field, expr)| {
                let rendered = match (expr.equals, expr.operators.is_empty()) {
                    (Some(v), true) => v,
                    (Some(v), false) => {
                        let mut ops = expr.operators;
                        ops.insert("$eq".into(), v);
                        Value::Object(ops)
                    }
                    (None, false) => Value::Object(expr.operators),
                    (None, true) => return None,
                };
                Some((field.to_owned(), rendered))
            })
            .collect();

        Value::Object(doc)
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
