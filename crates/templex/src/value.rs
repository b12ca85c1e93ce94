// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Context values that templates are rendered against.
//!
//! A [`Value`] is one of four shapes:
//!
//! - [`Value::Record`]: a typed aggregate exposing named fields through the
//!   [`Record`] trait
//! - [`Value::Map`]: string-keyed associative container
//! - [`Value::List`]: ordered sequence
//! - [`Value::Scalar`]: a leaf, turned into text by a [`TextCoercion`]
//!
//! # Building Contexts
//!
//! ```rust
//! use templex::Value;
//! use serde_json::json;
//!
//! // From JSON
//! let ctx = Value::from(json!({ "tasks": [{ "started_at": 1001001 }] }));
//!
//! // From anything serde can serialize
//! #[derive(serde::Serialize)]
//! struct Report { title: String }
//! let ctx = Value::from_serialize(&Report { title: "Daily".into() }).unwrap();
//! ```
//!
//! # Map Ordering
//!
//! [`Value::Map`] is a `HashMap`: iterating it in a loop visits keys in an
//! unspecified order that can differ between runs. Use a list when order
//! matters.

use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A generic context value.
#[derive(Debug, Clone)]
pub enum Value {
    /// A typed record, looked up through its [`Record`] adapter.
    Record(Arc<dyn Record>),
    /// String-keyed map; iteration order is unspecified.
    Map(HashMap<String, Value>),
    /// Index-ordered list.
    List(Vec<Value>),
    /// Leaf value.
    Scalar(Scalar),
}

/// Leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent value; renders as nothing.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for `Int`, or a list index.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::UInt(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Describes one field of a [`Record`] as seen from template paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Internal field name, passed back to [`Record::field`].
    pub name: &'static str,
    /// External name used in paths instead of, or as well as, `name`.
    pub alias: Option<&'static str>,
    /// Hidden fields are never reachable from a path.
    pub hidden: bool,
}

impl Field {
    /// A visible field reachable by its own name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            alias: None,
            hidden: false,
        }
    }

    /// Declares an external alias for the field.
    pub const fn alias(self, alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..self
        }
    }

    /// Hides the field from path lookup.
    pub const fn hidden(self) -> Self {
        Self {
            hidden: true,
            ..self
        }
    }
}

/// Adapter through which templates read the fields of a typed record.
///
/// Implementors declare their fields with [`Record::fields`] and hand out
/// values by internal name with [`Record::field`]. The provided
/// [`Record::lookup`] maps a path segment to a field:
///
/// 1. the first visible field whose alias equals the segment, else
/// 2. the first visible field whose internal name equals the segment.
///
/// # Example
///
/// ```rust
/// use templex::{Field, Record, Value};
///
/// #[derive(Debug)]
/// struct Task {
///     started_at: i64,
///     secret: String,
/// }
///
/// impl Record for Task {
///     fn fields(&self) -> &[Field] {
///         const FIELDS: &[Field] = &[
///             Field::new("started_at").alias("start"),
///             Field::new("secret").hidden(),
///         ];
///         FIELDS
///     }
///
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "started_at" => Some(self.started_at.into()),
///             "secret" => Some(self.secret.as_str().into()),
///             _ => None,
///         }
///     }
/// }
///
/// let task = Task { started_at: 7, secret: "x".into() };
/// assert!(task.lookup("start").is_some());
/// assert!(task.lookup("secret").is_none());
/// ```
pub trait Record: fmt::Debug + Send + Sync {
    /// Field descriptors in declaration order.
    fn fields(&self) -> &[Field];

    /// Returns the value of the field with the given internal name.
    fn field(&self, name: &str) -> Option<Value>;

    /// Resolves one path segment against this record.
    fn lookup(&self, segment: &str) -> Option<Value> {
        let visible = || self.fields().iter().filter(|f| !f.hidden);
        let field = visible()
            .find(|f| f.alias == Some(segment))
            .or_else(|| visible().find(|f| f.name == segment))?;
        self.field(field.name)
    }
}

impl Value {
    /// Wraps a record.
    pub fn record<R: Record + 'static>(record: R) -> Self {
        Value::Record(Arc::new(record))
    }

    /// Converts any serializable value through its JSON representation.
    ///
    /// Structs become maps, so this is the quickest way to render plain data
    /// types without implementing [`Record`].
    pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// The null scalar.
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    /// Returns the scalar if this is a leaf value.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Record(_) => "record",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Scalar(_) => "scalar",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Record(a), Value::Record(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Scalar(Scalar::UInt(u))
                } else {
                    Value::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => s.into(),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Scalar(Scalar::Int(n.into()))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(Scalar::Int(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Scalar(Scalar::Int(n.into()))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Scalar(Scalar::UInt(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Scalar(Scalar::UInt(n as u64))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(Scalar::Float(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Str(s))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(map: HashMap<String, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Turns a resolved value into the text written to the output.
///
/// Must not fail: every value, including containers, maps to some text.
pub trait TextCoercion: Send + Sync {
    /// Returns the text for `value`.
    fn to_text(&self, value: &Value) -> String;
}

/// Default coercion.
///
/// Scalars use their natural text form (`null` renders as nothing); records,
/// maps and lists render as nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCoercion;

impl TextCoercion for DefaultCoercion {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Scalar(scalar) => scalar.to_string(),
            _ => String::new(),
        }
    }
}

impl<F> TextCoercion for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn to_text(&self, value: &Value) -> String {
        self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Task {
        started_at: i64,
        name: String,
        token: String,
    }

    impl Record for Task {
        fn fields(&self) -> &[Field] {
            const FIELDS: &[Field] = &[
                Field::new("started_at"),
                Field::new("name").alias("title"),
                Field::new("token").hidden(),
            ];
            FIELDS
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "started_at" => Some(self.started_at.into()),
                "name" => Some(self.name.as_str().into()),
                "token" => Some(self.token.as_str().into()),
                _ => None,
            }
        }
    }

    fn task() -> Task {
        Task {
            started_at: 1001001,
            name: "sync".to_string(),
            token: "s3cr3t".to_string(),
        }
    }

    #[test]
    fn record_lookup_by_name_and_alias() {
        let task = task();
        assert_eq!(task.lookup("started_at"), Some(Value::from(1001001i64)));
        assert_eq!(task.lookup("title"), Some(Value::from("sync")));
        assert_eq!(task.lookup("name"), Some(Value::from("sync")));
        assert_eq!(task.lookup("missing"), None);
    }

    #[test]
    fn hidden_fields_are_unreachable() {
        assert_eq!(task().lookup("token"), None);
    }

    #[test]
    fn alias_wins_over_another_fields_name() {
        #[derive(Debug)]
        struct Swapped;

        impl Record for Swapped {
            fn fields(&self) -> &[Field] {
                const FIELDS: &[Field] = &[Field::new("a"), Field::new("b").alias("a")];
                FIELDS
            }

            fn field(&self, name: &str) -> Option<Value> {
                Some(name.into())
            }
        }

        assert_eq!(Swapped.lookup("a"), Some(Value::from("b")));
    }

    #[test]
    fn json_conversion() {
        let value = Value::from(json!({
            "n": -3,
            "big": u64::MAX,
            "f": 1.5,
            "s": "x",
            "b": true,
            "nil": null,
            "list": [1, 2]
        }));

        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["n"], Value::Scalar(Scalar::Int(-3)));
        assert_eq!(map["big"], Value::Scalar(Scalar::UInt(u64::MAX)));
        assert_eq!(map["f"], Value::Scalar(Scalar::Float(1.5)));
        assert_eq!(map["s"], Value::from("x"));
        assert_eq!(map["b"], Value::from(true));
        assert_eq!(map["nil"], Value::null());
        assert_eq!(map["list"], Value::from(vec![1i64, 2]));
    }

    #[test]
    fn from_serialize_struct() {
        #[derive(serde::Serialize)]
        struct Summary {
            task_count: u32,
        }

        let value = Value::from_serialize(&Summary { task_count: 4 }).unwrap();
        let expected: Value = [("task_count", 4i64)].into_iter().collect();
        assert_eq!(value, expected);
    }

    #[test]
    fn default_coercion() {
        let c = DefaultCoercion;
        assert_eq!(c.to_text(&Value::from(42i64)), "42");
        assert_eq!(c.to_text(&Value::from(19.99)), "19.99");
        assert_eq!(c.to_text(&Value::from(2.0)), "2");
        assert_eq!(c.to_text(&Value::from(false)), "false");
        assert_eq!(c.to_text(&Value::from("text")), "text");
        assert_eq!(c.to_text(&Value::null()), "");
        assert_eq!(c.to_text(&Value::from(vec![1i64])), "");
        assert_eq!(c.to_text(&Value::record(task())), "");
    }

    #[test]
    fn closures_are_coercions() {
        let upper = |v: &Value| DefaultCoercion.to_text(v).to_uppercase();
        assert_eq!(upper.to_text(&Value::from("abc")), "ABC");
    }

    #[test]
    fn records_compare_by_identity() {
        let a = Value::record(task());
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Value::record(task()));
    }
}
