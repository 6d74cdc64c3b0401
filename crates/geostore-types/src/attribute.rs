use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A feature's attribute bag: unique keys, order not significant.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A dynamically typed attribute value.
///
/// Serialized untagged, so attribute bags read and write as plain JSON
/// objects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(AttributeValue::from(3), AttributeValue::Integer(3));
        assert_eq!(AttributeValue::from(2.5), AttributeValue::Float(2.5));
        assert_eq!(AttributeValue::from("x"), AttributeValue::Text("x".into()));
        assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from(None::<i64>), AttributeValue::Null);
        assert_eq!(AttributeValue::from(Some("y")), AttributeValue::Text("y".into()));
    }

    #[test]
    fn accessors() {
        assert_eq!(AttributeValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(AttributeValue::Text("a".into()).as_i64(), None);
        assert!(AttributeValue::default().is_null());
        assert_eq!(AttributeValue::Float(1.5).type_name(), "float");
    }

    #[test]
    fn serializes_as_plain_json_object() {
        let mut attrs = Attributes::new();
        attrs.insert("name".into(), "Main St".into());
        attrs.insert("lanes".into(), 2.into());
        attrs.insert("speed".into(), 48.5.into());
        attrs.insert("oneway".into(), false.into());
        attrs.insert("note".into(), AttributeValue::Null);

        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(
            json,
            r#"{"lanes":2,"name":"Main St","note":null,"oneway":false,"speed":48.5}"#
        );
        let parsed: Attributes = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, attrs);
    }
}
