use std::borrow::Cow;
use std::fmt;

use super::Number;

// -----------------------------------------------------------------------------
// ValueKind

/// The kind of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Empty,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
        })
    }
}

// -----------------------------------------------------------------------------
// Value

/// A dynamic wire value.
///
/// # Examples
///
/// ```
/// use vc_codec::Value;
///
/// let point = Value::map([("x", Value::from(1)), ("y", Value::from(2))]);
///
/// assert_eq!(point.get("x"), Some(&Value::from(1)));
/// assert_eq!(point.get("z"), None);
/// assert_eq!(point.to_string(), r#"{"x": 1, "y": 2}"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// The absent value.
    #[default]
    Empty,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    /// Key/value entries in insertion order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Builds a [`Value::Map`] from key/value pairs, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a [`Value::List`].
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns the kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Empty => ValueKind::Empty,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the first entry with the given key if this is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::Number(Number::Int(value as i64))
            }
        }
    )*};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Number(Number::Float(value as f64))
    }
}

impl From<Number> for Value {
    #[inline]
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Cow<'_, str>> for Value {
    #[inline]
    fn from(value: Cow<'_, str>) -> Self {
        Self::String(value.into_owned())
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

// -----------------------------------------------------------------------------
// Display

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Number(v) => fmt::Display::fmt(v, f),
            Self::String(v) => fmt::Debug::fmt(v, f),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Value, ValueKind};

    #[test]
    fn map_lookup_uses_first_entry() {
        let value = Value::Map(vec![
            ("a".into(), Value::from(1)),
            ("a".into(), Value::from(2)),
        ]);
        assert_eq!(value.get("a"), Some(&Value::from(1)));
        assert_eq!(Value::from(3).get("a"), None);
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::Empty.kind(), ValueKind::Empty);
        assert_eq!(Value::list([]).kind(), ValueKind::List);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(ValueKind::Map.to_string(), "map");
    }

    #[test]
    fn display_nested() {
        let value = Value::map([
            ("tags", Value::list([Value::from("a"), Value::from(true)])),
            ("ratio", Value::from(0.5)),
        ]);
        assert_eq!(value.to_string(), r#"{"tags": ["a", true], "ratio": 0.5}"#);
    }
}
