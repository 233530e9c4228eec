//! Values exchanged with item properties and methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed, tagged value crossing the command boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Variant {
    /// No value
    #[default]
    Empty,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    List(Vec<Variant>),
}

impl Variant {
    /// Whether this is `Variant::Empty`
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Name of the held type
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }

    /// The boolean, if this is `Bool`
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is `Int`
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The number as `f64`, if this is `Int` or `Float`
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The string slice, if this is `String`
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is `List`
    #[must_use]
    pub fn as_list(&self) -> Option<&[Variant]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Plain rendering, as a property value would read in the UI
impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Variant {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Variant {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Variant {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Variant>> From<Vec<T>> for Variant {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Variant> for serde_json::Value {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Empty => Self::Null,
            Variant::Bool(b) => Self::Bool(b),
            Variant::Int(i) => Self::from(i),
            Variant::Float(f) => serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number),
            Variant::String(s) => Self::String(s),
            Variant::List(items) => Self::Array(items.into_iter().map(Into::into).collect()),
        }
    }
}

/// JSON objects have no `Variant` counterpart and map to their string form.
impl From<serde_json::Value> for Variant {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Into::into).collect())
            }
            object @ serde_json::Value::Object(_) => Self::String(object.to_string()),
        }
    }
}

#[cfg(any(test, feature = "proptest"))]
pub mod strategies {
    //! Proptest strategies for [`Variant`](super::Variant).

    use super::Variant;
    use proptest::prelude::*;

    /// Any scalar variant (no lists)
    pub fn scalar_variant() -> impl Strategy<Value = Variant> {
        prop_oneof![
            Just(Variant::Empty),
            any::<bool>().prop_map(Variant::Bool),
            any::<i64>().prop_map(Variant::Int),
            (-1.0e9..1.0e9_f64).prop_map(Variant::Float),
            "[ -~]{0,16}".prop_map(Variant::String),
        ]
    }

    /// Any variant, lists nested up to three levels
    pub fn any_variant() -> impl Strategy<Value = Variant> {
        scalar_variant().prop_recursive(3, 24, 6, |inner| {
            prop::collection::vec(inner, 0..6).prop_map(Variant::List)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::any_variant;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_empty() {
        assert!(Variant::default().is_empty());
        assert_eq!(Variant::default().type_name(), "empty");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Variant::from(true).as_bool(), Some(true));
        assert_eq!(Variant::from(7_i32).as_int(), Some(7));
        assert_eq!(Variant::from(7_i64).as_float(), Some(7.0));
        assert_eq!(Variant::from("hi").as_str(), Some("hi"));
        assert_eq!(Variant::from("hi").as_int(), None);
        assert_eq!(
            Variant::from(vec![1_i64, 2]).as_list().map(<[Variant]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Variant::Empty.to_string(), "");
        assert_eq!(Variant::from(vec!["a", "b"]).to_string(), "[a, b]");
        assert_eq!(Variant::Float(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!([1, 2.5, "x", null, true]);
        let variant = Variant::from(json);
        assert_eq!(
            variant,
            Variant::List(vec![
                Variant::Int(1),
                Variant::Float(2.5),
                Variant::String("x".into()),
                Variant::Empty,
                Variant::Bool(true),
            ])
        );
    }

    #[test]
    fn test_json_object_becomes_string() {
        let variant = Variant::from(serde_json::json!({"k": 1}));
        assert_eq!(variant, Variant::String("{\"k\":1}".into()));
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_string(&Variant::Int(3)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":3}"#);
        let json = serde_json::to_string(&Variant::Empty).unwrap();
        assert_eq!(json, r#"{"type":"empty"}"#);
    }

    proptest! {
        #[test]
        fn prop_json_value_preserves_variant(variant in any_variant()) {
            let value = serde_json::Value::from(variant.clone());
            prop_assert_eq!(Variant::from(value), variant);
        }
    }
}
