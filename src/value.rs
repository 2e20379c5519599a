use std::hash::{Hash, Hasher};
use std::mem;

use crate::mapping::Mapping;
use crate::number::Number;
use crate::sequence::Sequence;

/// Represents any valid YAML value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Represents a YAML null value.
    Null,
    /// Represents a YAML boolean.
    Bool(bool),
    /// Represents a YAML numerical value, whether integer or floating point.
    Number(Number),
    /// Represents a YAML string.
    String(String),
    /// Represents a YAML sequence in which the elements are
    /// `yaml_for_humans::Value`.
    Sequence(Sequence),
    /// Represents a YAML mapping in which the keys and values are both
    /// `yaml_for_humans::Value`.
    Mapping(Mapping),
}

impl Value {
    /// Looks up a value by string key when `self` is a mapping.
    ///
    /// Returns `None` if `self` is not a mapping or the key is absent.
    ///
    /// ```
    /// use yaml_for_humans::Value;
    ///
    /// let doc = yaml_for_humans::from_str("kind: Service").unwrap();
    /// assert_eq!(doc.get("kind"), Some(&Value::String("Service".to_owned())));
    /// assert_eq!(doc.get("metadata"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(&Value::String(key.to_owned())),
            _ => None,
        }
    }

    /// Mutable variant of [`get`](Value::get).
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Mapping(map) => map.get_mut(&Value::String(key.to_owned())),
            _ => None,
        }
    }

    /// Returns true if the `Value` is a Null. Returns false otherwise.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// If the `Value` is a Boolean, returns the associated bool. Returns None
    /// otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// If the `Value` is an integer, represent it as i64 if possible. Returns
    /// None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// If the `Value` is an integer, represent it as u64 if possible. Returns
    /// None otherwise.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// If the `Value` is a number, represent it as f64 if possible. Returns
    /// None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// If the `Value` is a String, returns the associated str. Returns None
    /// otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the `Value` is a sequence, returns the associated `Sequence`.
    /// Returns None otherwise.
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Mutable variant of [`as_sequence`](Value::as_sequence).
    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// If the `Value` is a mapping, returns the associated `Mapping`. Returns
    /// None otherwise.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable variant of [`as_mapping`](Value::as_mapping).
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// True when the value is a scalar: null, boolean, number or string.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Takes the value, leaving `Null` in its place.
    pub fn take(&mut self) -> Value {
        mem::replace(self, Value::Null)
    }
}

impl Default for Value {
    fn default() -> Value {
        Value::Null
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => n.hash(state),
            Value::String(s) => s.hash(state),
            Value::Sequence(seq) => seq.hash(state),
            Value::Mapping(map) => map.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Value {
        Value::Mapping(map)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Value {
        Value::Sequence(seq)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value {
        Value::Sequence(Sequence::from(items))
    }
}

macro_rules! from_number {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Value {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

from_number!(i8 i16 i32 i64 isize u8 u16 u32 u64 usize f32 f64);
