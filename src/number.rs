use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::num::FpCategory;

/// Represents a YAML number, whether integer or floating point.
#[derive(Clone, PartialEq)]
pub struct Number {
    n: N,
}

#[derive(Clone, Copy, Debug)]
enum N {
    PosInt(u64),
    /// Always less than zero.
    NegInt(i64),
    Float(f64),
}

impl Number {
    /// Returns true if the `Number` is an integer between `i64::MIN` and
    /// `i64::MAX`.
    ///
    /// For any Number on which `is_i64` returns true, `as_i64` is guaranteed
    /// to return the integer value.
    pub fn is_i64(&self) -> bool {
        match self.n {
            N::PosInt(v) => v <= i64::MAX as u64,
            N::NegInt(_) => true,
            N::Float(_) => false,
        }
    }

    /// Returns true if the `Number` is an integer between zero and `u64::MAX`.
    pub fn is_u64(&self) -> bool {
        match self.n {
            N::PosInt(_) => true,
            N::NegInt(_) | N::Float(_) => false,
        }
    }

    /// Returns true if the `Number` can be represented by f64.
    pub fn is_f64(&self) -> bool {
        match self.n {
            N::Float(_) => true,
            N::PosInt(_) | N::NegInt(_) => false,
        }
    }

    /// If the `Number` is an integer, represent it as i64 if possible.
    /// Returns None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self.n {
            N::PosInt(v) => {
                if v <= i64::MAX as u64 {
                    Some(v as i64)
                } else {
                    None
                }
            }
            N::NegInt(v) => Some(v),
            N::Float(_) => None,
        }
    }

    /// If the `Number` is an integer, represent it as u64 if possible.
    /// Returns None otherwise.
    pub fn as_u64(&self) -> Option<u64> {
        match self.n {
            N::PosInt(v) => Some(v),
            N::NegInt(_) | N::Float(_) => None,
        }
    }

    /// Represents the number as f64 if possible. Returns None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self.n {
            N::PosInt(v) => Some(v as f64),
            N::NegInt(v) => Some(v as f64),
            N::Float(v) => Some(v),
        }
    }

    /// Returns true if this number is NaN.
    pub fn is_nan(&self) -> bool {
        match self.n {
            N::Float(v) => v.is_nan(),
            N::PosInt(_) | N::NegInt(_) => false,
        }
    }
}

impl Display for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self.n {
            N::PosInt(v) => Display::fmt(&v, formatter),
            N::NegInt(v) => Display::fmt(&v, formatter),
            N::Float(v) => match v.classify() {
                FpCategory::Infinite if v.is_sign_positive() => formatter.write_str(".inf"),
                FpCategory::Infinite => formatter.write_str("-.inf"),
                FpCategory::Nan => formatter.write_str(".nan"),
                _ => formatter.write_str(ryu::Buffer::new().format_finite(v)),
            },
        }
    }
}

impl Debug for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, formatter)
    }
}

impl PartialEq for N {
    fn eq(&self, other: &N) -> bool {
        match (*self, *other) {
            (N::PosInt(a), N::PosInt(b)) => a == b,
            (N::NegInt(a), N::NegInt(b)) => a == b,
            (N::Float(a), N::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    // YAML's `.nan` compares equal to itself so that a
                    // mapping keyed by `.nan` remains addressable.
                    true
                } else {
                    a == b
                }
            }
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.n {
            N::PosInt(v) => v.hash(state),
            N::NegInt(v) => v.hash(state),
            N::Float(v) => {
                if v.is_nan() {
                    // Normalize so that all NaN bit patterns hash alike.
                    0x7ff8_0000_0000_0000u64.hash(state)
                } else {
                    v.to_bits().hash(state)
                }
            }
        }
    }
}

macro_rules! from_signed {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for Number {
                fn from(i: $ty) -> Self {
                    let n = if i < 0 {
                        N::NegInt(i as i64)
                    } else {
                        N::PosInt(i as u64)
                    };
                    Number { n }
                }
            }
        )*
    };
}

macro_rules! from_unsigned {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for Number {
                fn from(u: $ty) -> Self {
                    Number { n: N::PosInt(u as u64) }
                }
            }
        )*
    };
}

from_signed!(i8 i16 i32 i64 isize);
from_unsigned!(u8 u16 u32 u64 usize);

impl From<f32> for Number {
    fn from(f: f32) -> Self {
        Number {
            n: N::Float(f as f64),
        }
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number { n: N::Float(f) }
    }
}
