//! Dynamic values flowing through a sweep: arguments, coordinates and results.

use std::cmp::Ordering;
use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A single dynamically typed value.
///
/// `Missing` is the sentinel for cells no invocation produced. Float and
/// complex storage use NaN for the same purpose, see [`Value::is_missing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(#[serde(with = "nan_as_null")] f64),
    Complex(#[serde(with = "complex_nan_as_null")] Complex64),
    Str(String),
    Missing,
}

impl Value {
    /// True for the missing sentinel in any of its representations.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(v) => v.is_nan(),
            Value::Complex(z) => z.re.is_nan() || z.im.is_nan(),
            _ => false,
        }
    }

    /// Human readable kind, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Str(_) => "str",
            Value::Missing => "missing",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of ints and floats. Missing reads as NaN.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(v) => Some(*v),
            Value::Missing => Some(f64::NAN),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Value::Int(i) => Some(Complex64::new(*i as f64, 0.0)),
            Value::Float(v) => Some(Complex64::new(*v, 0.0)),
            Value::Complex(z) => Some(*z),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Complex(_) => 2,
            Value::Str(_) => 3,
            Value::Missing => 4,
        }
    }

    /// Total order used to sort coordinate values.
    ///
    /// Ints and floats compare numerically, complex numbers by (re, im),
    /// and values of different kinds by a fixed kind rank.
    #[must_use]
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let a = self.as_f64().unwrap_or(f64::NAN);
                let b = other.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
            (Value::Complex(a), Value::Complex(b)) => {
                a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im))
            }
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Hashable identity of this value, used for coordinate lookup.
    pub(crate) fn key(&self) -> ValueKey {
        match self {
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Int(i) => ValueKey::Int(*i),
            Value::Float(v) => ValueKey::Float(float_bits(*v)),
            Value::Complex(z) => ValueKey::Complex(float_bits(z.re), float_bits(z.im)),
            Value::Str(s) => ValueKey::Str(s.clone()),
            Value::Missing => ValueKey::Missing,
        }
    }
}

fn float_bits(v: f64) -> u64 {
    // -0.0 and 0.0 address the same coordinate
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Bool(bool),
    Int(i64),
    Float(u64),
    Complex(u64, u64),
    Str(String),
    Missing,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Complex(a), Value::Complex(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Missing, Value::Missing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Complex(z) => {
                if z.im < 0.0 {
                    write!(f, "{}-{}j", z.re, -z.im)
                } else {
                    write!(f, "{}+{}j", z.re, z.im)
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "nan"),
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<Complex64> for Value {
    fn from(v: Complex64) -> Self {
        Value::Complex(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// Storage type of a variable or coordinate, inferred from its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Object,
}

impl DType {
    /// Decide the storage type from the values actually present.
    ///
    /// Any `Value::Missing` forces a type that can hold the sentinel:
    /// ints become floats, bools and strings become objects.
    pub fn infer<'a, I>(values: I) -> DType
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let (mut bools, mut ints, mut floats, mut complexes, mut strs, mut missing) =
            (false, false, false, false, false, false);
        for value in values {
            match value {
                Value::Bool(_) => bools = true,
                Value::Int(_) => ints = true,
                Value::Float(_) => floats = true,
                Value::Complex(_) => complexes = true,
                Value::Str(_) => strs = true,
                Value::Missing => missing = true,
            }
        }

        let numeric = ints || floats || complexes;
        let base = match (bools, numeric, strs) {
            (false, false, false) => DType::Float,
            (true, false, false) => DType::Bool,
            (false, true, false) if complexes => DType::Complex,
            (false, true, false) if floats => DType::Float,
            (false, true, false) => DType::Int,
            (false, false, true) => DType::Str,
            _ => DType::Object,
        };

        if !missing {
            return base;
        }
        match base {
            DType::Int => DType::Float,
            DType::Bool | DType::Str => DType::Object,
            other => other,
        }
    }

    /// The missing sentinel as stored by this type.
    #[must_use]
    pub fn missing(self) -> Value {
        match self {
            DType::Float => Value::Float(f64::NAN),
            DType::Complex => Value::Complex(Complex64::new(f64::NAN, f64::NAN)),
            _ => Value::Missing,
        }
    }

    /// Convert a value into this type's representation.
    ///
    /// Values that cannot be represented are returned unchanged; callers
    /// only cast values the type was inferred from.
    #[must_use]
    pub fn cast(self, value: Value) -> Value {
        match (self, value) {
            (_, Value::Missing) => self.missing(),
            (DType::Float, Value::Int(i)) => Value::Float(i as f64),
            (DType::Complex, Value::Int(i)) => Value::Complex(Complex64::new(i as f64, 0.0)),
            (DType::Complex, Value::Float(v)) => Value::Complex(Complex64::new(v, 0.0)),
            (_, value) => value,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int => "int",
            DType::Float => "float",
            DType::Complex => "complex",
            DType::Str => "str",
            DType::Object => "object",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort and deduplicate values into a coordinate axis.
#[must_use]
pub fn sorted_union<'a, I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let values: Vec<&Value> = values.into_iter().collect();
    let dtype = DType::infer(values.iter().copied());
    let mut out: Vec<Value> = values.into_iter().map(|v| dtype.cast(v.clone())).collect();
    out.sort_by(Value::total_cmp);
    out.dedup_by(|a, b| a.key() == b.key());
    out
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_nan() {
            s.serialize_none()
        } else {
            s.serialize_some(v)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

mod complex_nan_as_null {
    use num_complex::Complex64;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    fn finite_or_none(v: f64) -> Option<f64> {
        if v.is_nan() { None } else { Some(v) }
    }

    pub fn serialize<S: Serializer>(z: &Complex64, s: S) -> Result<S::Ok, S::Error> {
        (finite_or_none(z.re), finite_or_none(z.im)).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Complex64, D::Error> {
        let (re, im) = <(Option<f64>, Option<f64>)>::deserialize(d)?;
        Ok(Complex64::new(
            re.unwrap_or(f64::NAN),
            im.unwrap_or(f64::NAN),
        ))
    }
}
