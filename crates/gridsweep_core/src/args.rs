//! Keyword arguments handed to a sweep function for one point.

use indexmap::IndexMap;
use num_complex::Complex64;

use crate::error::{Result, SweepError};
use crate::value::Value;

/// Named argument values for one invocation: the point's axis values
/// followed by the constants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: IndexMap<String, Value>,
    /// Number of leading entries that are sweep coordinates
    axes: usize,
}

impl Args {
    pub(crate) fn new(
        point: impl IntoIterator<Item = (String, Value)>,
        constants: &IndexMap<String, Value>,
    ) -> Self {
        let mut values: IndexMap<String, Value> = point.into_iter().collect();
        let axes = values.len();
        values.extend(constants.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { values, axes }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn value(&self, name: &str) -> Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| SweepError::MissingArgument {
                name: name.to_string(),
            })
    }

    /// Numeric argument; ints are widened.
    pub fn f64(&self, name: &str) -> Result<f64> {
        let value = self.value(name)?;
        match value {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(v) => Ok(*v),
            other => Err(type_error(name, "float", other)),
        }
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        let value = self.value(name)?;
        value.as_i64().ok_or_else(|| type_error(name, "int", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        let value = self.value(name)?;
        value.as_bool().ok_or_else(|| type_error(name, "bool", value))
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        let value = self.value(name)?;
        value.as_str().ok_or_else(|| type_error(name, "str", value))
    }

    pub fn complex(&self, name: &str) -> Result<Complex64> {
        let value = self.value(name)?;
        value
            .as_complex()
            .ok_or_else(|| type_error(name, "complex", value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `a=1, b=10` style label of the sweep coordinates only.
    pub fn point_label(&self) -> String {
        self.values
            .iter()
            .take(self.axes)
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn type_error(name: &str, expected: &'static str, found: &Value) -> SweepError {
    SweepError::ArgumentType {
        name: name.to_string(),
        expected,
        found: found.type_name(),
    }
}
