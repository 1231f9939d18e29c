//! Results of a single sweep invocation and their shape classification.

use std::fmt;

use num_complex::Complex64;

use crate::error::{Result, SweepError};
use crate::value::Value;

/// Output of one call of the sweep function.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A single value
    Scalar(Value),
    /// A row-major array of values
    Array { shape: Vec<usize>, values: Vec<Value> },
    /// Several results from one call, one per output variable
    Tuple(Vec<Output>),
}

impl Output {
    /// One-dimensional array result.
    pub fn array<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Output::Array {
            shape: vec![values.len()],
            values,
        }
    }

    /// N-dimensional array result, checked against its shape.
    pub fn array_nd<I, V>(shape: Vec<usize>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(SweepError::ShapeMismatch {
                what: format!("array values for shape {shape:?}"),
                expected,
                found: values.len(),
            });
        }
        Ok(Output::Array { shape, values })
    }

    #[must_use]
    pub fn schema(&self) -> Schema {
        match self {
            Output::Scalar(_) => Schema::Scalar,
            Output::Array { shape, .. } => Schema::Array(shape.clone()),
            Output::Tuple(items) => Schema::Tuple(items.iter().map(Output::schema).collect()),
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Output::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Values in row-major order: one for a scalar, all elements for an array.
    pub(crate) fn into_values(self) -> Vec<Value> {
        match self {
            Output::Scalar(v) => vec![v],
            Output::Array { values, .. } => values,
            Output::Tuple(items) => items.into_iter().flat_map(Output::into_values).collect(),
        }
    }
}

/// Shape classification of an [`Output`].
///
/// The first result of a sweep fixes the schema; every later result must
/// match it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Scalar,
    Array(Vec<usize>),
    Tuple(Vec<Schema>),
}

impl Schema {
    /// Classify the first output and check every other output against it.
    pub fn classify(outputs: &[Output]) -> Result<Option<Schema>> {
        let Some(first) = outputs.first() else {
            return Ok(None);
        };
        let schema = first.schema();
        for (index, output) in outputs.iter().enumerate().skip(1) {
            let found = output.schema();
            if found != schema {
                return Err(SweepError::SchemaMismatch {
                    index,
                    expected: schema.to_string(),
                    found: found.to_string(),
                });
            }
        }
        Ok(Some(schema))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Scalar => write!(f, "scalar"),
            Schema::Array(shape) => write!(f, "array{shape:?}"),
            Schema::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Split tuple outputs into one sequence per tuple position.
///
/// Every output must be a tuple of the same width as the first.
pub fn split_outputs(outputs: Vec<Output>) -> Result<Vec<Vec<Output>>> {
    let width = match outputs.first() {
        Some(Output::Tuple(items)) => items.len(),
        Some(other) => {
            return Err(SweepError::SchemaMismatch {
                index: 0,
                expected: "tuple".to_string(),
                found: other.schema().to_string(),
            });
        }
        None => return Ok(Vec::new()),
    };

    let count = outputs.len();
    let mut fields: Vec<Vec<Output>> = (0..width).map(|_| Vec::with_capacity(count)).collect();
    for (index, output) in outputs.into_iter().enumerate() {
        match output {
            Output::Tuple(items) if items.len() == width => {
                for (field, item) in fields.iter_mut().zip(items) {
                    field.push(item);
                }
            }
            other => {
                return Err(SweepError::SchemaMismatch {
                    index,
                    expected: format!("tuple of {width}"),
                    found: other.schema().to_string(),
                });
            }
        }
    }
    Ok(fields)
}

impl From<Value> for Output {
    fn from(v: Value) -> Self {
        Output::Scalar(v)
    }
}

macro_rules! output_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Output {
            fn from(v: $t) -> Self {
                Output::Scalar(v.into())
            }
        })*
    };
}

output_from_scalar!(bool, i32, i64, u32, usize, f32, f64, Complex64, &str, String);

impl<V: Into<Value>> From<Vec<V>> for Output {
    fn from(values: Vec<V>) -> Self {
        Output::array(values)
    }
}

impl<A: Into<Output>, B: Into<Output>> From<(A, B)> for Output {
    fn from((a, b): (A, B)) -> Self {
        Output::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Output>, B: Into<Output>, C: Into<Output>> From<(A, B, C)> for Output {
    fn from((a, b, c): (A, B, C)) -> Self {
        Output::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_of_tuple() {
        let out: Output = (1.5, vec![1, 2, 3]).into();
        assert_eq!(
            out.schema(),
            Schema::Tuple(vec![Schema::Scalar, Schema::Array(vec![3])])
        );
        assert_eq!(out.schema().to_string(), "(scalar, array[3])");
    }

    #[test]
    fn test_classify_rejects_mismatch() {
        let outputs = vec![Output::from(1), Output::from(vec![1, 2])];
        let err = Schema::classify(&outputs).unwrap_err();
        assert!(matches!(err, SweepError::SchemaMismatch { index: 1, .. }));
    }

    #[test]
    fn test_split_outputs() {
        let outputs: Vec<Output> = vec![(1, true).into(), (2, false).into()];
        let fields = split_outputs(outputs).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], vec![Output::from(1), Output::from(2)]);
        assert_eq!(fields[1], vec![Output::from(true), Output::from(false)]);
    }

    #[test]
    fn test_split_requires_tuples() {
        let outputs = vec![Output::from(1)];
        assert!(split_outputs(outputs).is_err());
    }

    #[test]
    fn test_array_nd_checks_shape() {
        assert!(Output::array_nd(vec![2, 2], [1, 2, 3]).is_err());
        assert!(Output::array_nd(vec![2, 2], [1, 2, 3, 4]).is_ok());
    }
}
