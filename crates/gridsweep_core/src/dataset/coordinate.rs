use rustc_hash::FxHashMap;

use crate::error::{Result, SweepError};
use crate::value::{DType, Value, ValueKey};

/// Distinct values labelling one dimension, with a lookup index.
#[derive(Debug, Clone)]
pub struct Coordinate {
    values: Vec<Value>,
    dtype: DType,
    index: FxHashMap<ValueKey, usize>,
}

impl Coordinate {
    /// Build a coordinate for dimension `dim`; values must be distinct.
    pub fn new(dim: &str, values: Vec<Value>) -> Result<Self> {
        let dtype = DType::infer(&values);
        let values: Vec<Value> = values.into_iter().map(|v| dtype.cast(v)).collect();
        let mut index = FxHashMap::default();
        for (i, value) in values.iter().enumerate() {
            if index.insert(value.key(), i).is_some() {
                return Err(SweepError::DuplicateCoordinate {
                    dim: dim.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(Self {
            values,
            dtype,
            index,
        })
    }

    /// Integer index coordinate `0..len`.
    #[must_use]
    pub fn range(len: usize) -> Self {
        let values: Vec<Value> = (0..len).map(Value::from).collect();
        let index = values.iter().enumerate().map(|(i, v)| (v.key(), i)).collect();
        Self {
            values,
            dtype: DType::Int,
            index,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of `value` along this dimension.
    ///
    /// Numeric values match across int and float representations, so an
    /// integer selector finds `2.0` on a float axis.
    pub fn position(&self, value: &Value) -> Option<usize> {
        if let Some(&i) = self.index.get(&value.key()) {
            return Some(i);
        }
        let cast = self.dtype.cast(value.clone());
        if let Some(&i) = self.index.get(&cast.key()) {
            return Some(i);
        }
        match value {
            Value::Float(v) if v.fract() == 0.0 && self.dtype == DType::Int => {
                self.index.get(&Value::Int(*v as i64).key()).copied()
            }
            _ => None,
        }
    }

    /// Numeric positions for plotting: numeric values as-is, anything else
    /// by its index along the axis.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self.dtype {
            DType::Int | DType::Float => self
                .values
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect(),
            _ => (0..self.values.len()).map(|i| i as f64).collect(),
        }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.key() == b.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_across_numeric_kinds() {
        let coord = Coordinate::new("t", vec![Value::Float(0.5), Value::Float(2.0)]).unwrap();
        assert_eq!(coord.position(&Value::Int(2)), Some(1));
        assert_eq!(coord.position(&Value::Float(0.5)), Some(0));
        assert_eq!(coord.position(&Value::Int(3)), None);

        let ints = Coordinate::range(3);
        assert_eq!(ints.position(&Value::Float(2.0)), Some(2));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = Coordinate::new("a", vec![Value::Int(1), Value::Int(1)]).unwrap_err();
        assert!(matches!(err, SweepError::DuplicateCoordinate { .. }));
    }

    #[test]
    fn test_string_coordinate_keeps_str_dtype() {
        let coord = Coordinate::new("time", vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(coord.dtype(), DType::Str);
        assert_eq!(coord.to_f64_vec(), vec![0.0, 1.0]);
    }
}
