//! Labeled N-dimensional arrays.
//!
//! A [`Dataset`] holds ordered coordinates (one per dimension), variables
//! laid out over some of those dimensions, and free-form attributes.
//! Variables store [`Value`]s in a [`SweepGrid`] and carry the [`DType`]
//! inferred from what was written into them.

mod align;
mod array;
mod auto;
mod coordinate;

pub use align::align_outer;
pub(crate) use align::dim_permutation;
pub use array::DataArray;
pub use auto::auto_xyz_ds;
pub use coordinate::Coordinate;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::grid::{GridIndices, SweepGrid};
use crate::value::{DType, Value};

/// One data variable: its dimension names, storage type and values.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    dims: Vec<String>,
    dtype: DType,
    data: SweepGrid<Value>,
}

impl Variable {
    /// Wrap a grid, inferring the dtype from its values.
    pub(crate) fn from_grid(dims: Vec<String>, data: SweepGrid<Value>) -> Self {
        let mut var = Self {
            dims,
            dtype: DType::Object,
            data,
        };
        var.refresh_dtype();
        var
    }

    /// A variable with every cell missing.
    pub(crate) fn missing(dims: Vec<String>, shape: Vec<usize>) -> Self {
        Self::from_grid(dims, SweepGrid::new(shape, Value::Missing))
    }

    /// Re-infer the dtype from the stored values and recast them.
    pub(crate) fn refresh_dtype(&mut self) {
        for value in self.data.data_mut() {
            if value.is_missing() {
                *value = Value::Missing;
            }
        }
        let dtype = DType::infer(self.data.data());
        for value in self.data.data_mut() {
            *value = dtype.cast(std::mem::replace(value, Value::Missing));
        }
        self.dtype = dtype;
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Values in row-major order over `dims`
    pub fn values(&self) -> &[Value] {
        self.data.data()
    }

    pub fn data(&self) -> &SweepGrid<Value> {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut SweepGrid<Value> {
        &mut self.data
    }

    /// Numeric view of the values; non-numeric and missing cells are NaN.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.values()
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    pub fn count_missing(&self) -> usize {
        self.values().iter().filter(|v| v.is_missing()).count()
    }
}

/// Ordered coordinates, variables and attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRepr", into = "DatasetRepr")]
pub struct Dataset {
    coords: IndexMap<String, Coordinate>,
    vars: IndexMap<String, Variable>,
    attrs: IndexMap<String, Value>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension coordinate. Values must be distinct.
    pub fn with_coord<S, I, V>(mut self, name: S, values: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        let coord = Coordinate::new(&name, values.into_iter().map(Into::into).collect())?;
        if self.coords.contains_key(&name) || self.vars.contains_key(&name) {
            return Err(SweepError::DuplicateName { name });
        }
        self.coords.insert(name, coord);
        Ok(self)
    }

    /// Add a variable over existing dims, values in row-major order.
    pub fn with_var<S, D, DS, I, V>(mut self, name: S, dims: D, values: I) -> Result<Self>
    where
        S: Into<String>,
        D: IntoIterator<Item = DS>,
        DS: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        if self.vars.contains_key(&name) {
            return Err(SweepError::DuplicateName { name });
        }
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        let shape = self.shape_of(&dims)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(shape_error(&name, &dims, expected, values.len()));
        }
        let data = SweepGrid::from_data(shape, values)?;
        self.insert_var(name, Variable::from_grid(dims, data))?;
        Ok(self)
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    pub fn coords(&self) -> impl Iterator<Item = (&str, &Coordinate)> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Dimension names in insertion order
    pub fn dims(&self) -> Vec<&str> {
        self.coords.keys().map(String::as_str).collect()
    }

    pub fn var(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }

    pub fn attrs(&self) -> &IndexMap<String, Value> {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Pull one variable out together with its coordinates.
    pub fn array(&self, name: &str) -> Result<DataArray> {
        let var = self.vars.get(name).ok_or_else(|| SweepError::VarNotFound {
            name: name.to_string(),
        })?;
        let coords = var
            .dims
            .iter()
            .map(|dim| self.require_coord(dim).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(DataArray::new(
            name.to_string(),
            var.dims.clone(),
            coords,
            var.dtype,
            var.data.clone(),
        ))
    }

    /// Select single coordinate values, dropping the selected dims from
    /// every variable that has them.
    pub fn sel<I, S, V>(&self, selectors: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let mut positions: IndexMap<String, usize> = IndexMap::new();
        for (dim, value) in selectors {
            let dim = dim.as_ref();
            let value = value.into();
            let coord = self.require_coord(dim)?;
            let pos = coord
                .position(&value)
                .ok_or_else(|| SweepError::CoordNotFound {
                    dim: dim.to_string(),
                    value: value.to_string(),
                })?;
            positions.insert(dim.to_string(), pos);
        }

        let coords = self
            .coords
            .iter()
            .filter(|(name, _)| !positions.contains_key(*name))
            .map(|(name, coord)| (name.clone(), coord.clone()))
            .collect();

        let mut vars = IndexMap::with_capacity(self.vars.len());
        for (name, var) in &self.vars {
            let fixed: Vec<Option<usize>> =
                var.dims.iter().map(|d| positions.get(d).copied()).collect();
            let dims = var
                .dims
                .iter()
                .filter(|d| !positions.contains_key(*d))
                .cloned()
                .collect();
            let selected = Variable {
                dims,
                dtype: var.dtype,
                data: take(&var.data, &fixed)?,
            };
            vars.insert(name.clone(), selected);
        }

        Ok(Dataset {
            coords,
            vars,
            attrs: self.attrs.clone(),
        })
    }

    /// Scalar lookup of `var` at the given coordinate values.
    pub fn get<I, S, V>(&self, var: &str, selectors: I) -> Result<Value>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        self.array(var)?.sel(selectors)?.item()
    }

    /// Check that every variable's shape agrees with its coordinates.
    pub fn check_shapes(&self) -> Result<()> {
        for (name, var) in &self.vars {
            let expected = self.shape_of(&var.dims)?;
            if expected != var.shape() {
                return Err(shape_error(
                    name,
                    &var.dims,
                    expected.iter().product(),
                    var.values().len(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn require_coord(&self, dim: &str) -> Result<&Coordinate> {
        self.coords.get(dim).ok_or_else(|| SweepError::DimNotFound {
            dim: dim.to_string(),
        })
    }

    pub(crate) fn shape_of(&self, dims: &[String]) -> Result<Vec<usize>> {
        dims.iter()
            .map(|dim| self.require_coord(dim).map(Coordinate::len))
            .collect()
    }

    pub(crate) fn set_coord(&mut self, name: String, coord: Coordinate) {
        self.coords.insert(name, coord);
    }

    pub(crate) fn var_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.vars.get_mut(name)
    }

    pub(crate) fn vars_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.vars.values_mut()
    }

    pub(crate) fn set_attr(&mut self, name: String, value: Value) {
        self.attrs.insert(name, value);
    }

    /// Insert or replace a variable after checking its dims and shape.
    pub(crate) fn insert_var(&mut self, name: String, var: Variable) -> Result<()> {
        if self.coords.contains_key(&name) {
            return Err(SweepError::DuplicateName { name });
        }
        for (i, dim) in var.dims.iter().enumerate() {
            if var.dims[..i].contains(dim) {
                return Err(SweepError::DuplicateName { name: dim.clone() });
            }
        }
        let expected = self.shape_of(&var.dims)?;
        if expected != var.shape() {
            return Err(shape_error(
                &name,
                &var.dims,
                expected.iter().product(),
                var.values().len(),
            ));
        }
        self.vars.insert(name, var);
        Ok(())
    }
}

fn shape_error(name: &str, dims: &[String], expected: usize, found: usize) -> SweepError {
    SweepError::ShapeMismatch {
        what: format!("values of variable '{name}' over {dims:?}"),
        expected,
        found,
    }
}

/// Copy out the sub-grid where each `Some(i)` axis is fixed at `i`.
pub(crate) fn take(data: &SweepGrid<Value>, fixed: &[Option<usize>]) -> Result<SweepGrid<Value>> {
    let shape: Vec<usize> = data
        .shape()
        .iter()
        .zip(fixed)
        .filter(|(_, f)| f.is_none())
        .map(|(&n, _)| n)
        .collect();
    let mut values = Vec::with_capacity(shape.iter().product());
    for sub in GridIndices::new(&shape) {
        let mut free = sub.into_iter();
        let full: Vec<usize> = fixed
            .iter()
            .map(|f| match f {
                Some(i) => *i,
                None => free.next().unwrap_or(0),
            })
            .collect();
        values.push(data.get(&full).cloned().unwrap_or(Value::Missing));
    }
    SweepGrid::from_data(shape, values)
}

#[derive(Serialize, Deserialize)]
struct DatasetRepr {
    #[serde(default)]
    coords: IndexMap<String, Vec<Value>>,
    #[serde(default)]
    vars: IndexMap<String, VariableRepr>,
    #[serde(default)]
    attrs: IndexMap<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct VariableRepr {
    dims: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dtype: Option<DType>,
    values: Vec<Value>,
}

impl TryFrom<DatasetRepr> for Dataset {
    type Error = SweepError;

    fn try_from(repr: DatasetRepr) -> Result<Self> {
        let mut ds = Dataset::new();
        for (name, values) in repr.coords {
            ds = ds.with_coord(name, values)?;
        }
        for (name, var) in repr.vars {
            ds = ds.with_var(name, var.dims, var.values)?;
        }
        ds.attrs = repr.attrs;
        Ok(ds)
    }
}

impl From<Dataset> for DatasetRepr {
    fn from(ds: Dataset) -> Self {
        DatasetRepr {
            coords: ds
                .coords
                .into_iter()
                .map(|(name, coord)| (name, coord.values().to_vec()))
                .collect(),
            vars: ds
                .vars
                .into_iter()
                .map(|(name, var)| {
                    let repr = VariableRepr {
                        dims: var.dims,
                        dtype: Some(var.dtype),
                        values: var.data.into_data(),
                    };
                    (name, repr)
                })
                .collect(),
            attrs: ds.attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new()
            .with_coord("a", [1, 2])
            .unwrap()
            .with_coord("b", [10, 20, 30])
            .unwrap()
            .with_var("sum", ["a", "b"], [11, 21, 31, 12, 22, 32])
            .unwrap()
            .with_var("twice", ["a"], [2, 4])
            .unwrap()
            .with_attr("c", 3)
    }

    #[test]
    fn test_with_var_checks_shape() {
        let err = Dataset::new()
            .with_coord("a", [1, 2])
            .unwrap()
            .with_var("x", ["a"], [1, 2, 3])
            .unwrap_err();
        assert!(matches!(err, SweepError::ShapeMismatch { expected: 2, .. }));
    }

    #[test]
    fn test_with_var_unknown_dim() {
        let err = Dataset::new().with_var("x", ["a"], [1]).unwrap_err();
        assert!(matches!(err, SweepError::DimNotFound { .. }));
    }

    #[test]
    fn test_sel_drops_selected_dims() {
        let ds = sample().sel([("a", 2)]).unwrap();
        assert_eq!(ds.dims(), vec!["b"]);
        let sum = ds.var("sum").unwrap();
        assert_eq!(sum.dims(), &["b".to_string()]);
        assert_eq!(sum.values(), &[Value::Int(12), Value::Int(22), Value::Int(32)]);
        let twice = ds.var("twice").unwrap();
        assert_eq!(twice.shape(), &[] as &[usize]);
        assert_eq!(twice.values(), &[Value::Int(4)]);
        assert_eq!(ds.attr("c"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_get_scalar() {
        let ds = sample();
        assert_eq!(ds.get("sum", [("a", 1), ("b", 30)]).unwrap(), Value::Int(31));
        let err = ds.get("sum", [("a", 5), ("b", 30)]).unwrap_err();
        assert!(matches!(err, SweepError::CoordNotFound { .. }));
        let err = ds.get("nope", [("a", 1)]).unwrap_err();
        assert!(matches!(err, SweepError::VarNotFound { .. }));
    }

    #[test]
    fn test_json_roundtrip_keeps_missing() {
        let ds = Dataset::new()
            .with_coord("x", [0.0, 1.0])
            .unwrap()
            .with_var("y", ["x"], [Value::Float(1.5), Value::Missing])
            .unwrap();
        let json = serde_json::to_string(&ds).unwrap();
        assert!(json.contains("null"));
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.var("y").unwrap().dtype(), DType::Float);
        assert!(back.var("y").unwrap().values()[1].is_missing());
        assert_eq!(back.coord("x"), ds.coord("x"));
    }

    #[test]
    fn test_bad_json_shape_rejected() {
        let json = r#"{"coords": {"x": [1, 2]}, "vars": {"y": {"dims": ["x"], "values": [1]}}}"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }
}
