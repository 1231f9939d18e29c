use crate::error::{Result, SweepError};
use crate::grid::SweepGrid;
use crate::value::{DType, Value};

use super::{Coordinate, take};

/// A single variable together with the coordinates of its dims.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    dims: Vec<String>,
    coords: Vec<Coordinate>,
    dtype: DType,
    data: SweepGrid<Value>,
}

impl DataArray {
    pub(crate) fn new(
        name: String,
        dims: Vec<String>,
        coords: Vec<Coordinate>,
        dtype: DType,
        data: SweepGrid<Value>,
    ) -> Self {
        Self {
            name,
            dims,
            coords,
            dtype,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|i| &self.coords[i])
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn values(&self) -> &[Value] {
        self.data.data()
    }

    pub fn get(&self, indices: &[usize]) -> Option<&Value> {
        self.data.get(indices)
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.values()
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Select single coordinate values; every selector dim must belong to
    /// this array.
    pub fn sel<I, S, V>(&self, selectors: I) -> Result<DataArray>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let mut fixed: Vec<Option<usize>> = vec![None; self.dims.len()];
        for (dim, value) in selectors {
            let dim = dim.as_ref();
            let value = value.into();
            let axis = self
                .dims
                .iter()
                .position(|d| d == dim)
                .ok_or_else(|| SweepError::DimNotFound {
                    dim: dim.to_string(),
                })?;
            let pos = self.coords[axis]
                .position(&value)
                .ok_or_else(|| SweepError::CoordNotFound {
                    dim: dim.to_string(),
                    value: value.to_string(),
                })?;
            fixed[axis] = Some(pos);
        }

        let (dims, coords): (Vec<String>, Vec<Coordinate>) = self
            .dims
            .iter()
            .zip(&self.coords)
            .zip(&fixed)
            .filter(|(_, f)| f.is_none())
            .map(|((d, c), _)| (d.clone(), c.clone()))
            .unzip();

        Ok(DataArray {
            name: self.name.clone(),
            dims,
            coords,
            dtype: self.dtype,
            data: take(&self.data, &fixed)?,
        })
    }

    /// The single value of a one-element array.
    pub fn item(&self) -> Result<Value> {
        match self.values() {
            [value] => Ok(value.clone()),
            _ => Err(SweepError::NotScalar {
                shape: self.shape().to_vec(),
            }),
        }
    }
}
