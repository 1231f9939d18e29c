//! Assembly of runner results into labeled datasets.
//!
//! The dense path ([`combos_to_ds`]) places results on the combination
//! grid directly. The sparse path ([`cases_to_ds`]) builds each axis from
//! the sorted union of the values seen across cases and scatters results
//! into a missing-filled grid, optionally merging into an existing dataset.

mod dense;
mod sparse;

pub use dense::{combo_runner_to_ds, combos_to_ds};
pub use sparse::{case_runner_to_ds, cases_to_ds};

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::dataset::{Coordinate, Dataset, dim_permutation};
use crate::error::{Result, SweepError};
use crate::grid::{compute_strides, unravel_index};
use crate::output::{self, Output, Schema};
use crate::value::Value;

/// Names, dims and coordinates of the variables a sweep produces.
///
/// With one variable the whole result of a call is that variable's value.
/// With several, each call must return a tuple with one entry per variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSpec {
    pub var_names: Vec<String>,
    /// Extra dims per variable, after the sweep dims. Empty when none are
    /// declared; a single entry applies to every variable.
    pub var_dims: Vec<Vec<String>>,
    /// Coordinates for extra dims
    pub var_coords: IndexMap<String, Vec<Value>>,
}

impl OutputSpec {
    pub fn new<I, S>(var_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            var_names: var_names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn single(var_name: impl Into<String>) -> Self {
        Self::new([var_name])
    }

    /// Declare extra dims per variable, one list per variable.
    #[must_use]
    pub fn with_dims<I, D, S>(mut self, var_dims: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.var_dims = var_dims
            .into_iter()
            .map(|dims| dims.into_iter().map(Into::into).collect())
            .collect();
        self
    }

    /// Declare the same extra dims for every variable.
    #[must_use]
    pub fn with_shared_dims<D, S>(mut self, dims: D) -> Self
    where
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.var_dims = vec![dims.into_iter().map(Into::into).collect()];
        self
    }

    #[must_use]
    pub fn with_coord<S, I, V>(mut self, dim: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.var_coords
            .insert(dim.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Check names and dims for internal consistency, and that every
    /// declared coordinate holds distinct values.
    pub fn validate(&self) -> Result<()> {
        if self.var_names.is_empty() {
            return Err(SweepError::NoVariables);
        }
        check_unique(self.var_names.iter())?;
        let (vars, dims) = (self.var_names.len(), self.var_dims.len());
        if dims > 1 && dims != vars {
            return Err(SweepError::VarDimsMismatch { vars, dims });
        }
        for dims in &self.var_dims {
            check_unique(dims.iter())?;
        }
        for (dim, values) in &self.var_coords {
            Coordinate::new(dim, values.clone())?;
        }
        Ok(())
    }

    /// Validate, and check that no variable or extra dim reuses a sweep
    /// argument name.
    pub(crate) fn validate_against<'a>(&self, args: impl Iterator<Item = &'a str>) -> Result<()> {
        self.validate()?;
        for arg in args {
            let clash = self.var_names.iter().any(|v| v == arg)
                || self.var_dims.iter().flatten().any(|d| d == arg);
            if clash {
                return Err(SweepError::DuplicateName {
                    name: arg.to_string(),
                });
            }
        }
        Ok(())
    }

    fn declared_dims(&self, var: usize) -> &[String] {
        match self.var_dims.len() {
            0 => &[],
            1 => &self.var_dims[0],
            _ => &self.var_dims[var],
        }
    }

    /// Work out every variable's full dims, and the coordinates of the
    /// extra dims, from the schema of the first result.
    pub(crate) fn layout(
        &self,
        outer_dims: &[String],
        schema: Option<&Schema>,
        existing: Option<&Dataset>,
    ) -> Result<Layout> {
        let k = self.var_names.len();
        let fields: Vec<Option<&Schema>> = match schema {
            None => vec![None; k],
            Some(schema) if k == 1 => vec![Some(schema)],
            Some(Schema::Tuple(items)) if items.len() == k => items.iter().map(Some).collect(),
            Some(other) => {
                return Err(SweepError::SchemaMismatch {
                    index: 0,
                    expected: format!("tuple of {k}"),
                    found: other.to_string(),
                });
            }
        };

        let mut extra_coords: IndexMap<String, Coordinate> = IndexMap::new();
        let mut vars = Vec::with_capacity(k);
        for (i, (name, field)) in self.var_names.iter().zip(fields).enumerate() {
            let declared = self.declared_dims(i);
            let extra_shape: Vec<usize> = match field {
                None => declared
                    .iter()
                    .map(|d| self.var_coords.get(d).map_or(0, Vec::len))
                    .collect(),
                Some(Schema::Scalar) if declared.is_empty() => Vec::new(),
                Some(Schema::Array(shape)) if declared.is_empty() || declared.len() == shape.len() => {
                    shape.clone()
                }
                Some(other) => {
                    let expected = if declared.is_empty() {
                        "scalar or array".to_string()
                    } else {
                        format!("array over {declared:?}")
                    };
                    return Err(SweepError::SchemaMismatch {
                        index: 0,
                        expected,
                        found: other.to_string(),
                    });
                }
            };
            let extra_dims: Vec<String> = if declared.is_empty() {
                (0..extra_shape.len())
                    .map(|d| format!("{name}_dim_{d}"))
                    .collect()
            } else {
                declared.to_vec()
            };

            for (dim, &len) in extra_dims.iter().zip(&extra_shape) {
                if outer_dims.contains(dim) {
                    return Err(SweepError::DuplicateName { name: dim.clone() });
                }
                if let Some(coord) = extra_coords.get(dim) {
                    check_dim_len(dim, coord.len(), len)?;
                    continue;
                }
                let coord = self.extra_coord(dim, len, existing)?;
                extra_coords.insert(dim.clone(), coord);
            }

            let mut dims = outer_dims.to_vec();
            dims.extend(extra_dims);
            vars.push(VarLayout {
                name: name.clone(),
                dims,
                extra_shape,
            });
        }

        // Coordinates given for dims no variable uses are still recorded
        for (dim, values) in &self.var_coords {
            if !extra_coords.contains_key(dim) && !outer_dims.contains(dim) {
                extra_coords.insert(dim.clone(), Coordinate::new(dim, values.clone())?);
            }
        }

        Ok(Layout { vars, extra_coords })
    }

    fn extra_coord(&self, dim: &str, len: usize, existing: Option<&Dataset>) -> Result<Coordinate> {
        if let Some(values) = self.var_coords.get(dim) {
            check_dim_len(dim, values.len(), len)?;
            return Coordinate::new(dim, values.clone());
        }
        if let Some(coord) = existing.and_then(|ds| ds.coord(dim)) {
            check_dim_len(dim, coord.len(), len)?;
            return Ok(coord.clone());
        }
        Ok(Coordinate::range(len))
    }
}

fn check_unique<'a>(names: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(SweepError::DuplicateName { name: name.clone() });
        }
    }
    Ok(())
}

fn check_dim_len(dim: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SweepError::ShapeMismatch {
            what: format!("length of dim '{dim}'"),
            expected,
            found,
        })
    }
}

/// Full dims of one output variable, sweep dims first.
#[derive(Debug)]
pub(crate) struct VarLayout {
    pub name: String,
    pub dims: Vec<String>,
    /// Shape of the array each call contributes
    pub extra_shape: Vec<usize>,
}

impl VarLayout {
    fn extra_dims(&self) -> &[String] {
        &self.dims[self.dims.len() - self.extra_shape.len()..]
    }
}

#[derive(Debug)]
pub(crate) struct Layout {
    pub vars: Vec<VarLayout>,
    pub extra_coords: IndexMap<String, Coordinate>,
}

/// Per-variable value lists, one entry per result.
fn split_fields(results: Vec<Output>, nvars: usize) -> Result<Vec<Vec<Vec<Value>>>> {
    if nvars == 1 {
        return Ok(vec![results.into_iter().map(Output::into_values).collect()]);
    }
    Ok(output::split_outputs(results)?
        .into_iter()
        .map(|field| field.into_iter().map(Output::into_values).collect())
        .collect())
}

/// Write each result's values into the variables of `ds`, then re-infer
/// the dtypes.
///
/// `targets` holds, per result, its position along each sweep dim of `ds`.
/// Extra-dim values are placed by coordinate label, and cells are addressed
/// by dim name, so an existing variable may list its dims in another order.
fn write_results(
    ds: &mut Dataset,
    layout: &Layout,
    results: Vec<Output>,
    targets: &[Vec<usize>],
) -> Result<()> {
    let fields = split_fields(results, layout.vars.len())?;
    for (var_layout, field) in layout.vars.iter().zip(fields) {
        let extra_positions = extra_positions(ds, layout, var_layout)?;
        let extra_strides = compute_strides(&var_layout.extra_shape);
        let extra_len: usize = var_layout.extra_shape.iter().product();

        let var = ds
            .var_mut(&var_layout.name)
            .ok_or_else(|| SweepError::VarNotFound {
                name: var_layout.name.clone(),
            })?;
        let axes = dim_permutation(var.dims(), &var_layout.dims).ok_or_else(|| {
            SweepError::DimsConflict {
                name: var_layout.name.clone(),
                existing: var.dims().to_vec(),
                found: var_layout.dims.clone(),
            }
        })?;

        let (dims, shape) = (var.dims().to_vec(), var.shape().to_vec());
        let mut index = vec![0; axes.len()];
        for (outer, values) in targets.iter().zip(field) {
            if values.len() != extra_len {
                return Err(SweepError::ShapeMismatch {
                    what: format!("values per call for variable '{}'", var_layout.name),
                    expected: extra_len,
                    found: values.len(),
                });
            }
            for (&axis, &pos) in axes.iter().zip(outer) {
                index[axis] = pos;
            }
            for (offset, value) in values.into_iter().enumerate() {
                let extra = unravel_index(&extra_strides, offset);
                for ((&axis, positions), i) in axes[outer.len()..]
                    .iter()
                    .zip(&extra_positions)
                    .zip(extra)
                {
                    index[axis] = positions[i];
                }
                let Some(cell) = var.data_mut().get_mut(&index) else {
                    return Err(out_of_bounds(&var_layout.name, &dims, &shape, &index));
                };
                *cell = value;
            }
        }
        var.refresh_dtype();
    }
    Ok(())
}

fn out_of_bounds(name: &str, dims: &[String], shape: &[usize], index: &[usize]) -> SweepError {
    let axis = index
        .iter()
        .zip(shape)
        .position(|(i, len)| i >= len)
        .unwrap_or_default();
    SweepError::ShapeMismatch {
        what: format!(
            "length of dim '{}' in variable '{name}'",
            dims.get(axis).map_or("", String::as_str)
        ),
        expected: shape.get(axis).copied().unwrap_or_default(),
        found: index.get(axis).map_or(0, |i| i + 1),
    }
}

/// For every extra dim of a variable, where each label of the layout
/// coordinate sits on the dataset's coordinate.
fn extra_positions(ds: &Dataset, layout: &Layout, var: &VarLayout) -> Result<Vec<Vec<usize>>> {
    var.extra_dims()
        .iter()
        .map(|dim| {
            let target = ds.require_coord(dim)?;
            let Some(source) = layout.extra_coords.get(dim) else {
                return Err(SweepError::DimNotFound { dim: dim.clone() });
            };
            source
                .values()
                .iter()
                .map(|value| {
                    target
                        .position(value)
                        .ok_or_else(|| SweepError::CoordNotFound {
                            dim: dim.clone(),
                            value: value.to_string(),
                        })
                })
                .collect()
        })
        .collect()
}

/// Record the run constants as dataset attributes.
fn set_constant_attrs(ds: &mut Dataset, constants: &IndexMap<String, Value>) {
    for (name, value) in constants {
        ds.set_attr(name.clone(), value.clone());
    }
}
