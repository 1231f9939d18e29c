use rustc_hash::FxHashSet;

use crate::args::Args;
use crate::case::{Cases, case_runner};
use crate::dataset::{Coordinate, Dataset, Variable, dim_permutation};
use crate::error::{BoxError, Result, SweepError};
use crate::execute::RunOptions;
use crate::grid::compute_strides;
use crate::output::{Output, Schema};
use crate::value::sorted_union;

use super::{OutputSpec, set_constant_attrs, write_results};

/// Scatter case results into a dataset.
///
/// Each case argument becomes a dimension whose coordinate is the sorted
/// union of the values seen across the cases. Cells no case addresses hold
/// the missing sentinel. When two cases share coordinates the later result
/// wins and a warning is logged.
///
/// With `add_to`, results are merged into that dataset instead: it is first
/// outer-aligned to the new case coordinates, then only the addressed cells
/// are overwritten.
pub fn cases_to_ds<O>(
    results: Vec<O>,
    cases: &Cases,
    spec: &OutputSpec,
    add_to: Option<Dataset>,
) -> Result<Dataset>
where
    O: Into<Output>,
{
    spec.validate_against(cases.names().iter().map(String::as_str))?;
    if results.len() != cases.len() {
        return Err(SweepError::ShapeMismatch {
            what: "number of results for the cases".to_string(),
            expected: cases.len(),
            found: results.len(),
        });
    }

    let results: Vec<Output> = results.into_iter().map(Into::into).collect();
    let schema = Schema::classify(&results)?;
    let outer_dims = cases.names();
    let mut ds = add_to.unwrap_or_default();
    let layout = spec.layout(outer_dims, schema.as_ref(), Some(&ds))?;

    for (field, dim) in outer_dims.iter().enumerate() {
        let seen = cases.axis_values(field);
        match ds.coord(dim) {
            Some(existing) => {
                let union = sorted_union(existing.values().iter().chain(&seen));
                let coord = Coordinate::new(dim, union)?;
                ds.reindex_mut(dim, coord)?;
            }
            None => ds.set_coord(dim.clone(), Coordinate::new(dim, seen)?),
        }
    }
    for (name, coord) in &layout.extra_coords {
        match ds.coord(name) {
            Some(existing) if coord.values().iter().all(|v| existing.position(v).is_some()) => {}
            Some(existing) => {
                let union = sorted_union(existing.values().iter().chain(coord.values()));
                let union = Coordinate::new(name, union)?;
                ds.reindex_mut(name, union)?;
            }
            None => ds.set_coord(name.clone(), coord.clone()),
        }
    }

    for var in &layout.vars {
        match ds.var(&var.name) {
            Some(existing) if dim_permutation(existing.dims(), &var.dims).is_some() => {}
            Some(existing) => {
                return Err(SweepError::DimsConflict {
                    name: var.name.clone(),
                    existing: existing.dims().to_vec(),
                    found: var.dims.clone(),
                });
            }
            None => {
                let shape = ds.shape_of(&var.dims)?;
                ds.insert_var(var.name.clone(), Variable::missing(var.dims.clone(), shape))?;
            }
        }
    }

    let targets = case_targets(&ds, cases)?;
    write_results(&mut ds, &layout, results, &targets)?;
    tracing::debug!(
        vars = layout.vars.len(),
        cases = cases.len(),
        "assembled case dataset"
    );
    Ok(ds)
}

/// Position of every case along each case dim of `ds`.
fn case_targets(ds: &Dataset, cases: &Cases) -> Result<Vec<Vec<usize>>> {
    let coords: Vec<&Coordinate> = cases
        .names()
        .iter()
        .map(|dim| ds.require_coord(dim))
        .collect::<Result<_>>()?;
    let shape: Vec<usize> = coords.iter().map(|c| c.len()).collect();
    let strides = compute_strides(&shape);

    let mut seen = FxHashSet::default();
    let mut targets = Vec::with_capacity(cases.len());
    for (case, row) in cases.rows().iter().enumerate() {
        let position: Vec<usize> = cases
            .names()
            .iter()
            .zip(&coords)
            .zip(row)
            .map(|((dim, coord), value)| {
                coord
                    .position(value)
                    .ok_or_else(|| SweepError::CoordNotFound {
                        dim: dim.clone(),
                        value: value.to_string(),
                    })
            })
            .collect::<Result<_>>()?;
        let flat: usize = position.iter().zip(&strides).map(|(p, s)| p * s).sum();
        if !seen.insert(flat) {
            let point: Vec<String> = row.iter().map(ToString::to_string).collect();
            tracing::warn!(
                case,
                point = point.join(", "),
                "duplicate case coordinates, keeping the later result"
            );
        }
        targets.push(position);
    }
    Ok(targets)
}

/// Run a case sweep and assemble the results, optionally merging them into
/// `add_to`.
///
/// The output spec is checked against the case arguments before any call is made.
/// Run constants are recorded as dataset attributes.
pub fn case_runner_to_ds<F, O, E>(
    f: F,
    cases: &Cases,
    spec: &OutputSpec,
    options: &RunOptions,
    add_to: Option<Dataset>,
) -> Result<Dataset>
where
    F: Fn(&Args) -> std::result::Result<O, E> + Sync,
    O: Into<Output>,
    E: Into<BoxError>,
{
    spec.validate_against(cases.names().iter().map(String::as_str))?;

    let results: Vec<Output> = case_runner(|args| f(args).map(Into::into), cases, options)?;
    let mut ds = cases_to_ds(results, cases, spec, add_to)?;
    set_constant_attrs(&mut ds, &options.constants);
    Ok(ds)
}
