use crate::args::Args;
use crate::combo::{Combos, combo_runner};
use crate::dataset::{Coordinate, Dataset, Variable};
use crate::error::{BoxError, Result, SweepError};
use crate::execute::RunOptions;
use crate::grid::{GridIndices, SweepGrid};
use crate::output::{Output, Schema};

use super::{OutputSpec, set_constant_attrs, write_results};

/// Wrap combination results, in grid order, into a dataset whose
/// coordinates are the combination axes.
pub fn combos_to_ds<O>(results: Vec<O>, combos: &Combos, spec: &OutputSpec) -> Result<Dataset>
where
    O: Into<Output>,
{
    combos.validate()?;
    spec.validate_against(combos.names())?;
    if results.len() != combos.total_points() {
        return Err(SweepError::ShapeMismatch {
            what: "number of results for the combination grid".to_string(),
            expected: combos.total_points(),
            found: results.len(),
        });
    }

    let results: Vec<Output> = results.into_iter().map(Into::into).collect();
    let schema = Schema::classify(&results)?;
    let outer_dims: Vec<String> = combos.names().map(str::to_string).collect();
    let layout = spec.layout(&outer_dims, schema.as_ref(), None)?;

    let mut ds = Dataset::new();
    for (name, values) in combos.axes() {
        ds.set_coord(name.clone(), Coordinate::new(name, values.clone())?);
    }
    for (name, coord) in &layout.extra_coords {
        ds.set_coord(name.clone(), coord.clone());
    }
    for var in &layout.vars {
        let shape = ds.shape_of(&var.dims)?;
        ds.insert_var(var.name.clone(), Variable::missing(var.dims.clone(), shape))?;
    }

    let targets: Vec<Vec<usize>> = GridIndices::new(&combos.shape()).collect();
    write_results(&mut ds, &layout, results, &targets)?;
    tracing::debug!(
        vars = layout.vars.len(),
        points = targets.len(),
        "assembled combination dataset"
    );
    Ok(ds)
}

/// Run a combination sweep and assemble the results into a dataset.
///
/// The output spec is checked against the axes before any call is made. Run
/// constants are recorded as dataset attributes.
pub fn combo_runner_to_ds<F, O, E>(
    f: F,
    combos: &Combos,
    spec: &OutputSpec,
    options: &RunOptions,
) -> Result<Dataset>
where
    F: Fn(&Args) -> std::result::Result<O, E> + Sync,
    O: Into<Output>,
    E: Into<BoxError>,
{
    combos.validate()?;
    spec.validate_against(combos.names())?;

    let grid: SweepGrid<Output> = combo_runner(|args| f(args).map(Into::into), combos, options)?;
    let mut ds = combos_to_ds(grid.into_data(), combos, spec)?;
    set_constant_attrs(&mut ds, &options.constants);
    Ok(ds)
}
