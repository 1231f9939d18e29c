//! Figure planning: selectors, series, ranges and facets.

mod figure;
pub mod format;
mod spec;

pub use figure::{Facet, Figure, Series};
pub use spec::{PlotKind, PlotSpec};

use gridsweep_core::auto_xyz_ds;

use crate::error::Result;

/// Line plot of raw series, one line per entry of `ys`.
///
/// Without `x` the points are plotted against their index.
pub fn auto_lineplot(x: Option<&[f64]>, ys: &[Vec<f64>]) -> Result<Figure> {
    auto_plot(x, ys, PlotSpec::line("x", "y"))
}

/// Scatter plot of raw series, one marker set per entry of `ys`.
pub fn auto_scatter(x: Option<&[f64]>, ys: &[Vec<f64>]) -> Result<Figure> {
    auto_plot(x, ys, PlotSpec::scatter("x", "y"))
}

fn auto_plot(x: Option<&[f64]>, ys: &[Vec<f64>], spec: PlotSpec) -> Result<Figure> {
    let ds = auto_xyz_ds(x, ys)?;
    let spec = if ys.len() > 1 { spec.with_z("z") } else { spec };
    Figure::plan(&ds, &spec)
}
