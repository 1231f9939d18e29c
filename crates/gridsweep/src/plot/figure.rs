//! Turning a dataset and a [`PlotSpec`] into drawable series.
//!
//! Planning is backend independent: a [`Figure`] holds finite points in plot
//! space (log axes already transformed), shared axis ranges, and one
//! [`Facet`] per sub-plot with its titles and tick-label visibility decided.

use gridsweep_core::{Coordinate, Dataset, Value, Variable};

use super::format::prettify;
use super::spec::{PlotKind, PlotSpec};
use crate::error::{PlotError, Result};

/// Above this many series a single plot drops its legend.
const MAX_LEGEND_SERIES: usize = 10;

/// Fraction of the data span added above and below the y range.
const Y_PADDING: f64 = 0.05;

/// One line or set of markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Prettified z value, `None` for the only series of an unsplit plot
    pub label: Option<String>,
    /// `(x, y)` points with both coordinates finite
    pub points: Vec<(f64, f64)>,
    /// Error bar half-heights, parallel to `points`; empty without `y_err`
    pub errors: Vec<f64>,
}

impl Series {
    /// Lower and upper ends of each error bar, in plot space.
    pub fn error_bars(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.points
            .iter()
            .zip(&self.errors)
            .map(|(&(x, y), &e)| (x, y - e, y + e))
    }
}

/// One sub-plot of a faceted figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub row: usize,
    pub col: usize,
    /// `"{col} = {value}"` on the first row of a column-faceted figure
    pub title: Option<String>,
    pub xtitle: Option<String>,
    pub ytitle: Option<String>,
    /// Draw the y title on the right, used for row titles
    pub ytitle_right: bool,
    pub hide_xticklabels: bool,
    pub hide_yticklabels: bool,
    pub series: Vec<Series>,
}

/// A planned figure: every facet shares the same axis ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub kind: PlotKind,
    pub nrows: usize,
    pub ncols: usize,
    /// Facets in row-major order
    pub facets: Vec<Facet>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub xlog: bool,
    pub ylog: bool,
    pub legend: bool,
    /// Name of the dimension the legend entries are values of
    pub legend_title: Option<String>,
    /// Reference lines in plot space
    pub hlines: Vec<f64>,
    pub vlines: Vec<f64>,
}

/// Role of each dimension of the plotted variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    X,
    Z,
    Row,
    Col,
    /// Length-one dimension, always index 0
    Squeeze,
}

/// Position along each role's dimension for one cell lookup.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    x: usize,
    z: usize,
    row: usize,
    col: usize,
}

impl Cursor {
    fn index(&self, role: Role) -> usize {
        match role {
            Role::X => self.x,
            Role::Z => self.z,
            Role::Row => self.row,
            Role::Col => self.col,
            Role::Squeeze => 0,
        }
    }
}

/// A variable with its dims mapped to roles.
struct Mapped<'a> {
    var: &'a Variable,
    roles: Vec<Role>,
}

impl Mapped<'_> {
    fn value(&self, cursor: &Cursor) -> f64 {
        let idx: Vec<usize> = self.roles.iter().map(|&r| cursor.index(r)).collect();
        self.var.data().get(&idx).map_or(f64::NAN, plot_value)
    }
}

/// Numeric position of a stored value; bools plot as 0/1, anything
/// non-numeric is dropped.
fn plot_value(value: &Value) -> f64 {
    match value {
        Value::Bool(b) => f64::from(u8::from(*b)),
        other => other.as_f64().unwrap_or(f64::NAN),
    }
}

fn to_plot_space(v: f64, log: bool) -> f64 {
    if !log {
        v
    } else if v > 0.0 {
        v.log10()
    } else {
        f64::NAN
    }
}

impl Figure {
    /// Plan a figure for `spec` over `ds`.
    ///
    /// # Errors
    ///
    /// Fails when a selector names a missing variable or dimension, when two
    /// selectors share a dimension, or when `y` has a dimension longer than
    /// one that no selector covers.
    pub fn plan(ds: &Dataset, spec: &PlotSpec) -> Result<Figure> {
        let selectors: Vec<&str> = spec.selectors().collect();
        for (i, dim) in selectors.iter().enumerate() {
            if selectors[..i].contains(dim) {
                return Err(PlotError::DuplicateSelector {
                    dim: (*dim).to_string(),
                });
            }
        }

        let y = map_roles(ds, &spec.y, spec, true)?;
        let y_err = spec
            .y_err
            .as_deref()
            .map(|name| map_roles(ds, name, spec, false))
            .transpose()?;

        let x_coord = ds.coord(&spec.x).ok_or_else(|| PlotError::DimNotFound {
            var: spec.y.clone(),
            dim: spec.x.clone(),
        })?;
        let xs: Vec<f64> = x_coord
            .to_f64_vec()
            .into_iter()
            .map(|x| to_plot_space(x, spec.xlog))
            .collect();
        let z_coord = spec.z.as_deref().and_then(|z| ds.coord(z));
        let row_coord = spec.row.as_deref().and_then(|r| ds.coord(r));
        let col_coord = spec.col.as_deref().and_then(|c| ds.coord(c));

        let nrows = row_coord.map_or(1, Coordinate::len);
        let ncols = col_coord.map_or(1, Coordinate::len);
        let nz = z_coord.map_or(1, Coordinate::len);
        let faceted = spec.row.is_some() || spec.col.is_some();

        let mut facets = Vec::with_capacity(nrows * ncols);
        for row in 0..nrows {
            for col in 0..ncols {
                let series = (0..nz)
                    .map(|z| {
                        let cursor = Cursor { x: 0, z, row, col };
                        let label = z_coord.map(|c| prettify(&c.values()[z]));
                        collect_series(&xs, &y, y_err.as_ref(), cursor, spec.ylog, label)
                    })
                    .collect();
                let mut facet = Facet {
                    row,
                    col,
                    title: None,
                    xtitle: Some(spec.x.clone()),
                    ytitle: Some(spec.y.clone()),
                    ytitle_right: false,
                    hide_xticklabels: false,
                    hide_yticklabels: false,
                    series,
                };
                if faceted {
                    label_facet(&mut facet, spec, nrows, ncols, row_coord, col_coord);
                } else {
                    facet.title.clone_from(&spec.title);
                }
                facets.push(facet);
            }
        }

        let (x_range, y_range) = data_ranges(&facets, spec);
        let legend = spec.legend.unwrap_or(!faceted && spec.z.is_some() && nz <= MAX_LEGEND_SERIES);

        tracing::debug!(
            var = %spec.y,
            nrows,
            ncols,
            series = nz,
            "planned figure"
        );

        Ok(Figure {
            title: if faceted { spec.title.clone() } else { None },
            kind: spec.kind,
            nrows,
            ncols,
            facets,
            x_range,
            y_range,
            xlog: spec.xlog,
            ylog: spec.ylog,
            legend: legend && !faceted,
            legend_title: spec.z.clone(),
            hlines: spec
                .hlines
                .iter()
                .map(|&v| to_plot_space(v, spec.ylog))
                .filter(|v| v.is_finite())
                .collect(),
            vlines: spec
                .vlines
                .iter()
                .map(|&v| to_plot_space(v, spec.xlog))
                .filter(|v| v.is_finite())
                .collect(),
        })
    }

    /// Facet at grid position `(row, col)`.
    pub fn facet(&self, row: usize, col: usize) -> Option<&Facet> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.facets.get(row * self.ncols + col)
    }

    /// Total number of plotted points across every facet and series.
    pub fn point_count(&self) -> usize {
        self.facets
            .iter()
            .flat_map(|f| &f.series)
            .map(|s| s.points.len())
            .sum()
    }
}

/// Map each dimension of variable `name` to the selector that covers it.
///
/// For the plotted variable (`strict`) the x dimension must be present;
/// an error variable may omit any selector dimension it does not vary over.
fn map_roles<'a>(ds: &'a Dataset, name: &str, spec: &PlotSpec, strict: bool) -> Result<Mapped<'a>> {
    let var = ds.var(name).ok_or_else(|| PlotError::VarNotFound {
        name: name.to_string(),
    })?;

    if strict {
        for dim in spec.selectors() {
            if !var.dims().iter().any(|d| d == dim) {
                return Err(PlotError::DimNotFound {
                    var: name.to_string(),
                    dim: dim.to_string(),
                });
            }
        }
    }

    let mut unplotted = Vec::new();
    let roles = var
        .dims()
        .iter()
        .zip(var.shape())
        .map(|(dim, &len)| {
            let dim = Some(dim.as_str());
            if dim == Some(spec.x.as_str()) {
                Role::X
            } else if dim == spec.z.as_deref() {
                Role::Z
            } else if dim == spec.row.as_deref() {
                Role::Row
            } else if dim == spec.col.as_deref() {
                Role::Col
            } else {
                if len != 1 {
                    unplotted.extend(dim.map(str::to_string));
                }
                Role::Squeeze
            }
        })
        .collect();

    if !unplotted.is_empty() {
        return Err(PlotError::UnplottedDims {
            var: name.to_string(),
            dims: unplotted,
        });
    }
    Ok(Mapped { var, roles })
}

fn collect_series(
    xs: &[f64],
    y: &Mapped<'_>,
    y_err: Option<&Mapped<'_>>,
    mut cursor: Cursor,
    ylog: bool,
    label: Option<String>,
) -> Series {
    let mut points = Vec::new();
    let mut errors = Vec::new();
    for (i, &x) in xs.iter().enumerate() {
        cursor.x = i;
        let raw = y.value(&cursor);
        let yv = to_plot_space(raw, ylog);
        if !x.is_finite() || !yv.is_finite() {
            continue;
        }
        points.push((x, yv));
        if let Some(err) = y_err {
            let e = err.value(&cursor).abs();
            // Error bars are symmetric in data space; on a log axis use the
            // upper end, which is always positive.
            let e = if ylog { (raw + e).log10() - yv } else { e };
            errors.push(if e.is_finite() { e } else { 0.0 });
        }
    }
    Series {
        label,
        points,
        errors,
    }
}

fn label_facet(
    facet: &mut Facet,
    spec: &PlotSpec,
    nrows: usize,
    ncols: usize,
    row_coord: Option<&Coordinate>,
    col_coord: Option<&Coordinate>,
) {
    let (i, j) = (facet.row, facet.col);
    if i != nrows - 1 {
        facet.hide_xticklabels = true;
        facet.xtitle = None;
    }
    if j != 0 {
        facet.hide_yticklabels = true;
        facet.ytitle = None;
    }
    if let (0, Some(col), Some(coord)) = (i, spec.col.as_deref(), col_coord) {
        facet.title = Some(format!("{col} = {}", prettify(&coord.values()[j])));
    }
    if let (true, Some(row), Some(coord)) = (j == ncols - 1, spec.row.as_deref(), row_coord) {
        facet.ytitle = Some(format!("{row} = {}", prettify(&coord.values()[i])));
        facet.ytitle_right = true;
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Shared ranges over every facet, widened for error bars and reference
/// lines, with explicit limits taking precedence.
fn data_ranges(facets: &[Facet], spec: &PlotSpec) -> ((f64, f64), (f64, f64)) {
    let series = || facets.iter().flat_map(|f| &f.series);

    let x_range = extent(
        series()
            .flat_map(|s| s.points.iter().map(|p| p.0))
            .chain(spec.vlines.iter().map(|&v| to_plot_space(v, spec.xlog))),
    )
    .map_or((0.0, 1.0), widen_degenerate);

    let y_range = extent(
        series()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .chain(series().flat_map(|s| s.error_bars().flat_map(|(_, lo, hi)| [lo, hi])))
            .chain(spec.hlines.iter().map(|&v| to_plot_space(v, spec.ylog))),
    )
    .map_or((0.0, 1.0), |(lo, hi)| {
        let (lo, hi) = widen_degenerate((lo, hi));
        let pad = (hi - lo) * Y_PADDING;
        (lo - pad, hi + pad)
    });

    let limit = |lims: Option<(f64, f64)>, log: bool, fallback: (f64, f64)| match lims {
        Some((lo, hi)) => {
            let (lo, hi) = (to_plot_space(lo, log), to_plot_space(hi, log));
            if lo.is_finite() && hi.is_finite() && lo < hi {
                (lo, hi)
            } else {
                fallback
            }
        }
        None => fallback,
    };

    (
        limit(spec.xlims, spec.xlog, x_range),
        limit(spec.ylims, spec.ylog, y_range),
    )
}

fn widen_degenerate((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        let half = if lo == 0.0 { 0.5 } else { lo.abs() * 0.1 };
        (lo - half, hi + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_ds() -> Dataset {
        // sum(a, b, c) = a + b + c
        let a: [i32; 3] = [1, 2, 3];
        let b: [i32; 2] = [10, 20];
        let c: [i32; 2] = [100, 200];
        let mut values = Vec::new();
        for a in a {
            for b in b {
                for c in c {
                    values.push(f64::from(a + b + c));
                }
            }
        }
        Dataset::new()
            .with_coord("a", a)
            .unwrap()
            .with_coord("b", b)
            .unwrap()
            .with_coord("c", c)
            .unwrap()
            .with_var("sum", ["a", "b", "c"], values)
            .unwrap()
    }

    #[test]
    fn test_single_series_skips_missing_points() {
        let ds = Dataset::new()
            .with_coord("t", [0.0, 1.0, 2.0, 3.0])
            .unwrap()
            .with_var("v", ["t"], [1.0, f64::NAN, 3.0, 4.0])
            .unwrap();
        let fig = Figure::plan(&ds, &PlotSpec::line("t", "v")).unwrap();
        assert_eq!((fig.nrows, fig.ncols), (1, 1));
        assert!(!fig.legend);
        let series = &fig.facets[0].series;
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, None);
        assert_eq!(series[0].points, vec![(0.0, 1.0), (2.0, 3.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_one_series_per_z_value() {
        let ds = grid_ds().sel([("c", 100)]).unwrap();
        let fig = Figure::plan(&ds, &PlotSpec::line("a", "sum").with_z("b")).unwrap();
        let series = &fig.facets[0].series;
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label.as_deref(), Some("10"));
        assert_eq!(series[1].points, vec![(1.0, 121.0), (2.0, 122.0), (3.0, 123.0)]);
        assert!(fig.legend);
        assert_eq!(fig.legend_title.as_deref(), Some("b"));
    }

    #[test]
    fn test_shared_ranges_cover_all_facets() {
        let spec = PlotSpec::line("a", "sum").with_z("b").with_col("c");
        let fig = Figure::plan(&grid_ds(), &spec).unwrap();
        assert_eq!((fig.nrows, fig.ncols), (1, 2));
        assert_eq!(fig.x_range, (1.0, 3.0));
        let pad = (223.0 - 111.0) * Y_PADDING;
        assert_relative_eq!(fig.y_range.0, 111.0 - pad);
        assert_relative_eq!(fig.y_range.1, 223.0 + pad);
        assert!(!fig.legend);
    }

    #[test]
    fn test_facet_labels_follow_grid_position() {
        let spec = PlotSpec::line("a", "sum").with_row("b").with_col("c");
        let fig = Figure::plan(&grid_ds(), &spec).unwrap();
        assert_eq!((fig.nrows, fig.ncols), (2, 2));

        let top_left = fig.facet(0, 0).unwrap();
        assert_eq!(top_left.title.as_deref(), Some("c = 100"));
        assert!(top_left.hide_xticklabels);
        assert!(!top_left.hide_yticklabels);
        assert_eq!(top_left.ytitle.as_deref(), Some("sum"));

        let top_right = fig.facet(0, 1).unwrap();
        assert_eq!(top_right.title.as_deref(), Some("c = 200"));
        assert!(top_right.hide_yticklabels);
        assert_eq!(top_right.ytitle.as_deref(), Some("b = 10"));
        assert!(top_right.ytitle_right);

        let bottom_left = fig.facet(1, 0).unwrap();
        assert_eq!(bottom_left.title, None);
        assert!(!bottom_left.hide_xticklabels);
        assert_eq!(bottom_left.xtitle.as_deref(), Some("a"));

        let bottom_right = fig.facet(1, 1).unwrap();
        assert_eq!(bottom_right.ytitle.as_deref(), Some("b = 20"));
        assert_eq!(bottom_right.series[0].points[0], (1.0, 221.0));
    }

    #[test]
    fn test_unplotted_dims_rejected() {
        let err = Figure::plan(&grid_ds(), &PlotSpec::line("a", "sum")).unwrap_err();
        match err {
            PlotError::UnplottedDims { dims, .. } => assert_eq!(dims, vec!["b", "c"]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_length_one_dims_are_squeezed() {
        let ds = grid_ds()
            .reindex("b", [10])
            .unwrap()
            .reindex("c", [200])
            .unwrap();
        let fig = Figure::plan(&ds, &PlotSpec::scatter("a", "sum")).unwrap();
        assert_eq!(fig.point_count(), 3);
        assert_eq!(fig.kind, PlotKind::Scatter);
    }

    #[test]
    fn test_selector_errors() {
        let ds = grid_ds();
        assert!(matches!(
            Figure::plan(&ds, &PlotSpec::line("a", "nope")),
            Err(PlotError::VarNotFound { .. })
        ));
        assert!(matches!(
            Figure::plan(&ds, &PlotSpec::line("a", "sum").with_z("q")),
            Err(PlotError::DimNotFound { .. })
        ));
        assert!(matches!(
            Figure::plan(&ds, &PlotSpec::line("a", "sum").with_z("a")),
            Err(PlotError::DuplicateSelector { .. })
        ));
    }

    #[test]
    fn test_log_axis_drops_non_positive() {
        let ds = Dataset::new()
            .with_coord("x", [1.0, 10.0, 100.0])
            .unwrap()
            .with_var("y", ["x"], [0.0, 10.0, 1000.0])
            .unwrap();
        let fig = Figure::plan(&ds, &PlotSpec::line("x", "y").with_xlog().with_ylog()).unwrap();
        assert_eq!(fig.facets[0].series[0].points, vec![(1.0, 1.0), (2.0, 3.0)]);
        assert_eq!(fig.x_range, (1.0, 2.0));
    }

    #[test]
    fn test_error_bars_widen_y_range() {
        let ds = Dataset::new()
            .with_coord("x", [0, 1])
            .unwrap()
            .with_var("y", ["x"], [1.0, 2.0])
            .unwrap()
            .with_var("err", ["x"], [0.5, 1.0])
            .unwrap();
        let spec = PlotSpec::line("x", "y").with_y_err("err").with_ylims(-10.0, 10.0);
        let fig = Figure::plan(&ds, &spec).unwrap();
        let series = &fig.facets[0].series[0];
        assert_eq!(
            series.error_bars().collect::<Vec<_>>(),
            vec![(0.0, 0.5, 1.5), (1.0, 1.0, 3.0)]
        );
        assert_eq!(fig.y_range, (-10.0, 10.0));

        let fig = Figure::plan(&ds, &PlotSpec::line("x", "y").with_y_err("err")).unwrap();
        assert!(fig.y_range.0 < 0.5 && fig.y_range.1 > 3.0);
    }

    #[test]
    fn test_title_placement() {
        let ds = grid_ds().sel([("c", 100)]).unwrap();
        let single = PlotSpec::line("a", "sum").with_z("b").with_title("sums");
        let fig = Figure::plan(&ds, &single).unwrap();
        assert_eq!(fig.title, None);
        assert_eq!(fig.facets[0].title.as_deref(), Some("sums"));

        let faceted = PlotSpec::line("a", "sum").with_col("b").with_title("sums");
        let fig = Figure::plan(&ds, &faceted).unwrap();
        assert_eq!(fig.title.as_deref(), Some("sums"));
        assert_eq!(fig.facets[0].title.as_deref(), Some("b = 10"));
    }
}
