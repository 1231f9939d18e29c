//! Dense sweeps over the Cartesian product of named value lists.

use rustc_hash::FxHashSet;

use crate::args::Args;
use crate::dataset::Coordinate;
use crate::error::{BoxError, Result, SweepError};
use crate::execute::{RunOptions, execute};
use crate::grid::{SweepGrid, compute_strides, unravel_index};
use crate::output::{self, Output};
use crate::progress::BlockTracker;
use crate::value::Value;

/// Ordered list of named axes, each with the values to sweep.
///
/// The first axis is the outermost (slowest varying) dimension of the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Combos {
    axes: Vec<(String, Vec<Value>)>,
}

impl Combos {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single swept argument.
    pub fn single<S, I, V>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new().axis(name, values)
    }

    /// Append an axis.
    #[must_use]
    pub fn axis<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.axes
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Axis names must be unique, and so must the values along each axis.
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for (name, values) in &self.axes {
            if !seen.insert(name.as_str()) {
                return Err(SweepError::DuplicateName { name: name.clone() });
            }
            Coordinate::new(name, values.clone())?;
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|(name, _)| name.as_str())
    }

    pub fn axes(&self) -> &[(String, Vec<Value>)] {
        &self.axes
    }

    /// Length of each axis, in declaration order
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|(_, values)| values.len()).collect()
    }

    pub fn total_points(&self) -> usize {
        self.axes.iter().map(|(_, values)| values.len()).product()
    }

    /// Number of axes
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

impl<S, V> FromIterator<(S, Vec<V>)> for Combos
where
    S: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (S, Vec<V>)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Combos::new(), |combos, (name, values)| combos.axis(name, values))
    }
}

/// Run `f` for every point of the Cartesian product of `combos`.
///
/// Each call receives the point's axis values plus `options.constants` as
/// named arguments. The result grid has one dimension per axis, in
/// declaration order. The first failing call aborts the sweep.
///
/// # Example
/// ```
/// use gridsweep_core::{Combos, RunOptions, SweepError, combo_runner};
///
/// let combos = Combos::new().axis("a", [1, 2]).axis("b", [10, 20, 30]);
/// let grid = combo_runner(
///     |args| Ok::<_, SweepError>(args.i64("a")? + args.i64("b")?),
///     &combos,
///     &RunOptions::new(),
/// )?;
/// assert_eq!(grid.shape(), &[2, 3]);
/// assert_eq!(grid.get(&[1, 2]), Some(&32));
/// # Ok::<(), SweepError>(())
/// ```
pub fn combo_runner<F, R, E>(f: F, combos: &Combos, options: &RunOptions) -> Result<SweepGrid<R>>
where
    F: Fn(&Args) -> std::result::Result<R, E> + Sync,
    R: Send,
    E: Into<BoxError>,
{
    combos.validate()?;
    options.check_constants(combos.names())?;

    let shape = combos.shape();
    let strides = compute_strides(&shape);
    let total = combos.total_points();
    let blocks = BlockTracker::new(combos.axes(), options.progress_depth);

    tracing::debug!(axes = combos.len(), points = total, "starting combo sweep");

    let point = |flat: usize| {
        let indices = unravel_index(&strides, flat);
        Args::new(
            combos
                .axes
                .iter()
                .zip(indices)
                .map(|((name, values), i)| (name.clone(), values[i].clone())),
            &options.constants,
        )
    };

    let results = execute(total, point, &f, options, blocks.as_ref())?;
    SweepGrid::from_data(shape, results)
}

/// Split a grid of tuple results into one grid per tuple position.
///
/// Every output grid has the same shape as the input.
pub fn split_grid(grid: SweepGrid<Output>) -> Result<Vec<SweepGrid<Output>>> {
    let shape = grid.shape().to_vec();
    output::split_outputs(grid.into_data())?
        .into_iter()
        .map(|field| SweepGrid::from_data(shape.clone(), field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_axis_rejected_before_running() {
        let combos = Combos::new().axis("a", [1, 2]).axis("a", [3]);
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let result = combo_runner(
            |_| {
                calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                Ok::<_, SweepError>(0)
            },
            &combos,
            &RunOptions::new(),
        );
        assert!(matches!(result, Err(SweepError::DuplicateName { .. })));
        assert_eq!(calls.into_inner(), 0);
    }

    #[test]
    fn test_constant_shadowing_axis_rejected() {
        let combos = Combos::single("a", [1, 2]);
        let options = RunOptions::new().with_constant("a", 5);
        let result = combo_runner(|_| Ok::<_, SweepError>(0), &combos, &options);
        assert!(matches!(result, Err(SweepError::DuplicateName { .. })));
    }

    #[test]
    fn test_from_iterator() {
        let combos: Combos = vec![("a", vec![1, 2]), ("b", vec![3])].into_iter().collect();
        assert_eq!(combos.shape(), vec![2, 1]);
        assert_eq!(combos.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_no_axes_calls_once_with_constants() {
        let options = RunOptions::new().with_constant("c", 3);
        let grid = combo_runner(
            |args| Ok::<_, SweepError>(args.i64("c")? * 2),
            &Combos::new(),
            &options,
        )
        .unwrap();
        assert_eq!(grid.shape(), &[] as &[usize]);
        assert_eq!(grid.data(), &[6]);
    }
}
