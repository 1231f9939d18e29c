use crate::error::{Result, SweepError};

use super::Dataset;

/// Wrap raw series into a dataset with coords `x` and `z` and variable `y`
/// over `(z, x)`.
///
/// `z` indexes the series. When `x` is `None` the points are indexed
/// `0..len`. Every series must have one value per `x`.
pub fn auto_xyz_ds(x: Option<&[f64]>, ys: &[Vec<f64>]) -> Result<Dataset> {
    let len = match (x, ys.first()) {
        (Some(x), _) => x.len(),
        (None, Some(first)) => first.len(),
        (None, None) => 0,
    };
    for (i, y) in ys.iter().enumerate() {
        if y.len() != len {
            return Err(SweepError::ShapeMismatch {
                what: format!("points in series {i}"),
                expected: len,
                found: y.len(),
            });
        }
    }

    let ds = match x {
        Some(x) => Dataset::new().with_coord("x", x.iter().copied())?,
        None => Dataset::new().with_coord("x", 0..len)?,
    };
    ds.with_coord("z", 0..ys.len())?
        .with_var("y", ["z", "x"], ys.iter().flatten().copied())
}
