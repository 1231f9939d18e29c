//! Outer alignment of datasets and filling of missing cells.

use crate::error::Result;
use crate::grid::{GridIndices, SweepGrid};
use crate::value::{Value, sorted_union};

use super::{Coordinate, Dataset, Variable};

impl Dataset {
    /// Reindex `dim` onto `values`. Cells at new coordinate values are
    /// missing; cells at dropped values are discarded.
    pub fn reindex<I, V>(&self, dim: &str, values: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut out = self.clone();
        let coord = Coordinate::new(dim, values.into_iter().map(Into::into).collect())?;
        out.reindex_mut(dim, coord)?;
        Ok(out)
    }

    pub(crate) fn reindex_mut(&mut self, dim: &str, coord: Coordinate) -> Result<()> {
        let old = self.require_coord(dim)?;
        if *old == coord {
            return Ok(());
        }
        let mapping: Vec<Option<usize>> = coord.values().iter().map(|v| old.position(v)).collect();
        for var in self.vars_mut() {
            if let Some(axis) = var.dims().iter().position(|d| d == dim) {
                *var = reindex_axis(var, axis, &mapping)?;
            }
        }
        self.set_coord(dim.to_string(), coord);
        Ok(())
    }

    /// Fill this dataset's missing cells from the same cells of `other`.
    ///
    /// Both datasets are outer-aligned first. Variables that `other` lacks,
    /// or holds over different dims, are left as they are.
    pub fn fill_missing(&self, other: &Dataset) -> Result<Dataset> {
        let (mut out, other) = align_outer(self, other)?;
        for (name, src) in other.vars() {
            let Some(var) = out.var_mut(name) else {
                continue;
            };
            let Some(perm) = dim_permutation(var.dims(), src.dims()) else {
                tracing::debug!(var = name, "dims differ, not filling");
                continue;
            };

            let shape = var.shape().to_vec();
            let mut filled = 0usize;
            for idx in GridIndices::new(&shape) {
                if !var.data().get(&idx).is_some_and(Value::is_missing) {
                    continue;
                }
                let src_idx: Vec<usize> = perm.iter().map(|&p| idx[p]).collect();
                if let Some(v) = src.data().get(&src_idx).filter(|v| !v.is_missing()) {
                    if let Some(cell) = var.data_mut().get_mut(&idx) {
                        *cell = v.clone();
                    }
                    filled += 1;
                }
            }
            if filled > 0 {
                var.refresh_dtype();
            }
        }
        Ok(out)
    }
}

/// Reindex both datasets onto the sorted union of every coordinate they
/// share.
pub fn align_outer(a: &Dataset, b: &Dataset) -> Result<(Dataset, Dataset)> {
    let mut a = a.clone();
    let mut b = b.clone();
    let shared: Vec<String> = a
        .dims()
        .into_iter()
        .filter(|dim| b.coord(dim).is_some())
        .map(str::to_string)
        .collect();

    for dim in shared {
        let (ca, cb) = (a.require_coord(&dim)?, b.require_coord(&dim)?);
        if ca == cb {
            continue;
        }
        let union = sorted_union(ca.values().iter().chain(cb.values()));
        let coord = Coordinate::new(&dim, union)?;
        a.reindex_mut(&dim, coord.clone())?;
        b.reindex_mut(&dim, coord)?;
    }
    Ok((a, b))
}

/// For each dim of `src`, its axis in `dst`; `None` unless both hold the
/// same set of dims.
pub(crate) fn dim_permutation(dst: &[String], src: &[String]) -> Option<Vec<usize>> {
    if dst.len() != src.len() {
        return None;
    }
    src.iter()
        .map(|d| dst.iter().position(|x| x == d))
        .collect()
}

fn reindex_axis(var: &Variable, axis: usize, mapping: &[Option<usize>]) -> Result<Variable> {
    let mut shape = var.shape().to_vec();
    shape[axis] = mapping.len();
    let mut values = Vec::with_capacity(shape.iter().product());
    for mut idx in GridIndices::new(&shape) {
        let value = match mapping[idx[axis]] {
            Some(old) => {
                idx[axis] = old;
                var.data().get(&idx).cloned().unwrap_or(Value::Missing)
            }
            None => Value::Missing,
        };
        values.push(value);
    }
    let data = SweepGrid::from_data(shape, values)?;
    Ok(Variable::from_grid(var.dims().to_vec(), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DType;

    #[test]
    fn test_align_outer_unions_shared_coords() {
        let a = Dataset::new()
            .with_coord("t", [1, 2])
            .unwrap()
            .with_var("x", ["t"], [10, 20])
            .unwrap();
        let b = Dataset::new()
            .with_coord("t", [2, 3])
            .unwrap()
            .with_var("x", ["t"], [200, 300])
            .unwrap();
        let (a, b) = align_outer(&a, &b).unwrap();
        let t = [Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(a.coord("t").unwrap().values(), &t);
        assert_eq!(b.coord("t").unwrap().values(), &t);

        let ax = a.var("x").unwrap();
        assert_eq!(ax.dtype(), DType::Float);
        assert!(ax.values()[2].is_missing());
        assert!(b.var("x").unwrap().values()[0].is_missing());
    }

    #[test]
    fn test_reindex_identity_keeps_dtype() {
        let ds = Dataset::new()
            .with_coord("t", [1, 2])
            .unwrap()
            .with_var("x", ["t"], [10, 20])
            .unwrap();
        let same = ds.reindex("t", [1, 2]).unwrap();
        assert_eq!(same.var("x").unwrap().dtype(), DType::Int);
    }
}
