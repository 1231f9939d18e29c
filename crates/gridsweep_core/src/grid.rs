//! Row-major storage behind every dataset variable and sweep result.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Values laid out over the axes of a sweep, last axis contiguous.
///
/// Index `[i, j, k]` addresses the point at position `i` on the first
/// sweep axis, `j` on the second and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T: Clone> SweepGrid<T> {
    /// A grid of `shape` with every cell set to `fill`.
    pub fn new(shape: Vec<usize>, fill: T) -> Self {
        let strides = compute_strides(&shape);
        Self {
            data: vec![fill; shape.iter().product()],
            shape,
            strides,
        }
    }
}

impl<T> SweepGrid<T> {
    /// Wrap values already in row-major order.
    pub fn from_data(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(SweepError::ShapeMismatch {
                what: format!("number of values for shape {shape:?}"),
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            strides: compute_strides(&shape),
            data,
            shape,
        })
    }

    /// Length along each axis
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Offset of `index` in the backing vector, or `None` when it has the
    /// wrong rank or runs past an axis.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        index
            .iter()
            .zip(&self.shape)
            .zip(&self.strides)
            .try_fold(0, |flat, ((&i, &len), &stride)| (i < len).then_some(flat + i * stride))
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.flat_index(index).and_then(|flat| self.data.get(flat))
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.flat_index(index).and_then(|flat| self.data.get_mut(flat))
    }

    /// Values in row-major order
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Every index of the grid, in storage order.
    pub fn indices(&self) -> GridIndices {
        GridIndices::new(&self.shape)
    }

    /// Pairs of index and value, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &T)> {
        self.indices().zip(&self.data)
    }

    /// Same shape, each value passed through `f`.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> SweepGrid<U> {
        SweepGrid {
            data: self.data.into_iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

/// Step in the backing vector for a unit move along each axis.
pub(crate) fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    let mut step = 1;
    for (stride, &len) in strides.iter_mut().zip(shape).rev() {
        *stride = step;
        step *= len;
    }
    strides
}

/// Inverse of the stride dot product: flat offset back to an index.
pub(crate) fn unravel_index(strides: &[usize], flat: usize) -> Vec<usize> {
    strides
        .iter()
        .scan(flat, |rest, &stride| {
            let i = *rest / stride;
            *rest %= stride;
            Some(i)
        })
        .collect()
}

/// Walks every index of a shape, last axis fastest.
pub struct GridIndices {
    shape: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl GridIndices {
    pub fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            next: (!shape.contains(&0)).then(|| vec![0; shape.len()]),
        }
    }
}

impl Iterator for GridIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        // Odometer step; a rank-0 shape has a single index and stops here
        for axis in (0..self.shape.len()).rev() {
            following[axis] += 1;
            if following[axis] < self.shape[axis] {
                self.next = Some(following);
                break;
            }
            following[axis] = 0;
        }
        Some(current)
    }
}
