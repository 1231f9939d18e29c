//! Invocation of the sweep function over every point, sequentially or on a
//! bounded worker pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use indexmap::IndexMap;

use crate::args::Args;
use crate::error::{BoxError, Result, SweepError};
use crate::progress::{BlockTracker, SweepProgress};
use crate::value::Value;

/// Options shared by the combination and case runners.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Extra keyword arguments passed unchanged to every invocation
    pub constants: IndexMap<String, Value>,
    /// Worker pool size. `None` or `Some(1)` runs sequentially; `Some(0)`
    /// uses one worker per available core.
    pub threads: Option<usize>,
    /// Shared completion counter, bumped once per finished invocation
    pub progress: Option<SweepProgress>,
    /// Number of leading axes that log when all points under one of their
    /// values have finished
    pub progress_depth: usize,
}

impl RunOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: SweepProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_progress_depth(mut self, depth: usize) -> Self {
        self.progress_depth = depth;
        self
    }

    /// Constants must not shadow a swept argument.
    pub(crate) fn check_constants<'a>(
        &self,
        mut names: impl Iterator<Item = &'a str>,
    ) -> Result<()> {
        match names.find(|name| self.constants.contains_key(*name)) {
            Some(name) => Err(SweepError::DuplicateName {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn parallel_threads(&self) -> Option<usize> {
        match self.threads {
            None | Some(1) => None,
            Some(n) => Some(n),
        }
    }
}

/// Call `f` once per point `0..total` and return results in point order.
///
/// `point(i)` builds the arguments for the i-th point. The first failure
/// aborts the run.
pub(crate) fn execute<P, F, R, E>(
    total: usize,
    point: P,
    f: &F,
    options: &RunOptions,
    blocks: Option<&BlockTracker>,
) -> Result<Vec<R>>
where
    P: Fn(usize) -> Args + Sync,
    F: Fn(&Args) -> std::result::Result<R, E> + Sync,
    R: Send,
    E: Into<BoxError>,
{
    if let Some(p) = &options.progress {
        p.reset(total);
    }

    let call = |i: usize| -> Result<R> {
        let args = point(i);
        let result = f(&args).map_err(|e| SweepError::Function {
            point: args.point_label(),
            source: e.into(),
        })?;
        if let Some(p) = &options.progress {
            p.increment();
        }
        if let Some(b) = blocks {
            b.complete(i);
        }
        Ok(result)
    };

    match options.parallel_threads() {
        Some(threads) => run_pool(total, threads, &call),
        None => {
            tracing::debug!(points = total, "running sweep sequentially");
            (0..total).map(call).collect()
        }
    }
}

#[cfg(feature = "parallel")]
fn run_pool<C, R>(total: usize, threads: usize, call: &C) -> Result<Vec<R>>
where
    C: Fn(usize) -> Result<R> + Sync,
    R: Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SweepError::Pool(e.to_string()))?;
    tracing::debug!(
        points = total,
        threads = pool.current_num_threads(),
        "running sweep on worker pool"
    );
    // Indexed collect writes each result at its point index, so the output
    // order never depends on completion order.
    pool.install(|| (0..total).into_par_iter().map(call).collect())
}

#[cfg(not(feature = "parallel"))]
fn run_pool<C, R>(total: usize, threads: usize, call: &C) -> Result<Vec<R>>
where
    C: Fn(usize) -> Result<R> + Sync,
    R: Send,
{
    tracing::warn!(
        threads,
        "worker pool requested but the `parallel` feature is disabled; running sequentially"
    );
    (0..total).map(call).collect()
}
