//! Parameter sweep runner producing labeled N-dimensional datasets
//!
//! This crate runs a function over parameter spaces and collects the results
//! into labeled arrays. It supports:
//! - Dense sweeps over the Cartesian product of named value lists ("combos")
//! - Sparse sweeps over explicit argument tuples ("cases")
//! - Multi-result functions, split into one variable per result
//! - Array-valued results with extra, optionally labeled dimensions
//! - Merging new case results into an existing dataset
//! - Optional parallel execution on a bounded rayon pool (feature `parallel`)
//!
//! # Example
//!
//! ```
//! use gridsweep_core::{Combos, OutputSpec, RunOptions, SweepError, combo_runner_to_ds};
//!
//! let combos = Combos::new().axis("a", [1, 2]).axis("b", [10, 20, 30]);
//! let ds = combo_runner_to_ds(
//!     |args| Ok::<_, SweepError>(args.i64("a")? + args.i64("b")? + args.i64("c")?),
//!     &combos,
//!     &OutputSpec::single("sum"),
//!     &RunOptions::new().with_constant("c", 100),
//! )?;
//! assert_eq!(ds.get("sum", [("a", 2), ("b", 30)])?, 132.into());
//! # Ok::<(), SweepError>(())
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod args;
pub mod assemble;
pub mod case;
pub mod combo;
pub mod error;
pub mod execute;
pub mod grid;
pub mod output;
pub mod progress;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod dataset;
pub mod value;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use args::Args;
pub use assemble::{OutputSpec, case_runner_to_ds, cases_to_ds, combo_runner_to_ds, combos_to_ds};
pub use case::{Cases, case_runner};
pub use combo::{Combos, combo_runner, split_grid};
pub use dataset::{Coordinate, DataArray, Dataset, Variable, align_outer, auto_xyz_ds};
pub use error::{BoxError, Result, SweepError};
pub use execute::RunOptions;
pub use grid::SweepGrid;
pub use output::{Output, Schema, split_outputs};
pub use progress::SweepProgress;
pub use value::{DType, Value};

/// Split a flat list of tuple results, as returned by [`case_runner`], into
/// one list per tuple position.
pub use output::split_outputs as split_case_outputs;
