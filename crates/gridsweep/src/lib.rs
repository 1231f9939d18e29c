//! Plotting and viewing of labeled sweep datasets
//!
//! This crate turns [`gridsweep_core::Dataset`]s into figures. It supports:
//! - Line and scatter plots with one series per value of a `z` dimension
//! - Symmetric error bars, log axes and reference lines
//! - Faceted grids split by `row` / `col` dimensions with shared ranges
//! - A terminal backend built on ratatui charts, and an egui window
//!   (feature `gui`)
//! - JSON dataset files and the `gridsweep` viewer binary (feature `native`)

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod backend;
pub mod demo;
pub mod plot;
pub mod storage;

#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod viewer;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod error;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

#[cfg(feature = "gui")]
pub use backend::EguiBackend;
#[cfg(feature = "native")]
pub use backend::TerminalBackend;
pub use backend::{ChartBackend, FigureWidget};
pub use error::{PlotError, Result};
#[cfg(feature = "native")]
pub use logging::{default_log_dir, init_logging};
pub use plot::{Facet, Figure, PlotKind, PlotSpec, Series, auto_lineplot, auto_scatter};
pub use storage::{describe, load_dataset, load_plot_spec, save_dataset};
#[cfg(feature = "native")]
pub use viewer::Viewer;
