use std::error::Error;
use std::fmt;

use gridsweep_core::SweepError;

/// Errors raised while planning or showing a figure
#[derive(Debug)]
pub enum PlotError {
    /// The plotted variable is not in the dataset
    VarNotFound { name: String },
    /// A selector names a dimension the variable does not have
    DimNotFound { var: String, dim: String },
    /// Two selectors name the same dimension
    DuplicateSelector { dim: String },
    /// The variable has dimensions longer than one that no selector covers
    UnplottedDims { var: String, dims: Vec<String> },
    /// Reading or writing a dataset failed
    Io(std::io::Error),
    /// A dataset or plot spec file is not valid JSON
    Json(serde_json::Error),
    /// A dataset operation failed
    Data(SweepError),
    /// The drawing backend could not start or draw
    Backend(String),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::VarNotFound { name } => write!(f, "variable '{name}' not found"),
            PlotError::DimNotFound { var, dim } => {
                write!(f, "variable '{var}' has no dimension '{dim}'")
            }
            PlotError::DuplicateSelector { dim } => {
                write!(f, "dimension '{dim}' is used by more than one selector")
            }
            PlotError::UnplottedDims { var, dims } => write!(
                f,
                "variable '{var}' has unplotted dimensions {dims:?}; map them to z, row or col"
            ),
            PlotError::Io(e) => write!(f, "I/O error: {e}"),
            PlotError::Json(e) => write!(f, "invalid JSON: {e}"),
            PlotError::Data(e) => write!(f, "{e}"),
            PlotError::Backend(msg) => write!(f, "plot backend failed: {msg}"),
        }
    }
}

impl Error for PlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlotError::Io(e) => Some(e),
            PlotError::Json(e) => Some(e),
            PlotError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlotError {
    fn from(e: std::io::Error) -> Self {
        PlotError::Io(e)
    }
}

impl From<serde_json::Error> for PlotError {
    fn from(e: serde_json::Error) -> Self {
        PlotError::Json(e)
    }
}

impl From<SweepError> for PlotError {
    fn from(e: SweepError) -> Self {
        PlotError::Data(e)
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
