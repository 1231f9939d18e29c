use std::error::Error;
use std::fmt;

/// Boxed error returned by a user sweep function.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Errors raised while validating, running or assembling a sweep
#[derive(Debug)]
pub enum SweepError {
    /// Two axes, arguments, constants or variables share a name
    DuplicateName { name: String },
    /// A coordinate axis holds the same value twice
    DuplicateCoordinate { dim: String, value: String },
    /// A case tuple does not match the number of argument names
    CaseLength {
        case: usize,
        expected: usize,
        found: usize,
    },
    /// `var_dims` must have one entry, or one entry per variable
    VarDimsMismatch { vars: usize, dims: usize },
    /// An output spec without any variable names
    NoVariables,
    /// Sizes that should agree do not
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    /// A function result does not match the schema of the first result
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    /// The sweep function asked for an argument that was never supplied
    MissingArgument { name: String },
    /// The sweep function asked for an argument as the wrong type
    ArgumentType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    DimNotFound { dim: String },
    /// An existing variable cannot take results laid out over other dims
    DimsConflict {
        name: String,
        existing: Vec<String>,
        found: Vec<String>,
    },
    CoordNotFound { dim: String, value: String },
    VarNotFound { name: String },
    /// `item()` called on an array with more than one element
    NotScalar { shape: Vec<usize> },
    /// The worker pool could not be built
    Pool(String),
    /// The sweep function failed; the whole sweep is aborted
    Function { point: String, source: BoxError },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::DuplicateName { name } => write!(f, "duplicate name '{name}'"),
            SweepError::DuplicateCoordinate { dim, value } => {
                write!(f, "coordinate '{dim}' contains {value} more than once")
            }
            SweepError::CaseLength {
                case,
                expected,
                found,
            } => write!(
                f,
                "case {case} has {found} values but {expected} argument names were given"
            ),
            SweepError::VarDimsMismatch { vars, dims } => write!(
                f,
                "{dims} sets of var_dims given for {vars} variables (expected 1 or {vars})"
            ),
            SweepError::NoVariables => write!(f, "at least one variable name is required"),
            SweepError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(f, "{what}: expected {expected}, found {found}"),
            SweepError::SchemaMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "result {index} has shape {found}, expected {expected} like the first result"
            ),
            SweepError::MissingArgument { name } => write!(f, "missing argument '{name}'"),
            SweepError::ArgumentType {
                name,
                expected,
                found,
            } => write!(f, "argument '{name}' is {found}, expected {expected}"),
            SweepError::DimNotFound { dim } => write!(f, "dimension '{dim}' not found"),
            SweepError::DimsConflict {
                name,
                existing,
                found,
            } => write!(
                f,
                "variable '{name}' is over {existing:?}, cannot merge results over {found:?}"
            ),
            SweepError::CoordNotFound { dim, value } => {
                write!(f, "value {value} not found in coordinate '{dim}'")
            }
            SweepError::VarNotFound { name } => write!(f, "variable '{name}' not found"),
            SweepError::NotScalar { shape } => {
                write!(f, "array of shape {shape:?} is not a single value")
            }
            SweepError::Pool(msg) => write!(f, "failed to build worker pool: {msg}"),
            SweepError::Function { point, source } => {
                write!(f, "sweep function failed at ({point}): {source}")
            }
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SweepError::Function { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
