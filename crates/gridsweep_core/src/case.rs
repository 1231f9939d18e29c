//! Sparse sweeps over an explicit list of argument tuples.

use rustc_hash::FxHashSet;

use crate::args::Args;
use crate::error::{BoxError, Result, SweepError};
use crate::execute::{RunOptions, execute};
use crate::value::{Value, sorted_union};

/// Argument names plus explicit value tuples, one tuple per invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cases {
    names: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Cases {
    /// Build cases, checking that names are unique and every tuple has one
    /// value per name.
    pub fn new<N, S, I, C, V>(names: N, cases: I) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen = FxHashSet::default();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SweepError::DuplicateName { name: name.clone() });
            }
        }

        let rows: Vec<Vec<Value>> = cases
            .into_iter()
            .map(|case| case.into_iter().map(Into::into).collect())
            .collect();
        for (case, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(SweepError::CaseLength {
                    case,
                    expected: names.len(),
                    found: row.len(),
                });
            }
        }

        Ok(Self { names, rows })
    }

    /// Cases for a single argument, one plain value per case.
    pub fn single<S, I, V>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            names: vec![name.into()],
            rows: values.into_iter().map(|v| vec![v.into()]).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of cases
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted union of the values seen for argument `field` across all cases.
    pub fn axis_values(&self, field: usize) -> Vec<Value> {
        sorted_union(self.rows.iter().map(|row| &row[field]))
    }

    pub(crate) fn args(&self, case: usize, options: &RunOptions) -> Args {
        Args::new(
            self.names
                .iter()
                .cloned()
                .zip(self.rows[case].iter().cloned()),
            &options.constants,
        )
    }
}

/// Run `f` once per case and return the results in case order.
///
/// No array structure is implied; see [`crate::cases_to_ds`] to assemble the
/// results into a dataset. The first failing call aborts the run.
pub fn case_runner<F, R, E>(f: F, cases: &Cases, options: &RunOptions) -> Result<Vec<R>>
where
    F: Fn(&Args) -> std::result::Result<R, E> + Sync,
    R: Send,
    E: Into<BoxError>,
{
    options.check_constants(cases.names().iter().map(String::as_str))?;
    tracing::debug!(
        args = cases.names().len(),
        cases = cases.len(),
        "starting case sweep"
    );
    execute(
        cases.len(),
        |i| cases.args(i, options),
        &f,
        options,
        None,
    )
}
