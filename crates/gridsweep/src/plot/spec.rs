use serde::{Deserialize, Serialize};

/// How each series is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    #[default]
    Line,
    Scatter,
}

/// Which dataset dimensions and variables map onto a figure.
///
/// `x`, `z`, `row` and `col` name dimensions of the `y` variable; every other
/// dimension of `y` must have length one. `y_err` names a second variable
/// giving symmetric error bars on `y`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSpec {
    pub x: String,
    pub y: String,
    /// One series per value of this dimension
    pub z: Option<String>,
    pub y_err: Option<String>,
    pub kind: PlotKind,
    /// Facet rows, one per value of this dimension
    pub row: Option<String>,
    /// Facet columns, one per value of this dimension
    pub col: Option<String>,
    pub title: Option<String>,
    pub xlog: bool,
    pub ylog: bool,
    /// Fixed x range in data units, overriding the data extent
    pub xlims: Option<(f64, f64)>,
    /// Fixed y range in data units, overriding the data extent
    pub ylims: Option<(f64, f64)>,
    /// Horizontal reference lines at these y values
    pub hlines: Vec<f64>,
    /// Vertical reference lines at these x values
    pub vlines: Vec<f64>,
    /// Force the legend on or off; by default it is shown for a single
    /// plot with ten or fewer series
    pub legend: Option<bool>,
}

impl PlotSpec {
    /// Line plot of `y` against `x`.
    #[must_use]
    pub fn line(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            ..Self::default()
        }
    }

    /// Scatter plot of `y` against `x`.
    #[must_use]
    pub fn scatter(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind: PlotKind::Scatter,
            ..Self::line(x, y)
        }
    }

    #[must_use]
    pub fn with_z(mut self, z: impl Into<String>) -> Self {
        self.z = Some(z.into());
        self
    }

    #[must_use]
    pub fn with_y_err(mut self, y_err: impl Into<String>) -> Self {
        self.y_err = Some(y_err.into());
        self
    }

    #[must_use]
    pub fn with_row(mut self, row: impl Into<String>) -> Self {
        self.row = Some(row.into());
        self
    }

    #[must_use]
    pub fn with_col(mut self, col: impl Into<String>) -> Self {
        self.col = Some(col.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_xlog(mut self) -> Self {
        self.xlog = true;
        self
    }

    #[must_use]
    pub fn with_ylog(mut self) -> Self {
        self.ylog = true;
        self
    }

    #[must_use]
    pub fn with_xlims(mut self, lo: f64, hi: f64) -> Self {
        self.xlims = Some((lo, hi));
        self
    }

    #[must_use]
    pub fn with_ylims(mut self, lo: f64, hi: f64) -> Self {
        self.ylims = Some((lo, hi));
        self
    }

    #[must_use]
    pub fn with_hline(mut self, y: f64) -> Self {
        self.hlines.push(y);
        self
    }

    #[must_use]
    pub fn with_vline(mut self, x: f64) -> Self {
        self.vlines.push(x);
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = Some(legend);
        self
    }

    /// Dimension selectors in the order x, z, row, col.
    pub(crate) fn selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.x.as_str())
            .chain(self.z.as_deref())
            .chain(self.row.as_deref())
            .chain(self.col.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_keeps_axes() {
        let spec = PlotSpec::scatter("a", "sum").with_z("b").with_col("c");
        assert_eq!(spec.kind, PlotKind::Scatter);
        assert_eq!(spec.selectors().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let spec: PlotSpec =
            serde_json::from_str(r#"{"x": "t", "y": "amp", "kind": "scatter", "ylog": true}"#)
                .unwrap();
        assert_eq!(spec, PlotSpec::scatter("t", "amp").with_ylog());
    }
}
