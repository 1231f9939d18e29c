//! Reading and writing datasets and plot specs as JSON files.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use gridsweep_core::Dataset;

use crate::error::Result;
use crate::plot::PlotSpec;
use crate::plot::format::prettify;

/// Coordinates with more values than this are summarized by their ends.
const MAX_LISTED_VALUES: usize = 6;

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let reader = BufReader::new(File::open(path)?);
    let ds: Dataset = serde_json::from_reader(reader)?;
    tracing::debug!(path = %path.display(), vars = ds.var_names().len(), "loaded dataset");
    Ok(ds)
}

pub fn save_dataset(ds: &Dataset, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, ds)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "saved dataset");
    Ok(())
}

pub fn load_plot_spec(path: &Path) -> Result<PlotSpec> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Human-readable listing of a dataset's dimensions, coordinates,
/// variables and attributes.
pub fn describe(ds: &Dataset) -> String {
    let mut out = String::new();
    let dims: Vec<String> = ds
        .coords()
        .map(|(name, coord)| format!("{name}: {}", coord.len()))
        .collect();
    let _ = writeln!(out, "Dimensions: ({})", dims.join(", "));

    let _ = writeln!(out, "Coordinates:");
    for (name, coord) in ds.coords() {
        let values = coord.values();
        let listed: Vec<String> = if values.len() > MAX_LISTED_VALUES {
            let half = MAX_LISTED_VALUES / 2;
            values[..half]
                .iter()
                .map(prettify)
                .chain(std::iter::once("...".to_string()))
                .chain(values[values.len() - half..].iter().map(prettify))
                .collect()
        } else {
            values.iter().map(prettify).collect()
        };
        let _ = writeln!(
            out,
            "  * {name:<12} ({name}) {} {}",
            coord.dtype().name(),
            listed.join(" ")
        );
    }

    let _ = writeln!(out, "Data variables:");
    for (name, var) in ds.vars() {
        let missing = var.count_missing();
        let _ = write!(
            out,
            "    {name:<12} ({}) {}",
            var.dims().join(", "),
            var.dtype().name()
        );
        if missing > 0 {
            let _ = write!(out, " [{missing} missing of {}]", var.values().len());
        }
        out.push('\n');
    }

    if !ds.attrs().is_empty() {
        let _ = writeln!(out, "Attributes:");
        for (name, value) in ds.attrs() {
            let _ = writeln!(out, "    {name}: {}", prettify(value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;

    fn sample() -> Dataset {
        let values = (0..20i32).map(|i| if i == 3 { f64::NAN } else { f64::from(i) });
        Dataset::new()
            .with_coord("a", [1, 2])
            .unwrap()
            .with_coord("t", 0..10)
            .unwrap()
            .with_var("v", ["a", "t"], values)
            .unwrap()
            .with_attr("seed", 7)
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ds.json");
        let ds = sample();
        save_dataset(&ds, &path).unwrap();
        let back = load_dataset(&path).unwrap();
        assert_eq!(back.var("v").unwrap().count_missing(), 1);
        assert_eq!(back.attr("seed"), ds.attr("seed"));
        assert_eq!(back.dims(), vec!["a", "t"]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_dataset(&missing), Err(PlotError::Io(_))));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(load_dataset(&bad), Err(PlotError::Json(_))));
    }

    #[test]
    fn test_load_plot_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        std::fs::write(&path, r#"{"x": "t", "y": "v", "row": "a"}"#).unwrap();
        let spec = load_plot_spec(&path).unwrap();
        assert_eq!(spec, PlotSpec::line("t", "v").with_row("a"));
    }

    #[test]
    fn test_describe_lists_everything() {
        let text = describe(&sample());
        assert!(text.starts_with("Dimensions: (a: 2, t: 10)"));
        assert!(text.contains("0 1 2 ... 7 8 9"));
        assert!(text.contains("(a, t) float [1 missing of 20]"));
        assert!(text.contains("seed: 7"));
    }
}
