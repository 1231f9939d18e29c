//! Built-in damped oscillator sweep used by `gridsweep demo`.

use gridsweep_core::{
    Args, Combos, Dataset, OutputSpec, RunOptions, SweepError, combo_runner_to_ds,
};

use crate::plot::PlotSpec;

/// Displacement of a damped oscillator at times `0..samples` divided by ten.
fn oscillator(args: &Args) -> Result<Vec<f64>, SweepError> {
    let freq = args.f64("freq")?;
    let damping = args.f64("damping")?;
    let samples = args.i64("samples")?;
    Ok((0..samples)
        .map(|i| {
            let t = i as f64 / 10.0;
            (-damping * t).exp() * (std::f64::consts::TAU * freq * t).cos()
        })
        .collect())
}

/// Sweep oscillator frequency and damping, sampled on a shared time axis.
pub fn demo_dataset(threads: usize) -> Result<Dataset, SweepError> {
    let samples: i32 = 60;
    let combos = Combos::new()
        .axis("freq", [0.25, 0.5, 1.0])
        .axis("damping", [0.1, 0.5]);
    let spec = OutputSpec::single("displacement")
        .with_shared_dims(["t"])
        .with_coord("t", (0..samples).map(|i| f64::from(i) / 10.0));
    let options = RunOptions::new()
        .with_constant("samples", samples)
        .with_threads(threads);
    combo_runner_to_ds(oscillator, &combos, &spec, &options)
}

/// How the demo dataset is plotted: one line per frequency, one column per
/// damping value.
pub fn demo_plot_spec() -> PlotSpec {
    PlotSpec::line("t", "displacement")
        .with_z("freq")
        .with_col("damping")
        .with_hline(0.0)
        .with_title("Damped oscillator")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::Figure;
    use approx::assert_relative_eq;
    use gridsweep_core::Value;

    #[test]
    fn test_demo_dataset_shape() {
        let ds = demo_dataset(1).unwrap();
        assert_eq!(ds.dims(), vec!["freq", "damping", "t"]);
        assert_eq!(ds.var("displacement").unwrap().shape(), &[3, 2, 60]);
        assert_eq!(ds.attr("samples"), Some(&Value::Int(60)));

        let start = ds
            .get("displacement", [("freq", 0.5), ("damping", 0.1), ("t", 0.0)])
            .unwrap();
        assert_relative_eq!(start.as_f64().unwrap(), 1.0);
    }

    #[test]
    fn test_demo_pool_matches_sequential() {
        assert_eq!(demo_dataset(0).unwrap(), demo_dataset(1).unwrap());
    }

    #[test]
    fn test_demo_plot_facets() {
        let fig = Figure::plan(&demo_dataset(1).unwrap(), &demo_plot_spec()).unwrap();
        assert_eq!((fig.nrows, fig.ncols), (1, 2));
        assert_eq!(fig.facets[0].series.len(), 3);
        assert_eq!(fig.facets[1].title.as_deref(), Some("damping = 0.5"));
        assert_eq!(fig.point_count(), 3 * 2 * 60);
    }
}
