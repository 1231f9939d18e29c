//! Scenario tests for the sweep runners and dataset assembly
//!
//! Tests are organized by topic:
//! - `combo_runner` - Dense sweeps, split mode, pools and progress
//! - `case_runner` - Sparse sweeps over explicit cases
//! - `combos_to_ds` - Dense assembly, multi-result and array outputs
//! - `cases_to_ds` - Sparse assembly, merging, alignment and filling

mod combos_to_ds;

use num_complex::Complex64;

use crate::args::Args;
use crate::error::Result;
use crate::output::Output;

// Sweep functions shared by the topic modules. Each checks that its
// arguments arrive in the expected ranges.

fn check_ranges(args: &Args) -> Result<()> {
    for (name, lo, hi) in [("a", 0.0, 10.0), ("b", 10.0, 100.0), ("c", 100.0, 1000.0)] {
        if let Some(value) = args.get(name) {
            let v = value.as_complex().map_or(f64::NAN, |z| z.norm());
            assert!((lo..hi).contains(&v), "{name}={value} out of range");
        }
    }
    Ok(())
}

pub(super) fn foo3_scalar(args: &Args) -> Result<i64> {
    check_ranges(args)?;
    Ok(args.i64("a")? + args.i64("b")? + args.i64("c")?)
}

pub(super) fn foo3_float_bool(args: &Args) -> Result<(i64, bool)> {
    let a = args.i64("a")?;
    Ok((foo3_scalar(args)?, a % 2 == 0))
}

pub(super) fn foo2_array(args: &Args) -> Result<Vec<f64>> {
    check_ranges(args)?;
    let (a, b) = (args.f64("a")?, args.f64("b")?);
    Ok((0..10).map(|i| b + a + 0.1 * i as f64).collect())
}

pub(super) fn foo2_array_bool(args: &Args) -> Result<Output> {
    let a = args.i64("a")?;
    Ok((foo2_array(args)?, a % 2 == 0).into())
}

pub(super) fn foo2_array_array(args: &Args) -> Result<Output> {
    check_ranges(args)?;
    let (a, b) = (args.i64("a")?, args.i64("b")?);
    let up: Vec<i64> = (0..5).map(|i| b + i * a).collect();
    let down: Vec<i64> = (0..5).map(|i| b - i * a).collect();
    Ok((up, down).into())
}

pub(super) fn foo2_zarray1_zarray2(args: &Args) -> Result<Output> {
    check_ranges(args)?;
    let (a, b) = (args.complex("a")?, args.complex("b")?);
    let up: Vec<Complex64> = (0..5i32)
        .map(|i| b + a + Complex64::new(0.0, 0.1 * f64::from(i)))
        .collect();
    let down: Vec<Complex64> = (0..5i32)
        .map(|i| b + a - Complex64::new(0.0, 0.1 * f64::from(i)))
        .collect();
    Ok((up, down).into())
}
