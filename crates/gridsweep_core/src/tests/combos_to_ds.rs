//! Tests for dense dataset assembly
//!
//! These tests verify that:
//! - Combo axes become coordinates in declaration order
//! - Each variable's dtype follows the values it holds
//! - Array results add labeled or auto-named extra dims
//! - Selecting by a point's coordinates returns the computed result

use approx::assert_relative_eq;
use num_complex::Complex64;

use super::{
    foo2_array, foo2_array_array, foo2_array_bool, foo2_zarray1_zarray2, foo3_float_bool,
    foo3_scalar,
};
use crate::assemble::{OutputSpec, combo_runner_to_ds, combos_to_ds};
use crate::combo::Combos;
use crate::error::SweepError;
use crate::execute::RunOptions;
use crate::value::{DType, Value};

fn abc() -> Combos {
    Combos::new()
        .axis("a", [1, 2])
        .axis("b", [10, 20, 30])
        .axis("c", [100, 200, 300, 400])
}

fn ab() -> Combos {
    Combos::new().axis("a", [1, 2]).axis("b", [10, 20, 30])
}

fn f64s(values: &[Value]) -> Vec<f64> {
    values.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect()
}

#[test]
fn test_simple() {
    let combos = Combos::single("a", [1, 2, 3]);
    let ds = combos_to_ds(vec![1, 2, 3], &combos, &OutputSpec::single("sum")).unwrap();
    assert_eq!(ds.var("sum").unwrap().dtype(), DType::Int);
    assert_eq!(ds.dims(), vec!["a"]);
}

#[test]
fn test_basic() {
    let ds = combo_runner_to_ds(
        foo3_scalar,
        &abc(),
        &OutputSpec::single("bananas"),
        &RunOptions::new(),
    )
    .unwrap();
    assert_eq!(ds.dims(), vec!["a", "b", "c"]);
    assert_eq!(ds.var("bananas").unwrap().shape(), &[2, 3, 4]);
    let value = ds.get("bananas", [("a", 2), ("b", 30), ("c", 400)]).unwrap();
    assert_eq!(value, Value::Int(432));
}

#[test]
fn test_select_returns_computed_result() {
    let combos = abc();
    let ds = combo_runner_to_ds(
        foo3_scalar,
        &combos,
        &OutputSpec::single("sum"),
        &RunOptions::new().with_threads(3),
    )
    .unwrap();
    for a in [1, 2] {
        for b in [10, 20, 30] {
            for c in [100, 200, 300, 400] {
                let value = ds.get("sum", [("a", a), ("b", b), ("c", c)]).unwrap();
                assert_eq!(value, Value::Int(a + b + c));
            }
        }
    }
}

#[test]
fn test_multiresult() {
    let ds = combo_runner_to_ds(
        foo3_float_bool,
        &abc(),
        &OutputSpec::new(["bananas", "cakes"]),
        &RunOptions::new(),
    )
    .unwrap();
    assert_eq!(ds.var("bananas").unwrap().dtype(), DType::Int);
    assert_eq!(ds.var("cakes").unwrap().dtype(), DType::Bool);

    let hi = ds.sel([("a", 2), ("b", 30), ("c", 400)]).unwrap();
    assert_eq!(hi.var("bananas").unwrap().values(), &[Value::Int(432)]);
    assert_eq!(hi.var("cakes").unwrap().values(), &[Value::Bool(true)]);

    let lo = ds.sel([("a", 1), ("b", 10), ("c", 100)]).unwrap();
    assert_eq!(lo.var("bananas").unwrap().values(), &[Value::Int(111)]);
    assert_eq!(lo.var("cakes").unwrap().values(), &[Value::Bool(false)]);
}

#[test]
fn test_tuple_width_must_match_var_names() {
    let err = combo_runner_to_ds(
        foo3_float_bool,
        &abc(),
        &OutputSpec::new(["x", "y", "z"]),
        &RunOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::SchemaMismatch { .. }));
}

#[test]
fn test_arrayresult() {
    let spec = OutputSpec::single("bananas")
        .with_shared_dims(["sugar"])
        .with_coord("sugar", 0..10);
    let ds = combo_runner_to_ds(foo2_array, &ab(), &spec, &RunOptions::new()).unwrap();
    let bananas = ds.var("bananas").unwrap();
    assert_eq!(bananas.dtype(), DType::Float);
    assert_eq!(bananas.dims(), &["a", "b", "sugar"]);

    let point = ds.array("bananas").unwrap().sel([("a", 2), ("b", 30)]).unwrap();
    let expected = [32.0, 32.1, 32.2, 32.3, 32.4, 32.5, 32.6, 32.7, 32.8, 32.9];
    for (got, want) in point.to_f64_vec().iter().zip(expected) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn test_array_and_single_result() {
    let spec = OutputSpec::new(["bananas", "ripe"])
        .with_dims([vec!["sugar"], vec![]])
        .with_coord("sugar", 10..20);
    let ds = combo_runner_to_ds(foo2_array_bool, &ab(), &spec, &RunOptions::new()).unwrap();
    assert_eq!(ds.var("ripe").unwrap().dtype(), DType::Bool);

    let value = ds
        .get("bananas", [("a", 2), ("b", 30), ("sugar", 14)])
        .unwrap();
    assert_relative_eq!(value.as_f64().unwrap(), 32.4, epsilon = 1e-12);

    let err = ds.array("ripe").unwrap().sel([("sugar", 12)]).unwrap_err();
    assert!(matches!(err, SweepError::DimNotFound { .. }));
}

#[test]
fn test_single_var_with_constants() {
    let options = RunOptions::new().with_constant("b", 10).with_constant("c", 100);
    let ds = combo_runner_to_ds(
        foo3_scalar,
        &Combos::single("a", [1, 2, 3]),
        &OutputSpec::single("sum"),
        &options,
    )
    .unwrap();
    assert_eq!(
        ds.var("sum").unwrap().values(),
        &[Value::Int(111), Value::Int(112), Value::Int(113)]
    );
    assert_eq!(ds.attr("b"), Some(&Value::Int(10)));
    assert_eq!(ds.attr("c"), Some(&Value::Int(100)));
}

#[test]
fn test_double_array_return_with_same_dimensions() {
    let spec = OutputSpec::new(["apples", "oranges"])
        .with_shared_dims(["seeds"])
        .with_coord("seeds", 0..5);
    let ds = combo_runner_to_ds(foo2_array_array, &ab(), &spec, &RunOptions::new()).unwrap();
    assert_eq!(ds.var("oranges").unwrap().dtype(), DType::Int);

    let point = ds.sel([("a", 2), ("b", 30)]).unwrap();
    assert_eq!(
        f64s(point.var("apples").unwrap().values()),
        vec![30.0, 32.0, 34.0, 36.0, 38.0]
    );
    assert_eq!(
        f64s(point.var("oranges").unwrap().values()),
        vec![30.0, 28.0, 26.0, 24.0, 22.0]
    );
    assert!(ds.array("apples").unwrap().coord("seeds").is_some());
    assert!(ds.array("oranges").unwrap().coord("seeds").is_some());
}

#[test]
fn test_double_array_return_with_no_given_coords() {
    let combos = Combos::new().axis("a", [1, 2]).axis("b", [30, 40]);
    let spec = OutputSpec::new(["array1", "array2"]).with_shared_dims(["auto"]);
    let ds = combo_runner_to_ds(foo2_array_array, &combos, &spec, &RunOptions::new()).unwrap();
    let auto = ds.coord("auto").unwrap();
    assert_eq!(auto.dtype(), DType::Int);
    assert_eq!(auto.to_f64_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_undeclared_dims_are_auto_named() {
    let combos = Combos::new().axis("a", [1, 2]).axis("b", [30, 40]);
    let spec = OutputSpec::new(["up", "down"]);
    let ds = combo_runner_to_ds(foo2_array_array, &combos, &spec, &RunOptions::new()).unwrap();
    assert_eq!(ds.var("up").unwrap().dims(), &["a", "b", "up_dim_0"]);
    assert_eq!(ds.var("down").unwrap().dims(), &["a", "b", "down_dim_0"]);
    assert_eq!(ds.coord("up_dim_0").unwrap().len(), 5);
}

#[test]
fn test_complex_output() {
    let combos = Combos::new().axis("a", [1, 2]).axis("b", [30, 40]);
    let spec = OutputSpec::new(["array1", "array2"]).with_shared_dims(["auto"]);
    let ds = combo_runner_to_ds(foo2_zarray1_zarray2, &combos, &spec, &RunOptions::new())
        .unwrap();
    for name in ["array1", "array2"] {
        let var = ds.var(name).unwrap();
        assert_eq!(var.values().len(), 2 * 2 * 5);
        assert_eq!(var.dtype(), DType::Complex);
    }

    let up = ds.array("array1").unwrap().sel([("a", 2), ("b", 30)]).unwrap();
    let down = ds.array("array2").unwrap().sel([("a", 2), ("b", 30)]).unwrap();
    for i in 0..5i32 {
        let step = Complex64::new(0.0, 0.1 * f64::from(i));
        let got_up = up.values()[i as usize].as_complex().unwrap();
        let got_down = down.values()[i as usize].as_complex().unwrap();
        assert_relative_eq!((got_up - (32.0 + step)).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!((got_down - (32.0 - step)).norm(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_spec_checked_before_running() {
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let spec = OutputSpec::new(["x", "y", "z"]).with_dims([vec!["t"], vec!["t"]]);
    let err = combo_runner_to_ds(
        |_| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok::<_, SweepError>(0)
        },
        &ab(),
        &spec,
        &RunOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::VarDimsMismatch { vars: 3, dims: 2 }));
    assert_eq!(calls.into_inner(), 0);
}

#[test]
fn test_var_coords_length_checked() {
    let spec = OutputSpec::single("bananas")
        .with_shared_dims(["sugar"])
        .with_coord("sugar", 0..3);
    let err = combo_runner_to_ds(foo2_array, &ab(), &spec, &RunOptions::new()).unwrap_err();
    assert!(matches!(err, SweepError::ShapeMismatch { expected: 3, found: 10, .. }));
}

#[test]
fn test_duplicate_axis_values_rejected_before_running() {
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let err = combo_runner_to_ds(
        |_| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok::<_, SweepError>(0)
        },
        &Combos::single("a", [1, 1]),
        &OutputSpec::single("x"),
        &RunOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::DuplicateCoordinate { .. }));
    assert_eq!(calls.into_inner(), 0);
}

#[test]
fn test_duplicate_var_coords_rejected_before_running() {
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let spec = OutputSpec::single("x")
        .with_shared_dims(["t"])
        .with_coord("t", [0.5, 0.5]);
    let err = combo_runner_to_ds(
        |_| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok::<_, SweepError>(vec![1.0, 2.0])
        },
        &ab(),
        &spec,
        &RunOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::DuplicateCoordinate { .. }));
    assert_eq!(calls.into_inner(), 0);
}
