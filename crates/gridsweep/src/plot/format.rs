//! Short labels for coordinate values and axis ticks.

use gridsweep_core::Value;

/// Format a float with at most four decimals, trimming trailing zeros, or in
/// scientific notation when it is very large or very small.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-3..1e6).contains(&abs) {
        return format!("{v:.2e}");
    }
    let fixed = format!("{v:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Label for a coordinate value in titles and legends.
pub fn prettify(value: &Value) -> String {
    match value {
        Value::Float(v) => format_number(*v),
        Value::Complex(z) if z.im < 0.0 => {
            format!("{}-{}j", format_number(z.re), format_number(-z.im))
        }
        Value::Complex(z) => format!("{}+{}j", format_number(z.re), format_number(z.im)),
        other => other.to_string(),
    }
}

/// Tick label for an axis position. On log axes the position is a power of
/// ten and the label shows the data value.
pub fn tick_label(v: f64, log: bool) -> String {
    if log {
        format_number(10f64.powf(v))
    } else {
        format_number(v)
    }
}

/// `n` evenly spaced positions spanning `[lo, hi]`.
pub fn tick_positions(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![(lo + hi) / 2.0],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}
