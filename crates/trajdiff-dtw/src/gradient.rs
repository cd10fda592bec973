//! Numerical gradient with unit sample spacing.

/// Elementwise numerical gradient of `values` with unit spacing and
/// first-order edges.
///
/// Interior points use central differences `(x[i+1] - x[i-1]) / 2`; the first
/// and last points use one-sided differences. Output has the same length as
/// the input. A single sample has gradient `[0.0]`, an empty input gives an
/// empty output.
#[must_use]
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut out = Vec::with_capacity(n);
            out.push(values[1] - values[0]);
            out.extend(values.windows(3).map(|w| (w[2] - w[0]) / 2.0));
            out.push(values[n - 1] - values[n - 2]);
            out
        }
    }
}
