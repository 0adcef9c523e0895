//! Sampling and regression helpers for curve linearization.

/// Returns `n` evenly spaced values from `start` to `end`, both inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty vector.
///
/// # Examples
///
/// ```
/// use ctes_prep::chiller::sampling::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Ordinary least-squares slope of `y` against `x` (degree-1 fit).
///
/// Returns 0.0 when fewer than two points are given or all `x` coincide.
pub fn least_squares_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (xi, yi) in x[..n].iter().zip(&y[..n]) {
        let dx = xi - mean_x;
        sxy += dx * (yi - mean_y);
        sxx += dx * dx;
    }

    if sxx > 0.0 { sxy / sxx } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_endpoints_exact() {
        let v = linspace(6.6667, 11.4, 50);
        assert_eq!(v.len(), 50);
        assert_eq!(v[0], 6.6667);
        assert_eq!(v[49], 11.4);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn linspace_degenerate_sizes() {
        assert!(linspace(1.0, 2.0, 0).is_empty());
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
    }

    #[test]
    fn slope_of_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 2.5 * v - 1.0).collect();
        assert!((least_squares_slope(&x, &y) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn slope_of_noisy_points() {
        // mean (2.0, 2.0); sxy = 9.8, sxx = 10
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.1, 0.9, 2.0, 3.1, 3.9];
        assert!((least_squares_slope(&x, &y) - 0.98).abs() < 1e-9);
    }

    #[test]
    fn slope_degenerate_inputs() {
        assert_eq!(least_squares_slope(&[1.0], &[2.0]), 0.0);
        assert_eq!(least_squares_slope(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
