//! Robust summary statistics over expression vectors.

/// Median of an ascending slice; 0 for an empty one.
///
/// ```
/// use aracne::libs::stat::median;
/// assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
/// assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
/// assert_eq!(median(&[]), 0.0);
/// ```
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }

    let lhs = (n - 1) / 2;
    let rhs = n / 2;

    if lhs == rhs {
        sorted[lhs]
    } else {
        (sorted[lhs] + sorted[rhs]) / 2.0
    }
}

/// Interquartile range of an ascending slice.
///
/// Q1 is the median of the first `(n + 2) / 2 - 1` values and Q3 the median of
/// the values from `(n + 1) / 2` onwards. A lower half of at most one value
/// falls back to the first value, an empty upper half to the last one.
pub fn interquartile_range(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }

    let lower = (n + 2) / 2 - 1;
    let q1 = if lower <= 1 {
        sorted[0]
    } else {
        median(&sorted[..lower])
    };

    let upper = &sorted[(n + 1) / 2..];
    let q3 = if upper.is_empty() {
        sorted[n - 1]
    } else {
        median(upper)
    };

    q3 - q1
}

/// Silverman-style smoothing scale for one-dimensional density estimation.
pub fn bandwidth(stdev: f64, iqr: f64, n: usize) -> f64 {
    let prop = 1.06; // Gaussian
    let dim = 1.0;

    let mut iqr_sig = 0.7413 * iqr;
    if iqr_sig == 0.0 {
        iqr_sig = stdev;
    }
    let sig = stdev.min(iqr_sig);

    prop * sig * (n as f64).powf(-1.0 / (dim + 4.0))
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance, 0 when fewer than two values are given.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let (s, ss) = values
        .iter()
        .fold((0.0, 0.0), |(s, ss), v| (s + v, ss + v * v));

    (ss - s * s / n as f64) / (n - 1) as f64
}

/// Population standard deviation.
pub fn population_stdev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let (s, ss) = values
        .iter()
        .fold((0.0, 0.0), |(s, ss), v| (s + v, ss + v * v));

    ((n * ss - s * s) / (n * n)).max(0.0).sqrt()
}
