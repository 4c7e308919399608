//! Differencing utilities shared by training and forecast preparation.

/// Apply first-order differencing `d` times consecutively.
///
/// Each pass maps `y_t <- y_t - y_{t-1}` and drops the leading point, so
/// the result is `d` elements shorter than the input. This is iterated
/// differencing, not one-shot polynomial differencing of order `d`.
///
/// # Example
/// ```
/// use bayesian_sarima::diff::difference;
///
/// let diffed = difference(&[1.0, 3.0, 6.0, 10.0], 1);
/// assert_eq!(diffed, vec![2.0, 3.0, 4.0]);
/// ```
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing at stride `m`, iterated `D` times.
///
/// Each pass maps `y_t <- y_t - y_{t-m}` and drops the leading `m` points.
/// Training composes nonseasonal-then-seasonal differencing in that order.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Reverse `d` rounds of first-order differencing on a forecast.
///
/// `original` is the undifferenced history the forecast continues from; it
/// supplies the integration constants at each differencing level.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || differenced.is_empty() {
        return differenced.to_vec();
    }

    // The last history value at every differencing depth seeds one round
    // of cumulative summation, deepest depth first.
    let mut seeds: Vec<f64> = (0..d)
        .map(|depth| difference(original, depth).last().copied().unwrap_or(0.0))
        .collect();

    let mut out = differenced.to_vec();
    while let Some(seed) = seeds.pop() {
        let mut level = seed;
        for value in &mut out {
            level += *value;
            *value = level;
        }
    }
    out
}
