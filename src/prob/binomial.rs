//! Overflow-safe binomial combinatorics shared by every pipeline stage.

/// Computes n! / (k! * (n - k)!) without materializing either factorial.
///
/// Multiplication of the falling-factorial terms (n-k+1..=n) is interleaved
/// with division by the k! terms so the partial product stays close to the
/// final magnitude instead of running off to infinity for large n.
pub fn binomial_coefficient(n: u32, k: u32) -> f64 {
    debug_assert!(k <= n, "binomial_coefficient requires k <= n (got n={n}, k={k})");

    let numerator: Vec<f64> = (n - k + 1..=n).map(f64::from).collect();
    let denominator: Vec<f64> = (2..=k).map(f64::from).collect();

    let mut result = 1.0;
    for i in 0..numerator.len().max(denominator.len()) {
        if let Some(term) = numerator.get(i) {
            result *= term;
        }
        if let Some(term) = denominator.get(i) {
            result /= term;
        }
    }
    result
}

/// Probability of exactly `successes` passes out of `trials` independent
/// attempts that each pass with probability `p`.
///
/// Uses the 0^0 == 1 convention, so the degenerate p = 0 and p = 1 trials
/// contribute clean point masses instead of NaN.
pub fn trial_probability(trials: u32, successes: u32, p: f64) -> f64 {
    binomial_coefficient(trials, successes)
        * p.powi(successes as i32)
        * (1.0 - p).powi((trials - successes) as i32)
}
