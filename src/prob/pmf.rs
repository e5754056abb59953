//! Dense discrete probability distributions over small integer outcomes.
//!
//! Index i holds the probability of outcome value i. Every published
//! distribution sums to 1 within [SUM_TOLERANCE]; intermediate buffers are
//! built in place and wrapped once complete.

use serde::{Deserialize, Serialize};

/// Tolerance for the sum-to-one invariant. Matches the validation threshold
/// used by the debug checks across the pipeline.
pub const SUM_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pmf {
    values: Vec<f64>,
}

impl Pmf {
    /// Distribution that always produces `value`.
    pub fn point_mass(value: usize) -> Self {
        let mut values = vec![0.0; value + 1];
        values[value] = 1.0;
        Self { values }
    }

    /// Uniform die with faces 1..=sides. Face 0 carries zero mass, so sums of
    /// these compose with dice that genuinely can roll a 0.
    pub fn uniform_die(sides: usize) -> Self {
        let sides = sides.max(1);
        let mut values = vec![1.0 / sides as f64; sides + 1];
        values[0] = 0.0;
        Self { values }
    }

    /// Wraps a raw buffer. An empty buffer degrades to the point mass at 0 so
    /// downstream stages never observe a zero-length distribution.
    pub fn from_values(values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::point_mass(0);
        }
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Probability of outcome `value`; out-of-range outcomes have zero mass.
    pub fn get(&self, value: usize) -> f64 {
        self.values.get(value).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn sums_to_one(&self) -> bool {
        (self.sum() - 1.0).abs() <= SUM_TOLERANCE
    }

    pub fn expected_value(&self) -> f64 {
        self.values
            .iter()
            .enumerate()
            .map(|(value, p)| value as f64 * p)
            .sum()
    }

    /// Complementary cumulative distribution: entry i is P(outcome >= i).
    pub fn ccdf(&self) -> Vec<f64> {
        let mut remaining = self.sum();
        self.values
            .iter()
            .map(|p| {
                let at_least = remaining;
                remaining -= p;
                at_least
            })
            .collect()
    }

    /// Distribution of the sum of one draw from `self` and one from `other`.
    pub fn convolve(&self, other: &Pmf) -> Pmf {
        let mut sum = vec![0.0; self.len() + other.len() - 1];
        for (i, &a) in self.values.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in other.values.iter().enumerate() {
                sum[i + j] += a * b;
            }
        }
        Pmf::from_values(sum)
    }
}

/// Distribution of the sum of `n` independent draws from `die`.
///
/// Iterative pairwise convolution rather than a closed form: the die may be
/// non-uniform after ability shaping, and may include a face valued 0.
pub fn convolve_n(n: usize, die: &Pmf) -> Pmf {
    if n == 0 {
        return Pmf::point_mass(0);
    }
    let sides = die.len() - 1;
    let mut acc = vec![0.0; n * sides + 1];
    acc[..die.len()].copy_from_slice(die.values());
    for rolled in 2..=n {
        let mut next = vec![0.0; n * sides + 1];
        for (face, &face_p) in die.values().iter().enumerate() {
            if face_p == 0.0 {
                continue;
            }
            for j in 0..=(rolled - 1) * sides {
                next[face + j] += face_p * acc[j];
            }
        }
        acc = next;
    }
    Pmf::from_values(acc)
}

/// Joint distribution over (successes, partial remainder) produced by
/// [threshold_convolve_n]. `cells[s][v]` is the probability of exactly `s`
/// completed thresholds with `v` leftover points toward the next one
/// (0 <= v < threshold).
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdDist {
    pub cells: Vec<Vec<f64>>,
}

impl ThresholdDist {
    /// Marginal distribution of the success count.
    pub fn success_pmf(&self) -> Pmf {
        Pmf::from_values(self.cells.iter().map(|row| row.iter().sum()).collect())
    }
}

/// Rolls `n` dice, bucketing the running total: whenever it reaches
/// `threshold` a success is recorded and the excess is reset to 0.
///
/// Keeps the state space bounded by the threshold instead of by the full
/// multi-die total, which is what makes per-model damage caps tractable.
pub fn threshold_convolve_n(n: usize, die: &Pmf, threshold: usize) -> ThresholdDist {
    let threshold = threshold.max(1);
    if n == 0 {
        return ThresholdDist {
            cells: vec![vec![1.0]],
        };
    }

    let mut acc = zero_cells(2, threshold);
    for (face, &p) in die.values().iter().enumerate() {
        if face >= threshold {
            acc[1][0] += p;
        } else {
            acc[0][face] += p;
        }
    }

    for rolled in 2..=n {
        let mut next = zero_cells(rolled + 1, threshold);
        for (face, &face_p) in die.values().iter().enumerate() {
            if face_p == 0.0 {
                continue;
            }
            for (successes, row) in acc.iter().enumerate() {
                for (partial, &mass) in row.iter().enumerate() {
                    if mass == 0.0 {
                        continue;
                    }
                    let total = partial + face;
                    if total >= threshold {
                        next[successes + 1][0] += face_p * mass;
                    } else {
                        next[successes][total] += face_p * mass;
                    }
                }
            }
        }
        acc = next;
    }

    ThresholdDist { cells: acc }
}

fn zero_cells(rows: usize, width: usize) -> Vec<Vec<f64>> {
    vec![vec![0.0; width]; rows]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "expected {b}, got {a}");
    }

    #[test]
    fn point_mass_is_normalized() {
        let three = Pmf::point_mass(3);
        assert_eq!(three.len(), 4);
        approx_eq(three.get(3), 1.0);
        approx_eq(three.sum(), 1.0);
        approx_eq(three.expected_value(), 3.0);
    }

    #[test]
    fn uniform_die_has_no_zero_face() {
        let d6 = Pmf::uniform_die(6);
        approx_eq(d6.get(0), 0.0);
        approx_eq(d6.sum(), 1.0);
        approx_eq(d6.expected_value(), 3.5);
    }

    #[test]
    fn convolve_n_zero_and_one() {
        let d6 = Pmf::uniform_die(6);
        assert_eq!(convolve_n(0, &d6), Pmf::point_mass(0));
        assert_eq!(convolve_n(1, &d6), d6);
    }

    #[test]
    fn two_d6_matches_hand_count() {
        let total = convolve_n(2, &Pmf::uniform_die(6));
        approx_eq(total.sum(), 1.0);
        approx_eq(total.get(2), 1.0 / 36.0);
        approx_eq(total.get(7), 6.0 / 36.0);
        approx_eq(total.get(12), 1.0 / 36.0);
        approx_eq(total.expected_value(), 7.0);
    }

    #[test]
    fn convolution_is_commutative() {
        let a = Pmf::uniform_die(3);
        let b = Pmf::point_mass(2);
        assert_eq!(a.convolve(&b), b.convolve(&a));
    }

    #[test]
    fn ccdf_starts_at_one_and_decreases() {
        let d3 = Pmf::uniform_die(3);
        let ccdf = d3.ccdf();
        approx_eq(ccdf[0], 1.0);
        approx_eq(ccdf[1], 1.0);
        approx_eq(ccdf[2], 2.0 / 3.0);
        approx_eq(ccdf[3], 1.0 / 3.0);
    }

    #[test]
    fn threshold_cells_sum_to_one() {
        let d6 = Pmf::uniform_die(6);
        for n in 0..5 {
            let dist = threshold_convolve_n(n, &d6, 4);
            let total: f64 = dist.cells.iter().flatten().sum();
            approx_eq(total, 1.0);
        }
    }

    #[test]
    fn threshold_single_die_matches_direct_count() {
        // One die never carries excess past a second success, so the success
        // marginal must equal a plain face count against the threshold.
        let d6 = Pmf::uniform_die(6);
        let dist = threshold_convolve_n(1, &d6, 4);
        let successes = dist.success_pmf();
        approx_eq(successes.get(0), 3.0 / 6.0);
        approx_eq(successes.get(1), 3.0 / 6.0);
    }
}
