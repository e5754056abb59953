//! Joint distribution of a primary success count and the mortal-wound damage
//! riding alongside each count bucket.

use std::fmt;

use crate::prob::binomial::trial_probability;
use crate::prob::pmf::{Pmf, SUM_TOLERANCE};

/// A stage's output: `normal[k]` is the probability of exactly k primary
/// successes, and `mortal[k][m]` the joint probability of k primary successes
/// together with m points of mortal damage.
///
/// Convention: each `mortal[k]` row holds unnormalized joint mass and sums to
/// `normal[k]`, so redistribution across buckets needs no renormalization and
/// a zero-probability bucket simply carries an all-zero row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeDist {
    pub normal: Vec<f64>,
    pub mortal: Vec<Vec<f64>>,
}

impl OutcomeDist {
    /// Lifts a plain count distribution into the joint form with zero mortal
    /// damage attached to every bucket.
    pub fn from_pmf(pmf: &Pmf) -> Self {
        let normal = pmf.values().to_vec();
        let mortal = normal.iter().map(|&mass| vec![mass]).collect();
        Self { normal, mortal }
    }

    /// All-zero distribution with `len` buckets.
    pub(crate) fn zeroed(len: usize) -> Self {
        Self {
            normal: vec![0.0; len],
            mortal: vec![Vec::new(); len],
        }
    }

    /// Extends the bucket range; new buckets start empty.
    pub(crate) fn ensure_len(&mut self, len: usize) {
        if self.normal.len() < len {
            self.normal.resize(len, 0.0);
            self.mortal.resize(len, Vec::new());
        }
    }

    /// The pipeline-stage operator: redistributes each trial-count bucket
    /// binomially over success counts at per-trial pass probability `p`,
    /// carrying the attached mortal mass pro-rata. The mortal distribution
    /// keeps its shape; only the bucket it is filed under changes.
    pub fn filter(&self, p: f64) -> Self {
        let mut out = Self::zeroed(self.normal.len());
        for (trials, &mass) in self.normal.iter().enumerate() {
            if mass == 0.0 {
                continue;
            }
            let row = &self.mortal[trials];
            for successes in 0..=trials {
                let weight = trial_probability(trials as u32, successes as u32, p);
                if weight == 0.0 {
                    continue;
                }
                out.normal[successes] += mass * weight;
                add_scaled(&mut out.mortal[successes], row, weight);
            }
        }
        out
    }

    /// Mortal damage marginal, summed across all primary-count buckets.
    pub fn mortal_collapsed(&self) -> Vec<f64> {
        let mut collapsed = Vec::new();
        for row in &self.mortal {
            add_scaled(&mut collapsed, row, 1.0);
        }
        collapsed
    }

    pub fn expected_normal(&self) -> f64 {
        self.normal
            .iter()
            .enumerate()
            .map(|(value, p)| value as f64 * p)
            .sum()
    }

    pub fn expected_mortal(&self) -> f64 {
        self.mortal
            .iter()
            .flat_map(|row| row.iter().enumerate())
            .map(|(value, p)| value as f64 * p)
            .sum()
    }

    /// Correctness self-test for the joint-mass invariants. Bugs here are
    /// silent and numerically subtle, so stages assert this in debug builds
    /// and the test suite checks it after every transformation.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.normal.len() != self.mortal.len() {
            return Err(InvariantError::LengthMismatch {
                normal: self.normal.len(),
                mortal: self.mortal.len(),
            });
        }

        let mut normal_sum = 0.0;
        for (bucket, &mass) in self.normal.iter().enumerate() {
            if mass < -1e-12 {
                return Err(InvariantError::NegativeProbability { bucket });
            }
            let mut row_sum = 0.0;
            for &joint in &self.mortal[bucket] {
                if joint < -1e-12 {
                    return Err(InvariantError::NegativeProbability { bucket });
                }
                row_sum += joint;
            }
            if (row_sum - mass).abs() > SUM_TOLERANCE {
                return Err(InvariantError::MortalRowMismatch {
                    bucket,
                    row_sum,
                    normal: mass,
                });
            }
            normal_sum += mass;
        }

        if (normal_sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(InvariantError::NormalSum { sum: normal_sum });
        }
        Ok(())
    }
}

/// Adds `source * weight` into `target`, growing `target` as needed.
pub(crate) fn add_scaled(target: &mut Vec<f64>, source: &[f64], weight: f64) {
    if target.len() < source.len() {
        target.resize(source.len(), 0.0);
    }
    for (slot, &value) in target.iter_mut().zip(source) {
        *slot += value * weight;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvariantError {
    LengthMismatch { normal: usize, mortal: usize },
    NegativeProbability { bucket: usize },
    MortalRowMismatch { bucket: usize, row_sum: f64, normal: f64 },
    NormalSum { sum: f64 },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { normal, mortal } => {
                write!(f, "mismatched lengths: normal={normal}, mortal={mortal}")
            }
            Self::NegativeProbability { bucket } => {
                write!(f, "negative probability in bucket {bucket}")
            }
            Self::MortalRowMismatch {
                bucket,
                row_sum,
                normal,
            } => write!(
                f,
                "mortal row {bucket} sums to {row_sum}, expected {normal}"
            ),
            Self::NormalSum { sum } => {
                write!(f, "normal probabilities sum to {sum}, expected 1.0")
            }
        }
    }
}

impl std::error::Error for InvariantError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prob::dice::parse_dice_expression;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "expected {b}, got {a}");
    }

    #[test]
    fn from_pmf_attaches_zero_mortals() {
        let dist = OutcomeDist::from_pmf(&Pmf::uniform_die(3));
        dist.check_invariants().expect("fresh dist is valid");
        assert_eq!(dist.mortal[2], vec![1.0 / 3.0]);
    }

    #[test]
    fn filter_single_trial_splits_mass() {
        let dist = OutcomeDist::from_pmf(&parse_dice_expression("1"));
        let filtered = dist.filter(1.0 / 3.0);
        approx_eq(filtered.normal[0], 2.0 / 3.0);
        approx_eq(filtered.normal[1], 1.0 / 3.0);
        approx_eq(filtered.mortal[0][0], 2.0 / 3.0);
        approx_eq(filtered.mortal[1][0], 1.0 / 3.0);
        filtered.check_invariants().expect("filter preserves mass");
    }

    #[test]
    fn filter_preserves_mass_at_any_probability() {
        let dist = OutcomeDist::from_pmf(&parse_dice_expression("2d6"));
        for &p in &[0.0, 0.25, 0.5, 1.0] {
            let filtered = dist.filter(p);
            filtered.check_invariants().expect("mass preserved");
        }
    }

    #[test]
    fn filter_carries_mortal_shape_between_buckets() {
        // Two trials, bucket 2 carries one mortal wound of mass 0.5.
        let dist = OutcomeDist {
            normal: vec![0.5, 0.0, 0.5],
            mortal: vec![vec![0.5], Vec::new(), vec![0.0, 0.5]],
        };
        let filtered = dist.filter(0.5);
        // Bucket 2 splits 1/4 : 1/2 : 1/4; its mortal rides along.
        approx_eq(filtered.mortal[0][1], 0.5 * 0.25);
        approx_eq(filtered.mortal[1][1], 0.5 * 0.5);
        approx_eq(filtered.mortal[2][1], 0.5 * 0.25);
        filtered.check_invariants().expect("mass preserved");
    }

    #[test]
    fn invariant_check_catches_bad_rows() {
        let broken = OutcomeDist {
            normal: vec![0.5, 0.5],
            mortal: vec![vec![0.5], vec![0.25]],
        };
        assert!(matches!(
            broken.check_invariants(),
            Err(InvariantError::MortalRowMismatch { bucket: 1, .. })
        ));
    }

    #[test]
    fn invariant_check_catches_bad_total() {
        let broken = OutcomeDist {
            normal: vec![0.5, 0.25],
            mortal: vec![vec![0.5], vec![0.25]],
        };
        assert!(matches!(
            broken.check_invariants(),
            Err(InvariantError::NormalSum { .. })
        ));
    }
}
