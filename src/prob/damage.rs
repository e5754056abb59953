//! Damage, damage mitigation, and casualty reduction.

use crate::prob::binomial::trial_probability;
use crate::prob::outcome::OutcomeDist;
use crate::prob::pmf::{convolve_n, threshold_convolve_n, Pmf};

/// Feel-no-pain / ward style mitigation: each point of damage is negated
/// independently on `negate_on`+.
///
/// Mass is shifted down by the binomial count of negated points. Buckets are
/// processed in increasing order; shifts only ever move mass downward, so no
/// bucket is processed twice.
pub fn shake_damage(damage: &Pmf, negate_on: Option<i32>) -> Pmf {
    let Some(threshold) = negate_on else {
        return damage.clone();
    };
    let negate_chance = f64::from(7 - threshold.clamp(2, 7)) / 6.0;

    let values = damage.values();
    let mut result = vec![0.0; values.len()];
    result[0] = values[0];
    for dealt in 1..values.len() {
        if values[dealt] == 0.0 {
            continue;
        }
        result[dealt] += values[dealt];
        for negated in 1..=dealt {
            let delta =
                values[dealt] * trial_probability(dealt as u32, negated as u32, negate_chance);
            result[dealt] -= delta;
            result[dealt - negated] += delta;
        }
    }
    Pmf::from_values(result)
}

/// Chance a single mortal wound gets through the negation roll.
pub fn mortal_survival_chance(negate_on: Option<i32>) -> f64 {
    match negate_on {
        None => 1.0,
        Some(threshold) => 1.0 - f64::from(7 - threshold.clamp(2, 7)) / 6.0,
    }
}

/// Converts an unsaved-wound distribution into a flat damage distribution:
/// each count bucket convolves that many copies of the (mitigated) per-hit
/// damage die, then the bucket's mortal wounds are added on top, each
/// surviving the same mitigation independently.
pub fn apply_damage(unsaved: &OutcomeDist, damage: &Pmf, negate_on: Option<i32>) -> Pmf {
    let mitigated = shake_damage(damage, negate_on);
    let mortal_chance = mortal_survival_chance(negate_on);

    let mut out: Vec<f64> = Vec::new();
    for (count, row) in unsaved.mortal.iter().enumerate() {
        if row.iter().all(|&joint| joint == 0.0) {
            continue;
        }
        let per_hit = convolve_n(count, &mitigated);
        for (dealt, &dealt_p) in per_hit.values().iter().enumerate() {
            if dealt_p == 0.0 {
                continue;
            }
            for (mortals, &joint) in row.iter().enumerate() {
                if joint == 0.0 {
                    continue;
                }
                for surviving in 0..=mortals {
                    let weight =
                        trial_probability(mortals as u32, surviving as u32, mortal_chance);
                    bump(&mut out, dealt + surviving, dealt_p * joint * weight);
                }
            }
        }
    }
    Pmf::from_values(out)
}

/// Casualty count from a flat damage distribution: straight integer division
/// by the wounds-per-model threshold.
pub fn casualties_from_damage(damage: &Pmf, wounds_per_model: u32) -> Pmf {
    if wounds_per_model == 0 {
        return Pmf::point_mass(0);
    }
    let per_model = wounds_per_model as usize;
    let mut out = vec![0.0; (damage.len() - 1) / per_model + 1];
    for (dealt, &p) in damage.values().iter().enumerate() {
        out[dealt / per_model] += p;
    }
    Pmf::from_values(out)
}

/// Casualty count computed straight from the unsaved-wound counts, capping
/// damage per model at the wounds threshold via [threshold_convolve_n]
/// instead of materializing the unbounded damage sum. Mortal wounds spill
/// into the leftover damage on the current model.
pub fn casualties_from_hits_threshold(
    unsaved: &OutcomeDist,
    damage: &Pmf,
    wounds_per_model: u32,
    negate_on: Option<i32>,
) -> Pmf {
    if wounds_per_model == 0 {
        return Pmf::point_mass(0);
    }
    let per_model = wounds_per_model as usize;
    let mitigated = shake_damage(damage, negate_on);
    let mortal_chance = mortal_survival_chance(negate_on);

    let mut out: Vec<f64> = Vec::new();
    for (count, row) in unsaved.mortal.iter().enumerate() {
        if row.iter().all(|&joint| joint == 0.0) {
            continue;
        }
        let per_hit = threshold_convolve_n(count, &mitigated, per_model);
        for (killed, cells) in per_hit.cells.iter().enumerate() {
            for (partial, &killed_p) in cells.iter().enumerate() {
                if killed_p == 0.0 {
                    continue;
                }
                for (mortals, &joint) in row.iter().enumerate() {
                    if joint == 0.0 {
                        continue;
                    }
                    for surviving in 0..=mortals {
                        let weight =
                            trial_probability(mortals as u32, surviving as u32, mortal_chance);
                        let casualties = killed + (partial + surviving) / per_model;
                        bump(&mut out, casualties, killed_p * joint * weight);
                    }
                }
            }
        }
    }
    Pmf::from_values(out)
}

fn bump(values: &mut Vec<f64>, index: usize, delta: f64) {
    if values.len() <= index {
        values.resize(index + 1, 0.0);
    }
    values[index] += delta;
}
