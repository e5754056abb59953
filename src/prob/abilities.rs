//! Critical-trigger transformations applied to a stage's output
//! distribution, plus the probability mixtures for effects that carry into
//! the next stage.
//!
//! `crit_share` throughout is the probability that a *passing* roll was a
//! critical (see [SuccessChance::crit_given_pass]).

use crate::prob::binomial::trial_probability;
use crate::prob::chance::SuccessChance;
use crate::prob::outcome::{add_scaled, OutcomeDist};
use crate::prob::pmf::{convolve_n, Pmf};

/// Criticals leave the primary count entirely and instead deal their damage
/// as mortal wounds: n criticals roll n dice from `damage` and merge the
/// total into the mortal distribution at the reduced bucket.
pub fn crits_to_mortal_damage(dist: &OutcomeDist, crit_share: f64, damage: &Pmf) -> OutcomeDist {
    let mut out = OutcomeDist::zeroed(dist.normal.len());
    for (count, &mass) in dist.normal.iter().enumerate() {
        if mass == 0.0 {
            continue;
        }
        let row = &dist.mortal[count];
        for crits in 0..=count {
            let weight = trial_probability(count as u32, crits as u32, crit_share);
            if weight == 0.0 {
                continue;
            }
            out.normal[count - crits] += mass * weight;

            let rolled = convolve_n(crits, damage);
            let target = &mut out.mortal[count - crits];
            for (existing, &joint) in row.iter().enumerate() {
                if joint == 0.0 {
                    continue;
                }
                for (extra, &damage_p) in rolled.values().iter().enumerate() {
                    if damage_p == 0.0 {
                        continue;
                    }
                    let slot = existing + extra;
                    if target.len() <= slot {
                        target.resize(slot + 1, 0.0);
                    }
                    target[slot] += joint * weight * damage_p;
                }
            }
        }
    }
    out
}

/// Criticals stay in the primary count and each adds exactly one mortal
/// wound: within every bucket the mortal index shifts up binomially.
pub fn crits_add_one_mortal(dist: &OutcomeDist, crit_share: f64) -> OutcomeDist {
    let mut out = OutcomeDist::zeroed(dist.normal.len());
    for (count, &mass) in dist.normal.iter().enumerate() {
        out.normal[count] = mass;
        if mass == 0.0 {
            continue;
        }
        let row = &dist.mortal[count];
        let target = &mut out.mortal[count];
        for crits in 0..=count {
            let weight = trial_probability(count as u32, crits as u32, crit_share);
            if weight == 0.0 {
                continue;
            }
            for (existing, &joint) in row.iter().enumerate() {
                let slot = existing + crits;
                if target.len() <= slot {
                    target.resize(slot + 1, 0.0);
                }
                target[slot] += joint * weight;
            }
        }
    }
    out
}

/// Criticals generate extra successes. Each critical rolls the `bonus`
/// distribution for how many extra dice it grants; each extra die lands with
/// `bonus_pass_chance` (1.0 for guaranteed bonus hits, the stage's own pass
/// chance for bonus *rolls* that must still pass).
///
/// Moved mass keeps its mortal profile: the bucket grows, the attached
/// damage does not change.
pub fn crits_add_bonus_hits(
    dist: &OutcomeDist,
    bonus: &Pmf,
    bonus_pass_chance: f64,
    crit_share: f64,
) -> OutcomeDist {
    let mut out = OutcomeDist::zeroed(dist.normal.len());
    for (count, &mass) in dist.normal.iter().enumerate() {
        if mass == 0.0 {
            continue;
        }
        let row = &dist.mortal[count];
        for crits in 0..=count {
            let crit_weight = trial_probability(count as u32, crits as u32, crit_share);
            if crit_weight == 0.0 {
                continue;
            }
            for (bonus_dice, &bonus_p) in bonus.values().iter().enumerate() {
                if bonus_p == 0.0 {
                    continue;
                }
                let attempts = bonus_dice * crits;
                for landed in 0..=attempts {
                    let landed_weight =
                        trial_probability(attempts as u32, landed as u32, bonus_pass_chance);
                    if landed_weight == 0.0 {
                        continue;
                    }
                    let scale = crit_weight * bonus_p * landed_weight;
                    out.ensure_len(count + landed + 1);
                    out.normal[count + landed] += mass * scale;
                    add_scaled(&mut out.mortal[count + landed], row, scale);
                }
            }
        }
    }
    out
}

/// Hits that were hit-stage criticals wound automatically; the rest take the
/// ordinary wound roll. Probability-weighted mixture, not an override.
pub fn lethal_hit_wound_chance(wound: SuccessChance, hit_crit_share: f64) -> SuccessChance {
    let ordinary = 1.0 - hit_crit_share;
    SuccessChance {
        pass_chance: hit_crit_share + wound.pass_chance * ordinary,
        fail_chance: wound.fail_chance * ordinary,
        six_chance: wound.six_chance * ordinary,
    }
}

/// Critical wounds take the best of the AP-boosted save and the invulnerable
/// save; ordinary wounds keep the base save. After the blend the pass and
/// fail chances describe the mixture, and the critical tier is spent.
pub fn crit_pierce_save_chance(
    base: SuccessChance,
    pierced: SuccessChance,
    invulnerable: SuccessChance,
    wound_crit_share: f64,
) -> SuccessChance {
    let best = if invulnerable.pass_chance > pierced.pass_chance {
        invulnerable
    } else {
        pierced
    };
    let ordinary = 1.0 - wound_crit_share;
    SuccessChance {
        pass_chance: wound_crit_share * best.pass_chance + ordinary * base.pass_chance,
        fail_chance: wound_crit_share * best.fail_chance + ordinary * base.fail_chance,
        six_chance: 0.0,
    }
}
