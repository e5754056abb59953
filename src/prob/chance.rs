//! Single-die success model: pass, fail, and critical chances for one trial,
//! with threshold modifiers and reroll policies.

use serde::{Deserialize, Serialize};

/// Probabilities for a single roll against a threshold.
///
/// `six_chance` is the unconditional probability of reaching the critical
/// threshold; use [SuccessChance::crit_given_pass] for the share of passing
/// rolls that were criticals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuccessChance {
    pub pass_chance: f64,
    pub fail_chance: f64,
    pub six_chance: f64,
}

impl SuccessChance {
    /// No stat given: the roll always succeeds but triggers nothing special.
    pub fn auto_pass() -> Self {
        Self {
            pass_chance: 1.0,
            fail_chance: 0.0,
            six_chance: 0.0,
        }
    }

    /// No save available: the roll always fails.
    pub fn auto_fail() -> Self {
        Self {
            pass_chance: 0.0,
            fail_chance: 1.0,
            six_chance: 0.0,
        }
    }

    pub fn is_auto_pass(&self) -> bool {
        self.pass_chance >= 1.0
    }

    /// Probability that a roll which passed was a critical. Zero-probability
    /// passes carry no criticals rather than dividing by zero.
    pub fn crit_given_pass(&self) -> f64 {
        if self.pass_chance <= 0.0 {
            0.0
        } else {
            (self.six_chance / self.pass_chance).min(1.0)
        }
    }
}

/// Chance that a single die roll passes `stat`+ after `modifier`, with an
/// optional critical threshold `crit` (criticals always pass).
///
/// A missing stat auto-passes. The modified threshold is clamped to [2, 7]:
/// a natural 1 always fails, and 7 marks an impossible roll.
pub fn success_chance(stat: Option<i32>, crit: Option<i32>, modifier: i32) -> SuccessChance {
    let Some(stat) = stat else {
        return SuccessChance::auto_pass();
    };

    // A natural 1 always fails and a natural 6 always passes, so the critical
    // threshold only makes sense in [2, 6].
    let crit = crit.map(|value| value.clamp(2, 6));

    let mut effective = (stat.clamp(2, 7) - modifier).clamp(2, 7);
    if let Some(crit) = crit {
        // Criticals always pass, even through a hostile modifier.
        if effective > crit {
            effective = crit;
        }
    }

    let pass_chance = f64::from(7 - effective) / 6.0;
    SuccessChance {
        pass_chance,
        fail_chance: 1.0 - pass_chance,
        six_chance: crit.map_or(0.0, |crit| f64::from(7 - crit) / 6.0),
    }
}

/// Reroll policy applied on top of a [SuccessChance].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reroll {
    #[default]
    None,
    /// Reroll natural 1s. A natural 1 turns up on 1/6 of all dice regardless
    /// of modifiers.
    Ones,
    /// Reroll every failed roll.
    Failures,
    /// Reroll everything short of a critical, even successes.
    NonCritical,
}

/// Applies a reroll policy, scaling the critical chance by the same
/// survival factor as the pass chance.
pub fn apply_reroll(chance: SuccessChance, policy: Reroll) -> SuccessChance {
    let (pass, six) = match policy {
        Reroll::None => return chance,
        Reroll::Ones => (
            chance.pass_chance + chance.pass_chance / 6.0,
            chance.six_chance + chance.six_chance / 6.0,
        ),
        Reroll::Failures => (
            chance.pass_chance + chance.fail_chance * chance.pass_chance,
            chance.six_chance + chance.fail_chance * chance.six_chance,
        ),
        Reroll::NonCritical => {
            let noncrit = 1.0 - chance.six_chance;
            (
                chance.six_chance + noncrit * chance.pass_chance,
                chance.six_chance + noncrit * chance.six_chance,
            )
        }
    };

    // Rerolling 1s on an auto-pass would push past certainty.
    let pass_chance = pass.min(1.0);
    SuccessChance {
        pass_chance,
        fail_chance: 1.0 - pass_chance,
        six_chance: six.min(pass_chance),
    }
}
