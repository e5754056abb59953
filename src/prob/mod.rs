pub mod abilities;
pub mod binomial;
pub mod chance;
pub mod damage;
pub mod dice;
pub mod outcome;
pub mod pmf;

pub use abilities::{
    crit_pierce_save_chance, crits_add_bonus_hits, crits_add_one_mortal, crits_to_mortal_damage,
    lethal_hit_wound_chance,
};
pub use binomial::{binomial_coefficient, trial_probability};
pub use chance::{apply_reroll, success_chance, Reroll, SuccessChance};
pub use damage::{
    apply_damage, casualties_from_damage, casualties_from_hits_threshold, mortal_survival_chance,
    shake_damage,
};
pub use dice::parse_dice_expression;
pub use outcome::{InvariantError, OutcomeDist};
pub use pmf::{convolve_n, threshold_convolve_n, Pmf, ThresholdDist, SUM_TOLERANCE};
