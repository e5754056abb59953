//! The shared attack-resolution pipeline: attacks → hits → wounds → saves →
//! damage → casualties. Each stage consumes the previous stage's
//! distribution and a freshly computed success chance; rule-family
//! differences come in through [ruleset::RulesetProfile], not separate code
//! paths.

pub mod export_csv;
pub mod input;
pub mod ruleset;
pub mod sweep;

use serde::Serialize;

use crate::prob::{
    apply_damage, apply_reroll, casualties_from_damage, casualties_from_hits_threshold,
    crit_pierce_save_chance, crits_add_bonus_hits, crits_add_one_mortal, crits_to_mortal_damage,
    lethal_hit_wound_chance, parse_dice_expression, success_chance, OutcomeDist, Pmf, Reroll,
    SuccessChance,
};

pub use input::{CritEffect, RollInput, SaveReroll};
pub use ruleset::{wound_threshold, Ruleset, RulesetProfile};
pub use sweep::{run_sweep, run_sweep_parallel, SweepCase, SweepOutcome};

/// One stage's distributions and derived statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    /// Human-readable summary of what was rolled, e.g.
    /// "hit on 3+ (+1), reroll 1s".
    pub title: String,
    pub normal: Vec<f64>,
    /// Mortal-wound marginal, summed across count buckets; empty when the
    /// stage generated none.
    pub mortal: Vec<f64>,
    pub expected: f64,
    /// Entry i is the probability of at least i outcomes.
    pub ccdf: Vec<f64>,
}

impl StageReport {
    fn from_outcome(stage: &'static str, title: String, dist: &OutcomeDist) -> Self {
        let mut mortal = dist.mortal_collapsed();
        if mortal.len() <= 1 {
            mortal.clear();
        }
        Self::build(stage, title, dist.normal.clone(), mortal)
    }

    fn from_pmf(stage: &'static str, title: String, pmf: &Pmf) -> Self {
        Self::build(stage, title, pmf.values().to_vec(), Vec::new())
    }

    fn build(stage: &'static str, title: String, mut normal: Vec<f64>, mut mortal: Vec<f64>) -> Self {
        trim_tail(&mut normal, &mut mortal);
        let pmf = Pmf::from_values(normal.clone());
        Self {
            stage,
            title,
            expected: pmf.expected_value(),
            ccdf: pmf.ccdf(),
            normal,
            mortal,
        }
    }
}

/// Full pipeline output: one report per stage plus the shareable encoding of
/// the inputs that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct RollReport {
    pub ruleset: Ruleset,
    pub permalink: String,
    pub stages: Vec<StageReport>,
}

impl RollReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|stage| stage.stage == name)
    }
}

/// Evaluates one attack line under a ruleset. Pure function of its inputs;
/// malformed fields degrade to defaults rather than failing, so there is
/// always a distribution to show.
pub fn resolve(ruleset: Ruleset, input: &RollInput) -> RollReport {
    let profile = ruleset.profile();
    let damage_die = parse_dice_expression(&input.damage);

    let attacks = OutcomeDist::from_pmf(&parse_dice_expression(&input.attacks));
    let mut stages = Vec::with_capacity(6);
    stages.push(StageReport::from_outcome(
        "attacks",
        format!("{} attacks", input.attacks.trim()),
        &attacks,
    ));

    // Hits.
    let hit_mod = input.hit_mod.clamp(-1, 1);
    let hit_crit = if profile.crit_overrides {
        input.hit_crit.unwrap_or(6)
    } else {
        6
    };
    let hit_chance = apply_reroll(
        success_chance(input.hit, Some(hit_crit), hit_mod),
        input.hit_reroll,
    );
    let (hits, hit_title) = hit_stage(input, &attacks, hit_chance, &damage_die, hit_mod);
    debug_assert_eq!(hits.check_invariants(), Ok(()));
    stages.push(StageReport::from_outcome("hits", hit_title, &hits));

    // Wounds.
    let wound_stat = if profile.wound_from_strength {
        wound_threshold(input.strength, input.toughness)
    } else {
        input.wound
    };
    let wound_mod = input.wound_mod.clamp(-1, 1);
    let wound_crit = if profile.crit_overrides {
        input.wound_crit.unwrap_or(6)
    } else {
        6
    };
    let mut wound_chance = apply_reroll(
        success_chance(wound_stat, Some(wound_crit), wound_mod),
        input.wound_reroll,
    );
    if input.lethal_hits {
        wound_chance = lethal_hit_wound_chance(wound_chance, hit_chance.crit_given_pass());
    }
    let (wounds, wound_title) =
        wound_stage(input, &hits, wound_chance, &damage_die, wound_stat, wound_mod);
    debug_assert_eq!(wounds.check_invariants(), Ok(()));
    stages.push(StageReport::from_outcome("wounds", wound_title, &wounds));

    // Saves.
    let (unsaved, unsaved_title) = save_stage(&profile, input, &wounds, wound_chance);
    debug_assert_eq!(unsaved.check_invariants(), Ok(()));
    stages.push(StageReport::from_outcome("unsaved", unsaved_title, &unsaved));

    // Damage.
    let damage = apply_damage(&unsaved, &damage_die, input.feel_no_pain);
    debug_assert!(damage.sums_to_one());
    let mut damage_title = format!("{} damage", input.damage.trim());
    if let Some(threshold) = input.feel_no_pain {
        damage_title.push_str(&format!(" (shake on {threshold}+)"));
    }
    stages.push(StageReport::from_pmf("damage", damage_title, &damage));

    // Casualties.
    let killed = if profile.per_model_damage_cap {
        casualties_from_hits_threshold(
            &unsaved,
            &damage_die,
            input.wounds_per_model,
            input.feel_no_pain,
        )
    } else {
        casualties_from_damage(&damage, input.wounds_per_model)
    };
    debug_assert!(killed.sums_to_one());
    stages.push(StageReport::from_pmf(
        "killed",
        "models killed".to_string(),
        &killed,
    ));

    RollReport {
        ruleset,
        permalink: input.permalink(),
        stages,
    }
}

fn hit_stage(
    input: &RollInput,
    attacks: &OutcomeDist,
    chance: SuccessChance,
    damage_die: &Pmf,
    hit_mod: i32,
) -> (OutcomeDist, String) {
    let mut title = if chance.is_auto_pass() {
        "auto-hit".to_string()
    } else {
        let mut title = format!("hit on {}+", input.hit.unwrap_or(7));
        if hit_mod != 0 {
            title.push_str(&format!(" ({hit_mod:+})"));
        }
        title
    };
    title.push_str(&reroll_suffix(input.hit_reroll, "misses"));

    let mut hits = attacks.filter(chance.pass_chance);
    let crit_share = chance.crit_given_pass();

    match input.hit_crit_effect {
        CritEffect::MortalDamage => {
            hits = crits_to_mortal_damage(&hits, crit_share, damage_die);
            title.push_str(", 6s deal mortals");
        }
        CritEffect::PlusOneMortal => {
            hits = crits_add_one_mortal(&hits, crit_share);
            title.push_str(", 6s add 1 mortal");
        }
        CritEffect::None => {}
    }

    if let Some(expr) = &input.bonus_hits {
        let bonus = parse_dice_expression(expr);
        hits = crits_add_bonus_hits(&hits, &bonus, 1.0, crit_share);
        title.push_str(&format!(", 6s add {expr} extra hit(s)"));
    } else if let Some(expr) = &input.bonus_hit_rolls {
        let bonus = parse_dice_expression(expr);
        hits = crits_add_bonus_hits(&hits, &bonus, chance.pass_chance, crit_share);
        title.push_str(&format!(", 6s add {expr} hit roll(s)"));
    }

    if input.lethal_hits {
        title.push_str(", 6s autowound");
    }

    (hits, title)
}

fn wound_stage(
    input: &RollInput,
    hits: &OutcomeDist,
    chance: SuccessChance,
    damage_die: &Pmf,
    wound_stat: Option<i32>,
    wound_mod: i32,
) -> (OutcomeDist, String) {
    let mut title = if chance.is_auto_pass() {
        "auto-wound".to_string()
    } else {
        let mut title = format!("wound on {}+", wound_stat.unwrap_or(7));
        if wound_mod != 0 {
            title.push_str(&format!(" ({wound_mod:+})"));
        }
        title
    };
    title.push_str(&reroll_suffix(input.wound_reroll, "failed"));

    let mut wounds = hits.filter(chance.pass_chance);
    let crit_share = chance.crit_given_pass();

    match input.wound_crit_effect {
        CritEffect::MortalDamage => {
            wounds = crits_to_mortal_damage(&wounds, crit_share, damage_die);
            title.push_str(", 6s deal mortals");
        }
        CritEffect::PlusOneMortal => {
            wounds = crits_add_one_mortal(&wounds, crit_share);
            title.push_str(", 6s add 1 mortal");
        }
        CritEffect::None => {}
    }

    (wounds, title)
}

fn save_stage(
    profile: &RulesetProfile,
    input: &RollInput,
    wounds: &OutcomeDist,
    wound_chance: SuccessChance,
) -> (OutcomeDist, String) {
    // AP hurts the save regardless of which sign it was entered with.
    let ap = -input.ap.abs();
    // The save modifier proper never exceeds +1.
    let save_mod = input.save_mod.min(1);
    let mut total_mod = save_mod + ap;

    let mut cover = input.cover;
    if let (Some(best), Some(save)) = (profile.cover_restriction, input.save) {
        // Good armor cannot claim cover against AP 0.
        if save <= best && ap == 0 {
            cover = false;
        }
    }
    if cover {
        total_mod += 1;
    }

    let mut save_chance = SuccessChance::auto_fail();
    let mut save_title = String::new();
    if let Some(stat) = input.save {
        save_chance = success_chance(Some(stat), None, total_mod);
        save_title = format!("save of {stat}+");
        if total_mod != 0 {
            save_title.push_str(&format!(" ({total_mod:+})"));
        }
        match input.save_reroll {
            SaveReroll::Failures => {
                save_chance = apply_reroll(save_chance, Reroll::Failures);
                save_title.push_str(", reroll failures");
            }
            SaveReroll::Ones => {
                save_chance = apply_reroll(save_chance, Reroll::Ones);
                save_title.push_str(", reroll 1s");
            }
            _ => {}
        }
    }

    // Invulnerable saves ignore AP and cover but keep the plain modifier.
    let mut invulnerable_chance = SuccessChance::auto_fail();
    let mut invulnerable_title = String::new();
    if profile.invulnerable_saves {
        if let Some(stat) = input.invulnerable {
            invulnerable_chance = success_chance(Some(stat), None, save_mod);
            invulnerable_title = format!("save of {stat}++");
            if save_mod != 0 {
                invulnerable_title.push_str(&format!(" ({save_mod:+})"));
            }
            match input.save_reroll {
                SaveReroll::InvulnerableFailures => {
                    invulnerable_chance = apply_reroll(invulnerable_chance, Reroll::Failures);
                    invulnerable_title.push_str(", reroll failures");
                }
                SaveReroll::InvulnerableOnes => {
                    invulnerable_chance = apply_reroll(invulnerable_chance, Reroll::Ones);
                    invulnerable_title.push_str(", reroll 1s");
                }
                _ => {}
            }
        }
    }

    if profile.bonus_rend {
        // Critical wounds punch through with extra rend; only meaningful when
        // there is an armor save to degrade.
        if let (Some(extra), Some(_)) = (input.bonus_rend, input.save) {
            let mut pierced = success_chance(input.save, None, total_mod - extra.abs());
            match input.save_reroll {
                SaveReroll::Failures => pierced = apply_reroll(pierced, Reroll::Failures),
                SaveReroll::Ones => pierced = apply_reroll(pierced, Reroll::Ones),
                _ => {}
            }
            save_chance = crit_pierce_save_chance(
                save_chance,
                pierced,
                invulnerable_chance,
                wound_chance.crit_given_pass(),
            );
        }
    }

    // Whichever save is better wins, rerolls included.
    let (unsaved_chance, mut title) = if invulnerable_chance.pass_chance > save_chance.pass_chance
    {
        (invulnerable_chance.fail_chance, invulnerable_title)
    } else {
        (save_chance.fail_chance, save_title)
    };
    if unsaved_chance >= 1.0 {
        title = "auto-fail save".to_string();
    }

    (wounds.filter(unsaved_chance), title)
}

fn reroll_suffix(policy: Reroll, failures_label: &str) -> String {
    match policy {
        Reroll::None => String::new(),
        Reroll::Failures => format!(", reroll {failures_label}"),
        Reroll::Ones => ", reroll 1s".to_string(),
        Reroll::NonCritical => ", reroll non-crits".to_string(),
    }
}

fn trim_tail(normal: &mut Vec<f64>, mortal: &mut Vec<f64>) {
    let mut len = normal.len().max(mortal.len());
    while len > 1
        && normal.get(len - 1).copied().unwrap_or(0.0).abs() < 1e-12
        && mortal.get(len - 1).copied().unwrap_or(0.0).abs() < 1e-12
    {
        len -= 1;
    }
    normal.truncate(len);
    if mortal.len() > len {
        mortal.truncate(len);
    }
}
