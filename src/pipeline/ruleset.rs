//! Rule-set profiles: one parameterized pipeline, with a profile record
//! enumerating which abilities are legal and how the stages compose per
//! game family.

use serde::{Deserialize, Serialize};

use crate::pipeline::input::{CritEffect, RollInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    #[serde(alias = "40k")]
    FortyK,
    #[serde(alias = "aos")]
    AgeOfSigmar,
}

impl Ruleset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "40k" | "forty_k" => Some(Self::FortyK),
            "aos" | "age_of_sigmar" => Some(Self::AgeOfSigmar),
            _ => None,
        }
    }

    pub fn profile(self) -> RulesetProfile {
        match self {
            Self::FortyK => RulesetProfile {
                name: "40k",
                crit_overrides: true,
                invulnerable_saves: true,
                bonus_rend: false,
                cover_restriction: Some(3),
                per_model_damage_cap: true,
                wound_from_strength: true,
            },
            Self::AgeOfSigmar => RulesetProfile {
                name: "aos",
                crit_overrides: false,
                invulnerable_saves: false,
                bonus_rend: true,
                cover_restriction: None,
                per_model_damage_cap: false,
                wound_from_strength: false,
            },
        }
    }
}

/// Which knobs a rule-set family exposes. Consumed by the one shared
/// pipeline; there are no per-family code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RulesetProfile {
    pub name: &'static str,
    /// Hit and wound critical thresholds may be lowered below 6.
    pub crit_overrides: bool,
    pub invulnerable_saves: bool,
    /// Critical wounds may carry extra armor penetration.
    pub bonus_rend: bool,
    /// Saves at this value or better cannot claim cover against AP 0.
    pub cover_restriction: Option<i32>,
    /// Casualties come from per-model damage capping against the hit count
    /// rather than from the summed damage distribution.
    pub per_model_damage_cap: bool,
    /// The wound threshold is derived from strength vs toughness instead of
    /// being stated directly.
    pub wound_from_strength: bool,
}

impl RulesetProfile {
    /// Structural legality check for an input against this profile. Returns
    /// one message per offending field; an empty list means the input is
    /// well-formed for this family.
    pub fn validate(&self, input: &RollInput) -> Vec<String> {
        let mut issues = Vec::new();

        if input.bonus_hits.is_some() && input.bonus_hit_rolls.is_some() {
            issues.push("bonus_hits and bonus_hit_rolls are mutually exclusive".to_string());
        }
        if !self.crit_overrides && (input.hit_crit.is_some() || input.wound_crit.is_some()) {
            issues.push(format!(
                "{} fixes critical thresholds at 6; hit_crit/wound_crit are not legal",
                self.name
            ));
        }
        if !self.invulnerable_saves && input.invulnerable.is_some() {
            issues.push(format!("{} has no invulnerable saves", self.name));
        }
        if !self.bonus_rend && input.bonus_rend.is_some() {
            issues.push(format!("{} has no bonus rend on critical wounds", self.name));
        }
        if input.bonus_rend.is_some() && input.wound_crit_effect != CritEffect::None {
            issues.push("bonus_rend and wound_crit_effect are mutually exclusive".to_string());
        }
        if self.wound_from_strength && input.wound.is_some() {
            issues.push(format!(
                "{} derives the wound threshold from strength and toughness",
                self.name
            ));
        }
        if !self.wound_from_strength
            && (input.strength.is_some() || input.toughness.is_some())
        {
            issues.push(format!(
                "{} states the wound threshold directly; strength/toughness are not used",
                self.name
            ));
        }

        issues
    }
}

/// Wound threshold from the strength-versus-toughness table. Missing or
/// non-positive stats mean the wound roll auto-passes.
pub fn wound_threshold(strength: Option<i32>, toughness: Option<i32>) -> Option<i32> {
    let (Some(s), Some(t)) = (strength, toughness) else {
        return None;
    };
    if s <= 0 || t <= 0 {
        return None;
    }
    Some(if t >= s * 2 {
        6
    } else if t > s {
        5
    } else if s >= t * 2 {
        2
    } else if s > t {
        3
    } else {
        4
    })
}
