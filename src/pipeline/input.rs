//! Typed roll inputs shared by the CLI, the HTTP API, and scenario files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prob::Reroll;

/// What a critical roll does at the hit or wound stage, beyond passing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CritEffect {
    #[default]
    None,
    /// Criticals leave the primary count and deal their damage as mortal
    /// wounds instead.
    #[serde(alias = "mortal")]
    MortalDamage,
    /// Criticals stay in the primary count and each adds one mortal wound.
    #[serde(alias = "+mortal")]
    PlusOneMortal,
}

/// Reroll selection for the save stage. Rerolling applies to either the
/// armor save or the invulnerable save, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveReroll {
    #[default]
    None,
    Ones,
    Failures,
    InvulnerableOnes,
    InvulnerableFailures,
}

/// One weapon-against-target line. Every field has a safe default so a
/// partially filled form still resolves to *some* distribution.
///
/// Which fields are honored depends on the ruleset profile; see
/// [crate::pipeline::ruleset::RulesetProfile::validate].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RollInput {
    /// Attack count as a dice expression ("10", "2d6", "d6+2").
    pub attacks: String,
    /// Hit threshold; missing means auto-hit.
    pub hit: Option<i32>,
    pub hit_mod: i32,
    pub hit_reroll: Reroll,
    /// Lowered hit-critical threshold where the profile allows one.
    pub hit_crit: Option<i32>,
    pub hit_crit_effect: CritEffect,
    /// Criticals add this many guaranteed extra hits (dice expression).
    pub bonus_hits: Option<String>,
    /// Criticals add this many extra hit *rolls* (dice expression), which
    /// must still pass the hit check.
    pub bonus_hit_rolls: Option<String>,
    /// Critical hits wound automatically.
    pub lethal_hits: bool,

    /// Attacker strength; the wound threshold is derived from strength and
    /// toughness where the profile says so.
    pub strength: Option<i32>,
    pub toughness: Option<i32>,
    /// Direct wound threshold for profiles that state it on the warscroll.
    pub wound: Option<i32>,
    pub wound_mod: i32,
    pub wound_reroll: Reroll,
    pub wound_crit: Option<i32>,
    pub wound_crit_effect: CritEffect,
    /// Critical wounds gain this much extra armor penetration.
    pub bonus_rend: Option<i32>,

    /// Armor save threshold; missing means no save.
    pub save: Option<i32>,
    pub invulnerable: Option<i32>,
    /// Armor penetration; sign is ignored and always applied as negative.
    pub ap: i32,
    pub save_mod: i32,
    pub cover: bool,
    pub save_reroll: SaveReroll,

    /// Damage per unsaved wound as a dice expression.
    pub damage: String,
    pub wounds_per_model: u32,
    /// Per-point damage negation threshold (feel-no-pain / ward).
    pub feel_no_pain: Option<i32>,
}

impl RollInput {
    /// Query-fragment encoding of the non-default fields, mirroring the
    /// shareable-URL scheme of the web calculator: `key=value` pairs joined
    /// by `&`, with set booleans reduced to a bare key.
    pub fn permalink(&self) -> String {
        let (Ok(Value::Object(current)), Ok(Value::Object(defaults))) = (
            serde_json::to_value(self),
            serde_json::to_value(Self::default()),
        ) else {
            return String::new();
        };

        let mut pairs = Vec::new();
        for (key, value) in &current {
            if defaults.get(key) == Some(value) {
                continue;
            }
            match value {
                Value::Bool(true) => pairs.push(key.clone()),
                Value::String(text) => pairs.push(format!("{key}={text}")),
                other => pairs.push(format!("{key}={other}")),
            }
        }
        pairs.join("&")
    }
}
