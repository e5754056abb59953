//! Command dispatch for the `mathhammer` binary.
//!
//! Roll fields are given as `key=value` pairs (bare keys set boolean flags),
//! the same vocabulary the permalink encoding uses.

use std::env;
use std::fs;

use serde_json::Value;

use crate::pipeline::export_csv::write_report_csv;
use crate::pipeline::{resolve, RollInput, Ruleset};
use crate::scenario::{load_scenario_file, scenario_cases};
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Roll,
    Scenario,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("roll") => Some(Command::Roll),
        Some("scenario") => Some(Command::Scenario),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Roll) => handle_roll(args),
        Some(Command::Scenario) => handle_scenario(args),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("usage: mathhammer <serve|roll|scenario|export>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr =
        env::var("MATHHAMMER_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_roll(args: &[String]) -> i32 {
    let Some(ruleset) = args.get(2).and_then(|raw| Ruleset::parse(raw)) else {
        eprintln!("usage: mathhammer roll <40k|aos> [key=value ...] [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let input = match parse_input_pairs(&args[3..]) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("invalid roll input: {err}");
            return 2;
        }
    };
    for issue in ruleset.profile().validate(&input) {
        eprintln!("warning: {issue}");
    }

    let report = resolve(ruleset, &input);
    if as_table {
        println!("stage\texpected\ttitle");
        for stage in &report.stages {
            println!("{}\t{:.4}\t{}", stage.stage, stage.expected, stage.title);
        }
        return 0;
    }
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize roll report: {err}");
            1
        }
    }
}

fn handle_scenario(args: &[String]) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: mathhammer scenario <path.yaml> [--parallel]");
        return 2;
    };
    let parallel = args.iter().any(|arg| arg == "--parallel");

    let file = match load_scenario_file(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("failed to load scenario '{path}': {err}");
            return 1;
        }
    };
    let cases = scenario_cases(&file);
    for case in &cases {
        for issue in case.ruleset.profile().validate(&case.input) {
            eprintln!("warning ({}): {issue}", case.label);
        }
    }

    let outcomes = if parallel {
        crate::pipeline::run_sweep_parallel(&cases, 0)
    } else {
        crate::pipeline::run_sweep(&cases)
    };
    match serde_json::to_string_pretty(&outcomes) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize sweep results: {err}");
            1
        }
    }
}

fn handle_export(args: &[String]) -> i32 {
    let (Some(ruleset), Some(path)) = (
        args.get(2).and_then(|raw| Ruleset::parse(raw)),
        args.get(3),
    ) else {
        eprintln!("usage: mathhammer export <40k|aos> <out.csv> [key=value ...]");
        return 2;
    };

    let input = match parse_input_pairs(&args[4..]) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("invalid roll input: {err}");
            return 2;
        }
    };

    let report = resolve(ruleset, &input);
    let file = match fs::File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("failed to create '{path}': {err}");
            return 1;
        }
    };
    match write_report_csv(file, &report) {
        Ok(()) => {
            println!("wrote {path}");
            0
        }
        Err(err) => {
            eprintln!("failed to write '{path}': {err}");
            1
        }
    }
}

/// Dice expressions and enum selections stay strings; everything else is
/// numeric.
const STRING_FIELDS: &[&str] = &[
    "attacks",
    "damage",
    "bonus_hits",
    "bonus_hit_rolls",
    "hit_reroll",
    "wound_reroll",
    "save_reroll",
    "hit_crit_effect",
    "wound_crit_effect",
];

/// Builds a [RollInput] from `key=value` pairs. A bare key sets a boolean
/// flag, matching the permalink encoding. Unknown keys are ignored.
fn parse_input_pairs(pairs: &[String]) -> Result<RollInput, serde_json::Error> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        if pair.starts_with("--") {
            continue;
        }
        match pair.split_once('=') {
            None => {
                map.insert(pair.clone(), Value::Bool(true));
            }
            Some((key, value)) => {
                let json_value = if STRING_FIELDS.contains(&key) {
                    Value::String(value.to_string())
                } else if let Ok(number) = value.parse::<i64>() {
                    Value::from(number)
                } else if let Ok(flag) = value.parse::<bool>() {
                    Value::Bool(flag)
                } else {
                    Value::String(value.to_string())
                };
                map.insert(key.to_string(), json_value);
            }
        }
    }
    serde_json::from_value(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CritEffect;
    use crate::prob::Reroll;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_parsing_matches_first_argument() {
        assert_eq!(parse_command(&strings(&["mh", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&strings(&["mh", "roll"])), Some(Command::Roll));
        assert_eq!(parse_command(&strings(&["mh", "nope"])), None);
        assert_eq!(parse_command(&strings(&["mh"])), None);
    }

    #[test]
    fn pairs_become_a_typed_input() {
        let input = parse_input_pairs(&strings(&[
            "attacks=2d6",
            "hit=3",
            "hit_reroll=ones",
            "hit_crit_effect=mortal_damage",
            "cover",
            "wounds_per_model=2",
        ]))
        .expect("pairs parse");

        assert_eq!(input.attacks, "2d6");
        assert_eq!(input.hit, Some(3));
        assert_eq!(input.hit_reroll, Reroll::Ones);
        assert_eq!(input.hit_crit_effect, CritEffect::MortalDamage);
        assert!(input.cover);
        assert_eq!(input.wounds_per_model, 2);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let input = parse_input_pairs(&strings(&["asdf=7", "hit=4"])).expect("pairs parse");
        assert_eq!(input.hit, Some(4));
    }
}
