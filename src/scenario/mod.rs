//! Scenario files: named roll inputs in YAML, evaluated as a sweep.
//!
//! One file describes one matchup set: a ruleset plus any number of labeled
//! attack lines. Unknown keys are ignored so files survive calculator
//! revisions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::pipeline::{RollInput, Ruleset, SweepCase};

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub name: Option<String>,
    pub ruleset: Ruleset,
    #[serde(default)]
    pub cases: Vec<ScenarioCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioCase {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub input: RollInput,
}

/// Loads a single scenario YAML file.
pub fn load_scenario_file(
    path: impl AsRef<Path>,
) -> Result<ScenarioFile, Box<dyn std::error::Error + Send + Sync>> {
    let raw = fs::read_to_string(path)?;
    let parsed: ScenarioFile = serde_yaml::from_str(&raw)?;
    Ok(parsed)
}

/// Turns a scenario file into sweep cases; unlabeled cases get a positional
/// label.
pub fn scenario_cases(file: &ScenarioFile) -> Vec<SweepCase> {
    file.cases
        .iter()
        .enumerate()
        .map(|(index, case)| SweepCase {
            label: case
                .label
                .clone()
                .unwrap_or_else(|| format!("case-{}", index + 1)),
            ruleset: file.ruleset,
            input: case.input.clone(),
        })
        .collect()
}
