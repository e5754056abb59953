//! JSON payload builders for the HTTP API. Pure string-in string-out so the
//! route tests can exercise them without a socket.

use std::fmt;

use serde::Deserialize;

use crate::pipeline::{resolve, RollInput, Ruleset};

#[derive(Debug, Clone, Deserialize)]
pub struct RollRequest {
    pub ruleset: Ruleset,
    #[serde(flatten)]
    pub input: RollInput,
}

#[derive(Debug)]
pub enum RollPayloadError {
    Parse(serde_json::Error),
    Validation(Vec<String>),
}

impl fmt::Display for RollPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(issues) => write!(f, "invalid roll request: {}", issues.join("; ")),
        }
    }
}

impl std::error::Error for RollPayloadError {}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "mathhammer-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Lists each supported ruleset with its profile flags, so a client can gray
/// out the fields that are not legal for the selected family.
pub fn rulesets_payload() -> Result<String, serde_json::Error> {
    let profiles: Vec<_> = [Ruleset::FortyK, Ruleset::AgeOfSigmar]
        .iter()
        .map(|ruleset| ruleset.profile())
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "rulesets": profiles }))
}

/// Resolves one roll request into per-stage distributions.
pub fn roll_payload(body: &str) -> Result<String, RollPayloadError> {
    let request: RollRequest = serde_json::from_str(body).map_err(RollPayloadError::Parse)?;
    let issues = request.ruleset.profile().validate(&request.input);
    if !issues.is_empty() {
        return Err(RollPayloadError::Validation(issues));
    }

    let report = resolve(request.ruleset, &request.input);
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "ruleset": report.ruleset,
        "permalink": report.permalink,
        "stages": report.stages,
    }))
    .map_err(RollPayloadError::Parse)
}
