//! Write a roll report's per-stage distribution tables as CSV.

use std::io;

use crate::pipeline::RollReport;

/// One row per outcome value per stage: probability, at-least probability,
/// and the mortal-wound marginal where the stage has one.
pub fn write_report_csv<W: io::Write>(
    out: W,
    report: &RollReport,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["stage", "title", "outcome", "probability", "at_least", "mortal"])?;
    for stage in &report.stages {
        for (value, &p) in stage.normal.iter().enumerate() {
            let at_least = stage.ccdf.get(value).copied().unwrap_or(0.0);
            let mortal = stage.mortal.get(value).copied().unwrap_or(0.0);
            let outcome = value.to_string();
            let probability = format!("{p:.10}");
            let at_least = format!("{at_least:.10}");
            let mortal = format!("{mortal:.10}");
            writer.write_record([
                stage.stage,
                stage.title.as_str(),
                outcome.as_str(),
                probability.as_str(),
                at_least.as_str(),
                mortal.as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
