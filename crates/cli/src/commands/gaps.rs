use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dealscope_core::{AnalyticsSettings, CoverageGapRecord, EngineError, PipelineEngine};
use serde::Serialize;
use uuid::Uuid;

use crate::commands::CommandResult;
use crate::input::load_records;

#[derive(Debug)]
pub struct GapsArgs {
    pub opportunities: Option<PathBuf>,
    pub commitments: Option<PathBuf>,
    pub settings: AnalyticsSettings,
}

#[derive(Debug, Serialize)]
struct GapsOutcome {
    command: &'static str,
    status: &'static str,
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    coverage_gaps: Vec<CoverageGapRecord>,
}

pub fn run(args: GapsArgs) -> CommandResult {
    let opportunities = match load_records(args.opportunities.as_deref()) {
        Ok(records) => records,
        Err(error) => return CommandResult::failure("gaps", "input", format!("{error:#}"), 1),
    };
    let commitments = match load_records(args.commitments.as_deref()) {
        Ok(records) => records,
        Err(error) => return CommandResult::failure("gaps", "input", format!("{error:#}"), 1),
    };

    let engine = PipelineEngine::new(args.settings);
    let report = match engine.process(&opportunities, &commitments) {
        Ok(report) => report,
        Err(error @ EngineError::NoUsableRecords) => {
            return CommandResult::failure("gaps", "no_usable_records", error.to_string(), 2);
        }
    };

    tracing::info!(coverage_gaps = report.coverage_gaps.len(), "gap detection complete");

    CommandResult::success(&GapsOutcome {
        command: "gaps",
        status: "ok",
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        coverage_gaps: report.coverage_gaps,
    })
}
