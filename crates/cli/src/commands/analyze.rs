use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dealscope_core::{
    AnalyticRecord, AnalyticsSettings, EngineError, FilterValues, PipelineEngine, PipelineSummary,
};
use serde::Serialize;
use uuid::Uuid;

use crate::commands::CommandResult;
use crate::input::load_records;

#[derive(Debug)]
pub struct AnalyzeArgs {
    pub opportunities: Option<PathBuf>,
    pub commitments: Option<PathBuf>,
    pub settings: AnalyticsSettings,
    pub include_records: bool,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutcome {
    command: &'static str,
    status: &'static str,
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    summary: PipelineSummary,
    filters: FilterValues,
    coverage_gap_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<AnalyticRecord>>,
}

pub fn run(args: AnalyzeArgs) -> CommandResult {
    let opportunities = match load_records(args.opportunities.as_deref()) {
        Ok(records) => records,
        Err(error) => return CommandResult::failure("analyze", "input", format!("{error:#}"), 1),
    };
    let commitments = match load_records(args.commitments.as_deref()) {
        Ok(records) => records,
        Err(error) => return CommandResult::failure("analyze", "input", format!("{error:#}"), 1),
    };

    let engine = PipelineEngine::new(args.settings);
    let report = match engine.process(&opportunities, &commitments) {
        Ok(report) => report,
        Err(error @ EngineError::NoUsableRecords) => {
            return CommandResult::failure("analyze", "no_usable_records", error.to_string(), 2);
        }
    };

    tracing::info!(
        opportunities = opportunities.len(),
        commitments = commitments.len(),
        records = report.records.len(),
        coverage_gaps = report.coverage_gaps.len(),
        "analytics pass complete"
    );

    CommandResult::success(&AnalyzeOutcome {
        command: "analyze",
        status: "ok",
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        coverage_gap_count: report.coverage_gaps.len(),
        summary: report.summary,
        filters: report.filters,
        records: args.include_records.then_some(report.records),
    })
}
