//! Opportunity-commitment join & analytics engine.
//!
//! A pure, synchronous, whole-batch transform: two flat record sequences in,
//! one fully materialized report out. Every invocation allocates fresh
//! indices; nothing is shared or cached across calls.

pub mod analytics;
pub mod coverage;
pub mod filters;
pub mod index;
pub mod unfold;

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsSettings;
use crate::domain::commitment::Commitment;
use crate::domain::opportunity::Opportunity;
use crate::domain::record::{AnalyticRecord, CoverageGapRecord};
use crate::domain::RawRecord;
use crate::errors::EngineError;

pub use analytics::PipelineSummary;
pub use filters::FilterValues;
pub use index::{CommitmentIndex, CoverageIndex, OpportunityDirectory};
pub use unfold::UnfoldOutput;

/// Everything one engine run produces. Owned values throughout; the engine
/// keeps no reference into caller state and no state of its own afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub records: Vec<AnalyticRecord>,
    pub coverage_gaps: Vec<CoverageGapRecord>,
    pub filters: FilterValues,
    pub summary: PipelineSummary,
}

#[derive(Clone, Debug, Default)]
pub struct PipelineEngine {
    settings: AnalyticsSettings,
}

impl PipelineEngine {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Runs the whole batch. The only failure mode is both input sequences
    /// being empty; individual malformed records degrade field by field and
    /// are always carried through.
    pub fn process(
        &self,
        opportunities: &[RawRecord],
        commitments: &[RawRecord],
    ) -> Result<PipelineReport, EngineError> {
        if opportunities.is_empty() && commitments.is_empty() {
            return Err(EngineError::NoUsableRecords);
        }

        let opportunities: Vec<Opportunity> =
            opportunities.iter().map(Opportunity::from_record).collect();
        let commitments: Vec<Commitment> =
            commitments.iter().map(Commitment::from_record).collect();

        let index = CommitmentIndex::build(&commitments);
        let directory = OpportunityDirectory::build(&opportunities);

        let UnfoldOutput { records, coverage } = unfold::unfold(&opportunities, &index);
        let coverage_gaps = coverage::detect_gaps(&coverage, &directory, &index, &self.settings);
        let filters = filters::collect(&records, &self.settings);
        let summary = analytics::compute(&records, &self.settings);

        Ok(PipelineReport { records, coverage_gaps, filters, summary })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::AnalyticsSettings;
    use crate::domain::RawRecord;
    use crate::errors::EngineError;

    use super::PipelineEngine;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().expect("object literal").clone()
    }

    #[test]
    fn both_inputs_empty_is_the_single_failure_mode() {
        let engine = PipelineEngine::new(AnalyticsSettings::default());
        assert_eq!(engine.process(&[], &[]), Err(EngineError::NoUsableRecords));
    }

    #[test]
    fn opportunities_alone_still_produce_a_report() {
        let engine = PipelineEngine::new(AnalyticsSettings::default());
        let opportunities = vec![raw(json!({
            "Opportunity ID": "OPP100",
            "Account ID": "A1",
            "Stage": "Proposal",
            "Expected Value": "1.000,00",
        }))];

        let report = engine.process(&opportunities, &[]).expect("report");
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.summary.unique_opportunities, 1);
        assert!(report.coverage_gaps.is_empty());
    }

    #[test]
    fn repeated_runs_over_the_same_input_agree() {
        let engine = PipelineEngine::new(AnalyticsSettings::default());
        let opportunities = vec![
            raw(json!({ "Opportunity ID": "OPP101", "Account ID": "A1", "Stage": "Proposal" })),
            raw(json!({ "Opportunity ID": "OPP205", "Account ID": "A1", "Stage": "Proposal" })),
        ];
        let commitments = vec![raw(json!({ "Opportunity ID": "OPP101", "User": "Alice" }))];

        let first = engine.process(&opportunities, &commitments).expect("first run");
        let second = engine.process(&opportunities, &commitments).expect("second run");
        assert_eq!(first, second);
        assert_eq!(first.coverage_gaps.len(), 1);
    }
}
