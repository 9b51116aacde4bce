//! Aggregations over the unfolded record set.
//!
//! The unfold step fans one opportunity out into one row per performer, so
//! every opportunity-level metric (counts, values, stages, probabilities)
//! reads from a single deduplicated snapshot built once per run. Engagement
//! volume is the exception: commitment counts sum over all rows, because
//! each row carries a distinct performer's engagement.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsSettings;
use crate::domain::commitment::NO_COMMITMENT;
use crate::domain::record::AnalyticRecord;

const UNKNOWN_STAGE: &str = "Unknown";
const UNSPECIFIED_REASON: &str = "Unspecified";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSlice {
    pub stage: String,
    pub count: usize,
    pub value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastSlice {
    pub stage: String,
    pub count: usize,
    pub value: Decimal,
    pub avg_probability: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReasonSlice {
    pub reason: String,
    pub value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformerStanding {
    pub performer: String,
    pub count: usize,
    pub value: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub unique_opportunities: usize,
    /// Summed across every analytic row, deliberately not deduplicated.
    pub total_commitments: usize,
    pub hot_opportunities: usize,
    pub won_count: usize,
    pub lost_count: usize,
    pub open_count: usize,
    /// Won sums closed value; lost and open sum expected value.
    pub won_value: Decimal,
    pub lost_value: Decimal,
    pub open_value: Decimal,
    /// Unweighted expected value of open opportunities at or above the hot
    /// probability threshold.
    pub forecast_value: Decimal,
    pub stage_funnel: Vec<StageSlice>,
    pub forecast_funnel: Vec<ForecastSlice>,
    pub loss_reasons: Vec<LossReasonSlice>,
    pub performer_leaderboard: Vec<PerformerStanding>,
}

pub fn compute(records: &[AnalyticRecord], settings: &AnalyticsSettings) -> PipelineSummary {
    let snapshot = dedup_snapshot(records);
    let mut summary = PipelineSummary {
        unique_opportunities: snapshot.len(),
        total_commitments: records.iter().map(|r| r.commitment_count).sum(),
        ..PipelineSummary::default()
    };

    for record in &snapshot {
        let hot = record.probability_num >= settings.hot_probability;
        if hot {
            summary.hot_opportunities += 1;
        }
        if settings.is_won(&record.stage) {
            summary.won_count += 1;
            summary.won_value += record.closed_value;
        } else if settings.is_lost(&record.stage) {
            summary.lost_count += 1;
            summary.lost_value += record.expected_value;
        } else {
            summary.open_count += 1;
            summary.open_value += record.expected_value;
            if hot {
                summary.forecast_value += record.expected_value;
            }
        }
    }

    summary.stage_funnel = stage_funnel(&snapshot);
    summary.forecast_funnel = forecast_funnel(&snapshot, settings);
    summary.loss_reasons = loss_reasons(&snapshot, settings);
    summary.performer_leaderboard = performer_leaderboard(records, settings);
    summary
}

/// First analytic row per opportunity identifier, in input order. Every
/// opportunity attribute is copied identically across the rows of one
/// opportunity, so the first row is a faithful snapshot.
fn dedup_snapshot(records: &[AnalyticRecord]) -> Vec<&AnalyticRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records.iter().filter(|record| seen.insert(record.opportunity_id.as_str())).collect()
}

fn stage_funnel(snapshot: &[&AnalyticRecord]) -> Vec<StageSlice> {
    let mut order: Vec<&str> = Vec::new();
    let mut slices: HashMap<&str, (usize, Decimal)> = HashMap::new();
    for record in snapshot {
        let stage = if record.stage.is_empty() { UNKNOWN_STAGE } else { record.stage.as_str() };
        let entry = slices.entry(stage).or_insert_with(|| {
            order.push(stage);
            (0, Decimal::ZERO)
        });
        entry.0 += 1;
        entry.1 += record.expected_value;
    }

    order
        .into_iter()
        .map(|stage| {
            let (count, value) = slices[stage];
            StageSlice { stage: stage.to_owned(), count, value }
        })
        .collect()
}

/// Per-stage slices over open opportunities at or above the hot probability
/// threshold. Terminal stages never appear in the forecast.
fn forecast_funnel(
    snapshot: &[&AnalyticRecord],
    settings: &AnalyticsSettings,
) -> Vec<ForecastSlice> {
    let mut order: Vec<&str> = Vec::new();
    let mut slices: HashMap<&str, (usize, Decimal, u64)> = HashMap::new();
    for record in snapshot {
        if record.probability_num < settings.hot_probability
            || settings.is_terminal(&record.stage)
        {
            continue;
        }
        let stage = if record.stage.is_empty() { UNKNOWN_STAGE } else { record.stage.as_str() };
        let entry = slices.entry(stage).or_insert_with(|| {
            order.push(stage);
            (0, Decimal::ZERO, 0)
        });
        entry.0 += 1;
        entry.1 += record.expected_value;
        entry.2 += u64::from(record.probability_num);
    }

    let mut funnel: Vec<ForecastSlice> = order
        .into_iter()
        .map(|stage| {
            let (count, value, prob_sum) = slices[stage];
            ForecastSlice {
                stage: stage.to_owned(),
                count,
                value,
                avg_probability: prob_sum as f64 / count as f64,
            }
        })
        .collect();
    funnel.sort_by(|a, b| b.value.cmp(&a.value));
    funnel
}

fn loss_reasons(
    snapshot: &[&AnalyticRecord],
    settings: &AnalyticsSettings,
) -> Vec<LossReasonSlice> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for record in snapshot {
        if !settings.is_lost(&record.stage) {
            continue;
        }
        let reason =
            if record.loss_reason.is_empty() { UNSPECIFIED_REASON } else { record.loss_reason.as_str() };
        let total = totals.entry(reason).or_insert_with(|| {
            order.push(reason);
            Decimal::ZERO
        });
        *total += record.expected_value;
    }

    let mut ranking: Vec<LossReasonSlice> = order
        .into_iter()
        .map(|reason| LossReasonSlice { reason: reason.to_owned(), value: totals[reason] })
        .collect();
    ranking.sort_by(|a, b| b.value.cmp(&a.value));
    ranking.truncate(settings.ranking_size);
    ranking
}

/// Per-performer standing over open, hot opportunities. Rows are already
/// unique per (opportunity, performer), so no further deduplication is
/// needed within a performer.
fn performer_leaderboard(
    records: &[AnalyticRecord],
    settings: &AnalyticsSettings,
) -> Vec<PerformerStanding> {
    let mut order: Vec<&str> = Vec::new();
    let mut standings: HashMap<&str, (usize, Decimal)> = HashMap::new();
    for record in records {
        if record.performer == NO_COMMITMENT
            || record.probability_num < settings.hot_probability
            || settings.is_terminal(&record.stage)
        {
            continue;
        }
        let entry = standings.entry(record.performer.as_str()).or_insert_with(|| {
            order.push(record.performer.as_str());
            (0, Decimal::ZERO)
        });
        entry.0 += 1;
        entry.1 += record.expected_value;
    }

    let mut leaderboard: Vec<PerformerStanding> = order
        .into_iter()
        .map(|performer| {
            let (count, value) = standings[performer];
            PerformerStanding { performer: performer.to_owned(), count, value }
        })
        .collect();
    leaderboard.sort_by(|a, b| b.value.cmp(&a.value));
    leaderboard.truncate(settings.ranking_size);
    leaderboard
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::config::AnalyticsSettings;
    use crate::domain::commitment::NO_COMMITMENT;
    use crate::domain::record::AnalyticRecord;

    use super::compute;

    fn record(
        opportunity_id: &str,
        performer: &str,
        stage: &str,
        probability: u32,
        expected: i64,
        closed: i64,
        commitments: usize,
    ) -> AnalyticRecord {
        AnalyticRecord {
            opportunity_id: opportunity_id.to_owned(),
            performer: performer.to_owned(),
            stage: stage.to_owned(),
            probability_num: probability,
            expected_value: Decimal::from(expected),
            closed_value: Decimal::from(closed),
            commitment_count: commitments,
            ..AnalyticRecord::default()
        }
    }

    #[test]
    fn opportunity_metrics_deduplicate_but_commitments_do_not() {
        let records = vec![
            record("OPP101", "Alice", "Proposal", 80, 1_000, 0, 2),
            record("OPP101", "Bob", "Proposal", 80, 1_000, 0, 1),
            record("OPP102", NO_COMMITMENT, "Proposal", 50, 500, 0, 0),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.unique_opportunities, 2);
        assert_eq!(summary.total_commitments, 3);
        assert_eq!(summary.hot_opportunities, 1);
        assert_eq!(summary.open_value, Decimal::from(1_500));
        assert_eq!(summary.forecast_value, Decimal::from(1_000));
    }

    #[test]
    fn won_lost_open_partition_the_deduplicated_set() {
        let records = vec![
            record("OPP101", "Alice", "Closed Won", 100, 1_000, 900, 1),
            record("OPP102", "Alice", "Closed Lost", 0, 2_000, 0, 1),
            record("OPP103", "Bob", "Negotiation", 60, 3_000, 0, 1),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(
            (summary.won_count, summary.lost_count, summary.open_count),
            (1, 1, 1)
        );
        assert_eq!(summary.won_value, Decimal::from(900));
        assert_eq!(summary.lost_value, Decimal::from(2_000));
        assert_eq!(summary.open_value, Decimal::from(3_000));
    }

    #[test]
    fn stage_funnel_groups_distinct_opportunities_in_first_seen_order() {
        let records = vec![
            record("OPP101", "Alice", "Proposal", 80, 1_000, 0, 1),
            record("OPP101", "Bob", "Proposal", 80, 1_000, 0, 1),
            record("OPP102", "Alice", "Negotiation", 60, 2_000, 0, 1),
            record("OPP103", "Alice", "Proposal", 30, 4_000, 0, 1),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.stage_funnel.len(), 2);
        assert_eq!(summary.stage_funnel[0].stage, "Proposal");
        assert_eq!(summary.stage_funnel[0].count, 2);
        assert_eq!(summary.stage_funnel[0].value, Decimal::from(5_000));
        assert_eq!(summary.stage_funnel[1].stage, "Negotiation");
    }

    #[test]
    fn loss_reasons_count_each_opportunity_once() {
        let records = vec![
            record("OPP101", "Alice", "Closed Lost", 0, 5_000, 0, 1),
            record("OPP101", "Bob", "Closed Lost", 0, 5_000, 0, 2),
            record("OPP102", "Alice", "Closed Lost", 0, 1_000, 0, 1),
        ];
        let mut records = records;
        records[0].loss_reason = "Price".to_owned();
        records[1].loss_reason = "Price".to_owned();

        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.loss_reasons.len(), 2);
        assert_eq!(summary.loss_reasons[0].reason, "Price");
        assert_eq!(summary.loss_reasons[0].value, Decimal::from(5_000));
        assert_eq!(summary.loss_reasons[1].reason, "Unspecified");
    }

    #[test]
    fn leaderboard_excludes_sentinel_and_closed_or_cold_rows() {
        let records = vec![
            record("OPP101", "Alice", "Proposal", 80, 1_000, 0, 1),
            record("OPP102", "Alice", "Proposal", 90, 2_000, 0, 1),
            record("OPP102", "Bob", "Proposal", 90, 2_000, 0, 1),
            record("OPP103", "Bob", "Closed Won", 95, 9_000, 9_000, 1),
            record("OPP104", "Carol", "Proposal", 40, 8_000, 0, 1),
            record("OPP105", NO_COMMITMENT, "Proposal", 90, 7_000, 0, 0),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.performer_leaderboard.len(), 2);
        assert_eq!(summary.performer_leaderboard[0].performer, "Alice");
        assert_eq!(summary.performer_leaderboard[0].value, Decimal::from(3_000));
        assert_eq!(summary.performer_leaderboard[0].count, 2);
        assert_eq!(summary.performer_leaderboard[1].performer, "Bob");
        assert_eq!(summary.performer_leaderboard[1].value, Decimal::from(2_000));
    }

    #[test]
    fn rankings_break_value_ties_by_input_order() {
        let records = vec![
            record("OPP101", "Bob", "Proposal", 90, 2_000, 0, 1),
            record("OPP102", "Alice", "Proposal", 90, 2_000, 0, 1),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.performer_leaderboard[0].performer, "Bob");
        assert_eq!(summary.performer_leaderboard[1].performer, "Alice");
    }

    #[test]
    fn forecast_funnel_sorts_descending_by_value() {
        let records = vec![
            record("OPP101", "Alice", "Proposal", 80, 1_000, 0, 1),
            record("OPP102", "Alice", "Negotiation", 90, 5_000, 0, 1),
            record("OPP103", "Alice", "Proposal", 76, 2_000, 0, 1),
            record("OPP104", "Alice", "Qualification", 10, 9_000, 0, 1),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.forecast_funnel.len(), 2);
        assert_eq!(summary.forecast_funnel[0].stage, "Negotiation");
        assert_eq!(summary.forecast_funnel[1].stage, "Proposal");
        assert_eq!(summary.forecast_funnel[1].count, 2);
        assert!((summary.forecast_funnel[1].avg_probability - 78.0).abs() < f64::EPSILON);
    }

    #[test]
    fn forecast_funnel_skips_terminal_stages() {
        let records = vec![
            record("OPP101", "Alice", "Closed Won", 100, 1_000, 1_000, 1),
            record("OPP102", "Alice", "Closed Lost", 90, 2_000, 0, 1),
            record("OPP103", "Alice", "Negotiation", 80, 3_000, 0, 1),
        ];
        let summary = compute(&records, &AnalyticsSettings::default());

        assert_eq!(summary.forecast_funnel.len(), 1);
        assert_eq!(summary.forecast_funnel[0].stage, "Negotiation");
        assert_eq!(summary.forecast_funnel[0].value, Decimal::from(3_000));
    }
}
