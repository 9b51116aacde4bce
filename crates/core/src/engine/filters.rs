//! Distinct filter values extracted from the analytic record set, sorted per
//! field type: numeric-like fields numerically, month and stage fields by
//! their fixed domain order, everything else lexicographically.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsSettings;
use crate::domain::record::AnalyticRecord;
use crate::normalize::{parse_probability, MONTH_NAMES};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValues {
    pub years: Vec<String>,
    pub months: Vec<String>,
    pub representatives: Vec<String>,
    pub owners: Vec<String>,
    pub performers: Vec<String>,
    pub stages: Vec<String>,
    pub probabilities: Vec<String>,
    pub commitment_counts: Vec<String>,
    pub accounts: Vec<String>,
    pub opportunity_types: Vec<String>,
    pub origins: Vec<String>,
    pub segments: Vec<String>,
}

pub fn collect(records: &[AnalyticRecord], settings: &AnalyticsSettings) -> FilterValues {
    FilterValues {
        years: lexicographic(records.iter().map(|r| r.close_year.as_str())),
        months: months_in_calendar_order(records),
        representatives: lexicographic(records.iter().map(|r| r.representative.as_str())),
        owners: lexicographic(records.iter().map(|r| r.owner.as_str())),
        performers: lexicographic(records.iter().map(|r| r.performer.as_str())),
        stages: stages_in_domain_order(records, settings),
        probabilities: numeric(records.iter().map(|r| r.probability.as_str())),
        commitment_counts: commitment_counts(records),
        accounts: lexicographic(records.iter().map(|r| r.account.as_str())),
        opportunity_types: lexicographic(records.iter().map(|r| r.opportunity_type.as_str())),
        origins: lexicographic(records.iter().map(|r| r.origin.as_str())),
        segments: lexicographic(records.iter().map(|r| r.segment.as_str())),
    }
}

fn lexicographic<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct: HashSet<&str> = values.filter(|value| !value.is_empty()).collect();
    let mut sorted: Vec<String> = distinct.into_iter().map(str::to_owned).collect();
    sorted.sort();
    sorted
}

/// Distinct probability displays sorted by their numeric value.
fn numeric<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct: HashSet<&str> = values.filter(|value| !value.is_empty()).collect();
    let mut sorted: Vec<String> = distinct.into_iter().map(str::to_owned).collect();
    sorted.sort_by_key(|value| parse_probability(value).numeric);
    sorted
}

fn months_in_calendar_order(records: &[AnalyticRecord]) -> Vec<String> {
    let present: HashSet<u8> =
        records.iter().map(|r| r.close_month_num).filter(|num| *num != 0).collect();
    MONTH_NAMES
        .iter()
        .enumerate()
        .filter(|(index, _)| present.contains(&(*index as u8 + 1)))
        .map(|(_, name)| (*name).to_owned())
        .collect()
}

/// Configured pipeline order first, then any stage the configuration does
/// not know about, in first-seen order.
fn stages_in_domain_order(records: &[AnalyticRecord], settings: &AnalyticsSettings) -> Vec<String> {
    let mut present: Vec<&str> = Vec::new();
    for record in records {
        if !record.stage.is_empty() && !present.contains(&record.stage.as_str()) {
            present.push(record.stage.as_str());
        }
    }

    let mut ordered: Vec<String> = settings
        .stage_order
        .iter()
        .filter(|stage| present.contains(&stage.as_str()))
        .cloned()
        .collect();
    for stage in present {
        if !settings.stage_order.iter().any(|known| known == stage) {
            ordered.push(stage.to_owned());
        }
    }
    ordered
}

fn commitment_counts(records: &[AnalyticRecord]) -> Vec<String> {
    let mut distinct: Vec<usize> = records
        .iter()
        .map(|r| r.commitment_count)
        .collect::<HashSet<usize>>()
        .into_iter()
        .collect();
    distinct.sort_unstable();
    distinct.into_iter().map(|count| count.to_string()).collect()
}
