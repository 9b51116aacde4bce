//! The 1:N denormalizing join: each opportunity becomes one analytic row per
//! distinct performer among its linked commitments, or a single sentinel row
//! when nobody has engaged with it.

use std::collections::HashMap;

use crate::domain::commitment::{Commitment, NO_COMMITMENT};
use crate::domain::opportunity::Opportunity;
use crate::domain::record::AnalyticRecord;
use crate::engine::index::{CommitmentIndex, CoverageIndex};
use crate::normalize::{parse_close_date, parse_currency, parse_probability};

#[derive(Debug, Default)]
pub struct UnfoldOutput {
    pub records: Vec<AnalyticRecord>,
    pub coverage: CoverageIndex,
}

/// Unfolds every opportunity into per-performer analytic records and builds
/// the coverage side index consumed by gap detection.
///
/// Total emitted records is always >= the number of opportunities; equality
/// holds exactly when no opportunity has commitments from more than one
/// performer.
pub fn unfold(opportunities: &[Opportunity], index: &CommitmentIndex<'_>) -> UnfoldOutput {
    let mut output = UnfoldOutput::default();

    for opportunity in opportunities {
        let linked = index.linked(&opportunity.id);
        if linked.is_empty() {
            output.records.push(base_record(opportunity, NO_COMMITMENT, 0, "", ""));
            continue;
        }

        for (performer, partition) in partition_by_performer(linked) {
            if performer != NO_COMMITMENT && !opportunity.account_id.is_empty() {
                output.coverage.record(performer, &opportunity.account_id, &opportunity.id);
            }

            let top_category = most_frequent(partition.iter().map(|c| c.category.as_str()));
            let top_activity = most_frequent(partition.iter().map(|c| c.activity.as_str()));
            output.records.push(base_record(
                opportunity,
                performer,
                partition.len(),
                &top_category,
                &top_activity,
            ));
        }
    }

    output
}

/// Groups linked commitments by resolved performer, preserving the order in
/// which performers first appear.
fn partition_by_performer<'a>(
    linked: &[&'a Commitment],
) -> Vec<(&'a str, Vec<&'a Commitment>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut partitions: HashMap<&str, Vec<&Commitment>> = HashMap::new();
    for commitment in linked.iter().copied() {
        let performer = commitment.performer.as_str();
        if !partitions.contains_key(performer) {
            order.push(performer);
        }
        partitions.entry(performer).or_default().push(commitment);
    }
    order
        .into_iter()
        .map(|performer| {
            let partition = partitions.remove(performer).unwrap_or_default();
            (performer, partition)
        })
        .collect()
}

/// Most frequent non-empty value, ties broken by first occurrence.
fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        if value.is_empty() {
            continue;
        }
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best = "";
    let mut best_count = 0;
    for value in order {
        let count = counts[value];
        if count > best_count {
            best = value;
            best_count = count;
        }
    }
    best.to_owned()
}

fn base_record(
    opportunity: &Opportunity,
    performer: &str,
    commitment_count: usize,
    top_category: &str,
    top_activity: &str,
) -> AnalyticRecord {
    let close = parse_close_date(&opportunity.expected_close_date);
    let probability = parse_probability(&opportunity.probability);

    AnalyticRecord {
        opportunity_id: opportunity.id.clone(),
        account_id: opportunity.account_id.clone(),
        account: opportunity.account.clone(),
        representative: opportunity.representative.clone(),
        owner: opportunity.owner.clone(),
        performer: performer.to_owned(),
        stage: opportunity.stage.clone(),
        probability: probability.display,
        probability_num: probability.numeric,
        close_month: close.month_name,
        close_month_num: close.month_num,
        close_year: close.year,
        expected_value: parse_currency(&opportunity.expected_value),
        closed_value: parse_currency(&opportunity.closed_value),
        commitment_count,
        top_category: top_category.to_owned(),
        top_activity: top_activity.to_owned(),
        opportunity_type: opportunity.opportunity_type.clone(),
        opportunity_subtype: opportunity.opportunity_subtype.clone(),
        origin: opportunity.origin.clone(),
        closing_reason: opportunity.closing_reason.clone(),
        loss_reason: opportunity.loss_reason.clone(),
        competitors: opportunity.competitors.clone(),
        city: opportunity.city.clone(),
        state: opportunity.state.clone(),
        segment: opportunity.segment.clone(),
    }
}
