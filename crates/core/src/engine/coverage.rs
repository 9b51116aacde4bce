//! Missing-commitment detection: for each (performer, account) pair, flag
//! still-open opportunities the performer has not engaged with whose
//! sequence number exceeds the newest opportunity they did cover there.
//!
//! The sequence number is a recency proxy derived from the digits of the
//! opportunity identifier. That assumption is unverified for non-numeric or
//! non-chronological identifier schemes.

use crate::config::AnalyticsSettings;
use crate::domain::record::CoverageGapRecord;
use crate::engine::index::{CommitmentIndex, CoverageIndex, OpportunityDirectory};
use crate::normalize::{parse_close_date, parse_currency, parse_probability, sequence_number};

/// Pure pass over the coverage index; running it twice on unchanged input
/// yields an identical record set.
pub fn detect_gaps(
    coverage: &CoverageIndex,
    directory: &OpportunityDirectory<'_>,
    commitments: &CommitmentIndex<'_>,
    settings: &AnalyticsSettings,
) -> Vec<CoverageGapRecord> {
    let mut gaps = Vec::new();

    for (performer, account_id, covered) in coverage.iter() {
        let (anchor_id, anchor_seq) = anchor(covered);

        for opportunity in directory.in_account(account_id) {
            let candidate_seq = sequence_number(&opportunity.id);
            // Ties in sequence number are treated as "not newer".
            if candidate_seq <= anchor_seq {
                continue;
            }
            if covered.iter().any(|id| id == &opportunity.id) {
                continue;
            }
            if settings.is_terminal(&opportunity.stage) {
                continue;
            }

            let close = parse_close_date(&opportunity.expected_close_date);
            gaps.push(CoverageGapRecord {
                opportunity_id: opportunity.id.clone(),
                account_id: account_id.to_owned(),
                account: opportunity.account.clone(),
                performer: performer.to_owned(),
                stage: opportunity.stage.clone(),
                probability: parse_probability(&opportunity.probability).display,
                expected_value: parse_currency(&opportunity.expected_value),
                close_month: close.month_name,
                close_year: close.year,
                anchor_id: anchor_id.to_owned(),
                anchor_stage: directory
                    .get(anchor_id)
                    .map(|anchor| anchor.stage.clone())
                    .unwrap_or_default(),
                anchor_commitments: commitments
                    .linked(anchor_id)
                    .iter()
                    .filter(|commitment| commitment.performer == performer)
                    .count(),
            });
        }
    }

    gaps
}

/// The covered opportunity with the maximum sequence number. Strictly
/// greater wins, so among equal sequence numbers the first covered
/// opportunity stays the anchor.
fn anchor(covered: &[String]) -> (&str, u64) {
    let mut anchor_id = "";
    let mut anchor_seq = 0;
    for id in covered {
        let seq = sequence_number(id);
        if seq > anchor_seq {
            anchor_id = id;
            anchor_seq = seq;
        }
    }
    (anchor_id, anchor_seq)
}
