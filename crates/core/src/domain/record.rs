use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One analytic row produced by the join & unfold engine: an (opportunity,
/// performer) pair with all opportunity attributes carried through and the
/// performer's engagement rolled up.
///
/// Every opportunity produces at least one record. With zero linked
/// commitments it produces exactly one, with the `NO_COMMITMENT` sentinel as
/// performer and a count of zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticRecord {
    pub opportunity_id: String,
    pub account_id: String,
    pub account: String,
    pub representative: String,
    pub owner: String,
    pub performer: String,
    pub stage: String,
    pub probability: String,
    pub probability_num: u32,
    pub close_month: String,
    pub close_month_num: u8,
    pub close_year: String,
    pub expected_value: Decimal,
    pub closed_value: Decimal,
    pub commitment_count: usize,
    pub top_category: String,
    pub top_activity: String,
    pub opportunity_type: String,
    pub opportunity_subtype: String,
    pub origin: String,
    pub closing_reason: String,
    pub loss_reason: String,
    pub competitors: String,
    pub city: String,
    pub state: String,
    pub segment: String,
}

/// A coverage-gap signal: `performer` has commitments elsewhere on
/// `account_id` but none on `opportunity_id`, the opportunity's sequence
/// number exceeds the performer's highest covered sequence number there, and
/// the opportunity is still open.
///
/// The anchor fields reference the covered opportunity with the maximum
/// sequence number for the (performer, account) pair; `anchor_commitments`
/// counts only the performer's own commitments on that anchor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGapRecord {
    pub opportunity_id: String,
    pub account_id: String,
    pub account: String,
    pub performer: String,
    pub stage: String,
    pub probability: String,
    pub expected_value: Decimal,
    pub close_month: String,
    pub close_year: String,
    pub anchor_id: String,
    pub anchor_stage: String,
    pub anchor_commitments: usize,
}
