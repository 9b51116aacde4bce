use serde::{Deserialize, Serialize};

use crate::domain::RawRecord;
use crate::normalize::clean;

/// Source header names for the opportunity export.
pub mod fields {
    pub const OPPORTUNITY_ID: &str = "Opportunity ID";
    pub const ACCOUNT_ID: &str = "Account ID";
    pub const ACCOUNT: &str = "Account";
    pub const REPRESENTATIVE: &str = "Representative";
    pub const OWNER: &str = "Owner";
    pub const STAGE: &str = "Stage";
    pub const PROBABILITY: &str = "Probability";
    pub const EXPECTED_CLOSE_DATE: &str = "Expected Close Date";
    pub const EXPECTED_VALUE: &str = "Expected Value";
    pub const CLOSED_VALUE: &str = "Closed Value";
    pub const OPPORTUNITY_TYPE: &str = "Opportunity Type";
    pub const OPPORTUNITY_SUBTYPE: &str = "Opportunity Subtype";
    pub const ORIGIN: &str = "Opportunity Origin";
    pub const CLOSING_REASON: &str = "Closing Reason";
    pub const LOSS_REASON: &str = "Loss Reason";
    pub const COMPETITORS: &str = "Competitors";
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const SEGMENT: &str = "Segment";
}

/// One sales-pipeline deal as exported, fields kept in their raw textual
/// form. Parsing into canonical values happens at unfold time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub account_id: String,
    pub account: String,
    pub representative: String,
    pub owner: String,
    pub stage: String,
    pub probability: String,
    pub expected_close_date: String,
    pub expected_value: String,
    pub closed_value: String,
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

impl Opportunity {
    /// Defensive construction: a missing or malformed field degrades to the
    /// empty string. A missing identifier is carried through as empty, which
    /// can collide downstream; that is an accepted source-data limitation.
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            id: clean(record.get(fields::OPPORTUNITY_ID)),
            account_id: clean(record.get(fields::ACCOUNT_ID)),
            account: clean(record.get(fields::ACCOUNT)),
            representative: clean(record.get(fields::REPRESENTATIVE)),
            owner: clean(record.get(fields::OWNER)),
            stage: clean(record.get(fields::STAGE)),
            probability: clean(record.get(fields::PROBABILITY)),
            expected_close_date: clean(record.get(fields::EXPECTED_CLOSE_DATE)),
            expected_value: clean(record.get(fields::EXPECTED_VALUE)),
            closed_value: clean(record.get(fields::CLOSED_VALUE)),
            opportunity_type: clean(record.get(fields::OPPORTUNITY_TYPE)),
            opportunity_subtype: clean(record.get(fields::OPPORTUNITY_SUBTYPE)),
            origin: clean(record.get(fields::ORIGIN)),
            closing_reason: clean(record.get(fields::CLOSING_REASON)),
            loss_reason: clean(record.get(fields::LOSS_REASON)),
            competitors: clean(record.get(fields::COMPETITORS)),
            city: clean(record.get(fields::CITY)),
            state: clean(record.get(fields::STATE)),
            segment: clean(record.get(fields::SEGMENT)),
        }
    }
}
