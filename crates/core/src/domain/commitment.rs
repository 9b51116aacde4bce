use serde::{Deserialize, Serialize};

use crate::domain::RawRecord;
use crate::normalize::clean;

/// Performer sentinel for opportunities nobody has engaged with, and for
/// commitments whose performer fields are all empty.
pub const NO_COMMITMENT: &str = "No Commitment";

/// Source header names for the commitment/action export.
pub mod fields {
    pub const OPPORTUNITY_ID: &str = "Opportunity ID";
    pub const USER: &str = "User";
    pub const OWNER: &str = "Owner";
    pub const ACTIVITY_USER: &str = "Activity User";
    pub const CATEGORY: &str = "Category";
    pub const ACTIVITY: &str = "Activity";
    pub const DATE: &str = "Date";
}

/// Candidate performer headers in resolution priority order.
pub const PERFORMER_FIELDS: [&str; 3] = [fields::USER, fields::OWNER, fields::ACTIVITY_USER];

/// A logged engagement (call, visit, meeting) tied to an opportunity and a
/// performer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub opportunity_id: String,
    pub performer: String,
    pub category: String,
    pub activity: String,
    pub date: String,
}

/// The performer attribution rule: first non-empty of the three candidate
/// headers wins; all-empty resolves to the sentinel. Exports vary in which
/// header carries the name, so the chain is fixed business logic.
pub fn resolve_performer(record: &RawRecord) -> String {
    for field in PERFORMER_FIELDS {
        let candidate = clean(record.get(field));
        if !candidate.is_empty() {
            return candidate;
        }
    }
    NO_COMMITMENT.to_owned()
}

impl Commitment {
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            opportunity_id: clean(record.get(fields::OPPORTUNITY_ID)),
            performer: resolve_performer(record),
            category: clean(record.get(fields::CATEGORY)),
            activity: clean(record.get(fields::ACTIVITY)),
            date: clean(record.get(fields::DATE)),
        }
    }
}
