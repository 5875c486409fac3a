use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AggregatedFields;

/// Personal and payment details entered on the review screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDetails {
    pub full_name: String,
    pub church_member: String,
    pub mpesa_number: String,
}

impl ReceiptDetails {
    pub const FULL_NAME: &'static str = "full_name";
    pub const CHURCH_MEMBER: &'static str = "church_member";
    pub const MPESA_NUMBER: &'static str = "mpesa_number";
}

/// Body posted to the intake endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationPayload {
    #[serde(rename = "church")]
    pub entity: String,
    pub donations: AggregatedFields,
    pub receipt_details: ReceiptDetails,
    #[serde(rename = "timestamp")]
    pub submitted_at: DateTime<Utc>,
}
