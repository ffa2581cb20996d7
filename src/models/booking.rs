use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use uuid::Uuid;

/// Outbound booking body. Built once per submit attempt and never stored.
/// `booking_ref` is generated on the first attempt and reused on re-attempts
/// of the same selection so the backend can drop duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub booking_ref: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub service_ids: Vec<String>,
    pub date: NaiveDate,
    pub time: String,
    pub total_duration: u32,
    pub final_price: f64,
}
