use serde::{Deserialize, Serialize};

use crate::gateway::wire::{lenient_f64, lenient_string, lenient_u32};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(deserialize_with = "lenient_string")]
    pub service_id: String,
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lenient_u32")]
    pub duration_minutes: u32,
}

impl Service {
    /// Rows with an empty id or a negative/non-finite price are not bookable.
    pub fn is_valid(&self) -> bool {
        !self.service_id.trim().is_empty() && self.price.is_finite() && self.price >= 0.0
    }
}
