use serde::{Deserialize, Serialize};

use crate::gateway::wire::{lenient_f64, lenient_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    Percentage,
    Fixed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    #[serde(deserialize_with = "lenient_f64")]
    pub value: f64,
}

#[cfg(test)]
impl Coupon {
    pub fn percentage(code: impl Into<String>, value: f64) -> Self {
        Coupon { code: code.into(), kind: CouponKind::Percentage, value }
    }

    pub fn fixed(code: impl Into<String>, value: f64) -> Self {
        Coupon { code: code.into(), kind: CouponKind::Fixed, value }
    }
}
