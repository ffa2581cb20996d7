use crate::models::{Coupon, CouponKind, Service};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceSummary {
    pub subtotal: f64,
    pub discount: f64,
    pub final_price: f64,
}

/// Subtotal, discount and final price for the given services.
/// The final price never drops below zero.
pub fn compute_summary<'a, I>(services: I, coupon: Option<&Coupon>) -> PriceSummary
where
    I: IntoIterator<Item = &'a Service>,
{
    let subtotal: f64 = services.into_iter().map(|s| s.price).sum();
    let discount = coupon.map_or(0.0, |c| discount_for(c, subtotal));
    let final_price = (subtotal - discount).max(0.0);

    PriceSummary {
        subtotal,
        discount,
        final_price,
    }
}

/// False for an unknown type or a negative or non-finite value.
pub fn is_well_formed(coupon: &Coupon) -> bool {
    coupon.kind != CouponKind::Unknown && coupon.value.is_finite() && coupon.value >= 0.0
}

/// Malformed coupons give no discount.
pub fn discount_for(coupon: &Coupon, subtotal: f64) -> f64 {
    if !is_well_formed(coupon) {
        return 0.0;
    }
    match coupon.kind {
        CouponKind::Percentage => subtotal * coupon.value / 100.0,
        CouponKind::Fixed => coupon.value,
        CouponKind::Unknown => 0.0,
    }
}

pub fn total_duration<'a, I>(services: I) -> u32
where
    I: IntoIterator<Item = &'a Service>,
{
    services
        .into_iter()
        .fold(0u32, |acc, s| acc.saturating_add(s.duration_minutes))
}
