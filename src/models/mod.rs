pub mod booking;
pub mod coupon;
pub mod profile;
pub mod service;

pub use booking::BookingRequest;
pub use coupon::{Coupon, CouponKind};
pub use profile::UserProfile;
pub use service::Service;
