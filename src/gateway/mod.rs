pub mod http;
pub mod wire;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::BookingResult;
use crate::models::{BookingRequest, Coupon, Service};

pub use http::HttpGateway;
pub use wire::SubmitAck;

/// The four operations of the remote booking endpoint.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_services(&self) -> BookingResult<Vec<Service>>;

    async fn list_availability(&self, date: NaiveDate, duration_minutes: u32) -> BookingResult<Vec<String>>;

    /// `Ok(None)` when the code is unknown or expired.
    async fn validate_coupon(&self, code: &str) -> BookingResult<Option<Coupon>>;

    async fn submit_booking(&self, booking: &BookingRequest) -> BookingResult<SubmitAck>;
}
