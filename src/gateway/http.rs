use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::config::AppConfig;
use crate::error::{BookingError, BookingResult};
use crate::gateway::wire::{self, SubmitAck};
use crate::gateway::BookingApi;
use crate::models::{BookingRequest, Coupon, Service};

/// Gateway to the spreadsheet-backed web app. Reads go through the retrying
/// client; the booking POST does not.
#[derive(Clone)]
pub struct HttpGateway {
    base: Url,
    reader: ClientWithMiddleware,
    writer: Client,
}

impl HttpGateway {
    pub fn new(config: &AppConfig) -> BookingResult<Self> {
        let base = Url::parse(&config.api_url)
            .map_err(|e| BookingError::Config(format!("invalid API URL: {}", e)))?;

        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| BookingError::Config(format!("cannot build HTTP client: {}", e)))?;

        let retry_policy = ExponentialBackoff::builder()
            .build_with_max_retries(config.http_retries);

        let reader = ClientBuilder::new(client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(HttpGateway {
            base,
            reader,
            writer: client,
        })
    }

    async fn get_text(&self, url: Url) -> BookingResult<String> {
        log::debug!("GET {}", url);
        let response = self
            .reader
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        read_body(response).await
    }
}

pub fn action_url(base: &Url, action: &str, params: &[(&str, String)]) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("action", action);
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    url
}

async fn read_body(response: Response) -> BookingResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(BookingError::Api(format!("booking endpoint answered HTTP {}", status)));
    }
    Ok(response.text().await?)
}

#[async_trait]
impl BookingApi for HttpGateway {
    async fn list_services(&self) -> BookingResult<Vec<Service>> {
        let body = self.get_text(action_url(&self.base, "getServices", &[])).await?;
        let services = wire::parse_services(&body)?;
        log::info!("📋 Loaded {} services", services.len());
        Ok(services)
    }

    async fn list_availability(&self, date: NaiveDate, duration_minutes: u32) -> BookingResult<Vec<String>> {
        let url = action_url(
            &self.base,
            "getAvailability",
            &[
                ("date", date.format("%Y-%m-%d").to_string()),
                ("duration", duration_minutes.to_string()),
            ],
        );
        let body = self.get_text(url).await?;
        wire::parse_availability(&body)
    }

    async fn validate_coupon(&self, code: &str) -> BookingResult<Option<Coupon>> {
        let url = action_url(&self.base, "validateCoupon", &[("code", code.to_string())]);
        let body = self.get_text(url).await?;
        wire::parse_coupon(&body)
    }

    async fn submit_booking(&self, booking: &BookingRequest) -> BookingResult<SubmitAck> {
        log::info!(
            "📝 Submitting booking {} for user {} on {} {}",
            booking.booking_ref,
            booking.user_id,
            booking.date,
            booking.time
        );
        let response = self
            .writer
            .post(self.base.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(booking)?)
            .send()
            .await?;
        let body = read_body(response).await?;
        let ack = wire::parse_submit_ack(&body)?;
        if ack == SubmitAck::Assumed {
            log::warn!("Booking {} sent, acknowledgement unreadable; assuming success", booking.booking_ref);
        }
        Ok(ack)
    }
}
