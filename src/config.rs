use std::env;
use std::time::Duration;

use chrono::{FixedOffset, Local, NaiveDate, Utc};

use crate::error::{BookingError, BookingResult};

const API_URL_ENV: &str = "BOOKING_API_URL";
const CURRENCY_ENV: &str = "BOOKING_CURRENCY";
const UTC_OFFSET_ENV: &str = "BOOKING_UTC_OFFSET_HOURS";
const HTTP_TIMEOUT_ENV: &str = "BOOKING_HTTP_TIMEOUT_SECS";
const HTTP_RETRIES_ENV: &str = "BOOKING_HTTP_RETRIES";
const SESSION_TTL_ENV: &str = "BOOKING_SESSION_TTL_SECS";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub currency: String,
    pub utc_offset: Option<FixedOffset>,
    pub http_timeout: Duration,
    pub http_retries: u32,
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> BookingResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> BookingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BookingError::Config(format!("{} must be set", API_URL_ENV)))?;
        reqwest::Url::parse(&api_url)
            .map_err(|e| BookingError::Config(format!("{} is not a valid URL: {}", API_URL_ENV, e)))?;

        let currency = lookup(CURRENCY_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "THB".to_string());

        let utc_offset = match parse_var::<i32>(&lookup, UTC_OFFSET_ENV)? {
            Some(hours) => Some(
                hours
                    .checked_mul(3600)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| BookingError::Config(format!("{} out of range: {}", UTC_OFFSET_ENV, hours)))?,
            ),
            None => None,
        };

        let http_timeout = Duration::from_secs(parse_var(&lookup, HTTP_TIMEOUT_ENV)?.unwrap_or(15));
        let http_retries = parse_var(&lookup, HTTP_RETRIES_ENV)?.unwrap_or(1);
        let session_ttl = Duration::from_secs(parse_var(&lookup, SESSION_TTL_ENV)?.unwrap_or(1800));

        Ok(AppConfig {
            api_url,
            currency,
            utc_offset,
            http_timeout,
            http_retries,
            session_ttl,
        })
    }

    /// Calendar date used to disable past days.
    pub fn today(&self) -> NaiveDate {
        match self.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> BookingResult<Option<T>> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| BookingError::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(None),
    }
}
