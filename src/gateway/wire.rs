//! Decoding of the spreadsheet endpoint's loosely typed JSON.
//!
//! Every response is `{success, data}`. Only a literal `true` counts as
//! success; anything else is treated as an empty answer, even when `data`
//! carries something.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{BookingError, BookingResult};
use crate::models::{Coupon, Service};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Value,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Value,
}

impl Envelope {
    fn parse(body: &str) -> BookingResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    fn succeeded(&self) -> bool {
        self.success == Value::Bool(true)
    }
}

/// Outcome of a booking POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAck {
    /// The endpoint answered `success: true`.
    Confirmed,
    /// The endpoint answered with something that is not the envelope
    /// (typically an HTML redirect page). The write is assumed to have landed.
    Assumed,
}

pub fn parse_services(body: &str) -> BookingResult<Vec<Service>> {
    let envelope = Envelope::parse(body)?;
    if !envelope.succeeded() {
        return Err(BookingError::Api("Could not fetch services.".to_string()));
    }
    let Value::Array(rows) = envelope.data else {
        return Err(BookingError::Validation("services payload is not a list".to_string()));
    };

    let mut services: Vec<Service> = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<Service>(row) {
            Ok(service) if !service.is_valid() => {
                log::warn!("Skipping invalid service row: {:?}", service);
            }
            Ok(service) if services.iter().any(|s| s.service_id == service.service_id) => {
                log::warn!("Skipping duplicate service id {}", service.service_id);
            }
            Ok(service) => services.push(service),
            Err(e) => log::warn!("Skipping malformed service row: {}", e),
        }
    }
    Ok(services)
}

pub fn parse_availability(body: &str) -> BookingResult<Vec<String>> {
    let envelope = Envelope::parse(body)?;
    if !envelope.succeeded() {
        return Err(BookingError::Api("Could not fetch time slots.".to_string()));
    }
    match envelope.data {
        Value::Array(items) => Ok(items.into_iter().filter_map(slot_token).collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(BookingError::Validation("availability payload is not a list".to_string())),
    }
}

fn slot_token(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => {
            log::warn!("Ignoring non-text time slot: {}", other);
            None
        }
    }
}

/// `Ok(None)` covers both `success: false` and a null coupon.
pub fn parse_coupon(body: &str) -> BookingResult<Option<Coupon>> {
    let envelope = Envelope::parse(body)?;
    if !envelope.succeeded() || envelope.data.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(envelope.data)?))
}

pub fn parse_submit_ack(body: &str) -> BookingResult<SubmitAck> {
    match Envelope::parse(body) {
        Ok(envelope) if envelope.succeeded() => Ok(SubmitAck::Confirmed),
        Ok(envelope) => Err(BookingError::Api(
            envelope
                .message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| "The booking was rejected.".to_string()),
        )),
        Err(_) => Ok(SubmitAck::Assumed),
    }
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| D::Error::custom("number out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("not a number: {:?}", s))),
        other => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        _ => Err(D::Error::custom("expected a non-negative whole number")),
    }
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected text, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CouponKind;

    #[test]
    fn services_accept_numeric_strings_and_skip_bad_rows() {
        let body = r#"{
            "success": true,
            "data": [
                {"serviceId": "S1", "name": "Haircut", "price": 100, "durationMinutes": 30},
                {"serviceId": 2, "name": "Wash", "price": "50", "durationMinutes": "15"},
                {"serviceId": "S3", "name": "Broken", "price": -5, "durationMinutes": 10},
                {"serviceId": "S1", "name": "Duplicate", "price": 1, "durationMinutes": 1},
                {"name": "No id"}
            ]
        }"#;
        let services = parse_services(body).unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].service_id, "S1");
        assert_eq!(services[1].service_id, "2");
        assert_eq!(services[1].price, 50.0);
        assert_eq!(services[1].duration_minutes, 15);
    }

    #[test]
    fn services_failure_is_an_api_error() {
        let err = parse_services(r#"{"success": false, "data": [{"serviceId": "S1"}]}"#).unwrap_err();
        assert!(matches!(err, BookingError::Api(ref m) if m == "Could not fetch services."));

        let err = parse_services(r#"{"success": "true", "data": []}"#).unwrap_err();
        assert!(matches!(err, BookingError::Api(_)));
    }

    #[test]
    fn services_garbage_body_is_a_validation_error() {
        let err = parse_services("<html>oops</html>").unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn availability_keeps_order_and_tolerates_null() {
        let slots = parse_availability(r#"{"success": true, "data": ["09:00", "14:00", null, 1500]}"#).unwrap();
        assert_eq!(slots, vec!["09:00", "14:00", "1500"]);

        assert!(parse_availability(r#"{"success": true, "data": null}"#).unwrap().is_empty());
        assert!(parse_availability(r#"{"success": false, "data": ["09:00"]}"#).is_err());
    }

    #[test]
    fn coupon_absent_when_not_successful_or_null() {
        assert_eq!(parse_coupon(r#"{"success": false, "data": {"code": "X", "type": "FIXED", "value": 1}}"#).unwrap(), None);
        assert_eq!(parse_coupon(r#"{"success": true, "data": null}"#).unwrap(), None);
    }

    #[test]
    fn coupon_types_decode() {
        let coupon = parse_coupon(r#"{"success": true, "data": {"code": "TEN", "type": "PERCENTAGE", "value": "10"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(coupon.kind, CouponKind::Percentage);
        assert_eq!(coupon.value, 10.0);

        let odd = parse_coupon(r#"{"success": true, "data": {"code": "ODD", "type": "BOGO", "value": 1}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(odd.kind, CouponKind::Unknown);
    }

    #[test]
    fn submit_ack_reads_envelope_when_present() {
        assert_eq!(parse_submit_ack(r#"{"success": true}"#).unwrap(), SubmitAck::Confirmed);
        assert_eq!(parse_submit_ack("<html>Moved</html>").unwrap(), SubmitAck::Assumed);
        assert_eq!(parse_submit_ack("").unwrap(), SubmitAck::Assumed);

        let err = parse_submit_ack(r#"{"success": false, "message": "slot taken"}"#).unwrap_err();
        assert!(matches!(err, BookingError::Api(ref m) if m == "slot taken"));
    }
}
