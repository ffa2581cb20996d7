//! In-memory collaborators for controller and session tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{BookingError, BookingResult};
use crate::gateway::{BookingApi, SubmitAck};
use crate::identity::IdentityProvider;
use crate::models::{BookingRequest, Coupon, Service, UserProfile};

pub fn sample_services() -> Vec<Service> {
    vec![
        Service {
            service_id: "S1".to_string(),
            name: "Haircut".to_string(),
            price: 100.0,
            duration_minutes: 30,
        },
        Service {
            service_id: "S2".to_string(),
            name: "Wash".to_string(),
            price: 50.0,
            duration_minutes: 15,
        },
    ]
}

pub fn profile() -> UserProfile {
    UserProfile {
        user_id: "U123".to_string(),
        display_name: "Somchai".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub services: usize,
    pub availability: Vec<(NaiveDate, u32)>,
    pub coupons: Vec<String>,
}

struct FakeState {
    services: Vec<Service>,
    services_error: Option<BookingError>,
    slots: Vec<String>,
    coupons: Vec<Coupon>,
    coupon_error: Option<BookingError>,
    submit_error: Option<BookingError>,
    submitted: Vec<BookingRequest>,
    calls: Calls,
}

/// Scripted booking endpoint.
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl Default for FakeApi {
    fn default() -> Self {
        FakeApi {
            state: Mutex::new(FakeState {
                services: sample_services(),
                services_error: None,
                slots: Vec::new(),
                coupons: Vec::new(),
                coupon_error: None,
                submit_error: None,
                submitted: Vec::new(),
                calls: Calls::default(),
            }),
        }
    }
}

impl FakeApi {
    pub fn set_slots(&self, slots: Vec<&str>) {
        self.state.lock().unwrap().slots = slots.into_iter().map(str::to_string).collect();
    }

    pub fn add_coupon(&self, coupon: Coupon) {
        self.state.lock().unwrap().coupons.push(coupon);
    }

    pub fn fail_services(&self, err: BookingError) {
        self.state.lock().unwrap().services_error = Some(err);
    }

    pub fn fail_coupons(&self, err: BookingError) {
        self.state.lock().unwrap().coupon_error = Some(err);
    }

    pub fn fail_submissions(&self, err: BookingError) {
        self.state.lock().unwrap().submit_error = Some(err);
    }

    pub fn accept_submissions(&self) {
        self.state.lock().unwrap().submit_error = None;
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn submitted(&self) -> Vec<BookingRequest> {
        self.state.lock().unwrap().submitted.clone()
    }
}

#[async_trait]
impl BookingApi for FakeApi {
    async fn list_services(&self) -> BookingResult<Vec<Service>> {
        let mut state = self.state.lock().unwrap();
        state.calls.services += 1;
        match &state.services_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.services.clone()),
        }
    }

    async fn list_availability(&self, date: NaiveDate, duration_minutes: u32) -> BookingResult<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.availability.push((date, duration_minutes));
        Ok(state.slots.clone())
    }

    async fn validate_coupon(&self, code: &str) -> BookingResult<Option<Coupon>> {
        let mut state = self.state.lock().unwrap();
        state.calls.coupons.push(code.to_string());
        if let Some(err) = &state.coupon_error {
            return Err(err.clone());
        }
        Ok(state.coupons.iter().find(|c| c.code == code).cloned())
    }

    async fn submit_booking(&self, booking: &BookingRequest) -> BookingResult<SubmitAck> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(booking.clone());
        match &state.submit_error {
            Some(err) => Err(err.clone()),
            None => Ok(SubmitAck::Confirmed),
        }
    }
}

pub struct StaticIdentity {
    profile: Option<UserProfile>,
    init_error: Option<String>,
    login_requested: AtomicBool,
}

impl StaticIdentity {
    pub fn logged_in() -> Self {
        StaticIdentity {
            profile: Some(profile()),
            init_error: None,
            login_requested: AtomicBool::new(false),
        }
    }

    pub fn logged_out() -> Self {
        StaticIdentity {
            profile: None,
            init_error: None,
            login_requested: AtomicBool::new(false),
        }
    }

    pub fn failing(message: &str) -> Self {
        StaticIdentity {
            profile: Some(profile()),
            init_error: Some(message.to_string()),
            login_requested: AtomicBool::new(false),
        }
    }

    pub fn login_requested(&self) -> bool {
        self.login_requested.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn init(&self) -> BookingResult<()> {
        match &self.init_error {
            Some(message) => Err(BookingError::Auth(message.clone())),
            None => Ok(()),
        }
    }

    fn is_logged_in(&self) -> bool {
        self.profile.is_some()
    }

    async fn login(&self) -> BookingResult<()> {
        self.login_requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn profile(&self) -> BookingResult<UserProfile> {
        self.profile
            .clone()
            .ok_or_else(|| BookingError::Auth("not logged in".to_string()))
    }

    async fn close_window(&self) -> BookingResult<()> {
        Ok(())
    }
}
