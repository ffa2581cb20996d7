use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::BookingResult;
use crate::models::{BookingRequest, Coupon, Service, UserProfile};
use crate::pricing::{self, PriceSummary};
use crate::selection::Selection;

pub const SERVICES_FAILED_MESSAGE: &str = "Could not fetch services.";
pub const SUBMIT_FAILED_MESSAGE: &str = "There was a problem confirming your booking. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Landing,
    Booking,
    Confirmation,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    /// No date yet, or nothing selected so the duration is zero.
    NeedSelection,
    Checking,
    /// The fetch failed.
    Unavailable,
    Ready(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CouponStatus {
    Idle,
    Validating(String),
    Applied(String),
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNotice {
    pub message: String,
    /// Submit failures can go back to the booking screen; init failures can't.
    pub recoverable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityTicket {
    seq: u64,
    pub date: NaiveDate,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTicket {
    seq: u64,
    pub code: String,
}

/// In-memory state of one booking attempt.
#[derive(Debug, Clone)]
pub struct Session {
    profile: Option<UserProfile>,
    catalog: Vec<Service>,
    selection: Selection,
    screen: Screen,
    slots: SlotState,
    coupon_status: CouponStatus,
    error: Option<ErrorNotice>,
    submitting: bool,
    pending_ref: Option<Uuid>,
    confirmed_ref: Option<Uuid>,
    next_seq: u64,
    availability: Option<AvailabilityTicket>,
    coupon_check: Option<CouponTicket>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            profile: None,
            catalog: Vec::new(),
            selection: Selection::default(),
            screen: Screen::Loading,
            slots: SlotState::NeedSelection,
            coupon_status: CouponStatus::Idle,
            error: None,
            submitting: false,
            pending_ref: None,
            confirmed_ref: None,
            next_seq: 0,
            availability: None,
            coupon_check: None,
        }
    }

    // --- screen router ---

    pub fn show(&mut self, screen: Screen) {
        if screen != Screen::Error {
            self.error = None;
        }
        self.screen = screen;
    }

    pub fn fail(&mut self, message: impl Into<String>, recoverable: bool) {
        self.error = Some(ErrorNotice {
            message: message.into(),
            recoverable,
        });
        self.screen = Screen::Error;
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    // --- identity & catalog ---

    pub fn bind_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn set_catalog(&mut self, services: Vec<Service>) {
        self.catalog = services;
    }

    pub fn catalog(&self) -> &[Service] {
        &self.catalog
    }

    pub fn service_id_at(&self, index: usize) -> Option<&str> {
        self.catalog.get(index).map(|s| s.service_id.as_str())
    }

    // --- derived state ---

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected services in catalog order.
    pub fn selected_services(&self) -> Vec<&Service> {
        self.catalog
            .iter()
            .filter(|s| self.selection.is_selected(&s.service_id))
            .collect()
    }

    pub fn summary(&self) -> PriceSummary {
        pricing::compute_summary(self.selected_services(), self.selection.coupon())
    }

    pub fn total_duration(&self) -> u32 {
        pricing::total_duration(self.selected_services())
    }

    pub fn can_confirm(&self) -> bool {
        self.selection.can_confirm()
    }

    pub fn slots(&self) -> &SlotState {
        &self.slots
    }

    pub fn slot_at(&self, index: usize) -> Option<&str> {
        match &self.slots {
            SlotState::Ready(slots) => slots.get(index).map(String::as_str),
            _ => None,
        }
    }

    pub fn coupon_status(&self) -> &CouponStatus {
        &self.coupon_status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn confirmed_ref(&self) -> Option<Uuid> {
        self.confirmed_ref
    }

    // --- selection changes ---

    /// Unknown ids are ignored. Returns the availability fetch to run, if any.
    pub fn toggle_service(&mut self, service_id: &str) -> Option<AvailabilityTicket> {
        if !self.catalog.iter().any(|s| s.service_id == service_id) {
            log::warn!("Ignoring toggle of unknown service {}", service_id);
            return None;
        }
        self.selection.toggle_service(service_id);
        self.pending_ref = None;
        self.refresh_availability()
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Option<AvailabilityTicket> {
        self.selection.select_date(date);
        self.pending_ref = None;
        self.refresh_availability()
    }

    /// Only tokens from the current slot list are accepted.
    pub fn select_time(&mut self, token: &str) -> bool {
        let offered = matches!(&self.slots, SlotState::Ready(slots) if slots.iter().any(|s| s == token));
        if offered {
            self.selection.select_time(token);
            self.pending_ref = None;
        }
        offered
    }

    /// Supersedes any in-flight availability fetch. The slot list is replaced,
    /// so the chosen time goes with it.
    fn refresh_availability(&mut self) -> Option<AvailabilityTicket> {
        self.selection.clear_time();
        let duration_minutes = self.total_duration();
        match self.selection.date() {
            Some(date) if duration_minutes > 0 => {
                let ticket = AvailabilityTicket {
                    seq: self.bump_seq(),
                    date,
                    duration_minutes,
                };
                self.slots = SlotState::Checking;
                self.availability = Some(ticket.clone());
                Some(ticket)
            }
            _ => {
                self.slots = SlotState::NeedSelection;
                self.availability = None;
                None
            }
        }
    }

    /// Applies a fetch result if its ticket is still current. Returns false for stale results.
    pub fn finish_availability(&mut self, ticket: &AvailabilityTicket, result: BookingResult<Vec<String>>) -> bool {
        if self.availability.as_ref() != Some(ticket) {
            log::debug!("Discarding stale availability for {} ({} min)", ticket.date, ticket.duration_minutes);
            return false;
        }
        self.availability = None;
        self.slots = match result {
            Ok(slots) => SlotState::Ready(slots),
            Err(e) => {
                log::warn!("Availability fetch for {} failed: {}", ticket.date, e);
                SlotState::Unavailable
            }
        };
        true
    }

    /// Blank codes are ignored.
    pub fn begin_coupon(&mut self, code: &str) -> Option<CouponTicket> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let ticket = CouponTicket {
            seq: self.bump_seq(),
            code: code.to_string(),
        };
        self.coupon_status = CouponStatus::Validating(ticket.code.clone());
        self.coupon_check = Some(ticket.clone());
        Some(ticket)
    }

    pub fn finish_coupon(&mut self, ticket: &CouponTicket, result: BookingResult<Option<Coupon>>) -> bool {
        if self.coupon_check.as_ref() != Some(ticket) {
            log::debug!("Discarding stale coupon result for {}", ticket.code);
            return false;
        }
        self.coupon_check = None;
        self.pending_ref = None;
        match result {
            Ok(Some(coupon)) if pricing::is_well_formed(&coupon) => {
                self.coupon_status = CouponStatus::Applied(coupon.code.clone());
                self.selection.apply_coupon(Some(coupon));
            }
            Ok(Some(coupon)) => {
                log::warn!("Coupon {} is malformed: {:?} {}", coupon.code, coupon.kind, coupon.value);
                self.coupon_status = CouponStatus::Invalid;
                self.selection.apply_coupon(None);
            }
            Ok(None) => {
                log::info!("Coupon {} was not accepted", ticket.code);
                self.coupon_status = CouponStatus::Invalid;
                self.selection.apply_coupon(None);
            }
            Err(e) => {
                log::warn!("Coupon check for {} failed: {}", ticket.code, e);
                self.coupon_status = CouponStatus::Invalid;
                self.selection.apply_coupon(None);
            }
        }
        true
    }

    // --- submission ---

    /// Builds the outbound booking and marks the session as submitting.
    /// The booking reference survives re-attempts until the selection changes.
    pub fn begin_submit(&mut self) -> Option<BookingRequest> {
        if self.submitting || !self.can_confirm() {
            return None;
        }
        let profile = self.profile.clone()?;
        let date = self.selection.date()?;
        let time = self.selection.time()?.to_string();

        let booking_ref = *self.pending_ref.get_or_insert_with(Uuid::new_v4);
        let request = BookingRequest {
            booking_ref,
            user_id: profile.user_id,
            user_name: profile.display_name,
            service_ids: self.selected_services().iter().map(|s| s.service_id.clone()).collect(),
            date,
            time,
            total_duration: self.total_duration(),
            final_price: self.summary().final_price,
        };
        self.submitting = true;
        Some(request)
    }

    pub fn finish_submit<T>(&mut self, result: BookingResult<T>) {
        self.submitting = false;
        match result {
            Ok(_) => {
                self.confirmed_ref = self.pending_ref.take();
                self.selection = Selection::default();
                self.slots = SlotState::NeedSelection;
                self.coupon_status = CouponStatus::Idle;
                self.show(Screen::Confirmation);
            }
            Err(e) => {
                log::error!("Booking submission failed: {}", e);
                self.fail(SUBMIT_FAILED_MESSAGE, true);
            }
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
