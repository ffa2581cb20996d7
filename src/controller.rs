use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::gateway::BookingApi;
use crate::identity::IdentityProvider;
use crate::models::BookingRequest;
use crate::session::{AvailabilityTicket, CouponTicket, Screen, Session, SERVICES_FAILED_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Ready,
    /// Login was triggered; the session stays on the loading screen.
    LoginRequired,
    Failed,
}

/// Network work left over after a state change. Callers re-render between
/// the state change and [`BookingController::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    Nothing,
    Availability(AvailabilityTicket),
    Coupon(CouponTicket),
    Submit(BookingRequest),
}

/// Drives one session through the booking flow. The session lock is never
/// held across a network call.
pub struct BookingController<A: BookingApi> {
    api: Arc<A>,
}

impl<A: BookingApi> BookingController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn initialize<I>(&self, session: &Mutex<Session>, identity: &I) -> InitOutcome
    where
        I: IdentityProvider + ?Sized,
    {
        session.lock().await.show(Screen::Loading);

        if let Err(e) = identity.init().await {
            log::error!("Identity initialisation failed: {}", e);
            session.lock().await.fail(e.user_message(), false);
            return InitOutcome::Failed;
        }

        if !identity.is_logged_in() {
            if let Err(e) = identity.login().await {
                log::error!("Login redirect failed: {}", e);
                session.lock().await.fail(e.user_message(), false);
                return InitOutcome::Failed;
            }
            return InitOutcome::LoginRequired;
        }

        let profile = match identity.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("Profile lookup failed: {}", e);
                session.lock().await.fail(e.user_message(), false);
                return InitOutcome::Failed;
            }
        };
        log::info!("👤 Session started for {} ({})", profile.display_name, profile.user_id);
        session.lock().await.bind_profile(profile);

        match self.api.list_services().await {
            Ok(services) => {
                let mut session = session.lock().await;
                session.set_catalog(services);
                session.show(Screen::Landing);
                InitOutcome::Ready
            }
            Err(e) => {
                log::error!("Initialization failed, services unavailable: {}", e);
                session.lock().await.fail(SERVICES_FAILED_MESSAGE, false);
                InitOutcome::Failed
            }
        }
    }

    pub async fn start_booking(&self, session: &Mutex<Session>) {
        let mut session = session.lock().await;
        if session.screen() == Screen::Landing {
            session.show(Screen::Booking);
        }
    }

    /// Leaves a recoverable error screen for another attempt.
    pub async fn back_to_booking(&self, session: &Mutex<Session>) {
        let mut session = session.lock().await;
        if session.error().map_or(false, |e| e.recoverable) {
            session.show(Screen::Booking);
        }
    }

    pub async fn toggle_service(&self, session: &Mutex<Session>, service_id: &str) -> FollowUp {
        let mut session = session.lock().await;
        if session.screen() != Screen::Booking {
            return FollowUp::Nothing;
        }
        session
            .toggle_service(service_id)
            .map_or(FollowUp::Nothing, FollowUp::Availability)
    }

    /// Dates before `today` are refused.
    pub async fn select_date(&self, session: &Mutex<Session>, date: NaiveDate, today: NaiveDate) -> FollowUp {
        if date < today {
            log::warn!("Refusing past date {}", date);
            return FollowUp::Nothing;
        }
        let mut session = session.lock().await;
        if session.screen() != Screen::Booking {
            return FollowUp::Nothing;
        }
        session
            .select_date(date)
            .map_or(FollowUp::Nothing, FollowUp::Availability)
    }

    pub async fn select_time(&self, session: &Mutex<Session>, token: &str) -> bool {
        let mut session = session.lock().await;
        session.screen() == Screen::Booking && session.select_time(token)
    }

    pub async fn apply_coupon(&self, session: &Mutex<Session>, code: &str) -> FollowUp {
        let mut session = session.lock().await;
        if session.screen() != Screen::Booking {
            return FollowUp::Nothing;
        }
        session.begin_coupon(code).map_or(FollowUp::Nothing, FollowUp::Coupon)
    }

    pub async fn confirm(&self, session: &Mutex<Session>) -> FollowUp {
        let mut session = session.lock().await;
        if session.screen() != Screen::Booking {
            return FollowUp::Nothing;
        }
        session.begin_submit().map_or(FollowUp::Nothing, FollowUp::Submit)
    }

    /// Renders, completes the follow-up, then renders again. The follow-up
    /// runs even when the first render fails; only the last render's error
    /// is returned.
    pub async fn settle<R, Fut, E>(&self, session: &Mutex<Session>, follow_up: FollowUp, mut render: R) -> Result<(), E>
    where
        R: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let first = render().await;
        if follow_up == FollowUp::Nothing {
            return first;
        }
        if let Err(e) = first {
            log::warn!("Render before follow-up failed: {}", e);
        }
        self.complete(session, follow_up).await;
        render().await
    }

    /// Runs the network call for a follow-up and folds the answer back in.
    pub async fn complete(&self, session: &Mutex<Session>, follow_up: FollowUp) {
        match follow_up {
            FollowUp::Nothing => {}
            FollowUp::Availability(ticket) => {
                let result = self
                    .api
                    .list_availability(ticket.date, ticket.duration_minutes)
                    .await;
                session.lock().await.finish_availability(&ticket, result);
            }
            FollowUp::Coupon(ticket) => {
                let result = self.api.validate_coupon(&ticket.code).await;
                session.lock().await.finish_coupon(&ticket, result);
            }
            FollowUp::Submit(request) => {
                let result = self.api.submit_booking(&request).await;
                if result.is_ok() {
                    log::info!("✅ Booking {} accepted", request.booking_ref);
                }
                session.lock().await.finish_submit(result);
            }
        }
    }
}
