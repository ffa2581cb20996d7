//! Declarative view: a session snapshot goes in, a surface-independent
//! description of what to show comes out. Re-run after every mutation.

pub mod calendar;

use chrono::NaiveDate;

use crate::models::CouponKind;
use crate::pricing;
use crate::session::{CouponStatus, Screen, Session, SlotState};

pub use calendar::{CalendarDay, MonthCalendar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Landing {
        user_name: String,
    },
    Booking(BookingView),
    Confirmation {
        user_name: String,
        booking_ref: Option<String>,
    },
    Error {
        message: String,
        can_go_back: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingView {
    pub services: Vec<ServiceRow>,
    pub calendar: MonthCalendar,
    pub slots: SlotPanel,
    pub summary: SummaryView,
    pub coupon: Option<CouponLine>,
    pub confirm: ConfirmButton,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub index: usize,
    pub name: String,
    pub price: String,
    pub duration: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotNotice {
    SelectFirst,
    Checking,
    FetchFailed,
    NoneAvailable,
}

impl SlotNotice {
    pub fn text(&self) -> &'static str {
        match self {
            SlotNotice::SelectFirst => "Please select services and a date first.",
            SlotNotice::Checking => "Checking availability...",
            SlotNotice::FetchFailed => "Could not fetch time slots.",
            SlotNotice::NoneAvailable => "Sorry, no available slots for this day.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotButton {
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotPanel {
    Notice(SlotNotice),
    Slots(Vec<SlotButton>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryView {
    Empty,
    Priced {
        items: Vec<SummaryLine>,
        subtotal: SummaryLine,
        discount: Option<SummaryLine>,
        total: SummaryLine,
    },
}

impl SummaryView {
    pub const EMPTY_TEXT: &'static str = "No services selected yet.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponLine {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmButton {
    pub label: &'static str,
    pub enabled: bool,
}

pub fn render(session: &Session, today: NaiveDate, currency: &str) -> View {
    let user_name = session
        .profile()
        .map(|p| p.display_name.clone())
        .unwrap_or_default();

    match session.screen() {
        Screen::Loading => View::Loading,
        Screen::Landing => View::Landing { user_name },
        Screen::Booking => View::Booking(render_booking(session, today, currency)),
        Screen::Confirmation => View::Confirmation {
            user_name,
            booking_ref: session.confirmed_ref().map(|r| r.to_string()),
        },
        Screen::Error => {
            let (message, can_go_back) = session
                .error()
                .map_or((String::from("Something went wrong."), false), |e| {
                    (e.message.clone(), e.recoverable)
                });
            View::Error { message, can_go_back }
        }
    }
}

fn render_booking(session: &Session, today: NaiveDate, currency: &str) -> BookingView {
    let selection = session.selection();

    let services = session
        .catalog()
        .iter()
        .enumerate()
        .map(|(index, service)| ServiceRow {
            index,
            name: service.name.clone(),
            price: format!("{} {}", service.price, currency),
            duration: format!("({} min)", service.duration_minutes),
            checked: selection.is_selected(&service.service_id),
        })
        .collect();

    let slots = match session.slots() {
        SlotState::NeedSelection => SlotPanel::Notice(SlotNotice::SelectFirst),
        SlotState::Checking => SlotPanel::Notice(SlotNotice::Checking),
        SlotState::Unavailable => SlotPanel::Notice(SlotNotice::FetchFailed),
        SlotState::Ready(tokens) if tokens.is_empty() => SlotPanel::Notice(SlotNotice::NoneAvailable),
        SlotState::Ready(tokens) => SlotPanel::Slots(
            tokens
                .iter()
                .enumerate()
                .map(|(index, token)| SlotButton {
                    index,
                    label: token.clone(),
                    selected: selection.time() == Some(token.as_str()),
                })
                .collect(),
        ),
    };

    let coupon = match session.coupon_status() {
        CouponStatus::Idle => None,
        CouponStatus::Validating(_) => Some(CouponLine {
            text: "Validating...".to_string(),
            tone: Tone::Neutral,
        }),
        CouponStatus::Applied(code) => Some(CouponLine {
            text: format!("Coupon \"{}\" applied!", code),
            tone: Tone::Success,
        }),
        CouponStatus::Invalid => Some(CouponLine {
            text: "Invalid or expired coupon.".to_string(),
            tone: Tone::Error,
        }),
    };

    let confirm = ConfirmButton {
        label: if session.is_submitting() { "Submitting..." } else { "Confirm Booking" },
        enabled: session.can_confirm() && !session.is_submitting(),
    };

    BookingView {
        services,
        calendar: MonthCalendar::for_month_of(today, selection.date()),
        slots,
        summary: render_summary(session, currency),
        coupon,
        confirm,
    }
}

fn render_summary(session: &Session, currency: &str) -> SummaryView {
    let selected = session.selected_services();
    if selected.is_empty() {
        return SummaryView::Empty;
    }

    let summary = session.summary();
    let items = selected
        .iter()
        .map(|s| SummaryLine {
            label: s.name.clone(),
            amount: format!("{} {}", s.price, currency),
        })
        .collect();

    let discount = session.selection().coupon().filter(|c| pricing::is_well_formed(c)).and_then(|coupon| {
        let label = match coupon.kind {
            CouponKind::Percentage => format!("Discount ({}%)", coupon.value),
            CouponKind::Fixed => "Discount".to_string(),
            CouponKind::Unknown => return None,
        };
        Some(SummaryLine {
            label,
            amount: format!("-{:.2} {}", summary.discount, currency),
        })
    });

    SummaryView::Priced {
        items,
        subtotal: SummaryLine {
            label: "Subtotal".to_string(),
            amount: format!("{} {}", summary.subtotal, currency),
        },
        discount,
        total: SummaryLine {
            label: "Total".to_string(),
            amount: format!("{:.2} {}", summary.final_price, currency),
        },
    }
}
