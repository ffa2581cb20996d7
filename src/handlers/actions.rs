use chrono::NaiveDate;

/// Button presses on the widget, encoded into callback data.
/// Indices point into the session's service catalog and slot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    StartBooking,
    ToggleService(usize),
    SelectDate(NaiveDate),
    SelectTime(usize),
    EnterCoupon,
    Confirm,
    BackToBooking,
    Close,
    Ignore,
}

impl WidgetAction {
    pub fn to_callback_data(self) -> String {
        match self {
            WidgetAction::StartBooking => "start".to_string(),
            WidgetAction::ToggleService(index) => format!("svc_{}", index),
            WidgetAction::SelectDate(date) => format!("date_{}", date.format("%Y-%m-%d")),
            WidgetAction::SelectTime(index) => format!("time_{}", index),
            WidgetAction::EnterCoupon => "coupon".to_string(),
            WidgetAction::Confirm => "confirm".to_string(),
            WidgetAction::BackToBooking => "back".to_string(),
            WidgetAction::Close => "close".to_string(),
            WidgetAction::Ignore => "ignore".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "start" => Some(WidgetAction::StartBooking),
            "coupon" => Some(WidgetAction::EnterCoupon),
            "confirm" => Some(WidgetAction::Confirm),
            "back" => Some(WidgetAction::BackToBooking),
            "close" => Some(WidgetAction::Close),
            "ignore" => Some(WidgetAction::Ignore),
            data if data.starts_with("svc_") => data["svc_".len()..].parse().ok().map(WidgetAction::ToggleService),
            data if data.starts_with("time_") => data["time_".len()..].parse().ok().map(WidgetAction::SelectTime),
            data if data.starts_with("date_") => NaiveDate::parse_from_str(&data["date_".len()..], "%Y-%m-%d")
                .ok()
                .map(WidgetAction::SelectDate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_data_parses_back() {
        let date = NaiveDate::from_ymd_opt(2030, 5, 3).unwrap();
        for action in [
            WidgetAction::StartBooking,
            WidgetAction::ToggleService(4),
            WidgetAction::SelectDate(date),
            WidgetAction::SelectTime(11),
            WidgetAction::EnterCoupon,
            WidgetAction::Confirm,
            WidgetAction::BackToBooking,
            WidgetAction::Close,
            WidgetAction::Ignore,
        ] {
            let data = action.to_callback_data();
            assert!(data.len() <= 64, "callback data too long: {}", data);
            assert_eq!(WidgetAction::parse(&data), Some(action));
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(WidgetAction::parse("svc_x"), None);
        assert_eq!(WidgetAction::parse("date_2030-13-01"), None);
        assert_eq!(WidgetAction::parse("select_ai_foo"), None);
    }
}
