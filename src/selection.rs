use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::Coupon;

/// Current user choices. `can_confirm` is derived on every read, so every
/// operation leaves it consistent when it returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    service_ids: BTreeSet<String>,
    date: Option<NaiveDate>,
    time: Option<String>,
    coupon: Option<Coupon>,
}

impl Selection {
    /// Adds the service if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle_service(&mut self, service_id: &str) -> bool {
        if self.service_ids.remove(service_id) {
            false
        } else {
            self.service_ids.insert(service_id.to_string());
            true
        }
    }

    /// Availability depends on the date, so a new date drops the chosen time.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.time = None;
    }

    pub fn select_time(&mut self, time: impl Into<String>) {
        self.time = Some(time.into());
    }

    pub fn clear_time(&mut self) {
        self.time = None;
    }

    pub fn apply_coupon(&mut self, coupon: Option<Coupon>) {
        self.coupon = coupon;
    }

    pub fn is_selected(&self, service_id: &str) -> bool {
        self.service_ids.contains(service_id)
    }

    pub fn service_ids(&self) -> &BTreeSet<String> {
        &self.service_ids
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    pub fn can_confirm(&self) -> bool {
        !self.service_ids.is_empty() && self.date.is_some() && self.time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 5, day).unwrap()
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut selection = Selection::default();
        assert!(selection.toggle_service("cut"));
        assert!(selection.is_selected("cut"));
        assert!(!selection.toggle_service("cut"));
        assert!(selection.service_ids().is_empty());
    }

    #[test]
    fn can_confirm_needs_all_three() {
        let mut selection = Selection::default();
        assert!(!selection.can_confirm());

        selection.toggle_service("cut");
        assert!(!selection.can_confirm());

        selection.select_date(date(3));
        assert!(!selection.can_confirm());

        selection.select_time("14:00");
        assert!(selection.can_confirm());

        selection.toggle_service("cut");
        assert!(!selection.can_confirm());
    }

    #[test]
    fn missing_date_or_time_blocks_confirm() {
        let mut only_services_and_time = Selection::default();
        only_services_and_time.toggle_service("cut");
        only_services_and_time.select_time("10:00");
        assert!(!only_services_and_time.can_confirm());

        let mut only_date_and_time = Selection::default();
        only_date_and_time.select_date(date(4));
        only_date_and_time.select_time("10:00");
        assert!(!only_date_and_time.can_confirm());
    }

    #[test]
    fn new_date_clears_time() {
        let mut selection = Selection::default();
        selection.toggle_service("cut");
        selection.select_date(date(3));
        selection.select_time("14:00");
        assert!(selection.can_confirm());

        selection.select_date(date(4));
        assert_eq!(selection.time(), None);
        assert_eq!(selection.date(), Some(date(4)));
        assert!(!selection.can_confirm());
    }

    #[test]
    fn coupon_can_be_replaced_and_cleared() {
        let mut selection = Selection::default();
        selection.apply_coupon(Some(Coupon::fixed("A", 10.0)));
        selection.apply_coupon(Some(Coupon::percentage("B", 5.0)));
        assert_eq!(selection.coupon().map(|c| c.code.as_str()), Some("B"));
        selection.apply_coupon(None);
        assert!(selection.coupon().is_none());
    }
}
