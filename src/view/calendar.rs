use chrono::{Datelike, Months, NaiveDate};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub enabled: bool,
    pub selected: bool,
}

/// Single-month grid, weeks starting on Monday.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCalendar {
    pub title: String,
    pub leading_blanks: usize,
    pub days: Vec<CalendarDay>,
}

impl MonthCalendar {
    /// The month containing `today`; days before `today` are disabled.
    pub fn for_month_of(today: NaiveDate, selected: Option<NaiveDate>) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        let next_month = first.checked_add_months(Months::new(1));
        let days_in_month = next_month
            .and_then(|next| next.pred_opt())
            .map_or(28, |last| last.day());

        let days = (1..=days_in_month)
            .filter_map(|day| first.with_day(day))
            .map(|date| CalendarDay {
                date,
                enabled: date >= today,
                selected: selected == Some(date),
            })
            .collect();

        MonthCalendar {
            title: format!("{} {}", MONTH_NAMES[first.month0() as usize], first.year()),
            leading_blanks: first.weekday().num_days_from_monday() as usize,
            days,
        }
    }

    /// Rows of seven cells; `None` pads before the first and after the last day.
    pub fn weeks(&self) -> Vec<Vec<Option<&CalendarDay>>> {
        let mut cells: Vec<Option<&CalendarDay>> = vec![None; self.leading_blanks];
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }
        cells.chunks(7).map(|week| week.to_vec()).collect()
    }
}
