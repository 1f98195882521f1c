use thiserror::Error;

use crate::models::{Lesson, LessonStatus};
use crate::wizard::MAX_DATES;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateSelectError {
    #[error("Você pode selecionar no máximo {MAX_DATES} datas por agendamento")]
    LimitReached,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateProceedError {
    /// First-time students must book at least two lessons.
    #[error(
        "Selecione pelo menos {required} data(s) para continuar. \
         Alunos nas duas primeiras aulas precisam agendar no mínimo duas."
    )]
    NotEnoughDates { selected: usize, required: usize },
}

/// Month-calendar date picker. Dates are fixed-width `YYYY-MM-DD` strings
/// built from year/month/day integers, never through a timezone-aware
/// parse, so the picked day survives any device offset. Comparison is
/// lexicographic, which the zero-padded format makes safe.
#[derive(Debug, Clone)]
pub struct DateSelector {
    year: i32,
    /// Displayed month, 1–12.
    month: u32,
    today: String,
    selected: Vec<String>,
    minimum_required: usize,
}

/// How many dates a student must pick: one lesson once they have two or
/// more non-cancelled lessons behind them, two before that.
pub fn minimum_required_for(history: &[Lesson]) -> usize {
    let prior = history
        .iter()
        .filter(|l| l.status != LessonStatus::Cancelled)
        .count();
    if prior >= 2 {
        1
    } else {
        2
    }
}

impl DateSelector {
    /// Open the calendar on today's month.
    pub fn new(today: chrono::NaiveDate, minimum_required: usize) -> Self {
        use chrono::Datelike;
        Self {
            year: today.year(),
            month: today.month(),
            today: format_date(today.year(), today.month(), today.day()),
            selected: Vec::new(),
            minimum_required,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn minimum_required(&self) -> usize {
        self.minimum_required
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, day: u32) -> bool {
        self.selected.contains(&self.date_for(day))
    }

    /// The ISO date string for a day of the displayed month.
    pub fn date_for(&self, day: u32) -> String {
        format_date(self.year, self.month, day)
    }

    /// Whether a day of the displayed month is in the past (unselectable).
    pub fn is_past(&self, day: u32) -> bool {
        self.date_for(day) < self.today
    }

    /// Toggle a day of the displayed month. Past dates are a silent no-op;
    /// growing the selection beyond the cap is reported to the user.
    pub fn select_date(&mut self, day: u32) -> Result<(), DateSelectError> {
        let date = self.date_for(day);
        if date < self.today {
            return Ok(());
        }
        if let Some(pos) = self.selected.iter().position(|d| *d == date) {
            self.selected.remove(pos);
            return Ok(());
        }
        if self.selected.len() >= MAX_DATES {
            return Err(DateSelectError::LimitReached);
        }
        self.selected.push(date);
        Ok(())
    }

    /// Shift the displayed month back, wrapping January into the previous
    /// December. Selection is untouched.
    pub fn previous_month(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    /// Shift the displayed month forward, wrapping December into the next
    /// January. Selection is untouched.
    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }

    /// Number of days in the displayed month, for rendering the grid.
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Validate the selection and hand the normalized dates forward.
    pub fn proceed(self) -> Result<Vec<String>, DateProceedError> {
        if self.selected.len() < self.minimum_required {
            return Err(DateProceedError::NotEnoughDates {
                selected: self.selected.len(),
                required: self.minimum_required,
            });
        }
        Ok(self.selected)
    }
}

/// Build `YYYY-MM-DD` directly from calendar fields.
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

fn days_in_month(year: i32, month: u32) -> u32 {
    use chrono::Datelike;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    chrono::NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 15).unwrap()
    }

    fn lesson(status: LessonStatus) -> Lesson {
        Lesson {
            id: "les-1".into(),
            date: "2026-08-01".into(),
            time: "08:00".into(),
            status,
            instructor_name: None,
            price: None,
        }
    }

    // ── minimum_required_for ──

    #[test]
    fn test_minimum_two_for_new_student() {
        assert_eq!(minimum_required_for(&[]), 2);
    }

    #[test]
    fn test_minimum_two_with_one_prior_lesson() {
        assert_eq!(minimum_required_for(&[lesson(LessonStatus::Completed)]), 2);
    }

    #[test]
    fn test_minimum_one_with_two_prior_lessons() {
        let history = vec![
            lesson(LessonStatus::Completed),
            lesson(LessonStatus::Confirmed),
        ];
        assert_eq!(minimum_required_for(&history), 1);
    }

    #[test]
    fn test_cancelled_lessons_do_not_count() {
        let history = vec![
            lesson(LessonStatus::Cancelled),
            lesson(LessonStatus::Cancelled),
            lesson(LessonStatus::Completed),
        ];
        assert_eq!(minimum_required_for(&history), 2);
    }

    // ── select_date ──

    #[test]
    fn test_select_adds_date() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(20).unwrap();
        assert_eq!(sel.selected(), ["2026-09-20"]);
    }

    #[test]
    fn test_select_again_removes_date() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(20).unwrap();
        sel.select_date(20).unwrap();
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn test_select_past_date_is_noop() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(14).unwrap();
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn test_select_today_is_allowed() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(15).unwrap();
        assert_eq!(sel.selected(), ["2026-09-15"]);
    }

    #[test]
    fn test_eleventh_date_rejected_and_selection_unchanged() {
        let mut sel = DateSelector::new(today(), 1);
        for day in 16..26 {
            sel.select_date(day).unwrap();
        }
        assert_eq!(sel.selected().len(), 10);
        assert_eq!(sel.select_date(26), Err(DateSelectError::LimitReached));
        assert_eq!(sel.selected().len(), 10);
        assert!(!sel.is_selected(26));
    }

    // ── month navigation ──

    #[test]
    fn test_next_month_wraps_year() {
        let mut sel = DateSelector::new(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(), 1);
        sel.next_month();
        assert_eq!((sel.year(), sel.month()), (2027, 1));
    }

    #[test]
    fn test_previous_month_wraps_year() {
        let mut sel = DateSelector::new(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(), 1);
        sel.previous_month();
        assert_eq!((sel.year(), sel.month()), (2025, 12));
    }

    #[test]
    fn test_month_navigation_keeps_selection() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(20).unwrap();
        sel.next_month();
        sel.previous_month();
        assert_eq!(sel.selected(), ["2026-09-20"]);
    }

    #[test]
    fn test_selection_spans_months() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(20).unwrap();
        sel.next_month();
        sel.select_date(5).unwrap();
        assert_eq!(sel.selected(), ["2026-09-20", "2026-10-05"]);
    }

    #[test]
    fn test_days_in_month() {
        let sel = DateSelector::new(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 1);
        assert_eq!(sel.days_in_month(), 28);
        let sel = DateSelector::new(NaiveDate::from_ymd_opt(2028, 2, 1).unwrap(), 1);
        assert_eq!(sel.days_in_month(), 29);
    }

    // ── proceed ──

    #[test]
    fn test_proceed_rejects_one_date_for_new_student() {
        let mut sel = DateSelector::new(today(), 2);
        sel.select_date(20).unwrap();
        assert_eq!(
            sel.proceed(),
            Err(DateProceedError::NotEnoughDates {
                selected: 1,
                required: 2,
            })
        );
    }

    #[test]
    fn test_proceed_accepts_one_date_for_returning_student() {
        let mut sel = DateSelector::new(today(), 1);
        sel.select_date(20).unwrap();
        assert_eq!(sel.proceed().unwrap(), ["2026-09-20"]);
    }

    #[test]
    fn test_proceed_accepts_two_dates_for_new_student() {
        let mut sel = DateSelector::new(today(), 2);
        sel.select_date(20).unwrap();
        sel.select_date(21).unwrap();
        assert_eq!(sel.proceed().unwrap(), ["2026-09-20", "2026-09-21"]);
    }

    // ── normalization ──

    #[test]
    fn test_dates_are_zero_padded() {
        let mut sel = DateSelector::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 1);
        sel.select_date(5).unwrap();
        assert_eq!(sel.selected(), ["2026-03-05"]);
    }

    #[test]
    fn test_format_date_from_components() {
        // Built from integers: no timezone can shift the day.
        assert_eq!(format_date(2026, 3, 5), "2026-03-05");
    }
}
