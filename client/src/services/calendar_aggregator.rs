//! Month grid and listings for the calendar page.
//!
//! Pure functions over already-loaded events and holidays. Days are compared
//! as calendar dates, never as instants.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{CalendarEvent, Holiday};

pub const MIN_YEAR: i32 = 2025;
pub const MAX_YEAR: i32 = 2099;

/// The grid always shows six Sunday-first weeks.
pub const GRID_CELLS: usize = 42;

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// The (year, month) currently shown, kept inside `MIN_YEAR..=MAX_YEAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    year: i32,
    month: u32,
}

impl CalendarCursor {
    /// Starts on the month of `today`, with the year pulled into bounds.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            year: today.year().clamp(MIN_YEAR, MAX_YEAR),
            month: today.month(),
        }
    }

    /// A cursor on the given month, clamped into bounds.
    pub fn at(year: i32, month: u32) -> Self {
        let mut cursor = Self {
            year: MIN_YEAR,
            month: 1,
        };
        cursor.select(year, month);
        cursor
    }

    /// Jumps to a month; out-of-range input is clamped.
    pub fn select(&mut self, year: i32, month: u32) {
        self.year = year.clamp(MIN_YEAR, MAX_YEAR);
        self.month = month.clamp(1, 12);
    }

    /// Moves by `delta` months. Leaves the cursor alone and returns `false`
    /// when the move would cross a year bound.
    pub fn navigate(&mut self, delta: i32) -> bool {
        let index = self.year * 12 + self.month as i32 - 1 + delta;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return false;
        }

        self.year = year;
        self.month = month;
        true
    }

    pub fn previous(&mut self) -> bool {
        self.navigate(-1)
    }

    pub fn next(&mut self) -> bool {
        self.navigate(1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        first_of_month(self.year, self.month)
    }

    /// e.g. "Março 2025"
    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize - 1], self.year)
    }
}

/// How an event is tied to grid days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayMatch {
    /// Only the start date shows the event.
    #[default]
    StartDate,
    /// Every day from start to end shows the event.
    Span,
}

impl DayMatch {
    fn matches(&self, event: &CalendarEvent, day: NaiveDate) -> bool {
        match self {
            DayMatch::StartDate => event.start == day,
            DayMatch::Span => event.start <= day && day <= event.last_day(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_outside_month: bool,
    pub events: Vec<CalendarEvent>,
    pub holidays: Vec<Holiday>,
}

impl DayCell {
    pub fn has_event(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn has_holiday(&self) -> bool {
        !self.holidays.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Lays out the month as 42 cells starting on the Sunday on or before the
/// first of the month. Out-of-range months are clamped like `CalendarCursor`.
pub fn build_month_grid(
    year: i32,
    month: u32,
    today: NaiveDate,
    events: &[CalendarEvent],
    holidays: &[Holiday],
    matching: DayMatch,
) -> MonthGrid {
    let cursor = CalendarCursor::at(year, month);
    let (year, month) = (cursor.year, cursor.month);
    let first = cursor.first_day();
    let lead = first.weekday().num_days_from_sunday() as i64;
    let grid_start = first - Duration::days(lead);

    let cells = (0..GRID_CELLS as i64)
        .map(|offset| {
            let date = grid_start + Duration::days(offset);
            DayCell {
                date,
                is_today: date == today,
                is_outside_month: !in_month(date, year, month),
                events: events
                    .iter()
                    .filter(|event| matching.matches(event, date))
                    .cloned()
                    .collect(),
                holidays: holidays
                    .iter()
                    .filter(|holiday| holiday.date == date)
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    MonthGrid { year, month, cells }
}

/// Events starting in the month, earliest first.
pub fn events_in_month(events: &[CalendarEvent], year: i32, month: u32) -> Vec<CalendarEvent> {
    let mut listed: Vec<CalendarEvent> = events
        .iter()
        .filter(|event| in_month(event.start, year, month))
        .cloned()
        .collect();
    listed.sort_by_key(|event| event.start);
    listed
}

/// National and state holidays in the month, earliest first.
pub fn holidays_in_month(
    national: &[Holiday],
    state: &[Holiday],
    year: i32,
    month: u32,
) -> Vec<Holiday> {
    let mut listed: Vec<Holiday> = national
        .iter()
        .chain(state)
        .filter(|holiday| in_month(holiday.date, year, month))
        .cloned()
        .collect();
    listed.sort_by_key(|holiday| holiday.date);
    listed
}
