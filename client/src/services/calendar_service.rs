//! Service layer for the calendar page.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::service::SessionManager;
use crate::errors::{ApiResult, ServiceError, ServiceResult};
use crate::models::{CalendarEvent, Holiday};
use crate::services::calendar_aggregator::{self, CalendarCursor, DayMatch, MonthGrid};

/// Which calendar entries are requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    All,
    ApprovedOnly,
}

impl ViewMode {
    pub fn approved_only(&self) -> bool {
        matches!(self, ViewMode::ApprovedOnly)
    }
}

/// Everything the calendar page shows. A source that failed to load is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarData {
    pub events: Vec<CalendarEvent>,
    pub national_holidays: Vec<Holiday>,
    pub state_holidays: Vec<Holiday>,
}

impl CalendarData {
    pub fn holidays(&self) -> Vec<Holiday> {
        self.national_holidays
            .iter()
            .chain(&self.state_holidays)
            .cloned()
            .collect()
    }
}

fn or_empty<T>(source: &str, result: ApiResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => {
            debug!("Loaded {} {}", items.len(), source);
            items
        }
        Err(e) => {
            warn!("Failed to load {}: {}", source, e);
            Vec::new()
        }
    }
}

pub struct CalendarService {
    session: Arc<SessionManager>,
    cursor: RwLock<CalendarCursor>,
    view_mode: RwLock<ViewMode>,
    data: RwLock<CalendarData>,
}

impl CalendarService {
    pub fn new(session: Arc<SessionManager>, today: NaiveDate) -> Self {
        Self {
            session,
            cursor: RwLock::new(CalendarCursor::new(today)),
            view_mode: RwLock::new(ViewMode::default()),
            data: RwLock::new(CalendarData::default()),
        }
    }

    pub async fn cursor(&self) -> CalendarCursor {
        *self.cursor.read().await
    }

    pub async fn navigate(&self, delta: i32) -> bool {
        self.cursor.write().await.navigate(delta)
    }

    pub async fn select(&self, year: i32, month: u32) {
        self.cursor.write().await.select(year, month);
    }

    pub async fn view_mode(&self) -> ViewMode {
        *self.view_mode.read().await
    }

    /// Takes effect on the next `load`.
    pub async fn set_view_mode(&self, mode: ViewMode) {
        *self.view_mode.write().await = mode;
    }

    pub async fn data(&self) -> CalendarData {
        self.data.read().await.clone()
    }

    /// Fetches calendar entries, national holidays and the user's state
    /// holidays concurrently. Each source fails on its own.
    pub async fn load(&self) -> ServiceResult<CalendarData> {
        let ticket = self.session.ticket();
        let user = self
            .session
            .current_user()
            .await
            .ok_or(ServiceError::Unauthenticated)?;
        let approved_only = self.view_mode().await.approved_only();
        let gateway = self.session.gateway();

        let state_uf = user.uf.clone().filter(|uf| !uf.trim().is_empty());
        let state_holidays = async {
            match state_uf {
                Some(uf) => gateway.get_state_holidays(&uf).await,
                None => Ok(Vec::new()),
            }
        };

        let (events, national_holidays, state_holidays) = futures::join!(
            gateway.get_calendar(approved_only),
            gateway.get_national_holidays(),
            state_holidays
        );

        if !self.session.is_current(&ticket) {
            warn!("Discarding calendar response from a previous session");
            return Err(ServiceError::StaleSession);
        }

        let data = CalendarData {
            events: or_empty("calendar events", events),
            national_holidays: or_empty("national holidays", national_holidays),
            state_holidays: or_empty("state holidays", state_holidays),
        };
        *self.data.write().await = data.clone();
        Ok(data)
    }

    pub async fn grid(&self, today: NaiveDate, matching: DayMatch) -> MonthGrid {
        let cursor = self.cursor().await;
        let data = self.data.read().await;
        calendar_aggregator::build_month_grid(
            cursor.year(),
            cursor.month(),
            today,
            &data.events,
            &data.holidays(),
            matching,
        )
    }

    pub async fn month_events(&self) -> Vec<CalendarEvent> {
        let cursor = self.cursor().await;
        let data = self.data.read().await;
        calendar_aggregator::events_in_month(&data.events, cursor.year(), cursor.month())
    }

    pub async fn month_holidays(&self) -> Vec<Holiday> {
        let cursor = self.cursor().await;
        let data = self.data.read().await;
        calendar_aggregator::holidays_in_month(
            &data.national_holidays,
            &data.state_holidays,
            cursor.year(),
            cursor.month(),
        )
    }
}
