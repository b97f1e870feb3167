//! Module for the page controllers and the logic they share.
//!
//! Each service backs one dashboard page (events, users, calendar) on top of
//! the session manager; the calendar aggregator is the pure month layout the
//! calendar service renders from, and the notification service carries
//! user-facing notices.

pub mod calendar_aggregator;
pub mod calendar_service;
pub mod event_service;
pub mod notification_service;
pub mod user_service;
