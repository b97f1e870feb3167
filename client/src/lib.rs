//! Client library for the Tô Off absence dashboard.
//!
//! Talks to the Tô Off REST API, keeps the signed-in session on disk, applies
//! the role rules of the dashboard and lays out the month calendar.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
