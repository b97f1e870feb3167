//! API gateway client for the Tô Off REST API.
//!
//! `gateway` defines the trait the rest of the crate depends on, `client`
//! implements it over HTTP, and the per-domain modules hold request types.

pub mod client;
pub mod common;
pub mod event;
pub mod gateway;
pub mod user;

#[cfg(test)]
pub mod testing;

pub use client::ApiClient;
pub use gateway::Gateway;
