//! Authentication and authorization for the dashboard client.
//!
//! The session manager owns the signed-in session and its persistence; the
//! policy module answers what that user may see and do.

pub mod models;
pub mod policy;
pub mod service;
pub mod session_store;

// Re-exports for convenience
pub use models::{LoginRequest, Session, SessionState};
pub use service::{SessionManager, SessionTicket};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};
