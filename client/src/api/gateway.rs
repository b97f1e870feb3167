//! The seam between the application and the remote API.
//!
//! Everything above this trait (session manager, page controllers) talks to
//! the server through `Gateway`, so it can be exercised against a fake.

use async_trait::async_trait;

use crate::api::event::{ApprovalRequest, EventFilter};
use crate::api::user::UserFilter;
use crate::auth::models::{LoginRequest, LoginResponse, MeResponse, RefreshTokenResponse};
use crate::errors::ApiResult;
use crate::models::{CalendarEvent, Event, Holiday, User};

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Replaces the bearer token attached to authenticated calls.
    async fn set_access_token(&self, token: Option<String>);

    /// Whether a bearer token is currently set.
    async fn has_access_token(&self) -> bool;

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;

    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshTokenResponse>;

    /// Identity probe, also used to validate the current token.
    async fn me(&self) -> ApiResult<MeResponse>;

    async fn logout(&self) -> ApiResult<()>;

    async fn get_events(&self, filter: &EventFilter) -> ApiResult<Vec<Event>>;

    async fn approve_event(&self, id: i64, request: &ApprovalRequest) -> ApiResult<Event>;

    async fn reject_event(&self, id: i64, request: &ApprovalRequest) -> ApiResult<Event>;

    async fn delete_event(&self, id: i64) -> ApiResult<()>;

    async fn get_users(&self, filter: &UserFilter) -> ApiResult<Vec<User>>;

    /// Soft delete: the server flips `ativo` to false.
    async fn delete_user(&self, cpf: u64) -> ApiResult<()>;

    async fn get_calendar(&self, approved_only: bool) -> ApiResult<Vec<CalendarEvent>>;

    async fn get_national_holidays(&self) -> ApiResult<Vec<Holiday>>;

    async fn get_state_holidays(&self, uf: &str) -> ApiResult<Vec<Holiday>>;
}
