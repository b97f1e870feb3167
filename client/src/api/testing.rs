//! Scripted `Gateway` double and sample records for unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::event::{ApprovalRequest, EventFilter};
use crate::api::gateway::Gateway;
use crate::api::user::UserFilter;
use crate::auth::models::{LoginRequest, LoginResponse, MeResponse, RefreshTokenResponse};
use crate::auth::service::SessionManager;
use crate::auth::session_store::MemorySessionStore;
use crate::errors::{ApiError, ApiResult};
use crate::models::{
    CalendarEvent, CalendarEventProps, Event, EventStatus, Holiday, ManagerFlag, User, UserType,
};
use crate::services::notification_service::MemoryNotifier;

fn unscripted<T>() -> ApiResult<T> {
    Err(ApiError::NotFound("not scripted".to_string()))
}

/// Every endpoint returns whatever was last stored in its slot.
pub struct FakeGateway {
    pub login: Mutex<ApiResult<LoginResponse>>,
    pub refresh: Mutex<ApiResult<RefreshTokenResponse>>,
    pub me: Mutex<ApiResult<MeResponse>>,
    pub logout: Mutex<ApiResult<()>>,
    pub events: Mutex<ApiResult<Vec<Event>>>,
    pub approve: Mutex<ApiResult<Event>>,
    pub reject: Mutex<ApiResult<Event>>,
    pub delete_event: Mutex<ApiResult<()>>,
    pub users: Mutex<ApiResult<Vec<User>>>,
    pub delete_user: Mutex<ApiResult<()>>,
    pub calendar: Mutex<ApiResult<Vec<CalendarEvent>>>,
    pub national_holidays: Mutex<ApiResult<Vec<Holiday>>>,
    pub state_holidays: Mutex<ApiResult<Vec<Holiday>>>,
    pub token: Mutex<Option<String>>,
    /// `(endpoint, token at call time)` in call order
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    pub last_event_filter: Mutex<Option<EventFilter>>,
    pub last_user_filter: Mutex<Option<UserFilter>>,
    /// Delay applied after an authorized call has been answered
    pub latency: Mutex<Option<Duration>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            login: Mutex::new(unscripted()),
            refresh: Mutex::new(unscripted()),
            me: Mutex::new(unscripted()),
            logout: Mutex::new(Ok(())),
            events: Mutex::new(Ok(Vec::new())),
            approve: Mutex::new(unscripted()),
            reject: Mutex::new(unscripted()),
            delete_event: Mutex::new(Ok(())),
            users: Mutex::new(Ok(Vec::new())),
            delete_user: Mutex::new(Ok(())),
            calendar: Mutex::new(Ok(Vec::new())),
            national_holidays: Mutex::new(Ok(Vec::new())),
            state_holidays: Mutex::new(Ok(Vec::new())),
            token: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            last_event_filter: Mutex::new(None),
            last_user_filter: Mutex::new(None),
            latency: Mutex::new(None),
        }
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Clone>(slot: &Mutex<ApiResult<T>>, value: ApiResult<T>) {
        *slot.lock().unwrap() = value;
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn current_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn record(&self, name: &str) {
        let token = self.current_token();
        self.calls.lock().unwrap().push((name.to_string(), token));
    }

    async fn authorized<T: Clone>(&self, name: &str, slot: &Mutex<ApiResult<T>>) -> ApiResult<T> {
        self.record(name);
        if self.current_token().is_none() {
            return Err(ApiError::MissingToken);
        }
        let result = slot.lock().unwrap().clone();

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        result
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn set_access_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }

    async fn has_access_token(&self) -> bool {
        self.current_token().is_some()
    }

    async fn login(&self, _request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.record("login");
        self.login.lock().unwrap().clone()
    }

    async fn refresh(&self, _refresh_token: &str) -> ApiResult<RefreshTokenResponse> {
        self.record("refresh");
        self.refresh.lock().unwrap().clone()
    }

    async fn me(&self) -> ApiResult<MeResponse> {
        self.authorized("me", &self.me).await
    }

    async fn logout(&self) -> ApiResult<()> {
        self.authorized("logout", &self.logout).await
    }

    async fn get_events(&self, filter: &EventFilter) -> ApiResult<Vec<Event>> {
        *self.last_event_filter.lock().unwrap() = Some(filter.clone());
        self.authorized("get_events", &self.events).await
    }

    async fn approve_event(&self, _id: i64, _request: &ApprovalRequest) -> ApiResult<Event> {
        self.authorized("approve_event", &self.approve).await
    }

    async fn reject_event(&self, _id: i64, _request: &ApprovalRequest) -> ApiResult<Event> {
        self.authorized("reject_event", &self.reject).await
    }

    async fn delete_event(&self, _id: i64) -> ApiResult<()> {
        self.authorized("delete_event", &self.delete_event).await
    }

    async fn get_users(&self, filter: &UserFilter) -> ApiResult<Vec<User>> {
        *self.last_user_filter.lock().unwrap() = Some(filter.clone());
        self.authorized("get_users", &self.users).await
    }

    async fn delete_user(&self, _cpf: u64) -> ApiResult<()> {
        self.authorized("delete_user", &self.delete_user).await
    }

    async fn get_calendar(&self, _approved_only: bool) -> ApiResult<Vec<CalendarEvent>> {
        self.authorized("get_calendar", &self.calendar).await
    }

    async fn get_national_holidays(&self) -> ApiResult<Vec<Holiday>> {
        self.authorized("get_national_holidays", &self.national_holidays).await
    }

    async fn get_state_holidays(&self, _uf: &str) -> ApiResult<Vec<Holiday>> {
        self.authorized("get_state_holidays", &self.state_holidays).await
    }
}

pub fn user(cpf: u64, user_type: UserType, manager: bool, group_id: i64) -> User {
    User {
        cpf,
        name: format!("Usuário {}", cpf),
        email: format!("{}@empresa.com.br", cpf),
        user_type,
        manager_flag: if manager {
            ManagerFlag::Yes
        } else {
            ManagerFlag::No
        },
        group_id,
        group_name: Some(format!("Grupo {}", group_id)),
        uf: Some("SP".to_string()),
        active: true,
        started_at: None,
    }
}

pub fn rh(cpf: u64) -> User {
    user(cpf, UserType::Rh, false, 1)
}

pub fn manager(cpf: u64, group_id: i64) -> User {
    user(cpf, UserType::Gestor, true, group_id)
}

pub fn comum(cpf: u64, group_id: i64) -> User {
    user(cpf, UserType::Comum, false, group_id)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn event(id: i64, owner: u64, group_id: i64, status: EventStatus) -> Event {
    Event {
        id,
        user_cpf: owner,
        user_name: None,
        group_id: Some(group_id),
        absence_type: Some(1),
        absence_type_desc: Some("Férias".to_string()),
        start_date: date(2025, 3, 10),
        end_date: date(2025, 3, 14),
        total_days: 5,
        status,
        approved_by: None,
        approved_by_name: None,
        notes: None,
    }
}

pub fn calendar_event(id: i64, start: NaiveDate, end: NaiveDate, status: EventStatus) -> CalendarEvent {
    CalendarEvent {
        id,
        title: format!("Evento {}", id),
        start,
        end: Some(end),
        props: CalendarEventProps {
            status,
            total_days: (end - start).num_days() + 1,
            user_cpf: None,
            absence_type: None,
        },
    }
}

pub fn holiday(date: NaiveDate, description: &str, uf: &str) -> Holiday {
    Holiday {
        date,
        description: description.to_string(),
        uf: uf.to_string(),
    }
}

pub fn login_response(user: User) -> LoginResponse {
    LoginResponse {
        access_token: format!("access-{}", user.cpf),
        refresh_token: format!("refresh-{}", user.cpf),
        user,
    }
}

/// A session manager already signed in as `user` over a fresh fake gateway.
pub async fn signed_in(
    user: User,
) -> (
    Arc<FakeGateway>,
    Arc<SessionManager>,
    Arc<MemoryNotifier>,
) {
    let gateway = Arc::new(FakeGateway::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let manager = Arc::new(SessionManager::new(
        gateway.clone(),
        Arc::new(MemorySessionStore::new()),
        notifier.clone(),
    ));

    FakeGateway::set(&gateway.login, Ok(login_response(user.clone())));
    manager.bootstrap().await;
    let signed = manager
        .login(LoginRequest {
            cpf: Some(user.cpf),
            email: None,
            senha: "segredo".to_string(),
        })
        .await;
    assert!(signed, "scripted login failed");

    gateway.calls.lock().unwrap().clear();
    (gateway, manager, notifier)
}
