//! Session lifecycle: restore on start, login, logout and token refresh.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use crate::api::gateway::Gateway;
use crate::auth::models::{LoginRequest, Session, SessionState};
use crate::auth::session_store::{PersistedSession, SessionStore};
use crate::errors::ServiceResult;
use crate::models::User;
use crate::services::notification_service::{Notice, Notifier};
use crate::utils::jwt::TokenInspector;

/// Snapshot of the session epoch taken before a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket(u64);

/// Owns the one `Session` of the process and keeps the persisted entries, the
/// gateway's token cell and the published `SessionState` in step with it.
pub struct SessionManager {
    gateway: Arc<dyn Gateway>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Option<Session>>,
    state: watch::Sender<SessionState>,
    epoch: AtomicU64,
    bootstrapped: Mutex<bool>,
    inspector: TokenInspector,
}

impl SessionManager {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);

        Self {
            gateway,
            store,
            notifier,
            session: RwLock::new(None),
            state,
            epoch: AtomicU64::new(0),
            bootstrapped: Mutex::new(false),
            inspector: TokenInspector::new(),
        }
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.gateway)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub fn ticket(&self) -> SessionTicket {
        SessionTicket(self.epoch.load(Ordering::SeqCst))
    }

    /// False once the session the ticket was taken under has been replaced
    /// or destroyed.
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.epoch.load(Ordering::SeqCst) == ticket.0
    }

    /// Restores the persisted session, if any, and resolves the state.
    ///
    /// Runs once; later calls return the resolved state without I/O.
    pub async fn bootstrap(&self) -> SessionState {
        let mut bootstrapped = self.bootstrapped.lock().await;
        if *bootstrapped {
            return self.state();
        }
        *bootstrapped = true;

        self.state.send_replace(SessionState::Restoring);

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to load stored session: {}", e);
                None
            }
        };

        let Some(mut session) = stored.and_then(PersistedSession::into_session) else {
            debug!("No stored session to restore");
            self.clear_local().await;
            return self.state();
        };

        self.gateway
            .set_access_token(Some(session.access_token.clone()))
            .await;

        let expired = self
            .inspector
            .is_expired_at(&session.access_token, Utc::now())
            .unwrap_or(false);

        if expired {
            debug!("Stored access token has expired, skipping identity check");
        } else {
            match self.gateway.me().await {
                Ok(me) => {
                    session.user = me.user;
                    self.restore(session).await;
                    info!("Session restored");
                    return self.state();
                }
                Err(e) => warn!("Stored access token rejected: {}", e),
            }
        }

        match self.exchange_refresh_token(&session).await {
            Some(access_token) => {
                session.access_token = access_token;
                self.restore(session).await;
                info!("Session restored after token refresh");
            }
            None => {
                warn!("Could not restore the stored session, signing out");
                self.clear_local().await;
            }
        }

        self.state()
    }

    /// Authenticates and adopts the returned session. Returns whether the
    /// login succeeded; failures are reported through the notifier.
    pub async fn login(&self, request: LoginRequest) -> bool {
        if let Err(e) = request.check() {
            self.notifier.notify(Notice::error("Erro no login", e.to_string()));
            return false;
        }

        let response = match self.gateway.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Login failed: {}", e);
                self.notifier
                    .notify(Notice::error("Erro no login", e.user_message()));
                return false;
            }
        };

        let session = Session::from(response);
        let name = session.user.name.clone();

        if let Err(e) = self.adopt(session).await {
            warn!("Failed to persist session after login: {}", e);
            self.notifier
                .notify(Notice::error("Erro no login", e.to_string()));
            return false;
        }

        info!("User logged in");
        self.notifier.notify(Notice::success(
            "Login realizado com sucesso!",
            format!("Bem-vindo(a), {}", name),
        ));
        true
    }

    /// Ends the session. The server is told first, but local state is cleared
    /// whatever it answers.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.logout().await {
            warn!("Server-side logout failed: {}", e);
        }

        self.clear_local().await;

        info!("User logged out");
        self.notifier.notify(Notice::success(
            "Logout realizado",
            "Você foi desconectado com sucesso",
        ));
    }

    /// Swaps the refresh token for a new access token. Returns `false` on
    /// any failure and leaves signing out to the caller.
    pub async fn refresh(&self) -> bool {
        let Some(mut session) = self.current_session().await else {
            return false;
        };

        let Some(access_token) = self.exchange_refresh_token(&session).await else {
            return false;
        };

        session.access_token = access_token;
        match self.persist(&session).await {
            Ok(()) => {
                self.gateway
                    .set_access_token(Some(session.access_token.clone()))
                    .await;
                *self.session.write().await = Some(session);
                true
            }
            Err(e) => {
                warn!("Failed to persist refreshed token: {}", e);
                false
            }
        }
    }

    async fn exchange_refresh_token(&self, session: &Session) -> Option<String> {
        let refresh_token = session.refresh_token.as_deref()?;

        match self.gateway.refresh(refresh_token).await {
            Ok(response) if !response.access_token.is_empty() => Some(response.access_token),
            Ok(_) => {
                warn!("Token refresh returned an empty access token");
                None
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                None
            }
        }
    }

    async fn persist(&self, session: &Session) -> ServiceResult<()> {
        let persisted = PersistedSession::from_session(session)?;
        self.store.save(&persisted).await
    }

    /// Store first, then memory, token cell and state.
    async fn adopt(&self, session: Session) -> ServiceResult<()> {
        self.persist(&session).await?;
        self.install(session).await;
        Ok(())
    }

    /// Like `adopt`, but a failed store write is only logged.
    async fn restore(&self, session: Session) {
        if let Err(e) = self.persist(&session).await {
            warn!("Failed to persist restored session: {}", e);
        }
        self.install(session).await;
    }

    async fn install(&self, session: Session) {
        let user = session.user.clone();
        self.gateway
            .set_access_token(Some(session.access_token.clone()))
            .await;
        *self.session.write().await = Some(session);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SessionState::Authenticated(user));
    }

    async fn clear_local(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear stored session: {}", e);
        }

        self.gateway.set_access_token(None).await;
        *self.session.write().await = None;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SessionState::Anonymous);
    }
}
