//! Event business logic service.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use validator::Validate;

use crate::api::event::ApprovalRequest;
use crate::auth::policy::{self, EventActions};
use crate::auth::service::{SessionManager, SessionTicket};
use crate::errors::{ApiError, ServiceError, ServiceResult};
use crate::models::{Event, User};
use crate::services::notification_service::{Notice, Notifier};

pub const DEFAULT_APPROVAL_NOTE: &str = "Aprovado via dashboard";
pub const DEFAULT_REJECTION_NOTE: &str = "Rejeitado via dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn default_note(&self) -> &'static str {
        match self {
            Decision::Approve => DEFAULT_APPROVAL_NOTE,
            Decision::Reject => DEFAULT_REJECTION_NOTE,
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            Decision::Approve => "Evento aprovado com sucesso",
            Decision::Reject => "Evento rejeitado com sucesso",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Decision::Approve => "Não foi possível aprovar o evento",
            Decision::Reject => "Não foi possível rejeitar o evento",
        }
    }
}

/// Title of the events page for the signed-in role.
pub fn page_title(user: Option<&User>) -> &'static str {
    match user {
        None => "Eventos",
        Some(user) if user.is_rh() => "Todos os Eventos",
        Some(user) if user.is_manager() => "Eventos do Grupo",
        Some(_) => "Meus Eventos",
    }
}

/// Service layer for the events page.
///
/// Keeps the last listing the server returned; the cache only changes after
/// the server confirms a mutation.
pub struct EventService {
    session: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
    events: RwLock<Vec<Event>>,
}

impl EventService {
    pub fn new(session: Arc<SessionManager>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            notifier,
            events: RwLock::new(Vec::new()),
        }
    }

    /// Cached listing from the last successful load.
    pub async fn events(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    pub async fn page_title(&self) -> &'static str {
        page_title(self.session.current_user().await.as_ref())
    }

    pub async fn actions_for(&self, event: &Event) -> EventActions {
        policy::event_actions(self.session.current_user().await.as_ref(), event)
    }

    /// Loads the events visible to the signed-in user.
    pub async fn load(&self) -> ServiceResult<Vec<Event>> {
        let (user, ticket) = self.signed_in().await?;
        let filter = policy::event_scope(&user);

        let result = self.session.gateway().get_events(&filter).await;
        self.ensure_current(&ticket)?;

        match result {
            Ok(events) => {
                info!("Loaded {} events", events.len());
                *self.events.write().await = events.clone();
                Ok(events)
            }
            Err(e) => {
                error!("Failed to load events: {}", e);
                self.notifier.notify(Notice::error(
                    "Erro",
                    "Não foi possível carregar os eventos",
                ));
                Err(e.into())
            }
        }
    }

    pub async fn approve(&self, id: i64, notes: Option<String>) -> ServiceResult<Event> {
        self.decide(id, Decision::Approve, notes).await
    }

    pub async fn reject(&self, id: i64, notes: Option<String>) -> ServiceResult<Event> {
        self.decide(id, Decision::Reject, notes).await
    }

    async fn decide(
        &self,
        id: i64,
        decision: Decision,
        notes: Option<String>,
    ) -> ServiceResult<Event> {
        let (user, ticket) = self.signed_in().await?;
        let event = self.cached(id).await?;

        if !policy::can_approve_events(Some(&user)) {
            return Err(self.deny("Você não tem permissão para aprovar ou rejeitar eventos"));
        }

        if !event.is_pending() {
            return Err(ServiceError::invalid_operation(format!(
                "Event {} is already {}",
                id, event.status
            )));
        }

        let request = ApprovalRequest {
            aprovador_cpf: user.cpf,
            observacoes: notes
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty())
                .unwrap_or_else(|| decision.default_note().to_string()),
        };
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let gateway = self.session.gateway();
        let result = match decision {
            Decision::Approve => gateway.approve_event(id, &request).await,
            Decision::Reject => gateway.reject_event(id, &request).await,
        };
        self.ensure_current(&ticket)?;

        match result {
            Ok(updated) => {
                info!("Event {} set to {}", id, updated.status);
                self.replace(updated.clone()).await;
                self.notifier
                    .notify(Notice::success("Sucesso", decision.success_message()));
                Ok(updated)
            }
            Err(e) => Err(self.report(e, decision.failure_message())),
        }
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let (user, ticket) = self.signed_in().await?;
        let event = self.cached(id).await?;

        if !policy::can_delete_event(Some(&user), &event) {
            return Err(self.deny("Você não tem permissão para excluir este evento"));
        }

        let result = self.session.gateway().delete_event(id).await;
        self.ensure_current(&ticket)?;

        match result {
            Ok(()) => {
                info!("Event {} deleted", id);
                self.events.write().await.retain(|event| event.id != id);
                self.notifier
                    .notify(Notice::success("Sucesso", "Evento excluído com sucesso"));
                Ok(())
            }
            Err(e) => Err(self.report(e, "Não foi possível excluir o evento")),
        }
    }

    async fn signed_in(&self) -> ServiceResult<(User, SessionTicket)> {
        let ticket = self.session.ticket();
        let user = self
            .session
            .current_user()
            .await
            .ok_or(ServiceError::Unauthenticated)?;
        Ok((user, ticket))
    }

    fn ensure_current(&self, ticket: &SessionTicket) -> ServiceResult<()> {
        if self.session.is_current(ticket) {
            Ok(())
        } else {
            warn!("Discarding event response from a previous session");
            Err(ServiceError::StaleSession)
        }
    }

    async fn cached(&self, id: i64) -> ServiceResult<Event> {
        self.events
            .read()
            .await
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Event", id.to_string()))
    }

    async fn replace(&self, updated: Event) {
        let mut events = self.events.write().await;
        if let Some(slot) = events.iter_mut().find(|event| event.id == updated.id) {
            *slot = updated;
        }
    }

    fn deny(&self, message: &str) -> ServiceError {
        self.notifier.notify(Notice::error("Sem permissão", message));
        ServiceError::permission_denied(message)
    }

    fn report(&self, e: ApiError, fallback: &str) -> ServiceError {
        error!("Event request failed: {}", e);
        let description = match e.user_message() {
            message if message.is_empty() => fallback.to_string(),
            message => message,
        };
        self.notifier.notify(Notice::error("Erro", description));
        e.into()
    }
}
