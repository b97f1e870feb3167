//! Service layer for the users page.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::auth::policy;
use crate::auth::service::{SessionManager, SessionTicket};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::User;
use crate::services::notification_service::{Notice, Notifier};

/// Case-insensitive match on name, email or group name; plain substring match
/// on the CPF digits. An empty term matches everyone.
pub fn matches_search(user: &User, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    user.name.to_lowercase().contains(&needle)
        || user.email.to_lowercase().contains(&needle)
        || user
            .group_name
            .as_deref()
            .is_some_and(|group| group.to_lowercase().contains(&needle))
        || user.cpf.to_string().contains(term)
}

pub struct UserService {
    session: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
    users: RwLock<Vec<User>>,
}

impl UserService {
    pub fn new(session: Arc<SessionManager>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            notifier,
            users: RwLock::new(Vec::new()),
        }
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn search(&self, term: &str) -> Vec<User> {
        self.users
            .read()
            .await
            .iter()
            .filter(|user| matches_search(user, term))
            .cloned()
            .collect()
    }

    pub async fn can_add_user(&self) -> bool {
        policy::can_add_user(self.session.current_user().await.as_ref())
    }

    /// Loads the users visible to the signed-in user.
    pub async fn load(&self) -> ServiceResult<Vec<User>> {
        let result = self.fetch().await;
        if let Err(ServiceError::Api { source }) = &result {
            error!("Failed to load users: {}", source);
            self.notifier.notify(Notice::error(
                "Erro",
                "Não foi possível carregar os usuários",
            ));
        }
        result
    }

    async fn fetch(&self) -> ServiceResult<Vec<User>> {
        let ticket = self.session.ticket();
        let user = self
            .session
            .current_user()
            .await
            .ok_or(ServiceError::Unauthenticated)?;
        let filter = policy::user_scope(&user);

        let result = self.session.gateway().get_users(&filter).await;
        self.ensure_current(&ticket)?;

        let users = result?;
        info!("Loaded {} users", users.len());
        *self.users.write().await = users.clone();
        Ok(users)
    }

    /// Deactivates a user and reloads the listing.
    pub async fn delete(&self, cpf: u64) -> ServiceResult<()> {
        let ticket = self.session.ticket();
        let current = self
            .session
            .current_user()
            .await
            .ok_or(ServiceError::Unauthenticated)?;

        let target = self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.cpf == cpf)
            .cloned();

        let Some(target) = target.filter(|target| policy::can_delete_user(Some(&current), target))
        else {
            let message = "Você não tem permissão para desativar este usuário";
            self.notifier.notify(Notice::error("Sem permissão", message));
            return Err(ServiceError::permission_denied(message));
        };

        if !target.active {
            return Err(ServiceError::invalid_operation(format!(
                "User {} is already inactive",
                cpf
            )));
        }

        let result = self.session.gateway().delete_user(cpf).await;
        self.ensure_current(&ticket)?;

        if let Err(e) = result {
            error!("Failed to deactivate user: {}", e);
            let description = match e.user_message() {
                message if message.is_empty() => {
                    "Não foi possível desativar o usuário".to_string()
                }
                message => message,
            };
            self.notifier.notify(Notice::error("Erro", description));
            return Err(e.into());
        }

        info!("User deactivated");
        self.notifier
            .notify(Notice::success("Sucesso", "Usuário desativado com sucesso"));

        match self.fetch().await {
            Ok(_) | Err(ServiceError::StaleSession) => {}
            Err(e) => {
                warn!("Reload after deactivation failed: {}", e);
                let mut users = self.users.write().await;
                if let Some(user) = users.iter_mut().find(|user| user.cpf == cpf) {
                    user.active = false;
                }
            }
        }
        Ok(())
    }

    fn ensure_current(&self, ticket: &SessionTicket) -> ServiceResult<()> {
        if self.session.is_current(ticket) {
            Ok(())
        } else {
            warn!("Discarding user response from a previous session");
            Err(ServiceError::StaleSession)
        }
    }
}
