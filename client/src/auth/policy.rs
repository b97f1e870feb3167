//! Role-based authorization rules.
//!
//! Every predicate takes the signed-in user (if any) and the target record and
//! answers without I/O. No user means no permission.

use crate::api::event::EventFilter;
use crate::api::user::UserFilter;
use crate::models::{Event, User};

pub use crate::utils::has_permission;

/// RH may edit any event, a manager the events of their own group, and the
/// owner only while the request is still pending.
pub fn can_edit_event(user: Option<&User>, event: &Event) -> bool {
    let Some(user) = user else {
        return false;
    };

    if user.is_rh() {
        return true;
    }

    if user.is_manager() && event.group_id == Some(user.group_id) {
        return true;
    }

    user.cpf == event.user_cpf && event.is_pending()
}

/// Deleting is offered exactly where editing is.
pub fn can_delete_event(user: Option<&User>, event: &Event) -> bool {
    can_edit_event(user, event)
}

pub fn can_approve_events(user: Option<&User>) -> bool {
    user.is_some_and(|user| user.is_rh() || user.is_manager())
}

pub fn can_reject_events(user: Option<&User>) -> bool {
    can_approve_events(user)
}

pub fn can_add_user(user: Option<&User>) -> bool {
    user.is_some_and(|user| user.is_rh() || user.is_manager())
}

pub fn can_edit_user(user: Option<&User>, target: &User) -> bool {
    let Some(user) = user else {
        return false;
    };

    if user.is_rh() {
        return true;
    }

    if user.is_manager() && user.group_id == target.group_id {
        return true;
    }

    user.cpf == target.cpf
}

/// Managers cannot deactivate themselves; regular users cannot delete anyone.
pub fn can_delete_user(user: Option<&User>, target: &User) -> bool {
    let Some(user) = user else {
        return false;
    };

    if user.is_rh() {
        return true;
    }

    user.is_manager() && user.group_id == target.group_id && user.cpf != target.cpf
}

/// Which events the user is shown.
pub fn event_scope(user: &User) -> EventFilter {
    if user.is_rh() {
        EventFilter::all()
    } else if user.is_manager() {
        EventFilter::by_group(user.group_id)
    } else {
        EventFilter::by_owner(user.cpf)
    }
}

/// Which users the user is shown.
pub fn user_scope(user: &User) -> UserFilter {
    if user.is_rh() {
        UserFilter::all()
    } else {
        UserFilter::by_group(user.group_id)
    }
}

/// The per-row actions of the events page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventActions {
    pub edit: bool,
    pub delete: bool,
    pub approve: bool,
    pub reject: bool,
}

impl EventActions {
    pub fn any(&self) -> bool {
        self.edit || self.delete || self.approve || self.reject
    }
}

pub fn event_actions(user: Option<&User>, event: &Event) -> EventActions {
    let decides = event.is_pending() && can_approve_events(user);

    EventActions {
        edit: can_edit_event(user, event),
        delete: can_delete_event(user, event),
        approve: decides,
        reject: decides && can_reject_events(user),
    }
}
