//! Request types for the user (`/usuarios`) endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo_id: Option<i64>,
}

impl UserFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_group(group_id: i64) -> Self {
        Self {
            grupo_id: Some(group_id),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        self.grupo_id
            .map(|group_id| vec![("grupo_id", group_id.to_string())])
            .unwrap_or_default()
    }
}
