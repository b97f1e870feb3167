//! Request types for the event (`/eventos`) endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Listing filter. An empty filter asks for every event the caller may see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf_usuario: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo_id: Option<i64>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_owner(cpf: u64) -> Self {
        Self {
            cpf_usuario: Some(cpf),
            grupo_id: None,
        }
    }

    pub fn by_group(group_id: i64) -> Self {
        Self {
            cpf_usuario: None,
            grupo_id: Some(group_id),
        }
    }

    /// Query string pairs for the request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(cpf) = self.cpf_usuario {
            query.push(("cpf_usuario", cpf.to_string()));
        }
        if let Some(group_id) = self.grupo_id {
            query.push(("grupo_id", group_id.to_string()));
        }
        query
    }
}

/// Body of the approve/reject calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ApprovalRequest {
    #[validate(range(min = 1, message = "Approver CPF is required"))]
    pub aprovador_cpf: u64,
    #[validate(length(max = 500, message = "Observations must be at most 500 characters"))]
    pub observacoes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_pairs() {
        assert!(EventFilter::all().query().is_empty());
        assert_eq!(
            EventFilter::by_owner(11122233344).query(),
            vec![("cpf_usuario", "11122233344".to_string())]
        );
        assert_eq!(
            EventFilter::by_group(4).query(),
            vec![("grupo_id", "4".to_string())]
        );
    }

    #[test]
    fn test_approval_request_validation() {
        let ok = ApprovalRequest {
            aprovador_cpf: 11122233344,
            observacoes: "Aprovado via dashboard".into(),
        };
        assert!(ok.validate().is_ok());

        let missing_approver = ApprovalRequest {
            aprovador_cpf: 0,
            observacoes: String::new(),
        };
        assert!(missing_approver.validate().is_err());
    }
}
