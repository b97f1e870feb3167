//! Rust structs mirroring the records served by the Tô Off API.
//!
//! Field names on the wire are the API's Portuguese names; the Rust side uses
//! English names with serde renames.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::serde_date;

/// User type as stored in `tipo_usuario`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Rh,
    Gestor,
    Comum,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Rh => "rh",
            UserType::Gestor => "gestor",
            UserType::Comum => "comum",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rh" => Ok(UserType::Rh),
            "gestor" => Ok(UserType::Gestor),
            "comum" => Ok(UserType::Comum),
            other => Err(format!("Unknown user type: {}", other)),
        }
    }
}

/// The `flag_gestor` column: `"S"` grants manager rights over the user's group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagerFlag {
    #[serde(rename = "S")]
    Yes,
    #[serde(rename = "N")]
    #[default]
    No,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub cpf: u64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "tipo_usuario")]
    pub user_type: UserType,
    #[serde(rename = "flag_gestor", default)]
    pub manager_flag: ManagerFlag,
    #[serde(rename = "grupo_id")]
    pub group_id: i64,
    #[serde(rename = "grupo_nome", default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(rename = "UF", default)]
    pub uf: Option<String>,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
    #[serde(
        rename = "inicio_na_empresa",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn is_rh(&self) -> bool {
        self.user_type == UserType::Rh
    }

    pub fn is_manager(&self) -> bool {
        self.manager_flag == ManagerFlag::Yes
    }
}

/// Lifecycle status of an absence/event request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pendente,
    Aprovado,
    Rejeitado,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pendente => "pendente",
            EventStatus::Aprovado => "aprovado",
            EventStatus::Rejeitado => "rejeitado",
        }
    }

    /// Label shown in listings.
    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Pendente => "Pendente",
            EventStatus::Aprovado => "Aprovado",
            EventStatus::Rejeitado => "Rejeitado",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(rename = "cpf_usuario")]
    pub user_cpf: u64,
    #[serde(rename = "usuario_nome", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "grupo_id", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(rename = "tipo_ausencia", default, skip_serializing_if = "Option::is_none")]
    pub absence_type: Option<i64>,
    #[serde(
        rename = "tipo_ausencia_desc",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub absence_type_desc: Option<String>,
    #[serde(rename = "data_inicio", with = "serde_date")]
    pub start_date: NaiveDate,
    #[serde(rename = "data_fim", with = "serde_date")]
    pub end_date: NaiveDate,
    #[serde(rename = "total_dias")]
    pub total_days: i64,
    pub status: EventStatus,
    #[serde(rename = "aprovado_por", default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<u64>,
    #[serde(
        rename = "aprovado_por_nome",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_by_name: Option<String>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Event {
    pub fn is_pending(&self) -> bool {
        self.status == EventStatus::Pendente
    }
}

/// Extra attributes the calendar endpoint attaches to each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventProps {
    pub status: EventStatus,
    #[serde(rename = "total_dias")]
    pub total_days: i64,
    #[serde(rename = "cpf_usuario", default, skip_serializing_if = "Option::is_none")]
    pub user_cpf: Option<u64>,
    #[serde(rename = "tipo_ausencia", default, skip_serializing_if = "Option::is_none")]
    pub absence_type: Option<String>,
}

/// Entry served by the calendar endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    #[serde(with = "serde_date")]
    pub start: NaiveDate,
    #[serde(default, with = "serde_date::option")]
    pub end: Option<NaiveDate>,
    #[serde(rename = "extendedProps")]
    pub props: CalendarEventProps,
}

impl CalendarEvent {
    /// Last day covered by the event, falling back to the start day.
    pub fn last_day(&self) -> NaiveDate {
        match self.end {
            Some(end) if end >= self.start => end,
            _ => self.start,
        }
    }
}

pub const NATIONAL_UF: &str = "BR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(rename = "data_feriado", with = "serde_date")]
    pub date: NaiveDate,
    #[serde(rename = "descricao_feriado")]
    pub description: String,
    pub uf: String,
}

impl Holiday {
    pub fn is_national(&self) -> bool {
        self.uf == NATIONAL_UF
    }

    /// Scope label: "Nacional" for national holidays, the UF otherwise.
    pub fn scope_label(&self) -> &str {
        if self.is_national() {
            "Nacional"
        } else {
            &self.uf
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_deserializes_wire_names() {
        let user: User = serde_json::from_value(json!({
            "cpf": 11122233344u64,
            "nome": "Maria Souza",
            "email": "maria@empresa.com.br",
            "tipo_usuario": "comum",
            "flag_gestor": "N",
            "grupo_id": 3,
            "grupo_nome": "Financeiro",
            "UF": "SP",
            "ativo": true
        }))
        .unwrap();

        assert_eq!(user.cpf, 11122233344);
        assert_eq!(user.user_type, UserType::Comum);
        assert!(!user.is_manager());
        assert_eq!(user.uf.as_deref(), Some("SP"));
    }

    #[test]
    fn test_event_accepts_datetime_dates() {
        let event: Event = serde_json::from_value(json!({
            "id": 7,
            "cpf_usuario": 11122233344u64,
            "data_inicio": "2025-03-10T00:00:00",
            "data_fim": "2025-03-14",
            "total_dias": 5,
            "status": "pendente"
        }))
        .unwrap();

        assert_eq!(event.start_date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(event.end_date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert!(event.is_pending());
        assert_eq!(event.approved_by, None);
    }

    #[test]
    fn test_holiday_scope_label() {
        let national = Holiday {
            date: NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
            description: "Tiradentes".into(),
            uf: "BR".into(),
        };
        let state = Holiday {
            uf: "SP".into(),
            description: "Revolução Constitucionalista".into(),
            date: NaiveDate::from_ymd_opt(2025, 7, 9).unwrap(),
        };

        assert_eq!(national.scope_label(), "Nacional");
        assert_eq!(state.scope_label(), "SP");
    }

    #[test]
    fn test_calendar_event_last_day_never_precedes_start() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": 1,
            "title": "Férias - Maria",
            "start": "2025-01-10",
            "end": "2025-01-08",
            "extendedProps": { "status": "aprovado", "total_dias": 1 }
        }))
        .unwrap();

        assert_eq!(event.last_day(), event.start);
    }
}
