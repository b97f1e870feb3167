//! Collection of general utility functions shared by the controllers and the CLI.
//!
//! Formatting helpers for Brazilian identifiers and dates, labels and colours
//! used when listing events and users, and serde adapters for API dates.

use chrono::NaiveDate;

use crate::models::{EventStatus, User, UserType};

pub mod jwt;

/// Format a CPF as `ddd.ddd.ddd-dd`, zero-padding it to 11 digits first.
///
/// Values that are not 11 digits long after padding are returned padded but
/// without grouping.
pub fn format_cpf(cpf: impl ToString) -> String {
    group_digits(&cpf.to_string(), 11, &[(3, ""), (3, "."), (3, "."), (2, "-")])
}

/// Format a CNPJ as `dd.ddd.ddd/dddd-dd`, zero-padding it to 14 digits first.
pub fn format_cnpj(cnpj: impl ToString) -> String {
    group_digits(
        &cnpj.to_string(),
        14,
        &[(2, ""), (3, "."), (3, "."), (4, "/"), (2, "-")],
    )
}

fn group_digits(raw: &str, width: usize, groups: &[(usize, &str)]) -> String {
    let padded = format!("{:0>width$}", raw, width = width);
    if padded.len() != width || !padded.chars().all(|c| c.is_ascii_digit()) {
        return padded;
    }

    let mut formatted = String::with_capacity(width + groups.len());
    let mut offset = 0;
    for (len, separator) in groups {
        formatted.push_str(separator);
        formatted.push_str(&padded[offset..offset + len]);
        offset += len;
    }
    formatted
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats a raw API date string, tolerating empty and malformed input.
pub fn format_date_str(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "N/A".to_string();
    }
    match serde_date::parse(raw) {
        Some(date) => format_date(date),
        None => "Data inválida".to_string(),
    }
}

/// Number of days between two dates, counting both ends.
pub fn calc_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// Colour used to tag an event by absence type; pending events are always orange.
pub fn event_color(absence_type: &str, status: Option<EventStatus>) -> &'static str {
    if status == Some(EventStatus::Pendente) {
        return "#FF9800";
    }

    match absence_type.to_lowercase().as_str() {
        "férias" => "#4CAF50",
        "assiduidade" => "#2196F3",
        "plantão" => "#9C27B0",
        "licença maternidade" | "licença paternidade" => "#E91E63",
        "evento especial" => "#607D8B",
        _ => "#795548",
    }
}

pub fn user_type_label(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Rh => "Recursos Humanos",
        UserType::Gestor => "Gestor",
        UserType::Comum => "Usuário Comum",
    }
}

/// Two-letter initials: first and last name, or the first two letters of a
/// single name.
pub fn initials(name: &str) -> String {
    let names: Vec<&str> = name.split_whitespace().collect();
    match names.as_slice() {
        [] => "??".to_string(),
        [single] => single.chars().take(2).collect::<String>().to_uppercase(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}

/// Generic role check: optionally require a user type and/or the manager flag.
pub fn has_permission(
    user: Option<&User>,
    required_type: Option<UserType>,
    require_manager: bool,
) -> bool {
    let Some(user) = user else {
        return false;
    };

    if let Some(required_type) = required_type {
        if user.user_type != required_type {
            return false;
        }
    }

    if require_manager && !user.is_manager() {
        return false;
    }

    true
}

/// Serde adapter for API dates.
///
/// Accepts `YYYY-MM-DD` as well as ISO datetimes, keeping only the date part.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, FORMAT).ok()
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("Invalid date '{}'", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("Invalid date '{}'", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManagerFlag;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_cpf_pads_then_groups() {
        assert_eq!(format_cpf(1234567), "000.012.345-67");
        assert_eq!(format_cpf(12345678901u64), "123.456.789-01");
        assert_eq!(format_cpf("11122233344"), "111.222.333-44");
    }

    #[test]
    fn test_format_cpf_leaves_unexpected_input_ungrouped() {
        assert_eq!(format_cpf("123456789012"), "123456789012");
        assert_eq!(format_cpf("12a"), "0000000012a");
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_cnpj(12345678000190u64), "12.345.678/0001-90");
        assert_eq!(format_cnpj(191), "00.000.000/0001-91");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date(date(2021, 1, 15)), "15/01/2021");
        assert_eq!(format_date_str("2021-01-15T10:00:00Z"), "15/01/2021");
        assert_eq!(format_date_str(""), "N/A");
        assert_eq!(format_date_str("ontem"), "Data inválida");
    }

    #[test]
    fn test_calc_days_between_is_inclusive_and_symmetric() {
        assert_eq!(calc_days_between(date(2025, 3, 10), date(2025, 3, 14)), 5);
        assert_eq!(calc_days_between(date(2025, 3, 14), date(2025, 3, 10)), 5);
        assert_eq!(calc_days_between(date(2025, 3, 10), date(2025, 3, 10)), 1);
    }

    #[test]
    fn test_event_color() {
        assert_eq!(event_color("Férias", Some(EventStatus::Pendente)), "#FF9800");
        assert_eq!(event_color("Férias", Some(EventStatus::Aprovado)), "#4CAF50");
        assert_eq!(event_color("Licença Paternidade", None), "#E91E63");
        assert_eq!(event_color("Curso", None), "#795548");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Maria da Silva Souza"), "MS");
        assert_eq!(initials("joão"), "JO");
        assert_eq!(initials(""), "??");
    }

    #[test]
    fn test_has_permission() {
        let user = User {
            cpf: 1,
            name: "Ana".into(),
            email: "ana@empresa.com.br".into(),
            user_type: UserType::Gestor,
            manager_flag: ManagerFlag::Yes,
            group_id: 2,
            group_name: None,
            uf: None,
            active: true,
            started_at: None,
        };

        assert!(has_permission(Some(&user), None, true));
        assert!(has_permission(Some(&user), Some(UserType::Gestor), false));
        assert!(!has_permission(Some(&user), Some(UserType::Rh), false));
        assert!(!has_permission(None, None, false));
    }
}
