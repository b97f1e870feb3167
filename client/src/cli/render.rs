//! Plain-text rendering of listings and the month grid.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use tooff::auth::policy::EventActions;
use tooff::models::{CalendarEvent, Event, Holiday, User};
use tooff::services::calendar_aggregator::{MonthGrid, WEEKDAY_NAMES};
use tooff::utils::{event_color, format_cpf, format_date, initials, user_type_label};

pub fn role_label(user: &User) -> String {
    let label = user_type_label(user.user_type);
    if user.is_manager() && !label.eq_ignore_ascii_case("gestor") {
        format!("{} (gestor)", label)
    } else {
        label.to_string()
    }
}

pub fn profile(user: &User, token_expiry: Option<DateTime<Utc>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", initials(&user.name), user.name);
    let _ = writeln!(out, "CPF:    {}", format_cpf(user.cpf));
    let _ = writeln!(out, "Email:  {}", user.email);
    let _ = writeln!(out, "Perfil: {}", role_label(user));
    let group = user
        .group_name
        .clone()
        .unwrap_or_else(|| user.group_id.to_string());
    let _ = writeln!(out, "Grupo:  {}", group);
    if let Some(uf) = &user.uf {
        let _ = writeln!(out, "UF:     {}", uf);
    }
    if let Some(expiry) = token_expiry {
        let _ = writeln!(
            out,
            "Token expira em {}",
            expiry.format("%d/%m/%Y %H:%M UTC")
        );
    }
    out
}

fn action_flags(actions: &EventActions) -> String {
    let mut flags = Vec::new();
    if actions.edit {
        flags.push("editar");
    }
    if actions.approve {
        flags.push("aprovar");
    }
    if actions.reject {
        flags.push("rejeitar");
    }
    if actions.delete {
        flags.push("excluir");
    }
    flags.join(",")
}

pub fn events(title: &str, rows: &[(Event, EventActions)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    if rows.is_empty() {
        let _ = writeln!(out, "Nenhum evento encontrado");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>6}  {:<24} {:<18} {:<10} {:<10} {:>4}  {:<9} {}",
        "ID", "Colaborador", "Tipo", "Início", "Fim", "Dias", "Status", "Ações"
    );
    for (event, actions) in rows {
        let owner = event
            .user_name
            .clone()
            .unwrap_or_else(|| format_cpf(event.user_cpf));
        let _ = writeln!(
            out,
            "{:>6}  {:<24} {:<18} {:<10} {:<10} {:>4}  {:<9} {}",
            event.id,
            owner,
            event.absence_type_desc.as_deref().unwrap_or("-"),
            format_date(event.start_date),
            format_date(event.end_date),
            event.total_days,
            event.status.label(),
            action_flags(actions)
        );
    }
    out
}

pub fn users(rows: &[User]) -> String {
    let mut out = String::new();

    if rows.is_empty() {
        let _ = writeln!(out, "Nenhum usuário encontrado");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<14}  {:<24} {:<28} {:<24} {:<16} {}",
        "CPF", "Nome", "Email", "Perfil", "Grupo", "Status"
    );
    for user in rows {
        let _ = writeln!(
            out,
            "{:<14}  {:<24} {:<28} {:<24} {:<16} {}",
            format_cpf(user.cpf),
            user.name,
            user.email,
            role_label(user),
            user.group_name.as_deref().unwrap_or("-"),
            if user.active { "Ativo" } else { "Inativo" }
        );
    }
    out
}

/// Today is bracketed, days with events get `*`, holidays `+`; days of the
/// neighbouring months are dotted.
pub fn month_grid(title: &str, grid: &MonthGrid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:^42}", title);
    for name in WEEKDAY_NAMES {
        let _ = write!(out, "{:^6}", name);
    }
    out.push('\n');

    for week in grid.weeks() {
        for cell in week {
            let day = cell.date.format("%d").to_string();
            let marker = match (cell.has_event(), cell.has_holiday()) {
                (true, true) => "*+",
                (true, false) => "*",
                (false, true) => "+",
                (false, false) => "",
            };
            let text = if cell.is_outside_month {
                format!("·{}", day)
            } else if cell.is_today {
                format!("[{}]{}", day, marker)
            } else {
                format!("{}{}", day, marker)
            };
            let _ = write!(out, "{:^6}", text);
        }
        out.push('\n');
    }
    out
}

pub fn month_listing(events: &[CalendarEvent], holidays: &[Holiday]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Eventos do mês");
    if events.is_empty() {
        let _ = writeln!(out, "  Nenhum evento neste mês");
    }
    for event in events {
        let range = if event.last_day() == event.start {
            format_date(event.start)
        } else {
            format!("{} a {}", format_date(event.start), format_date(event.last_day()))
        };
        let color = event_color(
            event.props.absence_type.as_deref().unwrap_or_default(),
            Some(event.props.status),
        );
        let _ = writeln!(
            out,
            "  {} {}  {} ({} dias, {})",
            color,
            range,
            event.title,
            event.props.total_days,
            event.props.status.label()
        );
    }

    let _ = writeln!(out, "Feriados do mês");
    if holidays.is_empty() {
        let _ = writeln!(out, "  Nenhum feriado neste mês");
    }
    for holiday in holidays {
        let _ = writeln!(
            out,
            "  {}  {} [{}]",
            format_date(holiday.date),
            holiday.description,
            holiday.scope_label()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tooff::models::{ManagerFlag, UserType};
    use tooff::services::calendar_aggregator::{DayMatch, build_month_grid};

    fn maria() -> User {
        User {
            cpf: 11122233344,
            name: "Maria Souza".into(),
            email: "maria@empresa.com.br".into(),
            user_type: UserType::Comum,
            manager_flag: ManagerFlag::Yes,
            group_id: 3,
            group_name: Some("Financeiro".into()),
            uf: Some("SP".into()),
            active: true,
            started_at: None,
        }
    }

    #[test]
    fn test_profile_shows_formatted_cpf_and_role() {
        let text = profile(&maria(), None);
        assert!(text.contains("[MS] Maria Souza"));
        assert!(text.contains("111.222.333-44"));
        assert!(text.contains("Usuário Comum (gestor)"));
        assert!(!text.contains("Token expira"));
    }

    #[test]
    fn test_grid_marks_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let grid = build_month_grid(2025, 3, today, &[], &[], DayMatch::StartDate);
        let text = month_grid("Março 2025", &grid);
        assert!(text.contains("[12]"));
        assert!(text.contains("·23"));
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn test_empty_listings() {
        assert!(users(&[]).contains("Nenhum usuário encontrado"));
        assert!(events("Meus Eventos", &[]).contains("Nenhum evento encontrado"));
        let listing = month_listing(&[], &[]);
        assert!(listing.contains("Nenhum evento neste mês"));
        assert!(listing.contains("Nenhum feriado neste mês"));
    }
}
