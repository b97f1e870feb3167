//! Command-line front end: argument parsing and command handlers.

mod render;

use anyhow::{Context as _, Result, bail};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use tooff::auth::{LoginRequest, SessionManager, SessionState};
use tooff::config::Config;
use tooff::services::calendar_aggregator::DayMatch;
use tooff::services::calendar_service::{CalendarService, ViewMode};
use tooff::services::event_service::EventService;
use tooff::services::notification_service::Notifier;
use tooff::services::user_service::UserService;
use tooff::utils::jwt::TokenInspector;

#[derive(Parser)]
#[command(name = "tooff")]
#[command(about = "Terminal client for the Tô Off absence dashboard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the API (overrides TOOFF_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file path (overrides TOOFF_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a CPF or email
    Login {
        /// CPF (digits, dots and dash allowed) or email
        identifier: String,

        /// Password
        #[arg(short, long, env = "TOOFF_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List and manage absence events
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// List and manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Show the month calendar with events and holidays
    Calendar {
        /// Year to show (2025-2099)
        #[arg(long)]
        year: Option<i32>,

        /// Month to show (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Step one month back from the selected month
        #[arg(long, conflicts_with = "next")]
        prev: bool,

        /// Step one month forward from the selected month
        #[arg(long)]
        next: bool,

        /// Only approved events
        #[arg(long)]
        approved_only: bool,

        /// Mark every day an event covers, not just its first day
        #[arg(long)]
        span: bool,
    },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List the events visible to you
    List,

    /// Approve a pending event
    Approve {
        id: i64,

        /// Observation sent with the decision
        #[arg(long)]
        notes: Option<String>,
    },

    /// Reject a pending event
    Reject {
        id: i64,

        /// Observation sent with the decision
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an event
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List the users visible to you
    List {
        /// Filter by name, email, group or CPF
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Deactivate a user
    Delete { cpf: u64 },
}

/// Shared handles every command works with.
pub struct App {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub notifier: Arc<dyn Notifier>,
}

pub async fn run(command: Commands, app: &App) -> Result<()> {
    let state = app.session.bootstrap().await;
    info!("Session state after bootstrap: {}", state_name(&state));

    match command {
        Commands::Login {
            identifier,
            password,
        } => handle_login(app, &identifier, password).await,
        Commands::Logout => handle_logout(app).await,
        Commands::Whoami => handle_whoami(app).await,
        Commands::Events { command } => {
            require_session(&state)?;
            handle_events(app, command).await
        }
        Commands::Users { command } => {
            require_session(&state)?;
            handle_users(app, command).await
        }
        Commands::Calendar {
            year,
            month,
            prev,
            next,
            approved_only,
            span,
        } => {
            require_session(&state)?;
            handle_calendar(app, year, month, prev, next, approved_only, span).await
        }
    }
}

fn state_name(state: &SessionState) -> &'static str {
    match state {
        SessionState::Unknown => "unknown",
        SessionState::Restoring => "restoring",
        SessionState::Authenticated(_) => "authenticated",
        SessionState::Anonymous => "anonymous",
    }
}

fn require_session(state: &SessionState) -> Result<()> {
    if state.user().is_none() {
        bail!("Not signed in. Run `tooff login <cpf-or-email>` first");
    }
    Ok(())
}

async fn handle_login(app: &App, identifier: &str, password: String) -> Result<()> {
    let request = LoginRequest::from_identifier(identifier, password);
    if !app.session.login(request).await {
        bail!("Login failed");
    }
    info!("Session stored in {}", app.config.session_file.display());
    Ok(())
}

async fn handle_logout(app: &App) -> Result<()> {
    if !app.session.is_authenticated().await {
        println!("Nenhuma sessão ativa");
        return Ok(());
    }
    app.session.logout().await;
    Ok(())
}

async fn handle_whoami(app: &App) -> Result<()> {
    let Some(session) = app.session.current_session().await else {
        println!("Nenhuma sessão ativa");
        return Ok(());
    };

    let expiry = TokenInspector::new()
        .inspect(&session.access_token)
        .and_then(|claims| claims.expires_at());
    print!("{}", render::profile(&session.user, expiry));
    println!("API: {}", app.config.api_url);
    Ok(())
}

async fn handle_events(app: &App, command: EventCommands) -> Result<()> {
    let service = EventService::new(app.session.clone(), app.notifier.clone());
    service.load().await.context("Failed to load events")?;

    match command {
        EventCommands::List => {
            let mut rows = Vec::new();
            for event in service.events().await {
                let actions = service.actions_for(&event).await;
                rows.push((event, actions));
            }
            print!("{}", render::events(service.page_title().await, &rows));
        }
        EventCommands::Approve { id, notes } => {
            service.approve(id, notes).await?;
        }
        EventCommands::Reject { id, notes } => {
            service.reject(id, notes).await?;
        }
        EventCommands::Delete { id } => {
            service.delete(id).await?;
        }
    }
    Ok(())
}

async fn handle_users(app: &App, command: UserCommands) -> Result<()> {
    let service = UserService::new(app.session.clone(), app.notifier.clone());
    service.load().await.context("Failed to load users")?;

    match command {
        UserCommands::List { search } => {
            let users = service.search(search.as_deref().unwrap_or_default()).await;
            print!("{}", render::users(&users));
        }
        UserCommands::Delete { cpf } => {
            service.delete(cpf).await?;
        }
    }
    Ok(())
}

async fn handle_calendar(
    app: &App,
    year: Option<i32>,
    month: Option<u32>,
    prev: bool,
    next: bool,
    approved_only: bool,
    span: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let service = CalendarService::new(app.session.clone(), today);

    if year.is_some() || month.is_some() {
        service
            .select(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
            .await;
    }
    if prev && !service.navigate(-1).await {
        println!("Já está no primeiro mês disponível");
    }
    if next && !service.navigate(1).await {
        println!("Já está no último mês disponível");
    }

    if approved_only {
        service.set_view_mode(ViewMode::ApprovedOnly).await;
    }
    service.load().await?;

    let matching = if span { DayMatch::Span } else { DayMatch::StartDate };
    let cursor = service.cursor().await;
    let grid = service.grid(today, matching).await;

    print!("{}", render::month_grid(&cursor.title(), &grid));
    println!();
    print!(
        "{}",
        render::month_listing(&service.month_events().await, &service.month_holidays().await)
    );
    Ok(())
}
