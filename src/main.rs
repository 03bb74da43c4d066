//! `zelo` command-line shell over the companion core.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use zelo_companion_lib::commands;
use zelo_companion_lib::emergency::EmergencyState;
use zelo_companion_lib::notice::StderrNoticeSink;
use zelo_companion_lib::shortcuts::{LoggingOpener, ShortcutAction};
use zelo_companion_lib::tasks::EMPTY_LIST_MESSAGE;
use zelo_companion_lib::weather::Coordinates;
use zelo_companion_lib::{AppResult, AppState, ShellHooks};

#[derive(Parser)]
#[command(name = "zelo")]
#[command(about = "ZELO - companion app for elderly care", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a Basic credential (verified against `GET /users` unless disabled)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored credential
    Logout,
    /// List today's tasks
    Tasks,
    /// Toggle completion of a task
    Toggle { id: String },
    /// Show the responsible contact and emergency numbers
    Emergency,
    /// Call a number, or the responsible contact when omitted
    Call { number: Option<String> },
    /// List app shortcuts
    Shortcuts,
    /// Open an app shortcut by label
    Open { label: String },
    /// Show the launch check-in (greeting + weather)
    Checkin {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Show settings, optionally updating them
    Settings {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        use_endpoint: Option<bool>,
        #[arg(long)]
        request_timeout_seconds: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let hooks = ShellHooks {
        notices: Arc::new(StderrNoticeSink),
        opener: Arc::new(LoggingOpener),
    };
    let state = match zelo_companion_lib::start(hooks) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("startup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Failures were already shown through the notice sink.
    match run(&state, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error_code = err.code(), "command failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &AppState, command: Commands) -> AppResult<()> {
    match command {
        Commands::Login { email, password } => {
            commands::auth_login(state, &email, &password).await?;
            println!("ok");
        }
        Commands::Logout => {
            commands::auth_logout(state);
            println!("ok");
        }
        Commands::Tasks => {
            let tasks = commands::tasks_mount(state).await?;
            if tasks.is_empty() {
                println!("{EMPTY_LIST_MESSAGE}");
            }
            for task in tasks.iter() {
                let mark = if task.done { "x" } else { " " };
                println!("[{mark}] {}  {}  {}", task.id, task.description, task.date);
            }
        }
        Commands::Toggle { id } => {
            commands::tasks_mount(state).await?;
            let command = commands::tasks_toggle(state, &id).await?;
            println!("{} -> {:?}", command.task_id, command.state);
        }
        Commands::Emergency => {
            if let EmergencyState::Loaded(responsible) = commands::emergency_mount(state).await {
                println!("{}  {}", responsible.name, responsible.phone);
            }
            for service in commands::emergency_services() {
                println!("{}  {}", service.label, service.number);
            }
        }
        Commands::Call { number } => match number {
            Some(number) => commands::emergency_call(state, &number).await?,
            None => {
                commands::emergency_mount(state).await;
                commands::emergency_call_responsible(state).await?;
            }
        },
        Commands::Shortcuts => {
            for shortcut in commands::shortcuts_list() {
                let kind = match shortcut.action {
                    ShortcutAction::Open { .. } => "app",
                    ShortcutAction::Info { .. } => "info",
                };
                println!("{}  ({kind})", shortcut.label);
            }
        }
        Commands::Open { label } => {
            if let Some(url) = commands::shortcut_open(state, &label).await? {
                println!("{url}");
            }
        }
        Commands::Checkin { lat, lon } => {
            let location = lat.zip(lon).map(|(latitude, longitude)| Coordinates {
                latitude,
                longitude,
            });
            let view = commands::checkin_open(state, location).await;
            println!("{}!", view.greeting);
            println!("{}", view.summary);
        }
        Commands::Settings {
            base_url,
            use_endpoint,
            request_timeout_seconds,
        } => {
            let mut next = commands::settings_get(state);
            let changed =
                base_url.is_some() || use_endpoint.is_some() || request_timeout_seconds.is_some();
            if let Some(base_url) = base_url {
                next.base_url = base_url;
            }
            if let Some(use_endpoint) = use_endpoint {
                next.use_endpoint = use_endpoint;
            }
            if let Some(secs) = request_timeout_seconds {
                next.request_timeout_seconds = secs;
            }
            if changed {
                next = commands::settings_set(state, &next)?;
            }
            let json = serde_json::to_string_pretty(&next)
                .map_err(|e| zelo_companion_lib::AppError::Storage(e.to_string()))?;
            println!("{json}");
        }
    }
    Ok(())
}
