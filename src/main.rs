//! backdesk binary entry point.
//!
//! Handles the `login`/`logout` session subcommands, then initializes the
//! terminal in raw mode, runs the TUI event loop, and restores the
//! terminal state on exit.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use backdesk::api::ApiClient;
use backdesk::app::{self, AppState, Theme};
use backdesk::session::Session;

#[derive(Parser)]
#[command(name = "backdesk", version, about = "Terminal back-office client")]
struct Cli {
    /// Base URL of the back-office API.
    #[arg(long, env = "BACKDESK_API_URL", default_value = "http://localhost:5000/api")]
    api_url: String,

    /// Where the session token and permissions are stored.
    #[arg(long, env = "BACKDESK_SESSION_FILE", default_value = "backdesk-session.conf")]
    session_file: String,

    /// Theme configuration file; created with defaults when missing.
    #[arg(long, default_value = "backdesk-theme.conf")]
    theme: String,

    /// Append structured logs to this file (stdout belongs to the TUI).
    #[arg(long, env = "BACKDESK_LOG")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Store an API token and granted permissions for subsequent runs.
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user: Option<String>,
        /// Comma-separated permission list, e.g. `customer,inventory`.
        #[arg(long, value_delimiter = ',')]
        permissions: Vec<String>,
    },
    /// Remove the stored session.
    Logout,
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn init_logging(path: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Login { token, user, permissions }) => {
            let session = Session::new(Some(token), user, permissions);
            session
                .write_file(&cli.session_file)
                .with_context(|| format!("write session file {}", cli.session_file))?;
            println!("session stored in {}", cli.session_file);
            return Ok(());
        }
        Some(Command::Logout) => {
            Session::clear_file(&cli.session_file)
                .with_context(|| format!("clear session file {}", cli.session_file))?;
            println!("session cleared");
            return Ok(());
        }
        None => {}
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let session = Session::load(&cli.session_file);
    if !session.is_authenticated() {
        bail!("no session found; run `backdesk login --token <token>` first");
    }

    let api = ApiClient::new(&cli.api_url, session.token.clone())?;
    let theme = Theme::load_or_init(&cli.theme);
    let state = AppState::new(session, api, theme);

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, state);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        eprintln!("application error: {err}");
    }
    Ok(())
}
