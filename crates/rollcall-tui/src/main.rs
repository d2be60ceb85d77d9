//! `rollcall` — terminal client for the rollcall attendance backend.
//!
//! # Usage
//!
//! ```
//! rollcall --url http://localhost:8000
//! rollcall --config ~/.config/rollcall/config.toml
//! ```

mod app;
mod pages;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
  },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rollcall_client::{ApiClient, Session, SessionStore};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "rollcall",
  about = "Terminal client for the rollcall attendance backend"
)]
struct Args {
  /// Path to a TOML config file (url, state_dir).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the backend (default: http://localhost:8000).
  #[arg(long, env = "ROLLCALL_URL")]
  url: Option<String>,

  /// Directory for the persisted session and log file.
  #[arg(long, env = "ROLLCALL_STATE_DIR")]
  state_dir: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
  #[serde(default)]
  state_dir: Option<PathBuf>,
}

fn default_state_dir() -> PathBuf {
  dirs::data_dir()
    .map(|d| d.join("rollcall"))
    .unwrap_or_else(|| PathBuf::from(".rollcall"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:8000".to_string());
  let state_dir = args
    .state_dir
    .or(file_cfg.state_dir)
    .unwrap_or_else(default_state_dir);

  std::fs::create_dir_all(&state_dir)
    .with_context(|| format!("creating state dir {}", state_dir.display()))?;

  // The TUI owns the terminal, so logs go to a file in the state dir.
  let log_file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(state_dir.join("rollcall.log"))
    .context("opening log file")?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(std::sync::Mutex::new(log_file))
    .with_ansi(false)
    .init();
  tracing::info!(url = %base_url, state_dir = %state_dir.display(), "starting");

  // Restore any persisted session before the first frame, so a reload
  // lands on the dashboard without re-authenticating.
  let session = Session::new(SessionStore::new(&state_dir));
  session.restore();

  let client = ApiClient::new(&base_url, session.clone())
    .context("building API client")?;
  let mut app = App::new(client, session);
  app.start().await;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          let cont = app.handle_key(key).await?;
          if !cont {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}
