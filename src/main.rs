//! newsdesk — a terminal news browser for NewsAPI.org and GNews.
//!
//! ## Architecture overview
//!
//! ```text
//!                      FetchRequest         ┌──────────┐
//! ┌──────────┐  tick  ┌──────────┐ ───────► │ fetch.rs │
//! │  app.rs  │ ─────► │session.rs│          │ (tokio)  │
//! │ (state)  │        │ search.rs│ ◄─────── └──────────┘
//! └──────────┘        └──────────┘ FetchDone (channel)
//!    ▲     │ draw()
//!    │     ▼
//! ┌──────────┐   ┌──────────┐
//! │ input.rs │   │  ui.rs   │
//! └──────────┘   └──────────┘
//! ```
//!
//! * **`provider/`** — the `NewsProvider` trait, the canonical article types
//!   and the NewsAPI / GNews adapters.
//! * **`location` / `query_state` / `params`** — the filter record and its
//!   mirror in the session URL.
//! * **`debounce`** — trailing-edge debounce for the search box.
//! * **`search`** — the orchestrator: current request, tri-state outcome.
//! * **`session`** — everything above composed behind user actions.
//! * **`fetch`** — runs requests on tokio and reports back over a channel.
//! * **`app` / `ui` / `input`** — TUI state, rendering, key handling.
//! * **`main`** — wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod cli;
mod config;
mod debounce;
mod fetch;
mod input;
mod location;
mod logging;
mod params;
mod provider;
mod query_state;
mod search;
mod session;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use cli::Cli;
use config::AppConfig;
use fetch::FetchRunner;
use location::{parse_location, Location, MemoryLocation};
use provider::ProviderRegistry;
use session::NewsSession;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_path())?;
    install_panic_hook();

    // -- resolve configuration -----------------------------------------------
    let url = parse_location(cli.location.as_deref().unwrap_or(""))
        .context("invalid start-up location")?;
    let registry = ProviderRegistry::builtin();
    let env_key = config::env_api_key(cli.api_key.as_deref());
    let config = AppConfig::resolve(&url, env_key, &registry);
    let session = NewsSession::new(
        config,
        registry,
        MemoryLocation::new(url),
        Duration::from_millis(cli.debounce_ms),
    )?;

    // -- network runtime -----------------------------------------------------
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;
    let (runner, rx) = FetchRunner::new(client, runtime.handle().clone());

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(session);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply finished fetches.
    //   2. Advance timers; start a search if the filters changed.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(done) = rx.try_recv() {
            app.on_fetch_done(done);
        }

        if let Some(request) = app.tick(Instant::now()) {
            runner.spawn(request);
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key, Instant::now());
            }
        }

        if app.quit {
            break;
        }
    }

    app.session.shutdown();
    drop(guard);
    runtime.shutdown_timeout(Duration::from_secs(1));

    let permalink = app.session.location().href().to_string();
    info!(%permalink, "session ended");
    println!("{permalink}");
    Ok(())
}
