//! Command-line interface definitions.
//!
//! Every option can also come from the environment, which is how the API key
//! is usually supplied.

use std::path::PathBuf;

use clap::Parser;

use crate::session::SEARCH_DEBOUNCE;

/// Browse top headlines from NewsAPI.org or GNews in the terminal.
///
/// # Examples
///
/// ```sh
/// # Start with the defaults (key from NEWS_API_KEY)
/// newsdesk
///
/// # Resume a saved permalink
/// newsdesk '?provider=gnews&q=ukraine&page=2'
///
/// # Pass the key explicitly
/// newsdesk --api-key YOUR_KEY '?category=sports'
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Start-up location: a full URL or a bare query string such as
    /// `?q=ukraine&category=sports&page=3`
    pub location: Option<String>,

    /// API key used when the location carries no `apiKey`
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Quiet period after the last keystroke before searching, in milliseconds
    #[arg(long, default_value_t = SEARCH_DEBOUNCE.as_millis() as u64)]
    pub debounce_ms: u64,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "NEWSDESK_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Where tracing output goes; the temp directory when not configured.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("newsdesk.log"))
    }
}
