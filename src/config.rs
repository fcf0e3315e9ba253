//! Session configuration: which provider, and which API key.
//!
//! The key is resolved once, in priority order:
//!
//! 1. the `apiKey` param of the start-up location,
//! 2. the environment fallback (`--api-key` / `NEWS_API_KEY` at run time,
//!    then `NEWS_API_KEY` baked in at build time),
//! 3. the built-in default, which is empty.
//!
//! An empty key is not an error: the session skips fetching and the UI shows
//! a configuration prompt instead.

use std::fmt;

use url::Url;

use crate::location::get_param;
use crate::provider::{ProviderId, ProviderRegistry, DEFAULT_PROVIDER};

/// Key used when neither the location nor the environment provides one.
pub const DEFAULT_API_KEY: &str = "";

/// `NEWS_API_KEY` as seen by the compiler, if it was set.
pub fn build_time_api_key() -> Option<&'static str> {
    option_env!("NEWS_API_KEY")
}

/// The run-time key when given, otherwise the build-time one.
pub fn env_api_key(run_time: Option<&str>) -> Option<&str> {
    run_time.or_else(|| build_time_api_key())
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Active provider; changed only by [`NewsSession::switch_provider`].
    ///
    /// [`NewsSession::switch_provider`]: crate::session::NewsSession::switch_provider
    pub provider: ProviderId,
    api_key: String,
}

impl AppConfig {
    pub fn new(provider: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
        }
    }

    /// Resolve the configuration from the start-up location.
    ///
    /// An unknown or unregistered `provider` param falls back to
    /// [`DEFAULT_PROVIDER`].
    pub fn resolve(location: &Url, env_api_key: Option<&str>, registry: &ProviderRegistry) -> Self {
        let api_key = get_param(location, "apiKey")
            .filter(|k| !k.is_empty())
            .or_else(|| env_api_key.filter(|k| !k.is_empty()).map(String::from))
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());

        let provider = get_param(location, "provider")
            .and_then(|p| p.parse::<ProviderId>().ok())
            .filter(|id| registry.contains(*id))
            .unwrap_or(DEFAULT_PROVIDER);

        Self::new(provider, api_key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<empty>" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::parse_location;

    fn resolve(query: &str, env: Option<&str>) -> AppConfig {
        AppConfig::resolve(
            &parse_location(query).unwrap(),
            env,
            &ProviderRegistry::builtin(),
        )
    }

    #[test]
    fn location_key_wins_over_env() {
        let cfg = resolve("?apiKey=from-url", Some("from-env"));
        assert_eq!(cfg.api_key(), "from-url");
    }

    #[test]
    fn env_key_used_when_location_has_none() {
        assert_eq!(resolve("", Some("from-env")).api_key(), "from-env");
        assert_eq!(resolve("?apiKey=", Some("from-env")).api_key(), "from-env");
    }

    #[test]
    fn falls_back_to_builtin_default() {
        let cfg = resolve("", None);
        assert_eq!(cfg.api_key(), DEFAULT_API_KEY);
        assert!(!cfg.has_api_key());

        assert!(!resolve("", Some("")).has_api_key());
    }

    #[test]
    fn provider_param_is_validated() {
        assert_eq!(resolve("?provider=gnews", None).provider, ProviderId::GNews);
        assert_eq!(resolve("?provider=bing", None).provider, DEFAULT_PROVIDER);
        assert_eq!(resolve("", None).provider, DEFAULT_PROVIDER);
    }

    #[test]
    fn unregistered_provider_falls_back() {
        let cfg = AppConfig::resolve(
            &parse_location("?provider=gnews").unwrap(),
            None,
            &ProviderRegistry::empty(),
        );
        assert_eq!(cfg.provider, DEFAULT_PROVIDER);
    }

    #[test]
    fn run_time_key_beats_build_time_key() {
        let owned = String::from("from-cli");
        assert_eq!(env_api_key(Some(owned.as_str())), Some("from-cli"));
        assert_eq!(env_api_key(None), build_time_api_key());
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = AppConfig::new(ProviderId::NewsApi, "super-secret");
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<set>"));
    }
}
