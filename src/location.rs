//! The session "address bar".
//!
//! A terminal has no browser location, so the session keeps its permalink in
//! a [`Location`]: one [`Url`] whose query string carries every filter.  The
//! URL is accepted on the command line and printed back on exit, which is all
//! the persistence newsdesk has.
//!
//! Writes are always *replacements*.  Nothing here models history pushes, and
//! the in-memory history stays at one entry for the lifetime of a session.

use url::Url;

/// Scheme + host used when the user passes a bare query string.
pub const DEFAULT_ORIGIN: &str = "newsdesk://local/";

/// Read / replace access to the current session URL.
pub trait Location {
    /// The current URL.
    fn href(&self) -> &Url;

    /// Swap the current URL in place without adding a history entry.
    fn replace(&mut self, url: Url);
}

/// Look up a single query parameter (first occurrence wins).
pub fn get_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Set or remove query parameters on `url`.
///
/// `None` removes every occurrence of the key.  `Some` overwrites the first
/// occurrence in place (dropping duplicates) or appends a new pair.  Keys not
/// mentioned in `updates` are left exactly where they were.
pub fn apply_params(url: &mut Url, updates: &[(&str, Option<String>)]) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (key, value) in updates {
        match value {
            None => pairs.retain(|(k, _)| k.as_str() != *key),
            Some(value) => {
                let mut found = false;
                pairs.retain_mut(|(k, v)| {
                    if k.as_str() != *key {
                        return true;
                    }
                    if found {
                        return false;
                    }
                    found = true;
                    *v = value.clone();
                    true
                });
                if !found {
                    pairs.push((key.to_string(), value.clone()));
                }
            }
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// Parse a command-line location.
///
/// Accepts either a full URL or a bare query string (`?q=x&page=2` or
/// `q=x&page=2`), which is resolved against [`DEFAULT_ORIGIN`].
pub fn parse_location(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    if let Ok(url) = Url::parse(raw) {
        return Ok(url);
    }
    let base = Url::parse(DEFAULT_ORIGIN)?;
    let query = raw.strip_prefix('?').unwrap_or(raw);
    if query.is_empty() {
        return Ok(base);
    }
    base.join(&format!("?{query}"))
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// A [`Location`] held in memory for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<Url>,
}

impl MemoryLocation {
    pub fn new(url: Url) -> Self {
        Self { entries: vec![url] }
    }

    /// Number of history entries; `replace` never changes it.
    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.entries.len()
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> &Url {
        // `entries` is never empty: constructed with one and only replaced.
        &self.entries[self.entries.len() - 1]
    }

    fn replace(&mut self, url: Url) {
        if let Some(last) = self.entries.last_mut() {
            *last = url;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
