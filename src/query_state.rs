//! Typed filter state bound to the [`Location`] query string.
//!
//! A record type implements [`QueryFields`] to describe its fields as
//! `(key, value)` pairs.  [`QueryState`] reads the record out of the location
//! once on construction and writes the whole record back after every update.
//!
//! ## Read rules
//!
//! * Each field present in the query string overrides the default.
//! * A field whose default is a [`FieldValue::Number`] is parsed as a number;
//!   if parsing fails the default is kept.
//! * Unknown params are ignored and missing params keep their defaults.
//!
//! ## Write rules
//!
//! * Construction never writes, so a freshly loaded URL is left untouched
//!   until the first real change.
//! * Empty text fields are removed from the query string; everything else is
//!   written in its string form.
//! * Writes go through [`Location::replace`], never adding history.

use std::fmt;

use crate::location::{apply_params, get_param, Location};

/// A single field value: either free text or a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl FieldValue {
    /// Serialized form, or `None` when the field should be dropped from the URL.
    fn to_param(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    /// Coerce a raw query value to the same kind as `self`.
    fn coerce(&self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldValue::Number(_) => raw.trim().parse().ok().map(FieldValue::Number),
            FieldValue::Text(_) => Some(FieldValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A record whose fields can be mirrored into a query string.
pub trait QueryFields: Clone {
    /// All fields with their current values, in URL order.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// Overwrite one field.  Implementations may sanitize the value.
    fn set_field(&mut self, key: &str, value: FieldValue);
}

/// Filter state plus the location it is mirrored into.
#[derive(Debug)]
pub struct QueryState<T, L> {
    state: T,
    location: L,
}

impl<T: QueryFields, L: Location> QueryState<T, L> {
    /// Read `defaults` overridden by whatever the location carries.
    pub fn new(defaults: T, location: L) -> Self {
        let state = read_fields(defaults, &location);
        Self { state, location }
    }

    pub fn get(&self) -> &T {
        &self.state
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Apply `f` to the state and mirror the result into the location.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.state);
        self.write();
    }

    /// Set extra, non-record params on the location (e.g. `provider`).
    pub fn set_extra_param(&mut self, key: &str, value: Option<String>) {
        let mut url = self.location.href().clone();
        apply_params(&mut url, &[(key, value)]);
        self.location.replace(url);
    }

    fn write(&mut self) {
        let fields = self.state.fields();
        let updates: Vec<(&str, Option<String>)> = fields
            .iter()
            .map(|(key, value)| (*key, value.to_param()))
            .collect();

        let mut url = self.location.href().clone();
        apply_params(&mut url, &updates);
        self.location.replace(url);
    }
}

fn read_fields<T: QueryFields, L: Location>(defaults: T, location: &L) -> T {
    let url = location.href();
    let mut state = defaults.clone();
    for (key, default) in defaults.fields() {
        let Some(raw) = get_param(url, key) else {
            continue;
        };
        if let Some(value) = default.coerce(&raw) {
            state.set_field(key, value);
        }
    }
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
