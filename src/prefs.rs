//! UI preference persistence
//!
//! Theme and interface language for the app shell. Both are kept as
//! bare strings in the store so preference rows written by earlier
//! releases read back unchanged.

use std::sync::Arc;

use crate::storage::Store;
use crate::{DEFAULT_LANGUAGE, LANGUAGE_KEY, THEME_KEY};

/// Color theme of the app shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Stored form of the theme
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Parse a stored value; anything unrecognized counts as light
    fn from_value(value: &str) -> Self {
        match value {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// Theme and language preferences backed by the store
#[derive(Clone)]
pub struct Preferences {
    store: Arc<Store>,
}

impl Preferences {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The selected theme, light when none was ever chosen.
    ///
    /// An empty stored value also counts as unchosen; earlier releases
    /// wrote one to mean "not set".
    pub fn theme(&self) -> Theme {
        match self.store.get_raw(THEME_KEY) {
            Some(value) if !value.is_empty() => Theme::from_value(&value),
            _ => Theme::default(),
        }
    }

    /// Persist a theme choice
    pub fn set_theme(&self, theme: Theme) {
        self.store.set_raw(THEME_KEY, theme.as_str());
    }

    /// Flip between light and dark, returning the new theme
    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    /// The selected interface language code, `uz` when none was ever
    /// chosen or the stored value is empty
    pub fn language(&self) -> String {
        match self.store.get_raw(LANGUAGE_KEY) {
            Some(value) if !value.is_empty() => value,
            _ => DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Persist a language choice
    pub fn set_language(&self, language: &str) {
        self.store.set_raw(LANGUAGE_KEY, language);
    }
}
