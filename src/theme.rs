//! Light/dark theme preference
//!
//! Resolution order on startup: the stored choice, else the system color
//! scheme. Every change is applied to the page and persisted; changes made
//! in another tab arrive as storage events and are applied here.

use serde::{Deserialize, Serialize};

/// Storage key shared by every tab
pub const STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Interpret a stored value: `"dark"` is dark, anything else light
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }
}

/// Where the theme is stored and shown
pub trait ThemeStore {
    /// Stored preference, if any
    fn load(&self) -> Option<String>;
    fn save(&mut self, value: &str);
    /// Whether the system asks for a dark color scheme
    fn prefers_dark(&self) -> bool;
    /// Show `theme` on the page
    fn apply(&mut self, theme: Theme);
}

/// The current theme bound to its store
#[derive(Debug)]
pub struct ThemeSync<S: ThemeStore> {
    store: S,
    theme: Theme,
}

impl<S: ThemeStore> ThemeSync<S> {
    /// Resolve the initial theme, then apply and persist it
    pub fn init(store: S) -> Self {
        let theme = match store.load() {
            Some(saved) if !saved.is_empty() => Theme::from_stored(&saved),
            _ if store.prefers_dark() => Theme::Dark,
            _ => Theme::Light,
        };
        let mut sync = Self { store, theme };
        sync.commit();
        log::info!("Theme initialized: {}", theme.as_str());
        sync
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        self.commit();
    }

    /// Flip light/dark; returns the new theme
    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }

    /// Handle a storage change made by another tab
    ///
    /// Returns true if the theme changed. A cleared value reads as light.
    pub fn on_storage_event(&mut self, key: Option<&str>, new_value: Option<&str>) -> bool {
        if key != Some(STORAGE_KEY) {
            return false;
        }
        let theme = Theme::from_stored(new_value.unwrap_or_default());
        if theme == self.theme {
            return false;
        }
        log::debug!("Theme synced from another tab: {}", theme.as_str());
        self.set(theme);
        true
    }

    fn commit(&mut self) {
        self.store.apply(self.theme);
        self.store.save(self.theme.as_str());
    }
}

/// In-memory store for headless runs and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryThemeStore {
    pub saved: Option<String>,
    pub system_dark: bool,
    pub applied: Option<Theme>,
    pub writes: usize,
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Option<String> {
        self.saved.clone()
    }

    fn save(&mut self, value: &str) {
        self.saved = Some(value.to_string());
        self.writes += 1;
    }

    fn prefers_dark(&self) -> bool {
        self.system_dark
    }

    fn apply(&mut self, theme: Theme) {
        self.applied = Some(theme);
    }
}
