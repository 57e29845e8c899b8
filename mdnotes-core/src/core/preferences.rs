//! Appearance preferences: dark mode, color theme and the first-visit flag.
//!
//! These are independent scalars with no transition logic beyond set/toggle.
//! They share the key-value store with the notes but never touch the notes key.

use crate::{KeyValueStore, NotesError, Persistence, PreferenceKey, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of accent color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Purple,
    Emerald,
    Rose,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 4] = [Self::Blue, Self::Purple, Self::Emerald, Self::Rose];

    /// Identifier stored under the color-theme key.
    pub fn id(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Emerald => "emerald",
            Self::Rose => "rose",
        }
    }

    /// Name shown in the theme picker.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Blue => "Ocean",
            Self::Purple => "Purple Haze",
            Self::Emerald => "Emerald",
            Self::Rose => "Rose",
        }
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ColorTheme {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.id() == s)
            .ok_or_else(|| {
                NotesError::InvalidPreference(format!(
                    "Unknown color theme '{s}' (expected one of: blue, purple, emerald, rose)"
                ))
            })
    }
}

/// Current appearance settings, loaded from and written back to persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub dark_mode: bool,
    pub color_theme: ColorTheme,
}

impl ThemeSettings {
    /// Reads the stored settings.
    ///
    /// Without a stored `"dark"`/`"light"` value, dark mode follows
    /// `system_prefers_dark`. An unknown stored color theme falls back to the
    /// first theme.
    pub fn load<S: KeyValueStore>(
        persistence: &Persistence<S>,
        system_prefers_dark: bool,
    ) -> Result<Self> {
        let dark_mode = match persistence.load_preference(PreferenceKey::Theme)? {
            Some(theme) => theme == "dark",
            None => system_prefers_dark,
        };
        let color_theme = match persistence.load_preference(PreferenceKey::ColorTheme)? {
            Some(id) => id.parse().unwrap_or_else(|_| {
                log::warn!("ignoring unknown stored color theme '{id}'");
                ColorTheme::default()
            }),
            None => ColorTheme::default(),
        };
        Ok(Self { dark_mode, color_theme })
    }

    /// Flips dark mode and persists the new value.
    pub fn toggle_dark_mode<S: KeyValueStore>(
        &mut self,
        persistence: &mut Persistence<S>,
    ) -> Result<()> {
        self.set_dark_mode(persistence, !self.dark_mode)
    }

    pub fn set_dark_mode<S: KeyValueStore>(
        &mut self,
        persistence: &mut Persistence<S>,
        dark_mode: bool,
    ) -> Result<()> {
        self.dark_mode = dark_mode;
        persistence.save_preference(PreferenceKey::Theme, if dark_mode { "dark" } else { "light" })
    }

    pub fn set_color_theme<S: KeyValueStore>(
        &mut self,
        persistence: &mut Persistence<S>,
        theme: ColorTheme,
    ) -> Result<()> {
        self.color_theme = theme;
        persistence.save_preference(PreferenceKey::ColorTheme, theme.id())
    }
}

/// `true` until the first-run seeding has written its sentinel.
pub fn is_first_visit<S: KeyValueStore>(persistence: &Persistence<S>) -> Result<bool> {
    Ok(persistence.load_preference(PreferenceKey::FirstVisit)?.is_none())
}
