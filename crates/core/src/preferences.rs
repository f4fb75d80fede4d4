//! Display preferences persisted per client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::storage::{ClientStore, STORAGE_KEY_THEME, STORAGE_KEY_VIEW_MODE};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn storage_value(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Anything other than `dark` reads as light.
    fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_value())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::InvalidInput(format!("Unknown theme: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn storage_value(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Grid => "grid",
        }
    }

    fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("grid") => Self::Grid,
            _ => Self::List,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_value())
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "grid" => Ok(Self::Grid),
            other => Err(Error::InvalidInput(format!("Unknown view mode: {}", other))),
        }
    }
}

/// Theme and view mode, independent of the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub view_mode: ViewMode,
}

impl Preferences {
    pub async fn load(store: &dyn ClientStore) -> Result<Self> {
        let theme = store.get(STORAGE_KEY_THEME).await?;
        let view_mode = store.get(STORAGE_KEY_VIEW_MODE).await?;
        Ok(Self {
            theme: Theme::from_stored(theme.as_deref()),
            view_mode: ViewMode::from_stored(view_mode.as_deref()),
        })
    }

    pub async fn save_theme(store: &dyn ClientStore, theme: Theme) -> Result<()> {
        store.set(STORAGE_KEY_THEME, theme.storage_value()).await
    }

    pub async fn save_view_mode(store: &dyn ClientStore, view_mode: ViewMode) -> Result<()> {
        store
            .set(STORAGE_KEY_VIEW_MODE, view_mode.storage_value())
            .await
    }
}
