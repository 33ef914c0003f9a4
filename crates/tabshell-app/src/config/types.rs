//! Configuration types for tabshell
//!
//! Defines:
//! - `ShellSettings` - Engine options (`.tabshell/config.toml`)
//! - `LoadingScreen` - Loading placeholder policy

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tabshell_core::prelude::*;

/// Engine settings. Immutable once an engine is built from them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ShellSettings {
    /// Enable the engine automatically when the page opts in with `iframe-mode`
    #[serde(default = "default_true")]
    pub auto_iframe_mode: bool,

    /// Highlight the menu item whose link matches the active tab
    #[serde(default = "default_true")]
    pub auto_item_active: bool,

    /// Switch to a tab as soon as a menu click creates it
    #[serde(default = "default_true")]
    pub auto_show_new_tab: bool,

    /// Forward system colour-scheme changes to embedded documents
    #[serde(default)]
    pub auto_dark_mode: bool,

    /// Open a new tab on every click instead of reusing one
    #[serde(default)]
    pub allow_duplicates: bool,

    /// Reload an already loaded tab when its menu item is clicked again
    #[serde(default = "default_true")]
    pub allow_reload: bool,

    #[serde(default)]
    pub loading_screen: LoadingScreen,

    /// Also bind links in the header navbar
    #[serde(default = "default_true")]
    pub use_navbar_items: bool,

    /// Pixels the tab strip moves per scroll control click
    #[serde(default = "default_scroll_offset")]
    pub scroll_offset: u32,

    /// Swap which control scrolls left and which scrolls right
    #[serde(default)]
    pub scroll_behavior_swap: bool,

    #[serde(default = "default_icon_maximize")]
    pub icon_maximize: String,

    #[serde(default = "default_icon_minimize")]
    pub icon_minimize: String,

    /// Classes applied to the active tab's nav button
    #[serde(default = "default_header_active_class")]
    pub header_active_class: String,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            auto_iframe_mode: true,
            auto_item_active: true,
            auto_show_new_tab: true,
            auto_dark_mode: false,
            allow_duplicates: false,
            allow_reload: true,
            loading_screen: LoadingScreen::default(),
            use_navbar_items: true,
            scroll_offset: default_scroll_offset(),
            scroll_behavior_swap: false,
            icon_maximize: default_icon_maximize(),
            icon_minimize: default_icon_minimize(),
            header_active_class: default_header_active_class(),
        }
    }
}

impl ShellSettings {
    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.scroll_offset == 0 {
            return Err(Error::config_invalid("scroll_offset must be greater than 0"));
        }
        if self.icon_maximize.trim().is_empty() || self.icon_minimize.trim().is_empty() {
            return Err(Error::config_invalid(
                "icon_maximize and icon_minimize must both name at least one class",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_scroll_offset() -> u32 {
    40
}

fn default_icon_maximize() -> String {
    "bi bi-fullscreen".to_string()
}

fn default_icon_minimize() -> String {
    "bi bi-fullscreen-exit".to_string()
}

fn default_header_active_class() -> String {
    "bg-secondary bg-gradient text-white".to_string()
}

/// When the loading placeholder appears for a tab that is still loading.
///
/// Written in TOML as `true`, `false` or a delay in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "LoadingScreenRepr", into = "LoadingScreenRepr")]
pub enum LoadingScreen {
    Off,
    #[default]
    On,
    /// Show only if the tab is still loading after this many milliseconds
    Delay(u64),
}

impl LoadingScreen {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, LoadingScreen::Off)
    }

    pub fn delay(&self) -> Option<Duration> {
        match self {
            LoadingScreen::Delay(ms) => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum LoadingScreenRepr {
    Flag(bool),
    Millis(u64),
}

impl From<LoadingScreenRepr> for LoadingScreen {
    fn from(repr: LoadingScreenRepr) -> Self {
        match repr {
            LoadingScreenRepr::Flag(true) => LoadingScreen::On,
            LoadingScreenRepr::Flag(false) => LoadingScreen::Off,
            LoadingScreenRepr::Millis(0) => LoadingScreen::On,
            LoadingScreenRepr::Millis(ms) => LoadingScreen::Delay(ms),
        }
    }
}

impl From<LoadingScreen> for LoadingScreenRepr {
    fn from(screen: LoadingScreen) -> Self {
        match screen {
            LoadingScreen::Off => LoadingScreenRepr::Flag(false),
            LoadingScreen::On => LoadingScreenRepr::Flag(true),
            LoadingScreen::Delay(ms) => LoadingScreenRepr::Millis(ms),
        }
    }
}
