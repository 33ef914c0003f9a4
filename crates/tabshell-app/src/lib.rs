//! tabshell-app - Tab lifecycle engine for multi-document application shells
//!
//! This crate implements the TEA (The Elm Architecture) pattern for state
//! management: messages go through [`handler::update`], which mutates the
//! [`ShellState`] and returns [`UpdateAction`]s for the host. The [`Engine`]
//! owns one page's state, its hooks and its initialisation flag.

pub mod binder;
pub mod config;
pub mod engine;
pub mod fixture;
pub mod handler;
pub mod hooks;
pub mod layout;
pub mod message;
pub mod registry;
pub mod state;
pub mod tab;

// Re-export primary types
pub use binder::{Binding, Control, MenuBinder};
pub use config::{LoadingScreen, ShellSettings};
pub use engine::{Engine, InitOutcome, SkipReason};
pub use handler::{UpdateAction, UpdateResult};
pub use hooks::{HookTarget, NoopHooks, TabHooks};
pub use layout::{PinnedTab, ShellLayout};
pub use message::{Message, ScrollDirection, ThemeModeMessage};
pub use registry::TabRegistry;
pub use state::{ActiveView, ShellState};
pub use tab::{FrameHandle, NavTarget, TabEntry, TabPhase};
