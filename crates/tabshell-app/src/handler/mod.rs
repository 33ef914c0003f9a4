//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `lifecycle`: Tab creation, activation, loading and menu highlighting
//! - `close`: Tab closure in its three scopes
//! - `presentation`: Fullscreen, tab-strip scrolling and theme propagation

pub(crate) mod close;
pub(crate) mod lifecycle;
pub(crate) mod presentation;
pub(crate) mod update;


use std::time::Duration;

use tabshell_core::{NodeId, TabIdentity};

use crate::message::{Message, ThemeModeMessage};

// Re-export main entry point
pub use update::update;

/// Side effects only the host can perform, returned from every update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Point a frame at `url`, starting its load
    Navigate {
        identity: TabIdentity,
        frame: NodeId,
        url: String,
    },

    /// Reload the document already shown in a frame
    Reload { identity: TabIdentity, frame: NodeId },

    /// Deliver a message to a frame's document (fire-and-forget)
    PostMessage {
        frame: NodeId,
        message: ThemeModeMessage,
    },

    /// Add `class` to the body of a frame's loaded document
    DecorateFrame { frame: NodeId, class: String },

    /// Arm a timer; answer with [`Message::LoadingScreenDue`]
    ScheduleLoadingScreen {
        identity: TabIdentity,
        delay: Duration,
    },

    /// Start reporting system colour-scheme changes as [`Message::ThemeChanged`]
    SubscribeColorScheme,
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Actions for the host to perform, in order
    pub actions: Vec<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            actions: Vec::new(),
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            actions: vec![action],
        }
    }

    pub fn push(&mut self, action: UpdateAction) {
        self.actions.push(action);
    }

    /// Append another result's actions; its follow-up message wins if set
    pub fn merge(&mut self, other: UpdateResult) {
        self.actions.extend(other.actions);
        if other.message.is_some() {
            self.message = other.message;
        }
    }
}
