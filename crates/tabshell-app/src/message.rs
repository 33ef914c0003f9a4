//! Message types for the TEA pattern

use serde::{Deserialize, Serialize};
use tabshell_core::{CloseScope, NodeId, TabIdentity};

use crate::tab::NavTarget;

/// Direction of a tab-strip scroll control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Cross-document message telling an embedded page the colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeModeMessage {
    #[serde(rename = "autoDarkMode")]
    pub auto_dark_mode: bool,
}

/// All possible messages/events in the engine
#[derive(Debug, Clone)]
pub enum Message {
    /// The user clicked `node` (or something inside it)
    Click { node: NodeId },

    // ─────────────────────────────────────────────────────────
    // Tab Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Open (or reuse) a tab for a target. `switch` of `None` follows
    /// `auto_show_new_tab`.
    OpenTab {
        target: NavTarget,
        switch: Option<bool>,
    },

    ActivateTab {
        identity: TabIdentity,
        reload: bool,
    },

    /// Make the pinned page-content tab active
    ActivatePageContent,

    /// Close tabs. `identity` names the tab for `only-this`; when absent the
    /// active tab is closed.
    CloseTabs {
        scope: CloseScope,
        identity: Option<TabIdentity>,
    },

    // ─────────────────────────────────────────────────────────
    // Host Signals
    // ─────────────────────────────────────────────────────────
    /// An embedded frame finished loading
    FrameLoaded { frame: NodeId },

    /// A delayed loading screen came due
    LoadingScreenDue { identity: TabIdentity },

    /// The system colour scheme changed (or was first reported)
    ThemeChanged { dark: bool },

    /// Other code changed the document; deliver pending mutation records
    DomMutated,

    // ─────────────────────────────────────────────────────────
    // Presentation
    // ─────────────────────────────────────────────────────────
    ToggleFullscreen,
    Scroll(ScrollDirection),
}
