//! Per-tab state: the navigation target, its document nodes and load phase.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tabshell_core::{NodeId, TabIdentity};

/// Where a menu item points and what the tab should be called
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTarget {
    pub reference: String,
    pub label: String,
}

impl NavTarget {
    pub fn new(reference: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            label: label.into(),
        }
    }
}

/// Load phase of a tab's embedded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabPhase {
    /// Nodes built, navigation not yet issued
    #[default]
    Created,
    /// Navigation issued, waiting for the load signal
    Loading,
    /// At least one load has completed
    Loaded,
}

/// Handle to the embedded document context of a loaded frame.
///
/// Identifies the frame plus the load it came from, so a handle taken
/// before a reload is distinguishable from one taken after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle {
    pub frame: NodeId,
    pub generation: u32,
}

/// A single open tab
#[derive(Debug, Clone)]
pub struct TabEntry {
    pub identity: TabIdentity,

    pub target: NavTarget,

    // ─────────────────────────────────────────────────────────
    // Document Nodes (owned by this entry while it is registered)
    // ─────────────────────────────────────────────────────────
    /// Tab-strip button
    pub nav: NodeId,

    /// Content pane
    pub pane: NodeId,

    /// Embedded frame inside the pane
    pub frame: NodeId,

    // ─────────────────────────────────────────────────────────
    // Load Tracking
    // ─────────────────────────────────────────────────────────
    pub phase: TabPhase,

    /// `None` until the first load completes
    pub document: Option<FrameHandle>,

    /// Completed loads, reloads included
    pub load_count: u32,

    pub created_at: DateTime<Local>,
}

impl TabEntry {
    pub fn new(
        identity: TabIdentity,
        target: NavTarget,
        nav: NodeId,
        pane: NodeId,
        frame: NodeId,
    ) -> Self {
        Self {
            identity,
            target,
            nav,
            pane,
            frame,
            phase: TabPhase::Created,
            document: None,
            load_count: 0,
            created_at: Local::now(),
        }
    }

    /// True once the embedded document has completed at least one load
    pub fn has_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == TabPhase::Loading
    }

    /// Navigation was issued
    pub fn mark_loading(&mut self) {
        self.phase = TabPhase::Loading;
    }

    /// The frame signalled load completion
    pub fn mark_loaded(&mut self) -> FrameHandle {
        self.load_count += 1;
        self.phase = TabPhase::Loaded;
        let handle = FrameHandle {
            frame: self.frame,
            generation: self.load_count,
        };
        self.document = Some(handle);
        handle
    }
}
