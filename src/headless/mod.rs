//! Headless mode - NDJSON commands in, NDJSON events out
//!
//! The runner drives one engine over a generated shell page. Commands are read
//! one JSON object per line (from a script file or stdin) and every hook call,
//! host action and snapshot is written to stdout as one JSON object per line.
//!
//! # Command Format
//!
//! ```json
//! {"cmd":"click","id":"./reports/q1"}
//! {"cmd":"frame_loaded","tab":"reports-q1"}
//! {"cmd":"close","scope":"only-this"}
//! {"cmd":"snapshot"}
//! ```
//!
//! # Example Output
//!
//! ```json
//! {"event":"tab_created","identity":"reports-q1","node":41,"timestamp":1704700001000}
//! {"event":"navigate","identity":"reports-q1","frame":44,"url":"./reports/q1","timestamp":1704700001000}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use tabshell_app::{ActiveView, HookTarget, ScrollDirection, TabEntry, TabHooks, TabPhase};
use tabshell_core::{CloseScope, NodeId};

/// Commands accepted on the input stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Click an element. `id` is a toolbar control name (`fullscreen`,
    /// `scroll-left`, `close-all`, ...), a DOM id, an open tab's identity or
    /// a link href, tried in that order.
    Click { id: String },

    /// Render a menu item marked `data-lte-toggle="iframe"` into the sidebar
    InsertMenuItem {
        href: String,
        label: String,
        #[serde(default)]
        id: Option<String>,
    },

    /// Report that the frame of an open tab finished loading
    FrameLoaded { tab: String },

    /// Report the system colour scheme
    Theme { dark: bool },

    /// Open a tab without a menu item
    Open {
        href: String,
        #[serde(default)]
        label: Option<String>,
    },

    Close {
        scope: CloseScope,
        #[serde(default)]
        tab: Option<String>,
    },

    Fullscreen,

    Scroll { direction: ScrollDirection },

    Snapshot,

    Quit,
}

impl Command {
    /// Parse one input line; blank lines and `//` comments yield `None`
    pub fn parse_line(line: &str) -> Option<serde_json::Result<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            return None;
        }
        Some(serde_json::from_str(trimmed))
    }
}

/// One open tab as reported in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabSnapshot {
    pub identity: String,
    pub label: String,
    pub reference: String,
    pub phase: TabPhase,
    pub load_count: u32,
    pub created_at: DateTime<Local>,
}

impl From<&TabEntry> for TabSnapshot {
    fn from(entry: &TabEntry) -> Self {
        Self {
            identity: entry.identity.to_string(),
            label: entry.target.label.clone(),
            reference: entry.target.reference.clone(),
            phase: entry.phase,
            load_count: entry.load_count,
            created_at: entry.created_at,
        }
    }
}

/// Render the active view as a single string: `empty`, `page-content` or
/// the active tab's identity
pub fn describe_active(active: &ActiveView) -> String {
    match active {
        ActiveView::Empty => "empty".to_string(),
        ActiveView::PageContent => "page-content".to_string(),
        ActiveView::Tab(identity) => identity.to_string(),
    }
}

/// Events emitted in headless mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// The engine started and bound the page's menus
    Ready { menu_items: usize, timestamp: i64 },

    TabCreated {
        identity: Option<String>,
        node: NodeId,
        timestamp: i64,
    },

    TabChanged {
        identity: Option<String>,
        node: NodeId,
        timestamp: i64,
    },

    TabClicked {
        identity: Option<String>,
        node: NodeId,
        timestamp: i64,
    },

    Navigate {
        identity: String,
        frame: NodeId,
        url: String,
        timestamp: i64,
    },

    Reload {
        identity: String,
        frame: NodeId,
        timestamp: i64,
    },

    PostMessage {
        frame: NodeId,
        message: serde_json::Value,
        timestamp: i64,
    },

    DecorateFrame {
        frame: NodeId,
        class: String,
        timestamp: i64,
    },

    /// A delayed loading screen was armed
    LoadingScreen {
        identity: String,
        delay_ms: u64,
        timestamp: i64,
    },

    SubscribeColorScheme { timestamp: i64 },

    Snapshot {
        active: String,
        tabs: Vec<TabSnapshot>,
        /// Tabs whose document is still loading
        loading: usize,
        fullscreen: bool,
        empty_shown: bool,
        loading_shown: bool,
        timestamp: i64,
    },

    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = self.write_to(&mut stdout) {
            error!("Failed to write headless event to stdout: {}", e);
        }
    }

    /// Write this event as one NDJSON line and flush
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let json = serde_json::to_string(self)?;
        writeln!(out, "{}", json)?;
        out.flush()
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn ready(menu_items: usize) -> Self {
        Self::Ready {
            menu_items,
            timestamp: Self::now(),
        }
    }

    pub fn tab_created(target: &HookTarget) -> Self {
        Self::TabCreated {
            identity: target.identity.as_ref().map(ToString::to_string),
            node: target.node,
            timestamp: Self::now(),
        }
    }

    pub fn tab_changed(target: &HookTarget) -> Self {
        Self::TabChanged {
            identity: target.identity.as_ref().map(ToString::to_string),
            node: target.node,
            timestamp: Self::now(),
        }
    }

    pub fn tab_clicked(target: &HookTarget) -> Self {
        Self::TabClicked {
            identity: target.identity.as_ref().map(ToString::to_string),
            node: target.node,
            timestamp: Self::now(),
        }
    }

    pub fn navigate(identity: &str, frame: NodeId, url: &str) -> Self {
        Self::Navigate {
            identity: identity.to_string(),
            frame,
            url: url.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn reload(identity: &str, frame: NodeId) -> Self {
        Self::Reload {
            identity: identity.to_string(),
            frame,
            timestamp: Self::now(),
        }
    }

    pub fn post_message(frame: NodeId, message: serde_json::Value) -> Self {
        Self::PostMessage {
            frame,
            message,
            timestamp: Self::now(),
        }
    }

    pub fn decorate_frame(frame: NodeId, class: &str) -> Self {
        Self::DecorateFrame {
            frame,
            class: class.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn loading_screen(identity: &str, delay_ms: u64) -> Self {
        Self::LoadingScreen {
            identity: identity.to_string(),
            delay_ms,
            timestamp: Self::now(),
        }
    }

    pub fn subscribe_color_scheme() -> Self {
        Self::SubscribeColorScheme {
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::TabCreated { .. } => "tab_created",
            Self::TabChanged { .. } => "tab_changed",
            Self::TabClicked { .. } => "tab_clicked",
            Self::Navigate { .. } => "navigate",
            Self::Reload { .. } => "reload",
            Self::PostMessage { .. } => "post_message",
            Self::DecorateFrame { .. } => "decorate_frame",
            Self::LoadingScreen { .. } => "loading_screen",
            Self::SubscribeColorScheme { .. } => "subscribe_color_scheme",
            Self::Snapshot { .. } => "snapshot",
            Self::Error { .. } => "error",
        }
    }
}

/// Hooks that record every call as a [`HeadlessEvent`]
#[derive(Debug, Default)]
pub struct EventHooks {
    events: std::rc::Rc<std::cell::RefCell<Vec<HeadlessEvent>>>,
}

impl EventHooks {
    /// Hooks plus a handle to the buffer they fill
    pub fn new() -> (Self, EventBuffer) {
        let hooks = Self::default();
        let buffer = EventBuffer {
            events: hooks.events.clone(),
        };
        (hooks, buffer)
    }

    fn record(&mut self, event: HeadlessEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl TabHooks for EventHooks {
    fn on_tab_click(&mut self, target: &HookTarget) {
        self.record(HeadlessEvent::tab_clicked(target));
    }

    fn on_tab_changed(&mut self, target: &HookTarget) {
        self.record(HeadlessEvent::tab_changed(target));
    }

    fn on_tab_created(&mut self, target: &HookTarget) {
        self.record(HeadlessEvent::tab_created(target));
    }
}

/// Read side of [`EventHooks`]
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: std::rc::Rc<std::cell::RefCell<Vec<HeadlessEvent>>>,
}

impl EventBuffer {
    pub fn drain(&self) -> Vec<HeadlessEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabshell_core::TabIdentity;

    fn to_value(event: &HeadlessEvent) -> serde_json::Value {
        let json = serde_json::to_string(event).expect("serialization failed");
        serde_json::from_str(&json).expect("invalid JSON")
    }

    #[test]
    fn test_navigate_serialization() {
        let page = tabshell_app::fixture::PageBuilder::new().build();
        let event = HeadlessEvent::navigate("reports-q1", page.empty, "./reports/q1");
        let value = to_value(&event);

        assert_eq!(value["event"], "navigate");
        assert_eq!(value["identity"], "reports-q1");
        assert_eq!(value["url"], "./reports/q1");
        assert!(value["frame"].is_number());
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_hook_event_serialization() {
        let page = tabshell_app::fixture::PageBuilder::new().build();
        let target = HookTarget::new(page.wrapper, Some(TabIdentity::from_normalized("a-html")));
        let value = to_value(&HeadlessEvent::tab_created(&target));
        assert_eq!(value["event"], "tab_created");
        assert_eq!(value["identity"], "a-html");

        let pinned = HookTarget::new(page.wrapper, None);
        let value = to_value(&HeadlessEvent::tab_changed(&pinned));
        assert_eq!(value["event"], "tab_changed");
        assert!(value["identity"].is_null());
    }

    #[test]
    fn test_error_serialization() {
        let value = to_value(&HeadlessEvent::error("Connection failed".to_string(), true));
        assert_eq!(value["event"], "error");
        assert_eq!(value["message"], "Connection failed");
        assert_eq!(value["fatal"], true);
    }

    #[test]
    fn test_event_name_matches_tag() {
        for event in [
            HeadlessEvent::ready(3),
            HeadlessEvent::subscribe_color_scheme(),
            HeadlessEvent::loading_screen("a", 200),
            HeadlessEvent::error("x".to_string(), false),
        ] {
            assert_eq!(to_value(&event)["event"], event.event_name());
        }
    }

    #[test]
    fn test_write_to_emits_one_line() {
        let mut out = Vec::new();
        HeadlessEvent::ready(2).write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_parse_commands() {
        let cmd = Command::parse_line(r#"{"cmd":"click","id":"./a.html"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Click {
                id: "./a.html".to_string()
            }
        );

        let cmd = Command::parse_line(r#"{"cmd":"close","scope":"all-other"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Close {
                scope: CloseScope::AllOther,
                tab: None
            }
        );

        let cmd = Command::parse_line(r#"{"cmd":"scroll","direction":"left"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Scroll {
                direction: ScrollDirection::Left
            }
        );

        assert_eq!(
            Command::parse_line(r#"{"cmd":"quit"}"#).unwrap().unwrap(),
            Command::Quit
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        assert!(Command::parse_line("   ").is_none());
        assert!(Command::parse_line("// open the reports tab").is_none());
        assert!(Command::parse_line(r#"{"cmd":"explode"}"#).unwrap().is_err());
    }

    #[test]
    fn test_event_hooks_fill_buffer() {
        let page = tabshell_app::fixture::PageBuilder::new().build();
        let (mut hooks, buffer) = EventHooks::new();
        let target = HookTarget::new(page.wrapper, None);

        hooks.on_tab_click(&target);
        hooks.on_tab_changed(&target);

        let events = buffer.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name(), "tab_clicked");
        assert_eq!(events[1].event_name(), "tab_changed");
        assert!(buffer.drain().is_empty());
    }
}
