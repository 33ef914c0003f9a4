//! Main update function - handles state transitions (TEA pattern)

use tabshell_core::prelude::*;
use tabshell_core::NodeId;

use crate::binder::{extract_target, Binding, Control};
use crate::hooks::{HookTarget, TabHooks};
use crate::message::{Message, ScrollDirection};
use crate::state::ShellState;

use super::{close, lifecycle, presentation, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and the host actions to perform
pub fn update(state: &mut ShellState, hooks: &mut dyn TabHooks, message: Message) -> UpdateResult {
    if !state.is_started() {
        debug!("Engine not started, dropping {:?}", message);
        return UpdateResult::none();
    }

    match message {
        Message::Click { node } => handle_click(state, hooks, node),

        // ─────────────────────────────────────────────────────────
        // Tab Lifecycle
        // ─────────────────────────────────────────────────────────
        Message::OpenTab { target, switch } => {
            let switch = switch.unwrap_or(state.settings.auto_show_new_tab);
            lifecycle::open_tab(state, hooks, target, switch)
        }

        Message::ActivateTab { identity, reload } => {
            lifecycle::activate(state, hooks, &identity, reload)
        }

        Message::ActivatePageContent => lifecycle::activate_page_content(state, hooks),

        Message::CloseTabs { scope, identity } => close::close_tabs(state, hooks, scope, identity),

        // ─────────────────────────────────────────────────────────
        // Host Signals
        // ─────────────────────────────────────────────────────────
        Message::FrameLoaded { frame } => lifecycle::handle_frame_loaded(state, frame),

        Message::LoadingScreenDue { identity } => {
            lifecycle::handle_loading_screen_due(state, &identity)
        }

        Message::ThemeChanged { dark } => presentation::propagate_theme_mode(state, dark),

        Message::DomMutated => {
            let records = state.document.take_records();
            state.binder.observe(&state.document, &records);
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Presentation
        // ─────────────────────────────────────────────────────────
        Message::ToggleFullscreen => presentation::toggle_fullscreen(state),
        Message::Scroll(direction) => presentation::scroll(state, direction),
    }
}

/// Route a click to whatever bound node it landed in
fn handle_click(state: &mut ShellState, hooks: &mut dyn TabHooks, node: NodeId) -> UpdateResult {
    if !state.document.is_connected(node) {
        debug!("Click on detached node {}", node);
        return UpdateResult::none();
    }

    let Some((bound, binding)) = state.binder.resolve_click(&state.document, node) else {
        trace!("Click on {} hit nothing bound", node);
        return UpdateResult::none();
    };

    match binding {
        Binding::Menu => match extract_target(&state.document, bound) {
            Some(target) => UpdateResult::message(Message::OpenTab {
                target,
                switch: None,
            }),
            None => UpdateResult::none(),
        },

        Binding::Control(Control::TabNav) => {
            let identity = state
                .registry
                .find_by_nav(bound)
                .map(|entry| entry.identity.clone());
            hooks.on_tab_click(&HookTarget::new(bound, identity.clone()));

            let is_pinned = state
                .layout
                .as_ref()
                .and_then(|layout| layout.page_content)
                .is_some_and(|pinned| pinned.nav == bound);

            match identity {
                Some(identity) => UpdateResult::message(Message::ActivateTab {
                    identity,
                    reload: false,
                }),
                None if is_pinned => UpdateResult::message(Message::ActivatePageContent),
                None => UpdateResult::none(),
            }
        }

        Binding::Control(Control::Close { scope, owner }) => {
            UpdateResult::message(Message::CloseTabs {
                scope,
                identity: owner,
            })
        }

        Binding::Control(Control::Fullscreen) => UpdateResult::message(Message::ToggleFullscreen),

        Binding::Control(Control::ScrollLeft) => {
            UpdateResult::message(Message::Scroll(ScrollDirection::Left))
        }

        Binding::Control(Control::ScrollRight) => {
            UpdateResult::message(Message::Scroll(ScrollDirection::Right))
        }
    }
}
