//! Tab lifecycle handlers
//!
//! Creation, activation, the loading placeholder and load completion.
//! Every activation path goes through [`show_view`], which restores the
//! "exactly one active view" rendering before anything else happens.

use tabshell_core::markup::{
    ATTR_ARIA_CONTROLS, ATTR_ARIA_LABELLEDBY, ATTR_ARIA_LOADED, ATTR_ARIA_SELECTED,
    ATTR_BS_TARGET, ATTR_BS_TOGGLE, ATTR_ROLE, ATTR_SRC, ATTR_WIDGET, CLASS_ACTIVE,
    CLASS_CLOSE_BUTTON, CLASS_FADE, CLASS_HIDDEN, CLASS_IFRAME_MODE, CLASS_NAV_LINK, CLASS_SHOW,
    CLASS_TAB_PANE, CLOSE_ICON,
};
use tabshell_core::prelude::*;
use tabshell_core::{resolve_identity, CloseScope, ElementSpec, NodeId, TabIdentity, Widget};

use crate::binder::{effective_reference, Control};
use crate::hooks::{HookTarget, TabHooks};
use crate::layout::ShellLayout;
use crate::message::ThemeModeMessage;
use crate::state::{ActiveView, ShellState};
use crate::tab::{NavTarget, TabEntry};

use super::{UpdateAction, UpdateResult};

const DISPLAY_BLOCK: &str = "block";
const DISPLAY_NONE: &str = "none";

// ─────────────────────────────────────────────────────────────────
// Creation
// ─────────────────────────────────────────────────────────────────

/// Open a tab for `target`, or reuse the open one with the same identity
pub fn open_tab(
    state: &mut ShellState,
    hooks: &mut dyn TabHooks,
    target: NavTarget,
    switch: bool,
) -> UpdateResult {
    let Some(layout) = state.layout.clone() else {
        return UpdateResult::none();
    };

    let base = match resolve_identity(&target.reference) {
        Ok(identity) => identity,
        Err(e) => {
            debug!("Not opening a tab: {}", e);
            return UpdateResult::none();
        }
    };

    let identity = if state.settings.allow_duplicates {
        state
            .registry
            .unique_identity(&base, &mut rand::thread_rng())
    } else if state.registry.contains(&base) {
        debug!("Tab '{}' already open, switching to it", base);
        let reload = state.settings.allow_reload;
        return activate(state, hooks, &base, reload);
    } else {
        base
    };

    let (nav, pane, frame) = insert_tab_nodes(state, &layout, &identity, &target.label);

    let entry = TabEntry::new(identity.clone(), target.clone(), nav, pane, frame);
    if let Err(e) = state.registry.register(entry) {
        warn!("Discarding tab nodes for '{}': {}", identity, e);
        state.document.remove(nav);
        state.document.remove(pane);
        return UpdateResult::none();
    }

    state.binder.bind_control(nav, Control::TabNav);
    if let Some(close) = state.document.find(nav, |el| {
        el.attr(ATTR_WIDGET) == Some(Widget::Close.as_attr())
    }) {
        state.binder.bind_control(
            close,
            Control::Close {
                scope: CloseScope::OnlyThis,
                owner: Some(identity.clone()),
            },
        );
    }

    info!("Created tab '{}' for {}", identity, target.reference);

    let mut result = UpdateResult::none();
    if switch {
        result.merge(activate(state, hooks, &identity, false));
    }

    state
        .document
        .set_attr(frame, ATTR_SRC, &target.reference);
    if let Some(entry) = state.registry.lookup_mut(&identity) {
        entry.mark_loading();
    }
    result.push(UpdateAction::Navigate {
        identity: identity.clone(),
        frame,
        url: target.reference,
    });

    hooks.on_tab_created(&HookTarget::new(nav, Some(identity)));
    result
}

/// Build and insert the tab-strip button and the pane with its frame
fn insert_tab_nodes(
    state: &mut ShellState,
    layout: &ShellLayout,
    identity: &TabIdentity,
    label: &str,
) -> (NodeId, NodeId, NodeId) {
    let nav_id = identity.nav_id();
    let pane_id = identity.pane_id();
    let doc = &mut state.document;

    let nav = doc.insert(
        layout.tab_strip,
        ElementSpec::new("button")
            .class(CLASS_NAV_LINK)
            .id(&nav_id)
            .attr(ATTR_BS_TOGGLE, "tab")
            .attr(ATTR_BS_TARGET, &format!("#{}", pane_id))
            .attr(ATTR_ROLE, "tab")
            .attr(ATTR_ARIA_CONTROLS, &pane_id)
            .attr(ATTR_ARIA_SELECTED, "false")
            .text(label)
            .child(
                ElementSpec::new("i")
                    .class(CLASS_CLOSE_BUTTON)
                    .class(CLOSE_ICON)
                    .attr(ATTR_WIDGET, Widget::Close.as_attr()),
            ),
    );

    let pane = doc.insert(
        layout.tab_content,
        ElementSpec::new("div")
            .class(CLASS_TAB_PANE)
            .class(CLASS_FADE)
            .id(&pane_id)
            .attr(ATTR_ROLE, "tabpanel")
            .attr(ATTR_ARIA_LABELLEDBY, &nav_id),
    );
    let frame = doc.create_element("iframe");
    doc.append_child(pane, frame);

    (nav, pane, frame)
}

// ─────────────────────────────────────────────────────────────────
// Activation
// ─────────────────────────────────────────────────────────────────

/// Make a registered tab the active one.
///
/// Unknown identities are a no-op: a click can race the tab's own closure.
/// `force_reload` only reloads a tab whose document has finished loading;
/// a tab still loading gets the loading placeholder and no new navigation.
pub fn activate(
    state: &mut ShellState,
    hooks: &mut dyn TabHooks,
    identity: &TabIdentity,
    force_reload: bool,
) -> UpdateResult {
    let Some(layout) = state.layout.clone() else {
        return UpdateResult::none();
    };
    let Some(entry) = state.registry.lookup(identity) else {
        debug!("No tab '{}' to activate", identity);
        return UpdateResult::none();
    };
    // Settled: the document finished a load and no reload is in flight
    let settled = entry.has_loaded() && !entry.is_loading();
    let (nav, frame, pane) = (entry.nav, entry.frame, entry.pane);

    show_view(state, &layout, Some((nav, pane)));
    state.active = ActiveView::Tab(identity.clone());

    let mut result = UpdateResult::none();
    match (settled, force_reload) {
        (true, true) => {
            debug!("Reloading tab '{}'", identity);
            if let Some(entry) = state.registry.lookup_mut(identity) {
                entry.mark_loading();
            }
            state.document.set_attr(frame, ATTR_ARIA_LOADED, "false");
            result.merge(show_loading(state, identity));
            result.push(UpdateAction::Reload {
                identity: identity.clone(),
                frame,
            });
        }
        (true, false) => hide_loading(state),
        _ => result.merge(show_loading(state, identity)),
    }

    sync_menu_items(state);
    hooks.on_tab_changed(&HookTarget::new(nav, Some(identity.clone())));
    result
}

/// Make the pinned page-content tab active, or show the empty placeholder
/// when the page has none
pub fn activate_page_content(state: &mut ShellState, hooks: &mut dyn TabHooks) -> UpdateResult {
    let Some(layout) = state.layout.clone() else {
        return UpdateResult::none();
    };

    match layout.page_content {
        Some(pinned) => {
            show_view(state, &layout, Some((pinned.nav, pinned.pane)));
            state.active = ActiveView::PageContent;
            hide_loading(state);
            sync_menu_items(state);
            hooks.on_tab_changed(&HookTarget::new(pinned.nav, None));
        }
        None => show_empty(state),
    }
    UpdateResult::none()
}

/// Show the empty placeholder with nothing else active
pub fn show_empty(state: &mut ShellState) {
    let Some(layout) = state.layout.clone() else {
        return;
    };

    show_view(state, &layout, None);

    let doc = &mut state.document;
    doc.remove_class(layout.empty, CLASS_HIDDEN);
    doc.add_class(layout.empty, CLASS_ACTIVE);
    doc.add_class(layout.empty, CLASS_SHOW);

    state.active = ActiveView::Empty;
    hide_loading(state);
    sync_menu_items(state);
}

/// Initial view at start: the pinned tab if the page has one, else empty
pub(crate) fn reset_view(state: &mut ShellState) {
    let Some(layout) = state.layout.clone() else {
        return;
    };

    if let Some(loading) = layout.loading {
        state.document.set_display(layout.empty, DISPLAY_BLOCK);
        state.document.set_display(loading, DISPLAY_NONE);
    }

    match layout.page_content {
        Some(pinned) => {
            show_view(state, &layout, Some((pinned.nav, pinned.pane)));
            state.active = ActiveView::PageContent;
        }
        None => show_empty(state),
    }
}

/// Deactivate every pane and tab button, then activate `target` if given
fn show_view(state: &mut ShellState, layout: &ShellLayout, target: Option<(NodeId, NodeId)>) {
    let header_classes = state.settings.header_active_class.clone();
    let doc = &mut state.document;

    doc.remove_class(layout.empty, CLASS_ACTIVE);
    if target.is_some() {
        doc.remove_class(layout.empty, CLASS_SHOW);
        doc.add_class(layout.empty, CLASS_HIDDEN);
    }

    let panes: Vec<NodeId> = doc
        .children(layout.tab_content)
        .iter()
        .copied()
        .filter(|&child| doc.has_class(child, CLASS_TAB_PANE))
        .collect();
    for pane in panes {
        doc.remove_class(pane, CLASS_ACTIVE);
        doc.remove_class(pane, CLASS_SHOW);
    }

    let navs: Vec<NodeId> = doc
        .children(layout.tab_strip)
        .iter()
        .copied()
        .filter(|&child| doc.has_class(child, CLASS_NAV_LINK))
        .collect();
    for nav in navs {
        doc.remove_class(nav, CLASS_ACTIVE);
        doc.remove_classes(nav, &header_classes);
        doc.set_attr(nav, ATTR_ARIA_SELECTED, "false");
    }

    let close_widget = |el: &tabshell_core::Element| {
        el.attr(ATTR_WIDGET) == Some(Widget::Close.as_attr())
    };
    for close in doc.find_all(doc.body(), close_widget) {
        doc.remove_class(close, CLASS_ACTIVE);
    }

    let Some((nav, pane)) = target else {
        return;
    };

    doc.add_class(pane, CLASS_ACTIVE);
    doc.add_class(pane, CLASS_SHOW);
    doc.set_attr(nav, ATTR_ARIA_SELECTED, "true");
    doc.add_class(nav, CLASS_ACTIVE);
    doc.add_classes(nav, &header_classes);

    if let Some(close) = doc.find(nav, close_widget) {
        doc.add_class(close, CLASS_ACTIVE);
    }
}

// ─────────────────────────────────────────────────────────────────
// Loading Placeholder
// ─────────────────────────────────────────────────────────────────

/// Show the loading placeholder for `identity` as the settings allow
fn show_loading(state: &mut ShellState, identity: &TabIdentity) -> UpdateResult {
    let Some(loading) = state.layout.as_ref().and_then(|layout| layout.loading) else {
        return UpdateResult::none();
    };

    let policy = state.settings.loading_screen;
    if !policy.is_enabled() {
        return UpdateResult::none();
    }

    match policy.delay() {
        Some(delay) => {
            // an earlier placeholder must not linger while the delay runs
            state.document.set_display(loading, DISPLAY_NONE);
            UpdateResult::action(UpdateAction::ScheduleLoadingScreen {
                identity: identity.clone(),
                delay,
            })
        }
        None => {
            state.document.set_display(loading, DISPLAY_BLOCK);
            UpdateResult::none()
        }
    }
}

fn hide_loading(state: &mut ShellState) {
    if let Some(loading) = state.layout.as_ref().and_then(|layout| layout.loading) {
        state.document.set_display(loading, DISPLAY_NONE);
    }
}

/// A delayed loading placeholder came due; show it only if its tab is
/// still the active one and still loading
pub fn handle_loading_screen_due(state: &mut ShellState, identity: &TabIdentity) -> UpdateResult {
    let still_loading = state.active.is_tab(identity)
        && state
            .registry
            .lookup(identity)
            .is_some_and(|entry| entry.is_loading());

    if !still_loading {
        trace!("Loading screen for '{}' no longer needed", identity);
        return UpdateResult::none();
    }

    if let Some(loading) = state.layout.as_ref().and_then(|layout| layout.loading) {
        state.document.set_display(loading, DISPLAY_BLOCK);
    }
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Load Completion
// ─────────────────────────────────────────────────────────────────

/// A frame signalled that its document finished loading
pub fn handle_frame_loaded(state: &mut ShellState, frame: NodeId) -> UpdateResult {
    let Some(identity) = state
        .registry
        .find_by_frame(frame)
        .map(|entry| entry.identity.clone())
    else {
        debug!("Load signal from untracked frame {}", frame);
        return UpdateResult::none();
    };

    let Some(entry) = state.registry.lookup_mut(&identity) else {
        return UpdateResult::none();
    };
    let handle = entry.mark_loaded();
    debug!(
        "Tab '{}' loaded (load #{})",
        identity, handle.generation
    );

    state.document.set_attr(frame, ATTR_ARIA_LOADED, "true");

    let mut result = UpdateResult::action(UpdateAction::DecorateFrame {
        frame,
        class: CLASS_IFRAME_MODE.to_string(),
    });

    if state.active.is_tab(&identity) {
        hide_loading(state);
    }

    if let (true, Some(dark)) = (state.settings.auto_dark_mode, state.dark_mode) {
        result.push(UpdateAction::PostMessage {
            frame,
            message: ThemeModeMessage {
                auto_dark_mode: dark,
            },
        });
    }

    result
}

// ─────────────────────────────────────────────────────────────────
// Menu Highlighting
// ─────────────────────────────────────────────────────────────────

/// Mark the menu links pointing at the active tab's document as active
pub(crate) fn sync_menu_items(state: &mut ShellState) {
    if !state.settings.auto_item_active {
        return;
    }

    let active_reference = state
        .active_entry()
        .map(|entry| entry.target.reference.clone());

    for link in state.binder.bound_nodes() {
        let matches = active_reference.is_some()
            && effective_reference(&state.document, link) == active_reference;
        if matches {
            state.document.add_class(link, CLASS_ACTIVE);
        } else {
            state.document.remove_class(link, CLASS_ACTIVE);
        }
    }
}
