//! Tab closure handlers
//!
//! Bulk scopes remove entries directly and synchronously, one by one. The
//! pinned page-content tab is never a registry entry, so no scope reaches it.

use tabshell_core::prelude::*;
use tabshell_core::{CloseScope, TabIdentity};

use crate::hooks::TabHooks;
use crate::state::{ActiveView, ShellState};
use crate::tab::TabEntry;

use super::lifecycle::{activate, activate_page_content, show_empty};
use super::UpdateResult;

/// Close tabs in `scope`. For `only-this`, `identity` names the tab; with
/// no identity the active tab is closed.
pub fn close_tabs(
    state: &mut ShellState,
    hooks: &mut dyn TabHooks,
    scope: CloseScope,
    identity: Option<TabIdentity>,
) -> UpdateResult {
    if !state.is_started() {
        return UpdateResult::none();
    }

    match scope {
        CloseScope::All => {
            let closed = state
                .registry
                .identities()
                .iter()
                .filter_map(|identity| destroy_entry(state, identity))
                .count();
            info!("Closed all tabs ({})", closed);
            show_empty(state);
            UpdateResult::none()
        }

        CloseScope::AllOther => {
            let keep = state.active.identity().cloned();
            let closed = state
                .registry
                .identities()
                .iter()
                .filter(|identity| Some(*identity) != keep.as_ref())
                .filter_map(|identity| destroy_entry(state, identity))
                .count();
            info!("Closed {} other tabs", closed);

            if state.active == ActiveView::Empty {
                show_empty(state);
            }
            UpdateResult::none()
        }

        CloseScope::OnlyThis => {
            let Some(target) = identity.or_else(|| state.active.identity().cloned()) else {
                debug!("No tab to close");
                return UpdateResult::none();
            };
            if destroy_entry(state, &target).is_none() {
                return UpdateResult::none();
            }
            info!("Closed tab '{}'", target);

            match state.registry.first().map(|entry| entry.identity.clone()) {
                Some(first) => activate(state, hooks, &first, false),
                None => activate_page_content(state, hooks),
            }
        }
    }
}

/// Unregister a tab and remove its nodes. Unknown identities are a no-op.
pub(crate) fn destroy_entry(state: &mut ShellState, identity: &TabIdentity) -> Option<TabEntry> {
    let entry = match state.registry.unregister(identity) {
        Ok(entry) => entry,
        Err(e) => {
            debug!("Nothing to close: {}", e);
            return None;
        }
    };

    let doc = &mut state.document;
    let mut bound = doc.descendants(entry.nav);
    bound.push(entry.nav);
    for node in bound {
        state.binder.unbind(node);
    }
    doc.remove(entry.nav);
    doc.remove(entry.pane);

    if state.active.is_tab(identity) {
        state.active = ActiveView::Empty;
    }

    trace!("Destroyed nodes of tab '{}'", identity);
    Some(entry)
}
