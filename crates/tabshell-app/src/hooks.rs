//! Lifecycle hooks exposed to the embedding application

use tabshell_core::{NodeId, TabIdentity};

/// What a hook is told about: the tab-strip button (or menu item) involved,
/// and the tab it belongs to when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookTarget {
    pub node: NodeId,
    pub identity: Option<TabIdentity>,
}

impl HookTarget {
    pub fn new(node: NodeId, identity: Option<TabIdentity>) -> Self {
        Self { node, identity }
    }
}

/// Callbacks invoked synchronously while a message is processed.
///
/// Every method defaults to doing nothing.
#[cfg_attr(test, mockall::automock)]
pub trait TabHooks {
    /// A tab-strip button was clicked, before its tab is activated
    fn on_tab_click(&mut self, _target: &HookTarget) {}

    /// A tab (or the pinned page-content tab) became the active one
    fn on_tab_changed(&mut self, _target: &HookTarget) {}

    /// A new tab's nodes were inserted and its navigation issued
    fn on_tab_created(&mut self, _target: &HookTarget) {}
}

/// Hooks that ignore every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl TabHooks for NoopHooks {}
