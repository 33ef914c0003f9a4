//! Engine state (Model in TEA pattern)

use tabshell_core::markup::{CLASS_ACTIVE, CLASS_HIDDEN, CLASS_IFRAME_MODE};
use tabshell_core::{Document, TabIdentity};

use crate::binder::MenuBinder;
use crate::config::ShellSettings;
use crate::layout::ShellLayout;
use crate::registry::TabRegistry;
use crate::tab::TabEntry;

/// Which view currently fills the tab content area
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveView {
    /// The empty placeholder
    #[default]
    Empty,
    /// The pinned page-content tab
    PageContent,
    Tab(TabIdentity),
}

impl ActiveView {
    pub fn identity(&self) -> Option<&TabIdentity> {
        match self {
            ActiveView::Tab(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_tab(&self, identity: &TabIdentity) -> bool {
        self.identity() == Some(identity)
    }
}

/// Complete engine state
#[derive(Debug)]
pub struct ShellState {
    pub document: Document,

    pub settings: ShellSettings,

    pub registry: TabRegistry,

    pub binder: MenuBinder,

    /// Resolved page structure; `None` until the engine starts
    pub layout: Option<ShellLayout>,

    pub active: ActiveView,

    /// Body is in `iframe-mode-fullscreen`
    pub fullscreen: bool,

    /// Last reported system colour scheme, if any
    pub dark_mode: Option<bool>,
}

impl ShellState {
    pub fn new(document: Document, settings: ShellSettings) -> Self {
        Self {
            document,
            settings,
            registry: TabRegistry::new(),
            binder: MenuBinder::new(),
            layout: None,
            active: ActiveView::Empty,
            fullscreen: false,
            dark_mode: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.layout.is_some()
    }

    /// The page is itself an embedded document of another shell
    pub fn is_embedded(&self) -> bool {
        self.document
            .has_class(self.document.body(), CLASS_IFRAME_MODE)
    }

    pub fn active_entry(&self) -> Option<&TabEntry> {
        self.active
            .identity()
            .and_then(|identity| self.registry.lookup(identity))
    }

    /// The empty placeholder is currently shown
    pub fn is_empty_shown(&self) -> bool {
        self.layout.as_ref().is_some_and(|layout| {
            !self.document.has_class(layout.empty, CLASS_HIDDEN)
                && self.document.has_class(layout.empty, CLASS_ACTIVE)
        })
    }

    /// The loading placeholder is currently shown
    pub fn is_loading_shown(&self) -> bool {
        self.layout
            .as_ref()
            .and_then(|layout| layout.loading)
            .is_some_and(|loading| self.document.display(loading) == Some("block"))
    }
}
