//! Menu binder: turns navigation links into tab triggers
//!
//! Binding is bookkeeping, not event listeners: a bound node is recorded
//! here, and a click on it (or inside it) is routed by [`MenuBinder::resolve_click`].
//! Links inserted after start are picked up from the document's mutation
//! records by [`MenuBinder::observe`].

use std::collections::{HashMap, HashSet};

use tabshell_core::markup::{
    ATTR_DISABLE, ATTR_HREF, ATTR_TOGGLE, ATTR_WIDGET, CLASS_NAV_ITEM, CLASS_NAV_LINK,
    DEFAULT_TAB_LABEL, IFRAME, LABEL_EXCLUDED_CLASSES,
};
use tabshell_core::prelude::*;
use tabshell_core::{
    is_unusable_reference, CloseScope, Document, Element, MutationRecord, NodeId, TabIdentity,
    Widget,
};

use crate::layout::ShellLayout;
use crate::tab::NavTarget;

/// A control affordance and what clicking it does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// A tab-strip button; activates its tab (or the pinned tab)
    TabNav,
    /// Close tabs; `owner` is the tab whose button holds the control
    Close {
        scope: CloseScope,
        owner: Option<TabIdentity>,
    },
    Fullscreen,
    ScrollLeft,
    ScrollRight,
}

/// What a click resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A navigation link that opens a tab
    Menu,
    Control(Control),
}

/// Tracks which nodes are bound and to what
#[derive(Debug, Default)]
pub struct MenuBinder {
    /// Navigation links already bound (the processed marker)
    processed: HashSet<NodeId>,

    /// Control affordances
    controls: HashMap<NodeId, Control>,
}

impl MenuBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a navigation link. Returns true only when newly bound.
    pub fn bind(&mut self, doc: &Document, node: NodeId) -> bool {
        if self.processed.contains(&node) || self.controls.contains_key(&node) {
            return false;
        }
        if !doc.contains(node) || is_excluded(doc, node) {
            trace!("Not binding excluded node {}", node);
            return false;
        }

        self.processed.insert(node);
        trace!("Bound menu item {}", node);
        true
    }

    pub fn bind_control(&mut self, node: NodeId, control: Control) {
        self.controls.insert(node, control);
    }

    /// Forget a node, e.g. when the engine destroys it
    pub fn unbind(&mut self, node: NodeId) {
        self.processed.remove(&node);
        self.controls.remove(&node);
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.processed.contains(&node)
    }

    pub fn control(&self, node: NodeId) -> Option<&Control> {
        self.controls.get(&node)
    }

    /// Bound navigation links, in node order
    pub fn bound_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.processed.iter().copied().collect();
        nodes.sort();
        nodes
    }

    /// Number of bound navigation links
    pub fn bound_count(&self) -> usize {
        self.processed.len()
    }

    /// Initial pass over the menus present at start.
    ///
    /// Binds `.nav-item > a.nav-link` under the sidebar, `.nav-item a.nav-link`
    /// under the header (when `use_navbar_items`) and any element already
    /// marked `data-lte-toggle="iframe"`.
    pub fn scan(&mut self, doc: &Document, layout: &ShellLayout, use_navbar_items: bool) -> usize {
        let mut candidates = Vec::new();

        if let Some(sidebar) = layout.sidebar {
            candidates.extend(doc.find_all(sidebar, is_nav_anchor).into_iter().filter(|&link| {
                doc.parent(link)
                    .is_some_and(|parent| doc.has_class(parent, CLASS_NAV_ITEM))
            }));
        }

        if let (true, Some(header)) = (use_navbar_items, layout.header) {
            candidates.extend(doc.find_all(header, is_nav_anchor).into_iter().filter(|&link| {
                doc.closest(link, |el| el.has_class(CLASS_NAV_ITEM))
                    .is_some_and(|item| item != link)
            }));
        }

        candidates.extend(doc.find_all(doc.body(), is_toggle_trigger));

        let bound = candidates
            .into_iter()
            .filter(|&node| self.bind(doc, node))
            .count();
        debug!("Initial scan bound {} menu items", bound);
        bound
    }

    /// Apply a batch of mutation records.
    ///
    /// Added nodes and their descendants marked `data-lte-toggle="iframe"`
    /// are bound; bindings of nodes that no longer exist are dropped.
    /// Menu items rendered after start must carry that marker: a plain
    /// `.nav-item > a.nav-link` is only picked up by the initial [`scan`].
    /// Returns how many nodes were newly bound.
    ///
    /// [`scan`]: MenuBinder::scan
    pub fn observe(&mut self, doc: &Document, records: &[MutationRecord]) -> usize {
        let mut bound = 0;

        for record in records {
            for &added in &record.added {
                if !doc.contains(added) {
                    continue;
                }
                if doc.element(added).is_some_and(is_toggle_trigger) && self.bind(doc, added) {
                    bound += 1;
                }
                for node in doc.find_all(added, is_toggle_trigger) {
                    if self.bind(doc, node) {
                        bound += 1;
                    }
                }
            }

            if !record.removed.is_empty() {
                self.processed.retain(|&node| doc.contains(node));
                self.controls.retain(|&node, _| doc.contains(node));
            }
        }

        if bound > 0 {
            debug!("Bound {} menu items inserted after start", bound);
        }
        bound
    }

    /// Route a click on `node` to the nearest bound node at or above it.
    ///
    /// Menu links are re-checked against the exclusion rules since their
    /// attributes may have changed after binding; an excluded link swallows
    /// the click.
    pub fn resolve_click(&self, doc: &Document, node: NodeId) -> Option<(NodeId, Binding)> {
        for candidate in doc.ancestors_inclusive(node) {
            if let Some(control) = self.controls.get(&candidate) {
                return Some((candidate, Binding::Control(control.clone())));
            }
            if self.processed.contains(&candidate) {
                if is_excluded(doc, candidate) {
                    debug!("Menu item {} is excluded at click time", candidate);
                    return None;
                }
                return Some((candidate, Binding::Menu));
            }
        }
        None
    }
}

fn is_nav_anchor(el: &Element) -> bool {
    el.is("a") && el.has_class(CLASS_NAV_LINK)
}

fn is_toggle_trigger(el: &Element) -> bool {
    el.attr(ATTR_TOGGLE) == Some(IFRAME)
}

/// The element a link's target is read from: the link itself when it has
/// an `href`, else its parent
fn target_source(doc: &Document, node: NodeId) -> Option<NodeId> {
    if doc.has_attr(node, ATTR_HREF) {
        Some(node)
    } else {
        doc.parent(node)
    }
}

/// The reference a link navigates to: its own `href`, else its parent's
pub fn effective_reference(doc: &Document, node: NodeId) -> Option<String> {
    target_source(doc, node)
        .and_then(|source| doc.attr(source, ATTR_HREF))
        .map(str::to_string)
}

/// Links that must never open a tab: placeholder and script hrefs, links
/// marked `data-lte-disable="iframe"`, and the reserved control widgets.
pub fn is_excluded(doc: &Document, node: NodeId) -> bool {
    let Some(el) = doc.element(node) else {
        return true;
    };

    if el.attr(ATTR_DISABLE) == Some(IFRAME) {
        return true;
    }

    let is_reserved = |attr: &str| {
        el.attr(attr)
            .and_then(Widget::from_attr)
            .is_some_and(|widget| widget.is_control())
    };
    if is_reserved(ATTR_WIDGET) || is_reserved(ATTR_TOGGLE) {
        return true;
    }

    effective_reference(doc, node).map_or(true, |reference| is_unusable_reference(&reference))
}

/// Build the navigation target of a link.
///
/// The label is the text of the first `<p>` inside the link, otherwise the
/// link's own text, ignoring badge (`.right`) and search-path decorations.
pub fn extract_target(doc: &Document, node: NodeId) -> Option<NavTarget> {
    let source = target_source(doc, node)?;
    let reference = doc.attr(source, ATTR_HREF)?.to_string();

    let label_root = doc.find(source, |el| el.is("p")).unwrap_or(source);
    let text = doc.text_content_excluding(label_root, |el| {
        LABEL_EXCLUDED_CLASSES.iter().any(|class| el.has_class(class))
    });
    let label = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let label = if label.is_empty() {
        DEFAULT_TAB_LABEL.to_string()
    } else {
        label
    };

    Some(NavTarget::new(reference, label))
}
