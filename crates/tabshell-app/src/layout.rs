//! Resolution of the host page structure the engine renders into

use tabshell_core::markup::{
    ATTR_ARIA_CONTROLS, ATTR_BS_TARGET, ATTR_WIDGET, CLASS_CONTENT_WRAPPER, CLASS_HEADER,
    CLASS_NAVBAR, CLASS_NAVBAR_NAV, CLASS_SIDEBAR, CLASS_TAB_CONTENT, CLASS_TAB_EMPTY,
    CLASS_TAB_LOADING,
};
use tabshell_core::prelude::*;
use tabshell_core::{Document, NodeId, Widget};

/// The host page's own content tab, exempt from bulk closure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedTab {
    pub nav: NodeId,
    pub pane: NodeId,
}

/// Nodes of the page structure, resolved once at start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLayout {
    /// `.app-main`
    pub wrapper: NodeId,
    /// `.app-main > .navbar .navbar-nav`
    pub tab_strip: NodeId,
    /// `.app-main > .tab-content`
    pub tab_content: NodeId,
    /// `.tab-content > .tab-empty`
    pub empty: NodeId,
    /// `.tab-content > .tab-loading`
    pub loading: Option<NodeId>,
    pub page_content: Option<PinnedTab>,
    pub sidebar: Option<NodeId>,
    pub header: Option<NodeId>,
}

impl ShellLayout {
    /// The content wrapper, the first structural element every check starts from
    pub fn find_wrapper(doc: &Document) -> Result<NodeId> {
        doc.find(doc.body(), |el| el.has_class(CLASS_CONTENT_WRAPPER))
            .ok_or_else(|| Error::missing_element(format!(".{}", CLASS_CONTENT_WRAPPER)))
    }

    /// Resolve every structural node, failing on the first required one missing
    pub fn resolve(doc: &Document) -> Result<Self> {
        let wrapper = Self::find_wrapper(doc)?;

        let tab_strip = child_with_class(doc, wrapper, CLASS_NAVBAR)
            .and_then(|navbar| doc.find(navbar, |el| el.has_class(CLASS_NAVBAR_NAV)))
            .ok_or_else(|| {
                Error::missing_element(format!(
                    ".{} > .{} .{}",
                    CLASS_CONTENT_WRAPPER, CLASS_NAVBAR, CLASS_NAVBAR_NAV
                ))
            })?;

        let tab_content = child_with_class(doc, wrapper, CLASS_TAB_CONTENT).ok_or_else(|| {
            Error::missing_element(format!(".{} > .{}", CLASS_CONTENT_WRAPPER, CLASS_TAB_CONTENT))
        })?;

        let empty = child_with_class(doc, tab_content, CLASS_TAB_EMPTY).ok_or_else(|| {
            Error::missing_element(format!(".{} > .{}", CLASS_TAB_CONTENT, CLASS_TAB_EMPTY))
        })?;

        let loading = child_with_class(doc, tab_content, CLASS_TAB_LOADING);
        let page_content = resolve_pinned(doc);
        let sidebar = doc.find(doc.body(), |el| el.has_class(CLASS_SIDEBAR));
        let header = doc.find(doc.body(), |el| el.has_class(CLASS_HEADER));

        debug!(
            "Resolved layout: strip={} content={} loading={:?} pinned={:?}",
            tab_strip, tab_content, loading, page_content
        );

        Ok(Self {
            wrapper,
            tab_strip,
            tab_content,
            empty,
            loading,
            page_content,
            sidebar,
            header,
        })
    }
}

fn child_with_class(doc: &Document, parent: NodeId, class: &str) -> Option<NodeId> {
    doc.children(parent)
        .iter()
        .copied()
        .find(|&child| doc.has_class(child, class))
}

/// The pinned nav names its pane through `aria-controls` (or `data-bs-target`)
fn resolve_pinned(doc: &Document) -> Option<PinnedTab> {
    let nav = doc.find(doc.body(), |el| {
        el.attr(ATTR_WIDGET) == Some(Widget::PageContent.as_attr())
    })?;

    let pane_ref = doc
        .attr(nav, ATTR_ARIA_CONTROLS)
        .or_else(|| doc.attr(nav, ATTR_BS_TARGET))?;

    match doc.get_element_by_id(pane_ref.trim_start_matches('#')) {
        Some(pane) => Some(PinnedTab { nav, pane }),
        None => {
            warn!("Page-content tab points at missing pane {:?}", pane_ref);
            None
        }
    }
}
