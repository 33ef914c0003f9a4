//! Attribute and class vocabulary shared with the host page markup.
//!
//! These strings are the wire format between the page and the engine; they
//! must match the markup byte for byte.

use serde::{Deserialize, Serialize};

pub const DATA_PREFIX: &str = "data-lte-";
pub const ATTR_TOGGLE: &str = "data-lte-toggle";
pub const ATTR_DISABLE: &str = "data-lte-disable";
pub const ATTR_WIDGET: &str = "data-lte-widget";
pub const ATTR_CLOSE_TYPE: &str = "data-type";

/// Value of `data-lte-toggle` / `data-lte-disable` that targets the engine
pub const IFRAME: &str = "iframe";

pub const ATTR_ID: &str = "id";
pub const ATTR_HREF: &str = "href";
pub const ATTR_SRC: &str = "src";
pub const ATTR_ROLE: &str = "role";
pub const ATTR_ARIA_CONTROLS: &str = "aria-controls";
pub const ATTR_ARIA_SELECTED: &str = "aria-selected";
pub const ATTR_ARIA_LABELLEDBY: &str = "aria-labelledby";
pub const ATTR_ARIA_LOADED: &str = "aria-loaded";
pub const ATTR_BS_TOGGLE: &str = "data-bs-toggle";
pub const ATTR_BS_TARGET: &str = "data-bs-target";

pub const CLASS_IFRAME_MODE: &str = "iframe-mode";
pub const CLASS_FULLSCREEN_MODE: &str = "iframe-mode-fullscreen";
pub const CLASS_CONTENT_WRAPPER: &str = "app-main";
pub const CLASS_SIDEBAR: &str = "app-sidebar";
pub const CLASS_HEADER: &str = "app-header";
pub const CLASS_NAVBAR: &str = "navbar";
pub const CLASS_NAVBAR_NAV: &str = "navbar-nav";
pub const CLASS_NAV_ITEM: &str = "nav-item";
pub const CLASS_NAV_LINK: &str = "nav-link";
pub const CLASS_TAB_CONTENT: &str = "tab-content";
pub const CLASS_TAB_EMPTY: &str = "tab-empty";
pub const CLASS_TAB_LOADING: &str = "tab-loading";
pub const CLASS_TAB_PANE: &str = "tab-pane";
pub const CLASS_FADE: &str = "fade";
pub const CLASS_ACTIVE: &str = "active";
pub const CLASS_SHOW: &str = "show";
pub const CLASS_HIDDEN: &str = "d-none";
pub const CLASS_CLOSE_BUTTON: &str = "btn-iframe-close";

/// Icon classes of the close affordance inside each tab button
pub const CLOSE_ICON: &str = "bi bi-x-circle-fill";

/// Descendants of a menu link that are not part of its label
pub const LABEL_EXCLUDED_CLASSES: &[&str] = &["right", "search-path"];

pub const DEFAULT_TAB_LABEL: &str = "New Tab";

/// Reserved control affordances marked with `data-lte-widget`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    Close,
    ScrollLeft,
    ScrollRight,
    Fullscreen,
    PageContent,
}

impl Widget {
    pub const ALL: [Widget; 5] = [
        Widget::Close,
        Widget::ScrollLeft,
        Widget::ScrollRight,
        Widget::Fullscreen,
        Widget::PageContent,
    ];

    pub fn as_attr(&self) -> &'static str {
        match self {
            Widget::Close => "iframe-close",
            Widget::ScrollLeft => "iframe-scrollleft",
            Widget::ScrollRight => "iframe-scrollright",
            Widget::Fullscreen => "iframe-fullscreen",
            Widget::PageContent => "iframe-page-content",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_attr() == value)
    }

    /// Controls that can never be navigation targets
    pub fn is_control(&self) -> bool {
        !matches!(self, Widget::PageContent)
    }
}

impl std::fmt::Display for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_attr())
    }
}

/// Which tabs a close action destroys, from the control's `data-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseScope {
    /// Every tab except the pinned page-content tab
    All,
    /// Every tab except the active one and the pinned page-content tab
    AllOther,
    /// A single tab
    OnlyThis,
}

impl CloseScope {
    pub fn as_attr(&self) -> &'static str {
        match self {
            CloseScope::All => "all",
            CloseScope::AllOther => "all-other",
            CloseScope::OnlyThis => "only-this",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "all" => Some(CloseScope::All),
            "all-other" => Some(CloseScope::AllOther),
            "only-this" => Some(CloseScope::OnlyThis),
            _ => None,
        }
    }
}

impl std::fmt::Display for CloseScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_attr())
    }
}

/// Split a space-separated class list, skipping empty segments
pub fn class_list(classes: &str) -> impl Iterator<Item = &str> {
    classes.split_whitespace()
}
