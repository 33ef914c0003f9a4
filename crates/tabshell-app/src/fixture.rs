//! Standard shell page used by the headless runner and tests
//!
//! Builds the markup an admin-dashboard page provides: a header navbar, a
//! sidebar menu and the `.app-main.iframe-mode` wrapper with its tab strip,
//! toolbar widgets and tab content area.

use tabshell_core::markup::{
    ATTR_ARIA_CONTROLS, ATTR_BS_TARGET, ATTR_CLOSE_TYPE, ATTR_HREF, ATTR_ROLE, ATTR_TOGGLE,
    ATTR_WIDGET, CLASS_CONTENT_WRAPPER, CLASS_FADE, CLASS_HEADER, CLASS_IFRAME_MODE, CLASS_NAVBAR,
    CLASS_NAVBAR_NAV, CLASS_NAV_ITEM, CLASS_NAV_LINK, CLASS_SIDEBAR, CLASS_TAB_CONTENT,
    CLASS_TAB_EMPTY, CLASS_TAB_LOADING, CLASS_TAB_PANE, IFRAME,
};
use tabshell_core::{CloseScope, Document, ElementSpec, NodeId, Widget};

pub const PAGE_CONTENT_PANE_ID: &str = "panel-page-content";
pub const PAGE_CONTENT_NAV_ID: &str = "tab-page-content";

/// Sidebar menu item: `li.nav-item > a.nav-link[href] > p{label}`
pub fn menu_item(href: &str, label: &str) -> ElementSpec {
    ElementSpec::new("li").class(CLASS_NAV_ITEM).child(
        ElementSpec::new("a")
            .class(CLASS_NAV_LINK)
            .attr(ATTR_HREF, href)
            .child(ElementSpec::new("i").class("nav-icon bi bi-circle"))
            .child(ElementSpec::new("p").text(label)),
    )
}

/// Menu item rendered after start by other page code; carries the
/// `data-lte-toggle="iframe"` marker the binder watches for.
pub fn dynamic_menu_item(href: &str, label: &str, dom_id: Option<&str>) -> ElementSpec {
    let mut link = ElementSpec::new("a")
        .class(CLASS_NAV_LINK)
        .attr(ATTR_HREF, href)
        .attr(ATTR_TOGGLE, IFRAME)
        .child(ElementSpec::new("p").text(label));
    if let Some(id) = dom_id {
        link = link.id(id);
    }
    ElementSpec::new("li").class(CLASS_NAV_ITEM).child(link)
}

fn header_item(href: &str, label: &str) -> ElementSpec {
    ElementSpec::new("li").class(CLASS_NAV_ITEM).child(
        ElementSpec::new("a")
            .class(CLASS_NAV_LINK)
            .attr(ATTR_HREF, href)
            .text(label),
    )
}

fn widget(widget: Widget, text: &str) -> ElementSpec {
    ElementSpec::new("a")
        .class(CLASS_NAV_LINK)
        .attr(ATTR_HREF, "#")
        .attr(ATTR_WIDGET, widget.as_attr())
        .attr(ATTR_ROLE, "button")
        .text(text)
}

/// A built page and handles to its landmarks
#[derive(Debug)]
pub struct Page {
    pub doc: Document,
    pub wrapper: NodeId,
    pub tab_strip: NodeId,
    pub tab_content: NodeId,
    pub empty: NodeId,
    pub loading: Option<NodeId>,
    pub sidebar_menu: NodeId,
    pub header_menu: NodeId,
    pub page_content: Option<(NodeId, NodeId)>,
    pub fullscreen: Option<NodeId>,
    pub scroll_left: Option<NodeId>,
    pub scroll_right: Option<NodeId>,
    pub close_all: Option<NodeId>,
    pub close_all_other: Option<NodeId>,
    pub close_active: Option<NodeId>,
}

impl Page {
    /// First link in the document whose `href` is exactly `href`
    pub fn link(&self, href: &str) -> Option<NodeId> {
        self.doc
            .find(self.doc.body(), |el| el.is("a") && el.attr(ATTR_HREF) == Some(href))
    }
}

/// Builder for [`Page`]
#[derive(Debug, Clone)]
pub struct PageBuilder {
    items: Vec<(String, String)>,
    header_items: Vec<(String, String)>,
    page_content: bool,
    loading: bool,
    toolbar: bool,
    iframe_mode: bool,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            header_items: Vec::new(),
            page_content: false,
            loading: true,
            toolbar: true,
            iframe_mode: true,
        }
    }

    pub fn item(mut self, href: &str, label: &str) -> Self {
        self.items.push((href.to_string(), label.to_string()));
        self
    }

    pub fn header_item(mut self, href: &str, label: &str) -> Self {
        self.header_items.push((href.to_string(), label.to_string()));
        self
    }

    /// Add the pinned page-content tab
    pub fn with_page_content(mut self) -> Self {
        self.page_content = true;
        self
    }

    pub fn without_loading(mut self) -> Self {
        self.loading = false;
        self
    }

    pub fn without_toolbar(mut self) -> Self {
        self.toolbar = false;
        self
    }

    /// Leave `iframe-mode` off the wrapper, as on a page that did not opt in
    pub fn without_iframe_mode(mut self) -> Self {
        self.iframe_mode = false;
        self
    }

    pub fn build(self) -> Page {
        let mut doc = Document::new();
        let body = doc.body();

        let header = doc.insert(body, ElementSpec::new("nav").class(CLASS_HEADER));
        let header_menu = doc.insert(header, ElementSpec::new("ul").class(CLASS_NAVBAR_NAV));
        for (href, label) in &self.header_items {
            doc.insert(header_menu, header_item(href, label));
        }

        let sidebar = doc.insert(body, ElementSpec::new("aside").class(CLASS_SIDEBAR));
        let sidebar_nav = doc.insert(sidebar, ElementSpec::new("nav"));
        let sidebar_menu = doc.insert(
            sidebar_nav,
            ElementSpec::new("ul")
                .class("nav sidebar-menu flex-column")
                .attr(ATTR_ROLE, "menu"),
        );
        for (href, label) in &self.items {
            doc.insert(sidebar_menu, menu_item(href, label));
        }

        let wrapper_class = if self.iframe_mode {
            format!("{} {}", CLASS_CONTENT_WRAPPER, CLASS_IFRAME_MODE)
        } else {
            CLASS_CONTENT_WRAPPER.to_string()
        };
        let wrapper = doc.insert(body, ElementSpec::new("main").class(&wrapper_class));
        let navbar = doc.insert(
            wrapper,
            ElementSpec::new("div").class(&format!("{} navbar-expand", CLASS_NAVBAR)),
        );

        let mut scroll_left = None;
        let mut scroll_right = None;
        let mut fullscreen = None;
        let mut close_all = None;
        let mut close_all_other = None;
        let mut close_active = None;

        if self.toolbar {
            scroll_left = Some(doc.insert(navbar, widget(Widget::ScrollLeft, "<")));
        }

        let tab_strip = doc.insert(
            navbar,
            ElementSpec::new("ul")
                .class(&format!("{} overflow-hidden", CLASS_NAVBAR_NAV))
                .attr(ATTR_ROLE, "tablist"),
        );

        if self.toolbar {
            scroll_right = Some(doc.insert(navbar, widget(Widget::ScrollRight, ">")));
            fullscreen = Some(doc.insert(
                navbar,
                widget(Widget::Fullscreen, "").child(ElementSpec::new("i").class("bi bi-fullscreen")),
            ));
            for (scope, slot) in [
                (CloseScope::All, &mut close_all),
                (CloseScope::AllOther, &mut close_all_other),
                (CloseScope::OnlyThis, &mut close_active),
            ] {
                *slot = Some(doc.insert(
                    navbar,
                    widget(Widget::Close, scope.as_attr()).attr(ATTR_CLOSE_TYPE, scope.as_attr()),
                ));
            }
        }

        let tab_content = doc.insert(wrapper, ElementSpec::new("div").class(CLASS_TAB_CONTENT));
        let empty = doc.insert(
            tab_content,
            ElementSpec::new("div")
                .class(&format!("{} {}", CLASS_TAB_EMPTY, CLASS_FADE))
                .text("No tab selected!"),
        );
        let loading = self.loading.then(|| {
            doc.insert(
                tab_content,
                ElementSpec::new("div")
                    .class(&format!("{} {}", CLASS_TAB_LOADING, CLASS_FADE))
                    .text("Tab is loading"),
            )
        });

        let page_content = self.page_content.then(|| {
            let nav = doc.insert(
                tab_strip,
                ElementSpec::new("button")
                    .class(CLASS_NAV_LINK)
                    .id(PAGE_CONTENT_NAV_ID)
                    .attr(ATTR_WIDGET, Widget::PageContent.as_attr())
                    .attr(ATTR_BS_TARGET, &format!("#{}", PAGE_CONTENT_PANE_ID))
                    .attr(ATTR_ARIA_CONTROLS, PAGE_CONTENT_PANE_ID)
                    .attr(ATTR_ROLE, "tab")
                    .text("Dashboard"),
            );
            let pane = doc.insert(
                tab_content,
                ElementSpec::new("div")
                    .class(&format!("{} {}", CLASS_TAB_PANE, CLASS_FADE))
                    .id(PAGE_CONTENT_PANE_ID)
                    .attr(ATTR_ROLE, "tabpanel")
                    .text("Dashboard content"),
            );
            (nav, pane)
        });

        // Building the page is not something the engine should observe
        doc.take_records();

        Page {
            doc,
            wrapper,
            tab_strip,
            tab_content,
            empty,
            loading,
            sidebar_menu,
            header_menu,
            page_content,
            fullscreen,
            scroll_left,
            scroll_right,
            close_all,
            close_all_other,
            close_active,
        }
    }
}
