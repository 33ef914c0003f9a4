//! Engine - owns the document, state and hooks of one shell page
//!
//! The engine is the single path through which the tab strip and panes are
//! mutated. Hosts feed it [`Message`]s and perform the [`UpdateAction`]s it
//! returns. Pending mutation records are delivered to the menu binder before
//! and after every message, so links other code inserts are bound without
//! any explicit call.

use tabshell_core::markup::{ATTR_CLOSE_TYPE, ATTR_WIDGET, CLASS_IFRAME_MODE, CLASS_NAV_LINK};
use tabshell_core::prelude::*;
use tabshell_core::{CloseScope, Document, NodeId, Widget};

use crate::binder::Control;
use crate::config::ShellSettings;
use crate::handler::{lifecycle, update, UpdateAction};
use crate::hooks::{NoopHooks, TabHooks};
use crate::layout::ShellLayout;
use crate::message::Message;
use crate::registry::TabRegistry;
use crate::state::{ActiveView, ShellState};

/// Why [`Engine::init`] did not start the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `init` or `start` already ran on this engine
    AlreadyInitialized,
    /// The page is itself an embedded document (`body.iframe-mode`)
    Embedded,
    /// `auto_iframe_mode` is off; the host must call [`Engine::start`]
    AutoModeDisabled,
    /// The content wrapper is missing or not marked `iframe-mode`
    NotOptedIn,
    /// The page lacks a required structural element
    IncompletePage,
}

/// Outcome of [`Engine::init`]
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    Started(Vec<UpdateAction>),
    Skipped(SkipReason),
}

impl InitOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, InitOutcome::Started(_))
    }
}

/// One tab/iframe session engine instance
pub struct Engine {
    state: ShellState,
    hooks: Box<dyn TabHooks>,
    initialized: bool,
}

impl Engine {
    pub fn new(document: Document, settings: ShellSettings) -> Self {
        Self::with_hooks(document, settings, NoopHooks)
    }

    pub fn with_hooks(
        document: Document,
        settings: ShellSettings,
        hooks: impl TabHooks + 'static,
    ) -> Self {
        Self {
            state: ShellState::new(document, settings),
            hooks: Box::new(hooks),
            initialized: false,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Startup
    // ─────────────────────────────────────────────────────────

    /// Start automatically if the page opted in.
    ///
    /// Never fails: every reason not to start is reported as
    /// [`InitOutcome::Skipped`] and the page is left untouched.
    pub fn init(&mut self) -> InitOutcome {
        if self.initialized {
            return InitOutcome::Skipped(SkipReason::AlreadyInitialized);
        }
        if self.state.is_embedded() {
            debug!("Page is an embedded document, not starting");
            return InitOutcome::Skipped(SkipReason::Embedded);
        }
        if !self.state.settings.auto_iframe_mode {
            debug!("auto_iframe_mode is off, waiting for an explicit start");
            return InitOutcome::Skipped(SkipReason::AutoModeDisabled);
        }

        let opted_in = ShellLayout::find_wrapper(&self.state.document)
            .map(|wrapper| self.state.document.has_class(wrapper, CLASS_IFRAME_MODE))
            .unwrap_or(false);
        if !opted_in {
            debug!("Content wrapper is not in iframe mode, not starting");
            return InitOutcome::Skipped(SkipReason::NotOptedIn);
        }

        match self.start() {
            Ok(actions) => InitOutcome::Started(actions),
            Err(e) => {
                warn!("Not starting: {}", e);
                InitOutcome::Skipped(SkipReason::IncompletePage)
            }
        }
    }

    /// Start unconditionally, binding the page's menus and controls.
    ///
    /// Fails with [`Error::MissingElement`] when the page lacks a required
    /// element. Calling it again after a successful start does nothing.
    pub fn start(&mut self) -> Result<Vec<UpdateAction>> {
        if self.initialized {
            debug!("Engine already started");
            return Ok(Vec::new());
        }

        let layout = ShellLayout::resolve(&self.state.document)?;

        self.bind_controls(&layout);
        let bound = self.state.binder.scan(
            &self.state.document,
            &layout,
            self.state.settings.use_navbar_items,
        );

        self.state.layout = Some(layout);
        lifecycle::reset_view(&mut self.state);

        // Everything present now was handled by the scan
        self.state.document.take_records();
        self.initialized = true;

        info!("Engine started, {} menu items bound", bound);

        let mut actions = Vec::new();
        if self.state.settings.auto_dark_mode {
            actions.push(UpdateAction::SubscribeColorScheme);
        }
        Ok(actions)
    }

    fn bind_controls(&mut self, layout: &ShellLayout) {
        let doc = &self.state.document;
        let binder = &mut self.state.binder;

        let strip_navs = doc
            .children(layout.tab_strip)
            .iter()
            .copied()
            .filter(|&child| doc.has_class(child, CLASS_NAV_LINK));
        for nav in strip_navs {
            binder.bind_control(nav, Control::TabNav);
        }

        for close in doc.find_all(doc.body(), |el| {
            el.attr(ATTR_WIDGET) == Some(Widget::Close.as_attr())
        }) {
            match doc.attr(close, ATTR_CLOSE_TYPE).and_then(CloseScope::from_attr) {
                Some(scope) => binder.bind_control(close, Control::Close { scope, owner: None }),
                None => debug!("Close control {} has no usable data-type", close),
            }
        }

        for (widget, control) in [
            (Widget::Fullscreen, Control::Fullscreen),
            (Widget::ScrollLeft, Control::ScrollLeft),
            (Widget::ScrollRight, Control::ScrollRight),
        ] {
            if let Some(node) = doc.find(doc.body(), |el| el.attr(ATTR_WIDGET) == Some(widget.as_attr())) {
                binder.bind_control(node, control);
            }
        }
    }

    // ─────────────────────────────────────────────────────────
    // Message Processing
    // ─────────────────────────────────────────────────────────

    /// Process a message and any follow-ups it produces, returning the
    /// actions for the host in the order they were produced
    pub fn process_message(&mut self, message: Message) -> Vec<UpdateAction> {
        let mut actions = Vec::new();
        let mut next = Some(message);

        self.flush_mutations();
        while let Some(message) = next.take() {
            let result = update(&mut self.state, self.hooks.as_mut(), message);
            actions.extend(result.actions);
            self.flush_mutations();
            next = result.message;
        }

        actions
    }

    /// Deliver pending mutation records to the menu binder.
    ///
    /// Returns how many links were newly bound. Before start the records are
    /// left queued; the start scan covers them.
    pub fn flush_mutations(&mut self) -> usize {
        if !self.initialized || !self.state.document.has_pending_records() {
            return 0;
        }
        let records = self.state.document.take_records();
        self.state.binder.observe(&self.state.document, &records)
    }

    /// Convenience for a click on `node`
    pub fn click(&mut self, node: NodeId) -> Vec<UpdateAction> {
        self.process_message(Message::Click { node })
    }

    // ─────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.state.settings
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    /// Mutable access for code outside the engine (e.g. a menu renderer).
    /// Changes to the tab strip or panes made here are not tracked.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.state.document
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.state.registry
    }

    pub fn active(&self) -> &ActiveView {
        &self.state.active
    }

    pub fn layout(&self) -> Option<&ShellLayout> {
        self.state.layout.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{dynamic_menu_item, PageBuilder};
    use tabshell_core::ElementSpec;

    #[test]
    fn test_init_starts_opted_in_page() {
        let page = PageBuilder::new().item("./a.html", "A").build();
        let mut engine = Engine::new(page.doc, ShellSettings::default());

        let outcome = engine.init();
        assert_eq!(outcome, InitOutcome::Started(Vec::new()));
        assert!(engine.is_initialized());
        assert_eq!(engine.active(), &ActiveView::Empty);
        assert!(engine.state().is_empty_shown());
    }

    #[test]
    fn test_init_runs_once() {
        let page = PageBuilder::new().build();
        let mut engine = Engine::new(page.doc, ShellSettings::default());

        assert!(engine.init().is_started());
        assert_eq!(
            engine.init(),
            InitOutcome::Skipped(SkipReason::AlreadyInitialized)
        );
        assert_eq!(engine.start().unwrap(), Vec::new());
    }

    #[test]
    fn test_init_skips_embedded_page() {
        let mut page = PageBuilder::new().build();
        let body = page.doc.body();
        page.doc.add_class(body, CLASS_IFRAME_MODE);
        let mut engine = Engine::new(page.doc, ShellSettings::default());

        assert_eq!(engine.init(), InitOutcome::Skipped(SkipReason::Embedded));
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_init_requires_opt_in() {
        let page = PageBuilder::new().without_iframe_mode().build();
        let mut engine = Engine::new(page.doc, ShellSettings::default());
        assert_eq!(engine.init(), InitOutcome::Skipped(SkipReason::NotOptedIn));
    }

    #[test]
    fn test_init_respects_auto_mode_off() {
        let page = PageBuilder::new().build();
        let settings = ShellSettings {
            auto_iframe_mode: false,
            ..Default::default()
        };
        let mut engine = Engine::new(page.doc, settings);

        assert_eq!(
            engine.init(),
            InitOutcome::Skipped(SkipReason::AutoModeDisabled)
        );
        assert!(engine.start().is_ok());
        assert!(engine.is_initialized());
    }

    #[test]
    fn test_incomplete_page() {
        let mut doc = Document::new();
        doc.insert(
            doc.body(),
            ElementSpec::new("main").class("app-main iframe-mode"),
        );

        let mut engine = Engine::new(doc.clone(), ShellSettings::default());
        assert_eq!(
            engine.init(),
            InitOutcome::Skipped(SkipReason::IncompletePage)
        );

        let mut engine = Engine::new(doc, ShellSettings::default());
        let err = engine.start().unwrap_err();
        assert!(err.is_fatal());
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_start_subscribes_to_color_scheme() {
        let page = PageBuilder::new().build();
        let settings = ShellSettings {
            auto_dark_mode: true,
            ..Default::default()
        };
        let mut engine = Engine::new(page.doc, settings);
        assert_eq!(
            engine.start().unwrap(),
            vec![UpdateAction::SubscribeColorScheme]
        );
    }

    #[test]
    fn test_start_binds_toolbar_controls() {
        let page = PageBuilder::new().with_page_content().build();
        let mut engine = Engine::new(page.doc, ShellSettings::default());
        engine.start().unwrap();

        let binder = &engine.state().binder;
        assert_eq!(binder.control(page.fullscreen.unwrap()), Some(&Control::Fullscreen));
        assert_eq!(binder.control(page.scroll_left.unwrap()), Some(&Control::ScrollLeft));
        assert_eq!(
            binder.control(page.close_all.unwrap()),
            Some(&Control::Close {
                scope: CloseScope::All,
                owner: None
            })
        );
        let (pinned_nav, _) = page.page_content.unwrap();
        assert_eq!(binder.control(pinned_nav), Some(&Control::TabNav));
        assert_eq!(engine.active(), &ActiveView::PageContent);
    }

    #[test]
    fn test_flush_binds_links_inserted_by_other_code() {
        let page = PageBuilder::new().build();
        let menu = page.sidebar_menu;
        let mut engine = Engine::new(page.doc, ShellSettings::default());
        engine.start().unwrap();

        engine
            .document_mut()
            .insert(menu, dynamic_menu_item("./late.html", "Late", Some("late")));
        assert_eq!(engine.flush_mutations(), 1);
        assert_eq!(engine.flush_mutations(), 0);
    }

    #[test]
    fn test_records_before_start_are_covered_by_scan() {
        let page = PageBuilder::new().build();
        let menu = page.sidebar_menu;
        let mut engine = Engine::new(page.doc, ShellSettings::default());

        engine
            .document_mut()
            .insert(menu, dynamic_menu_item("./early.html", "Early", None));
        assert_eq!(engine.flush_mutations(), 0);

        engine.start().unwrap();
        assert_eq!(engine.state().binder.bound_count(), 1);
        assert!(!engine.document().has_pending_records());
    }
}
