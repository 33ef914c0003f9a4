//! Headless mode runner - drives an engine from a command stream
//!
//! [`Session`] is the synchronous core: it turns a [`Command`] into engine
//! messages and the resulting hook calls and host actions into
//! [`HeadlessEvent`]s. [`run_headless`] wraps it in a tokio event loop that
//! also performs the one host action that needs time, the delayed loading
//! screen.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use tabshell_app::fixture::{dynamic_menu_item, Page};
use tabshell_app::{Engine, InitOutcome, Message, NavTarget, ShellSettings, UpdateAction};
use tabshell_core::markup::{ATTR_HREF, DEFAULT_TAB_LABEL};
use tabshell_core::prelude::*;
use tabshell_core::{NodeId, TabIdentity};

use super::{describe_active, Command, EventBuffer, EventHooks, HeadlessEvent, TabSnapshot};

/// Where commands come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    Stdin,
    Script(PathBuf),
}

/// Input to the event loop
#[derive(Debug)]
enum LoopEvent {
    Command(Command),
    /// A timer armed for a delayed loading screen fired
    Engine(Message),
    /// The command stream ended
    InputClosed,
}

/// What handling one command produced
#[derive(Debug, Default)]
pub struct Step {
    pub events: Vec<HeadlessEvent>,
    /// Loading-screen timers the host must arm
    pub timers: Vec<(TabIdentity, Duration)>,
    pub quit: bool,
}

impl Step {
    fn event(event: HeadlessEvent) -> Self {
        Self {
            events: vec![event],
            ..Default::default()
        }
    }
}

/// An engine over a generated page, plus the host-side state around it
pub struct Session {
    engine: Engine,
    hooks: EventBuffer,
    /// Named toolbar controls of the page
    controls: Vec<(&'static str, NodeId)>,
    /// Sidebar list that `insert_menu_item` renders into
    menu: NodeId,
    color_scheme_subscribed: bool,
}

impl Session {
    pub fn new(page: Page, settings: ShellSettings) -> Self {
        let named = [
            ("fullscreen", page.fullscreen),
            ("scroll-left", page.scroll_left),
            ("scroll-right", page.scroll_right),
            ("close-all", page.close_all),
            ("close-all-other", page.close_all_other),
            ("close-active", page.close_active),
            ("page-content", page.page_content.map(|(nav, _)| nav)),
        ];
        let controls = named
            .into_iter()
            .filter_map(|(name, node)| node.map(|node| (name, node)))
            .collect();

        let (hooks, buffer) = EventHooks::new();
        Self {
            engine: Engine::with_hooks(page.doc, settings, hooks),
            hooks: buffer,
            controls,
            menu: page.sidebar_menu,
            color_scheme_subscribed: false,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Initialise the engine; a page that does not start ends the session
    pub fn start(&mut self) -> Step {
        match self.engine.init() {
            InitOutcome::Started(actions) => {
                let mut step = Step::event(HeadlessEvent::ready(
                    self.engine.state().binder.bound_count(),
                ));
                self.perform(actions, &mut step);
                step
            }
            InitOutcome::Skipped(reason) => {
                warn!("Engine did not start: {:?}", reason);
                let mut step = Step::event(HeadlessEvent::error(
                    format!("engine not started: {:?}", reason),
                    true,
                ));
                step.quit = true;
                step
            }
        }
    }

    pub fn handle(&mut self, command: Command) -> Step {
        debug!("Command: {:?}", command);
        let result = match command {
            Command::Click { id } => self.click(&id),
            Command::InsertMenuItem { href, label, id } => {
                let menu = self.menu;
                self.engine
                    .document_mut()
                    .insert(menu, dynamic_menu_item(&href, &label, id.as_deref()));
                Ok(self.dispatch(Message::DomMutated))
            }
            Command::FrameLoaded { tab } => self.frame_loaded(&tab),
            Command::Theme { dark } => {
                if self.color_scheme_subscribed {
                    Ok(self.dispatch(Message::ThemeChanged { dark }))
                } else {
                    debug!("Colour scheme not subscribed, ignoring theme change");
                    Ok(Step::default())
                }
            }
            Command::Open { href, label } => {
                let label = label.unwrap_or_else(|| DEFAULT_TAB_LABEL.to_string());
                Ok(self.dispatch(Message::OpenTab {
                    target: NavTarget::new(href, label),
                    switch: None,
                }))
            }
            Command::Close { scope, tab } => Ok(self.dispatch(Message::CloseTabs {
                scope,
                identity: tab.map(TabIdentity::from_normalized),
            })),
            Command::Fullscreen => Ok(self.dispatch(Message::ToggleFullscreen)),
            Command::Scroll { direction } => Ok(self.dispatch(Message::Scroll(direction))),
            Command::Snapshot => Ok(Step::event(self.snapshot())),
            Command::Quit => Ok(Step {
                quit: true,
                ..Default::default()
            }),
        };

        result.unwrap_or_else(|e| Step::event(HeadlessEvent::error(e.to_string(), false)))
    }

    /// Feed a message produced outside the command stream (e.g. a timer)
    pub fn dispatch(&mut self, message: Message) -> Step {
        let actions = self.engine.process_message(message);
        let mut step = Step {
            events: self.hooks.drain(),
            ..Default::default()
        };
        self.perform(actions, &mut step);
        step
    }

    pub fn snapshot(&self) -> HeadlessEvent {
        let state = self.engine.state();
        HeadlessEvent::Snapshot {
            active: describe_active(&state.active),
            tabs: state.registry.all().map(TabSnapshot::from).collect(),
            loading: state.registry.loading_count(),
            fullscreen: state.fullscreen,
            empty_shown: state.is_empty_shown(),
            loading_shown: state.is_loading_shown(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    fn click(&mut self, id: &str) -> Result<Step> {
        let node = self
            .resolve_click_target(id)
            .ok_or_else(|| Error::missing_element(id))?;
        Ok(self.dispatch(Message::Click { node }))
    }

    /// Toolbar control name, DOM id, open tab identity, then link href
    fn resolve_click_target(&self, id: &str) -> Option<NodeId> {
        if let Some((_, node)) = self.controls.iter().find(|(name, _)| *name == id) {
            return Some(*node);
        }

        let doc = self.engine.document();
        doc.get_element_by_id(id)
            .or_else(|| {
                self.engine
                    .registry()
                    .lookup(&TabIdentity::from_normalized(id))
                    .map(|entry| entry.nav)
            })
            .or_else(|| doc.find(doc.body(), |el| el.is("a") && el.attr(ATTR_HREF) == Some(id)))
    }

    fn frame_loaded(&mut self, tab: &str) -> Result<Step> {
        let frame = self
            .engine
            .registry()
            .lookup(&TabIdentity::from_normalized(tab))
            .map(|entry| entry.frame)
            .ok_or_else(|| Error::not_found(tab))?;
        Ok(self.dispatch(Message::FrameLoaded { frame }))
    }

    fn perform(&mut self, actions: Vec<UpdateAction>, step: &mut Step) {
        for action in actions {
            let event = match action {
                UpdateAction::Navigate {
                    identity,
                    frame,
                    url,
                } => HeadlessEvent::navigate(identity.as_str(), frame, &url),
                UpdateAction::Reload { identity, frame } => {
                    HeadlessEvent::reload(identity.as_str(), frame)
                }
                UpdateAction::PostMessage { frame, message } => {
                    match serde_json::to_value(message) {
                        Ok(value) => HeadlessEvent::post_message(frame, value),
                        Err(e) => {
                            error!("Failed to serialize frame message: {}", e);
                            continue;
                        }
                    }
                }
                UpdateAction::DecorateFrame { frame, class } => {
                    HeadlessEvent::decorate_frame(frame, &class)
                }
                UpdateAction::ScheduleLoadingScreen { identity, delay } => {
                    let event = HeadlessEvent::loading_screen(
                        identity.as_str(),
                        u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    );
                    step.timers.push((identity, delay));
                    event
                }
                UpdateAction::SubscribeColorScheme => {
                    self.color_scheme_subscribed = true;
                    HeadlessEvent::subscribe_color_scheme()
                }
            };
            step.events.push(event);
        }
    }
}

/// Run in headless mode until `quit` or the end of the command stream
pub async fn run_headless(page: Page, settings: ShellSettings, source: CommandSource) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("tabshell starting in HEADLESS mode");
    info!("Commands: {:?}", source);
    info!("═══════════════════════════════════════════════════════");

    let mut session = Session::new(page, settings);
    let (tx, mut rx) = mpsc::channel::<LoopEvent>(256);

    let reader_tx = tx.clone();
    let reader: Box<dyn BufRead + Send> = match &source {
        CommandSource::Stdin => Box::new(std::io::BufReader::new(std::io::stdin())),
        CommandSource::Script(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            Box::new(std::io::BufReader::new(file))
        }
    };
    std::thread::spawn(move || spawn_command_reader_blocking(reader, reader_tx));

    let start = session.start();
    if !execute(start, &tx) {
        return Ok(());
    }

    while let Some(event) = rx.recv().await {
        let step = match event {
            LoopEvent::Command(command) => session.handle(command),
            LoopEvent::Engine(message) => session.dispatch(message),
            LoopEvent::InputClosed => {
                info!("Command stream ended");
                break;
            }
        };
        if !execute(step, &tx) {
            info!("Quit requested");
            break;
        }
    }

    info!("tabshell headless mode exiting");
    Ok(())
}

/// Emit a step's events and arm its timers; `false` once the session should end
fn execute(step: Step, tx: &mpsc::Sender<LoopEvent>) -> bool {
    for event in &step.events {
        event.emit();
    }
    for (identity, delay) in step.timers {
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx
                .send(LoopEvent::Engine(Message::LoadingScreenDue { identity }))
                .await;
        });
    }
    !step.quit
}

/// Read NDJSON commands line by line (blocking version)
fn spawn_command_reader_blocking(reader: Box<dyn BufRead + Send>, tx: mpsc::Sender<LoopEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read command: {}", e);
                break;
            }
        };
        match Command::parse_line(&line) {
            Some(Ok(command)) => {
                let quit = command == Command::Quit;
                if tx.blocking_send(LoopEvent::Command(command)).is_err() || quit {
                    break;
                }
            }
            Some(Err(e)) => {
                warn!("Unknown command {:?}: {}", line, e);
                HeadlessEvent::error(format!("invalid command: {}", e), false).emit();
            }
            None => {}
        }
    }

    let _ = tx.blocking_send(LoopEvent::InputClosed);
    info!("Command reader exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabshell_app::fixture::PageBuilder;
    use tabshell_app::LoadingScreen;
    use tabshell_core::CloseScope;

    fn names(step: &Step) -> Vec<&'static str> {
        step.events.iter().map(HeadlessEvent::event_name).collect()
    }

    fn started(settings: ShellSettings) -> Session {
        let page = PageBuilder::new()
            .item("./reports/q1", "Q1")
            .item("./reports/q2", "Q2")
            .with_page_content()
            .build();
        let mut session = Session::new(page, settings);
        assert!(!session.start().quit);
        session
    }

    fn click(session: &mut Session, id: &str) -> Step {
        session.handle(Command::Click { id: id.to_string() })
    }

    #[test]
    fn test_start_reports_bound_menu_items() {
        let page = PageBuilder::new().item("./a.html", "A").build();
        let mut session = Session::new(page, ShellSettings::default());
        let step = session.start();
        assert!(matches!(
            step.events[0],
            HeadlessEvent::Ready { menu_items: 1, .. }
        ));
    }

    #[test]
    fn test_start_failure_ends_session() {
        let page = PageBuilder::new().without_iframe_mode().build();
        let mut session = Session::new(page, ShellSettings::default());
        let step = session.start();
        assert!(step.quit);
        assert_eq!(names(&step), vec!["error"]);
    }

    #[test]
    fn test_menu_click_creates_and_navigates() {
        let mut session = started(ShellSettings::default());
        let step = click(&mut session, "./reports/q1");

        assert_eq!(names(&step), vec!["tab_changed", "tab_created", "navigate"]);
        match &step.events[2] {
            HeadlessEvent::Navigate { identity, url, .. } => {
                assert_eq!(identity, "reports-q1");
                assert_eq!(url, "./reports/q1");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_tab_button_click_by_identity() {
        let mut session = started(ShellSettings::default());
        click(&mut session, "./reports/q1");
        click(&mut session, "./reports/q2");

        let step = click(&mut session, "reports-q1");
        assert_eq!(names(&step), vec!["tab_clicked", "tab_changed"]);
    }

    #[test]
    fn test_unknown_click_target_is_reported() {
        let mut session = started(ShellSettings::default());
        let step = click(&mut session, "nowhere");
        assert_eq!(names(&step), vec!["error"]);
    }

    #[test]
    fn test_frame_loaded_decorates_frame() {
        let mut session = started(ShellSettings::default());
        click(&mut session, "./reports/q1");

        let step = session.handle(Command::FrameLoaded {
            tab: "reports-q1".to_string(),
        });
        assert_eq!(names(&step), vec!["decorate_frame"]);

        let step = session.handle(Command::FrameLoaded {
            tab: "missing".to_string(),
        });
        assert_eq!(names(&step), vec!["error"]);
    }

    #[test]
    fn test_delayed_loading_screen_arms_timer() {
        let mut session = started(ShellSettings {
            loading_screen: LoadingScreen::Delay(250),
            ..Default::default()
        });
        let step = click(&mut session, "./reports/q1");

        assert!(names(&step).contains(&"loading_screen"));
        assert_eq!(step.timers.len(), 1);
        assert_eq!(step.timers[0].1, Duration::from_millis(250));

        let identity = step.timers[0].0.clone();
        session.dispatch(Message::LoadingScreenDue { identity });
        assert!(session.engine().state().is_loading_shown());
    }

    #[test]
    fn test_theme_requires_subscription() {
        let mut session = started(ShellSettings::default());
        let step = session.handle(Command::Theme { dark: true });
        assert!(step.events.is_empty());
        assert_eq!(session.engine().state().dark_mode, None);

        let mut session = started(ShellSettings {
            auto_dark_mode: true,
            ..Default::default()
        });
        click(&mut session, "./reports/q1");
        let step = session.handle(Command::Theme { dark: true });
        assert_eq!(names(&step), vec!["post_message"]);
        match &step.events[0] {
            HeadlessEvent::PostMessage { message, .. } => {
                assert_eq!(message["autoDarkMode"], true);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_insert_menu_item_is_clickable() {
        let mut session = started(ShellSettings::default());
        session.handle(Command::InsertMenuItem {
            href: "./late.html".to_string(),
            label: "Late".to_string(),
            id: Some("late-link".to_string()),
        });

        let step = click(&mut session, "late-link");
        assert!(names(&step).contains(&"tab_created"));
        assert!(session
            .engine()
            .registry()
            .contains(&TabIdentity::from_normalized("late-html")));
    }

    #[test]
    fn test_close_and_snapshot() {
        let mut session = started(ShellSettings::default());
        click(&mut session, "./reports/q1");
        click(&mut session, "./reports/q2");

        session.handle(Command::Close {
            scope: CloseScope::AllOther,
            tab: None,
        });

        match session.snapshot() {
            HeadlessEvent::Snapshot { active, tabs, .. } => {
                assert_eq!(active, "reports-q2");
                assert_eq!(tabs.len(), 1);
                assert_eq!(tabs[0].label, "Q2");
            }
            other => panic!("unexpected event {:?}", other),
        }

        session.handle(Command::Close {
            scope: CloseScope::All,
            tab: None,
        });
        match session.snapshot() {
            HeadlessEvent::Snapshot {
                active,
                tabs,
                empty_shown,
                ..
            } => {
                assert_eq!(active, "empty");
                assert!(tabs.is_empty());
                assert!(empty_shown);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_reports_loading_tabs_and_creation_time() {
        let before = chrono::Local::now();
        let mut session = started(ShellSettings::default());
        click(&mut session, "./reports/q1");
        click(&mut session, "./reports/q2");
        session.handle(Command::FrameLoaded {
            tab: "reports-q1".to_string(),
        });

        let snapshot = session.snapshot();
        match &snapshot {
            HeadlessEvent::Snapshot { tabs, loading, .. } => {
                assert_eq!(*loading, 1);
                assert!(tabs.iter().all(|tab| tab.created_at >= before));
                assert!(tabs[0].created_at <= tabs[1].created_at);
            }
            other => panic!("unexpected event {:?}", other),
        }

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["loading"], 1);
        assert!(value["tabs"][0]["created_at"].is_string());
    }

    #[test]
    fn test_toolbar_controls_by_name() {
        let mut session = started(ShellSettings::default());
        click(&mut session, "fullscreen");
        assert!(session.engine().state().fullscreen);
        session.handle(Command::Fullscreen);
        assert!(!session.engine().state().fullscreen);
    }

    #[test]
    fn test_quit_ends_session() {
        let mut session = started(ShellSettings::default());
        assert!(session.handle(Command::Quit).quit);
    }

    #[tokio::test]
    async fn test_run_headless_from_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("script.ndjson");
        std::fs::write(
            &script,
            "{\"cmd\":\"click\",\"id\":\"./a.html\"}\n{\"cmd\":\"snapshot\"}\n{\"cmd\":\"quit\"}\n",
        )
        .unwrap();

        let page = PageBuilder::new().item("./a.html", "A").build();
        let result = run_headless(
            page,
            ShellSettings::default(),
            CommandSource::Script(script),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_headless_missing_script() {
        let page = PageBuilder::new().build();
        let result = run_headless(
            page,
            ShellSettings::default(),
            CommandSource::Script(PathBuf::from("/nonexistent/script.ndjson")),
        )
        .await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
