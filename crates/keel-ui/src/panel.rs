//! The admin panel service
//!
//! [`AdminPanel`] owns the tab registry and every viewer's session and
//! drives them from viewer commands.
//!
//! # Overview
//!
//! The panel provides:
//!
//! - **Commands**: Parsing and routing of `<ns>.changetab`, `<ns>.callaction`,
//!   `<ns>.changecolumnpage` and `<ns>.close`
//! - **Sessions**: Lazily created per-viewer state, dropped on disconnect and
//!   whenever the registry changes
//! - **Drawing**: Full rebuilds of the widget tree, handed to a [`Transport`]
//! - **Deferred work**: Delayed close and redraw through a [`Scheduler`]
//!
//! # Example
//!
//! ```
//! use keel_core::{ButtonOption, CoreResult, Tab, Transport, ViewerId, WidgetTree};
//! use keel_ui::{AdminPanel, PanelConfig};
//!
//! struct Discard;
//!
//! impl Transport for Discard {
//!     fn send(&self, _: ViewerId, _: &WidgetTree) -> CoreResult<()> { Ok(()) }
//!     fn destroy(&self, _: ViewerId, _: &str) -> CoreResult<()> { Ok(()) }
//! }
//!
//! let mut panel = AdminPanel::new(PanelConfig::default(), Box::new(Discard));
//! let mut tab = Tab::new("carbon", "Carbon");
//! tab.add_button(0, ButtonOption::new("Save").on_press(|ctx| ctx.close_panel()));
//! panel.register_tab(tab, None);
//!
//! assert!(panel.open(7));
//! panel.handle_command(7, "keel.callaction 0 0");
//! assert!(!panel.is_open(7));
//! ```

use crate::access::AllowAll;
use crate::config::PanelConfig;
use crate::dispatcher;
use crate::registry::TabRegistry;
use crate::renderer;
use keel_core::{
    AccessPolicy, Command, CoreError, Deferred, NoScheduler, PageOp, PanelRequest, Scheduler,
    Session, Tab, TabTarget, Transport, ViewerId,
};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Admin panel service.
///
/// All operations run on the caller's thread and never block. Delayed work
/// is handed to the [`Scheduler`] and comes back through
/// [`AdminPanel::run_deferred`].
///
/// # Thread Safety
///
/// AdminPanel is `Send + Sync` but performs no internal locking. Hosts that
/// receive commands on several threads wrap it in a mutex.
pub struct AdminPanel {
    /// Panel settings, including the command namespace
    config: PanelConfig,
    /// Registered tabs in display order
    registry: TabRegistry,
    /// Per-viewer state, created on first reference
    sessions: HashMap<ViewerId, Session>,
    /// Delivers trees to viewers
    transport: Box<dyn Transport>,
    /// Gates who may open the panel
    access: Box<dyn AccessPolicy>,
    /// Runs delayed close and redraw jobs
    scheduler: Box<dyn Scheduler>,
}

impl AdminPanel {
    /// Creates a panel that admits everyone and drops deferred work.
    ///
    /// # Arguments
    ///
    /// * `config` - Panel settings
    /// * `transport` - Where rendered trees are sent
    #[must_use]
    pub fn new(config: PanelConfig, transport: Box<dyn Transport>) -> Self {
        AdminPanel {
            config,
            registry: TabRegistry::new(),
            sessions: HashMap::new(),
            transport,
            access: Box::new(AllowAll),
            scheduler: Box::new(NoScheduler),
        }
    }

    /// Replaces the access policy.
    #[must_use]
    pub fn with_access(mut self, access: Box<dyn AccessPolicy>) -> Self {
        self.access = access;
        self
    }

    /// Replaces the scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    /// Finds a registered tab for in-place mutation by its provider.
    ///
    /// Unlike [`AdminPanel::register_tab`] this keeps every session.
    pub fn tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.registry.find_mut(id)
    }

    /// Session of `viewer`, if one exists.
    #[must_use]
    pub fn session(&self, viewer: ViewerId) -> Option<&Session> {
        self.sessions.get(&viewer)
    }

    /// Session of `viewer`, created on first use.
    pub fn session_mut(&mut self, viewer: ViewerId) -> &mut Session {
        self.sessions
            .entry(viewer)
            .or_insert_with(|| Session::new(viewer))
    }

    /// Returns true if `viewer` currently has the panel open.
    #[must_use]
    pub fn is_open(&self, viewer: ViewerId) -> bool {
        self.sessions.get(&viewer).is_some_and(Session::is_in_menu)
    }

    // === Registry ===

    /// Registers a tab and drops every session.
    ///
    /// A tab with the same id is replaced in place unless `insert` names
    /// another position.
    ///
    /// # Returns
    ///
    /// The position the tab ended up at
    pub fn register_tab(&mut self, tab: Tab, insert: Option<usize>) -> usize {
        let id = tab.id().to_string();
        let position = self.registry.register(tab, insert);
        self.sessions.clear();
        info!(tab = %id, position, "registered tab");
        position
    }

    /// Unregisters a tab by id and drops every session.
    ///
    /// Unknown ids are logged and ignored.
    pub fn unregister_tab(&mut self, id: &str) -> Option<Tab> {
        self.sessions.clear();
        match self.registry.unregister(id) {
            Ok(tab) => {
                info!(tab = %id, "unregistered tab");
                Some(tab)
            }
            Err(e) => {
                warn!(error = %e, "cannot unregister tab");
                None
            }
        }
    }

    /// Drops the session of a viewer that left.
    pub fn disconnect(&mut self, viewer: ViewerId) {
        if self.sessions.remove(&viewer).is_some() {
            debug!(viewer, "dropped session");
        }
    }

    // === Commands ===

    /// Parses and executes a viewer command.
    ///
    /// Malformed commands and commands from viewers the access policy
    /// rejects are ignored.
    ///
    /// # Returns
    ///
    /// `true` if the panel was redrawn or closed
    pub fn handle_command(&mut self, viewer: ViewerId, line: &str) -> bool {
        if !self.access.can_access(viewer) {
            debug!(viewer, line, "command from viewer without access");
            return false;
        }
        let command = match Command::parse(&self.config.namespace, line) {
            Ok(command) => command,
            Err(e) => {
                debug!(viewer, error = %e, "ignoring command");
                return false;
            }
        };
        debug!(viewer, ?command, "handling command");

        match command {
            Command::ChangeTab(target) => self.change_tab(viewer, target),
            Command::CallAction { column, row, args } => {
                self.call_action(viewer, column, row, &args)
            }
            Command::ChangeColumnPage { column, op } => {
                self.change_column_page(viewer, column, op)
            }
            Command::Close => {
                self.close(viewer);
                true
            }
        }
    }

    /// Opens the panel for `viewer` on the first tab.
    ///
    /// # Returns
    ///
    /// `false` if the access policy rejected the viewer
    pub fn open(&mut self, viewer: ViewerId) -> bool {
        if !self.access.can_access(viewer) {
            debug!(viewer, "viewer may not open the panel");
            return false;
        }

        let session = self
            .sessions
            .entry(viewer)
            .or_insert_with(|| Session::new(viewer));
        session.tab_index = 0;
        if let Some(tab) = self.registry.get_mut(0) {
            if let Some(hook) = tab.change_hook() {
                hook(tab, session);
            }
        }
        session.clear_session();

        let lock = renderer::render_cursor_lock(&self.config.namespace);
        if let Err(e) = self.transport.send(viewer, &lock) {
            error!(viewer, error = %e, "failed to send cursor lock");
        }
        self.draw(viewer);
        true
    }

    /// Switches tabs by index or relative step.
    ///
    /// Every registered tab's change hook fires, the session is cleared, and
    /// the panel is redrawn only if the active tab changed. Numeric targets
    /// are clamped; relative steps wrap.
    pub fn change_tab(&mut self, viewer: ViewerId, target: TabTarget) -> bool {
        let session = self
            .sessions
            .entry(viewer)
            .or_insert_with(|| Session::new(viewer));
        let previous = session.tab_index;

        for tab in self.registry.iter_mut() {
            if let Some(hook) = tab.change_hook() {
                hook(tab, session);
            }
        }
        session.clear_session();

        let count = self.registry.len();
        let last = count.saturating_sub(1);
        session.tab_index = match target {
            TabTarget::Index(index) => index.clamp(0, last as i64) as usize,
            TabTarget::Up if previous >= last => 0,
            TabTarget::Up => previous + 1,
            TabTarget::Down if previous == 0 || previous > last => last,
            TabTarget::Down => previous - 1,
        };

        if session.tab_index == previous {
            return false;
        }
        self.draw(viewer);
        true
    }

    /// Switches `viewer` to the tab with `id`, firing only that tab's hook.
    ///
    /// The session is cleared when the active tab actually changes.
    pub fn set_tab(&mut self, viewer: ViewerId, id: &str) -> bool {
        let session = self
            .sessions
            .entry(viewer)
            .or_insert_with(|| Session::new(viewer));
        let previous = session.tab_index;

        let Some(index) = self.registry.position(id) else {
            debug!(viewer, tab = id, "no such tab");
            return false;
        };
        session.tab_index = index;
        if let Some(tab) = self.registry.get_mut(index) {
            if let Some(hook) = tab.change_hook() {
                hook(tab, session);
            }
        }

        if index == previous {
            return false;
        }
        session.clear_session();
        self.draw(viewer);
        true
    }

    /// Dispatches an action on the active tab and executes what it queued.
    pub fn call_action(&mut self, viewer: ViewerId, column: usize, row: usize, args: &[String]) -> bool {
        let session = self
            .sessions
            .entry(viewer)
            .or_insert_with(|| Session::new(viewer));
        let Some(tab) = self.registry.get_mut(session.tab_index) else {
            debug!(viewer, tab_index = session.tab_index, "no active tab");
            return false;
        };

        let outcome =
            dispatcher::call_action(tab, session, column, row, args, &self.config.layout);

        let mut drawn = false;
        for request in outcome.requests {
            match request {
                PanelRequest::SwitchTab(id) => drawn |= self.set_tab(viewer, &id),
                PanelRequest::Close => {
                    self.close(viewer);
                    return true;
                }
                PanelRequest::CloseAfter(delay) => {
                    self.scheduler.after(delay, viewer, Deferred::Close);
                }
                PanelRequest::RedrawAfter(delay) => {
                    self.scheduler.after(delay, viewer, Deferred::Draw);
                }
            }
        }

        if outcome.redraw && !drawn {
            self.draw(viewer);
            drawn = true;
        }
        drawn
    }

    /// Moves the page cursor of `column` and redraws.
    pub fn change_column_page(&mut self, viewer: ViewerId, column: usize, op: PageOp) -> bool {
        self.session_mut(viewer).get_or_create_page(column).apply(op);
        self.draw(viewer);
        true
    }

    /// Removes the panel and the cursor lock from the viewer.
    pub fn close(&mut self, viewer: ViewerId) {
        let ns = &self.config.namespace;
        for root in [ns.clone(), renderer::cursor_id(ns)] {
            if let Err(e) = self.transport.destroy(viewer, &root) {
                error!(viewer, root = %root, error = %e, "failed to destroy panel");
            }
        }
        self.session_mut(viewer).set_in_menu(false);
        debug!(viewer, "closed panel");
    }

    /// Runs a job the scheduler handed back.
    ///
    /// A deferred redraw is skipped once the viewer has closed the panel.
    pub fn run_deferred(&mut self, viewer: ViewerId, job: Deferred) {
        match job {
            Deferred::Close => self.close(viewer),
            Deferred::Draw if self.is_open(viewer) => self.draw(viewer),
            Deferred::Draw => debug!(viewer, "panel closed, skipping deferred draw"),
        }
    }

    /// Renders the panel for `viewer` and sends it.
    ///
    /// A panic inside a provider callback is caught here. Nothing is sent in
    /// that case and the viewer keeps the previous tree.
    pub fn draw(&mut self, viewer: ViewerId) {
        let session = self
            .sessions
            .entry(viewer)
            .or_insert_with(|| Session::new(viewer));
        session.set_in_menu(true);

        let registry = &self.registry;
        let config = &self.config;
        let rendered = catch_unwind(AssertUnwindSafe(|| {
            renderer::render(registry, session, config)
        }));

        let tree = match rendered {
            Ok(tree) => tree,
            Err(payload) => {
                let e = CoreError::Render(panic_message(payload.as_ref()));
                error!(viewer, error = %e, "draw failed");
                return;
            }
        };

        if let Err(e) = self.transport.send(viewer, &tree) {
            error!(viewer, error = %e, "failed to send panel");
        }
    }
}

impl std::fmt::Debug for AdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPanel")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "provider callback panicked".to_string()
    }
}
