//! # keel-ui
//!
//! Panel service for the keel admin framework.
//!
//! This crate drives the types of [`keel_core`], providing:
//!
//! - [`AdminPanel`] - Owns tabs and sessions, routes viewer commands
//! - [`TabRegistry`] - Ordered tab collection, unique by id
//! - [`call_action`] - Routes a `callaction` to a widget callback
//! - [`render`] - Builds the widget tree for a viewer
//! - [`PanelConfig`] - TOML configuration with per-platform default path
//! - [`modules_tab`] - Built-in tab over a [`keel_core::ModuleSet`]
//!
//! ## Overview
//!
//! A host creates an [`AdminPanel`] with a [`keel_core::Transport`],
//! registers tabs, and feeds it every command line its viewers send.
//! The panel parses the line, updates the viewer's session, runs widget
//! callbacks and sends back a freshly rendered tree.
//!
//! ## Example
//!
//! ```
//! use keel_core::{ButtonOption, CoreResult, Tab, Transport, ViewerId, WidgetTree};
//! use keel_ui::{AdminPanel, PanelConfig};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct Last(Arc<Mutex<Option<WidgetTree>>>);
//!
//! impl Transport for Last {
//!     fn send(&self, _: ViewerId, tree: &WidgetTree) -> CoreResult<()> {
//!         if let Ok(mut last) = self.0.lock() {
//!             *last = Some(tree.clone());
//!         }
//!         Ok(())
//!     }
//!     fn destroy(&self, _: ViewerId, _: &str) -> CoreResult<()> { Ok(()) }
//! }
//!
//! let transport = Last::default();
//! let mut panel = AdminPanel::new(PanelConfig::default(), Box::new(transport.clone()));
//!
//! let mut tab = Tab::new("server", "Server");
//! tab.add_name(0, "Actions");
//! tab.add_button(0, ButtonOption::new("Save"));
//! panel.register_tab(tab, None);
//!
//! panel.open(1);
//! let tree = transport.0.lock().unwrap().clone().unwrap();
//! assert!(tree.find_by_command("keel.callaction 0 1").is_some());
//! ```

pub mod access;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod panel;
pub mod registry;
pub mod renderer;
pub mod tabs;

pub use access::{AllowAll, AuthLevel, LevelPolicy};
pub use config::{LayoutConfig, PanelConfig};
pub use dispatcher::{call_action, Dispatch};
pub use error::{PanelError, PanelResult};
pub use panel::AdminPanel;
pub use registry::TabRegistry;
pub use renderer::{cursor_id, render, render_cursor_lock};
pub use tabs::{modules_tab, MODULES_TAB_ID};
