//! # keel-core
//!
//! Core types for the keel admin panel framework.
//!
//! This crate holds everything a tab provider needs to describe a panel:
//! the widget model, tabs and their columns, per-viewer sessions, the
//! command grammar and the transport-agnostic widget tree. The panel
//! service itself lives in `keel-ui`.
//!
//! ## Core Abstractions
//!
//! - [`Tab`] - Named container of columns of [`Widget`] rows
//! - [`Widget`] - Closed set of row variants with their callbacks
//! - [`RadioGroup`] - Exclusive selection shared by radio rows
//! - [`Page`] - Pagination cursor for columns and dropdowns
//! - [`Session`] - Per-viewer ephemeral state
//! - [`ActionContext`] - What a callback can touch while it runs
//! - [`Command`] - Parsed viewer command
//! - [`WidgetTree`] - Rendered payload handed to a [`Transport`]
//! - [`Module`] - Capability interface for toggleable host modules
//! - [`CoreError`] - Error types for framework operations
//!
//! ## Example
//!
//! ```
//! use keel_core::{ActionContext, ButtonOption, Highlight, Session, Tab, Widget};
//!
//! let mut tab = Tab::new("players", "Players");
//! tab.add_name(0, "Online");
//! tab.add_button(
//!     0,
//!     ButtonOption::new("alice")
//!         .highlight(|s: &Session| if s.get::<bool>("alice") { Highlight::Selected } else { Highlight::None })
//!         .on_press(|ctx: &mut ActionContext<'_>| {
//!             ctx.session.set("alice", true);
//!             ctx.tab.clear_column(1, false);
//!             ctx.tab.add_name(1, "alice");
//!         }),
//! );
//!
//! let mut session = Session::new(1);
//! if let Some(Widget::Button(button)) = tab.row(0, 1).cloned() {
//!     if let Some(press) = button.on_press {
//!         let mut ctx = ActionContext::new(&mut tab, &mut session);
//!         press(&mut ctx);
//!     }
//! }
//! assert_eq!(tab.row(1, 0).map(|w| w.label()), Some("alice"));
//! ```

pub mod command;
pub mod context;
pub mod error;
pub mod host;
pub mod module;
pub mod page;
pub mod radio;
pub mod session;
pub mod tab;
pub mod tree;
pub mod widget;

pub use command::{action_prefix, Command, TabTarget};
pub use context::{ActionContext, PanelRequest};
pub use error::{CoreError, CoreResult};
pub use host::{AccessPolicy, Deferred, NoScheduler, Scheduler, Transport};
pub use module::{Module, ModuleSet};
pub use page::{last_page, Page, PageOp};
pub use radio::RadioGroup;
pub use session::{OpenDropdown, Session, ViewerId};
pub use tab::{ChangeFn, OverrideFn, ProviderInfo, Tab, TabId};
pub use tree::{
    Align, Color, Edges, Element, ElementKind, Font, InputField, Layer, Placement, TextStyle,
    WidgetTree,
};
pub use widget::{
    ActionFn, ButtonArrayOption, ButtonOption, DropdownFn, DropdownId, DropdownOption, EnumFn,
    EnumOption, Highlight, InputButtonOption, InputFn, InputOption, NameOption, RadioFn,
    RadioOption, RangeFn, RangeOption, TextOption, ToggleOption, Widget,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify all public types are accessible
        let _: ViewerId = 0;
        let _: TabId = "carbon".to_string();
        let _ = Page::default();
        let _ = PageOp::Next;
        let _ = Session::new(0);
        let _ = Tab::new("carbon", "Carbon");
        let _ = RadioGroup::new();
        let _ = WidgetTree::new();
        let _ = CoreError::TabNotFound("carbon".into());
    }

    #[test]
    fn test_widget_exports() {
        let _ = Widget::Button(ButtonOption::new("ok"));
        let _ = Widget::Input(InputOption::new("name"));
        let _ = DropdownOption::new("mode", ["a"]);
        let _ = Highlight::Warned;
        let _ = Color::WHITE;
        let _ = Align::MiddleLeft;
    }

    #[test]
    fn test_core_result_usage() {
        fn example_function() -> CoreResult<u32> {
            Ok(42)
        }

        fn failing_function() -> CoreResult<u32> {
            Err(CoreError::TabNotFound("gone".into()))
        }

        assert_eq!(example_function().ok(), Some(42));
        assert!(failing_function().is_err());
    }
}
