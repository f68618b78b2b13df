//! Tab listing host modules with enable and reload controls.
//!
//! Column 0 lists every module. Pressing one fills column 1 with its
//! details, an `Enabled` toggle and a `Reload` button.

use keel_core::{ButtonOption, Highlight, Module, ModuleSet, Session, Tab};
use std::sync::Arc;
use tracing::{info, warn};

pub const MODULES_TAB_ID: &str = "modules";

/// Scratch key holding the name of the module shown in column 1.
const SELECTED: &str = "modules.selected";

/// Builds the modules tab over `modules`.
#[must_use]
pub fn modules_tab(modules: &ModuleSet) -> Tab {
    let mut tab = Tab::new(MODULES_TAB_ID, "Modules").on_change(|tab, _| {
        tab.clear_column(1, false);
    });

    tab.add_name(0, "Modules");
    for module in modules.iter() {
        let name = module.name().to_string();
        let shown = name.clone();
        let module = Arc::clone(module);
        tab.add_button(
            0,
            ButtonOption::new(name.as_str())
                .highlight(move |session: &Session| {
                    if session.get::<String>(SELECTED) == shown {
                        Highlight::Selected
                    } else {
                        Highlight::None
                    }
                })
                .on_press(move |ctx| {
                    ctx.session.set(SELECTED, name.clone());
                    show_module(ctx.tab, &module);
                }),
        );
    }
    tab.add_column(1);
    tab
}

fn show_module(tab: &mut Tab, module: &Arc<dyn Module>) {
    tab.clear_column(1, false);
    tab.add_name(1, module.name());

    let (name, version, description) = (
        module.name().to_string(),
        module.version().to_string(),
        module.description().to_string(),
    );
    tab.add_read_only(1, "Name", move || name.clone());
    tab.add_read_only(1, "Version", move || version.clone());
    if !description.is_empty() {
        tab.add_read_only(1, "Description", move || description.clone());
    }

    let toggled = Arc::clone(module);
    let state = Arc::clone(module);
    tab.add_toggle(
        1,
        "Enabled",
        move |_| {
            let enabled = !toggled.is_enabled();
            toggled.set_enabled(enabled);
            info!(module = toggled.name(), enabled, "toggled module");
        },
        move |_| state.is_enabled(),
    );

    let reloaded = Arc::clone(module);
    tab.add_button(
        1,
        ButtonOption::new("Reload").on_press(move |_| match reloaded.reload() {
            Ok(()) => info!(module = reloaded.name(), "reloaded module"),
            Err(e) => warn!(module = reloaded.name(), error = %e, "module reload failed"),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::dispatcher::call_action;
    use keel_core::{CoreError, CoreResult, Widget};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct Fake {
        name: &'static str,
        enabled: AtomicBool,
        reloads: AtomicU32,
        broken: bool,
    }

    impl Fake {
        fn new(name: &'static str, broken: bool) -> Arc<Self> {
            Arc::new(Fake {
                name,
                enabled: AtomicBool::new(true),
                reloads: AtomicU32::new(0),
                broken,
            })
        }
    }

    impl Module for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test module"
        }

        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }

        fn set_enabled(&self, enabled: bool) {
            self.enabled.store(enabled, Ordering::SeqCst);
        }

        fn reload(&self) -> CoreResult<()> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                Err(CoreError::module(self.name, "config missing"))
            } else {
                Ok(())
            }
        }
    }

    fn setup() -> (Tab, Arc<Fake>, Arc<Fake>) {
        let (vanish, gather) = (Fake::new("vanish", false), Fake::new("gather", true));
        let mut set = ModuleSet::new();
        set.add(vanish.clone());
        set.add(gather.clone());
        (modules_tab(&set), vanish, gather)
    }

    fn press(tab: &mut Tab, session: &mut Session, column: usize, row: usize) -> bool {
        call_action(tab, session, column, row, &[], &LayoutConfig::default()).redraw
    }

    fn labels(tab: &Tab, column: usize) -> Vec<String> {
        tab.column(column)
            .unwrap_or_default()
            .iter()
            .map(|w| w.label().to_string())
            .collect()
    }

    #[test]
    fn test_lists_modules() {
        let (tab, _, _) = setup();
        assert_eq!(tab.id(), MODULES_TAB_ID);
        assert_eq!(labels(&tab, 0), vec!["Modules", "vanish", "gather"]);
        assert_eq!(tab.column(1).map(<[Widget]>::len), Some(0));
    }

    #[test]
    fn test_selecting_module_fills_details() {
        let (mut tab, _, _) = setup();
        let mut session = Session::new(1);

        assert!(press(&mut tab, &mut session, 0, 1));
        assert_eq!(
            labels(&tab, 1),
            vec!["vanish", "Name", "Version", "Description", "Enabled", "Reload"]
        );
        assert_eq!(session.get::<String>(SELECTED), "vanish");

        match tab.row(0, 1) {
            Some(Widget::Button(button)) => {
                assert_eq!(button.highlight_for(&session), Highlight::Selected);
            }
            other => panic!("expected button, got {other:?}"),
        }
    }

    #[test]
    fn test_toggle_and_reload() {
        let (mut tab, vanish, gather) = setup();
        let mut session = Session::new(1);

        press(&mut tab, &mut session, 0, 1);
        press(&mut tab, &mut session, 1, 4);
        assert!(!vanish.is_enabled());
        press(&mut tab, &mut session, 1, 5);
        assert_eq!(vanish.reloads.load(Ordering::SeqCst), 1);

        press(&mut tab, &mut session, 0, 2);
        assert_eq!(labels(&tab, 1)[0], "gather");
        press(&mut tab, &mut session, 1, 5);
        assert_eq!(gather.reloads.load(Ordering::SeqCst), 1);
        assert!(gather.is_enabled());
    }

    #[test]
    fn test_failed_reload_reports_module_error() {
        let (_, _, gather) = setup();
        match gather.reload() {
            Err(CoreError::Module { name, .. }) => assert_eq!(name, "gather"),
            other => panic!("expected module error, got {other:?}"),
        }
    }

    #[test]
    fn test_tab_change_clears_details() {
        let (mut tab, _, _) = setup();
        let mut session = Session::new(1);
        press(&mut tab, &mut session, 0, 1);

        if let Some(hook) = tab.change_hook() {
            hook(&mut tab, &mut session);
        }
        assert_eq!(tab.column(1).map(<[Widget]>::len), Some(0));
    }
}
