//! Routes `callaction` commands to widget callbacks.
//!
//! The dispatcher resolves a `(column, row)` coordinate against the active
//! tab, interprets the variant-specific arguments and runs the matching
//! callback. Stale coordinates and malformed arguments are silent no-ops.

use crate::config::LayoutConfig;
use keel_core::{ActionContext, PanelRequest, Session, Tab, Widget};
use tracing::debug;

/// Outcome of a dispatched action.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Whether the panel should be redrawn.
    pub redraw: bool,
    /// Requests queued by the callback, in order.
    pub requests: Vec<PanelRequest>,
}

impl Dispatch {
    fn skip() -> Self {
        Dispatch::default()
    }

    fn redraw(requests: Vec<PanelRequest>) -> Self {
        Dispatch {
            redraw: true,
            requests,
        }
    }
}

/// Runs `f` with a fresh [`ActionContext`] and returns what it queued.
fn with_context<F>(tab: &mut Tab, session: &mut Session, f: F) -> Vec<PanelRequest>
where
    F: FnOnce(&mut ActionContext<'_>),
{
    let mut ctx = ActionContext::new(tab, session);
    f(&mut ctx);
    ctx.into_requests()
}

/// Accepts the boolean spellings viewers send.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

/// Dispatches an action at `(column, row)` of `tab`.
///
/// The widget is cloned out of the tab before its callback runs, so the
/// callback may freely restructure the tab. `lastPressed` is recorded only
/// once the coordinate resolves to a widget.
pub fn call_action(
    tab: &mut Tab,
    session: &mut Session,
    column: usize,
    row: usize,
    args: &[String],
    layout: &LayoutConfig,
) -> Dispatch {
    let Some(widget) = tab.row(column, row).cloned() else {
        debug!(tab = tab.id(), column, row, "stale coordinate, ignoring action");
        return Dispatch::skip();
    };

    session.set_last_pressed(column, row);
    debug!(tab = tab.id(), column, row, kind = widget.kind(), ?args, "dispatching action");

    match widget {
        Widget::Name(_) | Widget::Text(_) => Dispatch::skip(),

        Widget::Button(button) => match button.on_press {
            Some(f) => Dispatch::redraw(with_context(tab, session, |ctx| f(ctx))),
            None => Dispatch::skip(),
        },

        Widget::Toggle(toggle) => match toggle.on_toggle {
            Some(f) => Dispatch::redraw(with_context(tab, session, |ctx| f(ctx))),
            None => Dispatch::skip(),
        },

        Widget::Input(input) => match input.on_submit {
            Some(f) => Dispatch::redraw(with_context(tab, session, |ctx| f(ctx, args))),
            None => Dispatch::skip(),
        },

        Widget::Enum(option) => {
            let (Some(f), Some(backward)) = (
                option.on_step,
                args.first().and_then(|a| parse_bool(a)),
            ) else {
                return Dispatch::skip();
            };
            Dispatch::redraw(with_context(tab, session, |ctx| f(ctx, backward)))
        }

        Widget::Radio(radio) => select_radio(tab, session, &radio.group, radio.index),

        Widget::Dropdown(dropdown) => dropdown_action(tab, session, &dropdown, args, layout),

        Widget::Range(range) => {
            let (Some(f), Some(cell)) = (
                range.on_change.clone(),
                args.first().and_then(|a| a.parse::<usize>().ok()),
            ) else {
                return Dispatch::skip();
            };
            let value = range.value_at(cell as f32, layout.range_cuts);
            Dispatch::redraw(with_context(tab, session, |ctx| f(ctx, value)))
        }

        Widget::ButtonArray(array) => {
            let callback = args
                .first()
                .and_then(|a| a.parse::<usize>().ok())
                .and_then(|i| array.buttons.get(i))
                .and_then(|b| b.on_press.clone());
            match callback {
                Some(f) => Dispatch::redraw(with_context(tab, session, |ctx| f(ctx))),
                None => Dispatch::skip(),
            }
        }

        Widget::InputButton(composite) => match args.first().map(String::as_str) {
            Some("input") => match composite.input.on_submit {
                Some(f) => Dispatch::redraw(with_context(tab, session, |ctx| f(ctx, &args[1..]))),
                None => Dispatch::skip(),
            },
            Some("button") => match composite.button.on_press {
                Some(f) => Dispatch::redraw(with_context(tab, session, |ctx| f(ctx))),
                None => Dispatch::skip(),
            },
            _ => Dispatch::skip(),
        },
    }
}

/// Moves the selection of radio group `group` to `index`.
///
/// The previous member is told `false` before the new member is told
/// `true`. Re-selecting the current member does nothing.
fn select_radio(tab: &mut Tab, session: &mut Session, group: &str, index: usize) -> Dispatch {
    let Some(radios) = tab.radio_group_mut(group) else {
        return Dispatch::skip();
    };
    if radios.is_selected(index) {
        return Dispatch::skip();
    }
    let Some(previous) = radios.select(index) else {
        return Dispatch::skip();
    };
    let deselected = previous.and_then(|p| radios.callback_at(p));
    let selected = radios.callback_at(index);

    Dispatch::redraw(with_context(tab, session, |ctx| {
        if let Some(f) = deselected {
            f(ctx, false);
        }
        if let Some(f) = selected {
            f(ctx, true);
        }
    }))
}

/// Handles the dropdown sub-protocol.
///
/// * `false` toggles this dropdown open or closed.
/// * `true call <i>` commits entry `i` and closes the dropdown.
/// * `true --`, `true ++`, `true -1`, `true 1` and `true <n>` page the open list.
fn dropdown_action(
    tab: &mut Tab,
    session: &mut Session,
    dropdown: &keel_core::DropdownOption,
    args: &[String],
    layout: &LayoutConfig,
) -> Dispatch {
    let Some(open_view) = args.first().and_then(|a| parse_bool(a)) else {
        return Dispatch::skip();
    };

    if !open_view {
        if session.is_dropdown_open(dropdown.id) {
            session.close_dropdown();
        } else {
            session.open_dropdown_with(dropdown.id);
        }
        return Dispatch::redraw(Vec::new());
    }

    match args.get(1).map(String::as_str) {
        Some("call") => {
            let Some(index) = args
                .get(2)
                .and_then(|a| a.parse::<usize>().ok())
                .filter(|i| *i < dropdown.options.len())
            else {
                return Dispatch::skip();
            };
            session.close_dropdown();
            let requests = match dropdown.on_select.clone() {
                Some(f) => with_context(tab, session, |ctx| f(ctx, index)),
                None => Vec::new(),
            };
            Dispatch::redraw(requests)
        }
        Some(token) => {
            if !session.is_dropdown_open(dropdown.id) {
                debug!(token, "paging a dropdown that is not open, ignoring");
                return Dispatch::skip();
            }
            let Some(open) = session.open_dropdown_mut() else {
                return Dispatch::skip();
            };
            let page = &mut open.page;
            page.recompute(dropdown.options.len(), layout.dropdown_rows_per_page);
            match token {
                "--" => page.first(),
                "++" => page.last(),
                "-1" => page.previous(),
                "1" => page.next(),
                other => match other.parse::<i64>() {
                    Ok(n) => page.jump(n),
                    Err(_) => return Dispatch::skip(),
                },
            }
            Dispatch::redraw(Vec::new())
        }
        None => Dispatch::skip(),
    }
}
