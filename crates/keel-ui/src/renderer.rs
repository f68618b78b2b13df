//! Rendering of the admin panel
//!
//! This module turns the registry, the active tab and a viewer's session into
//! a [`WidgetTree`]. Every draw rebuilds the whole tree.
//!
//! # Layout
//!
//! ```text
//! +---------------------------------------------+
//! | Title                                    [X] |
//! | [<] tab tab tab ...                      [>] |
//! | +---------+ +---------+ +---------+          |
//! | | column  | | column  | | column  |          |
//! | | rows... | | rows... | | rows... |          |
//! | | [pager] | |         | |         |          |
//! | +---------+ +---------+ +---------+          |
//! +---------------------------------------------+
//! ```
//!
//! Rows are stacked top-down by drawing the page window from its last row
//! upward. Interactive rows embed `"<ns>.callaction <column> <row>"` in their
//! commands, followed by the variant's own arguments.
//!
//! # Example
//!
//! ```
//! use keel_core::{ButtonOption, Session, Tab};
//! use keel_ui::{render, PanelConfig, TabRegistry};
//!
//! let mut registry = TabRegistry::new();
//! let mut tab = Tab::new("carbon", "Carbon");
//! tab.add_button(0, ButtonOption::new("Save"));
//! registry.register(tab, None);
//!
//! let mut session = Session::new(1);
//! let tree = render(&registry, &mut session, &PanelConfig::default());
//! assert!(tree.find_by_command("keel.callaction 0 0").is_some());
//! ```

use crate::config::{LayoutConfig, PanelConfig};
use crate::registry::TabRegistry;
use keel_core::{
    action_prefix, Align, ButtonArrayOption, Color, DropdownOption, Font, Highlight,
    InputButtonOption, InputField, InputOption, Layer, Page, Placement, RangeOption, Session, Tab,
    TextStyle, Widget, WidgetTree,
};

/// Where the value half of a labelled row starts.
const OPTION_WIDTH: f32 = 0.475;
const ROW_HEIGHT: f32 = 0.04;
const ROW_SPACING: f32 = 0.01;
const COLUMN_SPACING: f32 = 0.005;
/// Vertical pixel step between expanded dropdown entries.
const DROPDOWN_STEP: f32 = 22.0;
const DROPDOWN_SHIFT: f32 = 15.0;

const LABEL: Color = Color::rgba(1.0, 1.0, 1.0, 0.7);
const CLEAR: Color = Color::rgba(0.2, 0.2, 0.2, 0.0);
const FIELD: Color = Color::rgba(0.2, 0.2, 0.2, 0.5);
const INACTIVE: Color = Color::rgba(0.3, 0.3, 0.3, 0.1);
const PAGER: Color = Color::rgba(0.3, 0.3, 0.3, 0.3);

/// Id of the cursor-lock container sent alongside the panel.
#[must_use]
pub fn cursor_id(namespace: &str) -> String {
    format!("{namespace}cur")
}

/// Builds the tiny container that keeps the viewer's cursor unlocked.
#[must_use]
pub fn render_cursor_lock(namespace: &str) -> WidgetTree {
    let mut tree = WidgetTree::new();
    let id = cursor_id(namespace);
    tree.container(&id, Color::TRANSPARENT, true, Some(&id), Layer::Hud);
    tree
}

/// Renders the panel for `session`.
///
/// Column pages and the open dropdown's page are recomputed against the
/// current row counts, so the session is updated in place. An empty
/// registry or an out-of-range tab index renders only chrome and the strip.
pub fn render(registry: &TabRegistry, session: &mut Session, config: &PanelConfig) -> WidgetTree {
    let mut painter = Painter::new(&config.namespace, &config.layout);

    let main = painter.chrome(&config.title);
    painter.tab_strip(&main, registry, session);

    let panels = painter.tree.panel(
        &main,
        Some("panels"),
        Color::TRANSPARENT,
        Placement::new(0.01, 0.02, 0.99, 0.86),
    );

    if let Some(tab) = registry.get(session.tab_index) {
        match tab.override_hook() {
            Some(hook) => hook(tab, &mut painter.tree, &panels, &*session),
            None => painter.columns(&panels, tab, session),
        }
    }

    painter.tree
}

struct Painter<'a> {
    tree: WidgetTree,
    ns: &'a str,
    layout: &'a LayoutConfig,
}

impl<'a> Painter<'a> {
    fn new(ns: &'a str, layout: &'a LayoutConfig) -> Self {
        Painter {
            tree: WidgetTree::new(),
            ns,
            layout,
        }
    }

    // === Chrome ===

    /// Backdrop, title and close button. Returns the id of the main panel.
    fn chrome(&mut self, title: &str) -> String {
        let ns = self.ns;
        self.tree.container(
            ns,
            Color::rgba(0.0, 0.0, 0.0, 0.75),
            true,
            Some(ns),
            Layer::Hud,
        );
        let frame = self.tree.panel(
            ns,
            Some("color"),
            Color::rgba(0.0, 0.0, 0.0, 0.6),
            Placement::new(0.15, 0.1, 0.85, 0.9),
        );
        let main = self.tree.blurred_panel(
            &frame,
            Some("main"),
            Color::rgba(0.0, 0.0, 0.0, 0.5),
            Placement::FULL,
        );

        self.tree.text(
            &main,
            None,
            title,
            TextStyle::new(18)
                .color(Color::rgba(1.0, 1.0, 1.0, 0.8))
                .align(Align::UpperLeft)
                .font(Font::Bold),
            Placement::new(0.0175, 0.8, 1.0, 0.97),
        );
        self.tree.button(
            &main,
            None,
            "X",
            TextStyle::new(10)
                .color(Color::rgba(1.0, 0.5, 0.5, 1.0))
                .font(Font::Mono),
            Color::rgba(0.6, 0.2, 0.2, 0.9),
            Some(format!("{ns}.close")),
            Placement::new(0.97, 0.96, 0.99, 0.99),
        );
        main
    }

    // === Tab strip ===

    fn tab_strip(&mut self, main: &str, registry: &TabRegistry, session: &mut Session) {
        let ns = self.ns;
        let strip = self.tree.panel(
            main,
            Some("tab_buttons"),
            Color::rgba(0.0, 0.0, 0.0, 0.6),
            Placement::new(0.01, 0.875, 0.99, 0.92),
        );

        self.tab_button(&strip, "<", format!("{ns}.changetab down"), 0.03, 0.0, false);
        self.tab_button(&strip, ">", format!("{ns}.changetab up"), 0.03, 0.97, false);

        let capacity = self.layout.tabs_per_strip.max(1);
        session.follow_tab(registry.len(), capacity);

        let visible = registry.len().min(capacity);
        if visible == 0 {
            return;
        }
        let width = 0.94 / visible as f32;
        let mut x = 0.03;
        for (index, tab) in registry
            .iter()
            .enumerate()
            .skip(session.tab_scroll)
            .take(visible)
        {
            let label = match tab.provider() {
                Some(provider) => format!("{}\n{provider}", tab.name()),
                None => tab.name().to_string(),
            };
            let active = index == session.tab_index;
            self.tab_button(&strip, &label, format!("{ns}.changetab {index}"), width, x, active);
            x += width;
        }
    }

    fn tab_button(
        &mut self,
        parent: &str,
        text: &str,
        command: String,
        width: f32,
        x: f32,
        highlight: bool,
    ) {
        let color = if highlight {
            Highlight::Selected.color()
        } else {
            INACTIVE
        };
        let button = self.tree.button(
            parent,
            None,
            text,
            TextStyle::new(11),
            color,
            Some(command),
            Placement::new(x, 0.0, x + width, 1.0),
        );
        if highlight {
            self.tree.panel(
                &button,
                None,
                Color::rgba(1.0, 1.0, 1.0, 0.4),
                Placement::new(0.0, 0.0, 1.0, 0.03).with_offset(0.0, 0.0, -0.5, 0.0),
            );
        }
    }

    // === Columns ===

    fn columns(&mut self, panels: &str, tab: &Tab, session: &mut Session) {
        let count = tab.column_count();
        if count == 0 {
            return;
        }
        let width = 1.0 / count as f32 - COLUMN_SPACING;
        let capacity = self.layout.rows_per_page.max(1);
        let mut x = 0.0;

        for (column, rows) in tab.columns() {
            let panel = self.tree.panel(
                panels,
                Some(format!("sub{column}").as_str()),
                Color::rgba(0.0, 0.0, 0.0, 0.5),
                Placement::new(x, 0.0, x + width - COLUMN_SPACING, 1.0),
            );

            let page = {
                let page = session.get_or_create_page(column);
                page.recompute(rows.len(), capacity);
                *page
            };
            let window = page.window(rows.len(), capacity);
            let shown = window.len();
            let pad = if page.is_paged() { 0 } else { 1 };
            let step = ROW_HEIGHT + ROW_SPACING;
            let mut y = step * (capacity as f32 - (shown as f32 - pad as f32));

            if page.is_paged() {
                self.pagination(&panel, column, page, y);
                y += step;
            }

            for row in window.rev() {
                self.row(&panel, tab, session, column, row, &rows[row], y);
                y += step;
            }

            x += width + COLUMN_SPACING;
        }
    }

    fn pagination(&mut self, parent: &str, column: usize, page: Page, y: f32) {
        let ns = self.ns;
        let id = self.tree.panel(
            parent,
            Some(format!("{parent}{column}").as_str()),
            PAGER,
            Placement::new(0.02, y, 0.98, y + ROW_HEIGHT),
        );

        self.tree.text(
            &id,
            None,
            format!(" / {}", page.total() + 1),
            TextStyle::new(9).align(Align::MiddleLeft),
            Placement::new(0.5, 0.0, 1.0, 1.0),
        );
        self.tree.input(
            &id,
            None,
            (page.current() + 1).to_string(),
            TextStyle::new(9).color(Color::WHITE).align(Align::MiddleRight),
            InputField {
                command: Some(format!("{ns}.changecolumnpage {column} 4")),
                char_limit: 0,
                read_only: false,
            },
            Placement::new(0.0, 0.0, 0.495, 1.0),
        );

        let can_back = page.current() > 0;
        let can_forward = page.current() < page.total();
        let controls = [
            ("<<", 2, 0.0, 0.1, Some(can_back)),
            ("<", 0, 0.1, 0.2, None),
            (">", 1, 0.8, 0.9, None),
            (">>", 3, 0.9, 1.0, Some(can_forward)),
        ];
        for (text, op, x_min, x_max, gate) in controls {
            let (color, command) = match gate {
                Some(true) => (Highlight::Warned.color(), Some(format!("{ns}.changecolumnpage {column} {op}"))),
                Some(false) => (INACTIVE, None),
                None => (Highlight::Selected.color(), Some(format!("{ns}.changecolumnpage {column} {op}"))),
            };
            self.tree.button(
                &id,
                None,
                text,
                TextStyle::new(8),
                color,
                command,
                Placement::new(x_min, 0.0, x_max, 1.0),
            );
        }
    }

    // === Rows ===

    #[allow(clippy::too_many_arguments)]
    fn row(
        &mut self,
        parent: &str,
        tab: &Tab,
        session: &mut Session,
        column: usize,
        row: usize,
        widget: &Widget,
        y: f32,
    ) {
        let command = action_prefix(self.ns, column, row);
        let bounds = Placement::new(0.0, y, 1.0, y + ROW_HEIGHT);

        match widget {
            Widget::Name(name) => {
                let text = self.tree.text(
                    parent,
                    None,
                    name.label.to_uppercase(),
                    TextStyle::new(12).color(LABEL).align(name.align).font(Font::Bold),
                    Placement::new(0.025, y, 0.98, y + ROW_HEIGHT),
                );
                self.tree
                    .panel(&text, None, LABEL, Placement::new(0.0, 0.0, 1.0, 0.015));
            }

            Widget::Text(text) => {
                self.tree.text(
                    parent,
                    None,
                    text.label.as_str(),
                    TextStyle::new(text.size)
                        .color(text.color)
                        .align(text.align)
                        .font(text.font),
                    Placement::new(0.025, y, 0.98, y + ROW_HEIGHT),
                );
            }

            Widget::Button(button) => {
                self.tree.button(
                    parent,
                    None,
                    button.label.as_str(),
                    TextStyle::new(11).align(button.align),
                    button.highlight_for(session).color(),
                    Some(command),
                    Placement::new(0.015, y, 0.985, y + ROW_HEIGHT),
                );
            }

            Widget::Toggle(toggle) => {
                let strip = self.labelled(parent, &toggle.label, bounds);
                self.tree
                    .panel(&strip, None, FIELD, Placement::new(0.0, 0.0, 0.94, 0.015));
                let button = self.tree.button(
                    parent,
                    None,
                    "",
                    TextStyle::new(11),
                    FIELD,
                    Some(command),
                    Placement::new(0.94, y, 0.985, y + ROW_HEIGHT),
                );
                if toggle.is_on_for(session) {
                    self.tree.image(
                        &button,
                        None,
                        "checkmark",
                        Highlight::Selected.color(),
                        Placement::new(0.15, 0.15, 0.85, 0.85),
                    );
                }
            }

            Widget::Input(input) => {
                let strip = self.labelled(parent, &input.label, bounds);
                let field = self.option_box(&strip, FIELD);
                self.input_field(&field, input, command, 1.0);
            }

            Widget::Enum(option) => {
                let strip = self.labelled(parent, &option.label, bounds);
                let field = self.option_box(&strip, FIELD);
                let color = Highlight::Selected.color();
                self.tree.text(
                    &field,
                    None,
                    option.current_text(),
                    TextStyle::new(11).color(LABEL),
                    Placement::FULL,
                );
                self.tree.button(
                    &field,
                    None,
                    "<",
                    TextStyle::new(10).color(LABEL),
                    color,
                    Some(format!("{command} true")),
                    Placement::new(0.0, 0.0, 0.15, 1.0),
                );
                self.tree.button(
                    &field,
                    None,
                    ">",
                    TextStyle::new(10).color(LABEL),
                    color,
                    Some(format!("{command} false")),
                    Placement::new(0.85, 0.0, 1.0, 1.0),
                );
            }

            Widget::Radio(radio) => {
                let strip = self.labelled(parent, &radio.label, bounds);
                self.tree
                    .panel(&strip, None, FIELD, Placement::new(0.0, 0.0, 0.93, 0.015));
                let button = self.tree.button(
                    parent,
                    None,
                    "",
                    TextStyle::new(11),
                    FIELD,
                    Some(command),
                    Placement::new(0.93, y, 0.985, y + ROW_HEIGHT),
                );
                let selected = tab
                    .radio_group(&radio.group)
                    .is_some_and(|group| group.is_selected(radio.index));
                if selected {
                    self.tree.panel(
                        &button,
                        None,
                        Highlight::Selected.color(),
                        Placement::new(0.2, 0.2, 0.8, 0.8),
                    );
                }
            }

            Widget::Dropdown(dropdown) => self.dropdown(parent, session, dropdown, command, bounds),

            Widget::Range(range) => self.range(parent, range, command, bounds),

            Widget::ButtonArray(array) => self.button_array(parent, session, array, command, bounds),

            Widget::InputButton(composite) => {
                self.input_button(parent, session, composite, command, bounds);
            }
        }
    }

    /// Transparent row strip with a `"label:"` caption on its left.
    fn labelled(&mut self, parent: &str, label: &str, bounds: Placement) -> String {
        let strip = self.tree.panel(parent, None, CLEAR, bounds);
        self.tree.text(
            &strip,
            None,
            format!("{label}:"),
            TextStyle::new(12).color(LABEL).align(Align::MiddleLeft),
            Placement::new(0.025, 0.0, 0.98, 1.0),
        );
        strip
    }

    /// Value box on the right half of a row, with an underline on the left.
    fn option_box(&mut self, strip: &str, color: Color) -> String {
        let field = self.tree.panel(
            strip,
            None,
            color,
            Placement::new(OPTION_WIDTH, 0.0, 0.985, 1.0),
        );
        self.tree.panel(
            strip,
            None,
            color,
            Placement::new(0.0, 0.0, OPTION_WIDTH, 0.015),
        );
        field
    }

    fn input_field(&mut self, field: &str, input: &InputOption, command: String, x_max: f32) {
        let alpha = if input.read_only { 0.2 } else { 1.0 };
        self.tree.input(
            field,
            None,
            input.placeholder_text(),
            TextStyle::new(11)
                .color(Color::WHITE.with_alpha(alpha))
                .align(Align::MiddleLeft),
            InputField {
                command: Some(command),
                char_limit: input.char_limit,
                read_only: input.read_only,
            },
            Placement::new(0.03, 0.0, x_max, 1.0),
        );
        if !input.read_only {
            let underline = Color::from_hex("#4287f5", 0.8).unwrap_or(Color::WHITE);
            self.tree.panel(
                field,
                None,
                underline,
                Placement::new(0.0, 0.0, x_max, 0.05).with_offset(0.0, 0.0, -0.5, 0.0),
            );
        }
    }

    fn dropdown(
        &mut self,
        parent: &str,
        session: &mut Session,
        dropdown: &DropdownOption,
        command: String,
        bounds: Placement,
    ) {
        let strip = self.labelled(parent, &dropdown.label, bounds);
        let field = self.option_box(&strip, FIELD);
        let selected = dropdown.selected_index();

        let main = self.tree.button(
            &field,
            None,
            "",
            TextStyle::new(0).color(Color::TRANSPARENT),
            Color::rgba(0.2, 0.2, 0.2, 0.7),
            Some(format!("{command} false")),
            Placement::FULL,
        );
        if let Some(current) = dropdown.options.get(selected) {
            self.entry(&main, dropdown, selected, current, LABEL, 0.02);
        }

        let capacity = self.layout.dropdown_rows_per_page.max(1);
        let page = match session.open_dropdown_mut() {
            Some(open) if open.id == dropdown.id => {
                open.page.recompute(dropdown.options.len(), capacity);
                open.page
            }
            _ => return,
        };

        let highlight = Highlight::Selected.color().with_alpha(1.0);
        let mut offset = -DROPDOWN_STEP;
        for index in page.window(dropdown.options.len(), capacity) {
            let chosen = index == selected;
            let entry = self.tree.button(
                &field,
                None,
                "",
                TextStyle::new(0).color(Color::TRANSPARENT),
                if chosen {
                    highlight
                } else {
                    Color::rgba(0.1, 0.1, 0.1, 1.0)
                },
                Some(format!("{command} true call {index}")),
                Placement::FULL.with_offset(DROPDOWN_SHIFT, offset, 0.0, offset),
            );
            let text_color = if chosen {
                LABEL
            } else {
                Color::rgba(1.0, 1.0, 1.0, 0.4)
            };
            self.entry(&entry, dropdown, index, &dropdown.options[index], text_color, 0.035);
            offset -= DROPDOWN_STEP;
        }

        if !page.is_paged() {
            return;
        }
        let controls = self.tree.panel(
            &field,
            None,
            Color::rgba(0.2, 0.2, 0.2, 0.2),
            Placement::FULL.with_offset(DROPDOWN_SHIFT, offset, 0.0, offset - 2.0),
        );
        let pager = self.tree.panel(&controls, None, PAGER, Placement::FULL);
        self.tree.text(
            &pager,
            None,
            format!("{} / {}", page.current() + 1, page.total() + 1),
            TextStyle::new(9).align(Align::MiddleLeft),
            Placement::new(0.5, 0.0, 1.0, 1.0),
        );
        let back = if page.current() > 0 {
            Highlight::Warned.color()
        } else {
            INACTIVE
        };
        let forward = if page.current() < page.total() {
            Highlight::Warned.color()
        } else {
            INACTIVE
        };
        let buttons = [
            ("<<", "--", 0.0, 0.1, back),
            ("<", "-1", 0.1, 0.2, Highlight::Selected.color()),
            (">", "1", 0.8, 0.9, Highlight::Selected.color()),
            (">>", "++", 0.9, 1.0, forward),
        ];
        for (text, token, x_min, x_max, color) in buttons {
            self.tree.button(
                &pager,
                None,
                text,
                TextStyle::new(8),
                color,
                Some(format!("{command} true {token}")),
                Placement::new(x_min, 0.0, x_max, 1.0),
            );
        }
    }

    /// Text of a dropdown entry, shifted right when it carries an icon.
    fn entry(
        &mut self,
        button: &str,
        dropdown: &DropdownOption,
        index: usize,
        text: &str,
        color: Color,
        indent: f32,
    ) {
        let icon = dropdown.icon(index);
        let x_min = if icon.is_some() { 0.085 } else { indent };
        self.tree.text(
            button,
            None,
            text,
            TextStyle::new(10).color(color).align(Align::MiddleLeft),
            Placement::new(x_min, 0.0, 1.0, 1.0),
        );
        if let Some(icon) = icon {
            self.tree.image(
                button,
                None,
                icon,
                color,
                Placement::new(0.015, 0.2, 0.072, 0.8),
            );
        }
    }

    fn range(&mut self, parent: &str, range: &RangeOption, command: String, bounds: Placement) {
        let strip = self.labelled(parent, &range.label, bounds);
        let field = self.option_box(&strip, FIELD);

        let fill = Color::from_hex("#f54242", 0.8).unwrap_or(Color::WHITE);
        self.tree.panel(
            &field,
            None,
            fill,
            Placement::new(0.0, 0.0, range.fraction(), 1.0),
        );
        self.tree.text(
            &field,
            None,
            range.caption(),
            TextStyle::new(8).color(Color::WHITE),
            Placement::FULL,
        );

        let cuts = self.layout.range_cuts.max(1);
        let step = 1.0 / cuts as f32;
        for cell in 0..cuts {
            let x = cell as f32 * step;
            self.tree.button(
                &field,
                None,
                "",
                TextStyle::new(0).color(Color::TRANSPARENT),
                Color::TRANSPARENT,
                Some(format!("{command} {cell}")),
                Placement::new(x, 0.0, x + step, 1.0),
            );
        }
    }

    fn button_array(
        &mut self,
        parent: &str,
        session: &Session,
        array: &ButtonArrayOption,
        command: String,
        bounds: Placement,
    ) {
        let strip = self.tree.panel(parent, None, CLEAR, bounds);
        if array.buttons.is_empty() {
            return;
        }
        let width = 1.0 / array.buttons.len() as f32 - array.spacing;
        let mut x = 0.0;
        for (index, button) in array.buttons.iter().enumerate() {
            self.tree.button(
                &strip,
                None,
                button.label.as_str(),
                TextStyle::new(11).align(button.align),
                button.highlight_for(session).color(),
                Some(format!("{command} {index}")),
                Placement::new(x, 0.0, x + width, 1.0),
            );
            x += width + array.spacing;
        }
    }

    fn input_button(
        &mut self,
        parent: &str,
        session: &Session,
        composite: &InputButtonOption,
        command: String,
        bounds: Placement,
    ) {
        let strip = self.labelled(parent, &composite.label, bounds);
        let field = self.option_box(&strip, FIELD);
        let split = 1.0 - composite.button_priority;

        self.input_field(&field, &composite.input, format!("{command} input"), split);
        let button = &composite.button;
        self.tree.button(
            &field,
            None,
            button.label.as_str(),
            TextStyle::new(11).align(button.align),
            button.highlight_for(session).color(),
            Some(format!("{command} button")),
            Placement::new(split, 0.0, 1.0, 1.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::{ButtonOption, ElementKind, ProviderInfo, TextOption};

    fn config() -> PanelConfig {
        PanelConfig::default()
    }

    fn registry_with(tab: Tab) -> TabRegistry {
        let mut registry = TabRegistry::new();
        registry.register(tab, None);
        registry
    }

    fn y_min(tree: &WidgetTree, command: &str) -> f32 {
        tree.find_by_command(command)
            .map(|e| e.placement.anchor.y_min)
            .unwrap_or(f32::NAN)
    }

    // ==================== Chrome Tests ====================

    #[test]
    fn test_empty_registry_renders_chrome_only() {
        let registry = TabRegistry::new();
        let mut session = Session::new(1);
        let tree = render(&registry, &mut session, &config());

        assert_eq!(tree.root(), "keel");
        assert!(tree.find_by_command("keel.close").is_some());
        assert!(tree.find_by_command("keel.changetab up").is_some());
        assert!(tree.find_by_command("keel.changetab down").is_some());
        assert!(tree.texts().contains(&"Admin Settings"));
        assert_eq!(tree.children("panels").count(), 0);
    }

    #[test]
    fn test_container_replaces_itself() {
        let mut session = Session::new(1);
        let tree = render(&TabRegistry::new(), &mut session, &config());
        match &tree.elements()[0].kind {
            ElementKind::Container {
                needs_cursor,
                destroy,
                layer,
                ..
            } => {
                assert!(*needs_cursor);
                assert_eq!(destroy.as_deref(), Some("keel"));
                assert_eq!(*layer, Layer::Hud);
            }
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[test]
    fn test_namespace_flows_into_commands() {
        let mut cfg = config();
        cfg.namespace = "admin".into();
        let mut tab = Tab::new("t", "T");
        tab.add_button(0, ButtonOption::new("go"));
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &cfg);

        assert!(tree.find_by_command("admin.close").is_some());
        assert!(tree.find_by_command("admin.callaction 0 0").is_some());
        assert!(tree.commands().iter().all(|c| c.starts_with("admin.")));
    }

    #[test]
    fn test_invalid_tab_index_renders_chrome_only() {
        let mut tab = Tab::new("t", "T");
        tab.add_button(0, ButtonOption::new("go"));
        let mut session = Session::new(1);
        session.tab_index = 5;
        let tree = render(&registry_with(tab), &mut session, &config());
        assert!(tree.find_by_command("keel.callaction 0 0").is_none());
    }

    #[test]
    fn test_cursor_lock() {
        let tree = render_cursor_lock("keel");
        assert_eq!(tree.root(), "keelcur");
        assert_eq!(tree.len(), 1);
    }

    // ==================== Tab Strip Tests ====================

    #[test]
    fn test_tab_strip_labels_and_provider() {
        let mut registry = TabRegistry::new();
        registry.register(Tab::new("carbon", "Carbon"), None);
        registry.register(
            Tab::new("players", "Players").with_provider(ProviderInfo::new("Ops", "1.2", "ana")),
            None,
        );
        let mut session = Session::new(1);
        let tree = render(&registry, &mut session, &config());

        let first = tree.find_by_command("keel.changetab 0").and_then(|e| e.text());
        let second = tree.find_by_command("keel.changetab 1").and_then(|e| e.text());
        assert_eq!(first, Some("Carbon"));
        assert_eq!(second, Some("Players\nOps (1.2) by ana"));
    }

    #[test]
    fn test_tab_strip_windows_from_scroll() {
        let mut registry = TabRegistry::new();
        for i in 0..12 {
            registry.register(Tab::new(format!("t{i}"), format!("Tab {i}")), None);
        }
        let mut session = Session::new(1);
        session.tab_index = 10;
        let tree = render(&registry, &mut session, &config());

        assert_eq!(session.tab_scroll, 3);
        assert!(tree.find_by_command("keel.changetab 2").is_none());
        assert!(tree.find_by_command("keel.changetab 3").is_some());
        assert!(tree.find_by_command("keel.changetab 10").is_some());
        assert!(tree.find_by_command("keel.changetab 11").is_none());
    }

    #[test]
    fn test_active_tab_is_highlighted() {
        let mut registry = TabRegistry::new();
        registry.register(Tab::new("a", "A"), None);
        registry.register(Tab::new("b", "B"), None);
        let mut session = Session::new(1);
        session.tab_index = 1;
        let tree = render(&registry, &mut session, &config());

        let active = tree.find_by_command("keel.changetab 1").map(|e| e.id.clone());
        let idle = tree.find_by_command("keel.changetab 0").map(|e| e.id.clone());
        assert_eq!(active.map(|id| tree.children(&id).count()), Some(1));
        assert_eq!(idle.map(|id| tree.children(&id).count()), Some(0));
    }

    // ==================== Column Tests ====================

    #[test]
    fn test_rows_stack_top_down() {
        let mut tab = Tab::new("t", "T");
        for i in 0..3 {
            tab.add_button(0, ButtonOption::new(format!("b{i}")));
        }
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        let top = y_min(&tree, "keel.callaction 0 0");
        let middle = y_min(&tree, "keel.callaction 0 1");
        let bottom = y_min(&tree, "keel.callaction 0 2");
        assert!(top > middle && middle > bottom);
        assert!((top - 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_each_column_gets_a_panel() {
        let mut tab = Tab::new("t", "T");
        tab.add_name(0, "left").add_name(2, "right");
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        assert!(tree.get("sub0").is_some());
        assert!(tree.get("sub2").is_some());
        assert!(tree.get("sub1").is_none());
        assert!(tree.texts().contains(&"LEFT"));
    }

    #[test]
    fn test_pagination_windows_rows() {
        let mut tab = Tab::new("t", "T");
        for i in 0..25 {
            tab.add_button(0, ButtonOption::new(format!("b{i}")));
        }
        let registry = registry_with(tab);
        let mut session = Session::new(1);
        session.get_or_create_page(0).next();
        let tree = render(&registry, &mut session, &config());

        assert_eq!(session.page(0).map(|p| (p.current(), p.total())), Some((0, 1)));
        assert!(tree.find_by_command("keel.callaction 0 0").is_some());
        assert!(tree.find_by_command("keel.callaction 0 19").is_none());
        assert!(tree.find_by_command("keel.changecolumnpage 0 1").is_some());
        assert!(tree.find_by_command("keel.changecolumnpage 0 4").is_some());
        // no way back from the first page
        assert!(tree.find_by_command("keel.changecolumnpage 0 2").is_none());
        assert!(tree.find_by_command("keel.changecolumnpage 0 3").is_some());
        assert_eq!(tree.children("sub00").count(), 6);
    }

    #[test]
    fn test_second_page_shows_tail() {
        let mut tab = Tab::new("t", "T");
        for i in 0..25 {
            tab.add_button(0, ButtonOption::new(format!("b{i}")));
        }
        let registry = registry_with(tab);
        let mut session = Session::new(1);
        *session.get_or_create_page(0) = Page::new(1, 1);
        let tree = render(&registry, &mut session, &config());

        assert!(tree.find_by_command("keel.callaction 0 18").is_none());
        for row in 19..25 {
            assert!(tree.find_by_command(&format!("keel.callaction 0 {row}")).is_some());
        }
        assert!(tree.texts().contains(&" / 2"));
    }

    #[test]
    fn test_override_replaces_columns() {
        let tab = Tab::new("t", "T").override_render(|_, tree, parent, _| {
            tree.text(parent, Some("custom"), "hello", TextStyle::new(12), Placement::FULL);
        });
        let mut tab = tab;
        tab.add_button(0, ButtonOption::new("hidden"));
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        assert_eq!(tree.get("custom").and_then(|e| e.parent.as_deref()), Some("panels"));
        assert!(tree.find_by_command("keel.callaction 0 0").is_none());
    }

    // ==================== Widget Tests ====================

    #[test]
    fn test_toggle_checkmark_follows_state() {
        let mut tab = Tab::new("t", "T");
        tab.add_toggle(0, "On", |_| {}, |_| true);
        tab.add_toggle(0, "Off", |_| {}, |_| false);
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        let images = tree
            .elements()
            .iter()
            .filter(|e| matches!(&e.kind, ElementKind::Image { source, .. } if source == "checkmark"))
            .count();
        assert_eq!(images, 1);
        assert!(tree.texts().contains(&"On:"));
    }

    #[test]
    fn test_input_field_and_read_only() {
        let mut tab = Tab::new("t", "T");
        tab.add_input(0, InputOption::new("Host").placeholder(|| "localhost".into()).on_submit(|_, _| {}));
        tab.add_read_only(0, "Version", || "1.0".into());
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        let editable = tree.find_by_command("keel.callaction 0 0").map(|e| e.kind.clone());
        match editable {
            Some(ElementKind::Input { text, field, .. }) => {
                assert_eq!(text, "localhost");
                assert!(!field.read_only);
            }
            other => panic!("expected input, got {other:?}"),
        }
        let fixed = tree.find_by_command("keel.callaction 0 1").map(|e| e.kind.clone());
        assert!(matches!(fixed, Some(ElementKind::Input { field, .. }) if field.read_only));
    }

    #[test]
    fn test_enum_arrows() {
        let mut tab = Tab::new("t", "T");
        tab.add_enum(0, "Mode", |_, _| {}, || "Fast".into());
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        assert!(tree.find_by_command("keel.callaction 0 0 true").is_some());
        assert!(tree.find_by_command("keel.callaction 0 0 false").is_some());
        assert!(tree.texts().contains(&"Fast"));
    }

    #[test]
    fn test_radio_marks_selected_member() {
        let mut tab = Tab::new("t", "T");
        tab.add_radio(0, "a", "g", false, |_, _| {});
        tab.add_radio(0, "b", "g", true, |_, _| {});
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        let marked = |cmd: &str| {
            tree.find_by_command(cmd)
                .map(|e| tree.children(&e.id).count())
                .unwrap_or_default()
        };
        assert_eq!(marked("keel.callaction 0 0"), 0);
        assert_eq!(marked("keel.callaction 0 1"), 1);
    }

    #[test]
    fn test_closed_dropdown_shows_selection_only() {
        let mut tab = Tab::new("t", "T");
        tab.add_dropdown(0, DropdownOption::new("Map", ["a", "b", "c"]).selected(|| 1));
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        assert!(tree.find_by_command("keel.callaction 0 0 false").is_some());
        assert!(tree.texts().contains(&"b"));
        assert!(tree.find_by_command("keel.callaction 0 0 true call 0").is_none());
    }

    #[test]
    fn test_open_dropdown_lists_page() {
        let mut tab = Tab::new("t", "T");
        let options: Vec<String> = (0..25).map(|i| format!("opt{i}")).collect();
        tab.add_dropdown(0, DropdownOption::new("Map", options));
        let id = match tab.row(0, 0) {
            Some(Widget::Dropdown(d)) => d.id,
            _ => unreachable!(),
        };
        let registry = registry_with(tab);
        let mut session = Session::new(1);
        session.open_dropdown_with(id);
        if let Some(open) = session.open_dropdown_mut() {
            open.page = Page::new(1, 2);
        }
        let tree = render(&registry, &mut session, &config());

        assert!(tree.find_by_command("keel.callaction 0 0 true call 9").is_none());
        assert!(tree.find_by_command("keel.callaction 0 0 true call 10").is_some());
        assert!(tree.find_by_command("keel.callaction 0 0 true call 19").is_some());
        assert!(tree.find_by_command("keel.callaction 0 0 true call 20").is_none());
        for token in ["--", "-1", "1", "++"] {
            let command = format!("keel.callaction 0 0 true {token}");
            assert!(tree.find_by_command(&command).is_some(), "{command}");
        }
        assert!(tree.texts().contains(&"2 / 3"));
    }

    #[test]
    fn test_range_cells() {
        let mut tab = Tab::new("t", "T");
        tab.add_range(
            0,
            RangeOption::new("Volume", 0.0, 100.0)
                .value(|| 50.0)
                .text(|| "50%".into()),
        );
        let mut cfg = config();
        cfg.layout.range_cuts = 10;
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &cfg);

        assert!(tree.find_by_command("keel.callaction 0 0 0").is_some());
        assert!(tree.find_by_command("keel.callaction 0 0 9").is_some());
        assert!(tree.find_by_command("keel.callaction 0 0 10").is_none());
        assert!(tree.texts().contains(&"50%"));
        let half = tree
            .elements()
            .iter()
            .any(|e| (e.placement.anchor.x_max - 0.5).abs() < 1e-4 && e.placement.anchor.x_min == 0.0);
        assert!(half);
    }

    #[test]
    fn test_button_array_and_input_button() {
        let mut tab = Tab::new("t", "T");
        tab.add_button_array(0, vec![ButtonOption::new("a"), ButtonOption::new("b")]);
        tab.add_input_button(
            0,
            "Say",
            0.25,
            InputOption::new("").on_submit(|_, _| {}),
            ButtonOption::new("Send"),
        );
        tab.add_text(0, TextOption::new("note", 10, Color::WHITE));
        let mut session = Session::new(1);
        let tree = render(&registry_with(tab), &mut session, &config());

        assert!(tree.find_by_command("keel.callaction 0 0 0").is_some());
        assert!(tree.find_by_command("keel.callaction 0 0 1").is_some());
        assert!(tree.find_by_command("keel.callaction 0 1 input").is_some());
        assert_eq!(
            tree.find_by_command("keel.callaction 0 1 button").and_then(|e| e.text()),
            Some("Send")
        );
        assert!(tree.texts().contains(&"note"));
    }

    #[test]
    fn test_button_highlight_reads_session() {
        let mut tab = Tab::new("t", "T");
        tab.add_button(
            0,
            ButtonOption::new("pick").highlight(|s: &Session| {
                if s.get::<bool>("picked") {
                    Highlight::Selected
                } else {
                    Highlight::None
                }
            }),
        );
        let registry = registry_with(tab);
        let mut session = Session::new(1);
        session.set("picked", true);
        let tree = render(&registry, &mut session, &config());

        let color = tree.find_by_command("keel.callaction 0 0").map(|e| match &e.kind {
            ElementKind::Button { color, .. } => *color,
            _ => Color::TRANSPARENT,
        });
        assert_eq!(color, Some(Highlight::Selected.color()));
    }
}
