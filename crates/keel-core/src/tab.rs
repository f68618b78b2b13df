//! Tabs and their column/row mutation API.
//!
//! A [`Tab`] owns indexed columns of [`Widget`] rows. Providers build a tab
//! once and then rebuild individual columns from inside their own callbacks
//! (clear a column, re-add rows). Rows are addressed by `(column, row)`, so
//! a coordinate is only meaningful until the next mutation of its column.

use crate::context::ActionContext;
use crate::radio::RadioGroup;
use crate::session::Session;
use crate::tree::{Align, WidgetTree};
use crate::widget::{
    ButtonArrayOption, ButtonOption, DropdownOption, EnumOption, InputButtonOption, InputOption,
    NameOption, RadioOption, RangeOption, TextOption, ToggleOption, Widget,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a tab within a registry.
pub type TabId = String;

/// Invoked on tab switches with the tab itself and the switching viewer's session.
pub type ChangeFn = Arc<dyn Fn(&mut Tab, &mut Session) + Send + Sync>;

/// Replaces column rendering entirely: `(tab, tree, parent, session)`.
pub type OverrideFn = Arc<dyn Fn(&Tab, &mut WidgetTree, &str, &Session) + Send + Sync>;

/// Who supplied a tab, shown under its name in the tab strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub version: String,
    pub author: String,
}

impl ProviderInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        ProviderInfo {
            name: name.into(),
            version: version.into(),
            author: author.into(),
        }
    }
}

impl fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) by {}", self.name, self.version, self.author)
    }
}

/// A named container of columns.
///
/// # Example
///
/// ```
/// use keel_core::{ButtonOption, Tab};
///
/// let mut tab = Tab::new("carbon", "Carbon");
/// tab.add_name(0, "Info")
///     .add_read_only(0, "Version", || "1.0".to_string())
///     .add_button(1, ButtonOption::new("Save").on_press(|_| {}));
///
/// assert_eq!(tab.column_count(), 2);
/// assert_eq!(tab.row(0, 1).map(|w| w.label()), Some("Version"));
/// ```
#[derive(Clone)]
pub struct Tab {
    id: TabId,
    name: String,
    provider: Option<ProviderInfo>,
    columns: BTreeMap<usize, Vec<Widget>>,
    radios: HashMap<String, RadioGroup>,
    on_change: Option<ChangeFn>,
    override_render: Option<OverrideFn>,
}

impl Tab {
    pub fn new(id: impl Into<TabId>, name: impl Into<String>) -> Self {
        Tab {
            id: id.into(),
            name: name.into(),
            provider: None,
            columns: BTreeMap::new(),
            radios: HashMap::new(),
            on_change: None,
            override_render: None,
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: ProviderInfo) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the hook fired whenever a viewer switches tabs.
    #[must_use]
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Tab, &mut Session) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Takes over rendering of the tab body. Columns are then ignored.
    #[must_use]
    pub fn override_render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Tab, &mut WidgetTree, &str, &Session) + Send + Sync + 'static,
    {
        self.override_render = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn change_hook(&self) -> Option<ChangeFn> {
        self.on_change.clone()
    }

    #[must_use]
    pub fn override_hook(&self) -> Option<OverrideFn> {
        self.override_render.clone()
    }

    // === Columns ===

    /// Ensures `column` exists. Existing rows are kept.
    pub fn add_column(&mut self, column: usize) -> &mut Self {
        self.columns.entry(column).or_default();
        self
    }

    /// Appends `widget` to `column`, creating the column on demand.
    pub fn add_row(&mut self, column: usize, widget: Widget) -> &mut Self {
        self.columns.entry(column).or_default().push(widget);
        self
    }

    /// Empties `column`; with `erase` the column itself is removed too.
    pub fn clear_column(&mut self, column: usize, erase: bool) {
        if erase {
            self.columns.remove(&column);
        } else if let Some(rows) = self.columns.get_mut(&column) {
            rows.clear();
        }
    }

    /// Empties every column at or after `index`.
    pub fn clear_after(&mut self, index: usize) {
        for rows in self.columns.range_mut(index..).map(|(_, rows)| rows) {
            rows.clear();
        }
    }

    #[must_use]
    pub fn column(&self, column: usize) -> Option<&[Widget]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    #[must_use]
    pub fn row(&self, column: usize, row: usize) -> Option<&Widget> {
        self.columns.get(&column).and_then(|rows| rows.get(row))
    }

    /// Columns in ascending index order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &[Widget])> {
        self.columns.iter().map(|(i, rows)| (*i, rows.as_slice()))
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    // === Row constructors ===

    /// Adds a left-aligned section heading.
    pub fn add_name(&mut self, column: usize, label: impl Into<String>) -> &mut Self {
        self.add_row(
            column,
            Widget::Name(NameOption {
                label: label.into(),
                align: Align::MiddleLeft,
            }),
        )
    }

    pub fn add_text(&mut self, column: usize, text: TextOption) -> &mut Self {
        self.add_row(column, Widget::Text(text))
    }

    pub fn add_button(&mut self, column: usize, button: ButtonOption) -> &mut Self {
        self.add_row(column, Widget::Button(button))
    }

    pub fn add_toggle<F, G>(
        &mut self,
        column: usize,
        label: impl Into<String>,
        on_toggle: F,
        is_on: G,
    ) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>) + Send + Sync + 'static,
        G: Fn(&Session) -> bool + Send + Sync + 'static,
    {
        self.add_row(
            column,
            Widget::Toggle(ToggleOption::new(label).on_toggle(on_toggle).is_on(is_on)),
        )
    }

    pub fn add_input(&mut self, column: usize, input: InputOption) -> &mut Self {
        self.add_row(column, Widget::Input(input))
    }

    /// Adds a read-only input that only displays `text`.
    pub fn add_read_only<F>(&mut self, column: usize, label: impl Into<String>, text: F) -> &mut Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.add_row(
            column,
            Widget::Input(InputOption::new(label).placeholder(text).read_only(true)),
        )
    }

    pub fn add_enum<F, G>(
        &mut self,
        column: usize,
        label: impl Into<String>,
        on_step: F,
        text: G,
    ) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>, bool) + Send + Sync + 'static,
        G: Fn() -> String + Send + Sync + 'static,
    {
        self.add_row(
            column,
            Widget::Enum(EnumOption::new(label).on_step(on_step).text(text)),
        )
    }

    /// Adds a member of radio group `group`, creating the group on first use.
    ///
    /// Members are indexed in insertion order. With `wants_on` the member is
    /// pre-selected without notifying the previous selection.
    pub fn add_radio<F>(
        &mut self,
        column: usize,
        label: impl Into<String>,
        group: impl Into<String>,
        wants_on: bool,
        on_change: F,
    ) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>, bool) + Send + Sync + 'static,
    {
        let group = group.into();
        let index = self
            .radios
            .entry(group.clone())
            .or_default()
            .register(wants_on, Some(Arc::new(on_change)));
        self.add_row(
            column,
            Widget::Radio(RadioOption {
                label: label.into(),
                group,
                index,
                wants_on,
            }),
        )
    }

    pub fn add_dropdown(&mut self, column: usize, dropdown: DropdownOption) -> &mut Self {
        self.add_row(column, Widget::Dropdown(dropdown))
    }

    pub fn add_range(&mut self, column: usize, range: RangeOption) -> &mut Self {
        self.add_row(column, Widget::Range(range))
    }

    /// Adds a row of buttons with the default 0.01 spacing.
    pub fn add_button_array(&mut self, column: usize, buttons: Vec<ButtonOption>) -> &mut Self {
        self.add_button_array_spaced(column, 0.01, buttons)
    }

    pub fn add_button_array_spaced(
        &mut self,
        column: usize,
        spacing: f32,
        buttons: Vec<ButtonOption>,
    ) -> &mut Self {
        self.add_row(
            column,
            Widget::ButtonArray(ButtonArrayOption { buttons, spacing }),
        )
    }

    pub fn add_input_button(
        &mut self,
        column: usize,
        label: impl Into<String>,
        button_priority: f32,
        input: InputOption,
        button: ButtonOption,
    ) -> &mut Self {
        self.add_row(
            column,
            Widget::InputButton(InputButtonOption {
                label: label.into(),
                input,
                button,
                button_priority,
            }),
        )
    }

    // === Radio groups ===

    #[must_use]
    pub fn radio_group(&self, group: &str) -> Option<&RadioGroup> {
        self.radios.get(group)
    }

    pub fn radio_group_mut(&mut self, group: &str) -> Option<&mut RadioGroup> {
        self.radios.get_mut(group)
    }

    /// Drops radio group `group` so a rebuilt column restarts its indices.
    pub fn clear_radios(&mut self, group: &str) {
        self.radios.remove(group);
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("columns", &self.columns)
            .field("radios", &self.radios)
            .field("on_change", &self.on_change.is_some())
            .field("override_render", &self.override_render.is_some())
            .finish()
    }
}
