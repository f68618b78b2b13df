//! The closed set of widgets a tab column can hold.
//!
//! Widgets are anonymous: the panel addresses them by `(column, row)` only.
//! Every callback is an `Arc` handle so a widget can be cloned out of its
//! tab before the callback runs with mutable access to that same tab.

use crate::context::ActionContext;
use crate::session::Session;
use crate::tree::{Align, Color, Font};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Invoked on a plain press.
pub type ActionFn = Arc<dyn Fn(&mut ActionContext<'_>) + Send + Sync>;
/// Invoked with the tokens submitted from an input field.
pub type InputFn = Arc<dyn Fn(&mut ActionContext<'_>, &[String]) + Send + Sync>;
/// Invoked with `true` when stepping backward through an enum.
pub type EnumFn = Arc<dyn Fn(&mut ActionContext<'_>, bool) + Send + Sync>;
/// Invoked with the new selection state of a radio member.
pub type RadioFn = Arc<dyn Fn(&mut ActionContext<'_>, bool) + Send + Sync>;
/// Invoked with the absolute index of the chosen dropdown entry.
pub type DropdownFn = Arc<dyn Fn(&mut ActionContext<'_>, usize) + Send + Sync>;
/// Invoked with a value mapped into the range's domain.
pub type RangeFn = Arc<dyn Fn(&mut ActionContext<'_>, f32) + Send + Sync>;

pub type HighlightFn = Arc<dyn Fn(&Session) -> Highlight + Send + Sync>;
pub type IsOnFn = Arc<dyn Fn(&Session) -> bool + Send + Sync>;
pub type TextFn = Arc<dyn Fn() -> String + Send + Sync>;
pub type IndexFn = Arc<dyn Fn() -> usize + Send + Sync>;
pub type ValueFn = Arc<dyn Fn() -> f32 + Send + Sync>;

/// Emphasis applied to buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Selected,
    Warned,
    Important,
}

impl Highlight {
    /// Background color for a control with this emphasis.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Highlight::Selected => Color::rgba(0.4, 0.7, 0.2, 0.7),
            Highlight::Warned => Color::rgba(0.8, 0.7, 0.2, 0.7),
            Highlight::Important => Color::rgba(0.97, 0.2, 0.1, 0.7),
            Highlight::None => Color::rgba(0.2, 0.2, 0.2, 0.5),
        }
    }
}

/// Process-unique identity of a dropdown.
///
/// Clones of a dropdown share the id, so a rebuilt column holding the same
/// widget keeps its open state while a freshly constructed one does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropdownId(u64);

static NEXT_DROPDOWN: AtomicU64 = AtomicU64::new(1);

impl DropdownId {
    /// Allocates a fresh id.
    #[must_use]
    pub fn next() -> Self {
        DropdownId(NEXT_DROPDOWN.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

// === Variant payloads ===

/// Section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct NameOption {
    pub label: String,
    pub align: Align,
}

/// Free-form text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOption {
    pub label: String,
    pub size: u32,
    pub color: Color,
    pub font: Font,
    pub align: Align,
}

impl TextOption {
    #[must_use]
    pub fn new(label: impl Into<String>, size: u32, color: Color) -> Self {
        TextOption {
            label: label.into(),
            size,
            color,
            font: Font::Regular,
            align: Align::MiddleCenter,
        }
    }

    #[must_use]
    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

#[derive(Clone)]
pub struct ButtonOption {
    pub label: String,
    pub align: Align,
    pub on_press: Option<ActionFn>,
    pub highlight: Option<HighlightFn>,
}

impl ButtonOption {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        ButtonOption {
            label: label.into(),
            align: Align::MiddleCenter,
            on_press: None,
            highlight: None,
        }
    }

    #[must_use]
    pub fn on_press<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) + Send + Sync + 'static,
    {
        self.on_press = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn highlight<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session) -> Highlight + Send + Sync + 'static,
    {
        self.highlight = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Evaluates the highlight for `session`, `None` when unset.
    #[must_use]
    pub fn highlight_for(&self, session: &Session) -> Highlight {
        self.highlight.as_ref().map_or(Highlight::None, |f| f(session))
    }
}

#[derive(Clone)]
pub struct ToggleOption {
    pub label: String,
    pub on_toggle: Option<ActionFn>,
    pub is_on: Option<IsOnFn>,
}

impl ToggleOption {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        ToggleOption {
            label: label.into(),
            on_toggle: None,
            is_on: None,
        }
    }

    #[must_use]
    pub fn on_toggle<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) + Send + Sync + 'static,
    {
        self.on_toggle = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn is_on<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session) -> bool + Send + Sync + 'static,
    {
        self.is_on = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn is_on_for(&self, session: &Session) -> bool {
        self.is_on.as_ref().is_some_and(|f| f(session))
    }
}

#[derive(Clone)]
pub struct InputOption {
    pub label: String,
    pub placeholder: Option<TextFn>,
    pub char_limit: usize,
    pub read_only: bool,
    pub on_submit: Option<InputFn>,
}

impl InputOption {
    /// Editable input. Becomes read-only when `on_submit` is never set.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        InputOption {
            label: label.into(),
            placeholder: None,
            char_limit: 0,
            read_only: true,
            on_submit: None,
        }
    }

    #[must_use]
    pub fn placeholder<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.placeholder = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_submit<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>, &[String]) + Send + Sync + 'static,
    {
        self.on_submit = Some(Arc::new(f));
        self.read_only = false;
        self
    }

    #[must_use]
    pub fn char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn placeholder_text(&self) -> String {
        self.placeholder.as_ref().map(|f| f()).unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct EnumOption {
    pub label: String,
    pub text: Option<TextFn>,
    pub on_step: Option<EnumFn>,
}

impl EnumOption {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        EnumOption {
            label: label.into(),
            text: None,
            on_step: None,
        }
    }

    #[must_use]
    pub fn text<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.text = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_step<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>, bool) + Send + Sync + 'static,
    {
        self.on_step = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn current_text(&self) -> String {
        self.text.as_ref().map(|f| f()).unwrap_or_default()
    }
}

/// Member of a radio group; its callback lives in the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioOption {
    pub label: String,
    pub group: String,
    pub index: usize,
    pub wants_on: bool,
}

#[derive(Clone)]
pub struct DropdownOption {
    pub id: DropdownId,
    pub label: String,
    pub selected: Option<IndexFn>,
    pub options: Vec<String>,
    pub icons: Vec<String>,
    pub icon_scale: f32,
    pub on_select: Option<DropdownFn>,
}

impl DropdownOption {
    #[must_use]
    pub fn new<I, S>(label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DropdownOption {
            id: DropdownId::next(),
            label: label.into(),
            selected: None,
            options: options.into_iter().map(Into::into).collect(),
            icons: Vec::new(),
            icon_scale: 0.0,
            on_select: None,
        }
    }

    #[must_use]
    pub fn selected<F>(mut self, f: F) -> Self
    where
        F: Fn() -> usize + Send + Sync + 'static,
    {
        self.selected = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_select<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>, usize) + Send + Sync + 'static,
    {
        self.on_select = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn icons<I, S>(mut self, icons: I, scale: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.icons = icons.into_iter().map(Into::into).collect();
        self.icon_scale = scale;
        self
    }

    /// Index of the currently selected entry, clamped into the option list.
    #[must_use]
    pub fn selected_index(&self) -> usize {
        let index = self.selected.as_ref().map_or(0, |f| f());
        index.min(self.options.len().saturating_sub(1))
    }

    #[must_use]
    pub fn icon(&self, index: usize) -> Option<&str> {
        self.icons
            .get(index)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Clone)]
pub struct RangeOption {
    pub label: String,
    pub min: f32,
    pub max: f32,
    pub value: Option<ValueFn>,
    pub text: Option<TextFn>,
    pub on_change: Option<RangeFn>,
}

impl RangeOption {
    #[must_use]
    pub fn new(label: impl Into<String>, min: f32, max: f32) -> Self {
        RangeOption {
            label: label.into(),
            min,
            max,
            value: None,
            text: None,
            on_change: None,
        }
    }

    #[must_use]
    pub fn value<F>(mut self, f: F) -> Self
    where
        F: Fn() -> f32 + Send + Sync + 'static,
    {
        self.value = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn text<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.text = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>, f32) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Caption drawn over the bar, empty when unset.
    #[must_use]
    pub fn caption(&self) -> String {
        self.text.as_ref().map(|f| f()).unwrap_or_default()
    }

    /// Maps slider cell `cell` of `cuts` into `[min, max]`.
    #[must_use]
    pub fn value_at(&self, cell: f32, cuts: usize) -> f32 {
        let cuts = cuts.max(1) as f32;
        let value = self.min + cell / cuts * (self.max - self.min);
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(lo, hi)
    }

    /// Fill fraction of the current value in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        let value = self.value.as_ref().map_or(self.min, |f| f());
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[derive(Clone)]
pub struct ButtonArrayOption {
    pub buttons: Vec<ButtonOption>,
    pub spacing: f32,
}

#[derive(Clone)]
pub struct InputButtonOption {
    pub label: String,
    pub input: InputOption,
    pub button: ButtonOption,
    /// Share of the row width given to the button.
    pub button_priority: f32,
}

/// A row in a tab column.
#[derive(Clone)]
pub enum Widget {
    Name(NameOption),
    Text(TextOption),
    Button(ButtonOption),
    Toggle(ToggleOption),
    Input(InputOption),
    Enum(EnumOption),
    Radio(RadioOption),
    Dropdown(DropdownOption),
    Range(RangeOption),
    ButtonArray(ButtonArrayOption),
    InputButton(InputButtonOption),
}

impl Widget {
    /// Display label of the row. Button arrays have none.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Widget::Name(o) => &o.label,
            Widget::Text(o) => &o.label,
            Widget::Button(o) => &o.label,
            Widget::Toggle(o) => &o.label,
            Widget::Input(o) => &o.label,
            Widget::Enum(o) => &o.label,
            Widget::Radio(o) => &o.label,
            Widget::Dropdown(o) => &o.label,
            Widget::Range(o) => &o.label,
            Widget::ButtonArray(_) => "",
            Widget::InputButton(o) => &o.label,
        }
    }

    /// Short name of the variant, for tracing.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Name(_) => "name",
            Widget::Text(_) => "text",
            Widget::Button(_) => "button",
            Widget::Toggle(_) => "toggle",
            Widget::Input(_) => "input",
            Widget::Enum(_) => "enum",
            Widget::Radio(_) => "radio",
            Widget::Dropdown(_) => "dropdown",
            Widget::Range(_) => "range",
            Widget::ButtonArray(_) => "button_array",
            Widget::InputButton(_) => "input_button",
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Dropdown(o) => f
                .debug_struct("Dropdown")
                .field("id", &o.id)
                .field("label", &o.label)
                .field("options", &o.options.len())
                .finish(),
            Widget::Radio(o) => f
                .debug_struct("Radio")
                .field("label", &o.label)
                .field("group", &o.group)
                .field("index", &o.index)
                .finish(),
            Widget::ButtonArray(o) => f
                .debug_struct("ButtonArray")
                .field("buttons", &o.buttons.len())
                .finish(),
            other => f
                .debug_struct("Widget")
                .field("kind", &other.kind())
                .field("label", &other.label())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdown_ids_are_unique() {
        let a = DropdownOption::new("Mode", ["a", "b"]);
        let b = DropdownOption::new("Mode", ["a", "b"]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.clone().id, a.id);
    }

    #[test]
    fn test_dropdown_selected_index_is_clamped() {
        let dropdown = DropdownOption::new("Mode", ["a", "b", "c"]).selected(|| 9);
        assert_eq!(dropdown.selected_index(), 2);
        let empty = DropdownOption::new("Empty", Vec::<String>::new()).selected(|| 3);
        assert_eq!(empty.selected_index(), 0);
    }

    #[test]
    fn test_dropdown_icon_lookup() {
        let dropdown = DropdownOption::new("Mode", ["a", "b", "c"]).icons(["star", ""], 0.5);
        assert_eq!(dropdown.icon(0), Some("star"));
        assert_eq!(dropdown.icon(1), None);
        assert_eq!(dropdown.icon(2), None);
    }

    #[test]
    fn test_range_value_mapping() {
        let range = RangeOption::new("Volume", 0.0, 100.0);
        assert!((range.value_at(12.0, 50) - 24.0).abs() < 1e-4);
        assert!((range.value_at(0.0, 50)).abs() < 1e-4);
        assert!((range.value_at(80.0, 50) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_range_fraction() {
        let range = RangeOption::new("Speed", 10.0, 20.0).value(|| 15.0);
        assert!((range.fraction() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_input_builder_read_only_follows_callback() {
        let plain = InputOption::new("Host");
        assert!(plain.read_only);
        let editable = InputOption::new("Host").on_submit(|_, _| {});
        assert!(!editable.read_only);
        assert_eq!(editable.placeholder_text(), "");
    }

    #[test]
    fn test_button_highlight_defaults_to_none() {
        let session = Session::new(1);
        let plain = ButtonOption::new("Go");
        assert_eq!(plain.highlight_for(&session), Highlight::None);
        let hot = ButtonOption::new("Go").highlight(|_| Highlight::Important);
        assert_eq!(hot.highlight_for(&session), Highlight::Important);
    }

    #[test]
    fn test_highlight_colors() {
        assert_eq!(Highlight::Selected.color().to_string(), "0.4 0.7 0.2 0.7");
        assert_eq!(Highlight::None.color().to_string(), "0.2 0.2 0.2 0.5");
    }

    #[test]
    fn test_widget_debug_hides_callbacks() {
        let widget = Widget::Button(ButtonOption::new("Save").on_press(|_| {}));
        assert_eq!(format!("{widget:?}"), "Widget { kind: \"button\", label: \"Save\" }");
    }
}
