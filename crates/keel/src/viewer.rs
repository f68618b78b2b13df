//! Terminal rasterizer and input routing for widget trees.
//!
//! Widget trees place elements with anchor fractions of their parent, y
//! growing upwards, plus pixel offsets. [`layout`] maps them onto terminal
//! cells; [`TreeView`] paints them; [`ViewerState`] turns keys and clicks
//! into the command strings the element carries.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keel_core::{Align, Color as TreeColor, Element, ElementKind, Font, Placement, WidgetTree};
use ratatui::prelude::*;
use std::collections::HashMap;

/// Pixels per terminal cell, used to scale placement offsets.
const CELL_WIDTH: f32 = 8.0;
const CELL_HEIGHT: f32 = 16.0;

/// Colors this transparent are not painted.
const MIN_ALPHA: f32 = 0.05;

/// An element with its terminal rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Placed<'a> {
    pub element: &'a Element,
    pub rect: Rect,
}

/// Maps `placement` inside `parent` onto cells.
pub fn place(parent: Rect, placement: &Placement) -> Rect {
    let (anchor, offset) = (&placement.anchor, &placement.offset);
    let w = f32::from(parent.width);
    let h = f32::from(parent.height);

    let left = f32::from(parent.x) + anchor.x_min * w + offset.x_min / CELL_WIDTH;
    let right = f32::from(parent.x) + anchor.x_max * w + offset.x_max / CELL_WIDTH;
    let top = f32::from(parent.y) + (1.0 - anchor.y_max) * h - offset.y_max / CELL_HEIGHT;
    let bottom = f32::from(parent.y) + (1.0 - anchor.y_min) * h - offset.y_min / CELL_HEIGHT;

    let x = left.round().max(0.0);
    let y = top.round().max(0.0);
    let width = span(left, right);
    let height = span(top, bottom);
    Rect::new(x as u16, y as u16, width as u16, height as u16)
}

// Anything with a positive extent keeps at least one cell.
fn span(start: f32, end: f32) -> f32 {
    if end <= start {
        0.0
    } else {
        (end - start).round().max(1.0)
    }
}

/// Places every element of `trees` inside `area`, in draw order.
pub fn layout(trees: &[WidgetTree], area: Rect) -> Vec<Placed<'_>> {
    let mut placed = Vec::new();
    for tree in trees {
        let mut rects: HashMap<&str, Rect> = HashMap::new();
        for element in tree.elements() {
            let parent = element
                .parent
                .as_deref()
                .and_then(|p| rects.get(p).copied())
                .unwrap_or(area);
            let rect = place(parent, &element.placement).intersection(area);
            rects.insert(element.id.as_str(), rect);
            placed.push(Placed { element, rect });
        }
    }
    placed
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
}

/// Topmost element carrying a command under cell `(x, y)`.
pub fn hit_test<'a>(placed: &'a [Placed<'a>], x: u16, y: u16) -> Option<&'a Placed<'a>> {
    placed
        .iter()
        .rev()
        .find(|p| p.element.command().is_some() && contains(p.rect, x, y))
}

/// Elements that can take focus, in draw order.
fn targets<'a>(placed: &'a [Placed<'a>]) -> Vec<&'a Placed<'a>> {
    placed
        .iter()
        .filter(|p| p.element.command().is_some() && !p.rect.is_empty())
        .filter(|p| match &p.element.kind {
            ElementKind::Input { field, .. } => !field.read_only,
            _ => true,
        })
        .collect()
}

// ==================== Input ====================

/// What the host should do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Feed this command line to the panel.
    Send(String),
    /// The panel is closed and the user asked for it.
    Open,
    Quit,
}

#[derive(Debug, Clone)]
struct Editing {
    command: String,
    buffer: String,
    char_limit: usize,
}

/// Focus and text-entry state of the local viewer.
///
/// Focus is tracked by command string so it survives redraws that
/// regenerate element ids.
#[derive(Debug, Default)]
pub struct ViewerState {
    focus: Option<String>,
    editing: Option<Editing>,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Text typed so far, when an input field is being edited.
    pub fn buffer(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.buffer.as_str())
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Drops focus and any half-typed text, e.g. after the panel closed.
    pub fn reset(&mut self) {
        self.focus = None;
        self.editing = None;
    }

    pub fn on_key(&mut self, key: KeyEvent, placed: &[Placed<'_>]) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'q'))
        {
            return Action::Quit;
        }
        if self.editing.is_some() {
            return self.on_edit_key(key);
        }
        if placed.is_empty() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('o') => Action::Open,
                KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Tab | KeyCode::Down | KeyCode::Right => {
                self.move_focus(placed, true);
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Left => {
                self.move_focus(placed, false);
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let focused = targets(placed)
                    .into_iter()
                    .find(|p| p.element.command() == self.focus.as_deref());
                match focused {
                    Some(target) => self.activate(target.element),
                    None => Action::None,
                }
            }
            _ => Action::None,
        }
    }

    /// Left click at cell `(x, y)`.
    pub fn on_click(&mut self, x: u16, y: u16, placed: &[Placed<'_>]) -> Action {
        self.editing = None;
        match hit_test(placed, x, y) {
            Some(hit) => {
                self.focus = hit.element.command().map(str::to_string);
                self.activate(hit.element)
            }
            None => Action::None,
        }
    }

    fn activate(&mut self, element: &Element) -> Action {
        match &element.kind {
            ElementKind::Input { field, .. } if field.read_only => Action::None,
            ElementKind::Input { field, .. } => {
                if let Some(command) = &field.command {
                    self.editing = Some(Editing {
                        command: command.clone(),
                        buffer: String::new(),
                        char_limit: field.char_limit,
                    });
                }
                Action::None
            }
            _ => element
                .command()
                .map_or(Action::None, |c| Action::Send(c.to_string())),
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) -> Action {
        let Some(editing) = self.editing.as_mut() else {
            return Action::None;
        };
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                Action::None
            }
            KeyCode::Enter => match self.editing.take() {
                Some(Editing {
                    command, buffer, ..
                }) if buffer.trim().is_empty() => Action::Send(command),
                Some(Editing {
                    command, buffer, ..
                }) => Action::Send(format!("{command} {}", buffer.trim())),
                None => Action::None,
            },
            KeyCode::Backspace => {
                editing.buffer.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                let full =
                    editing.char_limit > 0 && editing.buffer.chars().count() >= editing.char_limit;
                if !full {
                    editing.buffer.push(c);
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn move_focus(&mut self, placed: &[Placed<'_>], forward: bool) {
        let commands: Vec<&str> = targets(placed)
            .into_iter()
            .filter_map(|p| p.element.command())
            .collect();
        if commands.is_empty() {
            self.focus = None;
            return;
        }
        let current = self
            .focus
            .as_deref()
            .and_then(|f| commands.iter().position(|c| *c == f));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => commands.len() - 1,
            (Some(i), true) => (i + 1) % commands.len(),
            (Some(i), false) => (i + commands.len() - 1) % commands.len(),
        };
        self.focus = Some(commands[next].to_string());
    }
}

// ==================== Painting ====================

fn to_color(color: TreeColor) -> Option<Color> {
    if color.a < MIN_ALPHA {
        return None;
    }
    // Blend over black, the terminal has no alpha.
    let channel = |v: f32| ((v * color.a).clamp(0.0, 1.0) * 255.0).round() as u8;
    Some(Color::Rgb(
        channel(color.r),
        channel(color.g),
        channel(color.b),
    ))
}

fn fill(buf: &mut Buffer, rect: Rect, color: TreeColor) {
    let Some(bg) = to_color(color) else {
        return;
    };
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            buf[(x, y)].set_bg(bg);
        }
    }
}

fn write_aligned(buf: &mut Buffer, rect: Rect, text: &str, align: Align, style: Style) {
    if rect.is_empty() || text.is_empty() {
        return;
    }
    let text: String = text.chars().take(usize::from(rect.width)).collect();
    let len = text.chars().count() as u16;

    let x = match align {
        Align::UpperLeft | Align::MiddleLeft | Align::LowerLeft => rect.x,
        Align::UpperCenter | Align::MiddleCenter | Align::LowerCenter => {
            rect.x + (rect.width - len) / 2
        }
        Align::UpperRight | Align::MiddleRight | Align::LowerRight => rect.right() - len,
    };
    let y = match align {
        Align::UpperLeft | Align::UpperCenter | Align::UpperRight => rect.y,
        Align::MiddleLeft | Align::MiddleCenter | Align::MiddleRight => {
            rect.y + (rect.height - 1) / 2
        }
        Align::LowerLeft | Align::LowerCenter | Align::LowerRight => rect.bottom() - 1,
    };
    buf.set_string(x, y, &text, style);
}

fn text_style(style: &keel_core::TextStyle) -> Style {
    let mut out = Style::default();
    if let Some(fg) = to_color(style.color.with_alpha(style.color.a.max(0.6))) {
        out = out.fg(fg);
    }
    if style.font == Font::Bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    out
}

/// Paints placed elements into a buffer.
pub struct TreeView<'a> {
    placed: &'a [Placed<'a>],
    state: &'a ViewerState,
}

impl<'a> TreeView<'a> {
    pub fn new(placed: &'a [Placed<'a>], state: &'a ViewerState) -> Self {
        Self { placed, state }
    }
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for placed in self.placed {
            let rect = placed.rect.intersection(area);
            let element = placed.element;
            let focused = element.command().is_some() && element.command() == self.state.focused();

            match &element.kind {
                ElementKind::Container { color, .. } | ElementKind::Panel { color, .. } => {
                    fill(buf, rect, *color);
                }
                ElementKind::Text { text, style } => {
                    write_aligned(buf, rect, text, style.align, text_style(style));
                }
                ElementKind::Button {
                    text, style, color, ..
                } => {
                    fill(buf, rect, *color);
                    let mut style_out = text_style(style);
                    if focused {
                        style_out = style_out.add_modifier(Modifier::REVERSED);
                    }
                    write_aligned(buf, rect, text, style.align, style_out);
                }
                ElementKind::Input { text, style, .. } => {
                    let mut style_out = text_style(style).add_modifier(Modifier::UNDERLINED);
                    let shown = match self.state.buffer() {
                        Some(buffer) if focused => {
                            style_out = style_out.add_modifier(Modifier::BOLD);
                            format!("{buffer}_")
                        }
                        _ => text.clone(),
                    };
                    if focused {
                        style_out = style_out.add_modifier(Modifier::REVERSED);
                    }
                    write_aligned(buf, rect, &shown, style.align, style_out);
                }
                ElementKind::Image { color, .. } => {
                    let style = to_color(*color).map_or_else(Style::default, |c| Style::default().fg(c));
                    write_aligned(buf, rect, "*", Align::MiddleCenter, style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use keel_core::{InputField, Layer, TextStyle};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn sample() -> WidgetTree {
        let mut tree = WidgetTree::new();
        tree.container("keel", TreeColor::TRANSPARENT, true, Some("keel"), Layer::Hud);
        let main = tree.panel("keel", Some("main"), TreeColor::rgba(0.0, 0.0, 0.0, 0.5), Placement::new(0.0, 0.0, 0.5, 1.0));
        tree.button(
            &main,
            None,
            "Save",
            TextStyle::new(12),
            TreeColor::rgba(0.2, 0.2, 0.2, 0.5),
            Some("keel.callaction 0 1".to_string()),
            Placement::new(0.0, 0.5, 1.0, 1.0),
        );
        tree.input(
            &main,
            None,
            "name",
            TextStyle::new(12),
            InputField {
                command: Some("keel.callaction 0 2".to_string()),
                char_limit: 4,
                read_only: false,
            },
            Placement::new(0.0, 0.0, 1.0, 0.5),
        );
        tree
    }

    // ==================== Layout Tests ====================

    #[test]
    fn test_place_flips_y() {
        let parent = Rect::new(0, 0, 100, 40);
        assert_eq!(place(parent, &Placement::new(0.0, 0.75, 0.5, 1.0)), Rect::new(0, 0, 50, 10));
        assert_eq!(place(parent, &Placement::new(0.5, 0.0, 1.0, 0.25)), Rect::new(50, 30, 50, 10));
    }

    #[test]
    fn test_place_scales_offsets() {
        let parent = Rect::new(0, 0, 100, 40);
        let placement = Placement::new(0.0, 1.0, 0.0, 1.0).with_offset(0.0, -32.0, 80.0, 0.0);
        assert_eq!(place(parent, &placement), Rect::new(0, 0, 10, 2));
    }

    #[test]
    fn test_thin_rows_keep_one_cell() {
        let parent = Rect::new(0, 0, 100, 10);
        let rect = place(parent, &Placement::new(0.0, 0.5, 1.0, 0.54));
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn test_layout_nests_inside_parent() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let button = placed
            .iter()
            .find(|p| p.element.command() == Some("keel.callaction 0 1"))
            .unwrap();
        assert_eq!(button.rect, Rect::new(0, 0, 40, 10));
    }

    #[test]
    fn test_hit_test_finds_button() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let hit = hit_test(&placed, 5, 5).unwrap();
        assert_eq!(hit.element.command(), Some("keel.callaction 0 1"));
        assert!(hit_test(&placed, 60, 5).is_none());
    }

    // ==================== Input Tests ====================

    #[test]
    fn test_click_button_sends_command() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let mut state = ViewerState::new();
        assert_eq!(
            state.on_click(5, 5, &placed),
            Action::Send("keel.callaction 0 1".to_string())
        );
        assert_eq!(state.focused(), Some("keel.callaction 0 1"));
    }

    #[test]
    fn test_tab_cycles_focus() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let mut state = ViewerState::new();

        state.on_key(key(KeyCode::Tab), &placed);
        assert_eq!(state.focused(), Some("keel.callaction 0 1"));
        state.on_key(key(KeyCode::Tab), &placed);
        assert_eq!(state.focused(), Some("keel.callaction 0 2"));
        state.on_key(key(KeyCode::Tab), &placed);
        assert_eq!(state.focused(), Some("keel.callaction 0 1"));
        state.on_key(key(KeyCode::BackTab), &placed);
        assert_eq!(state.focused(), Some("keel.callaction 0 2"));
    }

    #[test]
    fn test_input_submission_appends_text() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let mut state = ViewerState::new();

        assert_eq!(state.on_click(5, 15, &placed), Action::None);
        assert!(state.is_editing());
        for c in "hello".chars() {
            state.on_key(key(KeyCode::Char(c)), &placed);
        }
        assert_eq!(state.buffer(), Some("hell"));
        state.on_key(key(KeyCode::Backspace), &placed);
        assert_eq!(
            state.on_key(key(KeyCode::Enter), &placed),
            Action::Send("keel.callaction 0 2 hel".to_string())
        );
        assert!(!state.is_editing());
    }

    #[test]
    fn test_escape_cancels_editing_then_quits() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let mut state = ViewerState::new();
        state.on_click(5, 15, &placed);

        assert_eq!(state.on_key(key(KeyCode::Esc), &placed), Action::None);
        assert!(!state.is_editing());
        assert_eq!(state.on_key(key(KeyCode::Esc), &placed), Action::Quit);
    }

    #[test]
    fn test_closed_screen_offers_open() {
        let mut state = ViewerState::new();
        assert_eq!(state.on_key(key(KeyCode::Enter), &[]), Action::Open);
        assert_eq!(state.on_key(key(KeyCode::Char('q')), &[]), Action::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let mut state = ViewerState::new();
        state.on_click(5, 15, &placed);

        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(state.on_key(ctrl_c, &placed), Action::Quit);
    }

    // ==================== Painting Tests ====================

    #[test]
    fn test_render_draws_text() {
        let trees = vec![sample()];
        let area = Rect::new(0, 0, 80, 20);
        let placed = layout(&trees, area);
        let state = ViewerState::new();
        let mut buf = Buffer::empty(area);

        TreeView::new(&placed, &state).render(area, &mut buf);

        let row: String = (0..40u16).map(|x| buf[(x, 4)].symbol().to_string()).collect();
        assert!(row.contains("Save"));
    }

    #[test]
    fn test_render_zero_area() {
        let trees = vec![sample()];
        let placed = layout(&trees, Rect::new(0, 0, 80, 20));
        let state = ViewerState::new();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        TreeView::new(&placed, &state).render(area, &mut buf);
    }

    #[test]
    fn test_transparent_colors_are_skipped() {
        assert_eq!(to_color(TreeColor::TRANSPARENT), None);
        assert_eq!(to_color(TreeColor::WHITE), Some(Color::Rgb(255, 255, 255)));
    }
}
