//! Transport-agnostic widget tree.
//!
//! The renderer emits a flat list of [`Element`]s, each pointing at its
//! parent by id. A transport serializes the tree (it derives serde) and a
//! viewer rebuilds the hierarchy from the parent links. Placement follows
//! anchor fractions of the parent rectangle with `y` measured from the
//! bottom edge, plus optional pixel offsets.
//!
//! # Example
//!
//! ```
//! use keel_core::tree::{Color, Layer, Placement, TextStyle, WidgetTree};
//!
//! let mut tree = WidgetTree::new();
//! tree.container("keel", Color::rgba(0.0, 0.0, 0.0, 0.75), true, Some("keel"), Layer::Hud);
//! let panel = tree.panel("keel", Some("main"), Color::rgba(0.0, 0.0, 0.0, 0.5), Placement::FULL);
//! tree.button(
//!     &panel,
//!     None,
//!     "X",
//!     TextStyle::new(10),
//!     Color::rgba(0.6, 0.2, 0.2, 0.9),
//!     Some("keel.close".to_string()),
//!     Placement::new(0.97, 0.96, 0.99, 0.99),
//! );
//!
//! assert_eq!(tree.root(), "keel");
//! assert!(tree.find_by_command("keel.close").is_some());
//! ```

use crate::error::CoreResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// RGBA color with components in `[0, 1]`.
///
/// Serialized as the space-separated string `"r g b a"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Parses a `#rrggbb` hex string with the given alpha.
    #[must_use]
    pub fn from_hex(hex: &str, alpha: f32) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Parses the `"r g b a"` form. A missing alpha defaults to 1.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f32> = value
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [r, g, b] => Some(Color::rgba(*r, *g, *b, 1.0)),
            [r, g, b, a] => Some(Color::rgba(*r, *g, *b, *a)),
            _ => None,
        }
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Color { a, ..self }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{raw}'")))
    }
}

/// Text alignment inside an element's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    UpperLeft,
    UpperCenter,
    UpperRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

/// Font family hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Bold,
    #[default]
    Regular,
    Mono,
}

/// Which client layer a container is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    #[default]
    Hud,
    Overlay,
}

/// Rectangle edges, as fractions (anchors) or pixels (offsets).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

/// Where an element sits inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Edges,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: Edges,
}

fn is_zero(edges: &Edges) -> bool {
    *edges == Edges::default()
}

impl Placement {
    /// Fills the whole parent.
    pub const FULL: Placement = Placement {
        anchor: Edges {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 1.0,
            y_max: 1.0,
        },
        offset: Edges {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 0.0,
            y_max: 0.0,
        },
    };

    #[must_use]
    pub const fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Placement {
            anchor: Edges {
                x_min,
                y_min,
                x_max,
                y_max,
            },
            offset: Edges {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 0.0,
                y_max: 0.0,
            },
        }
    }

    /// Adds pixel offsets to the anchored rectangle.
    #[must_use]
    pub const fn with_offset(mut self, x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        self.offset = Edges {
            x_min,
            y_min,
            x_max,
            y_max,
        };
        self
    }
}

/// Text rendering attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: u32,
    pub color: Color,
    pub align: Align,
    pub font: Font,
}

impl TextStyle {
    /// Centered regular text in half-transparent white.
    #[must_use]
    pub const fn new(size: u32) -> Self {
        TextStyle {
            size,
            color: Color::rgba(1.0, 1.0, 1.0, 0.5),
            align: Align::MiddleCenter,
            font: Font::Regular,
        }
    }

    #[must_use]
    pub const fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub const fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub const fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }
}

/// Behaviour of an input field.
///
/// On submission the viewer sends `command` followed by the typed text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputField {
    pub command: Option<String>,
    pub char_limit: usize,
    pub read_only: bool,
}

/// What an element draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Top-level element. Replaces `destroy` on the viewer before drawing.
    Container {
        color: Color,
        needs_cursor: bool,
        destroy: Option<String>,
        layer: Layer,
    },
    Panel {
        color: Color,
        blur: bool,
    },
    Text {
        text: String,
        style: TextStyle,
    },
    Button {
        text: String,
        style: TextStyle,
        color: Color,
        command: Option<String>,
    },
    Input {
        text: String,
        style: TextStyle,
        field: InputField,
    },
    Image {
        source: String,
        color: Color,
    },
}

/// A single node of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub parent: Option<String>,
    pub placement: Placement,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Command sent when the element is clicked or submitted.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Button { command, .. } => command.as_deref(),
            ElementKind::Input { field, .. } => field.command.as_deref(),
            _ => None,
        }
    }

    /// Visible text, if the element carries any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { text, .. }
            | ElementKind::Button { text, .. }
            | ElementKind::Input { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Flat, ordered widget tree produced by a draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetTree {
    root: String,
    elements: Vec<Element>,
    #[serde(skip)]
    next_id: u64,
}

impl WidgetTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the first container added.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn push(&mut self, parent: Option<&str>, id: Option<&str>, placement: Placement, kind: ElementKind) -> String {
        let id = match id {
            Some(id) => id.to_string(),
            None => {
                self.next_id += 1;
                format!("{}.{}", parent.unwrap_or("e"), self.next_id)
            }
        };
        self.elements.push(Element {
            id: id.clone(),
            parent: parent.map(str::to_string),
            placement,
            kind,
        });
        id
    }

    /// Adds a full-screen top-level container.
    pub fn container(
        &mut self,
        id: &str,
        color: Color,
        needs_cursor: bool,
        destroy: Option<&str>,
        layer: Layer,
    ) -> String {
        if self.root.is_empty() {
            self.root = id.to_string();
        }
        self.push(
            None,
            Some(id),
            Placement::FULL,
            ElementKind::Container {
                color,
                needs_cursor,
                destroy: destroy.map(str::to_string),
                layer,
            },
        )
    }

    pub fn panel(&mut self, parent: &str, id: Option<&str>, color: Color, placement: Placement) -> String {
        self.push(
            Some(parent),
            id,
            placement,
            ElementKind::Panel { color, blur: false },
        )
    }

    /// Adds a panel that blurs whatever is behind it.
    pub fn blurred_panel(&mut self, parent: &str, id: Option<&str>, color: Color, placement: Placement) -> String {
        self.push(
            Some(parent),
            id,
            placement,
            ElementKind::Panel { color, blur: true },
        )
    }

    pub fn text(
        &mut self,
        parent: &str,
        id: Option<&str>,
        text: impl Into<String>,
        style: TextStyle,
        placement: Placement,
    ) -> String {
        self.push(
            Some(parent),
            id,
            placement,
            ElementKind::Text {
                text: text.into(),
                style,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn button(
        &mut self,
        parent: &str,
        id: Option<&str>,
        text: impl Into<String>,
        style: TextStyle,
        color: Color,
        command: Option<String>,
        placement: Placement,
    ) -> String {
        self.push(
            Some(parent),
            id,
            placement,
            ElementKind::Button {
                text: text.into(),
                style,
                color,
                command: command.filter(|c| !c.is_empty()),
            },
        )
    }

    pub fn input(
        &mut self,
        parent: &str,
        id: Option<&str>,
        text: impl Into<String>,
        style: TextStyle,
        field: InputField,
        placement: Placement,
    ) -> String {
        self.push(
            Some(parent),
            id,
            placement,
            ElementKind::Input {
                text: text.into(),
                style,
                field,
            },
        )
    }

    pub fn image(
        &mut self,
        parent: &str,
        id: Option<&str>,
        source: impl Into<String>,
        color: Color,
        placement: Placement,
    ) -> String {
        self.push(
            Some(parent),
            id,
            placement,
            ElementKind::Image {
                source: source.into(),
                color,
            },
        )
    }

    // === Queries ===

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Direct children of `id`, in insertion order.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |e| e.parent.as_deref() == Some(id))
    }

    /// First element carrying exactly `command`.
    #[must_use]
    pub fn find_by_command(&self, command: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.command() == Some(command))
    }

    /// Every command embedded in the tree, in insertion order.
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        self.elements.iter().filter_map(Element::command).collect()
    }

    /// Every piece of visible text, in insertion order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.elements.iter().filter_map(Element::text).collect()
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
