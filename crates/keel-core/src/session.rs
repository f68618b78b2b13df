//! Per-viewer ephemeral UI state.
//!
//! A [`Session`] is created lazily the first time a viewer is referenced
//! and is never authoritative domain state: it holds only what the panel
//! needs to keep a viewer's view consistent across full tree rebuilds.

use crate::page::Page;
use crate::widget::DropdownId;
use std::any::Any;
use std::collections::HashMap;

/// Identifier of a remote viewer.
pub type ViewerId = u64;

/// The dropdown a viewer currently has expanded, with its own page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenDropdown {
    /// Identity of the expanded dropdown.
    pub id: DropdownId,
    /// Page of the expanded option list.
    pub page: Page,
}

/// Per-viewer session state.
///
/// Scratch values are stored type-erased; typed getters fall back to the
/// type's default when a key is missing or holds a different type.
///
/// # Example
///
/// ```
/// use keel_core::Session;
///
/// let mut session = Session::new(7);
/// session.set("filter", String::from("wolf"));
/// assert_eq!(session.get::<String>("filter"), "wolf");
/// assert_eq!(session.get::<u32>("filter"), 0);
///
/// session.clear_session();
/// assert!(!session.contains("filter"));
/// ```
#[derive(Default)]
pub struct Session {
    viewer: ViewerId,
    /// Index of the active tab in the registry.
    pub tab_index: usize,
    /// First tab shown in the tab strip.
    pub tab_scroll: usize,
    in_menu: bool,
    column_pages: HashMap<usize, Page>,
    scratch: HashMap<String, Box<dyn Any + Send + Sync>>,
    last_pressed: Option<(usize, usize)>,
    open_dropdown: Option<OpenDropdown>,
}

impl Session {
    /// Creates an empty session for `viewer`.
    #[must_use]
    pub fn new(viewer: ViewerId) -> Self {
        Session {
            viewer,
            ..Session::default()
        }
    }

    /// The viewer this session belongs to.
    #[must_use]
    pub fn viewer(&self) -> ViewerId {
        self.viewer
    }

    /// Whether the panel is currently shown to this viewer.
    #[must_use]
    pub fn is_in_menu(&self) -> bool {
        self.in_menu
    }

    pub fn set_in_menu(&mut self, in_menu: bool) {
        self.in_menu = in_menu;
    }

    // === Scratch storage ===

    /// Returns a clone of the value at `key`, or `T::default()`.
    #[must_use]
    pub fn get<T>(&self, key: &str) -> T
    where
        T: Any + Clone + Default,
    {
        self.get_ref::<T>(key).cloned().unwrap_or_default()
    }

    /// Borrows the value at `key` if present and of type `T`.
    #[must_use]
    pub fn get_ref<T: Any>(&self, key: &str) -> Option<&T> {
        self.scratch.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.scratch.insert(key.into(), Box::new(value));
    }

    /// Removes the value stored under `key`.
    pub fn clear(&mut self, key: &str) {
        self.scratch.remove(key);
    }

    /// Returns `true` if anything is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.scratch.contains_key(key)
    }

    // === Column pages ===

    /// Returns the page cursor for `column`, creating it on first use.
    pub fn get_or_create_page(&mut self, column: usize) -> &mut Page {
        self.column_pages.entry(column).or_default()
    }

    /// Returns the page cursor for `column` if one has been created.
    #[must_use]
    pub fn page(&self, column: usize) -> Option<&Page> {
        self.column_pages.get(&column)
    }

    // === Interaction tracking ===

    /// Coordinate of the most recent dispatched action.
    #[must_use]
    pub fn last_pressed(&self) -> Option<(usize, usize)> {
        self.last_pressed
    }

    pub fn set_last_pressed(&mut self, column: usize, row: usize) {
        self.last_pressed = Some((column, row));
    }

    // === Dropdown ===

    /// The currently expanded dropdown, if any.
    #[must_use]
    pub fn open_dropdown(&self) -> Option<&OpenDropdown> {
        self.open_dropdown.as_ref()
    }

    pub fn open_dropdown_mut(&mut self) -> Option<&mut OpenDropdown> {
        self.open_dropdown.as_mut()
    }

    /// Returns `true` if `id` is the expanded dropdown.
    #[must_use]
    pub fn is_dropdown_open(&self, id: DropdownId) -> bool {
        self.open_dropdown.is_some_and(|open| open.id == id)
    }

    /// Expands `id`, collapsing any other dropdown. The page starts at 0.
    pub fn open_dropdown_with(&mut self, id: DropdownId) {
        self.open_dropdown = Some(OpenDropdown {
            id,
            page: Page::default(),
        });
    }

    /// Collapses the expanded dropdown, if any.
    pub fn close_dropdown(&mut self) {
        self.open_dropdown = None;
    }

    // === Tab strip ===

    /// Scrolls the tab strip so the active tab is inside the visible window.
    pub fn follow_tab(&mut self, tab_count: usize, capacity: usize) {
        let capacity = capacity.max(1);
        if tab_count <= capacity {
            self.tab_scroll = 0;
            return;
        }
        if self.tab_index < self.tab_scroll {
            self.tab_scroll = self.tab_index;
        } else if self.tab_index >= self.tab_scroll + capacity {
            self.tab_scroll = self.tab_index + 1 - capacity;
        }
        self.tab_scroll = self.tab_scroll.min(tab_count - capacity);
    }

    /// Resets transient state on tab switch or explicit refresh.
    ///
    /// Scratch storage, column pages, the expanded dropdown and the last
    /// pressed coordinate are dropped; `tab_index` and `tab_scroll` survive.
    pub fn clear_session(&mut self) {
        self.column_pages.clear();
        self.scratch.clear();
        self.open_dropdown = None;
        self.last_pressed = None;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.scratch.keys().collect();
        keys.sort();
        f.debug_struct("Session")
            .field("viewer", &self.viewer)
            .field("tab_index", &self.tab_index)
            .field("tab_scroll", &self.tab_scroll)
            .field("in_menu", &self.in_menu)
            .field("column_pages", &self.column_pages)
            .field("scratch_keys", &keys)
            .field("last_pressed", &self.last_pressed)
            .field("open_dropdown", &self.open_dropdown)
            .finish()
    }
}
