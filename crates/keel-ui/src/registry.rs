//! Tab registry for the admin panel
//!
//! The [`TabRegistry`] struct keeps the ordered list of registered tabs,
//! handling registration with identity-based replacement, removal and
//! lookup by id or position.
//!
//! # Example
//!
//! ```
//! use keel_ui::TabRegistry;
//! use keel_core::Tab;
//!
//! let mut registry = TabRegistry::new();
//! registry.register(Tab::new("carbon", "Carbon"), None);
//! registry.register(Tab::new("entities", "Entities"), None);
//! assert_eq!(registry.position("entities"), Some(1));
//! ```

use keel_core::{CoreError, CoreResult, Tab};
use std::collections::HashMap;

/// Ordered collection of tabs, unique by [`Tab::id`].
///
/// The registry handles:
/// - Registering tabs, replacing an existing tab with the same id in place
/// - Unregistering tabs by id
/// - Lookup by id (via an id → position index) or by position
///
/// # Thread Safety
///
/// TabRegistry itself is not thread-safe. The panel owns it exclusively and
/// mutates it through `&mut` only.
#[derive(Debug, Default)]
pub struct TabRegistry {
    /// Tabs in display order
    tabs: Vec<Tab>,
    /// Mapping from tab id to position for O(1) lookup
    positions: HashMap<String, usize>,
}

impl TabRegistry {
    /// Creates a new empty registry.
    ///
    /// # Example
    ///
    /// ```
    /// use keel_ui::TabRegistry;
    ///
    /// let registry = TabRegistry::new();
    /// assert!(registry.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tab.
    ///
    /// If a tab with the same id exists it is replaced. The replacement
    /// keeps the old position unless `insert` names another one. New tabs
    /// are appended, or inserted at `insert` when given. Insert positions
    /// past the end are clamped.
    ///
    /// # Arguments
    ///
    /// * `tab` - The tab to register
    /// * `insert` - Optional position to place the tab at
    ///
    /// # Returns
    ///
    /// The position the tab ended up at
    ///
    /// # Example
    ///
    /// ```
    /// use keel_ui::TabRegistry;
    /// use keel_core::Tab;
    ///
    /// let mut registry = TabRegistry::new();
    /// registry.register(Tab::new("a", "A"), None);
    /// registry.register(Tab::new("b", "B"), None);
    /// assert_eq!(registry.register(Tab::new("a", "A v2"), None), 0);
    /// assert_eq!(registry.get(0).map(|t| t.name()), Some("A v2"));
    /// ```
    pub fn register(&mut self, tab: Tab, insert: Option<usize>) -> usize {
        let existing = self.positions.get(tab.id()).copied();
        let target = match existing {
            Some(index) => {
                self.tabs.remove(index);
                insert.unwrap_or(index)
            }
            None => insert.unwrap_or(self.tabs.len()),
        };
        let target = target.min(self.tabs.len());
        self.tabs.insert(target, tab);
        self.reindex();
        target
    }

    /// Removes the tab with the given id and returns it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TabNotFound` if no tab has that id.
    ///
    /// # Example
    ///
    /// ```
    /// use keel_ui::TabRegistry;
    /// use keel_core::Tab;
    ///
    /// let mut registry = TabRegistry::new();
    /// registry.register(Tab::new("a", "A"), None);
    /// assert!(registry.unregister("a").is_ok());
    /// assert!(registry.unregister("a").is_err());
    /// ```
    pub fn unregister(&mut self, id: &str) -> CoreResult<Tab> {
        let index = self
            .positions
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::TabNotFound(id.to_string()))?;
        let tab = self.tabs.remove(index);
        self.reindex();
        Ok(tab)
    }

    /// Gets the tab at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    /// Gets the tab at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tab> {
        self.tabs.get_mut(index)
    }

    /// Finds a tab by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Tab> {
        self.position(id).and_then(|i| self.tabs.get(i))
    }

    /// Finds a tab by id, mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Tab> {
        match self.position(id) {
            Some(i) => self.tabs.get_mut(i),
            None => None,
        }
    }

    /// Position of the tab with the given id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Returns the number of tabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Returns true if there are no tabs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Iterates tabs in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    /// Iterates tabs mutably in display order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    /// Ids of all tabs in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.tabs.iter().map(Tab::id).collect()
    }

    fn reindex(&mut self) {
        self.positions.clear();
        for (index, tab) in self.tabs.iter().enumerate() {
            self.positions.insert(tab.id().to_string(), index);
        }
    }
}
