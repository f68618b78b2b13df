//! Mutually exclusive radio groups.
//!
//! Radio rows in a column only carry `(group, index)`. The group owns the
//! member callbacks and the single selected index.

use crate::widget::RadioFn;

/// A set of radio members of which at most one is selected.
#[derive(Clone, Default)]
pub struct RadioGroup {
    selected: Option<usize>,
    members: Vec<Option<RadioFn>>,
}

impl RadioGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member and returns its index within the group.
    ///
    /// With `wants_on` the member becomes the selection without notifying
    /// the member it replaces.
    pub fn register(&mut self, wants_on: bool, callback: Option<RadioFn>) -> usize {
        let index = self.members.len();
        self.members.push(callback);
        if wants_on {
            self.selected = Some(index);
        }
        index
    }

    /// Marks `index` selected without invoking any callback.
    pub fn preselect(&mut self, index: usize) {
        if index < self.members.len() {
            self.selected = Some(index);
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Callback of the member at `index`.
    #[must_use]
    pub fn callback_at(&self, index: usize) -> Option<RadioFn> {
        self.members.get(index).cloned().flatten()
    }

    /// Moves the selection to `index`.
    ///
    /// Returns the previously selected index so the caller can notify it
    /// before notifying the new member. Out-of-range indices leave the group
    /// untouched and return `None`.
    #[must_use]
    pub fn select(&mut self, index: usize) -> Option<Option<usize>> {
        if index >= self.members.len() {
            return None;
        }
        Some(self.selected.replace(index))
    }
}

impl std::fmt::Debug for RadioGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioGroup")
            .field("selected", &self.selected)
            .field("members", &self.members.len())
            .finish()
    }
}
