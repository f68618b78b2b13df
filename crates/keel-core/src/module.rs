//! Capability interface for host modules the panel can toggle and reload.

use crate::CoreResult;
use std::sync::Arc;

/// A pluggable host module.
///
/// Implementations use interior mutability: the panel holds modules behind
/// shared `Arc`s captured by widget callbacks.
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn version(&self) -> &str {
        "0.0.0"
    }

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    /// Reloads the module's configuration or state.
    fn reload(&self) -> CoreResult<()>;
}

/// Ordered set of modules, unique by name.
#[derive(Clone, Default)]
pub struct ModuleSet {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `module`, replacing one with the same name in place.
    pub fn add(&mut self, module: Arc<dyn Module>) {
        match self.modules.iter().position(|m| m.name() == module.name()) {
            Some(index) => self.modules[index] = module,
            None => self.modules.push(module),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.iter().find(|m| m.name() == name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }
}

impl std::fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.modules.iter().map(|m| m.name())).finish()
    }
}
