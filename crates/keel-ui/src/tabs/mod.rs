//! Built-in tab providers.

mod modules;

pub use modules::{modules_tab, MODULES_TAB_ID};
