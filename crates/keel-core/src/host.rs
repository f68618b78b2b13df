//! Collaborators supplied by the host application.
//!
//! The panel never talks to a network, a permission system or a timer
//! directly. A host implements these traits and hands them to the panel.

use crate::error::CoreResult;
use crate::session::ViewerId;
use crate::tree::WidgetTree;
use std::time::Duration;

/// Delivers widget trees to viewers.
pub trait Transport: Send + Sync {
    /// Sends `tree` to `viewer`, replacing whatever its root container
    /// names as its destroy target.
    fn send(&self, viewer: ViewerId, tree: &WidgetTree) -> CoreResult<()>;

    /// Removes the element tree rooted at `root_id` from the viewer.
    fn destroy(&self, viewer: ViewerId, root_id: &str) -> CoreResult<()>;
}

/// Decides whether a viewer may open the panel.
pub trait AccessPolicy: Send + Sync {
    fn can_access(&self, viewer: ViewerId) -> bool;
}

/// Work the panel wants performed later for a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    Close,
    Draw,
}

/// Runs deferred work after a delay.
///
/// Scheduling is fire-and-forget. When the delay elapses the host feeds
/// the job back to the panel on its command thread.
pub trait Scheduler: Send + Sync {
    fn after(&self, delay: Duration, viewer: ViewerId, job: Deferred);
}

/// Scheduler that drops every job.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScheduler;

impl Scheduler for NoScheduler {
    fn after(&self, delay: Duration, viewer: ViewerId, job: Deferred) {
        tracing::debug!(?delay, viewer, ?job, "dropping deferred job, no scheduler configured");
    }
}
