//! Host-side collaborators for the demo binary.
//!
//! The panel library only knows the [`Transport`] and [`Scheduler`] traits.
//! This module provides the two transports the binary needs (JSON lines on
//! stdout and an in-memory screen for the terminal viewer) and a polling
//! scheduler both modes share.

use keel_core::{CoreError, CoreResult, Deferred, Scheduler, Transport, ViewerId, WidgetTree};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ==================== JSON transport ====================

/// Prints one JSON object per line for every send and destroy.
///
/// ```text
/// {"viewer":1,"send":{...tree...}}
/// {"viewer":1,"destroy":"keel"}
/// ```
#[derive(Debug, Default)]
pub struct JsonLinesTransport<W> {
    out: Mutex<W>,
}

impl<W: Write> JsonLinesTransport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, value: &serde_json::Value) -> CoreResult<()> {
        let mut out = self.out.lock();
        serde_json::to_writer(&mut *out, value)?;
        writeln!(out).map_err(|e| CoreError::Transport(e.to_string()))?;
        out.flush().map_err(|e| CoreError::Transport(e.to_string()))
    }
}

impl<W: Write + Send> Transport for JsonLinesTransport<W> {
    fn send(&self, viewer: ViewerId, tree: &WidgetTree) -> CoreResult<()> {
        let tree = serde_json::to_value(tree)?;
        self.write_line(&serde_json::json!({ "viewer": viewer, "send": tree }))
    }

    fn destroy(&self, viewer: ViewerId, root_id: &str) -> CoreResult<()> {
        self.write_line(&serde_json::json!({ "viewer": viewer, "destroy": root_id }))
    }
}

// ==================== Screen transport ====================

/// Trees currently shown to the local viewer, in draw order.
#[derive(Debug, Default)]
pub struct Screen {
    trees: Vec<WidgetTree>,
    generation: u64,
}

impl Screen {
    pub fn trees(&self) -> &[WidgetTree] {
        &self.trees
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Bumped on every change, so the viewer can tell a fresh tree arrived.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn replace(&mut self, tree: &WidgetTree) {
        let root = tree.root();
        let destroy = match tree.get(root).map(|e| &e.kind) {
            Some(keel_core::ElementKind::Container { destroy, .. }) => destroy.clone(),
            _ => None,
        };
        self.trees
            .retain(|t| t.root() != root && Some(t.root()) != destroy.as_deref());
        self.trees.push(tree.clone());
        self.generation += 1;
    }

    fn remove(&mut self, root_id: &str) {
        let before = self.trees.len();
        self.trees.retain(|t| t.root() != root_id);
        if self.trees.len() != before {
            self.generation += 1;
        }
    }
}

/// Transport for the single local viewer of the terminal UI.
///
/// Trees for any other viewer id are dropped.
#[derive(Debug, Clone)]
pub struct ScreenTransport {
    viewer: ViewerId,
    screen: Arc<Mutex<Screen>>,
}

impl ScreenTransport {
    pub fn new(viewer: ViewerId) -> Self {
        Self {
            viewer,
            screen: Arc::new(Mutex::new(Screen::default())),
        }
    }

    pub fn screen(&self) -> Arc<Mutex<Screen>> {
        Arc::clone(&self.screen)
    }
}

impl Transport for ScreenTransport {
    fn send(&self, viewer: ViewerId, tree: &WidgetTree) -> CoreResult<()> {
        if viewer == self.viewer {
            self.screen.lock().replace(tree);
        } else {
            tracing::debug!(viewer, "dropping tree for remote viewer");
        }
        Ok(())
    }

    fn destroy(&self, viewer: ViewerId, root_id: &str) -> CoreResult<()> {
        if viewer == self.viewer {
            self.screen.lock().remove(root_id);
        }
        Ok(())
    }
}

// ==================== Scheduler ====================

type Job = (Instant, ViewerId, Deferred);

/// Scheduler polled by the host loop.
///
/// Clones share one queue. The panel holds one clone, the main loop the
/// other and drains it with [`QueueScheduler::due`].
#[derive(Debug, Clone, Default)]
pub struct QueueScheduler {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every job due at `now`, earliest first.
    pub fn due(&self, now: Instant) -> Vec<(ViewerId, Deferred)> {
        let mut jobs = self.jobs.lock();
        let mut ready: Vec<Job> = Vec::new();
        jobs.retain(|job| {
            if job.0 <= now {
                ready.push(*job);
                false
            } else {
                true
            }
        });
        ready.sort_by_key(|job| job.0);
        ready.into_iter().map(|(_, viewer, job)| (viewer, job)).collect()
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }
}

impl Scheduler for QueueScheduler {
    fn after(&self, delay: Duration, viewer: ViewerId, job: Deferred) {
        self.jobs.lock().push((Instant::now() + delay, viewer, job));
    }
}
