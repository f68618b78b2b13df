//! Context handed to widget callbacks.

use crate::session::{Session, ViewerId};
use crate::tab::Tab;
use std::time::Duration;

/// Work a callback asks the panel to perform once it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelRequest {
    /// Switch the viewer to the tab with this id.
    SwitchTab(String),
    /// Close the panel immediately.
    Close,
    /// Close the panel after a delay.
    CloseAfter(Duration),
    /// Redraw the panel after a delay.
    RedrawAfter(Duration),
}

/// Mutable access to the active tab and the viewer's session.
///
/// Callbacks may restructure the tab (clear and refill columns), stash
/// values in the session, and queue [`PanelRequest`]s.
pub struct ActionContext<'a> {
    pub tab: &'a mut Tab,
    pub session: &'a mut Session,
    requests: Vec<PanelRequest>,
}

impl<'a> ActionContext<'a> {
    pub fn new(tab: &'a mut Tab, session: &'a mut Session) -> Self {
        ActionContext {
            tab,
            session,
            requests: Vec::new(),
        }
    }

    /// The viewer that triggered the callback.
    #[must_use]
    pub fn viewer(&self) -> ViewerId {
        self.session.viewer()
    }

    pub fn switch_to(&mut self, tab_id: impl Into<String>) {
        self.requests.push(PanelRequest::SwitchTab(tab_id.into()));
    }

    pub fn close_panel(&mut self) {
        self.requests.push(PanelRequest::Close);
    }

    pub fn close_after(&mut self, delay: Duration) {
        self.requests.push(PanelRequest::CloseAfter(delay));
    }

    pub fn redraw_after(&mut self, delay: Duration) {
        self.requests.push(PanelRequest::RedrawAfter(delay));
    }

    #[must_use]
    pub fn requests(&self) -> &[PanelRequest] {
        &self.requests
    }

    /// Consumes the context, yielding the queued requests in order.
    #[must_use]
    pub fn into_requests(self) -> Vec<PanelRequest> {
        self.requests
    }
}
