//! Motion events: a rising edge means "record now, and keep recording a while".

use std::sync::Arc;

use tracing::{debug, warn};

use crate::motion::{Edge, EdgeHandler};

use super::Controller;

impl Controller {
    /// Handle one sensor edge.
    ///
    /// Rising edges start recording and then reset the idle countdown, both
    /// under the controller lock. Falling edges are ignored: the countdown,
    /// not the sensor going quiet, decides when recording stops.
    pub fn on_edge(&self, edge: Edge) {
        debug!(?edge, "motion event");
        if edge != Edge::Rising {
            return;
        }

        let mut state = self.lock();
        if self.is_shut_down() {
            debug!("shutting down, motion ignored");
            return;
        }

        match state.session.as_mut() {
            Some(session) => session.process.activate(true),
            None => warn!("motion detected but no recording session is open"),
        }
        state.timer.reset();
    }
}

/// An edge handler that forwards to `controller`.
pub fn listener(controller: Arc<Controller>) -> EdgeHandler {
    Box::new(move |edge| controller.on_edge(edge))
}
