//! Latest reported state per cover, kept on the UI side of the link.

use super::messages::{CoverState, DeviceUpdate, UpdateKind};
use crate::motion::DeviceSnapshot;
use chrono::{DateTime, Local};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct CoverReport {
    state: Option<CoverState>,
    position: Option<u8>,
    last_update: Option<DateTime<Local>>,
}

/// Device-state provider for the widget.
#[derive(Debug, Default)]
pub struct CoverStateStore {
    covers: HashMap<String, CoverReport>,
}

impl CoverStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: DeviceUpdate) {
        let report = self.covers.entry(update.entity).or_default();
        match update.kind {
            UpdateKind::State(state) => report.state = Some(state),
            UpdateKind::Position(position) => report.position = Some(position),
        }
        report.last_update = Some(update.received_at);
    }

    /// `None` until the cover reported anything at all. A cover that only
    /// reported its state reads as position 0.
    pub fn snapshot(&self, entity: &str) -> Option<DeviceSnapshot> {
        let report = self.covers.get(entity)?;
        let moving = report.state.as_ref().is_some_and(CoverState::is_moving);
        Some(DeviceSnapshot::new(moving, report.position.unwrap_or(0)))
    }

    pub fn last_update(&self, entity: &str) -> Option<DateTime<Local>> {
        self.covers.get(entity).and_then(|r| r.last_update)
    }
}
