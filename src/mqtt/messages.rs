//! Messages exchanged between the device link and the widget.

use super::config::CoverTopics;
use chrono::{DateTime, Local};
use std::fmt;
use tracing::warn;

/// Cover state as published on the state topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverState {
    Open,
    Opening,
    Closed,
    Closing,
    Stopped,
    Other(String),
}

impl CoverState {
    pub fn parse(payload: &str) -> Self {
        match payload.trim().to_ascii_lowercase().as_str() {
            "open" => CoverState::Open,
            "opening" => CoverState::Opening,
            "closed" => CoverState::Closed,
            "closing" => CoverState::Closing,
            "stopped" => CoverState::Stopped,
            other => CoverState::Other(other.to_string()),
        }
    }

    /// Explicit motion flag derived from the state.
    pub fn is_moving(&self) -> bool {
        matches!(self, CoverState::Opening | CoverState::Closing)
            || matches!(self, CoverState::Other(s) if s == "moving")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    State(CoverState),
    Position(u8),
}

/// One piece of device state received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUpdate {
    pub entity: String,
    pub kind: UpdateKind,
    pub received_at: DateTime<Local>,
}

impl DeviceUpdate {
    pub fn new(entity: impl Into<String>, kind: UpdateKind) -> Self {
        Self {
            entity: entity.into(),
            kind,
            received_at: Local::now(),
        }
    }
}

impl fmt::Display for DeviceUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            UpdateKind::State(state) => write!(f, "{} - {}: {:?}", self.received_at.format("%H:%M:%S"), self.entity, state),
            UpdateKind::Position(p) => write!(f, "{} - {}: {}%", self.received_at.format("%H:%M:%S"), self.entity, p),
        }
    }
}

/// Maps a publish on one of the subscribed topics to a device update.
///
/// Returns `None` for foreign topics and for positions that are not numbers.
pub fn parse_publish(
    covers: &[(String, CoverTopics)],
    topic: &str,
    payload: &[u8],
) -> Option<DeviceUpdate> {
    let (entity, topics) = covers
        .iter()
        .find(|(_, t)| t.state == topic || t.position == topic)?;
    let text = String::from_utf8_lossy(payload);

    if topics.state == topic {
        return Some(DeviceUpdate::new(entity.clone(), UpdateKind::State(CoverState::parse(&text))));
    }

    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let position = value.round().clamp(0.0, 100.0) as u8;
            Some(DeviceUpdate::new(entity.clone(), UpdateKind::Position(position)))
        }
        _ => {
            warn!("Ignoring non-numeric position {:?} on {}", text, topic);
            None
        }
    }
}

/// Command leaving the widget towards a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverCommand {
    SetPosition { entity: String, percent: u8 },
    Stop { entity: String },
}

impl CoverCommand {
    pub fn entity(&self) -> &str {
        match self {
            CoverCommand::SetPosition { entity, .. } | CoverCommand::Stop { entity } => entity,
        }
    }

    /// Topic and payload to publish.
    pub fn to_publish(&self) -> (String, String) {
        let topics = CoverTopics::for_entity(self.entity());
        match self {
            CoverCommand::SetPosition { percent, .. } => (topics.set_position, percent.to_string()),
            CoverCommand::Stop { .. } => (topics.command, "STOP".to_string()),
        }
    }
}
