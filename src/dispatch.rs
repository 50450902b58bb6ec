//! Command dispatch towards the device layer.
//!
//! Every position command is registered with the motion engine *before* it
//! leaves the crate, so the widget shows motion right away even when the
//! device layer is slow to echo anything back. Identical commands repeated
//! within [`DEDUP_WINDOW`] are swallowed; rapid re-renders would otherwise
//! hammer the device layer with the same request.

use crate::channel::{Channel, PerChannel};
use crate::error::CoverError;
use crate::motion::MotionInferenceEngine;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Window in which an identical `(channel, percent)` call is suppressed.
pub const DEDUP_WINDOW: Duration = Duration::from_millis(200);

/// Command surface of the external device layer.
///
/// Both operations are fire-and-forget: `Err` only means the command could
/// not even be handed over. Whether the device acted on it is observed later
/// through state updates.
pub trait CoverCommandSink {
    /// Moves `entity` to `percent` (0 = closed, 100 = open).
    fn set_position(&mut self, entity: &str, percent: u8) -> Result<(), CoverError>;

    fn stop(&mut self, entity: &str) -> Result<(), CoverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Forwarded to the device layer
    Sent,
    /// Identical call forwarded less than [`DEDUP_WINDOW`] ago
    Throttled,
}

#[derive(Debug, Clone, Copy)]
struct LastCall {
    channel: Channel,
    percent: u8,
    at: Instant,
}

/// Issues position and stop commands for both channels of one widget.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    sink: S,
    entities: PerChannel<String>,
    last_call: Option<LastCall>,
}

impl<S: CoverCommandSink> CommandDispatcher<S> {
    /// `entities` names the device behind each channel.
    pub fn new(sink: S, entities: PerChannel<String>) -> Self {
        Self {
            sink,
            entities,
            last_call: None,
        }
    }

    /// Rebinds the channels; a real change also forgets the dedup slot.
    pub fn set_entities(&mut self, entities: PerChannel<String>) {
        if entities != self.entities {
            info!(
                "Dispatcher bound to {} / {}",
                entities.top, entities.bottom
            );
            self.entities = entities;
            self.last_call = None;
        }
    }

    /// Entity id bound to `channel`.
    pub fn entity(&self, channel: Channel) -> &str {
        &self.entities[channel]
    }

    /// Moves `channel` to `percent`.
    ///
    /// # Errors
    ///
    /// * [`CoverError::InvalidPosition`] - `percent` outside 0..=100, nothing registered
    /// * [`CoverError::DispatchFailure`] - the sink refused the command; not retried
    pub fn set_position(
        &mut self,
        motion: &mut MotionInferenceEngine,
        channel: Channel,
        percent: i32,
        now: Instant,
    ) -> Result<DispatchOutcome, CoverError> {
        let percent = u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(CoverError::InvalidPosition(percent))?;

        motion.register_command(channel, percent, now);

        if let Some(last) = self.last_call {
            if last.channel == channel
                && last.percent == percent
                && now.saturating_duration_since(last.at) < DEDUP_WINDOW
            {
                debug!("Suppressing repeated {} -> {}", channel, percent);
                return Ok(DispatchOutcome::Throttled);
            }
        }

        let entity = &self.entities[channel];
        match self.sink.set_position(entity, percent) {
            Ok(()) => {
                info!("Set {} cover {} to {}%", channel, entity, percent);
                self.last_call = Some(LastCall {
                    channel,
                    percent,
                    at: now,
                });
                Ok(DispatchOutcome::Sent)
            }
            Err(e) => {
                error!("Failed to set {} cover {}: {}", channel, entity, e);
                Err(e)
            }
        }
    }

    /// Stops `channel` unconditionally and drops all commanded motion.
    ///
    /// # Errors
    ///
    /// [`CoverError::DispatchFailure`] when the sink refused the stop.
    pub fn stop(&mut self, motion: &mut MotionInferenceEngine, channel: Channel) -> Result<(), CoverError> {
        motion.stop_all();
        self.last_call = None;

        let entity = &self.entities[channel];
        self.sink.stop(entity).inspect_err(|e| {
            error!("Failed to stop {} cover {}: {}", channel, entity, e);
        })?;
        info!("Stopped {} cover {}", channel, entity);
        Ok(())
    }

    /// Stops both channels; a failure on one does not keep the other running.
    pub fn stop_all_channels(&mut self, motion: &mut MotionInferenceEngine) -> Result<(), CoverError> {
        let mut first_error = None;
        for channel in Channel::ALL {
            if let Err(e) = self.stop(motion, channel) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub(crate) fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

/// Sink that records every command, used by the tests of the whole crate.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub commands: Vec<SinkCommand>,
    pub fail: bool,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SinkCommand {
    SetPosition(String, u8),
    Stop(String),
}

#[cfg(test)]
impl RecordingSink {
    pub fn set_positions(&self) -> Vec<(String, u8)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SinkCommand::SetPosition(entity, p) => Some((entity.clone(), *p)),
                SinkCommand::Stop(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl CoverCommandSink for RecordingSink {
    fn set_position(&mut self, entity: &str, percent: u8) -> Result<(), CoverError> {
        if self.fail {
            return Err(CoverError::DispatchFailure("sink offline".to_string()));
        }
        self.commands
            .push(SinkCommand::SetPosition(entity.to_string(), percent));
        Ok(())
    }

    fn stop(&mut self, entity: &str) -> Result<(), CoverError> {
        if self.fail {
            return Err(CoverError::DispatchFailure("sink offline".to_string()));
        }
        self.commands.push(SinkCommand::Stop(entity.to_string()));
        Ok(())
    }
}
