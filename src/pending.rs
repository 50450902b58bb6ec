//! Positions staged in deferred mode until the user applies them.

use crate::channel::{Channel, PerChannel};
use crate::dispatch::{CommandDispatcher, CoverCommandSink, DispatchOutcome};
use crate::error::CoverError;
use crate::motion::MotionInferenceEngine;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCommandStore {
    positions: PerChannel<Option<u8>>,
}

impl PendingCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `channel` dirty without dispatching anything.
    pub fn set_pending(&mut self, channel: Channel, value: u8) {
        debug!("Staging {} -> {}", channel, value);
        self.positions[channel] = Some(value.min(100));
    }

    /// Staged value of `channel`, if any.
    pub fn get(&self, channel: Channel) -> Option<u8> {
        self.positions[channel]
    }

    pub fn has_pending(&self) -> bool {
        self.positions.top.is_some() || self.positions.bottom.is_some()
    }

    /// Dispatches every dirty channel, top first, then forgets them all.
    ///
    /// The store is cleared even when a dispatch fails; failures are returned
    /// per channel and are never retried.
    pub fn apply_all<S: CoverCommandSink>(
        &mut self,
        dispatcher: &mut CommandDispatcher<S>,
        motion: &mut MotionInferenceEngine,
        now: Instant,
    ) -> Vec<(Channel, Result<DispatchOutcome, CoverError>)> {
        let staged = std::mem::take(&mut self.positions);
        staged
            .iter()
            .filter_map(|(channel, value)| value.map(|v| (channel, v)))
            .map(|(channel, value)| {
                let result = dispatcher.set_position(motion, channel, i32::from(value), now);
                (channel, result)
            })
            .collect()
    }

    /// Forgets every staged value without sending anything.
    pub fn discard_all(&mut self) {
        if self.has_pending() {
            debug!("Discarding staged positions");
        }
        self.positions = PerChannel::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::RecordingSink;

    fn dispatcher() -> CommandDispatcher<RecordingSink> {
        CommandDispatcher::new(
            RecordingSink::default(),
            PerChannel::new("blind/top".to_string(), "blind/bottom".to_string()),
        )
    }

    #[test]
    fn staging_does_not_dispatch() {
        let mut store = PendingCommandStore::new();
        assert!(!store.has_pending());

        store.set_pending(Channel::Bottom, 42);
        assert!(store.has_pending());
        assert_eq!(store.get(Channel::Bottom), Some(42));
        assert_eq!(store.get(Channel::Top), None);
    }

    #[test]
    fn apply_dispatches_each_dirty_channel_once_and_clears() {
        let mut store = PendingCommandStore::new();
        let mut dispatcher = dispatcher();
        let mut motion = MotionInferenceEngine::new();
        store.set_pending(Channel::Bottom, 42);
        store.set_pending(Channel::Top, 70);

        let results = store.apply_all(&mut dispatcher, &mut motion, Instant::now());

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| matches!(r, Ok(DispatchOutcome::Sent))));
        assert_eq!(
            dispatcher.sink().set_positions(),
            vec![("blind/top".to_string(), 70), ("blind/bottom".to_string(), 42)]
        );
        assert!(!store.has_pending());
    }

    #[test]
    fn discard_never_dispatches() {
        let mut store = PendingCommandStore::new();
        let mut dispatcher = dispatcher();
        let mut motion = MotionInferenceEngine::new();
        store.set_pending(Channel::Top, 42);

        store.discard_all();
        let results = store.apply_all(&mut dispatcher, &mut motion, Instant::now());

        assert!(results.is_empty());
        assert!(dispatcher.sink().commands.is_empty());
    }

    #[test]
    fn failed_apply_still_clears() {
        let mut store = PendingCommandStore::new();
        let mut dispatcher = dispatcher();
        dispatcher.sink_mut().fail = true;
        let mut motion = MotionInferenceEngine::new();
        store.set_pending(Channel::Top, 10);

        let results = store.apply_all(&mut dispatcher, &mut motion, Instant::now());
        assert!(matches!(results[0], (Channel::Top, Err(CoverError::DispatchFailure(_)))));
        assert!(!store.has_pending());
    }
}
