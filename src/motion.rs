//! # Motion Inference
//!
//! Decides whether either cover is currently moving. Cover integrations are
//! unreliable about this: some never report `opening`/`closing`, some only
//! publish the final position, some publish nothing until the move is over.
//! No single signal can be trusted, so three independent sources are kept and
//! OR'd together:
//!
//! ```text
//! DeviceSnapshot ──┬─► StateSignal   (explicit motion flags)      ─┐
//!                  ├─► DeltaSignal   (two changes within 2.5 s)    ├─► is_moving
//! set_position ────┴─► CommandSignal (targets issued by this widget)┘
//! ```
//!
//! Every source owns its own deadline, so each one can expire on its own.
//! While anything reports motion the displayed positions are frozen to the
//! last positions seen while idle; half-updated feedback mid-move would
//! otherwise make the handles jump around.

use crate::channel::{Channel, PerChannel};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Window in which a second position change counts as motion, and how long
/// motion is asserted afterwards.
pub const DELTA_WINDOW: Duration = Duration::from_millis(2500);

/// Upper bound for a commanded move before it is presumed finished.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Distance (in percent) at which a commanded target counts as reached.
const TARGET_TOLERANCE: u8 = 1;

/// Snapshot of one device as reported by the device layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Device explicitly reports motion (`opening`, `closing`, `moving`)
    pub motion_flag: bool,
    /// Current position, 0 = closed, 100 = open
    pub position: u8,
}

impl DeviceSnapshot {
    /// Positions above 100 are clamped.
    pub fn new(motion_flag: bool, position: u8) -> Self {
        Self {
            motion_flag,
            position: position.min(100),
        }
    }
}

/// Explicit motion flags of the last snapshot pair.
#[derive(Debug, Clone, Default)]
pub struct StateSignal {
    flags: PerChannel<bool>,
}

impl StateSignal {
    fn observe(&mut self, snapshots: &PerChannel<DeviceSnapshot>) {
        self.flags = snapshots.map(|_, s| s.motion_flag);
    }

    /// Either device flags motion in its latest snapshot.
    pub fn is_active(&self) -> bool {
        self.flags.top || self.flags.bottom
    }
}

/// Motion derived from observed position changes.
///
/// A single change is never enough: it may be noise, or the one and only
/// report of a move that already finished.
#[derive(Debug, Clone, Default)]
pub struct DeltaSignal {
    last_positions: Option<PerChannel<u8>>,
    last_change: Option<Instant>,
    moving_until: Option<Instant>,
}

impl DeltaSignal {
    fn observe(&mut self, positions: PerChannel<u8>, now: Instant) {
        match self.last_positions {
            // first report only seeds the tracker
            None => {
                self.last_positions = Some(positions);
                return;
            }
            Some(last) if last == positions => return,
            Some(_) => {}
        }

        self.last_positions = Some(positions);
        if let Some(previous) = self.last_change {
            if now.saturating_duration_since(previous) < DELTA_WINDOW {
                let until = now + DELTA_WINDOW;
                self.moving_until = Some(self.moving_until.map_or(until, |u| u.max(until)));
                debug!("Consecutive position changes, asserting motion from deltas");
            }
        }
        self.last_change = Some(now);
    }

    /// True until [`DELTA_WINDOW`] after the last change that followed
    /// another one closely enough.
    pub fn is_active(&self, now: Instant) -> bool {
        self.moving_until.is_some_and(|until| now < until)
    }
}

/// Motion assumed because this widget issued position commands.
#[derive(Debug, Clone, Default)]
pub struct CommandSignal {
    targets: PerChannel<Option<u8>>,
    commanded_until: Option<Instant>,
}

impl CommandSignal {
    fn register(&mut self, channel: Channel, target: u8, now: Instant) {
        self.targets[channel] = Some(target);
        let deadline = now + COMMAND_TIMEOUT;
        self.commanded_until = Some(self.commanded_until.map_or(deadline, |d| d.max(deadline)));
    }

    fn clear(&mut self) {
        self.targets = PerChannel::default();
        self.commanded_until = None;
    }

    /// Some target is still outstanding, whether or not its deadline passed.
    pub fn has_targets(&self) -> bool {
        self.targets.top.is_some() || self.targets.bottom.is_some()
    }

    /// Outstanding targets and the [`COMMAND_TIMEOUT`] not yet reached.
    pub fn is_active(&self, now: Instant) -> bool {
        self.has_targets() && self.commanded_until.is_some_and(|until| now < until)
    }

    /// Commanded position of `channel` that has not been reached yet.
    pub fn target(&self, channel: Channel) -> Option<u8> {
        self.targets[channel]
    }

    /// Deadline of the latest command; cleared with the last target.
    pub fn commanded_until(&self) -> Option<Instant> {
        self.commanded_until
    }

    /// Drops targets the device has reached; the deadline goes with the last one.
    fn complete_reached(&mut self, snapshots: &PerChannel<DeviceSnapshot>) {
        if !self.has_targets() {
            return;
        }
        for channel in Channel::ALL {
            let snapshot = snapshots[channel];
            if snapshot.motion_flag {
                continue;
            }
            if let Some(target) = self.targets[channel] {
                if snapshot.position.abs_diff(target) <= TARGET_TOLERANCE {
                    debug!("{} cover reached commanded target {}", channel, target);
                    self.targets[channel] = None;
                }
            }
        }
        if !self.has_targets() {
            self.commanded_until = None;
        }
    }

    fn expire(&mut self, now: Instant) {
        if !self.has_targets() {
            return;
        }
        if self.commanded_until.map_or(true, |until| now >= until) {
            warn!(
                "Commanded motion not confirmed within {}s, giving up on targets",
                COMMAND_TIMEOUT.as_secs()
            );
            self.clear();
        }
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionVerdict {
    /// Any of the three signals
    pub is_moving: bool,
    pub by_state: bool,
    pub by_delta: bool,
    pub by_command: bool,
    /// Observed positions when idle, last stable positions while moving
    pub display: PerChannel<u8>,
}

/// Motion tracker for one widget.
#[derive(Debug, Clone, Default)]
pub struct MotionInferenceEngine {
    state: StateSignal,
    delta: DeltaSignal,
    command: CommandSignal,
    stable: PerChannel<u8>,
    last_snapshots: Option<PerChannel<DeviceSnapshot>>,
}

impl MotionInferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a fresh snapshot pair into all three signals.
    pub fn observe(&mut self, snapshots: PerChannel<DeviceSnapshot>, now: Instant) -> MotionVerdict {
        if self.last_snapshots.is_none() {
            self.stable = snapshots.map(|_, s| s.position);
        }
        self.last_snapshots = Some(snapshots);
        self.evaluate(snapshots, now)
    }

    /// Re-runs the evaluation against the last snapshot pair, so expired
    /// deadlines and freshly registered commands show up without waiting for
    /// the device layer. `None` until the first snapshot arrived.
    pub fn reevaluate(&mut self, now: Instant) -> Option<MotionVerdict> {
        let snapshots = self.last_snapshots?;
        Some(self.evaluate(snapshots, now))
    }

    fn evaluate(&mut self, snapshots: PerChannel<DeviceSnapshot>, now: Instant) -> MotionVerdict {
        let observed = snapshots.map(|_, s| s.position);

        self.state.observe(&snapshots);
        self.delta.observe(observed, now);

        let by_state = self.state.is_active();
        let by_delta = self.delta.is_active(now);
        // sampled before completion and expiry, as the command was still
        // outstanding when this update arrived
        let by_command = self.command.is_active(now);

        self.command.complete_reached(&snapshots);
        self.command.expire(now);

        let is_moving = by_state || by_delta || by_command;
        if !is_moving {
            self.stable = observed;
        }

        MotionVerdict {
            is_moving,
            by_state,
            by_delta,
            by_command,
            display: if is_moving { self.stable } else { observed },
        }
    }

    /// Records a position command issued by this widget.
    pub fn register_command(&mut self, channel: Channel, target: u8, now: Instant) {
        debug!("Registering commanded motion: {} -> {}", channel, target);
        self.command.register(channel, target, now);
    }

    /// Ends every commanded motion immediately.
    pub fn stop_all(&mut self) {
        debug!("Clearing commanded motion");
        self.command.clear();
    }

    /// The three sources as of the last evaluation.
    pub fn state_signal(&self) -> &StateSignal {
        &self.state
    }

    pub fn delta_signal(&self) -> &DeltaSignal {
        &self.delta
    }

    pub fn command_signal(&self) -> &CommandSignal {
        &self.command
    }

    /// Positions last seen while nothing moved; what the widget shows mid-move.
    pub fn stable_positions(&self) -> PerChannel<u8> {
        self.stable
    }

    /// Most recent snapshot pair, `None` before the first one.
    pub fn last_snapshots(&self) -> Option<PerChannel<DeviceSnapshot>> {
        self.last_snapshots
    }
}
