//! # Drag Interaction
//!
//! Pointer/touch drag sessions on the paired slider.
//!
//! ```text
//!            press on handle                 move
//!   Idle ─────────────────────► Single(ch) ─────────┐
//!    ▲  ─────────────────────► Paired     ◄─────────┘
//!    │       press on fill          │
//!    └──────────── release ─────────┘  (one DragCommit)
//! ```
//!
//! A session owns the live handle layout while it runs. Moves only produce
//! visual feedback; the single transition out of a session is
//! [`DragController::release`], which hands back a [`DragCommit`] for the
//! widget to stage or dispatch. There is no cancel gesture: dragging back to
//! where it started and letting go commits the unchanged value.

use crate::channel::{Channel, PerChannel};
use crate::geometry::{DragTarget, FillSpan, HandleLayout, TrackGeometry};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// One handle follows the pointer
    Single(Channel),
    /// Both handles move together, started on the fill
    Paired,
}

impl From<DragTarget> for DragMode {
    fn from(target: DragTarget) -> Self {
        match target {
            DragTarget::Handle(channel) => DragMode::Single(channel),
            DragTarget::Fill => DragMode::Paired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    mode: DragMode,
    start_pointer_y: f32,
    start: HandleLayout,
}

/// Live state shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub layout: HandleLayout,
    pub percents: PerChannel<u8>,
    pub fill: FillSpan,
}

/// Final result of a drag; only the dragged channels are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragCommit {
    pub mode: DragMode,
    pub positions: PerChannel<Option<u8>>,
}

impl DragCommit {
    /// Dragged channels with their final percentage, top first.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, u8)> + '_ {
        self.positions
            .iter()
            .filter_map(|(channel, value)| value.map(|v| (channel, v)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: Option<DragSession>,
    live: HandleLayout,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a session. Ignored while another one is still running.
    pub fn begin(&mut self, target: DragTarget, pointer_y: f32, current: HandleLayout) -> bool {
        if self.session.is_some() {
            debug!("Drag already in progress, ignoring press");
            return false;
        }
        let mode = DragMode::from(target);
        debug!("Drag started: {:?} at y={}", mode, pointer_y);
        self.session = Some(DragSession {
            mode,
            start_pointer_y: pointer_y,
            start: current,
        });
        self.live = current;
        true
    }

    /// Follows the pointer, keeping handles inside their ranges and apart by
    /// the minimum gap. `None` without a session.
    pub fn drag_to(&mut self, pointer_y: f32, geometry: &TrackGeometry) -> Option<DragFeedback> {
        let session = self.session?;
        let delta = pointer_y - session.start_pointer_y;
        let gap = geometry.min_gap();

        match session.mode {
            DragMode::Single(Channel::Top) => {
                let bound = geometry.range(Channel::Top).max.min(self.live.bottom_y - gap);
                self.live.top_y = (session.start.top_y + delta).min(bound).max(0.0);
            }
            DragMode::Single(Channel::Bottom) => {
                let range = geometry.range(Channel::Bottom);
                let bound = range.min.max(self.live.top_y + gap);
                self.live.bottom_y = (session.start.bottom_y + delta).min(range.max).max(bound);
            }
            DragMode::Paired => {
                // the gap is invariant here, only the ranges limit the shift
                let top = geometry.range(Channel::Top);
                let bottom = geometry.range(Channel::Bottom);
                let min_delta = (top.min - session.start.top_y).max(bottom.min - session.start.bottom_y);
                let max_delta = (top.max - session.start.top_y).min(bottom.max - session.start.bottom_y);
                let shift = delta.min(max_delta).max(min_delta);
                self.live = HandleLayout::new(session.start.top_y + shift, session.start.bottom_y + shift);
            }
        }

        Some(DragFeedback {
            layout: self.live,
            percents: geometry.percents(self.live),
            fill: geometry.fill(self.live),
        })
    }

    /// Ends the session and returns the positions to commit.
    pub fn release(&mut self, geometry: &TrackGeometry) -> Option<DragCommit> {
        let session = self.session.take()?;
        let percents = geometry.percents(self.live);
        let positions = match session.mode {
            DragMode::Single(channel) => {
                let mut positions = PerChannel::default();
                positions[channel] = Some(percents[channel]);
                positions
            }
            DragMode::Paired => percents.map(|_, p| Some(p)),
        };
        debug!("Drag released: {:?} -> {:?}", session.mode, positions);
        Some(DragCommit {
            mode: session.mode,
            positions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> TrackGeometry {
        TrackGeometry::default()
    }

    #[test]
    fn paired_drag_shifts_both_by_clamped_delta() {
        let g = geometry();
        let mut drag = DragController::new();
        assert!(drag.begin(DragTarget::Fill, 150.0, HandleLayout::new(30.0, 270.0)));

        let feedback = drag.drag_to(200.0, &g).unwrap();
        // the bottom handle can only travel 22px further down
        assert_eq!(feedback.layout, HandleLayout::new(52.0, 292.0));
        assert_eq!(feedback.percents.top, g.y_to_percent(Channel::Top, 52.0));
        assert_eq!(feedback.percents.bottom, 0);
        assert_eq!(feedback.layout.bottom_y - feedback.layout.top_y, 240.0);

        let commit = drag.release(&g).unwrap();
        assert_eq!(commit.mode, DragMode::Paired);
        assert_eq!(commit.positions, PerChannel::new(Some(81), Some(0)));
        assert!(!drag.is_active());
    }

    #[test]
    fn paired_drag_within_range_moves_freely() {
        let g = geometry();
        let mut drag = DragController::new();
        drag.begin(DragTarget::Fill, 100.0, HandleLayout::new(100.0, 200.0));

        let feedback = drag.drag_to(50.0, &g).unwrap();
        assert_eq!(feedback.layout, HandleLayout::new(50.0, 150.0));

        // upwards the top handle hits 0 first
        let feedback = drag.drag_to(-100.0, &g).unwrap();
        assert_eq!(feedback.layout, HandleLayout::new(0.0, 100.0));
    }

    #[test]
    fn top_handle_stops_at_gap_above_bottom() {
        let g = geometry();
        let mut drag = DragController::new();
        drag.begin(DragTarget::Handle(Channel::Top), 50.0, HandleLayout::new(50.0, 120.0));

        let feedback = drag.drag_to(400.0, &g).unwrap();
        assert_eq!(feedback.layout, HandleLayout::new(106.0, 120.0));

        let feedback = drag.drag_to(-400.0, &g).unwrap();
        assert_eq!(feedback.layout.top_y, 0.0);
        assert_eq!(feedback.percents.top, 100);
    }

    #[test]
    fn bottom_handle_stops_at_gap_below_top() {
        let g = geometry();
        let mut drag = DragController::new();
        drag.begin(DragTarget::Handle(Channel::Bottom), 200.0, HandleLayout::new(50.0, 200.0));

        let feedback = drag.drag_to(-300.0, &g).unwrap();
        assert_eq!(feedback.layout, HandleLayout::new(50.0, 64.0));

        let feedback = drag.drag_to(900.0, &g).unwrap();
        assert_eq!(feedback.layout.bottom_y, 292.0);
        assert_eq!(feedback.percents.bottom, 0);
    }

    #[test]
    fn single_release_commits_only_the_dragged_channel() {
        let g = geometry();
        let mut drag = DragController::new();
        drag.begin(DragTarget::Handle(Channel::Bottom), 0.0, HandleLayout::new(0.0, 292.0));
        drag.drag_to(-139.0, &g);

        let commit = drag.release(&g).unwrap();
        assert_eq!(commit.mode, DragMode::Single(Channel::Bottom));
        assert_eq!(commit.positions.top, None);
        assert_eq!(commit.positions.bottom, Some(50));
        assert_eq!(commit.iter().collect::<Vec<_>>(), vec![(Channel::Bottom, 50)]);
    }

    #[test]
    fn release_without_move_commits_start_position() {
        let g = geometry();
        let mut drag = DragController::new();
        let start = g.layout(PerChannel::new(70, 20));
        drag.begin(DragTarget::Handle(Channel::Top), 10.0, start);

        let commit = drag.release(&g).unwrap();
        assert_eq!(commit.positions.top, Some(70));
    }

    #[test]
    fn second_press_during_session_is_ignored() {
        let mut drag = DragController::new();
        assert!(drag.begin(DragTarget::Fill, 0.0, HandleLayout::new(10.0, 100.0)));
        assert!(!drag.begin(DragTarget::Handle(Channel::Top), 0.0, HandleLayout::new(10.0, 100.0)));
        assert_eq!(drag.release(&geometry()).unwrap().mode, DragMode::Paired);
    }

    #[test]
    fn moves_and_release_without_session_do_nothing() {
        let g = geometry();
        let mut drag = DragController::new();
        assert!(drag.drag_to(10.0, &g).is_none());
        assert!(drag.release(&g).is_none());
        assert!(!drag.is_active());
    }
}
