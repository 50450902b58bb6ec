//! # Widget Controller
//!
//! One instance per dual cover card. Wires the geometry, motion engine,
//! pending store, drag controller and dispatcher together and produces the
//! [`WidgetView`] the renderer draws.
//!
//! ```text
//! device snapshots ──► update_state ──► MotionInferenceEngine ──┐
//!                                                              ├─► WidgetView
//! pointer events ────► DragController ──► release ──┬─► PendingCommandStore (deferred)
//!                                                   └─► CommandDispatcher  (immediate)
//! ```
//!
//! All operations take `&mut self` and an explicit `now`, so a caller can
//! never nest an update inside another one.

use crate::channel::{Channel, PerChannel};
use crate::config::CardConfig;
use crate::dispatch::{CommandDispatcher, CoverCommandSink, DispatchOutcome};
use crate::drag::{DragCommit, DragController, DragFeedback};
use crate::error::CoverError;
use crate::geometry::{FillSpan, HandleLayout, TrackGeometry};
use crate::motion::{DeviceSnapshot, MotionInferenceEngine};
use crate::pending::PendingCommandStore;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything the renderer needs for one frame of a healthy card.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    /// `None` when the title is hidden
    pub title: Option<String>,
    pub top_label: String,
    pub bottom_label: String,
    /// Shown percentages; pending values replace device values in deferred mode
    pub percents: PerChannel<u8>,
    pub is_moving: bool,
    pub layout: HandleLayout,
    pub fill: FillSpan,
    pub show_card_background: bool,
    pub show_slider_background: bool,
    pub slider_width_px: u32,
    pub show_info: bool,
    /// Set and Reset buttons, deferred mode only
    pub show_set_reset: bool,
    pub show_stop: bool,
    pub has_pending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetView {
    /// Nothing received from the device layer yet
    Waiting,
    Ready(RenderModel),
    /// Rendering impossible, one message per problem
    Warning {
        title: String,
        messages: Vec<String>,
    },
}

/// What a finished drag produced.
#[derive(Debug)]
pub struct DragRelease {
    pub commit: DragCommit,
    /// One result per dispatched channel in immediate mode, empty when the
    /// values were staged
    pub dispatched: Vec<(Channel, Result<DispatchOutcome, CoverError>)>,
}

impl DragRelease {
    pub fn failures(&self) -> impl Iterator<Item = (Channel, &CoverError)> + '_ {
        self.dispatched
            .iter()
            .filter_map(|(channel, result)| result.as_ref().err().map(|e| (*channel, e)))
    }
}

impl WidgetView {
    /// Warning view carrying a single error message.
    pub fn from_error(title: impl Into<String>, error: &CoverError) -> Self {
        WidgetView::Warning {
            title: title.into(),
            messages: vec![error.to_string()],
        }
    }

    /// The render model of a healthy card.
    pub fn model(&self) -> Option<&RenderModel> {
        match self {
            WidgetView::Ready(model) => Some(model),
            _ => None,
        }
    }
}

/// Per-card state and the operations a renderer or device layer drives.
pub struct WidgetController<S> {
    config: CardConfig,
    geometry: TrackGeometry,
    motion: MotionInferenceEngine,
    pending: PendingCommandStore,
    drag: DragController,
    feedback: Option<DragFeedback>,
    dispatcher: CommandDispatcher<S>,
    devices: PerChannel<Option<DeviceSnapshot>>,
    display: PerChannel<u8>,
    is_moving: bool,
    received_state: bool,
    view: WidgetView,
}

impl<S: CoverCommandSink> WidgetController<S> {
    /// # Errors
    ///
    /// [`CoverError::ConfigError`] when a channel is not configured or the
    /// track geometry leaves no travel for the handles.
    pub fn new(config: CardConfig, geometry: TrackGeometry, sink: S) -> Result<Self, CoverError> {
        config.validate()?;
        geometry.validate()?;
        info!(
            "Dual cover widget for {} / {} ({} mode)",
            config.top_channel,
            config.bottom_channel,
            if config.deferred_mode { "deferred" } else { "immediate" }
        );

        let dispatcher = CommandDispatcher::new(sink, config.entities());
        Ok(Self {
            config,
            geometry,
            motion: MotionInferenceEngine::new(),
            pending: PendingCommandStore::new(),
            drag: DragController::new(),
            feedback: None,
            dispatcher,
            devices: PerChannel::default(),
            display: PerChannel::default(),
            is_moving: false,
            received_state: false,
            view: WidgetView::Waiting,
        })
    }

    /// Replaces the card options. An invalid config is refused and the
    /// current one stays active.
    ///
    /// Staged positions are dropped when deferred mode is left or entered
    /// and when either cover entity changes, since they were picked for the
    /// previous devices.
    pub fn set_config(&mut self, config: CardConfig) -> Result<Option<WidgetView>, CoverError> {
        config.validate()?;

        if !config.deferred_mode || config.deferred_mode != self.config.deferred_mode {
            self.pending.discard_all();
        }
        if config.entities() != self.config.entities() {
            info!("Cover entities changed, resetting tracked state");
            self.pending.discard_all();
            self.motion = MotionInferenceEngine::new();
            self.devices = PerChannel::default();
            self.display = PerChannel::default();
            self.is_moving = false;
            self.received_state = false;
        }
        self.dispatcher.set_entities(config.entities());
        self.config = config;
        Ok(self.render())
    }

    /// Consumes the latest snapshot of each channel; `None` means the device
    /// layer knows nothing about that entity.
    ///
    /// Returns the new view when it differs from the previous one. During a
    /// drag the motion engine still sees the update, but the view is left
    /// alone so the dragged handles are not overwritten.
    pub fn update_state(
        &mut self,
        top: Option<DeviceSnapshot>,
        bottom: Option<DeviceSnapshot>,
        now: Instant,
    ) -> Option<WidgetView> {
        self.received_state = true;
        self.devices = PerChannel::new(top, bottom);

        if let (Some(top), Some(bottom)) = (top, bottom) {
            let verdict = self.motion.observe(PerChannel::new(top, bottom), now);
            if verdict.is_moving != self.is_moving {
                debug!(
                    "Motion {} (state {}, delta {}, command {})",
                    if verdict.is_moving { "started" } else { "ended" },
                    verdict.by_state,
                    verdict.by_delta,
                    verdict.by_command
                );
            }
            self.display = verdict.display;
            self.is_moving = verdict.is_moving;
        }

        if self.drag.is_active() {
            return None;
        }
        self.render()
    }

    /// Re-evaluates motion without a new snapshot so expired deadlines show up.
    pub fn refresh(&mut self, now: Instant) -> Option<WidgetView> {
        if self.drag.is_active() {
            return None;
        }
        self.reevaluate(now);
        self.render()
    }

    /// Starts a drag if `y` (track-relative) lands on a handle or the fill.
    ///
    /// Presses are ignored while a cover moves or the view is not ready.
    pub fn pointer_down(&mut self, y: f32, now: Instant) -> bool {
        self.reevaluate(now);
        if self.is_moving {
            debug!("Covers moving, ignoring press");
            return false;
        }
        let Some(layout) = self.view.model().map(|model| model.layout) else {
            return false;
        };
        let Some(target) = self.geometry.hit_test(layout, y) else {
            return false;
        };
        if !self.drag.begin(target, y, layout) {
            return false;
        }
        // until the first move the drag shows what the card showed
        self.feedback = self.view.model().map(|model| DragFeedback {
            layout: model.layout,
            percents: model.percents,
            fill: model.fill,
        });
        true
    }

    /// Moves the running drag; the returned feedback is also kept for
    /// [`WidgetController::drag_feedback`].
    pub fn pointer_move(&mut self, y: f32) -> Option<DragFeedback> {
        let feedback = self.drag.drag_to(y, &self.geometry)?;
        self.feedback = Some(feedback);
        Some(feedback)
    }

    /// Ends the drag and routes the result to the pending store or the
    /// dispatcher, depending on the mode.
    ///
    /// Dispatch failures are not retried; they come back in
    /// [`DragRelease::dispatched`] and the commanded motion runs into its
    /// timeout.
    pub fn pointer_up(&mut self, now: Instant) -> Option<DragRelease> {
        let commit = self.drag.release(&self.geometry)?;
        self.feedback = None;

        let mut dispatched = Vec::new();
        if self.config.deferred_mode {
            for (channel, value) in commit.iter() {
                self.pending.set_pending(channel, value);
            }
        } else {
            for (channel, value) in commit.iter() {
                let result = self
                    .dispatcher
                    .set_position(&mut self.motion, channel, i32::from(value), now);
                dispatched.push((channel, result));
            }
        }

        self.reevaluate(now);
        self.render();
        Some(DragRelease { commit, dispatched })
    }

    /// The "Set" button: sends every staged position.
    pub fn apply_pending(&mut self, now: Instant) -> Vec<(Channel, Result<DispatchOutcome, CoverError>)> {
        let results = self
            .pending
            .apply_all(&mut self.dispatcher, &mut self.motion, now);
        self.reevaluate(now);
        self.render();
        results
    }

    /// The "Reset" button: drops staged positions, the display follows the
    /// devices again.
    pub fn reset_pending(&mut self) -> Option<WidgetView> {
        self.pending.discard_all();
        self.render()
    }

    /// The "Stop" button: stops both covers.
    pub fn stop(&mut self, now: Instant) -> Result<(), CoverError> {
        let result = self.dispatcher.stop_all_channels(&mut self.motion);
        self.reevaluate(now);
        self.render();
        result
    }

    /// Last rendered view. Not updated while a drag runs.
    pub fn view(&self) -> &WidgetView {
        &self.view
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Staged positions of deferred mode.
    pub fn pending(&self) -> &PendingCommandStore {
        &self.pending
    }

    pub fn motion(&self) -> &MotionInferenceEngine {
        &self.motion
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Live handles, fill and percentages of a running drag. The renderer
    /// draws these instead of the view until the pointer is released.
    pub fn drag_feedback(&self) -> Option<DragFeedback> {
        self.feedback
    }

    /// The sink commands are handed to.
    pub fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

    fn reevaluate(&mut self, now: Instant) {
        if let Some(verdict) = self.motion.reevaluate(now) {
            self.display = verdict.display;
            self.is_moving = verdict.is_moving;
        }
    }

    /// Rebuilds the view, returning it only when it changed.
    fn render(&mut self) -> Option<WidgetView> {
        let view = self.build_view();
        if view == self.view {
            return None;
        }
        if let WidgetView::Warning { messages, .. } = &view {
            for message in messages {
                warn!("{}", message);
            }
        }
        self.view = view.clone();
        Some(view)
    }

    fn build_view(&self) -> WidgetView {
        if !self.received_state {
            return WidgetView::Waiting;
        }

        let missing: Vec<String> = self
            .devices
            .iter()
            .filter(|(_, snapshot)| snapshot.is_none())
            .map(|(channel, _)| {
                CoverError::MissingDeviceState {
                    channel,
                    entity: self.dispatcher.entity(channel).to_string(),
                }
                .to_string()
            })
            .collect();
        if !missing.is_empty() {
            return WidgetView::Warning {
                title: self.config.display_title().to_string(),
                messages: missing,
            };
        }

        let percents = if self.config.deferred_mode {
            self.display
                .map(|channel, shown| self.pending.get(channel).unwrap_or(shown))
        } else {
            self.display
        };
        let layout = self.geometry.layout(percents);

        WidgetView::Ready(RenderModel {
            title: self
                .config
                .show_title
                .then(|| self.config.display_title().to_string()),
            top_label: self.config.display_top_label().to_string(),
            bottom_label: self.config.display_bottom_label().to_string(),
            percents,
            is_moving: self.is_moving,
            layout,
            fill: self.geometry.fill(layout),
            show_card_background: self.config.show_card_background,
            show_slider_background: self.config.show_slider_background,
            slider_width_px: self.config.slider_width_px,
            show_info: self.config.show_info,
            show_set_reset: self.config.deferred_mode,
            show_stop: self.config.show_stop,
            has_pending: self.pending.has_pending(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{RecordingSink, SinkCommand};
    use std::time::Duration;

    fn card(deferred: bool) -> CardConfig {
        CardConfig {
            top_channel: "blinds/top".to_string(),
            bottom_channel: "blinds/bottom".to_string(),
            deferred_mode: deferred,
            show_stop: true,
            ..CardConfig::default()
        }
    }

    fn widget(deferred: bool) -> WidgetController<RecordingSink> {
        WidgetController::new(card(deferred), TrackGeometry::default(), RecordingSink::default()).unwrap()
    }

    fn idle(position: u8) -> Option<DeviceSnapshot> {
        Some(DeviceSnapshot::new(false, position))
    }

    fn bottom_y(widget: &WidgetController<RecordingSink>) -> f32 {
        widget.view().model().unwrap().layout.bottom_y
    }

    /// Drags the bottom handle until it shows `percent`.
    fn drag_bottom_to(widget: &mut WidgetController<RecordingSink>, percent: u8, now: Instant) {
        let start = bottom_y(widget);
        assert!(widget.pointer_down(start, now));
        let target = widget.geometry().percent_to_y(Channel::Bottom, percent);
        let feedback = widget.pointer_move(target).unwrap();
        assert_eq!(feedback.percents.bottom, percent);
        let release = widget.pointer_up(now).unwrap();
        assert!(release.failures().next().is_none());
    }

    #[test]
    fn missing_channels_are_a_config_error() {
        let result = WidgetController::new(CardConfig::default(), TrackGeometry::default(), RecordingSink::default());
        assert!(matches!(result, Err(CoverError::ConfigError(_))));
    }

    #[test]
    fn impossible_geometry_is_a_config_error() {
        let geometry = TrackGeometry {
            height: 20.0,
            ..TrackGeometry::default()
        };
        let result = WidgetController::new(card(true), geometry, RecordingSink::default());
        assert!(matches!(result, Err(CoverError::ConfigError(_))));
    }

    #[test]
    fn deferred_drag_stages_until_applied() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);

        drag_bottom_to(&mut widget, 42, t0);

        assert!(widget.sink().commands.is_empty());
        let model = widget.view().model().unwrap();
        assert!(model.has_pending);
        assert_eq!(model.percents.bottom, 42);

        let results = widget.apply_pending(t0 + Duration::from_millis(10));
        assert_eq!(results.len(), 1);
        assert_eq!(
            widget.sink().set_positions(),
            vec![("blinds/bottom".to_string(), 42)]
        );
        assert!(!widget.pending().has_pending());
        assert!(widget.is_moving());
    }

    #[test]
    fn deferred_drag_discarded_sends_nothing() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        drag_bottom_to(&mut widget, 42, t0);

        let view = widget.reset_pending().unwrap();
        assert_eq!(view.model().unwrap().percents.bottom, 0);
        assert!(!view.model().unwrap().has_pending);

        assert!(widget.apply_pending(t0).is_empty());
        assert!(widget.sink().commands.is_empty());
    }

    #[test]
    fn immediate_drag_dispatches_on_release() {
        let mut widget = widget(false);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);

        drag_bottom_to(&mut widget, 42, t0);

        assert_eq!(
            widget.sink().set_positions(),
            vec![("blinds/bottom".to_string(), 42)]
        );
        assert!(!widget.pending().has_pending());
        let model = widget.view().model().unwrap();
        assert!(model.is_moving);
        assert!(!model.show_set_reset);
        // frozen on the stable position until the cover arrives
        assert_eq!(model.percents.bottom, 0);
    }

    #[test]
    fn paired_drag_on_fill_commits_both_channels() {
        let mut widget = widget(false);
        let t0 = Instant::now();
        widget.update_state(idle(90), idle(10), t0);

        let fill = widget.view().model().unwrap().fill;
        let middle = (fill.top_y + fill.bottom_y) / 2.0;
        assert!(widget.pointer_down(middle, t0));
        widget.pointer_move(middle + 20.0);
        let release = widget.pointer_up(t0).unwrap();

        let positions = release.commit.positions;
        assert!(positions.top.is_some() && positions.bottom.is_some());
        assert_eq!(release.dispatched.len(), 2);
        assert_eq!(widget.sink().set_positions().len(), 2);
    }

    #[test]
    fn drag_feedback_follows_the_pointer_until_release() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        assert_eq!(widget.drag_feedback(), None);

        assert!(widget.pointer_down(bottom_y(&widget), t0));
        let start = widget.drag_feedback().unwrap();
        assert_eq!(start.percents, PerChannel::new(100, 0));
        assert_eq!(start.layout, widget.view().model().unwrap().layout);

        let target = widget.geometry().percent_to_y(Channel::Bottom, 60);
        widget.pointer_move(target);
        let live = widget.drag_feedback().unwrap();
        assert_eq!(live.percents, PerChannel::new(100, 60));
        assert!((live.layout.bottom_y - target).abs() < 0.01);
        assert_eq!(live.fill, widget.geometry().fill(live.layout));
        // the view itself stays on the device values during the drag
        assert_eq!(widget.view().model().unwrap().percents.bottom, 0);

        widget.pointer_up(t0);
        assert_eq!(widget.drag_feedback(), None);
    }

    #[test]
    fn immediate_release_reports_dispatch_failures() {
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let mut widget = WidgetController::new(card(false), TrackGeometry::default(), sink).unwrap();
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);

        assert!(widget.pointer_down(bottom_y(&widget), t0));
        widget.pointer_move(widget.geometry().percent_to_y(Channel::Bottom, 42));
        let release = widget.pointer_up(t0).unwrap();

        assert_eq!(release.commit.positions, PerChannel::new(None, Some(42)));
        assert!(matches!(
            release.dispatched.as_slice(),
            [(Channel::Bottom, Err(CoverError::DispatchFailure(_)))]
        ));
        assert_eq!(release.failures().count(), 1);
        // still tracked, the command timeout ends the motion
        assert!(widget.is_moving());
    }

    #[test]
    fn deferred_release_dispatches_nothing() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);

        assert!(widget.pointer_down(bottom_y(&widget), t0));
        widget.pointer_move(widget.geometry().percent_to_y(Channel::Bottom, 42));
        let release = widget.pointer_up(t0).unwrap();

        assert!(release.dispatched.is_empty());
        assert_eq!(widget.pending().get(Channel::Bottom), Some(42));
    }

    #[test]
    fn presses_are_ignored_while_moving() {
        let mut widget = widget(false);
        let t0 = Instant::now();
        widget.update_state(idle(100), Some(DeviceSnapshot::new(true, 0)), t0);

        assert!(!widget.pointer_down(bottom_y(&widget), t0));
        assert!(!widget.is_dragging());
    }

    #[test]
    fn updates_during_drag_do_not_rerender() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        let before = widget.view().clone();

        assert!(widget.pointer_down(bottom_y(&widget), t0));
        assert!(widget.update_state(idle(100), idle(30), t0 + Duration::from_millis(100)).is_none());
        assert_eq!(widget.view(), &before);
        assert!(widget.motion().last_snapshots().is_some_and(|s| s.bottom.position == 30));

        // the release renders with the staged value
        widget.pointer_up(t0 + Duration::from_millis(200));
        assert_eq!(widget.view().model().unwrap().percents.bottom, 0);
        assert!(widget.view().model().unwrap().has_pending);
    }

    #[test]
    fn missing_device_state_renders_a_warning() {
        let mut widget = widget(true);
        assert_eq!(widget.view(), &WidgetView::Waiting);

        let view = widget.update_state(idle(50), None, Instant::now()).unwrap();
        match view {
            WidgetView::Warning { messages, .. } => {
                assert_eq!(messages, vec!["bottom cover entity not found: blinds/bottom"]);
            }
            other => panic!("expected warning, got {:?}", other),
        }
        assert!(!widget.pointer_down(10.0, Instant::now()));
    }

    #[test]
    fn unchanged_state_yields_no_new_view() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        assert!(widget.update_state(idle(60), idle(20), t0).is_some());
        assert!(widget.update_state(idle(60), idle(20), t0 + Duration::from_millis(50)).is_none());
        assert!(widget.refresh(t0 + Duration::from_millis(60)).is_none());
    }

    #[test]
    fn refresh_picks_up_expired_delta_motion() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(60), idle(20), t0);
        widget.update_state(idle(55), idle(20), t0 + Duration::from_millis(500));
        let view = widget
            .update_state(idle(50), idle(20), t0 + Duration::from_millis(1000))
            .unwrap();
        assert!(view.model().unwrap().is_moving);
        assert_eq!(view.model().unwrap().percents.top, 55);

        let view = widget.refresh(t0 + Duration::from_millis(3600)).unwrap();
        assert!(!view.model().unwrap().is_moving);
        assert_eq!(view.model().unwrap().percents.top, 50);
    }

    #[test]
    fn stop_clears_commanded_motion() {
        let mut widget = widget(false);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        drag_bottom_to(&mut widget, 42, t0);
        assert!(widget.is_moving());

        widget.stop(t0 + Duration::from_millis(300)).unwrap();
        assert!(!widget.is_moving());
        assert_eq!(
            widget.sink().commands[1..],
            [
                SinkCommand::Stop("blinds/top".to_string()),
                SinkCommand::Stop("blinds/bottom".to_string()),
            ]
        );
    }

    #[test]
    fn leaving_deferred_mode_discards_pending() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        drag_bottom_to(&mut widget, 42, t0);
        assert!(widget.pending().has_pending());

        widget.set_config(card(false)).unwrap();
        assert!(!widget.pending().has_pending());
        assert!(widget.sink().commands.is_empty());
    }

    #[test]
    fn switching_covers_discards_pending() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        drag_bottom_to(&mut widget, 42, t0);
        assert!(widget.pending().has_pending());

        let other_covers = CardConfig {
            bottom_channel: "blinds/side".to_string(),
            ..card(true)
        };
        widget.set_config(other_covers).unwrap();
        assert!(!widget.pending().has_pending());

        // Set after the switch must not move the new cover to the old value
        assert!(widget.apply_pending(t0 + Duration::from_millis(500)).is_empty());
        assert!(widget.sink().commands.is_empty());
    }

    #[test]
    fn same_covers_keep_pending_in_deferred_mode() {
        let mut widget = widget(true);
        let t0 = Instant::now();
        widget.update_state(idle(100), idle(0), t0);
        drag_bottom_to(&mut widget, 42, t0);

        widget
            .set_config(CardConfig {
                title: "Living room".to_string(),
                ..card(true)
            })
            .unwrap();
        assert_eq!(widget.pending().get(Channel::Bottom), Some(42));
    }

    #[test]
    fn invalid_config_update_is_refused() {
        let mut widget = widget(true);
        let broken = CardConfig {
            bottom_channel: String::new(),
            ..card(true)
        };
        assert!(widget.set_config(broken).is_err());
        assert_eq!(widget.config().bottom_channel, "blinds/bottom");
    }

    #[test]
    fn hidden_title_is_not_rendered() {
        let mut widget = widget(true);
        widget
            .set_config(CardConfig {
                show_title: false,
                ..card(true)
            })
            .unwrap();
        let view = widget.update_state(idle(10), idle(0), Instant::now()).unwrap();
        assert_eq!(view.model().unwrap().title, None);
    }
}
