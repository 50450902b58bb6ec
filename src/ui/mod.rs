//! # Dual Cover Card
//!
//! eframe application hosting one [`WidgetController`]. Each frame it drains
//! device updates from the link task, lets the widget re-evaluate motion and
//! draws the current view:
//!
//! ```text
//! ┌───────────────────────┐
//! │ Title                 │
//! │        ┌────┐         │
//! │        │ ▬▬ │ top     │
//! │        │ ░░ │         │
//! │        │ ▬▬ │ bottom  │
//! │        └────┘         │
//! │ Top 80%   Bottom 20%  │
//! │ [Set] [Reset] [Stop]  │
//! │ ● connected  12:04:31 │
//! └───────────────────────┘
//! ```
//!
//! The UI never waits on the link: updates arrive via `try_recv`, commands
//! leave through the widget's [`ChannelCommandSink`].

pub mod common;
pub mod slider;

use crate::channel::{Channel, PerChannel};
use crate::mqtt::link::ConnectionState;
use crate::mqtt::messages::DeviceUpdate;
use crate::mqtt::sink::ChannelCommandSink;
use crate::mqtt::state::CoverStateStore;
use crate::widget::{RenderModel, WidgetController, WidgetView};
use eframe::egui::{self, Align, Layout, RichText, Ui};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use self::common::{card_frame, connection_indicator, UiColors};

const REPAINT_INTERVAL: Duration = Duration::from_millis(33);

pub struct DualCoverApp {
    /// `Err` holds the warning shown when the widget could not be built
    widget: Result<WidgetController<ChannelCommandSink>, WidgetView>,
    entities: PerChannel<String>,
    updates: mpsc::Receiver<DeviceUpdate>,
    store: CoverStateStore,
    status: watch::Receiver<ConnectionState>,
}

impl DualCoverApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        widget: Result<WidgetController<ChannelCommandSink>, WidgetView>,
        entities: PerChannel<String>,
        updates: mpsc::Receiver<DeviceUpdate>,
        status: watch::Receiver<ConnectionState>,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        Self {
            widget,
            entities,
            updates,
            store: CoverStateStore::new(),
            status,
        }
    }

    /// Moves queued device updates into the store and hands the resulting
    /// snapshots to the widget; without updates only deadlines are checked.
    fn sync_widget(&mut self) {
        let mut received = 0usize;
        while let Ok(update) = self.updates.try_recv() {
            self.store.apply(update);
            received += 1;
        }

        let Ok(widget) = &mut self.widget else {
            return;
        };
        let now = Instant::now();
        if received > 0 {
            debug!("Applying {} device updates", received);
            widget.update_state(
                self.store.snapshot(&self.entities.top),
                self.store.snapshot(&self.entities.bottom),
                now,
            );
        } else {
            widget.refresh(now);
        }
    }

    fn last_update_label(&self) -> Option<String> {
        Channel::ALL
            .iter()
            .filter_map(|channel| self.store.last_update(&self.entities[*channel]))
            .max()
            .map(|at| at.format("%H:%M:%S").to_string())
    }
}

fn status_line(ui: &mut Ui, state: &ConnectionState, last_update: Option<&str>) {
    let (color, text) = connection_indicator(state);
    ui.horizontal(|ui| {
        ui.colored_label(color, "\u{2B24}");
        ui.label(text);
        if let Some(at) = last_update {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.weak(at);
            });
        }
    });
}

fn warning_view(ui: &mut Ui, title: &str, messages: &[String]) {
    ui.heading(title);
    for message in messages {
        ui.colored_label(UiColors::INACTIVE, message);
    }
}

fn info_row(ui: &mut Ui, model: &RenderModel, percents: PerChannel<u8>) {
    ui.horizontal(|ui| {
        ui.label(format!("{} {}%", model.top_label, percents.top));
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.label(format!("{} {}%", model.bottom_label, percents.bottom));
        });
    });
}

fn action_row(ui: &mut Ui, widget: &mut WidgetController<ChannelCommandSink>, model: &RenderModel) {
    if !model.show_set_reset && !model.show_stop {
        return;
    }
    let now = Instant::now();
    ui.horizontal(|ui| {
        if model.show_set_reset {
            if ui
                .add_enabled(model.has_pending, egui::Button::new("Set"))
                .clicked()
            {
                for (channel, result) in widget.apply_pending(now) {
                    if let Err(e) = result {
                        warn!("Applying {} position failed: {}", channel, e);
                    }
                }
            }
            if ui
                .add_enabled(model.has_pending, egui::Button::new("Reset"))
                .clicked()
            {
                widget.reset_pending();
            }
        }
        if model.show_stop && ui.button("Stop").clicked() {
            if let Err(e) = widget.stop(now) {
                error!("Stop failed: {}", e);
            }
        }
    });
}

fn card(ui: &mut Ui, widget: &mut WidgetController<ChannelCommandSink>) {
    let model = match widget.view() {
        WidgetView::Ready(model) => model.clone(),
        WidgetView::Waiting => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for cover state");
            });
            return;
        }
        WidgetView::Warning { title, messages } => {
            warning_view(ui, title, messages);
            return;
        }
    };

    if let Some(title) = &model.title {
        ui.heading(title);
    }
    ui.vertical_centered(|ui| {
        slider::paired_slider(ui, widget, &model);
    });
    if model.show_info {
        // live values while dragging
        let percents = widget
            .drag_feedback()
            .map_or(model.percents, |feedback| feedback.percents);
        info_row(ui, &model, percents);
    }
    if model.is_moving {
        ui.label(RichText::new("Moving").weak());
    }
    action_row(ui, widget, &model);
}

impl eframe::App for DualCoverApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_widget();

        let state = self.status.borrow().clone();
        let last_update = self.last_update_label();
        let show_background = match &self.widget {
            Ok(widget) => widget.config().show_card_background,
            Err(_) => true,
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.ctx().request_repaint_after(REPAINT_INTERVAL);
            card_frame(show_background).show(ui, |ui| {
                match &mut self.widget {
                    Ok(widget) => card(ui, widget),
                    Err(WidgetView::Warning { title, messages }) => warning_view(ui, title, messages),
                    Err(_) => {}
                }
                ui.separator();
                status_line(ui, &state, last_update.as_deref());
            });
        });
    }
}
