//! Paints the paired slider and feeds pointer input into the widget.
//!
//! Pointer positions are converted to track-relative y before they reach
//! the widget, so the core never sees screen coordinates. While a drag runs
//! the handles, fill and percentages come from the widget's drag feedback.

use super::common::UiColors;
use crate::channel::{Channel, PerChannel};
use crate::dispatch::CoverCommandSink;
use crate::drag::DragFeedback;
use crate::geometry::TrackGeometry;
use crate::widget::{RenderModel, WidgetController};
use egui::{pos2, vec2, Align2, FontId, Rect, Response, Sense, Spinner, Ui};
use std::time::Instant;
use tracing::warn;

const CORNER_RADIUS: f32 = 4.0;
const LABEL_SPACING: f32 = 6.0;

pub fn paired_slider<S: CoverCommandSink>(
    ui: &mut Ui,
    widget: &mut WidgetController<S>,
    model: &RenderModel,
) -> Response {
    let geometry = *widget.geometry();
    let size = vec2(model.slider_width_px as f32, geometry.height);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
    let now = Instant::now();

    if response.drag_started() {
        // the press position, not where the drag threshold was crossed
        if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
            widget.pointer_down(origin.y - rect.top(), now);
        }
    }
    if response.dragged() && widget.is_dragging() {
        if let Some(pointer) = response.interact_pointer_pos() {
            widget.pointer_move(pointer.y - rect.top());
        }
    }
    if response.drag_stopped() {
        if let Some(release) = widget.pointer_up(now) {
            for (channel, e) in release.failures() {
                warn!("Moving {} cover failed: {}", channel, e);
            }
        }
    }

    let shown = widget.drag_feedback().unwrap_or(DragFeedback {
        layout: model.layout,
        percents: model.percents,
        fill: model.fill,
    });
    paint(ui, rect, &geometry, &shown, model);
    response
}

fn paint(ui: &mut Ui, rect: Rect, geometry: &TrackGeometry, shown: &DragFeedback, model: &RenderModel) {
    let painter = ui.painter_at(rect);
    let layout = shown.layout;

    if model.show_slider_background {
        painter.rect_filled(rect, CORNER_RADIUS, UiColors::TRACK_BG);
    }

    let fill = shown.fill;
    painter.rect_filled(
        Rect::from_min_max(
            pos2(rect.left(), rect.top() + fill.top_y),
            pos2(rect.right(), rect.top() + fill.bottom_y),
        ),
        0.0,
        UiColors::FILL,
    );

    let handle_color = if model.has_pending {
        UiColors::PENDING
    } else {
        UiColors::HANDLE
    };
    for channel in Channel::ALL {
        let y = rect.top() + layout.y(channel);
        painter.rect_filled(
            Rect::from_min_max(pos2(rect.left(), y), pos2(rect.right(), y + geometry.handle)),
            CORNER_RADIUS,
            handle_color,
        );
    }
    handle_labels(ui, rect, geometry, shown, model);

    if model.is_moving {
        let spinner = Rect::from_center_size(rect.center(), vec2(20.0, 20.0));
        ui.put(spinner, Spinner::new().size(20.0));
    }
}

/// Percentages next to each handle, outside the track.
fn handle_labels(ui: &Ui, rect: Rect, geometry: &TrackGeometry, shown: &DragFeedback, model: &RenderModel) {
    let labels = PerChannel::new(&model.top_label, &model.bottom_label);
    let painter = ui.painter();
    let color = ui.visuals().text_color();
    for channel in Channel::ALL {
        let centre = rect.top() + shown.layout.y(channel) + geometry.handle / 2.0;
        painter.text(
            pos2(rect.right() + LABEL_SPACING, centre),
            Align2::LEFT_CENTER,
            format!("{} {}%", labels[channel], shown.percents[channel]),
            FontId::proportional(12.0),
            color,
        );
    }
}
