//! Shared styling for the card.

use crate::mqtt::link::ConnectionState;
use egui::{Color32, Frame, Stroke};

/// Dark palette used by every part of the card.
pub struct UiColors;

impl UiColors {
    /// Card background (RGB: 30, 30, 30)
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);

    /// Slider track background (RGB: 20, 20, 20)
    pub const TRACK_BG: Color32 = Color32::from_rgb(20, 20, 20);

    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Shaded region between the handles
    pub const FILL: Color32 = Color32::from_rgb(70, 110, 160);

    pub const HANDLE: Color32 = Color32::from_rgb(220, 220, 220);

    /// Handle colour while a value is staged but not applied
    pub const PENDING: Color32 = Color32::from_rgb(240, 180, 40);

    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);
}

/// Card frame; without background only the inner margin remains.
pub fn card_frame(show_background: bool) -> Frame {
    let frame = Frame::new().inner_margin(8).outer_margin(2);
    if show_background {
        frame
            .stroke(Stroke::new(1.0, UiColors::BORDER))
            .fill(UiColors::MAIN_BG)
    } else {
        frame
    }
}

pub fn connection_indicator(state: &ConnectionState) -> (Color32, &'static str) {
    match state {
        ConnectionState::Connected => (UiColors::ACTIVE, "connected"),
        ConnectionState::Connecting => (UiColors::PENDING, "connecting"),
        ConnectionState::Reconnecting => (UiColors::PENDING, "reconnecting"),
        ConnectionState::Disconnected => (UiColors::INACTIVE, "disconnected"),
    }
}
