//! Paired slider core for two stacked covers sharing one opening, such as a
//! top-down/bottom-up blind: one track, two handles, one for each device.
//!
//! The core ([`widget::WidgetController`] and the modules it wires together)
//! is synchronous and free of I/O. [`mqtt`] connects it to covers published
//! over MQTT, and [`ui`] draws it with egui.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod motion;
pub mod mqtt;
pub mod pending;
pub mod ui;
pub mod widget;
