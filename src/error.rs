//! Error definitions for the widget core

use crate::channel::Channel;
use thiserror::Error;

/// Errors raised by the widget core.
#[derive(Debug, Error)]
pub enum CoverError {
    /// Required channel identifiers missing or track geometry unusable.
    ///
    /// Fatal to rendering; surfaced as a warning view and never retried.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A configured channel has no snapshot from the device layer yet.
    #[error("{channel} cover entity not found: {entity}")]
    MissingDeviceState { channel: Channel, entity: String },

    /// A position outside 0..=100 was handed to the dispatcher.
    #[error("Invalid position {0}, expected 0..=100")]
    InvalidPosition(i32),

    /// The device layer refused to accept a command.
    #[error("Command dispatch failed: {0}")]
    DispatchFailure(String),
}
