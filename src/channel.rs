//! Channel identifiers and a small per-channel container.
//!
//! The widget always drives exactly two devices. Instead of keying maps by
//! entity strings the core indexes everything by [`Channel`], and the
//! entity id is only looked up at the edge when a command leaves the crate.

use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the two independently controlled devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Device drawn with the upper handle
    Top,
    /// Device drawn with the lower handle
    Bottom,
}

impl Channel {
    /// Both channels, top first. Iteration order of every per-channel operation.
    pub const ALL: [Channel; 2] = [Channel::Top, Channel::Bottom];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Top => write!(f, "top"),
            Channel::Bottom => write!(f, "bottom"),
        }
    }
}

/// A value for each channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerChannel<T> {
    pub top: T,
    pub bottom: T,
}

impl<T> PerChannel<T> {
    pub fn new(top: T, bottom: T) -> Self {
        Self { top, bottom }
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Top => &self.top,
            Channel::Bottom => &self.bottom,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::Top => &mut self.top,
            Channel::Bottom => &mut self.bottom,
        }
    }

    /// Applies `f` to both values, top first.
    pub fn map<U>(self, mut f: impl FnMut(Channel, T) -> U) -> PerChannel<U> {
        PerChannel {
            top: f(Channel::Top, self.top),
            bottom: f(Channel::Bottom, self.bottom),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        [(Channel::Top, &self.top), (Channel::Bottom, &self.bottom)].into_iter()
    }
}

impl<T> Index<Channel> for PerChannel<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        self.get(channel)
    }
}

impl<T> IndexMut<Channel> for PerChannel<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        self.get_mut(channel)
    }
}
