//! # Track Geometry
//!
//! Maps device percentages to pixel positions inside the slider track and
//! back. Both handles live in the same track but have their own travel
//! range, so neither can be parked where the other one becomes impossible
//! to grab:
//!
//! ```text
//!  y = 0            ┌──────┐  top handle at 100%
//!                   │      │
//!  y = h + m        │      │  bottom handle at 100%
//!                   │      │
//!  y = H-h-(h+m)    │      │  top handle at 0%
//!                   │      │
//!  y = H - h        └──────┘  bottom handle at 0%
//! ```
//!
//! Higher percentages render higher on screen (0 = closed, 100 = open).
//!
//! ## Collision Resolution
//!
//! Device positions are independent, so a reported pair can put the top
//! handle below the bottom one. [`TrackGeometry::layout`] re-centres such a
//! pair around its midpoint with exactly the minimum gap and then pushes the
//! pair back inside the track. Track bounds take precedence over the gap;
//! [`TrackGeometry::validate`] rejects geometries in which the two cannot
//! both hold.

use crate::channel::{Channel, PerChannel};
use crate::error::CoverError;
use serde::{Deserialize, Serialize};

/// Fixed dimensions of the slider track, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackGeometry {
    /// Track height `H`
    pub height: f32,
    /// Handle bar thickness `h`
    pub handle: f32,
    /// Extra spacing `m` kept between the two handles
    pub margin: f32,
    /// Extra pointer tolerance around a handle when hit testing
    pub grab_slop: f32,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            height: 300.0,
            handle: 8.0,
            margin: 6.0,
            grab_slop: 6.0,
        }
    }
}

/// Pixel bounds a handle may travel within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelRange {
    pub min: f32,
    pub max: f32,
}

impl TravelRange {
    /// Never zero, so the percent conversion cannot divide by zero.
    pub fn span(&self) -> f32 {
        (self.max - self.min).max(1.0)
    }

    pub fn clamp(&self, y: f32) -> f32 {
        y.max(self.min).min(self.max)
    }
}

/// Vertical pixel position of the top edge of both handle bars.
///
/// A bar covers `y..y + handle`; its centre line sits half a thickness below.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandleLayout {
    pub top_y: f32,
    pub bottom_y: f32,
}

impl HandleLayout {
    pub fn new(top_y: f32, bottom_y: f32) -> Self {
        Self { top_y, bottom_y }
    }

    pub fn y(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Top => self.top_y,
            Channel::Bottom => self.bottom_y,
        }
    }

}

/// Shaded region drawn between the handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSpan {
    pub top_y: f32,
    pub bottom_y: f32,
}

impl FillSpan {
    pub fn contains(&self, y: f32) -> bool {
        y >= self.top_y && y <= self.bottom_y
    }
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Handle(Channel),
    Fill,
}

impl TrackGeometry {
    /// Minimum distance between the two handle positions, one bar plus the margin.
    pub fn min_gap(&self) -> f32 {
        self.handle + self.margin
    }

    /// Lowest position any handle can reach.
    pub fn max_y(&self) -> f32 {
        self.height - self.handle
    }

    pub fn range(&self, channel: Channel) -> TravelRange {
        match channel {
            Channel::Top => TravelRange {
                min: 0.0,
                max: (self.max_y() - self.min_gap()).max(1.0),
            },
            Channel::Bottom => TravelRange {
                min: self.min_gap(),
                max: self.max_y(),
            },
        }
    }

    /// Rejects geometries in which both handles cannot travel while keeping
    /// the minimum gap.
    pub fn validate(&self) -> Result<(), CoverError> {
        if !(self.height.is_finite() && self.handle.is_finite() && self.margin.is_finite()) {
            return Err(CoverError::ConfigError(
                "track dimensions must be finite".to_string(),
            ));
        }
        if self.handle <= 0.0 || self.margin < 0.0 || self.grab_slop < 0.0 {
            return Err(CoverError::ConfigError(format!(
                "invalid handle dimensions (handle {}, margin {}, grab slop {})",
                self.handle, self.margin, self.grab_slop
            )));
        }
        if self.max_y() - self.min_gap() <= 0.0 {
            return Err(CoverError::ConfigError(format!(
                "track height {} too short for handle {} and margin {}",
                self.height, self.handle, self.margin
            )));
        }
        Ok(())
    }

    pub fn percent_to_y(&self, channel: Channel, percent: u8) -> f32 {
        let range = self.range(channel);
        let percent = f32::from(percent.min(100));
        ((100.0 - percent) / 100.0) * range.span() + range.min
    }

    pub fn y_to_percent(&self, channel: Channel, y: f32) -> u8 {
        let range = self.range(channel);
        let percent = (100.0 - ((y - range.min) / range.span()) * 100.0).round();
        percent.clamp(0.0, 100.0) as u8
    }

    pub fn percents(&self, layout: HandleLayout) -> PerChannel<u8> {
        PerChannel::new(
            self.y_to_percent(Channel::Top, layout.top_y),
            self.y_to_percent(Channel::Bottom, layout.bottom_y),
        )
    }

    /// Handle positions for a pair of device percentages, never overlapping.
    pub fn layout(&self, positions: PerChannel<u8>) -> HandleLayout {
        let top_y = self.range(Channel::Top).clamp(self.percent_to_y(Channel::Top, positions.top));
        let bottom_y = self
            .range(Channel::Bottom)
            .clamp(self.percent_to_y(Channel::Bottom, positions.bottom));
        self.resolve_collision(HandleLayout::new(top_y, bottom_y))
    }

    pub fn resolve_collision(&self, layout: HandleLayout) -> HandleLayout {
        let gap = self.min_gap();
        if layout.bottom_y - layout.top_y >= gap {
            return layout;
        }

        let top_range = self.range(Channel::Top);
        let bottom_range = self.range(Channel::Bottom);

        // snapped to a whole pixel first, so the gap is exact in f32
        let mid = (layout.top_y + layout.bottom_y) / 2.0;
        let mut top_y = (mid - gap / 2.0).round();
        let mut bottom_y = top_y + gap;

        // Each push moves the pair together so the gap survives it.
        if top_y < 0.0 {
            top_y = 0.0;
            bottom_y = gap;
        }
        if bottom_y > self.max_y() {
            bottom_y = self.max_y();
            top_y = bottom_y - gap;
        }
        if bottom_y < bottom_range.min {
            bottom_y = bottom_range.min;
            top_y = bottom_y - gap;
        }
        if top_y > top_range.max {
            top_y = top_range.max;
            bottom_y = top_y + gap;
        }

        HandleLayout::new(top_range.clamp(top_y), bottom_range.clamp(bottom_y))
    }

    pub fn fill(&self, layout: HandleLayout) -> FillSpan {
        let half = self.handle / 2.0;
        FillSpan {
            top_y: layout.top_y.min(layout.bottom_y) + half,
            bottom_y: layout.top_y.max(layout.bottom_y) + half,
        }
    }

    /// Resolves a pointer press at track-relative `y`.
    ///
    /// Distances are measured from the centre of each painted bar. Handles
    /// win over the fill; when both handles are in reach the nearer one is
    /// picked.
    pub fn hit_test(&self, layout: HandleLayout, y: f32) -> Option<DragTarget> {
        let half = self.handle / 2.0;
        let reach = half + self.grab_slop;
        let to_top = (y - (layout.top_y + half)).abs();
        let to_bottom = (y - (layout.bottom_y + half)).abs();

        let nearest = if to_top <= to_bottom {
            (Channel::Top, to_top)
        } else {
            (Channel::Bottom, to_bottom)
        };
        if nearest.1 <= reach {
            return Some(DragTarget::Handle(nearest.0));
        }

        if self.fill(layout).contains(y) {
            Some(DragTarget::Fill)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> TrackGeometry {
        TrackGeometry::default()
    }

    #[test]
    fn default_ranges_match_card_dimensions() {
        let g = geometry();
        assert_eq!(g.min_gap(), 14.0);
        assert_eq!(g.range(Channel::Top), TravelRange { min: 0.0, max: 278.0 });
        assert_eq!(g.range(Channel::Bottom), TravelRange { min: 14.0, max: 292.0 });
    }

    #[test]
    fn full_open_is_at_the_top_of_each_range() {
        let g = geometry();
        assert_eq!(g.percent_to_y(Channel::Top, 100), 0.0);
        assert_eq!(g.percent_to_y(Channel::Top, 0), 278.0);
        assert_eq!(g.percent_to_y(Channel::Bottom, 100), 14.0);
        assert_eq!(g.percent_to_y(Channel::Bottom, 0), 292.0);
    }

    #[test]
    fn percent_round_trip_stays_within_one() {
        let g = geometry();
        for channel in Channel::ALL {
            for percent in 0..=100u8 {
                let back = g.y_to_percent(channel, g.percent_to_y(channel, percent));
                assert!(
                    (i16::from(back) - i16::from(percent)).abs() <= 1,
                    "{channel} {percent} came back as {back}"
                );
            }
        }
    }

    #[test]
    fn y_to_percent_clamps_outside_the_range() {
        let g = geometry();
        assert_eq!(g.y_to_percent(Channel::Top, -40.0), 100);
        assert_eq!(g.y_to_percent(Channel::Bottom, 400.0), 0);
    }

    #[test]
    fn layout_keeps_minimum_gap_for_every_pair() {
        let g = geometry();
        for top in 0..=100u8 {
            for bottom in 0..=100u8 {
                let layout = g.layout(PerChannel::new(top, bottom));
                assert!(
                    layout.bottom_y - layout.top_y >= g.min_gap(),
                    "top {top} bottom {bottom} gave {layout:?}"
                );
                assert!(layout.top_y >= 0.0 && layout.top_y <= g.range(Channel::Top).max);
                assert!(layout.bottom_y >= g.range(Channel::Bottom).min);
                assert!(layout.bottom_y <= g.max_y());
            }
        }
    }

    #[test]
    fn crossed_positions_are_recentred() {
        let g = geometry();
        // top fully closed (278), bottom fully open (14): midpoint 146
        let layout = g.layout(PerChannel::new(0, 100));
        assert_eq!(layout, HandleLayout::new(139.0, 153.0));
    }

    #[test]
    fn recentring_near_the_top_pushes_both_down() {
        let g = geometry();
        let layout = g.resolve_collision(HandleLayout::new(2.0, 4.0));
        assert_eq!(layout, HandleLayout::new(0.0, 14.0));
    }

    #[test]
    fn fill_spans_between_handles_offset_by_half_thickness() {
        let g = geometry();
        let fill = g.fill(HandleLayout::new(30.0, 270.0));
        assert_eq!(fill, FillSpan { top_y: 34.0, bottom_y: 274.0 });
    }

    #[test]
    fn hit_test_prefers_handles_then_fill() {
        let g = geometry();
        let layout = HandleLayout::new(30.0, 270.0);
        assert_eq!(g.hit_test(layout, 32.0), Some(DragTarget::Handle(Channel::Top)));
        assert_eq!(g.hit_test(layout, 265.0), Some(DragTarget::Handle(Channel::Bottom)));
        assert_eq!(g.hit_test(layout, 150.0), Some(DragTarget::Fill));
        assert_eq!(g.hit_test(layout, 5.0), None);
    }

    #[test]
    fn hit_test_picks_nearer_handle_when_both_in_reach() {
        let g = geometry();
        // bars painted over 100..108 and 114..122
        let layout = HandleLayout::new(100.0, 114.0);
        assert_eq!(g.hit_test(layout, 103.0), Some(DragTarget::Handle(Channel::Top)));
        assert_eq!(g.hit_test(layout, 107.5), Some(DragTarget::Handle(Channel::Top)));
        assert_eq!(g.hit_test(layout, 115.0), Some(DragTarget::Handle(Channel::Bottom)));
        assert_eq!(g.hit_test(layout, 121.0), Some(DragTarget::Handle(Channel::Bottom)));
    }

    #[test]
    fn press_on_a_painted_bar_grabs_that_bar() {
        let g = geometry();
        let layout = g.layout(PerChannel::new(50, 45));
        for channel in Channel::ALL {
            let y = layout.y(channel);
            for offset in [0.0, 2.0, 4.0, 6.0, 7.9] {
                assert_eq!(
                    g.hit_test(layout, y + offset),
                    Some(DragTarget::Handle(channel)),
                    "{channel} bar at {y} pressed at +{offset}"
                );
            }
        }
    }

    #[test]
    fn recentred_pairs_keep_the_exact_gap() {
        let g = geometry();
        for (top, bottom) in [(50, 51), (49, 50), (0, 100), (10, 90), (0, 1), (99, 100), (33, 34)] {
            let layout = g.layout(PerChannel::new(top, bottom));
            assert_eq!(layout.bottom_y - layout.top_y, 14.0, "top {top} bottom {bottom}");
        }
    }

    #[test]
    fn validate_rejects_short_tracks() {
        let short = TrackGeometry {
            height: 20.0,
            ..TrackGeometry::default()
        };
        assert!(short.validate().is_err());
        assert!(geometry().validate().is_ok());
    }
}
