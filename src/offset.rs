//! Compass heading offset for absolute-heading platforms

use crate::math::wrap_pi;
use crate::types::OffsetMode;

/// Yaw offset between the sensor's alpha and compass north
///
/// The offset is `compass_north - sensor_alpha` in radians, where
/// `compass_north` is the counter-clockwise angle from north derived from a
/// compass heading. In [`OffsetMode::PerSample`] it follows every event that
/// carries a heading; in [`OffsetMode::Latched`] it is captured once and held
/// until [`HeadingOffset::reset`].
///
/// # Example
/// ```
/// use ar_compass::{HeadingOffset, OffsetMode};
///
/// let mut offset = HeadingOffset::new(OffsetMode::Latched);
/// let latched = offset.update(0.5, Some(1.5));
/// assert!((latched - 1.0).abs() < 1e-5);
///
/// // Held until reset
/// assert_eq!(offset.update(0.5, Some(2.5)), latched);
/// offset.reset();
/// assert!(offset.offset().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingOffset {
    /// Maintenance mode
    mode: OffsetMode,
    /// Current offset, absent until the first compass reading
    offset: Option<f32>,
}

impl HeadingOffset {
    pub fn new(mode: OffsetMode) -> Self {
        Self { mode, offset: None }
    }

    /// Fold a new event into the offset and return the offset to apply
    ///
    /// # Arguments
    /// * `sensor_alpha` - Raw alpha of the event in radians
    /// * `compass_north` - Counter-clockwise angle from north in radians, if
    ///   the event carries a compass reading
    ///
    /// # Returns
    /// The offset in radians, wrapped to (-π, π]. Zero until a compass
    /// reading has been seen.
    pub fn update(&mut self, sensor_alpha: f32, compass_north: Option<f32>) -> f32 {
        if let Some(north) = compass_north {
            let fresh = wrap_pi(north - sensor_alpha);
            match (self.mode, self.offset) {
                (OffsetMode::PerSample, _) => self.offset = Some(fresh),
                (OffsetMode::Latched, None) => {
                    tracing::debug!(offset = fresh, "Heading offset latched");
                    self.offset = Some(fresh);
                }
                (OffsetMode::Latched, Some(_)) => {}
            }
        }

        self.offset.unwrap_or(0.0)
    }

    /// Current offset estimate
    pub fn offset(&self) -> Option<f32> {
        self.offset
    }

    pub fn mode(&self) -> OffsetMode {
        self.mode
    }

    /// Whether a latched offset is being held
    pub fn is_latched(&self) -> bool {
        self.mode == OffsetMode::Latched && self.offset.is_some()
    }

    /// Forget the offset so the next compass reading recomputes it
    pub fn reset(&mut self) {
        if self.offset.take().is_some() {
            tracing::debug!(mode = ?self.mode, "Heading offset reset");
        }
    }
}

impl Default for HeadingOffset {
    fn default() -> Self {
        Self::new(OffsetMode::default())
    }
}
