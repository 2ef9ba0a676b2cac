//! Platform-specific normalisation of raw rotation events
//!
//! Platforms disagree on where north is and on the range of `alpha`. The
//! strategy is chosen once per session from [`PlatformKind`]; after that every
//! raw event goes through the same [`SampleNormalizer::normalize`] call.
//!
//! # Example
//! ```
//! use ar_compass::{Normalizer, OffsetMode, PlatformKind, RawOrientationEvent, SampleNormalizer};
//!
//! let mut normalizer = Normalizer::for_platform(PlatformKind::RelativeHeading, OffsetMode::PerSample);
//! let sample = normalizer.normalize(&RawOrientationEvent::euler(-10.0, 0.0, 0.0));
//!
//! // -10° wraps to 350°
//! assert!((sample.alpha.to_degrees() - 350.0).abs() < 1e-3);
//! assert!(sample.absolute_heading.is_none());
//! ```

use crate::math::{DEG_TO_RAD, wrap_two_pi};
use crate::offset::HeadingOffset;
use crate::types::{OffsetMode, OrientationSample, PlatformKind, RawOrientationEvent};

/// Converts raw platform events into canonical samples
pub trait SampleNormalizer {
    /// Normalise one raw event
    fn normalize(&mut self, event: &RawOrientationEvent) -> OrientationSample;

    /// Drop any per-session state such as a latched compass offset
    fn reset(&mut self);
}

/// Platforms that deliver a compass heading with the rotation event
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteHeadingPlatform {
    offset: HeadingOffset,
}

impl AbsoluteHeadingPlatform {
    pub fn new(mode: OffsetMode) -> Self {
        Self {
            offset: HeadingOffset::new(mode),
        }
    }

    pub fn heading_offset(&self) -> &HeadingOffset {
        &self.offset
    }
}

impl SampleNormalizer for AbsoluteHeadingPlatform {
    fn normalize(&mut self, event: &RawOrientationEvent) -> OrientationSample {
        let raw_alpha = field_or_zero(event.alpha, "alpha") * DEG_TO_RAD;
        let beta = field_or_zero(event.beta, "beta") * DEG_TO_RAD;
        let gamma = field_or_zero(event.gamma, "gamma") * DEG_TO_RAD;

        let heading = event.compass_heading.filter(|heading| heading.is_finite());
        // Compass headings run clockwise, alpha runs counter-clockwise
        let compass_north = heading.map(|heading| (360.0 - heading) * DEG_TO_RAD);
        let offset = self.offset.update(raw_alpha, compass_north);

        OrientationSample {
            alpha: wrap_two_pi(raw_alpha + offset),
            beta,
            gamma,
            absolute_heading: heading.map(|heading| wrap_two_pi(heading * DEG_TO_RAD)),
        }
    }

    fn reset(&mut self) {
        self.offset.reset();
    }
}

/// Platforms whose alpha is north-referenced but may wrap below zero
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeHeadingPlatform;

impl SampleNormalizer for RelativeHeadingPlatform {
    fn normalize(&mut self, event: &RawOrientationEvent) -> OrientationSample {
        let alpha = field_or_zero(event.alpha, "alpha").rem_euclid(360.0);

        OrientationSample {
            alpha: wrap_two_pi(alpha * DEG_TO_RAD),
            beta: field_or_zero(event.beta, "beta") * DEG_TO_RAD,
            gamma: field_or_zero(event.gamma, "gamma") * DEG_TO_RAD,
            absolute_heading: None,
        }
    }

    fn reset(&mut self) {}
}

/// Normaliser strategy selected once per session
#[derive(Debug, Clone, Copy)]
pub enum Normalizer {
    Absolute(AbsoluteHeadingPlatform),
    Relative(RelativeHeadingPlatform),
}

impl Normalizer {
    pub fn for_platform(platform: PlatformKind, offset_mode: OffsetMode) -> Self {
        match platform {
            PlatformKind::AbsoluteHeading => Self::Absolute(AbsoluteHeadingPlatform::new(offset_mode)),
            PlatformKind::RelativeHeading => Self::Relative(RelativeHeadingPlatform),
        }
    }

    pub fn platform(&self) -> PlatformKind {
        match self {
            Self::Absolute(_) => PlatformKind::AbsoluteHeading,
            Self::Relative(_) => PlatformKind::RelativeHeading,
        }
    }

    /// Compass offset state, present only on absolute-heading platforms
    pub fn heading_offset(&self) -> Option<&HeadingOffset> {
        match self {
            Self::Absolute(platform) => Some(platform.heading_offset()),
            Self::Relative(_) => None,
        }
    }
}

impl SampleNormalizer for Normalizer {
    fn normalize(&mut self, event: &RawOrientationEvent) -> OrientationSample {
        match self {
            Self::Absolute(platform) => platform.normalize(event),
            Self::Relative(platform) => platform.normalize(event),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Absolute(platform) => platform.reset(),
            Self::Relative(platform) => platform.reset(),
        }
    }
}

/// Missing or non-finite components read as zero, which is a valid angle
fn field_or_zero(value: Option<f32>, field: &'static str) -> f32 {
    match value {
        Some(value) if value.is_finite() => value,
        _ => {
            tracing::trace!(field, "Missing sensor field, substituting 0");
            0.0
        }
    }
}
