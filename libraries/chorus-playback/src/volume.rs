//! Volume control
//!
//! Commands speak percent (0-100); the voice transport takes a linear gain.

use crate::error::{PlaybackError, Result};

/// Validated volume level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    gain: f32,
}

impl Volume {
    /// Parse a user-supplied percentage
    ///
    /// # Errors
    /// `InvalidArgument` when outside 0-100
    pub fn from_percent(percent: i64) -> Result<Self> {
        if !(0..=100).contains(&percent) {
            return Err(PlaybackError::InvalidArgument(format!(
                "volume must be between 0 and 100, got {}",
                percent
            )));
        }
        Ok(Self {
            gain: percent as f32 / 100.0,
        })
    }

    /// Wrap a linear gain, clamped to 0.0 - 1.0
    pub fn from_gain(gain: f32) -> Self {
        Self {
            gain: if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    /// Linear gain multiplier
    pub fn gain(self) -> f32 {
        self.gain
    }

    /// Volume in percent
    pub fn percent(self) -> u8 {
        (self.gain * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_maps_to_linear_gain() {
        let volume = Volume::from_percent(75).unwrap();
        assert_eq!(volume.gain(), 0.75);
        assert_eq!(volume.percent(), 75);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Volume::from_percent(0).unwrap().gain(), 0.0);
        assert_eq!(Volume::from_percent(100).unwrap().gain(), 1.0);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(matches!(
            Volume::from_percent(101),
            Err(PlaybackError::InvalidArgument(_))
        ));
        assert!(matches!(
            Volume::from_percent(-1),
            Err(PlaybackError::InvalidArgument(_))
        ));
    }

    #[test]
    fn gain_is_clamped() {
        assert_eq!(Volume::from_gain(1.7).gain(), 1.0);
        assert_eq!(Volume::from_gain(f32::NAN).gain(), 0.0);
        assert_eq!(Volume::from_gain(0.5).percent(), 50);
    }
}
