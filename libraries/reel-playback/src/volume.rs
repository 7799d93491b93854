//! Volume level with perceptual gain mapping
//!
//! The manager stores a linear level in [0.0, 1.0]. Engines convert it to an output
//! gain with [`perceptual_gain`], mapping 0-100% to -60 dB..0 dB.

/// Volume level clamped to [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: f32,
}

impl Volume {
    /// Create new volume, clamping `level` into range
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
        }
    }

    /// Set level, clamping into range
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }

    /// Current level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Output gain multiplier for the current level
    pub fn gain(&self) -> f32 {
        perceptual_gain(self.level)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Clamp a requested level to [0.0, 1.0]; NaN maps to silence
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Convert a volume level to linear gain
///
/// Formula: gain = 10^((level% - 100) * 0.6 / 20)
/// - 0.0  → 0.0 (silence)
/// - 0.5  → -30 dB → 0.0316 gain
/// - 0.8  → -12 dB → 0.251 gain
/// - 1.0  →   0 dB → 1.0 gain (unity)
pub fn perceptual_gain(level: f32) -> f32 {
    let level = clamp_level(level);
    if level == 0.0 {
        return 0.0;
    }

    let db = (level * 100.0 - 100.0) * 0.6;
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
    }

    #[test]
    fn set_level_clamps() {
        let mut vol = Volume::new(0.5);

        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);

        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn gain_calculation() {
        assert_eq!(perceptual_gain(0.0), 0.0);
        assert!((perceptual_gain(1.0) - 1.0).abs() < 0.001);
        assert!((perceptual_gain(0.5) - 0.0316).abs() < 0.001);
        assert!((perceptual_gain(0.8) - 0.251).abs() < 0.01);
    }

    #[test]
    fn gain_is_monotonic() {
        let mut previous = perceptual_gain(0.0);
        for step in 1..=100 {
            let gain = perceptual_gain(step as f32 / 100.0);
            assert!(gain > previous);
            previous = gain;
        }
    }

    #[test]
    fn volume_gain_matches_level() {
        let vol = Volume::new(1.0);
        assert!((vol.gain() - 1.0).abs() < 0.001);
    }
}
