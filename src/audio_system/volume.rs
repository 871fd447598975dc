/// Volume level
///
/// Integer percent in `0..=100`. Every constructor clamps.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Volume(u8);

impl Volume {
    pub const MAX: u8 = 100;
    pub const DEFAULT: u8 = 50;

    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX))
    }

    /// Clamp an arbitrary integer (e.g. from a JSON document)
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(0, i64::from(Self::MAX)) as u8)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    /// Linear gain for the output sink (0.0-1.0)
    pub fn as_gain(&self) -> f32 {
        f32::from(self.0) / f32::from(Self::MAX)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<u8> for Volume {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}
