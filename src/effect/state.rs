/// Sound effect playback state
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectState {
    /// Nothing playing, no timer armed
    #[default]
    Idle,

    /// The device is playing a source
    Playing,

    /// Playback finished with loop enabled; re-trigger timer armed
    WaitingToLoop,

    /// Explicitly stopped; device volume ramping down to zero
    FadingOut,
}

impl EffectState {
    /// Whether the unit counts as running (playing or about to re-trigger)
    ///
    /// A fading unit is not running: the user already asked it to stop.
    pub fn is_running(&self) -> bool {
        matches!(self, EffectState::Playing | EffectState::WaitingToLoop)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EffectState::Idle)
    }

    pub fn description(&self) -> &'static str {
        match self {
            EffectState::Idle => "Idle",
            EffectState::Playing => "Playing",
            EffectState::WaitingToLoop => "Waiting to loop",
            EffectState::FadingOut => "Fading out",
        }
    }

    /// Glyph for the play/stop toggle
    pub fn toggle_glyph(&self) -> &'static str {
        if self.is_running() {
            "■"
        } else {
            "▶"
        }
    }
}

impl fmt::Display for EffectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!EffectState::Idle.is_running());
        assert!(EffectState::Playing.is_running());
        assert!(EffectState::WaitingToLoop.is_running());
        assert!(!EffectState::FadingOut.is_running());
        assert!(EffectState::default().is_idle());
    }

    #[test]
    fn test_toggle_glyph() {
        assert_eq!(EffectState::Playing.toggle_glyph(), "■");
        assert_eq!(EffectState::FadingOut.toggle_glyph(), "▶");
    }
}
