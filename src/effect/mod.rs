/// Sound effect units
///
/// A unit couples one `MediaPort` with one `Playlist` and drives them through
/// the playback state machine:
///
/// ```text
///            play()                 device finished, loop on
///   Idle ──────────────> Playing ──────────────────────────> WaitingToLoop
///    ▲                   │  ▲  │                                  │
///    │ device finished,  │  │  └──────── re-trigger timer ────────┘
///    │ loop off          │  │
///    ├───────────────────┘  └── play() (restart)
///    │
///    │ volume reaches 0             stop() with device volume > 0
///   FadingOut <──────────────────── Playing / WaitingToLoop
/// ```
///
/// `stop()` with the device already silent goes straight to `Idle`.
pub mod fade;
pub mod record;
pub mod state;
pub mod unit;

pub use fade::FadeOut;
pub use record::UnitRecord;
pub use state::EffectState;
pub use unit::SoundEffect;
