/// Timing primitives for the single-threaded event loop
///
/// Units never spawn threads or OS timers. They own `SingleShotTimer`s that
/// are plain deadlines, and the host loop polls them against a `Clock`.
pub mod clock;
pub mod timer;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use timer::SingleShotTimer;
