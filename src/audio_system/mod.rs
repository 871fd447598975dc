/// Audio system module
///
/// Everything a sound effect needs from the outside world to make noise:
/// - `MediaPort`: play/stop/volume against one output, with state notifications
/// - `Playlist`: the sources of one sound effect and their shuffled play order
/// - `SourceLocation` / `Volume`: canonical value types shared by both
///
/// ## Architecture
///
/// ```text
/// AudioOutput (rodio OutputStream)
///   └── RodioPortFactory ──creates──> RodioPort (one per sound effect)
///                                       └── Sink (rebuilt on every play)
///
/// MemoryPortFactory ──creates──> MemoryPort (headless, inspectable)
/// ```
///
/// Ports never call back into their owner. They push `PlaybackState` changes
/// into the channels registered with `subscribe`, and the owner drains them
/// from its poll path.
pub mod memory;
pub mod output;
pub mod player;
pub mod playlist;
pub mod port;
pub mod source;
pub mod volume;

// Re-export commonly used types
pub use memory::{MemoryPort, MemoryPortFactory, MemoryPortHandle, PortCall};
pub use output::{AudioOutput, RodioPortFactory};
pub use player::RodioPort;
pub use playlist::Playlist;
pub use port::{Listeners, MediaPort, PlaybackState, PortFactory};
pub use source::SourceLocation;
pub use volume::Volume;
