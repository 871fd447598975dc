/// Event types for the soundboard
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.
use std::path::PathBuf;

use crate::board::UnitId;
use crate::effect::EffectState;

/// Soundboard events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A unit was created (dialog, drop or project load)
    UnitAdded { id: UnitId, name: String },

    /// A unit was deleted or moved away from its old position
    UnitRemoved { id: UnitId, name: String },

    /// A unit's playback state changed
    UnitStateChanged {
        id: UnitId,
        name: String,
        from: EffectState,
        to: EffectState,
    },

    /// A project document replaced the board
    ProjectLoaded { path: PathBuf, units: usize },

    /// The board was written to disk
    ProjectSaved { path: PathBuf, units: usize },

    /// The board was emptied by "new project"
    ProjectCleared,

    /// An error occurred
    ErrorOccurred { message: String, context: String },

    /// Application is shutting down
    Shutdown,
}

impl Event {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Event::UnitAdded { name, .. } => format!("Added '{}'", name),
            Event::UnitRemoved { name, .. } => format!("Removed '{}'", name),
            Event::UnitStateChanged { name, to, .. } => {
                format!("'{}' is now {}", name, to.description())
            }
            Event::ProjectLoaded { path, units } => {
                format!("Loaded {} sound(s) from {}", units, path.display())
            }
            Event::ProjectSaved { path, units } => {
                format!("Saved {} sound(s) to {}", units, path.display())
            }
            Event::ProjectCleared => "New project".to_string(),
            Event::ErrorOccurred { message, context } => {
                format!("Error ({}): {}", context, message)
            }
            Event::Shutdown => "Shutting down".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_description() {
        let event = Event::ProjectCleared;
        assert_eq!(event.description(), "New project");

        let event = Event::ProjectSaved {
            path: PathBuf::from("/tmp/ambience.json"),
            units: 3,
        };
        assert_eq!(
            event.description(),
            "Saved 3 sound(s) to /tmp/ambience.json"
        );

        let event = Event::ErrorOccurred {
            message: "Playlist is empty".to_string(),
            context: "play".to_string(),
        };
        assert_eq!(event.description(), "Error (play): Playlist is empty");
    }
}
