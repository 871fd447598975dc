use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// Unit and playlist errors are local: callers log them and carry on with an
/// unchanged or stopped unit. Project and config errors are surfaced once to
/// the user by the front end.

#[derive(Error, Debug)]
pub enum UnitError {
    #[error("Invalid sound effect JSON: {0}")]
    InvalidUnitJson(String),

    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Playback device did not start: {location}")]
    PlaybackUnavailable { location: String },

    #[error("No sound with id {0}")]
    UnknownUnit(u64),
}

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Couldn't open project file: {path}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project document")]
    Parse(#[source] serde_json::Error),

    #[error("Document is not a project (expected a JSON object)")]
    NotAProject,

    #[error("Cancelled by user")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No platform config directory available")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to load audio file: {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode audio format")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Unsupported source location: {0}")]
    UnsupportedLocation(String),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
