//! Soundscape: an ambient soundboard
//!
//! A board holds an ordered list of sound effects. Each effect shuffles its
//! playlist on every play, can re-trigger itself after a loop interval, and
//! fades out when stopped. Boards persist to JSON project files, and the same
//! per-sound JSON object is the drag-and-drop payload used to reorder them.

pub mod audio_system;
pub mod board;
pub mod config;
pub mod dialog;
pub mod effect;
pub mod error;
pub mod messaging;
pub mod project;
pub mod timing;
