/// Messaging module for Event/Command architecture
///
/// - **Events**: notifications of things that happened on the board
///   (past tense, broadcast over the `EventBus`)
/// - **Commands**: requests to perform actions (imperative, applied to one
///   board by the `CommandExecutor`)
///
/// ## Architecture
///
/// ```text
/// ┌─────────┐     Command      ┌──────────┐   mutates   ┌────────────┐
/// │ Console │ ───────────────> │ Executor │ ──────────> │ Soundboard │
/// └─────────┘                  └──────────┘             └────────────┘
///      ▲                            │ errors                  │ state changes
///      │                            ▼                         ▼
///      │                      ┌─────────────────────────────────────┐
///      └────── Events ─────── │              Event Bus              │
///                             └─────────────────────────────────────┘
/// ```
pub mod bus;
pub mod commands;
pub mod events;
pub mod executor;

pub use bus::{EventBus, SubscriberId};
pub use commands::{Command, CommandParseError, CommandResult, HELP};
pub use events::Event;
pub use executor::CommandExecutor;
