/// Command executor
///
/// Applies commands to a soundboard and reports failures on the event bus.
use std::fmt::Write as _;

use tracing::{debug, info, warn};

use super::bus::EventBus;
use super::commands::{Command, CommandResult, HELP};
use super::events::Event;
use crate::audio_system::SourceLocation;
use crate::board::{dnd, DragSession, DropOutcome, Soundboard, UnitHost, UnitId};
use crate::dialog::{Confirm, PrefilledDialog, SoundSpec};
use crate::error::{ProjectError, UnitError};

pub struct CommandExecutor {
    event_bus: EventBus,
}

impl CommandExecutor {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Execute a command against `board`
    pub fn execute(
        &self,
        board: &mut Soundboard,
        command: Command,
        confirm: &mut dyn Confirm,
    ) -> CommandResult {
        info!("Executing command: {}", command.description());
        let context = command.description();

        match self.run(board, command, confirm) {
            Ok(result) => result,
            Err(message) => {
                warn!("{}: {}", context, message);
                self.event_bus.publish(Event::ErrorOccurred {
                    message: message.clone(),
                    context,
                });
                CommandResult::Error(message)
            }
        }
    }

    fn run(
        &self,
        board: &mut Soundboard,
        command: Command,
        confirm: &mut dyn Confirm,
    ) -> Result<CommandResult, String> {
        let result = match command {
            Command::List => CommandResult::SuccessWithValue(list(board)),
            Command::Help => CommandResult::SuccessWithValue(HELP.to_string()),
            Command::Play(position) => {
                let id = unit_at(board, position)?;
                quiet_if_empty(board.play(id))?;
                CommandResult::Success
            }
            Command::Stop(position) => {
                let id = unit_at(board, position)?;
                board.stop(id).map_err(|e| e.to_string())?;
                CommandResult::Success
            }
            Command::Toggle(position) => {
                let id = unit_at(board, position)?;
                quiet_if_empty(board.toggle(id))?;
                CommandResult::Success
            }
            Command::StopAll => {
                board.stop_all();
                CommandResult::Success
            }
            Command::Volume { position, volume } => {
                let id = unit_at(board, position)?;
                board.set_volume(id, volume).map_err(|e| e.to_string())?;
                CommandResult::Success
            }
            Command::Loop { position, enabled } => {
                let id = unit_at(board, position)?;
                board.set_loop_enabled(id, enabled).map_err(|e| e.to_string())?;
                CommandResult::Success
            }
            Command::Add {
                name,
                interval_secs,
                sources,
            } => {
                let spec = sound_spec(name, interval_secs, sources)?;
                match board.add_sound(&mut PrefilledDialog(Some(spec))) {
                    Some(_) => CommandResult::Success,
                    None => CommandResult::SuccessWithValue("Nothing added".to_string()),
                }
            }
            Command::Edit {
                position,
                name,
                interval_secs,
                sources,
            } => {
                let id = unit_at(board, position)?;
                let spec = sound_spec(name, interval_secs, sources)?;
                board
                    .edit(id, &mut PrefilledDialog(Some(spec)))
                    .map_err(|e| e.to_string())?;
                CommandResult::Success
            }
            Command::Delete(position) => {
                let id = unit_at(board, position)?;
                if board.delete(id, confirm).map_err(|e| e.to_string())? {
                    CommandResult::Success
                } else {
                    CommandResult::SuccessWithValue("Kept".to_string())
                }
            }
            Command::DropFiles { position, sources } => {
                let id = unit_at(board, position)?;
                let locations = sources.iter().map(|s| SourceLocation::parse(s)).collect();
                match dnd::drop_on_unit(board, id, DragSession::locations(locations)) {
                    DropOutcome::Appended(count) => {
                        CommandResult::SuccessWithValue(format!("Added {} source(s)", count))
                    }
                    _ => CommandResult::Success,
                }
            }
            Command::Move { from, to } => match dnd::move_unit(board, from, to) {
                DropOutcome::Ignored => return Err("Nothing to move there".to_string()),
                _ => CommandResult::Success,
            },
            Command::Save(path) => {
                board.save(&path).map_err(|e| describe(&e))?;
                CommandResult::Success
            }
            Command::Open(path) => match board.open(&path, confirm) {
                Ok(count) => CommandResult::SuccessWithValue(format!("Loaded {} sound(s)", count)),
                Err(ProjectError::Cancelled) => {
                    CommandResult::SuccessWithValue("Kept current project".to_string())
                }
                Err(err) => return Err(describe(&err)),
            },
            Command::New => {
                if board.new_project(confirm) {
                    CommandResult::Success
                } else {
                    CommandResult::SuccessWithValue("Kept current project".to_string())
                }
            }
            Command::Quit => {
                board.clear();
                self.event_bus.publish(Event::Shutdown);
                CommandResult::Success
            }
        };
        Ok(result)
    }
}

fn unit_at(board: &Soundboard, position: usize) -> Result<UnitId, String> {
    board
        .id_at(position)
        .ok_or_else(|| format!("There is no sound {}", position + 1))
}

/// A sound without sources plays nothing and says nothing
fn quiet_if_empty(result: Result<(), UnitError>) -> Result<(), String> {
    match result {
        Err(UnitError::EmptyPlaylist) => {
            debug!("Nothing to play: playlist is empty");
            Ok(())
        }
        other => other.map_err(|e| e.to_string()),
    }
}

fn sound_spec(name: String, interval_secs: f64, sources: Vec<String>) -> Result<SoundSpec, String> {
    let spec = SoundSpec::from_seconds(name, interval_secs)
        .ok_or_else(|| "A sound needs a name".to_string())?;
    Ok(spec.with_sources(sources.iter().map(|s| SourceLocation::parse(s))))
}

/// Error text with its cause chain
fn describe(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {}", cause);
        source = cause.source();
    }
    text
}

fn list(board: &Soundboard) -> String {
    if board.is_empty() {
        return "No sounds. Use 'add' to create one.".to_string();
    }

    let mut out = String::new();
    for (position, (_, unit)) in board.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} {:<20} vol {:>3}  loop {} ({:.1}s)  {} source(s)  [{}]",
            position + 1,
            unit.state().toggle_glyph(),
            unit.name(),
            unit.volume(),
            if unit.loop_enabled() { "on " } else { "off" },
            unit.loop_interval_ms() as f64 / 1000.0,
            unit.sources().len(),
            unit.state().description(),
        );
    }
    out.trim_end().to_string()
}
