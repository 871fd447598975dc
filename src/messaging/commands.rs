/// Command types for the application
///
/// Commands represent requests to perform actions (imperative).
/// The console front end parses them from text lines; positions are typed
/// 1-based and stored 0-based.
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::audio_system::Volume;

/// Application commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Play(usize),
    Stop(usize),
    Toggle(usize),
    StopAll,
    Volume { position: usize, volume: u8 },
    Loop { position: usize, enabled: bool },
    Add {
        name: String,
        interval_secs: f64,
        sources: Vec<String>,
    },
    Edit {
        position: usize,
        name: String,
        interval_secs: f64,
        sources: Vec<String>,
    },
    Delete(usize),
    /// Drop file locations onto a unit
    DropFiles { position: usize, sources: Vec<String> },
    /// Drag the unit at `from` onto the unit at `to` (`to == count` is the end)
    Move { from: usize, to: usize },
    Save(PathBuf),
    Open(PathBuf),
    New,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("Positions start at 1")]
    ZeroPosition,

    #[error("Expected 'on' or 'off', got '{0}'")]
    InvalidSwitch(String),

    #[error("Unterminated quote")]
    UnterminatedQuote,
}

/// Result of command execution
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Command executed successfully
    Success,

    /// Command executed with a specific result
    SuccessWithValue(String),

    /// Command failed with an error
    Error(String),
}

pub const HELP: &str = "\
list                      show all sounds
play N | stop N | toggle N
stopall                   fade out every sound
volume N V                set volume (0-100)
loop N on|off
add NAME SECS SRC...      add a sound (loop interval in seconds)
edit N NAME SECS SRC...   replace name, interval and sources
delete N
drop N SRC...             add sources to sound N
move FROM TO              drag sound FROM onto sound TO (TO = count+1 for the end)
save PATH | open PATH | new
quit";

/// Split a line on whitespace, keeping "double quoted" runs together
fn split_args(line: &str) -> Result<Vec<String>, CommandParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }

    if in_quotes {
        return Err(CommandParseError::UnterminatedQuote);
    }
    if pending {
        args.push(current);
    }
    Ok(args)
}

struct Args {
    command: &'static str,
    items: std::vec::IntoIter<String>,
}

impl Args {
    fn next(&mut self, argument: &'static str) -> Result<String, CommandParseError> {
        self.items.next().ok_or(CommandParseError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn position(&mut self) -> Result<usize, CommandParseError> {
        let raw = self.next("a position")?;
        let typed: usize = raw
            .parse()
            .map_err(|_| CommandParseError::InvalidNumber(raw.clone()))?;
        typed.checked_sub(1).ok_or(CommandParseError::ZeroPosition)
    }

    fn number<T: FromStr>(&mut self, argument: &'static str) -> Result<T, CommandParseError> {
        let raw = self.next(argument)?;
        raw.parse().map_err(|_| CommandParseError::InvalidNumber(raw))
    }

    fn switch(&mut self) -> Result<bool, CommandParseError> {
        match self.next("on or off")?.as_str() {
            "on" | "true" | "1" => Ok(true),
            "off" | "false" | "0" => Ok(false),
            other => Err(CommandParseError::InvalidSwitch(other.to_string())),
        }
    }

    fn rest(self) -> Vec<String> {
        self.items.collect()
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut items = split_args(line)?.into_iter();
        let verb = items.next().ok_or(CommandParseError::Empty)?;
        let verb = verb.to_lowercase();

        let command: &'static str = match verb.as_str() {
            "list" | "ls" => "list",
            "play" => "play",
            "stop" => "stop",
            "toggle" => "toggle",
            "stopall" => "stopall",
            "volume" | "vol" => "volume",
            "loop" => "loop",
            "add" => "add",
            "edit" => "edit",
            "delete" | "rm" => "delete",
            "drop" => "drop",
            "move" | "mv" => "move",
            "save" => "save",
            "open" => "open",
            "new" => "new",
            "help" | "?" => "help",
            "quit" | "exit" => "quit",
            _ => return Err(CommandParseError::Unknown(verb)),
        };
        let mut args = Args { command, items };

        let parsed = match command {
            "list" => Command::List,
            "play" => Command::Play(args.position()?),
            "stop" => Command::Stop(args.position()?),
            "toggle" => Command::Toggle(args.position()?),
            "stopall" => Command::StopAll,
            "volume" => Command::Volume {
                position: args.position()?,
                volume: Volume::clamped(args.number("a volume")?).level(),
            },
            "loop" => Command::Loop {
                position: args.position()?,
                enabled: args.switch()?,
            },
            "add" => Command::Add {
                name: args.next("a name")?,
                interval_secs: args.number("an interval in seconds")?,
                sources: args.rest(),
            },
            "edit" => Command::Edit {
                position: args.position()?,
                name: args.next("a name")?,
                interval_secs: args.number("an interval in seconds")?,
                sources: args.rest(),
            },
            "delete" => Command::Delete(args.position()?),
            "drop" => Command::DropFiles {
                position: args.position()?,
                sources: args.rest(),
            },
            "move" => Command::Move {
                from: args.position()?,
                to: args.position()?,
            },
            "save" => Command::Save(PathBuf::from(args.next("a file path")?)),
            "open" => Command::Open(PathBuf::from(args.next("a file path")?)),
            "new" => Command::New,
            "help" => Command::Help,
            _ => Command::Quit,
        };
        Ok(parsed)
    }
}

impl Command {
    /// Get a human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            Command::List => "List sounds".to_string(),
            Command::Play(p) => format!("Play sound {}", p + 1),
            Command::Stop(p) => format!("Stop sound {}", p + 1),
            Command::Toggle(p) => format!("Toggle sound {}", p + 1),
            Command::StopAll => "Stop all sounds".to_string(),
            Command::Volume { position, volume } => {
                format!("Set volume of sound {} to {}", position + 1, volume)
            }
            Command::Loop { position, enabled } => format!(
                "Turn loop {} for sound {}",
                if *enabled { "on" } else { "off" },
                position + 1
            ),
            Command::Add { name, .. } => format!("Add sound: {}", name),
            Command::Edit { position, name, .. } => {
                format!("Edit sound {}: {}", position + 1, name)
            }
            Command::Delete(p) => format!("Delete sound {}", p + 1),
            Command::DropFiles { position, sources } => {
                format!("Drop {} file(s) on sound {}", sources.len(), position + 1)
            }
            Command::Move { from, to } => format!("Move sound {} to {}", from + 1, to + 1),
            Command::Save(path) => format!("Save project: {}", path.display()),
            Command::Open(path) => format!("Open project: {}", path.display()),
            Command::New => "New project".to_string(),
            Command::Help => "Show help".to_string(),
            Command::Quit => "Quit application".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions_are_one_based() {
        assert_eq!("play 1".parse::<Command>().unwrap(), Command::Play(0));
        assert_eq!("TOGGLE 3".parse::<Command>().unwrap(), Command::Toggle(2));
        assert_eq!(
            "play 0".parse::<Command>(),
            Err(CommandParseError::ZeroPosition)
        );
    }

    #[test]
    fn test_parse_add_with_quoted_name() {
        let command: Command = r#"add "Heavy rain" 2.5 /sfx/rain1.wav "/sfx/rain 2.wav""#
            .parse()
            .unwrap();
        assert_eq!(
            command,
            Command::Add {
                name: "Heavy rain".to_string(),
                interval_secs: 2.5,
                sources: vec!["/sfx/rain1.wav".to_string(), "/sfx/rain 2.wav".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_loop_and_volume() {
        assert_eq!(
            "loop 2 on".parse::<Command>().unwrap(),
            Command::Loop {
                position: 1,
                enabled: true
            }
        );
        assert_eq!(
            "volume 1 70".parse::<Command>().unwrap(),
            Command::Volume {
                position: 0,
                volume: 70
            }
        );
        assert!(matches!(
            "loop 2 maybe".parse::<Command>(),
            Err(CommandParseError::InvalidSwitch(_))
        ));
        assert_eq!(
            "volume 1 300".parse::<Command>().unwrap(),
            Command::Volume {
                position: 0,
                volume: 100
            }
        );
        assert_eq!(
            "volume 1 -4".parse::<Command>().unwrap(),
            Command::Volume {
                position: 0,
                volume: 0
            }
        );
        assert!(matches!(
            "volume 1 loud".parse::<Command>(),
            Err(CommandParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandParseError::Empty));
        assert_eq!("   ".parse::<Command>(), Err(CommandParseError::Empty));
        assert!(matches!(
            "dance".parse::<Command>(),
            Err(CommandParseError::Unknown(_))
        ));
        assert_eq!(
            "move 1".parse::<Command>(),
            Err(CommandParseError::MissingArgument {
                command: "move",
                argument: "a position"
            })
        );
        assert_eq!(
            r#"add "Rain"#.parse::<Command>(),
            Err(CommandParseError::UnterminatedQuote)
        );
    }

    #[test]
    fn test_empty_quoted_name_is_kept() {
        let command: Command = r#"add "" 0"#.parse().unwrap();
        assert!(matches!(command, Command::Add { ref name, .. } if name.is_empty()));
    }

    #[test]
    fn test_command_description() {
        assert_eq!(Command::StopAll.description(), "Stop all sounds");
        assert_eq!(
            Command::Move { from: 0, to: 2 }.description(),
            "Move sound 1 to 3"
        );
    }
}
