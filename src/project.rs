/// Project documents
///
/// A project is a JSON object whose `sounds` array holds one unit object per
/// sound, in display order. A missing (or non-array) `sounds` is an empty
/// project. Unit entries that fail to decode are skipped.
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::board::Soundboard;
use crate::dialog::Confirm;
use crate::effect::UnitRecord;
use crate::error::ProjectError;
use crate::messaging::Event;

pub const SOUNDS_KEY: &str = "sounds";

/// Encode records into a project document
pub fn to_document(records: &[UnitRecord]) -> Value {
    let sounds = records.iter().map(UnitRecord::to_json).collect();
    let mut document = Map::new();
    document.insert(SOUNDS_KEY.to_string(), Value::Array(sounds));
    Value::Object(document)
}

/// Parse a whole document before anything on the board is touched
pub fn parse_document(text: &str) -> Result<Vec<UnitRecord>, ProjectError> {
    let value: Value = serde_json::from_str(text).map_err(ProjectError::Parse)?;
    let object = value.as_object().ok_or(ProjectError::NotAProject)?;

    let Some(Value::Array(sounds)) = object.get(SOUNDS_KEY) else {
        return Ok(Vec::new());
    };

    let records = sounds
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match UnitRecord::from_json(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Skipping sound #{}: {}", index, err);
                None
            }
        })
        .collect();
    Ok(records)
}

impl Soundboard {
    /// Write every unit to `path` as an indented document
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let records = self.records();
        let document = to_document(&records);
        // Serializing a `Value` cannot fail.
        let text = serde_json::to_string_pretty(&document).map_err(ProjectError::Parse)?;

        fs::write(path, text).map_err(|source| ProjectError::FileAccess {
            path: path.display().to_string(),
            source,
        })?;

        info!("Saved {} sound(s) to {}", records.len(), path.display());
        self.bus().publish(Event::ProjectSaved {
            path: path.to_path_buf(),
            units: records.len(),
        });
        Ok(())
    }

    /// Replace the board with the project at `path`
    ///
    /// Asks before discarding a non-empty board. The board is only cleared
    /// once the new document has been read and parsed, so a bad file leaves
    /// the current project untouched.
    pub fn open(&mut self, path: &Path, confirm: &mut dyn Confirm) -> Result<usize, ProjectError> {
        if !self.is_empty()
            && !confirm.confirm(
                "Open Project",
                "Really discard current and load other project?",
            )
        {
            return Err(ProjectError::Cancelled);
        }

        let records = self.read_project(path)?;
        Ok(self.replace_with(path, records))
    }

    /// Load at startup, when there is nothing to discard
    pub fn load(&mut self, path: &Path) -> Result<usize, ProjectError> {
        let records = self.read_project(path)?;
        Ok(self.replace_with(path, records))
    }

    fn read_project(&self, path: &Path) -> Result<Vec<UnitRecord>, ProjectError> {
        let text = fs::read_to_string(path).map_err(|source| ProjectError::FileAccess {
            path: path.display().to_string(),
            source,
        })?;
        parse_document(&text)
    }

    fn replace_with(&mut self, path: &Path, records: Vec<UnitRecord>) -> usize {
        self.clear();
        let units = records.len();
        for record in records {
            self.append_record(record);
        }

        info!("Loaded {} sound(s) from {}", units, path.display());
        self.bus().publish(Event::ProjectLoaded {
            path: path.to_path_buf(),
            units,
        });
        units
    }
}
