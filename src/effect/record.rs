/// Sound effect JSON record
///
/// The same object is written to project files (one per entry of `sounds`)
/// and carried as drag-and-drop payload, so it must stand on its own:
///
/// ```json
/// { "name": "Rain", "volume": 70, "loop": true, "interval": 3000,
///   "sources": ["file:///rain1.wav", "file:///rain2.wav"] }
/// ```
///
/// Decoding is lenient about optional keys and strict about types that would
/// produce a broken unit.
use serde_json::{Map, Value};

use crate::audio_system::{SourceLocation, Volume};
use crate::dialog::SoundSpec;
use crate::error::UnitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub name: String,
    pub volume: u8,
    pub loop_enabled: bool,
    pub interval: u64,
    pub sources: Vec<String>,
}

/// Integer value of `key`, accepting integral floats (`3000.0`)
fn int_field(object: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = object.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

impl UnitRecord {
    /// Record for a freshly created unit: loop disabled
    pub fn from_spec(spec: &SoundSpec, volume: Volume) -> Self {
        Self {
            name: spec.name().to_string(),
            volume: volume.level(),
            loop_enabled: false,
            interval: spec.loop_interval_ms(),
            sources: spec.sources().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Decode one unit object
    ///
    /// Fails when `name` is missing or not a string, or when any entry of
    /// `sources` is not a string. A missing (or non-array) `sources` means no
    /// sources; `interval`, `loop` and `volume` default to 0, false and 50.
    pub fn from_json(value: &Value) -> Result<Self, UnitError> {
        let object = value
            .as_object()
            .ok_or_else(|| UnitError::InvalidUnitJson("expected an object".to_string()))?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| UnitError::InvalidUnitJson("missing string `name`".to_string()))?
            .to_string();

        let sources = match object.get("sources") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        UnitError::InvalidUnitJson(format!("source #{index} is not a string"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        let interval = int_field(object, "interval")
            .map(|ms| ms.max(0) as u64)
            .unwrap_or(0);
        let loop_enabled = object.get("loop").and_then(Value::as_bool).unwrap_or(false);
        let volume = int_field(object, "volume")
            .map(Volume::clamped)
            .unwrap_or_default();

        Ok(Self {
            name,
            volume: volume.level(),
            loop_enabled,
            interval,
            sources,
        })
    }

    /// Decode a drag-and-drop payload
    pub fn from_text(text: &str) -> Result<Self, UnitError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| UnitError::InvalidUnitJson(err.to_string()))?;
        Self::from_json(&value)
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "volume": self.volume,
            "loop": self.loop_enabled,
            "interval": self.interval,
            "sources": self.sources,
        })
    }

    /// Indented JSON text, as placed on the drag payload
    pub fn to_payload(&self) -> String {
        format!("{:#}", self.to_json())
    }

    pub fn source_locations(&self) -> impl Iterator<Item = SourceLocation> + '_ {
        self.sources.iter().map(|raw| SourceLocation::parse(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_object() {
        let record = UnitRecord::from_json(&json!({
            "name": "Rain",
            "sources": ["file:///a.wav"],
            "volume": 70,
            "loop": true,
            "interval": 3000
        }))
        .unwrap();

        assert_eq!(record.name, "Rain");
        assert_eq!(record.sources, vec!["file:///a.wav".to_string()]);
        assert_eq!(record.volume, 70);
        assert!(record.loop_enabled);
        assert_eq!(record.interval, 3000);
    }

    #[test]
    fn test_decode_defaults() {
        let record = UnitRecord::from_json(&json!({ "name": "Wind" })).unwrap();
        assert!(record.sources.is_empty());
        assert_eq!(record.volume, 50);
        assert!(!record.loop_enabled);
        assert_eq!(record.interval, 0);
    }

    #[test]
    fn test_decode_rejects_missing_or_non_string_name() {
        assert!(UnitRecord::from_json(&json!({ "sources": [] })).is_err());
        assert!(UnitRecord::from_json(&json!({ "name": 12 })).is_err());
        assert!(UnitRecord::from_json(&json!(["name"])).is_err());
    }

    #[test]
    fn test_decode_rejects_non_string_source() {
        let result = UnitRecord::from_json(&json!({
            "name": "Birds",
            "sources": ["file:///a.wav", 3, "file:///b.wav"]
        }));
        assert!(matches!(result, Err(UnitError::InvalidUnitJson(_))));
    }

    #[test]
    fn test_decode_tolerates_odd_optional_values() {
        let record = UnitRecord::from_json(&json!({
            "name": "Fire",
            "sources": "not-an-array",
            "volume": 250,
            "loop": "yes",
            "interval": -40
        }))
        .unwrap();
        assert!(record.sources.is_empty());
        assert_eq!(record.volume, 100);
        assert!(!record.loop_enabled);
        assert_eq!(record.interval, 0);

        let record =
            UnitRecord::from_json(&json!({ "name": "Fire", "interval": 1500.0 })).unwrap();
        assert_eq!(record.interval, 1500);
    }

    #[test]
    fn test_encode_key_set() {
        let record = UnitRecord {
            name: "Crickets".to_string(),
            volume: 33,
            loop_enabled: true,
            interval: 250,
            sources: vec!["file:///c.ogg".to_string()],
        };
        let value = record.to_json();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["interval", "loop", "name", "sources", "volume"]);
        assert_eq!(value["loop"], json!(true));
    }

    #[test]
    fn test_payload_round_trip() {
        let record = UnitRecord {
            name: "Waves".to_string(),
            volume: 80,
            loop_enabled: false,
            interval: 0,
            sources: vec!["file:///w1.wav".to_string(), "file:///w2.wav".to_string()],
        };
        let decoded = UnitRecord::from_text(&record.to_payload()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_from_text_rejects_garbage() {
        assert!(UnitRecord::from_text("not json").is_err());
        assert!(UnitRecord::from_text("").is_err());
    }
}
