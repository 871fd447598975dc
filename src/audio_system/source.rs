/// Playlist source locations
///
/// A location is stored in its canonical string form: anything that parses as
/// a URL is normalised by the `url` crate, anything else (a plain path) is kept
/// verbatim. Canonicalising twice yields the same string.
use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::AudioError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation(String);

/// Parse as a URL unless the "scheme" is a single letter, which is a Windows
/// drive (`C:\sounds\rain.wav`).
fn parse_url(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(|url| url.scheme().len() > 1)
}

impl SourceLocation {
    pub fn parse(raw: &str) -> Self {
        match parse_url(raw) {
            Some(url) => Self(url.to_string()),
            None => Self(raw.to_string()),
        }
    }

    /// Location for a local file; absolute paths become `file://` URLs
    pub fn from_path(path: &Path) -> Self {
        match Url::from_file_path(path) {
            Ok(url) => Self(url.to_string()),
            Err(()) => Self(path.to_string_lossy().into_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this location is a URL (as opposed to a bare path)
    pub fn is_url(&self) -> bool {
        parse_url(&self.0).is_some()
    }

    /// Resolve to a path on the local file system
    ///
    /// Only `file:` URLs and bare paths resolve; streaming schemes do not.
    pub fn to_file_path(&self) -> Result<PathBuf, AudioError> {
        match parse_url(&self.0) {
            Some(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|()| AudioError::UnsupportedLocation(self.0.clone())),
            Some(_) => Err(AudioError::UnsupportedLocation(self.0.clone())),
            None => Ok(PathBuf::from(&self.0)),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceLocation {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for SourceLocation {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}
