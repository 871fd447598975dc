/// Modal collaborators
///
/// The soundboard never draws dialogs itself. It asks a `SoundDialog` for a
/// name, a source list and a loop interval, and a `Confirm` for yes/no
/// questions before destructive actions. Front ends implement both.
use crate::audio_system::SourceLocation;

/// What the "add/edit sound" dialog collects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundSpec {
    name: String,
    sources: Vec<SourceLocation>,
    loop_interval_ms: u64,
}

impl SoundSpec {
    /// `None` for an empty name: the dialog cannot be confirmed without one
    pub fn new(name: impl Into<String>, loop_interval_ms: u64) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            sources: Vec::new(),
            loop_interval_ms,
        })
    }

    /// Current values of an existing unit, shown when editing
    ///
    /// Not validated: a unit decoded from JSON may carry an empty name, and
    /// the dialog is where the user fixes that.
    pub(crate) fn prefill(name: &str, sources: &[SourceLocation], loop_interval_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.to_vec(),
            loop_interval_ms,
        }
    }

    /// The interval field is edited in seconds
    pub fn from_seconds(name: impl Into<String>, seconds: f64) -> Option<Self> {
        let ms = if seconds.is_finite() && seconds > 0.0 {
            (seconds * 1000.0) as u64
        } else {
            0
        };
        Self::new(name, ms)
    }

    pub fn with_sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = SourceLocation>,
    {
        self.add_sources(sources);
        self
    }

    /// Add sources not already listed; returns how many were added
    pub fn add_sources<I>(&mut self, sources: I) -> usize
    where
        I: IntoIterator<Item = SourceLocation>,
    {
        let before = self.sources.len();
        for source in sources {
            if !self.sources.contains(&source) {
                self.sources.push(source);
            }
        }
        self.sources.len() - before
    }

    pub fn remove_source(&mut self, source: &SourceLocation) {
        self.sources.retain(|s| s != source);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[SourceLocation] {
        &self.sources
    }

    pub fn loop_interval_ms(&self) -> u64 {
        self.loop_interval_ms
    }
}

/// The data-collection dialog
pub trait SoundDialog {
    /// Show the dialog, pre-filled with `initial` when editing
    ///
    /// `None` means the user cancelled and nothing may change.
    fn collect(&mut self, initial: Option<&SoundSpec>) -> Option<SoundSpec>;
}

/// Dialog whose answer is known up front (console commands, scripted hosts)
#[derive(Debug, Clone)]
pub struct PrefilledDialog(pub Option<SoundSpec>);

impl SoundDialog for PrefilledDialog {
    fn collect(&mut self, _initial: Option<&SoundSpec>) -> Option<SoundSpec> {
        self.0.take()
    }
}

/// Yes/no question before a destructive action
pub trait Confirm {
    fn confirm(&mut self, title: &str, question: &str) -> bool;
}

/// Answers every question the same way
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, title: &str, _question: &str) -> bool {
        tracing::debug!("Auto-answering '{}' with {}", title, self.0);
        self.0
    }
}
