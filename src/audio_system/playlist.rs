/// Playlist selector
///
/// Keeps the sources of one sound effect in insertion order and a separate
/// play order that is reshuffled on every play request. Reshuffling per play
/// (not per insertion) is what makes repeated plays of a multi-source effect
/// land on a different sample.
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

use super::source::SourceLocation;
use crate::error::UnitError;

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    sources: Vec<SourceLocation>,
    /// Indices into `sources`; empty until the first shuffle after a change
    order: Vec<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; duplicates are allowed
    pub fn add_source(&mut self, location: SourceLocation) {
        self.sources.push(location);
        self.order.clear();
    }

    /// Remove every entry equal to `location`, returning how many went
    pub fn remove_source(&mut self, location: &SourceLocation) -> usize {
        let before = self.sources.len();
        self.sources.retain(|source| source != location);
        self.order.clear();
        before - self.sources.len()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.order.clear();
    }

    pub fn count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in storage order
    pub fn sources(&self) -> &[SourceLocation] {
        &self.sources
    }

    /// Draw a fresh uniformly random play order
    pub fn shuffle_order(&mut self) {
        self.shuffle_order_with(&mut thread_rng());
    }

    pub fn shuffle_order_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order = (0..self.sources.len()).collect();
        self.order.shuffle(rng);
    }

    /// Head of the most recent play order
    ///
    /// Falls back to the first stored source when nothing was shuffled since
    /// the last change.
    pub fn current_selection(&self) -> Result<&SourceLocation, UnitError> {
        let index = self.order.first().copied().unwrap_or(0);
        self.sources.get(index).ok_or(UnitError::EmptyPlaylist)
    }

    /// Sources in the most recent play order
    pub fn play_order(&self) -> Vec<&SourceLocation> {
        if self.order.is_empty() {
            return self.sources.iter().collect();
        }
        self.order.iter().map(|&i| &self.sources[i]).collect()
    }
}

impl FromIterator<SourceLocation> for Playlist {
    fn from_iter<I: IntoIterator<Item = SourceLocation>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
            order: Vec::new(),
        }
    }
}

impl Extend<SourceLocation> for Playlist {
    fn extend<I: IntoIterator<Item = SourceLocation>>(&mut self, iter: I) {
        self.sources.extend(iter);
        self.order.clear();
    }
}
