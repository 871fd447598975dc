/// Rodio-backed playback port
///
/// Each `play` decodes the selected file into a fresh `Sink` on the shared
/// output stream. Rodio has no end-of-stream callback, so `pump` watches for
/// the sink draining and reports `Stopped` to subscribers.
use std::fs::File;
use std::io::BufReader;

use crossbeam_channel::Sender;
use rodio::{Decoder, OutputStreamHandle, Sink};

use super::port::{Listeners, MediaPort, PlaybackState};
use super::source::SourceLocation;
use super::volume::Volume;
use crate::error::AudioError;

pub struct RodioPort {
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    source: Option<SourceLocation>,
    volume: Volume,
    reported: PlaybackState,
    listeners: Listeners,
}

impl RodioPort {
    pub fn new(stream_handle: OutputStreamHandle) -> Self {
        Self {
            stream_handle,
            sink: None,
            source: None,
            volume: Volume::default(),
            reported: PlaybackState::Stopped,
            listeners: Listeners::default(),
        }
    }

    fn start(&self, location: &SourceLocation) -> Result<Sink, AudioError> {
        let path = location.to_file_path()?;
        let file = File::open(&path).map_err(|source| AudioError::LoadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|err| AudioError::DecodeFailed(Box::new(err)))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|err| AudioError::StreamInitFailed(Box::new(err)))?;
        sink.set_volume(self.volume.as_gain());
        sink.append(decoder);
        sink.play();
        Ok(sink)
    }

    fn report(&mut self, state: PlaybackState) {
        if self.reported != state {
            self.reported = state;
            self.listeners.notify(state);
        }
    }
}

impl MediaPort for RodioPort {
    fn set_source(&mut self, location: &SourceLocation) {
        self.source = Some(location.clone());
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = Volume::new(volume);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume.as_gain());
        }
    }

    fn volume(&self) -> u8 {
        self.volume.level()
    }

    fn play(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }

        let Some(location) = self.source.clone() else {
            tracing::warn!("Play requested without a source");
            self.report(PlaybackState::Stopped);
            return;
        };

        match self.start(&location) {
            Ok(sink) => {
                tracing::debug!("Started {}", location);
                self.sink = Some(sink);
                self.report(PlaybackState::Playing);
            }
            Err(err) => {
                tracing::warn!("Failed to play {}: {}", location, err);
                self.report(PlaybackState::Stopped);
            }
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.report(PlaybackState::Stopped);
    }

    fn state(&self) -> PlaybackState {
        match &self.sink {
            Some(sink) if !sink.empty() && !sink.is_paused() => PlaybackState::Playing,
            _ => PlaybackState::Stopped,
        }
    }

    fn subscribe(&mut self, listener: Sender<PlaybackState>) {
        self.listeners.add(listener);
    }

    fn pump(&mut self) {
        if self.reported == PlaybackState::Playing && self.state() == PlaybackState::Stopped {
            if let Some(location) = &self.source {
                tracing::debug!("Finished {}", location);
            }
            self.sink = None;
            self.report(PlaybackState::Stopped);
        }
    }
}
