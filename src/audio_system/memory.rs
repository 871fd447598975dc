/// In-memory playback port
///
/// Behaves like a device that starts instantly and plays until told it has
/// finished. Every call is recorded, and a `MemoryPortHandle` lets the owner
/// of the test (or a headless host) inspect the port and drive its
/// end-of-stream notification.
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use super::port::{Listeners, MediaPort, PlaybackState, PortFactory};
use super::source::SourceLocation;
use super::volume::Volume;

/// One recorded port call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    SetSource(String),
    SetVolume(u8),
    Play,
    Stop,
}

#[derive(Debug, Default)]
struct MemoryPortState {
    calls: Vec<PortCall>,
    source: Option<SourceLocation>,
    volume: Volume,
    state: PlaybackState,
    refuse_playback: bool,
    listeners: Listeners,
}

impl MemoryPortState {
    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.listeners.notify(state);
        }
    }
}

pub struct MemoryPort {
    shared: Arc<Mutex<MemoryPortState>>,
}

impl MemoryPort {
    pub fn new() -> (Self, MemoryPortHandle) {
        let shared = Arc::new(Mutex::new(MemoryPortState::default()));
        let handle = MemoryPortHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared }, handle)
    }
}

impl MediaPort for MemoryPort {
    fn set_source(&mut self, location: &SourceLocation) {
        let mut port = self.shared.lock();
        port.calls.push(PortCall::SetSource(location.to_string()));
        port.source = Some(location.clone());
    }

    fn set_volume(&mut self, volume: u8) {
        let mut port = self.shared.lock();
        let volume = Volume::new(volume);
        port.calls.push(PortCall::SetVolume(volume.level()));
        port.volume = volume;
    }

    fn volume(&self) -> u8 {
        self.shared.lock().volume.level()
    }

    fn play(&mut self) {
        let mut port = self.shared.lock();
        port.calls.push(PortCall::Play);
        if port.refuse_playback || port.source.is_none() {
            return;
        }
        port.set_state(PlaybackState::Playing);
    }

    fn stop(&mut self) {
        let mut port = self.shared.lock();
        port.calls.push(PortCall::Stop);
        port.set_state(PlaybackState::Stopped);
    }

    fn state(&self) -> PlaybackState {
        self.shared.lock().state
    }

    fn subscribe(&mut self, listener: Sender<PlaybackState>) {
        self.shared.lock().listeners.add(listener);
    }
}

/// Inspection and control side of a `MemoryPort`
#[derive(Debug, Clone)]
pub struct MemoryPortHandle {
    shared: Arc<Mutex<MemoryPortState>>,
}

impl MemoryPortHandle {
    pub fn calls(&self) -> Vec<PortCall> {
        self.shared.lock().calls.clone()
    }

    pub fn play_count(&self) -> usize {
        self.shared
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, PortCall::Play))
            .count()
    }

    pub fn volume(&self) -> u8 {
        self.shared.lock().volume.level()
    }

    pub fn source(&self) -> Option<SourceLocation> {
        self.shared.lock().source.clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state
    }

    /// Simulate the end of the current stream
    pub fn finish(&self) {
        self.shared.lock().set_state(PlaybackState::Stopped);
    }

    /// Make subsequent `play` calls fail to start
    pub fn refuse_playback(&self, refuse: bool) {
        self.shared.lock().refuse_playback = refuse;
    }
}

/// Factory that remembers a handle for every port it created
#[derive(Debug, Clone, Default)]
pub struct MemoryPortFactory {
    handles: Arc<Mutex<Vec<MemoryPortHandle>>>,
}

impl MemoryPortFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles in creation order
    pub fn handles(&self) -> Vec<MemoryPortHandle> {
        self.handles.lock().clone()
    }

    pub fn last(&self) -> Option<MemoryPortHandle> {
        self.handles.lock().last().cloned()
    }
}

impl PortFactory for MemoryPortFactory {
    fn create_port(&self) -> Box<dyn MediaPort> {
        let (port, handle) = MemoryPort::new();
        self.handles.lock().push(handle);
        Box::new(port)
    }
}
