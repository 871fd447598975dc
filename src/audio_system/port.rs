/// Media playback port
///
/// The seam between a sound effect and whatever actually produces audio.
/// Calls are fire-and-forget; the port reports what happened through
/// `state()` and through `PlaybackState` notifications.
use crossbeam_channel::Sender;

use super::source::SourceLocation;

/// Coarse device state, as seen by a sound effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

pub trait MediaPort {
    /// Select what the next `play` will start
    fn set_source(&mut self, location: &SourceLocation);

    /// Device volume, `0..=100` (larger values are clamped)
    fn set_volume(&mut self, volume: u8);

    fn volume(&self) -> u8;

    fn play(&mut self);

    fn stop(&mut self);

    fn state(&self) -> PlaybackState;

    /// Register a listener for state changes
    fn subscribe(&mut self, listener: Sender<PlaybackState>);

    /// Give polling back-ends a chance to notice the end of a stream
    fn pump(&mut self) {}
}

/// Creates one port per sound effect
pub trait PortFactory {
    fn create_port(&self) -> Box<dyn MediaPort>;
}

/// Fan-out of state notifications
///
/// Listeners whose receiver is gone are dropped on the next notify.
#[derive(Debug, Default)]
pub struct Listeners {
    senders: Vec<Sender<PlaybackState>>,
}

impl Listeners {
    pub fn add(&mut self, listener: Sender<PlaybackState>) {
        self.senders.push(listener);
    }

    pub fn notify(&mut self, state: PlaybackState) {
        self.senders.retain(|sender| sender.send(state).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_listeners_fan_out() {
        let mut listeners = Listeners::default();
        let (tx1, rx1) = unbounded();
        let (tx2, rx2) = unbounded();
        listeners.add(tx1);
        listeners.add(tx2);

        listeners.notify(PlaybackState::Playing);
        assert_eq!(rx1.try_recv().unwrap(), PlaybackState::Playing);
        assert_eq!(rx2.try_recv().unwrap(), PlaybackState::Playing);
    }

    #[test]
    fn test_closed_listener_is_pruned() {
        let mut listeners = Listeners::default();
        let (tx, rx) = unbounded();
        listeners.add(tx);
        drop(rx);

        listeners.notify(PlaybackState::Stopped);
        assert!(listeners.is_empty());
    }
}
