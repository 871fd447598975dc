/// Sound effect unit
///
/// Owns one playback port, one playlist and the two timers that drive
/// looping and fading. All transitions happen on direct calls (`play`,
/// `stop`, setters) or inside `poll`, which the host calls from its event
/// loop. Nothing here blocks or spawns.
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::fade::FadeOut;
use super::record::UnitRecord;
use super::state::EffectState;
use crate::audio_system::{MediaPort, PlaybackState, Playlist, SourceLocation, Volume};
use crate::dialog::{SoundDialog, SoundSpec};
use crate::error::UnitError;
use crate::timing::{SharedClock, SingleShotTimer};

pub struct SoundEffect {
    name: String,
    playlist: Playlist,
    volume: Volume,
    loop_enabled: bool,
    loop_interval: Duration,
    state: EffectState,

    port: Box<dyn MediaPort>,
    port_events: Receiver<PlaybackState>,
    retrigger_timer: SingleShotTimer,
    fade_timer: SingleShotTimer,
    fade: FadeOut,
    clock: SharedClock,
}

impl SoundEffect {
    /// Build an idle unit from a record and subscribe to its port
    pub fn from_record(record: UnitRecord, mut port: Box<dyn MediaPort>, clock: SharedClock) -> Self {
        let (tx, rx) = unbounded();
        port.subscribe(tx);

        let playlist = record.source_locations().collect();

        Self {
            name: record.name,
            playlist,
            volume: Volume::new(record.volume),
            loop_enabled: record.loop_enabled,
            loop_interval: Duration::from_millis(record.interval),
            state: EffectState::Idle,
            port,
            port_events: rx,
            retrigger_timer: SingleShotTimer::new(),
            fade_timer: SingleShotTimer::new(),
            fade: FadeOut::default(),
            clock,
        }
    }

    /// Interactive creation: default volume, loop off
    pub fn new(spec: &SoundSpec, port: Box<dyn MediaPort>, clock: SharedClock) -> Self {
        Self::from_record(UnitRecord::from_spec(spec, Volume::default()), port, clock)
    }

    /// Decode a unit object; the new unit is idle whatever `loop` says
    pub fn from_json(
        value: &Value,
        port: Box<dyn MediaPort>,
        clock: SharedClock,
    ) -> Result<Self, UnitError> {
        let record = UnitRecord::from_json(value)?;
        Ok(Self::from_record(record, port, clock))
    }

    pub fn with_fade(mut self, fade: FadeOut) -> Self {
        self.fade = fade;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[SourceLocation] {
        self.playlist.sources()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Volume the device is currently set to (differs while fading)
    pub fn device_volume(&self) -> u8 {
        self.port.volume()
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn loop_interval_ms(&self) -> u64 {
        self.loop_interval.as_millis() as u64
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Interval of the armed re-trigger timer
    pub fn retrigger_interval(&self) -> Option<Duration> {
        self.retrigger_timer
            .is_active()
            .then(|| self.retrigger_timer.interval())
    }

    /// Interval of the armed fade timer
    pub fn fade_interval(&self) -> Option<Duration> {
        self.fade_timer.is_active().then(|| self.fade_timer.interval())
    }

    /// Start playback of a freshly shuffled selection
    ///
    /// Restarts when already playing. With no sources nothing is touched.
    pub fn play(&mut self) -> Result<(), UnitError> {
        if self.playlist.is_empty() {
            debug!(unit = %self.name, "Play ignored: empty playlist");
            return Err(UnitError::EmptyPlaylist);
        }

        self.fade_timer.stop();
        self.retrigger_timer.stop();
        self.port.stop();

        self.playlist.shuffle_order();
        let source = self.playlist.current_selection()?.clone();
        self.port.set_source(&source);
        self.port.set_volume(self.volume.level());
        self.port.play();
        // Our own stop/start notifications are not device input.
        self.discard_port_events();

        if self.port.state() != PlaybackState::Playing {
            self.transition(EffectState::Idle);
            return Err(UnitError::PlaybackUnavailable {
                location: source.to_string(),
            });
        }

        self.transition(EffectState::Playing);
        info!(unit = %self.name, "Playing {}", source);
        Ok(())
    }

    /// Stop, fading out if the device is still audible
    ///
    /// The unit stops counting as running immediately; the fade finishes in
    /// the background through `poll`.
    pub fn stop(&mut self) {
        self.retrigger_timer.stop();
        if !self.state.is_running() {
            return;
        }

        match self.fade.step_interval(self.port.volume()) {
            Some(interval) => {
                self.fade_timer.start(interval, self.clock.now());
                self.transition(EffectState::FadingOut);
            }
            None => self.halt(),
        }
    }

    /// Play/stop button behaviour
    pub fn toggle(&mut self) -> Result<(), UnitError> {
        if self.is_running() {
            self.stop();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Device state notification
    pub fn on_playback_state_changed(&mut self, device: PlaybackState) {
        if device != PlaybackState::Stopped {
            return;
        }
        match self.state {
            EffectState::Playing if self.loop_enabled => {
                self.retrigger_timer.start(self.loop_interval, self.clock.now());
                self.transition(EffectState::WaitingToLoop);
            }
            EffectState::Playing => self.transition(EffectState::Idle),
            EffectState::FadingOut => {
                // Ran out of audio before the ramp did.
                self.fade_timer.stop();
                self.transition(EffectState::Idle);
            }
            EffectState::Idle | EffectState::WaitingToLoop => {}
        }
    }

    /// Deliver pending device notifications and fire due timers
    pub fn poll(&mut self) {
        self.port.pump();
        while let Ok(device) = self.port_events.try_recv() {
            self.on_playback_state_changed(device);
        }

        let now = self.clock.now();

        if self.retrigger_timer.take_if_due(now).is_some() {
            debug!(unit = %self.name, "Loop interval elapsed");
            if let Err(err) = self.play() {
                warn!(unit = %self.name, "Re-trigger failed: {}", err);
            }
        }

        while let Some(fired_at) = self.fade_timer.take_if_due(now) {
            self.fade_step(fired_at);
        }
    }

    fn fade_step(&mut self, fired_at: Instant) {
        let volume = self.port.volume().saturating_sub(1);
        self.port.set_volume(volume);

        match self.fade.step_interval(volume) {
            Some(next) => self.fade_timer.start(next, fired_at),
            None => self.halt(),
        }
    }

    /// Stop the device and settle in `Idle`
    fn halt(&mut self) {
        self.fade_timer.stop();
        self.retrigger_timer.stop();
        self.port.stop();
        self.discard_port_events();
        self.transition(EffectState::Idle);
    }

    /// Store the volume; forwarded to the device only while running
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = Volume::new(volume);
        if self.state.is_running() {
            self.port.set_volume(self.volume.level());
        }
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
        if !enabled {
            self.retrigger_timer.stop();
            if self.state == EffectState::WaitingToLoop {
                self.transition(EffectState::Idle);
            }
        }
    }

    /// Current name, sources and interval in dialog form
    pub fn spec(&self) -> SoundSpec {
        SoundSpec::prefill(&self.name, self.playlist.sources(), self.loop_interval_ms())
    }

    /// Replace name, interval and playlist; volume and loop flag stay
    pub fn apply_spec(&mut self, spec: &SoundSpec) {
        self.name = spec.name().to_string();
        self.loop_interval = Duration::from_millis(spec.loop_interval_ms());
        self.playlist.clear();
        self.playlist.extend(spec.sources().iter().cloned());
    }

    /// Stop, then let the user edit name, sources and interval
    ///
    /// Returns whether the dialog was confirmed.
    pub fn edit(&mut self, dialog: &mut dyn SoundDialog) -> bool {
        self.stop();
        let current = self.spec();
        match dialog.collect(Some(&current)) {
            Some(spec) => {
                debug!(unit = %self.name, "Edited; now '{}'", spec.name());
                self.apply_spec(&spec);
                true
            }
            None => false,
        }
    }

    /// Add dropped locations to the playlist
    pub fn append_sources<I>(&mut self, sources: I) -> usize
    where
        I: IntoIterator<Item = SourceLocation>,
    {
        let before = self.playlist.count();
        self.playlist.extend(sources);
        self.playlist.count() - before
    }

    pub fn to_record(&self) -> UnitRecord {
        UnitRecord {
            name: self.name.clone(),
            volume: self.volume.level(),
            loop_enabled: self.loop_enabled,
            interval: self.loop_interval_ms(),
            sources: self.playlist.sources().iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn write(&self) -> Value {
        self.to_record().to_json()
    }

    /// Text placed on the clipboard-like drag payload
    pub fn drag_payload(&self) -> String {
        self.to_record().to_payload()
    }

    fn discard_port_events(&mut self) {
        while self.port_events.try_recv().is_ok() {}
    }

    fn transition(&mut self, next: EffectState) {
        if self.state != next {
            debug!(unit = %self.name, "{} -> {}", self.state, next);
            self.state = next;
        }
    }
}

impl Drop for SoundEffect {
    fn drop(&mut self) {
        self.fade_timer.stop();
        self.retrigger_timer.stop();
        if !self.state.is_idle() || self.port.state() == PlaybackState::Playing {
            self.port.stop();
        }
    }
}

impl std::fmt::Debug for SoundEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEffect")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("volume", &self.volume)
            .field("loop_enabled", &self.loop_enabled)
            .field("loop_interval", &self.loop_interval)
            .field("sources", &self.playlist.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::{MemoryPort, MemoryPortHandle, PortCall};
    use crate::timing::ManualClock;
    use std::sync::Arc;

    fn unit_with(record: UnitRecord) -> (SoundEffect, MemoryPortHandle, ManualClock) {
        let clock = ManualClock::new();
        let (port, handle) = MemoryPort::new();
        let unit = SoundEffect::from_record(record, Box::new(port), Arc::new(clock.clone()));
        (unit, handle, clock)
    }

    fn record(sources: &[&str], loop_enabled: bool, interval: u64) -> UnitRecord {
        UnitRecord {
            name: "Rain".to_string(),
            volume: 50,
            loop_enabled,
            interval,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_play_with_empty_playlist_is_a_no_op() {
        let (mut unit, handle, _clock) = unit_with(record(&[], false, 0));

        assert!(matches!(unit.play(), Err(UnitError::EmptyPlaylist)));
        assert!(!unit.is_running());
        assert_eq!(unit.state(), EffectState::Idle);
        assert!(handle.calls().is_empty());
    }

    #[test]
    fn test_play_sets_device_volume_and_source() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.set_volume(70);
        unit.play().unwrap();

        assert_eq!(unit.state(), EffectState::Playing);
        assert_eq!(handle.volume(), 70);
        assert_eq!(handle.source().unwrap().as_str(), "file:///a.wav");
        assert_eq!(
            handle.calls(),
            vec![
                PortCall::Stop,
                PortCall::SetSource("file:///a.wav".to_string()),
                PortCall::SetVolume(70),
                PortCall::Play,
            ]
        );
    }

    #[test]
    fn test_refused_playback_stays_idle() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], true, 0));
        handle.refuse_playback(true);

        assert!(matches!(
            unit.play(),
            Err(UnitError::PlaybackUnavailable { .. })
        ));
        assert_eq!(unit.state(), EffectState::Idle);
    }

    #[test]
    fn test_finish_without_loop_goes_idle() {
        let (mut unit, handle, clock) = unit_with(record(&["file:///a.wav"], false, 500));
        unit.play().unwrap();

        handle.finish();
        unit.poll();

        assert_eq!(unit.state(), EffectState::Idle);
        assert!(unit.retrigger_interval().is_none());

        clock.advance_ms(10_000);
        unit.poll();
        assert_eq!(handle.play_count(), 1);
    }

    #[test]
    fn test_finish_with_loop_retriggers_after_interval() {
        let (mut unit, handle, clock) = unit_with(record(&["file:///a.wav"], true, 500));
        unit.play().unwrap();

        handle.finish();
        unit.poll();
        assert_eq!(unit.state(), EffectState::WaitingToLoop);
        assert!(unit.is_running());
        assert_eq!(unit.retrigger_interval(), Some(Duration::from_millis(500)));

        clock.advance_ms(499);
        unit.poll();
        assert_eq!(handle.play_count(), 1);

        clock.advance_ms(1);
        unit.poll();
        assert_eq!(unit.state(), EffectState::Playing);
        assert_eq!(handle.play_count(), 2);
        assert!(unit.retrigger_interval().is_none());
    }

    #[test]
    fn test_stop_fades_out_step_by_step() {
        let (mut unit, handle, clock) = unit_with(record(&["file:///a.wav"], true, 0));
        unit.play().unwrap();

        unit.stop();
        assert!(!unit.is_running());
        assert_eq!(unit.state(), EffectState::FadingOut);
        assert_eq!(unit.fade_interval(), Some(Duration::from_millis(40)));

        let mut ticks = 0;
        while let Some(interval) = unit.fade_interval() {
            clock.advance(interval);
            unit.poll();
            ticks += 1;
            if unit.state() == EffectState::FadingOut {
                assert_eq!(handle.volume(), 50 - ticks);
            }
        }

        assert_eq!(ticks, 50);
        assert_eq!(handle.volume(), 0);
        assert_eq!(unit.state(), EffectState::Idle);
        assert!(unit.fade_interval().is_none());
    }

    #[test]
    fn test_late_poll_catches_up_on_fade() {
        let (mut unit, handle, clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.play().unwrap();
        unit.stop();

        clock.advance_ms(60_000);
        unit.poll();

        assert_eq!(handle.volume(), 0);
        assert_eq!(unit.state(), EffectState::Idle);
    }

    #[test]
    fn test_stop_at_zero_volume_goes_straight_to_idle() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.set_volume(0);
        unit.play().unwrap();

        unit.stop();
        assert_eq!(unit.state(), EffectState::Idle);
        assert!(unit.fade_interval().is_none());
        assert_eq!(handle.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_stop_while_waiting_cancels_retrigger() {
        let (mut unit, handle, clock) = unit_with(record(&["file:///a.wav"], true, 1000));
        unit.play().unwrap();
        handle.finish();
        unit.poll();

        unit.stop();
        assert!(unit.retrigger_interval().is_none());
        assert!(!unit.is_running());

        clock.advance_ms(5_000);
        unit.poll();
        assert_eq!(handle.play_count(), 1);
    }

    #[test]
    fn test_disabling_loop_while_waiting_settles_idle() {
        let (mut unit, handle, clock) = unit_with(record(&["file:///a.wav"], true, 1000));
        unit.play().unwrap();
        handle.finish();
        unit.poll();

        unit.set_loop_enabled(false);
        assert_eq!(unit.state(), EffectState::Idle);
        assert!(unit.retrigger_interval().is_none());

        clock.advance_ms(2_000);
        unit.poll();
        assert_eq!(handle.play_count(), 1);
    }

    #[test]
    fn test_volume_forwarded_only_while_running() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.set_volume(20);
        assert!(handle.calls().is_empty());

        unit.play().unwrap();
        unit.set_volume(90);
        assert_eq!(handle.volume(), 90);

        unit.stop();
        unit.set_volume(10);
        assert_eq!(unit.volume(), 10);
        assert_eq!(handle.volume(), 90);
    }

    #[test]
    fn test_volume_is_clamped() {
        let (mut unit, _handle, _clock) = unit_with(record(&[], false, 0));
        unit.set_volume(255);
        assert_eq!(unit.volume(), 100);
    }

    #[test]
    fn test_play_cancels_fade() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.play().unwrap();
        unit.stop();
        assert!(unit.fade_interval().is_some());

        unit.play().unwrap();
        assert!(unit.fade_interval().is_none());
        assert_eq!(unit.state(), EffectState::Playing);
        assert_eq!(handle.volume(), 50);
    }

    #[test]
    fn test_toggle() {
        let (mut unit, _handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.toggle().unwrap();
        assert!(unit.is_running());
        unit.toggle().unwrap();
        assert!(!unit.is_running());
    }

    #[test]
    fn test_natural_end_during_fade_settles_idle() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        unit.play().unwrap();
        unit.stop();

        handle.finish();
        unit.poll();
        assert_eq!(unit.state(), EffectState::Idle);
        assert!(unit.fade_interval().is_none());
    }

    #[test]
    fn test_edit_replaces_name_sources_interval_only() {
        let mut rec = record(&["file:///a.wav"], true, 1000);
        rec.volume = 65;
        let (mut unit, _handle, _clock) = unit_with(rec);

        let spec = SoundSpec::new("Storm", 4000)
            .unwrap()
            .with_sources([SourceLocation::parse("file:///b.wav")]);
        let mut dialog = crate::dialog::PrefilledDialog(Some(spec));

        assert!(unit.edit(&mut dialog));
        assert_eq!(unit.name(), "Storm");
        assert_eq!(unit.loop_interval_ms(), 4000);
        assert_eq!(unit.sources(), &[SourceLocation::parse("file:///b.wav")]);
        assert_eq!(unit.volume(), 65);
        assert!(unit.loop_enabled());
    }

    #[test]
    fn test_cancelled_edit_changes_nothing() {
        let (mut unit, _handle, _clock) = unit_with(record(&["file:///a.wav"], false, 0));
        let before = unit.to_record();
        assert!(!unit.edit(&mut crate::dialog::PrefilledDialog(None)));
        assert_eq!(unit.to_record(), before);
    }

    #[test]
    fn test_write_uses_storage_order() {
        let (mut unit, _handle, _clock) = unit_with(record(
            &["file:///1.wav", "file:///2.wav", "file:///3.wav"],
            false,
            0,
        ));
        unit.play().unwrap();
        let written = unit.write();
        assert_eq!(
            written["sources"],
            serde_json::json!(["file:///1.wav", "file:///2.wav", "file:///3.wav"])
        );
    }

    #[test]
    fn test_decoded_unit_starts_idle() {
        let clock = ManualClock::new();
        let (port, _handle) = MemoryPort::new();
        let unit = SoundEffect::from_json(
            &serde_json::json!({"name": "Rain", "loop": true, "sources": ["file:///a.wav"]}),
            Box::new(port),
            Arc::new(clock),
        )
        .unwrap();
        assert_eq!(unit.state(), EffectState::Idle);
        assert!(unit.loop_enabled());
    }

    #[test]
    fn test_drop_stops_device() {
        let (mut unit, handle, _clock) = unit_with(record(&["file:///a.wav"], true, 0));
        unit.play().unwrap();
        drop(unit);
        assert_eq!(handle.state(), PlaybackState::Stopped);
    }
}
