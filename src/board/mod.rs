/// Soundboard: the ordered collection of sound effect units
///
/// Units are addressed by `UnitId` handles the board issues on insertion.
/// Positions are found by a linear scan, which is fine for the handful of
/// sounds a board holds.
///
/// The board owns the port factory and clock every unit is built with, and
/// publishes an `Event` whenever a unit appears, disappears or changes state.
pub mod dnd;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::audio_system::{PortFactory, SourceLocation, Volume};
use crate::dialog::{Confirm, SoundDialog};
use crate::effect::{EffectState, FadeOut, SoundEffect, UnitRecord};
use crate::error::UnitError;
use crate::messaging::{Event, EventBus};
use crate::timing::SharedClock;

pub use dnd::{DragOrigin, DragSession, DropOutcome, DropPayload};

static NEXT_BOARD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one unit container
///
/// Unit ids are only unique within their board, so a drag records both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardId(u64);

impl BoardId {
    pub fn next() -> Self {
        Self(NEXT_BOARD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable handle for a unit on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What drag-and-drop needs from the collection holding the units
///
/// Units never reach into their container; the drop logic goes through this
/// capability instead.
pub trait UnitHost {
    fn board_id(&self) -> BoardId;

    fn count(&self) -> usize;

    fn position_of(&self, id: UnitId) -> Option<usize>;

    fn id_at(&self, position: usize) -> Option<UnitId>;

    /// Build a unit from `record` and insert it at `position` (clamped to the end)
    fn insert_at(&mut self, position: usize, record: UnitRecord) -> UnitId;

    /// Stop and drop the unit; false if it is not here
    fn remove_and_destroy(&mut self, id: UnitId) -> bool;

    /// Append locations to a unit's playlist; returns how many were added
    fn append_sources(&mut self, id: UnitId, sources: Vec<SourceLocation>) -> usize;

    /// Encoded unit as carried by a drag
    fn payload_of(&self, id: UnitId) -> Option<String>;
}

struct Slot {
    id: UnitId,
    unit: SoundEffect,
    reported: EffectState,
}

pub struct Soundboard {
    board_id: BoardId,
    slots: Vec<Slot>,
    next_id: u64,
    ports: Box<dyn PortFactory>,
    clock: SharedClock,
    fade: FadeOut,
    default_volume: Volume,
    bus: EventBus,
}

impl Soundboard {
    pub fn new(ports: Box<dyn PortFactory>, clock: SharedClock) -> Self {
        Self {
            board_id: BoardId::next(),
            slots: Vec::new(),
            next_id: 1,
            ports,
            clock,
            fade: FadeOut::default(),
            default_volume: Volume::default(),
            bus: EventBus::new(),
        }
    }

    /// Fade curve for units created from now on
    pub fn with_fade(mut self, fade: FadeOut) -> Self {
        self.fade = fade;
        self
    }

    /// Volume of units created through `add_sound`
    pub fn with_default_volume(mut self, volume: u8) -> Self {
        self.default_volume = Volume::new(volume);
        self
    }

    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handles in display order
    pub fn ids(&self) -> Vec<UnitId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &SoundEffect)> {
        self.slots.iter().map(|slot| (slot.id, &slot.unit))
    }

    pub fn unit(&self, id: UnitId) -> Option<&SoundEffect> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.unit)
    }

    /// Records of every unit in display order
    pub fn records(&self) -> Vec<UnitRecord> {
        self.slots.iter().map(|slot| slot.unit.to_record()).collect()
    }

    pub fn play(&mut self, id: UnitId) -> Result<(), UnitError> {
        let result = self.unit_mut(id)?.play();
        self.publish_transitions();
        result
    }

    pub fn stop(&mut self, id: UnitId) -> Result<(), UnitError> {
        self.unit_mut(id)?.stop();
        self.publish_transitions();
        Ok(())
    }

    pub fn toggle(&mut self, id: UnitId) -> Result<(), UnitError> {
        let result = self.unit_mut(id)?.toggle();
        self.publish_transitions();
        result
    }

    pub fn set_volume(&mut self, id: UnitId, volume: u8) -> Result<(), UnitError> {
        self.unit_mut(id)?.set_volume(volume);
        Ok(())
    }

    pub fn set_loop_enabled(&mut self, id: UnitId, enabled: bool) -> Result<(), UnitError> {
        self.unit_mut(id)?.set_loop_enabled(enabled);
        self.publish_transitions();
        Ok(())
    }

    /// Stop every unit; each fades out on its own
    pub fn stop_all(&mut self) {
        for slot in &mut self.slots {
            slot.unit.stop();
        }
        self.publish_transitions();
    }

    /// Drive device notifications and timers of every unit
    pub fn poll(&mut self) {
        for slot in &mut self.slots {
            slot.unit.poll();
        }
        self.publish_transitions();
    }

    /// Ask the dialog for a new sound and append it; loop starts disabled
    pub fn add_sound(&mut self, dialog: &mut dyn SoundDialog) -> Option<UnitId> {
        let spec = dialog.collect(None)?;
        let record = UnitRecord::from_spec(&spec, self.default_volume);
        Some(self.append_record(record))
    }

    /// Stop the unit and let the dialog replace name, sources and interval
    pub fn edit(&mut self, id: UnitId, dialog: &mut dyn SoundDialog) -> Result<bool, UnitError> {
        let edited = self.unit_mut(id)?.edit(dialog);
        self.publish_transitions();
        Ok(edited)
    }

    /// Delete after confirmation; returns whether the unit is gone
    pub fn delete(&mut self, id: UnitId, confirm: &mut dyn Confirm) -> Result<bool, UnitError> {
        self.unit_mut(id)?;
        if !confirm.confirm("Delete sound", "Do you really want to delete this sound?") {
            return Ok(false);
        }
        Ok(self.remove_and_destroy(id))
    }

    /// Empty the board, asking first when there is something to lose
    pub fn new_project(&mut self, confirm: &mut dyn Confirm) -> bool {
        if !self.is_empty()
            && !confirm.confirm("New Project", "Discard current and create new project?")
        {
            return false;
        }
        self.clear();
        self.bus.publish(Event::ProjectCleared);
        true
    }

    /// Drop every unit, stopping playback and disarming timers
    pub fn clear(&mut self) {
        for slot in self.slots.drain(..) {
            self.bus.publish(Event::UnitRemoved {
                id: slot.id,
                name: slot.unit.name().to_string(),
            });
        }
    }

    pub fn append_record(&mut self, record: UnitRecord) -> UnitId {
        let end = self.slots.len();
        self.insert_at(end, record)
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut SoundEffect, UnitError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.unit)
            .ok_or(UnitError::UnknownUnit(id.raw()))
    }

    fn publish_transitions(&mut self) {
        for slot in &mut self.slots {
            let now = slot.unit.state();
            if now != slot.reported {
                self.bus.publish(Event::UnitStateChanged {
                    id: slot.id,
                    name: slot.unit.name().to_string(),
                    from: slot.reported,
                    to: now,
                });
                slot.reported = now;
            }
        }
    }
}

impl UnitHost for Soundboard {
    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn count(&self) -> usize {
        self.slots.len()
    }

    fn position_of(&self, id: UnitId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    fn id_at(&self, position: usize) -> Option<UnitId> {
        self.slots.get(position).map(|slot| slot.id)
    }

    fn insert_at(&mut self, position: usize, record: UnitRecord) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;

        let port = self.ports.create_port();
        let unit = SoundEffect::from_record(record, port, Arc::clone(&self.clock)).with_fade(self.fade);
        debug!("Inserting '{}' as {} at {}", unit.name(), id, position);

        let name = unit.name().to_string();
        let position = position.min(self.slots.len());
        self.slots.insert(
            position,
            Slot {
                id,
                unit,
                reported: EffectState::Idle,
            },
        );
        self.bus.publish(Event::UnitAdded { id, name });
        id
    }

    fn remove_and_destroy(&mut self, id: UnitId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        let slot = self.slots.remove(position);
        info!("Removed '{}'", slot.unit.name());
        self.bus.publish(Event::UnitRemoved {
            id,
            name: slot.unit.name().to_string(),
        });
        true
    }

    fn append_sources(&mut self, id: UnitId, sources: Vec<SourceLocation>) -> usize {
        match self.unit_mut(id) {
            Ok(unit) => unit.append_sources(sources),
            Err(_) => 0,
        }
    }

    fn payload_of(&self, id: UnitId) -> Option<String> {
        self.unit(id).map(SoundEffect::drag_payload)
    }
}

impl fmt::Debug for Soundboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Soundboard")
            .field("board", &self.board_id)
            .field("units", &self.slots.len())
            .field("next_id", &self.next_id)
            .field("fade", &self.fade)
            .finish()
    }
}
