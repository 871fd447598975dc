/// Drag and drop between units and the board
///
/// A drag carries either an encoded unit (dragged from a unit) or a list of
/// locations (dragged from a file manager). Dropping a unit inserts a
/// decoded copy and then removes the original if it lives on the same
/// board, so reordering is delete-and-reinsert rather than an in-place move.
use tracing::debug;

use super::{BoardId, UnitHost, UnitId};
use crate::audio_system::SourceLocation;
use crate::effect::UnitRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// JSON text of one unit object
    Unit(String),
    Locations(Vec<SourceLocation>),
}

/// The unit a drag was started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOrigin {
    pub board: BoardId,
    pub unit: UnitId,
}

/// A drag in flight: what is carried and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub origin: Option<DragOrigin>,
    pub payload: DropPayload,
}

impl DragSession {
    /// Text dragged in from outside the board
    pub fn external_text(text: impl Into<String>) -> Self {
        Self {
            origin: None,
            payload: DropPayload::Unit(text.into()),
        }
    }

    pub fn locations(locations: Vec<SourceLocation>) -> Self {
        Self {
            origin: None,
            payload: DropPayload::Locations(locations),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// A copy was inserted; nothing was removed
    Inserted(UnitId),
    /// A copy was inserted and the drag origin removed
    Moved(UnitId),
    /// Locations were added to the target's playlist
    Appended(usize),
    Ignored,
}

/// Start dragging a unit of `host`
pub fn drag_unit<H: UnitHost + ?Sized>(host: &H, id: UnitId) -> Option<DragSession> {
    let payload = host.payload_of(id)?;
    Some(DragSession {
        origin: Some(DragOrigin {
            board: host.board_id(),
            unit: id,
        }),
        payload: DropPayload::Unit(payload),
    })
}

/// Drop onto a unit: units land above it, locations join its playlist
pub fn drop_on_unit<H: UnitHost + ?Sized>(
    host: &mut H,
    target: UnitId,
    drag: DragSession,
) -> DropOutcome {
    let Some(position) = host.position_of(target) else {
        return DropOutcome::Ignored;
    };

    match drag.payload {
        DropPayload::Locations(locations) => {
            DropOutcome::Appended(host.append_sources(target, locations))
        }
        DropPayload::Unit(text) => match decode(&text) {
            Some(record) => {
                let id = host.insert_at(position, record);
                finish_move(host, drag.origin, id)
            }
            None => DropOutcome::Ignored,
        },
    }
}

/// Drop onto the empty area below the last unit
pub fn drop_on_board<H: UnitHost + ?Sized>(host: &mut H, drag: DragSession) -> DropOutcome {
    let DropPayload::Unit(text) = drag.payload else {
        return DropOutcome::Ignored;
    };
    match decode(&text) {
        Some(record) => {
            let end = host.count();
            let id = host.insert_at(end, record);
            finish_move(host, drag.origin, id)
        }
        None => DropOutcome::Ignored,
    }
}

/// Reorder by dragging the unit at `from` onto the unit at `to`
///
/// `to == count` drops below the last unit.
pub fn move_unit<H: UnitHost + ?Sized>(host: &mut H, from: usize, to: usize) -> DropOutcome {
    let Some(source) = host.id_at(from) else {
        return DropOutcome::Ignored;
    };
    let Some(drag) = drag_unit(&*host, source) else {
        return DropOutcome::Ignored;
    };

    match host.id_at(to) {
        Some(target) => drop_on_unit(host, target, drag),
        None if to == host.count() => drop_on_board(host, drag),
        None => DropOutcome::Ignored,
    }
}

fn decode(text: &str) -> Option<UnitRecord> {
    match UnitRecord::from_text(text) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!("Drop ignored: {}", err);
            None
        }
    }
}

/// Remove the original only when it was dragged from this same board
fn finish_move<H: UnitHost + ?Sized>(
    host: &mut H,
    origin: Option<DragOrigin>,
    inserted: UnitId,
) -> DropOutcome {
    match origin {
        Some(origin)
            if origin.board == host.board_id() && host.remove_and_destroy(origin.unit) =>
        {
            DropOutcome::Moved(inserted)
        }
        _ => DropOutcome::Inserted(inserted),
    }
}
