//! Note-On / Note-Off pairing
//!
//! SEQ has no Note-Off: each Note-On carries its own gate time. This pass
//! walks the events in file order, writes gate times onto the Note-On events
//! and marks the Note-Off events it consumed as removed.

use crate::converters::midi_to_seq::model::RawMidiEvent;

const CHANNELS: usize = 16;
const KEYS: usize = 128;

/// Outcome counts of a gate pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateSummary {
    pub paired: usize,        // Notes closed by a Note-Off or zero-velocity Note-On
    pub retriggered: usize,   // Notes closed by a new Note-On on the same key
    pub orphan_ends: usize,   // Note-Offs with no sounding note, left in place
    pub unterminated: usize,  // Notes still sounding at end of track, gate 0
}

/// Index of the sounding Note-On for each (channel, key)
struct ActiveNotes {
    slots: Vec<[Option<usize>; KEYS]>,
}

impl ActiveNotes {
    fn new() -> Self {
        Self {
            slots: vec![[None; KEYS]; CHANNELS],
        }
    }

    fn slot(&mut self, channel: u8, key: u8) -> Option<&mut Option<usize>> {
        self.slots
            .get_mut(channel as usize)
            .and_then(|keys| keys.get_mut(key as usize))
    }

    fn count(&self) -> usize {
        self.slots.iter().flatten().filter(|slot| slot.is_some()).count()
    }
}

/// Compute gate times in place. `events` must still be in file order.
pub fn calculate_gates(events: &mut [RawMidiEvent]) -> GateSummary {
    let mut active = ActiveNotes::new();
    let mut summary = GateSummary::default();

    for index in 0..events.len() {
        let event = events[index];
        let starts = event.is_note_start();
        if !starts && !event.is_note_end() {
            continue;
        }

        let Some(slot) = active.slot(event.channel(), event.data1) else {
            // Keys above 127 are malformed data bytes
            log::warn!(
                "Note event at tick {} has out of range key {}",
                event.absolute_time,
                event.data1
            );
            continue;
        };

        if starts {
            if let Some(previous) = slot.replace(index) {
                close_note(events, previous, event.absolute_time);
                summary.retriggered += 1;
            }
        } else if let Some(note_on) = slot.take() {
            close_note(events, note_on, event.absolute_time);
            events[index].removed = true;
            summary.paired += 1;
        } else {
            summary.orphan_ends += 1;
        }
    }

    summary.unterminated = active.count();
    if summary.unterminated > 0 {
        log::warn!(
            "{} notes are still sounding at end of track and get a gate time of 0",
            summary.unterminated
        );
    }
    if summary.orphan_ends > 0 {
        log::debug!("{} Note-Off events had no matching Note-On", summary.orphan_ends);
    }

    summary
}

fn close_note(events: &mut [RawMidiEvent], note_on: usize, end_time: u32) {
    let note = &mut events[note_on];
    note.gate_time = end_time.saturating_sub(note.absolute_time);
}
