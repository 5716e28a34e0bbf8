use crate::converters::midi_to_seq::model::RawMidiEvent;
use std::cmp::Ordering;

/// Order two events by time; at the same tick a note end comes first
pub fn compare_events(a: &RawMidiEvent, b: &RawMidiEvent) -> Ordering {
    a.absolute_time
        .cmp(&b.absolute_time)
        .then_with(|| b.is_note_end().cmp(&a.is_note_end()))
}

/// Stable sort into emission order
pub fn sort_events(events: &mut [RawMidiEvent]) {
    events.sort_by(compare_events);
}
