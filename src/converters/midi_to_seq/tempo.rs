use crate::converters::midi_to_seq::model::{RawMidiEvent, TempoEvent};

/// Rebuild the tempo track as the two segments a SEQ song loops over
///
/// The first entry covers the lead-in up to the first channel event, the
/// second runs from there to the last event and is the loop body. Both keep
/// the first recorded tempo; later tempo changes cannot be represented and are
/// dropped. `events` must already be sorted.
pub fn synthesize_tempo_track(tempo_events: &[TempoEvent], events: &[RawMidiEvent]) -> Vec<TempoEvent> {
    let Some(first) = tempo_events.first() else {
        return Vec::new();
    };

    if tempo_events.len() > 1 {
        log::warn!(
            "Song has {} tempo changes; only the first ({} us per beat) is kept",
            tempo_events.len(),
            first.mspb
        );
    }

    let first_musical_time = events
        .iter()
        .find(|event| !event.is_meta())
        .map_or(0, |event| event.absolute_time);
    let total_time = events.last().map_or(0, |event| event.absolute_time);

    vec![
        TempoEvent {
            step_time: first_musical_time,
            mspb: first.mspb,
        },
        TempoEvent {
            step_time: total_time.saturating_sub(first_musical_time),
            mspb: first.mspb,
        },
    ]
}
