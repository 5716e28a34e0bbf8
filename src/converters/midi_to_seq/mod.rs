//! Standard MIDI File to SEQ converter
//!
//! Turns a format-0 MIDI file into a single-song SEQ bank for the sound
//! driver.
//!
//! # Overview
//!
//! The conversion is a batch pipeline over one in-memory event list:
//! 1. **Read**: decode the track into channel events and tempo changes
//! 2. **Gate**: pair Note-On/Note-Off events into gate times
//! 3. **Sort**: time order, note ends first within a tick
//! 4. **Tempo**: collapse the tempo changes into the two-entry loop track
//! 5. **Write**: emit the bank header, song header, tempo and event tracks
//!
//! # Basic Usage
//!
//! ```ignore
//! use mid2seq::converters::midi_to_seq::{convert_midi_to_seq, ConversionSettings};
//!
//! let midi = std::fs::read("song.mid")?;
//! let result = convert_midi_to_seq(&midi, &ConversionSettings::default())?;
//! std::fs::write("song.seq", &result.seq)?;
//! ```

pub mod bytes;
pub mod errors;
pub mod gate;
pub mod model;
pub mod reader;
pub mod sort;
pub mod tempo;
pub mod types;
pub mod vlq;
pub mod write;

pub use errors::{ConversionError, ParseError, Result};
pub use model::*;
pub use reader::read_midi;
pub use types::{ConversionReport, ConversionResult, ConversionSettings};
pub use write::write_seq;

use std::path::Path;

/// Convert MIDI file bytes into SEQ bank bytes
pub fn convert_midi_to_seq(midi: &[u8], settings: &ConversionSettings) -> Result<ConversionResult> {
    let parsed = read_midi(midi, settings.max_tempo_events)?;
    let mut events = parsed.events;

    let gates = gate::calculate_gates(&mut events);
    sort::sort_events(&mut events);
    let tempo_track = tempo::synthesize_tempo_track(&parsed.tempo_events, &events);

    let resolution = match settings.resolution {
        Some(resolution) if resolution != 0 => resolution,
        _ => parsed.header.division,
    };
    let song = SeqSong {
        header: SeqHeader::new(resolution, tempo_track.len() as u16),
        tempo_track,
        events,
    };

    let mut seq = Vec::new();
    write_seq(&song, &mut seq);

    let report = ConversionReport {
        division: parsed.header.division,
        resolution,
        events_read: song.events.len(),
        events_written: song.events.iter().filter(|event| !event.removed).count(),
        notes_paired: gates.paired,
        notes_retriggered: gates.retriggered,
        orphan_note_offs: gates.orphan_ends,
        unterminated_notes: gates.unterminated,
        tempo_events_read: parsed.tempo_events.len(),
        tempo_changes_discarded: parsed.tempo_events.len().saturating_sub(1),
        tempo_events_dropped: parsed.tempo_events_dropped,
        tempo_events_written: song.tempo_track.len(),
        output_bytes: seq.len(),
        skipped_elements: parsed.skipped,
    };

    log::info!(
        "Converted {} events ({} written) into {} bytes",
        report.events_read,
        report.events_written,
        report.output_bytes
    );

    Ok(ConversionResult { seq, report })
}

/// Convert the MIDI file at `input` and write the SEQ bank to `output`
pub fn convert_file(input: &Path, output: &Path, settings: &ConversionSettings) -> Result<ConversionResult> {
    let midi = std::fs::read(input).map_err(|source| ConversionError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;

    let result = convert_midi_to_seq(&midi, settings)?;

    std::fs::write(output, &result.seq).map_err(|source| ConversionError::WriteOutput {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(result)
}
