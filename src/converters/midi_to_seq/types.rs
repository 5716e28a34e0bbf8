//! Settings and results of a conversion run

use crate::converters::midi_to_seq::model::{SkippedElement, MAX_TEMPO_EVENTS};
use serde::Serialize;

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSettings {
    /// SEQ resolution to write instead of the MIDI division (`None` or 0 keeps it)
    pub resolution: Option<u16>,
    /// Set Tempo events recorded before further ones are ignored
    pub max_tempo_events: usize,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            resolution: None,
            max_tempo_events: MAX_TEMPO_EVENTS,
        }
    }
}

/// What happened to the input during conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub division: u16,
    pub resolution: u16,
    pub events_read: usize,
    pub events_written: usize,
    pub notes_paired: usize,
    pub notes_retriggered: usize,
    pub orphan_note_offs: usize,
    pub unterminated_notes: usize,
    pub tempo_events_read: usize,
    /// Tempo changes after the first, lost when the track is collapsed
    pub tempo_changes_discarded: usize,
    /// Set Tempo events past the recording limit
    pub tempo_events_dropped: usize,
    pub tempo_events_written: usize,
    pub output_bytes: usize,
    pub skipped_elements: Vec<SkippedElement>,
}

/// A finished conversion: the SEQ bank plus its report
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub seq: Vec<u8>,
    pub report: ConversionReport,
}
