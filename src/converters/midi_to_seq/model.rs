/// In-memory event model for MIDI → SEQ conversion
///
/// Events live in a single arena (`Vec<RawMidiEvent>`) that each pipeline
/// stage owns in turn: the reader fills it, the gate pass mutates it in place,
/// the sorter reorders it and the writer only reads it.

use serde::Serialize;

pub const STATUS_NOTE_OFF: u8 = 0x80;
pub const STATUS_NOTE_ON: u8 = 0x90;
pub const STATUS_POLY_AFTERTOUCH: u8 = 0xA0;
pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;
pub const STATUS_PROGRAM_CHANGE: u8 = 0xC0;
pub const STATUS_CHANNEL_PRESSURE: u8 = 0xD0;
pub const STATUS_PITCH_BEND: u8 = 0xE0;
pub const STATUS_SYSTEM: u8 = 0xF0;
pub const STATUS_META: u8 = 0xFF;

pub const META_SET_TEMPO: u8 = 0x51;

/// Tempo events past this count are not recorded
pub const MAX_TEMPO_EVENTS: usize = 255;

/// Header chunk of a Standard MIDI File
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MidiHeader {
    pub header_length: u32,
    pub format: u16,
    pub num_tracks: u16,
    pub division: u16, // Ticks per quarter note
}

/// A channel event read from the track, with running status resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMidiEvent {
    pub absolute_time: u32, // Cumulative ticks from track start
    pub status: u8,         // Event type nibble + channel nibble
    pub data1: u8,
    pub data2: u8,
    pub gate_time: u32, // Sounding duration, only set on paired Note-On events
    pub removed: bool,  // Note-Off consumed by the gate pass, never emitted
}

impl RawMidiEvent {
    pub fn new(absolute_time: u32, status: u8, data1: u8, data2: u8) -> Self {
        Self {
            absolute_time,
            status,
            data1,
            data2,
            gate_time: 0,
            removed: false,
        }
    }

    pub fn event_type(&self) -> u8 {
        self.status & 0xF0
    }

    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    pub fn is_meta(&self) -> bool {
        self.status == STATUS_META
    }

    /// Note-On carrying a non-zero velocity
    pub fn is_note_start(&self) -> bool {
        self.event_type() == STATUS_NOTE_ON && self.data2 > 0
    }

    /// Note-Off, or Note-On with velocity 0
    pub fn is_note_end(&self) -> bool {
        match self.event_type() {
            STATUS_NOTE_OFF => true,
            STATUS_NOTE_ON => self.data2 == 0,
            _ => false,
        }
    }
}

/// A Set Tempo change as recorded from the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TempoEvent {
    pub step_time: u32, // Ticks since the previous tempo event
    pub mspb: u32,      // Microseconds per quarter note
}

/// Song header of a SEQ bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeqHeader {
    pub resolution: u16,
    pub num_tempo_events: u16,
    pub data_offset: u16,       // From song header start to the event track
    pub tempo_loop_offset: u16, // From song header start to the loop tempo entry
}

impl SeqHeader {
    pub const SIZE: u16 = 8;
    pub const TEMPO_ENTRY_SIZE: u16 = 8;

    /// Lay out a header for `num_tempo_events` tempo entries
    pub fn new(resolution: u16, num_tempo_events: u16) -> Self {
        let tempo_loop_offset = if num_tempo_events > 0 {
            // Second tempo entry, the loopable body of the song
            Self::SIZE + Self::TEMPO_ENTRY_SIZE
        } else {
            0
        };
        Self {
            resolution,
            num_tempo_events,
            data_offset: Self::SIZE + num_tempo_events * Self::TEMPO_ENTRY_SIZE,
            tempo_loop_offset,
        }
    }
}

/// Everything the SEQ writer needs for one song
#[derive(Debug, Clone)]
pub struct SeqSong {
    pub header: SeqHeader,
    pub tempo_track: Vec<TempoEvent>,
    pub events: Vec<RawMidiEvent>, // Sorted, removed events still present
}

/// Result of reading the header and track chunk of a MIDI file
#[derive(Debug, Clone)]
pub struct ParsedTrack {
    pub header: MidiHeader,
    pub events: Vec<RawMidiEvent>,
    pub tempo_events: Vec<TempoEvent>,
    pub tempo_events_dropped: usize, // Set Tempo metas past MAX_TEMPO_EVENTS
    pub skipped: Vec<SkippedElement>,
}

/// Something in the input that did not make it into the SEQ output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedElement {
    pub element_type: String,
    pub tick: u32,
    pub reason: String,
}

impl SkippedElement {
    pub fn new(element_type: impl Into<String>, tick: u32, reason: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            tick,
            reason: reason.into(),
        }
    }
}
