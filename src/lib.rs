//! MIDI to SEQ converter
//!
//! Converts single-track, format-0 Standard MIDI Files into the SEQ bank
//! format read by a fixed-function sequencer sound driver.

pub mod converters;
pub mod fixtures;
pub mod inspect;

// Re-export commonly used types
pub use converters::{
    convert_file, convert_midi_to_seq, ConversionError, ConversionReport, ConversionResult,
    ConversionSettings, ParseError,
};
pub use inspect::{disassemble, InspectError, SeqDump, SeqRecord};
