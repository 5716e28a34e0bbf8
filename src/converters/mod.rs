//! Format converters
//!
//! This module contains the MIDI to SEQ converter.

pub mod midi_to_seq;

// Re-export for convenience
pub use midi_to_seq::{
    convert_file,
    convert_midi_to_seq,
    ConversionError,
    ConversionReport,
    ConversionResult,
    ConversionSettings,
    ParseError,
};
