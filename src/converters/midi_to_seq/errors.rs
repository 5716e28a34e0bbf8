//! Error types for MIDI → SEQ conversion
//!
//! Every error is fatal for the run. Malformed track content inside a
//! supported file is tolerated by the reader and never surfaces here.

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level conversion error type
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The MIDI header could not be accepted
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The event buffer for the track could not be allocated
    #[error("Failed to allocate memory for events: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// The input MIDI file could not be read
    #[error("Error opening MIDI file {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output SEQ file could not be created or written
    #[error("Error creating SEQ file {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fatal MIDI header errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer bytes than a header chunk needs
    #[error("MIDI file is too short to hold a header ({0} bytes)")]
    TruncatedHeader(usize),

    /// Only single-track format 0 files are converted
    #[error("This program only supports MIDI format 0 (found format {0}).")]
    UnsupportedFormat(u16),

    /// The header is followed by no track chunk header
    #[error("MIDI file has no track chunk")]
    MissingTrack,
}

pub type Result<T> = std::result::Result<T, ConversionError>;
