//! SEQ bank disassembler
//!
//! Reads a bank written by the converter back into headers and records, with
//! extension opcodes and overflow flags folded back into plain tick values.
//!
//! Event track bytes 0x83 and 0x88–0x8F are always read as opcodes. A raw
//! Note-Off status that shares one of those values cannot be told apart from
//! them and is not recoverable.

use crate::converters::midi_to_seq::{
    bytes::ByteCursor,
    model::{SeqHeader, TempoEvent, STATUS_CONTROL_CHANGE, STATUS_POLY_AFTERTOUCH},
    vlq::{gate_extension_value, step_extension_value, OP_END_OF_TRACK},
};
use serde::Serialize;
use thiserror::Error;

const NOTE_DELTA_OVERFLOW: u8 = 0x20;
const NOTE_GATE_OVERFLOW: u8 = 0x40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    #[error("SEQ data ends early at offset {offset}")]
    Truncated { offset: usize },

    #[error("song offset {0} lies outside the bank")]
    BadSongOffset(u32),

    #[error("event track offset {0} lies outside the bank")]
    BadDataOffset(usize),
}

/// A decoded SEQ bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeqDump {
    pub song_count: u16,
    pub song_offset: u32,
    pub header: SeqHeader,
    pub tempo_track: Vec<TempoEvent>,
    pub records: Vec<SeqRecord>,
    pub end_offset: usize, // Bank offset of the 0x83 terminator
}

/// One event track record; `time` is absolute, `delta` includes extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeqRecord {
    NoteOn {
        time: u32,
        delta: u32,
        channel: u8,
        key: u8,
        velocity: u8,
        gate: u32,
    },
    Event {
        time: u32,
        delta: u32,
        status: u8,
        data: Vec<u8>,
    },
}

impl SeqRecord {
    pub fn time(&self) -> u32 {
        match self {
            SeqRecord::NoteOn { time, .. } | SeqRecord::Event { time, .. } => *time,
        }
    }
}

/// Decode a SEQ bank
pub fn disassemble(bank: &[u8]) -> Result<SeqDump, InspectError> {
    let mut cursor = ByteCursor::new(bank);
    let song_count = read_u16(&mut cursor)?;
    let song_offset = read_u32(&mut cursor)?;

    let song_start = song_offset as usize;
    if song_start > bank.len() {
        return Err(InspectError::BadSongOffset(song_offset));
    }
    let mut song = ByteCursor::new(bank);
    song.skip(song_start);

    let header = SeqHeader {
        resolution: read_u16(&mut song)?,
        num_tempo_events: read_u16(&mut song)?,
        data_offset: read_u16(&mut song)?,
        tempo_loop_offset: read_u16(&mut song)?,
    };

    let mut tempo_track = Vec::with_capacity(header.num_tempo_events as usize);
    for _ in 0..header.num_tempo_events {
        tempo_track.push(TempoEvent {
            step_time: read_u32(&mut song)?,
            mspb: read_u32(&mut song)?,
        });
    }

    let data_start = song_start + header.data_offset as usize;
    if data_start > bank.len() {
        return Err(InspectError::BadDataOffset(data_start));
    }
    let mut track = ByteCursor::new(bank);
    track.skip(data_start);
    let records = read_records(&mut track)?;

    Ok(SeqDump {
        song_count,
        song_offset,
        header,
        tempo_track,
        records,
        end_offset: track.position() - 1,
    })
}

fn read_records(cursor: &mut ByteCursor<'_>) -> Result<Vec<SeqRecord>, InspectError> {
    let mut records = Vec::new();
    let mut time = 0u32;
    let mut delta_ext = 0u32;
    let mut gate_ext = 0u32;

    loop {
        let byte = read_u8(cursor)?;
        if byte == OP_END_OF_TRACK {
            return Ok(records);
        }
        if let Some(ticks) = step_extension_value(byte) {
            delta_ext += ticks;
            continue;
        }
        if let Some(ticks) = gate_extension_value(byte) {
            gate_ext += ticks;
            continue;
        }

        let record = if byte & 0x80 == 0 {
            let key = read_u8(cursor)?;
            let velocity = read_u8(cursor)?;
            let gate = gate_ext + u32::from(read_u8(cursor)?) + overflow(byte, NOTE_GATE_OVERFLOW);
            let delta = delta_ext + u32::from(read_u8(cursor)?) + overflow(byte, NOTE_DELTA_OVERFLOW);
            time += delta;
            SeqRecord::NoteOn {
                time,
                delta,
                channel: byte & 0x0F,
                key,
                velocity,
                gate,
            }
        } else {
            let data_len = match byte & 0xF0 {
                STATUS_CONTROL_CHANGE | STATUS_POLY_AFTERTOUCH => 2,
                _ => 1,
            };
            let mut data = Vec::with_capacity(data_len);
            for _ in 0..data_len {
                data.push(read_u8(cursor)?);
            }
            let delta = delta_ext + u32::from(read_u8(cursor)?);
            time += delta;
            SeqRecord::Event {
                time,
                delta,
                status: byte,
                data,
            }
        };

        records.push(record);
        delta_ext = 0;
        gate_ext = 0;
    }
}

fn overflow(control: u8, flag: u8) -> u32 {
    if control & flag != 0 {
        256
    } else {
        0
    }
}

fn read_u8(cursor: &mut ByteCursor<'_>) -> Result<u8, InspectError> {
    let offset = cursor.position();
    cursor.read_u8().ok_or(InspectError::Truncated { offset })
}

fn read_u16(cursor: &mut ByteCursor<'_>) -> Result<u16, InspectError> {
    let offset = cursor.position();
    cursor.read_u16_be().ok_or(InspectError::Truncated { offset })
}

fn read_u32(cursor: &mut ByteCursor<'_>) -> Result<u32, InspectError> {
    let offset = cursor.position();
    cursor.read_u32_be().ok_or(InspectError::Truncated { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_BANK: [u8; 15] = [
        0x00, 0x01, 0x00, 0x00, 0x00, 0x06, // bank
        0x01, 0xE0, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, // header
        0x83,
    ];

    #[test]
    fn test_empty_song() {
        let dump = disassemble(&EMPTY_BANK).unwrap();
        assert_eq!(dump.song_count, 1);
        assert_eq!(dump.song_offset, 6);
        assert_eq!(dump.header, SeqHeader::new(480, 0));
        assert!(dump.tempo_track.is_empty());
        assert!(dump.records.is_empty());
        assert_eq!(dump.end_offset, 14);
    }

    #[test]
    fn test_note_on_flags_and_extensions() {
        let mut bank = EMPTY_BANK[..14].to_vec();
        bank.extend_from_slice(&[0x8F, 0x8D, 0x8B, 0x88, 0x63, 60, 100, 10, 20, 0x83]);
        let dump = disassemble(&bank).unwrap();

        assert_eq!(
            dump.records,
            vec![SeqRecord::NoteOn {
                time: 4096 + 512 + 256 + 20,
                delta: 4096 + 512 + 256 + 20,
                channel: 3,
                key: 60,
                velocity: 100,
                gate: 8192 + 512 + 256 + 10,
            }]
        );
    }

    #[test]
    fn test_channel_events() {
        let mut bank = EMPTY_BANK[..14].to_vec();
        bank.extend_from_slice(&[0xC1, 40, 0, 0x8C, 0xB1, 7, 90, 4, 0xE1, 0x60, 0, 0x83]);
        let dump = disassemble(&bank).unwrap();

        assert_eq!(dump.records.len(), 3);
        assert_eq!(
            dump.records[1],
            SeqRecord::Event {
                time: 260,
                delta: 260,
                status: 0xB1,
                data: vec![7, 90],
            }
        );
        assert_eq!(dump.records[2].time(), 260);
    }

    #[test]
    fn test_missing_terminator() {
        let bank = &EMPTY_BANK[..14];
        assert_eq!(disassemble(bank), Err(InspectError::Truncated { offset: 14 }));
    }

    #[test]
    fn test_bad_song_offset() {
        let mut bank = EMPTY_BANK.to_vec();
        bank[5] = 0x40;
        assert_eq!(disassemble(&bank), Err(InspectError::BadSongOffset(0x40)));
    }
}
