use crate::converters::midi_to_seq::{
    bytes::ByteCursor, model::*, vlq::read_variable_length, ConversionError, ParseError, Result,
};

const HEADER_CHUNK_ID: &[u8; 4] = b"MThd";
const TRACK_CHUNK_ID: &[u8; 4] = b"MTrk";
const HEADER_DATA_LEN: u32 = 6;
const META_END_OF_TRACK: u8 = 0x2F;

/// Parse a format-0 MIDI file into its channel events and tempo changes
///
/// Only the header is validated. Inside the track chunk the reader is
/// permissive: an event cut short by the end of the data ends the track.
pub fn read_midi(data: &[u8], max_tempo_events: usize) -> Result<ParsedTrack> {
    let mut cursor = ByteCursor::new(data);
    let header = read_header(&mut cursor)?;

    if header.format != 0 {
        return Err(ParseError::UnsupportedFormat(header.format).into());
    }
    if header.num_tracks != 1 {
        log::warn!(
            "Format 0 file declares {} tracks, only the first is read",
            header.num_tracks
        );
    }

    let track_length = read_track_header(&mut cursor)?;
    let track = cursor.take(track_length as usize);
    if track.remaining() < track_length as usize {
        log::warn!(
            "Track chunk declares {} bytes but only {} are present",
            track_length,
            track.remaining()
        );
    }

    let mut reader = TrackReader::new(track, max_tempo_events)?;
    reader.read_all();

    log::debug!(
        "Read {} channel events and {} tempo events",
        reader.events.len(),
        reader.tempo_events.len()
    );

    Ok(ParsedTrack {
        header,
        events: reader.events,
        tempo_events: reader.tempo_events,
        tempo_events_dropped: reader.tempo_events_dropped,
        skipped: reader.skipped,
    })
}

/// Read the `MThd` chunk
pub fn read_header(cursor: &mut ByteCursor<'_>) -> std::result::Result<MidiHeader, ParseError> {
    let available = cursor.remaining();
    let truncated = || ParseError::TruncatedHeader(available);

    let id: [u8; 4] = cursor.read_array().ok_or_else(truncated)?;
    let header_length = cursor.read_u32_be().ok_or_else(truncated)?;
    let format = cursor.read_u16_be().ok_or_else(truncated)?;
    let num_tracks = cursor.read_u16_be().ok_or_else(truncated)?;
    let division = cursor.read_u16_be().ok_or_else(truncated)?;

    if &id != HEADER_CHUNK_ID {
        log::warn!("Header chunk id is {:?}, expected \"MThd\"", String::from_utf8_lossy(&id));
    }
    if header_length > HEADER_DATA_LEN {
        cursor.skip((header_length - HEADER_DATA_LEN) as usize);
    }

    Ok(MidiHeader {
        header_length,
        format,
        num_tracks,
        division,
    })
}

/// Read the `MTrk` chunk header, returning the track byte length
fn read_track_header(cursor: &mut ByteCursor<'_>) -> std::result::Result<u32, ParseError> {
    let id: [u8; 4] = cursor.read_array().ok_or(ParseError::MissingTrack)?;
    let length = cursor.read_u32_be().ok_or(ParseError::MissingTrack)?;
    if &id != TRACK_CHUNK_ID {
        log::warn!("Track chunk id is {:?}, expected \"MTrk\"", String::from_utf8_lossy(&id));
    }
    Ok(length)
}

struct TrackReader<'a> {
    cursor: ByteCursor<'a>,
    current_time: u32,
    last_status: u8,
    last_tempo_time: u32,
    max_tempo_events: usize,
    events: Vec<RawMidiEvent>,
    tempo_events: Vec<TempoEvent>,
    tempo_events_dropped: usize,
    skipped: Vec<SkippedElement>,
}

impl<'a> TrackReader<'a> {
    fn new(cursor: ByteCursor<'a>, max_tempo_events: usize) -> Result<Self> {
        // Every channel event takes at least two bytes (delta + data)
        let mut events = Vec::new();
        events
            .try_reserve(cursor.remaining() / 2)
            .map_err(ConversionError::OutOfMemory)?;

        Ok(Self {
            cursor,
            current_time: 0,
            last_status: 0,
            last_tempo_time: 0,
            max_tempo_events,
            events,
            tempo_events: Vec::new(),
            tempo_events_dropped: 0,
            skipped: Vec::new(),
        })
    }

    fn read_all(&mut self) {
        while !self.cursor.is_empty() {
            if self.read_event().is_none() {
                log::warn!(
                    "Track data ends inside an event at tick {}, stopping",
                    self.current_time
                );
                self.skip(
                    "truncated event",
                    "track data ends inside the event".to_string(),
                );
                break;
            }
        }
    }

    /// Read one event record. `None` means the data ran out mid-event.
    fn read_event(&mut self) -> Option<()> {
        let delta = read_variable_length(&mut self.cursor);
        self.current_time = self.current_time.saturating_add(delta);

        let status = match self.cursor.peek_u8()? {
            byte if byte & 0x80 != 0 => {
                self.cursor.read_u8();
                byte
            }
            // Running status: the byte is the first data byte, leave it
            _ => self.last_status,
        };

        match status & 0xF0 {
            STATUS_NOTE_OFF | STATUS_NOTE_ON | STATUS_POLY_AFTERTOUCH | STATUS_CONTROL_CHANGE
            | STATUS_PITCH_BEND => {
                let data1 = self.cursor.read_u8()?;
                let data2 = self.cursor.read_u8()?;
                self.push_event(status, data1, data2);
            }
            STATUS_PROGRAM_CHANGE | STATUS_CHANNEL_PRESSURE => {
                let data1 = self.cursor.read_u8()?;
                self.push_event(status, data1, 0);
            }
            STATUS_SYSTEM if status == STATUS_META => self.read_meta()?,
            STATUS_SYSTEM => {
                // SysEx and system messages are not converted; their payload
                // is read as ordinary track data
                self.skip("system event", format!("status {:#04X} is not converted", status));
            }
            // No status yet: the data byte stays put and is read as the next delta
            _ => {
                self.skip(
                    "data byte",
                    "running status used before any status byte".to_string(),
                );
            }
        }

        self.last_status = status;
        Some(())
    }

    fn read_meta(&mut self) -> Option<()> {
        let meta_type = self.cursor.read_u8()?;
        let length = read_variable_length(&mut self.cursor) as usize;

        if meta_type == META_SET_TEMPO {
            if self.tempo_events.len() < self.max_tempo_events {
                let mut payload = self.cursor.take(length);
                self.record_tempo(&mut payload);
                return Some(());
            }
            self.tempo_events_dropped += 1;
            log::warn!(
                "Tempo change at tick {} exceeds the {} event limit, ignoring",
                self.current_time,
                self.max_tempo_events
            );
        } else if meta_type != META_END_OF_TRACK {
            self.skip("meta event", format!("meta type {:#04X} is not converted", meta_type));
        }

        self.cursor.skip(length);
        Some(())
    }

    fn record_tempo(&mut self, payload: &mut ByteCursor<'_>) {
        // 24-bit big-endian microseconds per quarter note
        let mut mspb = 0u32;
        for _ in 0..3 {
            match payload.read_u8() {
                Some(byte) => mspb = (mspb << 8) | u32::from(byte),
                None => break,
            }
        }

        self.tempo_events.push(TempoEvent {
            step_time: self.current_time - self.last_tempo_time,
            mspb,
        });
        self.last_tempo_time = self.current_time;
    }

    fn push_event(&mut self, status: u8, data1: u8, data2: u8) {
        self.events
            .push(RawMidiEvent::new(self.current_time, status, data1, data2));
    }

    fn skip(&mut self, element_type: &str, reason: String) {
        log::debug!("Skipping {} at tick {}: {}", element_type, self.current_time, reason);
        self.skipped
            .push(SkippedElement::new(element_type, self.current_time, reason));
    }
}
