use crate::converters::midi_to_seq::{
    model::*,
    vlq::{write_gate_extensions, write_step_extensions, OP_END_OF_TRACK, OP_STEP_EXTEND_256},
};

/// Songs in the bank; the converter always writes exactly one
const BANK_SONG_COUNT: u16 = 1;
/// Song header offset, right after the 6-byte bank header
const BANK_SONG_OFFSET: u32 = 6;

/// Note-On control byte flag: delta carries an extra 256 ticks
const NOTE_DELTA_OVERFLOW: u8 = 0x20;
/// Note-On control byte flag: gate carries an extra 256 ticks
const NOTE_GATE_OVERFLOW: u8 = 0x40;

/// Write a single-song SEQ bank
pub fn write_seq(song: &SeqSong, out: &mut Vec<u8>) {
    write_bank_header(out);
    write_seq_header(&song.header, out);
    write_tempo_track(&song.tempo_track, out);
    write_event_track(&song.events, out);
}

fn write_bank_header(out: &mut Vec<u8>) {
    out.extend_from_slice(&BANK_SONG_COUNT.to_be_bytes());
    out.extend_from_slice(&BANK_SONG_OFFSET.to_be_bytes());
}

fn write_seq_header(header: &SeqHeader, out: &mut Vec<u8>) {
    out.extend_from_slice(&header.resolution.to_be_bytes());
    out.extend_from_slice(&header.num_tempo_events.to_be_bytes());
    out.extend_from_slice(&header.data_offset.to_be_bytes());
    out.extend_from_slice(&header.tempo_loop_offset.to_be_bytes());
}

fn write_tempo_track(tempo_track: &[TempoEvent], out: &mut Vec<u8>) {
    for tempo in tempo_track {
        out.extend_from_slice(&tempo.step_time.to_be_bytes());
        out.extend_from_slice(&tempo.mspb.to_be_bytes());
    }
}

/// Write the event track, skipping removed events, and its terminator
pub fn write_event_track(events: &[RawMidiEvent], out: &mut Vec<u8>) {
    let mut last_event_time = 0u32;

    for event in events.iter().filter(|event| !event.removed) {
        let delta = event.absolute_time.saturating_sub(last_event_time);
        last_event_time = event.absolute_time;

        let delta = write_step_extensions(out, delta);
        if event.event_type() == STATUS_NOTE_ON {
            write_note_on(event, delta, out);
        } else {
            write_channel_event(event, delta, out);
        }
    }

    out.push(OP_END_OF_TRACK);
}

fn write_note_on(event: &RawMidiEvent, mut delta: u32, out: &mut Vec<u8>) {
    let mut gate = write_gate_extensions(out, event.gate_time);

    let mut control = event.channel();
    if delta >= 256 {
        control |= NOTE_DELTA_OVERFLOW;
        delta -= 256;
    }
    if gate >= 256 {
        control |= NOTE_GATE_OVERFLOW;
        gate -= 256;
    }

    out.extend_from_slice(&[control, event.data1, event.data2, gate as u8, delta as u8]);
}

fn write_channel_event(event: &RawMidiEvent, mut delta: u32, out: &mut Vec<u8>) {
    while delta >= 256 {
        out.push(OP_STEP_EXTEND_256);
        delta -= 256;
    }

    out.push(event.status);
    match event.event_type() {
        STATUS_CONTROL_CHANGE | STATUS_POLY_AFTERTOUCH => {
            out.extend_from_slice(&[event.data1, event.data2]);
        }
        // Only the coarse (MSB) half of the bend survives
        STATUS_PITCH_BEND => out.push(event.data2),
        // Program change, channel pressure, unpaired Note-Off
        _ => out.push(event.data1),
    }
    out.push(delta as u8);
}
