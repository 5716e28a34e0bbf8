//! Reference MIDI files for exercising the converter
//!
//! Each fixture is a format-0 file at 480 ticks per beat that opens with a
//! 120 BPM Set Tempo event and targets one part of the SEQ encoding: gate and
//! step extensions, overflow flags, channel events and the tempo lead-in.

use midly::num::{u14, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, Track, TrackEvent,
    TrackEventKind,
};
use std::io;
use std::path::{Path, PathBuf};

/// Ticks per beat of every fixture
pub const TICKS_PER_BEAT: u16 = 480;

/// 120 BPM in microseconds per beat
pub const DEFAULT_TEMPO_MSPB: u32 = 500_000;

const BEAT: u32 = TICKS_PER_BEAT as u32;

/// A generated MIDI file
#[derive(Debug, Clone)]
pub struct MidiFixture {
    pub file_name: &'static str,
    pub description: &'static str,
    pub bytes: Vec<u8>,
}

/// Build all reference fixtures
pub fn reference_fixtures() -> io::Result<Vec<MidiFixture>> {
    let specs: [(&'static str, &'static str, Track<'static>); 10] = [
        (
            "test_short_long.mid",
            "Short and sustained notes, basic gate times",
            vec![
                note_on(0, 0, 60, 100),
                note_off(BEAT / 4, 0, 60),
                note_on(BEAT, 0, 62, 100),
                note_off(BEAT * 2, 0, 62),
            ],
        ),
        (
            "test_overlapping.mid",
            "A repeated Note-On ends the note already sounding on that key",
            vec![
                note_on(0, 0, 60, 100),
                note_on(BEAT, 0, 60, 100),
                note_off(BEAT, 0, 60),
            ],
        ),
        (
            "test_large_delta.mid",
            "A pause longer than 4096 ticks, step extension opcodes",
            vec![
                note_on(0, 0, 60, 100),
                note_off(BEAT, 0, 60),
                note_on(BEAT * 10, 0, 62, 100),
                note_off(BEAT, 0, 62),
            ],
        ),
        (
            "test_large_gate.mid",
            "A note longer than 4096 ticks, gate extension opcodes",
            vec![note_on(0, 0, 60, 100), note_off(BEAT * 10, 0, 60)],
        ),
        (
            "test_mid_range_time.mid",
            "Gate and delta between 256 and 511, Note-On overflow flags",
            vec![
                note_on(0, 0, 60, 100),
                note_off(300, 0, 60),
                note_on(400, 0, 62, 100),
                note_off(BEAT, 0, 62),
            ],
        ),
        (
            "test_program_change.mid",
            "Instrument switches between notes",
            vec![
                program_change(0, 0, 0),
                note_on(0, 0, 60, 100),
                note_off(BEAT, 0, 60),
                program_change(0, 0, 40),
                note_on(BEAT, 0, 67, 100),
                note_off(BEAT, 0, 67),
            ],
        ),
        (
            "test_control_change.mid",
            "Pan and volume changes under a held note",
            vec![
                control_change(0, 0, 10, 0),
                note_on(0, 0, 60, 100),
                control_change(BEAT / 2, 0, 7, 80),
                control_change(BEAT / 2, 0, 10, 127),
                note_off(BEAT, 0, 60),
            ],
        ),
        (
            "test_pitch_bend.mid",
            "Pitch bend up and back to center",
            vec![
                note_on(0, 0, 60, 100),
                pitch_bend(BEAT / 2, 0, 4096),
                pitch_bend(BEAT / 2, 0, 0),
                note_off(BEAT, 0, 60),
            ],
        ),
        (
            "test_multi_channel.mid",
            "Simultaneous notes on two channels",
            vec![
                program_change(0, 0, 0),
                note_on(0, 0, 60, 100),
                program_change(0, 1, 33),
                note_on(0, 1, 48, 110),
                note_off(BEAT * 2, 0, 60),
                note_off(0, 1, 48),
            ],
        ),
        (
            "test_initial_silence.mid",
            "A rest before the first note, tempo lead-in segment",
            vec![note_on(BEAT * 4, 0, 60, 100), note_off(BEAT, 0, 60)],
        ),
    ];

    specs
        .into_iter()
        .map(|(file_name, description, events)| {
            Ok(MidiFixture {
                file_name,
                description,
                bytes: build_smf(events)?,
            })
        })
        .collect()
}

/// Write every reference fixture into `dir`, creating it if needed
pub fn write_fixtures(dir: &Path) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for fixture in reference_fixtures()? {
        let path = dir.join(fixture.file_name);
        std::fs::write(&path, &fixture.bytes)?;
        log::info!("Generated {}: {}", path.display(), fixture.description);
        written.push(path);
    }
    Ok(written)
}

/// Wrap channel events in a format-0 file with the default tempo up front
pub fn build_smf(events: Track<'_>) -> io::Result<Vec<u8>> {
    let mut track = Vec::with_capacity(events.len() + 2);
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(DEFAULT_TEMPO_MSPB.into())),
    });
    track.extend(events);
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(TICKS_PER_BEAT.into()),
        },
        tracks: vec![track],
    };

    let mut out = Vec::new();
    smf.write(&mut out).map_err(|e| {
        io::Error::new(io::ErrorKind::Other, format!("Failed to write MIDI: {}", e))
    })?;
    Ok(out)
}

fn channel_event(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Midi {
            channel: u4::from(channel),
            message,
        },
    }
}

pub fn note_on(delta: u32, channel: u8, key: u8, vel: u8) -> TrackEvent<'static> {
    channel_event(
        delta,
        channel,
        MidiMessage::NoteOn {
            key: u7::from(key),
            vel: u7::from(vel),
        },
    )
}

pub fn note_off(delta: u32, channel: u8, key: u8) -> TrackEvent<'static> {
    channel_event(
        delta,
        channel,
        MidiMessage::NoteOff {
            key: u7::from(key),
            vel: u7::from(0),
        },
    )
}

pub fn program_change(delta: u32, channel: u8, program: u8) -> TrackEvent<'static> {
    channel_event(
        delta,
        channel,
        MidiMessage::ProgramChange {
            program: u7::from(program),
        },
    )
}

pub fn control_change(delta: u32, channel: u8, controller: u8, value: u8) -> TrackEvent<'static> {
    channel_event(
        delta,
        channel,
        MidiMessage::Controller {
            controller: u7::from(controller),
            value: u7::from(value),
        },
    )
}

/// `bend` is signed around center, -8192..=8191
pub fn pitch_bend(delta: u32, channel: u8, bend: i16) -> TrackEvent<'static> {
    let raw = (i32::from(bend) + 0x2000).clamp(0, 0x3FFF) as u16;
    channel_event(
        delta,
        channel,
        MidiMessage::PitchBend {
            bend: PitchBend(u14::from(raw)),
        },
    )
}
