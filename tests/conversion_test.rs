// MIDI → SEQ conversion tests
//
// Runs the reference fixtures and hand-built tracks through the whole
// pipeline and reads the result back with the disassembler.

use mid2seq::fixtures::{self, reference_fixtures, DEFAULT_TEMPO_MSPB};
use mid2seq::{convert_midi_to_seq, disassemble, ConversionSettings, SeqDump, SeqRecord};
use midly::{MidiMessage, Smf, TrackEventKind};
use std::collections::HashMap;

fn fixture(name: &str) -> Vec<u8> {
    reference_fixtures()
        .expect("fixtures should build")
        .into_iter()
        .find(|f| f.file_name == name)
        .unwrap_or_else(|| panic!("no fixture named {}", name))
        .bytes
}

fn convert(midi: &[u8]) -> Vec<u8> {
    convert_midi_to_seq(midi, &ConversionSettings::default())
        .expect("conversion should succeed")
        .seq
}

/// Event track bytes of a bank with `tempo_count` tempo entries
fn event_track(seq: &[u8], tempo_count: usize) -> &[u8] {
    &seq[14 + tempo_count * 8..]
}

fn smf(track: &[u8]) -> Vec<u8> {
    let mut data = b"MThd\0\0\0\x06\0\0\0\x01\x01\xE0MTrk".to_vec();
    data.extend_from_slice(&(track.len() as u32).to_be_bytes());
    data.extend_from_slice(track);
    data
}

/// (start, gate) of every Note-On, worked out independently with midly
fn expected_gates(midi: &[u8]) -> Vec<(u32, u32)> {
    let smf = Smf::parse(midi).expect("fixture should parse");
    let mut time = 0u32;
    let mut sounding: HashMap<(u8, u8), usize> = HashMap::new();
    let mut notes: Vec<(u32, u32)> = Vec::new();

    for event in &smf.tracks[0] {
        time += event.delta.as_int();
        if let TrackEventKind::Midi { channel, message } = event.kind {
            let (key, starts) = match message {
                MidiMessage::NoteOn { key, vel } => (key.as_int(), vel.as_int() > 0),
                MidiMessage::NoteOff { key, .. } => (key.as_int(), false),
                _ => continue,
            };
            let slot = (channel.as_int(), key);
            if let Some(index) = sounding.remove(&slot) {
                notes[index].1 = time - notes[index].0;
            }
            if starts {
                sounding.insert(slot, notes.len());
                notes.push((time, 0));
            }
        }
    }
    notes.sort_by_key(|&(start, _)| start);
    notes
}

fn note_gates(dump: &SeqDump) -> Vec<(u32, u32)> {
    dump.records
        .iter()
        .filter_map(|record| match record {
            SeqRecord::NoteOn { time, gate, .. } => Some((*time, *gate)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_all_fixtures_end_with_single_terminator() {
    for fixture in reference_fixtures().unwrap() {
        let seq = convert(&fixture.bytes);
        let dump = disassemble(&seq).unwrap();
        assert_eq!(dump.end_offset, seq.len() - 1, "{}", fixture.file_name);
        assert_eq!(seq.last(), Some(&0x83));
    }
}

#[test]
fn test_all_fixtures_gates_match_note_lengths() {
    for fixture in reference_fixtures().unwrap() {
        let dump = disassemble(&convert(&fixture.bytes)).unwrap();
        assert_eq!(
            note_gates(&dump),
            expected_gates(&fixture.bytes),
            "{}",
            fixture.file_name
        );
    }
}

#[test]
fn test_all_fixtures_have_two_tempo_entries() {
    for fixture in reference_fixtures().unwrap() {
        let dump = disassemble(&convert(&fixture.bytes)).unwrap();
        assert_eq!(dump.header.num_tempo_events, 2);
        assert_eq!(dump.header.data_offset, 24);
        assert_eq!(dump.header.tempo_loop_offset, 16);
        assert!(dump.tempo_track.iter().all(|t| t.mspb == DEFAULT_TEMPO_MSPB));
    }
}

#[test]
fn test_short_long() {
    let seq = convert(&fixture("test_short_long.mid"));
    let dump = disassemble(&seq).unwrap();

    assert_eq!(dump.header.resolution, 480);
    assert_eq!(dump.tempo_track[0].step_time, 0);
    assert_eq!(dump.tempo_track[1].step_time, 1560);
    assert_eq!(
        event_track(&seq, 2),
        &[
            0x00, 60, 100, 120, 0, // staccato note
            0x8D, 0x88, 0x40, 62, 100, 192, 88, // 600 ticks later, gate 960
            0x83,
        ]
    );
}

#[test]
fn test_overlapping() {
    let dump = disassemble(&convert(&fixture("test_overlapping.mid"))).unwrap();
    assert_eq!(note_gates(&dump), vec![(0, 480), (480, 480)]);
}

#[test]
fn test_large_delta() {
    let seq = convert(&fixture("test_large_delta.mid"));
    assert_eq!(
        event_track(&seq, 2),
        &[
            0x40, 60, 100, 224, 0, // gate 480
            0x8F, 0x8D, 0x8D, 0x40, 62, 100, 224, 160, // delta 5280
            0x83,
        ]
    );
}

#[test]
fn test_large_gate() {
    let seq = convert(&fixture("test_large_gate.mid"));
    assert_eq!(event_track(&seq, 2), &[0x8A, 0x88, 0x00, 60, 100, 192, 0, 0x83]);
}

#[test]
fn test_mid_range_time() {
    let seq = convert(&fixture("test_mid_range_time.mid"));
    assert_eq!(
        event_track(&seq, 2),
        &[
            0x40, 60, 100, 44, 0, // gate 300
            0x8D, 0x40, 62, 100, 224, 188, // delta 700, gate 480
            0x83,
        ]
    );
}

#[test]
fn test_program_change() {
    let dump = disassemble(&convert(&fixture("test_program_change.mid"))).unwrap();
    let programs: Vec<(u32, Vec<u8>)> = dump
        .records
        .iter()
        .filter_map(|record| match record {
            SeqRecord::Event { time, status: 0xC0, data, .. } => Some((*time, data.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(programs, vec![(0, vec![0]), (480, vec![40])]);
    assert_eq!(note_gates(&dump), vec![(0, 480), (960, 480)]);
}

#[test]
fn test_control_change() {
    let seq = convert(&fixture("test_control_change.mid"));
    assert_eq!(
        event_track(&seq, 2),
        &[
            0xB0, 10, 0, 0, // pan left
            0x88, 0x40, 60, 100, 192, 0, // gate 960
            0xB0, 7, 80, 240, // volume
            0xB0, 10, 127, 240, // pan right
            0x83,
        ]
    );
}

#[test]
fn test_pitch_bend() {
    let seq = convert(&fixture("test_pitch_bend.mid"));
    assert_eq!(
        event_track(&seq, 2),
        &[
            0x88, 0x40, 60, 100, 192, 0, // gate 960
            0xE0, 0x60, 240, // bend up, MSB only
            0xE0, 0x40, 240, // center
            0x83,
        ]
    );
}

#[test]
fn test_multi_channel() {
    let seq = convert(&fixture("test_multi_channel.mid"));
    assert_eq!(
        event_track(&seq, 2),
        &[
            0xC0, 0, 0, // piano
            0x88, 0x40, 60, 100, 192, 0, // channel 0 note
            0xC1, 33, 0, // bass
            0x88, 0x41, 48, 110, 192, 0, // channel 1 note
            0x83,
        ]
    );
}

#[test]
fn test_initial_silence() {
    let seq = convert(&fixture("test_initial_silence.mid"));
    let dump = disassemble(&seq).unwrap();

    assert_eq!(dump.tempo_track[0].step_time, 1920);
    assert_eq!(dump.tempo_track[1].step_time, 480);
    assert_eq!(
        event_track(&seq, 2),
        &[0x8D, 0x8D, 0x8D, 0x60, 60, 100, 224, 128, 0x83]
    );
}

#[test]
fn test_no_tempo_means_empty_tempo_track() {
    let seq = convert(&smf(&[0x00, 0x90, 60, 100, 0x83, 0x60, 0x80, 60, 0]));
    let dump = disassemble(&seq).unwrap();

    assert_eq!(dump.header.num_tempo_events, 0);
    assert_eq!(dump.header.tempo_loop_offset, 0);
    assert_eq!(dump.header.data_offset, 8);
    assert_eq!(
        dump.records,
        vec![SeqRecord::NoteOn {
            time: 0,
            delta: 0,
            channel: 0,
            key: 60,
            velocity: 100,
            gate: 480,
        }]
    );
}

#[test]
fn test_tempo_changes_collapse_to_first() {
    let track = fixtures::build_smf(vec![
        fixtures::note_on(0, 0, 60, 100),
        fixtures::note_off(480, 0, 60),
    ])
    .unwrap();
    // Append a second tempo change in front of End of Track by hand
    let mut events = track[22..track.len() - 4].to_vec();
    events.extend_from_slice(&[0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, 0x00, 0xFF, 0x2F, 0x00]);

    let result = convert_midi_to_seq(&smf(&events), &ConversionSettings::default()).unwrap();
    let dump = disassemble(&result.seq).unwrap();

    assert_eq!(dump.tempo_track.len(), 2);
    assert!(dump.tempo_track.iter().all(|t| t.mspb == DEFAULT_TEMPO_MSPB));
    assert_eq!(result.report.tempo_events_read, 2);
    assert_eq!(result.report.tempo_changes_discarded, 1);
}

#[test]
fn test_delta_600_between_channel_events() {
    let seq = convert(&smf(&[0x00, 0xC0, 5, 0x84, 0x58, 0xB0, 7, 80]));
    assert_eq!(event_track(&seq, 0), &[0xC0, 5, 0, 0x8D, 0xB0, 7, 80, 88, 0x83]);
}

#[test]
fn test_long_gates_round_trip() {
    for gate in [255u32, 256, 511, 512, 4095, 4096, 8191, 8192, 9000, 20_000, 100_000] {
        let mut track = vec![0x00, 0x90, 64, 90];
        // Variable-length delta for the Note-Off
        let mut vlq = vec![(gate & 0x7F) as u8];
        let mut rest = gate >> 7;
        while rest > 0 {
            vlq.insert(0, (rest & 0x7F) as u8 | 0x80);
            rest >>= 7;
        }
        track.extend(vlq);
        track.extend_from_slice(&[0x80, 64, 0]);

        let dump = disassemble(&convert(&smf(&track))).unwrap();
        assert_eq!(note_gates(&dump), vec![(0, gate)], "gate {}", gate);
    }
}

#[test]
fn test_simultaneous_note_off_sorts_first() {
    // Note-Off and the next Note-On on another key share a tick
    let seq = convert(&smf(&[
        0x00, 0x90, 60, 100, //
        0x60, 0x90, 62, 100, //
        0x00, 0x80, 60, 0, //
        0x60, 0x80, 62, 0,
    ]));
    let dump = disassemble(&seq).unwrap();
    assert_eq!(note_gates(&dump), vec![(0, 96), (96, 96)]);
}

#[test]
fn test_unterminated_note_has_zero_gate() {
    let result = convert_midi_to_seq(&smf(&[0x00, 0x90, 60, 100]), &ConversionSettings::default()).unwrap();
    assert_eq!(event_track(&result.seq, 0), &[0x00, 60, 100, 0, 0, 0x83]);
    assert_eq!(result.report.unterminated_notes, 1);
}

#[test]
fn test_report_lists_skipped_meta_events() {
    let result = convert_midi_to_seq(
        &smf(&[0x00, 0xFF, 0x03, 0x02, b'H', b'i', 0x00, 0x90, 60, 100]),
        &ConversionSettings::default(),
    )
    .unwrap();

    assert_eq!(result.report.skipped_elements.len(), 1);
    assert_eq!(result.report.skipped_elements[0].element_type, "meta event");

    let json = serde_json::to_value(&result.report).unwrap();
    assert_eq!(json["events_written"], 1);
    assert_eq!(json["skipped_elements"][0]["tick"], 0);
}
