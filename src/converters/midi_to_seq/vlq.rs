//! Variable-length quantities on both sides of the conversion
//!
//! MIDI stores delta times as 7-bit groups with a continuation bit. SEQ
//! instead caps each record's delta and gate below 512 and carries the excess
//! in extension opcodes written ahead of the record.

use super::bytes::ByteCursor;

/// End of the event track
pub const OP_END_OF_TRACK: u8 = 0x83;
/// Gate extensions
pub const OP_GATE_EXTEND_512: u8 = 0x88;
pub const OP_GATE_EXTEND_2048: u8 = 0x89;
pub const OP_GATE_EXTEND_4096: u8 = 0x8A;
pub const OP_GATE_EXTEND_8192: u8 = 0x8B;
/// Step (delta) extensions
pub const OP_STEP_EXTEND_256: u8 = 0x8C;
pub const OP_STEP_EXTEND_512: u8 = 0x8D;
pub const OP_STEP_EXTEND_2048: u8 = 0x8E;
pub const OP_STEP_EXTEND_4096: u8 = 0x8F;

/// Delta extensions, largest first
pub const STEP_EXTENSIONS: [(u32, u8); 3] = [
    (0x1000, OP_STEP_EXTEND_4096),
    (0x800, OP_STEP_EXTEND_2048),
    (0x200, OP_STEP_EXTEND_512),
];

/// Gate extensions, largest first
pub const GATE_EXTENSIONS: [(u32, u8); 4] = [
    (0x2000, OP_GATE_EXTEND_8192),
    (0x1000, OP_GATE_EXTEND_4096),
    (0x800, OP_GATE_EXTEND_2048),
    (0x200, OP_GATE_EXTEND_512),
];

/// Read a MIDI variable-length quantity.
///
/// Running out of input is not an error: whatever was accumulated so far is
/// returned.
pub fn read_variable_length(cursor: &mut ByteCursor<'_>) -> u32 {
    let mut value = 0u32;
    while let Some(byte) = cursor.read_u8() {
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }
    value
}

fn write_extensions(out: &mut Vec<u8>, mut value: u32, table: &[(u32, u8)]) -> u32 {
    for &(chunk, opcode) in table {
        while value >= chunk {
            out.push(opcode);
            value -= chunk;
        }
    }
    value
}

/// Emit step extensions for `delta`; the returned remainder is below 512
pub fn write_step_extensions(out: &mut Vec<u8>, delta: u32) -> u32 {
    write_extensions(out, delta, &STEP_EXTENSIONS)
}

/// Emit gate extensions for `gate`; the returned remainder is below 512
pub fn write_gate_extensions(out: &mut Vec<u8>, gate: u32) -> u32 {
    write_extensions(out, gate, &GATE_EXTENSIONS)
}

/// Ticks a step extension opcode stands for
pub fn step_extension_value(opcode: u8) -> Option<u32> {
    match opcode {
        OP_STEP_EXTEND_256 => Some(0x100),
        OP_STEP_EXTEND_512 => Some(0x200),
        OP_STEP_EXTEND_2048 => Some(0x800),
        OP_STEP_EXTEND_4096 => Some(0x1000),
        _ => None,
    }
}

/// Ticks a gate extension opcode stands for
pub fn gate_extension_value(opcode: u8) -> Option<u32> {
    match opcode {
        OP_GATE_EXTEND_512 => Some(0x200),
        OP_GATE_EXTEND_2048 => Some(0x800),
        OP_GATE_EXTEND_4096 => Some(0x1000),
        OP_GATE_EXTEND_8192 => Some(0x2000),
        _ => None,
    }
}
