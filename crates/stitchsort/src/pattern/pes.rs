//! Minimal read-only stitch decoder for Brother .PES files.
//!
//! A PES file embeds a PEC block whose offset is stored as a little-endian
//! u32 at byte 8; the stitch data starts 532 bytes into that block.
//! Stitches are encoded as relative deltas, two bytes per axis pair with a
//! long form (12-bit signed, trim/jump flags) when the high bit is set.
//! Only stitch commands are read; nothing here writes or validates designs.

use std::path::Path;

use log::debug;

use crate::error::RenderError;
use crate::pattern::{StitchCommand, StitchOp};

const PES_MAGIC: &[u8] = b"#PES";
const PEC_OFFSET_POSITION: usize = 8;
const PEC_STITCH_BLOCK_OFFSET: usize = 532;

const END_MARKER: (u8, u8) = (0xFF, 0x00);
const COLOR_CHANGE_MARKER: (u8, u8) = (0xFE, 0xB0);

const LONG_FORM_BIT: u8 = 0x80;
const TRIM_BIT: u8 = 0x20;
const JUMP_BIT: u8 = 0x10;

/// Reads the stitch-command sequence from a .PES file on disk.
pub fn read_pes_file(path: &Path) -> Result<Vec<StitchCommand>, RenderError> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::ReadDesign {
        path: path.to_path_buf(),
        source: e,
    })?;

    let commands = read_pes(&bytes)?;
    debug!(
        "Decoded {} stitch commands from {}",
        commands.len(),
        path.display()
    );
    Ok(commands)
}

/// Decodes the stitch-command sequence from in-memory PES bytes.
pub fn read_pes(bytes: &[u8]) -> Result<Vec<StitchCommand>, RenderError> {
    if bytes.len() < PEC_OFFSET_POSITION + 4 || !bytes.starts_with(PES_MAGIC) {
        return Err(RenderError::UnsupportedFormat(
            "missing #PES header".to_string(),
        ));
    }

    let pec_position = u32::from_le_bytes([
        bytes[PEC_OFFSET_POSITION],
        bytes[PEC_OFFSET_POSITION + 1],
        bytes[PEC_OFFSET_POSITION + 2],
        bytes[PEC_OFFSET_POSITION + 3],
    ]) as usize;

    let stitch_start = pec_position
        .checked_add(PEC_STITCH_BLOCK_OFFSET)
        .filter(|start| *start < bytes.len())
        .ok_or_else(|| RenderError::Truncated("PEC block ends before stitch data".to_string()))?;

    decode_stitch_block(&bytes[stitch_start..])
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Result<u8, RenderError> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or_else(|| RenderError::Truncated("stitch block ends mid-record".to_string()))?;
        self.pos += 1;
        Ok(byte)
    }
}

fn decode_stitch_block(data: &[u8]) -> Result<Vec<StitchCommand>, RenderError> {
    let mut cursor = Cursor { data, pos: 0 };
    let mut commands = Vec::new();
    let mut x = 0i32;
    let mut y = 0i32;

    loop {
        let val1 = cursor.next()?;
        let val2 = cursor.next()?;

        if (val1, val2) == END_MARKER {
            break;
        }
        if (val1, val2) == COLOR_CHANGE_MARKER {
            // One palette-index byte follows; the index itself is ignored
            // because previews cycle a fixed palette.
            cursor.next()?;
            commands.push(StitchCommand::new(x as f32, y as f32, StitchOp::ColorChange));
            continue;
        }

        let mut trim = false;
        let mut jump = false;

        let (dx, y_first) = if val1 & LONG_FORM_BIT != 0 {
            trim |= val1 & TRIM_BIT != 0;
            jump |= val1 & JUMP_BIT != 0;
            (decode_long(val1, val2), cursor.next()?)
        } else {
            (decode_short(val1), val2)
        };

        let dy = if y_first & LONG_FORM_BIT != 0 {
            trim |= y_first & TRIM_BIT != 0;
            jump |= y_first & JUMP_BIT != 0;
            decode_long(y_first, cursor.next()?)
        } else {
            decode_short(y_first)
        };

        x += dx;
        y += dy;

        let op = if trim {
            StitchOp::Trim
        } else if jump {
            StitchOp::Jump
        } else {
            StitchOp::Stitch
        };
        commands.push(StitchCommand::new(x as f32, y as f32, op));
    }

    Ok(commands)
}

/// Short form: 7-bit signed value in one byte.
fn decode_short(byte: u8) -> i32 {
    let value = byte as i32;
    if value > 0x3F {
        value - 0x80
    } else {
        value
    }
}

/// Long form: 12-bit signed value split across the low nibble of the flag
/// byte and the following byte.
fn decode_long(high: u8, low: u8) -> i32 {
    let mut value = (((high as i32) & 0x0F) << 8) | low as i32;
    if value & 0x800 != 0 {
        value -= 0x1000;
    }
    value
}
