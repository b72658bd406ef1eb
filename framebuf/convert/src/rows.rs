/*!
    Row stride transcoding.
*/

use tracing::debug;

/**
    Re-lay out rows stored at `current_pitch` so they are stored at
    `target_pitch`.

    - Rows longer than the target are truncated; the dropped bytes are lost.
    - Rows shorter than the target are right-padded with zero bytes.
    - If the pitches differ in sign, row order is reversed.

    `packed_row` is the unpadded row size (`width * bytes per pixel`); it
    only decides whether a crop is worth reporting, since cutting a row
    below it discards pixel data rather than padding.

    Trailing bytes that do not form a complete row at `current_pitch` are
    ignored. A zero pitch on either side yields an empty buffer.
*/
pub fn transcode(data: &[u8], packed_row: usize, current_pitch: i32, target_pitch: i32) -> Vec<u8> {
    let current = current_pitch.unsigned_abs() as usize;
    let target = target_pitch.unsigned_abs() as usize;
    if current == 0 || target == 0 {
        return Vec::new();
    }

    let flip = (current_pitch < 0) != (target_pitch < 0);
    if current == target && !flip {
        return data.to_vec();
    }

    let rows = data.chunks_exact(current);
    if target < current && target < packed_row {
        debug!(
            current_pitch,
            target_pitch,
            packed_row,
            dropped = (packed_row - target) * rows.len(),
            "pitch crop discards pixel bytes"
        );
    }

    let keep = current.min(target);
    let mut out = Vec::with_capacity(rows.len() * target);
    let mut push_row = |row: &[u8]| {
        out.extend_from_slice(&row[..keep]);
        out.resize(out.len() + target - keep, 0);
    };
    if flip {
        rows.rev().for_each(&mut push_row);
    } else {
        rows.for_each(&mut push_row);
    }
    out
}
