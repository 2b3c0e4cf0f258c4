//! Flat-file persistence of a rhythm as raw delay records.
//!
//! The file is a plain sequence of native-endian `i64` microsecond delays, one
//! per inter-tap gap, with no header, footer or length field. The file length
//! alone gives the delay count and must be a whole number of records.
//!
//! Each call opens, transfers and closes the file; there is no locking.

use super::types::{DelaySequence, ReferenceRhythm, TapSequence, MAX_DELAYS};
use crate::error::{Result, TaplockError};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Width in bytes of one stored delay record.
pub const RECORD_WIDTH: usize = std::mem::size_of::<i64>();

/// Largest number of bytes a rhythm file can meaningfully hold.
pub const MAX_FILE_BYTES: usize = MAX_DELAYS * RECORD_WIDTH;

/// Write the delays of `sequence` to `path`, truncating or creating the file.
///
/// The sequence must hold at least two taps. Records are written one at a
/// time; a failed or short write stops immediately and leaves whatever was
/// already written in place (the file may be truncated).
pub fn save(path: &Path, sequence: &TapSequence) -> Result<DelaySequence> {
    let delays = sequence.delays().ok_or(TaplockError::TooShort {
        taps: sequence.len(),
        required: 2,
    })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| TaplockError::io(format!("Cannot open '{}'", path.display()), e))?;

    for delay in delays.as_slice() {
        write_record(&mut file, *delay)
            .map_err(|e| TaplockError::io(format!("Cannot write to '{}'", path.display()), e))?;
    }

    info!(
        path = %path.display(),
        delays = delays.len(),
        "Rhythm saved"
    );
    Ok(delays)
}

fn write_record(file: &mut File, delay: i64) -> std::io::Result<()> {
    let bytes = delay.to_ne_bytes();
    let written = file.write(&bytes)?;
    if written != bytes.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            format!("short write ({written} of {} bytes)", bytes.len()),
        ));
    }
    Ok(())
}

/// Load a reference rhythm from `path`.
///
/// At most [`MAX_FILE_BYTES`] are read; anything past that is ignored.
pub fn load(path: &Path) -> Result<ReferenceRhythm> {
    let file = File::open(path)
        .map_err(|e| TaplockError::io(format!("Cannot open '{}'", path.display()), e))?;

    // One extra byte tells an oversized file apart from a full one.
    let mut bytes = Vec::with_capacity(MAX_FILE_BYTES + 1);
    file.take(MAX_FILE_BYTES as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| TaplockError::io(format!("Cannot read from '{}'", path.display()), e))?;

    if bytes.len() > MAX_FILE_BYTES {
        warn!(
            path = %path.display(),
            max_bytes = MAX_FILE_BYTES,
            "Rhythm file is longer than any recordable rhythm, ignoring the excess"
        );
        bytes.truncate(MAX_FILE_BYTES);
    }

    let reference = decode(&bytes)?;
    if reference.delay_count() < 2 {
        warn!(
            path = %path.display(),
            delays = reference.delay_count(),
            "Stored rhythm is shorter than any recorded rhythm"
        );
    }
    debug!(
        path = %path.display(),
        delays = reference.delay_count(),
        "Rhythm loaded"
    );
    Ok(reference)
}

/// Decode raw record bytes into a reference rhythm.
pub fn decode(bytes: &[u8]) -> Result<ReferenceRhythm> {
    if bytes.len() % RECORD_WIDTH != 0 {
        return Err(TaplockError::CorruptFormat {
            len: bytes.len(),
            record_width: RECORD_WIDTH,
        });
    }

    let delays = bytes
        .chunks_exact(RECORD_WIDTH)
        .map(|chunk| {
            let mut record = [0u8; RECORD_WIDTH];
            record.copy_from_slice(chunk);
            i64::from_ne_bytes(record)
        })
        .collect();

    Ok(ReferenceRhythm::new(DelaySequence::new(delays)))
}
