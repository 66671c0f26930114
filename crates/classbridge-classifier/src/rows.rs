//! Delimited numeric row parsing for batch prediction
//!
//! Rows are comma-separated floats. Each field contributes its numeric
//! prefix; parsing a row stops at the first field without one (or whose
//! value is out of range for `f32`), and only rows with exactly the expected
//! width are kept. Everything else is dropped without failing the load.

use crate::numeric::parse_f32_prefix;
use classbridge_core::{Artifact, Error, Result, Sample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Parse one line into a sample of exactly `width` features.
///
/// Returns `None` for blank lines, rows cut short by a non-numeric field,
/// and rows with too many fields.
pub fn parse_row(line: &str, width: usize) -> Option<Sample> {
    if line.trim().is_empty() {
        return None;
    }

    let mut values = Vec::with_capacity(width);
    for field in line.split(',') {
        match parse_f32_prefix(field) {
            Some(value) => values.push(value),
            None => break,
        }
    }

    (values.len() == width).then(|| Sample::new(values))
}

/// Parse every line of `reader`, keeping accepted rows in input order.
///
/// Invalid UTF-8 is replaced rather than rejected. A read error ends the
/// input early; rows accepted before it are kept.
pub fn parse_rows<R: BufRead>(mut reader: R, width: usize) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut line = Vec::new();
    let mut line_number = 0usize;
    let mut dropped = 0usize;

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(line = line_number + 1, error = %e, "Stopped reading rows");
                break;
            }
        }
        line_number += 1;

        let text = String::from_utf8_lossy(&line);
        if text.trim().is_empty() {
            continue;
        }

        match parse_row(&text, width) {
            Some(sample) => samples.push(sample),
            None => {
                dropped += 1;
                debug!(line = line_number, "Dropped malformed row");
            }
        }
    }

    if dropped > 0 {
        metrics::counter!("classbridge_rows_dropped_total").increment(dropped as u64);
    }
    debug!(
        lines = line_number,
        accepted = samples.len(),
        dropped,
        "Parsed sample rows"
    );

    samples
}

/// Open a delimited file and parse its rows
pub fn read_samples(path: impl AsRef<Path>, width: usize) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::open(Artifact::Samples, path, e))?;
    Ok(parse_rows(BufReader::new(file), width))
}
