//! CSV import and export of reference points.
//!
//! Import reads a header row and four numeric columns chosen by
//! [`ImportColumns`]. Cells that do not parse as numbers turn into NaN so
//! that [`ReferenceSet::bulk_load`] drops the whole row; a bad row never
//! aborts the import. Export writes one row per point using
//! [`ExportColumns`] as the header.

use crate::config::{ExportColumns, ImportColumns};
use anyhow::{Context, Result};
use georef_core::{ImagePt, RealPt, ReferencePoint, ReferenceSet};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Summary of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Data rows seen (header excluded, blank lines excluded).
    pub rows: usize,
    /// Rows appended to the reference set.
    pub loaded: usize,
    /// 1-based line numbers of rows that were skipped.
    pub skipped_lines: Vec<u64>,
}

/// One parsed CSV row with the line it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvPair {
    pub line: u64,
    pub image: ImagePt,
    pub real: RealPt,
}

fn parse_cell(cell: Option<&[u8]>) -> f64 {
    cell.and_then(|bytes| std::str::from_utf8(bytes).ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .with_context(|| format!("CSV header has no column named '{}'", name))
}

/// Parse all rows of a CSV document into coordinate pairs.
///
/// # Errors
///
/// Returns an error if the header is missing one of the configured columns
/// or if the document is not valid CSV. Cells that are not valid UTF-8 only
/// invalidate their own row.
pub fn read_pairs<R: Read>(reader: R, columns: &ImportColumns) -> Result<Vec<CsvPair>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    let ix = column_index(&headers, &columns.image_x)?;
    let iy = column_index(&headers, &columns.image_y)?;
    let rx = column_index(&headers, &columns.real_x)?;
    let ry = column_index(&headers, &columns.real_y)?;

    let mut pairs = Vec::new();
    for (row, record) in rdr.byte_records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV record {}", row + 1))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);
        pairs.push(CsvPair {
            line,
            image: ImagePt::new(parse_cell(record.get(ix)), parse_cell(record.get(iy))),
            real: RealPt::new(parse_cell(record.get(rx)), parse_cell(record.get(ry))),
        });
    }
    Ok(pairs)
}

/// Append the rows of a CSV document to `set`.
pub fn import_csv<R: Read>(
    reader: R,
    columns: &ImportColumns,
    set: &mut ReferenceSet,
) -> Result<ImportReport> {
    let pairs = read_pairs(reader, columns)?;
    let outcome = set.bulk_load(pairs.iter().map(|p| (p.image, p.real)));

    let skipped_lines: Vec<u64> = outcome.skipped.iter().map(|&i| pairs[i].line).collect();
    for line in &skipped_lines {
        warn!("CSV line {}: non-numeric coordinate, row skipped", line);
    }
    info!(
        "imported {} of {} CSV rows ({} reference points total)",
        outcome.loaded,
        pairs.len(),
        set.len()
    );

    Ok(ImportReport {
        rows: pairs.len(),
        loaded: outcome.loaded,
        skipped_lines,
    })
}

/// Write `points` as CSV with a header row.
pub fn export_csv<W: Write>(
    writer: W,
    columns: &ExportColumns,
    points: &[ReferencePoint],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.header())?;
    for p in points {
        wtr.write_record(&[
            p.image.x.to_string(),
            p.image.y.to_string(),
            p.real.x.to_string(),
            p.real.y.to_string(),
        ])?;
    }
    wtr.flush().context("failed to flush CSV output")?;
    Ok(())
}
