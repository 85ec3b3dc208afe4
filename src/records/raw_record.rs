//! # Raw trajectory records
//!
//! Typed parsing of the tab-delimited pedestrian files. Each line holds four columns:
//!
//! ```text
//! frame_num <TAB> ped_id <TAB> y <TAB> x
//! ```
//!
//! Note the **y-before-x** column order of the source files. Parsed records keep that
//! information explicit through named fields so the swap never has to be remembered downstream.
//!
//! ## Missing positions
//! -----------------
//! Test files mark positions that must be predicted with the literal token `?`
//! ([`MISSING_MARKER`]). It is accepted only under [`ParseMode::Test`] and mapped to `NaN`.
//! Under [`ParseMode::Labelled`] the marker is a parse error.
use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{AgentId, FrameNumber, INPUT_DELIMITER, MISSING_MARKER},
    pedtraj_errors::PedTrajError,
};

/// Line-level parsing errors of the raw trajectory files.
///
/// Every variant carries the 1-based line number and the offending text.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ParseRecordError {
    #[error("line {line}: expected 4 columns, found {found}")]
    MissingColumn { line: u64, found: usize },
    #[error("line {line}: invalid frame number '{value}'")]
    InvalidFrameNumber { line: u64, value: String },
    #[error("line {line}: invalid pedestrian id '{value}'")]
    InvalidAgentId { line: u64, value: String },
    #[error("line {line}: invalid coordinate '{value}'")]
    InvalidCoordinate { line: u64, value: String },
}

/// How coordinates are interpreted while reading a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Training / validation sources: every coordinate must be a number.
    Labelled,
    /// Test sources: `?` is accepted and stands for an unknown position.
    Test,
}

/// One agent position at one frame, as read from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub frame_number: FrameNumber,
    pub agent_id: AgentId,
    pub y: f64,
    pub x: f64,
}

impl RawRecord {
    /// True when either coordinate is unknown.
    pub fn is_missing(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

fn parse_integer(field: &str) -> Option<i64> {
    field.parse::<i64>().ok().or_else(|| {
        // some exports write integral columns as "12.0"
        field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn parse_coordinate(field: &str, mode: ParseMode, line: u64) -> Result<f64, ParseRecordError> {
    if mode == ParseMode::Test && field == MISSING_MARKER {
        return Ok(f64::NAN);
    }
    field
        .parse::<f64>()
        .map_err(|_| ParseRecordError::InvalidCoordinate {
            line,
            value: field.to_string(),
        })
}

/// Convert a single CSV row into a [`RawRecord`].
pub(crate) fn record_from_row(
    row: &StringRecord,
    mode: ParseMode,
    line: u64,
) -> Result<RawRecord, ParseRecordError> {
    if row.len() < 4 {
        return Err(ParseRecordError::MissingColumn {
            line,
            found: row.len(),
        });
    }

    let frame_number =
        parse_integer(&row[0]).ok_or_else(|| ParseRecordError::InvalidFrameNumber {
            line,
            value: row[0].to_string(),
        })?;
    let agent_id = parse_integer(&row[1]).ok_or_else(|| ParseRecordError::InvalidAgentId {
        line,
        value: row[1].to_string(),
    })?;

    Ok(RawRecord {
        frame_number,
        agent_id,
        y: parse_coordinate(&row[2], mode, line)?,
        x: parse_coordinate(&row[3], mode, line)?,
    })
}

/// Read every record of a tab-delimited trajectory file, in file order.
///
/// Arguments
/// -----------------
/// * `path` – Source file (no header line).
/// * `mode` – Whether the missing marker `?` is allowed.
///
/// Return
/// ----------
/// * The parsed records, or the first I/O / parse error encountered (fail-fast).
pub fn read_records(path: &Utf8Path, mode: ParseMode) -> Result<Vec<RawRecord>, PedTrajError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(INPUT_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        records.push(record_from_row(&row, mode, line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod raw_record_test {
    use super::*;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_labelled_row() {
        let rec = record_from_row(&row(&["10", "3", "1.5", "2.5"]), ParseMode::Labelled, 1).unwrap();
        assert_eq!(
            rec,
            RawRecord {
                frame_number: 10,
                agent_id: 3,
                y: 1.5,
                x: 2.5
            }
        );
        assert!(!rec.is_missing());
    }

    #[test]
    fn test_integral_float_columns() {
        let rec = record_from_row(&row(&["10.0", "3.0", "0", "0"]), ParseMode::Labelled, 1).unwrap();
        assert_eq!(rec.frame_number, 10);
        assert_eq!(rec.agent_id, 3);
    }

    #[test]
    fn test_missing_marker_only_in_test_mode() {
        let rec = record_from_row(&row(&["1", "7", "?", "?"]), ParseMode::Test, 4).unwrap();
        assert!(rec.y.is_nan() && rec.x.is_nan());
        assert!(rec.is_missing());

        let err = record_from_row(&row(&["1", "7", "?", "0.3"]), ParseMode::Labelled, 4);
        assert_eq!(
            err,
            Err(ParseRecordError::InvalidCoordinate {
                line: 4,
                value: "?".into()
            })
        );
    }

    #[test]
    fn test_short_row() {
        let err = record_from_row(&row(&["1", "7"]), ParseMode::Labelled, 2);
        assert_eq!(err, Err(ParseRecordError::MissingColumn { line: 2, found: 2 }));
    }

    #[test]
    fn test_bad_frame_number() {
        let err = record_from_row(&row(&["1.5", "7", "0", "0"]), ParseMode::Labelled, 9);
        assert!(matches!(
            err,
            Err(ParseRecordError::InvalidFrameNumber { line: 9, .. })
        ));
    }
}
