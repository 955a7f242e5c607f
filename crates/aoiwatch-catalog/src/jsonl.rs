//! JSONL record IO: one catalog record per line.
//!
//! Hydration format for CLI runs and fixtures. Blank lines and `#`
//! comments are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use aoiwatch_core::record::Record;

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Read records from a JSONL reader.
pub fn read_records(reader: impl BufRead) -> Result<Vec<Record>, JsonlError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: Record = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Read records from a JSONL file path.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>, JsonlError> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|e| JsonlError::Io(0, format!("{}: {e}", path.display())))?;
    read_records(BufReader::new(file))
}

/// Write records to a JSONL file path, one per line.
pub fn write_records_to_path(
    path: impl AsRef<Path>,
    records: &[Record],
) -> Result<(), JsonlError> {
    let path = path.as_ref();
    let file =
        File::create(path).map_err(|e| JsonlError::Io(0, format!("{}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| JsonlError::Io(0, e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| JsonlError::Io(0, format!("{}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoiwatch_core::record::RecordKind;

    #[test]
    fn read_records_skips_blanks_and_comments() {
        let input = "\n# fixture header\n{\"id\":\"p1\",\"kind\":\"product\"}\n\n";
        let records = read_records(input.as_bytes()).expect("jsonl must parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "p1");
        assert_eq!(records[0].kind, RecordKind::Product);
    }

    #[test]
    fn read_records_reports_the_failing_line() {
        let input = "{\"id\":\"p1\",\"kind\":\"product\"}\nnot-json\n";
        let err = read_records(input.as_bytes()).expect_err("bad line must error");
        assert!(matches!(err, JsonlError::Parse(2, _)));
    }
}
