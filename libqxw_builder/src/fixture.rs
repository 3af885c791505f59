use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::FixtureReaderError;

/// One patched fixture, as declared by a row of the fixture source.
///
/// Universe and address are 1-based (human facing) here. Conversion to the controller's
/// 0-based universe happens during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    #[serde(rename = "Manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Mode")]
    pub mode: u32,
    #[serde(rename = "Universe")]
    pub universe: u32,
    #[serde(rename = "Address")]
    pub address: u32,
    #[serde(rename = "Channels")]
    pub channels: u32,
}

impl FixtureRecord {
    /// The mode label used by the controller, i.e. `8 Channels Mode`
    pub fn mode_label(&self) -> String {
        format!("{} Channels Mode", self.mode)
    }

    /// The mode and channel count are expected to agree but the source does not enforce it
    pub fn is_mode_consistent(&self) -> bool {
        self.mode == self.channels
    }
}

/// Read all fixture records from a CSV file, in file order.
///
/// No rows are skipped or reordered; the first malformed row aborts the read.
pub fn read_fixtures(path: &Path) -> Result<Vec<FixtureRecord>, FixtureReaderError> {
    if !path.exists() {
        return Err(FixtureReaderError::BadFilePath(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    parse_fixtures(file, path)
}

/// Parse fixture records from any reader. `path` is only used to label errors.
pub fn parse_fixtures<R: std::io::Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<FixtureRecord>, FixtureReaderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| into_reader_error(e, path))?;
    if headers.is_empty() {
        return Err(FixtureReaderError::MalformedSource {
            path: path.to_path_buf(),
            reason: String::from("missing header row"),
        });
    }

    let mut fixtures = Vec::new();
    for result in rdr.deserialize::<FixtureRecord>() {
        fixtures.push(result.map_err(|e| into_reader_error(e, path))?);
    }
    spdlog::debug!(
        "Read {} fixture records from {}",
        fixtures.len(),
        path.to_string_lossy()
    );
    Ok(fixtures)
}

fn into_reader_error(error: csv::Error, path: &Path) -> FixtureReaderError {
    let line = error.position().map(|p| p.line()).unwrap_or(0);
    match error.into_kind() {
        csv::ErrorKind::Io(e) => FixtureReaderError::IOError(e),
        kind => FixtureReaderError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: describe_csv_error(&kind),
        },
    }
}

fn describe_csv_error(kind: &csv::ErrorKind) -> String {
    match kind {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} columns, found {len}"),
        csv::ErrorKind::Utf8 { err, .. } => err.to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Manufacturer,Model,Mode,Universe,Address,Channels\n";

    fn parse(body: &str) -> Result<Vec<FixtureRecord>, FixtureReaderError> {
        let text = format!("{HEADER}{body}");
        parse_fixtures(text.as_bytes(), Path::new("fixtures.csv"))
    }

    #[test]
    fn test_reads_rows_in_order() {
        let fixtures = parse("ACME,Par64,8,1,1,8\nStairville, LED Bar ,12,2,17,12\n").unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(
            fixtures[0],
            FixtureRecord {
                manufacturer: String::from("ACME"),
                model: String::from("Par64"),
                mode: 8,
                universe: 1,
                address: 1,
                channels: 8,
            }
        );
        assert_eq!(fixtures[1].model, "LED Bar");
        assert_eq!(fixtures[1].address, 17);
        assert_eq!(fixtures[1].mode_label(), "12 Channels Mode");
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_channels_column() {
        let text = "Manufacturer,Model,Mode,Universe,Address\nACME,Par64,8,1,1\n";
        match parse_fixtures(text.as_bytes(), Path::new("fixtures.csv")) {
            Err(e @ FixtureReaderError::MalformedRecord { .. }) => {
                assert_eq!(e.kind(), crate::error::ErrorKind::MalformedInput);
                assert!(e.to_string().contains("Channels"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field() {
        match parse("ACME,Par64,eight,1,1,8\n") {
            Err(FixtureReaderError::MalformedRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_short_row() {
        assert!(matches!(
            parse("ACME,Par64,8,1\n"),
            Err(FixtureReaderError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_fixtures(&dir.path().join("fixtures.csv")),
            Err(FixtureReaderError::BadFilePath(_))
        ));
    }
}
