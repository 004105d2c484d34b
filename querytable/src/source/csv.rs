//! CSV data source with encoding and delimiter auto-detection.
//!
//! The first record is the header row. Fields are trimmed; rows shorter than
//! the header are padded with empty strings and extra fields are ignored.

use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use serde_json::Value;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

use super::DataSource;
use crate::error::{SourceError, SourceResult};
use crate::models::Row;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [char; 4] = [';', ',', '\t', '|'];

/// Streaming CSV source.
pub struct CsvSource<R: Read> {
    columns: Vec<String>,
    records: StringRecordsIntoIter<R>,
    encoding: String,
    delimiter: char,
}

impl<R: Read> CsvSource<R> {
    /// Read UTF-8 CSV from `reader` with an explicit delimiter.
    pub fn from_reader(reader: R, delimiter: char) -> SourceResult<Self> {
        Self::with_encoding(reader, delimiter, "utf-8".to_string())
    }

    fn with_encoding(reader: R, delimiter: char, encoding: String) -> SourceResult<Self> {
        if !delimiter.is_ascii() {
            return Err(SourceError::InvalidDelimiter(delimiter));
        }
        let byte = delimiter as u8;

        let mut reader = ReaderBuilder::new()
            .delimiter(byte)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(SourceError::NoHeaders);
        }

        debug!(
            "CSV source: {} columns, delimiter {:?}, encoding {}",
            columns.len(),
            delimiter,
            encoding
        );

        Ok(Self {
            columns,
            records: reader.into_records(),
            encoding,
            delimiter,
        })
    }

    /// Encoding the input was decoded from.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl CsvSource<Cursor<Vec<u8>>> {
    /// Decode raw bytes, detecting encoding and delimiter.
    pub fn from_bytes(bytes: &[u8]) -> SourceResult<Self> {
        let encoding = detect_encoding(bytes);
        let content = decode_content(bytes, &encoding);
        let delimiter = detect_delimiter(&content);
        Self::with_encoding(Cursor::new(content.into_bytes()), delimiter, encoding)
    }

    /// Like [`CsvSource::from_bytes`] but with a fixed delimiter.
    pub fn from_bytes_with_delimiter(bytes: &[u8], delimiter: char) -> SourceResult<Self> {
        let encoding = detect_encoding(bytes);
        let content = decode_content(bytes, &encoding);
        Self::with_encoding(Cursor::new(content.into_bytes()), delimiter, encoding)
    }

    /// Read a whole file, detecting encoding and delimiter.
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl<R: Read> DataSource for CsvSource<R> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> SourceResult<Option<Row>> {
        let record = match self.records.next() {
            None => return Ok(None),
            Some(record) => record?,
        };

        let row = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let field = record.get(i).unwrap_or("");
                (column.clone(), Value::String(field.to_string()))
            })
            .collect();
        Ok(Some(row))
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string; unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding_rs::Encoding::for_label(encoding.as_bytes()) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for sep in DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain<R: Read>(source: &mut CsvSource<R>) -> Vec<Row> {
        let mut rows = Vec::new();
        while let Some(row) = source.next_row().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_simple_csv() {
        let mut source = CsvSource::from_reader("name;age\nAlice;30\nBob;25".as_bytes(), ';').unwrap();
        assert_eq!(source.columns(), ["name", "age"]);

        let rows = drain(&mut source);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], json!("Alice"));
        assert_eq!(rows[1]["age"], json!("25"));
    }

    #[test]
    fn test_quoted_and_trimmed_values() {
        let csv = "name,value,note\n\"Alice\",\"Hello, World\",  padded  \n";
        let mut source = CsvSource::from_reader(csv.as_bytes(), ',').unwrap();
        let rows = drain(&mut source);
        assert_eq!(rows[0]["name"], json!("Alice"));
        assert_eq!(rows[0]["value"], json!("Hello, World"));
        assert_eq!(rows[0]["note"], json!("padded"));
    }

    #[test]
    fn test_short_rows_padded_and_extra_fields_ignored() {
        let csv = "a;b;c\n1;;3\n1\n1;2;3;4";
        let mut source = CsvSource::from_reader(csv.as_bytes(), ';').unwrap();
        let rows = drain(&mut source);

        assert_eq!(rows[0]["b"], json!(""));
        assert_eq!(rows[1]["b"], json!(""));
        assert_eq!(rows[1]["c"], json!(""));
        assert_eq!(rows[2].len(), 3);
        assert_eq!(rows[2]["c"], json!("3"));
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let result = CsvSource::from_reader("".as_bytes(), ';');
        assert!(matches!(result, Err(SourceError::NoHeaders)));
    }

    #[test]
    fn test_invalid_delimiter() {
        let result = CsvSource::from_reader("a".as_bytes(), '§');
        assert!(matches!(result, Err(SourceError::InvalidDelimiter('§'))));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ';');
    }

    #[test]
    fn test_from_bytes_auto() {
        let source = CsvSource::from_bytes(b"Col1,Col2\nR1C1,R1C2\n").unwrap();
        assert_eq!(source.delimiter(), ',');
        assert_eq!(source.encoding(), "utf-8");
        assert_eq!(source.columns(), ["Col1", "Col2"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Société");
        assert_eq!(decode_content(b"plain", "no-such-charset"), "plain");
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, "a|b\n1|2\n").unwrap();

        let mut source = CsvSource::open(&path).unwrap();
        assert_eq!(source.delimiter(), '|');
        assert_eq!(drain(&mut source)[0]["b"], json!("2"));

        assert!(matches!(
            CsvSource::open(dir.path().join("missing.csv")),
            Err(SourceError::Io(_))
        ));
    }
}
