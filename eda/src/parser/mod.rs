//! Delimited-text reader with encoding and delimiter auto-detection.
//!
//! Decoding and header checks happen here; the decoded text is then read
//! into a polars [`DataFrame`] by [`read_frame`], which infers column types.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use polars::prelude::{CsvReader, DataFrame, NullValues, SerReader};

use crate::error::{LoadError, LoadResult};

/// Bytes inspected when guessing the encoding.
const ENCODING_SAMPLE_BYTES: usize = 64 * 1024;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Cell contents read as missing values.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#NA",
];

/// Decoded delimited text with its checked header row.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// The whole file as UTF-8, header included
    pub content: String,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let sample = &bytes[..bytes.len().min(ENCODING_SAMPLE_BYTES)];
    let charset = chardet::detect(sample).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "utf-8" | "utf8" | "utf-8-sig" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        other => {
            let codec = encoding_rs::Encoding::for_label(other.as_bytes()).ok_or_else(|| {
                LoadError::Encoding {
                    encoding: other.to_string(),
                    message: "unsupported encoding".to_string(),
                }
            })?;
            codec.decode(bytes).0.into_owned()
        }
    };

    // Strip a UTF-8 byte order mark so the first header is clean
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = DELIMITERS[0];
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Check the header row of delimited text and keep the text for reading.
///
/// Fails on blank input, an empty header row or a repeated column name.
pub fn parse_str(content: &str, delimiter: char, encoding: impl Into<String>) -> LoadResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let delimiter_byte = separator_byte(delimiter)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut seen = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
        return Err(LoadError::DuplicateColumn(dup.clone()));
    }

    Ok(ParseResult {
        headers,
        content: content.to_string(),
        encoding: encoding.into(),
        delimiter,
    })
}

/// Read checked text into a dataframe.
///
/// Every column's type is inferred from all of its values; the
/// [`MISSING_TOKENS`] become nulls and rows longer than the header are cut.
pub fn read_frame(parsed: &ParseResult) -> LoadResult<DataFrame> {
    let null_values = MISSING_TOKENS.iter().map(|t| t.to_string()).collect();

    let frame = CsvReader::new(Cursor::new(parsed.content.as_bytes().to_vec()))
        .has_header(true)
        .with_separator(separator_byte(parsed.delimiter)?)
        .with_null_values(Some(NullValues::AllColumns(null_values)))
        .infer_schema(None)
        .truncate_ragged_lines(true)
        .finish()?;

    Ok(frame)
}

fn separator_byte(delimiter: char) -> LoadResult<u8> {
    u8::try_from(delimiter).map_err(|_| LoadError::Csv {
        line: 1,
        message: format!("delimiter '{}' is not a single-byte character", delimiter),
    })
}

/// Parse raw bytes, detecting the encoding and, unless given, the delimiter.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> LoadResult<ParseResult> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    parse_str(&content, delimiter, encoding)
}

/// Parse a file, detecting the encoding and, unless given, the delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_file_auto("hotel_bookings.csv", None)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Columns: {}", result.headers.len());
/// ```
pub fn parse_file_auto<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> LoadResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, delimiter)
}
