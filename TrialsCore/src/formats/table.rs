//! Row table interchange format
//!
//! The localization codec tool exports a container as comma-separated rows:
//!
//! ```text
//! key,source,Translation
//! Subtitles/VO_Door_01,Open the door.,
//! "Subtitles/VO_Door_02","He said ""run"", so I ran.",
//! ```
//!
//! Column 1 is the key, column 2 the current text and column 3 (import only)
//! the replacement text. Whether a header row is written depends on the tool
//! version, so it is sniffed from the first record rather than assumed.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Namespace prefix the game uses for subtitle keys
pub const DEFAULT_NAMESPACE: &str = "Subtitles/";

/// File extension of exported tables
pub const TABLE_EXTENSION: &str = "csv";

/// A single record of the table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableRow {
    /// Raw fields in column order
    pub fields: Vec<String>,
}

impl TableRow {
    /// Create a two-column row (`key`, `source`)
    #[must_use]
    pub fn new(key: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            fields: vec![key.into(), source.into()],
        }
    }

    /// Create a three-column import row (`key`, `source`, `translation`)
    #[must_use]
    pub fn with_translation(
        key: impl Into<String>,
        source: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            fields: vec![key.into(), source.into(), translation.into()],
        }
    }

    /// Raw key as written by the tool
    #[must_use]
    pub fn key(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }

    /// Second column, if present
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.fields.get(1).map(String::as_str)
    }

    /// Third column, if present
    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.fields.get(2).map(String::as_str)
    }

    /// Text a reader of the container would see after import: the
    /// translation when one is set, the source otherwise
    #[must_use]
    pub fn effective_text(&self) -> Option<&str> {
        match self.translation() {
            Some(t) if !t.is_empty() => Some(t),
            _ => self.source(),
        }
    }
}

/// Line terminator used when writing a table back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// An exported localization table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalizationTable {
    /// Header record, when the tool wrote one
    pub header: Option<Vec<String>>,
    /// Data records in file order
    pub rows: Vec<TableRow>,
    /// Line ending sniffed from the input
    pub line_ending: LineEnding,
}

impl LocalizationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize the table to its comma-separated form
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let eol = self.line_ending.as_str();
        let mut out = String::new();

        if let Some(header) = &self.header {
            push_record(&mut out, header);
            out.push_str(eol);
        }
        for row in &self.rows {
            push_record(&mut out, &row.fields);
            out.push_str(eol);
        }
        out
    }
}

/// How row keys map onto the subtitle keys the toolkit manages
///
/// Keys in the container look like `Subtitles/VO_Foo` or `/VO_Foo`; the
/// toolkit addresses them as `VO_Foo`. Rows outside that convention are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConvention {
    /// Prefix stripped from raw keys; an empty namespace makes every row addressable
    pub namespace: String,
}

impl Default for KeyConvention {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl KeyConvention {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Strip the namespace (if present) and any leading separators
    #[must_use]
    pub fn normalize<'a>(&self, raw: &'a str) -> &'a str {
        let stripped = if self.namespace.is_empty() {
            raw
        } else {
            raw.strip_prefix(self.namespace.as_str()).unwrap_or(raw)
        };
        stripped.trim_start_matches('/')
    }

    /// Whether a raw key belongs to the addressable subset
    #[must_use]
    pub fn is_addressable(&self, raw: &str) -> bool {
        self.namespace.is_empty() || raw.starts_with(self.namespace.as_str()) || raw.starts_with('/')
    }

    /// The part of `raw` that normalization removes
    #[must_use]
    pub fn prefix_of<'a>(&self, raw: &'a str) -> &'a str {
        let normalized = self.normalize(raw);
        &raw[..raw.len() - normalized.len()]
    }
}

/// Normalize a raw table key under `convention`
#[must_use]
pub fn normalize_key<'a>(raw: &'a str, convention: &KeyConvention) -> &'a str {
    convention.normalize(raw)
}

/// Parse a table from text
///
/// # Errors
/// Returns [`Error::MalformedTable`] if a quoted field is never closed.
pub fn parse_table(text: &str) -> Result<LocalizationTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let line_ending = if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };

    let mut records = parse_records(text)?.into_iter();
    let mut table = LocalizationTable {
        header: None,
        rows: Vec::new(),
        line_ending,
    };

    if let Some(first) = records.next() {
        if is_header(&first) {
            table.header = Some(first);
        } else {
            table.rows.push(TableRow { fields: first });
        }
    }
    table.rows.extend(records.map(|fields| TableRow { fields }));

    Ok(table)
}

/// Read and parse a table file
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<LocalizationTable> {
    let text = fs::read_to_string(path)?;
    parse_table(&text)
}

/// Write a table file, replacing any existing content
pub fn write_table<P: AsRef<Path>>(path: P, table: &LocalizationTable) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(table.to_csv_string().as_bytes())?;
    file.flush()?;
    Ok(())
}

fn is_header(record: &[String]) -> bool {
    record
        .first()
        .is_some_and(|f| f.trim().eq_ignore_ascii_case("key"))
}

fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut started = false;
    let mut line = 1;
    let mut quote_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                started = true;
                quote_line = line;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                if started {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                    started = false;
                }
                line += 1;
            }
            _ => {
                field.push(c);
                started = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::MalformedTable {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if started {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

fn push_record(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_is_sniffed() {
        let with = parse_table("key,source,Translation\nSubtitles/VO_A,Hello,\n").unwrap();
        assert_eq!(
            with.header,
            Some(vec!["key".into(), "source".into(), "Translation".into()])
        );
        assert_eq!(with.len(), 1);

        let without = parse_table("Subtitles/VO_A,Hello\n").unwrap();
        assert!(without.header.is_none());
        assert_eq!(without.rows[0].key(), "Subtitles/VO_A");
    }

    #[test]
    fn test_quoted_fields() {
        let text = "\"Subtitles/VO_A\",\"He said \"\"run\"\", so I ran.\"\nSubtitles/VO_B,\"line one\nline two\"\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.rows[0].source(), Some("He said \"run\", so I ran."));
        assert_eq!(table.rows[1].source(), Some("line one\nline two"));
    }

    #[test]
    fn test_crlf_and_bom() {
        let text = "\u{feff}key,source\r\nSubtitles/VO_A,Hi\r\n\r\nSubtitles/VO_B,\r\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.line_ending, LineEnding::CrLf);
        assert!(table.header.is_some());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].source(), Some(""));
        assert_eq!(table.to_csv_string(), "key,source\r\nSubtitles/VO_A,Hi\r\nSubtitles/VO_B,\r\n");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_table("a,b\nc,\"oops\n").unwrap_err();
        assert!(matches!(err, Error::MalformedTable { line: 2, .. }));
    }

    #[test]
    fn test_writer_quotes_only_when_needed() {
        let mut table = LocalizationTable::new();
        table.rows.push(TableRow::with_translation("Subtitles/VO_A", "a, b", "say \"hi\""));
        table.rows.push(TableRow::new("Subtitles/VO_B", "plain"));
        assert_eq!(
            table.to_csv_string(),
            "Subtitles/VO_A,\"a, b\",\"say \"\"hi\"\"\"\nSubtitles/VO_B,plain\n"
        );
        assert_eq!(parse_table(&table.to_csv_string()).unwrap(), table);
    }

    #[test]
    fn test_key_normalization() {
        let convention = KeyConvention::default();
        assert_eq!(normalize_key("Subtitles/VO_Foo", &convention), "VO_Foo");
        assert_eq!(normalize_key("/VO_Foo", &convention), "VO_Foo");
        assert_eq!(normalize_key("VO_Foo", &convention), "VO_Foo");
    }

    #[test]
    fn test_addressable_subset_and_prefix() {
        let convention = KeyConvention::default();
        assert!(convention.is_addressable("Subtitles/VO_Foo"));
        assert!(convention.is_addressable("/VO_Foo"));
        assert!(!convention.is_addressable("Menu_Start"));
        assert_eq!(convention.prefix_of("Subtitles/VO_Foo"), "Subtitles/");
        assert_eq!(convention.prefix_of("/VO_Foo"), "/");
        assert_eq!(convention.prefix_of("VO_Foo"), "");

        let open = KeyConvention::new("");
        assert!(open.is_addressable("Menu_Start"));
    }

    #[test]
    fn test_effective_text() {
        assert_eq!(TableRow::new("k", "a").effective_text(), Some("a"));
        assert_eq!(TableRow::with_translation("k", "a", "").effective_text(), Some("a"));
        assert_eq!(TableRow::with_translation("k", "a", "b").effective_text(), Some("b"));
    }
}
