//! Line-oriented text codec for library records.
//!
//! Each entity kind persists to its own UTF-8 file: two `#` comment lines
//! describing the format, one blank line, then one comma-joined line per
//! record in a fixed field order. Field values are written verbatim — an
//! embedded comma corrupts the line on reload. That is a known limitation
//! of the format and is preserved, not fixed.
//!
//! Decoding never aborts: blank lines and `#` comments are ignored, and a
//! line with the wrong field count or an unparsable numeric field is
//! skipped with a [`SkippedLine`] diagnostic.

use std::fmt;

use crate::store::Record;

/// A record that can round-trip through the delimited text format.
pub trait TextRecord: Record + Sized {
    /// Number of comma-separated fields on a data line.
    const FIELD_COUNT: usize;

    /// The two comment lines written at the top of the backing file,
    /// each terminated by a newline.
    const FILE_HEADER: &'static str;

    /// Renders the record as one comma-joined data line (no newline).
    fn to_line(&self) -> String;

    /// Builds a record from exactly [`Self::FIELD_COUNT`] trimmed fields.
    ///
    /// # Errors
    /// Returns a human-readable reason when a numeric field fails to
    /// parse. Store invariants (key uniqueness, quantity bounds) are not
    /// checked here; candidates pass through the store's normal `add`
    /// validation afterwards.
    fn from_fields(fields: &[&str]) -> Result<Self, String>;
}

/// Diagnostic for a persisted line that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    /// The raw line content as read.
    pub content: String,
    /// Why the line was skipped.
    pub reason: String,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: skipped \"{}\": {}",
            self.line_number, self.content, self.reason
        )
    }
}

/// Serializes records to the full file text: header comments, one blank
/// line, then one data line per record in store order.
pub fn serialize<R: TextRecord>(records: &[R]) -> String {
    let mut out = String::from(R::FILE_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

/// Parses a single raw line.
///
/// Returns `None` for blank lines and `#` comments, `Some(Ok(record))` for
/// a well-formed data line, and `Some(Err(reason))` for a malformed one.
pub fn parse_line<R: TextRecord>(raw: &str) -> Option<Result<R, String>> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != R::FIELD_COUNT {
        return Some(Err(format!(
            "expected {} fields, found {}",
            R::FIELD_COUNT,
            fields.len()
        )));
    }

    Some(R::from_fields(&fields))
}

/// Deserializes file text into candidate records plus skip diagnostics.
///
/// Candidates are returned in file order; they have passed field-level
/// parsing only and must still be admitted through a store's `add`.
pub fn deserialize<R: TextRecord>(text: &str) -> (Vec<R>, Vec<SkippedLine>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        match parse_line::<R>(raw) {
            None => {}
            Some(Ok(record)) => records.push(record),
            Some(Err(reason)) => skipped.push(SkippedLine {
                line_number: index + 1,
                content: raw.to_string(),
                reason,
            }),
        }
    }

    (records, skipped)
}
