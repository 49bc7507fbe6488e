//! Borrow records and the borrow-record store operations.
//!
//! A borrow record is keyed by record ID and carries a free-form date
//! string (any non-empty text is accepted, no calendar validation) plus
//! a two-state status. The record does not reference a
//! book or user; the source system performs no cross-entity checks and
//! that scope is preserved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::TextRecord;
use crate::error::{StoreResult, ValidationError};
use crate::store::{Record, Store};

/// Loan state of a borrow record.
///
/// Persisted as an integer code (`0` checked out, `1` returned) in the
/// text files; serde uses the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BorrowStatus {
    /// The copy is out with a member.
    CheckedOut,
    /// The copy has been returned.
    Returned,
}

impl BorrowStatus {
    /// The integer code used in the persisted files.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::CheckedOut => 0,
            Self::Returned => 1,
        }
    }

    /// Parses an integer code. Anything other than `0` or `1` is a
    /// rejection, not "no matches".
    ///
    /// # Errors
    /// [`ValidationError::InvalidStatus`] for out-of-domain codes.
    pub const fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::CheckedOut),
            1 => Ok(Self::Returned),
            _ => Err(ValidationError::InvalidStatus { code }),
        }
    }
}

impl TryFrom<String> for BorrowStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("checked_out") {
            Ok(Self::CheckedOut)
        } else if value.eq_ignore_ascii_case("returned") {
            Ok(Self::Returned)
        } else {
            Err(format!(
                "unknown borrow status: {value}. Use checked_out or returned"
            ))
        }
    }
}

impl From<BorrowStatus> for String {
    fn from(value: BorrowStatus) -> Self {
        match value {
            BorrowStatus::CheckedOut => "checked_out".to_string(),
            BorrowStatus::Returned => "returned".to_string(),
        }
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckedOut => write!(f, "checked out"),
            Self::Returned => write!(f, "returned"),
        }
    }
}

/// A record of one loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    /// Record ID, the unique key. Immutable once stored.
    pub record_id: String,
    /// Borrow date as free-form text; any non-empty string is accepted.
    pub date: String,
    /// Current loan state.
    pub status: BorrowStatus,
}

impl BorrowRecord {
    /// Creates a borrow record, trimming the text fields.
    #[must_use]
    pub fn new(
        record_id: impl Into<String>,
        date: impl Into<String>,
        status: BorrowStatus,
    ) -> Self {
        Self {
            record_id: record_id.into().trim().to_string(),
            date: date.into().trim().to_string(),
            status,
        }
    }
}

impl Record for BorrowRecord {
    const KIND: &'static str = "borrow record";

    fn key(&self) -> &str {
        &self.record_id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.record_id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "ID",
            });
        }
        if self.date.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "date",
            });
        }
        Ok(())
    }
}

impl TextRecord for BorrowRecord {
    const FIELD_COUNT: usize = 3;

    const FILE_HEADER: &'static str = "\
# borrow_records.txt — Borrow Record Data (UTF-8). Each line: record ID, borrow date, status (0-checked out, 1-returned)
# Empty rows and lines starting with # are ignored
";

    fn to_line(&self) -> String {
        format!("{},{},{}", self.record_id, self.date, self.status.code())
    }

    fn from_fields(fields: &[&str]) -> Result<Self, String> {
        let code: i64 = fields[2]
            .parse()
            .map_err(|_| format!("invalid status '{}'", fields[2]))?;
        let status = BorrowStatus::from_code(code).map_err(|e| e.to_string())?;
        Ok(Self::new(fields[0], fields[1], status))
    }
}

/// The borrow-record store: capacity 200, keyed by record ID.
pub type BorrowRecordStore = Store<BorrowRecord>;

impl Store<BorrowRecord> {
    /// Updates the status of the record with the given ID. The ID and
    /// date cannot be modified, matching the source system.
    ///
    /// # Errors
    /// Everything [`Store::update_by_key`] can return.
    pub fn set_status(&mut self, record_id: &str, status: BorrowStatus) -> StoreResult<()> {
        self.update_by_key(record_id, |record| {
            let mut next = record.clone();
            next.status = status;
            Ok(next)
        })
    }

    /// All records with the given status, in store order. Out-of-domain
    /// values are unrepresentable here; callers parsing raw input reject
    /// them through [`BorrowStatus::from_code`].
    #[must_use]
    pub fn find_by_status(&self, status: BorrowStatus) -> Vec<&BorrowRecord> {
        self.records()
            .iter()
            .filter(|r| r.status == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BorrowStatus::CheckedOut.code(), 0);
        assert_eq!(BorrowStatus::Returned.code(), 1);
        assert_eq!(BorrowStatus::from_code(0).unwrap(), BorrowStatus::CheckedOut);
        assert_eq!(BorrowStatus::from_code(1).unwrap(), BorrowStatus::Returned);
    }

    #[test]
    fn test_out_of_domain_code_is_rejected() {
        let err = BorrowStatus::from_code(2).unwrap_err();
        assert_eq!(err, ValidationError::InvalidStatus { code: 2 });
        assert!(BorrowStatus::from_code(-1).is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(BorrowStatus::CheckedOut.to_string(), "checked out");
        assert_eq!(BorrowStatus::Returned.to_string(), "returned");
    }

    #[test]
    fn test_status_serde_is_string() {
        let json = serde_json::to_value(BorrowStatus::CheckedOut).unwrap();
        assert_eq!(json, serde_json::Value::String("checked_out".to_string()));

        let parsed: BorrowStatus = serde_json::from_str("\"Returned\"").unwrap();
        assert_eq!(parsed, BorrowStatus::Returned);

        let unknown: Result<BorrowStatus, _> = serde_json::from_str("\"overdue\"");
        assert!(unknown.is_err());
    }

    #[test]
    fn test_validate_requires_id_and_date() {
        assert!(BorrowRecord::new("", "2024-03-01", BorrowStatus::CheckedOut)
            .validate()
            .is_err());
        assert!(BorrowRecord::new("R-1", "  ", BorrowStatus::CheckedOut)
            .validate()
            .is_err());
        assert!(BorrowRecord::new("R-1", "2024-03-01", BorrowStatus::CheckedOut)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_date_is_free_form_text() {
        // No calendar validation: any non-empty string is accepted.
        let record = BorrowRecord::new("R-1", "next tuesday", BorrowStatus::CheckedOut);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_line_round_trip() {
        let record = BorrowRecord::new("R-1", "2024-03-01", BorrowStatus::Returned);
        let line = record.to_line();
        assert_eq!(line, "R-1,2024-03-01,1");

        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(BorrowRecord::from_fields(&fields).unwrap(), record);
    }

    #[test]
    fn test_set_status() {
        let mut store = BorrowRecordStore::with_capacity(200);
        store
            .add(BorrowRecord::new("R-1", "2024-03-01", BorrowStatus::CheckedOut))
            .unwrap();

        store.set_status("R-1", BorrowStatus::Returned).unwrap();
        assert_eq!(
            store.find_by_key("R-1").unwrap().status,
            BorrowStatus::Returned
        );

        let err = store.set_status("R-9", BorrowStatus::Returned).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_by_status_preserves_order() {
        let mut store = BorrowRecordStore::with_capacity(200);
        store
            .add(BorrowRecord::new("R-1", "d1", BorrowStatus::CheckedOut))
            .unwrap();
        store
            .add(BorrowRecord::new("R-2", "d2", BorrowStatus::Returned))
            .unwrap();
        store
            .add(BorrowRecord::new("R-3", "d3", BorrowStatus::CheckedOut))
            .unwrap();

        let out: Vec<&str> = store
            .find_by_status(BorrowStatus::CheckedOut)
            .iter()
            .map(|r| r.record_id.as_str())
            .collect();
        assert_eq!(out, ["R-1", "R-3"]);
    }
}
