//! The bounded, insertion-ordered entity store.
//!
//! One generic store replaces the three near-identical services of the
//! source system. It owns a `Vec` of records, enforces key uniqueness and
//! a fixed capacity on every mutation, and keeps insertion order stable:
//! deletion is index removal, so survivors shift toward the freed slot and
//! never reorder. All lookups are linear scans — the capacities are small
//! (at most 200 records) and that simplicity is deliberate.
//!
//! When a backing file path is attached, every successful mutation
//! rewrites the whole file from the in-memory snapshot. A failed rewrite
//! is logged and the mutation stays committed; only an explicit [`Store::save`]
//! surfaces the I/O error.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::codec::{self, SkippedLine, TextRecord};
use crate::error::{StoreError, StoreResult, ValidationError};

/// A storable entity with a string key and self-contained validation.
pub trait Record: Clone {
    /// Human-readable entity kind, used in errors and log lines.
    const KIND: &'static str;

    /// The unique key value (ISBN, user ID, record ID).
    fn key(&self) -> &str;

    /// Checks all single-record invariants: required fields non-empty
    /// after trimming, numeric fields within range.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// How a text search compares the keyword against a field.
///
/// Both modes are case-insensitive; the source system used containment
/// for title and user-name keyword search and exact equality for author
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Substring containment.
    Contains,
    /// Whole-field equality.
    Exact,
}

/// Bounded, insertion-ordered store for one entity kind.
#[derive(Debug)]
pub struct Store<R: Record> {
    records: Vec<R>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl<R: TextRecord> Store<R> {
    /// Creates an empty store holding at most `capacity` records, with
    /// persistence disabled until a path is attached.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
            path: None,
        }
    }

    /// Attaches the backing file path. From now on every successful
    /// mutation rewrites the file.
    pub fn attach_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// The configured maximum number of records.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records. An empty store is a
    /// valid, reportable state, not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Adds a record, enforcing validation, the capacity bound, and key
    /// uniqueness. On success the record is appended and, if a backing
    /// path is attached, the store is persisted.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] if a record invariant is violated
    /// - [`StoreError::CapacityExceeded`] if the store is full
    /// - [`StoreError::DuplicateKey`] if the key is already present
    pub fn add(&mut self, record: R) -> StoreResult<()> {
        record.validate()?;

        if self.records.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded {
                kind: R::KIND,
                capacity: self.capacity,
            });
        }

        if self.records.iter().any(|r| r.key() == record.key()) {
            return Err(StoreError::DuplicateKey {
                kind: R::KIND,
                key: record.key().to_string(),
            });
        }

        debug!("added {} [{}]", R::KIND, record.key());
        self.records.push(record);
        self.persist_after_mutation();
        Ok(())
    }

    /// Deletes the record with the given key. Survivors keep their
    /// relative order and the count decrements by exactly one.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] if the key is blank
    /// - [`StoreError::NotFound`] if no record carries the key
    pub fn delete_by_key(&mut self, key: &str) -> StoreResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidationError::EmptyField {
                kind: R::KIND,
                field: "key",
            }
            .into());
        }

        let index = self
            .records
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| StoreError::NotFound {
                kind: R::KIND,
                key: key.to_string(),
            })?;

        self.records.remove(index);
        debug!("deleted {} [{}]", R::KIND, key);
        self.persist_after_mutation();
        Ok(())
    }

    /// Replaces the record with the given key by the candidate produced
    /// from it. The candidate is fully re-validated and must keep the same
    /// key; a violation rejects the whole update and leaves the stored
    /// record untouched.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] if the key is blank, the candidate
    ///   fails validation, or the candidate changed the key
    /// - [`StoreError::NotFound`] if no record carries the key
    pub fn update_by_key(
        &mut self,
        key: &str,
        apply: impl FnOnce(&R) -> Result<R, ValidationError>,
    ) -> StoreResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidationError::EmptyField {
                kind: R::KIND,
                field: "key",
            }
            .into());
        }

        let index = self
            .records
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| StoreError::NotFound {
                kind: R::KIND,
                key: key.to_string(),
            })?;

        let candidate = apply(&self.records[index])?;
        candidate.validate()?;
        if candidate.key() != key {
            return Err(ValidationError::KeyChanged { kind: R::KIND }.into());
        }

        self.records[index] = candidate;
        debug!("updated {} [{}]", R::KIND, key);
        self.persist_after_mutation();
        Ok(())
    }

    /// Looks up a record by exact key. Blank input finds nothing.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&R> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        self.records.iter().find(|r| r.key() == key)
    }

    /// Case-insensitive search over one text field, preserving store
    /// order.
    ///
    /// # Errors
    /// [`StoreError::Validation`] if the keyword is empty after trimming —
    /// an empty keyword never means "match all".
    pub fn find_matching<'a>(
        &'a self,
        keyword: &str,
        mode: MatchMode,
        field: impl Fn(&R) -> &str,
    ) -> StoreResult<Vec<&'a R>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ValidationError::EmptyKeyword.into());
        }

        let needle = keyword.to_lowercase();
        Ok(self
            .records
            .iter()
            .filter(|r| {
                let haystack = field(r).to_lowercase();
                match mode {
                    MatchMode::Contains => haystack.contains(&needle),
                    MatchMode::Exact => haystack == needle,
                }
            })
            .collect())
    }

    /// Rewrites the backing file from the current in-memory snapshot,
    /// creating parent directories as needed. Does nothing (with a
    /// warning) when no path is attached.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the write fails. The in-memory store is
    /// unaffected either way.
    pub fn save(&self) -> StoreResult<()> {
        let Some(path) = self.path.as_deref() else {
            warn!("no file path attached to {} store, skipping save", R::KIND);
            return Ok(());
        };
        self.write_to(path)
    }

    /// Loads records from previously persisted text, admitting each
    /// candidate through the normal [`Store::add`] validation. Parse
    /// failures and rejected candidates (duplicate key, capacity,
    /// invariant violation) are skipped with diagnostics; loading never
    /// aborts on a bad line.
    pub fn load_from_str(&mut self, text: &str) -> Vec<SkippedLine> {
        let mut skipped = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            match codec::parse_line::<R>(raw) {
                None => {}
                Some(Ok(record)) => {
                    if let Err(err) = self.add(record) {
                        warn!("skipping {} line {line_number}: {err}", R::KIND);
                        skipped.push(SkippedLine {
                            line_number,
                            content: raw.to_string(),
                            reason: err.to_string(),
                        });
                    }
                }
                Some(Err(reason)) => {
                    warn!("skipping {} line {line_number}: {reason}", R::KIND);
                    skipped.push(SkippedLine {
                        line_number,
                        content: raw.to_string(),
                        reason,
                    });
                }
            }
        }

        info!(
            "loaded {} {} record(s), skipped {} line(s)",
            self.records.len(),
            R::KIND,
            skipped.len()
        );
        skipped
    }

    fn write_to(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, codec::serialize(&self.records))?;
        debug!(
            "saved {} {} record(s) to {}",
            self.records.len(),
            R::KIND,
            path.display()
        );
        Ok(())
    }

    // Best-effort rewrite after a committed mutation. The mutation is not
    // rolled back on failure; the error is reported and the next explicit
    // save can retry.
    fn persist_after_mutation(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(err) = self.write_to(path) {
            warn!(
                "failed to save {} store to {}: {err}",
                R::KIND,
                path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::user::User;

    fn book(isbn: &str) -> Book {
        Book::new("Title", "Author", isbn, 10, 2)
    }

    #[test]
    fn test_add_and_list_in_insertion_order() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();
        store.add(book("978-2")).unwrap();
        store.add(book("978-3")).unwrap();

        let keys: Vec<&str> = store.records().iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(keys, ["978-1", "978-2", "978-3"]);
    }

    #[test]
    fn test_duplicate_key_rejected_and_store_unchanged() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();

        let err = store.add(book("978-1")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_capacity_bound_is_rejected_not_truncated() {
        let mut store = Store::with_capacity(2);
        store.add(book("978-1")).unwrap();
        store.add(book("978-2")).unwrap();

        let err = store.add(book("978-3")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CapacityExceeded { capacity: 2, .. }
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_invalid_record_rejected_before_insertion() {
        let mut store = Store::with_capacity(10);
        let err = store.add(Book::new("  ", "Author", "978-1", 1, 0)).unwrap_err();
        assert!(err.is_validation());
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_preserves_order_of_survivors() {
        let mut store = Store::with_capacity(10);
        for isbn in ["k1", "k2", "k3", "k4"] {
            store.add(book(isbn)).unwrap();
        }

        store.delete_by_key("k2").unwrap();

        let keys: Vec<&str> = store.records().iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(keys, ["k1", "k3", "k4"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_delete_blank_key_is_validation_error() {
        let mut store: Store<Book> = Store::with_capacity(10);
        let err = store.delete_by_key("   ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_delete_missing_key_is_not_found() {
        let mut store: Store<Book> = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();
        let err = store.delete_by_key("978-9").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_revalidates_and_rejects_atomically() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();

        // Candidate violates borrowed <= total; nothing may change.
        let err = store
            .update_by_key("978-1", |b| {
                let mut next = b.clone();
                next.borrowed = 99;
                Ok(next)
            })
            .unwrap_err();
        assert!(err.is_validation());

        let stored = store.find_by_key("978-1").unwrap();
        assert_eq!(stored.borrowed, 2);
        assert_eq!(stored.total, 10);
    }

    #[test]
    fn test_update_rejects_key_change() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();

        let err = store
            .update_by_key("978-1", |b| {
                let mut next = b.clone();
                next.isbn = "978-9".to_string();
                Ok(next)
            })
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::KeyChanged { .. })
        ));
        assert!(store.find_by_key("978-1").is_some());
    }

    #[test]
    fn test_update_commits_valid_candidate() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();

        store
            .update_by_key("978-1", |b| {
                let mut next = b.clone();
                next.total = 20;
                Ok(next)
            })
            .unwrap();

        assert_eq!(store.find_by_key("978-1").unwrap().total, 20);
    }

    #[test]
    fn test_find_by_key_exact_only() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();

        assert!(store.find_by_key("978-1").is_some());
        assert!(store.find_by_key("978").is_none());
        assert!(store.find_by_key("").is_none());
    }

    #[test]
    fn test_find_matching_contains_and_exact() {
        let mut store = Store::with_capacity(10);
        store.add(User::new("Alice", "U-1", "pw")).unwrap();
        store.add(User::new("alicia", "U-2", "pw")).unwrap();
        store.add(User::new("Bob", "U-3", "pw")).unwrap();

        let matches = store
            .find_matching("ali", MatchMode::Contains, |u| &u.name)
            .unwrap();
        let names: Vec<&str> = matches.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Alice", "alicia"]);

        let exact = store
            .find_matching("ALICE", MatchMode::Exact, |u| &u.name)
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].user_id, "U-1");
    }

    #[test]
    fn test_empty_keyword_is_rejected_not_match_all() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();

        let err = store
            .find_matching("  ", MatchMode::Contains, |b: &Book| &b.title)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyKeyword)
        ));
    }

    #[test]
    fn test_load_from_str_skips_store_rejected_candidates() {
        let mut store: Store<Book> = Store::with_capacity(2);
        let text = "\
A,Author,978-1,10,2
B,Author,978-1,5,0
C,Author,978-2,3,9
D,Author,978-3,1,0
E,Author,978-4,1,0
";
        let skipped = store.load_from_str(text);

        // Duplicate key, quantity violation, then capacity once full.
        assert_eq!(store.len(), 2);
        assert_eq!(skipped.len(), 3);
        assert!(skipped[0].reason.contains("already exists"));
        assert!(skipped[1].reason.contains("exceed"));
        assert!(skipped[2].reason.contains("full"));
    }

    #[test]
    fn test_save_without_path_is_a_noop() {
        let mut store = Store::with_capacity(10);
        store.add(book("978-1")).unwrap();
        store.save().unwrap();
    }
}
