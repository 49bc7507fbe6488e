//! The library bundle: three configured stores and their lifecycle.
//!
//! [`Library::open`] replaces the source system's global service
//! singletons and shutdown hook with an explicit object: construct the
//! stores, load each backing file if present (a missing file is an empty
//! store, not an error), then attach the paths so later mutations
//! persist. [`Library::save_all`] is the explicit flush point.
//!
//! The stores are independent. A borrow record never verifies that the
//! referenced book or user exists; the source system performs no
//! cross-entity referential checks and that scope is preserved here.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};

use crate::book::BookStore;
use crate::codec::{SkippedLine, TextRecord};
use crate::error::StoreError;
use crate::record::BorrowRecordStore;
use crate::store::Store;
use crate::user::UserStore;

/// Maximum number of books a library holds.
pub const BOOK_CAPACITY: usize = 100;
/// Maximum number of users a library holds.
pub const USER_CAPACITY: usize = 50;
/// Maximum number of borrow records a library holds.
pub const BORROW_RECORD_CAPACITY: usize = 200;

/// Backing file name for books.
pub const BOOKS_FILE: &str = "books.txt";
/// Backing file name for users.
pub const USERS_FILE: &str = "users.txt";
/// Backing file name for borrow records.
pub const BORROW_RECORDS_FILE: &str = "borrow_records.txt";

/// Per-store skip diagnostics collected while loading.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    /// Lines skipped from the book file.
    pub books: Vec<SkippedLine>,
    /// Lines skipped from the user file.
    pub users: Vec<SkippedLine>,
    /// Lines skipped from the borrow-record file.
    pub records: Vec<SkippedLine>,
}

impl LoadReport {
    /// Total number of skipped lines across the three files.
    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.books.len() + self.users.len() + self.records.len()
    }
}

/// The three entity stores of one library.
#[derive(Debug)]
pub struct Library {
    /// Books keyed by ISBN.
    pub books: BookStore,
    /// Users keyed by user ID.
    pub users: UserStore,
    /// Borrow records keyed by record ID.
    pub records: BorrowRecordStore,
}

impl Library {
    /// Creates an in-memory library with the configured capacities and
    /// persistence disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: BookStore::with_capacity(BOOK_CAPACITY),
            users: UserStore::with_capacity(USER_CAPACITY),
            records: BorrowRecordStore::with_capacity(BORROW_RECORD_CAPACITY),
        }
    }

    /// Opens a library backed by `data_dir`: loads `books.txt`,
    /// `users.txt` and `borrow_records.txt` if they exist, then attaches
    /// the paths so every later mutation rewrites the matching file.
    ///
    /// Loading is forgiving by design: missing files mean empty stores,
    /// unreadable files are logged and treated as empty, and bad lines
    /// are skipped with diagnostics in the returned [`LoadReport`].
    pub fn open(data_dir: impl AsRef<Path>) -> (Self, LoadReport) {
        let data_dir = data_dir.as_ref();
        let mut library = Self::new();

        let report = LoadReport {
            books: load_file(&mut library.books, &data_dir.join(BOOKS_FILE)),
            users: load_file(&mut library.users, &data_dir.join(USERS_FILE)),
            records: load_file(&mut library.records, &data_dir.join(BORROW_RECORDS_FILE)),
        };

        // Attach paths only after loading so the load itself does not
        // trigger rewrites of the files being read.
        library.books.attach_path(data_dir.join(BOOKS_FILE));
        library.users.attach_path(data_dir.join(USERS_FILE));
        library
            .records
            .attach_path(data_dir.join(BORROW_RECORDS_FILE));

        (library, report)
    }

    /// Saves all three stores in a fixed order: books, users, records.
    /// A failure on one store is collected and the remaining stores are
    /// still attempted; there is no cross-store transactionality.
    pub fn save_all(&self) -> Vec<(&'static str, StoreError)> {
        let mut failures = Vec::new();
        if let Err(err) = self.books.save() {
            warn!("failed to save books: {err}");
            failures.push(("books", err));
        }
        if let Err(err) = self.users.save() {
            warn!("failed to save users: {err}");
            failures.push(("users", err));
        }
        if let Err(err) = self.records.save() {
            warn!("failed to save borrow records: {err}");
            failures.push(("borrow records", err));
        }
        failures
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file<R: TextRecord>(store: &mut Store<R>, path: &Path) -> Vec<SkippedLine> {
    match fs::read_to_string(path) {
        Ok(text) => store.load_from_str(&text),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("no data file at {}, starting empty", path.display());
            Vec::new()
        }
        Err(err) => {
            warn!("failed to read {}: {err}, starting empty", path.display());
            Vec::new()
        }
    }
}
