//! # libris - bounded library stores with text-file persistence
//!
//! libris tracks the three entity kinds of a small library system
//! (books, users, and borrow records) in bounded, insertion-ordered
//! in-memory stores that round-trip through line-oriented comma-delimited
//! text files.
//!
//! ## Core Concepts
//!
//! - **Record**: an entity with a unique string key and self-contained
//!   validation; one generic [`Store`] serves all three kinds
//! - **Store**: enforces key uniqueness and a fixed capacity on every
//!   mutation, never reorders survivors on delete, and rewrites its
//!   backing file after each successful mutation
//! - **Codec**: pure serialize/deserialize over the text format; bad
//!   lines are skipped with diagnostics, never fatal
//! - **Library**: the explicit lifecycle bundle that loads at startup
//!   and saves on demand, with no singletons
//!
//! ## Usage
//!
//! ```
//! use libris::{Book, Library};
//!
//! let mut library = Library::new();
//! library.books.add(Book::new("Go in Action", "Kennedy", "978-1", 10, 2))?;
//!
//! let found = library.books.find_by_key("978-1").expect("just added");
//! assert_eq!(found.remaining(), 8);
//! # Ok::<(), libris::StoreError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod book;
pub mod codec;
pub mod error;
pub mod library;
pub mod record;
pub mod store;
pub mod user;

// Re-export primary types at crate root for convenience
pub use book::{Book, BookStore, BookUpdate, TitleSearch};
pub use codec::{deserialize, serialize, SkippedLine, TextRecord};
pub use error::{StoreError, StoreResult, ValidationError};
pub use library::{Library, LoadReport};
pub use record::{BorrowRecord, BorrowRecordStore, BorrowStatus};
pub use store::{MatchMode, Record, Store};
pub use user::{User, UserStore, UserUpdate};
