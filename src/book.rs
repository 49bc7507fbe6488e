//! Book records and the book store operations.
//!
//! A book is keyed by ISBN and carries a pair of quantities with the one
//! cross-field invariant of the system: `borrowed <= total`. The
//! quantities are `u32`, so the non-negativity half of the invariant is
//! carried by the type.

use serde::{Deserialize, Serialize};

use crate::codec::TextRecord;
use crate::error::{StoreResult, ValidationError};
use crate::store::{MatchMode, Record, Store};

/// A book held by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// ISBN, the unique key. Immutable once stored.
    pub isbn: String,
    /// Total number of copies owned.
    pub total: u32,
    /// Number of copies currently lent out. Never exceeds `total`.
    pub borrowed: u32,
}

impl Book {
    /// Creates a book, trimming the text fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use libris::Book;
    ///
    /// let book = Book::new("Go in Action", "Kennedy", "978-1", 10, 2);
    /// assert_eq!(book.remaining(), 8);
    /// ```
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        total: u32,
        borrowed: u32,
    ) -> Self {
        Self {
            title: title.into().trim().to_string(),
            author: author.into().trim().to_string(),
            isbn: isbn.into().trim().to_string(),
            total,
            borrowed,
        }
    }

    /// Copies available for lending: total minus borrowed.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.borrowed)
    }
}

impl Record for Book {
    const KIND: &'static str = "book";

    fn key(&self) -> &str {
        &self.isbn
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "title",
            });
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "author",
            });
        }
        if self.isbn.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "ISBN",
            });
        }
        if self.borrowed > self.total {
            return Err(ValidationError::BorrowedExceedsTotal {
                borrowed: self.borrowed,
                total: self.total,
            });
        }
        Ok(())
    }
}

impl TextRecord for Book {
    const FIELD_COUNT: usize = 5;

    const FILE_HEADER: &'static str = "\
# books.txt — Book Data (UTF-8). Each line: book title, author, ISBN, total quantity, number lent
# Empty rows and lines starting with # are ignored
";

    fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.title, self.author, self.isbn, self.total, self.borrowed
        )
    }

    fn from_fields(fields: &[&str]) -> Result<Self, String> {
        let total: u32 = fields[3]
            .parse()
            .map_err(|_| format!("invalid total quantity '{}'", fields[3]))?;
        let borrowed: u32 = fields[4]
            .parse()
            .map_err(|_| format!("invalid borrowed quantity '{}'", fields[4]))?;
        Ok(Self::new(fields[0], fields[1], fields[2], total, borrowed))
    }
}

/// A partial update for a stored book. `None` keeps the current value;
/// the console layer maps the source system's sentinels (empty input,
/// `-1`) to `None`. The ISBN cannot be updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    /// New title, if any.
    pub title: Option<String>,
    /// New author, if any.
    pub author: Option<String>,
    /// New total quantity, if any.
    pub total: Option<u32>,
    /// New borrowed quantity, if any.
    pub borrowed: Option<u32>,
}

impl BookUpdate {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.total.is_none()
            && self.borrowed.is_none()
    }
}

/// Result of a title keyword search: the matches in store order plus the
/// fold of their quantities, as the source system reported alongside the
/// match list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSearch<'a> {
    /// Matching books in insertion order.
    pub matches: Vec<&'a Book>,
    /// Sum of total quantities over the matches.
    pub total_quantity: u64,
    /// Sum of borrowed quantities over the matches.
    pub total_borrowed: u64,
}

/// The book store: capacity 100, keyed by ISBN.
pub type BookStore = Store<Book>;

impl Store<Book> {
    /// Applies a partial update to the book with the given ISBN. The
    /// merged candidate is re-validated before committing, so an update
    /// that would leave `borrowed > total` (using the combination of old
    /// and new values) is rejected as a whole.
    ///
    /// # Errors
    /// - [`ValidationError::EmptyUpdate`] (wrapped) when no field is set
    /// - everything [`Store::update_by_key`] can return
    pub fn update_book(&mut self, isbn: &str, update: BookUpdate) -> StoreResult<()> {
        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }
        self.update_by_key(isbn, |book| {
            let mut next = book.clone();
            if let Some(title) = update.title {
                next.title = title.trim().to_string();
            }
            if let Some(author) = update.author {
                next.author = author.trim().to_string();
            }
            if let Some(total) = update.total {
                next.total = total;
            }
            if let Some(borrowed) = update.borrowed {
                next.borrowed = borrowed;
            }
            Ok(next)
        })
    }

    /// Case-insensitive title keyword search with aggregate quantities.
    ///
    /// # Errors
    /// Rejects an empty keyword.
    pub fn search_by_title(&self, keyword: &str) -> StoreResult<TitleSearch<'_>> {
        let matches = self.find_matching(keyword, MatchMode::Contains, |b| &b.title)?;
        let total_quantity = matches.iter().map(|b| u64::from(b.total)).sum();
        let total_borrowed = matches.iter().map(|b| u64::from(b.borrowed)).sum();
        Ok(TitleSearch {
            matches,
            total_quantity,
            total_borrowed,
        })
    }

    /// Case-insensitive exact author lookup, as the source system did.
    ///
    /// # Errors
    /// Rejects an empty author name.
    pub fn search_by_author(&self, author: &str) -> StoreResult<Vec<&Book>> {
        self.find_matching(author, MatchMode::Exact, |b| &b.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_text_fields() {
        let book = Book::new("  Go in Action ", " Kennedy", "978-1 ", 10, 2);
        assert_eq!(book.title, "Go in Action");
        assert_eq!(book.author, "Kennedy");
        assert_eq!(book.isbn, "978-1");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(Book::new("", "a", "i", 1, 0).validate().is_err());
        assert!(Book::new("t", "", "i", 1, 0).validate().is_err());
        assert!(Book::new("t", "a", "", 1, 0).validate().is_err());
        assert!(Book::new("t", "a", "i", 1, 0).validate().is_ok());
    }

    #[test]
    fn test_validate_quantity_invariant() {
        let err = Book::new("t", "a", "i", 3, 4).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::BorrowedExceedsTotal {
                borrowed: 4,
                total: 3
            }
        );
        assert!(Book::new("t", "a", "i", 3, 3).validate().is_ok());
        assert!(Book::new("t", "a", "i", 0, 0).validate().is_ok());
    }

    #[test]
    fn test_line_round_trip() {
        let book = Book::new("Go in Action", "Kennedy", "978-1", 10, 2);
        let line = book.to_line();
        assert_eq!(line, "Go in Action,Kennedy,978-1,10,2");

        let fields: Vec<&str> = line.split(',').collect();
        let parsed = Book::from_fields(&fields).unwrap();
        assert_eq!(parsed, book);
    }

    #[test]
    fn test_from_fields_reports_bad_numbers() {
        let err = Book::from_fields(&["t", "a", "i", "x", "0"]).unwrap_err();
        assert!(err.contains("total"));
        let err = Book::from_fields(&["t", "a", "i", "1", "-1"]).unwrap_err();
        assert!(err.contains("borrowed"));
    }

    #[test]
    fn test_add_then_list_scenario() {
        let mut store = BookStore::with_capacity(100);
        store
            .add(Book::new("Go in Action", "Kennedy", "978-1", 10, 2))
            .unwrap();

        let all = store.records();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].remaining(), 8);
    }

    #[test]
    fn test_update_book_merges_old_and_new_values() {
        let mut store = BookStore::with_capacity(100);
        store.add(Book::new("t", "a", "978-1", 10, 8)).unwrap();

        // Lowering total below the current borrowed count must fail.
        let err = store
            .update_book(
                "978-1",
                BookUpdate {
                    total: Some(5),
                    ..BookUpdate::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.find_by_key("978-1").unwrap().total, 10);

        // Lowering both together is fine.
        store
            .update_book(
                "978-1",
                BookUpdate {
                    total: Some(5),
                    borrowed: Some(5),
                    ..BookUpdate::default()
                },
            )
            .unwrap();
        let book = store.find_by_key("978-1").unwrap();
        assert_eq!((book.total, book.borrowed), (5, 5));
    }

    #[test]
    fn test_update_book_rejects_empty_patch() {
        let mut store = BookStore::with_capacity(100);
        store.add(Book::new("t", "a", "978-1", 1, 0)).unwrap();

        let err = store.update_book("978-1", BookUpdate::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::StoreError::Validation(ValidationError::EmptyUpdate)
        ));
    }

    #[test]
    fn test_search_by_title_reports_aggregates() {
        let mut store = BookStore::with_capacity(100);
        store
            .add(Book::new("Java Programming", "Gosling", "978-1", 10, 2))
            .unwrap();
        store
            .add(Book::new("Rust programming", "Klabnik", "978-2", 4, 1))
            .unwrap();
        store.add(Book::new("Cooking", "Chef", "978-3", 7, 0)).unwrap();

        let result = store.search_by_title("PROGRAM").unwrap();
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].isbn, "978-1");
        assert_eq!(result.total_quantity, 14);
        assert_eq!(result.total_borrowed, 3);
    }

    #[test]
    fn test_search_by_author_is_exact() {
        let mut store = BookStore::with_capacity(100);
        store.add(Book::new("a", "Lu Xun", "978-1", 1, 0)).unwrap();
        store.add(Book::new("b", "Lu Xunwei", "978-2", 1, 0)).unwrap();

        let matches = store.search_by_author("lu xun").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].isbn, "978-1");
    }

    #[test]
    fn test_serde_round_trip() {
        let book = Book::new("Go in Action", "Kennedy", "978-1", 10, 2);
        let json = serde_json::to_string(&book).unwrap();
        let decoded: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, book);
    }
}
