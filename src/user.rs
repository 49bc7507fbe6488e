//! User records and the user store operations.
//!
//! Passwords are stored and rendered in clear text. That is how the
//! source system works and it is reproduced deliberately; do not expect
//! hashing here.

use serde::{Deserialize, Serialize};

use crate::codec::TextRecord;
use crate::error::{StoreResult, ValidationError};
use crate::store::{MatchMode, Record, Store};

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,
    /// User ID, the unique key. Immutable once stored.
    pub user_id: String,
    /// Password, in clear text by design of the source system.
    pub password: String,
}

impl User {
    /// Creates a user, trimming the text fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        user_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            user_id: user_id.into().trim().to_string(),
            password: password.into().trim().to_string(),
        }
    }
}

impl Record for User {
    const KIND: &'static str = "user";

    fn key(&self) -> &str {
        &self.user_id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "name",
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "ID",
            });
        }
        if self.password.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind: Self::KIND,
                field: "password",
            });
        }
        Ok(())
    }
}

impl TextRecord for User {
    const FIELD_COUNT: usize = 3;

    const FILE_HEADER: &'static str = "\
# users.txt — User Data (UTF-8). Each line: user name, user ID, password
# Empty rows and lines starting with # are ignored
";

    fn to_line(&self) -> String {
        format!("{},{},{}", self.name, self.user_id, self.password)
    }

    fn from_fields(fields: &[&str]) -> Result<Self, String> {
        Ok(Self::new(fields[0], fields[1], fields[2]))
    }
}

/// A partial update for a stored user. `None` keeps the current value;
/// the user ID cannot be updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// New display name, if any.
    pub name: Option<String>,
    /// New password, if any.
    pub password: Option<String>,
}

impl UserUpdate {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none()
    }
}

/// The user store: capacity 50, keyed by user ID.
pub type UserStore = Store<User>;

impl Store<User> {
    /// Applies a partial update to the user with the given ID.
    ///
    /// # Errors
    /// - [`ValidationError::EmptyUpdate`] (wrapped) when no field is set
    /// - everything [`Store::update_by_key`] can return
    pub fn update_user(&mut self, user_id: &str, update: UserUpdate) -> StoreResult<()> {
        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }
        self.update_by_key(user_id, |user| {
            let mut next = user.clone();
            if let Some(name) = update.name {
                next.name = name.trim().to_string();
            }
            if let Some(password) = update.password {
                next.password = password.trim().to_string();
            }
            Ok(next)
        })
    }

    /// Case-insensitive name keyword search, preserving store order.
    ///
    /// # Errors
    /// Rejects an empty keyword.
    pub fn search_by_name(&self, keyword: &str) -> StoreResult<Vec<&User>> {
        self.find_matching(keyword, MatchMode::Contains, |u| &u.name)
    }
}
