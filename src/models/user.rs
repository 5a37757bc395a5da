// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A person known to the grade store, as supplied by callers.
/// The password travels separately and is never part of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Username length must be between 1 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(max = 100))]
    pub firstname: String,
    #[validate(length(max = 100))]
    pub lastname: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
        }
    }
}

/// Represents a row of the `User` table, minus the password hash.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserRecord {
    #[sqlx(rename = "UserId")]
    pub id: i64,
    #[sqlx(rename = "Username")]
    pub username: String,
    #[sqlx(rename = "Firstname")]
    pub firstname: Option<String>,
    #[sqlx(rename = "Lastname")]
    pub lastname: Option<String>,
}
