// src/store/users.rs

use validator::Validate;

use super::GradeStore;
use crate::{
    error::{StoreError, StoreResult},
    models::user::{User, UserRecord},
    utils::hash::{hash_password, verify_password},
};

impl GradeStore {
    /// Adds a user, or updates the names and password of the user that
    /// already owns `user.username`.
    ///
    /// Returns the user's id. A new user gets a fresh store-generated id; an
    /// existing user keeps theirs. The password is stored as an argon2 hash.
    pub async fn add_or_update_user(&self, user: &User, password: &str) -> StoreResult<i64> {
        user.validate()?;

        let hashed_password = hash_password(password)?;

        let user_id = self
            .bounded("add_or_update_user", async {
                let (user_id,): (i64,) = sqlx::query_as(
                    r#"
                    INSERT INTO User (Username, Firstname, Lastname, Password)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(Username) DO UPDATE SET
                        Firstname = excluded.Firstname,
                        Lastname = excluded.Lastname,
                        Password = excluded.Password
                    RETURNING UserId
                    "#,
                )
                .bind(&user.username)
                .bind(&user.firstname)
                .bind(&user.lastname)
                .bind(&hashed_password)
                .fetch_one(&self.pool)
                .await?;

                Ok::<_, StoreError>(user_id)
            })
            .await?;

        tracing::info!("Saved user '{}' (id {})", user.username, user_id);
        Ok(user_id)
    }

    /// True iff `username` exists and `password` matches its stored hash.
    pub async fn verify_login(&self, username: &str, password: &str) -> StoreResult<bool> {
        let stored: Option<(Option<String>,)> = self
            .bounded("verify_login", async {
                let row = sqlx::query_as::<_, (Option<String>,)>(
                    "SELECT Password FROM User WHERE Username = ?1",
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
                Ok::<_, StoreError>(row)
            })
            .await?;

        match stored {
            Some((Some(hash),)) => verify_password(password, &hash),
            _ => {
                tracing::debug!("Login rejected for unknown user '{}'", username);
                Ok(false)
            }
        }
    }

    /// Looks a user up by username.
    pub async fn find_user(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        self.bounded("find_user", async {
            let user = sqlx::query_as::<_, UserRecord>(
                r#"
                SELECT UserId, Username, Firstname, Lastname
                FROM User
                WHERE Username = ?1
                "#,
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

            Ok::<_, StoreError>(user)
        })
        .await
    }
}
