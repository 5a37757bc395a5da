// src/store/submissions.rs

use super::{GradeStore, from_millis, to_millis};
use crate::{
    error::{StoreError, StoreResult},
    models::{
        exercise::Exercise,
        submission::{
            GradeRow, SelectedSubmission, Submission, SubmissionInsert, assemble_grades,
        },
        user::User,
    },
};

/// Which of a user's submissions for an exercise to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    /// Most recent submission time; ties go to the later insert.
    Latest,
    /// Highest grade total; ties go to the earliest submission.
    Best,
}

impl Selection {
    /// Query binding `?1` username and `?2` exercise id (plus `?3` question
    /// count for `Best`), returning at most one `(SubmissionId, SubmissionTime)` row.
    fn sql(self) -> &'static str {
        match self {
            Selection::Latest => {
                r#"
                SELECT s.SubmissionId, s.SubmissionTime
                FROM Submission s
                INNER JOIN User u ON u.UserId = s.UserId
                WHERE u.Username = ?1 AND s.ExerciseId = ?2
                ORDER BY s.SubmissionTime DESC, s.SubmissionId DESC
                LIMIT 1
                "#
            }
            Selection::Best => {
                r#"
                SELECT s.SubmissionId, s.SubmissionTime
                FROM Submission s
                INNER JOIN User u ON u.UserId = s.UserId
                LEFT JOIN QuestionGrade g
                    ON g.SubmissionId = s.SubmissionId AND g.QuestionId < ?3
                WHERE u.Username = ?1 AND s.ExerciseId = ?2
                GROUP BY s.SubmissionId, s.SubmissionTime
                ORDER BY COALESCE(SUM(g.Grade), 0) DESC, s.SubmissionTime ASC, s.SubmissionId ASC
                LIMIT 1
                "#
            }
        }
    }

    fn op_name(self) -> &'static str {
        match self {
            Selection::Latest => "get_last_submission",
            Selection::Best => "get_best_submission",
        }
    }
}

impl GradeStore {
    /// Records a submission row for `submission.username`.
    ///
    /// With `submission.id == None` the store assigns the id; otherwise the
    /// given id is used verbatim. Grades are not written here, see
    /// [`GradeStore::store_grades`].
    ///
    /// The user lookup is part of the insert itself, so the whole operation
    /// is one write statement.
    pub async fn store_submission(&self, submission: &Submission) -> StoreResult<SubmissionInsert> {
        let outcome = self
            .bounded("store_submission", async {
                let inserted: Option<(i64,)> = sqlx::query_as(
                    r#"
                    INSERT INTO Submission (SubmissionId, UserId, ExerciseId, SubmissionTime)
                    SELECT ?1, UserId, ?3, ?4
                    FROM User
                    WHERE Username = ?2
                    RETURNING SubmissionId
                    "#,
                )
                .bind(submission.id)
                .bind(&submission.username)
                .bind(submission.exercise_id)
                .bind(to_millis(&submission.submitted_at))
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| match StoreError::from(e) {
                    err if err.is_unique_violation() => StoreError::Conflict(format!(
                        "submission id {} is already taken",
                        submission.id.unwrap_or_default()
                    )),
                    err => err,
                })?;

                Ok::<_, StoreError>(match inserted {
                    Some((submission_id,)) => SubmissionInsert::Stored(submission_id),
                    None => SubmissionInsert::UnknownUser,
                })
            })
            .await?;

        match outcome {
            SubmissionInsert::Stored(id) => tracing::info!(
                "Stored submission {} by '{}' for exercise {}",
                id,
                submission.username,
                submission.exercise_id
            ),
            SubmissionInsert::UnknownUser => tracing::warn!(
                "Rejected submission for unknown user '{}'",
                submission.username
            ),
        }

        Ok(outcome)
    }

    /// Records one grade per question for an existing submission; `grades[i]`
    /// is written for question id `i`, replacing any earlier grade.
    ///
    /// Returns the number of grade rows written.
    pub async fn store_grades(&self, submission_id: i64, grades: &[f64]) -> StoreResult<usize> {
        let written = self
            .bounded("store_grades", async {
                if grades.is_empty() {
                    let exists: Option<(i64,)> = sqlx::query_as(
                        "SELECT SubmissionId FROM Submission WHERE SubmissionId = ?1",
                    )
                    .bind(submission_id)
                    .fetch_optional(&self.pool)
                    .await?;

                    return match exists {
                        Some(_) => Ok(0),
                        None => Err(missing_submission(submission_id)),
                    };
                }

                // Every statement in the transaction is a write, so the write
                // lock is requested up front and never upgraded from a read.
                let mut tx = self.pool.begin().await?;

                for (question_id, grade) in grades.iter().enumerate() {
                    let affected = sqlx::query(
                        r#"
                        INSERT INTO QuestionGrade (SubmissionId, QuestionId, Grade)
                        SELECT SubmissionId, ?2, ?3
                        FROM Submission
                        WHERE SubmissionId = ?1
                        ON CONFLICT(SubmissionId, QuestionId) DO UPDATE SET
                            Grade = excluded.Grade
                        "#,
                    )
                    .bind(submission_id)
                    .bind(question_id as i64)
                    .bind(grade)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                    if affected == 0 {
                        tx.rollback().await?;
                        return Err(missing_submission(submission_id));
                    }
                }

                tx.commit().await?;
                Ok::<_, StoreError>(grades.len())
            })
            .await?;

        tracing::info!("Recorded {} grades for submission {}", written, submission_id);
        Ok(written)
    }

    /// The submission with the latest submission time for this user and
    /// exercise, or `None` if there is none.
    pub async fn get_last_submission(
        &self,
        user: &User,
        exercise: &Exercise,
    ) -> StoreResult<Option<Submission>> {
        self.get_submission(user, exercise, Selection::Latest).await
    }

    /// The submission with the highest grade total for this user and
    /// exercise, or `None` if there is none.
    pub async fn get_best_submission(
        &self,
        user: &User,
        exercise: &Exercise,
    ) -> StoreResult<Option<Submission>> {
        self.get_submission(user, exercise, Selection::Best).await
    }

    async fn get_submission(
        &self,
        user: &User,
        exercise: &Exercise,
        selection: Selection,
    ) -> StoreResult<Option<Submission>> {
        let question_count = exercise.questions.len();

        let found = self
            .bounded(selection.op_name(), async {
                let mut conn = self.pool.acquire().await?;

                let mut query = sqlx::query_as::<_, SelectedSubmission>(selection.sql())
                    .bind(&user.username)
                    .bind(exercise.id);
                if selection == Selection::Best {
                    query = query.bind(question_count as i64);
                }
                let selected = query.fetch_optional(&mut *conn).await?;

                let Some(selected) = selected else {
                    return Ok(None);
                };

                let rows = sqlx::query_as::<_, GradeRow>(
                    r#"
                    SELECT QuestionId, Grade
                    FROM QuestionGrade
                    WHERE SubmissionId = ?1 AND QuestionId >= 0
                    ORDER BY QuestionId
                    LIMIT ?2
                    "#,
                )
                .bind(selected.id)
                .bind(question_count as i64)
                .fetch_all(&mut *conn)
                .await?;

                Ok::<_, StoreError>(Some((selected, rows)))
            })
            .await?;

        let Some((selected, rows)) = found else {
            tracing::debug!(
                "No submission by '{}' for exercise {}",
                user.username,
                exercise.id
            );
            return Ok(None);
        };

        Ok(Some(Submission {
            id: Some(selected.id),
            username: user.username.clone(),
            exercise_id: exercise.id,
            submitted_at: from_millis(selected.submission_time)?,
            grades: assemble_grades(rows, question_count),
        }))
    }
}

fn missing_submission(submission_id: i64) -> StoreError {
    StoreError::NotFound(format!("submission {} does not exist", submission_id))
}
