// src/store/exercises.rs

use std::collections::HashMap;

use validator::Validate;

use super::{GradeStore, from_millis, to_millis};
use crate::{
    error::{StoreError, StoreResult},
    models::exercise::{Exercise, ExerciseInsert, ExerciseRow, Question, QuestionRow},
};

impl GradeStore {
    /// Stores an exercise together with its questions.
    ///
    /// The exercise row and all question rows are written in one transaction.
    /// If an exercise with the same id already exists nothing is written and
    /// [`ExerciseInsert::AlreadyExists`] is returned.
    pub async fn add_exercise(&self, exercise: &Exercise) -> StoreResult<ExerciseInsert> {
        exercise.validate()?;

        let outcome = self
            .bounded("add_exercise", async {
                let mut tx = self.pool.begin().await?;

                let inserted = sqlx::query(
                    r#"
                    INSERT INTO Exercise (ExerciseId, Name, DueDate)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(ExerciseId) DO NOTHING
                    "#,
                )
                .bind(exercise.id)
                .bind(&exercise.name)
                .bind(to_millis(&exercise.due_date))
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if inserted == 0 {
                    tx.rollback().await?;
                    return Ok(ExerciseInsert::AlreadyExists);
                }

                for (question_id, question) in exercise.questions.iter().enumerate() {
                    sqlx::query(
                        r#"
                        INSERT INTO Question (ExerciseId, QuestionId, Name, "Desc", Points)
                        VALUES (?1, ?2, ?3, ?4, ?5)
                        "#,
                    )
                    .bind(exercise.id)
                    .bind(question_id as i64)
                    .bind(&question.name)
                    .bind(&question.desc)
                    .bind(question.points)
                    .execute(&mut *tx)
                    .await?;
                }

                tx.commit().await?;
                Ok::<_, StoreError>(ExerciseInsert::Inserted(exercise.id))
            })
            .await?;

        match outcome {
            ExerciseInsert::Inserted(id) => tracing::info!(
                "Added exercise {} '{}' with {} questions",
                id,
                exercise.name,
                exercise.questions.len()
            ),
            ExerciseInsert::AlreadyExists => {
                tracing::warn!("Exercise {} already exists, not re-added", exercise.id)
            }
        }

        Ok(outcome)
    }

    /// Returns every exercise ordered by id, each with its questions in
    /// question id order.
    pub async fn load_exercises(&self) -> StoreResult<Vec<Exercise>> {
        let (rows, question_rows) = self
            .bounded("load_exercises", async {
                let mut conn = self.pool.acquire().await?;

                let rows = sqlx::query_as::<_, ExerciseRow>(
                    "SELECT ExerciseId, Name, DueDate FROM Exercise ORDER BY ExerciseId",
                )
                .fetch_all(&mut *conn)
                .await?;

                let question_rows = sqlx::query_as::<_, QuestionRow>(
                    r#"
                    SELECT ExerciseId, Name, "Desc", Points
                    FROM Question
                    ORDER BY ExerciseId, QuestionId
                    "#,
                )
                .fetch_all(&mut *conn)
                .await?;

                Ok::<_, StoreError>((rows, question_rows))
            })
            .await?;

        let mut questions: HashMap<i64, Vec<Question>> = HashMap::new();
        for row in question_rows {
            questions.entry(row.exercise_id).or_default().push(row.into());
        }

        let exercises = rows
            .into_iter()
            .map(|row| {
                let questions = questions.remove(&row.id).unwrap_or_default();
                build_exercise(row, questions)
            })
            .collect::<StoreResult<Vec<_>>>()?;

        tracing::debug!("Loaded {} exercises", exercises.len());
        Ok(exercises)
    }

    /// Returns a single exercise with its questions, if it exists.
    pub async fn find_exercise(&self, id: i64) -> StoreResult<Option<Exercise>> {
        let found = self
            .bounded("find_exercise", async {
                let mut conn = self.pool.acquire().await?;

                let row = sqlx::query_as::<_, ExerciseRow>(
                    "SELECT ExerciseId, Name, DueDate FROM Exercise WHERE ExerciseId = ?1",
                )
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

                let Some(row) = row else {
                    return Ok(None);
                };

                let question_rows = sqlx::query_as::<_, QuestionRow>(
                    r#"
                    SELECT ExerciseId, Name, "Desc", Points
                    FROM Question
                    WHERE ExerciseId = ?1
                    ORDER BY QuestionId
                    "#,
                )
                .bind(id)
                .fetch_all(&mut *conn)
                .await?;

                Ok::<_, StoreError>(Some((row, question_rows)))
            })
            .await?;

        found
            .map(|(row, question_rows)| {
                build_exercise(row, question_rows.into_iter().map(Question::from).collect())
            })
            .transpose()
    }
}

fn build_exercise(row: ExerciseRow, questions: Vec<Question>) -> StoreResult<Exercise> {
    Ok(Exercise {
        id: row.id,
        name: row.name.unwrap_or_default(),
        due_date: from_millis(row.due_date.unwrap_or_default())?,
        questions,
    })
}
