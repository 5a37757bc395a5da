// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user's attempt at an exercise.
///
/// `grades[i]` is the grade for question `i` of the exercise. `None` means no
/// grade row exists for that question, which is distinct from a grade of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// `None` lets the store assign the id.
    pub id: Option<i64>,
    pub username: String,
    pub exercise_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub grades: Vec<Option<f64>>,
}

impl Submission {
    pub fn new(username: impl Into<String>, exercise_id: i64, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            username: username.into(),
            exercise_id,
            submitted_at,
            grades: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sum of the recorded grades; missing grades contribute nothing.
    pub fn total(&self) -> f64 {
        self.grades.iter().flatten().sum()
    }

    pub fn is_fully_graded(&self) -> bool {
        self.grades.iter().all(Option::is_some)
    }
}

/// Outcome of storing a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionInsert {
    Stored(i64),
    /// The submission's username is not in the store; nothing was written.
    UnknownUser,
}

/// The submission picked by a selection query.
#[derive(Debug, FromRow)]
pub(crate) struct SelectedSubmission {
    #[sqlx(rename = "SubmissionId")]
    pub id: i64,
    #[sqlx(rename = "SubmissionTime")]
    pub submission_time: i64,
}

/// A `QuestionGrade` row of the selected submission.
#[derive(Debug, FromRow)]
pub(crate) struct GradeRow {
    #[sqlx(rename = "QuestionId")]
    pub question_id: i64,
    #[sqlx(rename = "Grade")]
    pub grade: Option<f64>,
}

/// Places grade rows into `question_count` slots keyed by question id.
/// Slots without a row stay `None`; rows outside the range are dropped.
pub(crate) fn assemble_grades(rows: Vec<GradeRow>, question_count: usize) -> Vec<Option<f64>> {
    let mut grades = vec![None; question_count];
    for row in rows {
        if let Ok(slot) = usize::try_from(row.question_id) {
            if let Some(cell) = grades.get_mut(slot) {
                *cell = row.grade;
            }
        }
    }
    grades
}
