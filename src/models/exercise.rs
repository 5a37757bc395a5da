// src/models/exercise.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// One question of an exercise. Its id is its position in the owning
/// exercise's question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub name: String,
    pub desc: String,
    pub points: i32,
}

impl Question {
    pub fn new(name: impl Into<String>, desc: impl Into<String>, points: i32) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            points,
        }
    }
}

/// An assignment with a caller-chosen id, a due date and ordered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Exercise {
    pub id: i64,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Exercise name length must be between 1 and 200 characters."
    ))]
    pub name: String,
    pub due_date: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl Exercise {
    pub fn new(id: i64, name: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            due_date,
            questions: Vec::new(),
        }
    }

    pub fn add_question(&mut self, name: impl Into<String>, desc: impl Into<String>, points: i32) {
        self.questions.push(Question::new(name, desc, points));
    }

    pub fn total_points(&self) -> i64 {
        self.questions.iter().map(|q| i64::from(q.points)).sum()
    }
}

/// Outcome of inserting an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseInsert {
    Inserted(i64),
    /// An exercise with this id was already stored; nothing was written.
    AlreadyExists,
}

/// Raw row of the `Exercise` table.
#[derive(Debug, FromRow)]
pub(crate) struct ExerciseRow {
    #[sqlx(rename = "ExerciseId")]
    pub id: i64,
    #[sqlx(rename = "Name")]
    pub name: Option<String>,
    #[sqlx(rename = "DueDate")]
    pub due_date: Option<i64>,
}

/// Raw row of the `Question` table.
#[derive(Debug, FromRow)]
pub(crate) struct QuestionRow {
    #[sqlx(rename = "ExerciseId")]
    pub exercise_id: i64,
    #[sqlx(rename = "Name")]
    pub name: Option<String>,
    #[sqlx(rename = "Desc")]
    pub desc: Option<String>,
    #[sqlx(rename = "Points")]
    pub points: Option<i32>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            name: row.name.unwrap_or_default(),
            desc: row.desc.unwrap_or_default(),
            points: row.points.unwrap_or_default(),
        }
    }
}
