// src/lib.rs

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod utils;

// Re-export specific items for convenience
pub use error::{StoreError, StoreResult};
pub use models::{
    exercise::{Exercise, ExerciseInsert, Question},
    submission::{Submission, SubmissionInsert},
    user::{User, UserRecord},
};
pub use store::GradeStore;
