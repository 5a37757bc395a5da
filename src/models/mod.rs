// src/models/mod.rs

pub mod exercise;
pub mod submission;
pub mod user;
