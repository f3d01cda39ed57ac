//! qbank-core: question bank model, exam configuration, and selection.
//!
//! This crate defines the question data model, loads question banks from
//! disk, and implements the selection pipeline that turns a bank and an exam
//! configuration into an ordered list of questions.

pub mod bank;
pub mod config;
pub mod error;
pub mod hashing;
pub mod model;
pub mod selector;
pub mod validate;

pub use bank::{CategoryMap, QuestionBank};
pub use config::ExamConfig;
pub use error::BankError;
pub use model::{Difficulty, Question, QuestionType, SelectedQuestion};
pub use selector::{QuestionSelector, Selection, SelectionWarning};
