//! The rendering backend abstraction.

use crate::format::{AnswerKey, ExamDocument};

/// Turns a laid-out exam into a document of one output format.
pub trait Renderer {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// File extension of the produced documents, without the dot.
    fn extension(&self) -> &'static str;

    fn render_exam(&self, document: &ExamDocument) -> String;

    fn render_answer_key(&self, key: &AnswerKey) -> String;
}
