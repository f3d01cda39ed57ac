//! # qbank-render
//!
//! Turns a question selection into exam documents.
//!
//! A [`Selection`](qbank_core::Selection) is first laid out as an
//! [`ExamDocument`], then handed to one or more [`Renderer`] backends:
//!
//! - [`MarkdownRenderer`] for plain Markdown,
//! - [`PrintRenderer`] for a self-contained, A4-paged HTML document.
//!
//! [`ExamGenerator`] drives the whole pipeline, including variants.

pub mod format;
pub mod generator;
pub mod markdown;
pub mod math;
pub mod print;
pub mod renderer;
pub mod text;

pub use format::{AnswerKey, ExamDocument, FormattedQuestion};
pub use generator::{ExamGenerator, GenerationReport};
pub use markdown::MarkdownRenderer;
pub use print::{PrintAssets, PrintRenderer};
pub use renderer::Renderer;
