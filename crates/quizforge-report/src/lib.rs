//! quizforge-report: Result export.
//!
//! Renders a graded `ExamReport` as a self-contained HTML page or as
//! markdown.

pub mod html;
pub mod markdown;

pub use html::{format_points, generate_html, write_html_report};
pub use markdown::to_markdown;
