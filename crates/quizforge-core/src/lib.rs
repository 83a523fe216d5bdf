//! quizforge-core: Exam assembly, answer tracking, and scoring.
//!
//! This crate defines the question bank model, the exam profile, and the
//! pure logic that turns a validated bank into a randomized exam, tracks
//! answers against it, and grades the attempt. The session state machine
//! and its single-threaded reactor sit on top of that logic.

pub mod answers;
pub mod assembler;
pub mod bank;
pub mod error;
pub mod model;
pub mod profile;
pub mod reactor;
pub mod report;
pub mod review;
pub mod scoring;
pub mod session;
pub mod traits;

pub use answers::{Answer, AnswerSheet};
pub use assembler::{assemble, assemble_random, relabel, LabelRemap};
pub use bank::{validate_bank, BankRequirements};
pub use error::{
    IndexError, LoadError, ProfileError, SessionError, SubmitGateError, ValidationError,
};
pub use model::{
    Category, CorrectAnswer, Exam, ExamQuestion, QuestionBank, RawAnswer, RawQuestion,
};
pub use profile::{load_profile, load_profile_from, CategoryRule, ExamProfile};
pub use reactor::{SessionCommand, SessionHandle, SessionReactor, SessionUpdate};
pub use report::ExamReport;
pub use review::{preview, wrong_answers, PreviewItem, QuestionStatus, WrongAnswer};
pub use scoring::{
    is_correct, meets_threshold, round_points, score, CategoryScore, ScoreBreakdown,
};
pub use session::{format_clock, ExamSession, Navigation, Phase, SubmitKind, TickOutcome};
pub use traits::BankSource;
