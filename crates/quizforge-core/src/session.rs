//! Exam session state machine.
//!
//! An [`ExamSession`] owns one attempt: the assembled exam, the answer sheet,
//! the navigation position, and the exam clock. Time is advanced explicitly
//! through [`ExamSession::tick`], so the session itself never sleeps and is
//! fully deterministic under test.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::answers::{Answer, AnswerSheet};
use crate::assembler::{assemble, assemble_random};
use crate::error::{SessionError, SubmitGateError};
use crate::model::{Exam, ExamQuestion, QuestionBank};
use crate::profile::ExamProfile;
use crate::report::ExamReport;
use crate::review::{self, PreviewItem, WrongAnswer};
use crate::scoring::{self, ScoreBreakdown};

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    /// Answering questions.
    InProgress,
    /// Past the last question, looking at the preview before submitting.
    AwaitingSubmitGate,
    /// Scored; the result is final.
    Submitted,
    /// Browsing the wrong-answer list of a submitted attempt.
    ReviewingWrong,
}

impl Phase {
    /// Whether answers can still change and the clock is running.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::InProgress | Phase::AwaitingSubmitGate)
    }

    pub fn is_submitted(self) -> bool {
        matches!(self, Phase::Submitted | Phase::ReviewingWrong)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::NotStarted => "not started",
            Phase::InProgress => "in progress",
            Phase::AwaitingSubmitGate => "awaiting submission",
            Phase::Submitted => "submitted",
            Phase::ReviewingWrong => "reviewing wrong answers",
        };
        f.write_str(label)
    }
}

/// How an attempt ended up scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitKind {
    /// The user submitted after the gate opened.
    Manual,
    /// The time budget ran out.
    Forced,
}

impl fmt::Display for SubmitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitKind::Manual => f.write_str("manual"),
            SubmitKind::Forced => f.write_str("forced"),
        }
    }
}

/// Where navigation landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Question(usize),
    /// The pre-submit preview screen.
    Preview,
}

/// Result of advancing the exam clock.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No attempt is running.
    Idle,
    Running { remaining: Duration },
    /// The submission gate opened during this tick.
    GateOpened { remaining: Duration },
    /// The time budget ran out and the attempt was force-submitted.
    Expired(ScoreBreakdown),
}

/// Render a duration as `mm:ss`, rounding partial seconds up.
pub fn format_clock(duration: &Duration) -> String {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone)]
struct Submission {
    kind: SubmitKind,
    score: ScoreBreakdown,
    wrong: Vec<WrongAnswer>,
}

/// One exam attempt.
#[derive(Debug, Clone)]
pub struct ExamSession {
    profile: ExamProfile,
    phase: Phase,
    exam: Option<Exam>,
    answers: AnswerSheet,
    current: usize,
    elapsed: Duration,
    gate_announced: bool,
    submission: Option<Submission>,
}

impl ExamSession {
    pub fn new(profile: ExamProfile) -> Self {
        Self {
            profile,
            phase: Phase::NotStarted,
            exam: None,
            answers: AnswerSheet::default(),
            current: 0,
            elapsed: Duration::ZERO,
            gate_announced: false,
            submission: None,
        }
    }

    pub fn profile(&self) -> &ExamProfile {
        &self.profile
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn exam(&self) -> Option<&Exam> {
        self.exam.as_ref()
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Assemble a fresh exam from `bank` and begin the attempt.
    pub fn start(&mut self, bank: &QuestionBank) -> Result<&ExamQuestion, SessionError> {
        self.ensure_can_start()?;
        let exam = assemble_random(bank, &self.profile);
        self.start_with_exam(exam)
    }

    /// Like [`start`](Self::start) with a caller-supplied random source.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Result<&ExamQuestion, SessionError> {
        self.ensure_can_start()?;
        let exam = assemble(bank, &self.profile, rng);
        self.start_with_exam(exam)
    }

    /// Begin an attempt on an already assembled exam.
    ///
    /// Allowed before the first attempt and after a submission; resets the
    /// answers, the position, and the clock.
    pub fn start_with_exam(&mut self, exam: Exam) -> Result<&ExamQuestion, SessionError> {
        self.ensure_can_start()?;
        if exam.is_empty() {
            return Err(SessionError::EmptyExam);
        }

        tracing::info!(
            exam = %exam.id,
            profile = %exam.profile,
            questions = exam.len(),
            "exam started"
        );
        self.answers = AnswerSheet::for_exam(&exam);
        self.exam = Some(exam);
        self.current = 0;
        self.elapsed = Duration::ZERO;
        self.gate_announced = self.profile.min_submit().is_zero();
        self.submission = None;
        self.phase = Phase::InProgress;
        self.question(0)
    }

    fn ensure_can_start(&self) -> Result<(), SessionError> {
        if self.phase.is_active() {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        Ok(())
    }

    fn active_exam(&self) -> Result<&Exam, SessionError> {
        let exam = self.exam.as_ref().ok_or(SessionError::NotStarted)?;
        if !self.phase.is_active() {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        Ok(exam)
    }

    /// The question at `index`.
    pub fn question(&self, index: usize) -> Result<&ExamQuestion, SessionError> {
        let exam = self.exam.as_ref().ok_or(SessionError::NotStarted)?;
        Ok(exam.question(index)?)
    }

    /// Current screen, or `None` before the first attempt.
    pub fn current(&self) -> Option<Navigation> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::AwaitingSubmitGate => Some(Navigation::Preview),
            _ => Some(Navigation::Question(self.current)),
        }
    }

    /// Index of the question last shown.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Record a selection for the question at `index`.
    pub fn select_option(&mut self, index: usize, option: &str) -> Result<&Answer, SessionError> {
        let exam = self.exam.as_ref().ok_or(SessionError::NotStarted)?;
        if !self.phase.is_active() {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        Ok(self.answers.select(exam, index, option)?)
    }

    /// Move forward; past the last question the preview is shown.
    pub fn goto_next(&mut self) -> Result<Navigation, SessionError> {
        let len = self.active_exam()?.len();
        if self.phase == Phase::InProgress && self.current + 1 < len {
            self.current += 1;
            return Ok(Navigation::Question(self.current));
        }
        self.phase = Phase::AwaitingSubmitGate;
        Ok(Navigation::Preview)
    }

    /// Move back; leaving the preview returns to the last question.
    pub fn goto_previous(&mut self) -> Result<Navigation, SessionError> {
        self.active_exam()?;
        if self.phase == Phase::AwaitingSubmitGate {
            self.phase = Phase::InProgress;
        } else {
            self.current = self.current.saturating_sub(1);
        }
        Ok(Navigation::Question(self.current))
    }

    /// Jump to the question at `index`.
    pub fn goto_index(&mut self, index: usize) -> Result<Navigation, SessionError> {
        self.active_exam()?.question(index)?;
        self.current = index;
        self.phase = Phase::InProgress;
        Ok(Navigation::Question(index))
    }

    /// Time spent on the current attempt.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left before the attempt is force-submitted.
    pub fn remaining(&self) -> Duration {
        self.profile.time_limit().saturating_sub(self.elapsed)
    }

    /// Whether a manual submit would pass the gate.
    pub fn gate_open(&self) -> bool {
        self.elapsed >= self.profile.min_submit()
    }

    /// Advance the exam clock by `delta`.
    ///
    /// Running out of time submits the attempt exactly once. After that the
    /// clock is stopped and every tick is [`TickOutcome::Idle`].
    pub fn tick(&mut self, delta: Duration) -> TickOutcome {
        if !self.phase.is_active() {
            return TickOutcome::Idle;
        }
        self.elapsed = self.elapsed.saturating_add(delta);

        if self.elapsed >= self.profile.time_limit() {
            tracing::info!("time is up, submitting");
            self.elapsed = self.profile.time_limit();
            return match self.submit(SubmitKind::Forced) {
                Ok(()) => self
                    .score_breakdown()
                    .cloned()
                    .map(TickOutcome::Expired)
                    .unwrap_or(TickOutcome::Idle),
                Err(_) => TickOutcome::Idle,
            };
        }

        let remaining = self.remaining();
        if !self.gate_announced && self.gate_open() {
            self.gate_announced = true;
            tracing::debug!("submission gate opened");
            return TickOutcome::GateOpened { remaining };
        }
        TickOutcome::Running { remaining }
    }

    /// Submit on the user's request.
    ///
    /// Once submitted, further calls return the recorded score unchanged.
    pub fn try_submit(&mut self) -> Result<&ScoreBreakdown, SessionError> {
        if self.exam.is_none() {
            return Err(SessionError::NotStarted);
        }
        if !self.phase.is_submitted() {
            if !self.gate_open() {
                return Err(SubmitGateError {
                    remaining: self.profile.min_submit().saturating_sub(self.elapsed),
                }
                .into());
            }
            self.submit(SubmitKind::Manual)?;
        }
        self.recorded_score()
    }

    /// Submit regardless of the gate. Idempotent like [`try_submit`](Self::try_submit).
    pub fn force_submit(&mut self) -> Result<&ScoreBreakdown, SessionError> {
        if self.exam.is_none() {
            return Err(SessionError::NotStarted);
        }
        if !self.phase.is_submitted() {
            self.submit(SubmitKind::Forced)?;
        }
        self.recorded_score()
    }

    fn submit(&mut self, kind: SubmitKind) -> Result<(), SessionError> {
        let exam = self.exam.as_ref().ok_or(SessionError::NotStarted)?;
        let score = scoring::score(exam, &self.answers);
        let wrong = review::wrong_answers(exam, &self.answers);
        tracing::info!(
            exam = %exam.id,
            %kind,
            total = score.total,
            possible = score.possible,
            passed = score.passed,
            "exam submitted"
        );
        self.submission = Some(Submission { kind, score, wrong });
        self.phase = Phase::Submitted;
        Ok(())
    }

    fn recorded_score(&self) -> Result<&ScoreBreakdown, SessionError> {
        self.submission
            .as_ref()
            .map(|s| &s.score)
            .ok_or(SessionError::InvalidPhase(self.phase))
    }

    /// Switch from the result to the wrong-answer list.
    pub fn show_wrong_answers(&mut self) -> Result<&[WrongAnswer], SessionError> {
        if !self.phase.is_submitted() {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        self.phase = Phase::ReviewingWrong;
        self.wrong_answers()
            .ok_or(SessionError::InvalidPhase(self.phase))
    }

    /// Return from the wrong-answer list to the result.
    pub fn back_to_result(&mut self) -> Result<&ScoreBreakdown, SessionError> {
        if !self.phase.is_submitted() {
            return Err(SessionError::InvalidPhase(self.phase));
        }
        self.phase = Phase::Submitted;
        self.recorded_score()
    }

    /// Score of the submitted attempt.
    pub fn score_breakdown(&self) -> Option<&ScoreBreakdown> {
        self.submission.as_ref().map(|s| &s.score)
    }

    /// Wrong answers of the submitted attempt.
    pub fn wrong_answers(&self) -> Option<&[WrongAnswer]> {
        self.submission.as_ref().map(|s| s.wrong.as_slice())
    }

    /// How the attempt was submitted, if it was.
    pub fn submit_kind(&self) -> Option<SubmitKind> {
        self.submission.as_ref().map(|s| s.kind)
    }

    /// Pre-submit preview of the current answers.
    pub fn preview(&self) -> Result<Vec<PreviewItem>, SessionError> {
        let exam = self.exam.as_ref().ok_or(SessionError::NotStarted)?;
        Ok(review::preview(exam, &self.answers))
    }

    /// Full report of the submitted attempt.
    pub fn report(&self) -> Option<ExamReport> {
        let exam = self.exam.as_ref()?;
        let submission = self.submission.as_ref()?;
        Some(ExamReport::new(
            exam.clone(),
            self.answers.clone(),
            submission.score.clone(),
            submission.wrong.clone(),
            submission.kind,
            self.elapsed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::answers::fixtures::small_exam;
    use crate::bank::fixtures::bank_json;
    use crate::bank::validate_bank;
    use crate::error::IndexError;
    use crate::model::{Category, FALSE_LABEL};
    use crate::profile::CategoryRule;

    fn test_profile() -> ExamProfile {
        ExamProfile {
            name: "test".into(),
            categories: BTreeMap::from([
                (Category::SingleChoice, CategoryRule::new(3, 1.0)),
                (Category::MultipleChoice, CategoryRule::new(2, 2.0)),
                (Category::TrueFalse, CategoryRule::new(2, 1.0)),
            ]),
            pass_threshold: 5.0,
            min_submit_secs: 60,
            time_limit_secs: 300,
            relabel_options: true,
        }
    }

    fn started_small() -> ExamSession {
        let mut session = ExamSession::new(test_profile());
        session.start_with_exam(small_exam()).unwrap();
        session
    }

    fn answer_example(session: &mut ExamSession) {
        session.select_option(0, "B、y").unwrap();
        session.select_option(1, "C、z").unwrap();
        for option in ["A、p", "B、q", "C、r"] {
            session.select_option(2, option).unwrap();
        }
        session.select_option(3, FALSE_LABEL).unwrap();
    }

    #[test]
    fn start_assembles_from_bank() {
        let profile = test_profile();
        let bank = validate_bank(&bank_json(5, 4, 3), &profile.requirements()).unwrap();
        let mut session = ExamSession::new(profile);
        assert_eq!(session.current(), None);

        let first = session
            .start_with_rng(&bank, &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(first.category, Category::SingleChoice);
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.exam().unwrap().len(), 7);
        assert_eq!(session.answers().len(), 7);
        assert_eq!(session.current(), Some(Navigation::Question(0)));
    }

    #[test]
    fn restart_only_after_submission() {
        let profile = test_profile();
        let bank = validate_bank(&bank_json(5, 4, 3), &profile.requirements()).unwrap();
        let mut session = ExamSession::new(profile);
        session.start(&bank).unwrap();
        assert_eq!(
            session.start(&bank).unwrap_err(),
            SessionError::InvalidPhase(Phase::InProgress)
        );

        session.force_submit().unwrap();
        session.start(&bank).unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.answers().answered_count(), 0);
        assert!(session.score_breakdown().is_none());
    }

    #[test]
    fn actions_before_start_fail() {
        let mut session = ExamSession::new(test_profile());
        assert_eq!(session.select_option(0, "A").unwrap_err(), SessionError::NotStarted);
        assert_eq!(session.try_submit().unwrap_err(), SessionError::NotStarted);
        assert_eq!(session.goto_next().unwrap_err(), SessionError::NotStarted);
        assert_eq!(session.tick(Duration::from_secs(1)), TickOutcome::Idle);
    }

    #[test]
    fn cannot_restart_mid_attempt() {
        let mut session = started_small();
        assert_eq!(
            session.start_with_exam(small_exam()).unwrap_err(),
            SessionError::InvalidPhase(Phase::InProgress)
        );
    }

    #[test]
    fn navigation_wraps_into_preview() {
        let mut session = started_small();
        assert_eq!(session.goto_previous().unwrap(), Navigation::Question(0));
        for expected in 1..4 {
            assert_eq!(session.goto_next().unwrap(), Navigation::Question(expected));
        }
        assert_eq!(session.goto_next().unwrap(), Navigation::Preview);
        assert_eq!(session.phase(), Phase::AwaitingSubmitGate);
        assert_eq!(session.goto_next().unwrap(), Navigation::Preview);

        assert_eq!(session.goto_previous().unwrap(), Navigation::Question(3));
        assert_eq!(session.phase(), Phase::InProgress);

        session.goto_next().unwrap();
        assert_eq!(session.goto_index(1).unwrap(), Navigation::Question(1));
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(matches!(
            session.goto_index(4),
            Err(SessionError::Index(IndexError { index: 4, len: 4 }))
        ));
    }

    #[test]
    fn answers_can_change_from_preview() {
        let mut session = started_small();
        for _ in 0..4 {
            session.goto_next().unwrap();
        }
        assert_eq!(session.current(), Some(Navigation::Preview));
        session.select_option(3, FALSE_LABEL).unwrap();
        let items = session.preview().unwrap();
        assert_eq!(items[3].correct_answer.as_deref(), Some(FALSE_LABEL));
    }

    #[test]
    fn gate_blocks_early_submit() {
        let mut session = started_small();
        let err = session.try_submit().unwrap_err();
        assert_eq!(
            err,
            SessionError::Gate(SubmitGateError {
                remaining: Duration::from_secs(60)
            })
        );

        assert_eq!(
            session.tick(Duration::from_secs(45)),
            TickOutcome::Running {
                remaining: Duration::from_secs(255)
            }
        );
        assert!(matches!(
            session.try_submit(),
            Err(SessionError::Gate(SubmitGateError { remaining }))
                if remaining == Duration::from_secs(15)
        ));

        assert_eq!(
            session.tick(Duration::from_secs(15)),
            TickOutcome::GateOpened {
                remaining: Duration::from_secs(240)
            }
        );
        assert!(session.gate_open());
        assert!(matches!(session.tick(Duration::from_secs(1)), TickOutcome::Running { .. }));
        assert!(session.try_submit().is_ok());
        assert_eq!(session.submit_kind(), Some(SubmitKind::Manual));
    }

    #[test]
    fn example_scenario_scores_and_lists_the_miss() {
        let mut session = started_small();
        answer_example(&mut session);
        session.tick(Duration::from_secs(60));

        let score = session.try_submit().unwrap().clone();
        assert!((score.total - 2.5).abs() < 1e-9);
        assert!(score.passed);
        let wrong = session.wrong_answers().unwrap();
        assert_eq!(wrong.len(), 1);
        assert_eq!(wrong[0].index, 1);
    }

    #[test]
    fn forced_submit_matches_manual_submit() {
        let mut manual = started_small();
        answer_example(&mut manual);
        manual.tick(Duration::from_secs(120));
        let manual_score = manual.try_submit().unwrap().clone();

        let mut timed = started_small();
        answer_example(&mut timed);
        timed.tick(Duration::from_secs(299));
        let outcome = timed.tick(Duration::from_secs(5));
        assert_eq!(outcome, TickOutcome::Expired(manual_score.clone()));
        assert_eq!(timed.submit_kind(), Some(SubmitKind::Forced));
        assert_eq!(timed.remaining(), Duration::ZERO);
        assert_eq!(timed.wrong_answers(), manual.wrong_answers());
    }

    #[test]
    fn expiry_fires_once() {
        let mut session = started_small();
        assert!(matches!(session.tick(Duration::from_secs(300)), TickOutcome::Expired(_)));
        assert_eq!(session.tick(Duration::from_secs(1)), TickOutcome::Idle);
        assert_eq!(session.phase(), Phase::Submitted);
    }

    #[test]
    fn double_submit_is_a_no_op() {
        let mut session = started_small();
        answer_example(&mut session);
        let first = session.force_submit().unwrap().clone();
        let wrong_before = session.wrong_answers().unwrap().len();

        assert_eq!(session.try_submit().unwrap(), &first);
        assert_eq!(session.force_submit().unwrap(), &first);
        assert_eq!(session.wrong_answers().unwrap().len(), wrong_before);
        assert_eq!(session.submit_kind(), Some(SubmitKind::Forced));
        assert!(matches!(
            session.select_option(0, "A、x"),
            Err(SessionError::InvalidPhase(Phase::Submitted))
        ));
    }

    #[test]
    fn review_round_trip_keeps_result() {
        let mut session = started_small();
        assert!(session.show_wrong_answers().is_err());
        answer_example(&mut session);
        let score = session.force_submit().unwrap().clone();

        assert_eq!(session.show_wrong_answers().unwrap().len(), 1);
        assert_eq!(session.phase(), Phase::ReviewingWrong);
        assert_eq!(session.try_submit().unwrap(), &score);
        assert_eq!(session.back_to_result().unwrap(), &score);
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(session.show_wrong_answers().unwrap().len(), 1);
    }

    #[test]
    fn restart_after_submit_resets_state() {
        let mut session = started_small();
        answer_example(&mut session);
        session.tick(Duration::from_secs(100));
        session.force_submit().unwrap();
        session.show_wrong_answers().unwrap();

        session.start_with_exam(small_exam()).unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.answers().answered_count(), 0);
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(session.score_breakdown().is_none());
        assert!(!session.gate_open());
    }

    #[test]
    fn report_after_submit() {
        let mut session = started_small();
        assert!(session.report().is_none());
        answer_example(&mut session);
        session.force_submit().unwrap();
        let report = session.report().unwrap();
        assert_eq!(report.exam.id, session.exam().unwrap().id);
        assert_eq!(report.wrong_answers.len(), 1);
        assert_eq!(report.submit_kind, Some(SubmitKind::Forced));
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(&Duration::from_secs(0)), "00:00");
        assert_eq!(format_clock(&Duration::from_secs(59)), "00:59");
        assert_eq!(format_clock(&Duration::from_millis(59_100)), "01:00");
        assert_eq!(format_clock(&Duration::from_secs(7200)), "120:00");
    }

    #[test]
    fn empty_exam_rejected() {
        let mut exam = small_exam();
        exam.questions.clear();
        let mut session = ExamSession::new(test_profile());
        assert_eq!(session.start_with_exam(exam).unwrap_err(), SessionError::EmptyExam);
        assert_eq!(session.phase(), Phase::NotStarted);
    }
}
