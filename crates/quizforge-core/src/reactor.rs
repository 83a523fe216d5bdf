//! Session reactor: one task that owns an [`ExamSession`] and serializes
//! user commands with the one-second exam clock.
//!
//! Commands arrive on an mpsc queue and the clock is a `tokio::time::interval`;
//! both are merged with `tokio::select!`, so a forced submit from the clock
//! and a manual submit from the user can never interleave.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::answers::Answer;
use crate::error::SessionError;
use crate::model::{ExamQuestion, QuestionBank};
use crate::profile::ExamProfile;
use crate::review::{PreviewItem, WrongAnswer};
use crate::scoring::ScoreBreakdown;
use crate::session::{ExamSession, Navigation, SubmitKind, TickOutcome};

const COMMAND_BUFFER: usize = 32;
const UPDATE_BUFFER: usize = 64;

/// Input to the reactor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Assemble a new exam and begin (or restart) the attempt.
    Start,
    Select { index: usize, option: String },
    Next,
    Previous,
    Goto(usize),
    Submit,
    ShowWrongAnswers,
    BackToResult,
    Shutdown,
}

/// Output of the reactor, in the order events happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A question to display along with the current answer.
    Question {
        index: usize,
        total: usize,
        question: ExamQuestion,
        answer: Answer,
    },
    /// The pre-submit preview.
    Preview(Vec<PreviewItem>),
    /// Clock tick while the attempt is running.
    Clock { remaining: Duration },
    GateOpened { remaining: Duration },
    /// The attempt was scored, either by the user or because time ran out.
    Submitted { kind: SubmitKind, score: ScoreBreakdown },
    WrongAnswers(Vec<WrongAnswer>),
    /// The recorded score, re-sent after a repeated submit or on return
    /// from the wrong-answer list.
    Score(ScoreBreakdown),
    /// A command was not accepted; the session is unchanged.
    Rejected { message: String },
}

/// Owns a session and drives it from commands and clock ticks.
pub struct SessionReactor {
    bank: Arc<QuestionBank>,
    session: ExamSession,
    rng: StdRng,
    tick: Duration,
}

/// Client side of a spawned reactor.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    task: JoinHandle<ExamSession>,
}

impl SessionHandle {
    /// Queue a command for the reactor.
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("session reactor has stopped"))
    }

    /// Stop the reactor and take back the session it owned.
    pub async fn shutdown(self) -> Result<ExamSession> {
        // The reactor may already have stopped on its own.
        let _ = self.commands.send(SessionCommand::Shutdown).await;
        self.task.await.context("session reactor panicked")
    }
}

impl SessionReactor {
    pub fn new(bank: Arc<QuestionBank>, profile: ExamProfile) -> Self {
        Self {
            bank,
            session: ExamSession::new(profile),
            rng: StdRng::from_entropy(),
            tick: Duration::from_secs(1),
        }
    }

    /// Make exam assembly reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Run the reactor on its own task.
    pub fn spawn(self) -> (SessionHandle, mpsc::Receiver<SessionUpdate>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER);
        let task = tokio::spawn(self.run(command_rx, update_tx));
        (
            SessionHandle {
                commands: command_tx,
                task,
            },
            update_rx,
        )
    }

    /// Process commands and ticks until shutdown, the command queue closes,
    /// or nobody listens for updates. Returns the session.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        updates: mpsc::Sender<SessionUpdate>,
    ) -> ExamSession {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let batch = tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if command == SessionCommand::Shutdown {
                        break;
                    }
                    let was_active = self.session.phase().is_active();
                    let batch = self.handle(command);
                    // A new attempt starts its clock from zero.
                    if !was_active && self.session.phase().is_active() {
                        ticker.reset();
                    }
                    batch
                }
                _ = ticker.tick(), if self.session.phase().is_active() => {
                    self.on_tick()
                }
            };

            for update in batch {
                if updates.send(update).await.is_err() {
                    tracing::debug!("update receiver dropped, stopping reactor");
                    return self.session;
                }
            }
        }

        tracing::debug!("session reactor stopped");
        self.session
    }

    fn on_tick(&mut self) -> Vec<SessionUpdate> {
        match self.session.tick(self.tick) {
            TickOutcome::Idle => Vec::new(),
            TickOutcome::Running { remaining } => vec![SessionUpdate::Clock { remaining }],
            TickOutcome::GateOpened { remaining } => vec![SessionUpdate::GateOpened { remaining }],
            TickOutcome::Expired(score) => vec![SessionUpdate::Submitted {
                kind: SubmitKind::Forced,
                score,
            }],
        }
    }

    fn handle(&mut self, command: SessionCommand) -> Vec<SessionUpdate> {
        tracing::debug!(?command, phase = %self.session.phase(), "handling command");
        match self.apply(command) {
            Ok(updates) => updates,
            Err(e) => {
                tracing::debug!("command rejected: {e}");
                vec![SessionUpdate::Rejected {
                    message: e.to_string(),
                }]
            }
        }
    }

    fn apply(&mut self, command: SessionCommand) -> Result<Vec<SessionUpdate>, SessionError> {
        match command {
            SessionCommand::Start => {
                self.session.start_with_rng(&self.bank, &mut self.rng)?;
                Ok(vec![self.question_update(0)?])
            }
            SessionCommand::Select { index, option } => {
                self.session.select_option(index, &option)?;
                Ok(vec![self.question_update(index)?])
            }
            SessionCommand::Next => {
                let navigation = self.session.goto_next()?;
                self.navigation_update(navigation)
            }
            SessionCommand::Previous => {
                let navigation = self.session.goto_previous()?;
                self.navigation_update(navigation)
            }
            SessionCommand::Goto(index) => {
                let navigation = self.session.goto_index(index)?;
                self.navigation_update(navigation)
            }
            SessionCommand::Submit => {
                let already = self.session.phase().is_submitted();
                let score = self.session.try_submit()?.clone();
                if already {
                    return Ok(vec![SessionUpdate::Score(score)]);
                }
                let kind = self.session.submit_kind().unwrap_or(SubmitKind::Manual);
                Ok(vec![SessionUpdate::Submitted { kind, score }])
            }
            SessionCommand::ShowWrongAnswers => {
                let wrong = self.session.show_wrong_answers()?.to_vec();
                Ok(vec![SessionUpdate::WrongAnswers(wrong)])
            }
            SessionCommand::BackToResult => {
                let score = self.session.back_to_result()?.clone();
                Ok(vec![SessionUpdate::Score(score)])
            }
            SessionCommand::Shutdown => Ok(Vec::new()),
        }
    }

    fn question_update(&self, index: usize) -> Result<SessionUpdate, SessionError> {
        let question = self.session.question(index)?.clone();
        let answer = self.session.answers().get(index)?.clone();
        let total = self.session.exam().map_or(0, |exam| exam.len());
        Ok(SessionUpdate::Question {
            index,
            total,
            question,
            answer,
        })
    }

    fn navigation_update(
        &self,
        navigation: Navigation,
    ) -> Result<Vec<SessionUpdate>, SessionError> {
        match navigation {
            Navigation::Question(index) => Ok(vec![self.question_update(index)?]),
            Navigation::Preview => Ok(vec![SessionUpdate::Preview(self.session.preview()?)]),
        }
    }
}
