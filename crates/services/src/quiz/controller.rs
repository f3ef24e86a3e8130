use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use storage::WordBank;

use super::session::{QuizSession, Transition};
use super::snapshot::QuizSnapshot;
use super::timers::{Stamped, TimerSet};
use crate::Clock;
use crate::config::{QuizConfig, QuizTimings};
use crate::error::ControllerError;

/// User actions accepted by a running quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    SelectAnswer(String),
    SelectOption(usize),
    NextQuestion,
    EndEarly,
    Restart,
    Shutdown,
}

/// Deferred effects scheduled by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    ShowOptions,
    Tick,
    RevealResult,
    AutoAdvance,
}

const COMMAND_BUFFER: usize = 32;

/// Cloneable front door to a running quiz.
#[derive(Debug, Clone)]
pub struct QuizHandle {
    commands: mpsc::Sender<QuizCommand>,
}

impl QuizHandle {
    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has stopped.
    pub async fn send(&self, command: QuizCommand) -> Result<(), ControllerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ControllerError::Closed)
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has stopped.
    pub async fn select_answer(&self, answer: impl Into<String>) -> Result<(), ControllerError> {
        self.send(QuizCommand::SelectAnswer(answer.into())).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has stopped.
    pub async fn select_option(&self, index: usize) -> Result<(), ControllerError> {
        self.send(QuizCommand::SelectOption(index)).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has stopped.
    pub async fn next_question(&self) -> Result<(), ControllerError> {
        self.send(QuizCommand::NextQuestion).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has stopped.
    pub async fn end_early(&self) -> Result<(), ControllerError> {
        self.send(QuizCommand::EndEarly).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has stopped.
    pub async fn restart(&self) -> Result<(), ControllerError> {
        self.send(QuizCommand::Restart).await
    }

    /// Stop the controller and cancel its timers.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has already stopped.
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        self.send(QuizCommand::Shutdown).await
    }
}

/// Owns one quiz session and drives it from user commands and timers.
///
/// Commands and timer events are handled one at a time on a single task, so the
/// session is never mutated concurrently. A snapshot is published after every
/// applied transition.
pub struct QuizController {
    session: QuizSession,
    bank: Arc<WordBank>,
    timings: QuizTimings,
    timers: TimerSet<TimerEvent>,
    timer_rx: mpsc::UnboundedReceiver<Stamped<TimerEvent>>,
    commands: mpsc::Receiver<QuizCommand>,
    snapshots: watch::Sender<QuizSnapshot>,
}

impl QuizController {
    /// Start a quiz on the current tokio runtime.
    ///
    /// The controller stops on `Shutdown` or once every `QuizHandle` is dropped.
    #[must_use]
    pub fn spawn(
        bank: Arc<WordBank>,
        config: QuizConfig,
        clock: Clock,
    ) -> (QuizHandle, watch::Receiver<QuizSnapshot>, JoinHandle<()>) {
        let session = QuizSession::start(&bank, &config, clock);
        let (snapshots, snapshot_rx) = watch::channel(session.snapshot());
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let controller = Self {
            session,
            bank,
            timings: config.timings,
            timers: TimerSet::new(timer_tx),
            timer_rx,
            commands,
            snapshots,
        };
        let task = tokio::spawn(controller.run());

        (
            QuizHandle {
                commands: command_tx,
            },
            snapshot_rx,
            task,
        )
    }

    async fn run(mut self) {
        self.enter_question();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(QuizCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(stamped) = self.timer_rx.recv() => {
                    if self.timers.is_stale(&stamped) {
                        debug!(
                            session = %self.session.id(),
                            event = ?stamped.event,
                            "dropping stale timer event"
                        );
                        continue;
                    }
                    self.handle_timer(stamped.event);
                }
            }
        }

        self.timers.cancel_all();
        debug!(session = %self.session.id(), "quiz controller stopped");
    }

    fn handle_command(&mut self, command: QuizCommand) {
        match command {
            QuizCommand::SelectAnswer(answer) => {
                let applied = self.session.select_answer(&answer);
                self.after_selection(applied);
            }
            QuizCommand::SelectOption(index) => {
                let applied = self.session.select_option(index);
                self.after_selection(applied);
            }
            QuizCommand::NextQuestion => self.advance(),
            QuizCommand::EndEarly => {
                if self.session.end_early().is_applied() {
                    self.timers.cancel_all();
                    self.publish();
                }
            }
            QuizCommand::Restart => {
                self.session.restart(&self.bank);
                self.enter_question();
            }
            QuizCommand::Shutdown => {}
        }
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::ShowOptions => {
                if self.session.show_options().is_applied() {
                    self.timers.every(self.timings.tick, TimerEvent::Tick);
                    self.publish();
                }
            }
            TimerEvent::Tick => {
                if self.session.tick(self.timings.tick).is_applied() {
                    if self.session.timed_out() {
                        self.timers.cancel_all();
                    }
                    self.publish();
                }
            }
            TimerEvent::RevealResult => {
                if self.session.reveal_result().is_applied() {
                    self.timers
                        .after(self.timings.auto_advance_delay, TimerEvent::AutoAdvance);
                    self.publish();
                }
            }
            TimerEvent::AutoAdvance => self.advance(),
        }
    }

    fn after_selection(&mut self, applied: Transition) {
        if applied.is_applied() {
            self.timers.cancel_all();
            self.timers
                .after(self.timings.reveal_delay, TimerEvent::RevealResult);
            self.publish();
        }
    }

    fn advance(&mut self) {
        if !self.session.next_question().is_applied() {
            return;
        }
        if self.session.is_complete() {
            self.timers.cancel_all();
            self.publish();
        } else {
            self.enter_question();
        }
    }

    fn enter_question(&mut self) {
        self.timers.cancel_all();
        if !self.session.is_complete() {
            self.timers
                .after(self.timings.options_delay, TimerEvent::ShowOptions);
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}
