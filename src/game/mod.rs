//! The progression state machine.
//!
//! [`Game`] is the single owner of [`ProgressTracker`]. The presentation layer
//! feeds it [`Input`]s and elapsed time, then drains [`Notification`]s. All
//! delayed work (message pacing, scene changes, quiz feedback) lives in the
//! game's [`Scheduler`] and is cancelled whenever the state changes.

pub mod events;
pub mod scheduler;

use std::time::Duration;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::persistence::ProgressStore;
use crate::progress::{GameProgress, GameState, ProgressTracker};
use crate::quiz::catalog;
use crate::rules::billing::format_rupiah;
use crate::rules::circuit::tv_step_message;
use crate::rules::quiz_gate::gate_open;
use crate::rules::{
    Aabb, AnswerOutcome, Device, BillReading, BillingOutcome, BillingPuzzle, CableOutcome, CircuitPuzzle,
    EfficiencyOutcome, EfficiencyPuzzle, EfficiencyReading, FeedbackOutcome, QuizPhase,
    QuizSession, TvOutcome,
};
pub use events::{AudioCue, Input, Meter, Notification, Severity};
pub use scheduler::{Scheduler, TaskId};

/// Keys Level 1 hands out before the kitchen opens.
const LEVEL1_KEYS: u8 = 2;

const LEVEL1_INTRO: &str = "Rumah gelap! Perbaiki rangkaian listrik agar lampu menyala";
const LEVEL1_DONE: &str = "Level 1 Selesai! Semua kunci energi terkumpul. Menuju dapur...";
const LEVEL2_INTRO: &str = "Dapur penuh peralatan listrik. Gunakan perangkat dengan bijak!";
const LEVEL2_DONE: &str = "Level 2 Selesai! Menuju laboratorium...";
const LEVEL3_DONE: &str = "Level 3 Selesai! Menuju basement untuk quiz final...";
const LEVEL4_BLOCKED: &str = "Kamu memerlukan 3 Kunci Energi untuk membuka level ini!";

/// Delayed work owned by the current state.
#[derive(Debug, Clone, PartialEq)]
enum Timer {
    Announce(&'static str),
    Transition(GameState),
    QuizFeedbackElapsed,
}

/// Per-level puzzle state. Rebuilt on every entry, never persisted.
#[derive(Debug)]
enum ActiveLevel {
    Idle,
    Circuit {
        puzzle: CircuitPuzzle,
        completion_scheduled: bool,
    },
    Efficiency(EfficiencyPuzzle),
    Billing(BillingPuzzle),
    Quiz(QuizSession),
    /// Entered Level 4 without enough keys; waiting for the redirect.
    QuizBlocked,
}

/// Read-only picture of the game for a freshly connected client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub progress: GameProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<CircuitView>,
    /// Appliances of the kitchen or lab, with their current on/off state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<EfficiencyReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill: Option<BillReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CircuitView {
    pub cable_connected: bool,
    pub tv_step: u8,
    pub tv_solved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizView {
    pub phase: QuizPhase,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub options: Vec<String>,
}

pub struct Game {
    config: GameConfig,
    progress: ProgressTracker,
    scheduler: Scheduler<Timer>,
    level: ActiveLevel,
    outbox: Vec<Notification>,
    rng: ChaCha8Rng,
}

impl Game {
    /// Start a new process at the opening scene with default progress.
    pub fn new(config: GameConfig, store: Box<dyn ProgressStore>) -> Self {
        let seed = config.quiz_seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        debug!(seed, "Quiz RNG seeded");
        let mut game = Game {
            config,
            progress: ProgressTracker::new(store),
            scheduler: Scheduler::new(),
            level: ActiveLevel::Idle,
            outbox: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        game.setup(GameState::OpeningScene);
        game
    }

    pub fn state(&self) -> GameState {
        self.progress.state()
    }

    pub fn progress(&self) -> &GameProgress {
        self.progress.progress()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn quiz_session(&self) -> Option<&QuizSession> {
        match &self.level {
            ActiveLevel::Quiz(session) => Some(session),
            _ => None,
        }
    }

    pub fn circuit_puzzle(&self) -> Option<&CircuitPuzzle> {
        match &self.level {
            ActiveLevel::Circuit { puzzle, .. } => Some(puzzle),
            _ => None,
        }
    }

    pub fn efficiency_puzzle(&self) -> Option<&EfficiencyPuzzle> {
        match &self.level {
            ActiveLevel::Efficiency(puzzle) => Some(puzzle),
            _ => None,
        }
    }

    pub fn billing_puzzle(&self) -> Option<&BillingPuzzle> {
        match &self.level {
            ActiveLevel::Billing(puzzle) => Some(puzzle),
            _ => None,
        }
    }

    /// Time until the next scheduled task, if any.
    pub fn until_next_timer(&self) -> Option<Duration> {
        self.scheduler.until_next()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    pub fn view(&self) -> GameView {
        let quiz = self.quiz_session().map(|session| {
            let current = session.current();
            QuizView {
                phase: session.phase(),
                total: session.len(),
                question: current.map(|q| q.question.to_string()),
                options: current
                    .map(|q| q.options.iter().map(|o| o.to_string()).collect())
                    .unwrap_or_default(),
            }
        });
        let circuit = self.circuit_puzzle().map(|p| CircuitView {
            cable_connected: p.cable_connected(),
            tv_step: p.tv_step(),
            tv_solved: p.tv_solved(),
        });
        let devices = match &self.level {
            ActiveLevel::Efficiency(p) => Some(p.devices().to_vec()),
            ActiveLevel::Billing(p) => Some(p.devices().to_vec()),
            _ => None,
        };
        GameView {
            progress: self.progress().clone(),
            circuit,
            devices,
            efficiency: self.efficiency_puzzle().map(|p| p.reading()),
            bill: self.billing_puzzle().map(|p| p.reading()),
            quiz,
        }
    }

    /// Apply one player action. Actions that make no sense in the current
    /// state are dropped.
    pub fn handle(&mut self, input: Input) {
        let state = self.state();
        match (state, input) {
            (GameState::OpeningScene, Input::SkipOpening) => self.transition(GameState::MainMenu),
            (GameState::MainMenu, Input::NewGame) => {
                self.progress.reset();
                self.enter(GameState::MainMenu, GameState::Level1);
            }
            (GameState::MainMenu, Input::Continue) => self.resume(),
            (GameState::Level1, Input::ConnectCable { dragged, target }) => {
                self.connect_cable(&dragged, &target)
            }
            (GameState::Level1, Input::ClickTelevision) => self.click_television(),
            (GameState::Level2, Input::ToggleDevice { name }) => self.toggle_kitchen(&name),
            (GameState::Level3, Input::ToggleDevice { name }) => self.toggle_lab(&name),
            (GameState::Level4, Input::Answer { option }) => self.answer(option),
            (_, Input::ResetProgress) => self.reset(),
            (s, Input::ReturnToMenu) if s != GameState::MainMenu => {
                self.transition(GameState::MainMenu)
            }
            (s, input) => debug!(state = %s, ?input, "Input ignored in current state"),
        }
    }

    /// Move the game clock forward and run every task that came due.
    pub fn advance(&mut self, elapsed: Duration) {
        let deadline = self.scheduler.now() + elapsed;
        while let Some(timer) = self.scheduler.pop_due(deadline) {
            self.on_timer(timer);
        }
        self.scheduler.advance_clock(deadline);
    }

    fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Announce(text) => self.notify(Notification::message(text, Severity::Success)),
            Timer::Transition(to) => self.transition(to),
            Timer::QuizFeedbackElapsed => self.finish_quiz_feedback(),
        }
    }

    // --- State changes -------------------------------------------------

    fn transition(&mut self, to: GameState) {
        let from = self.state();
        self.enter(from, to);
    }

    fn enter(&mut self, from: GameState, to: GameState) {
        self.teardown();
        self.progress.change_state(to);
        self.notify(Notification::StateChanged { from, to });
        self.setup(to);
    }

    /// Cancel everything the outgoing state scheduled.
    fn teardown(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "Cancelled pending timers on state exit");
        }
        self.level = ActiveLevel::Idle;
    }

    fn setup(&mut self, state: GameState) {
        match state {
            GameState::OpeningScene => {
                self.schedule(
                    self.config.timing.opening_scene,
                    Timer::Transition(GameState::MainMenu),
                );
            }
            GameState::MainMenu => {}
            GameState::Level1 => self.enter_level1(),
            GameState::Level2 => self.enter_level2(),
            GameState::Level3 => self.enter_level3(),
            GameState::Level4 => self.enter_level4(),
            GameState::EndingScene => {
                self.notify(Notification::message(
                    "Selamat! Kamu telah menguasai cara menghemat energi listrik!",
                    Severity::Success,
                ));
            }
        }
    }

    fn reset(&mut self) {
        let from = self.state();
        self.teardown();
        self.progress.reset();
        let to = self.state();
        self.notify(Notification::StateChanged { from, to });
        self.setup(to);
    }

    fn resume(&mut self) {
        if !self.progress.load() && self.progress.keys() == 0 {
            debug!("Nothing saved to continue");
            return;
        }
        let saved = self.state();
        let target = if saved.is_level() {
            saved
        } else {
            GameState::Level1
        };
        info!(saved = %saved, resume = %target, "Continuing saved game");
        // The record was replaced wholesale, so report the change from the menu.
        self.enter(GameState::MainMenu, target);
    }

    // --- Level 1 -------------------------------------------------------

    fn enter_level1(&mut self) {
        let p = self.progress();
        let puzzle = CircuitPuzzle::resume(p.level1_cable_solved, p.level1_tv_solved);
        self.level = ActiveLevel::Circuit {
            puzzle,
            completion_scheduled: false,
        };
        self.notify(Notification::message(LEVEL1_INTRO, Severity::Info));
        self.check_level1_complete();
    }

    fn connect_cable(&mut self, dragged: &Aabb, target: &Aabb) {
        let tolerance = self.config.placement_tolerance;
        let ActiveLevel::Circuit { puzzle, .. } = &mut self.level else {
            return;
        };
        match puzzle.connect_cable(dragged, target, tolerance) {
            CableOutcome::Connected => {
                info!("Cable puzzle solved: battery, switch and lamp form a closed circuit");
                self.progress.set_level1_cable_solved(true);
                self.notify(Notification::message(
                    "Rangkaian benar! Listrik mengalir dalam rangkaian tertutup!",
                    Severity::Success,
                ));
                self.cue(AudioCue::Success);
                self.award_key();
                self.check_level1_complete();
            }
            CableOutcome::WrongPlacement => {
                self.cue(AudioCue::Hit);
                self.notify(Notification::message(
                    "Salah sambung! Coba lagi dengan posisi yang benar",
                    Severity::Error,
                ));
            }
            CableOutcome::AlreadySolved => debug!("Cable already connected"),
        }
    }

    fn click_television(&mut self) {
        let ActiveLevel::Circuit { puzzle, .. } = &mut self.level else {
            return;
        };
        match puzzle.click_television() {
            TvOutcome::Step(step) => {
                self.notify(Notification::message(tv_step_message(step), Severity::Info));
                self.cue(AudioCue::Hit);
            }
            TvOutcome::Solved => {
                info!("TV puzzle solved");
                self.progress.set_level1_tv_solved(true);
                self.notify(Notification::message(
                    "TV menyala! Rekaman Profesor: 'Carilah kunci energi untuk membuka lab!'",
                    Severity::Success,
                ));
                self.cue(AudioCue::Success);
                self.award_key();
                self.check_level1_complete();
            }
            TvOutcome::AlreadySolved => debug!("TV already on"),
        }
    }

    fn check_level1_complete(&mut self) {
        let keys = self.progress.keys();
        let ActiveLevel::Circuit {
            completion_scheduled,
            ..
        } = &mut self.level
        else {
            return;
        };
        if keys < LEVEL1_KEYS || *completion_scheduled {
            return;
        }
        *completion_scheduled = true;
        let announce = self.config.timing.level1_announce;
        self.schedule_completion(announce, LEVEL1_DONE, GameState::Level2);
    }

    // --- Level 2 -------------------------------------------------------

    fn enter_level2(&mut self) {
        let puzzle = EfficiencyPuzzle::new(
            self.config.level2_devices.clone(),
            self.config.efficiency_target,
        );
        let reading = puzzle.reading();
        self.level = ActiveLevel::Efficiency(puzzle);
        self.notify(Notification::message(LEVEL2_INTRO, Severity::Info));
        self.publish_efficiency(reading);
    }

    fn toggle_kitchen(&mut self, name: &str) {
        let ActiveLevel::Efficiency(puzzle) = &mut self.level else {
            return;
        };
        let Some(outcome) = puzzle.toggle(name) else {
            debug!(device = name, "Unknown kitchen device");
            return;
        };
        let on = device_state(puzzle.devices(), name);
        self.notify(Notification::DeviceToggled {
            name: name.to_string(),
            on,
        });
        let reading = outcome.reading();
        debug!(
            device = name,
            used_watts = reading.used_watts,
            efficiency = reading.efficiency,
            "Kitchen device toggled"
        );
        self.publish_efficiency(reading);

        match outcome {
            EfficiencyOutcome::KeyEarned(r) => {
                info!(efficiency = r.efficiency, "Efficiency target reached");
                self.cue(AudioCue::Success);
                self.notify(Notification::message(
                    "Efisiensi tercapai! Kunci energi didapat!",
                    Severity::Success,
                ));
                self.award_key();
                let announce = self.config.timing.level_announce;
                self.schedule_completion(announce, LEVEL2_DONE, GameState::Level3);
            }
            EfficiencyOutcome::Wasteful(_) => {
                self.cue(AudioCue::Hit);
                self.notify(Notification::message(
                    "Terlalu boros! Matikan beberapa perangkat yang tidak penting",
                    Severity::Error,
                ));
            }
            EfficiencyOutcome::Steady(_) => {}
        }
    }

    fn publish_efficiency(&mut self, reading: EfficiencyReading) {
        self.progress.set_level2_efficiency(reading.efficiency);
        self.notify(Notification::Meter {
            meter: Meter::Efficiency,
            value: reading.efficiency,
        });
        self.notify(Notification::Meter {
            meter: Meter::PowerUsage,
            value: reading.power_usage,
        });
    }

    // --- Level 3 -------------------------------------------------------

    fn enter_level3(&mut self) {
        let puzzle = BillingPuzzle::new(
            self.config.level3_devices.clone(),
            self.config.price_per_kwh,
            self.config.bill_target,
        );
        let reading = puzzle.reading();
        self.level = ActiveLevel::Billing(puzzle);
        self.notify(Notification::message(
            format!(
                "Atur penggunaan agar tagihan ≤ Rp {}",
                format_rupiah(self.config.bill_target)
            ),
            Severity::Info,
        ));
        self.publish_bill(reading);
    }

    fn toggle_lab(&mut self, name: &str) {
        let ActiveLevel::Billing(puzzle) = &mut self.level else {
            return;
        };
        let Some(outcome) = puzzle.toggle(name) else {
            debug!(device = name, "Unknown lab device");
            return;
        };
        let on = device_state(puzzle.devices(), name);
        self.notify(Notification::DeviceToggled {
            name: name.to_string(),
            on,
        });
        let reading = outcome.reading();
        debug!(
            device = name,
            kwh = reading.total_kwh,
            bill = reading.bill,
            "Lab device toggled"
        );
        self.publish_bill(reading);

        match outcome {
            BillingOutcome::KeyEarned(r) => {
                info!(bill = r.bill, kwh = r.total_kwh, "Bill target achieved");
                self.cue(AudioCue::Success);
                self.notify(Notification::message(
                    format!(
                        "Target tercapai! Tagihan: Rp {}. Kunci energi didapat!",
                        format_rupiah(r.bill)
                    ),
                    Severity::Success,
                ));
                self.award_key();
                let announce = self.config.timing.level_announce;
                self.schedule_completion(announce, LEVEL3_DONE, GameState::Level4);
            }
            BillingOutcome::BackUnderTarget(r) => {
                self.notify(Notification::message(
                    format!("Tagihan kembali efisien: Rp {}", format_rupiah(r.bill)),
                    Severity::Success,
                ));
            }
            BillingOutcome::OverTarget(r) => {
                self.cue(AudioCue::Hit);
                self.notify(Notification::message(
                    format!(
                        "Tagihan terlalu tinggi: Rp {}! Matikan perangkat boros",
                        format_rupiah(r.bill)
                    ),
                    Severity::Error,
                ));
            }
            BillingOutcome::UnderTarget(_) | BillingOutcome::Idle(_) => {}
        }
    }

    fn publish_bill(&mut self, reading: BillReading) {
        self.progress.set_level3_bill(reading.bill);
        self.notify(Notification::Meter {
            meter: Meter::Bill,
            value: reading.bill,
        });
        self.notify(Notification::Meter {
            meter: Meter::EnergyKwh,
            value: reading.total_kwh,
        });
    }

    // --- Level 4 -------------------------------------------------------

    fn enter_level4(&mut self) {
        let keys = self.progress.keys();
        if !gate_open(keys) {
            info!(keys, "Basement locked: not enough energy keys");
            self.level = ActiveLevel::QuizBlocked;
            self.notify(Notification::Blocking {
                text: LEVEL4_BLOCKED.to_string(),
            });
            self.schedule(
                self.config.timing.blocked_redirect,
                Timer::Transition(GameState::MainMenu),
            );
            return;
        }

        let session = QuizSession::draw(catalog(), self.config.quiz_session_length, &mut self.rng);
        info!(session = %session.id(), questions = session.len(), "Quiz session started");
        self.level = ActiveLevel::Quiz(session);
        self.progress.set_quiz_progress(0);
        self.show_current_question();
    }

    fn answer(&mut self, option: usize) {
        let ActiveLevel::Quiz(session) = &mut self.level else {
            return;
        };
        match session.answer(option) {
            AnswerOutcome::Correct { index, explanation } => {
                self.cue(AudioCue::Success);
                self.notify(Notification::QuizFeedback {
                    index,
                    correct: true,
                    explanation: Some(explanation.to_string()),
                });
                self.schedule(self.config.timing.quiz_feedback, Timer::QuizFeedbackElapsed);
            }
            AnswerOutcome::Incorrect { index } => {
                self.cue(AudioCue::Hit);
                self.notify(Notification::QuizFeedback {
                    index,
                    correct: false,
                    explanation: None,
                });
                self.schedule(self.config.timing.quiz_feedback, Timer::QuizFeedbackElapsed);
            }
            AnswerOutcome::Ignored => debug!(option, "Answer ignored"),
        }
    }

    fn finish_quiz_feedback(&mut self) {
        let ActiveLevel::Quiz(session) = &mut self.level else {
            return;
        };
        match session.finish_feedback() {
            FeedbackOutcome::NextQuestion(index) => {
                self.progress.set_quiz_progress(index);
                self.show_current_question();
            }
            FeedbackOutcome::Retry(_) => self.show_current_question(),
            FeedbackOutcome::Completed => {
                let total = session.len();
                info!(questions = total, "Quiz complete, basement door unlocked");
                self.progress.set_quiz_progress(total);
                self.notify(Notification::DoorUnlocked);
                self.notify(Notification::message(
                    "Pintu basement terbuka! Semua soal terjawab dengan benar!",
                    Severity::Success,
                ));
                self.schedule(
                    self.config.timing.door_open,
                    Timer::Transition(GameState::EndingScene),
                );
            }
            FeedbackOutcome::Ignored => {}
        }
    }

    fn show_current_question(&mut self) {
        let ActiveLevel::Quiz(session) = &self.level else {
            return;
        };
        let Some(question) = session.current() else {
            return;
        };
        let notification = Notification::QuizQuestion {
            index: session.cursor(),
            total: session.len(),
            question: question.question.to_string(),
            options: question.options.iter().map(|o| o.to_string()).collect(),
        };
        self.notify(notification);
    }

    // --- Helpers -------------------------------------------------------

    fn award_key(&mut self) {
        let total = self.progress.add_key();
        self.notify(Notification::KeyCollected { total });
    }

    /// Announce the level as done after `announce_ms`, then change state once
    /// the transition delay has also passed.
    fn schedule_completion(&mut self, announce_ms: u64, text: &'static str, next: GameState) {
        let transition_ms = announce_ms.saturating_add(self.config.timing.level_transition);
        self.schedule(announce_ms, Timer::Announce(text));
        self.schedule(transition_ms, Timer::Transition(next));
    }

    fn schedule(&mut self, delay_ms: u64, timer: Timer) -> TaskId {
        self.scheduler.schedule(Duration::from_millis(delay_ms), timer)
    }

    fn notify(&mut self, notification: Notification) {
        self.outbox.push(notification);
    }

    fn cue(&mut self, cue: AudioCue) {
        self.notify(Notification::Audio { cue });
    }
}

fn device_state(devices: &[Device], name: &str) -> bool {
    devices.iter().any(|d| d.name == name && d.on)
}
