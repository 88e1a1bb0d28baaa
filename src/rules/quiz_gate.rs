use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::formulas::shuffle;
use crate::progress::MAX_KEYS;
use crate::quiz::QuizQuestion;

/// The basement door only opens for a player holding every key.
pub fn gate_open(keys_collected: u8) -> bool {
    keys_collected >= MAX_KEYS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum QuizPhase {
    AwaitingAnswer { index: usize },
    ShowingFeedback { index: usize, correct: bool },
    AllAnswered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestionRecord {
    pub attempts: u32,
    pub answered_correctly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct {
        index: usize,
        explanation: &'static str,
    },
    Incorrect {
        index: usize,
    },
    /// Feedback is showing, the session is over, or the option does not exist.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    NextQuestion(usize),
    Retry(usize),
    Completed,
    Ignored,
}

/// One randomized run through the quiz.
///
/// Exactly one question is active at a time. A wrong answer keeps the cursor
/// on the same question; answers are ignored while feedback is displayed.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    questions: Vec<&'static QuizQuestion>,
    records: Vec<QuestionRecord>,
    phase: QuizPhase,
}

impl QuizSession {
    /// Draw `length` distinct questions from `catalog` in uniformly random order.
    ///
    /// A catalog shorter than `length` yields a session of the whole catalog.
    pub fn draw<R: Rng + ?Sized>(
        catalog: &'static [QuizQuestion],
        length: usize,
        rng: &mut R,
    ) -> Self {
        let all: Vec<&'static QuizQuestion> = catalog.iter().collect();
        let mut questions = shuffle(&all, rng);
        questions.truncate(length);
        let phase = if questions.is_empty() {
            QuizPhase::AllAnswered
        } else {
            QuizPhase::AwaitingAnswer { index: 0 }
        };
        QuizSession {
            id: Uuid::new_v4(),
            records: vec![QuestionRecord::default(); questions.len()],
            questions,
            phase,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn questions(&self) -> &[&'static QuizQuestion] {
        &self.questions
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    /// Index of the active question, or `len()` once everything is answered.
    pub fn cursor(&self) -> usize {
        match self.phase {
            QuizPhase::AwaitingAnswer { index } | QuizPhase::ShowingFeedback { index, .. } => index,
            QuizPhase::AllAnswered => self.questions.len(),
        }
    }

    pub fn current(&self) -> Option<&'static QuizQuestion> {
        match self.phase {
            QuizPhase::AwaitingAnswer { index } | QuizPhase::ShowingFeedback { index, .. } => {
                self.questions.get(index).copied()
            }
            QuizPhase::AllAnswered => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::AllAnswered
    }

    pub fn answer(&mut self, option: usize) -> AnswerOutcome {
        let QuizPhase::AwaitingAnswer { index } = self.phase else {
            return AnswerOutcome::Ignored;
        };
        let question = self.questions[index];
        if option >= question.options.len() {
            return AnswerOutcome::Ignored;
        }

        let correct = question.is_correct(option);
        let record = &mut self.records[index];
        record.attempts += 1;
        record.answered_correctly |= correct;
        self.phase = QuizPhase::ShowingFeedback { index, correct };

        if correct {
            AnswerOutcome::Correct {
                index,
                explanation: question.explanation,
            }
        } else {
            AnswerOutcome::Incorrect { index }
        }
    }

    /// Close the feedback display: advance after a correct answer, retry after a wrong one.
    pub fn finish_feedback(&mut self) -> FeedbackOutcome {
        let QuizPhase::ShowingFeedback { index, correct } = self.phase else {
            return FeedbackOutcome::Ignored;
        };
        if !correct {
            self.phase = QuizPhase::AwaitingAnswer { index };
            return FeedbackOutcome::Retry(index);
        }
        if index + 1 >= self.questions.len() {
            self.phase = QuizPhase::AllAnswered;
            FeedbackOutcome::Completed
        } else {
            self.phase = QuizPhase::AwaitingAnswer { index: index + 1 };
            FeedbackOutcome::NextQuestion(index + 1)
        }
    }
}
