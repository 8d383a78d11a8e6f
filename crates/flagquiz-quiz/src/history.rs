//! Solo-play bookkeeping: per-question results and an end-of-game summary.

use std::collections::BTreeSet;
use std::time::Duration;

use flagquiz_protocol::{CountryCode, Difficulty};
use rand::Rng;
use tracing::debug;

use crate::{DistractorSelector, GeneratedQuestion, QuizError};

/// Outcome of one answered (or timed-out) question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_number: u32,
    pub country: CountryCode,
    /// `None` if time ran out.
    pub answer: Option<CountryCode>,
    pub is_correct: bool,
    /// Epoch ms the question was shown.
    pub asked_at: u64,
    /// Epoch ms the answer was given. `None` if time ran out.
    pub answered_at: Option<u64>,
    /// Epoch ms the question was closed, by an answer or by timing out.
    pub closed_at: u64,
}

impl QuestionResult {
    /// How long the question stayed open.
    pub fn response_time(&self) -> Duration {
        Duration::from_millis(self.closed_at.saturating_sub(self.asked_at))
    }
}

/// Aggregate statistics over a finished (or running) game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub total: u32,
    pub correct: u32,
    /// Fraction in `0.0..=1.0`. Zero when nothing was answered.
    pub accuracy: f64,
    pub best_streak: u32,
    /// From the first question shown to the last answer.
    pub elapsed: Duration,
    pub average_response: Option<Duration>,
}

/// Append-only list of question results.
#[derive(Debug, Clone, Default)]
pub struct GameHistory {
    results: Vec<QuestionResult>,
}

impl GameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: QuestionResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Computes the summary for everything recorded so far.
    pub fn summary(&self) -> GameSummary {
        let total = self.results.len() as u32;
        let correct = self.results.iter().filter(|r| r.is_correct).count() as u32;

        let mut best_streak = 0;
        let mut streak = 0;
        for r in &self.results {
            if r.is_correct {
                streak += 1;
                best_streak = best_streak.max(streak);
            } else {
                streak = 0;
            }
        }

        let elapsed = match (self.results.first(), self.results.last()) {
            (Some(first), Some(last)) => {
                Duration::from_millis(last.closed_at.saturating_sub(first.asked_at))
            }
            _ => Duration::ZERO,
        };

        let average_response = (total > 0).then(|| {
            let sum: Duration = self.results.iter().map(QuestionResult::response_time).sum();
            sum / total
        });

        GameSummary {
            total,
            correct,
            accuracy: if total == 0 {
                0.0
            } else {
                f64::from(correct) / f64::from(total)
            },
            best_streak,
            elapsed,
            average_response,
        }
    }
}

/// A single-player game: questions are generated locally and no
/// server is involved.
#[derive(Debug)]
pub struct SoloGame {
    selector: DistractorSelector,
    difficulty: Difficulty,
    question_count: u32,
    used: BTreeSet<CountryCode>,
    current: Option<(u32, GeneratedQuestion, u64)>,
    asked: u32,
    exhausted: bool,
    history: GameHistory,
}

impl SoloGame {
    pub fn new(selector: DistractorSelector, difficulty: Difficulty, question_count: u32) -> Self {
        Self {
            selector,
            difficulty,
            question_count,
            used: BTreeSet::new(),
            current: None,
            asked: 0,
            exhausted: false,
            history: GameHistory::new(),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Shows the next question at `now_ms`.
    ///
    /// Returns `None` when the game is over, either because the
    /// requested number of questions was reached or the pool ran dry.
    /// An unanswered open question is recorded as a timeout first.
    pub fn next_question<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now_ms: u64,
    ) -> Option<&GeneratedQuestion> {
        if self.current.is_some() {
            self.time_out(now_ms);
        }
        if self.asked >= self.question_count || self.exhausted {
            return None;
        }
        let Some(question) = self
            .selector
            .generate_question_with(rng, self.difficulty, &self.used)
        else {
            self.exhausted = true;
            return None;
        };
        self.used.insert(question.target.code.clone());
        self.asked += 1;
        self.current = Some((self.asked, question, now_ms));
        self.current.as_ref().map(|(_, q, _)| q)
    }

    /// Answers the open question.
    pub fn answer(&mut self, code: CountryCode, now_ms: u64) -> Result<&QuestionResult, QuizError> {
        let Some((_, question, _)) = &self.current else {
            return Err(QuizError::NoOpenQuestion);
        };
        if !question.has_option(&code) {
            return Err(QuizError::UnknownOption(code));
        }
        let open = self.current.take().ok_or(QuizError::NoOpenQuestion)?;
        Ok(self.close(open, Some(code), now_ms))
    }

    /// Records the open question as unanswered. Returns `None` if no
    /// question was open.
    pub fn time_out(&mut self, now_ms: u64) -> Option<&QuestionResult> {
        let open = self.current.take()?;
        Some(self.close(open, None, now_ms))
    }

    fn close(
        &mut self,
        (number, question, asked_at): (u32, GeneratedQuestion, u64),
        answer: Option<CountryCode>,
        now_ms: u64,
    ) -> &QuestionResult {
        let is_correct = answer.as_ref() == Some(&question.target.code);
        let closed_at = now_ms.max(asked_at);
        debug!(
            question = number,
            target = %question.target.code,
            is_correct,
            "solo question closed"
        );
        self.history.record(QuestionResult {
            question_number: number,
            country: question.target.code,
            answered_at: answer.is_some().then_some(closed_at),
            answer,
            is_correct,
            asked_at,
            closed_at,
        });
        &self.history.results[self.history.results.len() - 1]
    }

    /// `true` once every question has been asked and closed, or the
    /// pool ran out.
    pub fn is_finished(&self) -> bool {
        self.current.is_none() && (self.asked >= self.question_count || self.exhausted)
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn summary(&self) -> GameSummary {
        self.history.summary()
    }
}
