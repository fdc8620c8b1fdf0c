//! In-memory quiz sessions.
//!
//! [`SessionStore`] owns every [`Session`]. Sessions live in a sharded
//! [`DashMap`]; each operation holds the shard lock for the session it
//! touches, so two answers for the same session are applied one after the
//! other while unrelated sessions proceed independently. No lock is held
//! across an `.await`.

use std::{sync::Arc, time::Duration};

use dashmap::{DashMap, mapref::entry::Entry};
use nanoid::nanoid;
use rand::seq::SliceRandom;
use serde::Serialize;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    error::QuizError,
    question::{Question, QuestionBank},
};

pub type SessionId = String;

/// One answered question, in the order it was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    pub user_answer: usize,
    pub correct_answer: usize,
    pub is_correct: bool,
}

/// The question a session is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentQuestion {
    /// 1-based position within the session.
    pub number: usize,
    pub total: usize,
    pub question: Question,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub time_taken_secs: u64,
    pub answers: Vec<AnswerRecord>,
}

/// State of a single quiz attempt.
///
/// `answers.len() == cursor` and `score` equals the number of correct
/// answers at all times; the question list never changes after creation.
#[derive(Debug, Clone)]
pub struct Session {
    questions: Vec<Question>,
    cursor: usize,
    score: usize,
    answers: Vec<AnswerRecord>,
    started_at: Instant,
}

impl Session {
    fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            cursor: 0,
            score: 0,
            answers: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.questions.len()
    }

    fn current(&self) -> Result<CurrentQuestion, QuizError> {
        let question = self
            .questions
            .get(self.cursor)
            .ok_or(QuizError::QuizCompleted)?;
        Ok(CurrentQuestion {
            number: self.cursor + 1,
            total: self.total(),
            question: question.clone(),
        })
    }

    fn answer(&mut self, index: i64) -> Result<AnswerOutcome, QuizError> {
        let question = self
            .questions
            .get(self.cursor)
            .ok_or(QuizError::AlreadyCompleted)?;

        let options = question.options.len();
        let chosen = usize::try_from(index)
            .ok()
            .filter(|chosen| *chosen < options)
            .ok_or(QuizError::InvalidAnswer { index, options })?;

        let correct = chosen == question.correct;
        self.answers.push(AnswerRecord {
            question: question.text.clone(),
            user_answer: chosen,
            correct_answer: question.correct,
            is_correct: correct,
        });
        let outcome = AnswerOutcome {
            correct,
            correct_answer: question.correct,
            explanation: question.explanation.clone(),
        };

        if correct {
            self.score += 1;
        }
        self.cursor += 1;
        Ok(outcome)
    }

    fn results(&self) -> QuizResults {
        let total = self.total();
        let percentage = if total == 0 {
            0
        } else {
            (self.score as f64 * 100.0 / total as f64).round() as u32
        };
        let elapsed = self.started_at.elapsed();

        QuizResults {
            score: self.score,
            total,
            percentage,
            time_taken_secs: elapsed.as_secs_f64().round() as u64,
            answers: self.answers.clone(),
        }
    }
}

/// Owns all live sessions and the question bank they are drawn from.
pub struct SessionStore {
    bank: Arc<QuestionBank>,
    sessions: DashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            sessions: DashMap::new(),
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Starts a session over a uniformly shuffled sample of the bank and
    /// returns its id together with the number of questions it holds.
    pub fn create(&self, question_count: usize) -> (SessionId, usize) {
        let mut questions = self.bank.all().to_vec();
        questions.shuffle(&mut rand::thread_rng());
        questions.truncate(question_count);

        let total = questions.len();
        let id = self.insert(Session::new(questions), || nanoid!());
        debug!(session_id = %id, total, "session created");
        (id, total)
    }

    /// Stores `session` under the first id from `next_id` that is not taken.
    fn insert(&self, session: Session, mut next_id: impl FnMut() -> SessionId) -> SessionId {
        loop {
            match self.sessions.entry(next_id()) {
                Entry::Vacant(slot) => {
                    let id = slot.key().clone();
                    slot.insert(session);
                    return id;
                }
                Entry::Occupied(slot) => {
                    debug!(session_id = %slot.key(), "session id collision, retrying");
                }
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Returns a snapshot of the session.
    pub fn get(&self, id: &str) -> Result<Session, QuizError> {
        self.sessions
            .get(id)
            .map(|session| session.value().clone())
            .ok_or(QuizError::SessionNotFound)
    }

    /// Returns the unanswered question at the cursor without advancing it.
    pub fn current_question(&self, id: &str) -> Result<CurrentQuestion, QuizError> {
        let session = self.sessions.get(id).ok_or(QuizError::SessionNotFound)?;
        session.current()
    }

    /// Scores `answer_index` against the current question and advances.
    ///
    /// An out-of-range index is rejected and leaves the session untouched.
    pub fn record_answer(&self, id: &str, answer_index: i64) -> Result<AnswerOutcome, QuizError> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or(QuizError::SessionNotFound)?;
        session.answer(answer_index)
    }

    /// Score summary so far; valid before the last question is answered.
    pub fn results(&self, id: &str) -> Result<QuizResults, QuizError> {
        let session = self.sessions.get(id).ok_or(QuizError::SessionNotFound)?;
        Ok(session.results())
    }

    /// Drops every session started more than `retention` ago and returns
    /// how many were removed.
    pub fn evict_older_than(&self, retention: Duration) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.sessions.retain(|_, session| {
            let keep = now.saturating_duration_since(session.started_at) <= retention;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Runs [`SessionStore::evict_older_than`] every `period` until the returned
/// handle is aborted.
pub fn spawn_eviction_sweeper(
    store: Arc<SessionStore>,
    period: Duration,
    retention: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = store.evict_older_than(retention);
            if evicted > 0 {
                info!(evicted, remaining = store.len(), "evicted expired sessions");
            } else {
                debug!(remaining = store.len(), "eviction sweep found nothing to remove");
            }
        }
    })
}
