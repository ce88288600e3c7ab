//! Study session tracking and the flashcard session controller

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{GestureConfig, StudyModeConfig};
use crate::error::{CoreError, CoreResult};
use crate::gesture::{resolve_gesture, GestureOutcome};
use crate::models::{new_id, StudyMode, StudyResult, StudySession, Word, WordSet};

impl StudySession {
    pub fn start(word_set_id: &str, mode: StudyMode, total_questions: u32) -> Self {
        Self::start_at(word_set_id, mode, total_questions, Utc::now())
    }

    pub fn start_at(word_set_id: &str, mode: StudyMode, total_questions: u32, at: DateTime<Utc>) -> Self {
        StudySession {
            id: new_id("session"),
            word_set_id: word_set_id.to_string(),
            mode,
            start_time: at,
            end_time: None,
            duration: None,
            words_studied: 0,
            correct_answers: 0,
            total_questions,
            accuracy: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Count one graded card
    pub fn grade(&mut self, is_correct: bool) -> CoreResult<()> {
        if self.is_finished() {
            return Err(CoreError::SessionState(format!("Session {} is already finished", self.id)));
        }
        self.words_studied += 1;
        if is_correct {
            self.correct_answers += 1;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> CoreResult<()> {
        self.finish_at(Utc::now())
    }

    /// Close the session at `at`. Duration is whole seconds, never negative.
    pub fn finish_at(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        if self.is_finished() {
            return Err(CoreError::SessionState(format!("Session {} is already finished", self.id)));
        }
        self.end_time = Some(at);
        self.duration = Some((at - self.start_time).num_seconds().max(0));
        self.accuracy = if self.total_questions > 0 {
            self.correct_answers as f64 / self.total_questions as f64 * 100.0
        } else {
            0.0
        };
        Ok(())
    }
}

/// Everything produced by one finished session, ready to persist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub session: StudySession,
    pub results: Vec<StudyResult>,
    pub words_in_set: usize,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Active(StudySession),
    Finished(CompletedSession),
}

/// Coarse controller state, for callers that only need to branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Active,
    Finished,
}

/// Owns the flashcard deck and the current session.
///
/// Transitions: `Idle -> Active -> Finished -> Idle`; `cancel` goes from
/// `Active` straight back to `Idle` and discards the session.
#[derive(Debug, Clone)]
pub struct StudyController {
    phase: Phase,
    config: StudyModeConfig,
    gesture: GestureConfig,
    deck: Vec<Word>,
    index: usize,
    results: Vec<StudyResult>,
    words_in_set: usize,
    card_shown_at: DateTime<Utc>,
}

impl StudyController {
    pub fn new(config: StudyModeConfig, gesture: GestureConfig) -> Self {
        StudyController {
            phase: Phase::Idle,
            config,
            gesture,
            deck: Vec::new(),
            index: 0,
            results: Vec::new(),
            words_in_set: 0,
            card_shown_at: Utc::now(),
        }
    }

    pub fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Idle => ControllerState::Idle,
            Phase::Active(_) => ControllerState::Active,
            Phase::Finished(_) => ControllerState::Finished,
        }
    }

    pub fn session(&self) -> Option<&StudySession> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Active(session) => Some(session),
            Phase::Finished(done) => Some(&done.session),
        }
    }

    pub fn start(&mut self, word_set: &WordSet) -> CoreResult<&StudySession> {
        self.start_with_rng(word_set, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, word_set: &WordSet, rng: &mut R) -> CoreResult<&StudySession> {
        if let Phase::Active(session) = &self.phase {
            return Err(CoreError::SessionState(format!("Session {} is still active", session.id)));
        }
        if word_set.words.is_empty() {
            return Err(CoreError::Validation(format!("Word set '{}' has no words", word_set.title)));
        }

        let mut deck = word_set.words.clone();
        if self.config.shuffle_cards {
            deck.shuffle(rng);
        }
        if self.config.max_words_per_session > 0 {
            deck.truncate(self.config.max_words_per_session);
        }

        let session = StudySession::start(&word_set.id, self.config.mode, deck.len() as u32);
        log::info!("Started {:?} session {} on '{}' with {} cards",
                   session.mode, session.id, word_set.title, deck.len());

        self.deck = deck;
        self.index = 0;
        self.results.clear();
        self.words_in_set = word_set.words.len();
        self.card_shown_at = Utc::now();
        self.phase = Phase::Active(session);

        self.session()
            .ok_or_else(|| CoreError::SessionState("Session failed to start".to_string()))
    }

    pub fn current_word(&self) -> Option<&Word> {
        match self.phase {
            Phase::Active(_) => self.deck.get(self.index),
            _ => None,
        }
    }

    /// `(position, deck size)`, position counted from 1
    pub fn position(&self) -> (usize, usize) {
        ((self.index + 1).min(self.deck.len()), self.deck.len())
    }

    /// Grade the current card and advance. Returns the next card, if any.
    pub fn grade(&mut self, is_correct: bool) -> CoreResult<Option<&Word>> {
        let session = match &mut self.phase {
            Phase::Active(session) => session,
            _ => return Err(CoreError::SessionState("No active session to grade".to_string())),
        };
        let word = self
            .deck
            .get(self.index)
            .cloned()
            .ok_or_else(|| CoreError::SessionState("No card left to grade".to_string()))?;

        session.grade(is_correct)?;

        let now = Utc::now();
        self.results.push(StudyResult {
            id: new_id("result"),
            session_id: session.id.clone(),
            word_id: word.id.clone(),
            user_answer: if is_correct { "known" } else { "again" }.to_string(),
            correct_answer: word.meaning.clone(),
            is_correct,
            time_spent: (now - self.card_shown_at).num_seconds().max(0),
            timestamp: now,
        });
        self.card_shown_at = now;

        if !is_correct && self.config.repeat_incorrect {
            session.total_questions += 1;
            self.deck.push(word);
        }
        self.index += 1;
        Ok(self.deck.get(self.index))
    }

    /// Resolve a released drag; a committed swipe grades the current card
    pub fn swipe(&mut self, drag_dx: f64, velocity_x: f64) -> CoreResult<GestureOutcome> {
        let outcome = resolve_gesture(drag_dx, velocity_x, &self.gesture);
        if let GestureOutcome::Commit(direction) = outcome {
            self.grade(direction.is_correct())?;
        }
        Ok(outcome)
    }

    /// Abandon the active session without recording anything
    pub fn cancel(&mut self) -> CoreResult<()> {
        match &self.phase {
            Phase::Active(session) => {
                log::info!("Cancelled session {}", session.id);
                self.phase = Phase::Idle;
                self.deck.clear();
                self.results.clear();
                self.index = 0;
                Ok(())
            }
            _ => Err(CoreError::SessionState("Only an active session can be cancelled".to_string())),
        }
    }

    pub fn finish(&mut self) -> CoreResult<CompletedSession> {
        let mut session = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Active(session) => session,
            other => {
                self.phase = other;
                return Err(CoreError::SessionState("No active session to finish".to_string()));
            }
        };
        session.finish()?;

        let done = CompletedSession {
            session,
            results: std::mem::take(&mut self.results),
            words_in_set: self.words_in_set,
        };
        log::info!("Finished session {}: {}/{} correct",
                   done.session.id, done.session.correct_answers, done.session.total_questions);
        self.phase = Phase::Finished(done.clone());
        Ok(done)
    }

    pub fn reset(&mut self) -> CoreResult<()> {
        match self.phase {
            Phase::Finished(_) => {
                self.phase = Phase::Idle;
                self.deck.clear();
                self.index = 0;
                Ok(())
            }
            _ => Err(CoreError::SessionState("Only a finished session can be reset".to_string())),
        }
    }
}

impl Default for StudyController {
    fn default() -> Self {
        Self::new(StudyModeConfig::default(), GestureConfig::default())
    }
}
