//! Multiple-choice quiz generation and grading

#[cfg(feature = "python")]
use pyo3::prelude::*;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{new_id, TestAnswer, TestResult, Word, WordSet};

/// Options shown per question
pub const OPTION_COUNT: usize = 4;

/// Smallest pool that can fill every option with a different word
pub const MIN_QUIZ_WORDS: usize = OPTION_COUNT;

/// Quiz question. Never persisted; regenerated for every quiz.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Id of the word this question asks about
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[cfg(feature = "python")]
#[pymethods]
impl QuizQuestion {
    fn __repr__(&self) -> String {
        format!("QuizQuestion(id='{}', question='{}', correct={})",
                self.id, self.question, self.correct_answer)
    }
}

/// Pick three distractors for `answer`, never the answer itself.
///
/// Words whose meaning differs from the answer's are preferred so the
/// options read as distinct; same-meaning words only fill the gap when the
/// pool has too few.
fn pick_distractors<'a, R: Rng + ?Sized>(answer: &Word, pool: &[&'a Word], rng: &mut R) -> Vec<&'a Word> {
    let needed = OPTION_COUNT - 1;
    let (preferred, fallback): (Vec<&Word>, Vec<&Word>) = pool
        .iter()
        .copied()
        .filter(|w| !std::ptr::eq(*w, answer))
        .partition(|w| w.meaning != answer.meaning);

    let mut picked: Vec<&Word> = preferred.choose_multiple(rng, needed).copied().collect();
    if picked.len() < needed {
        let missing = needed - picked.len();
        picked.extend(fallback.choose_multiple(rng, missing).copied());
    }
    picked
}

fn build_question<R: Rng + ?Sized>(answer: &Word, pool: &[&Word], rng: &mut R) -> QuizQuestion {
    let correct_index = rng.gen_range(0..OPTION_COUNT);
    let mut options: Vec<String> = pick_distractors(answer, pool, rng)
        .into_iter()
        .map(|w| w.meaning.clone())
        .collect();
    options.insert(correct_index, answer.meaning.clone());

    QuizQuestion {
        id: answer.id.clone(),
        question: format!("{}의 의미는?", answer.word),
        options,
        correct_answer: correct_index,
        explanation: answer.example.clone().unwrap_or_default(),
    }
}

/// Generate up to `count` questions from `all_words`.
///
/// Answer words are a prefix of a uniform shuffle, so they are distinct and
/// their order is the question order. Fewer than `count` words simply yields
/// fewer questions.
pub fn generate_quiz<R: Rng + ?Sized>(all_words: &[Word], count: usize, rng: &mut R) -> CoreResult<Vec<QuizQuestion>> {
    if all_words.len() < MIN_QUIZ_WORDS {
        log::warn!("Quiz needs {} words, only {} available", MIN_QUIZ_WORDS, all_words.len());
        return Err(CoreError::InsufficientData {
            required: MIN_QUIZ_WORDS,
            available: all_words.len(),
        });
    }

    let mut shuffled: Vec<&Word> = all_words.iter().collect();
    shuffled.shuffle(rng);

    let question_count = count.min(shuffled.len());
    let questions: Vec<QuizQuestion> = shuffled[..question_count]
        .iter()
        .map(|answer| build_question(answer, &shuffled, rng))
        .collect();

    log::debug!("Generated {} quiz questions from {} words", questions.len(), all_words.len());
    Ok(questions)
}

/// Generate a quiz over every word in every set, using the thread RNG
pub fn generate_quiz_from_sets(word_sets: &[WordSet], count: usize) -> CoreResult<Vec<QuizQuestion>> {
    let all_words: Vec<Word> = word_sets.iter().flat_map(|ws| ws.words.iter().cloned()).collect();
    generate_quiz(&all_words, count, &mut rand::thread_rng())
}

/// One submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selected: usize,
    /// Seconds
    pub time_spent: i64,
}

/// Score a quiz. The score is the rounded percentage of answered questions
/// that were correct.
pub fn grade_quiz(
    test_id: &str,
    questions: &[QuizQuestion],
    selections: &[Selection],
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    passing_score: u32,
) -> CoreResult<TestResult> {
    if selections.len() > questions.len() {
        return Err(CoreError::Validation(format!(
            "{} answers submitted for {} questions", selections.len(), questions.len()
        )));
    }
    if let Some(bad) = selections.iter().find(|s| s.selected >= OPTION_COUNT) {
        return Err(CoreError::Validation(format!("Answer index {} out of range", bad.selected)));
    }

    let answers: Vec<TestAnswer> = questions
        .iter()
        .zip(selections)
        .map(|(q, s)| TestAnswer {
            question_id: q.id.clone(),
            user_answer: s.selected,
            is_correct: s.selected == q.correct_answer,
            time_spent: s.time_spent.max(0),
        })
        .collect();

    let correct = answers.iter().filter(|a| a.is_correct).count() as u32;
    let score = if answers.is_empty() {
        0
    } else {
        (correct as f64 / answers.len() as f64 * 100.0).round() as u32
    };

    Ok(TestResult {
        id: new_id("test-result"),
        test_id: test_id.to_string(),
        start_time,
        end_time,
        duration: (end_time - start_time).num_seconds().max(0),
        total_questions: questions.len() as u32,
        correct_answers: correct,
        score,
        passed: score >= passing_score,
        answers,
    })
}

/// A quiz being taken: questions plus the answers given so far
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub test_id: String,
    questions: Vec<QuizQuestion>,
    selections: Vec<Selection>,
    started_at: DateTime<Utc>,
    last_answer_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let now = Utc::now();
        QuizAttempt {
            test_id: new_id("test"),
            questions,
            selections: Vec::new(),
            started_at: now,
            last_answer_at: now,
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.selections.len()
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.selections.len())
    }

    pub fn is_complete(&self) -> bool {
        self.selections.len() >= self.questions.len()
    }

    /// Answer the current question. Returns whether it was correct.
    pub fn answer(&mut self, selected: usize) -> CoreResult<bool> {
        if selected >= OPTION_COUNT {
            return Err(CoreError::Validation(format!("Answer index {} out of range", selected)));
        }
        let question = self
            .current_question()
            .ok_or_else(|| CoreError::SessionState("All questions already answered".to_string()))?;
        let is_correct = question.correct_answer == selected;

        let now = Utc::now();
        self.selections.push(Selection {
            selected,
            time_spent: (now - self.last_answer_at).num_seconds(),
        });
        self.last_answer_at = now;
        Ok(is_correct)
    }

    /// Grade what has been answered so far
    pub fn finish(self, passing_score: u32) -> CoreResult<TestResult> {
        grade_quiz(
            &self.test_id,
            &self.questions,
            &self.selections,
            self.started_at,
            Utc::now(),
            passing_score,
        )
    }
}
