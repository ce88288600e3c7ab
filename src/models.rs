//! Persisted records: words, word sets, sessions, results, daily stats and settings

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category given to word sets created without one
pub const DEFAULT_CATEGORY: &str = "일반";

/// Generate a prefixed record id, e.g. `word-3f2a...`
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Vocabulary entry, owned by exactly one word set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
    #[serde(default)]
    pub study_count: u32,
    #[serde(default)]
    pub correct_count: u32,
}

impl Word {
    pub fn new(word: &str, meaning: &str) -> Self {
        Word {
            id: new_id("word"),
            word: word.trim().to_string(),
            meaning: meaning.trim().to_string(),
            pronunciation: None,
            example: None,
            difficulty: Difficulty::Medium,
            tags: BTreeSet::new(),
            created_at: Utc::now(),
            last_studied: None,
            study_count: 0,
            correct_count: 0,
        }
    }

    pub fn with_example(mut self, example: &str) -> Self {
        let example = example.trim();
        self.example = if example.is_empty() { None } else { Some(example.to_string()) };
        self
    }

    /// Apply one study outcome. Keeps `correct_count <= study_count`.
    pub fn record_result(&mut self, is_correct: bool, at: DateTime<Utc>) {
        self.study_count += 1;
        if is_correct {
            self.correct_count += 1;
        }
        self.last_studied = Some(at);
    }
}

/// Named collection of words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSet {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub words: Vec<Word>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub total_words: usize,
    #[serde(default)]
    pub studied_words: usize,
    #[serde(default)]
    pub correct_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
}

impl WordSet {
    pub fn new(title: &str, description: &str, category: &str) -> Self {
        let now = Utc::now();
        let category = category.trim();
        WordSet {
            id: new_id("wordset"),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            category: if category.is_empty() { DEFAULT_CATEGORY.to_string() } else { category.to_string() },
            words: Vec::new(),
            created_at: now,
            updated_at: now,
            total_words: 0,
            studied_words: 0,
            correct_rate: 0.0,
            last_studied: None,
        }
    }

    /// Recompute the derived counters from the words themselves
    pub fn refresh_progress(&mut self) {
        self.total_words = self.words.len();
        self.studied_words = self.words.iter().filter(|w| w.study_count > 0).count();
        let studied: u64 = self.words.iter().map(|w| w.study_count as u64).sum();
        let correct: u64 = self.words.iter().map(|w| w.correct_count as u64).sum();
        self.correct_rate = if studied > 0 { correct as f64 / studied as f64 * 100.0 } else { 0.0 };
    }

    /// Insert or replace a word by id, then refresh derived fields
    pub fn upsert_word(&mut self, word: Word) {
        match self.words.iter_mut().find(|w| w.id == word.id) {
            Some(existing) => *existing = word,
            None => self.words.push(word),
        }
        self.touch();
    }

    /// Remove a word by id. Returns false when no such word exists.
    pub fn remove_word(&mut self, word_id: &str) -> bool {
        let before = self.words.len();
        self.words.retain(|w| w.id != word_id);
        let removed = self.words.len() != before;
        self.touch();
        removed
    }

    pub fn touch(&mut self) {
        self.refresh_progress();
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Flashcard,
    Quiz,
    Review,
}

/// One study session. Counters are mutated by the session tracker until finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub word_set_id: String,
    pub mode: StudyMode,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub words_studied: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub accuracy: f64,
}

/// Outcome of a single graded card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyResult {
    pub id: String,
    pub session_id: String,
    pub word_id: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Seconds
    pub time_spent: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAnswer {
    pub question_id: String,
    pub user_answer: usize,
    pub is_correct: bool,
    pub time_spent: i64,
}

/// Result of a finished multiple-choice quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub test_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: i64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u32,
    pub passed: bool,
    pub answers: Vec<TestAnswer>,
}

/// Daily aggregate, one per calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub id: String,
    pub date: NaiveDate,
    pub words_learned: u32,
    /// Minutes
    pub study_time: u32,
    pub sessions_completed: u32,
    pub average_accuracy: f64,
    pub streak: u32,
}

impl StudyStats {
    pub fn empty(date: NaiveDate) -> Self {
        StudyStats {
            id: format!("stats-{}", date.format("%Y-%m-%d")),
            date,
            words_learned: 0,
            study_time: 0,
            sessions_completed: 0,
            average_accuracy: 0.0,
            streak: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyReminders {
    pub enabled: bool,
    /// `HH:MM`
    pub time: String,
    /// 0 = Sunday
    pub days: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub id: String,
    pub daily_word_goal: u32,
    /// Minutes
    pub daily_time_goal: u32,
    pub notifications_enabled: bool,
    pub study_reminders: StudyReminders,
    pub theme: Theme,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        UserSettings {
            id: "user-1".to_string(),
            daily_word_goal: 20,
            daily_time_goal: 30,
            notifications_enabled: true,
            study_reminders: StudyReminders {
                enabled: true,
                time: "19:00".to_string(),
                days: vec![1, 2, 3, 4, 5],
            },
            theme: Theme::Auto,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.study_reminders.days.iter().any(|d| *d > 6) {
            return Err("Reminder days must be between 0 (Sunday) and 6".to_string());
        }
        let valid_time = chrono::NaiveTime::parse_from_str(&self.study_reminders.time, "%H:%M").is_ok();
        if !valid_time {
            return Err(format!("Invalid reminder time '{}', expected HH:MM", self.study_reminders.time));
        }
        Ok(())
    }
}
