//! WordMemo Core - vocabulary memorization engine
//!
//! Provides word-set storage on SQLite, multiple-choice quiz generation,
//! flashcard study sessions, daily progress aggregation and streaks.
//! Build with the `python` feature for the Python extension module.

mod config;
mod db;
mod error;
mod fuzzy;
mod gesture;
mod import;
mod models;
mod progress;
mod questions;
mod repository;
mod session;
#[cfg(feature = "python")]
mod python;

pub use config::{AccuracyRule, CoreConfig, GestureConfig, MatchingConfig, QuizConfig, StatsConfig, StudyModeConfig, WordsLearnedRule};
pub use db::{get_collection, get_item, init_database, init_in_memory, remove_item, set_item};
pub use error::{CoreError, CoreResult};
pub use fuzzy::{check_match, search_words, similarity, MatchResult, SortBy, SortOrder, WordSearchFilter};
pub use gesture::{card_rotation, resolve_gesture, GestureOutcome, SwipeDirection};
pub use import::{parse_csv, parse_excel, parse_file, parse_quick_entry};
pub use models::{
    Difficulty, StudyMode, StudyReminders, StudyResult, StudySession, StudyStats, TestAnswer,
    TestResult, Theme, UserSettings, Word, WordSet, DEFAULT_CATEGORY,
};
pub use progress::{
    current_streak, longest_streak, record_session, session_minutes, summarize_period,
    word_set_progress, Period, ProgressReport, WordSetProgress,
};
pub use questions::{generate_quiz, generate_quiz_from_sets, grade_quiz, QuizAttempt, QuizQuestion, Selection, MIN_QUIZ_WORDS, OPTION_COUNT};
pub use repository::{today, ExportBundle, Repository};
pub use session::{CompletedSession, ControllerState, StudyController};
