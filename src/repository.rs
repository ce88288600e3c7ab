//! Word-set, session and stats repository over the key-value collections
//!
//! Every mutation reads the whole collection, changes it in memory and
//! writes it back. Multi-collection updates run inside one transaction.

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::db::{self, STUDY_RESULTS, STUDY_SESSIONS, STUDY_STATS, TEST_RESULTS, USER_SETTINGS, WORD_SETS};
use crate::error::{CoreError, CoreResult};
use crate::fuzzy::{check_match, search_words, MatchResult, WordSearchFilter};
use crate::gesture::{resolve_gesture, GestureOutcome};
use crate::import;
use crate::models::{
    StudyResult, StudySession, StudyStats, TestResult, UserSettings, Word, WordSet,
};
use crate::progress::{self, Period, ProgressReport, WordSetProgress};
use crate::questions::{generate_quiz_from_sets, QuizAttempt, QuizQuestion};
use crate::session::CompletedSession;

/// Full data dump, as produced by [`Repository::export_data`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub word_sets: Vec<WordSet>,
    pub study_sessions: Vec<StudySession>,
    pub study_results: Vec<StudyResult>,
    pub test_results: Vec<TestResult>,
    pub study_stats: Vec<StudyStats>,
    pub user_settings: Option<UserSettings>,
    pub export_date: DateTime<Utc>,
}

/// Import payload; absent collections are left untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportBundle {
    word_sets: Option<Vec<WordSet>>,
    study_sessions: Option<Vec<StudySession>>,
    study_results: Option<Vec<StudyResult>>,
    test_results: Option<Vec<TestResult>>,
    study_stats: Option<Vec<StudyStats>>,
    user_settings: Option<UserSettings>,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct Repository {
    conn: Connection,
    config: CoreConfig,
}

impl Repository {
    pub fn open(db_path: &str, config: CoreConfig) -> CoreResult<Self> {
        Ok(Repository { conn: db::init_database(db_path)?, config })
    }

    pub fn in_memory(config: CoreConfig) -> CoreResult<Self> {
        Ok(Repository { conn: db::init_in_memory()?, config })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ---------- word sets ----------

    pub fn get_word_sets(&self) -> CoreResult<Vec<WordSet>> {
        db::get_collection(&self.conn, WORD_SETS)
    }

    pub fn get_word_set(&self, id: &str) -> CoreResult<Option<WordSet>> {
        Ok(self.get_word_sets()?.into_iter().find(|ws| ws.id == id))
    }

    fn require_word_set(&self, id: &str) -> CoreResult<WordSet> {
        self.get_word_set(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Word set {}", id)))
    }

    /// Insert or replace a word set by id
    pub fn save_word_set(&self, word_set: &WordSet) -> CoreResult<()> {
        validate_title(&word_set.title)?;
        save_word_set_on(&self.conn, word_set)
    }

    pub fn create_word_set(&self, title: &str, description: &str, category: &str) -> CoreResult<WordSet> {
        validate_title(title)?;
        let word_set = WordSet::new(title, description, category);
        self.save_word_set(&word_set)?;
        log::info!("Created word set '{}' ({})", word_set.title, word_set.id);
        Ok(word_set)
    }

    pub fn delete_word_set(&self, id: &str) -> CoreResult<bool> {
        let mut sets = self.get_word_sets()?;
        let before = sets.len();
        sets.retain(|ws| ws.id != id);
        let deleted = sets.len() != before;
        db::set_item(&self.conn, WORD_SETS, &sets)?;
        if deleted {
            log::info!("Deleted word set {}", id);
        }
        Ok(deleted)
    }

    /// Insert or replace a word (by id) inside a word set
    pub fn add_word_to_set(&self, word_set_id: &str, word: Word) -> CoreResult<WordSet> {
        if word.word.trim().is_empty() || word.meaning.trim().is_empty() {
            return Err(CoreError::Validation("Word and meaning must not be empty".to_string()));
        }
        let mut word_set = self.require_word_set(word_set_id)?;
        word_set.upsert_word(word);
        self.save_word_set(&word_set)?;
        Ok(word_set)
    }

    /// Add a word typed as `word|meaning|example`
    pub fn add_quick_entry(&self, word_set_id: &str, line: &str) -> CoreResult<Word> {
        let word = import::parse_quick_entry(line)?;
        self.add_word_to_set(word_set_id, word.clone())?;
        Ok(word)
    }

    /// Append every word of a CSV or spreadsheet file to a word set
    pub fn import_words_from_file(&self, word_set_id: &str, file_path: &str) -> CoreResult<usize> {
        let mut word_set = self.require_word_set(word_set_id)?;
        let words = import::parse_file(file_path)?;
        let count = words.len();
        word_set.words.extend(words);
        word_set.touch();
        self.save_word_set(&word_set)?;
        log::info!("Imported {} words into {}", count, word_set_id);
        Ok(count)
    }

    pub fn remove_word_from_set(&self, word_set_id: &str, word_id: &str) -> CoreResult<WordSet> {
        let mut word_set = self.require_word_set(word_set_id)?;
        if !word_set.remove_word(word_id) {
            return Err(CoreError::NotFound(format!("Word {} in set {}", word_id, word_set_id)));
        }
        self.save_word_set(&word_set)?;
        Ok(word_set)
    }

    /// Apply one study outcome to a stored word
    pub fn record_word_result(&self, word_set_id: &str, word_id: &str, is_correct: bool) -> CoreResult<Word> {
        let mut word_set = self.require_word_set(word_set_id)?;
        let now = Utc::now();
        let word = word_set
            .words
            .iter_mut()
            .find(|w| w.id == word_id)
            .ok_or_else(|| CoreError::NotFound(format!("Word {} in set {}", word_id, word_set_id)))?;
        word.record_result(is_correct, now);
        let updated = word.clone();

        word_set.last_studied = Some(now);
        word_set.touch();
        self.save_word_set(&word_set)?;
        Ok(updated)
    }

    pub fn calculate_word_set_progress(&self, word_set_id: &str) -> CoreResult<WordSetProgress> {
        Ok(match self.get_word_set(word_set_id)? {
            Some(ws) => progress::word_set_progress(&ws),
            None => WordSetProgress { total_words: 0, studied_words: 0, correct_rate: 0.0 },
        })
    }

    pub fn search_words(&self, filter: &WordSearchFilter) -> CoreResult<Vec<(String, Word)>> {
        Ok(search_words(&self.get_word_sets()?, filter))
    }

    /// Grade a typed answer with the configured similarity threshold
    pub fn check_answer(&self, user_input: &str, expected: &str) -> MatchResult {
        check_match(user_input, expected, self.config.matching.threshold)
    }

    /// Resolve a released card drag with the configured thresholds
    pub fn resolve_swipe(&self, drag_dx: f64, velocity_x: f64) -> GestureOutcome {
        resolve_gesture(drag_dx, velocity_x, &self.config.gesture)
    }

    // ---------- quizzes ----------

    /// Fresh quiz over every stored word
    pub fn generate_quiz(&self) -> CoreResult<Vec<QuizQuestion>> {
        generate_quiz_from_sets(&self.get_word_sets()?, self.config.quiz.question_count)
    }

    pub fn finish_quiz(&self, attempt: QuizAttempt) -> CoreResult<TestResult> {
        let result = attempt.finish(self.config.quiz.passing_score)?;
        self.save_test_result(&result)?;
        log::info!("Quiz {} scored {} ({})", result.test_id, result.score,
                   if result.passed { "passed" } else { "failed" });
        Ok(result)
    }

    // ---------- sessions and results ----------

    pub fn get_study_sessions(&self) -> CoreResult<Vec<StudySession>> {
        db::get_collection(&self.conn, STUDY_SESSIONS)
    }

    pub fn save_study_session(&self, session: &StudySession) -> CoreResult<()> {
        let mut sessions = self.get_study_sessions()?;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        db::set_item(&self.conn, STUDY_SESSIONS, &sessions)
    }

    pub fn get_study_sessions_by_word_set(&self, word_set_id: &str) -> CoreResult<Vec<StudySession>> {
        Ok(self
            .get_study_sessions()?
            .into_iter()
            .filter(|s| s.word_set_id == word_set_id)
            .collect())
    }

    pub fn get_study_results(&self) -> CoreResult<Vec<StudyResult>> {
        db::get_collection(&self.conn, STUDY_RESULTS)
    }

    pub fn save_study_result(&self, result: &StudyResult) -> CoreResult<()> {
        let mut results = self.get_study_results()?;
        results.push(result.clone());
        db::set_item(&self.conn, STUDY_RESULTS, &results)
    }

    pub fn get_study_results_by_session(&self, session_id: &str) -> CoreResult<Vec<StudyResult>> {
        Ok(self
            .get_study_results()?
            .into_iter()
            .filter(|r| r.session_id == session_id)
            .collect())
    }

    pub fn get_test_results(&self) -> CoreResult<Vec<TestResult>> {
        db::get_collection(&self.conn, TEST_RESULTS)
    }

    pub fn save_test_result(&self, result: &TestResult) -> CoreResult<()> {
        let mut results = self.get_test_results()?;
        results.push(result.clone());
        db::set_item(&self.conn, TEST_RESULTS, &results)
    }

    pub fn complete_session(&self, done: &CompletedSession) -> CoreResult<StudyStats> {
        self.complete_session_on(done, today())
    }

    /// Persist a finished session: history, per-card results, word counters
    /// and the daily record for `day`. A session id is recorded at most once.
    pub fn complete_session_on(&self, done: &CompletedSession, day: NaiveDate) -> CoreResult<StudyStats> {
        let session = &done.session;
        if !session.is_finished() {
            return Err(CoreError::SessionState(format!("Session {} is not finished", session.id)));
        }
        let mut sessions = self.get_study_sessions()?;
        if sessions.iter().any(|s| s.id == session.id) {
            log::warn!("Session {} was already recorded", session.id);
            return Err(CoreError::SessionState(format!("Session {} was already recorded", session.id)));
        }
        let mut word_set = self.require_word_set(&session.word_set_id)?;

        let history = self.get_study_stats()?;
        let prior = history.iter().find(|s| s.date == day);
        let stats = progress::record_session(
            prior,
            session,
            done.words_in_set,
            &history,
            day,
            &self.config.stats,
        )?;

        for result in &done.results {
            if let Some(word) = word_set.words.iter_mut().find(|w| w.id == result.word_id) {
                word.record_result(result.is_correct, result.timestamp);
            }
        }
        word_set.last_studied = session.end_time;
        word_set.touch();

        let mut results = self.get_study_results()?;
        results.extend(done.results.iter().cloned());
        sessions.push(session.clone());

        let tx = self.conn.unchecked_transaction()?;
        db::set_item(&tx, STUDY_SESSIONS, &sessions)?;
        db::set_item(&tx, STUDY_RESULTS, &results)?;
        save_word_set_on(&tx, &word_set)?;
        save_study_stats_on(&tx, &stats)?;
        tx.commit()?;

        log::info!("Recorded session {} for {}: {} words, streak {}",
                   session.id, day, stats.words_learned, stats.streak);
        Ok(stats)
    }

    // ---------- daily stats ----------

    pub fn get_study_stats(&self) -> CoreResult<Vec<StudyStats>> {
        db::get_collection(&self.conn, STUDY_STATS)
    }

    /// Upsert by date
    pub fn save_study_stats(&self, stats: &StudyStats) -> CoreResult<()> {
        save_study_stats_on(&self.conn, stats)
    }

    /// Records with `start <= date <= end`
    pub fn get_study_stats_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> CoreResult<Vec<StudyStats>> {
        Ok(self
            .get_study_stats()?
            .into_iter()
            .filter(|s| s.date >= start && s.date <= end)
            .collect())
    }

    pub fn get_today_stats(&self) -> CoreResult<Option<StudyStats>> {
        let today = today();
        Ok(self.get_study_stats()?.into_iter().find(|s| s.date == today))
    }

    pub fn calculate_current_streak(&self) -> CoreResult<u32> {
        Ok(progress::current_streak(&self.get_study_stats()?, today()))
    }

    pub fn progress_report(&self, period: Period) -> CoreResult<ProgressReport> {
        self.progress_report_on(period, today())
    }

    pub fn progress_report_on(&self, period: Period, day: NaiveDate) -> CoreResult<ProgressReport> {
        let settings = self.get_user_settings()?.unwrap_or_default();
        Ok(progress::summarize_period(&self.get_study_stats()?, period, day, &settings))
    }

    // ---------- settings ----------

    pub fn get_user_settings(&self) -> CoreResult<Option<UserSettings>> {
        db::get_item(&self.conn, USER_SETTINGS)
    }

    pub fn save_user_settings(&self, settings: &UserSettings) -> CoreResult<()> {
        settings.validate().map_err(CoreError::Validation)?;
        db::set_item(&self.conn, USER_SETTINGS, settings)
    }

    // ---------- maintenance ----------

    pub fn clear_all_data(&mut self) -> CoreResult<()> {
        let removed = db::remove_items(&mut self.conn, &db::ALL_KEYS)?;
        log::info!("Cleared {} collections", removed);
        Ok(())
    }

    pub fn export_data(&self) -> CoreResult<String> {
        let bundle = ExportBundle {
            word_sets: self.get_word_sets()?,
            study_sessions: self.get_study_sessions()?,
            study_results: self.get_study_results()?,
            test_results: self.get_test_results()?,
            study_stats: self.get_study_stats()?,
            user_settings: self.get_user_settings()?,
            export_date: Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Replace each collection present in `json`
    pub fn import_data(&self, json: &str) -> CoreResult<()> {
        let bundle: ImportBundle = serde_json::from_str(json).map_err(|e| {
            log::error!("Error importing data: {}", e);
            CoreError::Validation("Invalid data format".to_string())
        })?;
        if let Some(settings) = &bundle.user_settings {
            settings.validate().map_err(CoreError::Validation)?;
        }
        let word_sets = bundle.word_sets.map(|mut sets| {
            sets.iter_mut().for_each(WordSet::refresh_progress);
            sets
        });

        let tx = self.conn.unchecked_transaction()?;
        if let Some(v) = &word_sets {
            db::set_item(&tx, WORD_SETS, v)?;
        }
        if let Some(v) = &bundle.study_sessions {
            db::set_item(&tx, STUDY_SESSIONS, v)?;
        }
        if let Some(v) = &bundle.study_results {
            db::set_item(&tx, STUDY_RESULTS, v)?;
        }
        if let Some(v) = &bundle.test_results {
            db::set_item(&tx, TEST_RESULTS, v)?;
        }
        if let Some(v) = &bundle.study_stats {
            db::set_item(&tx, STUDY_STATS, v)?;
        }
        if let Some(v) = &bundle.user_settings {
            db::set_item(&tx, USER_SETTINGS, v)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Seed a sample word set and default settings into an empty store.
    /// Returns false when word sets already exist.
    pub fn initialize_sample_data(&self) -> CoreResult<bool> {
        if !self.get_word_sets()?.is_empty() {
            return Ok(false);
        }

        let mut sample = WordSet::new("TOEIC 필수 단어", "토익 시험 필수 어휘 모음", "영어");
        sample.id = "sample-1".to_string();
        let entries = [
            ("word-1", "Appreciate", "감사하다, 인정하다", "I appreciate your help.", ["business", "common"]),
            ("word-2", "Collaborate", "협력하다, 공동 작업하다", "We need to collaborate on this project.", ["business", "teamwork"]),
            ("word-3", "Demonstrate", "증명하다, 보여주다", "Can you demonstrate how to use this?", ["business", "presentation"]),
        ];
        for (id, word, meaning, example, tags) in entries {
            let mut entry = Word::new(word, meaning).with_example(example);
            entry.id = id.to_string();
            entry.tags = tags.iter().map(|t| t.to_string()).collect();
            sample.upsert_word(entry);
        }

        self.save_word_set(&sample)?;
        self.save_user_settings(&UserSettings::default())?;
        log::info!("Seeded sample data");
        Ok(true)
    }
}

fn validate_title(title: &str) -> CoreResult<()> {
    if title.trim().is_empty() {
        log::warn!("Rejected word set with empty title");
        return Err(CoreError::Validation("Word set title must not be empty".to_string()));
    }
    Ok(())
}

fn save_word_set_on(conn: &Connection, word_set: &WordSet) -> CoreResult<()> {
    let mut sets: Vec<WordSet> = db::get_collection(conn, WORD_SETS)?;
    match sets.iter_mut().find(|ws| ws.id == word_set.id) {
        Some(existing) => *existing = word_set.clone(),
        None => sets.push(word_set.clone()),
    }
    db::set_item(conn, WORD_SETS, &sets)
}

fn save_study_stats_on(conn: &Connection, stats: &StudyStats) -> CoreResult<()> {
    let mut all: Vec<StudyStats> = db::get_collection(conn, STUDY_STATS)?;
    match all.iter_mut().find(|s| s.date == stats.date) {
        Some(existing) => *existing = stats.clone(),
        None => all.push(stats.clone()),
    }
    db::set_item(conn, STUDY_STATS, &all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WordsLearnedRule;
    use crate::models::StudyMode;
    use crate::questions::OPTION_COUNT;
    use crate::session::StudyController;
    use chrono::Duration;

    fn repo() -> Repository {
        Repository::in_memory(CoreConfig::default()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn set_with_words(repo: &Repository, words: &[(&str, &str)]) -> WordSet {
        let set = repo.create_word_set("TOEIC", "토익", "").unwrap();
        for (w, m) in words {
            repo.add_word_to_set(&set.id, Word::new(w, m)).unwrap();
        }
        repo.get_word_set(&set.id).unwrap().unwrap()
    }

    #[test]
    fn create_rejects_blank_title() {
        let repo = repo();
        assert!(matches!(repo.create_word_set("   ", "", ""), Err(CoreError::Validation(_))));
        assert!(repo.get_word_sets().unwrap().is_empty());
    }

    #[test]
    fn add_and_remove_words_keep_totals() {
        let repo = repo();
        let set = set_with_words(&repo, &[("apple", "사과"), ("book", "책")]);
        assert_eq!(set.total_words, 2);

        let word_id = set.words[0].id.clone();
        let updated = repo.remove_word_from_set(&set.id, &word_id).unwrap();
        assert_eq!(updated.total_words, 1);
        assert!(matches!(repo.remove_word_from_set(&set.id, &word_id), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn missing_word_set_is_not_found() {
        let repo = repo();
        let err = repo.add_word_to_set("nope", Word::new("a", "b")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn quick_entry_adds_word() {
        let repo = repo();
        let set = repo.create_word_set("Set", "", "").unwrap();
        let word = repo.add_quick_entry(&set.id, "apple|사과|I eat an apple").unwrap();
        let stored = repo.get_word_set(&set.id).unwrap().unwrap();
        assert_eq!(stored.words, vec![word]);
        assert!(repo.add_quick_entry(&set.id, "apple").is_err());
    }

    #[test]
    fn record_word_result_updates_derived_fields() {
        let repo = repo();
        let set = set_with_words(&repo, &[("apple", "사과"), ("book", "책")]);
        let id = set.words[0].id.clone();
        repo.record_word_result(&set.id, &id, true).unwrap();
        repo.record_word_result(&set.id, &id, false).unwrap();

        let progress = repo.calculate_word_set_progress(&set.id).unwrap();
        assert_eq!(progress.studied_words, 1);
        assert!((progress.correct_rate - 50.0).abs() < 1e-9);
        let stored = repo.get_word_set(&set.id).unwrap().unwrap();
        assert_eq!(stored.studied_words, 1);
        assert!(stored.last_studied.is_some());
    }

    #[test]
    fn delete_word_set() {
        let repo = repo();
        let set = repo.create_word_set("Set", "", "").unwrap();
        assert!(repo.delete_word_set(&set.id).unwrap());
        assert!(!repo.delete_word_set(&set.id).unwrap());
        assert_eq!(repo.calculate_word_set_progress(&set.id).unwrap().total_words, 0);
    }

    #[test]
    fn quiz_needs_four_words_across_sets() {
        let repo = repo();
        set_with_words(&repo, &[("apple", "사과"), ("book", "책"), ("cat", "고양이")]);
        assert!(matches!(repo.generate_quiz(), Err(CoreError::InsufficientData { .. })));

        set_with_words(&repo, &[("dog", "개")]);
        let questions = repo.generate_quiz().unwrap();
        assert_eq!(questions.len(), 4);
        assert!(questions.iter().all(|q| q.options.len() == OPTION_COUNT));

        let mut attempt = QuizAttempt::new(questions);
        while let Some(q) = attempt.current_question() {
            let pick = q.correct_answer;
            attempt.answer(pick).unwrap();
        }
        let result = repo.finish_quiz(attempt).unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(repo.get_test_results().unwrap().len(), 1);
    }

    #[test]
    fn complete_session_persists_everything_once() {
        let repo = repo();
        let set = set_with_words(&repo, &[("apple", "사과"), ("book", "책"), ("cat", "고양이")]);

        let mut controller = StudyController::default();
        controller.start(&set).unwrap();
        controller.grade(true).unwrap();
        controller.grade(false).unwrap();
        controller.grade(true).unwrap();
        let done = controller.finish().unwrap();

        let day = date("2026-10-18");
        let stats = repo.complete_session_on(&done, day).unwrap();
        assert_eq!(stats.words_learned, 3);
        assert_eq!(stats.sessions_completed, 1);
        assert_eq!(stats.study_time, 1);
        assert_eq!(stats.streak, 1);

        assert_eq!(repo.get_study_sessions_by_word_set(&set.id).unwrap().len(), 1);
        assert_eq!(repo.get_study_results_by_session(&done.session.id).unwrap().len(), 3);
        let stored = repo.get_word_set(&set.id).unwrap().unwrap();
        assert_eq!(stored.studied_words, 3);
        assert_eq!(stored.words[1].correct_count, 0);
        assert_eq!(stored.words[1].study_count, 1);

        let again = repo.complete_session_on(&done, day);
        assert!(matches!(again, Err(CoreError::SessionState(_))));
        assert_eq!(repo.get_study_stats().unwrap()[0].sessions_completed, 1);
    }

    #[test]
    fn complete_session_uses_set_size_when_configured() {
        let mut config = CoreConfig::default();
        config.stats.words_learned_rule = WordsLearnedRule::SetSize;
        let repo = Repository::in_memory(config).unwrap();
        let set = set_with_words(&repo, &[("apple", "사과"), ("book", "책"), ("cat", "고양이")]);

        let mut session = StudySession::start(&set.id, StudyMode::Flashcard, 3);
        session.grade(true).unwrap();
        session.finish().unwrap();
        let done = CompletedSession { session, results: Vec::new(), words_in_set: 3 };

        let stats = repo.complete_session_on(&done, date("2026-10-18")).unwrap();
        assert_eq!(stats.words_learned, 3);
    }

    #[test]
    fn stats_upsert_by_date_and_range() {
        let repo = repo();
        let mut stats = StudyStats::empty(date("2026-10-17"));
        stats.words_learned = 4;
        repo.save_study_stats(&stats).unwrap();
        stats.words_learned = 9;
        repo.save_study_stats(&stats).unwrap();
        repo.save_study_stats(&StudyStats::empty(date("2026-10-01"))).unwrap();

        let all = repo.get_study_stats().unwrap();
        assert_eq!(all.len(), 2);
        let range = repo.get_study_stats_by_date_range(date("2026-10-10"), date("2026-10-18")).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].words_learned, 9);
    }

    #[test]
    fn today_stats_and_streak_follow_local_date() {
        let repo = repo();
        assert!(repo.get_today_stats().unwrap().is_none());
        assert_eq!(repo.calculate_current_streak().unwrap(), 0);

        let mut stats = StudyStats::empty(today());
        stats.words_learned = 5;
        repo.save_study_stats(&stats).unwrap();
        let mut yesterday = StudyStats::empty(today() - Duration::days(1));
        yesterday.words_learned = 2;
        repo.save_study_stats(&yesterday).unwrap();

        assert_eq!(repo.get_today_stats().unwrap().unwrap().words_learned, 5);
        assert_eq!(repo.calculate_current_streak().unwrap(), 2);
        assert_eq!(repo.progress_report(Period::Week).unwrap().total_words_learned, 7);
    }

    #[test]
    fn settings_round_trip_and_validation() {
        let repo = repo();
        assert!(repo.get_user_settings().unwrap().is_none());
        let mut settings = UserSettings::default();
        settings.daily_word_goal = 40;
        repo.save_user_settings(&settings).unwrap();
        assert_eq!(repo.get_user_settings().unwrap().unwrap().daily_word_goal, 40);

        settings.study_reminders.days = vec![7];
        assert!(matches!(repo.save_user_settings(&settings), Err(CoreError::Validation(_))));
    }

    #[test]
    fn sample_data_seeds_only_once() {
        let repo = repo();
        assert!(repo.initialize_sample_data().unwrap());
        assert!(!repo.initialize_sample_data().unwrap());
        let sets = repo.get_word_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].total_words, 3);
        assert_eq!(sets[0].words[0].id, "word-1");
        assert!(repo.get_user_settings().unwrap().is_some());
    }

    #[test]
    fn export_import_round_trip() {
        let source = repo();
        source.initialize_sample_data().unwrap();
        let json = source.export_data().unwrap();
        assert!(json.contains("exportDate"));

        let mut target = repo();
        target.import_data(&json).unwrap();
        assert_eq!(target.get_word_sets().unwrap(), source.get_word_sets().unwrap());
        assert_eq!(target.get_user_settings().unwrap(), source.get_user_settings().unwrap());

        assert!(matches!(target.import_data("not json"), Err(CoreError::Validation(_))));

        target.clear_all_data().unwrap();
        assert!(target.get_word_sets().unwrap().is_empty());
        assert!(target.get_user_settings().unwrap().is_none());
    }

    #[test]
    fn partial_import_leaves_other_collections() {
        let repo = repo();
        repo.initialize_sample_data().unwrap();
        repo.import_data(r#"{"studyStats": []}"#).unwrap();
        assert_eq!(repo.get_word_sets().unwrap().len(), 1);
    }

    #[test]
    fn import_words_from_csv_file() {
        let repo = repo();
        let set = repo.create_word_set("Imported", "", "").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.csv");
        std::fs::write(&path, "word,meaning\napple,사과\nbook,책\n").unwrap();

        let count = repo.import_words_from_file(&set.id, path.to_str().unwrap()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(repo.get_word_set(&set.id).unwrap().unwrap().total_words, 2);
    }

    #[test]
    fn search_across_stored_sets() {
        let repo = repo();
        repo.initialize_sample_data().unwrap();
        let filter = WordSearchFilter { query: Some("collab".to_string()), ..Default::default() };
        let hits = repo.search_words(&filter).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "sample-1");
    }

    #[test]
    fn on_disk_repository_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordmemo.db");
        let path = path.to_str().unwrap();
        {
            let repo = Repository::open(path, CoreConfig::default()).unwrap();
            repo.initialize_sample_data().unwrap();
        }
        let repo = Repository::open(path, CoreConfig::default()).unwrap();
        assert_eq!(repo.get_word_sets().unwrap().len(), 1);
    }

    #[test]
    fn configured_match_threshold_is_applied() {
        let score = crate::fuzzy::similarity("appel", "apple");
        assert!(score > 0.5 && score < 0.95);

        let mut strict = CoreConfig::default();
        strict.matching.threshold = 0.95;
        let mut loose = CoreConfig::default();
        loose.matching.threshold = 0.5;

        let strict = Repository::in_memory(strict).unwrap();
        let loose = Repository::in_memory(loose).unwrap();
        assert!(!strict.check_answer("appel", "apple").is_correct);
        assert!(loose.check_answer("appel", "apple").is_correct);
        assert!(strict.check_answer("Apple ", "apple").is_correct);
    }

    #[test]
    fn configured_gesture_thresholds_are_applied() {
        use crate::gesture::SwipeDirection;

        assert_eq!(repo().resolve_swipe(100.0, 0.0), GestureOutcome::Commit(SwipeDirection::Right));

        let mut config = CoreConfig::default();
        config.gesture.distance_threshold = 200.0;
        config.gesture.velocity_threshold = 1500.0;
        let repo = Repository::in_memory(config).unwrap();
        assert_eq!(repo.resolve_swipe(100.0, 0.0), GestureOutcome::Cancel);
        assert_eq!(repo.resolve_swipe(-50.0, -1000.0), GestureOutcome::Cancel);
        assert_eq!(repo.resolve_swipe(-250.0, 0.0), GestureOutcome::Commit(SwipeDirection::Left));
    }

    #[test]
    fn import_recomputes_word_set_counters() {
        let repo = repo();
        let json = r#"{"wordSets": [{
            "id": "ws-1", "title": "Edited", "description": "", "category": "일반",
            "words": [
                {"id": "w-1", "word": "apple", "meaning": "사과", "createdAt": "2026-10-01T00:00:00Z",
                 "studyCount": 2, "correctCount": 1},
                {"id": "w-2", "word": "book", "meaning": "책", "createdAt": "2026-10-01T00:00:00Z"}
            ],
            "createdAt": "2026-10-01T00:00:00Z", "updatedAt": "2026-10-01T00:00:00Z",
            "totalWords": 99, "studiedWords": 42, "correctRate": 7.0
        }]}"#;
        repo.import_data(json).unwrap();

        let set = repo.get_word_set("ws-1").unwrap().unwrap();
        assert_eq!(set.total_words, set.words.len());
        assert_eq!(set.total_words, 2);
        assert_eq!(set.studied_words, 1);
        assert!((set.correct_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn save_word_set_rejects_blank_title() {
        let repo = repo();
        let mut set = repo.create_word_set("Valid", "", "").unwrap();
        set.title = "   ".to_string();
        assert!(matches!(repo.save_word_set(&set), Err(CoreError::Validation(_))));
        assert_eq!(repo.get_word_set(&set.id).unwrap().unwrap().title, "Valid");
    }
}
