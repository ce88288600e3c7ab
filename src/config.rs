//! Core configuration, loaded from a JSON file

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::models::StudyMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizConfig {
    pub question_count: usize,
    pub passing_score: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig { question_count: 10, passing_score: 60 }
    }
}

/// Swipe thresholds in pixels and pixels/second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
    pub distance_threshold: f64,
    pub velocity_threshold: f64,
    pub max_rotation_deg: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            distance_threshold: 80.0,
            velocity_threshold: 800.0,
            max_rotation_deg: 15.0,
        }
    }
}

/// Per-mode study options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyModeConfig {
    pub mode: StudyMode,
    pub shuffle_cards: bool,
    pub show_hints: bool,
    pub auto_advance: bool,
    /// Seconds
    pub auto_advance_delay: u32,
    pub repeat_incorrect: bool,
    pub max_words_per_session: usize,
}

impl Default for StudyModeConfig {
    fn default() -> Self {
        StudyModeConfig {
            mode: StudyMode::Flashcard,
            shuffle_cards: false,
            show_hints: true,
            auto_advance: false,
            auto_advance_delay: 3,
            repeat_incorrect: false,
            max_words_per_session: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchingConfig {
    pub threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig { threshold: 0.8 }
    }
}

/// What a completed session adds to the day's `wordsLearned`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WordsLearnedRule {
    /// Cards actually graded in the session
    #[default]
    WordsStudied,
    /// Size of the studied word set
    SetSize,
}

/// How a completed session updates the day's `averageAccuracy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyRule {
    /// The latest session's accuracy replaces the day's value
    #[default]
    Overwrite,
    /// Mean over all sessions of the day, weighted per session
    SessionMean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsConfig {
    pub words_learned_rule: WordsLearnedRule,
    pub accuracy_rule: AccuracyRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    pub quiz: QuizConfig,
    pub gesture: GestureConfig,
    pub study: StudyModeConfig,
    pub matching: MatchingConfig,
    pub stats: StatsConfig,
}

impl CoreConfig {
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Like [`CoreConfig::load`], but a missing file yields the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        if !path.as_ref().exists() {
            log::info!("No config at {}, using defaults", path.as_ref().display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = CoreConfig::from_json(r#"{"quiz": {"questionCount": 5}}"#).unwrap();
        assert_eq!(config.quiz.question_count, 5);
        assert_eq!(config.quiz.passing_score, 60);
        assert_eq!(config.gesture.distance_threshold, 80.0);
        assert_eq!(config.stats.words_learned_rule, WordsLearnedRule::WordsStudied);
    }

    #[test]
    fn stats_rules_parse_snake_case() {
        let config = CoreConfig::from_json(r#"{"stats": {"wordsLearnedRule": "set_size"}}"#).unwrap();
        assert_eq!(config.stats.words_learned_rule, WordsLearnedRule::SetSize);
        assert_eq!(config.stats.accuracy_rule, AccuracyRule::Overwrite);

        let config = CoreConfig::from_json(r#"{"stats": {"accuracyRule": "session_mean"}}"#).unwrap();
        assert_eq!(config.stats.accuracy_rule, AccuracyRule::SessionMean);
        assert_eq!(config.stats.words_learned_rule, WordsLearnedRule::WordsStudied);
    }

    #[test]
    fn load_or_default_handles_missing_and_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordmemo.json");
        assert_eq!(CoreConfig::load_or_default(&path).unwrap(), CoreConfig::default());

        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"matching": {{"threshold": 0.9}}}}"#).unwrap();
        let config = CoreConfig::load_or_default(&path).unwrap();
        assert_eq!(config.matching.threshold, 0.9);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(CoreConfig::load(&path).is_err());
    }
}
