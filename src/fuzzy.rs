//! Fuzzy string matching for typed answers and word search

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, levenshtein, normalized_levenshtein};

use crate::models::{Difficulty, Word, WordSet};

/// Result of fuzzy matching comparison
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub is_correct: bool,
    pub similarity_score: f64,
    pub feedback: String,
}

#[cfg(feature = "python")]
#[pymethods]
impl MatchResult {
    fn __repr__(&self) -> String {
        format!("MatchResult(is_correct={}, score={:.2}, feedback='{}')",
                self.is_correct, self.similarity_score, self.feedback)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Weighted similarity in `[0, 1]`; Jaro-Winkler dominates since it is kinder to typos
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize(a), normalize(b));
    if a == b {
        return 1.0;
    }
    normalized_levenshtein(&a, &b) * 0.4 + jaro_winkler(&a, &b) * 0.6
}

/// Check a typed answer against the expected one
pub fn check_match(user_input: &str, expected: &str, threshold: f64) -> MatchResult {
    let input_normalized = normalize(user_input);
    let expected_normalized = normalize(expected);

    if input_normalized == expected_normalized {
        return MatchResult {
            is_correct: true,
            similarity_score: 1.0,
            feedback: "정답입니다! ✓".to_string(),
        };
    }

    let score = similarity(&input_normalized, &expected_normalized);

    let (is_correct, feedback) = if score >= threshold {
        (true, format!("거의 맞았어요! ✓ ({}% 일치)", (score * 100.0) as i32))
    } else if score >= 0.5 {
        let distance = levenshtein(&input_normalized, &expected_normalized);
        (false, format!("아쉬워요! {}글자 차이. 정답: '{}'", distance, expected))
    } else {
        (false, format!("오답입니다. 정답: '{}'", expected))
    };

    MatchResult {
        is_correct,
        similarity_score: score,
        feedback,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Alphabetical,
    DateAdded,
    Difficulty,
    StudyCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Word search criteria; every set field must match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct WordSearchFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Word must carry all of these
    pub tags: Option<Vec<String>>,
    pub studied_only: bool,
    pub not_studied_only: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Query similarity needed for a fuzzy hit when there is no substring hit
const SEARCH_THRESHOLD: f64 = 0.85;

fn query_matches(word: &Word, query: &str) -> bool {
    let query = normalize(query);
    if query.is_empty() {
        return true;
    }
    let word_text = normalize(&word.word);
    let meaning = normalize(&word.meaning);
    word_text.contains(&query) || meaning.contains(&query) || similarity(&word_text, &query) >= SEARCH_THRESHOLD
}

fn word_matches(word: &Word, filter: &WordSearchFilter) -> bool {
    if let Some(q) = &filter.query {
        if !query_matches(word, q) {
            return false;
        }
    }
    if filter.difficulty.is_some_and(|d| d != word.difficulty) {
        return false;
    }
    if let Some(tags) = &filter.tags {
        if !tags.iter().all(|t| word.tags.contains(t)) {
            return false;
        }
    }
    if filter.studied_only && word.study_count == 0 {
        return false;
    }
    if filter.not_studied_only && word.study_count > 0 {
        return false;
    }
    true
}

/// Search words across sets. Each hit is paired with its word set id.
pub fn search_words(word_sets: &[WordSet], filter: &WordSearchFilter) -> Vec<(String, Word)> {
    let mut hits: Vec<(String, Word)> = word_sets
        .iter()
        .filter(|ws| filter.category.as_ref().map_or(true, |c| &ws.category == c))
        .flat_map(|ws| {
            ws.words
                .iter()
                .filter(|w| word_matches(w, filter))
                .map(move |w| (ws.id.clone(), w.clone()))
        })
        .collect();

    hits.sort_by(|(_, a), (_, b)| {
        let ordering = match filter.sort_by {
            SortBy::Alphabetical => a.word.to_lowercase().cmp(&b.word.to_lowercase()),
            SortBy::DateAdded => a.created_at.cmp(&b.created_at),
            SortBy::Difficulty => a.difficulty.cmp(&b.difficulty),
            SortBy::StudyCount => a.study_count.cmp(&b.study_count),
        };
        match filter.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case_and_space() {
        let result = check_match("  Apple ", "apple", 0.8);
        assert!(result.is_correct);
        assert_eq!(result.similarity_score, 1.0);
    }

    #[test]
    fn small_typo_passes_threshold() {
        let result = check_match("colaborate", "collaborate", 0.8);
        assert!(result.is_correct);
        assert!(result.similarity_score < 1.0);
    }

    #[test]
    fn unrelated_answer_fails() {
        let result = check_match("banana", "demonstrate", 0.8);
        assert!(!result.is_correct);
        assert!(result.feedback.contains("demonstrate"));
    }

    fn sets() -> Vec<WordSet> {
        let mut toeic = WordSet::new("TOEIC", "", "영어");
        let mut appreciate = Word::new("Appreciate", "감사하다, 인정하다");
        appreciate.tags.insert("business".to_string());
        appreciate.study_count = 2;
        appreciate.difficulty = Difficulty::Hard;
        toeic.upsert_word(appreciate);
        let mut collaborate = Word::new("Collaborate", "협력하다");
        collaborate.tags.insert("business".to_string());
        collaborate.tags.insert("teamwork".to_string());
        toeic.upsert_word(collaborate);

        let mut jp = WordSet::new("JLPT", "", "일본어");
        jp.upsert_word(Word::new("neko", "고양이"));
        vec![toeic, jp]
    }

    #[test]
    fn query_matches_word_meaning_or_typo() {
        let sets = sets();
        let by_word = WordSearchFilter { query: Some("collab".into()), ..Default::default() };
        assert_eq!(search_words(&sets, &by_word).len(), 1);

        let by_meaning = WordSearchFilter { query: Some("고양이".into()), ..Default::default() };
        let hits = search_words(&sets, &by_meaning);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, sets[1].id);

        let typo = WordSearchFilter { query: Some("apreciate".into()), ..Default::default() };
        assert_eq!(search_words(&sets, &typo)[0].1.word, "Appreciate");
    }

    #[test]
    fn filters_combine() {
        let sets = sets();
        let filter = WordSearchFilter {
            category: Some("영어".into()),
            tags: Some(vec!["business".into()]),
            not_studied_only: true,
            ..Default::default()
        };
        let hits = search_words(&sets, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.word, "Collaborate");

        let hard = WordSearchFilter { difficulty: Some(Difficulty::Hard), ..Default::default() };
        assert_eq!(search_words(&sets, &hard).len(), 1);
    }

    #[test]
    fn sort_descending_alphabetical() {
        let filter = WordSearchFilter { sort_order: SortOrder::Desc, ..Default::default() };
        let words: Vec<String> = search_words(&sets(), &filter).into_iter().map(|(_, w)| w.word).collect();
        assert_eq!(words, vec!["neko", "Collaborate", "Appreciate"]);
    }
}
