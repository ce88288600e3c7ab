//! Progress tracking - daily aggregation, streaks and period reports

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{AccuracyRule, StatsConfig, WordsLearnedRule};
use crate::error::{CoreError, CoreResult};
use crate::models::{StudySession, StudyStats, UserSettings, WordSet};

/// Minutes a finished session adds to the day: rounded, at least one
pub fn session_minutes(duration_secs: i64) -> u32 {
    let minutes = (duration_secs.max(0) as f64 / 60.0).round() as u32;
    minutes.max(1)
}

/// Merge a finished session into today's record.
///
/// `history` is every stored daily record; it is only used to recompute the
/// streak, with today's record replaced by the merged one. Calling this twice
/// for the same session counts it twice.
pub fn record_session(
    prior: Option<&StudyStats>,
    session: &StudySession,
    words_in_set: usize,
    history: &[StudyStats],
    today: NaiveDate,
    rules: &StatsConfig,
) -> CoreResult<StudyStats> {
    let duration = match (session.end_time, session.duration) {
        (Some(_), Some(duration)) => duration,
        _ => {
            return Err(CoreError::SessionState(format!(
                "Session {} must be finished before it is recorded", session.id
            )))
        }
    };
    if let Some(p) = prior {
        if p.date != today {
            return Err(CoreError::Validation(format!(
                "Prior stats are for {}, not {}", p.date, today
            )));
        }
    }

    let mut stats = prior.cloned().unwrap_or_else(|| StudyStats::empty(today));

    stats.words_learned += match rules.words_learned_rule {
        WordsLearnedRule::WordsStudied => session.words_studied,
        WordsLearnedRule::SetSize => words_in_set as u32,
    };
    stats.study_time += session_minutes(duration);

    stats.average_accuracy = match rules.accuracy_rule {
        AccuracyRule::Overwrite => session.accuracy,
        AccuracyRule::SessionMean => {
            let previous_sessions = stats.sessions_completed as f64;
            (stats.average_accuracy * previous_sessions + session.accuracy) / (previous_sessions + 1.0)
        }
    };
    stats.sessions_completed += 1;

    let mut merged: Vec<StudyStats> = history.iter().filter(|s| s.date != today).cloned().collect();
    merged.push(stats.clone());
    stats.streak = current_streak(&merged, today);

    Ok(stats)
}

fn active_days(history: &[StudyStats]) -> BTreeSet<NaiveDate> {
    history
        .iter()
        .filter(|s| s.words_learned > 0)
        .map(|s| s.date)
        .collect()
}

/// Consecutive days ending `today` with at least one word learned.
/// Zero when today itself has no activity.
pub fn current_streak(history: &[StudyStats], today: NaiveDate) -> u32 {
    let days = active_days(history);
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}

/// Longest run of consecutive active days anywhere in the history
pub fn longest_streak(history: &[StudyStats]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in active_days(history) {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    pub fn days(self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Year => 365,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            _ => None,
        }
    }
}

/// Totals for one reporting period, ending today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<StudyStats>,
    pub total_words_learned: u32,
    /// Minutes
    pub total_study_time: u32,
    pub total_sessions: u32,
    pub average_accuracy: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub word_goal_percent: f64,
    pub time_goal_percent: f64,
}

fn goal_percent(done: u32, goal: u64) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (done as f64 / goal as f64 * 100.0).min(100.0)
}

pub fn summarize_period(
    history: &[StudyStats],
    period: Period,
    today: NaiveDate,
    settings: &UserSettings,
) -> ProgressReport {
    let start_date = today - Duration::days(period.days() - 1);
    let mut days: Vec<StudyStats> = history
        .iter()
        .filter(|s| s.date >= start_date && s.date <= today)
        .cloned()
        .collect();
    days.sort_by_key(|s| s.date);

    let total_words_learned = days.iter().map(|d| d.words_learned).sum();
    let total_study_time = days.iter().map(|d| d.study_time).sum();
    let total_sessions = days.iter().map(|d| d.sessions_completed).sum();

    let studied: Vec<&StudyStats> = days.iter().filter(|d| d.sessions_completed > 0).collect();
    let average_accuracy = if studied.is_empty() {
        0.0
    } else {
        studied.iter().map(|d| d.average_accuracy).sum::<f64>() / studied.len() as f64
    };

    let span = period.days() as u64;
    ProgressReport {
        period,
        start_date,
        end_date: today,
        word_goal_percent: goal_percent(total_words_learned, settings.daily_word_goal as u64 * span),
        time_goal_percent: goal_percent(total_study_time, settings.daily_time_goal as u64 * span),
        days,
        total_words_learned,
        total_study_time,
        total_sessions,
        average_accuracy,
        current_streak: current_streak(history, today),
        longest_streak: longest_streak(history),
    }
}

/// Word-set totals derived from the words themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSetProgress {
    pub total_words: usize,
    pub studied_words: usize,
    pub correct_rate: f64,
}

pub fn word_set_progress(word_set: &WordSet) -> WordSetProgress {
    let mut fresh = word_set.clone();
    fresh.refresh_progress();
    WordSetProgress {
        total_words: fresh.total_words,
        studied_words: fresh.studied_words,
        correct_rate: fresh.correct_rate,
    }
}
