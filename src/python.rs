//! Python bindings. Nested records cross the boundary as JSON strings.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::fuzzy::{check_match, MatchResult, WordSearchFilter};
use crate::gesture::{resolve_gesture, GestureOutcome, SwipeDirection};
use crate::progress::Period;
use crate::questions::QuizQuestion;
use crate::repository::Repository;
use crate::session::CompletedSession;

fn to_py_err(e: CoreError) -> PyErr {
    if e.is_user_error() {
        PyValueError::new_err(e.to_string())
    } else {
        PyRuntimeError::new_err(e.to_string())
    }
}

fn load_config(config_path: Option<&str>) -> PyResult<CoreConfig> {
    match config_path {
        Some(path) => CoreConfig::load_or_default(path).map_err(to_py_err),
        None => Ok(CoreConfig::default()),
    }
}

fn open_repo(db_path: &str, config_path: Option<&str>) -> PyResult<Repository> {
    Repository::open(db_path, load_config(config_path)?).map_err(to_py_err)
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

#[pyfunction]
#[pyo3(name = "init_database")]
pub fn py_init_database(db_path: &str) -> PyResult<bool> {
    open_repo(db_path, None)?.initialize_sample_data().map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "get_word_sets")]
pub fn py_get_word_sets(db_path: &str) -> PyResult<String> {
    let sets = open_repo(db_path, None)?.get_word_sets().map_err(to_py_err)?;
    to_json(&sets)
}

#[pyfunction]
#[pyo3(name = "create_word_set", signature = (db_path, title, description = "", category = ""))]
pub fn py_create_word_set(db_path: &str, title: &str, description: &str, category: &str) -> PyResult<String> {
    let set = open_repo(db_path, None)?
        .create_word_set(title, description, category)
        .map_err(to_py_err)?;
    to_json(&set)
}

#[pyfunction]
#[pyo3(name = "delete_word_set")]
pub fn py_delete_word_set(db_path: &str, word_set_id: &str) -> PyResult<bool> {
    open_repo(db_path, None)?.delete_word_set(word_set_id).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "add_word")]
pub fn py_add_word(db_path: &str, word_set_id: &str, entry: &str) -> PyResult<String> {
    let word = open_repo(db_path, None)?
        .add_quick_entry(word_set_id, entry)
        .map_err(to_py_err)?;
    to_json(&word)
}

#[pyfunction]
#[pyo3(name = "import_words")]
pub fn py_import_words(db_path: &str, word_set_id: &str, file_path: &str) -> PyResult<usize> {
    open_repo(db_path, None)?
        .import_words_from_file(word_set_id, file_path)
        .map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "search_words")]
pub fn py_search_words(db_path: &str, filter_json: &str) -> PyResult<String> {
    let filter: WordSearchFilter = serde_json::from_str(filter_json)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let hits = open_repo(db_path, None)?.search_words(&filter).map_err(to_py_err)?;
    to_json(&hits)
}

#[pyfunction]
#[pyo3(name = "generate_quiz", signature = (db_path, config_path = None))]
pub fn py_generate_quiz(db_path: &str, config_path: Option<&str>) -> PyResult<Vec<QuizQuestion>> {
    open_repo(db_path, config_path)?.generate_quiz().map_err(to_py_err)
}

/// An explicit `threshold` wins over the configured one
#[pyfunction]
#[pyo3(name = "check_match", signature = (user_input, expected, threshold = None, config_path = None))]
pub fn py_check_match(
    user_input: &str,
    expected: &str,
    threshold: Option<f64>,
    config_path: Option<&str>,
) -> PyResult<MatchResult> {
    let threshold = match threshold {
        Some(t) => t,
        None => load_config(config_path)?.matching.threshold,
    };
    Ok(check_match(user_input, expected, threshold))
}

/// Returns "right", "left" or "cancel"
#[pyfunction]
#[pyo3(name = "resolve_gesture", signature = (drag_dx, velocity_x, config_path = None))]
pub fn py_resolve_gesture(drag_dx: f64, velocity_x: f64, config_path: Option<&str>) -> PyResult<&'static str> {
    let config = load_config(config_path)?;
    Ok(match resolve_gesture(drag_dx, velocity_x, &config.gesture) {
        GestureOutcome::Commit(SwipeDirection::Right) => "right",
        GestureOutcome::Commit(SwipeDirection::Left) => "left",
        GestureOutcome::Cancel => "cancel",
    })
}

/// Persist a finished session given as JSON; returns today's stats as JSON
#[pyfunction]
#[pyo3(name = "complete_session", signature = (db_path, completed_json, config_path = None))]
pub fn py_complete_session(db_path: &str, completed_json: &str, config_path: Option<&str>) -> PyResult<String> {
    let done: CompletedSession = serde_json::from_str(completed_json)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let stats = open_repo(db_path, config_path)?.complete_session(&done).map_err(to_py_err)?;
    to_json(&stats)
}

#[pyfunction]
#[pyo3(name = "progress_report")]
pub fn py_progress_report(db_path: &str, period: &str) -> PyResult<String> {
    let period = Period::parse(period)
        .ok_or_else(|| PyValueError::new_err(format!("Unknown period: {}", period)))?;
    let report = open_repo(db_path, None)?.progress_report(period).map_err(to_py_err)?;
    to_json(&report)
}

#[pyfunction]
#[pyo3(name = "current_streak")]
pub fn py_current_streak(db_path: &str) -> PyResult<u32> {
    open_repo(db_path, None)?.calculate_current_streak().map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "export_data")]
pub fn py_export_data(db_path: &str) -> PyResult<String> {
    open_repo(db_path, None)?.export_data().map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "import_data")]
pub fn py_import_data(db_path: &str, json: &str) -> PyResult<()> {
    open_repo(db_path, None)?.import_data(json).map_err(to_py_err)
}

/// WordMemo core Python module
#[pymodule]
pub fn wordmemo_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Storage
    m.add_function(wrap_pyfunction!(py_init_database, m)?)?;
    m.add_function(wrap_pyfunction!(py_get_word_sets, m)?)?;
    m.add_function(wrap_pyfunction!(py_create_word_set, m)?)?;
    m.add_function(wrap_pyfunction!(py_delete_word_set, m)?)?;
    m.add_function(wrap_pyfunction!(py_add_word, m)?)?;
    m.add_function(wrap_pyfunction!(py_import_words, m)?)?;
    m.add_function(wrap_pyfunction!(py_search_words, m)?)?;
    m.add_function(wrap_pyfunction!(py_export_data, m)?)?;
    m.add_function(wrap_pyfunction!(py_import_data, m)?)?;

    // Quiz and matching
    m.add_function(wrap_pyfunction!(py_generate_quiz, m)?)?;
    m.add_function(wrap_pyfunction!(py_check_match, m)?)?;

    // Study sessions
    m.add_function(wrap_pyfunction!(py_resolve_gesture, m)?)?;
    m.add_function(wrap_pyfunction!(py_complete_session, m)?)?;

    // Progress
    m.add_function(wrap_pyfunction!(py_progress_report, m)?)?;
    m.add_function(wrap_pyfunction!(py_current_streak, m)?)?;

    m.add_class::<QuizQuestion>()?;
    m.add_class::<MatchResult>()?;

    Ok(())
}
