//! Word import: quick-entry lines, CSV and spreadsheet files

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;

use crate::error::{CoreError, CoreResult};
use crate::models::{Difficulty, Word};

/// Column index mapping
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnMapping {
    pub word: usize,
    pub meaning: usize,
    pub example: Option<usize>,
    pub pronunciation: Option<usize>,
    pub difficulty: Option<usize>,
    pub tags: Option<usize>,
}

/// Detect column indices from header names
pub fn detect_columns(headers: &[String]) -> CoreResult<ColumnMapping> {
    let mut word = None;
    let mut meaning = None;
    let mut mapping = ColumnMapping::default();

    for (i, header) in headers.iter().enumerate() {
        match header.trim().to_lowercase().as_str() {
            "word" | "words" | "vocabulary" | "단어" => word = Some(i),
            "meaning" | "meanings" | "definition" | "뜻" | "의미" => meaning = Some(i),
            "example" | "examples" | "sentence" | "예문" => mapping.example = Some(i),
            "pronunciation" | "발음" => mapping.pronunciation = Some(i),
            "difficulty" | "난이도" => mapping.difficulty = Some(i),
            "tags" | "tag" | "태그" => mapping.tags = Some(i),
            _ => {} // Unknown columns ignored
        }
    }

    mapping.word = word.ok_or_else(|| CoreError::Import("Missing required 'word' column in header".to_string()))?;
    mapping.meaning = meaning.ok_or_else(|| CoreError::Import("Missing required 'meaning' column in header".to_string()))?;
    Ok(mapping)
}

fn cell(fields: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| fields.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Build a word from one data row. Rows without a word or meaning are skipped.
fn row_to_word(mapping: &ColumnMapping, fields: &[String]) -> Option<Word> {
    let word = cell(fields, Some(mapping.word))?;
    let meaning = cell(fields, Some(mapping.meaning))?;

    let mut entry = Word::new(word, meaning);
    entry.example = cell(fields, mapping.example).map(str::to_string);
    entry.pronunciation = cell(fields, mapping.pronunciation).map(str::to_string);
    if let Some(d) = cell(fields, mapping.difficulty).and_then(Difficulty::parse) {
        entry.difficulty = d;
    }
    if let Some(tags) = cell(fields, mapping.tags) {
        entry.tags = tags
            .split([',', ';'])
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
    }
    Some(entry)
}

/// Parse the quick-entry format `word|meaning|example`
pub fn parse_quick_entry(line: &str) -> CoreResult<Word> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 2 {
        return Err(CoreError::Validation(
            "Expected 'word|meaning|example', e.g. apple|사과|I eat an apple".to_string(),
        ));
    }
    let (word, meaning) = (parts[0].trim(), parts[1].trim());
    if word.is_empty() || meaning.is_empty() {
        return Err(CoreError::Validation("Word and meaning must not be empty".to_string()));
    }

    let mut entry = Word::new(word, meaning);
    if let Some(example) = parts.get(2) {
        entry = entry.with_example(example);
    }
    Ok(entry)
}

/// Parse a CSV file with a header row
pub fn parse_csv(file_path: &str) -> CoreResult<Vec<Word>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(file_path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mapping = detect_columns(&headers)?;

    let mut words = Vec::new();
    for result in reader.records() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if let Some(word) = row_to_word(&mapping, &fields) {
            words.push(word);
        }
    }

    log::info!("Parsed {} words from {}", words.len(), file_path);
    Ok(words)
}

/// Parse the first sheet of a spreadsheet (xlsx, xls, ods)
pub fn parse_excel(file_path: &str) -> CoreResult<Vec<Word>> {
    let mut workbook = open_workbook_auto(file_path)
        .map_err(|e| CoreError::Import(format!("Failed to open spreadsheet: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CoreError::Import("No sheets found in spreadsheet".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CoreError::Import(format!("Failed to read sheet: {}", e)))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| CoreError::Import("Empty file - no header row".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(get_cell_string).collect();
    let mapping = detect_columns(&headers)?;

    let words: Vec<Word> = rows
        .filter_map(|row| {
            let fields: Vec<String> = row.iter().map(get_cell_string).collect();
            row_to_word(&mapping, &fields)
        })
        .collect();

    log::info!("Parsed {} words from {}", words.len(), file_path);
    Ok(words)
}

/// Dispatch on file extension
pub fn parse_file(file_path: &str) -> CoreResult<Vec<Word>> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => parse_excel(file_path),
        "csv" => parse_csv(file_path),
        _ => Err(CoreError::Import(format!("Unsupported file format: .{}", extension))),
    }
}

/// Helper to extract string from a spreadsheet cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}
