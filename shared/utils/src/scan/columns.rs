//! Column Inference
//!
//! Decides which column of a sheet holds the expiry date, which holds the item
//! label, and which carry extra facts (lot, location, ...). Header text is
//! scored first; the values themselves are only sniffed when no header matches.

use chrono::NaiveDate;
use shelfwatch_models::{CellValue, ColumnGuess, DetectionMethod, InfoField, SheetTable};

use super::dates::DateParser;

/// Header-score weight for each expiry keyword group.
const STRONG_SCORE: u8 = 3;
const VALIDITY_SCORE: u8 = 2;
const GENERIC_SCORE: u8 = 1;

/// Column-role inference with configurable keyword lists.
pub struct ColumnInference {
    sample_size: usize,
    reference_date: Option<NaiveDate>,
    strong_date_keywords: Vec<String>,
    validity_keywords: Vec<String>,
    generic_date_keywords: Vec<String>,
    label_keywords: Vec<String>,
    info_keywords: Vec<(InfoField, Vec<String>)>,
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ColumnInference {
    fn default() -> Self {
        Self {
            sample_size: 20,
            reference_date: None,
            strong_date_keywords: keywords(&[
                "expiry", "expiration", "expire", "expires", "expiring", "expired", "exp",
                "use by", "best before", "valid until", "valid till", "valid thru",
            ]),
            validity_keywords: keywords(&["valid", "validity", "shelf life", "due date", "end date"]),
            generic_date_keywords: keywords(&["date"]),
            label_keywords: keywords(&[
                "name", "item", "product", "reagent", "chemical", "material", "description", "desc",
            ]),
            info_keywords: vec![
                (InfoField::Lot, keywords(&["lot", "batch"])),
                (InfoField::Catalog, keywords(&["catalog", "catalogue", "cat"])),
                (InfoField::Quantity, keywords(&["quantity", "qty", "amount", "volume", "vol"])),
                (InfoField::Location, keywords(&["location", "storage", "position", "shelf", "cabinet"])),
                (InfoField::Supplier, keywords(&["supplier", "vendor", "manufacturer", "company"])),
            ],
        }
    }
}

impl ColumnInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure how many non-empty cells are sampled per column
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// A sniffed column must hold at least one date after this day.
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = Some(reference_date);
        self
    }

    /// Infer column roles; `None` when no column qualifies as the expiry date.
    pub fn infer(&self, table: &SheetTable, parser: &DateParser) -> Option<ColumnGuess> {
        let (date_column, method) = self
            .date_column_by_header(table, parser)
            .map(|c| (c, DetectionMethod::Header))
            .or_else(|| {
                self.date_column_by_values(table, parser)
                    .map(|c| (c, DetectionMethod::ValueSniffing))
            })?;

        let mut guess = ColumnGuess {
            date_column,
            date_header: table.header(date_column).unwrap_or_default().to_string(),
            method,
            label_column: self.label_column(table, date_column, parser),
            info_columns: Vec::new(),
        };
        guess.info_columns = self.info_columns(table, &guess);
        Some(guess)
    }

    /// Score a header against the expiry keyword groups; 0 means no match.
    pub fn date_header_score(&self, header: &str) -> u8 {
        let tokens = header_tokens(header);
        if matches_any(&tokens, &self.strong_date_keywords) {
            STRONG_SCORE
        } else if matches_any(&tokens, &self.validity_keywords) {
            VALIDITY_SCORE
        } else if matches_any(&tokens, &self.generic_date_keywords) {
            GENERIC_SCORE
        } else {
            0
        }
    }

    pub fn is_label_header(&self, header: &str) -> bool {
        matches_any(&header_tokens(header), &self.label_keywords)
    }

    pub fn info_field_for_header(&self, header: &str) -> Option<InfoField> {
        let tokens = header_tokens(header);
        self.info_keywords
            .iter()
            .find(|(_, words)| matches_any(&tokens, words))
            .map(|(field, _)| *field)
    }

    /// Share of sampled non-empty values that parse as dates.
    pub fn date_parse_ratio(&self, table: &SheetTable, column: usize, parser: &DateParser) -> f64 {
        let sample: Vec<&CellValue> = table.column_values(column).take(self.sample_size).collect();
        if sample.is_empty() {
            return 0.0;
        }
        let parsed = sample.iter().filter(|c| parser.parse(c).is_some()).count();
        parsed as f64 / sample.len() as f64
    }

    /// Majority of sampled values are free text (not dates, not numbers).
    pub fn is_text_column(&self, table: &SheetTable, column: usize, parser: &DateParser) -> bool {
        let sample: Vec<&CellValue> = table.column_values(column).take(self.sample_size).collect();
        if sample.is_empty() {
            return false;
        }
        let text = sample
            .iter()
            .filter(|c| is_free_text(c, parser))
            .count();
        text * 2 > sample.len()
    }

    fn date_column_by_header(&self, table: &SheetTable, parser: &DateParser) -> Option<usize> {
        let mut candidates: Vec<(u8, usize)> = (0..table.column_count())
            .filter_map(|c| {
                let score = self.date_header_score(table.header(c)?);
                (score > 0).then_some((score, c))
            })
            .collect();
        // Highest score first, leftmost among equals
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        candidates
            .into_iter()
            .map(|(_, c)| c)
            .find(|&c| self.date_parse_ratio(table, c, parser) > 0.0)
    }

    fn date_column_by_values(&self, table: &SheetTable, parser: &DateParser) -> Option<usize> {
        // (ratio, has non-numeric dates, column)
        let mut best: Option<(f64, bool, usize)> = None;
        for column in 0..table.column_count() {
            let sample: Vec<&CellValue> = table.column_values(column).take(self.sample_size).collect();
            if sample.is_empty() {
                continue;
            }
            let dates: Vec<(NaiveDate, bool)> = sample
                .iter()
                .filter_map(|c| parser.parse(c).map(|d| (d, !is_bare_number(c))))
                .collect();
            let ratio = dates.len() as f64 / sample.len() as f64;
            if ratio <= 0.5 {
                continue;
            }
            if let Some(reference) = self.reference_date {
                if !dates.iter().any(|(d, _)| *d > reference) {
                    continue;
                }
            }

            let typed = dates.iter().any(|(_, typed)| *typed);
            let better = best.map_or(true, |(r, t, _)| ratio > r || (ratio == r && typed && !t));
            if better {
                best = Some((ratio, typed, column));
            }
        }
        best.map(|(_, _, c)| c)
    }

    fn label_column(&self, table: &SheetTable, date_column: usize, parser: &DateParser) -> Option<usize> {
        let has_values = |c: usize| table.column_values(c).next().is_some();

        // Method 1: keyword match
        if let Some(c) = (0..table.column_count()).find(|&c| {
            c != date_column
                && table.header(c).is_some_and(|h| self.is_label_header(h))
                && has_values(c)
        }) {
            return Some(c);
        }

        // Method 2: nearest text column left of the date
        if let Some(c) = (0..date_column)
            .rev()
            .find(|&c| self.is_text_column(table, c, parser))
        {
            return Some(c);
        }

        // Method 3: first text column overall
        (0..table.column_count()).find(|&c| c != date_column && self.is_text_column(table, c, parser))
    }

    fn info_columns(&self, table: &SheetTable, guess: &ColumnGuess) -> Vec<(InfoField, usize)> {
        let mut found: Vec<(InfoField, usize)> = Vec::new();
        for column in 0..table.column_count() {
            if guess.is_assigned(column) {
                continue;
            }
            let Some(header) = table.header(column) else {
                continue;
            };
            // "Shelf life" and friends are date columns, not locations
            if self.date_header_score(header) > 0 {
                continue;
            }
            if let Some(field) = self.info_field_for_header(header) {
                if !found.iter().any(|(f, _)| *f == field) {
                    found.push((field, column));
                }
            }
        }
        found
    }
}

/// Lowercased words of a header; camelCase and punctuation split words.
pub fn header_tokens(header: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(header.len() + 8);
    let mut prev_lower = false;
    for ch in header.chars() {
        if ch.is_uppercase() && prev_lower {
            spaced.push(' ');
        }
        prev_lower = ch.is_lowercase();
        if ch.is_alphanumeric() {
            spaced.extend(ch.to_lowercase());
        } else {
            spaced.push(' ');
        }
    }
    spaced.split_whitespace().map(str::to_string).collect()
}

/// Whether the words of `phrase` appear consecutively in `tokens`.
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return false;
    }
    tokens
        .windows(words.len())
        .any(|window| window.iter().zip(&words).all(|(t, w)| t == w))
}

fn matches_any(tokens: &[String], phrases: &[String]) -> bool {
    phrases.iter().any(|p| contains_phrase(tokens, p))
}

/// Number cells and digit-only text, which read as serials but are often codes.
fn is_bare_number(cell: &CellValue) -> bool {
    match cell {
        CellValue::Number(_) => true,
        CellValue::Text(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn is_free_text(cell: &CellValue, parser: &DateParser) -> bool {
    match cell.as_text() {
        Some(text) => text.parse::<f64>().is_err() && parser.parse(cell).is_none(),
        None => false,
    }
}
