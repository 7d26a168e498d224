//! Date Parsing
//!
//! Turns heterogeneous cell values into calendar dates: native spreadsheet
//! dates, serial numbers, ISO strings, locale day/month/year strings,
//! month-name forms and month/year forms.

use chrono::{Datelike, NaiveDate};
use shelfwatch_models::{serial_to_date, CellValue, DateOrder, SheetTable};

/// Serial numbers in plain number cells are only trusted inside this year window.
const SERIAL_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1950..=2199;

/// Years accepted from text dates; `%Y` happily reads `27` as 27 AD.
const TEXT_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2199;

/// Day-month-year formats, tried after separators and commas became single spaces.
/// `%b` only takes abbreviations and `%B` takes both, so each needs its own entry.
/// `%Y` also accepts one or two digits, so short years get their own list.
const LONG_YEAR_FORMATS: &[&str] = &[
    "%d %b %Y", "%d %B %Y", "%b %d %Y", "%B %d %Y", "%Y %b %d", "%Y %B %d",
];
const SHORT_YEAR_FORMATS: &[&str] = &["%d %b %y", "%d %B %y", "%b %d %y", "%B %d %y"];

/// Parses cells into dates, resolving day/month ambiguity with a fixed order.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    order: DateOrder,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DateOrder::default())
    }
}

impl DateParser {
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> DateOrder {
        self.order
    }

    pub fn parse(&self, cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            CellValue::DateSerial(serial) => serial_to_date(*serial),
            CellValue::Number(n) => plausible_serial(*n),
            CellValue::Text(s) => self.parse_text(s),
            CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
        }
    }

    pub fn parse_text(&self, raw: &str) -> Option<NaiveDate> {
        let s = strip_time(raw.trim());
        if s.is_empty() {
            return None;
        }

        if s.len() == 8 && is_digits(&s) {
            let date = NaiveDate::from_ymd_opt(
                s[..4].parse().ok()?,
                s[4..6].parse().ok()?,
                s[6..].parse().ok()?,
            );
            if date.is_some() {
                return date;
            }
        }
        if let Ok(n) = s.parse::<f64>() {
            return plausible_serial(n);
        }

        if let Some(parts) = NumericParts::split(&s) {
            return parts.resolve(self.order);
        }

        if s.chars().any(|c| c.is_ascii_alphabetic()) {
            let normalized = normalize_month_name_text(&s);
            let tokens: Vec<&str> = normalized.split(' ').collect();
            match tokens.len() {
                2 => return parse_month_year(&normalized),
                3 => {}
                _ => return None,
            }
            let has_long_year = tokens.iter().any(|t| t.len() == 4 && is_digits(t));
            let formats = if has_long_year { LONG_YEAR_FORMATS } else { SHORT_YEAR_FORMATS };
            return formats
                .iter()
                .filter_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
                .find(|date| TEXT_YEAR_RANGE.contains(&date.year()));
        }

        parse_month_year(&s)
    }
}

/// Counts of unambiguous numeric dates seen across a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOrderEvidence {
    pub day_first: usize,
    pub month_first: usize,
}

impl DateOrderEvidence {
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a SheetTable>) -> Self {
        let mut evidence = Self::default();
        for table in tables {
            for row in &table.rows {
                for cell in &row.cells {
                    evidence.observe(cell);
                }
            }
        }
        evidence
    }

    pub fn observe(&mut self, cell: &CellValue) {
        let Some(text) = cell.as_text() else {
            return;
        };
        let Some(parts) = NumericParts::split(&strip_time(text)) else {
            return;
        };
        if parts.year_first {
            return;
        }
        match (parts.first, parts.second) {
            (a, b) if a > 12 && (1..=12).contains(&b) => self.day_first += 1,
            (a, b) if b > 12 && (1..=12).contains(&a) => self.month_first += 1,
            _ => {}
        }
    }

    /// The order the file consistently uses, or `fallback` when it is silent or mixed.
    pub fn preferred(&self, fallback: DateOrder) -> DateOrder {
        match (self.day_first, self.month_first) {
            (d, 0) if d > 0 => DateOrder::DayFirst,
            (0, m) if m > 0 => DateOrder::MonthFirst,
            _ => fallback,
        }
    }
}

/// Three all-digit components separated by `/`, `-` or `.`.
#[derive(Debug, Clone, Copy)]
struct NumericParts {
    first: u32,
    second: u32,
    year: i32,
    year_first: bool,
}

impl NumericParts {
    fn split(s: &str) -> Option<Self> {
        let pieces: Vec<&str> = s.split(['/', '-', '.']).collect();
        if pieces.len() != 3 || pieces.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
            return None;
        }

        if pieces[0].len() == 4 {
            return Some(Self {
                first: pieces[1].parse().ok()?,
                second: pieces[2].parse().ok()?,
                year: pieces[0].parse().ok()?,
                year_first: true,
            });
        }

        if pieces[0].len() > 2 || pieces[1].len() > 2 {
            return None;
        }
        let year = match pieces[2].len() {
            4 => pieces[2].parse().ok()?,
            2 => expand_two_digit_year(pieces[2].parse().ok()?),
            _ => return None,
        };
        Some(Self {
            first: pieces[0].parse().ok()?,
            second: pieces[1].parse().ok()?,
            year,
            year_first: false,
        })
    }

    fn resolve(self, order: DateOrder) -> Option<NaiveDate> {
        if self.year_first {
            return NaiveDate::from_ymd_opt(self.year, self.first, self.second);
        }
        let day_first = NaiveDate::from_ymd_opt(self.year, self.second, self.first);
        let month_first = NaiveDate::from_ymd_opt(self.year, self.first, self.second);
        match (day_first, month_first) {
            (Some(d), Some(m)) => Some(match order {
                DateOrder::DayFirst => d,
                DateOrder::MonthFirst => m,
            }),
            (Some(d), None) => Some(d),
            (None, Some(m)) => Some(m),
            (None, None) => None,
        }
    }
}

fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < 70 {
        2000 + yy
    } else {
        1900 + yy
    }
}

fn plausible_serial(serial: f64) -> Option<NaiveDate> {
    serial_to_date(serial).filter(|d| SERIAL_YEAR_RANGE.contains(&d.year()))
}

/// Drop a trailing time of day (`2026-01-05T10:00:00`, `05/01/2026 10:00 AM`).
fn strip_time(s: &str) -> String {
    if s.len() > 10 && s.as_bytes().get(10) == Some(&b'T') && s.is_char_boundary(10) {
        return s[..10].to_string();
    }
    s.split_whitespace()
        .filter(|token| {
            let lower = token.to_ascii_lowercase();
            !token.contains(':') && lower != "am" && lower != "pm"
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_month_name_text(s: &str) -> String {
    s.replace([',', '-', '/', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `03/2027`, `2027-03`, `Mar 2027` resolve to the last day of that month.
fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let pieces: Vec<&str> = s
        .split(|c: char| c == '/' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if pieces.len() != 2 {
        return None;
    }

    let (year, month) = match (pieces[0].len(), pieces[1].len()) {
        (1 | 2, 4) if is_digits(pieces[0]) && is_digits(pieces[1]) => {
            (pieces[1].parse().ok()?, pieces[0].parse().ok()?)
        }
        (4, 1 | 2) if is_digits(pieces[0]) && is_digits(pieces[1]) => {
            (pieces[0].parse().ok()?, pieces[1].parse().ok()?)
        }
        (_, 4) if is_digits(pieces[1]) => {
            let text = format!("1 {} {}", pieces[0], pieces[1]);
            let first = NaiveDate::parse_from_str(&text, "%d %b %Y")
                .or_else(|_| NaiveDate::parse_from_str(&text, "%d %B %Y"))
                .ok()?;
            (first.year(), first.month())
        }
        _ => return None,
    };

    last_day_of_month(year, month).filter(|d| TEXT_YEAR_RANGE.contains(&d.year()))
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
        .filter(|_| (1..=12).contains(&month))
}
