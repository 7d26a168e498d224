use serde::{Deserialize, Serialize};
use std::fmt;

/// How the expiry-date column of a sheet was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Header,
    ValueSniffing,
}

/// Optional free-text facts captured verbatim from the remaining columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoField {
    Lot,
    Catalog,
    Quantity,
    Location,
    Supplier,
}

impl InfoField {
    pub const ALL: [InfoField; 5] = [
        Self::Lot,
        Self::Catalog,
        Self::Quantity,
        Self::Location,
        Self::Supplier,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Lot => "Lot",
            Self::Catalog => "Catalog",
            Self::Quantity => "Quantity",
            Self::Location => "Location",
            Self::Supplier => "Supplier",
        }
    }
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Inferred column roles for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGuess {
    pub date_column: usize,
    pub date_header: String,
    pub method: DetectionMethod,
    pub label_column: Option<usize>,
    pub info_columns: Vec<(InfoField, usize)>,
}

impl ColumnGuess {
    /// Whether a column already has a role and must not be reused.
    pub fn is_assigned(&self, column: usize) -> bool {
        column == self.date_column
            || self.label_column == Some(column)
            || self.info_columns.iter().any(|(_, c)| *c == column)
    }
}
