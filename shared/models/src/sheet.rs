use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One data row of a sheet, with its 1-based row number in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub row_number: usize,
    pub cells: Vec<CellValue>,
}

/// Raw contents of one sheet: header labels plus data rows.
///
/// Column labels are whatever the uploaded file used; nothing here assumes a
/// standard layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from a grid whose first row holds the headers.
    ///
    /// `first_row_number` is the 1-based source row of the header row. Fully
    /// blank data rows are dropped; row numbers of the remaining rows still
    /// point at their position in the source file.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<CellValue>>, first_row_number: usize) -> Self {
        let mut grid = grid.into_iter();
        let header_cells = grid.next().unwrap_or_default();
        let mut table = Self::new(name, Vec::new());

        let mut width = header_cells.len();
        let mut rows = Vec::new();
        for (idx, cells) in grid.enumerate() {
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            width = width.max(cells.len());
            rows.push(SheetRow {
                row_number: first_row_number + idx + 1,
                cells,
            });
        }

        table.headers = (0..width)
            .map(|i| {
                let label = header_cells.get(i).map(CellValue::display).unwrap_or_default();
                if label.is_empty() {
                    format!("Column {}", column_letter(i))
                } else {
                    label
                }
            })
            .collect();
        table.rows = rows;
        table
    }

    pub fn push_row(&mut self, row_number: usize, cells: Vec<CellValue>) {
        self.rows.push(SheetRow { row_number, cells });
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.cells.iter().all(CellValue::is_empty))
    }

    pub fn header(&self, column: usize) -> Option<&str> {
        self.headers.get(column).map(String::as_str)
    }

    pub fn cell<'a>(&self, row: &'a SheetRow, column: usize) -> &'a CellValue {
        row.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Non-empty values of one column, top to bottom.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> {
        self.rows
            .iter()
            .filter_map(move |r| r.cells.get(column))
            .filter(|c| !c.is_empty())
    }

    /// A row viewed as a mapping from column label to cell value.
    pub fn record<'a>(&'a self, row: &'a SheetRow) -> Vec<(&'a str, &'a CellValue)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), self.cell(row, i)))
            .collect()
    }
}

/// Spreadsheet column letter for a 0-based index (0 -> A, 26 -> AA).
pub fn column_letter(index: usize) -> String {
    let mut name = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(51), "AZ");
    }

    #[test]
    fn test_from_grid_names_blank_headers_and_skips_blank_rows() {
        let grid = vec![
            vec![CellValue::text("Item"), CellValue::Empty],
            vec![CellValue::text("Ethanol"), CellValue::text("2026-01-01")],
            vec![CellValue::Empty, CellValue::Empty],
            vec![CellValue::text("Acetone"), CellValue::text("2026-02-01"), CellValue::text("A1")],
        ];
        let table = SheetTable::from_grid("Reagents", grid, 1);

        assert_eq!(table.headers, vec!["Item", "Column B", "Column C"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[1].row_number, 4);

        let record = table.record(&table.rows[0]);
        assert_eq!(record[0], ("Item", &CellValue::text("Ethanol")));
        assert_eq!(record[2], ("Column C", &CellValue::Empty));
    }
}
