use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::path::Path;

use crate::excel_validator::ValidationError;
use crate::utils::{excel_duration_to_text, excel_serial_to_text, non_blank};

/// Immutable rectangular table of cell text for one worksheet.
///
/// Addressing is 1-based and absolute: `(1, 1)` is the sheet's A1 cell even
/// when the used range starts further down or to the right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<String>>,
    row_count: usize,
    column_count: usize,
}

impl Grid {
    //////////////////////////////////////////////////////////////
    ///  Public API
    //////////////////////////////////////////////////////////////

    /// Load one worksheet from the file at `path`.
    ///
    /// An absent or empty `sheet_name` selects the first worksheet. CSV files
    /// are treated as a workbook with a single worksheet named after the file
    /// stem. The workbook handle is released before this returns.
    pub fn open(path: &Path, sheet_name: Option<&str>) -> Result<Grid, ValidationError> {
        if !path.is_file() {
            return Err(ValidationError::FileNotFound(path.display().to_string()));
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::open_csv(path, non_blank(sheet_name))
        } else {
            Self::open_workbook(path, non_blank(sheet_name))
        }
    }

    /// Build a grid from rows of cell text. Row 1 is the header row.
    /// Short rows are padded with empty cells.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Grid {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let row_count = if column_count == 0 { 0 } else { rows.len() };

        let cells = rows
            .into_iter()
            .take(row_count)
            .map(|mut row| {
                row.resize(column_count, String::new());
                row
            })
            .collect();

        Grid {
            cells,
            row_count,
            column_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Text of the cell at 1-based `(row, column)`; empty outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        if row == 0 || column == 0 {
            return "";
        }
        self.cells
            .get(row - 1)
            .and_then(|r| r.get(column - 1))
            .map(String::as_str)
            .unwrap_or("")
    }

    //////////////////////////////////////////////////////////////
    ///  Private methods
    //////////////////////////////////////////////////////////////

    fn open_workbook(path: &Path, sheet_name: Option<&str>) -> Result<Grid, ValidationError> {
        let mut workbook: Sheets<_> = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names();

        let sheet = match sheet_name {
            Some(name) => sheet_names
                .iter()
                .find(|candidate| candidate.as_str() == name)
                .cloned()
                .ok_or_else(|| ValidationError::SheetNotFound(name.to_string()))?,
            None => sheet_names
                .first()
                .cloned()
                .ok_or(ValidationError::NoWorksheets)?,
        };

        let range = workbook.worksheet_range(&sheet)?;
        tracing::debug!(sheet = %sheet, "Loaded worksheet");
        Ok(Self::from_range(&range))
    }

    fn open_csv(path: &Path, sheet_name: Option<&str>) -> Result<Grid, ValidationError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if let Some(name) = sheet_name {
            if name != stem {
                return Err(ValidationError::SheetNotFound(name.to_string()));
            }
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        tracing::debug!(sheet = %stem, rows = rows.len(), "Loaded CSV worksheet");
        Ok(Self::from_rows(rows))
    }

    /// Materialize a calamine range into absolute A1-based coordinates
    fn from_range(range: &Range<Data>) -> Grid {
        let Some((end_row, end_column)) = range.end() else {
            return Grid::default();
        };
        let row_count = end_row as usize + 1;
        let column_count = end_column as usize + 1;

        let mut cells = vec![vec![String::new(); column_count]; row_count];
        for (row_index, row) in cells.iter_mut().enumerate() {
            for (column_index, cell) in row.iter_mut().enumerate() {
                if let Some(data) = range.get_value((row_index as u32, column_index as u32)) {
                    *cell = cell_text(data);
                }
            }
        }

        Grid {
            cells,
            row_count,
            column_count,
        }
    }
}

/// Display text of a single cell
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => number_text(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            let text = if dt.is_duration() {
                excel_duration_to_text(serial)
            } else {
                excel_serial_to_text(serial)
            };
            // Excel shows ##### for dates it cannot render; keep the number instead
            text.unwrap_or_else(|| number_text(serial))
        }
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_rows_pads_ragged_rows() {
        let grid = Grid::from_rows(rows(&[&["Name", "Email", "Flow"], &["Alice"]]));

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.cell(2, 1), "Alice");
        assert_eq!(grid.cell(2, 3), "");
    }

    #[test]
    fn test_cell_outside_grid_is_empty() {
        let grid = Grid::from_rows(rows(&[&["Name"]]));

        assert_eq!(grid.cell(0, 1), "");
        assert_eq!(grid.cell(1, 0), "");
        assert_eq!(grid.cell(5, 5), "");
    }

    #[test]
    fn test_from_rows_without_cells_is_empty() {
        let grid = Grid::from_rows(vec![Vec::new(), Vec::new()]);
        assert_eq!(grid.row_count(), 0);
        assert_eq!(grid.column_count(), 0);
    }

    #[test]
    fn test_cell_text_conversion() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("a@x.com".to_string())), "a@x.com");
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&Data::Bool(false)), "FALSE");
        assert_eq!(cell_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }

    #[test]
    fn test_date_cell_text() {
        let date = ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(date)), "2023-03-15");

        let timestamp = ExcelDateTime::new(45000.25, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(timestamp)), "2023-03-15 06:00:00");

        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(cell_text(&Data::DateTime(duration)), "36:00:00");

        assert_eq!(
            cell_text(&Data::DateTimeIso("2023-03-15T06:00:00".to_string())),
            "2023-03-15T06:00:00"
        );
        assert_eq!(cell_text(&Data::DurationIso("PT36H".to_string())), "PT36H");
    }

    #[test]
    fn test_out_of_range_date_falls_back_to_number() {
        let huge = ExcelDateTime::new(1.0e12, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(huge)), "1000000000000");

        let negative = ExcelDateTime::new(-2.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(negative)), "-2.5");
    }

    #[test]
    fn test_range_keeps_absolute_positions() {
        // Used range starting at B2
        let mut range: Range<Data> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("Name".to_string()));
        range.set_value((1, 2), Data::String("Email".to_string()));
        range.set_value((2, 1), Data::String("Alice".to_string()));

        let grid = Grid::from_range(&range);

        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.cell(1, 1), "");
        assert_eq!(grid.cell(2, 2), "Name");
        assert_eq!(grid.cell(2, 3), "Email");
        assert_eq!(grid.cell(3, 2), "Alice");
    }

    #[test]
    fn test_empty_range_is_empty_grid() {
        let range: Range<Data> = Range::empty();
        assert_eq!(Grid::from_range(&range), Grid::default());
    }
}
