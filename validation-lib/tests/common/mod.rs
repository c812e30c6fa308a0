use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Re-export shared test utilities from src/test_utils.rs
pub use validation_lib::test_utils::{PEOPLE_ROWS, grid_from, people_grid};

/// A worksheet fixture: sheet name plus its rows, header row first
pub type SheetFixture<'a> = (&'a str, &'a [&'a [&'a str]]);

/// Write an xlsx workbook with one worksheet per fixture.
///
/// Cells that parse as numbers are written as numbers so the loader's
/// display-text conversion is exercised; empty strings are left blank.
#[allow(dead_code)]
pub fn write_workbook(path: &Path, sheets: &[SheetFixture]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (row_index, row) in rows.iter().enumerate() {
            for (column_index, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let (row_num, col_num) = (row_index as u32, column_index as u16);
                match value.parse::<f64>() {
                    Ok(number) => worksheet.write_number(row_num, col_num, number).unwrap(),
                    Err(_) => worksheet.write_string(row_num, col_num, *value).unwrap(),
                };
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Temp directory holding `people.xlsx` with a single `Users` sheet
#[allow(dead_code)]
pub fn people_workbook() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("people.xlsx");
    write_workbook(&path, &[("Users", &PEOPLE_ROWS)]);
    (temp_dir, path)
}

/// Write a `Users` sheet whose Email column holds numbers formatted as `num_format`.
///
/// Each data row is `(name, number)`; Flow is filled with a constant.
#[allow(dead_code)]
pub fn write_formatted_email_workbook(path: &Path, num_format: &str, rows: &[(&str, f64)]) {
    let mut workbook = Workbook::new();
    let format = Format::new().set_num_format(num_format);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Users").unwrap();
    for (column, header) in ["Name", "Email", "Flow"].iter().enumerate() {
        worksheet.write_string(0, column as u16, *header).unwrap();
    }
    for (index, (name, number)) in rows.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, *name).unwrap();
        worksheet
            .write_number_with_format(row, 1, *number, &format)
            .unwrap();
        worksheet.write_string(row, 2, "renewal").unwrap();
    }
    workbook.save(path).unwrap();
}
