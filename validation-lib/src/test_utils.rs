// Test utilities available to both unit and integration tests
// Only compiled when testing

use crate::grid::Grid;

/// Build an in-memory grid from string slices; the first row is the header row
#[allow(dead_code)]
pub fn grid_from(rows: &[&[&str]]) -> Grid {
    Grid::from_rows(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
}

/// Name, Email, Flow with two data rows: Alice (row 2) and Bob (row 3)
#[allow(dead_code)]
pub fn people_grid() -> Grid {
    grid_from(&PEOPLE_ROWS)
}

/// Rows behind [`people_grid`], reused by workbook fixtures
pub const PEOPLE_ROWS: [&[&str]; 3] = [
    &["Name", "Email", "Flow"],
    &["Alice", "a@x.com", "onboarding"],
    &["Bob", "b@x.com", "offboarding"],
];
