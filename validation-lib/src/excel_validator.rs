use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::grid::Grid;
use crate::utils::{non_blank, split_column_list};

/// Mandatory columns used when the caller supplies none
pub const DEFAULT_MANDATORY_COLUMNS: [&str; 3] = ["Name", "Email", "Flow"];

pub const DEFAULT_KEY_FIELD: &str = "Name";
pub const DEFAULT_DEPENDENT_FIELD: &str = "Email";

pub const PASSED_MESSAGE: &str = "Excel validation passed successfully.";

fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Excel file not found at path: {0}")]
    FileNotFound(String),

    #[error("Specified worksheet not found: '{0}'")]
    SheetNotFound(String),

    #[error("Workbook contains no worksheets")]
    NoWorksheets,

    #[error("Validation failed:\n{}", join_lines(.0))]
    SchemaViolation(Vec<String>),

    #[error("Validation issues:\n{}", join_lines(.0))]
    ContentViolation(Vec<String>),

    #[error("Exception: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Exception: {0}")]
    Csv(#[from] csv::Error),

    #[error("Exception: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure categories reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SourceUnavailable,
    SchemaViolation,
    ContentViolation,
    UnexpectedFailure,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::FileNotFound(_)
            | ValidationError::SheetNotFound(_)
            | ValidationError::NoWorksheets => ErrorKind::SourceUnavailable,
            ValidationError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            ValidationError::ContentViolation(_) => ErrorKind::ContentViolation,
            ValidationError::Workbook(_) | ValidationError::Csv(_) | ValidationError::Io(_) => {
                ErrorKind::UnexpectedFailure
            }
        }
    }
}

/// Final result of one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum ValidationOutcome {
    Passed(String),
    Failed(String),
}

impl ValidationOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ValidationOutcome::Passed(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationOutcome::Passed(message) | ValidationOutcome::Failed(message) => message,
        }
    }
}

impl From<Result<(), ValidationError>> for ValidationOutcome {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => ValidationOutcome::Passed(PASSED_MESSAGE.to_string()),
            Err(e) => ValidationOutcome::Failed(e.to_string()),
        }
    }
}

/// Column name to 1-based column index, built from the header row.
///
/// Names are trimmed and case-sensitive. Empty headers are skipped and the
/// first occurrence of a duplicate header wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn from_header_row(grid: &Grid) -> Self {
        let mut columns = HashMap::new();
        for column in 1..=grid.column_count() {
            let header = grid.cell(1, column).trim();
            if !header.is_empty() && !columns.contains_key(header) {
                columns.insert(header.to_string(), column);
            }
        }
        tracing::debug!(headers = columns.len(), "Indexed header row");
        ColumnMap { columns }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Ordered list of column names that must appear in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatoryColumns(Vec<String>);

impl Default for MandatoryColumns {
    fn default() -> Self {
        MandatoryColumns(
            DEFAULT_MANDATORY_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        )
    }
}

impl MandatoryColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MandatoryColumns(names.into_iter().map(Into::into).collect())
    }

    /// Parse the comma-separated host parameter, falling back to the defaults
    /// when it is absent or empty
    pub fn parse(value: Option<&str>) -> Self {
        match non_blank(value) {
            Some(list) => MandatoryColumns(split_column_list(list)),
            None => MandatoryColumns::default(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// One `Missing mandatory column` entry per absent name, in declaration order
    pub fn check(&self, column_map: &ColumnMap) -> Vec<String> {
        self.0
            .iter()
            .filter(|name| !column_map.contains(name))
            .map(|name| format!("Missing mandatory column: '{name}'"))
            .collect()
    }
}

/// Rows whose key field equals `expected_key` must carry `expected_dependent`
/// in the dependent field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCheckRule {
    pub key_field: String,
    pub dependent_field: String,
    pub expected_key: String,
    pub expected_dependent: String,
}

impl CrossCheckRule {
    /// Rule over the default `Name` / `Email` columns
    pub fn new(expected_key: &str, expected_dependent: &str) -> Self {
        CrossCheckRule {
            key_field: DEFAULT_KEY_FIELD.to_string(),
            dependent_field: DEFAULT_DEPENDENT_FIELD.to_string(),
            expected_key: expected_key.to_string(),
            expected_dependent: expected_dependent.to_string(),
        }
    }

    /// Build the rule from host parameters; inactive unless both values are non-empty
    pub fn from_params(expected_key: Option<&str>, expected_dependent: Option<&str>) -> Option<Self> {
        let expected_key = non_blank(expected_key)?;
        let expected_dependent = non_blank(expected_dependent)?;
        Some(Self::new(expected_key, expected_dependent))
    }

    pub fn with_fields(mut self, key_field: &str, dependent_field: &str) -> Self {
        self.key_field = key_field.to_string();
        self.dependent_field = dependent_field.to_string();
        self
    }

    /// Cross-check columns absent from the header row
    pub fn missing_columns(&self, column_map: &ColumnMap) -> Vec<String> {
        [&self.key_field, &self.dependent_field]
            .into_iter()
            .filter(|name| !column_map.contains(name))
            .map(|name| format!("Missing cross-check column: '{name}'"))
            .collect()
    }

    /// Scan data rows 2..=N and report every row that breaks the rule.
    ///
    /// Both columns must be present in `column_map`; callers check
    /// [`CrossCheckRule::missing_columns`] first.
    pub fn check(&self, grid: &Grid, column_map: &ColumnMap) -> Vec<String> {
        let (Some(key_column), Some(dependent_column)) = (
            column_map.get(&self.key_field),
            column_map.get(&self.dependent_field),
        ) else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        for row in 2..=grid.row_count() {
            let key_value = grid.cell(row, key_column).trim();
            let dependent_value = grid.cell(row, dependent_column).trim();

            if key_value == self.expected_key && dependent_value != self.expected_dependent {
                errors.push(format!(
                    "Row {row}: {} = '{key_value}' but {} = '{dependent_value}' (Expected: '{}')",
                    self.key_field, self.dependent_field, self.expected_dependent
                ));
            }
        }
        tracing::debug!(
            rows = grid.row_count().saturating_sub(1),
            violations = errors.len(),
            "Cross-checked data rows"
        );
        errors
    }
}

pub struct ExcelValidator {
    excel_path: PathBuf,
    sheet_name: Option<String>,
    mandatory_columns: MandatoryColumns,
    cross_check: Option<CrossCheckRule>,
}

pub struct ExcelValidatorBuilder {
    excel_path: PathBuf,
    sheet_name: Option<String>,
    mandatory_columns: MandatoryColumns,
    cross_check: Option<CrossCheckRule>,
}

impl ExcelValidatorBuilder {
    /// Create a new ExcelValidatorBuilder
    ///
    /// # Arguments
    /// * `excel_path` - Path to the workbook
    pub fn new(excel_path: impl AsRef<Path>) -> Self {
        ExcelValidatorBuilder {
            excel_path: excel_path.as_ref().to_path_buf(),
            sheet_name: None,
            mandatory_columns: MandatoryColumns::default(),
            cross_check: None,
        }
    }

    /// Worksheet to validate; `None` or an empty name selects the first one
    pub fn sheet_name(mut self, sheet_name: Option<&str>) -> Self {
        self.sheet_name = non_blank(sheet_name).map(str::to_string);
        self
    }

    pub fn mandatory_columns(mut self, mandatory_columns: MandatoryColumns) -> Self {
        self.mandatory_columns = mandatory_columns;
        self
    }

    pub fn cross_check(mut self, cross_check: Option<CrossCheckRule>) -> Self {
        self.cross_check = cross_check;
        self
    }

    pub fn build(self) -> ExcelValidator {
        ExcelValidator {
            excel_path: self.excel_path,
            sheet_name: self.sheet_name,
            mandatory_columns: self.mandatory_columns,
            cross_check: self.cross_check,
        }
    }
}

impl ExcelValidator {
    //////////////////////////////////////////////////////////////
    ///  Public API
    //////////////////////////////////////////////////////////////

    /// Load the worksheet and run every check against it.
    ///
    /// The grid is dropped before this returns, whatever the result.
    pub fn validate_excel(&self) -> Result<(), ValidationError> {
        let grid = Grid::open(&self.excel_path, self.sheet_name.as_deref())?;
        self.validate_grid(&grid)
    }

    /// Run the header, mandatory-column and row checks against a loaded grid.
    ///
    /// Schema errors stop the run before any row is read.
    pub fn validate_grid(&self, grid: &Grid) -> Result<(), ValidationError> {
        let column_map = ColumnMap::from_header_row(grid);

        let mut errors = self.mandatory_columns.check(&column_map);
        if let Some(rule) = &self.cross_check {
            errors.extend(rule.missing_columns(&column_map));
        }
        if !errors.is_empty() {
            return Err(ValidationError::SchemaViolation(errors));
        }

        if let Some(rule) = &self.cross_check {
            let errors = rule.check(grid, &column_map);
            if !errors.is_empty() {
                return Err(ValidationError::ContentViolation(errors));
            }
        }

        Ok(())
    }

    /// Run the validation and fold every failure into a [`ValidationOutcome`]
    pub fn run(&self) -> ValidationOutcome {
        let result = self.validate_excel();
        match &result {
            Ok(()) => tracing::info!(path = %self.excel_path.display(), "Excel validation passed"),
            Err(e) => tracing::info!(
                path = %self.excel_path.display(),
                kind = ?e.kind(),
                "Excel validation failed"
            ),
        }
        ValidationOutcome::from(result)
    }
}

/// Validate one worksheet of the workbook at `excel_path`.
///
/// Never panics or returns an error: every failure ends up as
/// [`ValidationOutcome::Failed`] with a descriptive message.
pub fn validate(
    excel_path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    mandatory_columns: MandatoryColumns,
    cross_check: Option<CrossCheckRule>,
) -> ValidationOutcome {
    ExcelValidatorBuilder::new(excel_path)
        .sheet_name(sheet_name)
        .mandatory_columns(mandatory_columns)
        .cross_check(cross_check)
        .build()
        .run()
}
