#![allow(clippy::needless_return)]

mod excel_validator;
mod grid;
pub mod utils;

// Test utilities - only compiled when testing or with test feature
// #[cfg(test)] alone doesn't work for integration tests (they're external crates)
// The feature flag makes it available to integration tests via dev-dependencies
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use excel_validator::{
    ColumnMap, CrossCheckRule, DEFAULT_DEPENDENT_FIELD, DEFAULT_KEY_FIELD,
    DEFAULT_MANDATORY_COLUMNS, ErrorKind, ExcelValidator, ExcelValidatorBuilder,
    MandatoryColumns, PASSED_MESSAGE, ValidationError, ValidationOutcome, validate,
};
pub use grid::Grid;

pub const ERRORS_LOG_FILE: &str = "errors.log";
