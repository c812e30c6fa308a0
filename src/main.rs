// reset; cargo run -- --excel-path ./data/users.xlsx --sheet-name Users --name Alice --expected-email alice@example.com
// reset; VALIDATE_EXCEL_PATH=./data/users.xlsx VALIDATE_MANDATORY_COLUMNS="Name,Email" cargo run -- --json

use std::path::Path;

use clap::Parser;
use validation_lib::{
    CrossCheckRule, ERRORS_LOG_FILE, ErrorKind, ExcelValidatorBuilder, MandatoryColumns,
    ValidationOutcome, utils::write_error_to_log,
};

#[derive(Parser)]
#[command(name = "excel-validate")]
#[command(about = "Validate the header and rows of an Excel worksheet")]
#[command(version)]
struct Args {
    /// Path to the workbook to validate
    #[arg(long, env = "VALIDATE_EXCEL_PATH")]
    excel_path: String,

    /// Worksheet to validate (if not specified, validates the first worksheet)
    #[arg(long, env = "VALIDATE_SHEET_NAME")]
    sheet_name: Option<String>,

    /// Comma-separated list of columns that must appear in the header row.
    /// Defaults to "Name,Email,Flow".
    #[arg(long, env = "VALIDATE_MANDATORY_COLUMNS")]
    mandatory_columns: Option<String>,

    /// Expected value of the key column. Rows holding it are cross-checked.
    #[arg(long, env = "VALIDATE_NAME")]
    name: Option<String>,

    /// Value the dependent column must hold on cross-checked rows
    #[arg(long, env = "VALIDATE_EXPECTED_EMAIL")]
    expected_email: Option<String>,

    /// Header of the key column used by the cross-check
    #[arg(long, default_value = validation_lib::DEFAULT_KEY_FIELD)]
    key_field: String,

    /// Header of the dependent column used by the cross-check
    #[arg(long, default_value = validation_lib::DEFAULT_DEPENDENT_FIELD)]
    dependent_field: String,

    /// Print the outcome as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let arguments = Args::parse();

    let cross_check =
        CrossCheckRule::from_params(arguments.name.as_deref(), arguments.expected_email.as_deref())
            .map(|rule| rule.with_fields(&arguments.key_field, &arguments.dependent_field));

    let validator = ExcelValidatorBuilder::new(&arguments.excel_path)
        .sheet_name(arguments.sheet_name.as_deref())
        .mandatory_columns(MandatoryColumns::parse(arguments.mandatory_columns.as_deref()))
        .cross_check(cross_check)
        .build();

    let result = validator.validate_excel();
    let failure = result.as_ref().err().map(|e| (e.kind(), e.to_string()));
    let outcome = ValidationOutcome::from(result);

    if arguments.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome {
            ValidationOutcome::Passed(message) => println!("✅ {message}"),
            ValidationOutcome::Failed(message) => eprintln!("❌ {message}"),
        }
    }

    if let Some((kind, message)) = failure {
        let log_path = Path::new(ERRORS_LOG_FILE);
        if record_failure(log_path, kind, &message) && !arguments.json {
            eprintln!("❌ Check {} for details.", ERRORS_LOG_FILE);
        }
    }

    if !outcome.is_passed() {
        std::process::exit(1);
    }

    Ok(())
}

/// Append a failed run to the error log. A log that cannot be written only
/// warns; the outcome has already been reported.
fn record_failure(log_path: &Path, kind: ErrorKind, message: &str) -> bool {
    match write_error_to_log(log_path, &format!("Excel Validation {kind:?}"), message) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %log_path.display(), error = %e, "Failed to write error log");
            false
        }
    }
}
