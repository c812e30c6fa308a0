mod datetime;
mod filesystem;
mod string;

pub use datetime::{excel_duration_to_text, excel_serial_to_text, get_utc_iso_datetime};
pub use filesystem::write_error_to_log;
pub use string::{non_blank, split_column_list};
