use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Largest serial Excel can display as a date (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn get_utc_iso_datetime() -> String {
    let timestamp = chrono::Utc::now().to_rfc3339();
    return timestamp;
}

/// Render an Excel serial date (1900 date system) the way it reads in a cell:
/// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` when the serial carries a time part.
///
/// Returns `None` for serials Excel cannot show as a date (negative, beyond
/// 9999-12-31, not finite).
pub fn excel_serial_to_text(serial: f64) -> Option<String> {
    let datetime = excel_serial_to_chrono(serial)?;
    if datetime.num_seconds_from_midnight() == 0 {
        return Some(datetime.format("%Y-%m-%d").to_string());
    }
    return Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string());
}

/// Render an Excel duration as elapsed `H:MM:SS`; hours are not wrapped at 24.
pub fn excel_duration_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let total_seconds = (serial * SECONDS_PER_DAY).round() as i64;
    let (hours, rest) = (total_seconds / 3600, total_seconds % 3600);
    Some(format!("{hours}:{:02}:{:02}", rest / 60, rest % 60))
}

fn excel_serial_to_chrono(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    // Serial 60 is Excel's phantom 1900-02-29; earlier serials count from 1899-12-31
    let excel_base = if serial < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let days = serial.trunc() as i64;
    let seconds = ((serial - days as f64) * SECONDS_PER_DAY).round() as i64;

    excel_base
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_days(days)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}
