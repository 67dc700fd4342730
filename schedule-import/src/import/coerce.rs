//! Coercion of free-form cell values into the task schema
//!
//! Coercers never fail: values that cannot be understood become "no value"
//! (dates) or the field default (status, priority).

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::models::{TaskPriority, TaskStatus};

use super::value::CellValue;

/// Day-first dates: `D[D]/M[M]/YYYY` or `D[D]-M[M]-YYYY`
static DAY_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})").expect("valid date pattern"));

/// Date-only formats tried before the day-first pattern. `%b` also accepts
/// full English month names (`Mar 5, 2024`, `5 March 2024`, `05-Mar-2024`).
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%b %d %Y",
    "%a %b %d %Y",
    "%a, %d %b %Y",
    "%d %b %Y",
    "%d %b, %Y",
    "%d-%b-%Y",
];

/// Date-time formats tried before the day-first pattern (time is discarded)
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const STATUS_SYNONYMS: &[(&str, TaskStatus)] = &[
    ("sin iniciar", TaskStatus::NotStarted),
    ("no iniciado", TaskStatus::NotStarted),
    ("pendiente", TaskStatus::NotStarted),
    ("not started", TaskStatus::NotStarted),
    ("en progreso", TaskStatus::InProgress),
    ("en curso", TaskStatus::InProgress),
    ("activo", TaskStatus::InProgress),
    ("in progress", TaskStatus::InProgress),
    ("en espera", TaskStatus::OnHold),
    ("esperando", TaskStatus::OnHold),
    ("bloqueado", TaskStatus::OnHold),
    ("on hold", TaskStatus::OnHold),
    ("aplazado", TaskStatus::Deferred),
    ("pospuesto", TaskStatus::Deferred),
    ("terminado", TaskStatus::Done),
    ("completado", TaskStatus::Done),
    ("finalizado", TaskStatus::Done),
    ("hecho", TaskStatus::Done),
    ("done", TaskStatus::Done),
    ("completed", TaskStatus::Done),
];

const PRIORITY_SYNONYMS: &[(&str, TaskPriority)] = &[
    ("urgente", TaskPriority::Urgent),
    ("crítica", TaskPriority::Urgent),
    ("critica", TaskPriority::Urgent),
    ("alta", TaskPriority::High),
    ("importante", TaskPriority::High),
    ("media", TaskPriority::Medium),
    ("normal", TaskPriority::Medium),
    ("baja", TaskPriority::Low),
    ("menor", TaskPriority::Low),
];

/// Convert an Excel serial number (1900 date system) to a date-time.
///
/// Serial 1 is 1900-01-01. Serial 60 is the phantom 1900-02-29 that Excel
/// inherited from Lotus 1-2-3 and has no real date, so it yields None.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }

    let days = serial.trunc() as u64;
    let epoch = match days {
        60 => return None,
        d if d < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    let date = epoch.checked_add_days(Days::new(days))?;

    let seconds = (serial.fract() * 86_400.0).round() as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)?;

    Some(date.and_time(time))
}

/// Coerce a cell into a calendar date
pub fn coerce_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Empty => None,
        CellValue::Date(dt) => Some(dt.date()),
        CellValue::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.date()),
        CellValue::Text(s) => parse_date_text(s).or_else(|| parse_serial_text(s)),
    }
}

/// Numeric text (a CSV cell such as `45356`) read as an Excel serial
fn parse_serial_text(text: &str) -> Option<NaiveDate> {
    let serial: f64 = text.trim().parse().ok()?;
    excel_serial_to_datetime(serial).map(|dt| dt.date())
}

/// Parse a free-text date: ISO-style formats first, then day-first
fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        // Keep the calendar date as written, ignoring the offset
        return Some(dt.naive_local().date());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    let caps = DAY_FIRST_DATE.captures(text)?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Coerce a cell into a task status (default: not started)
pub fn coerce_status(cell: &CellValue) -> TaskStatus {
    let key = normalize(cell);
    if key.is_empty() {
        return TaskStatus::default();
    }

    STATUS_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, status)| *status)
        .or_else(|| {
            TaskStatus::ALL
                .into_iter()
                .find(|status| status.wire_value() == key || status.label() == key)
        })
        .unwrap_or_default()
}

/// Coerce a cell into a task priority (default: medium)
pub fn coerce_priority(cell: &CellValue) -> TaskPriority {
    let key = normalize(cell);
    if key.is_empty() {
        return TaskPriority::default();
    }

    PRIORITY_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, priority)| *priority)
        .or_else(|| {
            TaskPriority::ALL
                .into_iter()
                .find(|priority| priority.wire_value() == key || priority.label() == key)
        })
        .unwrap_or_default()
}

fn normalize(cell: &CellValue) -> String {
    cell.to_text().trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(coerce_date(&CellValue::Number(45356.0)), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&CellValue::Number(1.0)), Some(ymd(1900, 1, 1)));
        assert_eq!(coerce_date(&CellValue::Number(59.0)), Some(ymd(1900, 2, 28)));
        assert_eq!(coerce_date(&CellValue::Number(61.0)), Some(ymd(1900, 3, 1)));
        assert_eq!(coerce_date(&CellValue::Number(60.0)), None);
        assert_eq!(coerce_date(&CellValue::Number(0.0)), None);
        assert_eq!(coerce_date(&CellValue::Number(-3.0)), None);
    }

    #[test]
    fn test_serial_time_fraction() {
        let dt = excel_serial_to_datetime(45356.75).unwrap();
        assert_eq!(dt.date(), ymd(2024, 3, 5));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn test_native_date_drops_time() {
        let dt = ymd(2024, 3, 5).and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(coerce_date(&CellValue::Date(dt)), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_text_dates() {
        assert_eq!(coerce_date(&text("05/03/2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("5-3-2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("2024-03-05")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("2024/03/05")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("2024-03-05T10:00:00")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("2024-03-05T23:30:00-05:00")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("vence el 31/12/2024")), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(coerce_date(&text("Mar 5, 2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("March 5, 2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("5 March 2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("05-Mar-2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("Tue Mar 05 2024")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("Marzo 5, 2024")), None);
    }

    #[test]
    fn test_numeric_text_is_a_serial() {
        assert_eq!(coerce_date(&text("45356")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text(" 45356.5 ")), Some(ymd(2024, 3, 5)));
        assert_eq!(coerce_date(&text("60")), None);
        assert_eq!(coerce_date(&text("NaN")), None);
    }

    #[test]
    fn test_unparseable_dates_are_absent() {
        assert_eq!(coerce_date(&CellValue::Empty), None);
        assert_eq!(coerce_date(&text("   ")), None);
        assert_eq!(coerce_date(&text("pronto")), None);
        assert_eq!(coerce_date(&text("31/02/2024")), None);
    }

    #[test]
    fn test_status_synonyms() {
        assert_eq!(coerce_status(&text("  Terminado ")), TaskStatus::Done);
        assert_eq!(coerce_status(&text("EN CURSO")), TaskStatus::InProgress);
        assert_eq!(coerce_status(&text("bloqueado")), TaskStatus::OnHold);
        assert_eq!(coerce_status(&text("Pospuesto")), TaskStatus::Deferred);
        assert_eq!(coerce_status(&text("pendiente")), TaskStatus::NotStarted);
        assert_eq!(coerce_status(&text("en_progreso")), TaskStatus::InProgress);
        assert_eq!(coerce_status(&text("on-hold")), TaskStatus::OnHold);
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(coerce_status(&text("en camino")), TaskStatus::NotStarted);
        assert_eq!(coerce_status(&CellValue::Empty), TaskStatus::NotStarted);
        assert_eq!(coerce_status(&CellValue::Number(3.0)), TaskStatus::NotStarted);
    }

    #[test]
    fn test_priority_synonyms() {
        assert_eq!(coerce_priority(&text("Crítica")), TaskPriority::Urgent);
        assert_eq!(coerce_priority(&text("IMPORTANTE")), TaskPriority::High);
        assert_eq!(coerce_priority(&text("normal")), TaskPriority::Medium);
        assert_eq!(coerce_priority(&text(" menor")), TaskPriority::Low);
        assert_eq!(coerce_priority(&text("high")), TaskPriority::High);
        assert_eq!(coerce_priority(&text("whenever")), TaskPriority::Medium);
        assert_eq!(coerce_priority(&CellValue::Empty), TaskPriority::Medium);
    }
}
