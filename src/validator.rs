//! Server-side validation for the task creation form.
//!
//! Errors come back in error-summary order (title, description, date, time),
//! each carrying the anchor of the control that should receive focus.

use chrono::NaiveDate;

use crate::task::{ErrorField, TaskFormData, ValidationError};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

const DAY_ANCHOR: &str = "#dueDate-day";
const MONTH_ANCHOR: &str = "#dueDate-month";
const HOUR_ANCHOR: &str = "#dueTime-hour";
const MINUTE_ANCHOR: &str = "#dueTime-minute";

const NOT_A_REAL_DATE: &str = "Due date must be a real date";

/// Validate a submitted form against `today`. An empty result means the form is valid.
///
/// Lengths are counted in UTF-16 code units, the unit the backend limits on.
/// Date and time parts must be whole integers after trimming: `"12x"` is
/// rejected rather than read as 12 the way a lenient `parseInt` would, so
/// trailing junk can never reach the padded due timestamp.
pub fn validate_task(form: &TaskFormData, today: NaiveDate) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let title = form.title.as_deref().unwrap_or_default();
    if title.trim().is_empty() {
        errors.push(ValidationError::new(ErrorField::Title, "Enter a task title", "#title"));
    } else if text_length(title) > MAX_TITLE_LENGTH {
        errors.push(ValidationError::new(
            ErrorField::Title,
            format!("Task title must be {} characters or fewer", MAX_TITLE_LENGTH),
            "#title",
        ));
    }

    // Optional, only bounded in length
    if let Some(description) = form.description.as_deref() {
        if text_length(description) > MAX_DESCRIPTION_LENGTH {
            errors.push(ValidationError::new(
                ErrorField::Description,
                format!("Description must be {} characters or fewer", MAX_DESCRIPTION_LENGTH),
                "#description",
            ));
        }
    }

    errors.extend(validate_date(form, today));
    errors.extend(validate_time(form));

    errors
}

/// The first rule that applies wins, so at most one error is produced.
fn validate_date(form: &TaskFormData, today: NaiveDate) -> Option<ValidationError> {
    let day = filled(&form.due_day);
    let month = filled(&form.due_month);
    let year = filled(&form.due_year);

    let (Some(day), Some(month), Some(year)) = (day, month, year) else {
        let text = if day.is_none() && month.is_none() && year.is_none() {
            "Enter a due date".to_string()
        } else {
            let missing = missing_parts(&[("day", day), ("month", month), ("year", year)]);
            format!("Due date must include a {}", missing)
        };
        return Some(ValidationError::new(ErrorField::DueDate, text, DAY_ANCHOR));
    };

    let (Ok(day), Ok(month), Ok(year)) = (day.parse::<i32>(), month.parse::<i32>(), year.parse::<i32>()) else {
        return Some(ValidationError::new(ErrorField::DueDate, NOT_A_REAL_DATE, DAY_ANCHOR));
    };

    if !(1..=12).contains(&month) {
        return Some(ValidationError::new(ErrorField::DueDate, NOT_A_REAL_DATE, MONTH_ANCHOR));
    }
    if !(1..=31).contains(&day) {
        return Some(ValidationError::new(ErrorField::DueDate, NOT_A_REAL_DATE, DAY_ANCHOR));
    }

    // Two-digit years would land in the 1900s and never round-trip
    if (0..=99).contains(&year) {
        return Some(ValidationError::new(ErrorField::DueDate, NOT_A_REAL_DATE, DAY_ANCHOR));
    }

    // Only a real calendar date survives construction (31 April, 29 February outside leap years, ...)
    let Some(date) = NaiveDate::from_ymd_opt(year, month as u32, day as u32) else {
        return Some(ValidationError::new(ErrorField::DueDate, NOT_A_REAL_DATE, DAY_ANCHOR));
    };

    if date < today {
        return Some(ValidationError::new(
            ErrorField::DueDate,
            "Due date must be today or in the future",
            DAY_ANCHOR,
        ));
    }

    None
}

/// Unlike the date, the hour and minute range checks are independent and can both fail.
fn validate_time(form: &TaskFormData) -> Vec<ValidationError> {
    let hour = filled(&form.due_hour);
    let minute = filled(&form.due_minute);

    let (Some(hour), Some(minute)) = (hour, minute) else {
        let missing = missing_parts(&[("hour", hour), ("minute", minute)]);
        let text = if hour.is_none() && minute.is_none() {
            "Enter a due time".to_string()
        } else {
            format!("Due time must include {}", missing)
        };
        return vec![ValidationError::new(ErrorField::DueTime, text, HOUR_ANCHOR)];
    };

    let (Ok(hour), Ok(minute)) = (hour.parse::<i32>(), minute.parse::<i32>()) else {
        return vec![ValidationError::new(ErrorField::DueTime, "Due time must be a real time", HOUR_ANCHOR)];
    };

    let mut errors = Vec::new();
    if !(0..=23).contains(&hour) {
        errors.push(ValidationError::new(ErrorField::DueTime, "Hour must be between 0 and 23", HOUR_ANCHOR));
    }
    if !(0..=59).contains(&minute) {
        errors.push(ValidationError::new(ErrorField::DueTime, "Minute must be between 0 and 59", MINUTE_ANCHOR));
    }
    errors
}

/// Build the backend's `YYYY-MM-DDTHH:MM:00` due timestamp.
///
/// Only call this on a form that passed [`validate_task`]; nothing is re-checked here.
pub fn build_date_time_from_form(form: &TaskFormData) -> String {
    format!(
        "{}-{:0>2}-{:0>2}T{:0>2}:{:0>2}:00",
        raw(&form.due_year),
        raw(&form.due_month),
        raw(&form.due_day),
        raw(&form.due_hour),
        raw(&form.due_minute),
    )
}

/// Message of the first error recorded against `field`, for inline error text.
pub fn first_error_for(errors: &[ValidationError], field: ErrorField) -> Option<&str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.text.as_str())
}

fn text_length(value: &str) -> usize {
    value.encode_utf16().count()
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn raw(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

/// "day and year" style list of the parts that were left blank, in form order.
fn missing_parts(parts: &[(&str, Option<&str>)]) -> String {
    parts
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" and ")
}
