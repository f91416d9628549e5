use axum::{extract::State, response::Html, routing::get, Form, Router};
use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use hypertext::{prelude::*, Raw};

use crate::config;
use crate::service::TaskService;
use crate::task::{CreateTaskRequest, ErrorField, Task, TaskFormData, TaskStatus, ValidationError};
use crate::validator::{first_error_for, validate_task, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};

const SERVICE_NAME: &str = "Task management";

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/create", get(create_task_form).post(create_task))
}

// GET / - Landing page
pub async fn homepage() -> Html<String> {
    let content = maud! {
        h1 .govuk-heading-xl { (SERVICE_NAME) }
        p .govuk-body { "Create tasks and send them to the task service." }
        a .govuk-button href="/task/create" { "Create a new task" }
    }
    .render()
    .into_inner();

    Html(render_layout(SERVICE_NAME, &content))
}

// GET /task/create - Empty creation form
async fn create_task_form() -> Html<String> {
    Html(render_create_page(&TaskFormData::default(), &[]))
}

// POST /task/create - Validate, forward to the backend, confirm
async fn create_task(State(state): State<AppState>, Form(form): Form<TaskFormData>) -> Html<String> {
    let errors = validate_task(&form, config::today());
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "task form failed validation");
        return Html(render_create_page(&form, &errors));
    }

    match form.status.as_deref().map(|s| (s, TaskStatus::from_wire(s))) {
        Some((_, Some(TaskStatus::Pending))) | None => {}
        Some((status, Some(_))) => {
            tracing::debug!(%status, "ignoring posted status, new tasks start as pending");
        }
        Some((status, None)) => tracing::warn!(%status, "unknown status posted"),
    }
    let request = CreateTaskRequest::from_form(&form);

    match state.tasks.create_task(&request).await {
        Ok(task) => Html(render_confirmation_page(&task)),
        Err(e) => {
            tracing::error!(error = %e, status = e.status_code(), "error creating task");
            let errors = vec![ValidationError::new(ErrorField::Form, e.user_message(), "#")];
            Html(render_create_page(&form, &errors))
        }
    }
}

// ============================================================================
// Date Formatting
// ============================================================================

/// Format a backend timestamp the GOV.UK way, e.g. "7 December 2025 at 12pm".
///
/// Empty input gives an empty string and anything unparseable is returned as-is.
pub fn format_govuk_date_time(iso: &str) -> String {
    if iso.is_empty() {
        return String::new();
    }

    let Some(at) = parse_timestamp(iso) else {
        return iso.to_string();
    };

    let time = match (at.hour(), at.minute()) {
        (0, 0) => "midnight".to_string(),
        (12, 0) => "midday".to_string(),
        (hour, minute) => {
            let hour12 = if hour % 12 == 0 { 12 } else { hour % 12 };
            let suffix = if hour < 12 { "am" } else { "pm" };
            if minute == 0 {
                format!("{}{}", hour12, suffix)
            } else {
                format!("{}:{:02}{}", hour12, minute, suffix)
            }
        }
    };

    format!("{} at {}", at.format("%-d %B %Y"), time)
}

/// Local timestamps are taken as written; ones with an offset are shown on the app clock.
fn parse_timestamp(iso: &str) -> Option<NaiveDateTime> {
    if let Ok(at) = DateTime::parse_from_rfc3339(iso) {
        return Some(match config::get_timezone() {
            Some(tz) => at.with_timezone(&tz).naive_local(),
            None => at.with_timezone(&Local).naive_local(),
        });
    }

    NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M"))
        .ok()
}

// ============================================================================
// Rendering Functions
// ============================================================================

fn render_layout(page_title: &str, content: &str) -> String {
    let full_title = format!("{} - {}", page_title, SERVICE_NAME);

    maud! {
        !DOCTYPE
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (full_title) }
                link rel="stylesheet" href="/static/app.css";
            }
            body .govuk-template__body {
                header .govuk-header {
                    div .govuk-width-container {
                        a .govuk-header__link href="/" { (SERVICE_NAME) }
                    }
                }
                div .govuk-width-container {
                    main .govuk-main-wrapper id="main-content" {
                        (Raw::dangerously_create(content))
                    }
                }
            }
        }
    }
    .render()
    .into_inner()
}

fn render_create_page(form: &TaskFormData, errors: &[ValidationError]) -> String {
    let title_value = form.title.as_deref().unwrap_or_default();
    let description_value = form.description.as_deref().unwrap_or_default();

    let title_error = first_error_for(errors, ErrorField::Title);
    let description_error = first_error_for(errors, ErrorField::Description);

    let title_html = render_text_field(
        ErrorField::Title,
        "Task title",
        &format!("Up to {} characters", MAX_TITLE_LENGTH),
        title_value,
        title_error,
        false,
    );
    let description_html = render_text_field(
        ErrorField::Description,
        "Description (optional)",
        &format!("Up to {} characters", MAX_DESCRIPTION_LENGTH),
        description_value,
        description_error,
        true,
    );

    let due_date_html = render_input_group(
        ErrorField::DueDate,
        "Due date",
        "For example, 27 3 2026",
        &[
            InputPart::new("dueDate-day", "Day", &form.due_day, "govuk-input--width-2"),
            InputPart::new("dueDate-month", "Month", &form.due_month, "govuk-input--width-2"),
            InputPart::new("dueDate-year", "Year", &form.due_year, "govuk-input--width-4"),
        ],
        first_error_for(errors, ErrorField::DueDate),
    );
    let due_time_html = render_input_group(
        ErrorField::DueTime,
        "Due time",
        "Use the 24-hour clock, for example, 14 30",
        &[
            InputPart::new("dueTime-hour", "Hour", &form.due_hour, "govuk-input--width-2"),
            InputPart::new("dueTime-minute", "Minute", &form.due_minute, "govuk-input--width-2"),
        ],
        first_error_for(errors, ErrorField::DueTime),
    );

    let lifecycle = format!(
        "Tasks move from {}",
        TaskStatus::ALL.map(|status| status.label()).join(" to ")
    );

    let content = maud! {
        (Raw::dangerously_create(&render_error_summary(errors)))
        h1 .govuk-heading-l { "Create a new task" }
        form method="post" action="/task/create" {
            (Raw::dangerously_create(&title_html))
            (Raw::dangerously_create(&description_html))
            div .govuk-form-group {
                h2 .govuk-heading-s { "Status" }
                p .govuk-body {
                    "New tasks start as "
                    strong class=(status_tag_class(TaskStatus::Pending)) { (TaskStatus::Pending.label()) }
                }
                div .govuk-hint { (lifecycle) }
            }
            (Raw::dangerously_create(&due_date_html))
            (Raw::dangerously_create(&due_time_html))
            button .govuk-button type="submit" { "Create task" }
        }
    }
    .render()
    .into_inner();

    let page_title = if errors.is_empty() {
        "Create a new task".to_string()
    } else {
        "Error: Create a new task".to_string()
    };

    render_layout(&page_title, &content)
}

fn render_error_summary(errors: &[ValidationError]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let items: Vec<String> = errors
        .iter()
        .map(|e| format!(r#"<li><a href="{}">{}</a></li>"#, e.href, e.text))
        .collect();

    format!(
        r#"<div class="govuk-error-summary" data-module="govuk-error-summary">
            <div role="alert">
                <h2 class="govuk-error-summary__title">There is a problem</h2>
                <div class="govuk-error-summary__body">
                    <ul class="govuk-list govuk-error-summary__list">{}</ul>
                </div>
            </div>
        </div>"#,
        items.join("\n")
    )
}

fn form_group_class(has_error: bool) -> &'static str {
    if has_error {
        "govuk-form-group govuk-form-group--error"
    } else {
        "govuk-form-group"
    }
}

fn render_text_field(
    field: ErrorField,
    label: &str,
    hint: &str,
    value: &str,
    error: Option<&str>,
    multiline: bool,
) -> String {
    let id = field.as_str();
    let hint_id = format!("{}-hint", id);
    let error_id = format!("{}-error", id);
    let has_error = error.is_some();
    let message = error.unwrap_or_default();
    let described_by = if has_error {
        format!("{} {}", hint_id, error_id)
    } else {
        hint_id.clone()
    };
    let input_class = match (multiline, has_error) {
        (false, false) => "govuk-input",
        (false, true) => "govuk-input govuk-input--error",
        (true, false) => "govuk-textarea",
        (true, true) => "govuk-textarea govuk-textarea--error",
    };

    maud! {
        div class=(form_group_class(has_error)) {
            label class="govuk-label govuk-label--m" for=(id) { (label) }
            div .govuk-hint id=(hint_id) { (hint) }
            @if has_error {
                p .govuk-error-message id=(error_id) {
                    span .govuk-visually-hidden { "Error: " }
                    (message)
                }
            }
            @if multiline {
                textarea class=(input_class) id=(id) name=(id) rows="5" aria-describedby=(described_by) { (value) }
            } @else {
                input class=(input_class) id=(id) name=(id) type="text" aria-describedby=(described_by) value=(value);
            }
        }
    }
    .render()
    .into_inner()
}

/// One numeric box of a day/month/year or hour/minute group.
struct InputPart<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
    width_class: &'static str,
}

impl<'a> InputPart<'a> {
    fn new(name: &'static str, label: &'static str, value: &'a Option<String>, width_class: &'static str) -> Self {
        Self {
            name,
            label,
            value: value.as_deref().unwrap_or_default(),
            width_class,
        }
    }
}

fn render_input_group(
    field: ErrorField,
    legend: &str,
    hint: &str,
    parts: &[InputPart],
    error: Option<&str>,
) -> String {
    let id = field.as_str();
    let hint_id = format!("{}-hint", id);
    let error_id = format!("{}-error", id);
    let has_error = error.is_some();
    let message = error.unwrap_or_default();
    let described_by = if has_error {
        format!("{} {}", hint_id, error_id)
    } else {
        hint_id.clone()
    };

    let inputs: Vec<String> = parts
        .iter()
        .map(|part| {
            let input_class = if has_error {
                format!("govuk-input govuk-date-input__input {} govuk-input--error", part.width_class)
            } else {
                format!("govuk-input govuk-date-input__input {}", part.width_class)
            };

            maud! {
                div .govuk-date-input__item {
                    div .govuk-form-group {
                        label class="govuk-label govuk-date-input__label" for=(part.name) { (part.label) }
                        input class=(input_class) id=(part.name) name=(part.name) type="text" inputmode="numeric" value=(part.value);
                    }
                }
            }
            .render()
            .into_inner()
        })
        .collect();

    maud! {
        div class=(form_group_class(has_error)) {
            fieldset .govuk-fieldset aria-describedby=(described_by) {
                legend class="govuk-fieldset__legend govuk-fieldset__legend--m" { (legend) }
                div .govuk-hint id=(hint_id) { (hint) }
                @if has_error {
                    p .govuk-error-message id=(error_id) {
                        span .govuk-visually-hidden { "Error: " }
                        (message)
                    }
                }
                div .govuk-date-input id=(id) {
                    (Raw::dangerously_create(&inputs.join("\n")))
                }
            }
        }
    }
    .render()
    .into_inner()
}

fn status_tag_class(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "govuk-tag govuk-tag--grey",
        TaskStatus::InProgress => "govuk-tag govuk-tag--blue",
        TaskStatus::Completed => "govuk-tag govuk-tag--green",
    }
}

fn render_confirmation_page(task: &Task) -> String {
    let description = task
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("Not provided");
    let due = format_govuk_date_time(&task.due_date_time);
    let created = task.created_date.as_deref().map(format_govuk_date_time);
    let has_created = created.is_some();
    let created = created.unwrap_or_default();

    let content = maud! {
        div class="govuk-panel govuk-panel--confirmation" {
            h1 .govuk-panel__title { "Task created" }
            div .govuk-panel__body {
                "Task ID"
                br;
                strong { (task.id) }
            }
        }

        h2 .govuk-heading-m { "Task details" }
        dl .govuk-summary-list {
            div .govuk-summary-list__row {
                dt .govuk-summary-list__key { "Title" }
                dd .govuk-summary-list__value { (task.title) }
            }
            div .govuk-summary-list__row {
                dt .govuk-summary-list__key { "Description" }
                dd .govuk-summary-list__value { (description) }
            }
            div .govuk-summary-list__row {
                dt .govuk-summary-list__key { "Status" }
                dd .govuk-summary-list__value {
                    strong class=(status_tag_class(task.status)) { (task.status.label()) }
                }
            }
            div .govuk-summary-list__row {
                dt .govuk-summary-list__key { "Due" }
                dd .govuk-summary-list__value { (due) }
            }
            @if has_created {
                div .govuk-summary-list__row {
                    dt .govuk-summary-list__key { "Created" }
                    dd .govuk-summary-list__value { (created) }
                }
            }
        }

        p .govuk-body {
            a .govuk-link href="/task/create" { "Create another task" }
        }
    }
    .render()
    .into_inner();

    render_layout("Task created", &content)
}
