use serde::{Deserialize, Serialize};

use crate::validator::build_date_time_from_form;

/// Lifecycle state of a task as the backend knows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Every status in lifecycle order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    /// Wire name, as sent to and received from the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// A task as returned by the backend after creation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date_time: String,
    #[serde(default)]
    pub created_date: Option<String>,
}

/// Raw values posted by the create form. Every field is untrusted and may be missing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskFormData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "dueDate-day")]
    pub due_day: Option<String>,
    #[serde(default, rename = "dueDate-month")]
    pub due_month: Option<String>,
    #[serde(default, rename = "dueDate-year")]
    pub due_year: Option<String>,
    #[serde(default, rename = "dueTime-hour")]
    pub due_hour: Option<String>,
    #[serde(default, rename = "dueTime-minute")]
    pub due_minute: Option<String>,
}

/// Body of `POST /tasks` on the backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date_time: String,
}

impl CreateTaskRequest {
    /// Canonical request for a form that already passed validation.
    /// New tasks always start as pending, whatever status was posted.
    pub fn from_form(form: &TaskFormData) -> Self {
        Self {
            title: form.title.as_deref().unwrap_or_default().trim().to_string(),
            description: form
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            status: TaskStatus::Pending,
            due_date_time: build_date_time_from_form(form),
        }
    }
}

/// Which part of the form an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorField {
    Title,
    Description,
    DueDate,
    DueTime,
    /// Not tied to a control, e.g. a failed backend call.
    Form,
}

impl ErrorField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorField::Title => "title",
            ErrorField::Description => "description",
            ErrorField::DueDate => "dueDate",
            ErrorField::DueTime => "dueTime",
            ErrorField::Form => "form",
        }
    }
}

/// One entry of the error summary. `href` is the anchor of the control to focus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field: ErrorField,
    pub text: String,
    pub href: &'static str,
}

impl ValidationError {
    pub fn new(field: ErrorField, text: impl Into<String>, href: &'static str) -> Self {
        Self {
            field,
            text: text.into(),
            href,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
        let status: TaskStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);
    }

    #[test]
    fn test_status_wire_names_match_serde() {
        for status in TaskStatus::ALL {
            assert_eq!(serde_json::to_value(status).unwrap(), serde_json::json!(status.as_str()));
            assert_eq!(TaskStatus::from_wire(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_wire("pending"), None);
        assert_eq!(TaskStatus::from_wire("DONE"), None);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::Pending.label(), "Pending");
        assert_eq!(TaskStatus::InProgress.label(), "In Progress");
        assert_eq!(TaskStatus::Completed.label(), "Completed");
    }

    #[test]
    fn test_create_request_omits_missing_description() {
        let request = CreateTaskRequest {
            title: "Write report".to_string(),
            description: None,
            status: TaskStatus::Pending,
            due_date_time: "2099-03-05T09:05:00".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Write report",
                "status": "PENDING",
                "dueDateTime": "2099-03-05T09:05:00",
            })
        );
    }

    #[test]
    fn test_create_request_from_form() {
        let form = TaskFormData {
            title: Some("  Write report ".to_string()),
            description: Some("   ".to_string()),
            status: Some("COMPLETED".to_string()),
            due_day: Some("5".to_string()),
            due_month: Some("3".to_string()),
            due_year: Some("2099".to_string()),
            due_hour: Some("9".to_string()),
            due_minute: Some("5".to_string()),
        };

        assert_eq!(
            CreateTaskRequest::from_form(&form),
            CreateTaskRequest {
                title: "Write report".to_string(),
                description: None,
                status: TaskStatus::Pending,
                due_date_time: "2099-03-05T09:05:00".to_string(),
            }
        );
    }

    #[test]
    fn test_task_decodes_backend_record() {
        let task: Task = serde_json::from_str(
            r#"{"id":123,"title":"Test Task","status":"PENDING","dueDateTime":"2025-12-25T14:30:00","createdDate":"2025-01-15T10:00:00"}"#,
        )
        .unwrap();

        assert_eq!(task.id, 123);
        assert_eq!(task.description, None);
        assert_eq!(task.created_date.as_deref(), Some("2025-01-15T10:00:00"));
    }
}
