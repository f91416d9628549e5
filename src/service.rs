//! Client for the task backend API.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::task::{CreateTaskRequest, Task};

#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    #[error("backend rejected the task data (400)")]
    InvalidData,

    #[error("backend failed with an internal error (500)")]
    ServerError,

    #[error("backend responded with {status}")]
    Rejected { status: StatusCode },

    #[error("could not connect to backend: {0}")]
    Unavailable(#[source] reqwest::Error),

    #[error("request to backend failed: {0}")]
    Network(#[source] reqwest::Error),
}

impl TaskServiceError {
    /// Text shown to the user; the underlying detail only goes to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            TaskServiceError::InvalidData => "Invalid task data. Please check your input.",
            TaskServiceError::ServerError => "The server encountered an error. Please try again later.",
            TaskServiceError::Rejected { .. } => "Failed to create task. Please try again.",
            TaskServiceError::Unavailable(_) => {
                "Unable to connect to the server. Please ensure the backend is running."
            }
            TaskServiceError::Network(_) => "A network error occurred. Please check your connection.",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            TaskServiceError::InvalidData => 400,
            TaskServiceError::Rejected { status } => status.as_u16(),
            TaskServiceError::ServerError
            | TaskServiceError::Unavailable(_)
            | TaskServiceError::Network(_) => 500,
        }
    }

    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => TaskServiceError::InvalidData,
            StatusCode::INTERNAL_SERVER_ERROR => TaskServiceError::ServerError,
            status => TaskServiceError::Rejected { status },
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() {
            TaskServiceError::Unavailable(error)
        } else {
            TaskServiceError::Network(error)
        }
    }
}

#[derive(Clone)]
pub struct TaskService {
    client: Client,
    base_url: String,
}

impl TaskService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a task on the backend. Failures are classified, never retried.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, TaskServiceError> {
        let url = format!("{}/tasks", self.base_url);
        tracing::debug!(%url, title = %request.title, "creating task on backend");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(TaskServiceError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskServiceError::from_status(status));
        }

        let task = response
            .json::<Task>()
            .await
            .map_err(TaskServiceError::Network)?;

        tracing::info!(task_id = task.id, "task created");
        Ok(task)
    }
}
