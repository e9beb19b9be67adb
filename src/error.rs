use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Internal error: {:?}", self);
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Error {}</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <div class="container">
        <div class="error-page">
            <h1>Error {}</h1>
            <p>Internal server error</p>
            <a href="/">Return to status page</a>
        </div>
    </div>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}

/// Why a single health poll did not produce a payload.
///
/// None of these are fatal: the poller maps each one onto a non-connected
/// state and keeps its schedule.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The request never produced a response (refused, DNS, timeout, reset).
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend responded with status {0}")]
    Status(u16),

    /// A success status whose body is not a JSON object.
    #[error("Malformed health response: {0}")]
    MalformedBody(String),
}

impl PollError {
    /// Short machine-readable kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Transport(_) => "transport",
            PollError::Status(_) => "status",
            PollError::MalformedBody(_) => "malformed_body",
        }
    }
}
