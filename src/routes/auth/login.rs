use crate::domain::LoginAttempt;
use crate::utils::{ResponseMessage, error_chain_fmt, internal_error_response};
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError, post, web};

pub const LOGIN_PLACEHOLDER: &str = "Login endpoint - to be implemented";

// Credentials are not checked yet: every request that reaches the handler with
// a readable body is acknowledged with the same placeholder.
#[post("/login")]
#[tracing::instrument(
    name = "Login attempt",
    skip(body),
    fields(email=tracing::field::Empty, password_provided=tracing::field::Empty)
)]
pub async fn post(
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, LoginError> {
    let body = body.map_err(|e| {
        let e = LoginError::UnexpectedError(
            anyhow::anyhow!(e.to_string()).context("Failed to read the login request body."),
        );
        tracing::error!("Login error: {:?}", e);
        e
    })?;

    if let Some(attempt) = LoginAttempt::from_body(&body) {
        let span = tracing::Span::current();
        if let Some(email) = attempt.email() {
            span.record("email", tracing::field::display(&email));
        }
        span.record("password_provided", attempt.has_password());
    }

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .json(ResponseMessage::from(LOGIN_PLACEHOLDER)))
}

#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LoginError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoginError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        internal_error_response(self.status_code())
    }
}
