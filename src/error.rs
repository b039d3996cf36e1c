use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

pub const INVALID_INPUT: i32 = 100;
pub const INVALID_CODE: i32 = 101;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_internal(&self) -> bool {
        (1..=99).contains(&self.code)
    }

    pub fn is_invalid_input_error(&self) -> bool {
        self.code == INVALID_INPUT
    }

    pub fn is_invalid_code_error(&self) -> bool {
        self.code == INVALID_CODE
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            1..=99 => StatusCode::INTERNAL_SERVER_ERROR,
            INVALID_CODE => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        serialization_error(err)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        invalid_input_error()
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(%rejection, "rejected query string");
        invalid_input_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self.code {
            1..=99 => "Internal Server Error",
            _ => self.message.as_str(),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: INVALID_INPUT,
        message: "invalid input".into(),
    }
}

/// Deliberately identical for an unknown phone, a wrong code and an expired
/// code.
pub fn invalid_code_error() -> Error {
    Error {
        code: INVALID_CODE,
        message: "invalid code".into(),
    }
}

pub fn env_var_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "environment variable error");
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "database error");
    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::warn!(error = %err, "reqwest error");
    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

pub fn serialization_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "serialization error");
    Error {
        code: 6,
        message: "serialization error".into(),
    }
}

pub fn publish_error() -> Error {
    Error {
        code: 7,
        message: "publish error".into(),
    }
}
