//! HTTP error handling with a builder pattern for dynamic error responses.
//!
//! Every handler failure is an [`Error`] built from an [`ErrorKind`]; the kind
//! maps to a const [`ErrorResponse`] carrying the status code and the
//! client-safe wording. Unauthorized responses answer with a
//! `WWW-Authenticate: Bearer` challenge, naming the unmet scopes when the
//! failure was a permission denial.

use std::borrow::Cow;
use std::fmt;

use axum::Json;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use mira_auth::AuthError;
use serde::Serialize;

/// The error type for HTTP handlers in the server.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
    missing_scopes: Vec<String>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
            missing_scopes: Vec::new(),
        }
    }
}

impl<'a> Error<'a> {
    /// Sets a custom user-facing message for the error.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Attaches context information to the error.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'a, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Records the unmet scopes for the `WWW-Authenticate` challenge.
    #[inline]
    pub fn with_missing_scopes(self, missing_scopes: Vec<String>) -> Self {
        Self {
            missing_scopes,
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the custom message if present.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the context if present.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the unmet scopes recorded for the challenge header.
    #[inline]
    pub fn missing_scopes(&self) -> &[String] {
        &self.missing_scopes
    }

    /// Builds the `WWW-Authenticate` value for this error, if any.
    ///
    /// All 401 responses carry a bare `Bearer` challenge; permission denials
    /// additionally name the unmet scopes, space-separated per RFC 6750.
    fn challenge(&self) -> Option<HeaderValue> {
        if self.kind.status_code() != StatusCode::UNAUTHORIZED {
            return None;
        }
        let value = if self.missing_scopes.is_empty() {
            HeaderValue::from_static("Bearer")
        } else {
            let scopes = self.missing_scopes.join(" ");
            HeaderValue::from_str(&format!("Bearer scope=\"{scopes}\""))
                .unwrap_or_else(|_| HeaderValue::from_static("Bearer"))
        };
        Some(value)
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("name", &response.name)
            .field("status", &response.status)
            .field("message", &self.message)
            .field("context", &self.context)
            .field("missing_scopes", &self.missing_scopes)
            .finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(response.message.as_ref());
        write!(f, "{} ({}): {}", response.name, response.status, message)?;
        if let Some(ref context) = self.context {
            write!(f, " - {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let challenge = self.challenge();

        let mut response = self.kind.response();
        if let Some(message) = self.message {
            response = response.with_message(message);
        }
        if let Some(context) = self.context {
            response = response.with_context(context);
        }

        let mut response = response.into_response();
        if let Some(value) = challenge {
            response.headers_mut().insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<AuthError> for Error<'static> {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => {
                ErrorKind::Unauthorized.with_message("Incorrect username or password")
            }
            AuthError::InactiveUser => ErrorKind::Forbidden.with_message("Inactive user"),
            AuthError::InvalidToken => {
                ErrorKind::Unauthorized.with_message("Could not validate credentials")
            }
            AuthError::InsufficientPermission { missing } => ErrorKind::Unauthorized
                .with_message("Not enough permissions")
                .with_missing_scopes(missing),
            AuthError::DirectoryAnomaly { .. }
            | AuthError::Directory(_)
            | AuthError::Hashing(_)
            | AuthError::Signing(_) => ErrorKind::InternalServerError.into_error(),
        }
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Enumeration of all HTTP error kinds the server produces.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400 Bad Request - Invalid request data.
    BadRequest,
    /// 401 Unauthorized - Missing authentication token.
    MissingAuthToken,
    /// 401 Unauthorized - Malformed authentication token.
    MalformedAuthToken,
    /// 401 Unauthorized - Invalid credentials or insufficient permissions.
    Unauthorized,
    /// 403 Forbidden - Access denied.
    Forbidden,
    /// 404 Not Found - Resource not found.
    NotFound,
    /// 500 Internal Server Error - Unexpected server error.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    /// Creates an [`Error`] with the specified context.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the const response table entry for this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response().name.as_ref())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

/// HTTP error response representation.
///
/// Carries the error name, the client-safe message and the status code; the
/// status is transmitted on the wire, never in the JSON body.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier.
    pub name: Cow<'a, str>,
    /// User-facing error message safe for client display.
    pub message: Cow<'a, str>,
    /// Internal context for debugging (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON).
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "The request could not be processed due to invalid data",
        StatusCode::BAD_REQUEST,
    );
    pub const FORBIDDEN: Self = Self::new(
        "forbidden",
        "You don't have permission to access this resource",
        StatusCode::FORBIDDEN,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const MALFORMED_AUTH_TOKEN: Self = Self::new(
        "malformed_auth_token",
        "The authentication token format is invalid",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_AUTH_TOKEN: Self = Self::new(
        "missing_auth_token",
        "Authentication is required to access this resource",
        StatusCode::UNAUTHORIZED,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        "Invalid or expired authentication credentials",
        StatusCode::UNAUTHORIZED,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            context: None,
            status,
        }
    }

    /// Replaces the client-safe message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches context to the error response.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
