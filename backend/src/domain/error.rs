//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the domain only decides the failure category and message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::trace_id::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// The request conflicts with existing state, such as a taken email.
    Conflict,
    /// The request body exceeds the configured ceiling.
    PayloadTooLarge,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
/// - `trace_id`, when present, must be non-empty.
///
/// Constructors capture the [`TraceId`] in scope, so errors raised while a
/// request is being served carry the identifier of that request.
///
/// # Examples
/// ```
/// use filelocker::domain::{Error, ErrorCode};
///
/// let err = Error::unauthorized("invalid token");
/// assert_eq!(err.code(), ErrorCode::Unauthorized);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The trace identifier was blank.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// # Panics
    /// Panics when `message` is blank. Every call site in this crate passes
    /// a literal or formatted message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier of the request that raised this error.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use filelocker::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "email" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Replace the trace identifier.
    ///
    /// # Panics
    /// Panics when `trace_id` is blank; use [`Error::try_with_trace_id`] for
    /// untrusted input.
    pub fn with_trace_id(self, trace_id: impl Into<String>) -> Self {
        match self.try_with_trace_id(trace_id) {
            Ok(value) => value,
            Err(err) => panic!("trace identifiers must satisfy validation: {err}"),
        }
    }

    /// Fallible variant of [`Error::with_trace_id`].
    pub fn try_with_trace_id(
        mut self,
        trace_id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(trace_id);
        Ok(self)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::PayloadTooLarge`].
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            trace_id: value.trace_id,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            trace_id,
            details,
        } = value;

        let mut error = Self::try_new(code, message)?;
        // Deserialised payloads describe another request; never adopt the
        // identifier of the task doing the parsing.
        error.trace_id = None;
        if let Some(id) = trace_id {
            error = error.try_with_trace_id(id)?;
        }
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error construction and serialisation.
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[fixture]
    fn expected_trace_id() -> String {
        TRACE_ID.to_owned()
    }

    #[rstest]
    #[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
    #[case(Error::unauthorized("nope"), ErrorCode::Unauthorized)]
    #[case(Error::conflict("taken"), ErrorCode::Conflict)]
    #[case(Error::payload_too_large("big"), ErrorCode::PayloadTooLarge)]
    #[case(Error::internal("boom"), ErrorCode::InternalError)]
    fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn try_new_rejects_empty_messages() {
        let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
        assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
    }

    #[rstest]
    fn try_with_trace_id_rejects_empty_values() {
        let result = Error::invalid_request("bad").try_with_trace_id("   ");
        assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
    }

    #[rstest]
    fn new_returns_none_when_trace_id_out_of_scope() {
        assert!(Error::internal("boom").trace_id().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
        let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
        let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

        assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
    }

    #[rstest]
    fn serialises_camel_case_and_omits_empty_fields() {
        let value = serde_json::to_value(Error::conflict("email already registered"))
            .expect("serialise error");

        assert_eq!(
            value,
            json!({ "code": "conflict", "message": "email already registered" })
        );
    }

    #[rstest]
    fn deserialisation_rejects_blank_messages() {
        let result: Result<Error, _> =
            serde_json::from_value(json!({ "code": "unauthorized", "message": " " }));
        assert!(result.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn deserialisation_keeps_payload_trace_id(expected_trace_id: String) {
        let ambient: TraceId = "11111111-1111-1111-1111-111111111111"
            .parse()
            .expect("valid UUID");
        let payload = json!({
            "code": "payload_too_large",
            "message": "too big",
            "traceId": expected_trace_id,
        });
        let error: Error = TraceId::scope(ambient, async move {
            serde_json::from_value(payload).expect("deserialise error")
        })
        .await;

        assert_eq!(error.trace_id(), Some(TRACE_ID));
        assert_eq!(error.code(), ErrorCode::PayloadTooLarge);
    }
}
