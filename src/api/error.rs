use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401. The client clears the stored session as a side effect before
    /// returning this; callers only need to short-circuit their own state.
    #[error("Unauthorized - session expired or token invalid")]
    Unauthorized,

    /// 403. No session state is touched.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No response received at all.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(#[from] reqwest::Error),

    /// 5xx with whatever detail the body carried.
    #[error("Server error ({status}): {detail}")]
    ServerError { status: u16, detail: String },

    /// Any 4xx other than 401/403. Field-level detail is parsed from the
    /// body when the backend supplies it.
    #[error("Validation failed ({status}): {message}")]
    ValidationError {
        status: u16,
        message: String,
        fields: Vec<FieldError>,
    },

    /// 2xx whose body did not parse as the expected type.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape the backend produces for rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error", alias = "detail")]
    message: Option<String>,
    #[serde(default)]
    errors: std::collections::HashMap<String, FieldDetail>,
}

/// Field errors arrive either as a single string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldDetail {
    One(String),
    Many(Vec<String>),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Map a non-success status and its body onto the error taxonomy.
    ///
    /// Mapping only: the session-clearing side effect of a 401 lives in the
    /// client's interception path, not here.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(truncated),
            500..=599 => ApiError::ServerError {
                status: status.as_u16(),
                detail: truncated,
            },
            _ => {
                let (message, fields) = Self::parse_validation_body(body, &truncated);
                ApiError::ValidationError {
                    status: status.as_u16(),
                    message,
                    fields,
                }
            }
        }
    }

    fn parse_validation_body(body: &str, fallback: &str) -> (String, Vec<FieldError>) {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => {
                let mut fields: Vec<FieldError> = parsed
                    .errors
                    .into_iter()
                    .flat_map(|(field, detail)| {
                        let messages = match detail {
                            FieldDetail::One(m) => vec![m],
                            FieldDetail::Many(ms) => ms,
                        };
                        messages.into_iter().map(move |message| FieldError {
                            field: field.clone(),
                            message,
                        })
                    })
                    .collect();
                fields.sort_by(|a, b| a.field.cmp(&b.field));
                let message = parsed.message.unwrap_or_else(|| fallback.to_string());
                (message, fields)
            }
            Err(_) => (fallback.to_string(), Vec::new()),
        }
    }

    /// True if the failure means the stored session is gone.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_taxonomy() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerError { status: 500, .. }
        ));
        // 404 and 422 are both validation-class failures
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "missing"),
            ApiError::ValidationError { status: 404, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad"),
            ApiError::ValidationError { status: 422, .. }
        ));
    }

    #[test]
    fn test_validation_body_with_field_errors() {
        let body = r#"{"message": "Registration failed", "errors": {"email": ["Email already registered"], "dob": "Invalid date"}}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);

        match err {
            ApiError::ValidationError {
                status,
                message,
                fields,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Registration failed");
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "dob");
                assert_eq!(fields[0].message, "Invalid date");
                assert_eq!(fields[1].field, "email");
                assert_eq!(fields[1].message, "Email already registered");
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_falls_back_to_raw_text() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "<html>bad request</html>");
        match err {
            ApiError::ValidationError {
                message, fields, ..
            } => {
                assert_eq!(message, "<html>bad request</html>");
                assert!(fields.is_empty());
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_body_truncation() {
        let long_body = "x".repeat(600);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &long_body);
        match err {
            ApiError::ServerError { detail, .. } => {
                assert!(detail.contains("truncated"));
                assert!(detail.contains("600 total bytes"));
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
    }
}
