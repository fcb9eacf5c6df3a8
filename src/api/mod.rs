//! REST API client module for the Quiz Master backend.
//!
//! This module provides the `ApiClient` for authenticated access to the
//! subject/chapter/quiz/question/user resources, plus the session-expiry
//! interception that keeps stored credentials honest.
//!
//! The API uses bearer token authentication obtained through `/auth/login`.
//! The token lives in an injected [`crate::auth::SessionStore`]; the client
//! attaches it to every outbound request and clears it on the first 401.

pub mod client;
pub mod error;

pub use client::{cache_bust, ApiClient, RequestDescriptor, SessionExpiredHook};
pub use error::{ApiError, FieldError};
