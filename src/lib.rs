//! Quiz Master core - client library for the Quiz Master REST backend.
//!
//! This crate provides the pieces a front-end (TUI, GUI, or web shell) needs
//! to talk to a Quiz Master server:
//!
//! - `api`: the authenticated HTTP client with bearer-token attachment and
//!   session-expiry interception
//! - `auth`: session state storage and the login/logout state machine
//! - `models`: typed request/response payloads for subjects, chapters,
//!   quizzes, questions, users, and scores
//! - `jobs`: async export job submission and status polling
//! - `config`: persisted client configuration (base URL, last login)
//!
//! The API uses bearer token authentication obtained through `/auth/login`.
//! Tokens are not refreshed; a 401 response clears the stored session and
//! notifies the host through a [`api::SessionExpiredHook`].

pub mod api;
pub mod auth;
pub mod config;
pub mod jobs;
pub mod models;

pub use api::{ApiClient, ApiError, RequestDescriptor};
pub use auth::{FileStore, MemoryStore, SessionData, SessionState, SessionStore};
pub use config::Config;
