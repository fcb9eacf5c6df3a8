//! Data models for Quiz Master entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Subject`, `Chapter`: the course catalog hierarchy
//! - `Quiz`, `Question`, `AssignedQuiz`: quiz content and assignment views
//! - `QuizSubmission`, `SubmissionResult`, `Score`: attempt flow
//! - `User`, `UserProfile`, login/register payloads
//! - Dashboard and report types for the admin views

pub mod quiz;
pub mod report;
pub mod subject;
pub mod user;

pub use quiz::{
    AssignedQuiz, Question, QuestionPayload, Quiz, QuizPayload, QuizSubmission, SubmissionResult,
    SubmittedAnswer,
};
pub use report::{
    Assignment, AssignmentPayload, DashboardStats, PerformanceSummary, ReportOptions,
    ReportPreview, ReportRequest, ReportStats, SubjectPerformance,
};
pub use subject::{Chapter, ChapterPayload, Subject, SubjectPayload};
pub use user::{
    Ack, LoginCredentials, LoginResponse, RegisterPayload, Score, User, UserPayload, UserProfile,
};
