//! Admin dashboard, assignment, and monthly-report types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: i64,
    #[serde(default)]
    pub total_subjects: i64,
    #[serde(default)]
    pub total_chapters: i64,
    #[serde(default)]
    pub total_quizzes: i64,
    #[serde(default)]
    pub total_questions: i64,
    #[serde(default)]
    pub total_attempts: i64,
}

/// Per-subject slice of a user's performance summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectPerformance {
    pub subject_name: String,
    #[serde(default)]
    pub attempts: i64,
    #[serde(default)]
    pub average_percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSummary {
    #[serde(default)]
    pub total_attempts: i64,
    #[serde(default)]
    pub average_percentage: f64,
    #[serde(default)]
    pub best_percentage: f64,
    #[serde(default)]
    pub subjects: Vec<SubjectPerformance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub quiz_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<String>,
}

/// Assign a quiz to one or more users.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentPayload {
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportStats {
    #[serde(default)]
    pub reports_sent: i64,
    #[serde(default)]
    pub last_sent: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub month: u32,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportPreview {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub recipient_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_stats_default_on_missing_fields() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"total_users": 12, "total_quizzes": 4}"#)
                .expect("parse stats");
        assert_eq!(stats.total_users, 12);
        assert_eq!(stats.total_quizzes, 4);
        assert_eq!(stats.total_questions, 0);
    }

    #[test]
    fn test_parse_performance_summary() {
        let json = r#"{"total_attempts": 6, "average_percentage": 72.5, "best_percentage": 95.0, "subjects": [{"subject_name": "Physics", "attempts": 2, "average_percentage": 80.0}]}"#;
        let summary: PerformanceSummary = serde_json::from_str(json).expect("parse summary");
        assert_eq!(summary.total_attempts, 6);
        assert_eq!(summary.subjects.len(), 1);
        assert_eq!(summary.subjects[0].subject_name, "Physics");
    }
}
