use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    pub chapter_id: i64,
    #[serde(default)]
    pub chapter_name: Option<String>,
    #[serde(default)]
    pub date_of_quiz: Option<String>,
    /// Duration in "HH:MM" as the backend stores it
    #[serde(default)]
    pub time_duration: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub question_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub chapter_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_quiz: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// A quiz as seen from the user side: content plus attempt status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub attempted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_statement: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    /// 1-based index of the right option. Absent in user-facing reads so the
    /// answer never reaches the quiz taker.
    #[serde(default)]
    pub correct_option: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionPayload {
    pub quiz_id: i64,
    pub question_statement: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_option: i32,
}

/// Submission body, camelCase on the wire to match the original front-end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub quiz_id: i64,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub score_id: Option<i64>,
    pub total_scored: i64,
    pub total_questions: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmissionResult {
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            self.total_scored as f64 / self.total_questions as f64 * 100.0
        }
    }
}
