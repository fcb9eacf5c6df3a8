use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Response from POST /auth/login. The localStorage-era field names are
/// camelCase on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    /// Date of birth as YYYY-MM-DD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Admin create/update body for a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub quizzes_taken: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub quiz_id: i64,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    pub total_scored: i64,
    pub total_questions: i64,
    #[serde(default)]
    pub time_stamp_of_attempt: Option<String>,
}

/// Generic acknowledgement body for writes and deletes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"token": "abc123", "userId": 42, "isAdmin": true}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("parse login response");
        assert_eq!(resp.token, "abc123");
        assert_eq!(resp.user_id, 42);
        assert!(resp.is_admin);
    }

    #[test]
    fn test_login_response_defaults_admin_flag() {
        let json = r#"{"token": "abc123", "userId": 7}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("parse login response");
        assert!(!resp.is_admin);
    }

    #[test]
    fn test_user_role_helpers() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "email": "admin@example.com", "role": "admin"}"#,
        )
        .expect("parse user");
        assert!(user.is_admin());
        assert_eq!(user.display_name(), "admin@example.com");

        let named: User = serde_json::from_str(
            r#"{"id": 2, "email": "s@example.com", "full_name": "Shreya", "role": "user"}"#,
        )
        .expect("parse user");
        assert!(!named.is_admin());
        assert_eq!(named.display_name(), "Shreya");
    }

    #[test]
    fn test_ack_tolerates_empty_body() {
        let ack: Ack = serde_json::from_str("{}").expect("parse ack");
        assert_eq!(ack.message, None);
    }
}
