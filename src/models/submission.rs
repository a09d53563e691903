use serde::{Deserialize, Serialize};

use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Winner,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Winner => "winner",
        }
    }

    pub fn mark_winner(self) -> Result<SubmissionStatus, AppError> {
        match self {
            SubmissionStatus::Pending => Ok(SubmissionStatus::Winner),
            SubmissionStatus::Winner => Err(AppError::Conflict(
                "Submission is already a winner".to_string(),
            )),
        }
    }
}

/// Document in the "submissions" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: String,
    pub contest_id: String,
    #[serde(default)]
    pub contest_name: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub user_email: String,
    #[serde(default)]
    pub user_image: Option<String>,
    pub submission_text: String,
    pub submitted_at: i64,
    #[serde(default)]
    pub status: SubmissionStatus,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEntryRequest {
    #[serde(default)]
    pub contest_id: Option<String>,
    #[serde(default)]
    pub contest_name: Option<String>,
    #[serde(default)]
    pub submission_text: Option<String>,
}
