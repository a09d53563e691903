use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::AppError;

/// Admin-controlled gate in front of a contest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Central transition table for admin moderation.
    ///
    /// A contest can be approved or rejected from pending, and an admin may flip an
    /// earlier decision. Nothing ever returns to pending.
    pub fn transition_to(self, next: ApprovalStatus) -> Result<ApprovalStatus, AppError> {
        use ApprovalStatus::*;
        match (self, next) {
            (Pending, Approved) | (Pending, Rejected) | (Approved, Rejected) | (Rejected, Approved) => {
                Ok(next)
            }
            (from, to) => Err(AppError::Conflict(format!(
                "Cannot change approval status from {} to {}",
                from, to
            ))),
        }
    }

    pub fn is_editable_by_creator(&self) -> bool {
        *self == ApprovalStatus::Pending
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    #[default]
    Open,
    Completed,
}

impl ContestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Open => "open",
            ContestStatus::Completed => "completed",
        }
    }

    /// Winner declaration is the only way out of `Open`
    pub fn complete(self) -> Result<ContestStatus, AppError> {
        match self {
            ContestStatus::Open => Ok(ContestStatus::Completed),
            ContestStatus::Completed => Err(AppError::Conflict(
                "Winner already declared for this contest".to_string(),
            )),
        }
    }
}

/// Document in the "contests" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub prize_money: f64,
    #[serde(default)]
    pub task_instruction: Option<String>,
    #[serde(default)]
    pub contest_type: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub creator_email: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub participants: i64,
    #[serde(default)]
    pub status: ContestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_image: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Contest {
    pub fn has_winner(&self) -> bool {
        self.winner_email.is_some()
    }
}

/// Fields written when a winner is declared
#[derive(Debug, Clone)]
pub struct WinnerInfo {
    pub name: String,
    pub email: String,
    pub image: String,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContestRequest {
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub prize_money: f64,
    pub task_instruction: Option<String>,
    pub contest_type: Option<String>,
    pub deadline: Option<String>,
    pub creator_name: Option<String>,
}

/// Content fields a creator may change while the contest is pending
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContestEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_money: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contest_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ApprovalRequest {
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContestFilter {
    /// Creator email
    pub email: Option<String>,
    pub status: Option<ApprovalStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderation_transitions() {
        use ApprovalStatus::*;
        assert_eq!(Pending.transition_to(Approved).unwrap(), Approved);
        assert_eq!(Pending.transition_to(Rejected).unwrap(), Rejected);
        assert_eq!(Approved.transition_to(Rejected).unwrap(), Rejected);
        assert!(Approved.transition_to(Pending).is_err());
        assert!(Rejected.transition_to(Pending).is_err());
        assert!(Approved.transition_to(Approved).is_err());
    }

    #[test]
    fn completed_contest_cannot_complete_again() {
        assert_eq!(ContestStatus::Open.complete().unwrap(), ContestStatus::Completed);
        assert!(ContestStatus::Completed.complete().is_err());
    }

    #[test]
    fn stored_contest_defaults_missing_fields() {
        let contest: Contest = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "name": "Logo Design",
            "price": 10.0,
            "creatorEmail": "creator@example.com",
            "createdAt": 1
        }))
        .unwrap();
        assert_eq!(contest.approval_status, ApprovalStatus::Pending);
        assert_eq!(contest.participants, 0);
        assert!(!contest.has_winner());
    }

    #[test]
    fn edit_serializes_without_absent_fields() {
        let edit = ContestEdit {
            deadline: Some("2026-12-01".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&edit).unwrap();
        assert_eq!(value, serde_json::json!({ "deadline": "2026-12-01" }));
    }
}
