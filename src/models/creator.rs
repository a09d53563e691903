use serde::{Deserialize, Serialize};

use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Applications are reviewed once
    pub fn review(self, decision: ApplicationStatus) -> Result<ApplicationStatus, AppError> {
        match (self, decision) {
            (ApplicationStatus::Pending, ApplicationStatus::Approved)
            | (ApplicationStatus::Pending, ApplicationStatus::Rejected) => Ok(decision),
            (from, to) => Err(AppError::Conflict(format!(
                "Cannot change application status from {} to {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

/// Document in the "creators" collection: a request to be promoted to the creator role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorApplication {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorApplicationRequest {
    pub name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub category: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewApplicationRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatorListQuery {
    pub status: Option<ApplicationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applications_are_reviewed_once() {
        assert_eq!(
            ApplicationStatus::Pending.review(ApplicationStatus::Approved).unwrap(),
            ApplicationStatus::Approved
        );
        assert!(ApplicationStatus::Approved.review(ApplicationStatus::Rejected).is_err());
        assert!(ApplicationStatus::Pending.review(ApplicationStatus::Pending).is_err());
    }
}
