use crate::api::metrics;
use crate::database::{new_id, StoreError, Storage};
use crate::models::{Submission, SubmissionStatus, SubmitEntryRequest, WinnerInfo};
use crate::utils::{now_millis, AppError, AppResult};

const ALREADY_SUBMITTED: &str = "You have already submitted this contest";
const WINNER_DECLARED: &str = "Winner already declared for this contest";

fn required(value: Option<String>) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Missing required fields".to_string()))
}

#[derive(Clone)]
pub struct SubmissionService {
    storage: Storage,
}

impl SubmissionService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// One entry per (contest, user). The pre-check gives the friendly answer; the
    /// unique index catches two concurrent first submissions.
    pub async fn submit(&self, caller: &str, request: SubmitEntryRequest) -> AppResult<Submission> {
        let contest_id = required(request.contest_id)?;
        let submission_text = required(request.submission_text)?;

        let user = self
            .storage
            .users
            .find_by_email(caller)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if self
            .storage
            .submissions
            .find_by_contest_and_user(&contest_id, caller)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidRequest(ALREADY_SUBMITTED.to_string()));
        }

        let submission = Submission {
            id: new_id(),
            contest_id,
            contest_name: request.contest_name,
            user_id: user.id,
            user_name: user.display_name,
            user_email: user.email,
            user_image: user.photo_url,
            submission_text,
            submitted_at: now_millis(),
            status: SubmissionStatus::Pending,
        };

        match self.storage.submissions.insert(&submission).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(AppError::InvalidRequest(ALREADY_SUBMITTED.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        log::info!("📝 Submission {} for contest {} by {}", submission.id, submission.contest_id, caller);
        Ok(submission)
    }

    /// Only the contest's creator may read its entries
    pub async fn list_for_contest(&self, contest_id: &str, caller: &str) -> AppResult<Vec<Submission>> {
        self.storage
            .contests
            .find_owned(contest_id, caller)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        Ok(self.storage.submissions.list_for_contest(contest_id).await?)
    }

    /// Claims the contest first (conditional on no winner yet), then flips the
    /// submission. If the second write fails the contest already names the winner and
    /// the error is surfaced as-is.
    pub async fn declare_winner(&self, submission_id: &str, caller: &str) -> AppResult<Submission> {
        let submission = self
            .storage
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        let contest = self
            .storage
            .contests
            .find_owned(&submission.contest_id, caller)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found or unauthorized".to_string()))?;

        if contest.has_winner() {
            return Err(AppError::InvalidRequest(WINNER_DECLARED.to_string()));
        }
        contest
            .status
            .complete()
            .map_err(|_| AppError::InvalidRequest(WINNER_DECLARED.to_string()))?;
        let status = submission.status.mark_winner()?;

        let winner = WinnerInfo {
            name: submission.user_name.clone().unwrap_or_default(),
            email: submission.user_email.clone(),
            image: submission.user_image.clone().unwrap_or_default(),
        };

        let claimed = self
            .storage
            .contests
            .claim_winner(&contest.id, caller, &winner, now_millis())
            .await?;
        if !claimed.matched() {
            return Err(AppError::InvalidRequest(WINNER_DECLARED.to_string()));
        }

        match self.storage.submissions.mark_winner(&submission.id).await {
            Ok(outcome) if outcome.matched() => {}
            Ok(_) => {
                log::error!(
                    "❌ Contest {} claimed for {} but submission {} was no longer pending",
                    contest.id,
                    winner.email,
                    submission.id
                );
                return Err(AppError::Database("Failed to mark submission as winner".to_string()));
            }
            Err(e) => {
                log::error!(
                    "❌ Contest {} claimed for {} but marking submission {} failed: {}",
                    contest.id,
                    winner.email,
                    submission.id,
                    e
                );
                return Err(e.into());
            }
        }

        metrics::increment_winners_declared();
        log::info!("🏆 Winner declared for contest {}: {}", contest.id, winner.email);

        Ok(Submission { status, ..submission })
    }

    pub async fn wins(&self, email: &str) -> AppResult<Vec<Submission>> {
        Ok(self
            .storage
            .submissions
            .list_by_user_and_status(email, SubmissionStatus::Winner)
            .await?)
    }
}
