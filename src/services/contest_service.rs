use crate::database::{new_id, Storage};
use crate::models::{
    ApprovalStatus, Contest, ContestEdit, ContestFilter, ContestStatus, CreateContestRequest,
    UpdateOutcome,
};
use crate::utils::{now_millis, AppError, AppResult};

pub const POPULAR_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct ContestService {
    storage: Storage,
}

impl ContestService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// New contests always start pending approval, open, with no participants
    pub async fn create(&self, creator_email: &str, request: CreateContestRequest) -> AppResult<Contest> {
        if request.name.trim().is_empty() {
            return Err(AppError::InvalidRequest("Missing required fields".to_string()));
        }

        let contest = Contest {
            id: new_id(),
            name: request.name,
            image: request.image,
            description: request.description,
            price: request.price,
            prize_money: request.prize_money,
            task_instruction: request.task_instruction,
            contest_type: request.contest_type,
            deadline: request.deadline,
            creator_email: creator_email.to_string(),
            creator_name: request.creator_name,
            approval_status: ApprovalStatus::Pending,
            participants: 0,
            status: ContestStatus::Open,
            winner_name: None,
            winner_email: None,
            winner_image: None,
            created_at: now_millis(),
            updated_at: None,
        };

        self.storage.contests.insert(&contest).await?;
        log::info!("✅ Contest created: {} by {}", contest.id, creator_email);

        Ok(contest)
    }

    pub async fn list(&self, filter: &ContestFilter) -> AppResult<Vec<Contest>> {
        Ok(self.storage.contests.list(filter).await?)
    }

    pub async fn popular(&self) -> AppResult<Vec<Contest>> {
        Ok(self.storage.contests.most_popular(POPULAR_LIMIT).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Contest> {
        self.storage
            .contests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    /// Admin moderation. The write is conditional on the status read here, so a
    /// concurrent decision is reported instead of silently overwritten.
    pub async fn set_approval(&self, id: &str, next: ApprovalStatus) -> AppResult<UpdateOutcome> {
        let contest = self.get(id).await?;
        contest.approval_status.transition_to(next)?;

        let outcome = self
            .storage
            .contests
            .set_approval_status(id, contest.approval_status, next)
            .await?;
        if !outcome.matched() {
            return Err(AppError::Conflict(
                "Contest approval status changed concurrently".to_string(),
            ));
        }

        log::info!("🛡️  Contest {} {} -> {}", id, contest.approval_status, next);
        Ok(outcome)
    }

    /// Creator edit, allowed only on the caller's own pending contest. A zero match is
    /// the rejection signal; there is no separate existence lookup.
    pub async fn edit_pending(&self, id: &str, caller: &str, edit: &ContestEdit) -> AppResult<UpdateOutcome> {
        if let Some(name) = &edit.name {
            if name.trim().is_empty() {
                return Err(AppError::InvalidRequest("Contest name cannot be empty".to_string()));
            }
        }

        let outcome = self
            .storage
            .contests
            .update_pending(id, caller, edit, now_millis())
            .await?;
        if !outcome.matched() {
            return Err(AppError::Forbidden("You cannot edit this contest".to_string()));
        }

        Ok(outcome)
    }

    /// Checks existence, then ownership, then state. The delete itself is filtered on
    /// the same conditions so an approval landing in between still wins.
    pub async fn delete_pending(&self, id: &str, caller: &str) -> AppResult<u64> {
        let contest = self
            .storage
            .contests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        if contest.creator_email != caller {
            return Err(AppError::Forbidden("Forbidden".to_string()));
        }
        if !contest.approval_status.is_editable_by_creator() {
            return Err(AppError::Conflict("Only pending contests can be deleted".to_string()));
        }

        let deleted = self.storage.contests.delete_pending(id, caller).await?;
        if deleted == 0 {
            return Err(AppError::Conflict("Only pending contests can be deleted".to_string()));
        }

        log::info!("🗑️  Contest {} deleted by {}", id, caller);
        Ok(deleted)
    }
}
