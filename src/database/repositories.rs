use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{
    ApplicationStatus, ApprovalStatus, Contest, ContestEdit, ContestFilter, CreatorApplication,
    Payment, ProfileUpdate, Submission, SubmissionStatus, UpdateOutcome, User, UserRole, WinnerInfo,
};

/// Error surfaced by repository implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for crate::utils::AppError {
    fn from(e: StoreError) -> Self {
        crate::utils::AppError::Database(e.to_string())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        const DUPLICATE_KEY: i32 = 11000;
        match *e.kind {
            ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY => {
                StoreError::Duplicate(we.message.clone())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        StoreError::Backend(format!("Failed to encode document: {}", e))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn insert(&self, user: &User) -> StoreResult<()>;
    async fn set_role(&self, id: &str, role: UserRole) -> StoreResult<UpdateOutcome>;
    /// Sets `role` on the user with `email` only while the current role equals `expected`
    async fn set_role_by_email_if(
        &self,
        email: &str,
        expected: UserRole,
        role: UserRole,
    ) -> StoreResult<UpdateOutcome>;
    async fn update_profile(&self, email: &str, profile: &ProfileUpdate, now: i64) -> StoreResult<UpdateOutcome>;
}

#[async_trait]
pub trait ContestRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contest>>;
    async fn find_owned(&self, id: &str, creator_email: &str) -> StoreResult<Option<Contest>>;
    async fn list(&self, filter: &ContestFilter) -> StoreResult<Vec<Contest>>;
    /// Contests ordered by descending participant count
    async fn most_popular(&self, limit: i64) -> StoreResult<Vec<Contest>>;
    async fn insert(&self, contest: &Contest) -> StoreResult<()>;
    /// Conditional on the approval status still being `expected`
    async fn set_approval_status(
        &self,
        id: &str,
        expected: ApprovalStatus,
        next: ApprovalStatus,
    ) -> StoreResult<UpdateOutcome>;
    /// Matches only (id, creator_email, approvalStatus = pending)
    async fn update_pending(
        &self,
        id: &str,
        creator_email: &str,
        edit: &ContestEdit,
        now: i64,
    ) -> StoreResult<UpdateOutcome>;
    /// Matches only (id, creator_email, approvalStatus = pending); returns deleted count
    async fn delete_pending(&self, id: &str, creator_email: &str) -> StoreResult<u64>;
    async fn increment_participants(&self, id: &str) -> StoreResult<UpdateOutcome>;
    async fn set_participants(&self, id: &str, participants: i64) -> StoreResult<UpdateOutcome>;
    /// Matches only (id, creator_email, winnerEmail unset); also completes the contest
    async fn claim_winner(
        &self,
        id: &str,
        creator_email: &str,
        winner: &WinnerInfo,
        now: i64,
    ) -> StoreResult<UpdateOutcome>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>>;
    /// Fails with [`StoreError::Duplicate`] when the transaction id is already stored
    async fn insert(&self, payment: &Payment) -> StoreResult<()>;
    async fn list(&self, user_email: Option<&str>) -> StoreResult<Vec<Payment>>;
    async fn count_paid_for_contest(&self, contest_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Submission>>;
    async fn find_by_contest_and_user(&self, contest_id: &str, user_email: &str) -> StoreResult<Option<Submission>>;
    /// Fails with [`StoreError::Duplicate`] on a second entry for the same (contest, user)
    async fn insert(&self, submission: &Submission) -> StoreResult<()>;
    /// Newest first
    async fn list_for_contest(&self, contest_id: &str) -> StoreResult<Vec<Submission>>;
    async fn list_by_user_and_status(&self, user_email: &str, status: SubmissionStatus) -> StoreResult<Vec<Submission>>;
    /// Conditional on the submission still being pending
    async fn mark_winner(&self, id: &str) -> StoreResult<UpdateOutcome>;
}

#[async_trait]
pub trait CreatorRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<CreatorApplication>>;
    async fn list(&self, status: Option<ApplicationStatus>) -> StoreResult<Vec<CreatorApplication>>;
    async fn insert(&self, application: &CreatorApplication) -> StoreResult<()>;
    async fn set_status(
        &self,
        id: &str,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> StoreResult<UpdateOutcome>;
}

/// Handles to every collection, built once at startup and shared by the services
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub contests: Arc<dyn ContestRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub creators: Arc<dyn CreatorRepository>,
}

impl Storage {
    /// Uses one backend for all collections
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository
            + ContestRepository
            + PaymentRepository
            + SubmissionRepository
            + CreatorRepository
            + 'static,
    {
        Self {
            users: backend.clone(),
            contests: backend.clone(),
            payments: backend.clone(),
            submissions: backend.clone(),
            creators: backend,
        }
    }
}

/// Fresh document identifier in the same shape MongoDB would generate
pub fn new_id() -> String {
    mongodb::bson::oid::ObjectId::new().to_hex()
}
