//! In-process store mirroring the MongoDB filters and unique indexes, used by tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::repositories::*;
use crate::models::{
    ApplicationStatus, ApprovalStatus, Contest, ContestEdit, ContestFilter, ContestStatus,
    CreatorApplication, Payment, ProfileUpdate, Submission, SubmissionStatus, UpdateOutcome, User,
    UserRole, WinnerInfo,
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    contests: RwLock<Vec<Contest>>,
    payments: RwLock<Vec<Payment>>,
    submissions: RwLock<Vec<Submission>>,
    creators: RwLock<Vec<CreatorApplication>>,
}

const MATCHED: UpdateOutcome = UpdateOutcome {
    matched_count: 1,
    modified_count: 1,
};

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contest(&self, id: &str) -> Option<Contest> {
        self.contests.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn submission(&self, id: &str) -> Option<Submission> {
        self.submissions.read().await.iter().find(|s| s.id == id).cloned()
    }

    pub async fn user(&self, email: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.email == email).cloned()
    }
}

/// Same partial update the MongoDB `$set` performs for a creator edit
fn apply_edit(contest: &mut Contest, edit: &ContestEdit, now: i64) {
    if let Some(name) = &edit.name {
        contest.name = name.clone();
    }
    if let Some(image) = &edit.image {
        contest.image = Some(image.clone());
    }
    if let Some(description) = &edit.description {
        contest.description = Some(description.clone());
    }
    if let Some(price) = edit.price {
        contest.price = price;
    }
    if let Some(prize_money) = edit.prize_money {
        contest.prize_money = prize_money;
    }
    if let Some(task_instruction) = &edit.task_instruction {
        contest.task_instruction = Some(task_instruction.clone());
    }
    if let Some(contest_type) = &edit.contest_type {
        contest.contest_type = Some(contest_type.clone());
    }
    if let Some(deadline) = &edit.deadline {
        contest.deadline = Some(deadline.clone());
    }
    contest.updated_at = Some(now);
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.user(email).await)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("users.email {}", user.email)));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn set_role(&self, id: &str, role: UserRole) -> StoreResult<UpdateOutcome> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn set_role_by_email_if(
        &self,
        email: &str,
        expected: UserRole,
        role: UserRole,
    ) -> StoreResult<UpdateOutcome> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.email == email && u.role == expected) {
            Some(user) => {
                user.role = role;
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn update_profile(&self, email: &str, profile: &ProfileUpdate, now: i64) -> StoreResult<UpdateOutcome> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.display_name = profile.display_name.clone();
                user.photo_url = profile.photo_url.clone();
                user.bio = profile.bio.clone();
                user.updated_at = Some(now);
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }
}

#[async_trait]
impl ContestRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contest>> {
        Ok(self.contest(id).await)
    }

    async fn find_owned(&self, id: &str, creator_email: &str) -> StoreResult<Option<Contest>> {
        Ok(self
            .contests
            .read()
            .await
            .iter()
            .find(|c| c.id == id && c.creator_email == creator_email)
            .cloned())
    }

    async fn list(&self, filter: &ContestFilter) -> StoreResult<Vec<Contest>> {
        let mut contests: Vec<Contest> = self
            .contests
            .read()
            .await
            .iter()
            .filter(|c| filter.email.as_ref().map_or(true, |e| &c.creator_email == e))
            .filter(|c| filter.status.map_or(true, |s| c.approval_status == s))
            .cloned()
            .collect();
        contests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contests)
    }

    async fn most_popular(&self, limit: i64) -> StoreResult<Vec<Contest>> {
        let mut contests = self.contests.read().await.clone();
        contests.sort_by(|a, b| b.participants.cmp(&a.participants));
        contests.truncate(limit.max(0) as usize);
        Ok(contests)
    }

    async fn insert(&self, contest: &Contest) -> StoreResult<()> {
        self.contests.write().await.push(contest.clone());
        Ok(())
    }

    async fn set_approval_status(
        &self,
        id: &str,
        expected: ApprovalStatus,
        next: ApprovalStatus,
    ) -> StoreResult<UpdateOutcome> {
        let mut contests = self.contests.write().await;
        match contests.iter_mut().find(|c| c.id == id && c.approval_status == expected) {
            Some(contest) => {
                contest.approval_status = next;
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn update_pending(
        &self,
        id: &str,
        creator_email: &str,
        edit: &ContestEdit,
        now: i64,
    ) -> StoreResult<UpdateOutcome> {
        let mut contests = self.contests.write().await;
        let target = contests.iter_mut().find(|c| {
            c.id == id && c.creator_email == creator_email && c.approval_status == ApprovalStatus::Pending
        });
        match target {
            Some(contest) => {
                apply_edit(contest, edit, now);
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn delete_pending(&self, id: &str, creator_email: &str) -> StoreResult<u64> {
        let mut contests = self.contests.write().await;
        let before = contests.len();
        contests.retain(|c| {
            !(c.id == id && c.creator_email == creator_email && c.approval_status == ApprovalStatus::Pending)
        });
        Ok((before - contests.len()) as u64)
    }

    async fn increment_participants(&self, id: &str) -> StoreResult<UpdateOutcome> {
        let mut contests = self.contests.write().await;
        match contests.iter_mut().find(|c| c.id == id) {
            Some(contest) => {
                contest.participants += 1;
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn set_participants(&self, id: &str, participants: i64) -> StoreResult<UpdateOutcome> {
        let mut contests = self.contests.write().await;
        match contests.iter_mut().find(|c| c.id == id) {
            Some(contest) => {
                let modified = u64::from(contest.participants != participants);
                contest.participants = participants;
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: modified,
                })
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn claim_winner(
        &self,
        id: &str,
        creator_email: &str,
        winner: &WinnerInfo,
        now: i64,
    ) -> StoreResult<UpdateOutcome> {
        let mut contests = self.contests.write().await;
        let target = contests
            .iter_mut()
            .find(|c| c.id == id && c.creator_email == creator_email && c.winner_email.is_none());
        match target {
            Some(contest) => {
                contest.winner_name = Some(winner.name.clone());
                contest.winner_email = Some(winner.email.clone());
                contest.winner_image = Some(winner.image.clone());
                contest.status = ContestStatus::Completed;
                contest.updated_at = Some(now);
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn find_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>> {
        Ok(self
            .payments
            .read()
            .await
            .iter()
            .find(|p| p.transaction_id == transaction_id)
            .cloned())
    }

    async fn insert(&self, payment: &Payment) -> StoreResult<()> {
        let mut payments = self.payments.write().await;
        if payments.iter().any(|p| p.transaction_id == payment.transaction_id) {
            return Err(StoreError::Duplicate(format!(
                "payments.transactionId {}",
                payment.transaction_id
            )));
        }
        payments.push(payment.clone());
        Ok(())
    }

    async fn list(&self, user_email: Option<&str>) -> StoreResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .await
            .iter()
            .filter(|p| user_email.map_or(true, |e| p.user_email == e))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }

    async fn count_paid_for_contest(&self, contest_id: &str) -> StoreResult<u64> {
        Ok(self
            .payments
            .read()
            .await
            .iter()
            .filter(|p| p.contest_id == contest_id && p.payment_status == "paid")
            .count() as u64)
    }
}

#[async_trait]
impl SubmissionRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Submission>> {
        Ok(self.submission(id).await)
    }

    async fn find_by_contest_and_user(&self, contest_id: &str, user_email: &str) -> StoreResult<Option<Submission>> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .find(|s| s.contest_id == contest_id && s.user_email == user_email)
            .cloned())
    }

    async fn insert(&self, submission: &Submission) -> StoreResult<()> {
        let mut submissions = self.submissions.write().await;
        if submissions
            .iter()
            .any(|s| s.contest_id == submission.contest_id && s.user_email == submission.user_email)
        {
            return Err(StoreError::Duplicate(format!(
                "submissions.(contestId, userEmail) ({}, {})",
                submission.contest_id, submission.user_email
            )));
        }
        submissions.push(submission.clone());
        Ok(())
    }

    async fn list_for_contest(&self, contest_id: &str) -> StoreResult<Vec<Submission>> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| s.contest_id == contest_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn list_by_user_and_status(&self, user_email: &str, status: SubmissionStatus) -> StoreResult<Vec<Submission>> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| s.user_email == user_email && s.status == status)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn mark_winner(&self, id: &str) -> StoreResult<UpdateOutcome> {
        let mut submissions = self.submissions.write().await;
        match submissions
            .iter_mut()
            .find(|s| s.id == id && s.status == SubmissionStatus::Pending)
        {
            Some(submission) => {
                submission.status = SubmissionStatus::Winner;
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }
}

#[async_trait]
impl CreatorRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<CreatorApplication>> {
        Ok(self.creators.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn list(&self, status: Option<ApplicationStatus>) -> StoreResult<Vec<CreatorApplication>> {
        Ok(self
            .creators
            .read()
            .await
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect())
    }

    async fn insert(&self, application: &CreatorApplication) -> StoreResult<()> {
        self.creators.write().await.push(application.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        id: &str,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> StoreResult<UpdateOutcome> {
        let mut creators = self.creators.write().await;
        match creators.iter_mut().find(|a| a.id == id && a.status == expected) {
            Some(application) => {
                application.status = next;
                Ok(MATCHED)
            }
            None => Ok(UpdateOutcome::default()),
        }
    }
}

/// Wraps a [`MemoryStore`] so the first existence lookup misses, as if another
/// request inserted the same record between the check and the write. Only the
/// unique index then stands between the caller and a duplicate.
pub struct LateWriterStore {
    inner: Arc<MemoryStore>,
    missed: AtomicBool,
}

impl LateWriterStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            missed: AtomicBool::new(false),
        }
    }

    fn miss_once(&self) -> bool {
        !self.missed.swap(true, Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentRepository for LateWriterStore {
    async fn find_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>> {
        if self.miss_once() {
            return Ok(None);
        }
        PaymentRepository::find_by_transaction(self.inner.as_ref(), transaction_id).await
    }

    async fn insert(&self, payment: &Payment) -> StoreResult<()> {
        PaymentRepository::insert(self.inner.as_ref(), payment).await
    }

    async fn list(&self, user_email: Option<&str>) -> StoreResult<Vec<Payment>> {
        PaymentRepository::list(self.inner.as_ref(), user_email).await
    }

    async fn count_paid_for_contest(&self, contest_id: &str) -> StoreResult<u64> {
        self.inner.count_paid_for_contest(contest_id).await
    }
}

#[async_trait]
impl SubmissionRepository for LateWriterStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Submission>> {
        SubmissionRepository::find_by_id(self.inner.as_ref(), id).await
    }

    async fn find_by_contest_and_user(&self, contest_id: &str, user_email: &str) -> StoreResult<Option<Submission>> {
        if self.miss_once() {
            return Ok(None);
        }
        self.inner.find_by_contest_and_user(contest_id, user_email).await
    }

    async fn insert(&self, submission: &Submission) -> StoreResult<()> {
        SubmissionRepository::insert(self.inner.as_ref(), submission).await
    }

    async fn list_for_contest(&self, contest_id: &str) -> StoreResult<Vec<Submission>> {
        self.inner.list_for_contest(contest_id).await
    }

    async fn list_by_user_and_status(&self, user_email: &str, status: SubmissionStatus) -> StoreResult<Vec<Submission>> {
        self.inner.list_by_user_and_status(user_email, status).await
    }

    async fn mark_winner(&self, id: &str) -> StoreResult<UpdateOutcome> {
        self.inner.mark_winner(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_only_touches_supplied_fields() {
        let mut contest: Contest = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "name": "Logo Design",
            "price": 10.0,
            "creatorEmail": "creator@example.com",
            "createdAt": 1
        }))
        .unwrap();

        let edit = ContestEdit {
            price: Some(15.0),
            ..Default::default()
        };
        apply_edit(&mut contest, &edit, 99);

        assert_eq!(contest.name, "Logo Design");
        assert_eq!(contest.price, 15.0);
        assert_eq!(contest.updated_at, Some(99));
    }
}
