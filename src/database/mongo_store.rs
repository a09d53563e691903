use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, to_document, Bson};
use mongodb::results::UpdateResult;

use super::repositories::*;
use super::MongoDB;
use crate::models::{
    ApplicationStatus, ApprovalStatus, Contest, ContestEdit, ContestFilter, ContestStatus,
    CreatorApplication, Payment, ProfileUpdate, Submission, SubmissionStatus, UpdateOutcome, User,
    UserRole, WinnerInfo,
};

fn outcome(result: UpdateResult) -> UpdateOutcome {
    UpdateOutcome {
        matched_count: result.matched_count,
        modified_count: result.modified_count,
    }
}

fn optional(value: &Option<String>) -> Bson {
    value.as_ref().map(|v| Bson::String(v.clone())).unwrap_or(Bson::Null)
}

#[async_trait]
impl UserRepository for MongoDB {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        self.users().insert_one(user).await?;
        Ok(())
    }

    async fn set_role(&self, id: &str, role: UserRole) -> StoreResult<UpdateOutcome> {
        let result = self
            .users()
            .update_one(doc! { "_id": id }, doc! { "$set": { "role": role.as_str() } })
            .await?;
        Ok(outcome(result))
    }

    async fn set_role_by_email_if(
        &self,
        email: &str,
        expected: UserRole,
        role: UserRole,
    ) -> StoreResult<UpdateOutcome> {
        // Legacy documents without a role count as plain users
        let role_filter = if expected == UserRole::User {
            doc! { "$in": [expected.as_str(), Bson::Null] }
        } else {
            doc! { "$eq": expected.as_str() }
        };
        let result = self
            .users()
            .update_one(
                doc! { "email": email, "role": role_filter },
                doc! { "$set": { "role": role.as_str() } },
            )
            .await?;
        Ok(outcome(result))
    }

    async fn update_profile(&self, email: &str, profile: &ProfileUpdate, now: i64) -> StoreResult<UpdateOutcome> {
        let update = doc! {
            "$set": {
                "displayName": optional(&profile.display_name),
                "photoURL": optional(&profile.photo_url),
                "bio": optional(&profile.bio),
                "updatedAt": now,
            }
        };
        let result = self.users().update_one(doc! { "email": email }, update).await?;
        Ok(outcome(result))
    }
}

#[async_trait]
impl ContestRepository for MongoDB {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contest>> {
        Ok(self.contests().find_one(doc! { "_id": id }).await?)
    }

    async fn find_owned(&self, id: &str, creator_email: &str) -> StoreResult<Option<Contest>> {
        Ok(self
            .contests()
            .find_one(doc! { "_id": id, "creatorEmail": creator_email })
            .await?)
    }

    async fn list(&self, filter: &ContestFilter) -> StoreResult<Vec<Contest>> {
        let mut query = doc! {};
        if let Some(email) = &filter.email {
            query.insert("creatorEmail", email.as_str());
        }
        if let Some(status) = filter.status {
            query.insert("approvalStatus", status.as_str());
        }

        let cursor = self.contests().find(query).sort(doc! { "createdAt": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn most_popular(&self, limit: i64) -> StoreResult<Vec<Contest>> {
        let cursor = self
            .contests()
            .find(doc! {})
            .sort(doc! { "participants": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, contest: &Contest) -> StoreResult<()> {
        self.contests().insert_one(contest).await?;
        Ok(())
    }

    async fn set_approval_status(
        &self,
        id: &str,
        expected: ApprovalStatus,
        next: ApprovalStatus,
    ) -> StoreResult<UpdateOutcome> {
        let result = self
            .contests()
            .update_one(
                doc! { "_id": id, "approvalStatus": expected.as_str() },
                doc! { "$set": { "approvalStatus": next.as_str() } },
            )
            .await?;
        Ok(outcome(result))
    }

    async fn update_pending(
        &self,
        id: &str,
        creator_email: &str,
        edit: &ContestEdit,
        now: i64,
    ) -> StoreResult<UpdateOutcome> {
        let mut set = to_document(edit)?;
        set.insert("updatedAt", now);

        let result = self
            .contests()
            .update_one(
                doc! {
                    "_id": id,
                    "creatorEmail": creator_email,
                    "approvalStatus": ApprovalStatus::Pending.as_str(),
                },
                doc! { "$set": set },
            )
            .await?;
        Ok(outcome(result))
    }

    async fn delete_pending(&self, id: &str, creator_email: &str) -> StoreResult<u64> {
        let result = self
            .contests()
            .delete_one(doc! {
                "_id": id,
                "creatorEmail": creator_email,
                "approvalStatus": ApprovalStatus::Pending.as_str(),
            })
            .await?;
        Ok(result.deleted_count)
    }

    async fn increment_participants(&self, id: &str) -> StoreResult<UpdateOutcome> {
        let result = self
            .contests()
            .update_one(doc! { "_id": id }, doc! { "$inc": { "participants": 1 } })
            .await?;
        Ok(outcome(result))
    }

    async fn set_participants(&self, id: &str, participants: i64) -> StoreResult<UpdateOutcome> {
        let result = self
            .contests()
            .update_one(doc! { "_id": id }, doc! { "$set": { "participants": participants } })
            .await?;
        Ok(outcome(result))
    }

    async fn claim_winner(
        &self,
        id: &str,
        creator_email: &str,
        winner: &WinnerInfo,
        now: i64,
    ) -> StoreResult<UpdateOutcome> {
        // `null` also matches documents where the field is absent
        let result = self
            .contests()
            .update_one(
                doc! { "_id": id, "creatorEmail": creator_email, "winnerEmail": Bson::Null },
                doc! {
                    "$set": {
                        "winnerName": winner.name.as_str(),
                        "winnerEmail": winner.email.as_str(),
                        "winnerImage": winner.image.as_str(),
                        "status": ContestStatus::Completed.as_str(),
                        "updatedAt": now,
                    }
                },
            )
            .await?;
        Ok(outcome(result))
    }
}

#[async_trait]
impl PaymentRepository for MongoDB {
    async fn find_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>> {
        Ok(self
            .payments()
            .find_one(doc! { "transactionId": transaction_id })
            .await?)
    }

    async fn insert(&self, payment: &Payment) -> StoreResult<()> {
        self.payments().insert_one(payment).await?;
        Ok(())
    }

    async fn list(&self, user_email: Option<&str>) -> StoreResult<Vec<Payment>> {
        let filter = match user_email {
            Some(email) => doc! { "userEmail": email },
            None => doc! {},
        };
        let cursor = self.payments().find(filter).sort(doc! { "paidAt": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_paid_for_contest(&self, contest_id: &str) -> StoreResult<u64> {
        Ok(self
            .payments()
            .count_documents(doc! { "contestId": contest_id, "paymentStatus": "paid" })
            .await?)
    }
}

#[async_trait]
impl SubmissionRepository for MongoDB {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Submission>> {
        Ok(self.submissions().find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_contest_and_user(&self, contest_id: &str, user_email: &str) -> StoreResult<Option<Submission>> {
        Ok(self
            .submissions()
            .find_one(doc! { "contestId": contest_id, "userEmail": user_email })
            .await?)
    }

    async fn insert(&self, submission: &Submission) -> StoreResult<()> {
        self.submissions().insert_one(submission).await?;
        Ok(())
    }

    async fn list_for_contest(&self, contest_id: &str) -> StoreResult<Vec<Submission>> {
        let cursor = self
            .submissions()
            .find(doc! { "contestId": contest_id })
            .sort(doc! { "submittedAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_by_user_and_status(&self, user_email: &str, status: SubmissionStatus) -> StoreResult<Vec<Submission>> {
        let cursor = self
            .submissions()
            .find(doc! { "userEmail": user_email, "status": status.as_str() })
            .sort(doc! { "submittedAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn mark_winner(&self, id: &str) -> StoreResult<UpdateOutcome> {
        let result = self
            .submissions()
            .update_one(
                doc! { "_id": id, "status": SubmissionStatus::Pending.as_str() },
                doc! { "$set": { "status": SubmissionStatus::Winner.as_str() } },
            )
            .await?;
        Ok(outcome(result))
    }
}

#[async_trait]
impl CreatorRepository for MongoDB {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<CreatorApplication>> {
        Ok(self.creators().find_one(doc! { "_id": id }).await?)
    }

    async fn list(&self, status: Option<ApplicationStatus>) -> StoreResult<Vec<CreatorApplication>> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        let cursor = self.creators().find(filter).sort(doc! { "createdAt": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, application: &CreatorApplication) -> StoreResult<()> {
        self.creators().insert_one(application).await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: &str,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> StoreResult<UpdateOutcome> {
        let result = self
            .creators()
            .update_one(
                doc! { "_id": id, "status": expected.as_str() },
                doc! { "$set": { "status": next.as_str() } },
            )
            .await?;
        Ok(outcome(result))
    }
}
