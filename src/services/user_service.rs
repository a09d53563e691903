use crate::database::{new_id, StoreError, Storage};
use crate::models::{
    ApplicationStatus, Capability, CreatorApplication, CreatorApplicationRequest, InsertOutcome,
    ProfileUpdate, RegisterUserRequest, UpdateOutcome, User, UserRole,
};
use crate::utils::{now_millis, AppError, AppResult};

/// Result of `register`: either a fresh insert or the email was already known
#[derive(Debug, Clone)]
pub enum Registration {
    Created(InsertOutcome),
    Existing,
}

#[derive(Clone)]
pub struct UserService {
    storage: Storage,
}

impl UserService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Idempotent by email. Two racing first registrations resolve through the unique
    /// index to one `Created` and one `Existing`.
    pub async fn register(&self, request: RegisterUserRequest) -> AppResult<Registration> {
        let email = request.email.trim().to_string();
        if email.is_empty() {
            return Err(AppError::InvalidRequest("Email is required".to_string()));
        }

        if self.storage.users.find_by_email(&email).await?.is_some() {
            return Ok(Registration::Existing);
        }

        let user = User {
            id: new_id(),
            email,
            role: UserRole::User,
            display_name: request.display_name,
            photo_url: request.photo_url,
            bio: None,
            created_at: now_millis(),
            updated_at: None,
        };

        match self.storage.users.insert(&user).await {
            Ok(()) => {
                log::info!("👤 User registered: {}", user.email);
                Ok(Registration::Created(InsertOutcome::new(user.id)))
            }
            Err(StoreError::Duplicate(_)) => Ok(Registration::Existing),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.storage.users.list().await?)
    }

    /// Unknown emails read as plain users
    pub async fn role_of(&self, email: &str) -> AppResult<UserRole> {
        Ok(self
            .storage
            .users
            .find_by_email(email)
            .await?
            .map(|u| u.role)
            .unwrap_or_default())
    }

    pub async fn has_capability(&self, email: &str, capability: Capability) -> AppResult<bool> {
        Ok(self.role_of(email).await?.grants(capability))
    }

    pub async fn require_admin(&self, email: &str) -> AppResult<()> {
        if self.has_capability(email, Capability::Admin).await? {
            Ok(())
        } else {
            log::warn!("🚫 Admin capability denied for {}", email);
            Err(AppError::Forbidden("forbidden access".to_string()))
        }
    }

    pub async fn set_role(&self, id: &str, role: UserRole) -> AppResult<UpdateOutcome> {
        let outcome = self.storage.users.set_role(id, role).await?;
        if !outcome.matched() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        log::info!("🛡️  User {} role set to {}", id, role);
        Ok(outcome)
    }

    pub async fn profile(&self, email: &str) -> AppResult<User> {
        self.storage
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(&self, email: &str, profile: &ProfileUpdate) -> AppResult<UpdateOutcome> {
        let outcome = self
            .storage
            .users
            .update_profile(email, profile, now_millis())
            .await?;
        if !outcome.matched() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(outcome)
    }

    pub async fn apply_for_creator(
        &self,
        caller: &str,
        request: CreatorApplicationRequest,
    ) -> AppResult<InsertOutcome> {
        let application = CreatorApplication {
            id: new_id(),
            email: caller.to_string(),
            name: request.name,
            photo_url: request.photo_url,
            category: request.category,
            experience: request.experience,
            status: ApplicationStatus::Pending,
            created_at: now_millis(),
        };

        self.storage.creators.insert(&application).await?;
        log::info!("🎨 Creator application {} from {}", application.id, caller);

        Ok(InsertOutcome::new(application.id))
    }

    pub async fn creator_applications(&self, status: Option<ApplicationStatus>) -> AppResult<Vec<CreatorApplication>> {
        Ok(self.storage.creators.list(status).await?)
    }

    /// Admin decision on an application. Approval promotes the applicant unless they
    /// are already above the plain user role.
    pub async fn review_application(&self, id: &str, decision: ApplicationStatus) -> AppResult<UpdateOutcome> {
        let application = self
            .storage
            .creators
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Creator application not found".to_string()))?;

        let next = application.status.review(decision)?;
        let outcome = self
            .storage
            .creators
            .set_status(id, application.status, next)
            .await?;
        if !outcome.matched() {
            return Err(AppError::Conflict(
                "Creator application was reviewed concurrently".to_string(),
            ));
        }

        if next == ApplicationStatus::Approved {
            let promoted = UserRole::User.promoted_to_creator();
            let result = self
                .storage
                .users
                .set_role_by_email_if(&application.email, UserRole::User, promoted)
                .await?;
            if result.matched() {
                log::info!("🎨 {} promoted to {}", application.email, promoted);
            }
        }

        Ok(outcome)
    }
}
