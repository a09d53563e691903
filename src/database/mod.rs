pub mod mongo_store;
pub mod repositories;

#[cfg(test)]
pub mod memory;

pub use repositories::*;

use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use crate::models::{Contest, CreatorApplication, Payment, Submission, User};
use crate::utils::AppError;

pub const USERS: &str = "users";
pub const CONTESTS: &str = "contests";
pub const PAYMENTS: &str = "payments";
pub const SUBMISSIONS: &str = "submissions";
pub const CREATORS: &str = "creators";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.app_name = Some("contest-hub".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the lookup indexes and the unique indexes that back the
    /// one-payment-per-transaction and one-submission-per-user guarantees
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let indexes: Vec<(&str, Document, bool)> = vec![
            (USERS, doc! { "email": 1 }, true),
            (CONTESTS, doc! { "creatorEmail": 1 }, false),
            (CONTESTS, doc! { "participants": -1 }, false),
            (PAYMENTS, doc! { "transactionId": 1 }, true),
            (PAYMENTS, doc! { "userEmail": 1 }, false),
            (PAYMENTS, doc! { "contestId": 1, "paymentStatus": 1 }, false),
            (SUBMISSIONS, doc! { "contestId": 1, "userEmail": 1 }, true),
            (SUBMISSIONS, doc! { "userEmail": 1, "status": 1 }, false),
            (CREATORS, doc! { "status": 1 }, false),
        ];

        for (collection, keys, unique) in indexes {
            let description = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(unique).build())
                .build();

            // A unique index that fails to build leaves the duplicate guards as pre-checks only
            match self.collection::<Document>(collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", description),
                Err(e) if unique => log::warn!("   ⚠️  Unique index {} not created: {}", description, e),
                Err(e) => log::debug!("   ℹ️  Index {} skipped: {}", description, e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn users(&self) -> Collection<User> {
        self.collection(USERS)
    }

    pub fn contests(&self) -> Collection<Contest> {
        self.collection(CONTESTS)
    }

    pub fn payments(&self) -> Collection<Payment> {
        self.collection(PAYMENTS)
    }

    pub fn submissions(&self) -> Collection<Submission> {
        self.collection(SUBMISSIONS)
    }

    pub fn creators(&self) -> Collection<CreatorApplication> {
        self.collection(CREATORS)
    }

    pub async fn health_check(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }).await.is_ok()
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();

        let uri = std::env::var("DATABASE_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "contest_hub_test").await;
        assert!(db.is_ok());
        assert!(db.unwrap().health_check().await);
    }
}
