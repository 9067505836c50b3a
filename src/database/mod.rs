pub mod user_repository;
#[cfg(test)]
pub mod memory;

pub use user_repository::*;

use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use std::error::Error;

pub const USERS_COLLECTION: &str = "users";
const DEFAULT_DATABASE: &str = "user-management";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        // Database name comes from the URI path, e.g. mongodb://host/user-management
        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the unique email index that backs email uniqueness. Startup
    /// fails if it cannot be built, e.g. when stored emails already collide.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(USERS_COLLECTION);
        ensure_unique_email_index(&users).await?;

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Check if the connection is healthy
    pub async fn health_check(&self) -> Result<bool, mongodb::error::Error> {
        self.db.list_collection_names().await?;
        Ok(true)
    }
}

async fn ensure_unique_email_index(
    users: &Collection<Document>,
) -> Result<(), mongodb::error::Error> {
    let email_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    match users.create_index(email_index).await {
        Ok(_) => {
            log::info!("   ✅ Index created: {}(email) unique", users.name());
            Ok(())
        }
        Err(e) => {
            log::error!("   ❌ Could not create unique index on {}(email): {}", users.name(), e);
            Err(e)
        }
    }
}
