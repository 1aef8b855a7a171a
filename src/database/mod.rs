use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("sebastian-admin");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the query paths rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        // Unique keys
        self.create_index("users", doc! { "email": 1 }, true).await;
        self.create_index("plans", doc! { "name": 1 }, true).await;
        self.create_index("mails", doc! { "email": 1 }, true).await;

        // Lookup paths used by the stats and billing aggregations
        self.create_index("emailactivities", doc! { "campaignId": 1 }, false)
            .await;
        self.create_index("emailactivities", doc! { "senderId": 1 }, false)
            .await;
        self.create_index("emailactivities", doc! { "type": 1, "timestamp": 1 }, false)
            .await;
        self.create_index("campaigns", doc! { "userId": 1 }, false).await;
        self.create_index("campaigns", doc! { "status": 1 }, false).await;
        self.create_index("leads", doc! { "listId": 1 }, false).await;
        self.create_index("leads", doc! { "email": 1 }, false).await;
        self.create_index("mails", doc! { "userId": 1 }, false).await;

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    async fn create_index(&self, collection: &str, keys: Document, unique: bool) {
        let fields = keys.keys().cloned().collect::<Vec<_>>().join(", ");
        let options = IndexOptions::builder().unique(unique).build();
        let model = IndexModel::builder().keys(keys).options(options).build();
        match self
            .db
            .collection::<Document>(collection)
            .create_index(model)
            .await
        {
            Ok(_) => log::info!("   ✅ Index created: {}({})", collection, fields),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Needs a running MongoDB on localhost
    async fn test_new_extracts_database_name() {
        let db = MongoDB::new("mongodb://localhost:27017/sebastian-admin-test")
            .await
            .expect("MongoDB connection failed");
        assert_eq!(db.database().name(), "sebastian-admin-test");
    }
}
