//! Weather Store: persistence for `WeatherRecord`s, keyed by city.
//!
//! `AppState` holds an `Arc<dyn WeatherStore>`. Production uses `MongoWeatherStore`;
//! tests run against the in-memory store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::weather::WeatherRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Stored document is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Exact, case-sensitive match on `city`.
    async fn find_by_city(&self, city: &str) -> Result<Option<WeatherRecord>, StoreError>;

    /// Replaces the record for `record.city`, inserting it if absent.
    async fn upsert(&self, record: &WeatherRecord) -> Result<(), StoreError>;
}

/// On-disk shape. Timestamps are native BSON dates rather than strings.
#[derive(Debug, Serialize, Deserialize)]
struct WeatherDocument {
    city: String,
    description: String,
    temp: f64,
    last_updated: bson::DateTime,
}

impl From<&WeatherRecord> for WeatherDocument {
    fn from(record: &WeatherRecord) -> Self {
        Self {
            city: record.city.clone(),
            description: record.description.clone(),
            temp: record.temp,
            last_updated: bson::DateTime::from_millis(record.last_updated.timestamp_millis()),
        }
    }
}

impl TryFrom<WeatherDocument> for WeatherRecord {
    type Error = StoreError;

    fn try_from(document: WeatherDocument) -> Result<Self, Self::Error> {
        let millis = document.last_updated.timestamp_millis();
        let last_updated = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| StoreError::Corrupt(format!("last_updated out of range: {millis}")))?;

        Ok(WeatherRecord {
            city: document.city,
            description: document.description,
            temp: document.temp,
            last_updated,
        })
    }
}

#[derive(Clone)]
pub struct MongoWeatherStore {
    collection: Collection<WeatherDocument>,
    timeout: Duration,
}

impl MongoWeatherStore {
    pub fn new(database: &mongodb::Database, collection: &str, timeout: Duration) -> Self {
        Self {
            collection: database.collection(collection),
            timeout,
        }
    }

    /// Creates the unique index on `city`, so concurrent first writes for a
    /// new city cannot produce two documents.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "city": 1 })
            .options(
                IndexOptions::builder()
                    .name("city_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        bounded(self.timeout, async {
            self.collection.create_index(index).await
        })
        .await?;

        info!("Unique index on '{}.city' ensured", self.collection.name());
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for MongoWeatherStore {
    async fn find_by_city(&self, city: &str) -> Result<Option<WeatherRecord>, StoreError> {
        let found = bounded(self.timeout, async {
            self.collection.find_one(doc! { "city": city }).await
        })
        .await?;

        found.map(WeatherRecord::try_from).transpose()
    }

    async fn upsert(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        let document = WeatherDocument::from(record);

        bounded(self.timeout, async {
            self.collection
                .replace_one(doc! { "city": document.city.as_str() }, &document)
                .upsert(true)
                .await
        })
        .await?;

        Ok(())
    }
}

async fn bounded<T, F>(timeout: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = mongodb::error::Result<T>>,
{
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| StoreError::Timeout(timeout))?
        .map_err(StoreError::from)
}
