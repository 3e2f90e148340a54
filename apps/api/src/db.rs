use anyhow::{Context, Result};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tracing::info;

use crate::config::IO_TIMEOUT;

/// Connects to MongoDB and verifies the deployment answers a ping.
pub async fn connect(mongo_uri: &str) -> Result<Client> {
    info!("Connecting to MongoDB...");

    let mut options = ClientOptions::parse(mongo_uri)
        .await
        .context("Invalid MONGO_URI")?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.connect_timeout = Some(IO_TIMEOUT);
    options.server_selection_timeout = Some(IO_TIMEOUT);

    let client = Client::with_options(options).context("Failed to build MongoDB client")?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .context("Failed to ping MongoDB")?;

    info!("MongoDB connection established");
    Ok(client)
}
