use liveroom_config::Settings;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

/// Connects to MongoDB and returns both the client (needed to open sessions for
/// multi-document transactions) and the configured database.
pub async fn connect(settings: &Settings) -> Result<(Client, Database), mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&settings.database.url).await?;

    if let Some(max_pool) = settings.database.max_pool_size {
        client_options.max_pool_size = Some(max_pool);
    }
    if let Some(min_pool) = settings.database.min_pool_size {
        client_options.min_pool_size = Some(min_pool);
    }

    let client = Client::with_options(client_options)?;

    // Verify connection
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %settings.database.name, "Connected to MongoDB");

    let db = client.database(&settings.database.name);
    Ok((client, db))
}
