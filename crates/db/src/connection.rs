use std::time::Duration;

use mongodb::{Client, Database, options::ClientOptions};
use retreats_config::DatabaseSettings;
use tracing::info;

const APP_NAME: &str = "retreats-api";

/// Builds the pooled client and fails fast if the server does not answer a ping.
pub async fn connect(settings: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.url).await?;
    options.app_name = Some(APP_NAME.to_string());
    options.max_pool_size = settings.max_pool_size;
    options.min_pool_size = settings.min_pool_size;
    if options.server_selection_timeout.is_none() {
        options.server_selection_timeout = Some(Duration::from_secs(10));
    }

    let db = Client::with_options(options)?.database(&settings.name);
    db.run_command(bson::doc! { "ping": 1 }).await?;

    info!(db = %settings.name, pool = ?settings.max_pool_size, "MongoDB reachable");
    Ok(db)
}
