use color_eyre::eyre::Result;
use dotenv::dotenv;
use shiftflow_api::config::ApiConfig;
use shiftflow_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    // The schema bootstrap is idempotent, so the service converges on a fresh
    // database without a separate migration step.
    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    shiftflow_api::start_server(config, db_pool).await
}
