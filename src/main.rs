use anyhow::Context;
use cohort_report::db::seed_from_csv;
use cohort_report::{api, config::Config, db::init_db, CustomerStore, ReportService, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;
    let repo = Arc::new(Repository::new(pool));

    if let Some(seed) = &config.seed {
        seed_from_csv(&repo, &seed.customers_csv, &seed.orders_csv)
            .await
            .context("Failed to seed sample data")?;
    }

    let store: Arc<dyn CustomerStore> = repo;
    let report = Arc::new(ReportService::from_config(store, &config));
    let app = api::create_router(api::AppState::new(report));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
