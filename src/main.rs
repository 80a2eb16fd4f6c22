use dotenvy::dotenv;
use maintenance_gate::{
    config::{app, database, operators::OperatorDirectory},
    core::lifecycle,
    errors::Result,
    http::{self, AppState},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let config = app::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    let operators = OperatorDirectory::from_env();
    if operators.is_empty() {
        warn!("No operator tokens configured; the admin surface is unreachable");
    } else {
        info!("{} operator token(s) configured", operators.len());
    }

    // 4. Connect and ensure tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Activation: defaults and the default landing page
    let report = lifecycle::activate(&db).await?;
    if report.changed_anything() {
        info!("Activation initialized {:?}", report);
    }

    // 6. Serve
    let bind = config.server.bind.clone();
    let site = http::site_router(&config.server.public_dir);
    let state = AppState::new(db, config, operators)?;
    let app = http::router(state, site);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind, e))?;
    info!("Listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
