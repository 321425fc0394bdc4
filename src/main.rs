use book_reservations::{
    adapters::memory::InMemoryReservationStore,
    adapters::mock::{BookDirectory as MockBookDirectory, UserDirectory as MockUserDirectory},
    adapters::postgres::PostgresReservationStore,
    api::{handlers::AppState, router::create_router},
    application::reservation::ServiceDependencies,
    config::AppConfig,
    ports::ReservationStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_reservations=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize reservation store
    let reservation_store: Arc<dyn ReservationStore> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Using PostgreSQL reservation store");
            Arc::new(PostgresReservationStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory reservation store");
            Arc::new(InMemoryReservationStore::new())
        }
    };

    // Directory gateways are external; mock adapters stand in for them
    let user_directory = Arc::new(MockUserDirectory::new());
    let book_directory = Arc::new(MockBookDirectory::new());

    // Create service dependencies
    let service_deps = ServiceDependencies {
        reservation_store,
        user_directory,
        book_directory,
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
