//! HTTP surface of the task board.
//!
//! Every route is a `POST` under `/api/tasks` taking a JSON body. Handlers
//! are generic over the store so the same router serves `PostgreSQL` in
//! production and the in-memory store in tests.

pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::post;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::{Clock, DefaultClock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::task::{
    adapters::postgres::{PostgresTaskStore, ensure_schema},
    ports::TaskStore,
    services::TaskBoardService,
};

pub use error::ApiError;

/// Builds the application router around `service`.
#[must_use]
pub fn router<S, C>(service: TaskBoardService<S, C>) -> Router
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let tasks = Router::new()
        .route("/create", post(handlers::create_task::<S, C>))
        .route("/update", post(handlers::update_task::<S, C>))
        .route("/delete", post(handlers::delete_task::<S, C>))
        .route("/list", post(handlers::list_tasks::<S, C>))
        .route("/get", post(handlers::get_task::<S, C>))
        .route(
            "/reorder-tasks-and-status",
            post(handlers::reorder_task::<S, C>),
        )
        .with_state(Arc::new(service));

    Router::new()
        .nest("/api/tasks", tasks)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Connects to `PostgreSQL`, prepares the schema and serves the API until
/// Ctrl+C is received.
///
/// # Errors
///
/// Returns an error when the pool cannot be built, the schema cannot be
/// applied or the listener cannot bind.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(config.transaction_timeout)
        .build(manager)
        .context("failed to build the database pool")?;

    ensure_schema(&pool)
        .await
        .context("failed to prepare the tasks table")?;

    let store = PostgresTaskStore::new(pool).with_transaction_timeout(config.transaction_timeout);
    let service = TaskBoardService::new(Arc::new(store), Arc::new(DefaultClock))
        .with_page_size(config.page_size);
    let app = router(service);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "task board listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
