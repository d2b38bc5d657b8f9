use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voltcore_ocpp::application::{
    CommandSender, SessionTracker, StartupConfigurator, StationDirectory,
};
use voltcore_ocpp::config::AppConfig;
use voltcore_ocpp::infrastructure::{
    init_database, Migrator, SeaOrmSessionRepository, SeaOrmStationRepository,
};
use voltcore_ocpp::interfaces::http::{build_router, AppState};
use voltcore_ocpp::interfaces::ws::{ConnectionRegistry, OcppServer};
use voltcore_ocpp::support::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting voltcore-ocpp");

    let db = init_database(&config.database).await?;
    Migrator::up(&db, None).await?;

    let stations = Arc::new(StationDirectory::new(Arc::new(
        SeaOrmStationRepository::new(db.clone()),
    )));
    let sessions = Arc::new(
        SessionTracker::with_seeded_counter(Arc::new(SeaOrmSessionRepository::new(db))).await?,
    );

    let registry = ConnectionRegistry::shared();
    let commands = Arc::new(CommandSender::with_timeout(
        registry.clone(),
        Duration::from_secs(config.ocpp.command_timeout_secs),
    ));

    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_os_signals();

    StartupConfigurator::new(
        commands.clone(),
        shutdown.clone(),
        config.bootstrap.station_ids.clone(),
        Duration::from_secs(config.bootstrap.grace_secs),
        Duration::from_secs(config.bootstrap.retry_secs),
        config.ocpp.sampled_measurands.clone(),
        config.ocpp.meter_sample_interval_secs,
    )
    .spawn();

    let ws_server = OcppServer::new(
        config.clone(),
        registry,
        stations.clone(),
        sessions.clone(),
        commands.clone(),
        shutdown.clone(),
    );
    let ws_task = tokio::spawn(async move { ws_server.run().await });

    let state = AppState {
        stations,
        sessions,
        commands,
    };
    let api_addr = config.server.api_address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API listening on http://{}", api_addr);

    let api_shutdown = shutdown.clone();
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { api_shutdown.wait().await })
        .await?;

    shutdown.trigger();
    ws_task.await??;

    info!("Shutdown complete");
    Ok(())
}
