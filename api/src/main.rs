use api::build_app;
use api::state::AppState;
use axum::http::header::CONTENT_TYPE;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use services::scheduler::spawn_maintenance_loop;
use std::{net::SocketAddr, time::Duration};
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::config;

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let db = match db::connect().await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(path = %config::database_path(), error = %err, "Failed to open database");
            std::process::exit(1);
        }
    };
    if let Err(err) = Migrator::up(&db, None).await {
        tracing::error!(error = %err, "Failed to apply migrations");
        std::process::exit(1);
    }

    let app_state = AppState::from_config(db);

    // Background loop shares the request-side trigger, so the two never overlap.
    let loop_seconds = config::maintenance_loop_seconds();
    if loop_seconds > 0 {
        spawn_maintenance_loop(
            app_state.db_clone(),
            app_state.trigger_clone(),
            app_state.clock(),
            Duration::from_secs(loop_seconds),
        );
    } else {
        tracing::info!("Maintenance loop disabled; relying on request-side trigger");
    }

    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_TYPE]);
    let app = build_app(app_state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");

    println!(
        "Starting {} on http://{}:{}",
        config::project_name(),
        config::host(),
        config::port()
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server crashed");
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter =
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("api=info,services=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
