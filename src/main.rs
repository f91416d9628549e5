mod config;
mod service;
mod task;
mod tasks;
mod validator;

use axum::{routing::get, Router};
use std::fs;
use anyhow::Result;
use axum::routing::get_service;
use clap::Parser;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CliArgs};
use crate::service::TaskService;
use crate::tasks::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = AppConfig::load(&cli)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Some(tz) = &config.timezone {
        config::init_timezone(tz);
    }

    let tasks = TaskService::new(&config.backend_url, config.backend_timeout)?;
    tracing::info!(backend = %config.backend_url, "using task backend");

    fs::create_dir_all(&config.static_dir)?;
    let static_dir = ServeDir::new(&config.static_dir);

    let app = Router::new()
        .route("/", get(tasks::homepage))
        .nest("/task", tasks::router())
        .with_state(AppState { tasks })
        .nest_service("/static", get_service(static_dir))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let bound_addr = listener.local_addr()?;
    tracing::info!(addr = %bound_addr, "task frontend listening");
    axum::serve(listener, app).await?;

    Ok(())
}
