mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = vacspec_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting vacspec server");
    tracing::debug!(?config, "loaded configuration");

    let sources = vacspec_core::load_sources_or_builtin(&config.sources_path)?;
    tracing::info!(
        path = %config.sources_path.display(),
        manufacturers = sources.manufacturers.len(),
        secondary = sources.secondary.len(),
        "loaded source allow-lists"
    );

    let specs = vacspec_scraper::build_spec_service(&config, sources)?;
    let settings = specs.resolver().settings();
    tracing::info!(
        max_links = settings.max_links,
        snippet_limit = settings.snippet_limit,
        budget_ms = u64::try_from(settings.budget.as_millis()).unwrap_or(u64::MAX),
        "spec resolver ready"
    );
    let state = AppState {
        specs: Arc::new(specs),
        batch_limit: config.batch_limit,
    };
    let app = build_app(state, RateLimitState::per_minute(config.rate_limit_per_minute));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
