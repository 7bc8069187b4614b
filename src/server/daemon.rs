//! HTTP daemon runtime.

use anyhow::{Context, Result};
use chrono::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use super::{AppConfig, admin::argon2_from_config};
use crate::{
    db::{DbPool, apply_migrations, establish_pool, redact_url},
    forum::ForumService,
    http::{AppState, router},
};

/// Build the pool for the configured database and bring its schema up to
/// date.
///
/// # Errors
///
/// Returns any failure reported while building the pool or migrating.
pub async fn setup_database(cfg: &AppConfig) -> Result<DbPool> {
    let shown = redact_url(&cfg.database);
    let pool = establish_pool(&cfg.database, cfg.pool_size)
        .await
        .with_context(|| format!("failed to open database {shown}"))?;
    {
        let mut conn = pool.get().await.context("failed to get db connection")?;
        apply_migrations(&mut conn, &cfg.database)
            .await
            .with_context(|| format!("failed to migrate database {shown}"))?;
    }
    info!(database = %shown, "database ready");
    Ok(pool)
}

/// Serve the forum API until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns any failure reported while validating configuration, preparing
/// the database, binding the socket, or serving.
pub async fn run_daemon(cfg: AppConfig) -> Result<()> {
    let argon2 = argon2_from_config(&cfg)?;
    let pool = setup_database(&cfg).await?;
    let forum = ForumService::new(
        pool,
        argon2,
        Duration::hours(i64::from(cfg.session_ttl_hours)),
    );
    let app = router(AppState {
        forum,
        secure_cookies: cfg.secure_cookies,
    });

    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    info!(bind = %cfg.bind, "forumd listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal, completing when termination is requested.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(err) = res {
                            error!(%err, "failed to listen for Ctrl-C");
                        }
                    },
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(%err, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
    info!("shutdown signal received");
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for Ctrl-C");
    }
}
