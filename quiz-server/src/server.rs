use std::{future::Future, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    api::{self, AppState},
    session::spawn_eviction_sweeper,
};

/// Eviction settings for the background sweeper.
#[derive(Debug, Clone, Copy)]
pub struct Retention {
    pub ttl: Duration,
    pub sweep_every: Duration,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            sweep_every: Duration::from_secs(60 * 60),
        }
    }
}

pub struct Server {
    listener: TcpListener,
    state: AppState,
    retention: Retention,
    static_dir: Option<PathBuf>,
}

impl Server {
    pub fn new(listener: TcpListener, state: AppState, retention: Retention) -> Self {
        Self {
            listener,
            state,
            retention,
            static_dir: None,
        }
    }

    /// Serves the browser client from `dir` for every path the API does not
    /// claim.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Server {
            listener,
            state,
            retention,
            static_dir,
        } = self;

        let app = build_app(state.clone(), static_dir);
        let sweeper = spawn_eviction_sweeper(state.store, retention.sweep_every, retention.ttl);
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        info!("quiz server shutting down");
        sweeper.abort();
        served?;
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn build_app(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut app = api::router(state);
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
