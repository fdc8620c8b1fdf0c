use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use quiz_server::{
    api::AppState,
    cli::Cli,
    question::QuestionBank,
    server::{Retention, Server},
    session::SessionStore,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let bank = Arc::new(QuestionBank::load(&cli.questions));
    let store = Arc::new(SessionStore::new(bank));
    let state = AppState::new(store, cli.default_question_count);
    let retention = Retention {
        ttl: cli.session_ttl(),
        sweep_every: cli.sweep_interval(),
    };

    let listener = TcpListener::bind(SocketAddr::new(cli.host, cli.port)).await?;
    let server = Server::new(listener, state, retention).with_static_dir(cli.static_dir.clone());
    let addr = server.local_addr()?;
    info!("quiz server listening on {}", addr);

    if let Err(err) = server.run_until_ctrl_c().await {
        warn!("quiz server exited with error: {err:?}");
        return Err(err);
    }

    Ok(())
}
