use docqa::config::Config;
use docqa::engine::Engine;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

pub async fn run(config: Config) -> anyhow::Result<()> {
    if let Some(ref dir) = config.data_dir {
        ensure_data_dir(dir)?;
        let abs_path = fs::canonicalize(dir)?;
        tracing::info!(path = %abs_path.display(), "data directory");
    } else {
        tracing::warn!("no DATA_DIR configured; documents are kept in memory only");
    }

    let engine = tokio::task::spawn_blocking(move || Engine::new(config)).await??;
    let config = engine.config().clone();

    let app = docqa::api::router(engine);
    let addr = SocketAddr::new(config.bind_addr, config.port);

    tracing::info!(%addr, "listening");
    tracing::info!(pid = std::process::id(), "process started");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn ensure_data_dir(path: &str) -> anyhow::Result<()> {
    let p = Path::new(path);

    if !p.exists() {
        fs::create_dir_all(p)?;
    } else if !p.is_dir() {
        anyhow::bail!("DATA_DIR exists but is not a directory: {}", p.display());
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sig = signal(SignalKind::terminate()).expect("failed to install signal handler");
        sig.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("received terminate signal, shutting down");
        },
    }
}
