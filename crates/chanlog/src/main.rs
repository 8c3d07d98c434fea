use std::{future::Future, process::ExitCode, sync::Arc};

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use chanlog_core::{
    config::Config,
    ingest::{IngestExit, Ingestor},
    snapshot::{LoadStatus, SnapshotPersister},
};
use chanlog_irc::IrcConnection;

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = Config::load();
    let raw_lines = cfg.as_ref().is_ok_and(|c| c.log_raw_lines);
    if let Err(e) = chanlog_core::logging::init("chanlog", raw_lines) {
        eprintln!("failed to initialize logging: {e}");
    }

    let result = match cfg {
        Ok(cfg) => run(Arc::new(cfg)).await,
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(IngestExit::ConnectionLost(reason)) => {
            tracing::error!("finished with connection error: {reason}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            tracing::info!("connection closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: Arc<Config>) -> anyhow::Result<IngestExit> {
    let (store, status) = SnapshotPersister::new(cfg.snapshot_file.clone()).load();
    match status {
        LoadStatus::Restored { users } => {
            tracing::info!("restored {users} users from {}", cfg.snapshot_file.display())
        }
        LoadStatus::Missing => tracing::info!(
            "snapshot {} doesn't exist, starting empty",
            cfg.snapshot_file.display()
        ),
        LoadStatus::Discarded(e) => {
            tracing::warn!("failed to load snapshot, it will be overwritten: {e}")
        }
    }

    let mut conn = IrcConnection::connect(&cfg.address()).await?;
    conn.register(&cfg)
        .await
        .context("failed to register with server")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone(), terminate_signal()));

    let mut ingestor = Ingestor::new(cfg, store)?;
    Ok(ingestor.run(&mut conn, shutdown).await)
}

/// Resolves on SIGTERM. The handler is installed before this returns.
#[cfg(unix)]
fn terminate_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::{signal, SignalKind};
    let sig = signal(SignalKind::terminate());
    async move {
        match sig {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
fn terminate_signal() -> impl Future<Output = ()> {
    std::future::pending::<()>()
}

/// Cancel `shutdown` on Ctrl+C or `terminate`.
async fn cancel_on_signal(shutdown: CancellationToken, terminate: impl Future<Output = ()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for interrupts: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("interrupt received, shutting down"),
        _ = terminate => tracing::info!("terminate signal received, shutting down"),
    }
    shutdown.cancel();
}
