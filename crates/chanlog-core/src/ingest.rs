//! The sequential ingest loop: connection → framer → dispatcher → store, with
//! periodic snapshots.

use std::{io::ErrorKind, sync::Arc, time::Instant};

use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    dispatch::{Dispatch, Dispatcher, Grammar},
    framer::LineFramer,
    handlers::HandlerContext,
    logging,
    ports::Connection,
    protocol::Outgoing,
    snapshot::{SnapshotPersister, SnapshotTimer},
    store::ActivityStore,
    Result,
};

/// How often the loop checks whether a snapshot is due.
const SNAPSHOT_CHECK_TICK: Duration = Duration::from_secs(1);

/// Why the ingest loop stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestExit {
    Shutdown,
    EndOfStream,
    ConnectionLost(String),
}

pub struct Ingestor {
    cfg: Arc<Config>,
    dispatcher: Dispatcher,
    framer: LineFramer,
    store: ActivityStore,
    persister: SnapshotPersister,
    timer: SnapshotTimer,
}

impl Ingestor {
    pub fn new(cfg: Arc<Config>, store: ActivityStore) -> Result<Self> {
        let dispatcher = Dispatcher::new(Grammar::irc(&cfg.nick)?);
        let persister = SnapshotPersister::new(cfg.snapshot_file.clone());
        let timer = SnapshotTimer::new(cfg.snapshot_interval, Instant::now());
        Ok(Self {
            cfg,
            dispatcher,
            framer: LineFramer::new(),
            store,
            persister,
            timer,
        })
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    /// Frame one chunk and dispatch every completed line with a shared timestamp.
    ///
    /// Returns the replies the handlers asked to send.
    pub fn ingest_chunk(&mut self, chunk: &[u8], now: DateTime<Utc>) -> Vec<Outgoing> {
        let lines = match self.framer.push(chunk) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("{e}");
                return Vec::new();
            }
        };

        let mut ctx = HandlerContext {
            store: &mut self.store,
            server: &self.cfg.server,
            now,
        };
        let mut replies = Vec::new();
        for line in lines {
            if self.cfg.log_raw_lines {
                tracing::trace!(target: logging::RAW_TARGET, ">>> {line}");
            }
            if let Dispatch::Handled {
                reply: Some(reply), ..
            } = self.dispatcher.dispatch(&line, &mut ctx)
            {
                replies.push(reply);
            }
        }
        replies
    }

    /// Save if the interval since the last successful save has elapsed.
    ///
    /// Returns whether a save happened.
    pub fn maybe_snapshot(&mut self, now: Instant) -> bool {
        if !self.timer.is_due(now) {
            return false;
        }
        match self.snapshot() {
            Ok(()) => {
                self.timer.mark_saved(now);
                true
            }
            Err(_) => false,
        }
    }

    /// Unconditional save; failures are logged and returned.
    pub fn snapshot(&self) -> Result<()> {
        tracing::info!(
            users = self.store.len(),
            path = %self.persister.path().display(),
            "saving snapshot"
        );
        self.persister.save(&self.store).inspect_err(|e| {
            tracing::warn!("failed to save snapshot: {e}");
        })
    }

    /// Run until shutdown, end of stream or a hard read error.
    ///
    /// A final snapshot and a `QUIT` are attempted on every exit path; their
    /// failures are only logged.
    pub async fn run(
        &mut self,
        conn: &mut dyn Connection,
        shutdown: CancellationToken,
    ) -> IngestExit {
        tracing::info!(
            every_secs = self.timer.interval().as_secs(),
            "saving snapshots periodically"
        );

        let mut tick = interval(SNAPSHOT_CHECK_TICK);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut buf = vec![0u8; self.cfg.read_buffer_bytes];

        let exit = loop {
            tokio::select! {
              biased;
              _ = shutdown.cancelled() => break IngestExit::Shutdown,
              _ = tick.tick() => {
                self.maybe_snapshot(Instant::now());
              }
              read = conn.recv(&mut buf) => {
                match read {
                  Ok(0) => break IngestExit::EndOfStream,
                  Ok(n) => {
                    for reply in self.ingest_chunk(&buf[..n], Utc::now()) {
                      if let Err(e) = conn.send(&reply).await {
                        tracing::warn!("failed to send {reply}: {e}");
                      }
                    }
                  }
                  // Nothing ready this time; not an error.
                  Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
                  Err(e) => break IngestExit::ConnectionLost(e.to_string()),
                }
              }
            }
        };

        self.finish(conn, &exit).await;
        exit
    }

    async fn finish(&mut self, conn: &mut dyn Connection, exit: &IngestExit) {
        tracing::info!(?exit, "ingest loop stopped");
        let _ = self.snapshot();

        let quit = Outgoing::Quit(self.cfg.quit_message.clone());
        if let Err(e) = conn.send(&quit).await {
            tracing::warn!("failed to send disconnect notice: {e}");
        }
    }
}
