use std::{io::Write, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use chanlog_core::snapshot::SnapshotPersister;
use chanlog_report::{
    commands::ReportSession,
    web::{self, WebState},
};

/// Browse a chanlog activity snapshot.
#[derive(Parser, Debug)]
#[command(name = "chanlog-report", version)]
struct Args {
    /// Snapshot file written by the `chanlog` ingest process.
    snapshot: PathBuf,

    /// Serve an HTML viewer instead of the interactive prompt.
    #[arg(short, long)]
    web: bool,

    /// Listen address for `--web`.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chanlog_core::logging::init("chanlog-report", false)?;
    let args = Args::parse();
    let persister = SnapshotPersister::new(args.snapshot);

    if args.web {
        let state = WebState {
            persister: Arc::new(persister),
        };
        return web::serve(&args.bind, state).await;
    }

    let (mut session, banner) = ReportSession::open(persister);
    println!("{banner}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let Some(reply) = session.execute(&line) else {
            continue;
        };
        if !reply.text.is_empty() {
            println!("{}", reply.text);
        }
        if reply.quit {
            break;
        }
    }

    Ok(())
}
