//! Interactive prompt commands.

use chanlog_core::{
    query::{self, Detail, OrderKey},
    render,
    snapshot::{LoadStatus, SnapshotPersister},
    store::ActivityStore,
};

const COMMANDS: &[&str] = &["list", "user", "help", "refresh", "quit"];

/// Prompt state: the snapshot source and the copy currently loaded from it.
pub struct ReportSession {
    persister: SnapshotPersister,
    store: ActivityStore,
}

/// What the prompt should print, and whether to stop afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

fn parse_command(line: &str) -> (String, Vec<&str>) {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    (cmd, parts.collect())
}

impl ReportSession {
    /// Load the snapshot; returns the session and the import banner.
    pub fn open(persister: SnapshotPersister) -> (Self, String) {
        let mut session = Self {
            persister,
            store: ActivityStore::new(),
        };
        let banner = session.refresh();
        (session, banner)
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    /// Run one prompt line. Blank input yields `None`.
    pub fn execute(&mut self, line: &str) -> Option<Reply> {
        let (cmd, args) = parse_command(line);
        let reply = match cmd.as_str() {
            "" => return None,
            "list" => Reply::text(self.list(args.first().copied())),
            "user" => Reply::text(self.user(args.first().copied())),
            "help" => Reply::text(COMMANDS.join(",")),
            "refresh" => Reply::text(self.refresh()),
            "quit" | "exit" => Reply {
                text: String::new(),
                quit: true,
            },
            other => Reply::text(format!("Unknown command {other}")),
        };
        Some(reply)
    }

    fn list(&self, order: Option<&str>) -> String {
        let mut out = String::new();
        let key = match order.map(str::parse::<OrderKey>) {
            None => OrderKey::Nick,
            Some(Ok(key)) => key,
            Some(Err(_)) => {
                out.push_str("Unknown ordering method\n");
                OrderKey::Nick
            }
        };
        out.push_str(&render::list_text(&query::list(&self.store, key)));
        out
    }

    fn user(&self, nick: Option<&str>) -> String {
        let Some(nick) = nick else {
            return "USAGE: user NICK".to_string();
        };
        match query::detail(&self.store, nick) {
            Detail::Found(record) => render::detail_text(record),
            Detail::NotFound => format!("User {nick} not found"),
        }
    }

    fn refresh(&mut self) -> String {
        let (store, status) = self.persister.load();
        self.store = store;
        let path = self.persister.path().display();
        match status {
            LoadStatus::Restored { users } => format!("Imported <{path}>, {users} users."),
            LoadStatus::Missing => format!("Snapshot <{path}> does not exist, 0 users."),
            LoadStatus::Discarded(e) => {
                tracing::warn!("snapshot unusable: {e}");
                format!("Failed to load <{path}>: {e}")
            }
        }
    }
}
