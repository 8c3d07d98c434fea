use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration for the ingest process.
#[derive(Clone, Debug)]
pub struct Config {
    // Connection
    pub server: String,
    pub port: u16,
    pub password: Option<String>,

    // Identity
    pub nick: String,
    pub ident: String,
    pub realname: String,
    pub channels: Vec<String>,
    pub quit_message: Option<String>,

    // Persistence
    pub snapshot_file: PathBuf,
    pub snapshot_interval: Duration,

    // Runtime
    pub read_buffer_bytes: usize,
    pub log_raw_lines: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let server = env_str("IRC_SERVER").and_then(non_empty).ok_or_else(|| {
            Error::Config("IRC_SERVER environment variable is required".to_string())
        })?;
        let port = match env_str("IRC_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("IRC_PORT is not a valid port: {v}")))?,
            None => 6667,
        };
        let password = env_str("IRC_PASSWORD").and_then(non_empty);

        let nick = env_str("IRC_NICK")
            .and_then(non_empty)
            .unwrap_or_else(|| "alog".to_string());
        if nick.contains(char::is_whitespace) {
            return Err(Error::Config(format!("IRC_NICK may not contain spaces: {nick:?}")));
        }
        let ident = env_str("IRC_IDENT")
            .and_then(non_empty)
            .unwrap_or_else(|| "Alog".to_string());
        let realname = env_str("IRC_REALNAME")
            .and_then(non_empty)
            .unwrap_or_else(|| "a log".to_string());
        let channels = parse_csv(env_str("IRC_CHANNELS"));
        let quit_message = env_str("QUIT_MESSAGE").and_then(non_empty);

        // One snapshot per server.
        let snapshot_file = env_path("SNAPSHOT_FILE")
            .unwrap_or_else(|| PathBuf::from(format!("{server}.snapshot.json")));
        let snapshot_interval =
            Duration::from_secs(env_u64("SNAPSHOT_INTERVAL_SECS").unwrap_or(60).max(1));

        let read_buffer_bytes = env_usize("READ_BUFFER_BYTES").unwrap_or(4096).max(64);
        let log_raw_lines = env_bool("LOG_RAW_LINES").unwrap_or(false);

        Ok(Self {
            server,
            port,
            password,
            nick,
            ident,
            realname,
            channels,
            quit_message,
            snapshot_file,
            snapshot_interval,
            read_buffer_bytes,
            log_raw_lines,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.trim().to_string())
    }
}
