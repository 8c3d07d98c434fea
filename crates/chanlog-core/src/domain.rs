use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of presence observation recorded for a nick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresenceAction {
    Join,
    Part,
    Quit,
    /// Seen in a member-list (NAMES) reply.
    Name,
}

impl PresenceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PresenceAction::Join => "JOIN",
            PresenceAction::Part => "PART",
            PresenceAction::Quit => "QUIT",
            PresenceAction::Name => "NAME",
        }
    }
}

impl fmt::Display for PresenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel message sent by a nick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub server: String,
    pub channel: String,
}

/// A join/part/quit/member-list observation for a nick.
///
/// `host` is unknown for member-list entries and `channel` is unknown for quits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub timestamp: DateTime<Utc>,
    pub server: String,
    pub host: Option<String>,
    pub channel: Option<String>,
    pub action: PresenceAction,
}

/// Everything recorded for one nick, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub nick: String,
    pub conversation: Vec<MessageEvent>,
    pub seen: Vec<PresenceEvent>,
}

impl UserRecord {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            conversation: Vec::new(),
            seen: Vec::new(),
        }
    }
}
