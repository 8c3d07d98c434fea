//! In-memory, append-only activity history.

use std::collections::BTreeMap;

use crate::domain::{MessageEvent, PresenceEvent, UserRecord};

/// Mapping `nick -> UserRecord`, the system of record while ingesting.
///
/// Records are created on first touch and only ever appended to; there is no
/// API that removes a record or truncates a log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityStore {
    users: BTreeMap<String, UserRecord>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_or_create(&mut self, nick: &str) -> &mut UserRecord {
        self.users
            .entry(nick.to_string())
            .or_insert_with(|| UserRecord::new(nick))
    }

    pub fn append_message(&mut self, nick: &str, event: MessageEvent) {
        self.fetch_or_create(nick).conversation.push(event);
    }

    pub fn append_presence(&mut self, nick: &str, event: PresenceEvent) {
        self.fetch_or_create(nick).seen.push(event);
    }

    pub fn get(&self, nick: &str) -> Option<&UserRecord> {
        self.users.get(nick)
    }

    /// All records, ordered by nick.
    pub fn iter(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub(crate) fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            let entry = store.fetch_or_create(&record.nick);
            entry.conversation.extend(record.conversation);
            entry.seen.extend(record.seen);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PresenceAction;
    use chrono::{TimeZone, Utc};

    fn msg(channel: &str, secs: i64) -> MessageEvent {
        MessageEvent {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            host: "example.org".to_string(),
            server: "irc.test".to_string(),
            channel: channel.to_string(),
        }
    }

    #[test]
    fn fetch_or_create_is_idempotent() {
        let mut store = ActivityStore::new();
        store.fetch_or_create("alice");
        store.fetch_or_create("alice");
        store.append_message("alice", msg("#a", 1));
        store.append_presence(
            "alice",
            PresenceEvent {
                timestamp: Utc.timestamp_opt(2, 0).unwrap(),
                server: "irc.test".to_string(),
                host: None,
                channel: Some("#a".to_string()),
                action: PresenceAction::Name,
            },
        );

        assert_eq!(store.len(), 1);
        let alice = store.get("alice").unwrap();
        assert_eq!(alice.conversation.len(), 1);
        assert_eq!(alice.seen.len(), 1);
    }

    #[test]
    fn appends_keep_arrival_order() {
        let mut store = ActivityStore::new();
        // Arrival order deliberately differs from timestamp order.
        for (i, secs) in [30, 10, 20, 5, 40].into_iter().enumerate() {
            store.append_message("bob", msg(&format!("#c{i}"), secs));
        }

        let channels: Vec<_> = store
            .get("bob")
            .unwrap()
            .conversation
            .iter()
            .map(|m| m.channel.as_str())
            .collect();
        assert_eq!(channels, vec!["#c0", "#c1", "#c2", "#c3", "#c4"]);
    }

    #[test]
    fn unknown_nick_is_absent_until_touched() {
        let mut store = ActivityStore::new();
        assert!(store.get("ghost").is_none());
        assert!(store.is_empty());
        store.fetch_or_create("ghost");
        assert!(store.get("ghost").is_some());
    }
}
