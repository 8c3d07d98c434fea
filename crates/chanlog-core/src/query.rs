//! Read-only listing/detail queries over a loaded store.

use std::{cmp::Ordering, str::FromStr};

use crate::{domain::UserRecord, errors::Error, store::ActivityStore};

/// Listing order selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderKey {
    #[default]
    Nick,
    Messages,
    Seen,
}

impl FromStr for OrderKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nick" | "" => Ok(OrderKey::Nick),
            "messages" => Ok(OrderKey::Messages),
            "seen" => Ok(OrderKey::Seen),
            other => Err(Error::UnknownRequest(format!("ordering method {other:?}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub nick: String,
    pub message_count: usize,
    pub seen_count: usize,
}

impl From<&UserRecord> for UserSummary {
    fn from(r: &UserRecord) -> Self {
        Self {
            nick: r.nick.clone(),
            message_count: r.conversation.len(),
            seen_count: r.seen.len(),
        }
    }
}

/// Detail lookup result; a missing nick is a normal outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detail<'a> {
    Found(&'a UserRecord),
    NotFound,
}

/// All users sorted descending by `key`; ties broken by nick ascending.
pub fn list(store: &ActivityStore, key: OrderKey) -> Vec<UserSummary> {
    let mut out: Vec<UserSummary> = store.iter().map(UserSummary::from).collect();
    out.sort_by(|a, b| {
        let primary = match key {
            OrderKey::Nick => b.nick.cmp(&a.nick),
            OrderKey::Messages => b.message_count.cmp(&a.message_count),
            OrderKey::Seen => b.seen_count.cmp(&a.seen_count),
        };
        match primary {
            Ordering::Equal => a.nick.cmp(&b.nick),
            other => other,
        }
    });
    out
}

pub fn detail<'a>(store: &'a ActivityStore, nick: &str) -> Detail<'a> {
    match store.get(nick) {
        Some(record) => Detail::Found(record),
        None => Detail::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageEvent, PresenceAction, PresenceEvent};
    use chrono::{TimeZone, Utc};

    fn store_with(counts: &[(&str, usize, usize)]) -> ActivityStore {
        let mut store = ActivityStore::new();
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        for (nick, messages, seen) in counts {
            store.fetch_or_create(nick);
            for _ in 0..*messages {
                store.append_message(
                    nick,
                    MessageEvent {
                        timestamp: ts,
                        host: "h".into(),
                        server: "s".into(),
                        channel: "#c".into(),
                    },
                );
            }
            for _ in 0..*seen {
                store.append_presence(
                    nick,
                    PresenceEvent {
                        timestamp: ts,
                        server: "s".into(),
                        host: None,
                        channel: Some("#c".into()),
                        action: PresenceAction::Name,
                    },
                );
            }
        }
        store
    }

    fn nicks(v: &[UserSummary]) -> Vec<&str> {
        v.iter().map(|s| s.nick.as_str()).collect()
    }

    #[test]
    fn list_by_messages_descending_with_nick_tie_break() {
        let store = store_with(&[("dave", 2, 0), ("bob", 5, 0), ("carol", 2, 9), ("amy", 2, 1)]);
        let out = list(&store, OrderKey::Messages);
        assert_eq!(nicks(&out), vec!["bob", "amy", "carol", "dave"]);
        assert_eq!(out[0].message_count, 5);
    }

    #[test]
    fn list_by_seen_descending() {
        let store = store_with(&[("a", 0, 1), ("b", 0, 3), ("c", 0, 3)]);
        let out = list(&store, OrderKey::Seen);
        assert_eq!(nicks(&out), vec!["b", "c", "a"]);
        assert_eq!(out[1].seen_count, 3);
    }

    #[test]
    fn list_by_nick_is_descending() {
        let store = store_with(&[("a", 0, 0), ("c", 0, 0), ("b", 0, 0)]);
        assert_eq!(nicks(&list(&store, OrderKey::Nick)), vec!["c", "b", "a"]);
    }

    #[test]
    fn detail_for_unknown_nick_is_not_found() {
        let store = store_with(&[("alice", 1, 1)]);
        assert_eq!(detail(&store, "ghost"), Detail::NotFound);
        match detail(&store, "alice") {
            Detail::Found(rec) => assert_eq!(rec.conversation.len(), 1),
            Detail::NotFound => panic!("alice should exist"),
        }
    }

    #[test]
    fn order_key_parsing() {
        assert_eq!("messages".parse::<OrderKey>().unwrap(), OrderKey::Messages);
        assert_eq!("SEEN".parse::<OrderKey>().unwrap(), OrderKey::Seen);
        assert_eq!("".parse::<OrderKey>().unwrap(), OrderKey::Nick);
        assert!(matches!(
            "loudest".parse::<OrderKey>(),
            Err(Error::UnknownRequest(_))
        ));
    }
}
