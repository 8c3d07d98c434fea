//! Matched protocol events → store mutations / replies.

use chrono::{DateTime, Utc};

use crate::{
    dispatch::LineEvent,
    domain::{MessageEvent, PresenceAction, PresenceEvent},
    protocol::Outgoing,
    store::ActivityStore,
};

/// Channel-membership prefixes a server may put in front of NAMES entries.
const MEMBERSHIP_PREFIXES: &[char] = &['@', '+', '%', '&', '~'];

/// Collaborators a handler may touch.
pub struct HandlerContext<'a> {
    pub store: &'a mut ActivityStore,
    /// Server name stamped on every recorded event.
    pub server: &'a str,
    /// Timestamp shared by every event produced from one dispatch.
    pub now: DateTime<Utc>,
}

impl HandlerContext<'_> {
    fn presence(
        &mut self,
        nick: &str,
        host: Option<String>,
        channel: Option<String>,
        action: PresenceAction,
    ) {
        let event = PresenceEvent {
            timestamp: self.now,
            server: self.server.to_string(),
            host,
            channel,
            action,
        };
        self.store.append_presence(nick, event);
    }
}

/// Apply one event; returns a reply to send back on the connection, if any.
pub fn handle(event: LineEvent, ctx: &mut HandlerContext<'_>) -> Option<Outgoing> {
    match event {
        LineEvent::Ping { payload } => return Some(Outgoing::Pong(payload)),
        LineEvent::Join {
            nick, host, channel, ..
        } => ctx.presence(&nick, Some(host), Some(channel), PresenceAction::Join),
        LineEvent::Part {
            nick, host, channel, ..
        } => ctx.presence(&nick, Some(host), Some(channel), PresenceAction::Part),
        LineEvent::Quit { nick, host, .. } => {
            ctx.presence(&nick, Some(host), None, PresenceAction::Quit)
        }
        LineEvent::Message {
            nick, host, channel, ..
        } => {
            let event = MessageEvent {
                timestamp: ctx.now,
                host,
                server: ctx.server.to_string(),
                channel,
            };
            ctx.store.append_message(&nick, event);
        }
        LineEvent::Names { channel, names } => {
            for nick in names
                .split_whitespace()
                .map(|n| n.trim_start_matches(MEMBERSHIP_PREFIXES))
                .filter(|n| !n.is_empty())
            {
                ctx.presence(nick, None, Some(channel.clone()), PresenceAction::Name);
            }
        }
        LineEvent::Welcome { server, text } => {
            tracing::info!(%server, %text, "registered with server");
        }
    }
    None
}
