//! Outgoing IRC protocol lines.

use std::fmt;

/// A line the client sends to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outgoing {
    Pass(String),
    Nick(String),
    User {
        ident: String,
        server: String,
        realname: String,
    },
    Join(String),
    /// Keepalive reply; the payload is echoed verbatim (including a leading `:`).
    Pong(String),
    Quit(Option<String>),
}

impl Outgoing {
    /// CRLF-terminated wire form.
    pub fn to_line(&self) -> String {
        format!("{self}\r\n")
    }
}

impl fmt::Display for Outgoing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outgoing::Pass(pass) => write!(f, "PASS {pass}"),
            Outgoing::Nick(nick) => write!(f, "NICK {nick}"),
            Outgoing::User {
                ident,
                server,
                realname,
            } => write!(f, "USER {ident} {server} NULL :{realname}"),
            Outgoing::Join(channel) => write!(f, "JOIN {channel}"),
            Outgoing::Pong(payload) => write!(f, "PONG {payload}"),
            Outgoing::Quit(None) => f.write_str("QUIT"),
            Outgoing::Quit(Some(message)) => write!(f, "QUIT :{message}"),
        }
    }
}
