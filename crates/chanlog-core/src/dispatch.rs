//! Ordered line grammar → typed protocol events.
//!
//! Rules are evaluated top to bottom and the first match wins. Lines that match
//! no rule are ignored.

use regex::{Captures, Regex};

use crate::{
    handlers::{self, HandlerContext},
    protocol::Outgoing,
    Error, Result,
};

/// Grammar entry kinds, in default priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    Ping,
    Join,
    Part,
    Quit,
    Message,
    Names,
    Welcome,
}

/// A matched line with its positional fields extracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineEvent {
    Ping {
        payload: String,
    },
    Join {
        nick: String,
        ident: String,
        host: String,
        channel: String,
    },
    Part {
        nick: String,
        ident: String,
        host: String,
        channel: String,
    },
    Quit {
        nick: String,
        ident: String,
        host: String,
    },
    Message {
        nick: String,
        ident: String,
        host: String,
        channel: String,
    },
    Names {
        channel: String,
        names: String,
    },
    Welcome {
        server: String,
        text: String,
    },
}

impl LineEvent {
    pub fn kind(&self) -> RuleKind {
        match self {
            LineEvent::Ping { .. } => RuleKind::Ping,
            LineEvent::Join { .. } => RuleKind::Join,
            LineEvent::Part { .. } => RuleKind::Part,
            LineEvent::Quit { .. } => RuleKind::Quit,
            LineEvent::Message { .. } => RuleKind::Message,
            LineEvent::Names { .. } => RuleKind::Names,
            LineEvent::Welcome { .. } => RuleKind::Welcome,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub kind: RuleKind,
    pub pattern: Regex,
}

impl Rule {
    pub fn new(kind: RuleKind, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid {kind:?} pattern: {e}")))?;
        Ok(Self { kind, pattern })
    }

    fn extract(&self, caps: &Captures<'_>) -> LineEvent {
        let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
        match self.kind {
            RuleKind::Ping => LineEvent::Ping { payload: field(1) },
            RuleKind::Join => LineEvent::Join {
                nick: field(1),
                ident: field(2),
                host: field(3),
                channel: field(4),
            },
            RuleKind::Part => LineEvent::Part {
                nick: field(1),
                ident: field(2),
                host: field(3),
                channel: field(4),
            },
            RuleKind::Quit => LineEvent::Quit {
                nick: field(1),
                ident: field(2),
                host: field(3),
            },
            RuleKind::Message => LineEvent::Message {
                nick: field(1),
                ident: field(2),
                host: field(3),
                channel: field(4),
            },
            RuleKind::Names => LineEvent::Names {
                channel: field(1),
                names: field(2),
            },
            RuleKind::Welcome => LineEvent::Welcome {
                server: field(1),
                text: field(2),
            },
        }
    }
}

// `:nick!ident@host` prefix shared by user-originated commands.
const SOURCE: &str = r"^:([^!\s]+)!(\S*)@(\S+)";

/// The ordered rule table.
#[derive(Clone, Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Default IRC grammar. The member-list rule only accepts replies addressed
    /// to `own_nick`.
    pub fn irc(own_nick: &str) -> Result<Self> {
        let own = regex::escape(own_nick);
        Self::from_rules(vec![
            Rule::new(RuleKind::Ping, r"^PING (.+)$")?,
            Rule::new(RuleKind::Join, &format!(r"{SOURCE} JOIN :?(\S+)"))?,
            Rule::new(RuleKind::Part, &format!(r"{SOURCE} PART :?(\S+)"))?,
            Rule::new(RuleKind::Quit, &format!(r"{SOURCE} QUIT(?:\s|$)"))?,
            Rule::new(RuleKind::Message, &format!(r"{SOURCE} PRIVMSG (\S+) :.+"))?,
            Rule::new(
                RuleKind::Names,
                &format!(r"^\S+ 353 {own} [=*@] (#\S+) :(.*)$"),
            )?,
            Rule::new(RuleKind::Welcome, r"^:(\S+) 001 \S+ :(.+)$")?,
        ])
    }

    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(Error::Config("grammar has no rules".to_string()));
        }
        Ok(Self { rules })
    }

    /// First matching rule wins.
    pub fn parse(&self, line: &str) -> Option<LineEvent> {
        self.rules
            .iter()
            .find_map(|rule| rule.pattern.captures(line).map(|caps| rule.extract(&caps)))
    }
}

/// Outcome of dispatching one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Ignored,
    Handled {
        kind: RuleKind,
        reply: Option<Outgoing>,
    },
}

/// Grammar + handler table.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    grammar: Grammar,
}

impl Dispatcher {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    pub fn dispatch(&self, line: &str, ctx: &mut HandlerContext<'_>) -> Dispatch {
        let Some(event) = self.grammar.parse(line) else {
            return Dispatch::Ignored;
        };
        let kind = event.kind();
        tracing::debug!(?event, "dispatch");
        let reply = handlers::handle(event, ctx);
        Dispatch::Handled { kind, reply }
    }
}
