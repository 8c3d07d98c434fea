//! Text and HTML renderings of query results for the report front ends.

use chrono::{DateTime, Local, Utc};

use crate::{
    domain::{PresenceEvent, UserRecord},
    query::UserSummary,
};

/// Escape HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `ctime(3)`-style local time.
pub fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
}

fn or_dash(v: Option<&str>) -> &str {
    v.unwrap_or("-")
}

fn presence_line(ev: &PresenceEvent) -> String {
    format!(
        "{} : {} {} from {}",
        local_time(ev.timestamp),
        ev.action,
        or_dash(ev.channel.as_deref()),
        or_dash(ev.host.as_deref())
    )
}

pub fn list_text(users: &[UserSummary]) -> String {
    users
        .iter()
        .map(|u| u.nick.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn detail_text(user: &UserRecord) -> String {
    let mut lines = vec![
        format!("User {}", user.nick),
        format!("Logged {} messages sent.", user.conversation.len()),
    ];
    lines.extend(user.seen.iter().map(presence_line));
    lines.join("\n")
}

pub fn list_html(users: &[UserSummary]) -> String {
    let mut out = String::from("<h2>User list</h2>\n<ul>");
    for u in users {
        let nick = escape_html(&u.nick);
        out.push_str(&format!(
            "<li><a href=\"/user/{}\">{nick}</a>, seen {} times, {} messages</li>",
            escape_html(&urlencoding::encode(&u.nick)),
            u.seen_count,
            u.message_count
        ));
    }
    out.push_str("</ul>");
    out
}

pub fn detail_html(user: &UserRecord) -> String {
    let mut out = format!(
        "<h2>Summary of {}</h2><p>{} messages sent.</p><h3>Logged connections</h3><ul>",
        escape_html(&user.nick),
        user.conversation.len()
    );
    for ev in &user.seen {
        out.push_str(&format!("<li>{}</li>", escape_html(&presence_line(ev))));
    }
    out.push_str("</ul>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PresenceAction;
    use chrono::TimeZone;

    fn record() -> UserRecord {
        let mut r = UserRecord::new("<b>ob");
        r.seen.push(PresenceEvent {
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            server: "irc.test".into(),
            host: Some("h.example".into()),
            channel: Some("#c".into()),
            action: PresenceAction::Join,
        });
        r.seen.push(PresenceEvent {
            timestamp: Utc.timestamp_opt(60, 0).unwrap(),
            server: "irc.test".into(),
            host: None,
            channel: None,
            action: PresenceAction::Quit,
        });
        r
    }

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn detail_text_lists_presence_in_order() {
        let text = detail_text(&record());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "User <b>ob");
        assert_eq!(lines[1], "Logged 0 messages sent.");
        assert!(lines[2].ends_with(": JOIN #c from h.example"));
        assert!(lines[3].ends_with(": QUIT - from -"));
    }

    #[test]
    fn html_output_is_escaped() {
        let html = detail_html(&record());
        assert!(html.contains("Summary of &lt;b&gt;ob"));
        assert!(!html.contains("<b>ob"));

        let list = list_html(&[UserSummary {
            nick: "a[b]".into(),
            message_count: 3,
            seen_count: 1,
        }]);
        assert!(list.contains(r#"<a href="/user/a%5Bb%5D">a[b]</a>, seen 1 times, 3 messages"#));
    }
}
