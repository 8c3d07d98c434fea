//! IRC adapter for chanlog.
//!
//! Plain-TCP implementation of [`chanlog_core::ports::Connection`] plus the
//! registration handshake (PASS/NICK/USER) and channel joins.

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

use chanlog_core::{
    config::Config, errors::Error, ports::Connection, protocol::Outgoing, Result,
};

pub struct IrcConnection {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
}

impl IrcConnection {
    /// Open the TCP connection. Failure here is fatal for the ingest process.
    pub async fn connect(addr: &str) -> Result<Self> {
        tracing::info!("connecting to {addr}");
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| Error::Connection {
                addr: addr.to_string(),
                source,
            })?;
        let _ = stream.set_nodelay(true);
        let (reader, writer) = stream.into_split();
        tracing::info!("connected to {addr}");
        Ok(Self { reader, writer })
    }

    /// Identify with the server and request every configured channel.
    pub async fn register(&mut self, cfg: &Config) -> Result<()> {
        for msg in registration(cfg) {
            if let Outgoing::Join(channel) = &msg {
                tracing::info!("joining {channel}");
            }
            self.send(&msg).await?;
        }
        Ok(())
    }
}

/// Lines sent right after connecting, in order.
pub fn registration(cfg: &Config) -> Vec<Outgoing> {
    let mut out = Vec::with_capacity(cfg.channels.len() + 3);
    if let Some(pass) = &cfg.password {
        out.push(Outgoing::Pass(pass.clone()));
    }
    out.push(Outgoing::Nick(cfg.nick.clone()));
    out.push(Outgoing::User {
        ident: cfg.ident.clone(),
        server: cfg.server.clone(),
        realname: cfg.realname.clone(),
    });
    out.extend(cfg.channels.iter().cloned().map(Outgoing::Join));
    out
}

#[async_trait]
impl Connection for IrcConnection {
    async fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf).await
    }

    async fn send(&mut self, msg: &Outgoing) -> Result<()> {
        if matches!(msg, Outgoing::Pass(_)) {
            tracing::debug!("<<< PASS ****");
        } else {
            tracing::debug!("<<< {msg}");
        }
        self.writer.write_all(msg.to_line().as_bytes()).await?;
        Ok(())
    }
}
