//! Sink that ships events to a local metrics agent over TCP or UDP.
//!
//! TCP connections are cached and re-established with backoff when a write
//! fails; UDP is fire-and-forget, one datagram per event.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::Mutex;
use url::Url;

use crate::util::retry::{retry_with_backoff, RetryOptions};

use super::{Sink, SinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Tcp,
    Udp,
}

/// Agent socket sink.
pub struct AgentSink {
    address: String,
    protocol: Protocol,
    retry: RetryOptions,
    connection: Mutex<Option<TcpStream>>,
}

impl AgentSink {
    /// Create a sink for an endpoint URI such as `tcp://127.0.0.1:25888`.
    pub fn new(endpoint: &str) -> Result<Self, SinkError> {
        let url = Url::parse(endpoint)
            .map_err(|e| SinkError::UnsupportedEndpoint(format!("{endpoint}: {e}")))?;

        let protocol = match url.scheme() {
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            other => {
                return Err(SinkError::UnsupportedEndpoint(format!(
                    "{endpoint}: unknown scheme '{other}'"
                )))
            }
        };

        let host = url
            .host_str()
            .ok_or_else(|| SinkError::UnsupportedEndpoint(format!("{endpoint}: missing host")))?;
        let port = url
            .port()
            .ok_or_else(|| SinkError::UnsupportedEndpoint(format!("{endpoint}: missing port")))?;

        Ok(Self {
            address: format!("{host}:{port}"),
            protocol,
            retry: RetryOptions::default(),
            connection: Mutex::new(None),
        })
    }

    async fn connect(&self) -> Result<TcpStream, SinkError> {
        let address = self.address.as_str();
        retry_with_backoff(&self.retry, || async move {
            TcpStream::connect(address)
                .await
                .map_err(|e| SinkError::Connection(format!("{address}: {e}")))
        })
        .await
    }

    async fn send_tcp(&self, payload: &[u8]) -> Result<(), SinkError> {
        let mut guard = self.connection.lock().await;

        let first_attempt = {
            let stream = match guard.as_mut() {
                Some(stream) => stream,
                None => guard.insert(self.connect().await?),
            };
            stream.write_all(payload).await
        };

        // A cached connection may have been closed by the agent; reconnect
        // once and resend the whole payload.
        if let Err(err) = first_attempt {
            tracing::debug!("agent connection dropped ({err}), reconnecting");
            *guard = None;
            let stream = guard.insert(self.connect().await?);
            stream.write_all(payload).await?;
        }

        Ok(())
    }

    async fn send_udp(&self, events: &[String]) -> Result<(), SinkError> {
        let target = tokio::net::lookup_host(self.address.as_str())
            .await?
            .next()
            .ok_or_else(|| {
                SinkError::Connection(format!("{}: no addresses resolved", self.address))
            })?;

        // The local socket family has to match the resolved target.
        let bind_address = if target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(bind_address).await?;
        for event in events {
            socket.send_to(event.as_bytes(), target).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Sink for AgentSink {
    async fn accept(&self, events: &[String]) -> Result<(), SinkError> {
        if events.is_empty() {
            return Ok(());
        }

        match self.protocol {
            Protocol::Tcp => {
                let mut payload = Vec::new();
                for event in events {
                    payload.extend_from_slice(event.as_bytes());
                    payload.push(b'\n');
                }
                self.send_tcp(&payload).await
            }
            Protocol::Udp => self.send_udp(events).await,
        }
    }

    fn name(&self) -> &'static str {
        "agent"
    }
}
