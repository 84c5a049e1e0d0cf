//! Sink that writes events to standard output.
//!
//! One JSON document per line; log scrapers that understand the embedded
//! metric format pick the documents up from the stream.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{Sink, SinkError};

/// Stdout sink.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn accept(&self, events: &[String]) -> Result<(), SinkError> {
        let mut out = tokio::io::stdout();
        for event in events {
            out.write_all(event.as_bytes()).await?;
            out.write_all(b"\n").await?;
        }
        out.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
