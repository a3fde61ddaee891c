use super::{ByteStream, Transport, TransportError};
use crate::manifest::SourceLocator;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use std::collections::HashMap;
use std::sync::Mutex;

/// What a [`MemoryTransport`] answers for one locator.
#[derive(Debug, Clone)]
pub enum MemoryPayload {
    /// Serves the bytes, split into chunks of at most `chunk_size`.
    Bytes { data: Bytes, chunk_size: usize },
    /// The source refuses to serve the resource.
    Unavailable(String),
    /// The transfer cannot even start.
    Unreachable(String),
    /// Serves `data`, then fails before the end of the stream.
    Truncated(Bytes),
}

impl MemoryPayload {
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes {
            data: data.into(),
            chunk_size: 8 * 1024,
        }
    }
}

/// Serves fixed payloads and records every locator it was asked for.
///
/// Unknown locators answer as unreachable.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    payloads: HashMap<SourceLocator, MemoryPayload>,
    requests: Mutex<Vec<SourceLocator>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: SourceLocator, payload: MemoryPayload) -> Self {
        self.payloads.insert(locator, payload);
        self
    }

    /// Locators requested so far, in request order.
    pub fn requests(&self) -> Vec<SourceLocator> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

fn chunked(data: Bytes, chunk_size: usize) -> Vec<Result<Bytes, TransportError>> {
    let chunk_size = chunk_size.max(1);
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| Ok(data.slice(start..(start + chunk_size).min(data.len()))))
        .collect()
}

impl Transport for MemoryTransport {
    async fn fetch(&self, locator: &SourceLocator) -> Result<ByteStream, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(locator.clone());
        }

        match self.payloads.get(locator) {
            Some(MemoryPayload::Bytes { data, chunk_size }) => {
                Ok(stream::iter(chunked(data.clone(), *chunk_size)).boxed())
            }
            Some(MemoryPayload::Truncated(data)) => {
                let mut chunks = chunked(data.clone(), 8 * 1024);
                chunks.push(Err(TransportError::failed("connection reset mid-transfer")));
                Ok(stream::iter(chunks).boxed())
            }
            Some(MemoryPayload::Unavailable(reason)) => Err(TransportError::unavailable(reason)),
            Some(MemoryPayload::Unreachable(reason)) => Err(TransportError::failed(reason)),
            None => Err(TransportError::failed(format!("no route to {locator}"))),
        }
    }
}
