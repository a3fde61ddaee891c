mod drive;
mod http;
mod memory;

pub use drive::{ConfirmationForm, DriveTransport};
pub use http::HttpTransport;
pub use memory::{MemoryPayload, MemoryTransport};

use crate::config::TransportConfig;
use crate::manifest::SourceLocator;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// Body of a remote resource, yielded chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote answered but refused or could not serve the resource.
    #[error("source unavailable: {reason}")]
    Unavailable { reason: String },

    /// The transfer itself could not be carried out.
    #[error("transfer failed: {reason}")]
    Failed { reason: String },
}

impl TransportError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Retrieves the bytes behind a [`SourceLocator`].
///
/// Implementations are only ever driven sequentially by the fetcher, so they
/// need not be `Send` or `Sync`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn fetch(&self, locator: &SourceLocator) -> Result<ByteStream, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    async fn fetch(&self, locator: &SourceLocator) -> Result<ByteStream, TransportError> {
        (**self).fetch(locator).await
    }
}

/// Sends URLs through [`HttpTransport`] and Drive ids through [`DriveTransport`].
#[derive(Debug, Clone)]
pub struct RoutingTransport {
    http: HttpTransport,
    drive: DriveTransport,
}

impl RoutingTransport {
    pub fn new(http: HttpTransport, drive: DriveTransport) -> Self {
        Self { http, drive }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(HttpTransport::new(), DriveTransport::from_config(config)?))
    }
}

impl Transport for RoutingTransport {
    async fn fetch(&self, locator: &SourceLocator) -> Result<ByteStream, TransportError> {
        match locator {
            SourceLocator::Url(_) => self.http.fetch(locator).await,
            SourceLocator::GoogleDrive(_) => self.drive.fetch(locator).await,
        }
    }
}
