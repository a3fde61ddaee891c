use super::{ByteStream, Transport, TransportError};
use crate::manifest::SourceLocator;
use futures::{StreamExt, TryStreamExt};
use opendal::layers::TracingLayer;
use opendal::services::Http;
use opendal::{ErrorKind, Operator};
use url::{Position, Url};

/// Plain HTTP(S) downloads through an OpenDAL HTTP operator.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Splits `https://host:port/a/b.zip` into the operator endpoint and the
/// path read below it.
pub(crate) fn split_url(url: &Url) -> Result<(String, String), TransportError> {
    if url.host_str().is_none() {
        return Err(TransportError::failed(format!("URL has no host: {url}")));
    }
    let endpoint = url[..Position::BeforePath].to_string();
    let path = url.path().to_string();
    Ok((endpoint, path))
}

fn build_http_operator(endpoint: &str) -> Result<Operator, opendal::Error> {
    let builder = Http::default().endpoint(endpoint);
    let op = Operator::new(builder)?.layer(TracingLayer).finish();
    Ok(op)
}

pub(crate) fn map_opendal_error(err: opendal::Error) -> TransportError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            TransportError::unavailable(err.to_string())
        }
        _ => TransportError::failed(err.to_string()),
    }
}

/// OpenDAL only talks to the server once the stream is polled, so a 404 or
/// 403 arrives here as an `io::Error` wrapping the original OpenDAL error.
pub(crate) fn map_stream_error(err: std::io::Error) -> TransportError {
    if let Some(inner) = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<opendal::Error>())
    {
        return match inner.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                TransportError::unavailable(inner.to_string())
            }
            _ => TransportError::failed(inner.to_string()),
        };
    }
    match err.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            TransportError::unavailable(err.to_string())
        }
        _ => TransportError::failed(err.to_string()),
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, locator: &SourceLocator) -> Result<ByteStream, TransportError> {
        let SourceLocator::Url(url) = locator else {
            return Err(TransportError::failed(format!(
                "HTTP transport cannot fetch {locator}"
            )));
        };

        let (endpoint, path) = split_url(url)?;
        tracing::trace!(endpoint = %endpoint, path = %path, "Opening HTTP reader");

        let op = build_http_operator(&endpoint).map_err(map_opendal_error)?;
        let stream = op
            .reader(&path)
            .await
            .map_err(map_opendal_error)?
            .into_bytes_stream(..)
            .await
            .map_err(map_opendal_error)?;

        Ok(stream.map_err(map_stream_error).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_keeps_port_in_endpoint() {
        let url = Url::parse("http://127.0.0.1:8080/models/buffalo_l.zip").unwrap();
        let (endpoint, path) = split_url(&url).unwrap();
        assert_eq!(endpoint, "http://127.0.0.1:8080");
        assert_eq!(path, "/models/buffalo_l.zip");
    }

    #[test]
    fn test_split_url_without_port() {
        let url = Url::parse(
            "https://github.com/deepinsight/insightface/releases/download/v0.7/buffalo_l.zip",
        )
        .unwrap();
        let (endpoint, path) = split_url(&url).unwrap();
        assert_eq!(endpoint, "https://github.com");
        assert_eq!(path, "/deepinsight/insightface/releases/download/v0.7/buffalo_l.zip");
    }

    #[test]
    fn test_not_found_maps_to_unavailable() {
        let err = opendal::Error::new(ErrorKind::NotFound, "missing");
        assert!(matches!(
            map_opendal_error(err),
            TransportError::Unavailable { .. }
        ));

        let err = opendal::Error::new(ErrorKind::Unexpected, "connection refused");
        assert!(matches!(
            map_opendal_error(err),
            TransportError::Failed { .. }
        ));
    }

    #[test]
    fn test_stream_errors_keep_the_opendal_kind() {
        let not_found = std::io::Error::other(opendal::Error::new(
            ErrorKind::NotFound,
            "NotFound (permanent) at read, status: 404",
        ));
        assert!(matches!(
            map_stream_error(not_found),
            TransportError::Unavailable { .. }
        ));

        let denied = std::io::Error::other(opendal::Error::new(
            ErrorKind::PermissionDenied,
            "PermissionDenied (permanent) at read, status: 403",
        ));
        assert!(matches!(
            map_stream_error(denied),
            TransportError::Unavailable { .. }
        ));

        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(
            map_stream_error(reset),
            TransportError::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejects_drive_locator() {
        let result = HttpTransport::new()
            .fetch(&SourceLocator::GoogleDrive("1abc".to_string()))
            .await;
        assert!(matches!(result, Err(TransportError::Failed { .. })));
    }
}
