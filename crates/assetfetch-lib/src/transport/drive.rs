use super::{ByteStream, Transport, TransportError};
use crate::config::TransportConfig;
use crate::manifest::SourceLocator;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Response, StatusCode, header};
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Google Drive downloads by file id.
///
/// Large files are served behind an HTML "can't scan for viruses" page; the
/// confirmation form on that page is followed once.
#[derive(Debug, Clone)]
pub struct DriveTransport {
    client: Client,
    endpoint: Url,
}

impl DriveTransport {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("assetfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client, config.google_drive_endpoint.clone()))
    }

    fn download_url(&self, id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("export", "download")
            .append_pair("id", id);
        url
    }

    async fn send(&self, url: Url) -> Result<Response, TransportError> {
        tracing::trace!(url = %url, "Requesting Drive resource");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::failed(format!("{url}: {e}")))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::GONE => Err(TransportError::unavailable(format!(
                "Drive answered {status} for {url}"
            ))),
            s if !s.is_success() => Err(TransportError::failed(format!(
                "Drive answered {status} for {url}"
            ))),
            _ => Ok(response),
        }
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

fn into_stream(response: Response) -> ByteStream {
    response
        .bytes_stream()
        .map_err(|e| TransportError::failed(e.to_string()))
        .boxed()
}

impl Transport for DriveTransport {
    async fn fetch(&self, locator: &SourceLocator) -> Result<ByteStream, TransportError> {
        let SourceLocator::GoogleDrive(id) = locator else {
            return Err(TransportError::failed(format!(
                "Drive transport cannot fetch {locator}"
            )));
        };

        let download_url = self.download_url(id);
        let response = self.send(download_url.clone()).await?;
        if !is_html(&response) {
            return Ok(into_stream(response));
        }

        let page = response
            .text()
            .await
            .map_err(|e| TransportError::failed(e.to_string()))?;
        let form = ConfirmationForm::parse(&page).ok_or_else(|| {
            TransportError::unavailable(format!(
                "Drive returned a page without a download link for {id}; \
                 the file may be private or over its download quota"
            ))
        })?;

        tracing::debug!(id = %id, "Following Drive download confirmation");
        let confirmed_url = form.to_url(&download_url)?;
        let response = self.send(confirmed_url).await?;
        if is_html(&response) {
            return Err(TransportError::unavailable(format!(
                "Drive kept returning a web page instead of {id}"
            )));
        }
        Ok(into_stream(response))
    }
}

/// The download confirmation extracted from a Drive interstitial page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationForm {
    /// Form action; `None` means "repeat the original request".
    pub action: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl ConfirmationForm {
    /// Parses either the `<form id="download-form">` page or the older page
    /// that links to `...&confirm=<token>&id=...`.
    pub fn parse(page: &str) -> Option<Self> {
        Self::parse_form(page).or_else(|| Self::parse_confirm_link(page))
    }

    fn parse_form(page: &str) -> Option<Self> {
        let form_selector = Selector::parse("form#download-form").ok()?;
        let input_selector = Selector::parse(r#"input[type="hidden"][name]"#).ok()?;

        let document = Html::parse_document(page);
        let form = document.select(&form_selector).next()?;
        let action = form.value().attr("action").map(str::to_string);
        let fields: Vec<(String, String)> = form
            .select(&input_selector)
            .filter_map(|input| {
                let input = input.value();
                Some((
                    input.attr("name")?.to_string(),
                    input.attr("value").unwrap_or_default().to_string(),
                ))
            })
            .collect();

        if fields.iter().any(|(name, _)| name == "confirm" || name == "uuid") {
            Some(Self { action, fields })
        } else {
            None
        }
    }

    fn parse_confirm_link(page: &str) -> Option<Self> {
        let start = page.find("confirm=")? + "confirm=".len();
        let token: String = page[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if token.is_empty() {
            return None;
        }
        Some(Self {
            action: None,
            fields: vec![("confirm".to_string(), token)],
        })
    }

    /// Builds the confirmed download URL. Without a form action the
    /// confirmation fields are appended to `original`, keeping its query.
    pub fn to_url(&self, original: &Url) -> Result<Url, TransportError> {
        let mut url = match &self.action {
            Some(action) => original
                .join(action)
                .map_err(|e| TransportError::failed(format!("bad Drive form action {action}: {e}")))?,
            None => original.clone(),
        };
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.fields {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}
