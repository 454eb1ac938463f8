//! Best-effort friendly titles for resource links.
//!
//! Google Docs links get their page title and YouTube links their oEmbed
//! title. Each lookup is independent: a failure leaves that link's title as
//! it was and never affects other links.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::task::JoinSet;
use tuition_core::model::ProgressItem;

use crate::error::TitleLookupError;

pub const DEFAULT_NOEMBED_URL: &str = "https://noembed.com/embed";
const GOOGLE_DOCS_SUFFIX: &str = " - Google Docs";

/// Resolves a display title for a URL.
#[async_trait]
pub trait TitleResolver: Send + Sync {
    /// `Ok(None)` means the URL's host is not one this resolver handles.
    ///
    /// # Errors
    ///
    /// Returns `TitleLookupError` when a handled lookup fails.
    async fn resolve(&self, url: &str) -> Result<Option<String>, TitleLookupError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    GoogleDoc,
    YouTube,
    Other,
}

fn classify(url: &str) -> LinkKind {
    if url.contains("docs.google.com") {
        LinkKind::GoogleDoc
    } else if url.contains("youtube.com") || url.contains("youtu.be") {
        LinkKind::YouTube
    } else {
        LinkKind::Other
    }
}

/// Text of the first `<title>` element, with the Google Docs suffix removed.
fn extract_html_title(html: &str) -> Option<String> {
    // ASCII lower-casing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let content_start = open + lower[open..].find('>')? + 1;
    let content_end = content_start + lower[content_start..].find("</title>")?;

    let raw = html[content_start..content_end].trim();
    let title = raw.strip_suffix(GOOGLE_DOCS_SUFFIX).unwrap_or(raw).trim();
    let title = decode_entities(title).trim().to_owned();
    (!title.is_empty()).then_some(title)
}

/// Single-pass decode of character references; unknown ones are kept as-is.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 12)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[derive(Debug, Deserialize)]
struct NoembedResponse {
    title: Option<String>,
}

/// Fetches titles over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTitleResolver {
    client: Client,
    noembed_url: String,
}

impl HttpTitleResolver {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_noembed_url(client, DEFAULT_NOEMBED_URL)
    }

    #[must_use]
    pub fn with_noembed_url(client: Client, noembed_url: impl Into<String>) -> Self {
        Self {
            client,
            noembed_url: noembed_url.into(),
        }
    }

    async fn google_doc_title(&self, url: &str) -> Result<Option<String>, TitleLookupError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TitleLookupError::HttpStatus(response.status()));
        }
        let html = response.text().await?;
        extract_html_title(&html)
            .map(Some)
            .ok_or(TitleLookupError::MissingTitle)
    }

    async fn youtube_title(&self, url: &str) -> Result<Option<String>, TitleLookupError> {
        let endpoint = Url::parse_with_params(&self.noembed_url, &[("url", url)])
            .map_err(|_| TitleLookupError::MissingTitle)?;
        let response = self.client.get(endpoint).send().await?;
        if !response.status().is_success() {
            return Err(TitleLookupError::HttpStatus(response.status()));
        }
        let body: NoembedResponse = response.json().await?;
        body.title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .map(Some)
            .ok_or(TitleLookupError::MissingTitle)
    }
}

#[async_trait]
impl TitleResolver for HttpTitleResolver {
    async fn resolve(&self, url: &str) -> Result<Option<String>, TitleLookupError> {
        match classify(url) {
            LinkKind::GoogleDoc => self.google_doc_title(url).await,
            LinkKind::YouTube => self.youtube_title(url).await,
            LinkKind::Other => Ok(None),
        }
    }
}

/// Replaces URL-derived link titles with looked-up ones.
#[derive(Clone)]
pub struct LinkTitleService {
    resolver: Arc<dyn TitleResolver>,
}

impl LinkTitleService {
    #[must_use]
    pub fn new(resolver: Arc<dyn TitleResolver>) -> Self {
        Self { resolver }
    }

    /// Looks up every distinct URL whose title is still derived, concurrently.
    ///
    /// Links with an explicit title are left alone.
    pub async fn enrich(&self, items: &mut [ProgressItem]) {
        let mut pending: Vec<String> = Vec::new();
        for link in items.iter().flat_map(|item| item.resource_links.iter()) {
            if link.has_derived_title() && !pending.contains(&link.url) {
                pending.push(link.url.clone());
            }
        }
        if pending.is_empty() {
            return;
        }

        let mut lookups = JoinSet::new();
        for url in pending {
            let resolver = Arc::clone(&self.resolver);
            lookups.spawn(async move {
                let result = resolver.resolve(&url).await;
                (url, result)
            });
        }

        let mut titles: HashMap<String, String> = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((url, Ok(Some(title)))) => {
                    titles.insert(url, title);
                }
                Ok((_, Ok(None))) => {}
                Ok((url, Err(err))) => {
                    tracing::warn!(%url, error = %err, "link title lookup failed");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "link title task aborted");
                }
            }
        }

        for link in items.iter_mut().flat_map(|item| item.resource_links.iter_mut()) {
            if !link.has_derived_title() {
                continue;
            }
            if let Some(title) = titles.get(&link.url) {
                link.title.clone_from(title);
            }
        }
    }
}
