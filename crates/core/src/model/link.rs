use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// A learner-facing resource: a URL plus a human-readable title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub url: String,
    pub title: String,
}

impl ResourceLink {
    /// Builds a link whose title is derived from the URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let title = derive_title(&url);
        Self { url, title }
    }

    /// Builds a link with an explicit title, deriving one if the title is blank.
    #[must_use]
    pub fn with_title(url: impl Into<String>, title: Option<&str>) -> Self {
        let url = url.into();
        match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => Self {
                title: title.to_owned(),
                url,
            },
            None => Self::from_url(url),
        }
    }

    /// True when the title is still the one derived from the URL, i.e. a
    /// friendlier title may be looked up.
    #[must_use]
    pub fn has_derived_title(&self) -> bool {
        self.title == derive_title(&self.url)
    }
}

/// Every encoding a spreadsheet cell or upstream JSON may use for links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawLinks {
    /// A single cell with comma- or newline-separated URLs.
    Text(String),
    /// A list of bare URLs and/or `{url, title}` records.
    Items(Vec<RawLink>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawLink {
    Url(String),
    Record {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl RawLinks {
    /// Normalizes any encoding to ordered `{url, title}` records.
    ///
    /// Blank URLs are dropped; order is preserved.
    #[must_use]
    pub fn normalize(self) -> Vec<ResourceLink> {
        match self {
            Self::Text(cell) => split_link_cell(&cell),
            Self::Items(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    RawLink::Url(url) => {
                        let url = url.trim();
                        (!url.is_empty()).then(|| ResourceLink::from_url(url))
                    }
                    RawLink::Record { url, title } => {
                        let url = url.trim();
                        (!url.is_empty()).then(|| ResourceLink::with_title(url, title.as_deref()))
                    }
                })
                .collect(),
        }
    }
}

/// `deserialize_with` adapter accepting every [`RawLinks`] encoding; `null`
/// is an empty list.
///
/// # Errors
///
/// Fails only when the value is none of the accepted shapes.
pub fn deserialize_links<'de, D>(deserializer: D) -> Result<Vec<ResourceLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLinks>::deserialize(deserializer)?;
    Ok(raw.map(RawLinks::normalize).unwrap_or_default())
}

/// Normalizes a raw cell into link records.
///
/// A cell holding a JSON array (`["https://…", {"url": …, "title": …}]`) is
/// read as a list of URLs and records; anything else is split on commas and
/// newlines.
#[must_use]
pub fn normalize_resource_links(raw: &str) -> Vec<ResourceLink> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<RawLink>>(trimmed) {
            return RawLinks::Items(items).normalize();
        }
    }
    split_link_cell(raw)
}

fn split_link_cell(raw: &str) -> Vec<ResourceLink> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ResourceLink::from_url)
        .collect()
}

/// Display title for a URL: its last path segment with `-`/`_` turned into
/// spaces, or the URL itself when there is no usable segment.
#[must_use]
pub fn derive_title(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_owned),
        // Scheme-less input such as `example.com/scales`: the first piece is
        // the host, not a path segment.
        Err(_) => {
            let mut pieces = url.split('/').filter(|s| !s.is_empty());
            pieces.next();
            pieces
                .last()
                .and_then(|s| s.split(['?', '#']).next())
                .map(str::to_owned)
        }
    };

    segment
        .map(|s| percent_decode_str(&s).decode_utf8_lossy().into_owned())
        .map(|s| s.replace(['-', '_'], " ").trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| url.to_owned())
}
