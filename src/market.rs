//! Theme market feed.
//!
//! The market publishes its themes as an RSS 2.0 channel. Each `<item>`
//! carries the usual RSS fields plus a `<version>` element.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use xmltree::{Element, XMLNode};

use crate::config::MarketConfig;
use crate::error::{BcError, Result};

/// One theme listed in the market feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketTheme {
    pub title: String,
    pub version: Option<String>,
    pub category: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

/// Where to read the feed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// `file://` URLs and plain paths read from disk; anything else is
    /// fetched over HTTP.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if let Some(path) = location.strip_prefix("file://") {
            return Self::File(PathBuf::from(path));
        }
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

pub struct MarketClient {
    client: reqwest::blocking::Client,
    source: FeedSource,
}

impl MarketClient {
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        Self::new(FeedSource::parse(&config.url), config.timeout_secs)
    }

    pub fn new(source: FeedSource, timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bctheme/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| BcError::Network(format!("market http client: {err}")))?;
        Ok(Self { client, source })
    }

    /// Fetch and parse the feed.
    pub fn themes(&self) -> Result<Vec<MarketTheme>> {
        let body = match &self.source {
            FeedSource::Url(url) => self.fetch(url)?,
            FeedSource::File(path) => read_feed_file(path)?,
        };
        let themes = parse_feed(&body)?;
        info!(count = themes.len(), "loaded market themes");
        Ok(themes)
    }

    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "fetching market feed");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| BcError::Network(format!("market request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(BcError::Network(format!("market feed HTTP {}", response.status())));
        }
        Ok(response.text()?)
    }
}

fn read_feed_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(BcError::NotFound(format!("market feed {}", path.display())));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse an RSS 2.0 document into market themes, in feed order. Items
/// without a title are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<MarketTheme>> {
    let root = Element::parse(Cursor::new(xml.as_bytes()))?;
    if root.name != "rss" {
        return Err(BcError::Serialization(format!(
            "market feed root must be <rss>, found <{}>",
            root.name
        )));
    }
    let channel = root
        .get_child("channel")
        .ok_or_else(|| BcError::Serialization("market feed has no <channel>".to_string()))?;

    let mut themes = Vec::new();
    for item in child_elements(channel, "item") {
        let Some(title) = child_text(item, "title") else {
            warn!(link = ?child_text(item, "link"), "skipping market item without a title");
            continue;
        };
        themes.push(MarketTheme {
            title,
            version: child_text(item, "version"),
            category: child_text(item, "category"),
            link: child_text(item, "link"),
            description: child_text(item, "description"),
            pub_date: child_text(item, "pubDate"),
        });
    }
    Ok(themes)
}

fn child_elements<'e>(parent: &'e Element, name: &'e str) -> impl Iterator<Item = &'e Element> {
    parent.children.iter().filter_map(move |node| match node {
        XMLNode::Element(el) if el.name == name => Some(el),
        _ => None,
    })
}

/// Trimmed text and CDATA content of the first `name` child; `None` when
/// missing or blank.
fn child_text(parent: &Element, name: &str) -> Option<String> {
    let el = parent.get_child(name)?;
    let mut text = String::new();
    for node in &el.children {
        match node {
            XMLNode::Text(value) | XMLNode::CData(value) => text.push_str(value),
            _ => {}
        }
    }
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
