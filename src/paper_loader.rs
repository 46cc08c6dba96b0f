/*!
 * Paper acquisition.
 *
 * Resolves a user-supplied identifier into paper text. A URL is fetched
 * directly and dispatched on its declared content type. Anything else is
 * treated as a title and looked up on arXiv, taking the first hit.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use url::Url;

use crate::app_config::PaperConfig;
use crate::errors::LoaderError;

static ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<entry\b[^>]*>(.*?)</entry>").unwrap()
});

static LINK_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<link\b[^>]*>").unwrap()
});

static HREF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href\s*=\s*"([^"]+)""#).unwrap()
});

static ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<id>\s*([^<]+?)\s*</id>").unwrap()
});

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<title\b[^>]*>(.*?)</title>").unwrap()
});

/// Raw fetched document
#[derive(Debug, Clone, PartialEq)]
pub enum PaperContent {
    /// PDF bytes
    Pdf(Bytes),
    /// Decoded HTML page
    Html(String),
}

/// First result of an arXiv title search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivEntry {
    pub title: String,
    pub pdf_url: String,
}

/// Anything that can turn a URL or title into paper text
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Resolve `url_or_title` into plain paper text
    async fn load_text(&self, url_or_title: &str) -> Result<String, LoaderError>;
}

/// HTTP-backed paper loader
pub struct PaperLoader {
    client: Client,
    config: PaperConfig,
}

impl PaperLoader {
    pub fn new(config: PaperConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Whether the input should be fetched directly rather than searched
    pub fn looks_like_url(input: &str) -> bool {
        Url::parse(input.trim())
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    /// Fetch the raw document for a URL or title
    pub async fn fetch(&self, url_or_title: &str) -> Result<PaperContent, LoaderError> {
        let input = url_or_title.trim();
        if Self::looks_like_url(input) {
            self.fetch_url(input).await
        } else {
            let entry = self.search_arxiv(input).await?
                .ok_or_else(|| LoaderError::NotFound(format!("No paper found for title: '{}'", input)))?;
            info!("Found arXiv paper: {}", entry.title);
            let bytes = self.get(&entry.pdf_url).await?.bytes().await
                .map_err(|e| LoaderError::NotFound(format!("Error fetching paper: {}", e)))?;
            Ok(PaperContent::Pdf(bytes))
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, LoaderError> {
        debug!("GET {}", url);
        self.client.get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoaderError::NotFound(format!("Error fetching paper: {}", e)))
    }

    async fn fetch_url(&self, url: &str) -> Result<PaperContent, LoaderError> {
        let response = self.get(url).await?;
        let content_type = response.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if content_type.contains("application/pdf") {
            let bytes = response.bytes().await
                .map_err(|e| LoaderError::NotFound(format!("Error fetching paper: {}", e)))?;
            Ok(PaperContent::Pdf(bytes))
        } else if content_type.contains("text/html") {
            let text = response.text().await
                .map_err(|e| LoaderError::NotFound(format!("Error fetching paper: {}", e)))?;
            Ok(PaperContent::Html(text))
        } else {
            Err(LoaderError::UnsupportedContentType(content_type))
        }
    }

    /// Search arXiv by title and return the first hit, if any
    pub async fn search_arxiv(&self, title: &str) -> Result<Option<ArxivEntry>, LoaderError> {
        let url = Url::parse_with_params(
            &self.config.arxiv_endpoint,
            &[("search_query", title), ("start", "0"), ("max_results", "1")],
        )
        .map_err(|e| LoaderError::NotFound(format!("Invalid arXiv endpoint: {}", e)))?;

        let feed = self.get(url.as_str()).await?.text().await
            .map_err(|e| LoaderError::NotFound(format!("Error fetching paper: {}", e)))?;

        Ok(parse_search_feed(&feed))
    }

    /// Turn a fetched document into plain text
    pub async fn extract_text(&self, content: PaperContent) -> Result<String, LoaderError> {
        let text = match content {
            PaperContent::Pdf(bytes) => self.extract_pdf_text(bytes).await?,
            PaperContent::Html(html) => extract_html_text(&html),
        };

        if text.trim().is_empty() {
            return Err(LoaderError::Extraction("Document contains no extractable text".to_string()));
        }
        Ok(text)
    }

    async fn extract_pdf_text(&self, bytes: Bytes) -> Result<String, LoaderError> {
        let command = &self.config.pdftotext_command;
        let mut child = Command::new(command)
            .args(["-q", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LoaderError::Extraction(format!("Failed to execute {}: {}", command, e)))?;

        // Feed stdin from a separate task so a full stdout pipe cannot deadlock us
        let stdin = child.stdin.take();
        let writer = tokio::spawn(async move {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(&bytes).await;
            }
        });

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| LoaderError::Extraction(format!("{} timed out", command)))?
            .map_err(|e| LoaderError::Extraction(format!("{} failed: {}", command, e)))?;
        let _ = writer.await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LoaderError::Extraction(format!("{} failed: {}", command, stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl PaperSource for PaperLoader {
    async fn load_text(&self, url_or_title: &str) -> Result<String, LoaderError> {
        let content = self.fetch(url_or_title).await?;
        self.extract_text(content).await
    }
}

/// Join the text of every `<p>` element with single spaces
pub fn extract_html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    document.select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull the first entry out of an arXiv Atom feed
pub fn parse_search_feed(feed: &str) -> Option<ArxivEntry> {
    let entry = ENTRY_REGEX.captures(feed)?.get(1)?.as_str();

    let title = TITLE_REGEX.captures(entry)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let pdf_link = LINK_TAG_REGEX.find_iter(entry)
        .map(|m| m.as_str())
        .filter(|tag| tag.contains(r#"title="pdf""#))
        .find_map(|tag| HREF_REGEX.captures(tag).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()));

    let pdf_url = match pdf_link {
        Some(link) => link,
        None => {
            let id = ID_REGEX.captures(entry)?.get(1)?.as_str();
            id.replacen("/abs/", "/pdf/", 1)
        }
    };

    Some(ArxivEntry { title, pdf_url })
}
