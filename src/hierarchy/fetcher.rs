//! Resolves a hierarchy source string (URL, local path or inline markup) into a
//! parsed [`HierarchyDocument`].
//!
//! Resolution order is fixed: an `http://`/`https://` prefix always means a
//! URL, then an existing regular file means a path, and anything else is
//! taken as the markup itself.
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::errors::{PopSentryError, PopSentryResult};
use crate::hierarchy::parser::parse_hierarchy;
use crate::hierarchy::types::HierarchyDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchySource {
    Url(String),
    File(PathBuf),
    Inline(String),
}

impl HierarchySource {
    pub fn resolve(source: &str) -> Self {
        if is_url(source) {
            HierarchySource::Url(source.to_string())
        } else if Path::new(source).is_file() {
            HierarchySource::File(PathBuf::from(source))
        } else {
            HierarchySource::Inline(source.to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HierarchySource::Url(_) => "url",
            HierarchySource::File(_) => "file",
            HierarchySource::Inline(_) => "inline",
        }
    }
}

pub(crate) fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads hierarchy markup. Holds configuration only; each URL fetch builds its own
/// blocking client so the fetcher can be created anywhere, including inside an
/// async context, as long as `fetch` itself runs on a blocking thread.
#[derive(Debug, Clone, Default)]
pub struct HierarchyFetcher {
    config: FetchConfig,
}

impl HierarchyFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Resolve, read and parse `source`.
    pub fn load(&self, source: &str) -> PopSentryResult<HierarchyDocument> {
        let resolved = HierarchySource::resolve(source);
        tracing::debug!(kind = resolved.kind(), "hierarchy source resolved");
        let markup = self.fetch(&resolved)?;
        parse_hierarchy(&markup)
    }

    /// Raw markup for a resolved source. Network and filesystem failures are
    /// [`PopSentryError::Fetch`].
    pub fn fetch(&self, source: &HierarchySource) -> PopSentryResult<String> {
        match source {
            HierarchySource::Url(url) => self.fetch_url(url),
            HierarchySource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                PopSentryError::Fetch(format!("cannot read {}: {e}", path.display()))
            }),
            HierarchySource::Inline(markup) => Ok(markup.clone()),
        }
    }

    fn fetch_url(&self, url: &str) -> PopSentryResult<String> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = self.config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &self.config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| PopSentryError::Fetch(format!("HTTP client setup failed: {e}")))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| PopSentryError::Fetch(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PopSentryError::Fetch(format!("GET {url} returned {status}")));
        }

        let body = response
            .text()
            .map_err(|e| PopSentryError::Fetch(format!("reading body of {url} failed: {e}")))?;
        tracing::debug!(url = %url, bytes = body.len(), "hierarchy downloaded");
        Ok(body)
    }
}
