use anyhow::Context as _;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;
use url::Url;

use crate::error::LoadError;

/// JSON client for the content API rooted at `base_url`.
///
/// One attempt per call: no retries, no timeout beyond reqwest's defaults.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl Fetcher {
    pub fn new(base_url: Url, user_agent: &str) -> anyhow::Result<Self> {
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base url {} cannot carry a post slug", base_url);
        }
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client, base_url })
    }

    /// `<base>` — the whole collection.
    pub fn collection_url(&self) -> Url {
        self.base_url.clone()
    }

    /// `<base>/<slug>`, with the slug encoded as a single path segment.
    pub fn post_url(&self, slug: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(slug);
        }
        url
    }

    /// GETs `url` and parses the body as JSON.
    ///
    /// Anything but 200 is an error. A blank body is `Ok(None)`.
    pub async fn get_json(&self, url: Url) -> Result<Option<Value>, LoadError> {
        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(LoadError::transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            tracing::debug!(%url, %status, "unexpected status");
            return Err(LoadError::UnexpectedStatus(status.as_u16()));
        }

        let bytes: Bytes = resp.bytes().await.map_err(LoadError::transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| LoadError::Decode(err.to_string()))
    }
}
