use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const COVERS_BASE: &str = "https://covers.openlibrary.org/b";
const USER_AGENT: &str = concat!("readlog/", env!("CARGO_PKG_VERSION"));

/// Finds cover art for books logged without one, using the OpenLibrary
/// search API.
#[derive(Clone)]
pub struct CoverLookup {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    cover_i: Option<i64>,
    #[serde(default)]
    isbn: Vec<String>,
}

impl CoverLookup {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn search_url(&self, title: &str, author: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))?.join("search.json")?;
        url.query_pairs_mut()
            .append_pair("title", title)
            .append_pair("author", author);
        Ok(url)
    }

    /// Best-effort lookup. Any failure is logged and yields `None`.
    pub async fn find_cover(&self, title: &str, author: &str) -> Option<String> {
        let url = match self.search_url(title, author) {
            Ok(url) => url,
            Err(err) => {
                warn!(base_url = %self.base_url, error = %err, "invalid cover lookup URL");
                return None;
            }
        };

        let response = match self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(title, error = %err, "cover lookup request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(title, status = %response.status(), "cover lookup returned non-success");
            return None;
        }

        let body: SearchResponse = match response.json().await {
            Ok(b) => b,
            Err(err) => {
                warn!(title, error = %err, "cover lookup returned malformed JSON");
                return None;
            }
        };

        let cover = cover_from_docs(&body.docs);
        debug!(title, found = cover.is_some(), "cover lookup finished");
        cover
    }
}

/// The first doc carrying a cover id or an ISBN wins; a cover id is preferred
/// over the ISBN within that doc.
fn cover_from_docs(docs: &[SearchDoc]) -> Option<String> {
    let doc = docs
        .iter()
        .find(|d| d.cover_i.is_some() || !d.isbn.is_empty())?;
    match (doc.cover_i, doc.isbn.first()) {
        (Some(id), _) => Some(format!("{COVERS_BASE}/id/{id}-L.jpg")),
        (None, Some(isbn)) => Some(format!("{COVERS_BASE}/isbn/{isbn}-L.jpg")),
        (None, None) => None,
    }
}
