use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Duration;

use crate::error::ScryfallError;
use crate::rate_limit::RateLimiter;
use crate::source::CollectionResult;
use crate::types::{
    CatalogResponse, CollectionIdentifier, ListResponse, ScryfallCard, SearchPage, error_object,
};

const BASE_URL: &str = "https://api.scryfall.com";
const USER_AGENT: &str = concat!("cardex/", env!("CARGO_PKG_VERSION"));

/// Minimum spacing between catalog requests, shared by every caller.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum identifiers accepted by one collection request.
pub const MAX_COLLECTION_BATCH: usize = 75;

/// Upper bound on pages followed when listing printings.
const MAX_PRINTING_PAGES: u32 = 10;

/// Connection settings for [`ScryfallClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub min_request_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            min_request_interval: MIN_REQUEST_INTERVAL,
        }
    }
}

/// HTTP client for the card catalog with process-wide rate limiting.
///
/// Clones share the same connection pool and rate limiter.
#[derive(Clone)]
pub struct ScryfallClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl ScryfallClient {
    pub fn new(options: ClientOptions) -> Result<Self, ScryfallError> {
        if options.base_url.is_empty() {
            return Err(ScryfallError::Config("base URL must not be empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            limiter: Arc::new(RateLimiter::new(options.min_request_interval)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a card by catalog id.
    pub async fn get_card(&self, id: &str) -> Result<Option<ScryfallCard>, ScryfallError> {
        let path = format!("/cards/{id}");
        self.get_typed(&path, &[]).await
    }

    /// Fetch a card by name, either exactly or with fuzzy matching.
    pub async fn get_card_by_name(
        &self,
        name: &str,
        fuzzy: bool,
    ) -> Result<Option<ScryfallCard>, ScryfallError> {
        let mode = if fuzzy { "fuzzy" } else { "exact" };
        self.get_typed("/cards/named", &[(mode, name)]).await
    }

    /// Fetch many cards by id. Ids the catalog does not know are omitted.
    pub async fn get_cards_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<ScryfallCard>, ScryfallError> {
        let identifiers: Vec<_> = ids
            .iter()
            .map(|id| CollectionIdentifier::Id { id: id.clone() })
            .collect();
        Ok(self.fetch_collection(&identifiers).await?.cards)
    }

    /// Fetch many cards by exact name.
    pub async fn get_cards_by_names(
        &self,
        names: &[String],
    ) -> Result<CollectionResult, ScryfallError> {
        let identifiers: Vec<_> = names
            .iter()
            .map(|name| CollectionIdentifier::Name { name: name.clone() })
            .collect();
        self.fetch_collection(&identifiers).await
    }

    /// Name completions for a partial query. Queries shorter than two
    /// characters yield nothing without contacting the catalog.
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ScryfallError> {
        if query.trim().chars().count() < 2 {
            return Ok(Vec::new());
        }
        let catalog: Option<CatalogResponse> =
            self.get_typed("/cards/autocomplete", &[("q", query.trim())]).await?;
        Ok(catalog.map(|c| c.data).unwrap_or_default())
    }

    /// One page of a full-text search. A query with no matches is an empty page.
    pub async fn search_cards(&self, query: &str, page: u32) -> Result<SearchPage, ScryfallError> {
        let page = page.max(1).to_string();
        self.search(&[("q", query), ("page", &page)]).await
    }

    /// Every printing sharing an oracle id, oldest first.
    pub async fn get_card_printings(
        &self,
        oracle_id: &str,
    ) -> Result<Vec<ScryfallCard>, ScryfallError> {
        let query = format!("oracleid:{oracle_id}");
        let mut printings = Vec::new();
        for page in 1..=MAX_PRINTING_PAGES {
            let page_str = page.to_string();
            let result = self
                .search(&[
                    ("q", query.as_str()),
                    ("unique", "prints"),
                    ("order", "released"),
                    ("dir", "asc"),
                    ("page", &page_str),
                ])
                .await?;
            printings.extend(result.cards);
            if !result.has_more {
                break;
            }
        }
        Ok(printings)
    }

    /// Download image bytes. Image hosts are not subject to the catalog's
    /// rate limit; the whole transfer is cancelled once `timeout` elapses.
    pub async fn download_image(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, ScryfallError> {
        let fetch = async {
            let resp = self.http.get(url).send().await?.error_for_status()?;
            Ok::<_, ScryfallError>(resp.bytes().await?.to_vec())
        };
        match tokio::time::timeout(timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(ScryfallError::Timeout(timeout)),
        }
    }

    // ── Internals ──────────────────────────────────────────────────────────

    async fn search(&self, params: &[(&str, &str)]) -> Result<SearchPage, ScryfallError> {
        let list: Option<ListResponse<ScryfallCard>> =
            self.get_typed("/cards/search", params).await?;
        Ok(list
            .map(|l| SearchPage {
                total_cards: l.total_cards.unwrap_or(l.data.len() as u32),
                has_more: l.has_more,
                cards: l.data,
            })
            .unwrap_or_default())
    }

    async fn fetch_collection(
        &self,
        identifiers: &[CollectionIdentifier],
    ) -> Result<CollectionResult, ScryfallError> {
        let mut result = CollectionResult::default();
        for body in collection_bodies(identifiers) {
            self.limiter.wait().await;
            log::debug!(
                "POST /cards/collection with {} identifiers",
                body["identifiers"].as_array().map_or(0, Vec::len)
            );
            let resp = self
                .http
                .post(format!("{}/cards/collection", self.base_url))
                .json(&body)
                .send()
                .await?;
            let Some(value) = read_response(resp).await? else {
                continue;
            };
            let list: ListResponse<ScryfallCard> = serde_json::from_value(value)?;
            result.cards.extend(list.data);
            result
                .not_found
                .extend(list.not_found.iter().filter_map(identifier_label));
        }
        Ok(result)
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, ScryfallError> {
        self.limiter.wait().await;
        log::debug!("GET {path}");
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .send()
            .await?;
        match read_response(resp).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

async fn read_response(resp: reqwest::Response) -> Result<Option<Value>, ScryfallError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ScryfallError::RateLimit);
    }
    let text = resp.text().await?;
    interpret_body(status.as_u16(), &text)
}

/// Classify a response body. Error objects are recognized by shape; a
/// not-found error becomes `Ok(None)` rather than an error.
pub(crate) fn interpret_body(status: u16, text: &str) -> Result<Option<Value>, ScryfallError> {
    let success = (200..300).contains(&status);
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) if status == 404 => return Ok(None),
        Err(_) if !success => {
            return Err(ScryfallError::ServerError {
                status,
                message: snippet(text),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(err) = error_object(&value) {
        if err.is_not_found() {
            return Ok(None);
        }
        return Err(ScryfallError::Api {
            status: err.status,
            code: err.code,
            details: err.details,
        });
    }

    if status == 404 {
        return Ok(None);
    }
    if !success {
        return Err(ScryfallError::ServerError {
            status,
            message: snippet(text),
        });
    }
    Ok(Some(value))
}

/// Split identifiers into request bodies of at most [`MAX_COLLECTION_BATCH`].
pub(crate) fn collection_bodies(identifiers: &[CollectionIdentifier]) -> Vec<Value> {
    identifiers
        .chunks(MAX_COLLECTION_BATCH)
        .map(|chunk| serde_json::json!({ "identifiers": chunk }))
        .collect()
}

/// Render a `not_found` identifier back to the id or name that was asked for.
fn identifier_label(value: &Value) -> Option<String> {
    value
        .get("name")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
