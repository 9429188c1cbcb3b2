use std::time::Duration;

use async_trait::async_trait;

use crate::client::ScryfallClient;
use crate::error::ScryfallError;
use crate::types::ScryfallCard;

/// Cards returned by a batch name lookup, plus the names the catalog did not
/// recognize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionResult {
    pub cards: Vec<ScryfallCard>,
    pub not_found: Vec<String>,
}

/// The catalog operations the cache and importers depend on.
///
/// [`ScryfallClient`] is the production implementation; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn get_card(&self, id: &str) -> Result<Option<ScryfallCard>, ScryfallError>;

    async fn get_card_by_name(
        &self,
        name: &str,
        fuzzy: bool,
    ) -> Result<Option<ScryfallCard>, ScryfallError>;

    async fn get_cards_by_ids(&self, ids: &[String]) -> Result<Vec<ScryfallCard>, ScryfallError>;

    async fn get_cards_by_names(&self, names: &[String])
    -> Result<CollectionResult, ScryfallError>;

    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ScryfallError>;

    async fn download_image(&self, url: &str, timeout: Duration)
    -> Result<Vec<u8>, ScryfallError>;
}

#[async_trait]
impl CatalogSource for ScryfallClient {
    async fn get_card(&self, id: &str) -> Result<Option<ScryfallCard>, ScryfallError> {
        ScryfallClient::get_card(self, id).await
    }

    async fn get_card_by_name(
        &self,
        name: &str,
        fuzzy: bool,
    ) -> Result<Option<ScryfallCard>, ScryfallError> {
        ScryfallClient::get_card_by_name(self, name, fuzzy).await
    }

    async fn get_cards_by_ids(&self, ids: &[String]) -> Result<Vec<ScryfallCard>, ScryfallError> {
        ScryfallClient::get_cards_by_ids(self, ids).await
    }

    async fn get_cards_by_names(
        &self,
        names: &[String],
    ) -> Result<CollectionResult, ScryfallError> {
        ScryfallClient::get_cards_by_names(self, names).await
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ScryfallError> {
        ScryfallClient::autocomplete(self, query).await
    }

    async fn download_image(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, ScryfallError> {
        ScryfallClient::download_image(self, url, timeout).await
    }
}
