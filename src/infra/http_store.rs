use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::model::id::RecordId;
use crate::domain::model::record::BorrowRecord;
use crate::domain::repository::BorrowRepository;

#[derive(Debug, thiserror::Error)]
pub enum HttpStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// RESTコレクション（`GET/POST {base}/{collection}`, `PUT/DELETE {base}/{collection}/{id}`）
/// によるBorrowRepository実装。非2xxとJSON不正はすべて `HttpStoreError::Http` になる。
pub struct HttpBorrowRepository {
    client: Client,
    collection_url: Url,
}

impl HttpBorrowRepository {
    pub fn new(
        base_url: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, HttpStoreError> {
        let invalid = |reason: String| HttpStoreError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let mut collection_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        collection_url
            .path_segments_mut()
            .map_err(|()| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(collection.split('/').filter(|s| !s.is_empty()));

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            collection_url,
        })
    }

    pub fn collection_url(&self) -> &str {
        self.collection_url.as_str()
    }

    /// idは1つのパスセグメントとしてエスケープする（`/` `?` `#` を含んでもよい）。
    fn item_url(&self, id: &RecordId) -> Url {
        let mut url = self.collection_url.clone();
        // newで検証済みなので常にOk
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }
}

#[async_trait]
impl BorrowRepository for HttpBorrowRepository {
    type Error = HttpStoreError;

    async fn list(&self) -> Result<Vec<BorrowRecord>, Self::Error> {
        let records: Vec<BorrowRecord> = self
            .client
            .get(self.collection_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records)
    }

    async fn create(&self, record: &BorrowRecord) -> Result<BorrowRecord, Self::Error> {
        let created: BorrowRecord = self
            .client
            .post(self.collection_url.clone())
            .json(record)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: &RecordId,
        record: &BorrowRecord,
    ) -> Result<BorrowRecord, Self::Error> {
        let saved: BorrowRecord = self
            .client
            .put(self.item_url(id))
            .json(record)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(saved)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), Self::Error> {
        self.client
            .delete(self.item_url(id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(base: &str, collection: &str) -> HttpBorrowRepository {
        HttpBorrowRepository::new(base, collection, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn builds_collection_and_item_urls() {
        let r = repo("http://localhost:3000/", "/borrowList");
        assert_eq!(r.collection_url(), "http://localhost:3000/borrowList");
        assert_eq!(
            r.item_url(&RecordId::from(12)).as_str(),
            "http://localhost:3000/borrowList/12"
        );
        assert_eq!(
            r.item_url(&RecordId::from("a9f1")).as_str(),
            "http://localhost:3000/borrowList/a9f1"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let r = repo("http://localhost:3000/api/", "borrowList");
        assert_eq!(r.collection_url(), "http://localhost:3000/api/borrowList");
    }

    #[test]
    fn escapes_reserved_characters_in_ids() {
        let r = repo("http://localhost:3000", "borrowList");
        let url = r.item_url(&RecordId::from("a/b?c#d"));
        assert_eq!(url.as_str(), "http://localhost:3000/borrowList/a%2Fb%3Fc%23d");
        assert_eq!(url.path_segments().unwrap().count(), 2);
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn rejects_non_hierarchical_base_url() {
        let result = HttpBorrowRepository::new("mailto:a@b.c", "borrowList", Duration::from_secs(1));
        assert!(matches!(result, Err(HttpStoreError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn rejects_relative_base_url() {
        let result = HttpBorrowRepository::new("localhost", "borrowList", Duration::from_secs(1));
        assert!(matches!(result, Err(HttpStoreError::InvalidBaseUrl { .. })));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        // 127.0.0.1:9 (discard) は通常待ち受けていない
        let r = repo("http://127.0.0.1:9", "borrowList");
        assert!(r.list().await.is_err());
    }
}
