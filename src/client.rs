//! HTTP implementation of the page backend.
//!
//! Routes follow the REST API served by the page backend:
//! `/pages/` for page CRUD, `/pages/{id}/share` for share links,
//! `/public/{token}` for shared pages and `/fact-check` for annotations.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::StoreError;
use crate::store::{
    FactCheck, FactCheckRequest, FactChecker, PageDraft, PageId, PageRecord, PageStore,
    PageSummary, ShareLink, ShareService, SharedPage,
};

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| StoreError::network(err.to_string()))?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

/// How a non-success status should be reported for a given route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OnFailure {
    /// Any failure means the resource is not available.
    NotFound,
    Status,
}

async fn check(
    response: Result<Response, reqwest::Error>,
    what: &str,
    on_failure: OnFailure,
) -> Result<Response, StoreError> {
    let response = response.map_err(|err| StoreError::network(err.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(%status, what, "backend request failed");
    Err(status_error(status, body, what, on_failure))
}

fn status_error(status: StatusCode, body: String, what: &str, on_failure: OnFailure) -> StoreError {
    if on_failure == OnFailure::NotFound || status == StatusCode::NOT_FOUND {
        return StoreError::not_found(what);
    }
    StoreError::Status {
        status: status.as_u16(),
        message: body,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| StoreError::network(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| StoreError::Decode(err.to_string()))
}

#[async_trait]
impl PageStore for HttpBackend {
    async fn list_pages(&self, skip: usize, limit: usize) -> Result<Vec<PageSummary>, StoreError> {
        let response = self
            .client
            .get(self.url("/pages/"))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await;
        let response = check(response, "page list", OnFailure::Status).await?;
        decode(response).await
    }

    async fn load_page(&self, id: PageId) -> Result<PageRecord, StoreError> {
        let response = self.client.get(self.url(&format!("/pages/{id}"))).send().await;
        let response = check(response, &format!("page {id}"), OnFailure::NotFound).await?;
        decode(response).await
    }

    async fn create_page(&self, draft: PageDraft) -> Result<PageRecord, StoreError> {
        let response = self
            .client
            .post(self.url("/pages/"))
            .json(&draft)
            .send()
            .await;
        let response = check(response, "new page", OnFailure::Status).await?;
        decode(response).await
    }

    async fn update_page(&self, id: PageId, draft: PageDraft) -> Result<PageRecord, StoreError> {
        let response = self
            .client
            .put(self.url(&format!("/pages/{id}")))
            .json(&draft)
            .send()
            .await;
        let response = check(response, &format!("page {id}"), OnFailure::Status).await?;
        decode(response).await
    }

    async fn delete_page(&self, id: PageId) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/pages/{id}")))
            .send()
            .await;
        check(response, &format!("page {id}"), OnFailure::Status).await?;
        Ok(())
    }
}

#[async_trait]
impl ShareService for HttpBackend {
    async fn share_page(&self, id: PageId) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.url(&format!("/pages/{id}/share")))
            .send()
            .await;
        let response = check(response, &format!("page {id}"), OnFailure::Status).await?;
        let link: ShareLink = decode(response).await?;
        Ok(link.share_url)
    }

    async fn fetch_shared(&self, token: &str) -> Result<SharedPage, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("/public/{token}")))
            .send()
            .await;
        let response = check(response, "shared page", OnFailure::NotFound).await?;
        decode(response).await
    }
}

#[async_trait]
impl FactChecker for HttpBackend {
    async fn fact_check(&self, text: &str) -> Result<FactCheck, StoreError> {
        let response = self
            .client
            .post(self.url("/fact-check"))
            .json(&FactCheckRequest {
                text: text.to_string(),
            })
            .send()
            .await;
        let response = check(response, "fact-check", OnFailure::Status).await?;
        decode(response).await
    }
}
