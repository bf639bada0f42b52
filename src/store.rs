//! Page backend abstraction.
//!
//! The page session talks to three collaborators: a [`PageStore`] for page
//! CRUD, a [`ShareService`] that mints public links, and a [`FactChecker`]
//! that answers free text with an explanation. [`crate::client::HttpBackend`]
//! implements all three over HTTP; [`MemoryPageStore`] implements them in
//! process for tests and offline use.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::document::Document;
use crate::error::StoreError;

mod memory;

pub use memory::MemoryPageStore;

pub type PageId = i64;

/// Default page size for [`PageStore::list_pages`].
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Entry of the page list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: PageId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: PageId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Document,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl PageRecord {
    pub fn summary(&self) -> PageSummary {
        PageSummary {
            id: self.id,
            title: self.title.clone(),
            created_at: self.created_at,
        }
    }
}

/// Accepts RFC 3339 timestamps as well as the naive UTC timestamps some
/// backends emit. Anything unparsable reads as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Body of create and update requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDraft {
    pub title: String,
    pub content: Document,
}

/// Read-only view of a page reached through a share token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedPage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Document,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub share_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckRequest {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    pub explanation: String,
}

impl FactCheck {
    pub fn new(explanation: impl Into<String>) -> Self {
        Self {
            verdict: None,
            explanation: explanation.into(),
        }
    }

    pub fn with_verdict(mut self, verdict: impl Into<String>) -> Self {
        self.verdict = Some(verdict.into());
        self
    }

    /// Text placed into the annotation comment. The fact-check service only
    /// promises an explanation; prefixing a verdict when one is present is
    /// this crate's own presentation.
    pub fn comment_text(&self) -> String {
        match self.verdict.as_deref().map(str::trim) {
            Some(verdict) if !verdict.is_empty() => format!("{verdict}: {}", self.explanation),
            _ => self.explanation.clone(),
        }
    }
}

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn list_pages(&self, skip: usize, limit: usize) -> Result<Vec<PageSummary>, StoreError>;

    /// Fails with [`StoreError::NotFound`] for unknown ids.
    async fn load_page(&self, id: PageId) -> Result<PageRecord, StoreError>;

    /// Persists a new page and returns it with its server-assigned id.
    async fn create_page(&self, draft: PageDraft) -> Result<PageRecord, StoreError>;

    async fn update_page(&self, id: PageId, draft: PageDraft) -> Result<PageRecord, StoreError>;

    async fn delete_page(&self, id: PageId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ShareService: Send + Sync {
    /// Mints a share token for `id` and returns the URL the backend reports,
    /// which may be relative.
    async fn share_page(&self, id: PageId) -> Result<String, StoreError>;

    async fn fetch_shared(&self, token: &str) -> Result<SharedPage, StoreError>;
}

#[async_trait]
pub trait FactChecker: Send + Sync {
    async fn fact_check(&self, text: &str) -> Result<FactCheck, StoreError>;
}
