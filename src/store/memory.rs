use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    FactCheck, FactChecker, PageDraft, PageId, PageRecord, PageStore, PageSummary, ShareService,
    SharedPage,
};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    pages: BTreeMap<PageId, PageRecord>,
    shares: HashMap<String, PageId>,
    next_id: PageId,
    requests: usize,
    fail_next: Option<StoreError>,
    fact_check: Option<FactCheck>,
}

impl MemoryState {
    /// Counts the request and hands back an injected failure, if any.
    fn begin_request(&mut self) -> Result<(), StoreError> {
        self.requests += 1;
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// In-process backend used by tests and by the CLI when no server is
/// configured. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryPageStore {
    state: Mutex<MemoryState>,
}

impl Default for MemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    /// Number of backend calls served so far, failed ones included.
    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests
    }

    /// Makes the next call fail with `err`.
    pub async fn fail_next(&self, err: StoreError) {
        self.state.lock().await.fail_next = Some(err);
    }

    /// Fixes the answer returned by [`FactChecker::fact_check`]. Without one,
    /// the store answers with an "Uncertain" verdict.
    pub async fn set_fact_check(&self, answer: FactCheck) {
        self.state.lock().await.fact_check = Some(answer);
    }

    pub async fn page(&self, id: PageId) -> Option<PageRecord> {
        self.state.lock().await.pages.get(&id).cloned()
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn list_pages(&self, skip: usize, limit: usize) -> Result<Vec<PageSummary>, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        Ok(state
            .pages
            .values()
            .skip(skip)
            .take(limit)
            .map(PageRecord::summary)
            .collect())
    }

    async fn load_page(&self, id: PageId) -> Result<PageRecord, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        state
            .pages
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("page {id}")))
    }

    async fn create_page(&self, draft: PageDraft) -> Result<PageRecord, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        let id = state.next_id;
        state.next_id += 1;
        let record = PageRecord {
            id,
            title: Some(draft.title),
            content: draft.content,
            created_at: Some(Utc::now()),
        };
        state.pages.insert(id, record.clone());
        Ok(record)
    }

    async fn update_page(&self, id: PageId, draft: PageDraft) -> Result<PageRecord, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        let record = state
            .pages
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("page {id}")))?;
        record.title = Some(draft.title);
        record.content = draft.content;
        Ok(record.clone())
    }

    async fn delete_page(&self, id: PageId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        if state.pages.remove(&id).is_none() {
            return Err(StoreError::not_found(format!("page {id}")));
        }
        state.shares.retain(|_, page| *page != id);
        Ok(())
    }
}

#[async_trait]
impl ShareService for MemoryPageStore {
    async fn share_page(&self, id: PageId) -> Result<String, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        if !state.pages.contains_key(&id) {
            return Err(StoreError::not_found(format!("page {id}")));
        }
        let existing = state
            .shares
            .iter()
            .find(|(_, page)| **page == id)
            .map(|(token, _)| token.clone());
        let token = match existing {
            Some(token) => token,
            None => {
                let token = Uuid::new_v4().simple().to_string();
                state.shares.insert(token.clone(), id);
                token
            }
        };
        Ok(format!("/share/{token}"))
    }

    async fn fetch_shared(&self, token: &str) -> Result<SharedPage, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        let page = state
            .shares
            .get(token)
            .and_then(|id| state.pages.get(id))
            .ok_or_else(|| StoreError::not_found("shared page"))?;
        Ok(SharedPage {
            title: page.title.clone(),
            content: page.content.clone(),
        })
    }
}

#[async_trait]
impl FactChecker for MemoryPageStore {
    async fn fact_check(&self, text: &str) -> Result<FactCheck, StoreError> {
        let mut state = self.state.lock().await;
        state.begin_request()?;
        Ok(state.fact_check.clone().unwrap_or_else(|| {
            FactCheck::new(format!("No sources found for \"{text}\".")).with_verdict("Uncertain")
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::{Document, Node};

    fn draft(title: &str) -> PageDraft {
        PageDraft {
            title: title.to_string(),
            content: Document::with_blocks(vec![Node::paragraph(title)]),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryPageStore::new();
        let first = store.create_page(draft("one")).await.unwrap();
        let second = store.create_page(draft("two")).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert!(first.created_at.is_some());
    }

    #[tokio::test]
    async fn list_pages_pages_through_records() {
        let store = MemoryPageStore::new();
        for title in ["a", "b", "c"] {
            store.create_page(draft(title)).await.unwrap();
        }

        let ids: Vec<PageId> = store
            .list_pages(1, 5)
            .await
            .unwrap()
            .into_iter()
            .map(|page| page.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn missing_pages_are_not_found() {
        let store = MemoryPageStore::new();

        assert!(matches!(
            store.load_page(7).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_page(7, draft("x")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_page(7).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn share_tokens_are_stable_and_dropped_on_delete() {
        let store = MemoryPageStore::new();
        let page = store.create_page(draft("shared")).await.unwrap();

        let url = store.share_page(page.id).await.unwrap();
        assert_eq!(store.share_page(page.id).await.unwrap(), url);

        let token = url.trim_start_matches("/share/");
        let shared = store.fetch_shared(token).await.unwrap();
        assert_eq!(shared.title.as_deref(), Some("shared"));

        store.delete_page(page.id).await.unwrap();
        assert!(matches!(
            store.fetch_shared(token).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn injected_failure_hits_next_call_only() {
        let store = MemoryPageStore::new();
        store.fail_next(StoreError::network("offline")).await;

        assert_eq!(
            store.list_pages(0, 10).await,
            Err(StoreError::network("offline"))
        );
        assert_eq!(store.list_pages(0, 10).await, Ok(Vec::new()));
        assert_eq!(store.request_count().await, 2);
    }

    #[test]
    fn comment_text_prefixes_verdict() {
        assert_eq!(
            FactCheck::new("Paris is the capital.")
                .with_verdict("True")
                .comment_text(),
            "True: Paris is the capital."
        );
        assert_eq!(FactCheck::new("Unclear.").comment_text(), "Unclear.");
        assert_eq!(
            FactCheck::new("Blank.").with_verdict("  ").comment_text(),
            "Blank."
        );
    }
}
