//! The editing session: one page, its lifecycle, and everything the user
//! has open around it.
//!
//! All state that outlives a single call lives on [`PageSession`]. Network
//! work is split in two phases so a caller that keeps the UI responsive
//! while a request runs can interleave them: `begin_*` validates and
//! snapshots synchronously, the caller runs the request, and `finish_*`
//! applies the response. Every transition that changes page identity bumps
//! the session generation; a response carrying an older [`Ticket`] is
//! discarded with [`SessionError::StaleResponse`]. The async helpers
//! (`open`, `save`, `fact_check`, ...) chain both phases for callers that
//! simply await.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::document::{Document, Path};
use crate::editor::DocumentEditor;
use crate::error::{SessionError, StoreError};
use crate::selection::{Selection, SelectionObserver, ToolbarState};
use crate::store::{
    DEFAULT_PAGE_LIMIT, FactCheck, FactChecker, PageDraft, PageId, PageRecord, PageStore,
    PageSummary, ShareService,
};

pub const SHARED_PAGE_TITLE: &str = "Shared Page";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    /// Fresh page that has never been saved.
    New,
    Loading,
    Ready,
    Saving,
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PageState::New => "new",
            PageState::Loading => "loading",
            PageState::Ready => "ready",
            PageState::Saving => "saving",
        };
        f.write_str(label)
    }
}

/// Which floating panel is open. At most one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Popover {
    #[default]
    None,
    TextColor,
    BackgroundColor,
    FontSize,
    Pages,
}

impl Popover {
    /// Opens `target`, or closes it when it is already open.
    pub fn toggle(&mut self, target: Popover) {
        *self = if *self == target {
            Popover::None
        } else {
            target
        };
    }

    pub fn close(&mut self) {
        *self = Popover::None;
    }

    pub fn is_open(self) -> bool {
        self != Popover::None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Milliseconds since the epoch when the answer was applied.
    pub id: i64,
    pub source_text: String,
    pub response_text: String,
}

/// Proof of which page generation a request was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Clone, Debug)]
pub struct SaveRequest {
    pub ticket: Ticket,
    /// `None` means the page is new and must be created.
    pub page_id: Option<PageId>,
    pub draft: PageDraft,
}

#[derive(Clone, Debug)]
pub struct PendingFactCheck {
    pub ticket: Ticket,
    pub text: String,
    pub snapshot: Selection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedView {
    pub title: String,
    pub document: Document,
}

#[derive(Debug)]
pub struct PageSession {
    default_title: String,
    public_base_url: String,
    page_id: Option<PageId>,
    title: String,
    editor: DocumentEditor,
    state: PageState,
    last_error: Option<SessionError>,
    observer: SelectionObserver,
    popover: Popover,
    annotations: Vec<AnnotationRecord>,
    share_url: Option<String>,
    /// Server id an in-flight save updates; `None` while it creates.
    save_target: Option<PageId>,
    generation: u64,
}

impl Default for PageSession {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl PageSession {
    pub fn new(config: &Config) -> Self {
        Self {
            default_title: config.default_title.clone(),
            public_base_url: config.public_base_url.clone(),
            page_id: None,
            title: config.default_title.clone(),
            editor: DocumentEditor::new(Document::empty()),
            state: PageState::New,
            last_error: None,
            observer: SelectionObserver::new(),
            popover: Popover::None,
            annotations: Vec::new(),
            share_url: None,
            save_target: None,
            generation: 0,
        }
    }

    pub fn page_id(&self) -> Option<PageId> {
        self.page_id
    }

    /// True until the page has a server id.
    pub fn is_new(&self) -> bool {
        persisted(self.page_id).is_none()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn editor(&self) -> &DocumentEditor {
        &self.editor
    }

    /// Runs an edit and keeps the observer in step with wherever the editor
    /// left the selection.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut DocumentEditor) -> R) -> R {
        let result = f(&mut self.editor);
        self.observer.observe(self.editor.selection().cloned());
        result
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn observer(&self) -> &SelectionObserver {
        &self.observer
    }

    /// Reports a new selection from the view layer.
    pub fn select(&mut self, selection: Option<Selection>) {
        if self.observer.observe(selection.clone()) {
            self.editor.set_selection(selection);
        }
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        self.observer.toolbar_state(&self.editor)
    }

    pub fn popover(&self) -> Popover {
        self.popover
    }

    pub fn toggle_popover(&mut self, target: Popover) {
        self.popover.toggle(target);
    }

    pub fn close_popover(&mut self) {
        self.popover.close();
    }

    pub fn annotations(&self) -> &[AnnotationRecord] {
        &self.annotations
    }

    pub fn share_url(&self) -> Option<&str> {
        self.share_url.as_deref()
    }

    /// Back to an unsaved, empty page.
    pub fn reset_to_new(&mut self) {
        self.generation += 1;
        self.page_id = None;
        self.title = self.default_title.clone();
        self.editor.replace_document(Document::empty());
        self.observer.clear();
        self.annotations.clear();
        self.share_url = None;
        self.state = PageState::New;
    }

    pub fn begin_open(&mut self, id: PageId) -> Result<Ticket, SessionError> {
        if self.state == PageState::Saving {
            return Err(SessionError::Busy(self.state));
        }
        self.generation += 1;
        self.state = PageState::Loading;
        self.last_error = None;
        debug!(page_id = id, "loading page");
        Ok(self.ticket())
    }

    /// Applies a load result. A failed load leaves the user on a fresh page.
    pub fn finish_open(
        &mut self,
        ticket: Ticket,
        result: Result<PageRecord, StoreError>,
    ) -> Result<(), SessionError> {
        self.check_ticket(ticket)?;
        match result {
            Ok(record) => {
                info!(page_id = record.id, "page opened");
                self.page_id = Some(record.id);
                self.title = record
                    .title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| self.default_title.clone());
                self.editor.replace_document(record.content);
                self.observer.clear();
                self.annotations.clear();
                self.share_url = None;
                self.state = PageState::Ready;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "page load failed, starting a new page");
                self.reset_to_new();
                Err(self.record_error(err))
            }
        }
    }

    pub async fn open(&mut self, store: &dyn PageStore, id: PageId) -> Result<(), SessionError> {
        let ticket = self.begin_open(id)?;
        let result = store.load_page(id).await;
        self.finish_open(ticket, result)
    }

    /// Snapshots title and body for saving. The request goes out as a
    /// create while the page has no server id.
    pub fn begin_save(&mut self) -> Result<SaveRequest, SessionError> {
        if matches!(self.state, PageState::Saving | PageState::Loading) {
            return Err(SessionError::Busy(self.state));
        }
        self.state = PageState::Saving;
        self.save_target = persisted(self.page_id);
        Ok(SaveRequest {
            ticket: self.ticket(),
            page_id: self.save_target,
            draft: PageDraft {
                title: self.title.clone(),
                content: self.editor.document().clone(),
            },
        })
    }

    /// Applies a save result. An update keeps the id it was sent to; only a
    /// create adopts the id the server returns.
    pub fn finish_save(
        &mut self,
        ticket: Ticket,
        result: Result<PageRecord, StoreError>,
    ) -> Result<PageId, SessionError> {
        self.check_ticket(ticket)?;
        match result {
            Ok(record) => {
                let id = self.save_target.take().unwrap_or(record.id);
                if id != record.id {
                    debug!(
                        page_id = id,
                        returned = record.id,
                        "ignoring id from update response"
                    );
                }
                info!(page_id = id, "page saved");
                self.page_id = Some(id);
                self.state = if self.is_new() {
                    PageState::New
                } else {
                    PageState::Ready
                };
                self.last_error = None;
                Ok(id)
            }
            Err(err) => {
                warn!(%err, "page save failed");
                self.save_target = None;
                self.state = if self.is_new() {
                    PageState::New
                } else {
                    PageState::Ready
                };
                Err(self.record_error(err))
            }
        }
    }

    pub async fn save(&mut self, store: &dyn PageStore) -> Result<PageId, SessionError> {
        let SaveRequest {
            ticket,
            page_id,
            draft,
        } = self.begin_save()?;
        let result = match page_id {
            Some(id) => store.update_page(id, draft).await,
            None => store.create_page(draft).await,
        };
        self.finish_save(ticket, result)
    }

    /// Deletes a page. Deleting the page being edited resets the session to
    /// a fresh page.
    pub async fn delete(&mut self, store: &dyn PageStore, id: PageId) -> Result<(), SessionError> {
        if let Err(err) = store.delete_page(id).await {
            warn!(%err, page_id = id, "page delete failed");
            return Err(self.record_error(err));
        }
        info!(page_id = id, "page deleted");
        if self.page_id == Some(id) {
            self.reset_to_new();
        }
        Ok(())
    }

    /// Mints a share link for the current page. Unsaved pages are rejected
    /// before any request goes out.
    pub async fn share(&mut self, service: &dyn ShareService) -> Result<String, SessionError> {
        let Some(id) = persisted(self.page_id) else {
            return Err(SessionError::Unsaved);
        };
        let ticket = self.ticket();
        let url = match service.share_page(id).await {
            Ok(url) => url,
            Err(err) => {
                warn!(%err, page_id = id, "share failed");
                return Err(self.record_error(err));
            }
        };
        self.check_ticket(ticket)?;
        let url = resolve_share_url(&self.public_base_url, &url);
        info!(page_id = id, %url, "page shared");
        self.share_url = Some(url.clone());
        Ok(url)
    }

    pub async fn list_pages(
        &mut self,
        store: &dyn PageStore,
    ) -> Result<Vec<PageSummary>, SessionError> {
        store
            .list_pages(0, DEFAULT_PAGE_LIMIT)
            .await
            .map_err(|err| {
                warn!(%err, "page list failed");
                self.record_error(err)
            })
    }

    /// Captures the current selection and its text for a fact-check. Nothing
    /// is sent when the selection is missing or covers only whitespace.
    pub fn request_fact_check(&self) -> Result<PendingFactCheck, SessionError> {
        let snapshot = self
            .observer
            .snapshot()
            .ok_or(SessionError::EmptySelection)?;
        let text = self.editor.selected_text(&snapshot);
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptySelection);
        }
        Ok(PendingFactCheck {
            ticket: self.ticket(),
            text: text.to_string(),
            snapshot,
        })
    }

    /// Places the answer as an AI comment relative to the selection that
    /// was current when the request went out.
    pub fn finish_fact_check(
        &mut self,
        pending: PendingFactCheck,
        result: Result<FactCheck, StoreError>,
    ) -> Result<Path, SessionError> {
        self.check_ticket(pending.ticket)?;
        let answer = match result {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%err, "fact-check failed");
                return Err(self.record_error(err));
            }
        };
        let response_text = answer.comment_text();
        let path = self
            .editor
            .insert_annotation(&response_text, Some(&pending.snapshot));
        self.observer.observe(self.editor.selection().cloned());
        info!(%path, "annotation inserted");
        self.annotations.push(AnnotationRecord {
            id: Utc::now().timestamp_millis(),
            source_text: pending.text,
            response_text,
        });
        Ok(path)
    }

    pub async fn fact_check(&mut self, checker: &dyn FactChecker) -> Result<Path, SessionError> {
        let pending = self.request_fact_check()?;
        let result = checker.fact_check(&pending.text).await;
        self.finish_fact_check(pending, result)
    }

    fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    fn check_ticket(&self, ticket: Ticket) -> Result<(), SessionError> {
        if ticket.0 != self.generation {
            debug!(
                issued = ticket.0,
                current = self.generation,
                "discarding stale response"
            );
            return Err(SessionError::StaleResponse);
        }
        Ok(())
    }

    fn record_error(&mut self, err: StoreError) -> SessionError {
        let err = SessionError::from(err);
        self.last_error = Some(err.clone());
        err
    }
}

/// Loads a page through its share token for read-only display.
pub async fn open_shared(
    service: &dyn ShareService,
    token: &str,
) -> Result<SharedView, SessionError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SessionError::NotFound("empty share token".to_string()));
    }
    let page = service.fetch_shared(token).await.map_err(|err| match err {
        StoreError::NotFound(_) => SessionError::NotFound("shared page".to_string()),
        other => SessionError::from(other),
    })?;
    let mut document = page.content;
    document.ensure_initialized();
    Ok(SharedView {
        title: page
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| SHARED_PAGE_TITLE.to_string()),
        document,
    })
}

/// Ids of zero or below name pages that were never persisted.
fn persisted(id: Option<PageId>) -> Option<PageId> {
    id.filter(|id| *id > 0)
}

fn resolve_share_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
