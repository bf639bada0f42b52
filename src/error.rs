//! Error types shared across the crate.
//!
//! Document errors never reach the user: the editor absorbs them as stale
//! selections. Store errors come from the page backend and are folded into
//! [`SessionError`] by the page session, which is what callers surface.

use thiserror::Error;

use crate::document::Path;
use crate::session::PageState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The path does not resolve in the current tree.
    #[error("path {0} does not resolve in the current document")]
    PathNotFound(Path),

    /// Only element nodes may live at the top level.
    #[error("only block nodes can be placed at top-level path {0}")]
    NotABlock(Path),
}

/// Failures reported by a page backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}

/// Errors surfaced by the page session. None of them is fatal: every path
/// that returns one leaves the session in a previously valid state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A selection-dependent action was invoked with nothing selected.
    #[error("select some text first")]
    EmptySelection,

    /// The page has no server id yet, so it cannot be shared.
    #[error("save the page before sharing it")]
    Unsaved,

    /// Another request for this page is still in flight.
    #[error("cannot start a request while the page is {0}")]
    Busy(PageState),

    #[error("page not found: {0}")]
    NotFound(String),

    #[error("network failure: {0}")]
    Network(StoreError),

    /// The response belongs to a page the session has since left.
    #[error("response arrived after the page changed and was discarded")]
    StaleResponse,
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => SessionError::NotFound(what),
            other => SessionError::Network(other),
        }
    }
}
