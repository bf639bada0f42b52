//! Core of the Loupe page editor.
//!
//! [`editor::DocumentEditor`] holds a page body and applies selection-scoped
//! transforms to it. [`session::PageSession`] wraps one editor with the page
//! lifecycle (open, save, delete, share) and the AI fact-check loop, talking
//! to a backend through the traits in [`store`].

pub mod client;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod selection;
pub mod session;
pub mod store;

pub use config::Config;
pub use document::{BlockKind, Content, Document, Mark, Node, Path, TextRun};
pub use editor::DocumentEditor;
pub use error::{DocumentError, SessionError, StoreError};
pub use selection::{Point, Selection, SelectionObserver};
pub use session::{PageSession, PageState};
