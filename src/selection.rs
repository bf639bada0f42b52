//! Selection snapshots and the observer that tracks them.
//!
//! A [`Selection`] is a plain value: every editor operation clones the one it
//! acts on at call time, so a later change to the live selection can never
//! leak into an operation that is already running or waiting on the network.

use crate::document::{BlockKind, Mark, Path};
use crate::editor::DocumentEditor;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(path: impl Into<Path>, offset: usize) -> Self {
        let point = Point::new(path, offset);
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// Range inside a single text run.
    pub fn within(path: impl Into<Path>, start: usize, end: usize) -> Self {
        let path = path.into();
        Self {
            anchor: Point::new(path.clone(), start),
            focus: Point::new(path, end),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The endpoints in document order.
    pub fn ordered(&self) -> (&Point, &Point) {
        if self.focus < self.anchor {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }
}

/// What the formatting toolbar shows as active for the current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolbarState {
    pub marks: Vec<Mark>,
    pub block_kind: Option<BlockKind>,
    pub ask_ai: bool,
}

/// Follows the user's selection as reported by the view layer.
///
/// The observer never touches the document; it only remembers the latest
/// selection and derives toolbar state and "Ask AI" visibility from it.
#[derive(Debug, Default)]
pub struct SelectionObserver {
    current: Option<Selection>,
    revision: u64,
}

impl SelectionObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection change. Returns false when nothing changed.
    pub fn observe(&mut self, selection: Option<Selection>) -> bool {
        if self.current == selection {
            return false;
        }
        self.current = selection;
        self.revision += 1;
        true
    }

    pub fn clear(&mut self) {
        self.observe(None);
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn snapshot(&self) -> Option<Selection> {
        self.current.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_range(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|selection| !selection.is_collapsed())
    }

    /// The "Ask AI" affordance only makes sense over a real range.
    pub fn ask_ai_visible(&self) -> bool {
        self.has_range()
    }

    pub fn toolbar_state(&self, editor: &DocumentEditor) -> ToolbarState {
        let Some(selection) = self.current.as_ref() else {
            return ToolbarState::default();
        };
        ToolbarState {
            marks: editor.active_marks(selection),
            block_kind: editor.active_block_kind(selection),
            ask_ai: !selection.is_collapsed(),
        }
    }
}
