use tracing::debug;

use super::DocumentEditor;
use crate::document::{AI_AUTHOR, Content, Node, Path};
use crate::selection::Selection;

impl DocumentEditor {
    /// Places an AI comment after the top-level block holding the snapshot's
    /// anchor. Without a snapshot, or when that spot no longer exists, the
    /// comment goes to the end of the page. Always inserts exactly one node
    /// and returns where it landed.
    pub fn insert_annotation(&mut self, response_text: &str, snapshot: Option<&Selection>) -> Path {
        let comment = Node::comment(AI_AUTHOR, response_text);

        let target = snapshot
            .and_then(|selection| selection.anchor.path.top())
            .and_then(|top| top.checked_add(1));
        if let Some(index) = target {
            let path = Path::new_root(index);
            match self
                .document
                .insert_at(&path, Content::Node(comment.clone()))
            {
                Ok(()) => {
                    self.shift_selection_for_insert(index);
                    return path;
                }
                Err(err) => debug!(%err, "annotation target is stale, appending instead"),
            }
        }

        self.document.push(comment)
    }
}
