use tracing::debug;

use super::DocumentEditor;
use crate::document::{BlockKind, Content, Node, Path};
use crate::selection::Selection;

impl DocumentEditor {
    /// Sets the kind of the text block at `path`. Only the interchangeable
    /// text kinds (paragraph, headings, quote, code) can be assigned, and
    /// only to blocks that already hold one of them.
    pub fn set_block_type(&mut self, path: &Path, kind: BlockKind) -> bool {
        if self.selection.is_none() || !kind.is_text_kind() {
            return false;
        }
        self.retype_block(path, kind)
    }

    /// Switches the selected blocks to `kind`, or back to paragraphs when the
    /// anchor block already is `kind`.
    pub fn toggle_block_type(&mut self, kind: BlockKind) -> bool {
        if !kind.is_text_kind() {
            return false;
        }
        let Some(selection) = self.selection.clone() else {
            return false;
        };
        let (Some(anchor_block), Some(blocks)) = (
            self.anchor_block(&selection),
            self.selection_blocks(&selection),
        ) else {
            debug!("block toggle skipped, selection no longer resolves");
            return false;
        };

        let active = self.document.block(&anchor_block).map(|node| node.kind);
        let target = if active == Some(kind) {
            BlockKind::Paragraph
        } else {
            kind
        };

        let mut changed = false;
        for block in &blocks {
            changed |= self.retype_block(block, target);
        }
        changed
    }

    /// Adds a new list holding one empty item right after the top-level
    /// block containing the selection, and moves the caret into it.
    pub fn insert_list(&mut self, ordered: bool) -> bool {
        let Some(index) = self.insertion_index_after_selection() else {
            return false;
        };
        let list = Node::list(ordered, vec![Node::list_item("")]);
        if let Err(err) = self.document.insert_at(&Path::new_root(index), list.into()) {
            debug!(%err, "list insertion skipped");
            return false;
        }
        self.selection = Some(Selection::caret(vec![index, 0, 0], 0));
        true
    }

    /// Inserts a rule after the top-level block containing the selection, or
    /// at the end of the page when nothing is selected.
    pub fn insert_horizontal_rule(&mut self) -> bool {
        if self.selection.is_none() {
            self.document.push(Node::horizontal_rule());
            return true;
        }
        let Some(index) = self.insertion_index_after_selection() else {
            return false;
        };
        let rule = Content::Node(Node::horizontal_rule());
        if let Err(err) = self.document.insert_at(&Path::new_root(index), rule) {
            debug!(%err, "rule insertion skipped");
            return false;
        }
        self.shift_selection_for_insert(index);
        true
    }

    pub fn indent(&mut self, path: &Path) -> bool {
        self.set_indent(path, 1)
    }

    pub fn outdent(&mut self, path: &Path) -> bool {
        self.set_indent(path, 0)
    }

    pub fn indent_current_block(&mut self) -> bool {
        match self.current_block_path() {
            Some(path) => self.indent(&path),
            None => false,
        }
    }

    pub fn outdent_current_block(&mut self) -> bool {
        match self.current_block_path() {
            Some(path) => self.outdent(&path),
            None => false,
        }
    }

    fn set_indent(&mut self, path: &Path, level: u8) -> bool {
        if self.selection.is_none() {
            return false;
        }
        let Some(block) = self.document.block_mut(path) else {
            debug!(%path, "indent skipped, block no longer exists");
            return false;
        };
        if block.is_void() || block.indent_level == level {
            return false;
        }
        block.indent_level = level;
        true
    }

    pub(crate) fn retype_block(&mut self, path: &Path, kind: BlockKind) -> bool {
        let Some(block) = self.document.block_mut(path) else {
            debug!(%path, "retype skipped, block no longer exists");
            return false;
        };
        if !block.kind.is_text_kind() || block.kind == kind {
            return false;
        }
        block.kind = kind;
        true
    }

    fn current_block_path(&self) -> Option<Path> {
        let selection = self.selection.as_ref()?;
        self.anchor_block(selection)
    }

    fn insertion_index_after_selection(&self) -> Option<usize> {
        let selection = self.selection.as_ref()?;
        let segments = self.segments();
        let Some(anchor) = self.resolve_point(&selection.anchor, &segments) else {
            debug!("insertion skipped, selection no longer resolves");
            return None;
        };
        anchor.path.top().map(|top| top + 1)
    }
}
