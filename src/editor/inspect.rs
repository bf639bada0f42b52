use super::content::slice_chars;
use super::{DocumentEditor, SegmentRef};
use crate::document::{BlockKind, Content, Document, Mark, Node, Path};
use crate::selection::Selection;

/// Every editable text run in document order. Runs inside void nodes
/// (comments, rules) are not cursor targets and are left out.
pub fn collect_segments(document: &Document) -> Vec<SegmentRef> {
    let mut result = Vec::new();
    for (idx, block) in document.blocks.iter().enumerate() {
        let mut path = Path::new_root(idx);
        collect_node_segments(block, &mut path, &mut result);
    }
    result
}

fn collect_node_segments(node: &Node, path: &mut Path, result: &mut Vec<SegmentRef>) {
    if node.is_void() {
        return;
    }
    let mut block_offset = 0;
    for (idx, child) in node.children.iter().enumerate() {
        match child {
            Content::Text(run) => {
                let len = run.char_len();
                result.push(SegmentRef {
                    run_path: path.child(idx),
                    block_path: path.clone(),
                    block_offset,
                    len,
                });
                block_offset += len;
            }
            Content::Node(child) => {
                path.push(idx);
                collect_node_segments(child, path, result);
                path.pop();
            }
        }
    }
}

impl DocumentEditor {
    /// Marks shared by every covered run. A caret reports the marks of the
    /// run it sits in.
    pub fn active_marks(&self, selection: &Selection) -> Vec<Mark> {
        let Some(covered) = self.covered_runs(selection) else {
            return Vec::new();
        };
        if covered.is_empty() {
            let segments = self.segments();
            return self
                .resolve_point(&selection.anchor, &segments)
                .and_then(|point| self.document.text_run(&point.path))
                .map(|run| run.marks())
                .unwrap_or_default();
        }
        Mark::ALL
            .into_iter()
            .filter(|mark| {
                covered.iter().all(|c| {
                    self.document
                        .text_run(&c.run_path)
                        .is_some_and(|run| run.has_mark(*mark))
                })
            })
            .collect()
    }

    pub fn active_block_kind(&self, selection: &Selection) -> Option<BlockKind> {
        let block = self.anchor_block(selection)?;
        self.document.block(&block).map(|node| node.kind)
    }

    /// Text covered by the selection; blocks are separated by newlines.
    pub fn selected_text(&self, selection: &Selection) -> String {
        let Some(covered) = self.covered_runs(selection) else {
            return String::new();
        };
        let mut text = String::new();
        let mut current_block: Option<&Path> = None;
        for run in &covered {
            if current_block.is_some_and(|block| *block != run.block_path) {
                text.push('\n');
            }
            current_block = Some(&run.block_path);
            if let Some(source) = self.document.text_run(&run.run_path) {
                text.push_str(slice_chars(&source.text, run.start, run.end));
            }
        }
        text
    }

    pub fn can_indent_more(&self) -> bool {
        self.current_block()
            .is_some_and(|node| node.indent_level == 0 && !node.is_void())
    }

    pub fn can_indent_less(&self) -> bool {
        self.current_block().is_some_and(|node| node.indent_level > 0)
    }

    fn current_block(&self) -> Option<&Node> {
        let selection = self.selection.as_ref()?;
        let block = self.anchor_block(selection)?;
        self.document.block(&block)
    }
}
