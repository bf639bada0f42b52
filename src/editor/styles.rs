use tracing::debug;

use super::content::{format_run_range, prune_and_merge_runs};
use super::{CoveredRun, DocumentEditor};
use crate::document::{BlockKind, Mark, Path, TextRun};

impl DocumentEditor {
    /// Adds `mark` to every covered character, or removes it when every
    /// covered run already carries it.
    pub fn toggle_mark(&mut self, mark: Mark) -> bool {
        let Some(covered) = self.capture_covered() else {
            return false;
        };
        let enable = !covered.iter().all(|c| {
            self.document
                .text_run(&c.run_path)
                .is_some_and(|run| run.has_mark(mark))
        });
        self.format_covered(&covered, &|run: &mut TextRun| run.set_mark(mark, enable))
    }

    pub fn apply_color(&mut self, color: &str) -> bool {
        self.format_selection(&|run: &mut TextRun| replace_value(&mut run.color, color))
    }

    pub fn apply_background(&mut self, color: &str) -> bool {
        self.format_selection(&|run: &mut TextRun| {
            replace_value(&mut run.background_color, color)
        })
    }

    pub fn apply_font_size(&mut self, size: &str) -> bool {
        self.format_selection(&|run: &mut TextRun| replace_value(&mut run.font_size, size))
    }

    /// Strips inline formatting from the covered runs and turns the
    /// surrounding text blocks back into paragraphs in one step.
    pub fn clear_formatting(&mut self) -> bool {
        let Some(selection) = self.selection.clone() else {
            return false;
        };
        let (Some(covered), Some(blocks)) = (
            self.covered_runs(&selection),
            self.selection_blocks(&selection),
        ) else {
            debug!("clear formatting skipped, selection no longer resolves");
            return false;
        };

        let mut changed = self.format_covered(&covered, &TextRun::clear_formatting);
        for block in &blocks {
            changed |= self.retype_block(block, BlockKind::Paragraph);
        }
        changed
    }

    fn capture_covered(&self) -> Option<Vec<CoveredRun>> {
        let selection = self.selection.as_ref()?;
        let Some(covered) = self.covered_runs(selection) else {
            debug!("formatting skipped, selection no longer resolves");
            return None;
        };
        if covered.is_empty() {
            return None;
        }
        Some(covered)
    }

    fn format_selection<F>(&mut self, apply: &F) -> bool
    where
        F: Fn(&mut TextRun) -> bool,
    {
        let Some(covered) = self.capture_covered() else {
            return false;
        };
        self.format_covered(&covered, apply)
    }

    fn format_covered<F>(&mut self, covered: &[CoveredRun], apply: &F) -> bool
    where
        F: Fn(&mut TextRun) -> bool,
    {
        let saved = self.save_selection();
        let mut changed = false;
        let mut touched_blocks: Vec<Path> = Vec::new();

        // Later runs first, so splitting one never shifts a path still queued.
        for run in covered.iter().rev() {
            if format_run_range(&mut self.document, &run.run_path, run.start, run.end, apply) {
                changed = true;
                if !touched_blocks.contains(&run.block_path) {
                    touched_blocks.push(run.block_path.clone());
                }
            }
        }

        if changed {
            for path in &touched_blocks {
                if let Some(block) = self.document.block_mut(path) {
                    prune_and_merge_runs(&mut block.children);
                }
            }
            self.restore_selection(saved);
        }

        changed
    }
}

fn replace_value(slot: &mut Option<String>, value: &str) -> bool {
    if slot.as_deref() == Some(value) {
        return false;
    }
    *slot = Some(value.to_string());
    true
}
