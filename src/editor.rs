use tracing::debug;

use crate::document::{Document, Path};
use crate::selection::{Point, Selection};

mod annotation;
mod content;
mod inspect;
mod structure;
mod styles;

pub(crate) use inspect::collect_segments;

/// One text run as seen by the editor: where it lives, which block holds it,
/// and where it starts inside that block's text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentRef {
    pub run_path: Path,
    pub block_path: Path,
    pub block_offset: usize,
    pub len: usize,
}

/// Part of a run covered by a selection, in characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CoveredRun {
    pub run_path: Path,
    pub block_path: Path,
    pub start: usize,
    pub end: usize,
}

/// Position expressed against a block's flattened text. Survives run splits
/// and merges, which only ever renumber run paths.
#[derive(Clone, Debug, PartialEq, Eq)]
struct BlockPosition {
    block_path: Path,
    offset: usize,
}

/// The transform engine. Owns the page body and the selection the view
/// layer last reported; every operation re-derives paths from the current
/// tree and turns into a no-op when the selection no longer resolves.
#[derive(Clone, Debug)]
pub struct DocumentEditor {
    document: Document,
    selection: Option<Selection>,
}

impl DocumentEditor {
    pub fn new(mut document: Document) -> Self {
        document.ensure_initialized();
        Self {
            document,
            selection: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Swaps the whole body in one step. The old selection cannot apply to
    /// the new tree, so it is dropped.
    pub fn replace_document(&mut self, mut document: Document) {
        document.ensure_initialized();
        self.document = document;
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn segments(&self) -> Vec<SegmentRef> {
        collect_segments(&self.document)
    }

    /// Selection over characters `start..end` of the block at `block`,
    /// counted across all of its runs. Offsets past the end clamp to it.
    pub fn block_range(&self, block: &Path, start: usize, end: usize) -> Option<Selection> {
        let segments = self.segments();
        let position = |offset| BlockPosition {
            block_path: block.clone(),
            offset,
        };
        let anchor = self.locate(&position(start), &segments)?;
        let focus = self.locate(&position(end), &segments)?;
        Some(Selection::new(anchor, focus))
    }

    /// Resolves a point to a text run in the current tree. A point on an
    /// element resolves to the first run below it.
    pub(crate) fn resolve_point(&self, point: &Point, segments: &[SegmentRef]) -> Option<Point> {
        if let Some(segment) = segments.iter().find(|s| s.run_path == point.path) {
            return Some(Point {
                path: segment.run_path.clone(),
                offset: point.offset.min(segment.len),
            });
        }
        self.document.block(&point.path)?;
        let segment = segments
            .iter()
            .find(|s| s.run_path.starts_with(&point.path))?;
        Some(Point {
            path: segment.run_path.clone(),
            offset: point.offset.min(segment.len),
        })
    }

    /// Resolved endpoints in document order, or `None` for a stale selection.
    pub(crate) fn resolve_selection(
        &self,
        selection: &Selection,
        segments: &[SegmentRef],
    ) -> Option<(Point, Point)> {
        let (start, end) = selection.ordered();
        let start = self.resolve_point(start, segments)?;
        let end = self.resolve_point(end, segments)?;
        if end < start {
            Some((end, start))
        } else {
            Some((start, end))
        }
    }

    pub(crate) fn covered_runs(&self, selection: &Selection) -> Option<Vec<CoveredRun>> {
        let segments = self.segments();
        let (start, end) = self.resolve_selection(selection, &segments)?;
        let covered = segments
            .iter()
            .filter(|s| s.run_path >= start.path && s.run_path <= end.path)
            .filter_map(|segment| {
                let from = if segment.run_path == start.path {
                    start.offset
                } else {
                    0
                };
                let to = if segment.run_path == end.path {
                    end.offset
                } else {
                    segment.len
                };
                (from < to).then(|| CoveredRun {
                    run_path: segment.run_path.clone(),
                    block_path: segment.block_path.clone(),
                    start: from,
                    end: to,
                })
            })
            .collect();
        Some(covered)
    }

    /// Paths of every text block between the selection endpoints, in order.
    pub(crate) fn selection_blocks(&self, selection: &Selection) -> Option<Vec<Path>> {
        let segments = self.segments();
        let (start, end) = self.resolve_selection(selection, &segments)?;
        let mut blocks: Vec<Path> = Vec::new();
        for segment in segments
            .iter()
            .filter(|s| s.run_path >= start.path && s.run_path <= end.path)
        {
            if blocks.last() != Some(&segment.block_path) {
                blocks.push(segment.block_path.clone());
            }
        }
        Some(blocks)
    }

    /// Block holding the selection anchor.
    pub(crate) fn anchor_block(&self, selection: &Selection) -> Option<Path> {
        let segments = self.segments();
        let anchor = self.resolve_point(&selection.anchor, &segments)?;
        anchor.path.parent()
    }

    fn block_position(&self, point: &Point, segments: &[SegmentRef]) -> Option<BlockPosition> {
        let resolved = self.resolve_point(point, segments)?;
        let segment = segments.iter().find(|s| s.run_path == resolved.path)?;
        Some(BlockPosition {
            block_path: segment.block_path.clone(),
            offset: segment.block_offset + resolved.offset,
        })
    }

    fn locate(&self, position: &BlockPosition, segments: &[SegmentRef]) -> Option<Point> {
        let mut last = None;
        for segment in segments.iter().filter(|s| s.block_path == position.block_path) {
            if position.offset <= segment.block_offset + segment.len {
                return Some(Point {
                    path: segment.run_path.clone(),
                    offset: position.offset.saturating_sub(segment.block_offset),
                });
            }
            last = Some(segment);
        }
        last.map(|segment| Point {
            path: segment.run_path.clone(),
            offset: segment.len,
        })
    }

    /// Captures the current selection as block positions so it can be
    /// restored after runs are split or merged.
    fn save_selection(&self) -> Option<(BlockPosition, BlockPosition)> {
        let selection = self.selection.as_ref()?;
        let segments = self.segments();
        Some((
            self.block_position(&selection.anchor, &segments)?,
            self.block_position(&selection.focus, &segments)?,
        ))
    }

    fn restore_selection(&mut self, saved: Option<(BlockPosition, BlockPosition)>) {
        let Some((anchor, focus)) = saved else {
            return;
        };
        let segments = self.segments();
        match (
            self.locate(&anchor, &segments),
            self.locate(&focus, &segments),
        ) {
            (Some(anchor), Some(focus)) => self.selection = Some(Selection::new(anchor, focus)),
            _ => debug!("selection could not be restored after reformatting"),
        }
    }

    /// Keeps selection points valid after a top-level block was inserted at
    /// `index`.
    fn shift_selection_for_insert(&mut self, index: usize) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        for point in [&mut selection.anchor, &mut selection.focus] {
            if point.path.top().is_some_and(|top| top >= index) {
                let mut indices = point.path.indices().to_vec();
                indices[0] += 1;
                point.path = Path::new(indices);
            }
        }
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

#[cfg(test)]
#[path = "editor/content_tests.rs"]
mod content_tests;


#[cfg(test)]
#[path = "editor/annotation_tests.rs"]
mod annotation_tests;
