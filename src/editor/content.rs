use crate::document::{Content, Document, Path, TextRun};

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub(crate) fn split_text(text: &str, offset: usize) -> (String, String) {
    let byte_idx = char_to_byte_idx(text, offset);
    let left = text[..byte_idx].to_string();
    let right = text[byte_idx..].to_string();
    (left, right)
}

/// Characters `start..end` of a run, clamped to its length.
pub(crate) fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let from = char_to_byte_idx(text, start);
    let to = char_to_byte_idx(text, end.max(start));
    &text[from..to]
}

/// Applies `apply` to characters `start..end` of the run at `run_path`,
/// splitting it so that untouched characters keep their formatting.
/// Returns false when the run is gone or `apply` changed nothing.
pub(crate) fn format_run_range<F>(
    document: &mut Document,
    run_path: &Path,
    start: usize,
    end: usize,
    apply: &F,
) -> bool
where
    F: Fn(&mut TextRun) -> bool,
{
    let (Some(parent_path), Some(idx)) = (run_path.parent(), run_path.last()) else {
        return false;
    };
    let Some(parent) = document.block_mut(&parent_path) else {
        return false;
    };
    format_run_in_children(&mut parent.children, idx, start, end, apply)
}

fn format_run_in_children<F>(
    children: &mut Vec<Content>,
    idx: usize,
    start: usize,
    end: usize,
    apply: &F,
) -> bool
where
    F: Fn(&mut TextRun) -> bool,
{
    let Some(Content::Text(original)) = children.get(idx) else {
        return false;
    };
    let original = original.clone();
    let len = original.char_len();
    let clamped_end = end.min(len);
    let clamped_start = start.min(clamped_end);
    if clamped_start >= clamped_end {
        return false;
    }

    let (before_end, right_text) = split_text(&original.text, clamped_end);
    let (left_text, mid_text) = split_text(&before_end, clamped_start);

    let mut mid_run = original.clone();
    mid_run.text = mid_text;
    if !apply(&mut mid_run) {
        return false;
    }

    let mut replacements = Vec::with_capacity(3);
    if !left_text.is_empty() {
        let mut left_run = original.clone();
        left_run.text = left_text;
        replacements.push(Content::Text(left_run));
    }
    replacements.push(Content::Text(mid_run));
    if !right_text.is_empty() {
        let mut right_run = original;
        right_run.text = right_text;
        replacements.push(Content::Text(right_run));
    }

    children.splice(idx..=idx, replacements);
    true
}

/// Drops empty runs (keeping at least one child) and merges neighbouring
/// runs that carry identical formatting.
pub(crate) fn prune_and_merge_runs(children: &mut Vec<Content>) {
    let mut idx = 0;
    while idx < children.len() && children.len() > 1 {
        let empty = matches!(&children[idx], Content::Text(run) if run.text.is_empty());
        if empty {
            children.remove(idx);
        } else {
            idx += 1;
        }
    }

    let mut i = 0;
    while i + 1 < children.len() {
        let mergeable = match (&children[i], &children[i + 1]) {
            (Content::Text(left), Content::Text(right)) => left.same_format(right),
            _ => false,
        };
        if mergeable {
            if let Content::Text(right) = children.remove(i + 1) {
                if let Content::Text(left) = &mut children[i] {
                    left.text.push_str(&right.text);
                }
            }
        } else {
            i += 1;
        }
    }
}
