use pretty_assertions::assert_eq;

use super::*;
use crate::document::{AI_AUTHOR, BlockKind, Node};

#[test]
fn annotation_goes_after_anchor_block() {
    let mut editor = DocumentEditor::new(Document::with_blocks(vec![Node::paragraph("Fact")]));
    let snapshot = Selection::caret(vec![0], 0);

    let path = editor.insert_annotation("X", Some(&snapshot));

    assert_eq!(path, Path::new_root(1));
    assert_eq!(
        editor.document().blocks,
        vec![Node::paragraph("Fact"), Node::comment("AI", "X")]
    );
}

#[test]
fn annotation_without_snapshot_is_appended() {
    let mut editor = DocumentEditor::new(Document::with_blocks(vec![
        Node::paragraph("a"),
        Node::paragraph("b"),
    ]));

    let path = editor.insert_annotation("note", None);

    assert_eq!(path, Path::new_root(2));
    let last = editor.document().blocks.last().cloned();
    assert_eq!(
        last.map(|n| (n.kind, n.author)),
        Some((BlockKind::Comment, Some(AI_AUTHOR.to_string())))
    );
}

#[test]
fn annotation_uses_top_level_index_of_nested_anchor() {
    let mut editor = DocumentEditor::new(Document::with_blocks(vec![
        Node::list(true, vec![Node::list_item("one"), Node::list_item("two")]),
        Node::paragraph("after"),
    ]));
    let snapshot = Selection::within(vec![0, 1, 0], 0, 3);

    let path = editor.insert_annotation("checked", Some(&snapshot));

    assert_eq!(path, Path::new_root(1));
    assert_eq!(editor.document().blocks[1], Node::comment(AI_AUTHOR, "checked"));
    assert_eq!(editor.document().blocks[2], Node::paragraph("after"));
}

#[test]
fn stale_snapshot_falls_back_to_append() {
    let mut editor = DocumentEditor::new(Document::with_blocks(vec![Node::paragraph("short")]));
    // The snapshot was taken when the page still had five blocks.
    let snapshot = Selection::within(vec![4, 0], 0, 2);

    let path = editor.insert_annotation("late", Some(&snapshot));

    assert_eq!(path, Path::new_root(1));
    assert_eq!(editor.document().len(), 2);
    assert_eq!(editor.document().comment_count(), 1);
}

#[test]
fn every_call_adds_exactly_one_comment() {
    let mut editor = DocumentEditor::new(Document::new());
    let snapshots = [
        None,
        Some(Selection::caret(vec![0, 0], 0)),
        Some(Selection::caret(vec![99], 0)),
        Some(Selection::caret(Vec::<usize>::new(), 0)),
    ];

    for (round, snapshot) in snapshots.iter().enumerate() {
        editor.insert_annotation("r", snapshot.as_ref());
        assert_eq!(editor.document().comment_count(), round + 1);
    }
}

#[test]
fn insertion_keeps_live_selection_on_its_block() {
    let mut editor = DocumentEditor::new(Document::with_blocks(vec![
        Node::paragraph("a"),
        Node::paragraph("b"),
    ]));
    editor.set_selection(Some(Selection::within(vec![1, 0], 0, 1)));
    let snapshot = Selection::caret(vec![0, 0], 0);

    editor.insert_annotation("between", Some(&snapshot));

    assert_eq!(
        editor.selection(),
        Some(&Selection::within(vec![2, 0], 0, 1))
    );
    assert_eq!(editor.selected_text(&Selection::within(vec![2, 0], 0, 1)), "b");
}
