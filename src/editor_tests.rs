use pretty_assertions::assert_eq;

use super::*;
use crate::document::{BlockKind, Content, Mark, Node, TextRun};

fn editor_with(blocks: Vec<Node>) -> DocumentEditor {
    DocumentEditor::new(Document::with_blocks(blocks))
}

fn caret(path: Vec<usize>, offset: usize) -> Option<Selection> {
    Some(Selection::caret(path, offset))
}

fn kinds(editor: &DocumentEditor) -> Vec<BlockKind> {
    editor.document().blocks.iter().map(|b| b.kind).collect()
}

#[test]
fn new_editor_initializes_empty_document() {
    let editor = DocumentEditor::new(Document::new());
    assert_eq!(editor.document(), &Document::empty());
}

#[test]
fn toggle_heading_on_heading_reverts_to_paragraph() {
    let mut editor = editor_with(vec![Node::text_block(BlockKind::Heading1, "Title")]);
    editor.set_selection(caret(vec![0, 0], 2));

    assert!(editor.toggle_block_type(BlockKind::Heading1));

    assert_eq!(editor.document().blocks, vec![Node::paragraph("Title")]);
}

#[test]
fn toggle_block_type_twice_restores_kind() {
    for kind in [
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::Blockquote,
        BlockKind::CodeBlock,
    ] {
        let mut editor = editor_with(vec![Node::paragraph("Body")]);
        editor.set_selection(caret(vec![0, 0], 0));

        assert!(editor.toggle_block_type(kind));
        assert_eq!(kinds(&editor), vec![kind]);
        assert!(editor.toggle_block_type(kind));
        assert_eq!(kinds(&editor), vec![BlockKind::Paragraph]);
    }
}

#[test]
fn toggle_to_other_heading_replaces_active_kind() {
    let mut editor = editor_with(vec![Node::text_block(BlockKind::Heading1, "Title")]);
    editor.set_selection(caret(vec![0, 0], 0));

    assert!(editor.toggle_block_type(BlockKind::Heading3));
    assert_eq!(kinds(&editor), vec![BlockKind::Heading3]);
}

#[test]
fn toggle_block_type_without_selection_is_noop() {
    let mut editor = editor_with(vec![Node::paragraph("Body")]);
    let before = editor.document().clone();

    assert!(!editor.toggle_block_type(BlockKind::Heading2));
    assert_eq!(editor.document(), &before);
}

#[test]
fn toggle_block_type_with_stale_selection_is_noop() {
    let mut editor = editor_with(vec![Node::paragraph("Body")]);
    editor.set_selection(caret(vec![4, 0], 0));
    let before = editor.document().clone();

    assert!(!editor.toggle_block_type(BlockKind::Heading2));
    assert_eq!(editor.document(), &before);
}

#[test]
fn toggle_block_type_covers_every_selected_block() {
    let mut editor = editor_with(vec![
        Node::paragraph("one"),
        Node::paragraph("two"),
        Node::paragraph("three"),
    ]);
    editor.set_selection(Some(Selection::new(
        Point::new(vec![0, 0], 1),
        Point::new(vec![1, 0], 1),
    )));

    assert!(editor.toggle_block_type(BlockKind::Blockquote));
    assert_eq!(
        kinds(&editor),
        vec![
            BlockKind::Blockquote,
            BlockKind::Blockquote,
            BlockKind::Paragraph
        ]
    );
}

#[test]
fn toggle_block_type_leaves_list_items_alone() {
    let mut editor = editor_with(vec![Node::list(false, vec![Node::list_item("item")])]);
    editor.set_selection(caret(vec![0, 0, 0], 1));

    assert!(!editor.toggle_block_type(BlockKind::Heading1));
    assert_eq!(
        editor.document().block(&Path::new(vec![0, 0])).map(|n| n.kind),
        Some(BlockKind::ListItem)
    );
}

#[test]
fn caret_on_block_path_resolves_to_its_first_run() {
    let mut editor = editor_with(vec![Node::text_block(BlockKind::Heading1, "Title")]);
    editor.set_selection(caret(vec![0], 0));

    assert!(editor.toggle_block_type(BlockKind::Heading1));
    assert_eq!(kinds(&editor), vec![BlockKind::Paragraph]);
}

#[test]
fn set_block_type_requires_selection_and_text_kind() {
    let mut editor = editor_with(vec![Node::paragraph("Body")]);
    let path = Path::new_root(0);

    assert!(!editor.set_block_type(&path, BlockKind::Heading2));

    editor.set_selection(caret(vec![0, 0], 0));
    assert!(!editor.set_block_type(&path, BlockKind::OrderedList));
    assert!(editor.set_block_type(&path, BlockKind::Heading2));
    assert!(!editor.set_block_type(&path, BlockKind::Heading2));
    assert!(!editor.set_block_type(&Path::new_root(3), BlockKind::Heading1));
    assert_eq!(kinds(&editor), vec![BlockKind::Heading2]);
}

#[test]
fn insert_list_adds_sibling_after_selected_block() {
    let mut editor = editor_with(vec![Node::paragraph("first"), Node::paragraph("last")]);
    editor.set_selection(caret(vec![0, 0], 3));

    assert!(editor.insert_list(true));

    let doc = editor.document();
    assert_eq!(doc.blocks.len(), 3);
    assert_eq!(doc.blocks[0], Node::paragraph("first"));
    assert_eq!(doc.blocks[1], Node::list(true, vec![Node::list_item("")]));
    assert_eq!(doc.blocks[2], Node::paragraph("last"));
    assert_eq!(editor.selection(), Some(&Selection::caret(vec![1, 0, 0], 0)));
}

#[test]
fn insert_list_from_inside_list_goes_after_top_level_block() {
    let mut editor = editor_with(vec![Node::list(false, vec![Node::list_item("a")])]);
    editor.set_selection(caret(vec![0, 0, 0], 1));

    assert!(editor.insert_list(false));
    assert_eq!(editor.document().blocks.len(), 2);
    assert_eq!(editor.document().blocks[1].kind, BlockKind::UnorderedList);
}

#[test]
fn insert_list_without_selection_is_noop() {
    let mut editor = editor_with(vec![Node::paragraph("first")]);
    assert!(!editor.insert_list(false));
    assert_eq!(editor.document().blocks.len(), 1);
}

#[test]
fn horizontal_rule_goes_after_selected_block() {
    let mut editor = editor_with(vec![Node::paragraph("a"), Node::paragraph("b")]);
    editor.set_selection(Some(Selection::new(
        Point::new(vec![0, 0], 0),
        Point::new(vec![1, 0], 1),
    )));

    assert!(editor.insert_horizontal_rule());

    assert_eq!(
        kinds(&editor),
        vec![
            BlockKind::Paragraph,
            BlockKind::HorizontalRule,
            BlockKind::Paragraph
        ]
    );
    // The focus moved along with the block it points into.
    assert_eq!(
        editor.selection().map(|s| s.focus.path.clone()),
        Some(Path::new(vec![2, 0]))
    );
}

#[test]
fn horizontal_rule_without_selection_appends() {
    let mut editor = editor_with(vec![Node::paragraph("a"), Node::paragraph("b")]);

    assert!(editor.insert_horizontal_rule());

    let doc = editor.document();
    assert_eq!(doc.blocks.last(), Some(&Node::horizontal_rule()));
    assert_eq!(doc.blocks.len(), 3);
}

#[test]
fn horizontal_rule_with_stale_selection_is_noop() {
    let mut editor = editor_with(vec![Node::paragraph("a")]);
    editor.set_selection(caret(vec![2, 0], 0));

    assert!(!editor.insert_horizontal_rule());
    assert_eq!(editor.document().blocks.len(), 1);
}

#[test]
fn indent_is_binary() {
    let mut editor = editor_with(vec![Node::paragraph("a")]);
    let path = Path::new_root(0);

    assert!(!editor.indent(&path));

    editor.set_selection(caret(vec![0, 0], 0));
    assert!(editor.can_indent_more());
    assert!(editor.indent(&path));
    assert!(!editor.indent(&path));
    assert_eq!(editor.document().blocks[0].indent_level, 1);
    assert!(editor.can_indent_less());

    assert!(editor.outdent(&path));
    assert!(!editor.outdent(&path));
    assert_eq!(editor.document().blocks[0].indent_level, 0);
}

#[test]
fn indent_current_block_targets_anchor_block() {
    let mut editor = editor_with(vec![Node::paragraph("a"), Node::paragraph("b")]);
    editor.set_selection(caret(vec![1, 0], 0));

    assert!(editor.indent_current_block());
    assert_eq!(editor.document().blocks[0].indent_level, 0);
    assert_eq!(editor.document().blocks[1].indent_level, 1);

    assert!(editor.outdent_current_block());
    assert_eq!(editor.document().blocks[1].indent_level, 0);
}

#[test]
fn indent_stale_path_is_noop() {
    let mut editor = editor_with(vec![Node::paragraph("a")]);
    editor.set_selection(caret(vec![0, 0], 0));
    assert!(!editor.indent(&Path::new(vec![0, 5])));
}

#[test]
fn clear_formatting_resets_marks_and_block_kind() {
    let heading = Node::with_runs(
        BlockKind::Heading2,
        vec![
            TextRun::new("Hello ").with_mark(Mark::Italic),
            TextRun::new("World").with_mark(Mark::Bold),
        ],
    );
    let mut editor = editor_with(vec![heading]);
    editor.set_selection(Some(Selection::new(
        Point::new(vec![0, 0], 0),
        Point::new(vec![0, 1], 5),
    )));
    assert!(editor.apply_color("#ff0000"));

    assert!(editor.clear_formatting());

    assert_eq!(editor.document().blocks, vec![Node::paragraph("Hello World")]);
}

#[test]
fn clear_formatting_with_caret_only_resets_block() {
    let heading = Node::with_runs(
        BlockKind::Heading1,
        vec![TextRun::new("Bold").with_mark(Mark::Bold)],
    );
    let mut editor = editor_with(vec![heading]);
    editor.set_selection(caret(vec![0, 0], 2));

    assert!(editor.clear_formatting());

    let block = &editor.document().blocks[0];
    assert_eq!(block.kind, BlockKind::Paragraph);
    assert_eq!(
        block.children,
        vec![Content::Text(TextRun::new("Bold").with_mark(Mark::Bold))]
    );
}

#[test]
fn clear_formatting_with_stale_selection_changes_nothing() {
    let heading = Node::text_block(BlockKind::Heading1, "Title");
    let mut editor = editor_with(vec![heading.clone()]);
    editor.set_selection(caret(vec![0, 3], 0));

    assert!(!editor.clear_formatting());
    assert_eq!(editor.document().blocks, vec![heading]);
}

#[test]
fn replace_document_drops_selection() {
    let mut editor = editor_with(vec![Node::paragraph("a")]);
    editor.set_selection(caret(vec![0, 0], 0));

    editor.replace_document(Document::new());

    assert!(editor.selection().is_none());
    assert_eq!(editor.document(), &Document::empty());
}

#[test]
fn selected_text_joins_blocks_with_newlines() {
    let mut editor = editor_with(vec![
        Node::paragraph("The moon"),
        Node::paragraph("is cheese"),
    ]);
    let selection = Selection::new(Point::new(vec![1, 0], 9), Point::new(vec![0, 0], 4));
    editor.set_selection(Some(selection.clone()));

    assert_eq!(editor.selected_text(&selection), "moon\nis cheese");
}

#[test]
fn block_range_spans_runs() {
    let paragraph = Node::with_runs(
        BlockKind::Paragraph,
        vec![TextRun::new("The "), TextRun::new("moon").with_mark(Mark::Bold)],
    );
    let editor = editor_with(vec![paragraph]);

    let range = editor.block_range(&Path::new_root(0), 2, usize::MAX);

    assert_eq!(
        range,
        Some(Selection::new(
            Point::new(vec![0, 0], 2),
            Point::new(vec![0, 1], 4)
        ))
    );
    let text = range.map(|selection| editor.selected_text(&selection));
    assert_eq!(text.as_deref(), Some("e moon"));
    assert_eq!(editor.block_range(&Path::new_root(3), 0, 1), None);
}

#[test]
fn segments_skip_comment_runs() {
    let editor = editor_with(vec![
        Node::paragraph("a"),
        Node::comment("AI", "note"),
        Node::list(false, vec![Node::list_item("b")]),
    ]);

    let runs: Vec<Path> = editor.segments().into_iter().map(|s| s.run_path).collect();
    assert_eq!(runs, vec![Path::new(vec![0, 0]), Path::new(vec![2, 0, 0])]);
}
