use pretty_assertions::assert_eq;

use super::content::{
    char_to_byte_idx, format_run_range, prune_and_merge_runs, slice_chars, split_text,
};
use crate::document::{BlockKind, Content, Document, Mark, Node, Path, TextRun};

fn runs(document: &Document, block: usize) -> Vec<TextRun> {
    document.blocks[block]
        .children
        .iter()
        .filter_map(Content::as_text)
        .cloned()
        .collect()
}

fn make_bold(run: &mut TextRun) -> bool {
    run.set_mark(Mark::Bold, true)
}

#[test]
fn char_to_byte_idx_handles_multibyte_text() {
    let text = "héllo wörld";
    assert_eq!(char_to_byte_idx(text, 0), 0);
    assert_eq!(char_to_byte_idx(text, 2), 3);
    assert_eq!(char_to_byte_idx(text, 11), text.len());
    assert_eq!(char_to_byte_idx(text, 50), text.len());
}

#[test]
fn split_text_divides_on_characters() {
    assert_eq!(
        split_text("naïve", 3),
        ("naï".to_string(), "ve".to_string())
    );
    assert_eq!(split_text("abc", 0), (String::new(), "abc".to_string()));
}

#[test]
fn slice_chars_clamps_to_text() {
    assert_eq!(slice_chars("hello", 1, 3), "el");
    assert_eq!(slice_chars("hello", 3, 99), "lo");
    assert_eq!(slice_chars("hello", 4, 2), "");
}

#[test]
fn format_run_range_splits_into_three_runs() {
    let mut document = Document::with_blocks(vec![Node::paragraph("hello world")]);

    assert!(format_run_range(
        &mut document,
        &Path::new(vec![0, 0]),
        2,
        5,
        &make_bold
    ));

    assert_eq!(
        runs(&document, 0),
        vec![
            TextRun::new("he"),
            TextRun::new("llo").with_mark(Mark::Bold),
            TextRun::new(" world"),
        ]
    );
}

#[test]
fn format_run_range_covering_whole_run_keeps_one_run() {
    let mut document = Document::with_blocks(vec![Node::paragraph("hello")]);

    assert!(format_run_range(
        &mut document,
        &Path::new(vec![0, 0]),
        0,
        5,
        &make_bold
    ));

    assert_eq!(
        runs(&document, 0),
        vec![TextRun::new("hello").with_mark(Mark::Bold)]
    );
}

#[test]
fn format_run_range_without_change_leaves_runs_untouched() {
    let bold = TextRun::new("hello").with_mark(Mark::Bold);
    let mut document = Document::with_blocks(vec![Node::with_runs(
        BlockKind::Paragraph,
        vec![bold.clone()],
    )]);

    assert!(!format_run_range(
        &mut document,
        &Path::new(vec![0, 0]),
        1,
        3,
        &make_bold
    ));
    assert_eq!(runs(&document, 0), vec![bold]);
}

#[test]
fn format_run_range_rejects_missing_or_empty_ranges() {
    let mut document = Document::with_blocks(vec![Node::paragraph("hello")]);

    assert!(!format_run_range(
        &mut document,
        &Path::new(vec![0, 4]),
        0,
        2,
        &make_bold
    ));
    assert!(!format_run_range(
        &mut document,
        &Path::new(vec![0, 0]),
        3,
        3,
        &make_bold
    ));
    assert_eq!(runs(&document, 0), vec![TextRun::new("hello")]);
}

#[test]
fn prune_and_merge_joins_equal_neighbours() {
    let mut children = vec![
        Content::Text(TextRun::new("a").with_mark(Mark::Italic)),
        Content::Text(TextRun::new("")),
        Content::Text(TextRun::new("b").with_mark(Mark::Italic)),
        Content::Text(TextRun::new("c")),
    ];

    prune_and_merge_runs(&mut children);

    assert_eq!(
        children,
        vec![
            Content::Text(TextRun::new("ab").with_mark(Mark::Italic)),
            Content::Text(TextRun::new("c")),
        ]
    );
}

#[test]
fn prune_keeps_a_single_empty_run() {
    let mut children = vec![
        Content::Text(TextRun::new("")),
        Content::Text(TextRun::new("")),
    ];

    prune_and_merge_runs(&mut children);

    assert_eq!(children, vec![Content::Text(TextRun::new(""))]);
}

#[test]
fn merge_does_not_cross_nested_nodes() {
    let mut children = vec![
        Content::Text(TextRun::new("a")),
        Content::Node(Node::list_item("x")),
        Content::Text(TextRun::new("b")),
    ];
    let expected = children.clone();

    prune_and_merge_runs(&mut children);

    assert_eq!(children, expected);
}
