//! Typed node tree for a page body.
//!
//! A [`Document`] is an ordered list of top-level [`Node`]s. Every node holds
//! an ordered list of [`Content`] children, which are either nested nodes or
//! [`TextRun`] leaves carrying inline formatting. Nodes are addressed by
//! [`Path`]: the child index taken at every level, starting from the root.
//!
//! Paths are only meaningful against the snapshot they were derived from. Any
//! structural edit (insert, remove, run split or merge) may shift sibling
//! indices, so the editor re-derives paths from the current tree before each
//! mutation and treats [`DocumentError::PathNotFound`] as a stale selection.
//!
//! The serde representation is the wire format used for page `content`:
//! elements are `{"type": .., "children": [..]}` objects and text leaves are
//! `{"text": .., "bold": true, ..}` objects.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;

mod outline;

pub const AI_AUTHOR: &str = "AI";

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    indices: Vec<usize>,
}

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn new_root(idx: usize) -> Self {
        Self { indices: vec![idx] }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn push(&mut self, idx: usize) {
        self.indices.push(idx);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop()
    }

    pub fn child(&self, idx: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(idx);
        Self { indices }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, prefix) = self.indices.split_last()?;
        Some(Self {
            indices: prefix.to_vec(),
        })
    }

    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Index of the top-level block this path descends from.
    pub fn top(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.indices.starts_with(&prefix.indices)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.indices)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    OrderedList,
    UnorderedList,
    ListItem,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    Comment,
    /// An element type this crate does not edit. The node keeps its wire
    /// type in [`Node::embed_type`] and is carried through untouched.
    Embed,
}

impl BlockKind {
    const WIRE_NAMES: [(BlockKind, &'static str); 11] = [
        (Self::Paragraph, "p"),
        (Self::Heading1, "h1"),
        (Self::Heading2, "h2"),
        (Self::Heading3, "h3"),
        (Self::OrderedList, "ol"),
        (Self::UnorderedList, "ul"),
        (Self::ListItem, "li"),
        (Self::Blockquote, "blockquote"),
        (Self::CodeBlock, "code_block"),
        (Self::HorizontalRule, "hr"),
        (Self::Comment, "comment"),
    ];

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::WIRE_NAMES
            .iter()
            .find(|(_, wire)| *wire == name)
            .map(|(kind, _)| *kind)
    }

    /// `None` for [`BlockKind::Embed`], whose name lives on the node.
    pub fn wire_name(self) -> Option<&'static str> {
        Self::WIRE_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, wire)| *wire)
    }

    /// Kinds that share the single "active block kind" slot of a text block.
    pub fn is_text_kind(self) -> bool {
        matches!(
            self,
            Self::Paragraph
                | Self::Heading1
                | Self::Heading2
                | Self::Heading3
                | Self::Blockquote
                | Self::CodeBlock
        )
    }

    pub fn is_void(self) -> bool {
        matches!(self, Self::HorizontalRule | Self::Comment | Self::Embed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Paragraph => "Paragraph",
            Self::Heading1 => "Heading 1",
            Self::Heading2 => "Heading 2",
            Self::Heading3 => "Heading 3",
            Self::OrderedList => "Ordered List",
            Self::UnorderedList => "Unordered List",
            Self::ListItem => "List Item",
            Self::Blockquote => "Quote",
            Self::CodeBlock => "Code",
            Self::HorizontalRule => "Horizontal Rule",
            Self::Comment => "Comment",
            Self::Embed => "Embedded",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl Mark {
    pub const ALL: [Mark; 4] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strikethrough,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mark::Bold => "Bold",
            Mark::Italic => "Italic",
            Mark::Underline => "Underline",
            Mark::Strikethrough => "Strikethrough",
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        rename = "backgroundColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
    #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    /// Leaf keys this crate has no field for, such as marks added by other
    /// editor plugins.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.set_mark(mark, true);
        self
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
        }
    }

    /// Returns true when the flag actually changed.
    pub fn set_mark(&mut self, mark: Mark, enabled: bool) -> bool {
        let slot = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Strikethrough => &mut self.strikethrough,
        };
        let previous = *slot;
        *slot = enabled;
        previous != enabled
    }

    pub fn marks(&self) -> Vec<Mark> {
        Mark::ALL
            .into_iter()
            .filter(|mark| self.has_mark(*mark))
            .collect()
    }

    pub fn has_formatting(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.strikethrough
            || self.color.is_some()
            || self.background_color.is_some()
            || self.font_size.is_some()
            || !self.extra.is_empty()
    }

    /// Two runs with the same formatting can be merged into one.
    pub fn same_format(&self, other: &TextRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strikethrough == other.strikethrough
            && self.color == other.color
            && self.background_color == other.background_color
            && self.font_size == other.font_size
            && self.extra == other.extra
    }

    pub fn clear_formatting(&mut self) -> bool {
        let changed = self.has_formatting();
        let text = std::mem::take(&mut self.text);
        *self = Self::new(text);
        changed
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NodeWire", into = "NodeWire")]
pub struct Node {
    pub kind: BlockKind,
    /// Wire type of an [`BlockKind::Embed`] node.
    pub embed_type: Option<String>,
    pub author: Option<String>,
    pub indent_level: u8,
    pub children: Vec<Content>,
    /// Element keys this crate has no field for, such as node ids.
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct NodeWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    indent: u8,
    #[serde(default)]
    children: Vec<Content>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<NodeWire> for Node {
    fn from(wire: NodeWire) -> Self {
        let (kind, embed_type) = match BlockKind::from_wire(&wire.kind) {
            Some(kind) => (kind, None),
            None => (BlockKind::Embed, Some(wire.kind)),
        };
        Self {
            kind,
            embed_type,
            author: wire.author,
            indent_level: wire.indent,
            children: wire.children,
            extra: wire.extra,
        }
    }
}

impl From<Node> for NodeWire {
    fn from(node: Node) -> Self {
        let kind = match (node.kind.wire_name(), node.embed_type) {
            (Some(name), _) => name.to_string(),
            (None, Some(name)) => name,
            (None, None) => String::new(),
        };
        Self {
            kind,
            author: node.author,
            indent: node.indent_level,
            children: node.children,
            extra: node.extra,
        }
    }
}

impl Node {
    pub fn new(kind: BlockKind, children: Vec<Content>) -> Self {
        Self {
            kind,
            embed_type: None,
            author: None,
            indent_level: 0,
            children,
            extra: Map::new(),
        }
    }

    pub fn text_block(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![Content::Text(TextRun::new(text))])
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::text_block(BlockKind::Paragraph, text)
    }

    pub fn with_runs(kind: BlockKind, runs: Vec<TextRun>) -> Self {
        Self::new(kind, runs.into_iter().map(Content::Text).collect())
    }

    pub fn list(ordered: bool, items: Vec<Node>) -> Self {
        let kind = if ordered {
            BlockKind::OrderedList
        } else {
            BlockKind::UnorderedList
        };
        Self::new(kind, items.into_iter().map(Content::Node).collect())
    }

    pub fn list_item(text: impl Into<String>) -> Self {
        Self::text_block(BlockKind::ListItem, text)
    }

    pub fn horizontal_rule() -> Self {
        Self::text_block(BlockKind::HorizontalRule, "")
    }

    pub fn comment(author: impl Into<String>, text: impl Into<String>) -> Self {
        let mut node = Self::text_block(BlockKind::Comment, text);
        node.author = Some(author.into());
        node
    }

    pub fn with_indent(mut self, level: u8) -> Self {
        self.indent_level = level;
        self
    }

    pub fn is_void(&self) -> bool {
        self.kind.is_void()
    }

    /// Concatenated text of every run below this node.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Adds an empty run to every node without children so the tree keeps
    /// its "no empty elements" shape after loading foreign content. Embedded
    /// nodes are left exactly as loaded.
    fn normalize(&mut self) {
        if self.kind == BlockKind::Embed {
            return;
        }
        if self.children.is_empty() {
            self.children.push(Content::Text(TextRun::new("")));
        }
        for child in &mut self.children {
            if let Content::Node(node) = child {
                node.normalize();
            }
        }
    }
}

fn collect_text(children: &[Content], out: &mut String) {
    for child in children {
        match child {
            Content::Text(run) => out.push_str(&run.text),
            Content::Node(node) => collect_text(&node.children, out),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Node(Node),
    Text(TextRun),
}

impl Content {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Content::Node(node) => Some(node),
            Content::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Content::Text(run) => Some(run),
            Content::Node(_) => None,
        }
    }
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(node)
    }
}

impl From<TextRun> for Content {
    fn from(run: TextRun) -> Self {
        Content::Text(run)
    }
}

/// Borrowed view of whatever a [`Path`] resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentRef<'a> {
    Node(&'a Node),
    Text(&'a TextRun),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn with_blocks(blocks: Vec<Node>) -> Self {
        Self { blocks }
    }

    /// The canonical empty page body: a single empty paragraph.
    pub fn empty() -> Self {
        Self::with_blocks(vec![Node::paragraph("")])
    }

    pub fn ensure_initialized(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Node::paragraph(""));
        }
        for block in &mut self.blocks {
            block.normalize();
        }
    }

    pub fn is_blank(&self) -> bool {
        self.blocks
            .iter()
            .all(|block| !block.is_void() && block.plain_text().is_empty())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn node_at(&self, path: &Path) -> Result<ContentRef<'_>, DocumentError> {
        let not_found = || DocumentError::PathNotFound(path.clone());
        let (first, rest) = path.indices().split_first().ok_or_else(not_found)?;
        let mut node = self.blocks.get(*first).ok_or_else(not_found)?;
        for (depth, idx) in rest.iter().enumerate() {
            match node.children.get(*idx) {
                Some(Content::Node(child)) => node = child,
                Some(Content::Text(run)) if depth + 1 == rest.len() => {
                    return Ok(ContentRef::Text(run));
                }
                _ => return Err(not_found()),
            }
        }
        Ok(ContentRef::Node(node))
    }

    pub fn block(&self, path: &Path) -> Option<&Node> {
        match self.node_at(path).ok()? {
            ContentRef::Node(node) => Some(node),
            ContentRef::Text(_) => None,
        }
    }

    pub fn text_run(&self, path: &Path) -> Option<&TextRun> {
        match self.node_at(path).ok()? {
            ContentRef::Text(run) => Some(run),
            ContentRef::Node(_) => None,
        }
    }

    pub fn block_mut(&mut self, path: &Path) -> Option<&mut Node> {
        node_mut(&mut self.blocks, path.indices())
    }

    pub fn text_run_mut(&mut self, path: &Path) -> Option<&mut TextRun> {
        let (last, prefix) = path.indices().split_last()?;
        let parent = node_mut(&mut self.blocks, prefix)?;
        match parent.children.get_mut(*last)? {
            Content::Text(run) => Some(run),
            Content::Node(_) => None,
        }
    }

    pub fn replace_subtree(
        &mut self,
        path: &Path,
        replacement: Content,
    ) -> Result<Content, DocumentError> {
        let not_found = || DocumentError::PathNotFound(path.clone());
        let (last, prefix) = path.indices().split_last().ok_or_else(not_found)?;
        if prefix.is_empty() {
            let Content::Node(node) = replacement else {
                return Err(DocumentError::NotABlock(path.clone()));
            };
            let slot = self.blocks.get_mut(*last).ok_or_else(not_found)?;
            return Ok(Content::Node(std::mem::replace(slot, node)));
        }
        let parent = node_mut(&mut self.blocks, prefix).ok_or_else(not_found)?;
        let slot = parent.children.get_mut(*last).ok_or_else(not_found)?;
        Ok(std::mem::replace(slot, replacement))
    }

    /// Inserts `content` so that it ends up at `path`. The last index may be
    /// one past the current number of siblings, which appends.
    pub fn insert_at(&mut self, path: &Path, content: Content) -> Result<(), DocumentError> {
        let not_found = || DocumentError::PathNotFound(path.clone());
        let (last, prefix) = path.indices().split_last().ok_or_else(not_found)?;
        if prefix.is_empty() {
            let Content::Node(node) = content else {
                return Err(DocumentError::NotABlock(path.clone()));
            };
            if *last > self.blocks.len() {
                return Err(not_found());
            }
            self.blocks.insert(*last, node);
            return Ok(());
        }
        let parent = node_mut(&mut self.blocks, prefix).ok_or_else(not_found)?;
        if *last > parent.children.len() {
            return Err(not_found());
        }
        parent.children.insert(*last, content);
        Ok(())
    }

    pub fn remove_at(&mut self, path: &Path) -> Result<Content, DocumentError> {
        let not_found = || DocumentError::PathNotFound(path.clone());
        let (last, prefix) = path.indices().split_last().ok_or_else(not_found)?;
        if prefix.is_empty() {
            if *last >= self.blocks.len() {
                return Err(not_found());
            }
            return Ok(Content::Node(self.blocks.remove(*last)));
        }
        let parent = node_mut(&mut self.blocks, prefix).ok_or_else(not_found)?;
        if *last >= parent.children.len() {
            return Err(not_found());
        }
        Ok(parent.children.remove(*last))
    }

    pub fn push(&mut self, node: Node) -> Path {
        self.blocks.push(node);
        Path::new_root(self.blocks.len() - 1)
    }

    /// Number of `comment` nodes anywhere in the tree.
    pub fn comment_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            let own = usize::from(node.kind == BlockKind::Comment);
            own + node
                .children
                .iter()
                .filter_map(Content::as_node)
                .map(count)
                .sum::<usize>()
        }
        self.blocks.iter().map(count).sum()
    }
}

fn node_mut<'a>(blocks: &'a mut [Node], indices: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = indices.split_first()?;
    let mut node = blocks.get_mut(*first)?;
    for idx in rest {
        node = match node.children.get_mut(*idx)? {
            Content::Node(child) => child,
            Content::Text(_) => return None,
        };
    }
    Some(node)
}
