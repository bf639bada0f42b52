use super::{BlockKind, Content, Document, Node};

impl Document {
    /// Plain-text outline of the page, one line per text block, with light
    /// Markdown-style prefixes so structure stays visible in a terminal.
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            outline_node(block, 0, &mut lines);
        }
        lines.join("\n")
    }
}

fn outline_node(node: &Node, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth + usize::from(node.indent_level));
    match node.kind {
        BlockKind::OrderedList | BlockKind::UnorderedList => {
            let mut number = 0;
            for child in &node.children {
                match child {
                    Content::Node(item) if item.kind == BlockKind::ListItem => {
                        number += 1;
                        let bullet = if node.kind == BlockKind::OrderedList {
                            format!("{number}. ")
                        } else {
                            "- ".to_string()
                        };
                        lines.push(format!("{indent}{bullet}{}", inline_text(item)));
                        for nested in item.children.iter().filter_map(Content::as_node) {
                            outline_node(nested, depth + 1, lines);
                        }
                    }
                    Content::Node(other) => outline_node(other, depth + 1, lines),
                    Content::Text(run) => lines.push(format!("{indent}{}", run.text)),
                }
            }
        }
        BlockKind::HorizontalRule => lines.push(format!("{indent}---")),
        BlockKind::CodeBlock => {
            lines.push(format!("{indent}```"));
            for line in inline_text(node).lines() {
                lines.push(format!("{indent}{line}"));
            }
            lines.push(format!("{indent}```"));
        }
        BlockKind::Embed => {
            let kind = node.embed_type.as_deref().unwrap_or("embed");
            lines.push(format!("{indent}[{kind}]"));
        }
        BlockKind::Comment => {
            let author = node.author.as_deref().unwrap_or("?");
            lines.push(format!("{indent}[{author}] {}", node.plain_text()));
        }
        kind => {
            let prefix = match kind {
                BlockKind::Heading1 => "# ",
                BlockKind::Heading2 => "## ",
                BlockKind::Heading3 => "### ",
                BlockKind::Blockquote => "> ",
                _ => "",
            };
            lines.push(format!("{indent}{prefix}{}", inline_text(node)));
            for nested in node.children.iter().filter_map(Content::as_node) {
                outline_node(nested, depth + 1, lines);
            }
        }
    }
}

/// Text of the runs directly inside `node`, ignoring nested blocks.
fn inline_text(node: &Node) -> String {
    node.children
        .iter()
        .filter_map(Content::as_text)
        .map(|run| run.text.as_str())
        .collect()
}
