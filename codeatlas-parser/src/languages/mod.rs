pub mod c;
pub mod generic;
pub mod javascript;
pub mod python;
pub mod rust;
pub mod typescript;

use tree_sitter::Node;

/// UTF-8 slice of `src` covered by `node`, replacing invalid sequences
/// rather than failing the whole file over one bad byte range.
pub(crate) fn node_text<'a>(node: Node, src: &'a [u8]) -> std::borrow::Cow<'a, str> {
    String::from_utf8_lossy(&src[node.start_byte()..node.end_byte()])
}

/// 1-based line number for a tree-sitter point row.
pub(crate) fn line1(row: usize) -> u32 {
    (row + 1) as u32
}

/// Walks backward over `comment`-kind siblings immediately preceding
/// `node` (no blank line between them) and joins them as a docstring.
/// Tree-sitter grammars for C-family/Rust/JS/TS all expose comments as
/// regular siblings, so this is shared across languages.
pub(crate) fn leading_comment_doc(node: Node, src: &[u8], comment_kind: &str) -> Option<String> {
    let mut lines = Vec::new();
    let mut cur = node.prev_sibling();
    let mut expected_row = node.start_position().row;
    while let Some(n) = cur {
        if n.kind() != comment_kind {
            break;
        }
        if expected_row == 0 || n.end_position().row + 1 != expected_row {
            break;
        }
        lines.push(node_text(n, src).trim().trim_start_matches('/').trim().to_string());
        expected_row = n.start_position().row;
        cur = n.prev_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

/// Find the first direct child whose field name matches `field`.
pub(crate) fn field_text<'a>(node: Node, field: &str, src: &'a [u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(n, src).to_string())
}
