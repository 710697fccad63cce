use std::fmt::{Debug, Write as _};

use crate::syntax::WalkEvent;
use crate::{Node, NodeModel};

impl<G: Debug, E: Debug> Node<'_, G, E> {
    /// Renders this subtree one node per line, indented by depth.
    ///
    /// Hidden leaves are only shown when `show_hidden` is set.
    pub fn compact_dump(self, show_hidden: bool) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for event in self.preorder() {
            match event {
                WalkEvent::Enter(node) => {
                    if node.is_hidden() && !show_hidden {
                        continue;
                    }
                    dump_line(&mut out, node, depth);
                    depth += 1;
                }
                WalkEvent::Leave(node) => {
                    if node.is_hidden() && !show_hidden {
                        continue;
                    }
                    depth -= 1;
                }
            }
        }
        out
    }
}

impl<G: Debug, E: Debug> NodeModel<G, E> {
    /// `compact_dump` of the whole tree, hidden leaves included.
    pub fn debug_tree(&self) -> String {
        self.root().compact_dump(true)
    }
}

fn dump_line<G: Debug, E: Debug>(out: &mut String, node: Node<'_, G, E>, depth: usize) {
    let indent = depth * 2;
    let _ = write!(out, "{:indent$}{:?}@{:?}", "", node.kind(), node.total_range());
    if let Some(grammar_element) = node.grammar_element() {
        let _ = write!(out, " {grammar_element:?}");
    }
    if node.is_leaf() {
        let _ = write!(out, " {:?}", node.total_text());
    } else if let Some(lookahead) = node.lookahead()
        && lookahead != 0
    {
        let _ = write!(out, " la={lookahead}");
    }
    if let Some(element) = node.semantic_element() {
        let _ = write!(out, " semantic={element:?}");
    }
    if let Some(error) = node.syntax_error() {
        let _ = write!(out, " error={:?}", error.message());
    }
    out.push('\n');
}
