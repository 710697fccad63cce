//! The node model: arena storage, the source text and the semantic index.

use std::fmt;
use std::hash::Hash;
use std::sync::OnceLock;

use la_arena::Arena;
use line_index::LineIndex;
use rustc_hash::FxHashMap;
use strand_errors::Diagnostic;
use text_size::TextSize;

use crate::nodes::{Composite, NodeData, NodeId, Variant};
use crate::{Builder, Node};

/// A lossless concrete syntax tree over one source text.
///
/// `G` is the grammar element type reported by the driver, `E` the semantic
/// element type. A finished model is read-only; call `into_builder` to mutate
/// it again.
pub struct NodeModel<G, E> {
    pub(crate) nodes: Arena<NodeData<G, E>>,
    pub(crate) text: Box<str>,
    pub(crate) root: NodeId,
    /// Element → node side of the semantic association.
    pub(crate) semantic_index: FxHashMap<E, NodeId>,
    pub(crate) line_index: OnceLock<LineIndex>,
}

impl<G, E> NodeModel<G, E> {
    pub(crate) fn new(text: &str) -> Self {
        assert!(u32::try_from(text.len()).is_ok(), "source text does not fit into `TextSize`");
        let mut nodes = Arena::new();
        let root = nodes.alloc(NodeData::new(Variant::Root(Composite::new(0), None), None));
        Self {
            nodes,
            text: text.into(),
            root: NodeId::from_idx(root),
            semantic_index: FxHashMap::default(),
            line_index: OnceLock::new(),
        }
    }

    #[inline]
    pub(crate) fn data(&self, id: NodeId) -> &NodeData<G, E> {
        &self.nodes[id.idx()]
    }

    #[inline]
    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData<G, E> {
        &mut self.nodes[id.idx()]
    }

    pub(crate) fn alloc(&mut self, data: NodeData<G, E>) -> NodeId {
        NodeId::from_idx(self.nodes.alloc(data))
    }

    #[track_caller]
    pub(crate) fn expect_live(&self, id: NodeId) {
        if let Some(by) = self.data(id).replaced_by {
            panic!("{id:?} has been replaced by {by:?}");
        }
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node<'_, G, E> {
        self.node(self.root)
    }

    /// Returns the complete source text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        TextSize::of(&*self.text)
    }

    /// Returns a handle for `id`, which may be stale.
    #[inline]
    #[track_caller]
    pub fn node(&self, id: NodeId) -> Node<'_, G, E> {
        assert!(id.index() < self.nodes.len() as u32, "{id:?} does not belong to this model");
        Node::new(self, id)
    }

    /// Number of allocated nodes, stale ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the root has no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root().first_child().is_none()
    }

    /// Returns `true` if `id` was replaced by another node.
    #[inline]
    pub fn is_stale(&self, id: NodeId) -> bool {
        self.data(id).replaced_by.is_some()
    }

    /// Follows replacements until the live node that took `id`'s place.
    pub fn resolve(&self, mut id: NodeId) -> NodeId {
        while let Some(next) = self.data(id).replaced_by {
            id = next;
        }
        id
    }

    pub(crate) fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(&self.text))
    }

    /// Returns the innermost node covering `offset`.
    ///
    /// A node covers `offset` when `start <= offset < end`; the end of the
    /// text is covered by the nodes ending there. Empty composites never
    /// cover anything. Returns `None` past the end of the text.
    pub fn innermost_node_at(&self, offset: TextSize) -> Option<Node<'_, G, E>> {
        let text_len = self.text_len();
        if offset > text_len {
            return None;
        }
        let covers = |node: Node<'_, G, E>| {
            let range = node.total_range();
            !range.is_empty()
                && (range.contains(offset) || (offset == text_len && range.end() == text_len))
        };
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                if covers(child) {
                    node = child;
                    continue 'descend;
                }
            }
            return Some(node);
        }
    }

    /// Returns the leaf covering `offset`, if any.
    pub fn leaf_at_offset(&self, offset: TextSize) -> Option<Node<'_, G, E>> {
        self.innermost_node_at(offset).filter(|node| node.is_leaf())
    }

    /// Iterates nodes carrying a syntax error, in document order.
    pub fn syntax_errors(&self) -> impl Iterator<Item = Node<'_, G, E>> + '_ {
        self.root().descendants().filter(|node| node.syntax_error().is_some())
    }

    /// Returns one diagnostic per syntax error, in document order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.syntax_errors()
            .filter_map(|node| {
                let error = node.syntax_error()?;
                Some(Diagnostic::from_syntax_error(error, node.range()))
            })
            .collect()
    }

    /// Re-opens a finished model for mutation.
    pub fn into_builder(self) -> Builder<G, E> {
        Builder::from_model(self)
    }
}

impl<G, E: Eq + Hash> NodeModel<G, E> {
    /// Looks up the node currently bound to `element`.
    pub fn node_for_semantic_element(&self, element: &E) -> Option<Node<'_, G, E>> {
        self.semantic_index.get(element).map(|&id| self.node(id))
    }
}

impl<G, E> fmt::Debug for NodeModel<G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeModel")
            .field("text_len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}
