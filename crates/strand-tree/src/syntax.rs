//! Read-only node handles and traversal.

use std::fmt;

use strand_errors::SyntaxErrorMessage;
use text_size::{TextRange, TextSize};

use crate::NodeModel;
use crate::nodes::{NodeData, NodeId, NodeKind, Variant};

/// Node handle tied to the lifetime of the model.
pub struct Node<'a, G, E> {
    model: &'a NodeModel<G, E>,
    id: NodeId,
}

impl<G, E> Clone for Node<'_, G, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<G, E> Copy for Node<'_, G, E> {}

impl<G, E> PartialEq for Node<'_, G, E> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.id == other.id
    }
}

impl<G, E> Eq for Node<'_, G, E> {}

impl<G, E> fmt::Debug for Node<'_, G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}@{:?}", self.kind(), self.id, self.total_range())
    }
}

impl<'a, G, E> Node<'a, G, E> {
    #[inline]
    pub(crate) fn new(model: &'a NodeModel<G, E>, id: NodeId) -> Self {
        Self { model, id }
    }

    #[inline]
    fn data(self) -> &'a NodeData<G, E> {
        self.model.data(self.id)
    }

    #[inline]
    fn with(self, id: NodeId) -> Self {
        Self { model: self.model, id }
    }

    #[inline]
    pub fn id(self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn model(self) -> &'a NodeModel<G, E> {
        self.model
    }

    #[inline]
    pub fn kind(self) -> NodeKind {
        self.data().variant.kind()
    }

    #[inline]
    pub fn is_leaf(self) -> bool {
        self.kind().is_leaf()
    }

    #[inline]
    pub fn is_composite(self) -> bool {
        self.kind().is_composite()
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self.kind().is_hidden()
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self.kind() == NodeKind::Root
    }

    /// Returns `true` if this node has been replaced.
    #[inline]
    pub fn is_stale(self) -> bool {
        self.data().replaced_by.is_some()
    }

    #[inline]
    pub fn root(self) -> Self {
        self.model.root()
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        Some(self.with(self.data().parent?))
    }

    /// Returns an iterator of ancestors, starting from the immediate parent.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = Self> + Clone {
        std::iter::successors(self.parent(), |it| it.parent())
    }

    #[inline]
    pub fn first_child(self) -> Option<Self> {
        Some(self.with(self.data().first_child()?))
    }

    #[inline]
    pub fn last_child(self) -> Option<Self> {
        self.first_child()?.previous_in_list()
    }

    /// The next sibling in the circular list; the last child wraps around.
    #[inline]
    pub fn next_in_list(self) -> Option<Self> {
        Some(self.with(self.data().next?))
    }

    /// The previous sibling in the circular list; the first child wraps around.
    #[inline]
    pub fn previous_in_list(self) -> Option<Self> {
        Some(self.with(self.data().previous?))
    }

    #[inline]
    pub fn has_next_sibling(self) -> bool {
        self.next_sibling().is_some()
    }

    #[inline]
    pub fn has_previous_sibling(self) -> bool {
        self.previous_sibling().is_some()
    }

    #[inline]
    pub fn has_siblings(self) -> bool {
        self.data().next.is_some_and(|next| next != self.id)
    }

    /// Returns the next sibling, or `None` for the last child.
    pub fn next_sibling(self) -> Option<Self> {
        let next = self.next_in_list()?;
        let first = self.parent()?.data().first_child()?;
        (next.id != first).then_some(next)
    }

    /// Returns the previous sibling, or `None` for the first child.
    pub fn previous_sibling(self) -> Option<Self> {
        let first = self.parent()?.data().first_child()?;
        if self.id == first {
            return None;
        }
        self.previous_in_list()
    }

    #[inline]
    pub fn children(self) -> Children<'a, G, E> {
        let first = self.first_child();
        Children { next: first, next_back: first.and_then(|first| first.previous_in_list()) }
    }

    /// Returns a preorder iterator over this subtree, this node included.
    #[inline]
    pub fn preorder(self) -> Preorder<'a, G, E> {
        Preorder::new(self)
    }

    /// Iterates this node and all of its descendants in document order.
    pub fn descendants(self) -> impl Iterator<Item = Self> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    /// Iterates the leaves of this subtree in document order.
    pub fn leaves(self) -> impl Iterator<Item = Self> {
        self.descendants().filter(|node| node.is_leaf())
    }

    #[inline]
    pub fn grammar_element(self) -> Option<&'a G> {
        self.data().grammar_element.as_ref()
    }

    /// Returns the look-ahead of a composite node.
    #[inline]
    pub fn lookahead(self) -> Option<u32> {
        self.data().variant.composite().map(|composite| composite.lookahead)
    }

    #[inline]
    pub fn syntax_error(self) -> Option<&'a SyntaxErrorMessage> {
        self.data().variant.syntax_error()
    }

    /// Returns the semantic element bound directly to this node.
    #[inline]
    pub fn semantic_element(self) -> Option<&'a E> {
        self.data().variant.semantic_element()
    }

    #[inline]
    pub fn has_direct_semantic_element(self) -> bool {
        self.semantic_element().is_some()
    }

    /// Returns the semantic element of this node or of its closest bound ancestor.
    pub fn nearest_semantic_element(self) -> Option<&'a E> {
        std::iter::once(self).chain(self.ancestors()).find_map(|node| node.semantic_element())
    }

    /// Start of the span including hidden leaves.
    pub fn total_offset(self) -> TextSize {
        let mut node = self;
        loop {
            match &node.data().variant {
                Variant::Root(..) => return TextSize::new(0),
                variant => match variant.leaf() {
                    Some(leaf) => return leaf.range.start(),
                    None => match node.first_child() {
                        Some(child) => node = child,
                        None => return node.empty_offset(),
                    },
                },
            }
        }
    }

    /// End of the span including hidden leaves.
    pub fn total_end_offset(self) -> TextSize {
        let mut node = self;
        loop {
            match &node.data().variant {
                Variant::Root(..) => return self.model.text_len(),
                variant => match variant.leaf() {
                    Some(leaf) => return leaf.range.end(),
                    None => match node.last_child() {
                        Some(child) => node = child,
                        None => return node.empty_offset(),
                    },
                },
            }
        }
    }

    /// An empty composite sits where its closest preceding sibling ends.
    fn empty_offset(self) -> TextSize {
        let mut node = self;
        loop {
            if let Some(previous) = node.previous_sibling() {
                return previous.total_end_offset();
            }
            match node.parent() {
                Some(parent) if !parent.is_root() => node = parent,
                _ => return TextSize::new(0),
            }
        }
    }

    #[inline]
    pub fn total_length(self) -> TextSize {
        self.total_end_offset() - self.total_offset()
    }

    #[inline]
    pub fn total_range(self) -> TextRange {
        TextRange::new(self.total_offset(), self.total_end_offset())
    }

    /// Span without leading and trailing hidden leaves.
    ///
    /// Falls back to the total span when the subtree has no visible leaf.
    pub fn range(self) -> TextRange {
        if self.is_leaf() {
            return self.total_range();
        }
        let Some(first) = self.leaves().find(|leaf| !leaf.is_hidden()) else {
            return self.total_range();
        };
        let last = self.last_visible_leaf().unwrap_or(first);
        TextRange::new(first.total_offset(), last.total_end_offset())
    }

    #[inline]
    pub fn offset(self) -> TextSize {
        self.range().start()
    }

    #[inline]
    pub fn length(self) -> TextSize {
        self.range().len()
    }

    fn last_visible_leaf(self) -> Option<Self> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                if !node.is_hidden() {
                    return Some(node);
                }
                continue;
            }
            // Pushed in document order, so the last child is popped first.
            stack.extend(node.children());
        }
        None
    }

    #[inline]
    pub fn total_text(self) -> &'a str {
        &self.model.text()[self.total_range()]
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.model.text()[self.range()]
    }

    /// 1-based line of `offset()`.
    pub fn start_line(self) -> u32 {
        self.line_of(self.offset())
    }

    /// 1-based line of the last character of `range()`.
    pub fn end_line(self) -> u32 {
        self.line_of(last_char_offset(self.range()))
    }

    pub fn total_start_line(self) -> u32 {
        self.line_of(self.total_offset())
    }

    pub fn total_end_line(self) -> u32 {
        self.line_of(last_char_offset(self.total_range()))
    }

    fn line_of(self, offset: TextSize) -> u32 {
        self.model.line_index().line_col(offset).line + 1
    }
}

fn last_char_offset(range: TextRange) -> TextSize {
    if range.is_empty() { range.start() } else { range.end() - TextSize::new(1) }
}

/// Iterator over the children of a composite node.
pub struct Children<'a, G, E> {
    next: Option<Node<'a, G, E>>,
    next_back: Option<Node<'a, G, E>>,
}

impl<G, E> Clone for Children<'_, G, E> {
    #[inline]
    fn clone(&self) -> Self {
        Self { next: self.next, next_back: self.next_back }
    }
}

impl<'a, G, E> Iterator for Children<'a, G, E> {
    type Item = Node<'a, G, E>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        if Some(node) == self.next_back {
            self.next = None;
            self.next_back = None;
        } else {
            self.next = node.next_in_list();
        }
        Some(node)
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<G, E> DoubleEndedIterator for Children<'_, G, E> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.next_back?;
        if Some(node) == self.next {
            self.next = None;
            self.next_back = None;
        } else {
            self.next_back = node.previous_in_list();
        }
        Some(node)
    }
}

/// Preorder traversal over a subtree.
pub struct Preorder<'a, G, E> {
    start: Node<'a, G, E>,
    next: Option<WalkEvent<'a, G, E>>,
    skip_subtree: bool,
}

impl<'a, G, E> Preorder<'a, G, E> {
    fn new(start: Node<'a, G, E>) -> Self {
        Self { start, next: Some(WalkEvent::Enter(start)), skip_subtree: false }
    }

    /// Skips the children of the node that was entered last.
    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
}

impl<'a, G, E> Iterator for Preorder<'a, G, E> {
    type Item = WalkEvent<'a, G, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_subtree {
            self.next = self.next.take().map(|next| match next {
                WalkEvent::Enter(first_child) => {
                    WalkEvent::Leave(first_child.parent().expect("entered child has a parent"))
                }
                WalkEvent::Leave(parent) => WalkEvent::Leave(parent),
            });
            self.skip_subtree = false;
        }

        let next = self.next.take();

        self.next = next.and_then(|event| {
            Some(match event {
                WalkEvent::Enter(node) => match node.first_child() {
                    Some(child) => WalkEvent::Enter(child),
                    None => WalkEvent::Leave(node),
                },
                WalkEvent::Leave(node) => {
                    if node == self.start {
                        return None;
                    }

                    match node.next_sibling() {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(node.parent()?),
                    }
                }
            })
        });

        next
    }
}

/// Preorder walk event.
pub enum WalkEvent<'a, G, E> {
    Enter(Node<'a, G, E>),
    Leave(Node<'a, G, E>),
}

impl<G, E> Clone for WalkEvent<'_, G, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<G, E> Copy for WalkEvent<'_, G, E> {}

impl<G, E> fmt::Debug for WalkEvent<'_, G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter(node) => f.debug_tuple("Enter").field(node).finish(),
            Self::Leave(node) => f.debug_tuple("Leave").field(node).finish(),
        }
    }
}
