//! Node storage: arena indices and the closed set of node variants.
//!
//! A node's variant is exactly one point of the capability matrix
//! (shape × visibility × semantic binding × error). Changing any axis means
//! allocating a new node and relinking it, see `mutation`.

use std::fmt;

use la_arena::{Idx, RawIdx};
use strand_errors::SyntaxErrorMessage;
use text_size::TextRange;

/// Stable handle of a node inside a `NodeModel`.
///
/// Handles of replaced nodes stay valid but refer to stale nodes; use
/// `NodeModel::resolve` to find the live successor.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn from_idx<T>(idx: Idx<T>) -> Self {
        Self(u32::from(idx.into_raw()))
    }

    #[inline]
    pub(crate) fn idx<T>(self) -> Idx<T> {
        Idx::from_raw(RawIdx::from(self.0))
    }

    /// Returns the position of this node in allocation order.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The variant a node takes in the capability matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    HiddenLeaf,
    LeafWithSyntaxError,
    HiddenLeafWithSyntaxError,
    Root,
    Composite,
    CompositeWithSyntaxError,
    CompositeWithSemanticElement,
    CompositeWithSemanticElementAndSyntaxError,
}

impl NodeKind {
    #[inline]
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Leaf
                | Self::HiddenLeaf
                | Self::LeafWithSyntaxError
                | Self::HiddenLeafWithSyntaxError
        )
    }

    #[inline]
    pub fn is_composite(self) -> bool {
        !self.is_leaf()
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        matches!(self, Self::HiddenLeaf | Self::HiddenLeafWithSyntaxError)
    }

    #[inline]
    pub fn has_syntax_error(self) -> bool {
        matches!(
            self,
            Self::LeafWithSyntaxError
                | Self::HiddenLeafWithSyntaxError
                | Self::CompositeWithSyntaxError
                | Self::CompositeWithSemanticElementAndSyntaxError
        )
    }

    /// Returns `true` for variants with a semantic element slot.
    #[inline]
    pub fn can_bind_semantic_element(self) -> bool {
        matches!(
            self,
            Self::Root
                | Self::CompositeWithSemanticElement
                | Self::CompositeWithSemanticElementAndSyntaxError
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Leaf {
    pub(crate) range: TextRange,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Composite {
    pub(crate) first_child: Option<NodeId>,
    pub(crate) lookahead: u32,
}

impl Composite {
    pub(crate) fn new(lookahead: u32) -> Self {
        Self { first_child: None, lookahead }
    }
}

/// Variant payloads. Error messages are boxed so clean nodes stay small.
pub(crate) enum Variant<E> {
    Leaf(Leaf),
    HiddenLeaf(Leaf),
    LeafWithSyntaxError(Leaf, Box<SyntaxErrorMessage>),
    HiddenLeafWithSyntaxError(Leaf, Box<SyntaxErrorMessage>),
    Root(Composite, Option<E>),
    Composite(Composite),
    CompositeWithSyntaxError(Composite, Box<SyntaxErrorMessage>),
    CompositeWithSemanticElement(Composite, Option<E>),
    CompositeWithSemanticElementAndSyntaxError(Composite, Option<E>, Box<SyntaxErrorMessage>),
}

impl<E> Variant<E> {
    pub(crate) fn new_leaf(
        range: TextRange,
        is_hidden: bool,
        error: Option<SyntaxErrorMessage>,
    ) -> Self {
        let leaf = Leaf { range };
        match (is_hidden, error) {
            (false, None) => Self::Leaf(leaf),
            (true, None) => Self::HiddenLeaf(leaf),
            (false, Some(error)) => Self::LeafWithSyntaxError(leaf, Box::new(error)),
            (true, Some(error)) => Self::HiddenLeafWithSyntaxError(leaf, Box::new(error)),
        }
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Self::Leaf(_) => NodeKind::Leaf,
            Self::HiddenLeaf(_) => NodeKind::HiddenLeaf,
            Self::LeafWithSyntaxError(..) => NodeKind::LeafWithSyntaxError,
            Self::HiddenLeafWithSyntaxError(..) => NodeKind::HiddenLeafWithSyntaxError,
            Self::Root(..) => NodeKind::Root,
            Self::Composite(_) => NodeKind::Composite,
            Self::CompositeWithSyntaxError(..) => NodeKind::CompositeWithSyntaxError,
            Self::CompositeWithSemanticElement(..) => NodeKind::CompositeWithSemanticElement,
            Self::CompositeWithSemanticElementAndSyntaxError(..) => {
                NodeKind::CompositeWithSemanticElementAndSyntaxError
            }
        }
    }

    #[inline]
    pub(crate) fn leaf(&self) -> Option<Leaf> {
        match *self {
            Self::Leaf(leaf)
            | Self::HiddenLeaf(leaf)
            | Self::LeafWithSyntaxError(leaf, _)
            | Self::HiddenLeafWithSyntaxError(leaf, _) => Some(leaf),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn composite(&self) -> Option<&Composite> {
        match self {
            Self::Root(composite, _)
            | Self::Composite(composite)
            | Self::CompositeWithSyntaxError(composite, _)
            | Self::CompositeWithSemanticElement(composite, _)
            | Self::CompositeWithSemanticElementAndSyntaxError(composite, _, _) => Some(composite),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn composite_mut(&mut self) -> Option<&mut Composite> {
        match self {
            Self::Root(composite, _)
            | Self::Composite(composite)
            | Self::CompositeWithSyntaxError(composite, _)
            | Self::CompositeWithSemanticElement(composite, _)
            | Self::CompositeWithSemanticElementAndSyntaxError(composite, _, _) => Some(composite),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn syntax_error(&self) -> Option<&SyntaxErrorMessage> {
        match self {
            Self::LeafWithSyntaxError(_, error)
            | Self::HiddenLeafWithSyntaxError(_, error)
            | Self::CompositeWithSyntaxError(_, error)
            | Self::CompositeWithSemanticElementAndSyntaxError(_, _, error) => Some(error),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn semantic_element(&self) -> Option<&E> {
        self.semantic_slot().and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn semantic_slot(&self) -> Option<&Option<E>> {
        match self {
            Self::Root(_, slot)
            | Self::CompositeWithSemanticElement(_, slot)
            | Self::CompositeWithSemanticElementAndSyntaxError(_, slot, _) => Some(slot),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn semantic_slot_mut(&mut self) -> Option<&mut Option<E>> {
        match self {
            Self::Root(_, slot)
            | Self::CompositeWithSemanticElement(_, slot)
            | Self::CompositeWithSemanticElementAndSyntaxError(_, slot, _) => Some(slot),
            _ => None,
        }
    }
}

/// Raw node stored in the model arena.
pub(crate) struct NodeData<G, E> {
    pub(crate) variant: Variant<E>,
    pub(crate) grammar_element: Option<G>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) replaced_by: Option<NodeId>,
}

impl<G, E> NodeData<G, E> {
    pub(crate) fn new(variant: Variant<E>, grammar_element: Option<G>) -> Self {
        Self {
            variant,
            grammar_element,
            parent: None,
            next: None,
            previous: None,
            replaced_by: None,
        }
    }

    #[inline]
    pub(crate) fn first_child(&self) -> Option<NodeId> {
        self.variant.composite().and_then(|composite| composite.first_child)
    }

    #[inline]
    pub(crate) fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.previous.is_none()
    }
}
