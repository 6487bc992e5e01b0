//! Constructors that keep the collapsing invariant.
//!
//! A container with no children is nil, and a container whose only child is
//! atomic is that child.

use plait_ir::Span;

use crate::elements::Elements;
use crate::node::{DataKind, Node, NodeKind};

/// Data over `elements`.
pub fn new_data(elements: Elements, span: Span) -> Node {
    if elements.is_empty() {
        return Node::nil();
    }
    if elements.is_atomic() {
        return elements.head();
    }
    let kind = if elements.are_trivial() {
        DataKind::Trivial
    } else {
        DataKind::Plain
    };
    Node::new(NodeKind::Data(kind, elements), span)
}

pub fn data_of(nodes: Vec<Node>, span: Span) -> Node {
    new_data(Elements::make(nodes), span)
}

/// Splice over `elements`; collapses like `new_data`.
pub fn new_injected_data(elements: Elements, span: Span) -> Node {
    if elements.is_empty() {
        return Node::nil();
    }
    if elements.is_atomic() {
        return elements.head();
    }
    Node::new(NodeKind::Data(DataKind::Injection, elements), span)
}

/// Data of one child without collapsing, used to pass a container as a
/// single parameter.
pub fn wrap(node: &Node) -> Node {
    let span = node.span();
    let elements = Elements::make_fixed(vec![node.clone()]);
    let kind = if node.is_trivial() {
        DataKind::Trivial
    } else {
        DataKind::Plain
    };
    Node::new(NodeKind::Data(kind, elements), span)
}
