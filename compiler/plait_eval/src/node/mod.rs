//! The uniform expression node.
//!
//! Every value and every piece of code is a [`Node`]: a cheap, immutable,
//! reference-counted handle to a span and a [`NodeKind`]. Nodes are either
//! atomic (self-reducing, no children) or containers owning an
//! [`Elements`] sequence.
//!
//! The phase operations (`bind`, `step`, `evaluate`, `reduce` and the binding
//! mirrors) live in `phases`; arithmetic in `arith`; printing in `print`.

mod arith;
mod phases;
mod print;

use std::fmt;
use std::sync::{Arc, OnceLock};

use plait_ir::{Span, Symbol};

pub use arith::ArithOp;

use crate::elements::Elements;
use crate::frame::Frame;
use crate::name::{Define, Name, UnboundName, Variable, VariableKind};
use crate::namespace::Namespace;
use crate::number::Number;
use crate::pipeline::{Pipeline, Step};
use crate::production::{Evaluator, Production};
use crate::ristic::Ristic;
use crate::trivalent::Trivalent;

/// Flavour of a data container.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DataKind {
    Plain,
    /// Every element is trivial.
    Trivial,
    /// Splices its elements into the enclosing sequence.
    Injection,
}

/// Bracket kind an expression was written with.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// `( ... )`: compiled into a production when bound.
    Prod,
    /// `[ ... ]`: elements are bound, the result is plain data.
    Data,
}

/// Expression that binding left partially unresolved, or that the `expr`
/// syntax form produced deliberately.
#[derive(Clone)]
pub struct BoundExpr {
    pub kind: ExprKind,
    pub elements: Elements,
    /// Printing flags recorded by the `expr` form.
    pub bind: bool,
    pub names: bool,
}

/// Variant tag of a node.
#[derive(Clone)]
pub enum NodeKind {
    // Atoms
    Nil,
    None,
    Number(Number),
    Char(char),
    String(Arc<str>),
    Symbol(Symbol),
    Namespace(Namespace),
    Comment(Arc<str>),
    Trivalent(Trivalent),
    Alias(Elements),
    Name(Name),

    // Containers
    Data(DataKind, Elements),
    Expr(ExprKind, Elements),
    BoundExpr(BoundExpr),
    Pipeline(Arc<Pipeline>),
    Step(Arc<Step>),
    Production(Arc<Production>),
    Evaluator(Arc<Evaluator>),
    Ristic(Ristic),

    /// A result that still needs the frame of the invocation that produced it.
    FrameRef(Arc<Frame>, Node),
}

pub struct NodeData {
    span: Span,
    kind: NodeKind,
}

/// Shared, immutable expression node.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

static NIL: OnceLock<Node> = OnceLock::new();
static NONE: OnceLock<Node> = OnceLock::new();

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Node {
        Node(Arc::new(NodeData { span, kind }))
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.0.span
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // Constructors

    /// The canonical empty node.
    pub fn nil() -> Node {
        NIL.get_or_init(|| Node::new(NodeKind::Nil, Span::DUMMY))
            .clone()
    }

    /// The "no value" marker used for unfilled step holes.
    pub fn none() -> Node {
        NONE.get_or_init(|| Node::new(NodeKind::None, Span::DUMMY))
            .clone()
    }

    pub fn number(n: Number, span: Span) -> Node {
        Node::new(NodeKind::Number(n), span)
    }

    pub fn int(v: i32) -> Node {
        Node::number(Number::Int32(v), Span::DUMMY)
    }

    pub fn char(c: char, span: Span) -> Node {
        Node::new(NodeKind::Char(c), span)
    }

    pub fn string(s: &str, span: Span) -> Node {
        Node::new(NodeKind::String(Arc::from(s)), span)
    }

    pub fn symbol(sym: Symbol, span: Span) -> Node {
        Node::new(NodeKind::Symbol(sym), span)
    }

    pub fn namespace(ns: Namespace, span: Span) -> Node {
        Node::new(NodeKind::Namespace(ns), span)
    }

    pub fn comment(text: &str, span: Span) -> Node {
        Node::new(NodeKind::Comment(Arc::from(text)), span)
    }

    pub fn trivalent(t: Trivalent, span: Span) -> Node {
        Node::new(NodeKind::Trivalent(t), span)
    }

    pub fn unknown() -> Node {
        Node::trivalent(Trivalent::Unknown, Span::DUMMY)
    }

    pub fn alias(elements: Elements, span: Span) -> Node {
        Node::new(NodeKind::Alias(elements), span)
    }

    pub fn unbound_name(name: UnboundName, span: Span) -> Node {
        Node::new(NodeKind::Name(Name::Unbound(name)), span)
    }

    pub fn define(define: Define, span: Span) -> Node {
        Node::new(NodeKind::Name(Name::Define(define)), span)
    }

    pub fn variable(var: Variable, span: Span) -> Node {
        Node::new(NodeKind::Name(Name::Variable(var)), span)
    }

    pub fn expr(kind: ExprKind, elements: Elements, span: Span) -> Node {
        Node::new(NodeKind::Expr(kind, elements), span)
    }

    pub fn bound_expr(expr: BoundExpr, span: Span) -> Node {
        Node::new(NodeKind::BoundExpr(expr), span)
    }

    pub fn frame_ref(frame: Arc<Frame>, node: Node) -> Node {
        let span = node.span();
        Node::new(NodeKind::FrameRef(frame, node), span)
    }

    /// Copy of this node at another source position.
    #[must_use]
    pub fn with_span(&self, span: Span) -> Node {
        Node::new(self.kind().clone(), span)
    }

    // Peeling

    /// Follow definitions and frame references to the underlying value.
    pub fn target(&self) -> &Node {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.target(),
            NodeKind::FrameRef(_, inner) => inner.target(),
            _ => self,
        }
    }

    // Classification

    pub fn is_nil(&self) -> bool {
        match self.kind() {
            NodeKind::Nil => true,
            NodeKind::Name(Name::Define(d)) => d.binding.is_nil(),
            NodeKind::FrameRef(_, inner) => inner.is_nil(),
            _ => false,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind(), NodeKind::None)
    }

    pub fn is_atomic(&self) -> bool {
        match self.kind() {
            NodeKind::Nil
            | NodeKind::None
            | NodeKind::Number(_)
            | NodeKind::Char(_)
            | NodeKind::String(_)
            | NodeKind::Symbol(_)
            | NodeKind::Namespace(_)
            | NodeKind::Comment(_)
            | NodeKind::Trivalent(_)
            | NodeKind::Alias(_) => true,
            NodeKind::Name(Name::Define(d)) => d.binding.is_atomic(),
            NodeKind::FrameRef(_, inner) => inner.is_atomic(),
            NodeKind::Name(_)
            | NodeKind::Data(..)
            | NodeKind::Expr(..)
            | NodeKind::BoundExpr(_)
            | NodeKind::Pipeline(_)
            | NodeKind::Step(_)
            | NodeKind::Production(_)
            | NodeKind::Evaluator(_)
            | NodeKind::Ristic(_) => false,
        }
    }

    pub fn is_bound(&self) -> bool {
        match self.kind() {
            NodeKind::Name(Name::Unbound(_) | Name::Undefined(_)) | NodeKind::Expr(..) => false,
            NodeKind::Name(Name::Define(d)) => d.binding.is_bound(),
            NodeKind::Alias(es) => es.are_bound(),
            NodeKind::Ristic(r) => r.is_bound(),
            NodeKind::FrameRef(_, inner) => inner.is_bound(),
            _ => true,
        }
    }

    pub fn is_trivial(&self) -> bool {
        match self.kind() {
            NodeKind::Nil
            | NodeKind::None
            | NodeKind::Number(_)
            | NodeKind::Char(_)
            | NodeKind::String(_)
            | NodeKind::Symbol(_)
            | NodeKind::Namespace(_)
            | NodeKind::Comment(_)
            | NodeKind::Trivalent(_)
            | NodeKind::BoundExpr(_)
            | NodeKind::Data(DataKind::Trivial, _) => true,
            NodeKind::Alias(es) | NodeKind::Data(DataKind::Plain, es) | NodeKind::Expr(_, es) => {
                es.are_trivial()
            }
            NodeKind::Name(Name::Define(d)) => d.binding.is_trivial(),
            NodeKind::FrameRef(_, inner) => inner.is_trivial(),
            NodeKind::Name(_)
            | NodeKind::Data(DataKind::Injection, _)
            | NodeKind::Pipeline(_)
            | NodeKind::Step(_)
            | NodeKind::Production(_)
            | NodeKind::Evaluator(_)
            | NodeKind::Ristic(_) => false,
        }
    }

    pub fn is_reducible(&self) -> bool {
        match self.kind() {
            NodeKind::Alias(_)
            | NodeKind::Name(Name::Define(_) | Name::Variable(_))
            | NodeKind::Data(DataKind::Injection, _)
            | NodeKind::Step(_)
            | NodeKind::Production(_)
            | NodeKind::FrameRef(..) => true,
            NodeKind::Data(_, es) => es.are_reducible(),
            _ => false,
        }
    }

    pub fn can_evaluate(&self) -> bool {
        match self.kind() {
            NodeKind::Name(Name::Define(d)) => d.binding.can_evaluate(),
            NodeKind::Name(Name::Variable(_)) | NodeKind::Production(_) | NodeKind::Step(_) => {
                true
            }
            NodeKind::Data(_, es) => es.can_evaluate(),
            NodeKind::FrameRef(_, inner) => inner.can_evaluate(),
            _ => false,
        }
    }

    /// True when this node or, for containers, any child is a variable.
    pub fn has_variables(&self) -> bool {
        match self.kind() {
            NodeKind::Name(Name::Variable(_)) => true,
            NodeKind::Alias(es)
            | NodeKind::Data(_, es)
            | NodeKind::Expr(_, es)
            | NodeKind::BoundExpr(BoundExpr { elements: es, .. }) => es.has_variables(),
            NodeKind::Ristic(Ristic::Unbound(es)) => es.has_variables(),
            NodeKind::FrameRef(_, inner) => inner.has_variables(),
            _ => false,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind(), NodeKind::Name(Name::Variable(_)))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self.kind() {
            NodeKind::Name(Name::Variable(v)) => Some(v),
            _ => None,
        }
    }

    /// Executable pipeline or productive variable, seen through definitions
    /// and frame references.
    pub fn is_productive(&self) -> bool {
        self.precedence().is_some()
    }

    /// Precedence of a productive node. Smaller binds tighter.
    pub fn precedence(&self) -> Option<i32> {
        match self.kind() {
            NodeKind::Pipeline(p) => p.precedence(),
            NodeKind::Name(Name::Variable(v)) if v.kind == VariableKind::Productive => Some(0),
            NodeKind::Name(Name::Define(d)) => d.binding.precedence(),
            NodeKind::FrameRef(_, inner) => inner.precedence(),
            _ => None,
        }
    }

    /// The node that carries the productive behaviour, if any.
    pub fn as_productive(&self) -> Option<Node> {
        match self.kind() {
            NodeKind::Pipeline(p) if p.precedence().is_some() => Some(self.clone()),
            NodeKind::Name(Name::Variable(v)) if v.kind == VariableKind::Productive => {
                Some(self.clone())
            }
            NodeKind::Name(Name::Define(d)) => d.binding.as_productive(),
            NodeKind::FrameRef(_, inner) => inner.as_productive(),
            _ => None,
        }
    }

    pub fn is_step(&self) -> bool {
        self.as_step().is_some()
    }

    pub fn as_step(&self) -> Option<&Arc<Step>> {
        match self.kind() {
            NodeKind::Step(s) => Some(s),
            NodeKind::Name(Name::Define(d)) => d.binding.as_step(),
            NodeKind::FrameRef(_, inner) => inner.as_step(),
            _ => None,
        }
    }

    pub fn as_pipeline(&self) -> Option<&Arc<Pipeline>> {
        match self.kind() {
            NodeKind::Pipeline(p) => Some(p),
            NodeKind::Name(Name::Define(d)) => d.binding.as_pipeline(),
            NodeKind::FrameRef(_, inner) => inner.as_pipeline(),
            _ => None,
        }
    }

    /// Binding pipelines run while the enclosing expression is being bound.
    pub fn as_binding_pipeline(&self) -> Option<&Arc<Pipeline>> {
        self.as_pipeline().filter(|p| p.is_binding())
    }

    pub fn is_injectable(&self) -> bool {
        match self.kind() {
            NodeKind::Data(DataKind::Injection, _) => true,
            NodeKind::Name(Name::Variable(v)) => v.kind == VariableKind::Injecting,
            NodeKind::Name(Name::Define(d)) => d.binding.is_injectable(),
            NodeKind::FrameRef(_, inner) => inner.is_injectable(),
            _ => false,
        }
    }

    pub fn is_alias(&self) -> bool {
        match self.kind() {
            NodeKind::Alias(_) => true,
            NodeKind::Name(Name::Define(d)) => d.binding.is_alias(),
            NodeKind::FrameRef(_, inner) => inner.is_alias(),
            _ => false,
        }
    }

    pub fn is_evaluator(&self) -> bool {
        matches!(self.kind(), NodeKind::Evaluator(_))
    }

    pub fn is_data(&self) -> bool {
        match self.kind() {
            NodeKind::Data(..) => true,
            NodeKind::Name(Name::Define(d)) => d.binding.is_data(),
            NodeKind::FrameRef(_, inner) => inner.is_data(),
            _ => false,
        }
    }

    /// Bound syntax form (descriptor or configured instance).
    pub fn as_ristic(&self) -> Option<&Ristic> {
        match self.kind() {
            NodeKind::Ristic(r) => Some(r),
            NodeKind::Name(Name::Define(d)) => d.binding.as_ristic(),
            NodeKind::FrameRef(_, inner) => inner.as_ristic(),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self.kind() {
            NodeKind::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self.kind() {
            NodeKind::Number(n) => Some(*n),
            NodeKind::Name(Name::Define(d)) => d.binding.as_number(),
            NodeKind::FrameRef(_, inner) => inner.as_number(),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self.kind() {
            NodeKind::Namespace(ns) => Some(ns),
            NodeKind::Name(Name::Define(d)) => d.binding.as_namespace(),
            NodeKind::FrameRef(_, inner) => inner.as_namespace(),
            _ => None,
        }
    }

    /// Symbol of anything that reads as a name: symbols, names, definitions.
    pub fn name_symbol(&self) -> Option<Symbol> {
        match self.kind() {
            NodeKind::Symbol(s) => Some(*s),
            NodeKind::Name(n) => Some(n.symbol()),
            _ => None,
        }
    }

    // Children

    /// The children of a container; an atom is its own single child.
    pub fn elements(&self) -> Elements {
        match self.kind() {
            NodeKind::Nil => Elements::Empty,
            NodeKind::Alias(es)
            | NodeKind::Data(_, es)
            | NodeKind::Expr(_, es)
            | NodeKind::BoundExpr(BoundExpr { elements: es, .. }) => es.clone(),
            NodeKind::Pipeline(p) => p.body().clone(),
            NodeKind::Step(s) => Elements::make(s.template().to_vec()),
            NodeKind::Production(p) => p.elements().clone(),
            NodeKind::Ristic(r) => r.elements(),
            NodeKind::Name(Name::Define(d)) => d.binding.elements(),
            NodeKind::FrameRef(_, inner) => inner.elements(),
            _ => Elements::make(vec![self.clone()]),
        }
    }

    pub fn len(&self) -> usize {
        self.elements().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements().is_empty()
    }

    pub fn element(&self, idx: usize) -> Node {
        self.elements().element(idx)
    }

    pub fn head_element(&self) -> Node {
        self.elements().head()
    }

    pub fn end_element(&self) -> Node {
        self.elements().end()
    }

    /// Zero of the same type, used by single-operand arithmetic.
    pub fn zero_value(&self) -> Node {
        match self.kind() {
            NodeKind::Number(n) => Node::number(n.zero(), self.span()),
            NodeKind::Trivalent(_) => Node::trivalent(Trivalent::False, self.span()),
            NodeKind::None => Node::none(),
            NodeKind::Name(Name::Define(d)) => d.binding.zero_value(),
            _ => Node::nil(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.xprint(&mut s);
        f.write_str(&s)
    }
}
