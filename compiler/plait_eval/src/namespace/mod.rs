//! Hierarchical symbol tables.
//!
//! Lookup walks parent-ward until a namespace without a parent (the root
//! marker) is reached. The core namespace and the outermost private namespace
//! of a binding scope are roots.
//!
//! Ownership is a tree: the core namespace owns public namespaces through its
//! binding map, so public and local namespaces only hold a weak link back to
//! their parent. Private namespaces form a stack and hold their parent
//! strongly.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::debug;

use plait_ir::{Span, Symbol};

use crate::errors::{duplicate_name, name_not_found, EvalResult};
use crate::node::Node;

/// Process-unique namespace id.
pub type NamespaceId = u32;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NamespaceKind {
    /// The core namespace.
    Core,
    Public,
    /// Named namespace registered inside its owner.
    Local,
    /// Anonymous scope created while binding.
    Private,
}

enum ParentLink {
    /// Private scopes keep the enclosing scope alive.
    Owned(Namespace),
    /// Public and local namespaces are owned by their parent.
    Owner(WeakNamespace),
}

struct NamespaceData {
    id: NamespaceId,
    kind: NamespaceKind,
    name: Option<Arc<str>>,
    parent: RwLock<Option<ParentLink>>,
    bindings: RwLock<FxHashMap<Symbol, Node>>,
}

/// A binding found by lookup together with the namespace that holds it.
#[derive(Clone, Debug)]
pub struct Entry {
    pub namespace: Namespace,
    pub node: Node,
}

/// Shared handle to a namespace.
#[derive(Clone)]
pub struct Namespace(Arc<NamespaceData>);

/// Non-owning handle, used by definitions that point back at their namespace.
#[derive(Clone, Default)]
pub struct WeakNamespace(Weak<NamespaceData>);

impl WeakNamespace {
    pub fn upgrade(&self) -> Option<Namespace> {
        self.0.upgrade().map(Namespace)
    }
}

impl Namespace {
    fn create(
        id: NamespaceId,
        kind: NamespaceKind,
        name: Option<Arc<str>>,
        parent: Option<ParentLink>,
    ) -> Self {
        Namespace(Arc::new(NamespaceData {
            id,
            kind,
            name,
            parent: RwLock::new(parent),
            bindings: RwLock::new(FxHashMap::default()),
        }))
    }

    pub(crate) fn new_core(id: NamespaceId, name: &str) -> Self {
        Self::create(id, NamespaceKind::Core, Some(Arc::from(name)), None)
    }

    pub(crate) fn new_public(id: NamespaceId, name: &str, parent: &Namespace) -> Self {
        Self::create(
            id,
            NamespaceKind::Public,
            Some(Arc::from(name)),
            Some(ParentLink::Owner(parent.downgrade())),
        )
    }

    pub(crate) fn new_local(id: NamespaceId, name: Symbol, owner: &Namespace) -> Self {
        let qualified = format!("{}{name}", owner.qualified_prefix());
        Self::create(
            id,
            NamespaceKind::Local,
            Some(Arc::from(qualified.as_str())),
            Some(ParentLink::Owner(owner.downgrade())),
        )
    }

    fn new_private(id: NamespaceId, parent: Option<Namespace>) -> Self {
        Self::create(
            id,
            NamespaceKind::Private,
            None,
            parent.map(ParentLink::Owned),
        )
    }

    fn qualified_prefix(&self) -> String {
        match self.kind() {
            NamespaceKind::Core | NamespaceKind::Public => format!("{}::", self.display_name()),
            NamespaceKind::Local | NamespaceKind::Private => {
                let outer = self.parent().map(|p| p.qualified_prefix()).unwrap_or_default();
                format!("{outer}{}::", self.display_name())
            }
        }
    }

    pub fn id(&self) -> NamespaceId {
        self.0.id
    }

    pub fn kind(&self) -> NamespaceKind {
        self.0.kind
    }

    /// Public or local name; `None` marks a private namespace.
    pub fn name(&self) -> Option<Arc<str>> {
        self.0.name.clone()
    }

    pub fn display_name(&self) -> String {
        match &self.0.name {
            Some(name) => name.to_string(),
            None => format!("PrivateNamespace:{}", self.0.id),
        }
    }

    pub fn is_private(&self) -> bool {
        self.kind() == NamespaceKind::Private
    }

    pub fn is_public(&self) -> bool {
        matches!(self.kind(), NamespaceKind::Public | NamespaceKind::Core)
    }

    pub fn is_local(&self) -> bool {
        self.kind() == NamespaceKind::Local
    }

    /// True when lookup stops here.
    pub fn is_root(&self) -> bool {
        self.0.parent.read().is_none()
    }

    pub fn parent(&self) -> Option<Namespace> {
        match &*self.0.parent.read() {
            Some(ParentLink::Owned(ns)) => Some(ns.clone()),
            Some(ParentLink::Owner(weak)) => weak.upgrade(),
            None => None,
        }
    }

    pub fn downgrade(&self) -> WeakNamespace {
        WeakNamespace(Arc::downgrade(&self.0))
    }

    pub fn same(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Namespace reference atom.
    pub fn node(&self) -> Node {
        Node::namespace(self.clone(), Span::DUMMY)
    }

    pub fn try_local_bind(&self, name: Symbol) -> Option<Node> {
        self.0.bindings.read().get(&name).cloned()
    }

    /// Resolve a reference, walking parent-ward.
    pub fn try_bind(&self, name: Symbol) -> Option<Entry> {
        let mut current = self.clone();
        loop {
            if let Some(node) = current.try_local_bind(name) {
                return Some(Entry {
                    namespace: current,
                    node,
                });
            }
            current = current.parent()?;
        }
    }

    pub fn bind(&self, name: Symbol) -> EvalResult<Entry> {
        self.try_bind(name).ok_or_else(|| name_not_found(name))
    }

    pub fn local_bind(&self, name: Symbol) -> EvalResult<Node> {
        self.try_local_bind(name).ok_or_else(|| name_not_found(name))
    }

    pub fn check_local_bind(&self, name: Symbol) -> bool {
        self.0.bindings.read().contains_key(&name)
    }

    pub fn check_bind(&self, name: Symbol) -> bool {
        self.try_bind(name).is_some()
    }

    /// Bind `name` here. A local duplicate is an error.
    pub fn add_binding(&self, name: Symbol, node: Node) -> EvalResult<Node> {
        let mut bindings = self.0.bindings.write();
        if bindings.contains_key(&name) {
            return Err(duplicate_name(name).or_span(node.span()));
        }
        bindings.insert(name, node.clone());
        Ok(node)
    }

    pub fn remove_binding(&self, name: Symbol) -> bool {
        self.0.bindings.write().remove(&name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reset(&self, parent: Option<Namespace>) {
        self.0.bindings.write().clear();
        *self.0.parent.write() = parent.map(ParentLink::Owned);
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Namespace {}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({}#{})", self.display_name(), self.id())
    }
}

/// Id source and reuse pool for namespaces.
pub struct NamespacePool {
    next_id: AtomicU32,
    free: Mutex<Vec<Namespace>>,
    capacity: usize,
}

impl NamespacePool {
    pub fn new(capacity: usize) -> Self {
        NamespacePool {
            next_id: AtomicU32::new(0),
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn next_id(&self) -> NamespaceId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Hand out a cleared private namespace whose parent is `parent`.
    pub fn acquire(&self, parent: Option<Namespace>) -> Namespace {
        let reused = self.free.lock().pop();
        match reused {
            Some(ns) => {
                ns.reset(parent);
                ns
            }
            None => {
                let ns = Namespace::new_private(self.next_id(), parent);
                debug!(id = ns.id(), "new private namespace");
                ns
            }
        }
    }

    /// Return a private namespace. Namespaces still referenced elsewhere,
    /// including through a definition's weak handle, are not reused.
    pub fn release(&self, ns: Namespace) {
        if !ns.is_private() || Arc::strong_count(&ns.0) > 1 || Arc::weak_count(&ns.0) > 0 {
            return;
        }
        ns.reset(None);
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(ns);
        }
    }

    pub fn available(&self) -> usize {
        self.free.lock().len()
    }
}
