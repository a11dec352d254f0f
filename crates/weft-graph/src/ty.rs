//! Type handles and edges.
//! 类型句柄与边。

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

struct TypeNode {
    identifier: String,
    name: String,
}

/// A node of the type graph.
/// 类型图中的节点。
///
/// `Type` is a shared handle: cloning it is cheap and every clone refers to
/// the same node. Equality and hashing are by identity, so two separately
/// constructed types with the same identifier are different types.
#[derive(Clone)]
pub struct Type(Rc<TypeNode>);

impl Type {
    /// Create a type whose user-facing name is its identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::named(identifier.clone(), identifier)
    }

    /// Create a type with a separate user-facing name.
    /// 创建带有独立显示名称的类型。
    pub fn named(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Type(Rc::new(TypeNode {
            identifier: identifier.into(),
            name: name.into(),
        }))
    }

    /// The unique identifier the graph knows this type by.
    pub fn identifier(&self) -> &str {
        &self.0.identifier
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ptr_eq(&self, other: &Type) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0.identifier)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Kind of a directed relation between two types.
/// 两个类型之间有向关系的种类。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `from` is a sub-type of `to`.
    SubType,
    /// Values of `from` convert implicitly to `to`.
    ImplicitConversion,
    /// Any host-defined relation.
    Other(String),
}

/// A directed, kinded edge between two types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeEdge {
    pub from: Type,
    pub to: Type,
    pub kind: EdgeKind,
}

impl TypeEdge {
    pub fn new(from: Type, to: Type, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    /// Whether this edge touches `ty` at either end.
    pub fn touches(&self, ty: &Type) -> bool {
        self.from == *ty || self.to == *ty
    }
}
