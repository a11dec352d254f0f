//! The type graph.
//! 类型图。
//!
//! A mutable registry of types and edges. Every mutation is reported
//! synchronously to the subscribed [`TypeGraphListener`]s, in subscription
//! order, at the moment it happens.

use crate::ty::{Type, TypeEdge};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;
use thiserror::Error;
use tracing::debug;
use weft_common::{ListenerId, ListenerSet, Span};
use weft_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};

/// Observer of type graph mutations. All methods default to no-ops.
/// 类型图变更的观察者。所有方法默认不做任何事。
pub trait TypeGraphListener {
    fn added_type(&self, _ty: &Type, _key: &str) {}
    fn removed_type(&self, _ty: &Type, _key: &str) {}
    fn added_edge(&self, _edge: &TypeEdge) {}
    fn removed_edge(&self, _edge: &TypeEdge) {}
}

/// Errors raised by graph mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("a different type is already registered under the key `{key}`")]
    DuplicateKey { key: String },
    #[error("this type is already registered under the key `{key}`")]
    AlreadyRegistered { key: String },
    #[error("edge endpoint `{identifier}` is not part of the type graph")]
    MissingEndpoint { identifier: String },
}

impl GraphError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::DuplicateKey { .. } | GraphError::AlreadyRegistered { .. } => {
                ErrorCode::DuplicateTypeKey
            }
            GraphError::MissingEndpoint { .. } => ErrorCode::MissingEdgeEndpoint,
        }
    }

    /// Build a diagnostic pointing at the declaration that caused the error.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic::error(DiagnosticKind::Graph, span, self.to_string())
            .with_code(self.code())
            .with_label(Label::new(span, self.code().description()))
    }
}

#[derive(Default)]
struct Nodes {
    by_key: HashMap<String, Type>,
    order: Vec<String>,
}

impl Nodes {
    fn key_of(&self, ty: &Type) -> Option<String> {
        self.order
            .iter()
            .find(|key| self.by_key.get(*key) == Some(ty))
            .cloned()
    }
}

/// The shared type graph.
#[derive(Default)]
pub struct TypeGraph {
    nodes: RefCell<Nodes>,
    edges: RefCell<Vec<TypeEdge>>,
    /// `None` receives every event; `Some(ty)` only the removal of `ty`.
    listeners: ListenerSet<dyn TypeGraphListener, Option<Type>>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type under its own identifier.
    /// 以类型自身的标识符添加类型。
    pub fn add_type(&self, ty: Type) -> Result<(), GraphError> {
        let key = ty.identifier().to_string();
        self.add_type_with_key(ty, key)
    }

    /// Add a type under an explicit key. Re-adding the same type under the
    /// same key is a no-op; a type lives under one key only.
    pub fn add_type_with_key(&self, ty: Type, key: impl Into<String>) -> Result<(), GraphError> {
        let key = key.into();
        {
            let mut nodes = self.nodes.borrow_mut();
            match nodes.by_key.get(&key) {
                Some(existing) if *existing == ty => return Ok(()),
                Some(_) => return Err(GraphError::DuplicateKey { key }),
                None => {}
            }
            if let Some(existing) = nodes.key_of(&ty) {
                return Err(GraphError::AlreadyRegistered { key: existing });
            }
            nodes.by_key.insert(key.clone(), ty.clone());
            nodes.order.push(key.clone());
        }
        debug!(key = %key, "type added to graph");

        for listener in self.listeners.snapshot_matching(Option::is_none) {
            listener.added_type(&ty, &key);
        }
        Ok(())
    }

    /// Remove a type together with every edge touching it. Returns false if
    /// the type was not part of the graph.
    /// 移除类型及其所有相关的边。
    pub fn remove_type(&self, ty: &Type) -> bool {
        let Some(key) = self.nodes.borrow().key_of(ty) else {
            return false;
        };

        let incident: Vec<TypeEdge> = self
            .edges
            .borrow()
            .iter()
            .filter(|edge| edge.touches(ty))
            .cloned()
            .collect();
        for edge in &incident {
            self.remove_edge(edge);
        }

        {
            let mut nodes = self.nodes.borrow_mut();
            nodes.by_key.remove(&key);
            nodes.order.retain(|k| *k != key);
        }
        debug!(key = %key, "type removed from graph");

        for listener in self
            .listeners
            .snapshot_matching(|watched| watched.as_ref().is_none_or(|w| w == ty))
        {
            listener.removed_type(ty, &key);
        }
        true
    }

    pub fn get_type(&self, key: &str) -> Option<Type> {
        self.nodes.borrow().by_key.get(key).cloned()
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.nodes.borrow().by_key.values().any(|t| t == ty)
    }

    /// All types, in insertion order.
    pub fn types(&self) -> Vec<Type> {
        let nodes = self.nodes.borrow();
        nodes
            .order
            .iter()
            .filter_map(|key| nodes.by_key.get(key).cloned())
            .collect()
    }

    /// Connect two types that are both part of the graph.
    /// 连接两个都已在图中的类型。
    pub fn add_edge(&self, edge: TypeEdge) -> Result<(), GraphError> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.contains(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    identifier: endpoint.identifier().to_string(),
                });
            }
        }
        {
            let mut edges = self.edges.borrow_mut();
            if edges.contains(&edge) {
                return Ok(());
            }
            edges.push(edge.clone());
        }
        debug!(from = edge.from.identifier(), to = edge.to.identifier(), kind = ?edge.kind, "edge added");

        for listener in self.listeners.snapshot_matching(Option::is_none) {
            listener.added_edge(&edge);
        }
        Ok(())
    }

    pub fn remove_edge(&self, edge: &TypeEdge) -> bool {
        {
            let mut edges = self.edges.borrow_mut();
            match edges.iter().position(|e| e == edge) {
                Some(index) => {
                    edges.remove(index);
                }
                None => return false,
            }
        }
        debug!(from = edge.from.identifier(), to = edge.to.identifier(), kind = ?edge.kind, "edge removed");

        for listener in self.listeners.snapshot_matching(Option::is_none) {
            listener.removed_edge(edge);
        }
        true
    }

    pub fn outgoing_edges(&self, ty: &Type) -> Vec<TypeEdge> {
        self.edges
            .borrow()
            .iter()
            .filter(|edge| edge.from == *ty)
            .cloned()
            .collect()
    }

    /// Subscribe to every graph event.
    pub fn add_listener(&self, listener: Weak<dyn TypeGraphListener>) -> ListenerId {
        self.listeners.add_keyed(None, listener)
    }

    /// Subscribe only to the removal of one type.
    /// 仅订阅某个类型的移除事件。
    pub fn watch_removal(&self, ty: &Type, listener: Weak<dyn TypeGraphListener>) -> ListenerId {
        self.listeners.add_keyed(Some(ty.clone()), listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }
}
