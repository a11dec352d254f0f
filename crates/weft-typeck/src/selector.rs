//! Type selectors and their resolution.
//! 类型选择器及其解析。
//!
//! A selector describes how to find a type: directly, by identifier, through
//! an initializer or another reference, lazily through a closure, or by
//! inferring the type of a domain value. [`TypeResolver`] resolves selectors
//! in two modes:
//!
//! - `try_select` is speculative. It is used while the graph is still being
//!   built, takes the initial handle of initializers and never fails: anything
//!   it cannot find yet is simply `None`.
//! - `must_select` is authoritative. It takes the final handle of
//!   initializers and reports a [`SelectError`] instead of giving up.

use crate::config::EngineConfig;
use crate::errors::SelectError;
use crate::reference::{ReferenceView, TypeReference};
use std::fmt;
use std::rc::Rc;
use tracing::warn;
use weft_graph::{InferenceCollector, Printer, Type, TypeGraph, TypeInitializer};

/// How to locate or derive a type.
pub enum TypeSelector<N> {
    Type(Type),
    /// Looked up in the type graph.
    Identifier(String),
    Initializer(Rc<dyn TypeInitializer>),
    /// The current type of another reference.
    Reference(ReferenceView<N>),
    /// Expanded on every resolution attempt.
    Deferred(Rc<dyn Fn() -> TypeSelector<N>>),
    /// A domain value whose type is inferred.
    Node(N),
}

impl<N> TypeSelector<N> {
    pub fn node(node: N) -> Self {
        TypeSelector::Node(node)
    }

    pub fn deferred(select: impl Fn() -> TypeSelector<N> + 'static) -> Self {
        TypeSelector::Deferred(Rc::new(select))
    }

    pub fn initializer(initializer: impl TypeInitializer + 'static) -> Self {
        TypeSelector::Initializer(Rc::new(initializer))
    }
}

impl<N: Clone> Clone for TypeSelector<N> {
    fn clone(&self) -> Self {
        match self {
            TypeSelector::Type(ty) => TypeSelector::Type(ty.clone()),
            TypeSelector::Identifier(identifier) => TypeSelector::Identifier(identifier.clone()),
            TypeSelector::Initializer(initializer) => TypeSelector::Initializer(initializer.clone()),
            TypeSelector::Reference(view) => TypeSelector::Reference(view.clone()),
            TypeSelector::Deferred(select) => TypeSelector::Deferred(select.clone()),
            TypeSelector::Node(node) => TypeSelector::Node(node.clone()),
        }
    }
}

impl<N> fmt::Debug for TypeSelector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSelector::Type(ty) => f.debug_tuple("Type").field(ty).finish(),
            TypeSelector::Identifier(identifier) => {
                f.debug_tuple("Identifier").field(identifier).finish()
            }
            TypeSelector::Initializer(_) => f.write_str("Initializer"),
            TypeSelector::Reference(view) => f.debug_tuple("Reference").field(view).finish(),
            TypeSelector::Deferred(_) => f.write_str("Deferred"),
            TypeSelector::Node(_) => f.write_str("Node"),
        }
    }
}

impl<N> From<Type> for TypeSelector<N> {
    fn from(ty: Type) -> Self {
        TypeSelector::Type(ty)
    }
}

impl<N> From<&Type> for TypeSelector<N> {
    fn from(ty: &Type) -> Self {
        TypeSelector::Type(ty.clone())
    }
}

impl<N> From<&str> for TypeSelector<N> {
    fn from(identifier: &str) -> Self {
        TypeSelector::Identifier(identifier.to_string())
    }
}

impl<N> From<String> for TypeSelector<N> {
    fn from(identifier: String) -> Self {
        TypeSelector::Identifier(identifier)
    }
}

impl<N> From<ReferenceView<N>> for TypeSelector<N> {
    fn from(view: ReferenceView<N>) -> Self {
        TypeSelector::Reference(view)
    }
}

impl<N> From<&TypeReference<N>> for TypeSelector<N> {
    fn from(reference: &TypeReference<N>) -> Self {
        TypeSelector::Reference(reference.view())
    }
}

/// Resolves selectors against the type graph and the inference rules.
pub struct TypeResolver<N> {
    graph: Rc<TypeGraph>,
    inference: Rc<InferenceCollector<N>>,
    printer: Rc<dyn Printer<N>>,
    max_depth: usize,
}

impl<N> Clone for TypeResolver<N> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            inference: self.inference.clone(),
            printer: self.printer.clone(),
            max_depth: self.max_depth,
        }
    }
}

impl<N> TypeResolver<N> {
    pub fn new(
        graph: Rc<TypeGraph>,
        inference: Rc<InferenceCollector<N>>,
        printer: Rc<dyn Printer<N>>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            graph,
            inference,
            printer,
            max_depth: config.max_selector_depth,
        }
    }

    pub fn graph(&self) -> &Rc<TypeGraph> {
        &self.graph
    }

    pub fn inference(&self) -> &Rc<InferenceCollector<N>> {
        &self.inference
    }

    pub fn printer(&self) -> &Rc<dyn Printer<N>> {
        &self.printer
    }

    /// Best-effort resolution; never fails and has no side effects.
    /// 尽力解析；不会失败，也没有副作用。
    pub fn try_select(&self, selector: &TypeSelector<N>) -> Option<Type> {
        self.try_select_at(selector, 0)
    }

    fn try_select_at(&self, selector: &TypeSelector<N>, depth: usize) -> Option<Type> {
        if depth > self.max_depth {
            warn!(limit = self.max_depth, "type selector chain exceeds the recursion limit");
            return None;
        }
        match selector {
            TypeSelector::Type(ty) => Some(ty.clone()),
            TypeSelector::Identifier(identifier) => self.graph.get_type(identifier),
            TypeSelector::Initializer(initializer) => Some(initializer.type_initial()),
            TypeSelector::Reference(view) => view.get_type(),
            TypeSelector::Deferred(select) => self.try_select_at(&select(), depth + 1),
            TypeSelector::Node(node) => self.inference.infer_type(node).ok(),
        }
    }

    /// Authoritative resolution; the type must exist and be complete now.
    /// 权威解析；类型必须在此刻存在且已完成构建。
    pub fn must_select(&self, selector: &TypeSelector<N>) -> Result<Type, SelectError> {
        self.must_select_at(selector, 0)
    }

    fn must_select_at(&self, selector: &TypeSelector<N>, depth: usize) -> Result<Type, SelectError> {
        if depth > self.max_depth {
            return Err(SelectError::SelectorTooDeep {
                depth: self.max_depth,
            });
        }
        match selector {
            TypeSelector::Type(ty) => Ok(ty.clone()),
            TypeSelector::Identifier(identifier) => {
                self.graph
                    .get_type(identifier)
                    .ok_or_else(|| SelectError::UnresolvedSelector {
                        identifier: identifier.clone(),
                    })
            }
            TypeSelector::Initializer(initializer) => Ok(initializer.type_final()),
            TypeSelector::Reference(view) => match view.get_type() {
                Some(ty) => Ok(ty),
                None => self.must_select_at(view.selector(), depth + 1),
            },
            TypeSelector::Deferred(select) => self.must_select_at(&select(), depth + 1),
            TypeSelector::Node(node) => {
                self.inference
                    .infer_type(node)
                    .map_err(|problems| SelectError::UninferableType {
                        node: self.printer.print_node(node, false),
                        problems,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_graph::{DebugPrinter, RuleOutcome};

    #[derive(Debug, Clone, PartialEq)]
    enum Expr {
        Int(i64),
        Text(&'static str),
    }

    fn resolver(config: &EngineConfig) -> TypeResolver<Expr> {
        let graph = Rc::new(TypeGraph::new());
        let inference = InferenceCollector::new(&graph);
        TypeResolver::new(graph, inference, Rc::new(DebugPrinter), config)
    }

    struct Staged {
        initial: Type,
        finished: Type,
    }

    impl TypeInitializer for Staged {
        fn type_initial(&self) -> Type {
            self.initial.clone()
        }
        fn type_final(&self) -> Type {
            self.finished.clone()
        }
    }

    #[test]
    fn test_concrete_type_selects_itself() {
        let resolver = resolver(&EngineConfig::default());
        let int = Type::new("Int");
        let selector = TypeSelector::from(&int);
        assert_eq!(resolver.try_select(&selector), Some(int.clone()));
        assert_eq!(resolver.must_select(&selector), Ok(int));
        assert!(resolver.graph().types().is_empty());
    }

    #[test]
    fn test_identifier_lookup() {
        let resolver = resolver(&EngineConfig::default());
        let selector: TypeSelector<Expr> = "Int".into();
        assert_eq!(resolver.try_select(&selector), None);
        assert_eq!(
            resolver.must_select(&selector),
            Err(SelectError::UnresolvedSelector {
                identifier: "Int".to_string()
            })
        );

        let int = Type::new("Int");
        resolver.graph().add_type(int.clone()).unwrap();
        assert_eq!(resolver.try_select(&selector), Some(int));
    }

    #[test]
    fn test_initializer_modes_differ() {
        let resolver = resolver(&EngineConfig::default());
        let initial = Type::new("Person");
        let finished = Type::new("Person");
        let selector = TypeSelector::<Expr>::initializer(Staged {
            initial: initial.clone(),
            finished: finished.clone(),
        });
        assert_eq!(resolver.try_select(&selector), Some(initial));
        assert_eq!(resolver.must_select(&selector), Ok(finished));
    }

    #[test]
    fn test_node_goes_through_inference() {
        let resolver = resolver(&EngineConfig::default());
        let int = Type::new("Int");
        let i = int.clone();
        resolver.inference().add_rule_fn(
            "int literal",
            move |expr: &Expr| match expr {
                Expr::Int(_) => RuleOutcome::Inferred(i.clone()),
                _ => RuleOutcome::NotApplicable,
            },
            None,
        );

        assert_eq!(resolver.try_select(&TypeSelector::node(Expr::Int(1))), Some(int));
        assert_eq!(resolver.try_select(&TypeSelector::node(Expr::Text("a"))), None);

        let err = resolver
            .must_select(&TypeSelector::node(Expr::Text("a")))
            .unwrap_err();
        assert_eq!(
            err,
            SelectError::UninferableType {
                node: "Text(\"a\")".to_string(),
                problems: vec![],
            }
        );
    }

    #[test]
    fn test_deferred_expands_each_time() {
        let resolver = resolver(&EngineConfig::default());
        let selector = TypeSelector::<Expr>::deferred(|| TypeSelector::deferred(|| "Bool".into()));
        assert_eq!(resolver.try_select(&selector), None);

        let bool_ty = Type::new("Bool");
        resolver.graph().add_type(bool_ty.clone()).unwrap();
        assert_eq!(resolver.must_select(&selector), Ok(bool_ty));
    }

    fn chain(levels: usize) -> TypeSelector<Expr> {
        if levels == 0 {
            TypeSelector::Type(Type::new("Leaf"))
        } else {
            TypeSelector::deferred(move || chain(levels - 1))
        }
    }

    #[test]
    fn test_depth_limit() {
        let resolver = resolver(&EngineConfig::new().max_selector_depth(3));
        assert!(resolver.try_select(&chain(3)).is_some());
        assert!(resolver.try_select(&chain(4)).is_none());
        assert_eq!(
            resolver.must_select(&chain(4)),
            Err(SelectError::SelectorTooDeep { depth: 3 })
        );
    }
}
