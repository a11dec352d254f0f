//! Type comparison strategies.
//! 类型比较策略。
//!
//! A strategy decides whether two types stand in a relation and, if they do
//! not, describes the mismatch. [`GraphComparisons`] is the reference
//! implementation backed by the edges of a [`TypeGraph`].

use crate::graph::TypeGraph;
use crate::ty::{EdgeKind, Type};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// The relation a strategy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRelation {
    Assignable,
    Equal,
}

impl TypeRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeRelation::Assignable => "assignable",
            TypeRelation::Equal => "equal",
        }
    }

    /// Phrase used between two type names, e.g. "assignable to".
    pub fn phrase(self) -> &'static str {
        match self {
            TypeRelation::Assignable => "assignable to",
            TypeRelation::Equal => "equal to",
        }
    }
}

impl fmt::Display for TypeRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of a failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub relation: TypeRelation,
    pub actual: Type,
    pub expected: Type,
    pub message: String,
    pub sub_problems: Vec<TypeMismatch>,
}

impl TypeMismatch {
    pub fn new(relation: TypeRelation, actual: Type, expected: Type) -> Self {
        let message = format!(
            "'{}' is not {} '{}'",
            actual.name(),
            relation.phrase(),
            expected.name()
        );
        Self {
            relation,
            actual,
            expected,
            message,
            sub_problems: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_sub_problem(mut self, problem: TypeMismatch) -> Self {
        self.sub_problems.push(problem);
        self
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Compares an actual type against an expected one.
pub trait ComparisonStrategy {
    /// `None` when the relation holds.
    fn compare(&self, actual: &Type, expected: &Type) -> Option<TypeMismatch>;
}

/// Creates the strategy for a relation.
pub trait StrategyFactory {
    fn create_strategy(&self, relation: TypeRelation) -> Box<dyn ComparisonStrategy + '_>;
}

/// Identity-based equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEquality;

impl ComparisonStrategy for IdentityEquality {
    fn compare(&self, actual: &Type, expected: &Type) -> Option<TypeMismatch> {
        if actual == expected {
            None
        } else {
            Some(TypeMismatch::new(TypeRelation::Equal, actual.clone(), expected.clone()))
        }
    }
}

/// Assignability along sub-type and implicit-conversion edges.
pub struct EdgeAssignability<'g> {
    graph: &'g TypeGraph,
}

impl<'g> EdgeAssignability<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self { graph }
    }

    fn reaches(&self, from: &Type, to: &Type) -> bool {
        let mut visited: HashSet<Type> = HashSet::new();
        let mut queue = VecDeque::from([from.clone()]);
        while let Some(current) = queue.pop_front() {
            if current == *to {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            for edge in self.graph.outgoing_edges(&current) {
                if matches!(edge.kind, EdgeKind::SubType | EdgeKind::ImplicitConversion) {
                    queue.push_back(edge.to);
                }
            }
        }
        false
    }
}

impl ComparisonStrategy for EdgeAssignability<'_> {
    fn compare(&self, actual: &Type, expected: &Type) -> Option<TypeMismatch> {
        if self.reaches(actual, expected) {
            trace!(actual = actual.identifier(), expected = expected.identifier(), "assignable");
            return None;
        }
        Some(
            TypeMismatch::new(TypeRelation::Assignable, actual.clone(), expected.clone())
                .with_message(format!(
                    "there is no sub-type or implicit conversion path from '{}' to '{}'",
                    actual.name(),
                    expected.name()
                )),
        )
    }
}

/// The default [`StrategyFactory`].
pub struct GraphComparisons {
    graph: Rc<TypeGraph>,
}

impl GraphComparisons {
    pub fn new(graph: Rc<TypeGraph>) -> Self {
        Self { graph }
    }
}

impl StrategyFactory for GraphComparisons {
    fn create_strategy(&self, relation: TypeRelation) -> Box<dyn ComparisonStrategy + '_> {
        match relation {
            TypeRelation::Equal => Box::new(IdentityEquality),
            TypeRelation::Assignable => Box::new(EdgeAssignability::new(&self.graph)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeEdge;

    fn graph_with(types: &[&Type]) -> Rc<TypeGraph> {
        let graph = Rc::new(TypeGraph::new());
        for ty in types {
            graph.add_type((*ty).clone()).unwrap();
        }
        graph
    }

    #[test]
    fn test_equality_is_identity() {
        let int = Type::new("Int");
        let other_int = Type::new("Int");
        let strategy = IdentityEquality;
        assert!(strategy.compare(&int, &int).is_none());
        let mismatch = strategy.compare(&int, &other_int).unwrap();
        assert_eq!(mismatch.relation, TypeRelation::Equal);
    }

    #[test]
    fn test_assignability_follows_edges_transitively() {
        let int = Type::new("Int");
        let float = Type::new("Float");
        let number = Type::new("Number");
        let graph = graph_with(&[&int, &float, &number]);
        graph
            .add_edge(TypeEdge::new(int.clone(), float.clone(), EdgeKind::ImplicitConversion))
            .unwrap();
        graph
            .add_edge(TypeEdge::new(float.clone(), number.clone(), EdgeKind::SubType))
            .unwrap();

        let comparisons = GraphComparisons::new(graph);
        let strategy = comparisons.create_strategy(TypeRelation::Assignable);
        assert!(strategy.compare(&int, &number).is_none());
        assert!(strategy.compare(&int, &int).is_none());
        assert!(strategy.compare(&number, &int).is_some());
    }

    #[test]
    fn test_other_edges_do_not_count() {
        let a = Type::new("A");
        let b = Type::new("B");
        let graph = graph_with(&[&a, &b]);
        graph
            .add_edge(TypeEdge::new(a.clone(), b.clone(), EdgeKind::Other("uses".into())))
            .unwrap();

        let strategy = EdgeAssignability::new(&graph);
        let mismatch = strategy.compare(&a, &b).unwrap();
        assert!(mismatch.message.contains("no sub-type"));
    }

    #[test]
    fn test_cycles_terminate() {
        let a = Type::new("A");
        let b = Type::new("B");
        let c = Type::new("C");
        let graph = graph_with(&[&a, &b, &c]);
        graph.add_edge(TypeEdge::new(a.clone(), b.clone(), EdgeKind::SubType)).unwrap();
        graph.add_edge(TypeEdge::new(b.clone(), a.clone(), EdgeKind::SubType)).unwrap();

        let strategy = EdgeAssignability::new(&graph);
        assert!(strategy.compare(&a, &c).is_some());
    }
}
