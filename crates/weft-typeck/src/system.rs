//! The type system facade.
//! 类型系统门面。
//!
//! Wires the graph, the inference rules, the comparison strategies, the
//! resolver and the validation components of one type system together.

use crate::collector::ValidationCollector;
use crate::config::EngineConfig;
use crate::constraints::ValidationConstraints;
use crate::errors::SelectError;
use crate::problem::ValidationProblem;
use crate::reference::TypeReference;
use crate::selector::{TypeResolver, TypeSelector};
use std::fmt;
use std::rc::Rc;
use weft_graph::{
    DebugPrinter, GraphComparisons, InferenceCollector, InferenceProblem, Printer, StrategyFactory,
    Type, TypeGraph,
};

/// One type system instance.
pub struct TypeSystem<N> {
    config: EngineConfig,
    graph: Rc<TypeGraph>,
    inference: Rc<InferenceCollector<N>>,
    printer: Rc<dyn Printer<N>>,
    resolver: TypeResolver<N>,
    constraints: Rc<ValidationConstraints<N>>,
    validation: Rc<ValidationCollector<N>>,
}

impl<N: Clone + 'static> TypeSystem<N> {
    pub fn new(config: EngineConfig, printer: Rc<dyn Printer<N>>) -> Self {
        let graph = Rc::new(TypeGraph::new());
        let comparisons: Rc<dyn StrategyFactory> = Rc::new(GraphComparisons::new(graph.clone()));
        Self::with_comparisons(config, printer, graph, comparisons)
    }

    /// Build a type system around an existing graph and a custom comparison
    /// strategy factory.
    pub fn with_comparisons(
        config: EngineConfig,
        printer: Rc<dyn Printer<N>>,
        graph: Rc<TypeGraph>,
        comparisons: Rc<dyn StrategyFactory>,
    ) -> Self {
        let inference = InferenceCollector::new(&graph);
        let resolver = TypeResolver::new(graph.clone(), inference.clone(), printer.clone(), &config);
        let constraints = Rc::new(ValidationConstraints::new(
            inference.clone(),
            printer.clone(),
            comparisons,
            config.default_severity,
        ));
        Self {
            config,
            graph,
            inference,
            printer,
            resolver,
            constraints,
            validation: Rc::new(ValidationCollector::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
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

    pub fn resolver(&self) -> &TypeResolver<N> {
        &self.resolver
    }

    pub fn constraints(&self) -> &Rc<ValidationConstraints<N>> {
        &self.constraints
    }

    pub fn validation(&self) -> &Rc<ValidationCollector<N>> {
        &self.validation
    }

    /// Create a reference that resolves `selector` as soon as it can.
    pub fn reference(&self, selector: impl Into<TypeSelector<N>>) -> TypeReference<N> {
        TypeReference::new(selector, self.resolver.clone())
    }

    pub fn try_select(&self, selector: &TypeSelector<N>) -> Option<Type> {
        self.resolver.try_select(selector)
    }

    pub fn must_select(&self, selector: &TypeSelector<N>) -> Result<Type, SelectError> {
        self.resolver.must_select(selector)
    }

    pub fn infer_type(&self, node: &N) -> Result<Type, Vec<InferenceProblem>> {
        self.inference.infer_type(node)
    }

    pub fn validate(&self, node: &N) -> Vec<ValidationProblem<N>> {
        self.validation.validate(node)
    }
}

impl<N: Clone + fmt::Debug + 'static> TypeSystem<N> {
    /// Default configuration, printing values with their `Debug` form.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default(), Rc::new(DebugPrinter))
    }
}
