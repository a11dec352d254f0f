//! Inference rules and the collector that runs them.
//! 推断规则及其执行器。
//!
//! Rules are tried in registration order and the first one that infers a type
//! wins. Rules may be bound to a type; when that type leaves the graph, the
//! rules bound to it are removed as well.

use crate::graph::{TypeGraph, TypeGraphListener};
use crate::ty::Type;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};
use weft_common::{ListenerId, ListenerSet};

/// Handle of a registered inference rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u32);

/// What a single rule made of a value.
#[derive(Debug, Clone)]
pub enum RuleOutcome {
    /// The rule does not apply to this value.
    NotApplicable,
    Inferred(Type),
    /// The rule applies but could not produce a type.
    Problem(String),
}

/// A host-supplied rule mapping a domain value to a type.
pub trait InferenceRule<N> {
    fn name(&self) -> &str;
    fn infer(&self, node: &N) -> RuleOutcome;
}

/// An [`InferenceRule`] backed by a closure.
pub struct FnRule<F> {
    name: String,
    infer: F,
}

impl<F> FnRule<F> {
    pub fn new(name: impl Into<String>, infer: F) -> Self {
        Self {
            name: name.into(),
            infer,
        }
    }
}

impl<N, F> InferenceRule<N> for FnRule<F>
where
    F: Fn(&N) -> RuleOutcome,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(&self, node: &N) -> RuleOutcome {
        (self.infer)(node)
    }
}

/// Why an applicable rule could not infer a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceProblem {
    pub rule: String,
    pub message: String,
}

impl fmt::Display for InferenceProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// Observer of the rule set.
/// 规则集合的观察者。
pub trait InferenceListener {
    fn added_inference_rule(&self, _rule: RuleId, _bound_to: Option<&Type>) {}
    fn removed_inference_rule(&self, _rule: RuleId, _bound_to: Option<&Type>) {}
}

struct RegisteredRule<N> {
    id: RuleId,
    rule: Rc<dyn InferenceRule<N>>,
    bound_to: Option<Type>,
}

/// The shared registry of inference rules.
pub struct InferenceCollector<N> {
    graph: Rc<TypeGraph>,
    graph_subscription: Cell<Option<ListenerId>>,
    rules: RefCell<Vec<RegisteredRule<N>>>,
    next_id: Cell<u32>,
    listeners: ListenerSet<dyn InferenceListener>,
}

impl<N: 'static> InferenceCollector<N> {
    /// Create a collector that tracks type removals in `graph`.
    pub fn new(graph: &Rc<TypeGraph>) -> Rc<Self> {
        let collector = Rc::new(Self {
            graph: graph.clone(),
            graph_subscription: Cell::new(None),
            rules: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            listeners: ListenerSet::new(),
        });
        let as_listener: Rc<dyn TypeGraphListener> = collector.clone();
        let id = graph.add_listener(Rc::downgrade(&as_listener));
        collector.graph_subscription.set(Some(id));
        collector
    }
}

impl<N> InferenceCollector<N> {
    /// Register a rule, optionally bound to the type it infers.
    /// 注册一条规则，可选地绑定到其推断出的类型。
    pub fn add_inference_rule(
        &self,
        rule: Rc<dyn InferenceRule<N>>,
        bound_to: Option<Type>,
    ) -> RuleId {
        let id = RuleId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        debug!(rule = rule.name(), bound_to = ?bound_to, "inference rule added");
        self.rules.borrow_mut().push(RegisteredRule {
            id,
            rule,
            bound_to: bound_to.clone(),
        });

        for listener in self.listeners.snapshot() {
            listener.added_inference_rule(id, bound_to.as_ref());
        }
        id
    }

    pub fn add_rule_fn<F>(&self, name: impl Into<String>, infer: F, bound_to: Option<Type>) -> RuleId
    where
        F: Fn(&N) -> RuleOutcome + 'static,
    {
        self.add_inference_rule(Rc::new(FnRule::new(name, infer)), bound_to)
    }

    pub fn remove_inference_rule(&self, id: RuleId) -> bool {
        let removed = {
            let mut rules = self.rules.borrow_mut();
            let Some(index) = rules.iter().position(|r| r.id == id) else {
                return false;
            };
            rules.remove(index)
        };
        debug!(rule = removed.rule.name(), "inference rule removed");

        for listener in self.listeners.snapshot() {
            listener.removed_inference_rule(id, removed.bound_to.as_ref());
        }
        true
    }

    /// Infer the type of `node`. On failure the problems reported by
    /// applicable rules are returned; the list is empty when no rule applied.
    pub fn infer_type(&self, node: &N) -> Result<Type, Vec<InferenceProblem>> {
        let rules: Vec<Rc<dyn InferenceRule<N>>> =
            self.rules.borrow().iter().map(|r| r.rule.clone()).collect();

        let mut problems = Vec::new();
        for rule in rules {
            match rule.infer(node) {
                RuleOutcome::Inferred(ty) => return Ok(ty),
                RuleOutcome::NotApplicable => {}
                RuleOutcome::Problem(message) => problems.push(InferenceProblem {
                    rule: rule.name().to_string(),
                    message,
                }),
            }
        }
        trace!(problems = problems.len(), "no inference rule produced a type");
        Err(problems)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.borrow().len()
    }

    pub fn add_listener(&self, listener: Weak<dyn InferenceListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }
}

impl<N> TypeGraphListener for InferenceCollector<N> {
    fn removed_type(&self, ty: &Type, _key: &str) {
        let bound: Vec<RuleId> = self
            .rules
            .borrow()
            .iter()
            .filter(|r| r.bound_to.as_ref() == Some(ty))
            .map(|r| r.id)
            .collect();
        for id in bound {
            self.remove_inference_rule(id);
        }
    }
}

impl<N> Drop for InferenceCollector<N> {
    fn drop(&mut self) {
        if let Some(id) = self.graph_subscription.take() {
            self.graph.remove_listener(id);
        }
    }
}
