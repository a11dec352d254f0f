//! Lazily resolving type references.
//! 惰性解析的类型引用。
//!
//! A [`TypeReference`] wraps one [`TypeSelector`] and keeps itself resolved
//! while the type graph and the inference rules change:
//!
//! - While unresolved it observes both the graph (new types) and the
//!   inference collector (new rules), and retries after every addition.
//! - Once resolved it drops both subscriptions and only watches its own type
//!   for removal. If that type is removed, listeners are told the reference
//!   was invalidated and resolution starts over.
//!
//! All notifications are synchronous and iterate a snapshot of the listener
//! list taken when the pass starts.

use crate::selector::{TypeResolver, TypeSelector};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};
use weft_common::ListenerId;
use weft_graph::{InferenceListener, RuleId, Type, TypeGraphListener};

/// Observer of a [`TypeReference`].
pub trait TypeReferenceListener<N> {
    fn on_type_reference_resolved(&self, reference: &ReferenceView<N>, ty: &Type);

    /// `previous` is `None` when the reference simply has no type yet.
    fn on_type_reference_invalidated(&self, reference: &ReferenceView<N>, previous: Option<&Type>);
}

#[derive(Debug, Clone, Copy)]
struct Subscriptions {
    graph: ListenerId,
    inference: ListenerId,
}

#[derive(Debug)]
enum ReferenceState {
    /// `None` once the reference is deconstructed.
    Unresolved(Option<Subscriptions>),
    Resolved { ty: Type, watch: Option<ListenerId> },
}

struct ReferenceCore<N> {
    selector: TypeSelector<N>,
    resolver: TypeResolver<N>,
    state: RefCell<ReferenceState>,
    listeners: RefCell<Vec<Rc<dyn TypeReferenceListener<N>>>>,
    /// References whose selector is this reference. Told after the public
    /// listeners and not counted among them.
    dependents: RefCell<Vec<Rc<dyn TypeReferenceListener<N>>>>,
    /// Registered on the upstream reference when the selector is one.
    upstream: RefCell<Option<Rc<dyn TypeReferenceListener<N>>>>,
    detached: Cell<bool>,
    this: Weak<ReferenceCore<N>>,
}

/// Retries a dependent reference whenever its upstream reference resolves.
struct Upstream<N> {
    dependent: Weak<ReferenceCore<N>>,
}

impl<N: 'static> TypeReferenceListener<N> for Upstream<N> {
    fn on_type_reference_resolved(&self, _reference: &ReferenceView<N>, _ty: &Type) {
        if let Some(dependent) = self.dependent.upgrade() {
            dependent.attempt_resolve();
        }
    }

    fn on_type_reference_invalidated(&self, _reference: &ReferenceView<N>, _previous: Option<&Type>) {}
}

impl<N> ReferenceCore<N> {
    fn current_type(&self) -> Option<Type> {
        match &*self.state.borrow() {
            ReferenceState::Resolved { ty, .. } => Some(ty.clone()),
            ReferenceState::Unresolved(_) => None,
        }
    }

    /// Unresolved and still subscribed.
    fn is_pending(&self) -> bool {
        matches!(&*self.state.borrow(), ReferenceState::Unresolved(Some(_)))
    }

    fn view(&self) -> Option<ReferenceView<N>> {
        self.this.upgrade().map(|core| ReferenceView { core })
    }

    fn unsubscribe(&self, subscriptions: Subscriptions) {
        self.resolver.graph().remove_listener(subscriptions.graph);
        self.resolver.inference().remove_listener(subscriptions.inference);
    }

    fn notify_resolved(&self, ty: &Type) {
        let Some(view) = self.view() else { return };
        let mut snapshot = self.listeners.borrow().clone();
        snapshot.extend(self.dependents.borrow().iter().cloned());
        for listener in snapshot {
            listener.on_type_reference_resolved(&view, ty);
        }
    }

    fn notify_invalidated(&self, previous: Option<&Type>) {
        let Some(view) = self.view() else { return };
        let snapshot = self.listeners.borrow().clone();
        for listener in snapshot {
            listener.on_type_reference_invalidated(&view, previous);
        }
    }

    fn add_listener(&self, listener: Rc<dyn TypeReferenceListener<N>>, inform_about_current_state: bool) {
        self.listeners.borrow_mut().push(listener.clone());
        if !inform_about_current_state {
            return;
        }
        let Some(view) = self.view() else { return };
        match self.current_type() {
            Some(ty) => listener.on_type_reference_resolved(&view, &ty),
            None => listener.on_type_reference_invalidated(&view, None),
        }
    }

    fn remove_listener(&self, listener: &Rc<dyn TypeReferenceListener<N>>) {
        remove_first(&mut self.listeners.borrow_mut(), listener);
    }

    fn deconstruct(&self) {
        if self.detached.replace(true) {
            return;
        }
        let (subscriptions, watch) = match &mut *self.state.borrow_mut() {
            ReferenceState::Unresolved(subscriptions) => (subscriptions.take(), None),
            ReferenceState::Resolved { watch, .. } => (None, watch.take()),
        };
        if let Some(subscriptions) = subscriptions {
            self.unsubscribe(subscriptions);
        }
        if let Some(watch) = watch {
            self.resolver.graph().remove_listener(watch);
        }
        if let (TypeSelector::Reference(upstream), Some(listener)) =
            (&self.selector, self.upstream.take())
        {
            remove_first(&mut upstream.core.dependents.borrow_mut(), &listener);
        }
        self.listeners.borrow_mut().clear();
        self.dependents.borrow_mut().clear();
        debug!(selector = ?self.selector, "type reference deconstructed");
    }
}

fn remove_first<N>(
    listeners: &mut Vec<Rc<dyn TypeReferenceListener<N>>>,
    listener: &Rc<dyn TypeReferenceListener<N>>,
) {
    if let Some(index) = listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
        listeners.remove(index);
    }
}

impl<N: 'static> ReferenceCore<N> {
    fn graph_listener(&self) -> Weak<dyn TypeGraphListener> {
        self.this.clone()
    }

    fn inference_listener(&self) -> Weak<dyn InferenceListener> {
        self.this.clone()
    }

    /// Enter the unresolved state: subscribe, then try once.
    fn start_resolving(&self) {
        if self.detached.get() {
            return;
        }
        let subscriptions = Subscriptions {
            graph: self.resolver.graph().add_listener(self.graph_listener()),
            inference: self.resolver.inference().add_listener(self.inference_listener()),
        };
        *self.state.borrow_mut() = ReferenceState::Unresolved(Some(subscriptions));
        self.attempt_resolve();
    }

    fn attempt_resolve(&self) {
        if !self.is_pending() {
            return;
        }
        let Some(ty) = self.resolver.try_select(&self.selector) else {
            trace!(selector = ?self.selector, "type reference still unresolved");
            return;
        };
        // Selecting may run inference rules, which may have resolved us already.
        if !self.is_pending() {
            return;
        }

        let watch = self.resolver.graph().watch_removal(&ty, self.graph_listener());
        let previous = self.state.replace(ReferenceState::Resolved {
            ty: ty.clone(),
            watch: Some(watch),
        });
        if let ReferenceState::Unresolved(Some(subscriptions)) = previous {
            self.unsubscribe(subscriptions);
        }
        debug!(selector = ?self.selector, ty = ty.identifier(), "type reference resolved");
        self.notify_resolved(&ty);
    }
}

impl<N: 'static> TypeGraphListener for ReferenceCore<N> {
    fn added_type(&self, _ty: &Type, _key: &str) {
        self.attempt_resolve();
    }

    fn removed_type(&self, ty: &Type, _key: &str) {
        let watch = match &*self.state.borrow() {
            ReferenceState::Resolved {
                ty: current,
                watch: Some(watch),
            } if current == ty => *watch,
            _ => return,
        };
        self.resolver.graph().remove_listener(watch);
        *self.state.borrow_mut() = ReferenceState::Unresolved(None);
        debug!(selector = ?self.selector, ty = ty.identifier(), "type reference invalidated");

        self.notify_invalidated(Some(ty));
        self.start_resolving();
    }
}

impl<N: 'static> InferenceListener for ReferenceCore<N> {
    fn added_inference_rule(&self, _rule: RuleId, _bound_to: Option<&Type>) {
        self.attempt_resolve();
    }
}

/// Shared, non-owning handle of a [`TypeReference`].
///
/// Views are handed to listeners and can serve as selectors of other
/// references. They can observe the reference but not tear it down.
pub struct ReferenceView<N> {
    core: Rc<ReferenceCore<N>>,
}

impl<N> Clone for ReferenceView<N> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<N> ReferenceView<N> {
    pub fn get_type(&self) -> Option<Type> {
        self.core.current_type()
    }

    pub fn is_resolved(&self) -> bool {
        self.get_type().is_some()
    }

    pub fn selector(&self) -> &TypeSelector<N> {
        &self.core.selector
    }

    pub fn add_listener(
        &self,
        listener: Rc<dyn TypeReferenceListener<N>>,
        inform_about_current_state: bool,
    ) {
        self.core.add_listener(listener, inform_about_current_state);
    }

    pub fn remove_listener(&self, listener: &Rc<dyn TypeReferenceListener<N>>) {
        self.core.remove_listener(listener);
    }

    /// Whether both handles refer to the same reference.
    pub fn ptr_eq(&self, other: &ReferenceView<N>) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl<N> fmt::Debug for ReferenceView<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceView")
            .field("selector", &self.core.selector)
            .field("state", &*self.core.state.borrow())
            .finish()
    }
}

/// A type that is resolved lazily from a selector, and re-resolved whenever
/// the resolved type leaves the graph.
///
/// The reference owns its subscriptions: dropping it (or calling
/// [`deconstruct`](Self::deconstruct)) releases them and makes it
/// permanently inert.
pub struct TypeReference<N> {
    view: ReferenceView<N>,
}

impl<N: 'static> TypeReference<N> {
    pub fn new(selector: impl Into<TypeSelector<N>>, resolver: TypeResolver<N>) -> Self {
        let core = Rc::new_cyclic(|this| ReferenceCore {
            selector: selector.into(),
            resolver,
            state: RefCell::new(ReferenceState::Unresolved(None)),
            listeners: RefCell::new(Vec::new()),
            dependents: RefCell::new(Vec::new()),
            upstream: RefCell::new(None),
            detached: Cell::new(false),
            this: this.clone(),
        });
        if let TypeSelector::Reference(upstream) = &core.selector {
            let listener: Rc<dyn TypeReferenceListener<N>> = Rc::new(Upstream {
                dependent: Rc::downgrade(&core),
            });
            upstream.core.dependents.borrow_mut().push(listener.clone());
            *core.upstream.borrow_mut() = Some(listener);
        }
        core.start_resolving();
        Self {
            view: ReferenceView { core },
        }
    }
}

impl<N> TypeReference<N> {
    pub fn get_type(&self) -> Option<Type> {
        self.view.get_type()
    }

    pub fn is_resolved(&self) -> bool {
        self.view.is_resolved()
    }

    pub fn selector(&self) -> &TypeSelector<N> {
        self.view.selector()
    }

    /// Append a listener. With `inform_about_current_state` the listener is
    /// told the current state right away: resolved with the type, or
    /// invalidated without a previous type.
    pub fn add_listener(
        &self,
        listener: Rc<dyn TypeReferenceListener<N>>,
        inform_about_current_state: bool,
    ) {
        self.view.add_listener(listener, inform_about_current_state);
    }

    /// Remove the first registration of `listener`, if any.
    pub fn remove_listener(&self, listener: &Rc<dyn TypeReferenceListener<N>>) {
        self.view.remove_listener(listener);
    }

    /// Stop reacting to graph and rule changes and forget all listeners.
    /// The last resolved type (if any) stays readable.
    pub fn deconstruct(&self) {
        self.view.core.deconstruct();
    }

    pub fn view(&self) -> ReferenceView<N> {
        self.view.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.view.core.listeners.borrow().len()
    }
}

impl<N> fmt::Debug for TypeReference<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeReference").field(&self.view).finish()
    }
}

impl<N> Drop for TypeReference<N> {
    fn drop(&mut self) {
        self.view.core.deconstruct();
    }
}
