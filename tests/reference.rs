//! Integration tests for type references and selector resolution.

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use weft_graph::{RuleOutcome, Type, TypeInitializer};
use weft_typeck::{
    EngineConfig, ReferenceView, SelectError, TypeReference, TypeReferenceListener, TypeSelector,
    TypeSystem,
};

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Int(i64),
    Text(String),
    Var(String),
}

#[derive(Default)]
struct Events(RefCell<Vec<String>>);

impl Events {
    fn take(&self) -> Vec<String> {
        self.0.take()
    }
}

impl TypeReferenceListener<Expr> for Events {
    fn on_type_reference_resolved(&self, _reference: &ReferenceView<Expr>, ty: &Type) {
        self.0.borrow_mut().push(format!("resolved {}", ty.identifier()));
    }

    fn on_type_reference_invalidated(&self, _reference: &ReferenceView<Expr>, previous: Option<&Type>) {
        self.0
            .borrow_mut()
            .push(format!("invalidated {}", previous.map_or("-", |ty| ty.identifier())));
    }
}

fn system() -> TypeSystem<Expr> {
    TypeSystem::with_defaults()
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_concrete_type_has_no_side_effects() {
    let system = system();
    let int = Type::new("Int");
    let selector = TypeSelector::from(int.clone());
    assert_eq!(system.try_select(&selector), Some(int.clone()));
    assert_eq!(system.must_select(&selector), Ok(int));
    assert!(system.graph().types().is_empty());
    assert_eq!(system.inference().rule_count(), 0);
}

#[test]
fn test_must_select_unknown_identifier() {
    let system = system();
    let err = system.must_select(&"Person".into()).unwrap_err();
    assert_eq!(
        err,
        SelectError::UnresolvedSelector {
            identifier: "Person".to_string()
        }
    );
    assert_eq!(err.to_string(), "no type is registered under the identifier `Person`");
}

#[test]
fn test_must_select_uninferable_value() {
    let system = system();
    let err = system
        .must_select(&TypeSelector::node(Expr::Var("x".to_string())))
        .unwrap_err();
    assert!(matches!(err, SelectError::UninferableType { ref node, .. } if node == "Var(\"x\")"));
}

#[test]
fn test_cyclic_deferred_selector_is_bounded() {
    let system = TypeSystem::<Expr>::new(
        EngineConfig::new().max_selector_depth(8),
        Rc::new(weft_graph::DebugPrinter),
    );
    fn forever() -> TypeSelector<Expr> {
        TypeSelector::deferred(forever)
    }
    assert_eq!(system.try_select(&forever()), None);
    assert_eq!(
        system.must_select(&forever()),
        Err(SelectError::SelectorTooDeep { depth: 8 })
    );
}

struct Class {
    skeleton: Type,
    complete: Type,
}

impl TypeInitializer for Class {
    fn type_initial(&self) -> Type {
        self.skeleton.clone()
    }

    fn type_final(&self) -> Type {
        self.complete.clone()
    }
}

#[test]
fn test_initializer_reference_takes_initial_type() {
    let system = system();
    let skeleton = Type::new("Person");
    let complete = Type::new("Person");
    let selector = TypeSelector::initializer(Class {
        skeleton: skeleton.clone(),
        complete: complete.clone(),
    });

    let reference = system.reference(selector.clone());
    assert!(reference.get_type().unwrap().ptr_eq(&skeleton));
    assert!(system.must_select(&selector).unwrap().ptr_eq(&complete));
}

// ============================================================================
// Reference lifecycle
// ============================================================================

#[test]
fn test_reference_resolves_during_add() {
    let system = system();
    let reference = system.reference("Person");
    let events = Rc::new(Events::default());
    reference.add_listener(events.clone(), false);
    assert!(!reference.is_resolved());

    let person = Type::new("Person");
    system.graph().add_type(person.clone()).unwrap();
    assert_eq!(events.take(), vec!["resolved Person"]);
    assert_eq!(reference.get_type(), Some(person));

    system.graph().add_type(Type::new("Address")).unwrap();
    assert!(events.take().is_empty());
}

#[test]
fn test_every_listener_fires_exactly_once() {
    let system = system();
    let reference = system.reference("Person");
    let first = Rc::new(Events::default());
    let second = Rc::new(Events::default());
    reference.add_listener(first.clone(), false);
    reference.add_listener(second.clone(), false);

    system.graph().add_type(Type::new("Person")).unwrap();
    assert_eq!(first.take(), vec!["resolved Person"]);
    assert_eq!(second.take(), vec!["resolved Person"]);
}

#[test]
fn test_invalidation_is_never_terminal() {
    let system = system();
    let person = Type::new("Person");
    system.graph().add_type(person.clone()).unwrap();
    let reference = system.reference("Person");
    let events = Rc::new(Events::default());
    reference.add_listener(events.clone(), false);

    system.graph().remove_type(&person);
    assert_eq!(events.take(), vec!["invalidated Person"]);
    assert!(!reference.is_resolved());

    let replacement = Type::new("Person");
    system.graph().add_type(replacement.clone()).unwrap();
    assert_eq!(events.take(), vec!["resolved Person"]);
    assert!(reference.get_type().unwrap().ptr_eq(&replacement));

    system.graph().remove_type(&replacement);
    assert_eq!(events.take(), vec!["invalidated Person"]);
}

#[test]
fn test_inform_about_current_state() {
    let system = system();
    let reference = system.reference("Person");
    let events = Rc::new(Events::default());

    reference.add_listener(events.clone(), true);
    assert_eq!(events.take(), vec!["invalidated -"]);

    system.graph().add_type(Type::new("Person")).unwrap();
    events.take();
    let late = Rc::new(Events::default());
    reference.add_listener(late.clone(), true);
    assert_eq!(late.take(), vec!["resolved Person"]);
}

#[test]
fn test_deconstruct_is_permanent() {
    let system = system();
    let reference = system.reference("Person");
    let events = Rc::new(Events::default());
    reference.add_listener(events.clone(), false);
    reference.deconstruct();

    let person = Type::new("Person");
    system.graph().add_type(person.clone()).unwrap();
    system.graph().remove_type(&person);
    system.graph().add_type(Type::new("Person")).unwrap();
    assert!(events.take().is_empty());
    assert!(!reference.is_resolved());
}

#[test]
fn test_reference_resolved_by_new_rule() {
    let system = system();
    let reference = system.reference(TypeSelector::node(Expr::Text("hi".to_string())));
    let events = Rc::new(Events::default());
    reference.add_listener(events.clone(), false);

    let text = Type::new("String");
    let inferred = text.clone();
    system.inference().add_rule_fn(
        "int literal",
        |expr: &Expr| match expr {
            Expr::Int(_) => RuleOutcome::Inferred(Type::new("Int")),
            _ => RuleOutcome::NotApplicable,
        },
        None,
    );
    assert!(events.take().is_empty());
    assert_eq!(system.infer_type(&Expr::Int(1)).unwrap().identifier(), "Int");

    system.inference().add_rule_fn(
        "text literal",
        move |expr: &Expr| match expr {
            Expr::Text(_) => RuleOutcome::Inferred(inferred.clone()),
            _ => RuleOutcome::NotApplicable,
        },
        None,
    );
    assert_eq!(events.take(), vec!["resolved String"]);
    assert_eq!(reference.get_type(), Some(text));
}

#[test]
fn test_reference_chain() {
    let system = system();
    let field = system.reference("Person");
    let alias = system.reference(&field);
    let events = Rc::new(Events::default());
    alias.add_listener(events.clone(), false);

    let person = Type::new("Person");
    system.graph().add_type(person.clone()).unwrap();
    assert_eq!(alias.get_type(), Some(person.clone()));
    assert_eq!(events.take(), vec!["resolved Person"]);

    let deferred_alias: TypeReference<Expr> = system.reference(TypeSelector::deferred({
        let view = field.view();
        move || TypeSelector::from(view.clone())
    }));
    assert_eq!(deferred_alias.get_type(), Some(person));
}
