//! Relation checks for use inside validation rules.
//! 用于验证规则内部的类型关系检查。
//!
//! Every check compares an actual side with an expected side and reports at
//! most one problem. A side is either a type or a domain value whose type is
//! inferred. Missing sides and values whose type cannot be inferred are
//! skipped silently: the failed inference has its own diagnostics upstream
//! and reporting it again here would only cascade.

use crate::problem::ValidationProblem;
use std::rc::Rc;
use tracing::{trace, warn};
use weft_diagnostic::{ErrorCode, Severity};
use weft_graph::{InferenceCollector, Printer, StrategyFactory, Type, TypeRelation};

/// One side of a relation check.
pub enum Operand<'a, N> {
    Type(&'a Type),
    /// A domain value whose type is inferred.
    Node(&'a N),
}

impl<N> Clone for Operand<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Operand<'_, N> {}

impl<'a, N> Operand<'a, N> {
    /// The domain value, if this side is one.
    pub fn node(self) -> Option<&'a N> {
        match self {
            Operand::Node(node) => Some(node),
            Operand::Type(_) => None,
        }
    }
}

impl<'a, N> From<&'a Type> for Operand<'a, N> {
    fn from(ty: &'a Type) -> Self {
        Operand::Type(ty)
    }
}

/// A resolved side of a check, prepared for message building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedType {
    pub ty: Type,
    /// How the printer shows the type to users.
    pub user_representation: String,
    pub identifier: String,
}

/// What a message provider wants the problem to say. Unset fields fall back
/// to the defaults of the check.
#[derive(Debug, Clone)]
pub struct ProblemDetails<N> {
    pub node: Option<N>,
    pub property: Option<String>,
    pub index: Option<usize>,
    pub severity: Option<Severity>,
    pub message: Option<String>,
}

impl<N> Default for ProblemDetails<N> {
    fn default() -> Self {
        Self {
            node: None,
            property: None,
            index: None,
            severity: None,
            message: None,
        }
    }
}

impl<N> ProblemDetails<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn node(mut self, node: N) -> Self {
        self.node = Some(node);
        self
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Builds the problem details from the annotated actual and expected types.
pub type MessageProvider<'a, N> = dyn Fn(&AnnotatedType, &AnnotatedType) -> ProblemDetails<N> + 'a;

/// The relation checks.
pub struct ValidationConstraints<N> {
    inference: Rc<InferenceCollector<N>>,
    printer: Rc<dyn Printer<N>>,
    comparisons: Rc<dyn StrategyFactory>,
    default_severity: Severity,
}

impl<N: Clone> ValidationConstraints<N> {
    pub fn new(
        inference: Rc<InferenceCollector<N>>,
        printer: Rc<dyn Printer<N>>,
        comparisons: Rc<dyn StrategyFactory>,
        default_severity: Severity,
    ) -> Self {
        Self {
            inference,
            printer,
            comparisons,
            default_severity,
        }
    }

    /// The actual side must be assignable to the expected side.
    pub fn ensure_node_is_assignable(
        &self,
        actual: Option<Operand<'_, N>>,
        expected: Option<Operand<'_, N>>,
        message: Option<&MessageProvider<'_, N>>,
    ) -> Vec<ValidationProblem<N>> {
        self.ensure_node_related(actual, expected, TypeRelation::Assignable, false, message)
    }

    /// The actual side must equal the expected side.
    pub fn ensure_node_is_equals(
        &self,
        actual: Option<Operand<'_, N>>,
        expected: Option<Operand<'_, N>>,
        message: Option<&MessageProvider<'_, N>>,
    ) -> Vec<ValidationProblem<N>> {
        self.ensure_node_related(actual, expected, TypeRelation::Equal, false, message)
    }

    /// The actual side must not equal the forbidden side.
    pub fn ensure_node_has_not_type(
        &self,
        actual: Option<Operand<'_, N>>,
        forbidden: Option<Operand<'_, N>>,
        message: Option<&MessageProvider<'_, N>>,
    ) -> Vec<ValidationProblem<N>> {
        self.ensure_node_related(actual, forbidden, TypeRelation::Equal, true, message)
    }

    /// The general check. With `negated` set, the relation holding is the
    /// problem; the resulting problem then has no sub-problems, since there
    /// is no mismatch to attach.
    ///
    /// A problem is reported on the value the message provider names, or
    /// else on the actual side when that is a domain value. A failed check
    /// between two types needs a provider that names the value.
    pub fn ensure_node_related(
        &self,
        actual: Option<Operand<'_, N>>,
        expected: Option<Operand<'_, N>>,
        relation: TypeRelation,
        negated: bool,
        message: Option<&MessageProvider<'_, N>>,
    ) -> Vec<ValidationProblem<N>> {
        let (Some(operand), Some(expected)) = (actual, expected) else {
            return Vec::new();
        };
        let (Some(actual), Some(expected)) = (self.resolve(operand), self.resolve(expected)) else {
            return Vec::new();
        };

        let mismatch = self
            .comparisons
            .create_strategy(relation)
            .compare(&actual, &expected);
        trace!(
            actual = actual.identifier(),
            expected = expected.identifier(),
            %relation,
            negated,
            holds = mismatch.is_none(),
            "relation checked"
        );

        let sub_problems = match (negated, mismatch) {
            (false, Some(mismatch)) => vec![mismatch],
            (true, None) => Vec::new(),
            (false, None) | (true, Some(_)) => return Vec::new(),
        };

        let actual = self.annotate(actual);
        let expected = self.annotate(expected);
        let details = message
            .map(|provider| provider(&actual, &expected))
            .unwrap_or_default();

        let Some(node) = details.node.or_else(|| operand.node().cloned()) else {
            warn!(
                actual = actual.identifier.as_str(),
                expected = expected.identifier.as_str(),
                "relation problem between two types names no value to report on"
            );
            return Vec::new();
        };
        let problem = ValidationProblem {
            node,
            property: details.property,
            index: details.index,
            severity: details.severity.unwrap_or(self.default_severity),
            code: Some(problem_code(relation, negated)),
            message: details
                .message
                .unwrap_or_else(|| default_message(&actual, &expected, relation, negated)),
            sub_problems,
        };
        vec![problem]
    }

    fn resolve(&self, operand: Operand<'_, N>) -> Option<Type> {
        match operand {
            Operand::Type(ty) => Some(ty.clone()),
            Operand::Node(node) => self.inference.infer_type(node).ok(),
        }
    }

    fn annotate(&self, ty: Type) -> AnnotatedType {
        AnnotatedType {
            user_representation: self.printer.print_type(&ty),
            identifier: ty.identifier().to_string(),
            ty,
        }
    }
}

fn problem_code(relation: TypeRelation, negated: bool) -> ErrorCode {
    match (relation, negated) {
        (_, true) => ErrorCode::ForbiddenType,
        (TypeRelation::Assignable, false) => ErrorCode::NotAssignable,
        (TypeRelation::Equal, false) => ErrorCode::NotEqual,
    }
}

fn default_message(
    actual: &AnnotatedType,
    expected: &AnnotatedType,
    relation: TypeRelation,
    negated: bool,
) -> String {
    format!(
        "The type '{}' is {}{} the type '{}'.",
        actual.identifier,
        if negated { "" } else { "not " },
        relation.phrase(),
        expected.identifier
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotated(identifier: &str) -> AnnotatedType {
        AnnotatedType {
            ty: Type::new(identifier),
            user_representation: identifier.to_string(),
            identifier: identifier.to_string(),
        }
    }

    #[test]
    fn test_default_messages() {
        let int = annotated("Int");
        let string = annotated("String");
        assert_eq!(
            default_message(&int, &string, TypeRelation::Assignable, false),
            "The type 'Int' is not assignable to the type 'String'."
        );
        assert_eq!(
            default_message(&int, &int, TypeRelation::Equal, true),
            "The type 'Int' is equal to the type 'Int'."
        );
    }

    #[test]
    fn test_operand_node() {
        let int = Type::new("Int");
        let value = 7_u8;
        assert_eq!(Operand::<u8>::Type(&int).node(), None);
        assert_eq!(Operand::Node(&value).node(), Some(&7));
    }

    #[test]
    fn test_problem_codes() {
        assert_eq!(problem_code(TypeRelation::Assignable, false), ErrorCode::NotAssignable);
        assert_eq!(problem_code(TypeRelation::Equal, false), ErrorCode::NotEqual);
        assert_eq!(problem_code(TypeRelation::Equal, true), ErrorCode::ForbiddenType);
    }

    #[test]
    fn test_details_builder() {
        let details: ProblemDetails<()> = ProblemDetails::new()
            .message("custom")
            .severity(Severity::Hint)
            .property("value")
            .index(0);
        assert_eq!(details.message.as_deref(), Some("custom"));
        assert_eq!(details.severity, Some(Severity::Hint));
        assert_eq!(details.property.as_deref(), Some("value"));
        assert_eq!(details.index, Some(0));
        assert!(details.node.is_none());
    }
}
