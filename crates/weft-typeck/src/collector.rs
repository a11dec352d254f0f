//! The registry of validation rules.

use crate::problem::ValidationProblem;
use std::cell::RefCell;
use std::rc::Rc;

/// A host-supplied check producing problems for a domain value.
pub type ValidationRule<N> = Rc<dyn Fn(&N) -> Vec<ValidationProblem<N>>>;

/// Runs every registered rule, in registration order, against a value.
pub struct ValidationCollector<N> {
    rules: RefCell<Vec<ValidationRule<N>>>,
}

impl<N> ValidationCollector<N> {
    pub fn new() -> Self {
        Self {
            rules: RefCell::new(Vec::new()),
        }
    }

    /// Append rules. Nothing is de-duplicated.
    pub fn add_validation_rules(&self, rules: impl IntoIterator<Item = ValidationRule<N>>) {
        self.rules.borrow_mut().extend(rules);
    }

    pub fn add_validation_rule(&self, rule: impl Fn(&N) -> Vec<ValidationProblem<N>> + 'static) {
        self.rules.borrow_mut().push(Rc::new(rule));
    }

    /// The problems of all rules for `node`, concatenated in rule order.
    pub fn validate(&self, node: &N) -> Vec<ValidationProblem<N>> {
        let rules = self.rules.borrow().clone();
        rules.iter().flat_map(|rule| rule(node)).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<N> Default for ValidationCollector<N> {
    fn default() -> Self {
        Self::new()
    }
}
