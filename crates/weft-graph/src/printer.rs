//! Human-readable rendering of types and domain values.

use crate::ty::Type;
use std::fmt;

/// Renders types and domain values for messages.
pub trait Printer<N> {
    fn print_type(&self, ty: &Type) -> String;

    /// Render a domain value; `sentence_beginning` asks for a form that can
    /// start a sentence.
    fn print_node(&self, node: &N, sentence_beginning: bool) -> String;
}

/// Prints type names and the `Debug` form of domain values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugPrinter;

impl<N: fmt::Debug> Printer<N> for DebugPrinter {
    fn print_type(&self, ty: &Type) -> String {
        ty.name().to_string()
    }

    fn print_node(&self, node: &N, sentence_beginning: bool) -> String {
        let printed = format!("{:?}", node);
        if !sentence_beginning {
            return printed;
        }
        let mut chars = printed.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => printed,
        }
    }
}
