//! Errors of authoritative type selection.

use thiserror::Error;
use weft_common::Span;
use weft_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use weft_graph::InferenceProblem;

/// Failure of [`TypeResolver::must_select`](crate::TypeResolver::must_select).
///
/// Only the authoritative path fails loudly; speculative resolution and
/// validation treat the same situations as "no type yet".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no type is registered under the identifier `{identifier}`")]
    UnresolvedSelector { identifier: String },

    #[error("could not infer a type for {node}")]
    UninferableType {
        node: String,
        problems: Vec<InferenceProblem>,
    },

    #[error("type selector chain is deeper than {depth} levels")]
    SelectorTooDeep { depth: usize },
}

impl SelectError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SelectError::UnresolvedSelector { .. } => ErrorCode::UnresolvedSelector,
            SelectError::UninferableType { .. } => ErrorCode::UninferableType,
            SelectError::SelectorTooDeep { .. } => ErrorCode::SelectorTooDeep,
        }
    }

    /// Build a diagnostic pointing at `span`.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let mut diag = Diagnostic::error(DiagnosticKind::Selection, span, self.to_string())
            .with_code(self.code())
            .with_label(Label::new(span, self.code().description()));

        if let SelectError::UninferableType { problems, .. } = self {
            for problem in problems {
                diag = diag.with_note(problem.to_string());
            }
        }
        diag
    }
}
