//! Validation problems.

use serde::{Deserialize, Serialize};
use weft_common::Span;
use weft_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label, Severity};
use weft_graph::{Printer, TypeMismatch};

/// A diagnostic about one domain value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationProblem<N> {
    /// The value the problem is about.
    pub node: N,
    /// The faulty property of the value, if the problem is that specific.
    pub property: Option<String>,
    /// Index into an array-valued property.
    pub index: Option<usize>,
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    /// The comparison failures behind this problem. Empty when there is
    /// nothing to attach, e.g. when a forbidden relation holds.
    pub sub_problems: Vec<TypeMismatch>,
}

impl<N> ValidationProblem<N> {
    pub fn new(node: N, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            node,
            property: None,
            index: None,
            severity,
            code: None,
            message: message.into(),
            sub_problems: Vec::new(),
        }
    }

    pub fn error(node: N, message: impl Into<String>) -> Self {
        Self::new(node, Severity::Error, message)
    }

    pub fn warning(node: N, message: impl Into<String>) -> Self {
        Self::new(node, Severity::Warning, message)
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_sub_problem(mut self, mismatch: TypeMismatch) -> Self {
        self.sub_problems.push(mismatch);
        self
    }

    /// Where inside the node the problem sits, e.g. `parameters[1]`.
    pub fn location(&self) -> Option<String> {
        match (&self.property, self.index) {
            (Some(property), Some(index)) => Some(format!("{}[{}]", property, index)),
            (Some(property), None) => Some(property.clone()),
            (None, Some(index)) => Some(format!("[{}]", index)),
            (None, None) => None,
        }
    }

    /// Build a renderable diagnostic; `span` is where the host located the node.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let label = match self.location() {
            Some(location) => format!("in `{}`", location),
            None => "here".to_string(),
        };
        let mut diag = Diagnostic::new(self.severity, DiagnosticKind::Validation, span, &self.message)
            .with_label(Label::new(span, label));
        if let Some(code) = self.code {
            diag = diag.with_code(code);
        }
        for line in flatten_mismatches(&self.sub_problems) {
            diag = diag.with_note(line);
        }
        diag
    }

    /// Flatten into a serializable record.
    pub fn to_record(&self, printer: &dyn Printer<N>) -> ProblemRecord {
        ProblemRecord {
            node: printer.print_node(&self.node, false),
            property: self.property.clone(),
            index: self.index,
            severity: self.severity,
            code: self.code.map(|code| code.as_str().to_string()),
            message: self.message.clone(),
            sub_problems: flatten_mismatches(&self.sub_problems),
        }
    }
}

fn flatten_mismatches(mismatches: &[TypeMismatch]) -> Vec<String> {
    fn walk(mismatch: &TypeMismatch, depth: usize, out: &mut Vec<String>) {
        out.push(format!("{}{}", "  ".repeat(depth), mismatch.message));
        for sub in &mismatch.sub_problems {
            walk(sub, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    for mismatch in mismatches {
        walk(mismatch, 0, &mut out);
    }
    out
}

/// A [`ValidationProblem`] with the node printed, for hosts that ship
/// diagnostics as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_problems: Vec<String>,
}
