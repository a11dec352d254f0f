//! Error codes for Weft diagnostics.

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Relation checks (W0100 - W0199)
    NotAssignable,
    NotEqual,
    ForbiddenType,

    // Authoritative selection (W0200 - W0299)
    UnresolvedSelector,
    UninferableType,
    SelectorTooDeep,

    // Graph mutations (W0300 - W0399)
    DuplicateTypeKey,
    MissingEdgeEndpoint,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Relations
            ErrorCode::NotAssignable => "W0100",
            ErrorCode::NotEqual => "W0101",
            ErrorCode::ForbiddenType => "W0102",

            // Selection
            ErrorCode::UnresolvedSelector => "W0200",
            ErrorCode::UninferableType => "W0201",
            ErrorCode::SelectorTooDeep => "W0202",

            // Graph
            ErrorCode::DuplicateTypeKey => "W0300",
            ErrorCode::MissingEdgeEndpoint => "W0301",
        }
    }

    /// Get a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::NotAssignable => "value is not assignable to the expected type",
            ErrorCode::NotEqual => "type is not equal to the expected type",
            ErrorCode::ForbiddenType => "value has a type it must not have",
            ErrorCode::UnresolvedSelector => "no type is registered under this identifier",
            ErrorCode::UninferableType => "no inference rule produced a type for this value",
            ErrorCode::SelectorTooDeep => "type selector chain exceeds the recursion limit",
            ErrorCode::DuplicateTypeKey => "another type is already registered under this key",
            ErrorCode::MissingEdgeEndpoint => "edge endpoint is not part of the type graph",
        }
    }

    /// Get a suggested fix for the error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnresolvedSelector => {
                Some("make sure the type is added to the graph before it is selected")
            }
            ErrorCode::UninferableType => {
                Some("register an inference rule that covers this kind of value")
            }
            ErrorCode::SelectorTooDeep => {
                Some("check deferred selectors and references for a cycle")
            }
            ErrorCode::MissingEdgeEndpoint => Some("add both types to the graph before connecting them"),
            _ => None,
        }
    }
}
