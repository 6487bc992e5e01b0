use std::fmt;

/// Error codes for all engine diagnostics.
///
/// Format: E#### where the first digit indicates the failing area:
/// - E1xxx: names and namespaces
/// - E2xxx: binding
/// - E3xxx: frames and variables
/// - E4xxx: arity
/// - E5xxx: syntax forms and primitives
/// - E6xxx: evaluation
/// - E7xxx: expression structure
/// - E9xxx: internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Names and Namespaces (E1xxx)
    /// Name does not resolve in any enclosing namespace
    E1001,
    /// Name is already bound in the target namespace
    E1002,
    /// Malformed name path
    E1003,
    /// Name path segment is not a namespace
    E1004,
    /// Namespace operation not allowed for this namespace kind
    E1005,

    // Binding (E2xxx)
    /// One or more errors were collected while binding
    E2001,
    /// Expression still contains unbound elements
    E2002,
    /// Invalid or duplicate pipe variable
    E2003,

    // Frames and Variables (E3xxx)
    /// Variable's declaring pipeline is not on the frame chain
    E3001,
    /// Variable read before it was assigned
    E3002,
    /// Variable assigned twice
    E3003,

    // Arity (E4xxx)
    /// Too few parameters
    E4001,
    /// Too many parameters
    E4002,
    /// Too few prefix parameters
    E4003,
    /// Too many prefix parameters
    E4004,
    /// Too many parameters for a partially applied pipeline
    E4005,

    // Syntax Forms and Primitives (E5xxx)
    /// Invalid option list for a syntax form
    E5001,
    /// Unknown syntax-form implementation
    E5002,
    /// Syntax form name already registered
    E5003,
    /// Unknown primitive
    E5004,
    /// Invalid parameters for a syntax form
    E5005,

    // Evaluation (E6xxx)
    /// Phase operation invoked on an evaluator
    E6001,
    /// Value cannot be used as the requested kind
    E6002,
    /// Integer division or remainder by zero
    E6003,
    /// Primitive rejected its parameters
    E6004,
    /// Context stack underflow
    E6005,
    /// Frame depth limit exceeded
    E6006,

    // Expression Structure (E7xxx)
    /// Brackets handed to the expression builder do not balance
    E7001,

    // Internal (E9xxx)
    /// Uncategorized engine error
    E9001,
}

impl ErrorCode {
    /// The code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E5005 => "E5005",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E7001 => "E7001",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// One-line description for documentation and `--explain` style output.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "name not found",
            ErrorCode::E1002 => "duplicate name",
            ErrorCode::E1003 => "invalid name path",
            ErrorCode::E1004 => "path segment is not a namespace",
            ErrorCode::E1005 => "invalid namespace operation",
            ErrorCode::E2001 => "binding failed",
            ErrorCode::E2002 => "unbound elements in expression",
            ErrorCode::E2003 => "invalid pipe variable",
            ErrorCode::E3001 => "variable not found",
            ErrorCode::E3002 => "variable not assigned",
            ErrorCode::E3003 => "variable is immutable",
            ErrorCode::E4001 => "insufficient parameters",
            ErrorCode::E4002 => "too many parameters",
            ErrorCode::E4003 => "insufficient prefix parameters",
            ErrorCode::E4004 => "too many prefix parameters",
            ErrorCode::E4005 => "too many parameters for step",
            ErrorCode::E5001 => "invalid syntax-form options",
            ErrorCode::E5002 => "unknown syntax-form implementation",
            ErrorCode::E5003 => "syntax form already registered",
            ErrorCode::E5004 => "unknown primitive",
            ErrorCode::E5005 => "invalid syntax-form parameters",
            ErrorCode::E6001 => "invalid evaluator operation",
            ErrorCode::E6002 => "invalid cast",
            ErrorCode::E6003 => "division by zero",
            ErrorCode::E6004 => "primitive failed",
            ErrorCode::E6005 => "context stack underflow",
            ErrorCode::E6006 => "frame depth limit exceeded",
            ErrorCode::E7001 => "unbalanced brackets",
            ErrorCode::E9001 => "engine error",
        }
    }

    /// True for codes raised while a bind phase is collecting errors.
    pub fn is_bind_error(&self) -> bool {
        self.as_str().starts_with("E2") || self.as_str().starts_with("E5")
    }

    /// True for the frame/variable family.
    pub fn is_frame_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
