//! Error types for binding and evaluation.
//!
//! `EvalErrorKind` is the closed set of failure categories; every kind maps to
//! a stable [`ErrorCode`]. Factory functions (e.g. `duplicate_name()`) are the
//! public construction API and fill both `kind` and `message`.
//!
//! Bind failures are special: while a bind phase is active they are collected
//! on the execution context and surface as a single `BindAggregate` error whose
//! `related` list holds the individual problems in collection order.

use std::fmt;

use plait_diagnostic::{Diagnostic, ErrorCode};
use plait_ir::Span;

use crate::name::PipeId;
use crate::node::Node;

/// Result of a phase operation.
pub type EvalResult<T = Node> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Names and namespaces
    NameNotFound {
        name: String,
    },
    DuplicateName {
        name: String,
    },
    InvalidNamePath {
        reason: &'static str,
    },
    NotANamespace {
        segment: String,
    },
    NamespaceOperation {
        reason: String,
    },

    // Binding
    BindAggregate {
        count: usize,
    },
    UnboundElements,
    DuplicatePipeVariable {
        name: String,
    },

    // Frames
    VariableNotFound {
        name: String,
        pipe: PipeId,
    },
    VariableUnassigned {
        name: String,
    },
    VariableImmutable {
        name: String,
    },

    // Arity
    InsufficientParameters,
    TooManyParameters,
    InsufficientPrefixParameters,
    TooManyPrefixParameters,
    TooManyStepParameters,

    // Syntax forms and primitives
    RisticValidation {
        form: String,
        count: usize,
    },
    UnknownRisticImplementation {
        name: String,
    },
    RisticAlreadyRegistered {
        name: String,
    },
    UnknownPrimitive {
        class: String,
        method: String,
    },
    InvalidRisticParameters {
        reason: String,
    },

    // Evaluation
    EvaluatorMisuse {
        operation: &'static str,
    },
    InvalidCast {
        expected: &'static str,
        got: String,
    },
    DivisionByZero,
    Primitive {
        message: String,
    },
    StackUnderflow {
        stack: &'static str,
    },
    DepthExceeded {
        stack: &'static str,
        limit: usize,
    },

    // Expression structure
    UnbalancedBrackets {
        reason: &'static str,
    },

    /// Uncategorized error.
    Custom {
        message: String,
    },
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NameNotFound { .. } => ErrorCode::E1001,
            Self::DuplicateName { .. } => ErrorCode::E1002,
            Self::InvalidNamePath { .. } => ErrorCode::E1003,
            Self::NotANamespace { .. } => ErrorCode::E1004,
            Self::NamespaceOperation { .. } => ErrorCode::E1005,
            Self::BindAggregate { .. } => ErrorCode::E2001,
            Self::UnboundElements => ErrorCode::E2002,
            Self::DuplicatePipeVariable { .. } => ErrorCode::E2003,
            Self::VariableNotFound { .. } => ErrorCode::E3001,
            Self::VariableUnassigned { .. } => ErrorCode::E3002,
            Self::VariableImmutable { .. } => ErrorCode::E3003,
            Self::InsufficientParameters => ErrorCode::E4001,
            Self::TooManyParameters => ErrorCode::E4002,
            Self::InsufficientPrefixParameters => ErrorCode::E4003,
            Self::TooManyPrefixParameters => ErrorCode::E4004,
            Self::TooManyStepParameters => ErrorCode::E4005,
            Self::RisticValidation { .. } => ErrorCode::E5001,
            Self::UnknownRisticImplementation { .. } => ErrorCode::E5002,
            Self::RisticAlreadyRegistered { .. } => ErrorCode::E5003,
            Self::UnknownPrimitive { .. } => ErrorCode::E5004,
            Self::InvalidRisticParameters { .. } => ErrorCode::E5005,
            Self::EvaluatorMisuse { .. } => ErrorCode::E6001,
            Self::InvalidCast { .. } => ErrorCode::E6002,
            Self::DivisionByZero => ErrorCode::E6003,
            Self::Primitive { .. } => ErrorCode::E6004,
            Self::StackUnderflow { .. } => ErrorCode::E6005,
            Self::DepthExceeded { .. } => ErrorCode::E6006,
            Self::UnbalancedBrackets { .. } => ErrorCode::E7001,
            Self::Custom { .. } => ErrorCode::E9001,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Names and namespaces
            Self::NameNotFound { name } => write!(f, "Name '{name}' not found"),
            Self::DuplicateName { name } => write!(f, "Name '{name}' has already been defined"),
            Self::InvalidNamePath { reason } => write!(f, "{reason}"),
            Self::NotANamespace { segment } => {
                write!(f, "Namespace path segment '{segment}' is not a namespace")
            }
            Self::NamespaceOperation { reason } => write!(f, "{reason}"),

            // Binding
            Self::BindAggregate { count } => {
                let noun = if *count == 1 { "error" } else { "errors" };
                write!(f, "Binding failed with {count} {noun}")
            }
            Self::UnboundElements => write!(f, "Expression contains unbound elements"),
            Self::DuplicatePipeVariable { name } => {
                write!(f, "Duplicate pipe variable '{name}' in pipeline")
            }

            // Frames
            Self::VariableNotFound { name, .. } => {
                write!(f, "Variable '{name}' not found in frame path")
            }
            Self::VariableUnassigned { name } => {
                write!(f, "Variable '{name}' has not been assigned")
            }
            Self::VariableImmutable { name } => write!(f, "Variable '{name}' is immutable"),

            // Arity
            Self::InsufficientParameters => write!(f, "Insufficient parameters"),
            Self::TooManyParameters => write!(f, "Too many parameters"),
            Self::InsufficientPrefixParameters => write!(f, "Insufficient prefix parameters"),
            Self::TooManyPrefixParameters => write!(f, "Too many prefix parameters"),
            Self::TooManyStepParameters => {
                write!(f, "Too many parameters for stepped Pipeline")
            }

            // Syntax forms and primitives
            Self::RisticValidation { form, count } => {
                write!(f, "Invalid '{form}' ristic: {count} validation errors")
            }
            Self::UnknownRisticImplementation { name } => {
                write!(f, "Unknown ristic implementation '{name}'")
            }
            Self::RisticAlreadyRegistered { name } => {
                write!(f, "Ristic class '{name}' is already registered")
            }
            Self::UnknownPrimitive { class, method } => {
                write!(f, "Unknown primitive '{class}' '{method}'")
            }
            Self::InvalidRisticParameters { reason } => write!(f, "{reason}"),

            // Evaluation
            Self::EvaluatorMisuse { operation } => write!(f, "Invalid call to '{operation}'"),
            Self::InvalidCast { expected, got } => write!(f, "Cannot cast '{got}' to {expected}"),
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::Primitive { message } => write!(f, "{message}"),
            Self::StackUnderflow { stack } => write!(f, "The {stack} stack is empty"),
            Self::DepthExceeded { stack, limit } => {
                write!(f, "The {stack} stack exceeded its depth limit of {limit}")
            }

            Self::UnbalancedBrackets { reason } => write!(f, "{reason}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Secondary information attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// One node on the flow trail at the point an error escaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowFrame {
    /// Printed form of the node being processed.
    pub label: String,
    pub span: Option<Span>,
}

/// Snapshot of the flow stack at an error site, innermost last.
///
/// Consecutive entries at the same source position are collapsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowBacktrace {
    frames: Vec<FlowFrame>,
}

impl FlowBacktrace {
    pub fn new(frames: Vec<FlowFrame>) -> Self {
        let mut deduped: Vec<FlowFrame> = Vec::with_capacity(frames.len());
        for frame in frames {
            let repeat = deduped
                .last()
                .is_some_and(|prev| frame.span.is_some() && prev.span == frame.span);
            if !repeat {
                deduped.push(frame);
            }
        }
        Self { frames: deduped }
    }

    pub fn frames(&self) -> &[FlowFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for FlowBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "flow backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.label)?;
            if let Some(span) = frame.span.filter(|s| !s.is_dummy()) {
                write!(f, " at {span}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Binding or evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// For factory-created errors this equals `kind.to_string()`.
    pub message: String,
    pub span: Option<Span>,
    pub backtrace: Option<FlowBacktrace>,
    /// Underlying errors of an aggregate, in collection order.
    pub related: Vec<EvalError>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an uncategorized error.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
            backtrace: None,
            related: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            backtrace: None,
            related: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if !span.is_dummy() {
            self.span = Some(span);
        }
        self
    }

    /// Attach a span only when none is set yet.
    #[must_use]
    pub fn or_span(self, span: Span) -> Self {
        if self.span.is_some() {
            return self;
        }
        self.with_span(span)
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: FlowBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    #[must_use]
    pub fn with_related(mut self, related: Vec<EvalError>) -> Self {
        self.related = related;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn is_bind_aggregate(&self) -> bool {
        matches!(self.kind, EvalErrorKind::BindAggregate { .. })
    }

    /// Declaring pipeline of a variable that could not be found.
    pub fn missing_variable_pipe(&self) -> Option<PipeId> {
        match self.kind {
            EvalErrorKind::VariableNotFound { pipe, .. } => Some(pipe),
            _ => None,
        }
    }

    /// Front-end facing rendering of this error and its related errors.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code(), self.message.clone());
        if let Some(span) = self.span {
            diag = diag.with_span(span);
        }
        for note in &self.notes {
            diag = diag.with_note(note.message.clone());
        }
        for child in &self.related {
            diag = diag.with_child(child.to_diagnostic());
        }
        diag
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Names and namespaces

#[cold]
pub fn name_not_found(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NameNotFound {
        name: name.to_string(),
    })
}

#[cold]
pub fn duplicate_name(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateName {
        name: name.to_string(),
    })
}

#[cold]
pub fn zero_length_segment() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidNamePath {
        reason: "Zero length namespace segment name",
    })
}

#[cold]
pub fn zero_length_name() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidNamePath {
        reason: "Zero length name at end of path",
    })
}

#[cold]
pub fn not_a_namespace(segment: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotANamespace {
        segment: segment.to_string(),
    })
}

#[cold]
pub fn namespace_operation(reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NamespaceOperation {
        reason: reason.into(),
    })
}

// Binding

/// Fold collected bind errors into one aggregate.
#[cold]
pub fn bind_aggregate(errors: Vec<EvalError>) -> EvalError {
    let span = errors.first().and_then(|e| e.span);
    let mut err = EvalError::from_kind(EvalErrorKind::BindAggregate {
        count: errors.len(),
    })
    .with_related(errors);
    err.span = span;
    err
}

#[cold]
pub fn unbound_elements() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundElements)
}

#[cold]
pub fn duplicate_pipe_variable(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicatePipeVariable {
        name: name.to_string(),
    })
}

// Frames

#[cold]
pub fn variable_not_found(name: impl fmt::Display, pipe: PipeId) -> EvalError {
    EvalError::from_kind(EvalErrorKind::VariableNotFound {
        name: name.to_string(),
        pipe,
    })
}

#[cold]
pub fn variable_unassigned(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::VariableUnassigned {
        name: name.to_string(),
    })
}

#[cold]
pub fn variable_immutable(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::VariableImmutable {
        name: name.to_string(),
    })
}

// Arity

#[cold]
pub fn insufficient_parameters() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InsufficientParameters)
}

#[cold]
pub fn too_many_parameters() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyParameters)
}

#[cold]
pub fn insufficient_prefix_parameters() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InsufficientPrefixParameters)
}

#[cold]
pub fn too_many_prefix_parameters() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyPrefixParameters)
}

#[cold]
pub fn too_many_step_parameters() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyStepParameters)
}

// Syntax forms and primitives

/// One error listing every problem found in a syntax form's options.
#[cold]
pub fn ristic_validation(form: impl fmt::Display, errors: Vec<EvalError>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RisticValidation {
        form: form.to_string(),
        count: errors.len(),
    })
    .with_related(errors)
}

#[cold]
pub fn unknown_ristic_implementation(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownRisticImplementation {
        name: name.to_string(),
    })
}

#[cold]
pub fn ristic_already_registered(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RisticAlreadyRegistered {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_primitive(class: impl fmt::Display, method: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownPrimitive {
        class: class.to_string(),
        method: method.to_string(),
    })
}

#[cold]
pub fn invalid_ristic_parameters(reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidRisticParameters {
        reason: reason.into(),
    })
}

// Evaluation

#[cold]
pub fn evaluator_misuse(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::EvaluatorMisuse { operation })
}

#[cold]
pub fn invalid_cast(expected: &'static str, got: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidCast {
        expected,
        got: got.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn primitive_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Primitive {
        message: message.into(),
    })
}

#[cold]
pub fn stack_underflow(stack: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackUnderflow { stack })
}

#[cold]
pub fn depth_exceeded(stack: &'static str, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DepthExceeded { stack, limit })
}

// Expression structure

#[cold]
pub fn missing_start_of_expression() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnbalancedBrackets {
        reason: "Missing start of expression",
    })
}

#[cold]
pub fn mismatched_brackets() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnbalancedBrackets {
        reason: "Mismatching brackets",
    })
}

#[cold]
pub fn missing_end_of_expression() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnbalancedBrackets {
        reason: "Missing end of expression",
    })
}

#[cfg(test)]
mod tests;
