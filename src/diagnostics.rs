//! Shared position type and per-stage diagnostic structs.
//!
//! Every stage of the pipeline (lexer, parser, semantic analyzer,
//! interpreter) reports failures through one of the structs below rather
//! than through `log`; `log` is reserved for the driver's own progress
//! messages (see `bin/halite`). Each struct carries a `Span` and renders
//! itself in the fixed `[ERROR <Stage>] line L, column C: <message>` shape.

use std::error::Error;
use std::fmt::{self, Display};

/// A 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR Lexical] {}: {}", self.span, self.message)
    }
}

impl Error for LexError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR Syntactic] {}: {}", self.span, self.message)
    }
}

impl Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisError {
    pub message: String,
    pub span: Span,
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR Semantic] {}: {}", self.span, self.message)
    }
}

impl Error for AnalysisError {}

/// A non-fatal semantic observation (currently only numeric widening).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisWarning {
    pub message: String,
    pub span: Span,
}

impl Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[WARN Semantic] {}: {}", self.span, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    pub span: Span,
    /// Innermost call first, mirroring the order the original interpreter printed its
    /// call stack in.
    pub call_stack: Vec<String>,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR Runtime] {}: {}", self.span, self.message)?;
        if !self.call_stack.is_empty() {
            write!(f, "\nCall stack:")?;
            for (i, name) in self.call_stack.iter().enumerate() {
                write!(f, "\n  [{}] {name}", i + 1)?;
            }
        }
        Ok(())
    }
}

impl Error for RuntimeError {}

/// Unifies the four per-stage error types for the driver's single
/// reporting call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Lexical(LexError),
    Syntactic(ParseError),
    Semantic(AnalysisError),
    Runtime(RuntimeError),
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Lexical(e) => e.fmt(f),
            Diagnostic::Syntactic(e) => e.fmt(f),
            Diagnostic::Semantic(e) => e.fmt(f),
            Diagnostic::Runtime(e) => e.fmt(f),
        }
    }
}

impl Error for Diagnostic {}

impl From<LexError> for Diagnostic {
    fn from(e: LexError) -> Self {
        Diagnostic::Lexical(e)
    }
}

impl From<ParseError> for Diagnostic {
    fn from(e: ParseError) -> Self {
        Diagnostic::Syntactic(e)
    }
}

impl From<AnalysisError> for Diagnostic {
    fn from(e: AnalysisError) -> Self {
        Diagnostic::Semantic(e)
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(e: RuntimeError) -> Self {
        Diagnostic::Runtime(e)
    }
}
