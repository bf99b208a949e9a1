//! Library entry point for the lexer/parser/semantic-analyzer/interpreter
//! pipeline. Never prints banners or writes to stdout/stderr directly;
//! callers (the `halite` binary, or tests) decide what to do with the
//! returned diagnostics and the program's own `print` output, which goes
//! to the sink passed into [`run_source`].

pub mod ast;
pub mod diagnostics;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod semantic;

use std::io::Write;

use diagnostics::{AnalysisWarning, Diagnostic, RuntimeError};

/// Everything that can go wrong before or during a run: lexical failures,
/// parse failures, semantic errors, or (at most one) runtime error. The
/// lexer itself never hard-fails — it turns an unrecognized character or
/// an unterminated string into an `Error` token — so lexical diagnostics
/// surface once the parser reaches that token, alongside genuine syntax
/// errors collected in the same pass.
#[derive(Debug)]
pub struct CheckFailure {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<AnalysisWarning>,
}

impl CheckFailure {
    /// The runtime error that aborted the run, if the failure happened
    /// after lexing/parsing/analysis succeeded. `None` for a lexical,
    /// syntax, or semantic failure, since those never reach the
    /// interpreter and `errors` holds a batch rather than a single fault.
    pub fn last_runtime_error(&self) -> Option<&RuntimeError> {
        self.errors.iter().find_map(|d| match d {
            Diagnostic::Runtime(e) => Some(e),
            _ => None,
        })
    }
}

/// Lexes, parses and type-checks `source` without executing it. Useful
/// for `--dump-tokens`/`--dump-ast` driver modes that want to stop before
/// running the program.
pub fn check_source(source: &str) -> Result<(ast::Program, Vec<AnalysisWarning>), CheckFailure> {
    let tokens = lexer::Lexer::tokenize(source);
    let (program, parse_errors) = parser::Parser::parse(tokens);
    if !parse_errors.is_empty() {
        return Err(CheckFailure {
            errors: parse_errors,
            warnings: Vec::new(),
        });
    }

    let analysis = semantic::analyze(&program);
    if !analysis.is_ok() {
        return Err(CheckFailure {
            errors: analysis.errors.into_iter().map(Diagnostic::from).collect(),
            warnings: analysis.warnings,
        });
    }

    Ok((program, analysis.warnings))
}

/// Runs `source` to completion, writing any `print` output to `out`.
///
/// Returns the semantic warnings collected along the way on success, or
/// the full list of diagnostics (parse/semantic errors, or exactly one
/// runtime error) on failure.
pub fn run_source(source: &str, out: &mut dyn Write) -> Result<Vec<AnalysisWarning>, CheckFailure> {
    let (program, warnings) = check_source(source)?;

    interpreter::Interpreter::new(out)
        .run(&program)
        .map_err(|e: RuntimeError| CheckFailure {
            errors: vec![Diagnostic::from(e)],
            warnings: warnings.clone(),
        })?;

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_well_formed_program() {
        let mut out = Vec::new();
        let warnings = run_source(r#"print("hello");"#, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn reports_parse_errors_without_running() {
        let mut out = Vec::new();
        let err = run_source("let ;", &mut out).unwrap_err();
        assert!(!err.errors.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn reports_semantic_errors_without_running() {
        let mut out = Vec::new();
        let err = run_source(r#"let x: int = "oops";"#, &mut out).unwrap_err();
        assert!(!err.errors.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn reports_runtime_errors_after_partial_output() {
        let mut out = Vec::new();
        let err = run_source(r#"print("before"); print(1 / 0);"#, &mut out).unwrap_err();
        assert_eq!(String::from_utf8(out).unwrap(), "before\n");
        assert_eq!(err.errors.len(), 1);
        let runtime_err = err.last_runtime_error().expect("a runtime error");
        assert!(runtime_err.message.contains("division"));
    }

    #[test]
    fn last_runtime_error_is_none_for_a_parse_failure() {
        let mut out = Vec::new();
        let err = run_source("let ;", &mut out).unwrap_err();
        assert!(err.last_runtime_error().is_none());
    }

    #[test]
    fn an_unrecognized_character_is_reported_as_lexical() {
        let mut out = Vec::new();
        let err = run_source("let x: int = 1 % 2;", &mut out).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(matches!(err.errors[0], Diagnostic::Lexical(_)));
        assert!(err.errors[0].to_string().starts_with("[ERROR Lexical]"));
    }
}
