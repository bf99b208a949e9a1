//! # halite
//!
//! This binary runs a halite source file through the lexer, parser,
//! semantic analyzer and tree-walking interpreter, printing the
//! program's own output to stdout and any diagnostics in the fixed
//! `[ERROR <Stage>] line L, column C: message` format to the log.

mod cli;

use std::fs;
use std::io;

use cli::Cli;
use halite::diagnostics::AnalysisWarning;
use halite::CheckFailure;
use log::{error, info, warn};

fn main() {
    let args = Cli::init();
    simple_logger::init_with_level(args.verbosity.clone().into()).unwrap();

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(err) => {
            error!("could not read '{}': {err}", args.file.display());
            std::process::exit(1);
        }
    };

    if args.dump_tokens {
        let tokens = halite::lexer::Lexer::tokenize(&source);
        info!("Tokens:\n{tokens:#?}");
        return;
    }

    if args.dump_ast {
        match halite::check_source(&source) {
            Ok((program, warnings)) => {
                info!("AST:\n{program:#?}");
                report_warnings(&warnings);
            }
            Err(failure) => {
                report_failure(&failure);
                std::process::exit(1);
            }
        }
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match halite::run_source(&source, &mut out) {
        Ok(warnings) => report_warnings(&warnings),
        Err(failure) => {
            report_failure(&failure);
            std::process::exit(1);
        }
    }
}

fn report_warnings(warnings: &[AnalysisWarning]) {
    for warning in warnings {
        warn!("{warning}");
    }
    if !warnings.is_empty() {
        info!("{} warning(s) emitted", warnings.len());
    }
}

fn report_failure(failure: &CheckFailure) {
    report_warnings(&failure.warnings);
    for diagnostic in &failure.errors {
        error!("{diagnostic}");
    }
}
