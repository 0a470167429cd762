mod ast;
mod config;
mod env;
mod error;
mod eval;
mod lexer;
mod location;
mod module_loader;
mod native;
mod parser;
mod token;
mod types;
mod value;

use clap::Parser;
use config::{VERSION, WELCOME_FOOTER, WELCOME_MESSAGE};
use env::Environment;
use error::{EvalOutcome, UmbraError};
use eval::eval_module;
use lexer::Lexer;
use parser::parse_source;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// Umbra: a dynamically-evaluated, statically-typed scripting language
#[derive(Parser, Debug)]
#[command(name = "umbra")]
#[command(version = VERSION)]
#[command(about = "A dynamically-evaluated, statically-typed scripting language")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the tokenized source instead of evaluating it
    #[arg(long = "tokens")]
    print_tokens: bool,

    /// Print the parsed AST instead of evaluating it
    #[arg(long = "ast")]
    print_ast: bool,
}

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprint!("{}", e);
            return ExitCode::from(config::EXIT_USAGE as u8);
        }
    };

    match &args.file {
        Some(path) => run_file(path, &args),
        None => run_repl(),
    }
}

fn run_file(path: &PathBuf, args: &CliArgs) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("could not read file {}: {}", path.display(), e);
            return ExitCode::from(1);
        }
    };

    if args.print_tokens {
        match Lexer::new(&source).tokenize() {
            Ok(tokens) => {
                eprintln!("{:#?}", tokens);
                return ExitCode::SUCCESS;
            }
            Err(e) => return report(&e),
        }
    }

    let module = match parse_source(&source) {
        Ok(m) => m,
        Err(e) => return report(&e),
    };

    if args.print_ast {
        eprintln!("{:#?}", module);
        return ExitCode::SUCCESS;
    }

    let env = Environment::new();
    match eval_module(&module, &env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(EvalOutcome::Error(e)) => report(&e),
        Err(EvalOutcome::Control(_)) => ExitCode::SUCCESS,
    }
}

fn run_repl() -> ExitCode {
    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_FOOTER);

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("failed to initialize REPL: {}", e);
            return ExitCode::from(1);
        }
    };

    let env = Environment::new();
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if line.trim() == ":q" {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                run_line(&line, &env);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {}", e);
                break;
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_line(line: &str, env: &Rc<Environment>) {
    let module = match parse_source(line) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    if let Err(EvalOutcome::Error(e)) = eval_module(&module, env) {
        eprintln!("{}", e);
    }
}

fn report(e: &UmbraError) -> ExitCode {
    eprintln!("{}", e);
    ExitCode::from(e.exit_code() as u8)
}
