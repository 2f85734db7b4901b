// fekal: compiler front-end for the seccomp policy language

use std::env;
use std::fs;
use std::io;
use std::process;

use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use fekal::compiler::Compiler;
use fekal::printer;

/// Colour on standard error is enabled when standard output is a terminal
/// and `TERM` names something capable of colour.
fn has_color() -> bool {
    if !io::stdout().is_tty() {
        return false;
    }
    match env::var("TERM") {
        Ok(term) => !term.is_empty() && term != "dumb",
        Err(_) => false,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_tty())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        let program_name = args.first().map(|s| s.as_str()).unwrap_or("fekal");
        eprintln!("Error: No input file provided");
        eprintln!();
        eprintln!("Usage: {} <policy-file>", program_name);
        process::exit(1);
    }

    let path = &args[1];
    let source = match fs::read(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: {}: {}", path, err);
            process::exit(1);
        }
    };

    let mut compiler = Compiler::with_colors(has_color());
    match compiler.compile(&source) {
        Ok(ast) => {
            compiler.print_diagnostics();
            print!("{}", printer::dump(&ast));
        }
        Err(err) => {
            compiler.print_diagnostics();
            eprintln!("Error: {}", err);
        }
    }
}
