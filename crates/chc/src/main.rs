//! CH Compiler - command line front end
//!
//! Usage: chc [OPTIONS] <input>

use anyhow::Context;
use ch_compiler::common::DiagnosticReporter;
use ch_compiler::driver::{self, CompileOptions};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "chc")]
#[command(version)]
#[command(about = "Compiler front end for the CH language", long_about = None)]
struct Args {
    /// Input source file (.ch)
    #[arg(required = true)]
    input: PathBuf,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let options = CompileOptions {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        verbose: args.verbose,
    };

    match driver::compile(&source, &options) {
        Ok(program) => {
            if args.verbose {
                eprintln!(
                    "{}: {} function(s), no errors",
                    filename,
                    program.functions.len()
                );
            }
            Ok(())
        }
        Err(error) => {
            reporter.report_error(file_id, &error);
            process::exit(1);
        }
    }
}
