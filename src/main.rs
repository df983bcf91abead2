//! tamc command line

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tamc::backend::{object, Disassembler};
use tamc::feedback::CompilationReport;
use tamc::frontend::printer::print_program;
use tamc::{compile_source, CompileOptions};

/// Triangle Abstract Machine compiler
#[derive(Parser, Debug)]
#[command(name = "tamc")]
#[command(version = "0.1.0")]
#[command(about = "Compiler for a Triangle-style teaching language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output object file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the parsed program as canonical source
    #[arg(long, global = true)]
    emit_ast: bool,

    /// Print a disassembly of the generated code
    #[arg(long, global = true)]
    emit_tam: bool,

    /// Print a JSON compilation report instead of plain diagnostics
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file
    Build {
        /// Input source file
        input: PathBuf,

        /// Output object file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,
    },
    /// Disassemble an object file
    Disasm {
        /// Object file
        input: PathBuf,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the requested work succeeded
fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Some(Commands::Build { input, output }) => {
            compile_file(input, output.as_deref().or(cli.output.as_deref()), false, cli)
        }
        Some(Commands::Check { input }) => compile_file(input, None, true, cli),
        Some(Commands::Disasm { input }) => {
            let instructions = object::read_file(input)
                .with_context(|| format!("cannot disassemble {}", input.display()))?;
            print!("{}", Disassembler::new().print(&instructions));
            Ok(true)
        }
        Some(Commands::Version) => {
            println!("tamc 0.1.0");
            println!("Triangle Abstract Machine compiler");
            println!("License: Apache-2.0");
            Ok(true)
        }
        None => match &cli.input {
            Some(input) => compile_file(input, cli.output.as_deref(), false, cli),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: tamc <FILE> or tamc build <FILE>");
                Ok(false)
            }
        },
    }
}

fn compile_file(input: &Path, output: Option<&Path>, check_only: bool, cli: &Cli) -> Result<bool> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;

    let options = CompileOptions { check_only };
    let compilation = compile_source(&source, &options);

    if cli.json {
        let report = CompilationReport::new(&compilation, &input.display().to_string(), &source);
        println!("{}", report.to_json());
    } else {
        for diagnostic in compilation.reporter.diagnostics() {
            eprintln!("{}: {}", input.display(), diagnostic);
        }
    }

    if cli.emit_ast {
        if let Some(program) = &compilation.program {
            println!("{}", print_program(program));
        }
    }

    if !compilation.succeeded() {
        if !cli.json {
            eprintln!(
                "{}: {} error(s), compilation failed",
                input.display(),
                compilation.reporter.error_count()
            );
        }
        return Ok(false);
    }

    if let Some(code) = &compilation.code {
        if cli.emit_tam {
            print!("{}", Disassembler::new().print(code.instructions()));
        }
        let out_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("tam"));
        object::write_file(&out_path, code.instructions())
            .with_context(|| format!("cannot write {}", out_path.display()))?;
        if !cli.json {
            println!("Output: {}", out_path.display());
        }
    } else if !cli.json {
        println!("No errors found");
    }
    Ok(true)
}
