//! The `rill` binary: evaluates a script, or starts a REPL when no script
//! is given.

mod repl;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rill_compiler::cfg::ControlFlowGraph;
use rill_compiler::parser::dump_tree;
use rill_compiler::{Compilation, SourceText};
use rill_vm::Evaluator;

#[derive(Parser)]
#[command(name = "rill", version, about = "The Rill language")]
struct Cli {
    /// Script to evaluate; omit to start the REPL.
    script: Option<PathBuf>,

    /// Print the syntax tree before evaluating.
    #[arg(long)]
    show_tree: bool,

    /// Print the lowered bound program before evaluating.
    #[arg(long)]
    show_program: bool,

    /// Write the control-flow graph of the top-level program as DOT.
    #[arg(long, value_name = "PATH")]
    emit_cfg: Option<PathBuf>,

    /// Print diagnostics as JSON records instead of rendered snippets.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match &cli.script {
        Some(path) => run_script(&cli, path),
        None => repl::run(),
    }
}

fn run_script(cli: &Cli, path: &PathBuf) -> ExitCode {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("rill: cannot read {}: {error}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let source = SourceText::with_path(text, path.display().to_string());
    let compilation = Compilation::new(source);

    if cli.show_tree {
        print!("{}", dump_tree(compilation.syntax_root().as_cst()));
    }

    let program = match compilation.check() {
        Ok(program) => program,
        Err(error) => {
            report_diagnostics(cli, &compilation, error.diagnostics());
            return ExitCode::FAILURE;
        }
    };

    if cli.show_program {
        print!("{}", program.dump());
    }

    if let Some(dot_path) = &cli.emit_cfg {
        let graph = ControlFlowGraph::build(&program.statements);
        let result = File::create(dot_path).and_then(|mut file| graph.write_dot(&mut file));
        if let Err(error) = result {
            eprintln!("rill: cannot write {}: {error}", dot_path.display());
            return ExitCode::FAILURE;
        }
    }

    let mut evaluator = Evaluator::new();
    match evaluator.evaluate(&program) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("runtime error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn report_diagnostics(
    cli: &Cli,
    compilation: &Compilation,
    diagnostics: &rill_compiler::Diagnostics,
) {
    if cli.json {
        let records = diagnostics.to_records(compilation.source());
        match serde_json::to_string_pretty(&records) {
            Ok(json) => eprintln!("{json}"),
            Err(error) => eprintln!("rill: cannot serialize diagnostics: {error}"),
        }
        return;
    }

    let rendered = diagnostics
        .printer()
        .source(compilation.source().as_str())
        .path(compilation.source().path().unwrap_or("<script>"))
        .colored(true)
        .render();
    eprintln!("{rendered}");
}
