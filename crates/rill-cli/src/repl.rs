//! Interactive REPL.
//!
//! Submissions accumulate line by line: text that parses cleanly is
//! submitted at once, otherwise input continues until a blank line forces
//! submission (and shows the diagnostics). Compilations chain through the
//! previous global scope, and the evaluator keeps its globals, so earlier
//! definitions stay usable.

use std::process::ExitCode;
use std::sync::Arc;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use rill_compiler::binder::BoundGlobalScope;
use rill_compiler::binder::bound;
use rill_compiler::parser::dump_tree;
use rill_compiler::{Compilation, SourceText};
use rill_vm::Evaluator;

const PROMPT: &str = ">> ";
const CONTINUATION_PROMPT: &str = ".. ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaCommand {
    ShowTree,
    ShowProgram,
    ShowBoundTree,
    Clear,
    Reset,
    Exit,
}

fn parse_meta_command(line: &str) -> Option<MetaCommand> {
    match line.trim() {
        "#showTree" => Some(MetaCommand::ShowTree),
        "#showProgram" => Some(MetaCommand::ShowProgram),
        "#showBoundTree" => Some(MetaCommand::ShowBoundTree),
        "#cls" => Some(MetaCommand::Clear),
        "#reset" => Some(MetaCommand::Reset),
        "#exit" => Some(MetaCommand::Exit),
        _ => None,
    }
}

struct Repl {
    previous: Option<Arc<BoundGlobalScope>>,
    evaluator: Evaluator<'static>,
    show_tree: bool,
    show_program: bool,
    show_bound_tree: bool,
}

impl Repl {
    fn new() -> Self {
        Self {
            previous: None,
            evaluator: Evaluator::new(),
            show_tree: false,
            show_program: false,
            show_bound_tree: false,
        }
    }

    fn handle_meta_command(&mut self, command: MetaCommand) -> bool {
        match command {
            MetaCommand::ShowTree => {
                self.show_tree = !self.show_tree;
                println!(
                    "{}",
                    if self.show_tree {
                        "showing syntax trees"
                    } else {
                        "not showing syntax trees"
                    }
                );
            }
            MetaCommand::ShowProgram => {
                self.show_program = !self.show_program;
                println!(
                    "{}",
                    if self.show_program {
                        "showing the lowered program"
                    } else {
                        "not showing the lowered program"
                    }
                );
            }
            MetaCommand::ShowBoundTree => {
                self.show_bound_tree = !self.show_bound_tree;
                println!(
                    "{}",
                    if self.show_bound_tree {
                        "showing bound trees"
                    } else {
                        "not showing bound trees"
                    }
                );
            }
            MetaCommand::Clear => {
                print!("\x1b[2J\x1b[H");
            }
            MetaCommand::Reset => {
                self.previous = None;
                self.evaluator = Evaluator::new();
            }
            MetaCommand::Exit => return false,
        }
        true
    }

    fn submit(&mut self, text: &str) {
        let source = SourceText::new(text);
        let compilation = match &self.previous {
            Some(previous) => Compilation::with_previous(previous.clone(), source),
            None => Compilation::new(source),
        };

        if self.show_tree {
            print!("{}", dump_tree(compilation.syntax_root().as_cst()));
        }
        if self.show_bound_tree {
            let mut out = String::new();
            bound::dump_statements(&compilation.global_scope().statements, 0, &mut out);
            print!("{out}");
        }

        match compilation.check() {
            Ok(program) => {
                if self.show_program {
                    print!("{}", program.dump());
                }
                match self.evaluator.evaluate(&program) {
                    Ok(Some(value)) => println!("{value}"),
                    Ok(None) => {}
                    Err(error) => eprintln!("runtime error: {error}"),
                }
                // Failed submissions are not chained; this one succeeded.
                self.previous = Some(compilation.global_scope().clone());
            }
            Err(error) => {
                let rendered = error
                    .diagnostics()
                    .printer()
                    .source(compilation.source().as_str())
                    .colored(true)
                    .render();
                eprintln!("{rendered}");
            }
        }
    }
}

/// Whether the accumulated text is ready to submit: either it parses
/// cleanly, or the user forced submission with a blank line.
fn is_complete(text: &str, last_line: &str) -> bool {
    if last_line.trim().is_empty() {
        return true;
    }
    let result = rill_compiler::parser::parse(&SourceText::new(text));
    result.diagnostics.is_empty()
}

pub fn run() -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(error) => {
            eprintln!("rill: cannot start the REPL: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut repl = Repl::new();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };

        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("rill: {error}");
                return ExitCode::FAILURE;
            }
        };

        if buffer.is_empty() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(command) = parse_meta_command(&line) {
                let _ = editor.add_history_entry(&line);
                if !repl.handle_meta_command(command) {
                    break;
                }
                continue;
            }
        }

        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(&line);

        if is_complete(&buffer, &line) {
            let text = std::mem::take(&mut buffer);
            let _ = editor.add_history_entry(text.trim());
            repl.submit(&text);
        }
    }

    ExitCode::SUCCESS
}
