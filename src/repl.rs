use crate::evaluator::EvalOptions;
use crate::info::version_banner;
use crate::interpreter::Interpreter;
use crate::value::format_number;
use std::io::{self, Write};

/// Interactive loop. Variables persist between lines; a line that is not a
/// statement is evaluated as a condition and its value printed.
pub fn start(options: EvalOptions) {
    println!("{}", version_banner());
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut interpreter = Interpreter::with_options(options);

    loop {
        print!("{}", if interpreter.in_comment() { ". " } else { "> " });
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, &mut interpreter);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, interpreter: &mut Interpreter) {
    if interpreter.is_statement(source) {
        match interpreter.execute_line(source, 0) {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(error) => error.report(source, None),
        }
        return;
    }

    match interpreter.evaluate(source) {
        Ok(value) => println!("{}", format_number(value)),
        Err(error) => error.report(source, None),
    }
}
