use crate::error::EvalError;
use crate::evaluator::EvalOptions;
use crate::interpreter::Interpreter;
use log::info;

/// Runs a Xenly program, printing each `print` to stdout.
/// The first failing line is reported against the source and stops the run.
pub fn run(source: &str, filename: Option<&str>, options: EvalOptions) -> Result<(), EvalError> {
    info!("running {}", filename.unwrap_or("<input>"));

    let mut interpreter = Interpreter::with_options(options);
    let result = interpreter.run(source, |output| println!("{}", output));

    if let Err(ref error) = result {
        error.report(source, filename);
    }
    result
}
