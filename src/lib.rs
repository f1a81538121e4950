// Xenly Evaluator Library
//
// Arithmetic and condition evaluation for the Xenly language: a recursive
// descent evaluator over a variable store, the built-in math functions and
// constants, and the line-oriented statement driver used by the CLI.

// Public modules
pub mod cursor;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod info;
pub mod interpreter;
pub mod project;
pub mod repl;
pub mod resolve;
pub mod runner;
pub mod store;
pub mod value;

// Re-export commonly used items
pub use error::{ErrorKind, EvalError, Span};
pub use evaluator::{evaluate_condition, evaluate_expression, EvalOptions, Evaluator, DEFAULT_MAX_DEPTH};
pub use functions::{dispatch_function, Builtin};
pub use interpreter::Interpreter;
pub use resolve::{resolve_constant, resolve_variable};
pub use store::{SharedStore, VariableStore};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
