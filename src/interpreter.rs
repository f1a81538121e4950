use crate::cursor::Cursor;
use crate::error::{ErrorKind, EvalError, Span};
use crate::evaluator::{EvalOptions, Evaluator};
use crate::functions::decbin;
use crate::resolve::is_reserved;
use crate::store::VariableStore;
use crate::value::{format_number, Value};
use log::{debug, info};

const STATEMENT_HELP: &str =
    "Statements are print(value), var name = value and bool name = true|false";

/// Line-oriented driver for Xenly source: `print(...)`, `var` and `bool`
/// declarations, and `//` / `/* */` comments. Owns the variable store and
/// hands statement arguments to the [`Evaluator`].
pub struct Interpreter {
    variables: VariableStore,
    options: EvalOptions,
    /// Byte offset of a `/*` that has not been closed yet.
    comment_start: Option<usize>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Self {
            variables: VariableStore::new(),
            options,
            comment_start: None,
        }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Runs a whole source text, passing each printed line to `emit`.
    /// Stops at the first failing line.
    pub fn run(&mut self, source: &str, mut emit: impl FnMut(&str)) -> Result<(), EvalError> {
        let mut offset = 0;
        for raw_line in source.split_inclusive('\n') {
            let line = raw_line.trim_end_matches(['\n', '\r']);
            if let Some(output) = self.execute_line(line, offset)? {
                emit(&output);
            }
            offset += raw_line.len();
        }
        self.finish()
    }

    /// Executes one line whose first byte sits at `offset` in the source.
    /// Returns the text a `print` produced, if any.
    pub fn execute_line(&mut self, line: &str, offset: usize) -> Result<Option<String>, EvalError> {
        let cleaned = self.strip_comments(line, offset);
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let base = offset + (cleaned.len() - cleaned.trim_start().len());
        let statement = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
        debug!("executing '{}'", statement);
        self.execute_statement(statement, base)
    }

    /// Fails if a block comment is still open.
    pub fn finish(&self) -> Result<(), EvalError> {
        match self.comment_start {
            Some(start) => Err(EvalError::new_with_help(
                ErrorKind::UnterminatedComment,
                Span::new(start, start + 2),
                "Unterminated block comment".to_string(),
                "Close the comment with */".to_string(),
            )),
            None => Ok(()),
        }
    }

    pub fn in_comment(&self) -> bool {
        self.comment_start.is_some()
    }

    /// Whether `line` reads as a statement rather than a bare expression.
    pub fn is_statement(&self, line: &str) -> bool {
        let line = line.trim_start();
        if self.in_comment() || line.starts_with("//") || line.starts_with("/*") {
            return true;
        }
        match Cursor::new(line).identifier() {
            Some(("print", rest)) => rest.skip_whitespace().peek() == Some('('),
            Some(("var" | "bool", rest)) => rest.peek().is_some_and(char::is_whitespace),
            _ => false,
        }
    }

    /// Evaluates a bare condition or expression against the current variables.
    pub fn evaluate(&self, text: &str) -> Result<f64, EvalError> {
        Evaluator::with_options(&self.variables, self.options).evaluate_condition(text)
    }

    fn execute_statement(&mut self, statement: &str, base: usize) -> Result<Option<String>, EvalError> {
        let span = Span::new(base, base + statement.len());
        let cursor = Cursor::new(statement);
        let (keyword, after_keyword) = cursor.identifier().unwrap_or(("", cursor));

        match keyword {
            "print" => {
                let open = after_keyword.skip_whitespace();
                match open.balanced_group() {
                    Some((arg, rest)) if rest.skip_whitespace().is_at_end() => {
                        self.print(arg, base + open.pos() + 1).map(Some)
                    }
                    Some((_, rest)) => Err(EvalError::new_with_help(
                        ErrorKind::InvalidStatement,
                        Span::new(base + rest.pos(), span.end),
                        "Unexpected text after print(...)".to_string(),
                        "Put one statement per line.".to_string(),
                    )),
                    None if open.peek() == Some('(') => Err(EvalError::new_with_help(
                        ErrorKind::UnbalancedFunctionCall,
                        span,
                        "print is missing its closing ')'".to_string(),
                        "Close the argument list: print(...)".to_string(),
                    )),
                    None => Err(EvalError::new_with_help(
                        ErrorKind::InvalidStatement,
                        span,
                        "Expected '(' after print".to_string(),
                        "Usage: print(value)".to_string(),
                    )),
                }
            }
            "var" | "bool" if after_keyword.peek().is_some_and(char::is_whitespace) => {
                self.declare(keyword, after_keyword.rest(), base + after_keyword.pos())?;
                Ok(None)
            }
            _ => Err(EvalError::new_with_help(
                ErrorKind::InvalidStatement,
                span,
                format!("Unknown statement '{}'", statement),
                STATEMENT_HELP.to_string(),
            )),
        }
    }

    fn print(&self, arg: &str, base: usize) -> Result<String, EvalError> {
        let base = base + (arg.len() - arg.trim_start().len());
        let arg = arg.trim();

        if let Some(text) = unquote(arg) {
            return Ok(text.to_string());
        }

        let mut evaluator = Evaluator::with_options(&self.variables, self.options);

        if let Some((name, after_name)) = Cursor::new(arg).identifier() {
            let open = after_name.skip_whitespace();
            if name == "decbin" {
                if let Some((inner, rest)) = open.balanced_group() {
                    if rest.is_at_end() {
                        let span = Span::new(base, base + arg.len());
                        let value = evaluator.argument(inner, base + open.pos() + 1)?;
                        return decbin(value, span);
                    }
                }
            }
        }

        if let Some(value) = self.variables.lookup(arg) {
            return Ok(value.to_string());
        }

        let value = evaluator
            .evaluate_condition(arg)
            .map_err(|error| error.shifted(base))?;
        Ok(format_number(value))
    }

    fn declare(&mut self, keyword: &str, text: &str, base: usize) -> Result<(), EvalError> {
        let Some((name_part, value_part)) = text.split_once('=') else {
            return Err(EvalError::new_with_help(
                ErrorKind::InvalidDeclaration,
                Span::new(base, base + text.len()),
                "Expected '=' in declaration".to_string(),
                format!("Write it as: {} name = value", keyword),
            ));
        };

        let name = name_part.trim();
        let name_at = base + (name_part.len() - name_part.trim_start().len());
        let name_span = Span::new(name_at, name_at + name.len().max(1));
        let is_identifier = matches!(Cursor::new(name).identifier(), Some((_, rest)) if rest.is_at_end());
        if !is_identifier {
            return Err(EvalError::new(
                ErrorKind::InvalidDeclaration,
                name_span,
                format!("'{}' is not a valid variable name", name),
            ));
        }
        if is_reserved(name) {
            return Err(EvalError::new_with_help(
                ErrorKind::InvalidDeclaration,
                name_span,
                format!("'{}' is a reserved name", name),
                "Built-in constants and true/false cannot be redefined.".to_string(),
            ));
        }

        let value_base = base + name_part.len() + 1;
        let value_at = value_base + (value_part.len() - value_part.trim_start().len());
        let raw = value_part.trim();

        let value = match (keyword, raw) {
            (_, "true") => Value::Bool(true),
            (_, "false") => Value::Bool(false),
            ("bool", other) => {
                return Err(EvalError::new_with_help(
                    ErrorKind::InvalidDeclaration,
                    Span::new(value_at, value_at + other.len().max(1)),
                    format!("Invalid boolean value '{}'", other),
                    "A bool can only be true or false.".to_string(),
                ))
            }
            (_, other) => match unquote(other) {
                Some(text) => Value::Text(text.to_string()),
                None => Value::Number(
                    Evaluator::with_options(&self.variables, self.options).argument(other, value_at)?,
                ),
            },
        };

        info!("declared {} {} = {}", keyword, name, value);
        self.variables.set(name, value);
        Ok(())
    }

    /// Blanks out comments while keeping byte offsets intact, so spans still
    /// line up with the original source.
    fn strip_comments(&mut self, line: &str, offset: usize) -> String {
        let mut cleaned = String::with_capacity(line.len());
        let mut chars = line.char_indices().peekable();
        let mut quote: Option<char> = None;

        while let Some((i, c)) = chars.next() {
            if self.comment_start.is_some() {
                if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    self.comment_start = None;
                    cleaned.push_str("  ");
                } else {
                    blank(&mut cleaned, c);
                }
                continue;
            }

            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                    cleaned.push(c);
                }
                None => match (c, chars.peek()) {
                    ('"' | '\'', _) => {
                        quote = Some(c);
                        cleaned.push(c);
                    }
                    ('/', Some((_, '/'))) => break,
                    ('/', Some((_, '*'))) => {
                        chars.next();
                        self.comment_start = Some(offset + i);
                        cleaned.push_str("  ");
                    }
                    _ => cleaned.push(c),
                },
            }
        }

        cleaned
    }
}

fn blank(cleaned: &mut String, c: char) {
    cleaned.extend(std::iter::repeat(' ').take(c.len_utf8()));
}

fn unquote(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        text.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .filter(|_| text.len() >= 2)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_keep_offsets() {
        let mut interpreter = Interpreter::new();
        let cleaned = interpreter.strip_comments("print(1) /* note */ // rest", 0);
        assert_eq!(cleaned.trim_end(), "print(1)");
        assert_eq!(cleaned.len(), "print(1) /* note */ ".len());
        assert!(!interpreter.in_comment());

        interpreter.strip_comments("/* open", 10);
        assert!(interpreter.in_comment());
        assert_eq!(interpreter.finish().unwrap_err().kind, ErrorKind::UnterminatedComment);
    }

    #[test]
    fn slashes_inside_strings_are_not_comments() {
        let mut interpreter = Interpreter::new();
        let output = interpreter
            .execute_line("print(\"http://example.com\")", 0)
            .unwrap();
        assert_eq!(output.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn unquote_needs_matching_quotes() {
        assert_eq!(unquote("\"hi\""), Some("hi"));
        assert_eq!(unquote("'hi'"), Some("hi"));
        assert_eq!(unquote("\"\""), Some(""));
        assert_eq!(unquote("\""), None);
        assert_eq!(unquote("\"hi'"), None);
    }
}
